pub mod account;
pub mod allocation;
pub mod file;
pub mod literature;
