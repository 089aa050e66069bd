pub mod account;
pub mod allocation;
pub mod literature;
pub mod shared;
