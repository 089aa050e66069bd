pub mod disposition;
pub mod upload;
