pub mod preview;
pub mod render;
pub mod storage;

pub use preview::{Preview, PreviewError};
