mod async_conversion;
mod log_path;

pub use async_conversion::{AsyncTryFrom, AsyncTryInto};
pub use log_path::LogPathExt;
