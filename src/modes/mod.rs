mod dispatch;
mod run_mode;

pub use dispatch::{DispatchError, dispatch};
pub use run_mode::RunMode;
