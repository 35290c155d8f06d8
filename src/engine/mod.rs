mod compose;
mod output;

pub use compose::{ComposeEngine, EngineError};
