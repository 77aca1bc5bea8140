pub mod deadline;
pub mod retry;

pub use deadline::*;
pub use retry::*;
