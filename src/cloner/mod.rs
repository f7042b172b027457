pub mod clone_tool;
pub mod clone_worker;

pub use clone_tool::{CloneOutcome, CloneTool, GitCloneTool};
pub use clone_worker::CloneWorker;
