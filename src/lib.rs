pub mod cloner;
pub mod config;
pub mod errors;
pub mod models;
pub mod operations;
pub mod scanner;
pub mod utils;

// 重新导出常用模块
pub use cloner::{CloneOutcome, CloneTool, CloneWorker, GitCloneTool};
pub use errors::InputError;
pub use models::{BatchResult, RecordStatus, RepoRecord};
pub use operations::{run_batch, BatchCoordinator, BatchRequest};
pub use scanner::{compute_grade, LineCounter, RepoWalker};
