pub mod batch_result;
pub mod repo_record;

pub use batch_result::{BatchResult, BatchStats};
pub use repo_record::{InputRecord, PassThroughColumns, RecordStatus, RepoRecord};
