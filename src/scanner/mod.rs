pub mod git_analyzer;
pub mod grade;
pub mod line_counter;
pub mod repo_walker;

pub use git_analyzer::{GitAnalyzer, WorkspaceInfo};
pub use grade::compute_grade;
pub use line_counter::LineCounter;
pub use repo_walker::{LineTally, RepoWalker};
