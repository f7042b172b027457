pub mod batch;
pub mod cleanup;
pub mod record_io;

pub use batch::{run_batch, BatchCoordinator, BatchRequest};
pub use cleanup::remove_workspace_root;
pub use record_io::{export_results, load_records, render_table, results_to_json};
