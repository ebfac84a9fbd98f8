pub mod constants;
pub mod error;
pub mod history;
pub mod log;
pub mod node;
pub mod record;
pub mod storage;

pub use error::{NodeError, NodeErrorKind, StorageError};
pub use history::{LaunchHistory, LaunchIdentity, RecordChange};
pub use log::{HistoryLog, MemoryLog, TracingLog};
pub use record::{
    compare_quality, more_aggressive, AttemptInputs, AttemptResults, LaunchRecord, LaunchSettings,
};
pub use storage::{read_history_file, write_history_file};
