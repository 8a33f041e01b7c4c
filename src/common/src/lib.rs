pub mod config;
pub mod constants;
pub mod dedup;
pub mod error;
pub mod formatter;
pub mod logging;
pub mod types;

pub use dedup::DedupGate;
pub use error::{WatiosError, WatiosResult};
pub use formatter::{format_error, format_success, get_error_message};
pub use types::failure::{Failure, RuntimeFailure, TransportFailure};
pub use types::records::{ErrorRecord, SuccessRecord, UsageRecord};
pub use types::response::Response;
