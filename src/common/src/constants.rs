pub const DEFAULT_STATS_URL: &str = "http://localhost:3000";
pub const DEFAULT_MESSAGING_URL: &str = "http://localhost:3000";
pub const STATS_PATH: &str = "/add_usage";
pub const MESSAGING_PATH: &str = "/send_message";

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEDUP_WINDOW_MS: u64 = 180_000;
/// Smallest table size at which an insert sweeps expired dedup entries.
pub const DEDUP_SWEEP_THRESHOLD: usize = 1024;

pub const PASSKEY_ENV: &str = "PASSKEY";
pub const ENV_PREFIX: &str = "WATIOS";

pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";
pub const NO_URL: &str = "No URL";
pub const NO_METHOD: &str = "N/A";
pub const NO_STATUS: &str = "No status";
pub const NO_DATA: &str = "No data";
pub const NO_MESSAGE: &str = "An error occurred";
pub const NO_STACK: &str = "No stack trace available";
pub const NO_NAME: &str = "Unknown error";

pub const MAX_RESPONSE_EXCERPT: usize = 1000;
pub const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

pub const SERVER_ERROR_BODY: &str = "An error occurred, our team has been notified!";
