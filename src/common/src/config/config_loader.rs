use std::env;
use std::time::Duration;

use config::{Config as RConfig, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEDUP_WINDOW_MS, DEFAULT_MESSAGING_URL, DEFAULT_STATS_URL, DEFAULT_TIMEOUT_MS, ENV_PREFIX,
    MESSAGING_PATH, PASSKEY_ENV, STATS_PATH,
};
use crate::error::{WatiosError, WatiosResult};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Expected access credential. There is deliberately no built-in default.
    pub passkey: Option<String>,

    pub stats_url: String,
    pub messaging_url: String,

    pub timeout_ms: u64,
    pub dedup_window_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            passkey: None,
            stats_url: DEFAULT_STATS_URL.to_string(),
            messaging_url: DEFAULT_MESSAGING_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            dedup_window_ms: DEDUP_WINDOW_MS,
        }
    }
}

impl Config {
    /// The credential clients must present. Fails closed when none is set.
    pub fn expected_passkey(&self) -> WatiosResult<&str> {
        self.passkey
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(WatiosError::MissingCredential)
    }

    pub fn stats_endpoint(&self) -> String {
        format!("{}{}", self.stats_url.trim_end_matches('/'), STATS_PATH)
    }

    pub fn messaging_endpoint(&self) -> String {
        format!("{}{}", self.messaging_url.trim_end_matches('/'), MESSAGING_PATH)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.dedup_window_ms)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, overridden by `WATIOS_*` variables, overridden by `PASSKEY`.
    pub fn load_default_config() -> WatiosResult<Config> {
        Self::load_config(None)
    }

    /// Same as [`ConfigLoader::load_default_config`], with an optional TOML
    /// file layered between the defaults and the environment.
    pub fn load_config(path: Option<&str>) -> WatiosResult<Config> {
        dotenv::dotenv().ok();

        let mut builder = RConfig::builder();

        // set defaults
        builder = builder
            .set_default("passkey", None::<String>)?
            .set_default("stats_url", DEFAULT_STATS_URL)?
            .set_default("messaging_url", DEFAULT_MESSAGING_URL)?
            .set_default("timeout_ms", DEFAULT_TIMEOUT_MS)?
            .set_default("dedup_window_ms", DEDUP_WINDOW_MS)?;

        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        // set overrides
        builder = builder.set_override_option(
            "passkey",
            env::var(PASSKEY_ENV).ok().filter(|p| !p.is_empty()),
        )?;

        let config: Config = builder.build()?.try_deserialize()?;

        Ok(config)
    }
}
