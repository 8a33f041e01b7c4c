use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[clap(
    name = "watios",
    about = "Send HTTP requests and raise alerts through the Watios pipeline",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[clap(flatten)]
    pub auth: AuthArgs,

    /// Path to a TOML config file layered under the environment
    #[clap(long, global = true)]
    pub config: Option<String>,

    /// Also write logs to this file
    #[clap(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct AuthArgs {
    /// Address that receives alert messages
    #[clap(long, global = true)]
    pub recipient: Option<String>,

    /// Access credential; must match the configured passkey
    #[clap(long, global = true)]
    pub passkey: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Perform a request and print the response or the formatted failure
    Request {
        /// HTTP method, e.g. GET or post
        method: String,

        /// Absolute URL of the target
        url: String,

        /// JSON request body
        #[clap(long)]
        data: Option<String>,

        /// Extra header as `Name: value`, may be repeated
        #[clap(long = "header", short = 'H', value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },

    /// Raise a manual alert through the notify and stats channels
    Alert {
        message: String,

        /// Error name shown in the alert's stack preview
        #[clap(long)]
        name: Option<String>,
    },
}

pub fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got `{}`", raw))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in `{}`", raw));
    }

    Ok((name.to_string(), value.trim().to_string()))
}
