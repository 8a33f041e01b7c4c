use anyhow::{bail, Context, Result};
use clap::Parser;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use watios_client::{ClientOptions, WatiosClient};
use watios_common::config::{Config, ConfigLoader};
use watios_common::logging::setup_logging;
use watios_common::RuntimeFailure;

use crate::commands::{AuthArgs, Cli, Commands};

pub fn process_cli() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_file.as_deref(), "warn")?;

    // Use the --config flag, if provided, when loading the configuration
    let config = ConfigLoader::load_config(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("{}: {}", e.user_message(), e))?;

    let client = build_client(&cli.auth, &config)?;

    tokio::runtime::Runtime::new()?.block_on(run_async_command(cli.command, &client))
}

fn build_client(auth: &AuthArgs, config: &Config) -> Result<WatiosClient> {
    let Some(recipient) = auth.recipient.as_deref() else {
        bail!("--recipient is required");
    };
    let Some(passkey) = auth.passkey.as_deref() else {
        bail!("--passkey is required");
    };

    let options = ClientOptions::builder()
        .recipient_address(recipient)
        .access_credential(passkey)
        .build();

    WatiosClient::new(options, config).map_err(|e| anyhow::anyhow!(e.user_message()))
}

pub async fn run_async_command(command: Commands, client: &WatiosClient) -> Result<()> {
    match command {
        Commands::Request {
            method,
            url,
            data,
            headers,
        } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())
                .with_context(|| format!("'{}' is not an HTTP method", method))?;

            let mut request = client.request(method, &url);
            for (name, value) in &headers {
                request = request.header(name, value);
            }
            if let Some(data) = data {
                let body: Value = serde_json::from_str(&data).context("--data is not valid JSON")?;
                request = request.json(&body);
            }

            let outcome = request.send().await;
            client.flush().await;

            match outcome {
                Ok(response) => {
                    debug!("{} {} returned {}", response.method, response.url, response.status);
                    println!("{}", response.status);
                    println!("{}", response.text());
                    Ok(())
                }
                Err(record) => {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                    bail!("Request failed: {}", record.message)
                }
            }
        }
        Commands::Alert { message, name } => {
            let alerter = client.alerter();
            let record = alerter.alert(RuntimeFailure {
                name,
                message: Some(message),
                stack: None,
            });
            alerter.flush().await;

            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
    }
}
