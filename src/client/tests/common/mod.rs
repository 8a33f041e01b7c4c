#![allow(dead_code)]

use mockito::ServerGuard;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use watios_client::{ClientOptions, WatiosClient};
use watios_common::config::Config;

pub const PASSKEY: &str = "test-passkey";
pub const RECIPIENT: &str = "+15550100";

/// Config whose messaging and stats endpoints both point at `side_channel`.
pub fn config_for(side_channel: &ServerGuard) -> Config {
    config_with_side_channel(&side_channel.url())
}

pub fn config_with_side_channel(url: &str) -> Config {
    Config {
        passkey: Some(PASSKEY.to_string()),
        stats_url: url.to_string(),
        messaging_url: url.to_string(),
        timeout_ms: 5000,
        dedup_window_ms: 180_000,
    }
}

pub fn client_for(base_url: &str, side_channel: &ServerGuard) -> WatiosClient {
    let options = ClientOptions::builder()
        .recipient_address(RECIPIENT)
        .access_credential(PASSKEY)
        .base_url(base_url)
        .build();

    WatiosClient::new(options, &config_for(side_channel)).expect("valid client")
}

/// Base URL of a port nothing listens on.
pub fn refused_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

/// Base URL of a server that accepts connections and never answers.
pub async fn stalled_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{}", addr)
}

/// Base URL of a server that sends a complete status line and headers, then
/// closes the connection before the promised body length.
pub async fn truncated_body_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 100\r\n\r\npartial",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}", addr)
}
