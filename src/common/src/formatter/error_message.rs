use serde_json::Value;

const NO_ERROR_MESSAGE: &str = "No error message available.";

/// Resolves a transport error code to a readable sentence.
///
/// Total over its input: unknown or missing codes fall back to a generic
/// sentence built from `message`.
pub fn get_error_message(
    code: Option<&str>,
    message: Option<&str>,
    response_data: Option<&Value>,
) -> String {
    let message = message.filter(|m| !m.trim().is_empty());

    match code {
        Some("ENOTFOUND") => {
            "The requested host could not be found. Check the URL or the DNS configuration."
                .to_string()
        }
        Some("ECONNABORTED") => {
            "The request was aborted or timed out before a response was received.".to_string()
        }
        Some("ECONNREFUSED") => {
            "The connection was refused by the server. Check that the service is running."
                .to_string()
        }
        Some("ETIMEDOUT") => "The request timed out waiting for the server.".to_string(),
        Some("ERR_NETWORK") => {
            "A network error occurred. Check the network connection.".to_string()
        }
        Some("ERR_BAD_REQUEST") => {
            let detail = response_data
                .and_then(|data| data.pointer("/error/message"))
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .or(message)
                .unwrap_or("The server rejected the request.");
            format!("Bad request: {}", detail)
        }
        _ => format!(
            "An unknown error occurred: {}",
            message.unwrap_or(NO_ERROR_MESSAGE)
        ),
    }
}
