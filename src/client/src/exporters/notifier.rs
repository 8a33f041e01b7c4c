use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use watios_common::constants::NO_METHOD;
use watios_common::ErrorRecord;

use super::{post_json, DispatchResult};

const MAX_ALERT_RESPONSE_CHARS: usize = 300;
const STACK_LINES: usize = 2;
const NO_STACK_PREVIEW: &str = "N/A";

#[derive(Serialize)]
struct MessagePayload<'a> {
    phonenumber: &'a str,
    text: &'a str,
}

/// Sends rendered alerts to the messaging endpoint.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: Client,
    endpoint: String,
}

impl Notifier {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn send_alert(&self, recipient: &str, record: &ErrorRecord) -> DispatchResult<Value> {
        let text = render_alert(record);
        let payload = MessagePayload {
            phonenumber: recipient,
            text: &text,
        };

        post_json(&self.client, &self.endpoint, &payload).await
    }
}

/// Renders the chat message for a record. Request errors show the target and
/// response, runtime errors show the head of the stack.
pub fn render_alert(record: &ErrorRecord) -> String {
    let mut text = format!(
        "🚨 *ERROR ALERT* 🚨\n\
         *Date & Time:* {}\n\
         *Error Code:* {}\n\
         *Message:* {}\n",
        record.timestamp, record.error_code, record.message
    );

    if record.is_request_error {
        let method = if record.method == NO_METHOD {
            record.method.clone()
        } else {
            record.method.to_uppercase()
        };

        text.push_str(&format!(
            "*URL:* {}\n*Method:* {}\n*Status:* {}\n*Response:* {}\n",
            record.url,
            method,
            record.status,
            response_excerpt(&record.response_data)
        ));
    } else {
        let stack = record
            .stack
            .as_deref()
            .map(|s| s.lines().take(STACK_LINES).collect::<Vec<_>>().join("\n"))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_STACK_PREVIEW.to_string());

        text.push_str(&format!("*Stack:* {}\n", stack));
    }

    text
}

fn response_excerpt(data: &Value) -> String {
    let rendered = match data {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    if rendered.chars().count() > MAX_ALERT_RESPONSE_CHARS {
        let head: String = rendered.chars().take(MAX_ALERT_RESPONSE_CHARS).collect();
        format!("{}...", head)
    } else {
        rendered
    }
}
