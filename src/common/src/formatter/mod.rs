//! Turns raw failures and responses into the records that leave the process.
//!
//! Both formatters are total: whatever shape the input has, every field of the
//! output holds either a real value or one of the sentinels from
//! [`crate::constants`].

mod error_message;

pub use error_message::get_error_message;

use chrono::Local;
use serde_json::Value;

use crate::constants::{
    MAX_RESPONSE_EXCERPT, NO_DATA, NO_MESSAGE, NO_METHOD, NO_NAME, NO_STACK, NO_STATUS, NO_URL,
    TIMESTAMP_FORMAT, UNKNOWN_ERROR_CODE,
};
use crate::types::failure::{Failure, RuntimeFailure, TransportFailure};
use crate::types::records::{ErrorRecord, SuccessRecord};
use crate::types::response::Response;

pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_error(failure: &Failure) -> ErrorRecord {
    match failure {
        Failure::Transport(transport) => format_transport_error(transport),
        Failure::Runtime(runtime) => format_runtime_error(runtime),
    }
}

pub fn format_success(response: &Response) -> SuccessRecord {
    SuccessRecord {
        timestamp: timestamp_now(),
        status: response.status.as_u16(),
        url: non_empty(Some(response.url.as_str())).unwrap_or(NO_URL).to_string(),
        method: normalize_method(Some(response.method.as_str())),
        response_data: response.data(),
    }
}

fn format_transport_error(failure: &TransportFailure) -> ErrorRecord {
    let code = non_empty(failure.code.as_deref());

    ErrorRecord {
        timestamp: timestamp_now(),
        error_code: code.unwrap_or(UNKNOWN_ERROR_CODE).to_string(),
        message: get_error_message(
            code,
            failure.message.as_deref(),
            failure.response_data.as_ref(),
        ),
        url: non_empty(failure.url.as_deref())
            .unwrap_or(NO_URL)
            .to_string(),
        method: normalize_method(failure.method.as_deref()),
        status: failure
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| NO_STATUS.to_string()),
        response_data: excerpt(failure.response_data.as_ref()),
        is_request_error: true,
        stack: None,
        name: None,
    }
}

fn format_runtime_error(failure: &RuntimeFailure) -> ErrorRecord {
    ErrorRecord {
        timestamp: timestamp_now(),
        error_code: UNKNOWN_ERROR_CODE.to_string(),
        message: non_empty(failure.message.as_deref())
            .unwrap_or(NO_MESSAGE)
            .to_string(),
        url: NO_URL.to_string(),
        method: NO_METHOD.to_string(),
        status: NO_STATUS.to_string(),
        response_data: Value::String(NO_DATA.to_string()),
        is_request_error: false,
        stack: Some(
            non_empty(failure.stack.as_deref())
                .unwrap_or(NO_STACK)
                .to_string(),
        ),
        name: Some(
            non_empty(failure.name.as_deref())
                .unwrap_or(NO_NAME)
                .to_string(),
        ),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn normalize_method(method: Option<&str>) -> String {
    non_empty(method)
        .map(str::to_lowercase)
        .unwrap_or_else(|| NO_METHOD.to_string())
}

/// Keeps response bodies bounded; oversized bodies become a truncated string.
fn excerpt(data: Option<&Value>) -> Value {
    let data = match data {
        None | Some(Value::Null) => return Value::String(NO_DATA.to_string()),
        Some(Value::String(s)) if s.is_empty() => return Value::String(NO_DATA.to_string()),
        Some(data) => data,
    };

    let rendered = match data {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    if rendered.chars().count() > MAX_RESPONSE_EXCERPT {
        let truncated: String = rendered.chars().take(MAX_RESPONSE_EXCERPT).collect();
        Value::String(format!("{}...", truncated))
    } else {
        data.clone()
    }
}
