use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::constants::NO_DATA;

/// A fully buffered response handed back to the caller unchanged.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: String,
    pub method: String,
    pub body: Bytes,
}

impl Response {
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body as a JSON value: parsed when possible, raw text otherwise.
    pub fn data(&self) -> Value {
        body_to_value(&self.body)
    }
}

pub fn body_to_value(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::String(NO_DATA.to_string());
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
