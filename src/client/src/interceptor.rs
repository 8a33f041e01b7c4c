use watios_common::{ErrorRecord, Response};

/// Caller-registered hook run after the built-in pipeline has handled a
/// response or failure. Hooks observe; they cannot change the outcome.
pub trait ResponseInterceptor: Send + Sync {
    fn on_response(&self, _response: &Response) {}

    fn on_error(&self, _record: &ErrorRecord) {}
}
