pub mod alerter;
pub mod exporters;
pub mod interceptor;
pub mod request;
pub mod server;

pub mod watios_client;

pub use alerter::Alerter;
pub use interceptor::ResponseInterceptor;
pub use request::WatiosRequest;
pub use watios_client::{ClientOptions, WatiosClient};

pub use watios_common::{ErrorRecord, Failure, Response, SuccessRecord, WatiosError};
