//! `axum` integration: handlers return [`ReportedError`] and the
//! [`report_errors`] middleware raises the failure through an [`Alerter`].
//!
//! [`Alerter`]: crate::alerter::Alerter

mod error_layer;

pub use error_layer::{report_errors, ReportedError};
