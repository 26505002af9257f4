//! Clients for the audit REST backend.

mod http;
#[cfg(feature = "test-util")]
pub mod mock;

pub use audit_types::{Gateway, GatewayError};
pub use http::HttpGateway;

#[cfg(feature = "test-util")]
pub use mock::{MockCall, MockGateway};
