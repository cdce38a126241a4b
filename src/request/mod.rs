/// Request module - Parameter model and raw HTTP request editing
pub mod http;
pub mod parameter;

pub use http::{Body, HttpRequest};
pub use parameter::{Parameter, ParameterSource};
