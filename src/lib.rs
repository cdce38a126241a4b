//! HMAC Signature Fixer - keeps HMAC-SHA256 request signatures valid
//!
//! Tampering with a signed request's parameters (proxy edits, replays,
//! fuzzing) breaks its `signature`. This crate recomputes it:
//! 1. QUERY and BODY parameters are percent-decoded and grouped by name
//! 2. Names are sorted and concatenated as `a=1b=2,3`
//! 3. HMAC-SHA256 over that string becomes the new `signature` query parameter
//!
//! [`signing`] is the pure core; [`handler`], [`request`] and [`config`] are
//! the host around it.

pub mod config;
pub mod error;
pub mod handler;
pub mod request;
pub mod signing;
pub mod utils;

pub use config::Config;
pub use error::{ConfigError, ParseError, SignError};
pub use handler::{handle_request, PassThroughReason, RequestAction};
pub use request::{HttpRequest, Parameter, ParameterSource};
pub use signing::{sign, SignObserver, SignedRequest, Signer};
