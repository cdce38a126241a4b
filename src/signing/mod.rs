/// Signing module - Canonicalization and HMAC-SHA256 re-signing
pub mod canonical;
pub mod hmac;
pub mod signer;

pub use canonical::{percent_decode, CanonicalParameterSet, SIGNATURE_PARAMETER};
pub use self::hmac::{create_signature, verify_signature};
pub use signer::{sign, SignObserver, SignedRequest, Signer};
