/// HMAC-SHA256 signature generation and validation
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::SignError;

type HmacSha256 = Hmac<Sha256>;

/// Create HMAC-SHA256 signature
///
/// # Arguments
/// * `data` - Canonical string to sign
/// * `secret` - Shared secret key (may be empty)
///
/// # Returns
/// Lowercase hex-encoded HMAC signature, 64 characters
pub fn create_signature(data: &str, secret: &str) -> Result<String, SignError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SignError::CryptoInit(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify HMAC signature
///
/// # Arguments
/// * `data` - Canonical string that was signed
/// * `secret` - Shared secret key
/// * `signature` - Signature to verify (lowercase hex)
///
/// # Returns
/// true if signature is valid
pub fn verify_signature(data: &str, secret: &str, signature: &str) -> Result<bool, SignError> {
    let expected = create_signature(data, secret)?;

    // Constant-time comparison
    Ok(expected.as_bytes().ct_eq(signature.as_bytes()).into())
}
