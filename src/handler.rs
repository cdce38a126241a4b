/// Host-side gating around the signer
///
/// Decides whether a request gets signed at all and makes sure a signing
/// failure never blocks traffic: the original request is forwarded instead.
use crate::config::Config;
use crate::request::HttpRequest;
use crate::signing::{SignedRequest, Signer};

/// Why a request was forwarded without a new signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassThroughReason {
    Disabled,
    MissingSecret,
    SignFailed,
}

/// What to forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestAction {
    Signed(SignedRequest),
    PassThrough {
        request: HttpRequest,
        reason: PassThroughReason,
    },
}

impl RequestAction {
    pub fn into_request(self) -> HttpRequest {
        match self {
            RequestAction::Signed(signed) => signed.into_request(),
            RequestAction::PassThrough { request, .. } => request,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, RequestAction::Signed(_))
    }
}

impl PassThroughReason {
    fn describe(self) -> &'static str {
        match self {
            PassThroughReason::Disabled => "signing disabled",
            PassThroughReason::MissingSecret => "no secret configured",
            PassThroughReason::SignFailed => "signing failed",
        }
    }
}

/// Forward `request` unchanged, logging why at warn level
fn pass_through(request: HttpRequest, reason: PassThroughReason) -> RequestAction {
    tracing::warn!("⚠️  {}, request forwarded unchanged", reason.describe());
    RequestAction::PassThrough { request, reason }
}

/// Sign `request` if the configuration allows it
pub fn handle_request(request: HttpRequest, config: &Config, signer: &Signer) -> RequestAction {
    if !config.enabled {
        return pass_through(request, PassThroughReason::Disabled);
    }

    if config.secret.is_empty() {
        return pass_through(request, PassThroughReason::MissingSecret);
    }

    match signer.sign(&request, &config.secret) {
        Ok(signed) => {
            if signed.decode_fallbacks() > 0 {
                tracing::warn!(
                    fallbacks = signed.decode_fallbacks(),
                    "⚠️  Some values could not be percent-decoded and were signed raw"
                );
            }
            RequestAction::Signed(signed)
        }
        // Unreachable with Hmac<Sha256>, which accepts keys of any length
        Err(e) => {
            tracing::error!(error = %e, "❌ Error signing request");
            pass_through(request, PassThroughReason::SignFailed)
        }
    }
}
