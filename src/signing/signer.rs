/// Request re-signing
use super::canonical::{CanonicalParameterSet, SIGNATURE_PARAMETER};
use super::hmac::{create_signature, verify_signature};
use crate::error::SignError;
use crate::request::{HttpRequest, Parameter, ParameterSource};

/// Hook invoked after every successful signing call.
///
/// The signer itself never logs; hosts that want to see what was signed
/// install an observer.
pub trait SignObserver: Send + Sync {
    fn signed(&self, canonical: &str, signature: &str);
}

impl<F> SignObserver for F
where
    F: Fn(&str, &str) + Send + Sync,
{
    fn signed(&self, canonical: &str, signature: &str) {
        self(canonical, signature)
    }
}

/// Output of [`Signer::sign`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    request: HttpRequest,
    signature: String,
    canonical: String,
    decode_fallbacks: usize,
}

impl SignedRequest {
    /// The request with its `signature` parameter replaced
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn into_request(self) -> HttpRequest {
        self.request
    }

    /// Lowercase hex digest, 64 characters
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The exact string that was signed
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Values whose percent-decoding failed and were signed raw
    pub fn decode_fallbacks(&self) -> usize {
        self.decode_fallbacks
    }
}

/// Stateless request signer
///
/// Safe to share between threads; the secret is passed in on every call.
#[derive(Default)]
pub struct Signer {
    observer: Option<Box<dyn SignObserver>>,
}

impl Signer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signer that reports every signature to `observer`
    pub fn with_observer(observer: impl SignObserver + 'static) -> Self {
        Self {
            observer: Some(Box::new(observer)),
        }
    }

    /// Canonical string for a request, ignoring any `signature` parameter
    pub fn canonicalize(request: &HttpRequest) -> CanonicalParameterSet {
        CanonicalParameterSet::from_parameters(request.parameters())
    }

    /// Recompute the signature of `request` and put it in the query string
    ///
    /// Every existing `signature` parameter is dropped, whatever its source,
    /// and exactly one new QUERY `signature` parameter is appended.
    pub fn sign(&self, request: &HttpRequest, secret: &str) -> Result<SignedRequest, SignError> {
        let stale: Vec<Parameter> = request
            .parameters()
            .iter()
            .filter(|p| p.name() == SIGNATURE_PARAMETER)
            .cloned()
            .collect();

        let set = Self::canonicalize(request);
        let canonical = set.canonical_string();
        let signature = create_signature(&canonical, secret)?;

        if let Some(observer) = &self.observer {
            observer.signed(&canonical, &signature);
        }

        let request = request
            .with_removed_parameters(&stale)
            .with_added_parameters([Parameter::query(SIGNATURE_PARAMETER, signature.as_str())]);

        Ok(SignedRequest {
            request,
            signature,
            canonical,
            decode_fallbacks: set.decode_fallbacks(),
        })
    }

    /// Check the QUERY `signature` parameter of `request`
    ///
    /// A request with no signature, or with more than one, does not verify.
    pub fn verify(request: &HttpRequest, secret: &str) -> Result<bool, SignError> {
        let mut provided = request
            .parameters()
            .iter()
            .filter(|p| p.name() == SIGNATURE_PARAMETER && p.source() == ParameterSource::Query);

        let (Some(signature), None) = (provided.next(), provided.next()) else {
            return Ok(false);
        };

        let canonical = Self::canonicalize(request).canonical_string();
        verify_signature(&canonical, secret, signature.value())
    }
}

/// Sign with a default [`Signer`]
pub fn sign(request: &HttpRequest, secret: &str) -> Result<SignedRequest, SignError> {
    Signer::new().sign(request, secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use std::sync::{Arc, Mutex};

    fn request_with(params: Vec<Parameter>) -> HttpRequest {
        HttpRequest::new("GET", "/").with_added_parameters(params)
    }

    fn signature_params(request: &HttpRequest) -> Vec<&Parameter> {
        request
            .parameters()
            .iter()
            .filter(|p| p.name() == SIGNATURE_PARAMETER)
            .collect()
    }

    #[test]
    fn test_single_query_parameter() {
        let signed = sign(&request_with(vec![Parameter::query("foo", "bar")]), "secret").unwrap();
        assert_eq!(signed.canonical(), "foo=bar");
        assert_eq!(
            signed.signature(),
            "e8dd201559dd71514b6d2acfd07754b364ea8461d3860ab7b722691d2b8fd09b"
        );
    }

    #[test]
    fn test_names_sorted_regardless_of_input_order() {
        let signed = sign(
            &request_with(vec![Parameter::query("b", "2"), Parameter::query("a", "1")]),
            "secret",
        )
        .unwrap();
        assert_eq!(signed.canonical(), "a=1b=2");
        assert_eq!(
            signed.signature(),
            "285d7d8c87512c888505195b1f9dee0a100de25cb36c500ab8a9ae0fa042576e"
        );
    }

    #[test]
    fn test_existing_signature_replaced() {
        let request = request_with(vec![
            Parameter::query("signature", "oldvalue"),
            Parameter::query("x", "5"),
        ]);
        let signed = sign(&request, "secret").unwrap();

        assert_eq!(signed.canonical(), "x=5");
        let sigs = signature_params(signed.request());
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].source(), ParameterSource::Query);
        assert_eq!(
            sigs[0].value(),
            "bc970130817143e8906f6551c2f6af266c3861e5939c317eda75fa06e01d9114"
        );
    }

    #[test]
    fn test_percent_encoded_value_decoded() {
        let request = request_with(vec![Parameter::query("name", "a%20b")]);
        let signed = sign(&request, "secret").unwrap();
        assert_eq!(signed.canonical(), "name=a b");
        assert_eq!(
            signed.signature(),
            "00de315c04ad099d08584e73901783a073fc916a360fb1061a7ab91f8e27de0a"
        );
        // The transmitted value is left encoded
        assert!(signed.request().parameters().contains(&Parameter::query("name", "a%20b")));
    }

    #[test]
    fn test_repeated_body_parameters_joined() {
        let request = request_with(vec![Parameter::body("tag", "1"), Parameter::body("tag", "2")]);
        let signed = sign(&request, "secret").unwrap();
        assert_eq!(signed.canonical(), "tag=1,2");
        assert_eq!(
            signed.signature(),
            "4dd42527b2b65551dc0d8ecff7ac751f021048b93e5e0b24f695a4e2384a01c2"
        );
    }

    #[test]
    fn test_signing_keeps_wire_form_of_other_parameters() {
        let raw = "GET /p?flag&&a=1&signature=old HTTP/1.1\r\n\r\n";
        let request = HttpRequest::parse(raw).unwrap();
        let signed = sign(&request, "secret").unwrap();

        assert_eq!(signed.canonical(), "a=1flag=");
        assert_eq!(
            signed.request().target(),
            format!("/p?flag&&a=1&signature={}", signed.signature())
        );
    }

    #[test]
    fn test_empty_request_still_signed() {
        let signed = sign(&HttpRequest::new("GET", "/"), "secret").unwrap();
        assert_eq!(signed.canonical(), "");
        assert_eq!(
            signed.signature(),
            "f9e66e179b6747ae54108f82f8ade8b3c25d76fd30afde6c395822c530196169"
        );
        assert_eq!(signature_params(signed.request()).len(), 1);
    }

    #[test]
    fn test_all_signature_sources_removed() {
        let request = request_with(vec![
            Parameter::query("signature", "a"),
            Parameter::body("signature", "b"),
            Parameter::other("signature", "c"),
            Parameter::query("signature", "d"),
            Parameter::query("x", "5"),
        ]);
        let signed = sign(&request, "secret").unwrap();

        assert_eq!(signed.canonical(), "x=5");
        let sigs = signature_params(signed.request());
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].value(), signed.signature());
        assert_eq!(sigs[0].source(), ParameterSource::Query);
    }

    #[test]
    fn test_other_sources_ignored_and_kept() {
        let a = request_with(vec![Parameter::query("x", "1"), Parameter::other("session", "one")]);
        let b = request_with(vec![Parameter::query("x", "1"), Parameter::other("session", "two")]);

        let signed_a = sign(&a, "secret").unwrap();
        let signed_b = sign(&b, "secret").unwrap();
        assert_eq!(signed_a.signature(), signed_b.signature());
        assert!(signed_a.request().parameters().contains(&Parameter::other("session", "one")));
    }

    #[test]
    fn test_deterministic() {
        let request = request_with(vec![
            Parameter::query("shop", "demo"),
            Parameter::body("code", "x%2By"),
        ]);
        let first = sign(&request, "secret").unwrap();
        let second = sign(&request, "secret").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_permuting_distinct_names_keeps_signature() {
        let mut params: Vec<Parameter> = (0..12)
            .map(|i| {
                if i % 2 == 0 {
                    Parameter::query(format!("q{i}"), format!("v{i}"))
                } else {
                    Parameter::body(format!("b{i}"), format!("v%20{i}"))
                }
            })
            .collect();
        let expected = sign(&request_with(params.clone()), "secret").unwrap();

        let mut rng = rand::rng();
        for _ in 0..20 {
            params.shuffle(&mut rng);
            let signed = sign(&request_with(params.clone()), "secret").unwrap();
            assert_eq!(signed.signature(), expected.signature());
        }
    }

    #[test]
    fn test_permuting_repeats_changes_signature() {
        let forward = request_with(vec![Parameter::query("id", "1"), Parameter::query("id", "2")]);
        let reverse = request_with(vec![Parameter::query("id", "2"), Parameter::query("id", "1")]);
        assert_ne!(
            sign(&forward, "secret").unwrap().signature(),
            sign(&reverse, "secret").unwrap().signature()
        );
    }

    #[test]
    fn test_decode_fallback_reported() {
        let signed = sign(&request_with(vec![Parameter::query("off", "50%")]), "secret").unwrap();
        assert_eq!(signed.canonical(), "off=50%");
        assert_eq!(signed.decode_fallbacks(), 1);
    }

    #[test]
    fn test_observer_sees_canonical_and_signature() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let signer = Signer::with_observer(move |canonical: &str, signature: &str| {
            sink.lock().unwrap().push((canonical.to_string(), signature.to_string()));
        });

        let request = request_with(vec![Parameter::query("foo", "bar")]);
        let signed = signer.sign(&request, "secret").unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "foo=bar");
        assert_eq!(seen[0].1, signed.signature());
    }

    #[test]
    fn test_verify() {
        let request = request_with(vec![
            Parameter::query("shop", "demo"),
            Parameter::body("tag", "1"),
        ]);
        let signed = sign(&request, "secret").unwrap().into_request();

        assert!(Signer::verify(&signed, "secret").unwrap());
        assert!(!Signer::verify(&signed, "other").unwrap());

        // Tampering after signing breaks it
        let tampered = signed
            .with_removed_parameters(&[Parameter::query("shop", "demo")])
            .with_added_parameters([Parameter::query("shop", "evil")]);
        assert!(!Signer::verify(&tampered, "secret").unwrap());

        // Unsigned and doubly-signed requests never verify
        assert!(!Signer::verify(&request, "secret").unwrap());
        let doubled = signed.with_added_parameters([Parameter::query("signature", "00")]);
        assert!(!Signer::verify(&doubled, "secret").unwrap());
    }

    #[test]
    fn test_concurrent_signing() {
        let signer = Arc::new(Signer::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let signer = Arc::clone(&signer);
                std::thread::spawn(move || {
                    let request = request_with(vec![Parameter::query("n", i.to_string())]);
                    let expected = create_signature(&format!("n={i}"), "secret").unwrap();
                    let signed = signer.sign(&request, "secret").unwrap();
                    assert_eq!(signed.signature(), expected);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
