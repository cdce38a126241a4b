/// Parameter canonicalization: selection, decoding, ordering, concatenation
use std::collections::BTreeMap;

use crate::request::Parameter;

/// Name of the parameter that carries the signature
pub const SIGNATURE_PARAMETER: &str = "signature";

/// Decode a form/query value: `+` is a space, `%XX` is a byte.
///
/// Returns `None` when a `%` is not followed by two hex digits. Byte
/// sequences that are not valid UTF-8 decode to U+FFFD.
pub fn percent_decode(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let is_hex = |i: usize| bytes.get(i).is_some_and(|b| b.is_ascii_hexdigit());

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if !(is_hex(i + 1) && is_hex(i + 2)) {
                return None;
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = raw.replace('+', " ");
    let decoded = urlencoding::decode_binary(spaced.as_bytes());
    Some(String::from_utf8_lossy(&decoded).into_owned())
}

/// Signed parameters grouped by name, iterated in byte-wise name order
///
/// Built fresh for every signing call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CanonicalParameterSet {
    entries: BTreeMap<String, Vec<String>>,
    decode_fallbacks: usize,
}

impl CanonicalParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every QUERY/BODY parameter except `signature`
    pub fn from_parameters<'a>(params: impl IntoIterator<Item = &'a Parameter>) -> Self {
        let mut set = Self::new();
        for param in params {
            if param.name() == SIGNATURE_PARAMETER || !param.source().is_signed() {
                continue;
            }
            set.insert(param.name(), param.value());
        }
        set
    }

    /// Decode `raw_value` and append it to the values of `name`
    ///
    /// A value that fails to decode is kept raw and counted.
    pub fn insert(&mut self, name: &str, raw_value: &str) {
        let value = match percent_decode(raw_value) {
            Some(decoded) => decoded,
            None => {
                self.decode_fallbacks += 1;
                raw_value.to_string()
            }
        };
        self.entries.entry(name.to_string()).or_default().push(value);
    }

    /// Values of `name` in encounter order
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of values whose decoding fell back to the raw value
    pub fn decode_fallbacks(&self) -> usize {
        self.decode_fallbacks
    }

    /// `name1=v1,v1bname2=v2...` with no separator between names
    pub fn canonical_string(&self) -> String {
        let mut out = String::new();
        for (name, values) in &self.entries {
            out.push_str(name);
            out.push('=');
            out.push_str(&values.join(","));
        }
        out
    }
}
