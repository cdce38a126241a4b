//! Request parameters as seen by the signer

/// Where a parameter was found in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterSource {
    /// URL query string
    Query,
    /// `application/x-www-form-urlencoded` body
    Body,
    /// Anything else (cookies). Never signed.
    Other,
}

impl ParameterSource {
    /// Whether parameters of this source take part in signing
    pub fn is_signed(self) -> bool {
        matches!(self, ParameterSource::Query | ParameterSource::Body)
    }
}

/// One name/value pair extracted from a request
///
/// Values are kept exactly as transmitted (still percent-encoded).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    name: String,
    value: String,
    source: ParameterSource,
    has_equals: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>, source: ParameterSource) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            source,
            has_equals: true,
        }
    }

    /// Valueless parameter written without `=`, as in `?debug&a=1`
    pub fn flag(name: impl Into<String>, source: ParameterSource) -> Self {
        Self {
            has_equals: false,
            ..Self::new(name, "", source)
        }
    }

    pub fn query(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, ParameterSource::Query)
    }

    pub fn body(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, ParameterSource::Body)
    }

    pub fn other(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, ParameterSource::Other)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw value; empty for a flag
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> ParameterSource {
        self.source
    }

    /// Whether the parameter was written without `=`
    pub fn is_flag(&self) -> bool {
        !self.has_equals
    }

    /// The parameter as it appears on the wire
    pub fn to_wire(&self) -> String {
        if self.has_equals {
            format!("{}={}", self.name, self.value)
        } else {
            self.name.clone()
        }
    }
}

/// Parse one `name=value` or `name` segment
pub(crate) fn parse_pair(segment: &str, source: ParameterSource) -> Parameter {
    match segment.split_once('=') {
        Some((name, value)) => Parameter::new(name, value, source),
        None => Parameter::flag(segment, source),
    }
}

/// Empty segment of a `&`-separated list (`a=1&&b=2`)
///
/// Anchored to the n-th occurrence of the parameter it follows, or to the
/// start of the list, so rendering can put it back where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Gap {
    pub source: ParameterSource,
    pub after: Option<(Parameter, usize)>,
}

/// Split `a=1&b=2` into parameters of the given source, remembering empty segments
pub(crate) fn split_pairs(input: &str, source: ParameterSource) -> (Vec<Parameter>, Vec<Gap>) {
    let mut params: Vec<Parameter> = Vec::new();
    let mut gaps = Vec::new();
    if input.is_empty() {
        return (params, gaps);
    }

    for segment in input.split('&') {
        if segment.is_empty() {
            let after = params
                .last()
                .map(|last| (last.clone(), occurrence(&params, params.len() - 1)));
            gaps.push(Gap { source, after });
        } else {
            params.push(parse_pair(segment, source));
        }
    }
    (params, gaps)
}

/// How many equal parameters precede `params[index]`
fn occurrence(params: &[Parameter], index: usize) -> usize {
    params[..index].iter().filter(|p| **p == params[index]).count()
}

fn drain_gaps(
    pending: &mut Vec<&Gap>,
    after: Option<(&Parameter, usize)>,
    pieces: &mut Vec<String>,
) {
    while let Some(i) = pending
        .iter()
        .position(|g| g.after.as_ref().map(|(p, n)| (p, *n)) == after)
    {
        pending.remove(i);
        pieces.push(String::new());
    }
}

/// Inverse of [`split_pairs`]
///
/// Gaps whose anchor parameter is gone are dropped with it.
pub(crate) fn join_pairs(params: &[&Parameter], gaps: &[Gap]) -> String {
    let owned: Vec<Parameter> = params.iter().map(|p| (*p).clone()).collect();
    let mut pending: Vec<&Gap> = gaps.iter().collect();
    let mut pieces = Vec::new();

    drain_gaps(&mut pending, None, &mut pieces);
    for (index, param) in params.iter().enumerate() {
        pieces.push(param.to_wire());
        drain_gaps(&mut pending, Some((*param, occurrence(&owned, index))), &mut pieces);
    }
    pieces.join("&")
}
