/// Raw HTTP/1.x request model with parameter-level editing
use super::parameter::{join_pairs, parse_pair, split_pairs, Gap, Parameter, ParameterSource};
use crate::error::ParseError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Form-encoded body; its content is exactly the BODY parameters
    Form,
    /// Opaque body, never split into parameters
    Raw(String),
}

/// Parsed HTTP request
///
/// Editing never touches the raw bytes directly: query string, `Cookie`
/// header and form body are rebuilt from the parameter list by [`render`].
///
/// [`render`]: HttpRequest::render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: String,
    path: String,
    version: String,
    headers: Vec<(String, String)>,
    parameters: Vec<Parameter>,
    gaps: Vec<Gap>,
    /// Target ended in a bare `?`
    empty_query: bool,
    body: Body,
}

impl HttpRequest {
    /// Create a request without headers, parameters or body
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            version: "HTTP/1.1".to_string(),
            headers: Vec::new(),
            parameters: Vec::new(),
            gaps: Vec::new(),
            empty_query: false,
            body: Body::Raw(String::new()),
        }
    }

    /// Parse a raw request as captured by a proxy
    ///
    /// Parameters are ordered query first, then body, then cookies.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let (head, body) = split_head(input);
        let mut lines = head.lines();

        let request_line = lines.next().unwrap_or_default();
        let parts: Vec<&str> = request_line.split_whitespace().collect();
        let [method, target, version] = parts.as_slice() else {
            return Err(ParseError::MalformedRequestLine(request_line.to_string()));
        };

        let mut headers = Vec::new();
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ParseError::MalformedHeader(line.to_string()))?;
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (*target, ""),
        };
        let empty_query = target.ends_with('?') && query.is_empty();

        let (mut parameters, mut gaps) = split_pairs(query, ParameterSource::Query);

        let is_form = headers.iter().any(|(name, value)| {
            name.eq_ignore_ascii_case("content-type")
                && value.to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE)
        });
        let body = if is_form {
            let (body_params, body_gaps) = split_pairs(body, ParameterSource::Body);
            parameters.extend(body_params);
            gaps.extend(body_gaps);
            Body::Form
        } else {
            Body::Raw(body.to_string())
        };

        for (_, value) in headers.iter().filter(|(name, _)| is_cookie(name)) {
            parameters.extend(split_cookies(value));
        }

        Ok(Self {
            method: method.to_string(),
            path: path.to_string(),
            version: version.to_string(),
            headers,
            parameters,
            gaps,
            empty_query,
            body,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request target without the query string
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Copy of this request without any parameter equal to one in `removed`
    pub fn with_removed_parameters(&self, removed: &[Parameter]) -> Self {
        let mut request = self.clone();
        request.parameters.retain(|p| !removed.contains(p));
        request
    }

    /// Copy of this request with `added` appended to the parameter list
    ///
    /// Adding a BODY parameter to a request with a raw body turns the body
    /// into a form body; the previous raw content is split into pairs first.
    pub fn with_added_parameters(&self, added: impl IntoIterator<Item = Parameter>) -> Self {
        let mut request = self.clone();
        for param in added {
            if param.source() == ParameterSource::Body {
                request.ensure_form_body();
            }
            request.parameters.push(param);
        }
        request
    }

    fn ensure_form_body(&mut self) {
        if let Body::Raw(raw) = &self.body {
            let (existing, gaps) = split_pairs(raw, ParameterSource::Body);
            self.parameters.extend(existing);
            self.gaps.extend(gaps);
            self.body = Body::Form;
            if self.header("content-type").is_none() {
                self.headers
                    .push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
            }
        }
    }

    fn params_of(&self, source: ParameterSource) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(move |p| p.source() == source)
    }

    /// `&`-joined parameters of `source`, empty segments restored
    fn joined(&self, source: ParameterSource) -> String {
        let params: Vec<&Parameter> = self.params_of(source).collect();
        let gaps: Vec<Gap> = self.gaps.iter().filter(|g| g.source == source).cloned().collect();
        join_pairs(&params, &gaps)
    }

    /// Request target including the rebuilt query string
    pub fn target(&self) -> String {
        let query = self.joined(ParameterSource::Query);
        if query.is_empty() && !self.empty_query {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, query)
        }
    }

    /// Body text as it will be sent
    pub fn body_text(&self) -> String {
        match &self.body {
            Body::Form => self.joined(ParameterSource::Body),
            Body::Raw(raw) => raw.clone(),
        }
    }

    /// Serialize back to a raw request with CRLF line endings
    pub fn render(&self) -> String {
        let body = self.body_text();
        let cookies = self
            .params_of(ParameterSource::Other)
            .map(Parameter::to_wire)
            .collect::<Vec<_>>()
            .join("; ");

        let mut out = format!("{} {} {}\r\n", self.method, self.target(), self.version);
        let mut cookie_written = false;
        let mut length_written = false;

        for (name, value) in &self.headers {
            if is_cookie(name) {
                if !cookie_written && !cookies.is_empty() {
                    out.push_str(&format!("{}: {}\r\n", name, cookies));
                }
                cookie_written = true;
            } else if name.eq_ignore_ascii_case("content-length") && self.body == Body::Form {
                out.push_str(&format!("{}: {}\r\n", name, body.len()));
                length_written = true;
            } else {
                out.push_str(&format!("{}: {}\r\n", name, value));
            }
        }

        if !cookie_written && !cookies.is_empty() {
            out.push_str(&format!("Cookie: {}\r\n", cookies));
        }
        if !length_written && self.body == Body::Form && !body.is_empty() {
            out.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }

        out.push_str("\r\n");
        out.push_str(&body);
        out
    }
}

fn is_cookie(name: &str) -> bool {
    name.eq_ignore_ascii_case("cookie")
}

fn split_cookies(value: &str) -> Vec<Parameter> {
    value
        .split(';')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| parse_pair(c, ParameterSource::Other))
        .collect()
}

/// Split at the first blank line, accepting both CRLF and LF
fn split_head(input: &str) -> (&str, &str) {
    let crlf = input.find("\r\n\r\n").map(|i| (i, 4));
    let lf = input.find("\n\n").map(|i| (i, 2));

    let split = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };

    match split {
        Some((index, len)) => (&input[..index], &input[index + len..]),
        None => (input, ""),
    }
}
