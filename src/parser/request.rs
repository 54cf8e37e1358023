//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::str::FromStr;
use serde::de::DeserializeOwned;

use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

/// Represents an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request path, without the query string
    pub path: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers
    pub headers: HashMap<String, String>,
    /// The request body
    pub body: Vec<u8>,
    /// Values captured by the router from `{name}` segments
    pub path_params: HashMap<String, String>,
}

impl HttpRequest {
    /// Create a new HTTP request with an empty body.
    ///
    /// `target` is the raw request target; anything from `?` on is dropped.
    pub fn new(method: Method, target: String, version: HttpVersion, headers: HashMap<String, String>) -> Self {
        let path = match target.split_once('?') {
            Some((path, _)) => path.to_string(),
            None => target,
        };

        Self {
            method,
            path,
            version,
            headers,
            body: Vec::new(),
            path_params: HashMap::new(),
        }
    }

    /// Create a new HTTP request with a body.
    pub fn with_body(method: Method, target: String, version: HttpVersion, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        let mut request = Self::new(method, target, version, headers);
        request.body = body;
        request
    }

    /// Get a header value (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                Some(v)
            } else {
                None
            }
        })
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// Get a value captured from the route pattern.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Parse the request body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingHeader`] when the request is not declared as
    /// `application/json`, and [`Error::JsonError`] when the body does not
    /// deserialize into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        if !self.is_json() {
            return Err(Error::MissingHeader("Content-Type: application/json".to_string()));
        }

        let json = serde_json::from_slice(&self.body)?;
        Ok(json)
    }

    /// Check if the request has a JSON body.
    ///
    /// Media types are case-insensitive; parameters such as `charset` are
    /// ignored.
    pub fn is_json(&self) -> bool {
        self.get_header("Content-Type").is_some_and(|content_type| {
            let media_type = content_type.split(';').next().unwrap_or_default();
            media_type.trim().eq_ignore_ascii_case("application/json")
        })
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Split raw bytes into the head (request line + headers) and whatever follows
/// the blank line. Input without a blank line is all head.
fn split_head(input: &[u8]) -> (&[u8], Option<&[u8]>) {
    let crlf = find(input, b"\r\n\r\n").map(|pos| (pos, 4));
    let lf = find(input, b"\n\n").map(|pos| (pos, 2));

    let boundary = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };

    match boundary {
        Some((pos, len)) => (&input[..pos], Some(&input[pos + len..])),
        None => (input, None),
    }
}

fn declared_length(head: &str) -> Option<&str> {
    head.lines().skip(1).find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim().eq_ignore_ascii_case("Content-Length").then(|| value.trim())
    })
}

/// Check whether `input` holds a complete request: the blank line ending the
/// headers, plus as many body bytes as `Content-Length` declares.
///
/// Used by the server to decide whether to keep reading from a socket.
/// Malformed heads count as complete so the parser can report the error.
pub fn request_complete(input: &[u8]) -> bool {
    let (head, rest) = split_head(input);
    let Some(rest) = rest else {
        return false;
    };

    let Ok(head) = std::str::from_utf8(head) else {
        return true;
    };

    match declared_length(head).map(str::parse::<usize>) {
        Some(Ok(expected)) => rest.len() >= expected,
        Some(Err(_)) | None => true,
    }
}

/// Parse an HTTP request from a byte slice.
///
/// # Errors
///
/// Returns a parser [`Error`] describing the first problem found in the
/// request line, headers or declared body.
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    if input.is_empty() {
        return Err(Error::EmptyRequest);
    }

    let (head, rest) = split_head(input);
    let head = std::str::from_utf8(head)
        .map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))?;

    let mut lines = head.lines();

    let request_line = match lines.next() {
        Some(line) if !line.trim().is_empty() => line,
        _ => return Err(Error::EmptyRequest),
    };

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    }

    let method = Method::from_str(parts[0])?;

    let target = parts[1].to_string();
    if !target.starts_with('/') {
        return Err(Error::InvalidPath);
    }

    let version = HttpVersion::from_str(parts[2])?;

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }

        let (name, value) = line.split_once(':').ok_or(Error::InvalidHeaderFormat)?;
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }

    if version == HttpVersion::Http11 && !headers.keys().any(|k| k.eq_ignore_ascii_case("Host")) {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    let rest = rest.unwrap_or_default();
    let body = match headers.iter().find(|(k, _)| k.eq_ignore_ascii_case("Content-Length")) {
        Some((_, value)) => {
            let expected: usize = value
                .parse()
                .map_err(|_| Error::InvalidContentLength(value.clone()))?;
            if rest.len() < expected {
                return Err(Error::IncompleteBody { expected, received: rest.len() });
            }
            rest[..expected].to_vec()
        }
        None => rest.to_vec(),
    };

    Ok(HttpRequest::with_body(method, target, version, headers, body))
}
