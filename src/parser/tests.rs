//! Tests for the HTTP parser.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use serde::Deserialize;

    use crate::parser::{HttpRequest, Method, HttpVersion, Error, parse_request, request_complete};

    #[test]
    fn test_parse_simple_get_request() {
        let request = b"GET /recipes HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::GET);
        assert_eq!(result.path, "/recipes");
        assert_eq!(result.version, HttpVersion::Http11);
        assert_eq!(result.headers.get("Host").unwrap(), "localhost");
        assert!(result.body.is_empty());
    }

    #[test]
    fn test_parse_post_with_body() {
        let body = r#"{"name":"bread","ingredients":["water","dough"]}"#;
        let request = format!(
            "POST /recipes HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );

        let result = parse_request(request.as_bytes()).unwrap();
        assert_eq!(result.method, Method::POST);
        assert_eq!(result.path, "/recipes");
        assert_eq!(result.body, body.as_bytes());
        assert!(result.is_json());
    }

    #[test]
    fn test_body_truncated_to_content_length() {
        let request = b"PUT /recipes/1 HTTP/1.1\r\nHost: localhost\r\nContent-Length: 2\r\n\r\n{}trailing";
        let result = parse_request(request).unwrap();
        assert_eq!(result.body, b"{}");
    }

    #[test]
    fn test_incomplete_body() {
        let request = b"POST /recipes HTTP/1.1\r\nHost: localhost\r\nContent-Length: 10\r\n\r\n{}";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::IncompleteBody { expected: 10, received: 2 })));
    }

    #[test]
    fn test_invalid_content_length() {
        let request = b"POST /recipes HTTP/1.1\r\nHost: localhost\r\nContent-Length: ten\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidContentLength(ref v)) if v == "ten"));
    }

    #[test]
    fn test_request_complete() {
        assert!(!request_complete(b"GET /recipes HTTP/1.1\r\nHost: localhost\r\n"));
        assert!(request_complete(b"GET /recipes HTTP/1.1\r\nHost: localhost\r\n\r\n"));
        assert!(!request_complete(b"POST /recipes HTTP/1.1\r\nHost: x\r\nContent-Length: 4\r\n\r\n{}"));
        assert!(request_complete(b"POST /recipes HTTP/1.1\r\nHost: x\r\ncontent-length: 2\r\n\r\n{}"));
        // Let the parser report the bad header instead of waiting forever.
        assert!(request_complete(b"POST /recipes HTTP/1.1\r\nHost: x\r\nContent-Length: ?\r\n\r\n"));
    }

    #[test]
    fn test_query_string_is_stripped_from_path() {
        let request = b"GET /recipes/7?sort=name&flag HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.path, "/recipes/7");
    }

    #[test]
    fn test_case_insensitive_headers() {
        let request = b"GET /recipes HTTP/1.1\r\nhost: localhost\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert!(result.has_header("host"));
        assert!(result.has_header("HOST"));
        assert!(result.has_header("Host"));
    }

    #[test]
    fn test_missing_host_header() {
        let request = b"GET /recipes HTTP/1.1\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MissingHeader(ref h)) if h == "Host"));
    }

    #[test]
    fn test_http10_without_host() {
        let request = b"GET /recipes HTTP/1.0\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.version, HttpVersion::Http10);
        assert!(result.headers.is_empty());
    }

    #[test]
    fn test_invalid_method() {
        let request = b"FETCH /recipes HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidMethod(ref m)) if m == "FETCH"));
    }

    #[test]
    fn test_invalid_http_version() {
        let request = b"GET /recipes HTTP/9.9\r\nHost: localhost\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidVersion(ref v)) if v == "HTTP/9.9"));
    }

    #[test]
    fn test_relative_path_rejected() {
        let request = b"GET recipes HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidPath)));
    }

    #[test]
    fn test_invalid_header_format() {
        let request = b"GET /recipes HTTP/1.1\r\nInvalidHeader\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidHeaderFormat)));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(parse_request(b""), Err(Error::EmptyRequest)));
        assert!(matches!(parse_request(b"\r\n\r\n"), Err(Error::EmptyRequest)));
    }

    #[test]
    fn test_incomplete_request_line() {
        let result = parse_request(b"GET\r\n");
        assert!(matches!(result, Err(Error::MalformedRequestLine(_))));
    }

    #[test]
    fn test_malformed_utf8_in_head() {
        let request = b"GET /recipes HTTP/1.1\r\nHost: localhost\r\nX-Test: \xFF\xFF\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MalformedRequestLine(ref s)) if s == "Invalid UTF-8"));
    }

    #[test]
    fn test_mixed_line_endings() {
        let request = b"DELETE /recipes/7 HTTP/1.1\r\nHost: localhost\nUser-Agent: test\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::DELETE);
        assert_eq!(result.path, "/recipes/7");
        assert_eq!(result.headers.get("User-Agent").unwrap(), "test");
    }

    #[test]
    fn test_display() {
        assert_eq!(Method::DELETE.to_string(), "DELETE");
        assert_eq!(Method::OPTIONS.to_string(), "OPTIONS");
        assert_eq!(HttpVersion::Http10.to_string(), "HTTP/1.0");
        assert_eq!(HttpVersion::Http20.to_string(), "HTTP/2");
    }

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    #[test]
    fn test_json_requires_content_type() {
        let mut headers = HashMap::new();
        headers.insert("Host".to_string(), "localhost".to_string());
        let body = br#"{"name":"rice"}"#.to_vec();

        let plain = HttpRequest::with_body(Method::POST, "/recipes".to_string(), HttpVersion::Http11, headers.clone(), body.clone());
        let result: Result<Named, _> = plain.json();
        assert!(matches!(result, Err(Error::MissingHeader(_))));

        headers.insert("content-type".to_string(), "application/json; charset=utf-8".to_string());
        let json = HttpRequest::with_body(Method::POST, "/recipes".to_string(), HttpVersion::Http11, headers.clone(), body);
        let named: Named = json.json().unwrap();
        assert_eq!(named.name, "rice");

        let broken = HttpRequest::with_body(Method::POST, "/recipes".to_string(), HttpVersion::Http11, headers, b"{\"name\":".to_vec());
        let result: Result<Named, _> = broken.json();
        assert!(matches!(result, Err(Error::JsonError(_))));
    }

    #[test]
    fn test_json_content_type_is_case_insensitive() {
        let json_with = |content_type: &str| {
            let mut headers = HashMap::new();
            headers.insert("Host".to_string(), "localhost".to_string());
            headers.insert("Content-Type".to_string(), content_type.to_string());
            HttpRequest::new(Method::POST, "/recipes".to_string(), HttpVersion::Http11, headers).is_json()
        };

        assert!(json_with("application/json"));
        assert!(json_with("Application/JSON"));
        assert!(json_with("APPLICATION/JSON ; charset=UTF-8"));
        assert!(!json_with("application/jsonl"));
        assert!(!json_with("text/plain"));
    }
}
