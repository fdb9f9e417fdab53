//! Tests for the HTTP parser.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::parser::{HttpRequest, Method, HttpVersion, Error, parse_request};

    #[test]
    fn test_parse_simple_get_request() {
        let request = b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::GET);
        assert_eq!(result.path, "/hello");
        assert_eq!(result.target, "/hello");
        assert_eq!(result.version, HttpVersion::Http11);
        assert_eq!(result.headers.get("Host").unwrap(), "example.com");
        assert!(result.body.is_empty());
        assert!(result.remote_addr.is_none());
    }

    #[test]
    fn test_case_insensitive_headers() {
        let request = b"GET /hello HTTP/1.1\r\nhost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.get_header("HOST").unwrap(), "example.com");
        assert_eq!(result.get_header("Host").unwrap(), "example.com");
    }

    #[test]
    fn test_missing_host_header() {
        let request = b"GET /hello HTTP/1.1\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MissingHeader(ref h)) if h == "Host"));
    }

    #[test]
    fn test_http10_without_host() {
        let request = b"GET /hello HTTP/1.0\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.version, HttpVersion::Http10);
        assert!(result.headers.is_empty());
    }

    #[test]
    fn test_invalid_method() {
        let request = b"BREW /pot HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidMethod(ref m)) if m == "BREW"));
    }

    #[test]
    fn test_lowercase_method_is_rejected() {
        let request = b"get /hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
        assert!(matches!(parse_request(request), Err(Error::InvalidMethod(_))));
    }

    #[test]
    fn test_invalid_http_version() {
        let request = b"GET /hello HTTP/9.9\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidVersion(ref v)) if v == "HTTP/9.9"));
    }

    #[test]
    fn test_invalid_target() {
        let request = b"GET hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
        assert!(matches!(parse_request(request), Err(Error::InvalidPath)));
    }

    #[test]
    fn test_invalid_header_format() {
        let request = b"GET /hello HTTP/1.1\r\nInvalidHeader\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidHeaderFormat)));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(parse_request(b""), Err(Error::EmptyRequest)));
    }

    #[test]
    fn test_malformed_request_line() {
        let request = b"GET\r\n";
        assert!(matches!(parse_request(request), Err(Error::MalformedRequestLine(_))));
    }

    #[test]
    fn test_missing_target() {
        let request = b"GET  HTTP/1.1\r\nHost: example.com\r\n\r\n";
        assert!(matches!(parse_request(request), Err(Error::MalformedRequestLine(_))));
    }

    #[test]
    fn test_partial_request_line_is_incomplete() {
        assert!(matches!(parse_request(b"GET /hel"), Err(Error::Incomplete)));
    }

    #[test]
    fn test_partial_head_is_incomplete() {
        let request = b"GET /hello HTTP/1.1\r\nHost: example.com\r\n";
        assert!(matches!(parse_request(request), Err(Error::Incomplete)));
    }

    #[test]
    fn test_request_line_rejected_before_head_completes() {
        // A bad request line fails fast, even with the head still open.
        let request = b"NOPE / HTTP/1.1\r\nHost: exa";
        assert!(matches!(parse_request(request), Err(Error::InvalidMethod(_))));
    }

    #[test]
    fn test_body_read_by_content_length() {
        let request = b"POST /hello HTTP/1.1\r\nHost: example.com\r\nContent-Length: 5\r\n\r\nhello";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::POST);
        assert_eq!(result.body, b"hello");
    }

    #[test]
    fn test_short_body_is_incomplete() {
        let request = b"POST /hello HTTP/1.1\r\nHost: example.com\r\nContent-Length: 10\r\n\r\nhello";
        assert!(matches!(parse_request(request), Err(Error::Incomplete)));
    }

    #[test]
    fn test_bytes_past_content_length_are_ignored() {
        let request = b"POST /hello HTTP/1.1\r\nHost: example.com\r\ncontent-length: 2\r\n\r\nhello";
        let result = parse_request(request).unwrap();
        assert_eq!(result.body, b"he");
    }

    #[test]
    fn test_invalid_content_length() {
        let request = b"POST /hello HTTP/1.1\r\nHost: example.com\r\nContent-Length: lots\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidContentLength(ref v)) if v == "lots"));
    }

    #[test]
    fn test_binary_body_is_kept_verbatim() {
        let mut request = b"PUT /blob HTTP/1.1\r\nHost: example.com\r\nContent-Length: 3\r\n\r\n".to_vec();
        request.extend_from_slice(&[0xFF, 0x00, 0xFE]);
        let result = parse_request(&request).unwrap();
        assert_eq!(result.body, vec![0xFF, 0x00, 0xFE]);
    }

    #[test]
    fn test_all_methods() {
        let methods = [
            ("GET", Method::GET),
            ("POST", Method::POST),
            ("PUT", Method::PUT),
            ("DELETE", Method::DELETE),
            ("HEAD", Method::HEAD),
            ("OPTIONS", Method::OPTIONS),
            ("PATCH", Method::PATCH),
        ];

        for (token, expected) in methods {
            let request = format!("{token} /hello HTTP/1.1\r\nHost: example.com\r\n\r\n");
            let result = parse_request(request.as_bytes()).unwrap();
            assert_eq!(result.method, expected);
            assert_eq!(expected.to_string(), token);
        }
    }

    #[test]
    fn test_headers_with_multiple_colons() {
        let request = b"GET /hello HTTP/1.1\r\nHost: localhost:8080\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.get("Host").unwrap(), "localhost:8080");
    }

    #[test]
    fn test_mixed_line_endings() {
        let request = b"GET /hello HTTP/1.1\nHost: example.com\r\nUser-Agent: test\n\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.path, "/hello");
        assert_eq!(result.headers.get("Host").unwrap(), "example.com");
        assert_eq!(result.headers.get("User-Agent").unwrap(), "test");
    }

    #[test]
    fn test_path_excludes_query_string() {
        let request = b"GET /search?q=test&flag&empty= HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.path, "/search");
        assert_eq!(result.target, "/search?q=test&flag&empty=");
    }

    #[test]
    fn test_malformed_utf8_in_headers() {
        let request = b"GET /hello HTTP/1.1\r\nHost: example.com\r\nX-Test: \xFF\xFF\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MalformedRequestLine(ref s)) if s == "Invalid UTF-8"));
    }

    #[test]
    fn test_request_constructors() {
        let mut headers = HashMap::new();
        headers.insert("Host".to_string(), "example.com".to_string());

        let request = HttpRequest::with_body(
            Method::POST,
            "/api?x=1".to_string(),
            HttpVersion::Http11,
            headers,
            b"{}".to_vec(),
        );
        assert_eq!(request.path, "/api");
        assert_eq!(request.target, "/api?x=1");
        assert_eq!(request.body, b"{}");
        assert!(request.get_header("X-Test").is_none());
    }
}
