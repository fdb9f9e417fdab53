//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

/// Represents an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target exactly as sent, query string included
    pub target: String,
    /// The path component of the target, used for routing
    pub path: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers
    pub headers: HashMap<String, String>,
    /// The request body
    pub body: Vec<u8>,
    /// Address of the peer, when the request came off a socket
    pub remote_addr: Option<SocketAddr>,
}

impl HttpRequest {
    /// Create a new HTTP request with an empty body.
    ///
    /// The query string, if any, is cut off the target to form `path`.
    pub fn new(method: Method, target: String, version: HttpVersion, headers: HashMap<String, String>) -> Self {
        let path = match target.split_once('?') {
            Some((path, _)) => path.to_string(),
            None => target.clone(),
        };

        Self {
            method,
            target,
            path,
            version,
            headers,
            body: Vec::new(),
            remote_addr: None,
        }
    }

    /// Create a new HTTP request with a body.
    pub fn with_body(method: Method, target: String, version: HttpVersion, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        let mut request = Self::new(method, target, version, headers);
        request.body = body;
        request
    }

    /// Get a header value, matching the name case-insensitively.
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                Some(v)
            } else {
                None
            }
        })
    }
}

/// Locate the blank line ending the header section.
///
/// Returns the length of the head (up to and including the last header line's
/// `\n`) and the offset at which the body starts. Bare `\n` line endings are
/// tolerated.
fn find_head_end(input: &[u8]) -> Option<(usize, usize)> {
    input.iter().enumerate().find_map(|(i, &byte)| {
        if byte != b'\n' {
            return None;
        }
        let rest = &input[i + 1..];
        if rest.starts_with(b"\r\n") {
            Some((i + 1, i + 3))
        } else if rest.starts_with(b"\n") {
            Some((i + 1, i + 2))
        } else {
            None
        }
    })
}

fn parse_request_line(line: &str) -> Result<(Method, String, HttpVersion), Error> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(line.to_string()));
    }

    let method = Method::from_str(parts[0])?;

    let target = parts[1];
    if !target.starts_with('/') && target != "*" {
        return Err(Error::InvalidPath);
    }

    let version = HttpVersion::from_str(parts[2])?;

    Ok((method, target.to_string(), version))
}

fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> Result<HashMap<String, String>, Error> {
    let mut headers = HashMap::new();
    for line in lines {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            break;
        }

        let (name, value) = line.split_once(':').ok_or(Error::InvalidHeaderFormat)?;
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }
    Ok(headers)
}

/// Parse an HTTP request from a byte slice.
///
/// The request line is validated as soon as it is complete, so garbage is
/// rejected without waiting for the rest of the head. [`Error::Incomplete`]
/// means the input is a valid prefix and more bytes should be read.
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    if input.is_empty() {
        return Err(Error::EmptyRequest);
    }

    let line_end = input.iter().position(|&b| b == b'\n').ok_or(Error::Incomplete)?;
    let request_line = std::str::from_utf8(&input[..line_end])
        .map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))?
        .trim_end_matches('\r');
    let (method, target, version) = parse_request_line(request_line)?;

    let (head_len, body_start) = find_head_end(input).ok_or(Error::Incomplete)?;
    let head = std::str::from_utf8(&input[line_end + 1..head_len])
        .map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))?;
    let headers = parse_headers(head.split('\n'))?;

    if version.requires_host() && !headers.keys().any(|k| k.eq_ignore_ascii_case("Host")) {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    let content_length = match headers.iter().find(|(k, _)| k.eq_ignore_ascii_case("Content-Length")) {
        Some((_, value)) => value
            .parse::<usize>()
            .map_err(|_| Error::InvalidContentLength(value.clone()))?,
        None => 0,
    };

    let body_end = body_start
        .checked_add(content_length)
        .ok_or_else(|| Error::InvalidContentLength(content_length.to_string()))?;
    if input.len() < body_end {
        return Err(Error::Incomplete);
    }

    let body = input[body_start..body_end].to_vec();
    Ok(HttpRequest::with_body(method, target, version, headers, body))
}
