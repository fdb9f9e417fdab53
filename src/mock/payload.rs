//! Response payloads and their encoding.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::mock::format::Format;

/// A payload that could not be fully encoded.
///
/// `partial` holds whatever the encoder produced before failing; the
/// dispatcher sends it as-is.
#[derive(Debug, Error)]
#[error("{format} encoding failed: {message}")]
pub struct EncodeError {
    pub format: Format,
    pub message: String,
    pub partial: Vec<u8>,
}

/// Type-erased structured value.
trait Encode: Send + Sync {
    fn encode(&self, format: Format) -> Result<Vec<u8>, EncodeError>;
    fn type_name(&self) -> &'static str;
}

struct Structured<T>(T);

impl<T: Serialize + Send + Sync> Encode for Structured<T> {
    fn encode(&self, format: Format) -> Result<Vec<u8>, EncodeError> {
        match format {
            Format::Json => encode_json(&self.0),
            Format::Xml => encode_xml(&self.0, &root_tag::<T>()),
        }
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// The body a mock rule answers with.
///
/// Strings convert into structured payloads (`"world"` is sent as the JSON
/// string `"world"`), byte vectors into raw ones.
#[derive(Clone)]
pub struct Payload {
    kind: Kind,
}

#[derive(Clone)]
enum Kind {
    Raw(Vec<u8>),
    Structured(Arc<dyn Encode>),
}

impl Payload {
    /// A value serialized per the server's format on every request.
    pub fn structured<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self {
            kind: Kind::Structured(Arc::new(Structured(value))),
        }
    }

    /// Bytes written verbatim, whatever the server's format.
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: Kind::Raw(bytes.into()),
        }
    }

    /// An empty raw body.
    pub fn empty() -> Self {
        Self::raw(Vec::new())
    }

    pub fn is_raw(&self) -> bool {
        matches!(self.kind, Kind::Raw(_))
    }

    pub fn as_raw(&self) -> Option<&[u8]> {
        match &self.kind {
            Kind::Raw(bytes) => Some(bytes),
            Kind::Structured(_) => None,
        }
    }

    /// Render the body for `format`.
    pub fn encode(&self, format: Format) -> Result<Vec<u8>, EncodeError> {
        match &self.kind {
            Kind::Raw(bytes) => Ok(bytes.clone()),
            Kind::Structured(value) => value.encode(format),
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Raw(bytes) => f.debug_tuple("Raw").field(&bytes.len()).finish(),
            Kind::Structured(value) => {
                f.debug_tuple("Structured").field(&value.type_name()).finish()
            }
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::raw(bytes)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::structured(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::structured(value)
    }
}

/// Compact JSON followed by a newline.
fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    match serde_json::to_writer(&mut buf, value) {
        Ok(()) => {
            buf.push(b'\n');
            Ok(buf)
        }
        Err(e) => Err(EncodeError {
            format: Format::Json,
            message: e.to_string(),
            partial: buf,
        }),
    }
}

/// XML rooted at the value's serde name.
///
/// Structs and enums name themselves. Bare values such as strings and numbers
/// cannot, so they are wrapped in `fallback_root` instead.
fn encode_xml<T: Serialize + ?Sized>(
    value: &T,
    fallback_root: &str,
) -> Result<Vec<u8>, EncodeError> {
    let mut out = String::new();
    let named = quick_xml::se::to_writer(&mut out, value).map(|_| ());
    let result = match named {
        Err(_) if out.is_empty() => {
            quick_xml::se::to_writer_with_root(&mut out, fallback_root, value).map(|_| ())
        }
        other => other,
    };

    match result {
        Ok(()) => Ok(out.into_bytes()),
        Err(e) => Err(EncodeError {
            format: Format::Xml,
            message: e.to_string(),
            partial: out.into_bytes(),
        }),
    }
}

/// Element name for a value of type `T` that has no serde name of its own.
///
/// `&str` and `String` become `string`; other types use the last path
/// segment of their Rust name, generics stripped (`i32`, `Vec`).
fn root_tag<T: ?Sized>() -> String {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    let base = base.trim_start_matches('&').trim_start_matches("mut ");
    let short = base.rsplit("::").next().unwrap_or(base);

    match short {
        "str" | "String" | "char" => "string".to_string(),
        name if is_xml_name(name) => name.to_string(),
        _ => "value".to_string(),
    }
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_tag_for_strings() {
        assert_eq!(root_tag::<String>(), "string");
        assert_eq!(root_tag::<&str>(), "string");
        assert_eq!(root_tag::<str>(), "string");
    }

    #[test]
    fn test_root_tag_for_other_types() {
        assert_eq!(root_tag::<i32>(), "i32");
        assert_eq!(root_tag::<bool>(), "bool");
        assert_eq!(root_tag::<Vec<u8>>(), "Vec");
        assert_eq!(root_tag::<(u8, u8)>(), "value");
    }

    #[test]
    fn test_is_xml_name() {
        assert!(is_xml_name("testStruct"));
        assert!(is_xml_name("_private"));
        assert!(!is_xml_name("1st"));
        assert!(!is_xml_name("[u8]"));
        assert!(!is_xml_name(""));
    }

    #[test]
    fn test_payload_debug() {
        assert_eq!(format!("{:?}", Payload::raw(vec![1, 2, 3])), "Raw(3)");
        assert_eq!(
            format!("{:?}", Payload::from("world")),
            "Structured(\"alloc::string::String\")"
        );
    }
}
