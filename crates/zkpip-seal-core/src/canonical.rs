//! Canonical JSON encoding for deterministic sealing.
//!
//! Seal bodies are encoded with the following rules:
//! - Object keys sorted by Unicode code point, arrays kept in order
//! - No whitespace anywhere
//! - Strings escaped exactly as `JSON.stringify` does
//! - Numbers rendered as ECMAScript `Number.prototype.toString` renders them
//!
//! **CRITICAL**: This encoding is FROZEN. Changes break every existing URN and
//! signature.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::capture::capture_value;
use crate::error::CanonicalError;

/// Maximum container nesting accepted by the canonicalizer.
pub const MAX_DEPTH: usize = 256;

/// Bytes produced exclusively by [`canonicalize`].
///
/// The inner buffer is private: anything that hashes or signs seal content
/// takes `&CanonicalBytes`, so there is no way to feed it bytes that skipped
/// canonicalization.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// View as UTF-8 text. Canonical output is always valid UTF-8.
    pub fn as_str(&self) -> &str {
        // Built only from `&str` fragments and ASCII punctuation.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for CanonicalBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalBytes({})", self.as_str())
    }
}

impl fmt::Display for CanonicalBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Canonicalize a JSON value.
///
/// Key insertion order never influences the output; two values that are equal
/// as JSON produce identical bytes.
pub fn canonicalize(value: &Value) -> Result<CanonicalBytes, CanonicalError> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    write_value(value, &mut out, &mut path)?;
    Ok(CanonicalBytes(out))
}

/// Canonicalize any serializable value.
///
/// Unlike `serde_json::to_value`, non-finite floats and non-string map keys
/// are rejected with the path of the offending field instead of being coerced.
pub fn canonicalize_serializable<T: Serialize + ?Sized>(
    value: &T,
) -> Result<CanonicalBytes, CanonicalError> {
    let captured = capture_value(value)?;
    canonicalize(&captured)
}

/// One step of a path into a JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Key(String),
    Index(usize),
}

/// Render a path JSONPath-style: `$`, `$.a.b[2]`, `$["odd key"]`.
pub(crate) fn render_path(path: &[Segment]) -> String {
    let mut out = String::from("$");
    for segment in path {
        match segment {
            Segment::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
            Segment::Key(key) if is_plain_identifier(key) => {
                out.push('.');
                out.push_str(key);
            }
            Segment::Key(key) => {
                let mut quoted = Vec::new();
                write_string(key, &mut quoted);
                out.push('[');
                out.push_str(&String::from_utf8_lossy(&quoted));
                out.push(']');
            }
        }
    }
    out
}

fn is_plain_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn write_value(
    value: &Value,
    out: &mut Vec<u8>,
    path: &mut Vec<Segment>,
) -> Result<(), CanonicalError> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => write_number(n, out),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            check_depth(path)?;
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                path.push(Segment::Index(i));
                write_value(item, out, path)?;
                path.pop();
            }
            out.push(b']');
        }
        Value::Object(map) => {
            check_depth(path)?;
            // serde_json may be built with `preserve_order`; never rely on map order.
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(key, out);
                out.push(b':');
                path.push(Segment::Key(key.clone()));
                write_value(item, out, path)?;
                path.pop();
            }
            out.push(b'}');
        }
    }
    Ok(())
}

fn check_depth(path: &[Segment]) -> Result<(), CanonicalError> {
    if path.len() >= MAX_DEPTH {
        return Err(CanonicalError::DepthExceeded {
            path: render_path(path),
            limit: MAX_DEPTH,
        });
    }
    Ok(())
}

fn write_number(n: &serde_json::Number, out: &mut Vec<u8>) {
    if let Some(i) = n.as_i64() {
        out.extend_from_slice(i.to_string().as_bytes());
    } else if let Some(u) = n.as_u64() {
        out.extend_from_slice(u.to_string().as_bytes());
    } else if let Some(f) = n.as_f64() {
        out.extend_from_slice(format_float(f).as_bytes());
    } else {
        // arbitrary_precision numbers that fit no primitive
        out.extend_from_slice(n.to_string().as_bytes());
    }
}

/// Render a finite float the way ECMAScript `Number.prototype.toString` does.
pub(crate) fn format_float(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let sign = if f < 0.0 { "-" } else { "" };

    // `{:e}` yields the shortest round-trip digits: "1.2345e-7"
    let sci = format!("{:e}", f.abs());
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return format!("{sign}{}", f.abs());
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return format!("{sign}{}", f.abs());
    };

    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        format!("{int_part}.{frac_part}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let e = n - 1;
        let e = if e >= 0 { format!("+{e}") } else { e.to_string() };
        if k == 1 {
            format!("{digits}e{e}")
        } else {
            let (lead, rest) = digits.split_at(1);
            format!("{lead}.{rest}e{e}")
        }
    };

    format!("{sign}{body}")
}

/// Escape a string exactly as `JSON.stringify` does.
fn write_string(s: &str, out: &mut Vec<u8>) {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    out.push(b'"');
    let mut buf = [0u8; 4];
    for ch in s.chars() {
        match ch {
            '"' => out.extend_from_slice(b"\\\""),
            '\\' => out.extend_from_slice(b"\\\\"),
            '\u{08}' => out.extend_from_slice(b"\\b"),
            '\u{0c}' => out.extend_from_slice(b"\\f"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            '\t' => out.extend_from_slice(b"\\t"),
            c if (c as u32) < 0x20 => {
                let b = c as u8;
                out.extend_from_slice(b"\\u00");
                out.push(HEX[(b >> 4) as usize]);
                out.push(HEX[(b & 0x0f) as usize]);
            }
            c => out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes()),
        }
    }
    out.push(b'"');
}
