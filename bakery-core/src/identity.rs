//! Chart reference parsing.
//!
//! A reference looks like `https://host/grapher/<slug>?<query>#<fragment>`.
//! Only the last path segment and the query are used. The query is rewritten
//! into a canonical form so that equivalent variants hash identically:
//!
//! 1. split on `&`, dropping empty pairs and pairs with an empty name
//! 2. percent-decode names and values to raw bytes (`+` decodes to a space)
//! 3. stable-sort by name bytes, so repeated names keep their relative order
//! 4. re-encode every byte outside the unreserved set as `%XX`
//!
//! Path segments decode `%XX` only; a `+` in the path stays literal.
//! 5. join with `&` and prefix `?`

use crate::error::ReferenceError;
use crate::types::ChartReference;

/// Resolve a reference string into its slug and canonical variant.
pub fn resolve(reference: &str) -> Result<ChartReference, ReferenceError> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(ReferenceError::Empty);
    }

    let without_fragment = trimmed.split_once('#').map_or(trimmed, |(head, _)| head);
    let (address, query) = without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""));

    let slug = last_segment(path_of(address))
        .map(decode_segment)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ReferenceError::MissingSlug {
            reference: reference.to_string(),
        })?;

    Ok(ChartReference {
        source: reference.to_string(),
        slug,
        variant: canonical_query(query),
    })
}

/// Canonical form of a raw query component (without the leading `?`).
///
/// Returns an empty string when no named parameter remains.
pub fn canonical_query(query: &str) -> String {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut params: Vec<(Vec<u8>, Vec<u8>)> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(name, true), percent_decode(value, true))
        })
        .filter(|(name, _)| !name.is_empty())
        .collect();
    if params.is_empty() {
        return String::new();
    }

    params.sort_by(|a, b| a.0.cmp(&b.0));
    let joined = params
        .iter()
        .map(|(name, value)| format!("{}={}", percent_encode(name), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("?{joined}")
}

/// Strip `scheme://authority` when present.
fn path_of(address: &str) -> &str {
    match address.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |idx| &rest[idx..]),
        None => address,
    }
}

fn last_segment(path: &str) -> Option<&str> {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

/// Decode a path segment. Invalid UTF-8 keeps the segment as written.
fn decode_segment(segment: &str) -> String {
    String::from_utf8(percent_decode(segment, false)).unwrap_or_else(|_| segment.to_string())
}

fn percent_decode(input: &str, plus_as_space: bool) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    out
}

fn percent_encode(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len());
    for &byte in input {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
