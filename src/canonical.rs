//! Canonicalization functionality for AWS SigV2 signature generation.
//!
//! This builds the SigV2 string to sign:
//!
//! ```text
//! StringToSign = HTTP-Verb + "\n" +
//!                Content-MD5 + "\n" +
//!                Content-Type + "\n" +
//!                Date + "\n" +
//!                CanonicalizedAmzHeaders +
//!                CanonicalizedResource
//! ```
//!
//! **Stability of this module is not guaranteed except for items exposed at the crate root**.
//! The helper functions are subject to change in minor/patch versions. They are exposed (with the
//! `unstable` feature) for testing purposes only.

use {
    crate::{constants::*, AddressingStyle, SigningError},
    encoding::{
        all::ISO_8859_1,
        types::{DecoderTrap, Encoding},
    },
    http::{
        header::{HeaderMap, HeaderValue, CONTENT_TYPE, HOST},
        request::Parts,
    },
    log::trace,
    qualifier_attr::qualifiers,
    std::{
        collections::BTreeSet,
        fmt::{Display, Formatter, Result as FmtResult},
        str::from_utf8,
    },
};

/// Uppercase hex digits.
const HEX_DIGITS_UPPER: [u8; 16] =
    [b'0', b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9', b'A', b'B', b'C', b'D', b'E', b'F'];

/// The AWS SigV2 string to sign for a request.
///
/// This is a pure function of the request method, headers, host, path, and query at the time it
/// is built. Any change to those after the signature is computed invalidates the signature.
///
/// Header values are kept as the raw bytes that are transmitted; the signature is computed over
/// [`StringToSign::to_bytes`]. The `Display` implementation is meant for logging only.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StringToSign {
    /// The HTTP method for the request (e.g., "GET", "PUT", etc.)
    method: String,

    /// The `Content-MD5` header, or empty.
    content_md5: Vec<u8>,

    /// The `Content-Type` header, or empty.
    content_type: Vec<u8>,

    /// The `Date` header, or empty. `x-amz-date` is carried in the AMZ headers instead.
    date: Vec<u8>,

    /// Sorted `name:value\n` lines for every `x-amz-*` header; empty if there are none.
    canonicalized_amz_headers: Vec<u8>,

    /// `/bucket/path[?subresource]`.
    canonicalized_resource: String,
}

impl StringToSign {
    /// Build the string to sign from the request parts.
    ///
    /// The path is expected to have been normalized already (see
    /// [`prepare_request`][crate::prepare_request]); literal and encoded spaces are nevertheless
    /// rendered as `+` here so the two stages always agree.
    ///
    /// # Errors
    /// Returns [`SigningError::MalformedHost`] if virtual-hosted addressing is in effect and the
    /// request has no host with a bucket label.
    pub fn from_parts(parts: &Parts, addressing: AddressingStyle) -> Result<Self, SigningError> {
        let bucket = match addressing {
            AddressingStyle::VirtualHosted => {
                let host = request_host(parts)?.ok_or_else(|| {
                    SigningError::MalformedHost("Request has no Host header or URI authority".to_string())
                })?;
                Some(bucket_from_host(&host)?.to_string())
            }
            AddressingStyle::Path => None,
        };

        let path = canonical_path(parts.uri.path());
        let query = parts.uri.query().unwrap_or("");

        let result = Self {
            method: parts.method.as_str().to_string(),
            content_md5: header_bytes(&parts.headers, HEADER_CONTENT_MD5).to_vec(),
            content_type: header_bytes(&parts.headers, CONTENT_TYPE.as_str()).to_vec(),
            date: header_bytes(&parts.headers, HEADER_DATE).to_vec(),
            canonicalized_amz_headers: canonicalize_amz_headers(&parts.headers),
            canonicalized_resource: canonicalize_resource(bucket.as_deref(), &path, query),
        };

        trace!("Created string to sign: {:?}", result.to_string());
        Ok(result)
    }

    /// Retrieve the HTTP method.
    #[inline(always)]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Retrieve the raw `Content-MD5` value, or an empty slice.
    #[inline(always)]
    pub fn content_md5(&self) -> &[u8] {
        &self.content_md5
    }

    /// Retrieve the raw `Content-Type` value, or an empty slice.
    #[inline(always)]
    pub fn content_type(&self) -> &[u8] {
        &self.content_type
    }

    /// Retrieve the raw `Date` value, or an empty slice.
    #[inline(always)]
    pub fn date(&self) -> &[u8] {
        &self.date
    }

    /// Retrieve the canonicalized `x-amz-*` headers, each terminated by `\n`.
    #[inline(always)]
    pub fn canonicalized_amz_headers(&self) -> &[u8] {
        &self.canonicalized_amz_headers
    }

    /// Retrieve the canonicalized resource.
    #[inline(always)]
    pub fn canonicalized_resource(&self) -> &str {
        &self.canonicalized_resource
    }

    /// Return the exact bytes that are signed.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(
            self.method.len()
                + self.content_md5.len()
                + self.content_type.len()
                + self.date.len()
                + self.canonicalized_amz_headers.len()
                + self.canonicalized_resource.len()
                + 4,
        );

        result.extend_from_slice(self.method.as_bytes());
        result.push(b'\n');
        result.extend_from_slice(&self.content_md5);
        result.push(b'\n');
        result.extend_from_slice(&self.content_type);
        result.push(b'\n');
        result.extend_from_slice(&self.date);
        result.push(b'\n');
        result.extend_from_slice(&self.canonicalized_amz_headers);
        result.extend_from_slice(self.canonicalized_resource.as_bytes());
        result
    }
}

/// Renders the string to sign for logging. Bytes that are not valid UTF-8 are shown as
/// ISO-8859-1.
impl Display for StringToSign {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&bytes_to_string(&self.to_bytes()))
    }
}

/// Return the bucket name from a virtual-hosted-style host: the first dot-separated label.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn bucket_from_host(host: &str) -> Result<&str, SigningError> {
    if host.is_empty() {
        return Err(SigningError::MalformedHost("Request has an empty host".to_string()));
    }

    match host.split_once('.') {
        Some((bucket, _)) if !bucket.is_empty() => Ok(bucket),
        _ => Err(SigningError::MalformedHost(format!("Host has no bucket label: {}", host))),
    }
}

/// Build the `x-amz-*` section of the string to sign.
///
/// Header names are lowercased and sorted; only the first value of a repeated header is used, and
/// newlines within a value are replaced by spaces.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn canonicalize_amz_headers(headers: &HeaderMap<HeaderValue>) -> Vec<u8> {
    let names: BTreeSet<String> = headers
        .keys()
        .map(|name| name.as_str().trim().to_lowercase())
        .filter(|name| name.starts_with(X_AMZ_PREFIX))
        .collect();

    let mut result = Vec::new();
    for name in names {
        result.extend_from_slice(name.as_bytes());
        result.push(b':');
        result.extend_from_slice(&canonical_header_value(header_bytes(headers, &name)));
        result.push(b'\n');
    }

    result
}

/// Build the canonicalized resource: `["/" + bucket] + path [+ "?" + subresource]`.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn canonicalize_resource(bucket: Option<&str>, path: &str, query: &str) -> String {
    let mut result = String::with_capacity(path.len() + query.len() + 2);

    if let Some(bucket) = bucket {
        result.push('/');
        result.push_str(bucket);
    }

    result.push_str(path);

    if let Some(subresource) = subresource_query(query) {
        result.push('?');
        result.push_str(subresource);
    }

    result
}

/// Replace each newline in a header value with a single space. All other bytes are kept as-is.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn canonical_header_value(value: &[u8]) -> Vec<u8> {
    value.iter().map(|&c| if c == b'\n' { b' ' } else { c }).collect()
}

/// Render a URI path the way SigV2 expects: spaces (literal or `%20`) become `+`, and an empty
/// path becomes `/`.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn canonical_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    path.replace("%20", "+").replace(' ', "+")
}

/// Convert bytes to a string for display: UTF-8 if valid, otherwise ISO-8859-1.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn bytes_to_string(bytes: &[u8]) -> String {
    match from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => latin1_to_string(bytes),
    }
}

/// Return the raw bytes of the first value of a header, or an empty slice if it is not present.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn header_bytes<'a>(headers: &'a HeaderMap<HeaderValue>, name: &str) -> &'a [u8] {
    match headers.get(name) {
        None => &[],
        Some(value) => value.as_bytes(),
    }
}

/// Indicates whether the specified byte is RFC3986 unreserved -- i.e., can be represented without being
/// percent-encoded, e.g. '?' -> '%3F'.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[inline(always)]
fn is_rfc3986_unreserved(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'.' || c == b'_' || c == b'~'
}

/// Convert a Latin-1 slice of bytes to a UTF-8 string.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn latin1_to_string(bytes: &[u8]) -> String {
    ISO_8859_1.decode(bytes, DecoderTrap::Replace).unwrap_or_else(|e| e.into_owned())
}

/// Return the host the request is addressed to, without any port. The `Host` header takes
/// precedence over the URI authority.
///
/// # Errors
/// Returns [`SigningError::MalformedHost`] if the `Host` header is not valid UTF-8.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn request_host(parts: &Parts) -> Result<Option<String>, SigningError> {
    if let Some(value) = parts.headers.get(HOST) {
        let host = from_utf8(value.as_bytes())
            .map_err(|_| SigningError::MalformedHost("Host header is not valid UTF-8".to_string()))?
            .trim()
            .to_string();

        let host = match host.rsplit_once(':') {
            Some((name, port)) if !port.is_empty() && port.bytes().all(|c| c.is_ascii_digit()) => name.to_string(),
            _ => host,
        };

        return Ok(Some(host));
    }

    Ok(parts.uri.host().map(|host| host.to_string()))
}

/// If the raw query starts with a recognized S3 sub-resource, return it for inclusion in the
/// canonicalized resource. Only the first matching sub-resource (in list order) is considered.
///
/// A sub-resource with an empty value (`uploads=`) loses its `=`. A query carrying values is
/// returned untouched, including any `=` padding at the end of a value (`versionId=YWJjZA==`).

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn subresource_query(query: &str) -> Option<&str> {
    SUBRESOURCES.iter().find(|subresource| query.starts_with(*subresource)).map(|_| match query.strip_suffix('=') {
        Some(name) if !name.contains(|c| c == '=' || c == '&') => name,
        _ => query,
    })
}

/// Convert a byte to uppercase hex representation.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[inline(always)]
const fn u8_to_upper_hex(b: u8) -> [u8; 2] {
    let result: [u8; 2] = [HEX_DIGITS_UPPER[((b >> 4) & 0xf) as usize], HEX_DIGITS_UPPER[(b & 0xf) as usize]];
    result
}
