//! Preparation of an outgoing request for signing.
//!
//! The normalizer brings the request into the exact form that is both signed and transmitted:
//! the path and query are rewritten in place, and the `x-amz-date`, `Content-Length`, and
//! `X-Amz-Security-Token` headers are set. Everything downstream (the string to sign and the
//! header injector) reads the request without modifying it.
//!
//! The request path is taken literally. A path such as `/https://example.com/logo.png` or `//a/b`
//! is an ordinary object key. Clients that address a request with an opaque target embedding the
//! endpoint's authority attach an [`OpaqueTarget`] extension instead; only then is the authority
//! removed.

use {
    crate::{canonical::subresource_query, constants::*, Credentials, FormatRfc1123Z, SigningError},
    chrono::{DateTime, Utc},
    http::{
        header::{HeaderName, HeaderValue, CONTENT_LENGTH},
        request::Parts,
        uri::{PathAndQuery, Uri},
    },
    log::{debug, trace},
    qualifier_attr::qualifiers,
};

/// An opaque request target (`//host/path` or `scheme://host/path`) supplied by the caller as a
/// request extension.
///
/// When present, [`prepare_request`] removes the extension, drops the scheme and authority, and
/// uses the remaining path as the request path. Without it the URI path is never reinterpreted.
///
/// ```rust
/// # use http::Request;
/// # use scratchstack_aws_sigv2::OpaqueTarget;
/// let mut req = Request::put("/").body(()).unwrap();
/// req.extensions_mut().insert(OpaqueTarget::new("//mybucket.s3.amazonaws.com/photos/puppy.jpg"));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OpaqueTarget(String);

impl OpaqueTarget {
    /// Wrap an opaque target.
    pub fn new<S: Into<String>>(target: S) -> Self {
        Self(target.into())
    }

    /// Retrieve the opaque target as given.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Normalize the request `parts` in place so they are ready to be signed.
///
/// `body_len` is the length of the fully buffered body that will be transmitted with the request.
/// The signing timestamp is written to `x-amz-date`; apart from that header, normalizing an
/// already-normalized request leaves it unchanged.
///
/// # Errors
/// Returns [`SigningError::MalformedHeader`] if the session token cannot be used as a header
/// value, or [`SigningError::InvalidURIPath`] if the rewritten request target is not a valid URI.
pub fn prepare_request(
    parts: &mut Parts,
    body_len: usize,
    credentials: &Credentials,
    timestamp: DateTime<Utc>,
) -> Result<(), SigningError> {
    if let Some(token) = credentials.session_token() {
        let value = HeaderValue::from_str(token)
            .map_err(|_| SigningError::MalformedHeader("Session token is not a valid header value".to_string()))?;
        parts.headers.insert(HeaderName::from_static(HEADER_X_AMZ_SECURITY_TOKEN), value);
    }

    if body_len > 0 || parts.headers.contains_key(CONTENT_LENGTH) {
        parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(body_len));
    }

    normalize_uri(parts)?;

    let date = timestamp.format_rfc1123z().to_string();
    trace!("Setting x-amz-date: {}", date);
    let value = HeaderValue::from_str(&date).map_err(|_| SigningError::MalformedHeader(date.clone()))?;
    parts.headers.insert(HeaderName::from_static(HEADER_X_AMZ_DATE), value);

    Ok(())
}

/// Rewrite the request target's path and query into their signed form.
fn normalize_uri(parts: &mut Parts) -> Result<(), SigningError> {
    let opaque = parts.extensions.remove::<OpaqueTarget>();
    let path = match &opaque {
        Some(target) => {
            trace!("Using opaque target {}", target.as_str());
            normalize_path(&strip_opaque_authority(target.as_str()))
        }
        None => normalize_path(parts.uri.path()),
    };
    let query = parts.uri.query().map(normalize_query);

    if opaque.is_none() && path == parts.uri.path() && query.as_deref() == parts.uri.query() {
        return Ok(());
    }

    let path_and_query = match query {
        Some(query) => format!("{}?{}", path, query),
        None => path,
    };
    debug!("Rewriting request target {} to {}", parts.uri, path_and_query);

    let path_and_query = PathAndQuery::try_from(path_and_query.as_str())
        .map_err(|e| SigningError::InvalidURIPath(format!("Invalid request target {}: {}", path_and_query, e)))?;

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.path_and_query = Some(path_and_query);
    parts.uri = Uri::from_parts(uri_parts).map_err(|e| SigningError::InvalidURIPath(e.to_string()))?;

    Ok(())
}

/// Normalize a request path: encode spaces as `+` and turn an empty path into `/`.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    path.replace("%20", "+").replace(' ', "+")
}

/// Strip the `=` from a bare sub-resource query (`uploads=` becomes `uploads`). Other queries,
/// including sub-resources with values, are returned unchanged.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn normalize_query(query: &str) -> String {
    subresource_query(query).unwrap_or(query).to_string()
}

/// Return the path of an opaque target after its authority (`//host/path` or
/// `scheme://host/path` become `/path`). A target without an authority is used as the path, with a
/// leading `/` added if it is missing.

#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn strip_opaque_authority(target: &str) -> String {
    let after_authority = match target.strip_prefix("//") {
        Some(rest) => Some(rest),
        None => match target.split_once("://") {
            Some((scheme, rest)) if is_scheme(scheme) => Some(rest),
            _ => None,
        },
    };

    match after_authority {
        Some(rest) => match rest.find('/') {
            Some(index) => rest[index..].to_string(),
            None => "/".to_string(),
        },
        None if target.starts_with('/') => target.to_string(),
        None => format!("/{}", target),
    }
}

/// Indicates whether `s` is a valid URI scheme (RFC 3986 section 3.1).
fn is_scheme(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            bytes.all(|c| c.is_ascii_alphanumeric() || c == b'+' || c == b'-' || c == b'.')
        }
        _ => false,
    }
}
