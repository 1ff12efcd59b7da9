use {
    crate::{
        body::buffer_body, constants::*, prepare_request, sigv2_signature, Credentials, IntoRequestBytes,
        SigningError, SigningOptions, StringToSign,
    },
    bytes::Bytes,
    chrono::{DateTime, Utc},
    http::{
        header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION},
        request::{Parts, Request},
    },
    log::{debug, trace},
};

/// The headers produced by signing a request.
///
/// Signing never modifies the request it reads; the resulting headers are merged into the request
/// with [`AuthHeaders::apply`] as the last step before transmission.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthHeaders {
    /// `AWS <access_key_id>:<signature>`
    authorization: HeaderValue,

    /// The session token, for temporary credentials.
    security_token: Option<HeaderValue>,
}

impl AuthHeaders {
    /// Create the headers for a computed signature.
    ///
    /// # Errors
    /// Returns [`SigningError::MalformedHeader`] if the access key id or session token cannot be
    /// represented as a header value.
    pub fn new(access_key_id: &str, signature: &str, session_token: Option<&str>) -> Result<Self, SigningError> {
        let authorization = format!("{}{}:{}", AWS_AUTH_PREFIX, access_key_id, signature);
        let authorization = HeaderValue::from_str(&authorization).map_err(|_| {
            SigningError::MalformedHeader(format!("Access key id is not a valid header value: {}", access_key_id))
        })?;

        let security_token = match session_token.filter(|token| !token.is_empty()) {
            None => None,
            Some(token) => Some(HeaderValue::from_str(token).map_err(|_| {
                SigningError::MalformedHeader("Session token is not a valid header value".to_string())
            })?),
        };

        Ok(Self {
            authorization,
            security_token,
        })
    }

    /// Retrieve the `Authorization` header value.
    #[inline]
    pub fn authorization(&self) -> &HeaderValue {
        &self.authorization
    }

    /// Retrieve the `X-Amz-Security-Token` header value, if the credentials carry a session token.
    #[inline]
    pub fn security_token(&self) -> Option<&HeaderValue> {
        self.security_token.as_ref()
    }

    /// Set the `Authorization` header (and `X-Amz-Security-Token`, if present), replacing any
    /// existing values.
    pub fn apply(self, headers: &mut HeaderMap<HeaderValue>) {
        headers.insert(AUTHORIZATION, self.authorization);

        if let Some(token) = self.security_token {
            headers.insert(HeaderName::from_static(HEADER_X_AMZ_SECURITY_TOKEN), token);
        }
    }
}

/// A request signing scheme.
///
/// Implementations read the normalized request without modifying it and return the headers to
/// add to it.
pub trait Signer {
    /// Compute the authentication headers for the normalized request `parts`.
    fn sign(&self, parts: &Parts, credentials: &Credentials) -> Result<AuthHeaders, SigningError>;
}

/// AWS Signature Version 2 (HMAC-SHA1) as used by S3-compatible object stores.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SigV2Signer {
    options: SigningOptions,
}

impl SigV2Signer {
    /// Create a signer with the given options.
    pub const fn new(options: SigningOptions) -> Self {
        Self {
            options,
        }
    }

    /// Retrieve the options this signer uses.
    #[inline]
    pub fn options(&self) -> SigningOptions {
        self.options
    }
}

impl Signer for SigV2Signer {
    fn sign(&self, parts: &Parts, credentials: &Credentials) -> Result<AuthHeaders, SigningError> {
        let string_to_sign = StringToSign::from_parts(parts, self.options.addressing)?;
        let signature = sigv2_signature(credentials.secret_access_key(), string_to_sign.to_bytes());

        debug!(
            "Signed {} {} with access key {}",
            string_to_sign.method(),
            string_to_sign.canonicalized_resource(),
            credentials.access_key_id()
        );

        AuthHeaders::new(credentials.access_key_id(), &signature, credentials.session_token())
    }
}

/// Sign an HTTP request with AWS SigV2.
///
/// The body is buffered fully, the request is normalized (see [`prepare_request`]), the string to
/// sign is built and signed, and the authentication headers are added. The returned request
/// carries the buffered body and must be transmitted exactly as returned; any change to its
/// method, path, query, or signed headers invalidates the signature.
///
/// # Parameters
/// * `request` - The HTTP [`Request`] to sign.
/// * `credentials` - The [`Credentials`] to sign with.
/// * `options` - [`SigningOptions`] selecting the addressing style and an optional body size
///   limit. For most virtual-hosted endpoints, use `SigningOptions::default()`.
/// * `timestamp` - The signing time, written to `x-amz-date`. Usually this is `Utc::now()`.
///
/// # Errors
/// Returns a [`SigningError`] if the body cannot be read or is too large, or if the request cannot
/// be signed. A request that fails to sign must not be sent.
pub async fn sign_request<B>(
    request: Request<B>,
    credentials: &Credentials,
    options: SigningOptions,
    timestamp: DateTime<Utc>,
) -> Result<Request<Bytes>, SigningError>
where
    B: IntoRequestBytes,
{
    let (mut parts, body) = request.into_parts();
    let body = buffer_body(body, options.max_body_len).await?;
    trace!("Buffered request body: {} bytes", body.len());

    prepare_request(&mut parts, body.len(), credentials, timestamp)?;
    let auth_headers = SigV2Signer::new(options).sign(&parts, credentials)?;
    auth_headers.apply(&mut parts.headers);

    Ok(Request::from_parts(parts, body))
}
