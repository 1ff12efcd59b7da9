use {
    crate::{constants::*, ConfigError},
    derive_builder::Builder,
    std::{
        env,
        fmt::{Debug, Display, Formatter, Result as FmtResult},
    },
};

/// AWS-style credentials used to sign outgoing requests.
///
/// Credentials are immutable once built and may be shared across concurrent signing calls. The
/// secret access key and session token are never printed by the `Debug` or `Display`
/// implementations. Use [`CredentialsBuilder`] (via [`Credentials::builder`]) or
/// [`Credentials::new`] to construct a value.
#[derive(Builder, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The access key id, sent in the clear as part of the `Authorization` header.
    #[builder(setter(into))]
    access_key_id: String,

    /// The secret access key. This is only ever used as HMAC key material.
    #[builder(setter(into))]
    secret_access_key: String,

    /// The session token for temporary credentials, if any.
    #[builder(setter(into, strip_option), default)]
    session_token: Option<String>,
}

impl Credentials {
    /// Create a [CredentialsBuilder] to construct [Credentials].
    #[inline]
    pub fn builder() -> CredentialsBuilder {
        CredentialsBuilder::default()
    }

    /// Create long-term credentials without a session token.
    pub fn new<A, S>(access_key_id: A, secret_access_key: S) -> Self
    where
        A: Into<String>,
        S: Into<String>,
    {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Load credentials from `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, and (optionally)
    /// `AWS_SESSION_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_key_id = required_var(ENV_AWS_ACCESS_KEY_ID)?;
        let secret_access_key = required_var(ENV_AWS_SECRET_ACCESS_KEY)?;
        let session_token = env::var(ENV_AWS_SESSION_TOKEN).ok().filter(|token| !token.is_empty());

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token,
        })
    }

    /// Retrieve the access key id.
    #[inline]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Retrieve the secret access key.
    #[inline]
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// Retrieve the session token. An empty token is treated as absent.
    #[inline]
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref().filter(|token| !token.is_empty())
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Display for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.access_key_id)
    }
}

pub(crate) fn required_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVariable(name.to_string()))
}
