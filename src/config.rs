//! Signing options, endpoint addressing, and service-binding configuration.
//!
//! Blobstore services are typically bound to an application through the Cloud Foundry
//! `VCAP_SERVICES` document. [`ServiceBinding`] extracts the credentials, endpoint, and bucket from
//! that document; [`Endpoint`] infers the addressing style the endpoint expects, which in turn
//! selects how the canonicalized resource is built.

use {
    crate::{
        canonical::{is_rfc3986_unreserved, u8_to_upper_hex},
        constants::*,
        credentials::required_var,
        ConfigError, Credentials, SigningError,
    },
    http::uri::Uri,
    lazy_static::lazy_static,
    log::debug,
    regex::Regex,
    serde::Deserialize,
    std::collections::BTreeMap,
};

lazy_static! {
    /// Endpoints consisting only of an IP address and optional port.
    static ref IP_ENDPOINT: Regex = Regex::new(r"^[0-9.:]*$").unwrap();

    /// Legacy regional S3 endpoints, e.g. `s3-us-west-2.amazonaws.com`.
    static ref S3_DASH_REGION: Regex = Regex::new(r"^s3-([^.]+)\.").unwrap();
}

/// How the bucket is addressed in requests sent to the object store.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum AddressingStyle {
    /// The bucket is the first label of the host: `https://bucket.host/key`.
    #[default]
    VirtualHosted,

    /// The bucket is the first path segment: `https://host/bucket/key`.
    Path,
}

/// Options that can be used to configure request signing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SigningOptions {
    /// How the bucket name is recovered when building the canonicalized resource.
    pub addressing: AddressingStyle,

    /// The maximum number of body bytes buffered before signing. `None` means unlimited.
    pub max_body_len: Option<usize>,
}

impl SigningOptions {
    /// Create a `SigningOptions` suitable for path-style endpoints (IP addresses, local test
    /// servers) with no body size limit.
    pub const PATH_STYLE: Self = Self {
        addressing: AddressingStyle::Path,
        max_body_len: None,
    };

    /// Create a `SigningOptions` for virtual-hosted endpoints with no body size limit. This is the
    /// same as `SigningOptions::default()`.
    pub const VIRTUAL_HOSTED: Self = Self {
        addressing: AddressingStyle::VirtualHosted,
        max_body_len: None,
    };

    /// Return a copy of these options that rejects bodies longer than `max_body_len` bytes.
    pub const fn with_max_body_len(self, max_body_len: usize) -> Self {
        Self {
            addressing: self.addressing,
            max_body_len: Some(max_body_len),
        }
    }
}

/// An object store endpoint, with the region and addressing style inferred from its host name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoint {
    scheme: String,
    host: String,
    region: String,
    addressing: AddressingStyle,
}

impl Endpoint {
    /// Parse an endpoint of the form `[scheme://]host[:port][/]`.
    ///
    /// * IP address endpoints (digits, dots, and colons only) use path-style addressing.
    /// * `s3.*` Amazon endpoints are in `us-east-1`.
    /// * `s3-<region>.*` Amazon endpoints are in `<region>`.
    /// * Everything else is virtual-hosted in `us-east-1`.
    ///
    /// When no scheme is given, `https` is assumed. Cloud Foundry blobstore brokers commonly serve
    /// plain HTTP on a bare `host:port` endpoint; such endpoints must be written with an explicit
    /// `http://` prefix.
    pub fn parse(endpoint: &str) -> Self {
        let (scheme, rest) = match endpoint.split_once("://") {
            Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
            None => ("https".to_string(), endpoint),
        };
        let host = rest.trim_end_matches('/').to_string();

        let (region, addressing) = if IP_ENDPOINT.is_match(&host) {
            debug!("Forcing path-style addressing for endpoint {}", host);
            (DEFAULT_REGION.to_string(), AddressingStyle::Path)
        } else if host.contains("amazonaws") {
            match S3_DASH_REGION.captures(&host) {
                Some(cap) => (cap[1].to_string(), AddressingStyle::VirtualHosted),
                None => (DEFAULT_REGION.to_string(), AddressingStyle::VirtualHosted),
            }
        } else {
            (DEFAULT_REGION.to_string(), AddressingStyle::VirtualHosted)
        };

        Self {
            scheme,
            host,
            region,
            addressing,
        }
    }

    /// Retrieve the URI scheme (`http` or `https`).
    #[inline]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Retrieve the host, including the port if one was given.
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Retrieve the inferred region.
    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Retrieve the inferred addressing style.
    #[inline]
    pub fn addressing(&self) -> AddressingStyle {
        self.addressing
    }

    /// Signing options matching this endpoint's addressing style.
    pub fn signing_options(&self) -> SigningOptions {
        SigningOptions {
            addressing: self.addressing,
            max_body_len: None,
        }
    }

    /// Build the URI of an object (or of the bucket itself, when `key` is empty).
    ///
    /// Key bytes outside the RFC 3986 unreserved set (other than `/`) are percent-encoded. Spaces
    /// become `%20` here and are rewritten to `+` when the request is signed.
    pub fn object_uri(&self, bucket: &str, key: &str) -> Result<Uri, SigningError> {
        let key = encode_key(key.trim_start_matches('/'));
        let uri = match self.addressing {
            AddressingStyle::VirtualHosted => format!("{}://{}.{}/{}", self.scheme, bucket, self.host, key),
            AddressingStyle::Path => format!("{}://{}/{}/{}", self.scheme, self.host, bucket, key),
        };

        uri.parse::<Uri>().map_err(|e| SigningError::InvalidURIPath(format!("Invalid object URI {}: {}", uri, e)))
    }
}

/// Percent-encode an object key for use in a URI path.
fn encode_key(key: &str) -> String {
    let mut result = String::with_capacity(key.len());
    for b in key.bytes() {
        if is_rfc3986_unreserved(b) || b == b'/' {
            result.push(b as char);
        } else {
            let hex = u8_to_upper_hex(b);
            result.push('%');
            result.push(hex[0] as char);
            result.push(hex[1] as char);
        }
    }
    result
}

/// A single entry of a `VCAP_SERVICES` document.
#[derive(Debug, Deserialize)]
struct VcapService {
    name: String,

    #[serde(default)]
    credentials: BTreeMap<String, serde_json::Value>,
}

/// The blobstore service an application is bound to: credentials, endpoint, and bucket.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceBinding {
    name: String,
    credentials: Credentials,
    endpoint: Endpoint,
    bucket_name: String,
}

impl ServiceBinding {
    /// Find the service instance named `instance_name` in a `VCAP_SERVICES` JSON document.
    ///
    /// The instance's credentials must carry string values for `access_key_id`,
    /// `secret_access_key`, `host`, and `bucket_name`.
    pub fn from_vcap_services(vcap_services: &str, instance_name: &str) -> Result<Self, ConfigError> {
        let services: BTreeMap<String, Vec<VcapService>> = serde_json::from_str(vcap_services)?;

        let service = services
            .into_values()
            .flatten()
            .find(|service| service.name == instance_name)
            .ok_or_else(|| ConfigError::ServiceNotFound(instance_name.to_string()))?;

        let field = |key: &str| -> Result<String, ConfigError> {
            match service.credentials.get(key) {
                Some(serde_json::Value::String(s)) => Ok(s.clone()),
                Some(_) => Err(ConfigError::InvalidServiceBinding(format!(
                    "{}: credential {} is not a string",
                    instance_name, key
                ))),
                None => Err(ConfigError::InvalidServiceBinding(format!(
                    "{}: missing credential {}",
                    instance_name, key
                ))),
            }
        };

        let credentials = Credentials::new(field("access_key_id")?, field("secret_access_key")?);
        let endpoint = Endpoint::parse(&field("host")?);
        let bucket_name = field("bucket_name")?;

        debug!(
            "Bound blobstore service {}: host={} bucket={} access_key_id={}",
            instance_name,
            endpoint.host(),
            bucket_name,
            credentials.access_key_id()
        );

        Ok(Self {
            name: service.name,
            credentials,
            endpoint,
            bucket_name,
        })
    }

    /// Read the binding named by `BROKER_SERVICE_NAME` from `VCAP_SERVICES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let instance_name = required_var(ENV_BROKER_SERVICE_NAME)?;
        let vcap_services = required_var(ENV_VCAP_SERVICES)?;
        Self::from_vcap_services(&vcap_services, &instance_name)
    }

    /// Retrieve the service instance name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Retrieve the credentials for the bound service.
    #[inline]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Retrieve the endpoint of the bound service.
    #[inline]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Retrieve the bucket assigned to the bound service.
    #[inline]
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }
}
