//! Common constants used throughout the crate.
//!
//! This was consolidated here so the normalizer, the canonical string builder, and the header
//! injector agree on header names and formats. If a value is spelled incorrectly, at least it can
//! be fixed in one spot.
//!
//! Tests that are testing the content of a canonical string or an error code should not use these
//! constants; they should use hard-coded strings so the tests are also testing for misspellings.
//!
//! Please keep this file organized alphabetically. (This can be a bit hard with comments, etc.)

/// Prefix of the `Authorization` header value for AWS SigV2.
pub(crate) const AWS_AUTH_PREFIX: &str = "AWS ";

/// Default region for endpoints that do not encode one.
pub(crate) const DEFAULT_REGION: &str = "us-east-1";

/// Environment variable: access key id.
pub(crate) const ENV_AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";

/// Environment variable: secret access key.
pub(crate) const ENV_AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";

/// Environment variable: session token for temporary credentials.
pub(crate) const ENV_AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// Environment variable: name of the bound blobstore service instance.
pub(crate) const ENV_BROKER_SERVICE_NAME: &str = "BROKER_SERVICE_NAME";

/// Environment variable: Cloud Foundry service bindings document.
pub(crate) const ENV_VCAP_SERVICES: &str = "VCAP_SERVICES";

/// Error code: BodyTooLarge
pub(crate) const ERR_CODE_BODY_TOO_LARGE: &str = "BodyTooLarge";

/// Error code: InternalFailure
pub(crate) const ERR_CODE_INTERNAL_FAILURE: &str = "InternalFailure";

/// Error code: InvalidURIPath
pub(crate) const ERR_CODE_INVALID_URI_PATH: &str = "InvalidURIPath";

/// Error code: IOError
pub(crate) const ERR_CODE_IO_ERROR: &str = "IOError";

/// Error code: MalformedHeader
pub(crate) const ERR_CODE_MALFORMED_HEADER: &str = "MalformedHeader";

/// Error code: MalformedHost
pub(crate) const ERR_CODE_MALFORMED_HOST: &str = "MalformedHost";

/// Header for the request date as seen by the canonical string.
pub(crate) const HEADER_DATE: &str = "date";

/// Header for the body MD5 digest.
pub(crate) const HEADER_CONTENT_MD5: &str = "content-md5";

/// Header for delivering the alternate date.
pub(crate) const HEADER_X_AMZ_DATE: &str = "x-amz-date";

/// Header for delivering the session token.
pub(crate) const HEADER_X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

/// Timestamp format for `x-amz-date`: RFC 1123 with a numeric time zone.
pub(crate) const RFC1123Z_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// S3 sub-resources that are part of the canonicalized resource, in match order.
pub(crate) const SUBRESOURCES: [&str; 15] = [
    "acl",
    "lifecycle",
    "location",
    "logging",
    "notification",
    "partNumber",
    "policy",
    "requestPayment",
    "torrent",
    "uploadId",
    "uploads",
    "versionId",
    "versioning",
    "versions",
    "website",
];

/// Prefix of headers included in the canonicalized AMZ headers.
pub(crate) const X_AMZ_PREFIX: &str = "x-amz";
