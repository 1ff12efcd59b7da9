use {
    base64::{engine::general_purpose::STANDARD as BASE64, Engine},
    hmac::{Hmac, Mac},
    sha1::Sha1,
};

type HmacSha1 = Hmac<Sha1>;

/// Length of an HMAC-SHA1 output in bytes.
pub(crate) const SHA1_OUTPUT_LEN: usize = 20;

/// Wrapper function to form a HMAC-SHA1 operation.
#[inline(always)]
pub(crate) fn hmac_sha1(key: &[u8], value: &[u8]) -> [u8; SHA1_OUTPUT_LEN] {
    let mut mac = HmacSha1::new_from_slice(key).expect("HMAC can take a key of any size");
    mac.update(value);
    let tag = mac.finalize().into_bytes();
    let mut result = [0; SHA1_OUTPUT_LEN];
    result.copy_from_slice(tag.as_slice());
    result
}

/// Compute an AWS SigV2 signature: `Base64(HMAC-SHA1(secret_access_key, string_to_sign))`.
///
/// The secret key is used as raw UTF-8 key material. The string to sign is taken as bytes so that
/// header values which are not UTF-8 are signed exactly as they are transmitted (see
/// [`StringToSign::to_bytes`][crate::StringToSign::to_bytes]). The result uses the standard base64
/// alphabet with padding and is always 28 characters long.
pub fn sigv2_signature<S: AsRef<[u8]>>(secret_access_key: &str, string_to_sign: S) -> String {
    BASE64.encode(hmac_sha1(secret_access_key.as_bytes(), string_to_sign.as_ref()))
}
