//! HTTP request body handling utilities.
//!
//! SigV2 requires the request's content length to be known before the string to sign is built, so
//! request bodies are buffered into a replayable [`Bytes`] object before signing. The buffered
//! body is what is transmitted afterwards.
use {
    crate::SigningError,
    bytes::{Buf, Bytes, BytesMut},
    http_body::Body,
    http_body_util::BodyExt,
    log::{error, trace},
    std::{future::Future, pin::pin},
    tower::BoxError,
};

/// A trait for converting various body types into a [`Bytes`] object.
///
/// This requires reading the entire body into memory.
pub trait IntoRequestBytes {
    /// Convert this object into a [`Bytes`] object.
    fn into_request_bytes(self) -> impl Future<Output = Result<Bytes, BoxError>> + Send;
}

/// Convert the unit type `()` into an empty [`Bytes`] object.
impl IntoRequestBytes for () {
    /// Convert the unit type `()` into an empty [`Bytes`] object.
    ///
    /// This is infalliable.
    async fn into_request_bytes(self) -> Result<Bytes, BoxError> {
        Ok(Bytes::new())
    }
}

/// Convert a `Vec<u8>` into a [`Bytes`] object.
impl IntoRequestBytes for Vec<u8> {
    /// Convert a `Vec<u8>` into a [`Bytes`] object.
    ///
    /// This is infalliable.
    async fn into_request_bytes(self) -> Result<Bytes, BoxError> {
        Ok(Bytes::from(self))
    }
}

/// Convert a `String` into a [`Bytes`] object containing its UTF-8 encoding.
impl IntoRequestBytes for String {
    /// Convert a `String` into a [`Bytes`] object.
    ///
    /// This is infalliable.
    async fn into_request_bytes(self) -> Result<Bytes, BoxError> {
        Ok(Bytes::from(self))
    }
}

/// Identity transformation: return the [`Bytes`] object as-is.
impl IntoRequestBytes for Bytes {
    /// Identity transformation: return the [`Bytes`] object as-is.
    ///
    /// This is infalliable.
    async fn into_request_bytes(self) -> Result<Bytes, BoxError> {
        Ok(self)
    }
}

/// A streaming [`http_body::Body`] to be drained into memory before signing.
///
/// An optional limit stops reading as soon as the body grows past it, so an oversized upload is
/// rejected without being fully buffered.
#[derive(Debug)]
pub struct StreamedBody<B> {
    body: B,
    limit: Option<usize>,
}

impl<B> StreamedBody<B> {
    /// Wrap a streaming body with no size limit.
    pub fn new(body: B) -> Self {
        Self {
            body,
            limit: None,
        }
    }

    /// Reject the body with [`SigningError::BodyTooLarge`] once it exceeds `limit` bytes.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl<B> IntoRequestBytes for StreamedBody<B>
where
    B: Body + Send,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    /// Read every data frame of the body; trailers are ignored.
    async fn into_request_bytes(self) -> Result<Bytes, BoxError> {
        let limit = self.limit;
        let mut body = pin!(self.body);
        let mut result = BytesMut::new();

        while let Some(frame) = body.frame().await {
            let frame = frame.map_err(Into::into).inspect_err(|e| error!("Body read error: {}", e))?;

            if let Ok(mut data) = frame.into_data() {
                trace!("Body frame received: {} bytes", data.remaining());
                if let Some(limit) = limit {
                    if result.len() + data.remaining() > limit {
                        return Err(Box::new(body_too_large(limit)));
                    }
                }

                while data.has_remaining() {
                    let chunk = data.chunk();
                    let len = chunk.len();
                    result.extend_from_slice(chunk);
                    data.advance(len);
                }
            }
        }

        Ok(result.freeze())
    }
}

/// Buffer a request body so its length is known and it can be transmitted after signing.
///
/// # Errors
/// Returns [`SigningError::IO`] if the body could not be read, or [`SigningError::BodyTooLarge`]
/// if it exceeds `max_len`.
pub async fn buffer_body<B>(body: B, max_len: Option<usize>) -> Result<Bytes, SigningError>
where
    B: IntoRequestBytes,
{
    let body = body.into_request_bytes().await.map_err(SigningError::from)?;

    if let Some(max_len) = max_len {
        if body.len() > max_len {
            return Err(body_too_large(max_len));
        }
    }

    Ok(body)
}

fn body_too_large(limit: usize) -> SigningError {
    SigningError::BodyTooLarge(format!("Request body exceeds {} bytes", limit))
}
