use {
    crate::{sign_request, Credentials, IntoRequestBytes, SigningOptions},
    bytes::Bytes,
    chrono::Utc,
    http::Request,
    std::{
        any::type_name,
        fmt::{Debug, Formatter, Result as FmtResult},
        future::Future,
        pin::Pin,
        task::{Context, Poll},
    },
    tower::{BoxError, Layer, Service, ServiceExt},
};

/// A [`Layer`] that signs every outgoing request with AWS SigV2 before handing it to the inner
/// service.
#[derive(Clone, Debug)]
pub struct SignV2Layer {
    credentials: Credentials,
    options: SigningOptions,
}

impl SignV2Layer {
    /// Create a layer that signs with `credentials` using `options`.
    pub fn new(credentials: Credentials, options: SigningOptions) -> Self {
        Self {
            credentials,
            options,
        }
    }
}

impl<S> Layer<S> for SignV2Layer {
    type Service = SignV2Service<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SignV2Service::new(inner, self.credentials.clone(), self.options)
    }
}

/// SignV2Service implements a tower service that signs a request with AWS SigV2, timestamped with
/// the current time, and forwards the signed request to an inner service (typically an HTTP
/// client).
///
/// A request that fails to sign is not forwarded; the [`SigningError`][crate::SigningError] is
/// returned as a [`BoxError`].
#[derive(Clone)]
pub struct SignV2Service<S> {
    inner: S,
    credentials: Credentials,
    options: SigningOptions,
}

impl<S> SignV2Service<S> {
    /// Wrap `inner` so requests sent through it are signed.
    pub fn new(inner: S, credentials: Credentials, options: SigningOptions) -> Self {
        Self {
            inner,
            credentials,
            options,
        }
    }

    /// Retrieve the inner service.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S> Debug for SignV2Service<S> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.debug_struct("SignV2Service")
            .field("inner", &type_name::<S>())
            .field("credentials", &self.credentials)
            .field("options", &self.options)
            .finish()
    }
}

impl<S, B> Service<Request<B>> for SignV2Service<S>
where
    S: Service<Request<Bytes>> + Clone + Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
    B: IntoRequestBytes + Send + 'static,
{
    type Response = S::Response;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, BoxError>> + Send>>;

    fn poll_ready(&mut self, c: &mut Context) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(c).map_err(Into::into)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let inner = self.inner.clone();
        let credentials = self.credentials.clone();
        let options = self.options;

        Box::pin(handle_call(req, inner, credentials, options))
    }
}

async fn handle_call<S, B>(
    req: Request<B>,
    inner: S,
    credentials: Credentials,
    options: SigningOptions,
) -> Result<S::Response, BoxError>
where
    S: Service<Request<Bytes>> + Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
    B: IntoRequestBytes + Send + 'static,
{
    let req = sign_request(req, &credentials, options, Utc::now()).await?;
    inner.oneshot(req).await.map_err(Into::into)
}
