use crate::{
    error::FetchError,
    request::{Method, Request},
    response::ResponseSnapshot,
};
use std::time::Duration;
use surf::{Client, Config, Url};
use utils::surf_logging::SurfLogging;

/// Performs the actual network call behind the cache.
///
/// Implementations must buffer the whole response so it can be shared between callers.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn perform(&self, request: &Request) -> Result<ResponseSnapshot, FetchError>;
}

/// [`Transport`] over a surf HTTP client, resolving relative targets against a base URL.
#[derive(Clone, Debug)]
pub struct SurfTransport {
    http: Client,
    base_url: Url,
}

impl SurfTransport {
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let http: Client = Config::new()
            .set_timeout(timeout)
            .try_into()
            .map_err(|err| FetchError::InvalidRequest(format!("invalid HTTP client config: {}", err)))?;

        Ok(Self {
            http: http.with(SurfLogging),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

fn surf_method(method: Method) -> surf::http::Method {
    match method {
        Method::Get => surf::http::Method::Get,
        Method::Head => surf::http::Method::Head,
        Method::Post => surf::http::Method::Post,
        Method::Put => surf::http::Method::Put,
        Method::Patch => surf::http::Method::Patch,
        Method::Delete => surf::http::Method::Delete,
    }
}

#[async_trait::async_trait]
impl Transport for SurfTransport {
    async fn perform(&self, request: &Request) -> Result<ResponseSnapshot, FetchError> {
        let url = utils::url_path::resolve(&self.base_url, request.target()).map_err(|err| {
            FetchError::InvalidRequest(format!("invalid target {}: {}", request.target(), err))
        })?;

        let options = request.options();
        let mut builder = surf::RequestBuilder::new(surf_method(*options.method()), url);
        for (name, value) in options.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = options.body() {
            builder = builder.body(surf::Body::from_bytes(body.to_vec()));
        }

        let mut response = self
            .http
            .send(builder.build())
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = u16::from(response.status());
        let mut headers = vec![];
        for (name, values) in response.iter() {
            for value in values.iter() {
                headers.push((name.as_str().to_string(), value.as_str().to_string()));
            }
        }

        let body = response
            .body_bytes()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        Ok(ResponseSnapshot::new(status, headers, body))
    }
}
