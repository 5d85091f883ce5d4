use async_trait::async_trait;
use console_framework::{ApiClient, ApiEnvelope, ConsoleError, Method, RequestOptions};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, instrument, warn};
use url::Url;

/// [`ApiClient`] over HTTP.
///
/// Endpoints are joined onto the base URL. A non-2xx status is a failure
/// regardless of the body; a 2xx body must be an [`ApiEnvelope`].
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpApiClient {
    pub fn new(base_url: &str) -> Result<Self, ConsoleError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| ConsoleError::Config(format!("invalid api_base_url '{base_url}': {e}")))?;
        // Without a trailing slash `join` would replace the last path segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    pub fn url_for(&self, endpoint: &str) -> Result<Url, ConsoleError> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| fetch_error(endpoint, e))
    }
}

fn fetch_error(endpoint: &str, reason: impl ToString) -> ConsoleError {
    ConsoleError::Fetch {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn header_map(endpoint: &str, headers: &[(String, String)]) -> Result<HeaderMap, ConsoleError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| fetch_error(endpoint, e))?;
        let value = HeaderValue::from_str(value).map_err(|e| fetch_error(endpoint, e))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl ApiClient for HttpApiClient {
    #[instrument(skip(self, options), fields(method = %options.method))]
    async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<ApiEnvelope, ConsoleError> {
        let url = self.url_for(endpoint)?;
        let mut request = self
            .client
            .request(to_reqwest(options.method), url)
            .headers(header_map(endpoint, &options.headers)?);
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| fetch_error(endpoint, e))?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Request failed");
            return Err(fetch_error(endpoint, format!("HTTP {}", status.as_u16())));
        }
        debug!(%status, "Response received");
        response
            .json::<ApiEnvelope>()
            .await
            .map_err(|e| ConsoleError::UnexpectedPayload(e.to_string()))
    }
}
