//! Thin typed wrapper around `reqwest` for the `/api/v1` backend.

use reqwest::{Method, RequestBuilder, multipart::Form};
use serde::{Serialize, de::DeserializeOwned};
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::{
    api::error::{ApiError, ApiResult, ErrorBody},
    config,
    model::ResourceType,
};

pub static REQUEST_ID_HEADER: &str = "x-request-id";

static API_PREFIX: [&str; 2] = ["api", "v1"];

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client, // cloning is cheap, reqwest keeps its pool behind an Arc
    base_url: Url,
}

impl ApiClient {
    pub fn new(api: &config::Api) -> ApiResult<Self> {
        let base_url = Url::parse(api.base_url())?;
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(api.timeout())
            .user_agent(concat!("kelas/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Client with default settings against `base_url`.
    pub fn with_base_url(base_url: &str) -> ApiResult<Self> {
        let config = config::Config::default().with_base_url(base_url);
        Self::new(config.api())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/v1/{segments..}`. Each segment is percent-encoded whole, so
    /// an id containing `/` stays one segment.
    pub fn endpoint(&self, path: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            segments.pop_if_empty();
            segments.extend(API_PREFIX);
            segments.extend(path);
        }
        Ok(url)
    }

    /// Absolute URL for an asset path returned by the backend (thumbnails, avatars).
    pub fn resolve_asset(&self, path: &str) -> String {
        if path.starts_with("http") {
            return path.to_string();
        }

        match self.base_url.join(path) {
            Ok(url) => url.to_string(),
            Err(_) => path.to_string(),
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        resource: ResourceType,
        path: &[&str],
        query: &[(String, String)],
    ) -> ApiResult<T> {
        let request = self.http.get(self.endpoint(path)?).query(query);
        self.execute(resource, Method::GET, request).await
    }

    pub async fn send_json<B, T>(
        &self,
        resource: ResourceType,
        method: Method,
        path: &[&str],
        body: &B,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .http
            .request(method.clone(), self.endpoint(path)?)
            .json(body);
        self.execute(resource, method, request).await
    }

    /// Body-less request (`POST .../complete`, `DELETE ...`).
    pub async fn send_empty<T: DeserializeOwned>(
        &self,
        resource: ResourceType,
        method: Method,
        path: &[&str],
    ) -> ApiResult<T> {
        let request = self.http.request(method.clone(), self.endpoint(path)?);
        self.execute(resource, method, request).await
    }

    pub async fn send_multipart<T: DeserializeOwned>(
        &self,
        resource: ResourceType,
        method: Method,
        path: &[&str],
        form: Form,
    ) -> ApiResult<T> {
        let request = self
            .http
            .request(method.clone(), self.endpoint(path)?)
            .multipart(form);
        self.execute(resource, method, request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        resource: ResourceType,
        method: Method,
        request: RequestBuilder,
    ) -> ApiResult<T> {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!("api", %request_id, %method, ?resource);

        async move {
            let response = request
                .header(REQUEST_ID_HEADER, request_id.to_string())
                .send()
                .await?;

            let status = response.status();
            let bytes = response.bytes().await?;

            if !status.is_success() {
                let message = serde_json::from_slice::<ErrorBody>(&bytes)
                    .map(|body| body.message)
                    .unwrap_or_else(|_| {
                        status.canonical_reason().unwrap_or("Unknown error").to_string()
                    });
                tracing::debug!(%status, %message, "request failed");
                return Err(ApiError::Status {
                    resource,
                    status,
                    message,
                });
            }

            tracing::trace!(%status, len = bytes.len(), "response received");
            serde_json::from_slice(&bytes).map_err(|error| ApiError::Decode { resource, error })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn endpoint_joins_api_prefix() {
        let client = ApiClient::with_base_url("http://localhost:3000").unwrap();
        let url = client.endpoint(&["courses", "abc"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/v1/courses/abc");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = ApiClient::with_base_url("http://localhost:3000/backend/").unwrap();
        let url = client.endpoint(&["progress", "lesson", "l1", "complete"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/backend/api/v1/progress/lesson/l1/complete"
        );
    }

    #[test]
    fn endpoint_escapes_slashes_inside_ids() {
        let client = ApiClient::with_base_url("http://localhost:3000").unwrap();
        let url = client.endpoint(&["courses", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/v1/courses/a%2Fb%20c");
        assert_eq!(url.path_segments().map(Iterator::count), Some(4));
    }

    #[test]
    fn resolve_asset_prefixes_relative_paths() {
        let client = ApiClient::with_base_url("http://localhost:3000").unwrap();
        assert_eq!(
            client.resolve_asset("/uploads/thumb.png"),
            "http://localhost:3000/uploads/thumb.png"
        );
        assert_eq!(
            client.resolve_asset("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }
}
