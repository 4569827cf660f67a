use crate::config::DashConfig;
use crate::error::DashError;
use crate::session::SessionStore;
use log::debug;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

const ACCEPT: &str = "application/json";
const MAX_API_HISTORY: usize = 100;

#[derive(Debug, Clone)]
pub struct ApiCall {
    pub url: String,
    pub timestamp: OffsetDateTime,
    pub status_code: u16,
    pub success: bool,
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: reqwest::Url,
    session: Arc<dyn SessionStore>,
    history: Mutex<Vec<ApiCall>>,
}

impl ApiClient {
    pub fn new(config: &DashConfig, session: Arc<dyn SessionStore>) -> Result<Self, DashError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(ACCEPT),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()?;

        let base_url = reqwest::Url::parse(&config.api_base_url).map_err(|e| {
            DashError::Config(format!("invalid API url '{}': {}", config.api_base_url, e))
        })?;

        Ok(ApiClient {
            client,
            base_url,
            session,
            history: Mutex::new(Vec::new()),
        })
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Resolve `path_segments` under the base URL, percent-encoding each segment.
    pub fn endpoint(&self, path_segments: &[&str]) -> Result<reqwest::Url, DashError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DashError::Config(format!("API url '{}' cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(path_segments);
        Ok(url)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: reqwest::Url) -> Result<T, DashError> {
        let response = self.call(url).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send a GET and fail on any non-success status.
    pub async fn call(&self, url: reqwest::Url) -> Result<reqwest::Response, DashError> {
        debug!("calling API: {}", url);

        let mut request = self.client.get(url.clone());
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        let timestamp = OffsetDateTime::now_utc();
        match request.send().await {
            Ok(response) => {
                let status = response.status();
                self.record(ApiCall {
                    url: url.to_string(),
                    timestamp,
                    status_code: status.as_u16(),
                    success: status.is_success(),
                });

                if status.is_success() {
                    Ok(response)
                } else {
                    Err(DashError::Server {
                        status: status.as_u16(),
                        url: url.to_string(),
                    })
                }
            }
            Err(e) => {
                self.record(ApiCall {
                    url: url.to_string(),
                    timestamp,
                    status_code: 0, // Unknown status for network errors
                    success: false,
                });
                Err(DashError::Network(e))
            }
        }
    }

    /// Get the API call history for debugging purposes
    pub fn call_history(&self) -> Vec<ApiCall> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear_call_history(&self) {
        if let Ok(mut history) = self.history.lock() {
            history.clear();
        }
    }

    fn record(&self, api_call: ApiCall) {
        if let Ok(mut history) = self.history.lock() {
            history.push(api_call);
            if history.len() > MAX_API_HISTORY {
                let excess = history.len() - MAX_API_HISTORY;
                history.drain(0..excess);
            }
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.session.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySession;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base_url: &str, session: Arc<MemorySession>) -> ApiClient {
        let config = DashConfig::default().with_api_base_url(base_url).unwrap();
        ApiClient::new(&config, session).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client_for("http://localhost:8080/", Arc::new(MemorySession::new()));
        let url = client
            .endpoint(&["api", "v1", "crypto", "details", "wrapped/bitcoin"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/v1/crypto/details/wrapped%2Fbitcoin"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = client_for("http://localhost:8080/dash", Arc::new(MemorySession::new()));
        let url = client.endpoint(&["api", "v1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/dash/api/v1");
    }

    #[tokio::test]
    async fn test_bearer_token_sent_when_session_active() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(true)))
            .expect(1)
            .mount(&server)
            .await;

        let session = Arc::new(MemorySession::new());
        session.begin("secret-token".to_string());
        let client = client_for(&server.uri(), session);

        let ok: bool = client.get_json(client.endpoint(&["ping"]).unwrap()).await.unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_server_error_is_reported_and_recorded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), Arc::new(MemorySession::new()));
        let result: Result<serde_json::Value, _> =
            client.get_json(client.endpoint(&["broken"]).unwrap()).await;

        match result {
            Err(DashError::Server { status, url }) => {
                assert_eq!(status, 500);
                assert!(url.ends_with("/broken"));
            }
            other => panic!("expected server error, got {:?}", other),
        }

        let history = client.call_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status_code, 500);
        assert!(!history[0].success);

        client.clear_call_history();
        assert!(client.call_history().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), Arc::new(MemorySession::new()));
        let result: Result<serde_json::Value, _> =
            client.get_json(client.endpoint(&["garbage"]).unwrap()).await;
        assert!(matches!(result, Err(DashError::Json(_))));
    }
}
