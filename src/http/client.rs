// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};

use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};
use crate::host::{
    Fetch, FetchInput, FetchRequest, FetchResponse, Headers, RequestInit, ResponseType, XhrBackend,
    XmlHttpRequest,
};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Default timeout
    pub timeout: Duration,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Headers sent with every request
    pub default_headers: Headers,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = Headers::new();
        default_headers.append(super::headers::ACCEPT, "*/*");

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            accept_invalid_certs: false,
            default_headers,
            proxy: None,
        }
    }
}

impl HttpClientConfig {
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.set(name, value);
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

/// reqwest-backed transport used as the host's native network layer
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(header_map(&config.default_headers)?);

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Execute a request
    pub async fn execute(
        &self,
        method: &str,
        url: &str,
        headers: &Headers,
        body: Option<Bytes>,
        timeout: Option<Duration>,
    ) -> Result<FetchResponse> {
        let start = Instant::now();
        let method = Method::from_bytes(method.to_uppercase().as_bytes())
            .map_err(|_| Error::Config(format!("Invalid HTTP method: {}", method)))?;
        let request_url = url::Url::parse(url)?;

        let mut builder = self.client.request(method.clone(), request_url.clone());
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    url: url.to_string(),
                    duration_ms: start.elapsed().as_millis() as u64,
                }
            } else {
                Error::Http(e)
            }
        })?;

        let redirected = response.url() != &request_url;
        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let response_headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response.bytes().await?;

        tracing::debug!(
            method = %method,
            url = %final_url,
            status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request completed"
        );

        Ok(FetchResponse {
            status,
            headers: response_headers,
            url: final_url,
            response_type: ResponseType::Basic,
            redirected,
            body,
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new().expect("Failed to create default HTTP client")
    }
}

impl XhrBackend for HttpClient {
    fn dispatch(&self, xhr: Arc<XmlHttpRequest>) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(url = %xhr.url(), "no async runtime to perform request on");
                xhr.fail("no async runtime available");
                return;
            }
        };

        let client = self.clone();
        handle.spawn(async move {
            let body = xhr.request_body().and_then(|b| b.to_body());
            let timeout = match xhr.timeout() {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            };

            let result = client
                .execute(&xhr.method(), &xhr.url(), &xhr.request_headers(), body, timeout)
                .await;

            match result {
                Ok(response) => {
                    xhr.receive_headers(response.status, response.headers, response.url);
                    xhr.receive_body(response.body);
                }
                Err(e) => {
                    tracing::debug!(url = %xhr.url(), error = %e, "request failed");
                    xhr.fail(e.to_string());
                }
            }
        });
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn fetch(&self, input: FetchInput, init: RequestInit) -> Result<FetchResponse> {
        let request = FetchRequest::from_call(input, init);
        let body = request.body.as_ref().and_then(|b| b.to_body());

        self.execute(
            request.method_or_default(),
            &request.url,
            &request.headers,
            body,
            None,
        )
        .await
    }
}

fn header_map(headers: &Headers) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers.iter() {
        let header_name = HeaderName::try_from(name)
            .map_err(|e| Error::invalid_header(name, e.to_string()))?;
        let header_value = HeaderValue::try_from(value)
            .map_err(|e| Error::invalid_header(name, e.to_string()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostRuntime, ReadyState};
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.config().user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_invalid_default_header_rejected() {
        let config = HttpClientConfig::default().default_header("bad header", "x");
        assert!(matches!(
            HttpClient::with_config(config),
            Err(Error::InvalidHeader { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_against_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/items"))
            .and(header("x-token", "abc"))
            .and(body_string("payload"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("content-type", "text/plain")
                    .set_body_string("created"),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let init = RequestInit::new()
            .method("POST")
            .headers(vec![("x-token".to_string(), "abc".to_string())])
            .body("payload");
        let response = client
            .fetch(format!("{}/items", server.uri()).into(), init)
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert!(!response.redirected);
        assert_eq!(response.text().unwrap(), "created");
        assert_eq!(response.headers.get("Content-Type").as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_backend_drives_request_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/x"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("{\"ok\":true}", "application/json"),
            )
            .mount(&server)
            .await;

        let host = HostRuntime::builder()
            .xhr_backend(Arc::new(HttpClient::new().unwrap()))
            .build();
        let xhr = host.new_xhr();
        let (tx, rx) = tokio::sync::oneshot::channel();
        let tx = parking_lot::Mutex::new(Some(tx));
        xhr.add_ready_state_listener(Arc::new(move |xhr| {
            if xhr.ready_state() == ReadyState::Done {
                if let Some(tx) = tx.lock().take() {
                    let _ = tx.send(());
                }
            }
        }));

        xhr.open("GET", &format!("{}/x?y=1", server.uri())).unwrap();
        xhr.send(None).unwrap();
        rx.await.unwrap();

        assert_eq!(xhr.status(), 200);
        assert_eq!(
            xhr.get_response_header("content-type").as_deref(),
            Some("application/json")
        );
        assert_eq!(xhr.response(), Some(crate::value::JsValue::from("{\"ok\":true}")));
    }

    #[test]
    fn test_dispatch_without_runtime_fails_request() {
        let host = HostRuntime::builder()
            .xhr_backend(Arc::new(HttpClient::new().unwrap()))
            .build();
        let xhr = host.new_xhr();
        xhr.open("GET", "http://127.0.0.1:9/x").unwrap();
        xhr.send(None).unwrap();

        assert_eq!(xhr.ready_state(), ReadyState::Done);
        assert_eq!(xhr.error().as_deref(), Some("no async runtime available"));
    }
}
