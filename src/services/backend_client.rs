// src/services/backend_client.rs
// DOCUMENTATION: Healthcare backend REST client
// PURPOSE: Bearer-token requests, session clearing on 401 and normalized
// server errors for every domain service

use crate::errors::{CareError, ServerError};
use chrono::Utc;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Bearer token of the current user
/// DOCUMENTATION: Cleared as soon as the backend answers 401
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(token.filter(|t| !t.is_empty()))),
        }
    }

    /// Session from an incoming `Authorization: Bearer <token>` header value
    pub fn from_authorization(header: Option<&str>) -> Self {
        let token = header
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string());
        Self::new(token)
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn set_token(&self, token: String) {
        *self.token.write().await = Some(token);
    }

    pub async fn clear(&self) {
        *self.token.write().await = None;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }
}

/// A CRUD resource exposed by the backend
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    pub path: &'static str,
    pub singular: &'static str,
    pub plural: &'static str,
}

/// Backend REST client
pub struct BackendClient {
    client: Client,
    base_url: String,
    login_route: String,
}

impl BackendClient {
    pub fn new(base_url: String, login_route: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            login_route,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach auth + request id, send, and normalize failures
    async fn send(
        &self,
        builder: RequestBuilder,
        operation: &str,
        session: &Session,
    ) -> Result<Response, CareError> {
        let request_id = Uuid::new_v4().to_string();
        let mut builder = builder.header("X-Request-Id", request_id.as_str());

        if let Some(token) = session.token().await {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => builder = builder.header(AUTHORIZATION, value),
                Err(_) => {
                    log::warn!("Discarding malformed session token");
                    session.clear().await;
                }
            }
        }

        log::debug!("Backend call {} (request {})", operation, request_id);

        let response = builder.send().await.map_err(|e| {
            log::error!("Backend request for {} failed: {}", operation, e);
            CareError::Server(ServerError {
                message: format!("Backend unreachable: {}", e),
                status: StatusCode::BAD_GATEWAY.as_u16(),
                operation: operation.to_string(),
                timestamp: Utc::now(),
            })
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            log::info!("Backend rejected token during {}, clearing session", operation);
            session.clear().await;
            return Err(CareError::SessionExpired {
                redirect_to: self.login_route.clone(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = normalize_error(status, &body, operation);
            log::warn!("{}", error);
            return Err(CareError::Server(error));
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(
        response: Response,
        operation: &str,
    ) -> Result<T, CareError> {
        response.json::<T>().await.map_err(|e| {
            log::error!("Could not parse backend response for {}: {}", operation, e);
            CareError::ExternalApiError(format!("Invalid response for {}: {}", operation, e))
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &str,
        session: &Session,
    ) -> Result<T, CareError> {
        let builder = self.client.request(Method::GET, self.url(path));
        let response = self.send(builder, operation, session).await?;
        Self::read_json(response, operation).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &str,
        session: &Session,
        body: &B,
    ) -> Result<T, CareError> {
        let builder = self.client.request(Method::POST, self.url(path)).json(body);
        let response = self.send(builder, operation, session).await?;
        Self::read_json(response, operation).await
    }

    /// POST where the backend answers with a bare message or nothing
    pub async fn post_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        operation: &str,
        session: &Session,
        body: &B,
    ) -> Result<(), CareError> {
        let builder = self.client.request(Method::POST, self.url(path)).json(body);
        self.send(builder, operation, session).await?;
        Ok(())
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &str,
        session: &Session,
        body: &B,
    ) -> Result<T, CareError> {
        let builder = self.client.request(Method::PUT, self.url(path)).json(body);
        let response = self.send(builder, operation, session).await?;
        Self::read_json(response, operation).await
    }

    pub async fn delete(
        &self,
        path: &str,
        operation: &str,
        session: &Session,
    ) -> Result<(), CareError> {
        let builder = self.client.request(Method::DELETE, self.url(path));
        self.send(builder, operation, session).await?;
        Ok(())
    }

    pub async fn list<T: DeserializeOwned>(
        &self,
        resource: &Resource,
        session: &Session,
    ) -> Result<Vec<T>, CareError> {
        self.get(resource.path, &format!("list {}", resource.plural), session)
            .await
    }

    pub async fn fetch<T: DeserializeOwned>(
        &self,
        resource: &Resource,
        id: i64,
        session: &Session,
    ) -> Result<T, CareError> {
        let path = format!("{}/{}", resource.path, id);
        self.get(&path, &format!("get {}", resource.singular), session)
            .await
    }

    pub async fn create<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: &Resource,
        body: &B,
        session: &Session,
    ) -> Result<T, CareError> {
        self.post(
            resource.path,
            &format!("create {}", resource.singular),
            session,
            body,
        )
        .await
    }

    pub async fn update<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: &Resource,
        id: i64,
        body: &B,
        session: &Session,
    ) -> Result<T, CareError> {
        let path = format!("{}/{}", resource.path, id);
        self.put(&path, &format!("update {}", resource.singular), session, body)
            .await
    }

    pub async fn remove(
        &self,
        resource: &Resource,
        id: i64,
        session: &Session,
    ) -> Result<(), CareError> {
        let path = format!("{}/{}", resource.path, id);
        self.delete(&path, &format!("delete {}", resource.singular), session)
            .await
    }
}

/// Build a ServerError from a failed response
/// DOCUMENTATION: Prefers the backend's own `message`/`error` field, then the
/// raw body, then the canonical status text
pub fn normalize_error(status: StatusCode, body: &str, operation: &str) -> ServerError {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        json.get("message")
            .and_then(Value::as_str)
            .or_else(|| json.get("error").and_then(Value::as_str))
            .or_else(|| {
                json.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
            })
            .map(str::to_string)
    });

    let message = from_json
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unexpected server error")
                .to_string()
        });

    ServerError {
        message,
        status: status.as_u16(),
        operation: operation.to_string(),
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const WIDGETS: Resource = Resource {
        path: "/web/widgets",
        singular: "widget",
        plural: "widgets",
    };

    #[derive(Debug, Deserialize, PartialEq)]
    struct Widget {
        id: i64,
        name: String,
    }

    fn client(server: &MockServer) -> BackendClient {
        BackendClient::new(server.uri(), "/login".to_string(), Duration::from_secs(5))
    }

    #[test]
    fn test_session_from_authorization_header() {
        let session = Session::from_authorization(Some("Bearer abc.def"));
        assert_eq!(tokio_test::block_on(session.token()), Some("abc.def".to_string()));

        let anonymous = Session::from_authorization(Some("Basic xyz"));
        assert!(!tokio_test::block_on(anonymous.is_authenticated()));
    }

    #[test]
    fn test_normalize_error_variants() {
        let json_message = normalize_error(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Doctor not available"}"#,
            "create appointment",
        );
        assert_eq!(json_message.message, "Doctor not available");
        assert_eq!(json_message.status, 400);
        assert_eq!(json_message.operation, "create appointment");

        let nested = normalize_error(
            StatusCode::CONFLICT,
            r#"{"error":{"message":"Duplicate"}}"#,
            "create product",
        );
        assert_eq!(nested.message, "Duplicate");

        let plain = normalize_error(StatusCode::INTERNAL_SERVER_ERROR, "boom", "list orders");
        assert_eq!(plain.message, "boom");

        let empty = normalize_error(StatusCode::SERVICE_UNAVAILABLE, "", "list orders");
        assert_eq!(empty.message, "Service Unavailable");
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/web/widgets/4"))
            .and(header("Authorization", "Bearer t0ken"))
            .and(header_exists("X-Request-Id"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": 4, "name": "gauze" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new(Some("t0ken".to_string()));
        let widget: Widget = client(&server).fetch(&WIDGETS, 4, &session).await.unwrap();
        assert_eq!(
            widget,
            Widget {
                id: 4,
                name: "gauze".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/web/widgets"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let session = Session::new(Some("expired".to_string()));
        let result: Result<Vec<Widget>, _> = client(&server).list(&WIDGETS, &session).await;

        match result {
            Err(CareError::SessionExpired { redirect_to }) => assert_eq!(redirect_to, "/login"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_server_error_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/web/widgets/9"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "message": "Widget not found" })),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .remove(&WIDGETS, 9, &Session::default())
            .await
            .unwrap_err();

        match err {
            CareError::Server(server_error) => {
                assert_eq!(server_error.status, 404);
                assert_eq!(server_error.message, "Widget not found");
                assert_eq!(server_error.operation, "delete widget");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_accepts_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/web/widgets/2"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        client(&server)
            .remove(&WIDGETS, 2, &Session::default())
            .await
            .unwrap();
    }
}
