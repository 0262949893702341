use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use shared::{
    domain::{ColumnId, OrganizationId, TaskId, UserId},
    error::ApiError,
    protocol::{NewTask, StatusUpdateAck, StatusUpdateRequest, TaskListQuery, TaskPatch, TaskRecord},
};
use tracing::debug;
use url::Url;

use crate::error::BoardError;

/// Whose tasks the board shows. Changing it triggers a full refetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardContext {
    pub user_id: Option<UserId>,
    pub organization_id: Option<OrganizationId>,
}

impl BoardContext {
    pub fn for_organization(organization_id: impl Into<OrganizationId>) -> Self {
        Self {
            user_id: None,
            organization_id: Some(organization_id.into()),
        }
    }

    fn query(&self) -> TaskListQuery {
        TaskListQuery {
            user_id: self.user_id.clone(),
            organization_id: self.organization_id.clone(),
        }
    }
}

#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list_tasks(&self, context: &BoardContext) -> Result<Vec<TaskRecord>, BoardError>;
    async fn update_status(
        &self,
        task_id: &TaskId,
        status: &ColumnId,
    ) -> Result<StatusUpdateAck, BoardError>;
    async fn create_task(&self, task: &NewTask) -> Result<TaskRecord, BoardError>;
    async fn update_task(&self, task_id: &TaskId, patch: &TaskPatch)
        -> Result<TaskRecord, BoardError>;
    async fn delete_task(&self, task_id: &TaskId) -> Result<(), BoardError>;
}

/// `TaskApi` over the REST endpoints under `{base}/api/tasks`.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpTaskApi {
    pub fn new(base_url: &str) -> Result<Self, BoardError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, BoardError> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, BoardError> {
        let invalid = |reason: String| BoardError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }
        if parsed.cannot_be_a_base() {
            return Err(invalid("url cannot carry a path".to_string()));
        }
        Ok(Self {
            http,
            base_url: parsed,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // The constructor rejects cannot-be-a-base urls, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "task api request");
        let request = self.http.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn checked(response: Response) -> Result<Response, BoardError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await?;
        match serde_json::from_slice::<ApiError>(&body) {
            Ok(error) => Err(BoardError::Api {
                status: status.as_u16(),
                error,
            }),
            Err(_) => Err(BoardError::Status {
                status: status.as_u16(),
            }),
        }
    }

    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, BoardError> {
        let body = Self::checked(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Interprets a 2xx status-update body. Servers answer with `{"success": ..}`,
/// a bare value, the updated task, or nothing at all. An object carrying
/// `success` is judged by that field, anything else by the value itself, both
/// with JavaScript truthiness. An empty body counts as success.
pub(crate) fn ack_from_body(body: &[u8]) -> Result<StatusUpdateAck, BoardError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(StatusUpdateAck { success: true });
    }
    let value = serde_json::from_slice::<Value>(body)?;
    let success = match &value {
        Value::Object(map) => map.get("success").map_or(true, is_truthy),
        other => is_truthy(other),
    };
    Ok(StatusUpdateAck { success })
}

/// `null`, `false`, `0` and `""` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list_tasks(&self, context: &BoardContext) -> Result<Vec<TaskRecord>, BoardError> {
        let response = self
            .request(Method::GET, self.endpoint(&["api", "tasks"]))
            .query(&context.query())
            .send()
            .await?;
        Self::json(response).await
    }

    async fn update_status(
        &self,
        task_id: &TaskId,
        status: &ColumnId,
    ) -> Result<StatusUpdateAck, BoardError> {
        let response = self
            .request(
                Method::PATCH,
                self.endpoint(&["api", "tasks", task_id.as_str(), "status"]),
            )
            .json(&StatusUpdateRequest {
                status: status.clone(),
            })
            .send()
            .await?;
        let body = Self::checked(response).await?.bytes().await?;
        ack_from_body(&body)
    }

    async fn create_task(&self, task: &NewTask) -> Result<TaskRecord, BoardError> {
        let response = self
            .request(Method::POST, self.endpoint(&["api", "tasks"]))
            .json(task)
            .send()
            .await?;
        Self::json(response).await
    }

    async fn update_task(
        &self,
        task_id: &TaskId,
        patch: &TaskPatch,
    ) -> Result<TaskRecord, BoardError> {
        let response = self
            .request(Method::PUT, self.endpoint(&["api", "tasks", task_id.as_str()]))
            .json(patch)
            .send()
            .await?;
        Self::json(response).await
    }

    async fn delete_task(&self, task_id: &TaskId) -> Result<(), BoardError> {
        let response = self
            .request(Method::DELETE, self.endpoint(&["api", "tasks", task_id.as_str()]))
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path_and_encodes_ids() {
        let api = HttpTaskApi::new("http://localhost:3000/tenant/").expect("api");
        let url = api.endpoint(&["api", "tasks", "a/b c", "status"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/tenant/api/tasks/a%2Fb%20c/status"
        );
    }

    #[test]
    fn rejects_non_http_base_urls() {
        assert!(matches!(
            HttpTaskApi::new("mailto:ops@example.com"),
            Err(BoardError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            HttpTaskApi::new("not a url"),
            Err(BoardError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn ack_accepts_the_usual_shapes() {
        assert!(ack_from_body(b"").expect("empty").success);
        assert!(ack_from_body(br#"{"success":true}"#).expect("obj").success);
        assert!(!ack_from_body(br#"{"success":false}"#).expect("obj").success);
        assert!(ack_from_body(b"true").expect("bool").success);
        assert!(!ack_from_body(b"false").expect("bool").success);
        assert!(ack_from_body(br#"{"id":"a","status":"completed"}"#).expect("task").success);
        assert!(ack_from_body(b"{oops").is_err());
    }

    #[test]
    fn ack_follows_javascript_truthiness() {
        let falsy = [
            "0",
            r#""""#,
            "null",
            r#"{"success":0}"#,
            r#"{"success":""}"#,
            r#"{"success":null}"#,
        ];
        for body in falsy {
            assert!(!ack_from_body(body.as_bytes()).expect("decode").success, "{body}");
        }
        let truthy = [
            "1",
            r#""ok""#,
            "[]",
            r#"{"success":1}"#,
            r#"{"success":"ok"}"#,
            r#"{"success":{}}"#,
        ];
        for body in truthy {
            assert!(ack_from_body(body.as_bytes()).expect("decode").success, "{body}");
        }
    }

    #[test]
    fn base_url_is_kept_as_configured() {
        let api = HttpTaskApi::new("https://tasks.example.com/tenant").expect("api");
        assert_eq!(api.base_url().as_str(), "https://tasks.example.com/tenant");
    }
}
