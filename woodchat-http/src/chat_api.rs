use crate::{HttpClient, HttpError, RequestOpts};
use async_trait::async_trait;
use woodchat_common::{AskBackend, AskRequest, AskResponse, BackendError, ReloadResponse};

/// Client for a remote woodchat server.
#[derive(Clone, Debug)]
pub struct ChatApi {
    http: HttpClient,
    label: String,
}

impl ChatApi {
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        Ok(Self::from_client(HttpClient::new(base_url)?))
    }

    pub fn from_client(http: HttpClient) -> Self {
        let label = format!("remote {}", http.base());
        Self { http, label }
    }

    /// `POST /api/ask`.
    pub async fn ask(&self, question: &str) -> Result<AskResponse, HttpError> {
        let body = AskRequest {
            question: question.to_string(),
        };
        self.http
            .post_json("api/ask", &body, RequestOpts::default())
            .await
    }

    /// `GET /admin/reload_data`. A `success: false` body comes back as
    /// [`HttpError::Api`] carrying the server's error text.
    pub async fn reload(&self) -> Result<ReloadResponse, HttpError> {
        self.http
            .get_json("admin/reload_data", RequestOpts::default())
            .await
    }
}

#[async_trait]
impl AskBackend for ChatApi {
    async fn ask(&self, question: &str) -> Result<AskResponse, BackendError> {
        ChatApi::ask(self, question).await.map_err(|e| match e {
            HttpError::Api { message, .. } => BackendError::Service(message),
            other => BackendError::Unavailable(other.to_string()),
        })
    }

    fn describe(&self) -> &str {
        &self.label
    }
}
