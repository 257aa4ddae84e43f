//! MailerSend HTTP client

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, Response, StatusCode};
use serde::Deserialize;

#[cfg(test)]
use mockall::mock;

use super::{
    errors::ProviderError,
    request::{SendEmailRequest, SendEmailResponse},
    MailerSendConfig,
};

const MESSAGE_ID_HEADER: &str = "x-message-id";

/// The provider's "send email" capability
#[async_trait]
pub trait EmailApi: Clone + Send + Sync + 'static {
    /// Submit one email for delivery
    async fn send_email(
        &self,
        request: &SendEmailRequest,
    ) -> Result<SendEmailResponse, ProviderError>;
}

#[cfg(test)]
mock! {
    pub EmailApi {}

    impl Clone for EmailApi {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl EmailApi for EmailApi {
        async fn send_email(&self, request: &SendEmailRequest) -> Result<SendEmailResponse, ProviderError>;
    }
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,

    #[serde(default)]
    errors: BTreeMap<String, Vec<String>>,
}

/// Client for the MailerSend REST API
#[derive(Debug, Clone)]
pub struct MailerSendClient {
    http: Client,
    api_token: String,
    api_url: String,
}

impl MailerSendClient {
    /// Create a new client from `config`
    pub fn new(config: &MailerSendConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_token: config.api_token.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    async fn error_from(response: Response) -> ProviderError {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok());

        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<ErrorBody>(&text).ok();
        let message = body
            .as_ref()
            .map(|b| b.message.clone())
            .unwrap_or_else(|| text.clone());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::Authentication(message)
            }
            StatusCode::UNPROCESSABLE_ENTITY => ProviderError::Validation {
                message,
                errors: body.map(|b| b.errors).unwrap_or_default(),
            },
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { retry_after },
            _ => ProviderError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl EmailApi for MailerSendClient {
    async fn send_email(
        &self,
        request: &SendEmailRequest,
    ) -> Result<SendEmailResponse, ProviderError> {
        let response = self
            .http
            .post(self.endpoint("email"))
            .bearer_auth(&self.api_token)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let message_id = response
            .headers()
            .get(MESSAGE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(SendEmailResponse { message_id })
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;
    use testresult::TestResult;

    use crate::domain::communication::mailer::{MailerError, Message};

    use super::*;

    fn request() -> SendEmailRequest {
        let message = Message::builder()
            .from("hello@acme.test")
            .to("one@example.com")
            .subject("Hi")
            .body("Hello")
            .build()
            .unwrap();

        SendEmailRequest::try_from(&message).unwrap()
    }

    fn client(url: String) -> MailerSendClient {
        MailerSendClient::new(&MailerSendConfig::new("test-token").with_api_url(url)).unwrap()
    }

    #[tokio::test]
    async fn test_accepted_message_returns_message_id() -> TestResult {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/email")
            .match_header("authorization", "Bearer test-token")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "from": { "email": "hello@acme.test" },
                "to": [{ "email": "one@example.com" }],
                "subject": "Hi",
                "text": "Hello",
            })))
            .with_status(202)
            .with_header("x-message-id", "5e42957d51f1d94a1070a733")
            .expect(1)
            .create_async()
            .await;

        let response = client(server.url()).send_email(&request()).await?;

        assert_eq!(response.message_id.as_deref(), Some("5e42957d51f1d94a1070a733"));
        mock.assert_async().await;

        Ok(())
    }

    #[tokio::test]
    async fn test_trailing_slash_in_api_url() -> TestResult {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/email")
            .with_status(202)
            .expect(1)
            .create_async()
            .await;

        let response = client(format!("{}/", server.url()))
            .send_email(&request())
            .await?;

        assert_eq!(response.message_id, None);
        mock.assert_async().await;

        Ok(())
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/email")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Unauthenticated."}"#)
            .create_async()
            .await;

        let result = client(server.url()).send_email(&request()).await;

        assert!(matches!(result, Err(ProviderError::Authentication(ref m)) if m == "Unauthenticated."));
    }

    #[tokio::test]
    async fn test_forbidden() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/email")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"This action is unauthorized."}"#)
            .create_async()
            .await;

        let result = client(server.url()).send_email(&request()).await;

        assert!(matches!(
            result,
            Err(ProviderError::Authentication(ref m)) if m == "This action is unauthorized."
        ));
    }

    #[tokio::test]
    async fn test_validation_error_has_field_detail() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/email")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"message":"The from.email must be verified.","errors":{"from.email":["The from.email domain must be verified in your account to send emails. #MS42207"]}}"#,
            )
            .create_async()
            .await;

        let result = client(server.url()).send_email(&request()).await;

        match result {
            Err(ProviderError::Validation { message, errors }) => {
                assert_eq!(message, "The from.email must be verified.");
                assert_eq!(errors["from.email"].len(), 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/email")
            .with_status(429)
            .with_header("retry-after", "60")
            .with_body(r#"{"message":"Too Many Attempts."}"#)
            .create_async()
            .await;

        let result = client(server.url()).send_email(&request()).await;

        assert!(matches!(
            result,
            Err(ProviderError::RateLimited {
                retry_after: Some(60)
            })
        ));
    }

    #[tokio::test]
    async fn test_server_error_with_plain_body() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/email")
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let result = client(server.url()).send_email(&request()).await;

        assert!(matches!(
            result,
            Err(ProviderError::Api { status: 503, ref message }) if message == "Service Unavailable"
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_transport_error() {
        let result = client("http://127.0.0.1:9".to_string())
            .send_email(&request())
            .await;

        assert!(matches!(result, Err(ProviderError::Transport(_))));

        let err = MailerError::from(result.unwrap_err());

        assert!(err.to_string().starts_with("transport error: "));
    }
}
