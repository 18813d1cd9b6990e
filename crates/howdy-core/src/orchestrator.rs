use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::OrchestratorError;
use crate::role::UserRole;

/// Body of the single POST sent per user submission.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorRequest<'a> {
    pub query: &'a str,
    pub user_role: UserRole,
}

#[derive(Clone)]
pub struct OrchestratorClient {
    client: Client,
    url: String,
}

impl OrchestratorClient {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Ask the orchestrator and always get something displayable back.
    pub async fn call(&self, query: &str, role: UserRole) -> String {
        match self.query(query, role).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, role = role.as_str(), "orchestrator call failed");
                e.user_message()
            }
        }
    }

    /// One attempt, no retries. Any 2xx body is accepted as long as it is
    /// JSON carrying a string `response`; other fields are ignored.
    pub async fn query(&self, query: &str, role: UserRole) -> Result<String, OrchestratorError> {
        let request = OrchestratorRequest {
            query,
            user_role: role,
        };

        debug!(url = %self.url, role = role.as_str(), "sending query to orchestrator");

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OrchestratorError::Status(response.status()));
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body)?;

        value
            .get("response")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(OrchestratorError::MissingField)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = OrchestratorRequest {
            query: "What is policy X?",
            user_role: UserRole::default(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"query": "What is policy X?", "user_role": "normal"})
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_reported_not_raised() {
        // Nothing listens on the local discard port.
        let client = OrchestratorClient::new("http://127.0.0.1:9/orchestrator");
        let reply = client.call("hello", UserRole::Normal).await;
        assert!(reply.starts_with("Sorry, I'm having trouble connecting to the service."));
        assert!(reply.contains("(Error: "));
    }
}
