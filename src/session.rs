// Synapse Host - Session
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// One session per process, handed out by the broker and never changed.
// Lives in RAM only; nothing is persisted across restarts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Query parameter appended to the broker's socket URL
const ROLE_QUERY: &str = "role=cli";

/// Role announced in the handshake. This process is always the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
}

/// Active session with the remote brain
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub session_id: String,
    pub socket_address: String,
    pub role: Role,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to reach session broker: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Session broker response missing {0}")]
    Incomplete(&'static str),
}

impl Session {
    /// Build from the broker's answer; the socket address gains the role query
    pub fn from_broker(session_id: Option<String>, url: Option<String>) -> Result<Self, SessionError> {
        let session_id = session_id.filter(|s| !s.is_empty()).ok_or(SessionError::Incomplete("sessionId"))?;
        let url = url.filter(|u| !u.is_empty()).ok_or(SessionError::Incomplete("url"))?;
        let separator = if url.contains('?') { '&' } else { '?' };
        Ok(Self {
            session_id,
            socket_address: format!("{}{}{}", url, separator, ROLE_QUERY),
            role: Role::Host,
        })
    }
}

/// Source of sessions. One request, no retained state.
#[async_trait]
pub trait SessionBroker: Send + Sync {
    async fn acquire(&self, existing: Option<&str>) -> Result<Session, SessionError>;
}

#[derive(Debug, Deserialize)]
struct NewSessionResponse {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
    url: Option<String>,
}

/// Broker over HTTP: `POST {base}/api/new-session`
pub struct HttpBroker {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBroker {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SessionError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("synapse-host/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self { client, endpoint: endpoint.into() })
    }
}

#[async_trait]
impl SessionBroker for HttpBroker {
    async fn acquire(&self, existing: Option<&str>) -> Result<Session, SessionError> {
        log::info!("Requesting session from {}", self.endpoint);
        let mut request = self.client.post(&self.endpoint);
        if let Some(id) = existing {
            request = request.form(&[("session_id", id)]);
        }
        let body: NewSessionResponse = request.send().await?.error_for_status()?.json().await?;
        Session::from_broker(body.session_id, body.url)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_address_gets_role_query() {
        let session = Session::from_broker(
            Some("abc".to_string()),
            Some("wss://brain.example/agents/chat/abc".to_string()),
        )
        .unwrap();
        assert_eq!(session.session_id, "abc");
        assert_eq!(session.socket_address, "wss://brain.example/agents/chat/abc?role=cli");
        assert_eq!(session.role, Role::Host);
    }

    #[test]
    fn existing_query_is_extended() {
        let session =
            Session::from_broker(Some("abc".into()), Some("ws://localhost/chat?x=1".into())).unwrap();
        assert_eq!(session.socket_address, "ws://localhost/chat?x=1&role=cli");
    }

    #[test]
    fn missing_fields_are_fatal() {
        assert!(matches!(
            Session::from_broker(None, Some("ws://x".into())),
            Err(SessionError::Incomplete("sessionId"))
        ));
        assert!(matches!(
            Session::from_broker(Some("abc".into()), Some(String::new())),
            Err(SessionError::Incomplete("url"))
        ));
    }

    #[test]
    fn broker_response_uses_camel_case_id() {
        let body: NewSessionResponse =
            serde_json::from_str(r#"{"sessionId":"s1","url":"wss://b/agents/chat/s1"}"#).unwrap();
        assert_eq!(body.session_id.as_deref(), Some("s1"));
        assert_eq!(body.url.as_deref(), Some("wss://b/agents/chat/s1"));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Host).unwrap(), "\"host\"");
    }
}
