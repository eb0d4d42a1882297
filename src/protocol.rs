// Synapse Host - Wire Protocol
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// JSON text frames exchanged with the brain.
// Inbound:  tool_call, host_status, cf_agent_mcp_servers (anything else ignored)
// Outbound: init, tool_result
// A frame is fully decoded or rejected, never half-applied.

use crate::session::Role;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Inbound types that are accepted and discarded
pub const INFORMATIONAL_TYPES: &[&str] = &["host_status", "cf_agent_mcp_servers"];

/// Marker that makes a tool output an error on the wire
const ERROR_MARKER: &str = "Error:";

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("frame has no string \"type\" field")]
    MissingType,
}

/// Request from the brain to run one tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub name: String,
    pub arguments: Value,
    /// Opaque, echoed verbatim in the result whatever its JSON type
    pub call_id: Value,
}

/// A decoded inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    ToolCall(ToolCallRequest),
    Informational(String),
    Unknown(String),
}

impl InboundFrame {
    /// Decode one text message. Missing tool_call fields decode as empty
    /// so the call still gets a result.
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(fields) = value else {
            return Err(FrameError::NotAnObject);
        };
        let kind = fields.get("type").and_then(Value::as_str).ok_or(FrameError::MissingType)?;

        if kind == "tool_call" {
            let name = match fields.get("name") {
                Some(Value::String(name)) => name.clone(),
                Some(other) => {
                    log::warn!("tool_call name is not a string: {}", other);
                    String::new()
                }
                None => String::new(),
            };
            return Ok(InboundFrame::ToolCall(ToolCallRequest {
                name,
                arguments: fields.get("arguments").cloned().unwrap_or(Value::Null),
                call_id: fields.get("call_id").cloned().unwrap_or_else(|| Value::String(String::new())),
            }));
        }
        if INFORMATIONAL_TYPES.contains(&kind) {
            return Ok(InboundFrame::Informational(kind.to_string()));
        }
        Ok(InboundFrame::Unknown(kind.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

impl ResultStatus {
    /// Error iff the output (leading whitespace ignored) starts with "Error:"
    pub fn of(output: &str) -> Self {
        if output.trim_start().starts_with(ERROR_MARKER) {
            ResultStatus::Error
        } else {
            ResultStatus::Success
        }
    }
}

/// Result of one tool call. Status is derived from the output, not set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    call_id: Value,
    tool_name: String,
    status: ResultStatus,
    output: String,
}

impl ToolResult {
    pub fn new(call_id: impl Into<Value>, tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        let output = output.into();
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            status: ResultStatus::of(&output),
            output,
        }
    }

    pub fn call_id(&self) -> &Value {
        &self.call_id
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn status(&self) -> ResultStatus {
        self.status
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}

/// Frames this process sends
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    Init { role: Role },
    ToolResult(ToolResult),
}

impl OutboundFrame {
    pub fn handshake() -> Self {
        OutboundFrame::Init { role: Role::Host }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ============================================================================
// TESTS
// ============================================================================
