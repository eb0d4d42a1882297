// Synapse Host - Security Gate
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Every unsafe tool call passes through here before it runs.
// Requested -> (auto-approved | operator prompt) -> Approved / AlwaysApproved / Denied.
// "Always" flips auto-approve for the lifetime of this Gatekeeper.
// Nothing else ever sets or clears it.

use async_trait::async_trait;
use serde_json::Value;

/// Output returned in place of a denied tool's result
pub const DENIAL_PAYLOAD: &str = r#"{"status": "error", "output": "Permission denied by user."}"#;

/// Operator's answer to one approval prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    /// Allow this call only
    Once,
    /// Allow this call and every later unsafe call
    Always,
    /// Refuse this call
    Deny,
}

/// What the operator is asked to approve
#[derive(Debug, Clone, Copy)]
pub struct ApprovalRequest<'a> {
    pub tool: &'a str,
    pub arguments: &'a Value,
}

impl ApprovalRequest<'_> {
    /// Human-readable summary of what the call will do.
    /// Long values are truncated.
    pub fn summary(&self) -> String {
        let field = |key: &str| self.arguments.get(key).and_then(Value::as_str);
        match self.tool {
            "run_command" => format!("Command: {}", truncate(field("command").unwrap_or("(none)"), 200)),
            "write_file" => {
                let len = field("content").map(str::len).unwrap_or(0);
                format!("File: {} | Content: {} bytes", field("path").unwrap_or("(none)"), len)
            }
            _ => truncate(&self.arguments.to_string(), 300),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

/// Whoever answers approval prompts. The wait is a suspension point:
/// dropping the future (interrupt) abandons the prompt.
#[async_trait]
pub trait Operator: Send {
    async fn confirm(&mut self, request: &ApprovalRequest<'_>) -> Approval;
}

/// Gate outcome for one unsafe call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Auto-approve was already on, operator not asked
    AutoApproved,
    Approved,
    AlwaysApproved,
    Denied,
}

impl GateDecision {
    pub fn allowed(self) -> bool {
        !matches!(self, GateDecision::Denied)
    }
}

/// Approval state for one session. Owned by one Dispatcher.
pub struct Gatekeeper<O> {
    operator: O,
    auto_approve_session: bool,
}

impl<O: Operator> Gatekeeper<O> {
    pub fn new(operator: O) -> Self {
        Self { operator, auto_approve_session: false }
    }

    pub fn auto_approve_session(&self) -> bool {
        self.auto_approve_session
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }

    /// Decide whether an unsafe call may proceed
    pub async fn check(&mut self, tool: &str, arguments: &Value) -> GateDecision {
        if self.auto_approve_session {
            log::info!("Auto-approved {} (session)", tool);
            return GateDecision::AutoApproved;
        }

        let request = ApprovalRequest { tool, arguments };
        let decision = match self.operator.confirm(&request).await {
            Approval::Once => GateDecision::Approved,
            Approval::Always => {
                self.auto_approve_session = true;
                GateDecision::AlwaysApproved
            }
            Approval::Deny => GateDecision::Denied,
        };
        log::info!("Gate {:?} for {} | {}", decision, tool, request.summary());
        decision
    }
}

// ============================================================================
// TESTS
// ============================================================================
