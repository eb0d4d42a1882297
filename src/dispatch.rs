// Synapse Host - Dispatcher
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// dispatch(name, arguments) -> output text. Never fails:
// unknown tool, gate denial, bad arguments and tool errors all come
// back as text. Errors start with "Error:" so the wire status can be
// derived from the output alone.

use crate::gate::{Gatekeeper, Operator, DENIAL_PAYLOAD};
use crate::registry::{ArgumentError, ToolKind};
use crate::tools::Workspace;
use serde_json::Value;

/// Owns the workspace, the registry lookup and the session's gate state
pub struct Dispatcher<O> {
    workspace: Workspace,
    gate: Gatekeeper<O>,
}

impl<O: Operator> Dispatcher<O> {
    pub fn new(workspace: Workspace, operator: O) -> Self {
        Self { workspace, gate: Gatekeeper::new(operator) }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn gate(&self) -> &Gatekeeper<O> {
        &self.gate
    }

    /// Run one tool call to completion
    pub async fn dispatch(&mut self, tool_name: &str, arguments: &Value) -> String {
        let Some(kind) = ToolKind::from_name(tool_name) else {
            return format!("Error: Tool '{}' not found.", tool_name);
        };

        if kind.is_unsafe() && !self.gate.check(tool_name, arguments).await.allowed() {
            return DENIAL_PAYLOAD.to_string();
        }

        let call = match kind.parse(arguments) {
            Ok(call) => call,
            Err(ArgumentError::Unexpected) => {
                return format!("Error: Tool '{}' does not accept any arguments.", tool_name)
            }
            Err(ArgumentError::Invalid(details)) => {
                return format!("Error: Invalid arguments for tool '{}': {}", tool_name, details)
            }
        };

        log::debug!("Executing {}", tool_name);
        match call.execute(&self.workspace).await {
            Ok(output) => output,
            Err(e) => {
                log::warn!("{} failed: {}", tool_name, e);
                format!("Error: {}", e)
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::tests::ScriptedOperator;
    use crate::gate::Approval;
    use serde_json::json;
    use tempfile::TempDir;

    fn dispatcher(answers: &[Approval]) -> (TempDir, Dispatcher<ScriptedOperator>) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path()).unwrap();
        (dir, Dispatcher::new(ws, ScriptedOperator::answering(answers)))
    }

    #[tokio::test]
    async fn unknown_tool_names_the_tool() {
        let (_dir, mut d) = dispatcher(&[]);
        let out = d.dispatch("format_disk", &json!({})).await;
        assert_eq!(out, "Error: Tool 'format_disk' not found.");
        assert!(d.gate().operator().prompts.is_empty());
    }

    #[tokio::test]
    async fn denial_skips_implementation() {
        let (dir, mut d) = dispatcher(&[Approval::Deny, Approval::Deny]);
        let out = d.dispatch("write_file", &json!({"path": "x.txt", "content": "hi"})).await;
        assert_eq!(out, DENIAL_PAYLOAD);
        assert!(!dir.path().join("x.txt").exists());

        let out = d.dispatch("run_command", &json!({"command": "touch ran.txt"})).await;
        assert_eq!(out, DENIAL_PAYLOAD);
        assert!(!dir.path().join("ran.txt").exists());
        assert!(!d.gate().auto_approve_session());
    }

    #[tokio::test]
    async fn approved_once_runs_command() {
        let (_dir, mut d) = dispatcher(&[Approval::Once]);
        let out = d.dispatch("run_command", &json!({"command": "echo hello"})).await;
        assert_eq!(out, "hello\n");
        assert!(!d.gate().auto_approve_session());
    }

    #[tokio::test]
    async fn always_stops_further_prompts() {
        let (dir, mut d) = dispatcher(&[Approval::Always]);
        assert_eq!(d.dispatch("run_command", &json!({"command": "echo always"})).await, "always\n");
        assert!(d.gate().auto_approve_session());

        let out = d.dispatch("write_file", &json!({"path": "a.txt", "content": "x"})).await;
        assert_eq!(out, "Successfully wrote to a.txt");
        assert_eq!(d.dispatch("run_command", &json!({"command": "echo skip_prompt"})).await, "skip_prompt\n");
        assert_eq!(d.gate().operator().prompts.len(), 1);
        assert!(dir.path().join("a.txt").exists());
    }

    #[tokio::test]
    async fn safe_tools_never_prompt() {
        let (dir, mut d) = dispatcher(&[]);
        std::fs::write(dir.path().join("readme.md"), "# hi").unwrap();
        assert_eq!(d.dispatch("read_file", &json!({"path": "readme.md"})).await, "# hi");
        assert!(d.gate().operator().prompts.is_empty());
    }

    #[tokio::test]
    async fn write_creates_missing_directory() {
        let (dir, mut d) = dispatcher(&[Approval::Once]);
        let out = d.dispatch("write_file", &json!({"path": "notes/out.txt", "content": "hi"})).await;
        assert!(out.contains("notes/out.txt"), "{}", out);
        assert_eq!(std::fs::read_to_string(dir.path().join("notes/out.txt")).unwrap(), "hi");
    }

    #[tokio::test]
    async fn invalid_arguments_are_reported() {
        let (_dir, mut d) = dispatcher(&[]);
        let out = d.dispatch("read_file", &json!({"file": "a.txt"})).await;
        assert!(out.starts_with("Error: Invalid arguments for tool 'read_file': "), "{}", out);

        let out = d.dispatch("git_status", &json!({"verbose": true})).await;
        assert_eq!(out, "Error: Tool 'git_status' does not accept any arguments.");
    }

    #[tokio::test]
    async fn positional_write_is_rejected_after_approval() {
        let (dir, mut d) = dispatcher(&[Approval::Once]);
        let out = d.dispatch("write_file", &json!(["evil.txt", "data"])).await;
        assert_eq!(
            out,
            "Error: Invalid arguments for tool 'write_file': expected an object of named arguments"
        );
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[tokio::test]
    async fn unsafe_tool_is_gated_before_validation() {
        let (_dir, mut d) = dispatcher(&[Approval::Deny]);
        let out = d.dispatch("run_command", &json!({"cmd": "ls"})).await;
        assert_eq!(out, DENIAL_PAYLOAD);
        assert_eq!(d.gate().operator().prompts.len(), 1);
    }

    #[tokio::test]
    async fn tool_errors_carry_prefix() {
        let (_dir, mut d) = dispatcher(&[]);
        assert_eq!(
            d.dispatch("read_file", &json!({"path": "missing.txt"})).await,
            "Error: File not found: missing.txt"
        );
        let out = d.dispatch("read_file", &json!({"path": "../../etc/passwd"})).await;
        assert!(out.starts_with("Error: Security violation"), "{}", out);
    }
}
