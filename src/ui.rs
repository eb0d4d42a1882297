// Synapse Host - Terminal Presentation
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Operator-facing output (banner, status lines, request/result panels)
// and the terminal approval prompt. Logs go through `log`, not here.

use crate::gate::{Approval, ApprovalRequest, Operator};
use crate::protocol::{ResultStatus, ToolResult};
use crate::registry::ToolKind;
use crate::session::Session;
use async_trait::async_trait;
use chrono::Local;
use serde_json::Value;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;

const BANNER: &str = r"
   _____
  / ____|
 | (___  _   _ _ __   __ _ _ __  ___  ___
  \___ \| | | | '_ \ / _` | '_ \/ __|/ _ \
  ____) | |_| | | | | (_| | |_) \__ \  __/
 |_____/ \__, |_| |_|\__,_| .__/|___/\___|
          __/ |           | |
         |___/            |_|
";

fn stamp() -> String {
    Local::now().format("[%H:%M:%S]").to_string()
}

pub fn print_welcome() {
    println!("{}", BANNER);
    println!("The Remote Brain, Local Hands Agent.");
    println!();
    println!("  1. Wait for the session link below.");
    println!("  2. Open it in your browser (Ctrl/Cmd + click).");
    println!("  3. Keep this terminal open: it runs the brain's file and command requests.");
    println!();
}

pub fn session_ready(session: &Session) {
    println!("{} Connected to session: {}", stamp(), session.session_id);
}

pub fn connecting(address: &str) {
    println!("{} Connecting to Synapse brain at: {}", stamp(), address);
}

pub fn handshake_sent() {
    println!("{} Handshake sent (role: host)", stamp());
}

pub fn connection_lost(reason: &str) {
    println!("{} Connection lost ({}). Reconnecting...", stamp(), reason);
}

pub fn shutting_down() {
    println!("{} Shutting down gracefully...", stamp());
}

pub fn print_request(tool: &str, arguments: &Value) {
    println!();
    println!("{} Agent request", stamp());
    println!("   Tool: {}", tool);
    println!("   Args: {}", arguments);
}

pub fn print_result(result: &ToolResult) {
    let status = match result.status() {
        ResultStatus::Success => "success",
        ResultStatus::Error => "error",
    };
    println!("{} Result sent", stamp());
    println!("   Tool: {}", result.tool_name());
    println!("   Status: {}", status);
}

pub fn print_tools() {
    for kind in ToolKind::ALL {
        let safety = if kind.is_unsafe() { "unsafe" } else { "safe" };
        println!("{:<12} {:<7} ({})  {}", kind.name(), safety, kind.parameters().join(", "), kind.description());
    }
}

// ============================================================================
// TERMINAL OPERATOR
// ============================================================================

/// Map a typed answer to an approval choice
pub fn parse_choice(input: &str) -> Option<Approval> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "once" => Some(Approval::Once),
        "a" | "always" => Some(Approval::Always),
        "n" | "no" => Some(Approval::Deny),
        _ => None,
    }
}

/// Asks the person at the terminal. Stdin is read on its own thread and
/// handed over a channel, so a pending prompt can be abandoned on interrupt.
pub struct TerminalOperator {
    answers: mpsc::UnboundedReceiver<String>,
}

impl TerminalOperator {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let reader = std::thread::Builder::new().name("operator-stdin".into()).spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        if let Err(e) = reader {
            // Channel closes immediately: every prompt resolves to deny
            log::error!("Failed to start stdin reader: {}", e);
        }
        Self { answers: rx }
    }
}

#[async_trait]
impl Operator for TerminalOperator {
    async fn confirm(&mut self, request: &ApprovalRequest<'_>) -> Approval {
        // Typed-ahead input must not answer a prompt it never saw
        while self.answers.try_recv().is_ok() {}

        println!();
        println!("SECURITY CHECK: the agent wants to run '{}'", request.tool);
        println!("   {}", request.summary());
        loop {
            print!("Allow? [y]es once / [a]lways this session / [n]o: ");
            let _ = std::io::stdout().flush();
            match self.answers.recv().await {
                Some(line) => match parse_choice(&line) {
                    Some(choice) => return choice,
                    None => println!("Please answer y, a or n."),
                },
                None => {
                    println!();
                    log::warn!("Operator input closed; denying {}", request.tool);
                    return Approval::Deny;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_accept_short_and_long_forms() {
        assert_eq!(parse_choice("y"), Some(Approval::Once));
        assert_eq!(parse_choice(" Once \n"), Some(Approval::Once));
        assert_eq!(parse_choice("A"), Some(Approval::Always));
        assert_eq!(parse_choice("always"), Some(Approval::Always));
        assert_eq!(parse_choice("no"), Some(Approval::Deny));
        assert_eq!(parse_choice(""), None);
        assert_eq!(parse_choice("maybe"), None);
    }
}
