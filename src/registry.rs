// Synapse Host - Tool Registry
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Closed set of tools the brain may call. Each kind owns its wire name,
// its argument schema (a typed struct) and its safety class.
// Unsafe kinds must pass the gate before they run.

use crate::tools::{self, ToolError, Workspace};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    GitStatus,
    GitDiff,
    ReadFile,
    WriteFile,
    RunCommand,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReadFileArgs {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WriteFileArgs {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunCommandArgs {
    pub command: String,
}

/// A validated call, ready to execute
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    GitStatus,
    GitDiff,
    ReadFile(ReadFileArgs),
    WriteFile(WriteFileArgs),
    RunCommand(RunCommandArgs),
}

/// Argument validation failure
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentError {
    /// Arguments supplied to a tool that takes none
    Unexpected,
    /// Arguments did not match the schema
    Invalid(String),
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::GitStatus,
        ToolKind::GitDiff,
        ToolKind::ReadFile,
        ToolKind::WriteFile,
        ToolKind::RunCommand,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::GitStatus => "git_status",
            ToolKind::GitDiff => "git_diff",
            ToolKind::ReadFile => "read_file",
            ToolKind::WriteFile => "write_file",
            ToolKind::RunCommand => "run_command",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolKind::GitStatus => "Porcelain status of the repository in the working directory",
            ToolKind::GitDiff => "Unstaged and staged diff of the repository",
            ToolKind::ReadFile => "Read a file inside the working directory",
            ToolKind::WriteFile => "Create or overwrite a file inside the working directory",
            ToolKind::RunCommand => "Run a command (no shell) in the working directory",
        }
    }

    /// Parameter names, in schema order
    pub fn parameters(self) -> &'static [&'static str] {
        match self {
            ToolKind::GitStatus | ToolKind::GitDiff => &[],
            ToolKind::ReadFile => &["path"],
            ToolKind::WriteFile => &["path", "content"],
            ToolKind::RunCommand => &["command"],
        }
    }

    /// Mutates local state or runs arbitrary programs
    pub fn is_unsafe(self) -> bool {
        matches!(self, ToolKind::WriteFile | ToolKind::RunCommand)
    }

    /// Validate raw arguments against this tool's schema.
    /// `null` counts as no arguments. Unknown extra fields are ignored.
    pub fn parse(self, arguments: &Value) -> Result<ToolCall, ArgumentError> {
        match self {
            ToolKind::GitStatus => no_arguments(arguments).map(|_| ToolCall::GitStatus),
            ToolKind::GitDiff => no_arguments(arguments).map(|_| ToolCall::GitDiff),
            ToolKind::ReadFile => typed(arguments).map(ToolCall::ReadFile),
            ToolKind::WriteFile => typed(arguments).map(ToolCall::WriteFile),
            ToolKind::RunCommand => typed(arguments).map(ToolCall::RunCommand),
        }
    }
}

fn no_arguments(arguments: &Value) -> Result<(), ArgumentError> {
    match arguments {
        Value::Null => Ok(()),
        Value::Object(map) if map.is_empty() => Ok(()),
        _ => Err(ArgumentError::Unexpected),
    }
}

fn typed<T: DeserializeOwned>(arguments: &Value) -> Result<T, ArgumentError> {
    // serde would happily fill a struct from a positional array
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        Value::Object(_) => arguments.clone(),
        _ => return Err(ArgumentError::Invalid("expected an object of named arguments".to_string())),
    };
    serde_json::from_value(arguments).map_err(|e| ArgumentError::Invalid(e.to_string()))
}

impl ToolCall {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolCall::GitStatus => ToolKind::GitStatus,
            ToolCall::GitDiff => ToolKind::GitDiff,
            ToolCall::ReadFile(_) => ToolKind::ReadFile,
            ToolCall::WriteFile(_) => ToolKind::WriteFile,
            ToolCall::RunCommand(_) => ToolKind::RunCommand,
        }
    }

    pub async fn execute(&self, workspace: &Workspace) -> Result<String, ToolError> {
        match self {
            ToolCall::GitStatus => tools::git_status(workspace).await,
            ToolCall::GitDiff => tools::git_diff(workspace).await,
            ToolCall::ReadFile(args) => tools::read_file(workspace, &args.path),
            ToolCall::WriteFile(args) => tools::write_file(workspace, &args.path, &args.content),
            ToolCall::RunCommand(args) => tools::run_command(workspace, &args.command).await,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
