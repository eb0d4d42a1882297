// Synapse Host - Tool Implementations
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// One operation per tool. Every tool runs against a Workspace root and
// enforces its own confinement: paths are resolved (symlinks and ..)
// before the containment check, commands are tokenized and exec'd
// without a shell. Failures come back as ToolError, never a panic.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::process::{Output, Stdio};
use thiserror::Error;
use tokio::process::Command;

/// Why a tool produced no output
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Security violation: '{0}' resolves outside the working directory")]
    SecurityViolation(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Not a regular file: {0}")]
    NotAFile(String),

    #[error("Not a git repository")]
    NotARepository,

    #[error("Malformed command: {0}")]
    MalformedCommand(&'static str),

    #[error("Failed to run '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    /// Non-zero exit. Carries stderr, or a generic exit message when stderr is empty.
    #[error("{0}")]
    CommandFailed(String),

    #[error("{context}: {source}")]
    Io { context: String, source: io::Error },
}

impl ToolError {
    fn io(context: impl Into<String>, source: io::Error) -> Self {
        ToolError::Io { context: context.into(), source }
    }
}

// ============================================================================
// WORKSPACE: confinement root
// ============================================================================

/// Directory every tool is confined to. Canonical at construction.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = std::fs::canonicalize(root)?;
        Ok(Self { root })
    }

    /// Workspace rooted at the process working directory
    pub fn current() -> io::Result<Self> {
        Self::new(std::env::current_dir()?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a requested path against the root, following symlinks for
    /// every component that exists and normalizing the rest lexically.
    /// Anything that lands outside the root is a security violation,
    /// whether or not the target exists.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, ToolError> {
        let violation = || ToolError::SecurityViolation(requested.to_string());
        let joined = self.root.join(requested);

        let mut resolved = PathBuf::new();
        let mut on_disk = true;
        for component in joined.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
                Component::CurDir => {}
                Component::ParentDir => {
                    resolved.pop();
                    // Back on an existing (canonical) directory: keep following links
                    on_disk = resolved.exists();
                }
                Component::Normal(name) => {
                    let candidate = resolved.join(name);
                    if on_disk && candidate.symlink_metadata().is_ok() {
                        // Dangling symlinks can't be followed safely
                        resolved = std::fs::canonicalize(&candidate).map_err(|_| violation())?;
                    } else {
                        on_disk = false;
                        resolved = candidate;
                    }
                }
            }
        }

        // Component-wise, so /home/user2 never passes for /home/user
        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            Err(violation())
        }
    }
}

// ============================================================================
// REPOSITORY INSPECTION
// ============================================================================

/// `git status --porcelain` in the workspace
pub async fn git_status(workspace: &Workspace) -> Result<String, ToolError> {
    git(workspace, &["status", "--porcelain"]).await
}

/// Unstaged changes against HEAD followed by staged changes
pub async fn git_diff(workspace: &Workspace) -> Result<String, ToolError> {
    let unstaged = git(workspace, &["diff", "HEAD"]).await?;
    let staged = git(workspace, &["diff", "--cached"]).await?;
    Ok(unstaged + &staged)
}

async fn git(workspace: &Workspace, args: &[&str]) -> Result<String, ToolError> {
    let output = run(Command::new("git").args(args), workspace, "git").await?;
    if !output.status.success() {
        log::debug!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Err(ToolError::NotARepository);
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// ============================================================================
// FILES
// ============================================================================

/// Read a UTF-8 file inside the workspace
pub fn read_file(workspace: &Workspace, path: &str) -> Result<String, ToolError> {
    let resolved = workspace.resolve(path)?;
    let meta = match std::fs::metadata(&resolved) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ToolError::FileNotFound(path.to_string()))
        }
        Err(e) => return Err(ToolError::io(format!("Failed to stat {}", path), e)),
    };
    if !meta.is_file() {
        return Err(ToolError::NotAFile(path.to_string()));
    }
    std::fs::read_to_string(&resolved).map_err(|e| ToolError::io(format!("Failed to read {}", path), e))
}

/// Write (create or overwrite) a file inside the workspace, creating parents
pub fn write_file(workspace: &Workspace, path: &str, content: &str) -> Result<String, ToolError> {
    let resolved = workspace.resolve(path)?;
    if let Some(parent) = resolved.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ToolError::io(format!("Failed to create directories for {}", path), e))?;
    }
    std::fs::write(&resolved, content).map_err(|e| ToolError::io(format!("Failed to write {}", path), e))?;
    Ok(format!("Successfully wrote to {}", path))
}

// ============================================================================
// COMMANDS
// ============================================================================

/// Run a command line without a shell. Quoting is honoured when splitting,
/// metacharacters are passed through as literal arguments.
pub async fn run_command(workspace: &Workspace, command: &str) -> Result<String, ToolError> {
    let argv = shlex::split(command).ok_or(ToolError::MalformedCommand("unbalanced quotes"))?;
    let (program, args) = argv.split_first().ok_or(ToolError::MalformedCommand("empty command"))?;

    let output = run(Command::new(program).args(args), workspace, program).await?;
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !stderr.trim().is_empty() {
        return Err(ToolError::CommandFailed(stderr));
    }
    Err(ToolError::CommandFailed(match output.status.code() {
        Some(code) => format!("Command exited with code {}", code),
        None => "Command terminated by signal".to_string(),
    }))
}

/// Spawn in the workspace with stdin closed. The child is killed if the
/// awaiting future is dropped (interrupt).
async fn run(cmd: &mut Command, workspace: &Workspace, program: &str) -> Result<Output, ToolError> {
    cmd.current_dir(workspace.root())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ToolError::Spawn { program: program.to_string(), source })
}

// ============================================================================
// TESTS
// ============================================================================
