//! Resource-compiler boundary.
//!
//! The external compiler is driven through [`ResourceCompiler`]; its
//! output lines arrive through a severity-tagged listener so callers can
//! route them into the log. A process-backed implementation invokes the
//! real binary; tests substitute a scripted one.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, error, info, warn};

use crate::util::{Error, Result};

/// Severity of one compiler output line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompilerSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Listener receiving the compiler's output lines.
pub trait CompilerLog {
    fn line(&mut self, severity: CompilerSeverity, text: &str);
}

/// Default listener: forwards each line to the matching tracing macro.
#[derive(Default)]
pub struct TracingCompilerLog;

impl CompilerLog for TracingCompilerLog {
    fn line(&mut self, severity: CompilerSeverity, text: &str) {
        match severity {
            CompilerSeverity::Debug => debug!(target: "resource_compiler", "{}", text),
            CompilerSeverity::Info => info!(target: "resource_compiler", "{}", text),
            CompilerSeverity::Warning => warn!(target: "resource_compiler", "{}", text),
            CompilerSeverity::Error => error!(target: "resource_compiler", "{}", text),
        }
    }
}

/// One compiler invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerJob {
    /// File the compiler operates on.
    pub file: PathBuf,
    /// Re-read source data even when outputs look current.
    pub refresh: bool,
    /// Skip bundling the result into animation databases.
    pub skip_dba: bool,
}

impl CompilerJob {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            refresh: true,
            skip_dba: false,
        }
    }

    pub fn with_skip_dba(mut self) -> Self {
        self.skip_dba = true;
        self
    }

    /// Command-line arguments for the external binary.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.refresh {
            args.push("/refresh".to_string());
        }
        if self.skip_dba {
            args.push("/SkipDba".to_string());
        }
        args.push(format!("/file=\"{}\"", self.file.display()));
        args
    }
}

/// Outcome of one compiler invocation.
#[derive(Clone, Debug)]
pub struct CompilerResult {
    pub succeeded: bool,
    /// Human-readable description on failure; empty on success.
    pub description: String,
}

impl CompilerResult {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            description: String::new(),
        }
    }

    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            description: description.into(),
        }
    }
}

/// Something that can compile exported files into engine-native assets.
pub trait ResourceCompiler {
    fn compile(&self, job: &CompilerJob, log: &mut dyn CompilerLog) -> Result<CompilerResult>;
}

/// Compiler backed by the external binary.
pub struct ProcessResourceCompiler {
    executable: PathBuf,
}

impl ProcessResourceCompiler {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl ResourceCompiler for ProcessResourceCompiler {
    fn compile(&self, job: &CompilerJob, log: &mut dyn CompilerLog) -> Result<CompilerResult> {
        let output = Command::new(&self.executable)
            .args(job.to_args())
            .output()
            .map_err(|e| {
                Error::other(format!(
                    "failed to launch resource compiler {}: {}",
                    self.executable.display(),
                    e
                ))
            })?;

        let mut last_error = String::new();
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            let severity = classify_line(line);
            if severity == CompilerSeverity::Error {
                last_error = line.to_string();
            }
            log.line(severity, line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            last_error = line.to_string();
            log.line(CompilerSeverity::Error, line);
        }

        if output.status.success() {
            Ok(CompilerResult::success())
        } else if last_error.is_empty() {
            Ok(CompilerResult::failure(format!(
                "compiler exited with {}",
                output.status
            )))
        } else {
            Ok(CompilerResult::failure(last_error))
        }
    }
}

/// Map the compiler's line prefix onto a severity. Unknown lines count
/// as info.
fn classify_line(line: &str) -> CompilerSeverity {
    let trimmed = line.trim_start();
    if trimmed.starts_with("E:") || trimmed.starts_with("Error:") {
        CompilerSeverity::Error
    } else if trimmed.starts_with("W:") || trimmed.starts_with("Warning:") {
        CompilerSeverity::Warning
    } else if trimmed.starts_with("D:") || trimmed.starts_with("Debug:") {
        CompilerSeverity::Debug
    } else {
        CompilerSeverity::Info
    }
}
