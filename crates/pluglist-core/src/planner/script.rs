//! Rendering of a [`DeferredScript`] into shell text.
//!
//! The generated script waits for the host process to exit, sleeps a short
//! grace interval, runs every operation best-effort and finally deletes
//! itself. Rendering is pure; writing and launching happen in the planner.
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::kernel::host::LaunchCommand;
use crate::planner::operation::{FileOperation, ModulePlan};

/// Shell dialect of the generated script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptDialect {
    /// Windows `cmd.exe` batch file
    Batch,
    /// POSIX `sh` script
    Posix,
}

impl ScriptDialect {
    /// Dialect matching the platform this binary was built for
    pub fn native() -> Self {
        if cfg!(windows) {
            ScriptDialect::Batch
        } else {
            ScriptDialect::Posix
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ScriptDialect::Batch => "bat",
            ScriptDialect::Posix => "sh",
        }
    }

    fn line_ending(&self) -> &'static str {
        match self {
            ScriptDialect::Batch => "\r\n",
            ScriptDialect::Posix => "\n",
        }
    }

    /// Command that runs the script at `path` through its interpreter
    pub fn launch_command(&self, path: &Path) -> LaunchCommand {
        let script = path.to_string_lossy().into_owned();
        match self {
            ScriptDialect::Batch => LaunchCommand::new("cmd").arg("/c").arg(script),
            ScriptDialect::Posix => LaunchCommand::new("sh").arg(script),
        }
    }
}

/// Everything needed to render the post-exit script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredScript {
    /// Process the script waits on before touching any file
    pub host_pid: u32,
    pub poll_interval: Duration,
    pub grace_interval: Duration,
    pub plans: Vec<ModulePlan>,
}

/// Render `script` in the given dialect
pub fn plan_to_script(script: &DeferredScript, dialect: ScriptDialect) -> String {
    let lines = match dialect {
        ScriptDialect::Batch => batch_lines(script),
        ScriptDialect::Posix => posix_lines(script),
    };
    let eol = dialect.line_ending();
    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push_str(eol);
    }
    out
}

// Whole seconds, never zero so the wait loop always yields.
fn seconds(duration: Duration) -> u64 {
    duration.as_secs().max(1)
}

fn batch_lines(script: &DeferredScript) -> Vec<String> {
    let pid = script.host_pid;
    let mut lines = vec![
        "@echo off".to_string(),
        "chcp 65001 > nul".to_string(),
        ":wait_for_host".to_string(),
        format!("tasklist /FI \"PID eq {pid}\" /NH 2>nul | find \" {pid} \" >nul"),
        format!(
            "if not errorlevel 1 ( timeout /t {} /nobreak > nul & goto wait_for_host )",
            seconds(script.poll_interval)
        ),
        format!("timeout /t {} /nobreak > nul", script.grace_interval.as_secs()),
    ];

    for plan in &script.plans {
        lines.push(format!("rem {}: {}", batch_escape(&one_line(&plan.module)), plan.action));
        for op in &plan.operations {
            lines.push(batch_operation(op));
        }
    }

    lines.push("del /f /q \"%~f0\" >nul 2>nul".to_string());
    lines
}

fn batch_operation(op: &FileOperation) -> String {
    match op {
        FileOperation::RemoveTree { path } => {
            format!("rd /s /q \"{}\" >nul 2>nul", batch_path(path))
        }
        FileOperation::RemoveFile { path } => {
            format!("del /f /q \"{}\" >nul 2>nul", batch_path(path))
        }
        FileOperation::Rename { from, to } => format!(
            "move /y \"{}\" \"{}\" >nul 2>nul",
            batch_path(from),
            batch_path(to)
        ),
        FileOperation::RenameBinaries { dir, from_suffix, to_suffix } => format!(
            "for /r \"{}\" %%F in (*{}) do ren \"%%F\" \"{}\" >nul 2>nul",
            batch_path(dir),
            batch_escape(from_suffix),
            batch_rename_target(from_suffix, to_suffix)
        ),
    }
}

// `for` variable modifiers can only strip one extension or keep the full
// name, so the new name is expressed in those terms.
fn batch_rename_target(from_suffix: &str, to_suffix: &str) -> String {
    if let Some(extra) = to_suffix.strip_prefix(from_suffix) {
        return format!("%%~nxF{}", batch_escape(extra));
    }
    if from_suffix.strip_prefix(to_suffix).is_some_and(is_single_extension) {
        return "%%~nF".to_string();
    }
    format!("%%~nF{}", batch_escape(to_suffix))
}

// `%%~nF` drops exactly one trailing `.ext`
fn is_single_extension(text: &str) -> bool {
    text.strip_prefix('.').is_some_and(|rest| !rest.is_empty() && !rest.contains('.'))
}

fn batch_path(path: &Path) -> String {
    batch_escape(&path.to_string_lossy())
}

fn batch_escape(text: &str) -> String {
    text.replace('%', "%%")
}

fn posix_lines(script: &DeferredScript) -> Vec<String> {
    let mut lines = vec![
        "#!/bin/sh".to_string(),
        format!("while kill -0 {} 2>/dev/null; do", script.host_pid),
        format!("    sleep {}", seconds(script.poll_interval)),
        "done".to_string(),
        format!("sleep {}", script.grace_interval.as_secs()),
    ];

    for plan in &script.plans {
        lines.push(format!("# {}: {}", one_line(&plan.module), plan.action));
        for op in &plan.operations {
            lines.push(posix_operation(op));
        }
    }

    lines.push("rm -f -- \"$0\"".to_string());
    lines
}

fn posix_operation(op: &FileOperation) -> String {
    match op {
        FileOperation::RemoveTree { path } => {
            format!("rm -rf -- {} 2>/dev/null", shell_quote(&path.to_string_lossy()))
        }
        FileOperation::RemoveFile { path } => {
            format!("rm -f -- {} 2>/dev/null", shell_quote(&path.to_string_lossy()))
        }
        FileOperation::Rename { from, to } => format!(
            "mv -f -- {} {} 2>/dev/null",
            shell_quote(&from.to_string_lossy()),
            shell_quote(&to.to_string_lossy())
        ),
        // Matched without regard to case, so the suffix is cut by length
        FileOperation::RenameBinaries { dir, from_suffix, to_suffix } => format!(
            "find {} -type f -iname {} -exec sh -c 'to=$1; shift; for f do mv -f -- \"$f\" \"${{f%{}}}$to\"; done' sh {} {{}} + 2>/dev/null",
            shell_quote(&dir.to_string_lossy()),
            shell_quote(&format!("*{}", glob_escape(from_suffix))),
            "?".repeat(from_suffix.chars().count()),
            shell_quote(to_suffix)
        ),
    }
}

fn one_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

/// Single-quote `text` for `sh`
pub(crate) fn shell_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

fn glob_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
