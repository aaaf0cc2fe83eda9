use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use tierkit_core::PackageInfo;
use tracing::{debug, info};

use crate::render::{render_status_line, OutputStyle, TerminalProgress};

/// Host profiles locked when `lock` is given none.
pub(crate) const DEFAULT_LOCK_HOST_PROFILES: [&str; 4] = [
    "android-21-armv8",
    "ubuntu-24.04-x86_64-clang-18",
    "macos-15-armv8-apple-clang-14",
    "windows-2022-x86_64-msvc-1940",
];

pub(crate) const DEFAULT_LOCK_BUILD_PROFILE: &str = "ubuntu-24.04-x86_64-clang-18";

/// One external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConanInvocation {
    pub(crate) program: String,
    pub(crate) args: Vec<String>,
    pub(crate) label: String,
}

impl ConanInvocation {
    pub(crate) fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

pub(crate) fn export_invocation(conan: &str, info: &PackageInfo) -> ConanInvocation {
    ConanInvocation {
        program: conan.to_string(),
        args: vec![
            "export".to_string(),
            info.conanfile_path().display().to_string(),
            "--version".to_string(),
            info.version.to_string(),
        ],
        label: format!("export {}", info.package_reference),
    }
}

pub(crate) fn lock_invocation(
    conan: &str,
    info: &PackageInfo,
    build_profile: &Path,
    host_profile: &Path,
    host_profile_name: &str,
) -> ConanInvocation {
    ConanInvocation {
        program: conan.to_string(),
        args: vec![
            "lock".to_string(),
            "create".to_string(),
            info.conanfile_path().display().to_string(),
            "--version".to_string(),
            info.version.to_string(),
            "--profile:build".to_string(),
            build_profile.display().to_string(),
            "--profile:host".to_string(),
            host_profile.display().to_string(),
        ],
        label: format!("lock {} for {host_profile_name}", info.package_reference),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InvocationOutcome {
    DryRun,
    Succeeded,
    Failed { code: Option<i32>, output: String },
}

fn run_invocation(root: &Path, invocation: &ConanInvocation) -> Result<InvocationOutcome> {
    debug!(command = %invocation.display(), "running conan");
    let output = Command::new(&invocation.program)
        .args(&invocation.args)
        .current_dir(root)
        .output()
        .with_context(|| format!("failed launching {}", invocation.program))?;
    if output.status.success() {
        return Ok(InvocationOutcome::Succeeded);
    }
    let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(InvocationOutcome::Failed {
        code: output.status.code(),
        output: combined.trim().to_string(),
    })
}

/// Runs every invocation, continuing past failures, and fails at the end if
/// any of them did.
pub(crate) fn run_invocations(
    root: &Path,
    invocations: &[ConanInvocation],
    dry_run: bool,
    style: OutputStyle,
    label: &str,
) -> Result<()> {
    let mut progress = TerminalProgress::start(style, label, invocations.len() as u64);
    let mut failed = Vec::new();

    for invocation in invocations {
        let outcome = if dry_run {
            InvocationOutcome::DryRun
        } else {
            run_invocation(root, invocation)?
        };
        for line in format_invocation_outcome(invocation, &outcome, style) {
            progress.println(&line);
        }
        if matches!(outcome, InvocationOutcome::Failed { .. }) {
            failed.push(invocation.label.clone());
        }
        progress.advance();
    }
    progress.finish();

    info!(total = invocations.len(), failed = failed.len(), "{label} finished");
    if !failed.is_empty() {
        anyhow::bail!(
            "{} of {} {label} runs failed: {}",
            failed.len(),
            invocations.len(),
            failed.join(", ")
        );
    }
    Ok(())
}

pub(crate) fn format_invocation_outcome(
    invocation: &ConanInvocation,
    outcome: &InvocationOutcome,
    style: OutputStyle,
) -> Vec<String> {
    match outcome {
        InvocationOutcome::DryRun => vec![render_status_line(
            style,
            "dry",
            &format!("dry run, not executing: {}", invocation.display()),
        )],
        InvocationOutcome::Succeeded => {
            vec![render_status_line(style, "ok", &invocation.label)]
        }
        InvocationOutcome::Failed { code, output } => {
            let code = code.map_or_else(|| "signal".to_string(), |code| code.to_string());
            let mut lines = vec![render_status_line(
                style,
                "err",
                &format!("{} failed (exit={code})", invocation.label),
            )];
            lines.extend(output.lines().map(str::to_string));
            lines
        }
    }
}
