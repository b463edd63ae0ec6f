//! Registry mirror selection
//!
//! The mirror set is a fixed contract surface: each choice names an alternate
//! package-registry endpoint, and the selected URL is handed verbatim to the
//! install subprocess. Selection happens once per provisioning run, either
//! interactively or injected via `--mirror`.

use std::fmt;
use std::io::{self, BufRead, Write};

use clap::ValueEnum;

use super::ProvisionError;

/// A named package-registry endpoint used for dependency installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mirror {
    /// The upstream npm registry
    Npm,
    /// The cnpmjs.org mirror
    Cnpm,
    /// The npmmirror.com (formerly Taobao) mirror
    Taobao,
}

impl Mirror {
    /// All choices, in the order they are presented to the operator.
    pub const ALL: [Mirror; 3] = [Mirror::Npm, Mirror::Cnpm, Mirror::Taobao];

    /// The registry URL passed to the package manager, verbatim.
    pub fn registry_url(&self) -> &'static str {
        match self {
            Mirror::Npm => "https://registry.npmjs.org/",
            Mirror::Cnpm => "https://r.cnpmjs.org/",
            Mirror::Taobao => "https://registry.npmmirror.com/",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mirror::Npm => "npm",
            Mirror::Cnpm => "cnpm",
            Mirror::Taobao => "taobao",
        }
    }
}

impl fmt::Display for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Prompt the operator for a registry mirror.
///
/// Requires an interactive stdin; non-interactive invocations must inject the
/// choice via `--mirror` instead.
pub fn select_mirror() -> Result<Mirror, ProvisionError> {
    if !atty::is(atty::Stream::Stdin) {
        return Err(ProvisionError::PromptUnavailable);
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    prompt_mirror(&mut input)
}

fn prompt_mirror(input: &mut impl BufRead) -> Result<Mirror, ProvisionError> {
    eprintln!();
    eprintln!("Select a registry mirror for dependency installation:");
    for (i, mirror) in Mirror::ALL.iter().enumerate() {
        eprintln!("  [{}] {:<7} {}", i + 1, mirror.label(), mirror.registry_url());
    }
    eprint!("Enter choice (1-{}): ", Mirror::ALL.len());
    io::stderr()
        .flush()
        .map_err(|source| ProvisionError::PromptRead { source })?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|source| ProvisionError::PromptRead { source })?;

    let trimmed = line.trim();
    trimmed
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| Mirror::ALL.get(i).copied())
        .ok_or_else(|| ProvisionError::PromptInvalid {
            input: trimmed.to_string(),
        })
}
