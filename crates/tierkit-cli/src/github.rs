use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;

/// Inputs of a GitHub Actions run, read from `GITHUB_CONTEXT`,
/// `GITHUB_INPUT` and `GITHUB_OUTPUT`.
#[derive(Debug, Clone, Default)]
pub(crate) struct GithubEnv {
    context: Value,
    inputs: Value,
    output: Option<PathBuf>,
}

pub(crate) fn is_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|value| !value.trim().is_empty())
}

impl GithubEnv {
    /// `None` outside GitHub Actions.
    pub(crate) fn from_env() -> Result<Option<Self>> {
        if !is_github_actions() {
            return Ok(None);
        }
        let context = std::env::var("GITHUB_CONTEXT").unwrap_or_default();
        let inputs = std::env::var("GITHUB_INPUT").unwrap_or_default();
        let output = std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from);
        Self::parse(&context, &inputs, output).map(Some)
    }

    pub(crate) fn parse(context: &str, inputs: &str, output: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            context: parse_json_or_empty(context).context("invalid GITHUB_CONTEXT")?,
            inputs: parse_json_or_empty(inputs).context("invalid GITHUB_INPUT")?,
            output,
        })
    }

    pub(crate) fn event_name(&self) -> Option<&str> {
        self.context.get("event_name").and_then(Value::as_str)
    }

    /// Commit ids of push and pull request events.
    pub(crate) fn commit_ids(&self) -> Vec<String> {
        match self.event_name() {
            Some("push") | Some("pull_request") => self
                .context
                .get("event")
                .map(commit_ids_of_event)
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn is_scheduled(&self) -> bool {
        self.event_name() == Some("schedule")
    }

    pub(crate) fn input(&self, key: &str) -> Option<String> {
        self.inputs
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// A comma separated input split into its non-empty items.
    pub(crate) fn input_list(&self, key: &str) -> Vec<String> {
        self.input(key)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn output_path(&self) -> Option<PathBuf> {
        self.output.clone()
    }
}

fn parse_json_or_empty(input: &str) -> Result<Value> {
    if input.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    Ok(serde_json::from_str(input)?)
}

fn commit_ids_of_event(event: &Value) -> Vec<String> {
    event
        .get("commits")
        .and_then(Value::as_array)
        .map(|commits| {
            commits
                .iter()
                .filter_map(|commit| commit.get("id").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Commit ids listed in a raw `GITHUB_EVENT` payload.
pub(crate) fn commits_from_event_json(event: &str) -> Result<Vec<String>> {
    let event = parse_json_or_empty(event).context("invalid GITHUB_EVENT")?;
    Ok(commit_ids_of_event(&event))
}

/// CLI values win; GitHub values fill in what the CLI left empty.
pub(crate) fn prefer_cli_list(
    cli: &[String],
    github: Option<&GithubEnv>,
    key: &str,
) -> Vec<String> {
    if !cli.is_empty() {
        return cli.to_vec();
    }
    github.map(|env| env.input_list(key)).unwrap_or_default()
}
