use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use glob::Pattern;
use serde::Deserialize;

/// A YAML field that may hold a single pattern or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

impl Default for OneOrMany {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

fn match_everything() -> OneOrMany {
    OneOrMany::One("*".to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PatternLists {
    #[serde(default)]
    pub include: OneOrMany,
    #[serde(default)]
    pub exclude: OneOrMany,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Include,
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectionRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default = "match_everything")]
    pub packages: OneOrMany,
    #[serde(default = "match_everything")]
    pub platforms: OneOrMany,
    #[serde(default = "match_everything")]
    pub profiles: OneOrMany,
}

/// Contents of `defaults.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SelectionConfig {
    #[serde(default)]
    pub packages: PatternLists,
    #[serde(default)]
    pub platforms: PatternLists,
    #[serde(default)]
    pub profiles: PatternLists,
    #[serde(default)]
    pub rules: Vec<SelectionRule>,
}

impl SelectionConfig {
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        serde_yaml::from_str(input).context("failed to parse selection config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed reading selection config: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("invalid selection config: {}", path.display()))
    }

    pub fn package_filter(&self) -> Result<PatternFilter> {
        PatternFilter::from_lists(&self.packages)
    }

    pub fn platform_filter(&self) -> Result<PatternFilter> {
        PatternFilter::from_lists(&self.platforms)
    }

    pub fn profile_filter(&self) -> Result<PatternFilter> {
        PatternFilter::from_lists(&self.profiles)
    }

    pub fn compiled_rules(&self) -> Result<Vec<CompiledRule>> {
        self.rules.iter().map(CompiledRule::compile).collect()
    }
}

/// Shell-style glob patterns, matched whole-string.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn compile<S: AsRef<str>>(raw: &[S]) -> Result<Self> {
        let patterns = raw
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref().trim();
                Pattern::new(pattern).with_context(|| format!("invalid pattern '{pattern}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches_any(&self, candidate: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(candidate))
    }
}

/// Include/exclude glob filter. An empty include list matches everything.
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    include: PatternSet,
    exclude: PatternSet,
}

impl PatternFilter {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: PatternSet::compile(include)?,
            exclude: PatternSet::compile(exclude)?,
        })
    }

    pub fn from_lists(lists: &PatternLists) -> Result<Self> {
        Self::new(
            &lists.include.clone().into_vec(),
            &lists.exclude.clone().into_vec(),
        )
    }

    /// CLI patterns replace configured ones when either list is given.
    pub fn with_overrides(
        configured: &PatternLists,
        include: &[String],
        exclude: &[String],
    ) -> Result<Self> {
        if include.is_empty() && exclude.is_empty() {
            Self::from_lists(configured)
        } else {
            Self::new(include, exclude)
        }
    }

    pub fn accepts(&self, candidate: &str) -> bool {
        let included = self.include.is_empty() || self.include.matches_any(candidate);
        included && !self.exclude.matches_any(candidate)
    }
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub kind: RuleKind,
    packages: PatternSet,
    platforms: PatternSet,
    profiles: PatternSet,
}

impl CompiledRule {
    fn compile(rule: &SelectionRule) -> Result<Self> {
        Ok(Self {
            kind: rule.kind,
            packages: PatternSet::compile(&rule.packages.clone().into_vec())?,
            platforms: PatternSet::compile(&rule.platforms.clone().into_vec())?,
            profiles: PatternSet::compile(&rule.profiles.clone().into_vec())?,
        })
    }

    pub fn applies_to(&self, reference: &str, platform: &str, profile: &str) -> bool {
        self.packages.matches_any(reference)
            && self.platforms.matches_any(platform)
            && self.profiles.matches_any(profile)
    }
}

/// Whether the last rule matching the triple excludes it.
pub fn excluded_by_rules(
    rules: &[CompiledRule],
    reference: &str,
    platform: &str,
    profile: &str,
) -> bool {
    rules
        .iter()
        .filter(|rule| rule.applies_to(reference, platform, profile))
        .last()
        .is_some_and(|rule| rule.kind == RuleKind::Exclude)
}
