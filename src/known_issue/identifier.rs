//! Known-issue identifiers as configured and as compiled.

use std::{collections::BTreeMap, fmt};

use regex::Regex;
use serde::Deserialize;

use super::KnownIssueType;
use crate::session::TestInfo;

/// A regular expression that must match the whole input.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source` as a full-match pattern.
    ///
    /// # Errors
    ///
    /// Returns a [`regex::Error`] if `source` is not a valid expression.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: source.to_owned(),
            regex: Regex::new(&format!("^(?:{source})$"))?,
        })
    }

    #[must_use]
    pub fn matches(&self, input: &str) -> bool { self.regex.is_match(input) }

    /// The pattern as written in the configuration.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.source }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.source) }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.source) }
}

/// Unvalidated identifier as it appears in a known-issue registry file.
///
/// Every field is optional at this stage so that all problems of an entry can
/// be reported together by [`IdentifierDefinition::compile`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierDefinition {
    #[serde(rename = "type")]
    pub issue_type: Option<KnownIssueType>,
    pub assertion_pattern: Option<String>,
    pub story_pattern: Option<String>,
    pub scenario_pattern: Option<String>,
    pub step_pattern: Option<String>,
    #[serde(default)]
    pub variable_patterns: BTreeMap<String, String>,
    #[serde(default)]
    pub dynamic_patterns: BTreeMap<String, String>,
    #[serde(default)]
    pub additional_patterns: BTreeMap<String, String>,
    #[serde(default)]
    pub fail_scenario_fast: bool,
    #[serde(default)]
    pub fail_story_fast: bool,
}

impl IdentifierDefinition {
    /// Start a definition with its two mandatory fields.
    #[must_use]
    pub fn new(issue_type: KnownIssueType, assertion_pattern: &str) -> Self {
        Self {
            issue_type: Some(issue_type),
            assertion_pattern: Some(assertion_pattern.to_owned()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_story_pattern(mut self, pattern: &str) -> Self {
        self.story_pattern = Some(pattern.to_owned());
        self
    }

    #[must_use]
    pub fn with_scenario_pattern(mut self, pattern: &str) -> Self {
        self.scenario_pattern = Some(pattern.to_owned());
        self
    }

    #[must_use]
    pub fn with_step_pattern(mut self, pattern: &str) -> Self {
        self.step_pattern = Some(pattern.to_owned());
        self
    }

    #[must_use]
    pub fn with_variable_pattern(mut self, name: &str, pattern: &str) -> Self {
        self.variable_patterns
            .insert(name.to_owned(), pattern.to_owned());
        self
    }

    #[must_use]
    pub fn with_dynamic_pattern(mut self, provider: &str, pattern: &str) -> Self {
        self.dynamic_patterns
            .insert(provider.to_owned(), pattern.to_owned());
        self
    }

    #[must_use]
    pub fn with_additional_pattern(mut self, property: &str, pattern: &str) -> Self {
        self.additional_patterns
            .insert(property.to_owned(), pattern.to_owned());
        self
    }

    /// Validate the definition stored under `key` and compile its patterns.
    ///
    /// # Errors
    ///
    /// Returns every problem found, one message per field.
    pub fn compile(self, key: &str) -> Result<KnownIssueIdentifier, Vec<String>> {
        let mut problems = Vec::new();
        let missing = |field: &str| format!("Field \"{field}\" of known issue with key {key} is null");

        if self.issue_type.is_none() {
            problems.push(missing("type"));
        }
        let assertion_pattern = match &self.assertion_pattern {
            Some(source) => compile_field(key, "assertionPattern", source, &mut problems),
            None => {
                problems.push(missing("assertionPattern"));
                None
            }
        };
        let mut optional = |field: &str, source: Option<&String>| {
            source.and_then(|s| compile_field(key, field, s, &mut problems))
        };
        let story_pattern = optional("storyPattern", self.story_pattern.as_ref());
        let scenario_pattern = optional("scenarioPattern", self.scenario_pattern.as_ref());
        let step_pattern = optional("stepPattern", self.step_pattern.as_ref());
        let variable_patterns = compile_map(key, "variablePatterns", &self.variable_patterns, &mut problems);
        let dynamic_patterns = compile_map(key, "dynamicPatterns", &self.dynamic_patterns, &mut problems);
        let additional_patterns =
            compile_map(key, "additionalPatterns", &self.additional_patterns, &mut problems);

        match (self.issue_type, assertion_pattern) {
            (Some(issue_type), Some(assertion_pattern)) if problems.is_empty() => {
                Ok(KnownIssueIdentifier {
                    issue_type,
                    assertion_pattern,
                    story_pattern,
                    scenario_pattern,
                    step_pattern,
                    variable_patterns,
                    dynamic_patterns,
                    additional_patterns,
                    fail_scenario_fast: self.fail_scenario_fast,
                    fail_story_fast: self.fail_story_fast,
                })
            }
            _ => Err(problems),
        }
    }
}

fn compile_field(key: &str, field: &str, source: &str, problems: &mut Vec<String>) -> Option<Pattern> {
    Pattern::new(source)
        .map_err(|e| {
            problems.push(format!(
                "Field \"{field}\" of known issue with key {key} is not a valid pattern: {e}"
            ));
        })
        .ok()
}

fn compile_map(
    key: &str,
    field: &str,
    sources: &BTreeMap<String, String>,
    problems: &mut Vec<String>,
) -> BTreeMap<String, Pattern> {
    sources
        .iter()
        .filter_map(|(name, source)| {
            compile_field(key, &format!("{field}.{name}"), source, problems)
                .map(|pattern| (name.clone(), pattern))
        })
        .collect()
}

/// Outcome of matching an identifier against the running test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TestInfoMatch {
    pub(crate) matched: usize,
    pub(crate) mismatched: usize,
}

/// Validated identifier with compiled patterns.
#[derive(Clone, Debug)]
pub struct KnownIssueIdentifier {
    issue_type: KnownIssueType,
    assertion_pattern: Pattern,
    story_pattern: Option<Pattern>,
    scenario_pattern: Option<Pattern>,
    step_pattern: Option<Pattern>,
    variable_patterns: BTreeMap<String, Pattern>,
    dynamic_patterns: BTreeMap<String, Pattern>,
    additional_patterns: BTreeMap<String, Pattern>,
    fail_scenario_fast: bool,
    fail_story_fast: bool,
}

impl KnownIssueIdentifier {
    #[must_use]
    pub fn issue_type(&self) -> KnownIssueType { self.issue_type }

    #[must_use]
    pub fn assertion_pattern(&self) -> &Pattern { &self.assertion_pattern }

    /// Patterns matched against data supplied by named providers.
    #[must_use]
    pub fn dynamic_patterns(&self) -> &BTreeMap<String, Pattern> { &self.dynamic_patterns }

    /// Patterns matched against configuration properties at load time.
    #[must_use]
    pub fn additional_patterns(&self) -> &BTreeMap<String, Pattern> { &self.additional_patterns }

    #[must_use]
    pub fn is_fail_scenario_fast(&self) -> bool { self.fail_scenario_fast }

    #[must_use]
    pub fn is_fail_story_fast(&self) -> bool { self.fail_story_fast }

    /// Score the story, scenario, step and variable patterns against `info`.
    ///
    /// A missing pattern or a missing story, scenario or step name is neither
    /// a match nor a mismatch. A variable pattern whose variable is not set
    /// is a mismatch.
    pub(crate) fn match_test_info(&self, info: &TestInfo) -> TestInfoMatch {
        let mut result = TestInfoMatch::default();
        let mut score = |pattern: Option<&Pattern>, value: Option<&str>| {
            if let (Some(pattern), Some(value)) = (pattern, value) {
                if pattern.matches(value) {
                    result.matched += 1;
                } else {
                    result.mismatched += 1;
                }
            }
        };
        score(self.story_pattern.as_ref(), info.story());
        score(self.scenario_pattern.as_ref(), info.scenario());
        score(self.step_pattern.as_ref(), info.step());
        for (name, pattern) in &self.variable_patterns {
            match info.variable(name) {
                Some(value) if pattern.matches(value) => result.matched += 1,
                _ => result.mismatched += 1,
            }
        }
        result
    }
}
