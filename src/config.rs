//! Run configuration.
//!
//! [`SoftAssertConfig`] gathers the settings needed to wire soft assertions,
//! known-issue resolution and statistics for a run. It can be built in code
//! with the `with_*` methods or deserialised from a JSON document.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use thiserror::Error;

use crate::known_issue::{
    FixPolicy,
    KnownIssueChecker,
    KnownIssueError,
    KnownIssueRegistry,
    StaticIssueStates,
};

/// Errors raised while loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read configuration from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for a test run.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoftAssertConfig {
    /// Location of the known-issue registry. No registry disables matching.
    pub known_issues_path: Option<PathBuf>,
    /// Stop a scenario at the first failure that is not a known issue.
    pub fail_scenario_fast: bool,
    pub fix_policy: FixPolicy,
    /// Tracker state of known issues, keyed by issue identifier.
    pub issue_states: StaticIssueStates,
    /// Folder receiving `statistics.json`.
    pub statistics_folder: Option<PathBuf>,
    /// Run properties matched by the registry's additional patterns.
    pub properties: BTreeMap<String, String>,
}

impl SoftAssertConfig {
    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `json` is not a valid configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> { Ok(serde_json::from_str(json)?) }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if its content is invalid.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&json)
    }

    #[must_use]
    pub fn with_known_issues_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_issues_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_fail_scenario_fast(mut self, enabled: bool) -> Self {
        self.fail_scenario_fast = enabled;
        self
    }

    #[must_use]
    pub fn with_fix_policy(mut self, policy: FixPolicy) -> Self {
        self.fix_policy = policy;
        self
    }

    #[must_use]
    pub fn with_issue_states(mut self, states: StaticIssueStates) -> Self {
        self.issue_states = states;
        self
    }

    #[must_use]
    pub fn with_statistics_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.statistics_folder = Some(folder.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Load the configured registry, or an empty one if none is configured.
    ///
    /// # Errors
    ///
    /// Returns the [`KnownIssueError`] raised while loading the registry.
    pub fn load_registry(&self) -> Result<KnownIssueRegistry, KnownIssueError> {
        match &self.known_issues_path {
            Some(path) => KnownIssueRegistry::from_path(path, &self.properties),
            None => Ok(KnownIssueRegistry::default()),
        }
    }

    /// Build a checker over the configured registry, issue states and fix
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns the [`KnownIssueError`] raised while loading the registry.
    pub fn known_issue_checker(&self) -> Result<KnownIssueChecker, KnownIssueError> {
        let checker = KnownIssueChecker::new(Arc::new(self.load_registry()?))
            .with_fix_policy(self.fix_policy.clone());
        Ok(if self.issue_states.is_empty() {
            checker
        } else {
            checker.with_state_provider(Arc::new(self.issue_states.clone()))
        })
    }
}
