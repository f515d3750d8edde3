//! Configuration-time loading of known-issue identifiers.
//!
//! Malformed registries fail fast here so that resolution at runtime is a
//! total, read-only lookup.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::identifier::{IdentifierDefinition, KnownIssueIdentifier};

/// Errors raised while loading a known-issue registry.
#[derive(Debug, Error)]
pub enum KnownIssueError {
    /// One or more identifiers are incomplete or carry invalid patterns.
    #[error("[{}]", .0.join(", "))]
    InvalidIdentifiers(Vec<String>),
    /// The registry document is not valid JSON of the expected shape.
    #[error("unable to parse known issues from {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    /// The registry file exists but could not be read.
    #[error("unable to read known issues from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Immutable set of known-issue identifiers keyed by issue key.
///
/// Iteration follows key order, which makes resolution deterministic when
/// several identifiers match equally well.
#[derive(Clone, Debug, Default)]
pub struct KnownIssueRegistry {
    identifiers: BTreeMap<String, KnownIssueIdentifier>,
}

impl KnownIssueRegistry {
    /// Validate and compile `definitions`, then drop identifiers whose
    /// additional patterns do not match `properties`.
    ///
    /// # Errors
    ///
    /// Returns [`KnownIssueError::InvalidIdentifiers`] listing every problem
    /// found across all definitions.
    pub fn from_definitions(
        definitions: BTreeMap<String, IdentifierDefinition>,
        properties: &BTreeMap<String, String>,
    ) -> Result<Self, KnownIssueError> {
        let mut problems = Vec::new();
        let mut identifiers = BTreeMap::new();
        for (key, definition) in definitions {
            match definition.compile(&key) {
                Ok(identifier) => {
                    identifiers.insert(key, identifier);
                }
                Err(mut errors) => problems.append(&mut errors),
            }
        }
        if !problems.is_empty() {
            return Err(KnownIssueError::InvalidIdentifiers(problems));
        }
        identifiers.retain(|key, identifier| is_applicable(key, identifier, properties));
        Ok(Self { identifiers })
    }

    /// Parse a JSON object of identifiers keyed by issue key.
    ///
    /// # Errors
    ///
    /// Returns [`KnownIssueError::Parse`] for malformed JSON and
    /// [`KnownIssueError::InvalidIdentifiers`] for invalid entries.
    pub fn from_json(
        json: &str,
        location: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<Self, KnownIssueError> {
        debug!(location, "loading known issue identifiers");
        let definitions: BTreeMap<String, IdentifierDefinition> = serde_json::from_str(json)
            .map_err(|source| KnownIssueError::Parse {
                location: location.to_owned(),
                source,
            })?;
        Self::from_definitions(definitions, properties)
    }

    /// Load identifiers from a JSON file.
    ///
    /// A missing file disables known-issue matching and yields an empty
    /// registry.
    ///
    /// # Errors
    ///
    /// Returns [`KnownIssueError::Io`] when the file cannot be read, plus the
    /// errors of [`KnownIssueRegistry::from_json`].
    pub fn from_path(
        path: &Path,
        properties: &BTreeMap<String, String>,
    ) -> Result<Self, KnownIssueError> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "known issue functionality is not available: no registry found"
                );
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(KnownIssueError::Io {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        Self::from_json(&json, &path.display().to_string(), properties)
    }

    #[must_use]
    pub fn len(&self) -> usize { self.identifiers.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.identifiers.is_empty() }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&KnownIssueIdentifier> { self.identifiers.get(key) }

    /// Iterate identifiers in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KnownIssueIdentifier)> {
        self.identifiers.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn is_applicable(
    key: &str,
    identifier: &KnownIssueIdentifier,
    properties: &BTreeMap<String, String>,
) -> bool {
    for (property, pattern) in identifier.additional_patterns() {
        let value = properties.get(property).map(String::as_str);
        if !value.is_some_and(|v| pattern.matches(v)) {
            info!(
                issue = key,
                %pattern,
                actual = value.unwrap_or("<unset>"),
                "known issue filtered out by additional pattern"
            );
            return false;
        }
    }
    true
}
