//! Run statistics collected from story lifecycle callbacks.
//!
//! [`StatisticsReporter`] rebuilds the story, scenario and step tree of each
//! session as it runs. A node's status is the worst status of its children,
//! and every completed node is counted into a run-wide [`Statistic`] for its
//! [`NodeType`]. The totals are written as `statistics.json` once the run is
//! over.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    assertion::StepFailure,
    config::SoftAssertConfig,
    event::{AssertionFailedEvent, AssertionListener},
    reporter::{Scenario, Story, StoryReporter},
    session::SessionId,
    status::Status,
};

/// Name of the file written by [`StatisticsReporter::write_statistics`].
pub const STATISTICS_FILE: &str = "statistics.json";

/// Steps whose name contains this marker verify soft assertions that were
/// already counted when they failed.
pub const VERIFY_STEP: &str = "verifyIfAssertionsPassed";

/// Kind of node in the story tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Story,
    Scenario,
    Step,
    GivenStory,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [
        NodeType::Story,
        NodeType::Scenario,
        NodeType::Step,
        NodeType::GivenStory,
    ];
}

/// Counters for one [`NodeType`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistic {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub broken: u64,
    pub skipped: u64,
    pub pending: u64,
    pub known_issue: u64,
}

impl Statistic {
    /// Count one node finished with `status`.
    pub fn record(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Passed => self.passed += 1,
            Status::Failed => self.failed += 1,
            Status::Broken => self.broken += 1,
            Status::Skipped => self.skipped += 1,
            Status::Pending => self.pending += 1,
            Status::KnownIssuesOnly => self.known_issue += 1,
            Status::NotCovered => {}
        }
    }
}

/// A failure collected for the run summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub story: Option<String>,
    pub message: String,
}

/// Errors raised while writing statistics.
#[derive(Debug, Error)]
pub enum StatisticsError {
    #[error("unable to write statistics.json into folder {}: {source}", folder.display())]
    Io {
        folder: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to serialise statistics: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug)]
struct Node {
    node_type: NodeType,
    status: Option<Status>,
    declares_children: bool,
    children: Vec<Status>,
}

impl Node {
    fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            status: None,
            declares_children: false,
            children: Vec::new(),
        }
    }

    fn update(&mut self, status: Status) {
        if self.status.is_none_or(|current| status.is_worse_than(current)) {
            self.status = Some(status);
        }
    }
}

#[derive(Debug, Default)]
struct SessionTree {
    story: Option<String>,
    stack: Vec<Node>,
}

/// Collects per-[`NodeType`] statistics for a whole run.
#[derive(Debug)]
pub struct StatisticsReporter {
    sessions: DashMap<SessionId, SessionTree>,
    totals: Mutex<BTreeMap<NodeType, Statistic>>,
    failures: Option<Mutex<Vec<Failure>>>,
}

impl Default for StatisticsReporter {
    fn default() -> Self {
        Self {
            sessions: DashMap::new(),
            totals: Mutex::new(
                NodeType::ALL
                    .into_iter()
                    .map(|node_type| (node_type, Statistic::default()))
                    .collect(),
            ),
            failures: None,
        }
    }
}

impl StatisticsReporter {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Also collect the message of every failed assertion and broken step.
    #[must_use]
    pub fn with_collected_failures(mut self) -> Self {
        self.failures = Some(Mutex::new(Vec::new()));
        self
    }

    /// Snapshot of the counters gathered so far.
    #[must_use]
    pub fn statistics(&self) -> BTreeMap<NodeType, Statistic> {
        self.totals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Failures collected so far, or `None` if collection is disabled.
    #[must_use]
    pub fn failures(&self) -> Option<Vec<Failure>> {
        self.failures
            .as_ref()
            .map(|failures| failures.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    /// Write the counters as pretty-printed JSON into `folder`, creating it
    /// if needed, and return the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns a [`StatisticsError`] if the folder or file cannot be written.
    pub fn write_statistics(&self, folder: &Path) -> Result<PathBuf, StatisticsError> {
        let io_error = |source| StatisticsError::Io {
            folder: folder.to_owned(),
            source,
        };
        let json = serde_json::to_string_pretty(&self.statistics())?;
        std::fs::create_dir_all(folder).map_err(io_error)?;
        let path = folder.join(STATISTICS_FILE);
        std::fs::write(&path, json).map_err(io_error)?;
        debug!(path = %path.display(), "statistics written");
        Ok(path)
    }

    /// Write the counters into the folder named by `config`, if one is set.
    ///
    /// Returns the path of the written file, or `None` when no folder is
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns a [`StatisticsError`] if the folder or file cannot be written.
    pub fn write_configured(
        &self,
        config: &SoftAssertConfig,
    ) -> Result<Option<PathBuf>, StatisticsError> {
        config
            .statistics_folder
            .as_deref()
            .map(|folder| self.write_statistics(folder))
            .transpose()
    }

    fn with_tree(&self, session: SessionId, f: impl FnOnce(&mut SessionTree)) {
        match self.sessions.get_mut(&session) {
            Some(mut tree) => f(&mut tree),
            None => debug!(%session, "no running story; statistics callback ignored"),
        }
    }

    fn start_node(&self, session: SessionId, node: Node) {
        self.with_tree(session, |tree| tree.stack.push(node));
    }

    fn update_tail(&self, session: SessionId, status: Status) {
        self.with_tree(session, |tree| {
            if let Some(tail) = tree.stack.last_mut() {
                tail.update(status);
            }
        });
    }

    fn end_step(&self, session: SessionId, status: Status) {
        self.with_tree(session, |tree| {
            if let Some(tail) = tree.stack.last_mut() {
                tail.update(status);
            }
            self.end_node(tree);
        });
    }

    fn end_node(&self, tree: &mut SessionTree) {
        let Some(mut node) = tree.stack.pop() else {
            warn!("statistics node ended but none is open");
            return;
        };
        if node.children.is_empty() && node.declares_children {
            node.status = Some(Status::Skipped);
        } else if node.status.is_none() {
            node.status = Some(Status::Passed);
        }
        if let Some(worst) = node.children.iter().copied().reduce(Status::worse_of) {
            node.update(worst);
        }
        let status = node.status.unwrap_or(Status::Passed);

        // Steps running nested steps are containers and are not counted.
        if node.node_type != NodeType::Step || node.children.is_empty() {
            self.totals
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(node.node_type)
                .or_default()
                .record(status);
        }
        if let Some(parent) = tree.stack.last_mut() {
            parent.children.push(status);
        }
    }

    fn add_failure(&self, session: SessionId, message: impl FnOnce() -> String) {
        let Some(failures) = &self.failures else {
            return;
        };
        let story = self
            .sessions
            .get(&session)
            .and_then(|tree| tree.story.clone());
        failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Failure {
                story,
                message: message(),
            });
    }
}

impl AssertionListener for StatisticsReporter {
    fn on_assertion_failed(&self, event: &AssertionFailedEvent) {
        let session = event.session();
        self.add_failure(session, || {
            event.soft_assertion_error().error().message().to_owned()
        });
        self.update_tail(session, Status::from_event(event));
    }
}

impl StoryReporter for StatisticsReporter {
    fn before_story(&self, session: SessionId, story: &Story) {
        if story.given {
            self.start_node(session, Node::new(NodeType::GivenStory));
        } else {
            let tree = SessionTree {
                story: Some(story.path.clone()),
                stack: vec![Node::new(NodeType::Story)],
            };
            if self.sessions.insert(session, tree).is_some() {
                warn!(%session, "previous story never finished; its statistics are dropped");
            }
        }
    }

    fn after_story(&self, session: SessionId, story: &Story) {
        self.with_tree(session, |tree| self.end_node(tree));
        if !story.given {
            self.sessions.remove(&session);
        }
    }

    fn before_scenario(&self, session: SessionId, scenario: &Scenario) {
        let mut node = Node::new(NodeType::Scenario);
        node.declares_children = !scenario.steps.is_empty();
        self.start_node(session, node);
    }

    fn after_scenario(&self, session: SessionId) { self.with_tree(session, |tree| self.end_node(tree)); }

    fn before_step(&self, session: SessionId, _step: &str) {
        self.start_node(session, Node::new(NodeType::Step));
    }

    fn successful(&self, session: SessionId, _step: &str) { self.end_step(session, Status::Passed); }

    fn ignorable(&self, session: SessionId, _step: &str) { self.end_step(session, Status::Skipped); }

    fn pending(&self, session: SessionId, _step: &str) { self.end_step(session, Status::Pending); }

    fn not_performed(&self, session: SessionId, _step: &str) {
        self.end_step(session, Status::Skipped);
    }

    fn failed(&self, session: SessionId, step: &str, failure: &StepFailure) {
        if step.contains(VERIFY_STEP) {
            self.with_tree(session, |tree| self.end_node(tree));
            return;
        }
        let status = Status::from_failure(failure);
        if status == Status::Broken {
            self.add_failure(session, || failure.to_string());
        }
        self.end_step(session, status);
    }
}
