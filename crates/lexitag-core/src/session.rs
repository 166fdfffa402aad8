//! One caller's dictionaries plus the state of its classification runs.
//!
//! Runs happen only when `run` is called. Editing the store afterwards does
//! not touch a completed outcome; the caller runs again to pick up edits.
//! A failed run leaves the last completed outcome in place.

use tracing::{info, warn};

use crate::annotate::{annotate_dataset, AnnotateOptions, RunSummary};
use crate::dataset::{AnnotatedDataset, Dataset};
use crate::dictionary::DictionaryStore;
use crate::error::LexitagError;

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub annotated: AnnotatedDataset,
    pub summary: RunSummary,
}

/// Lifecycle of the most recent run.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed(String),
}

impl RunState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    store: DictionaryStore,
    options: AnnotateOptions,
    state: RunState,
    last_completed: Option<RunOutcome>,
}

impl Session {
    pub fn new(store: DictionaryStore, options: AnnotateOptions) -> Self {
        Self {
            store,
            options,
            state: RunState::Idle,
            last_completed: None,
        }
    }

    pub fn store(&self) -> &DictionaryStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DictionaryStore {
        &mut self.store
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Outcome of the most recent run that completed, even if a later run
    /// failed.
    pub fn last_outcome(&self) -> Option<&RunOutcome> {
        self.last_completed.as_ref()
    }

    /// Classify `records` against a snapshot of the current dictionaries.
    ///
    /// On failure the state becomes `Failed`; the store and the previous
    /// completed outcome are untouched.
    pub fn run(&mut self, records: &Dataset) -> Result<&RunOutcome, LexitagError> {
        let dictionaries = self.store.snapshot();
        self.state = RunState::Running;
        info!(
            records = records.len(),
            dictionaries = dictionaries.len(),
            "Classification run started"
        );

        match annotate_dataset(records, &dictionaries, &self.options) {
            Ok(annotated) => {
                let summary = RunSummary::from_annotated(&annotated);
                info!(
                    records = summary.total_records,
                    any_detected = summary.any_detected,
                    "Classification run completed"
                );
                self.state = RunState::Completed;
                Ok(&*self.last_completed.insert(RunOutcome { annotated, summary }))
            }
            Err(e) => {
                warn!(error = %e, "Classification run failed");
                self.state = RunState::Failed(e.to_string());
                Err(e)
            }
        }
    }
}
