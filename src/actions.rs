use crate::model::{Pipeline, Run};
use crate::row::RowDescriptor;
use async_trait::async_trait;
use color_eyre::eyre::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span};

#[async_trait]
pub trait RunControl: Send + Sync {
    async fn stop(&self, pipeline: &Pipeline, run: &Run) -> Result<()>;
}

#[async_trait]
pub trait ReplayControl: Send + Sync {
    /// Replays `run` and returns the path to navigate to once the replay has
    /// been queued, if any.
    async fn replay(&self, pipeline: &Pipeline, run: &Run) -> Result<Option<String>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    pub search: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            search: String::new(),
        }
    }
}

pub trait Router: Send + Sync {
    fn push(&self, location: Location);
}

/// Collaborators a row hands its actions to.
#[derive(Clone)]
pub struct Collaborators {
    pub run_control: Arc<dyn RunControl>,
    pub replay: Arc<dyn ReplayControl>,
    pub router: Arc<dyn Router>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Dispatched,
    Disabled,
    Navigated(String),
    NoNavigation,
    Discarded,
}

/// The stop and replay actions of one rendered row.
pub struct RowActions {
    pipeline: Pipeline,
    run: Run,
    stop_enabled: bool,
    collaborators: Collaborators,
    location: Location,
    discarded: Arc<AtomicBool>,
    span: Span,
}

impl RowActions {
    pub fn new(
        descriptor: &RowDescriptor,
        pipeline: Pipeline,
        run: Run,
        collaborators: Collaborators,
        location: Location,
    ) -> Self {
        let span = tracing::debug_span!("row_actions", row = %descriptor.key);
        Self {
            pipeline,
            run,
            stop_enabled: descriptor.stop_enabled(),
            collaborators,
            location,
            discarded: Arc::new(AtomicBool::new(false)),
            span,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run.id
    }

    pub fn stop_enabled(&self) -> bool {
        self.stop_enabled
    }

    pub fn is_discarded(&self) -> bool {
        self.discarded.load(Ordering::Acquire)
    }

    /// Marks the row as gone. Navigation requested after this is dropped.
    pub fn discard(&self) {
        self.discarded.store(true, Ordering::Release);
    }

    pub async fn stop(&self) -> Result<ActionOutcome> {
        if !self.stop_enabled {
            tracing::debug!(parent: &self.span, "stop ignored: run is not active");
            return Ok(ActionOutcome::Disabled);
        }
        self.collaborators
            .run_control
            .stop(&self.pipeline, &self.run)
            .instrument(self.span.clone())
            .await?;
        tracing::info!(parent: &self.span, "stop requested");
        Ok(ActionOutcome::Dispatched)
    }

    pub async fn replay(&self) -> Result<ActionOutcome> {
        let target = self
            .collaborators
            .replay
            .replay(&self.pipeline, &self.run)
            .instrument(self.span.clone())
            .await?;
        let Some(url) = target else {
            return Ok(ActionOutcome::NoNavigation);
        };
        if self.is_discarded() {
            tracing::debug!(parent: &self.span, url = %url, "navigation dropped: row discarded");
            return Ok(ActionOutcome::Discarded);
        }
        self.navigate(&url);
        Ok(ActionOutcome::Navigated(url))
    }

    /// Runs [`RowActions::stop`] in the background and hands the outcome to
    /// `report`.
    pub fn spawn_stop<F>(self: Arc<Self>, report: F) -> JoinHandle<()>
    where
        F: FnOnce(&RowActions, Result<ActionOutcome>) + Send + 'static,
    {
        tokio::spawn(async move {
            let outcome = self.stop().await;
            if let Err(e) = &outcome {
                tracing::warn!(parent: &self.span, "stop failed: {e}");
            }
            report(&self, outcome);
        })
    }

    /// Runs [`RowActions::replay`] in the background and hands the outcome
    /// to `report`.
    pub fn spawn_replay<F>(self: Arc<Self>, report: F) -> JoinHandle<()>
    where
        F: FnOnce(&RowActions, Result<ActionOutcome>) + Send + 'static,
    {
        tokio::spawn(async move {
            let outcome = self.replay().await;
            if let Err(e) = &outcome {
                tracing::warn!(parent: &self.span, "replay failed: {e}");
            }
            report(&self, outcome);
        })
    }

    fn navigate(&self, url: &str) {
        let mut location = self.location.clone();
        location.pathname = url.to_string();
        tracing::debug!(parent: &self.span, path = %location.pathname, "navigating");
        self.collaborators.router.push(location);
    }
}
