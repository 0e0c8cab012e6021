use crate::actions::{Collaborators, Location, RowActions};
use crate::loader::Snapshot;
use crate::model::{Pipeline, Run};
use crate::row::{RowAssembler, RowDescriptor};
use crate::timing::{Clock, SkewHarmonizer, SystemClock, TimeResolver};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

// UI constants
pub const SPINNER_FRAME_COUNT: usize = 10;
pub const NARROW_WIDTH_THRESHOLD: u16 = 80;
pub const ERROR_TTL_SECS: u64 = 10;
pub const STATUS_TTL_SECS: u64 = 5;

/// Immutable configuration set at startup.
pub struct AppConfig {
    pub pipeline_path: PathBuf,
    pub runs_path: PathBuf,
    pub classes_path: Option<PathBuf>,
    pub server: Option<String>,
    pub skew_millis: i64,
}

pub struct AppState {
    pub config: AppConfig,

    // Data as last loaded
    pub pipeline: Option<Pipeline>,
    pub runs: Vec<Run>,

    // Rows, recomputed on every tick
    pub rows: Vec<RowDescriptor>,
    pub row_errors: Vec<(String, String)>,

    // Navigation
    pub cursor: usize,
    pub location: Location,

    // Transient UI
    pub status: Option<(String, Instant)>,
    pub error: Option<(String, Instant)>,
    pub spinner_frame: usize,
    pub is_loading: bool,
    pub should_quit: bool,

    assembler: RowAssembler,
    clock: Arc<dyn Clock>,
    inflight: Vec<Arc<RowActions>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            pipeline: None,
            runs: Vec::new(),
            rows: Vec::new(),
            row_errors: Vec::new(),
            cursor: 0,
            location: Location::default(),
            status: None,
            error: None,
            spinner_frame: 0,
            is_loading: false,
            should_quit: false,
            assembler: RowAssembler::default(),
            clock,
            inflight: Vec::new(),
        }
    }

    /// Replaces the loaded data. Rows from the previous snapshot are
    /// discarded, so their pending navigations are dropped.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.discard_inflight();

        let times = TimeResolver::new(
            Arc::new(SkewHarmonizer::new(self.config.skew_millis)),
            self.clock.clone(),
        );
        let span = tracing::info_span!("activity", pipeline = %snapshot.pipeline.name);
        self.assembler = RowAssembler::new(times, Arc::new(snapshot.capabilities)).with_span(span);

        if self.location.pathname.is_empty() {
            self.location = Location::new(activity_path(&snapshot.pipeline));
        }
        self.pipeline = Some(snapshot.pipeline);
        self.runs = snapshot.runs;
        self.is_loading = false;
        self.refresh_rows();
    }

    pub fn refresh_rows(&mut self) {
        let mut rows = Vec::with_capacity(self.runs.len());
        let mut errors = Vec::new();
        for run in &self.runs {
            match self.assembler.describe(Some(run), self.pipeline.as_ref()) {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(run = %run.id, "row dropped: {e}");
                    errors.push((run.id.clone(), e.to_string()));
                }
            }
        }
        self.rows = rows;
        self.row_errors = errors;
        if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len().saturating_sub(1);
        }
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_cursor_down(&mut self) {
        if !self.rows.is_empty() && self.cursor < self.rows.len() - 1 {
            self.cursor += 1;
        }
    }

    pub fn current_row(&self) -> Option<&RowDescriptor> {
        self.rows.get(self.cursor)
    }

    pub fn current_run(&self) -> Option<&Run> {
        let row = self.current_row()?;
        self.runs.iter().find(|r| r.id == row.run_id)
    }

    pub fn has_active_rows(&self) -> bool {
        self.rows.iter().any(RowDescriptor::live_update)
    }

    /// Actions for the row under the cursor. The handle is tracked so a
    /// reload can discard it.
    pub fn current_actions(&mut self, collaborators: Collaborators) -> Option<Arc<RowActions>> {
        let row = self.current_row()?;
        let run = self.current_run()?.clone();
        let pipeline = self.pipeline.clone()?;
        let actions = Arc::new(RowActions::new(
            row,
            pipeline,
            run,
            collaborators,
            self.location.clone(),
        ));
        self.inflight
            .retain(|a| Arc::strong_count(a) > 1 && !a.is_discarded());
        self.inflight.push(actions.clone());
        Some(actions)
    }

    pub fn discard_inflight(&mut self) {
        for actions in self.inflight.drain(..) {
            actions.discard();
        }
    }

    pub fn navigate(&mut self, location: Location) {
        tracing::info!(path = %location.pathname, "navigated");
        self.set_status(format!("→ {}", location.pathname));
        self.location = location;
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAME_COUNT;
    }

    pub fn set_status(&mut self, msg: String) {
        self.status = Some((msg, Instant::now()));
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn set_error(&mut self, msg: String) {
        self.error = Some((msg, Instant::now()));
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn prune_messages(&mut self) {
        if let Some((_, ts)) = &self.error {
            if ts.elapsed().as_secs() >= ERROR_TTL_SECS {
                self.error = None;
            }
        }
        if let Some((_, ts)) = &self.status {
            if ts.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status = None;
            }
        }
    }
}

/// Path of the pipeline's activity list, the view the rows live in.
pub fn activity_path(pipeline: &Pipeline) -> String {
    format!(
        "/organizations/{}/{}/activity",
        pipeline.organization.as_deref().unwrap_or_default(),
        pipeline.full_name.as_deref().unwrap_or_default()
    )
}
