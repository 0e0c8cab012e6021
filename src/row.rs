use crate::capability::{CapabilityCheck, CapabilityRegistry, MULTIBRANCH_PIPELINE};
use crate::error::RowError;
use crate::model::{Pipeline, Run};
use crate::status::{resolve_status, ResolvedStatus, RowState};
use crate::timing::{ResolvedTimes, TimeResolver};
use crate::url::{build_run_details_url, decode_pipeline_token, DetailTab};
use std::sync::Arc;
use tracing::Span;

const SHORT_COMMIT_LEN: usize = 7;

/// Everything the list renderer needs for one run, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDescriptor {
    /// `{pipeline name}-{run id}`, stable across renders.
    pub key: String,
    pub run_id: String,
    pub label: String,
    pub status: ResolvedStatus,
    pub times: ResolvedTimes,
    pub estimated_duration_in_millis: Option<i64>,
    pub commit: Option<String>,
    /// Decoded branch name; only set for multibranch pipelines.
    pub branch: Option<String>,
    pub message: Option<String>,
    pub detail_url: String,
}

impl RowDescriptor {
    pub fn state(&self) -> RowState {
        self.status.row_state()
    }

    pub fn live_update(&self) -> bool {
        self.status.is_active
    }

    pub fn stop_enabled(&self) -> bool {
        self.status.is_active
    }

    /// Detail path of the same run on another tab.
    pub fn tab_url(&self, tab: DetailTab) -> String {
        match self.detail_url.rsplit_once('/') {
            Some((run_path, _)) => format!("{run_path}/{tab}"),
            None => self.detail_url.clone(),
        }
    }

    /// Elapsed share of the estimated duration for a live row, capped at 99
    /// until the run settles.
    pub fn progress_percent(&self) -> Option<u8> {
        if !self.live_update() {
            return None;
        }
        let elapsed = i128::from(self.times.duration_in_millis?);
        let estimate = i128::from(self.estimated_duration_in_millis.filter(|e| *e > 0)?);
        let percent = (elapsed * 100 / estimate).clamp(0, 99);
        u8::try_from(percent).ok()
    }
}

#[derive(Clone)]
pub struct RowAssembler {
    times: TimeResolver,
    capabilities: Arc<dyn CapabilityCheck>,
    span: Span,
}

impl Default for RowAssembler {
    fn default() -> Self {
        Self::new(
            TimeResolver::default(),
            Arc::new(CapabilityRegistry::with_defaults()),
        )
    }
}

impl RowAssembler {
    pub fn new(times: TimeResolver, capabilities: Arc<dyn CapabilityCheck>) -> Self {
        Self {
            times,
            capabilities,
            span: Span::none(),
        }
    }

    /// Parent span for the per-row spans this assembler opens.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns `Ok(None)` when either input is absent. The only error is a
    /// pipeline token that does not percent-decode.
    pub fn describe(
        &self,
        run: Option<&Run>,
        pipeline: Option<&Pipeline>,
    ) -> Result<Option<RowDescriptor>, RowError> {
        let (Some(run), Some(pipeline)) = (run, pipeline) else {
            return Ok(None);
        };

        let span = tracing::trace_span!(
            parent: &self.span,
            "run_row",
            pipeline = %pipeline.name,
            run = %run.id
        );
        let _entered = span.enter();

        let status = resolve_status(&run.result, &run.state);
        let times = self.times.resolve(
            &status,
            run.duration_in_millis,
            run.start_time.as_deref(),
            run.end_time.as_deref(),
        );

        let token = decode_pipeline_token(&run.pipeline)?;
        let detail_url = build_run_details_url(
            pipeline.organization.as_deref(),
            pipeline.full_name.as_deref(),
            &token,
            &run.id,
            DetailTab::Pipeline,
        );

        let multibranch = pipeline
            .class
            .as_deref()
            .is_some_and(|class| self.capabilities.has_capability(class, MULTIBRANCH_PIPELINE));

        tracing::trace!(
            status = %status.canonical,
            active = status.is_active,
            duration_ms = ?times.duration_in_millis,
            start = ?times.start_time,
            end = ?times.end_time,
            "row resolved"
        );

        Ok(Some(RowDescriptor {
            key: format!("{}-{}", pipeline.name, run.id),
            run_id: run.id.clone(),
            label: run.name.clone().unwrap_or_else(|| run.id.clone()),
            status,
            times,
            estimated_duration_in_millis: run.estimated_duration_in_millis,
            commit: run
                .commit_id
                .as_deref()
                .filter(|c| !c.is_empty())
                .map(|c| c.chars().take(SHORT_COMMIT_LEN).collect()),
            branch: multibranch.then_some(token),
            message: run_message(run),
            detail_url,
        }))
    }
}

/// The newest change set message, falling back to what caused the run.
fn run_message(run: &Run) -> Option<String> {
    run.change_set
        .iter()
        .rev()
        .find_map(|c| c.msg.clone())
        .or_else(|| run.causes.iter().find_map(|c| c.short_description.clone()))
}
