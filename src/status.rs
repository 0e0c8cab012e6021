use crate::model::{RunResult, RunState};
use std::fmt;

/// The single status used for display: the run's result, or its state while
/// the backend still reports the result as `UNKNOWN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalStatus {
    Result(RunResult),
    State(RunState),
}

impl CanonicalStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Result(r) => r.as_str(),
            Self::State(s) => s.as_str(),
        }
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Active,
    Settled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStatus {
    pub canonical: CanonicalStatus,
    pub is_active: bool,
}

impl ResolvedStatus {
    pub fn row_state(&self) -> RowState {
        if self.is_active {
            RowState::Active
        } else {
            RowState::Settled
        }
    }
}

pub fn is_active_state(state: &RunState) -> bool {
    matches!(state, RunState::Running | RunState::Paused | RunState::Queued)
}

pub fn resolve_status(result: &RunResult, state: &RunState) -> ResolvedStatus {
    let canonical = if *result == RunResult::Unknown {
        CanonicalStatus::State(state.clone())
    } else {
        CanonicalStatus::Result(result.clone())
    };
    ResolvedStatus {
        canonical,
        is_active: is_active_state(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS: &[&str] = &[
        "SUCCESS", "UNSTABLE", "FAILURE", "NOT_BUILT", "ABORTED", "UNKNOWN", "BRAND_NEW",
    ];
    const STATES: &[&str] = &[
        "QUEUED", "RUNNING", "PAUSED", "SKIPPED", "NOT_BUILT", "FINISHED", "BLOCKED",
    ];

    #[test]
    fn canonical_is_state_only_for_unknown_result() {
        for r in RESULTS {
            for s in STATES {
                let resolved = resolve_status(&RunResult::from(*r), &RunState::from(*s));
                if *r == "UNKNOWN" {
                    assert_eq!(resolved.canonical.as_str(), *s, "result {r} state {s}");
                } else {
                    assert_eq!(resolved.canonical.as_str(), *r, "result {r} state {s}");
                }
            }
        }
    }

    #[test]
    fn active_only_for_running_paused_queued() {
        for s in STATES {
            let resolved = resolve_status(&RunResult::Success, &RunState::from(*s));
            let expected = matches!(*s, "RUNNING" | "PAUSED" | "QUEUED");
            assert_eq!(resolved.is_active, expected, "state {s}");
        }
    }

    #[test]
    fn unknown_running_run_shows_running() {
        let resolved = resolve_status(&RunResult::Unknown, &RunState::Running);
        assert_eq!(resolved.canonical, CanonicalStatus::State(RunState::Running));
        assert!(resolved.is_active);
        assert_eq!(resolved.row_state(), RowState::Active);
    }

    #[test]
    fn finished_run_is_settled() {
        let resolved = resolve_status(&RunResult::Failure, &RunState::Finished);
        assert_eq!(resolved.canonical.to_string(), "FAILURE");
        assert_eq!(resolved.row_state(), RowState::Settled);
    }
}
