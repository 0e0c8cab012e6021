
use fixtures::*;
use runrow::actions::{ActionOutcome, Collaborators, Location, ReplayControl, RunControl};
use runrow::events::{AppEvent, ChannelRouter};
use runrow::input::{self, Action, InputContext};
use runrow::jenkins::replayed_run_url;
use runrow::loader;
use runrow::model::{Pipeline, Run, RunResult, RunState};
use runrow::row::RowAssembler;
use runrow::status::{CanonicalStatus, RowState};
use runrow::timing::{FixedClock, SkewHarmonizer, TimeResolver};
use runrow::url::DetailTab;
use runrow::error::RowError;
use runrow::capability::CapabilityRegistry;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio::sync::mpsc;

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

fn assembler() -> RowAssembler {
    let times = TimeResolver::new(Arc::new(SkewHarmonizer::default()), Arc::new(FixedClock(now())));
    let mut registry = CapabilityRegistry::with_defaults();
    registry.insert(MULTIBRANCH_CLASS, [runrow::capability::MULTIBRANCH_PIPELINE]);
    RowAssembler::new(times, Arc::new(registry))
}

// ========== Data flow ==========

#[test]
fn full_flow_json_to_rows() {
    let pipeline_json = r#"{
        "_class": "io.jenkins.blueocean.rest.impl.pipeline.MultiBranchPipelineImpl",
        "organization": "jenkins",
        "fullName": "team/app",
        "name": "app"
    }"#;
    let runs_json = r#"[
        {
            "id": "7",
            "pipeline": "feature%2Flogin",
            "result": "UNKNOWN",
            "state": "RUNNING",
            "durationInMillis": 0,
            "startTime": "2023-01-01T00:00:00.000+0000",
            "endTime": "2023-01-01T00:00:01.000+0000",
            "commitId": "abcdef0123456",
            "changeSet": [{"msg": "first"}, {"msg": "second"}]
        },
        {
            "id": "6",
            "pipeline": "master",
            "result": "FAILURE",
            "state": "FINISHED",
            "durationInMillis": 300000,
            "startTime": "2022-12-31T23:50:00.000+0000",
            "endTime": "2022-12-31T23:55:00.000+0000",
            "causes": [{"shortDescription": "Started by user admin"}]
        }
    ]"#;

    let pipeline = loader::parse_pipeline(pipeline_json).expect("pipeline parses");
    let runs = loader::parse_runs(runs_json).expect("runs parse");
    let assembler = assembler();

    let running = assembler
        .describe(Some(&runs[0]), Some(&pipeline))
        .unwrap()
        .unwrap();
    assert_eq!(running.key, "app-7");
    assert_eq!(running.status.canonical, CanonicalStatus::State(RunState::Running));
    assert_eq!(running.state(), RowState::Active);
    assert!(running.live_update());
    assert!(running.stop_enabled());
    assert_eq!(running.times.duration_in_millis, Some(60_000));
    assert_eq!(running.times.end_time, None);
    assert_eq!(running.commit.as_deref(), Some("abcdef0"));
    assert_eq!(running.branch.as_deref(), Some("feature/login"));
    assert_eq!(running.message.as_deref(), Some("second"));
    assert_eq!(
        running.detail_url,
        "/organizations/jenkins/team/app/detail/feature/login/7/pipeline"
    );

    let failed = assembler
        .describe(Some(&runs[1]), Some(&pipeline))
        .unwrap()
        .unwrap();
    assert_eq!(failed.status.canonical, CanonicalStatus::Result(RunResult::Failure));
    assert_eq!(failed.state(), RowState::Settled);
    assert!(!failed.stop_enabled());
    assert_eq!(failed.times.duration_in_millis, Some(300_000));
    assert_eq!(failed.message.as_deref(), Some("Started by user admin"));
}

#[test]
fn load_snapshot_from_files() {
    let dir = std::env::temp_dir().join(format!("runrow-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let pipeline_path = dir.join("pipeline.json");
    let runs_path = dir.join("runs.json");
    let classes_path = dir.join("classes.json");
    std::fs::write(
        &pipeline_path,
        r#"{"organization":"jenkins","fullName":"app","name":"app","_class":"org.example.Custom"}"#,
    )
    .unwrap();
    std::fs::write(&runs_path, r#"[{"id":"1","pipeline":"release%2F1.0"}]"#).unwrap();
    std::fs::write(
        &classes_path,
        r#"{"map":{"org.example.Custom":{"classes":["io.jenkins.blueocean.rest.model.BlueMultiBranchPipeline"]}}}"#,
    )
    .unwrap();

    let snapshot = loader::load_snapshot(&pipeline_path, &runs_path, Some(&classes_path)).unwrap();
    let mut state = runrow::app::AppState::with_clock(config(), Arc::new(FixedClock(now())));
    state.apply_snapshot(snapshot);

    assert_eq!(state.rows.len(), 1);
    assert_eq!(state.rows[0].branch.as_deref(), Some("release/1.0"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn load_snapshot_missing_file_errors() {
    let missing = std::path::Path::new("/nonexistent/runrow/pipeline.json");
    let err = loader::load_snapshot(missing, missing, None).unwrap_err();
    assert!(format!("{err}").contains("Failed to read"));
}

// ========== Row assembly ==========

#[test]
fn absent_inputs_render_nothing() {
    let run = run_with_id("1");
    let p = pipeline();
    assert_eq!(assembler().describe(Some(&run), None), Ok(None));
    assert_eq!(assembler().describe(None, Some(&p)), Ok(None));
}

#[test]
fn malformed_token_fails_the_row() {
    let run = Run {
        pipeline: "bad%E0%A4%A".to_string(),
        ..run_with_id("3")
    };
    let err = assembler().describe(Some(&run), Some(&pipeline())).unwrap_err();
    assert!(matches!(err, RowError::Encoding { .. }));
}

#[test]
fn decoded_token_appears_verbatim_in_detail_url() {
    for (raw, decoded) in [
        ("master", "master"),
        ("feature%2Fx", "feature/x"),
        ("a%20b", "a b"),
        ("caf%C3%A9", "café"),
    ] {
        let run = Run {
            pipeline: raw.to_string(),
            ..run_with_id("4")
        };
        let row = assembler().describe(Some(&run), Some(&pipeline())).unwrap().unwrap();
        assert_eq!(
            row.detail_url,
            format!("/organizations/jenkins/app/detail/{decoded}/4/pipeline")
        );
    }
}

#[test]
fn branch_only_for_multibranch_pipelines() {
    let run = run_with_id("2");
    let plain = assembler().describe(Some(&run), Some(&pipeline())).unwrap().unwrap();
    assert_eq!(plain.branch, None);
    let multi = assembler()
        .describe(Some(&run), Some(&multibranch_pipeline()))
        .unwrap()
        .unwrap();
    assert_eq!(multi.branch.as_deref(), Some("master"));
}

#[test]
fn queued_run_is_active_without_duration() {
    let run = Run {
        result: RunResult::Unknown,
        state: RunState::Queued,
        duration_in_millis: None,
        start_time: None,
        end_time: None,
        ..run_with_id("9")
    };
    let row = assembler().describe(Some(&run), Some(&pipeline())).unwrap().unwrap();
    assert_eq!(row.status.canonical, CanonicalStatus::State(RunState::Queued));
    assert!(row.stop_enabled());
    assert_eq!(row.times.duration_in_millis, None);
}

#[test]
fn clock_skew_is_subtracted_for_running_rows() {
    let times = TimeResolver::new(Arc::new(SkewHarmonizer::new(15_000)), Arc::new(FixedClock(now())));
    let assembler = RowAssembler::new(times, Arc::new(CapabilityRegistry::with_defaults()));
    let row = assembler
        .describe(Some(&run_running("5")), Some(&pipeline()))
        .unwrap()
        .unwrap();
    assert_eq!(row.times.duration_in_millis, Some(45_000));
}

#[test]
fn settled_rows_do_not_depend_on_the_clock() {
    let run = run_failed("8");
    let early = TimeResolver::new(
        Arc::new(SkewHarmonizer::default()),
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2023, 1, 1, 0, 6, 0).unwrap())),
    );
    let late = TimeResolver::new(
        Arc::new(SkewHarmonizer::default()),
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())),
    );
    let registry = Arc::new(CapabilityRegistry::with_defaults());
    let a = RowAssembler::new(early, registry.clone())
        .describe(Some(&run), Some(&pipeline()))
        .unwrap();
    let b = RowAssembler::new(late, registry)
        .describe(Some(&run), Some(&pipeline()))
        .unwrap();
    assert_eq!(a, b);
}

// ========== App state ==========

#[test]
fn state_keeps_good_rows_when_one_fails() {
    let bad = Run {
        pipeline: "%zz".to_string(),
        ..run_with_id("2")
    };
    let state = state_with_runs(vec![run_running("3"), bad, run_failed("1")]);
    assert_eq!(state.rows.len(), 2);
    assert_eq!(state.row_errors.len(), 1);
    assert_eq!(state.row_errors[0].0, "2");
    assert!(state.has_active_rows());
}

#[test]
fn tick_refresh_is_stable_under_fixed_clock() {
    let mut state = state_with_runs(vec![run_running("3")]);
    assert_eq!(state.rows[0].times.duration_in_millis, Some(60_000));
    state.advance_spinner();
    state.refresh_rows();
    assert_eq!(state.spinner_frame, 1);
    assert_eq!(state.rows[0].times.duration_in_millis, Some(60_000));
}

#[test]
fn keys_map_to_row_actions() {
    let ctx = InputContext::default();
    assert_eq!(input::map_key(press(KeyCode::Char('s')), &ctx), Action::Stop);
    assert_eq!(input::map_key(press(KeyCode::Char('R')), &ctx), Action::Replay);
    assert_eq!(
        input::map_key(press(KeyCode::Enter), &ctx),
        Action::OpenTab(DetailTab::Pipeline)
    );
    let loading = InputContext {
        is_loading: true,
        ..InputContext::default()
    };
    assert_eq!(input::map_key(press(KeyCode::Char('r')), &loading), Action::None);
}

// ========== Actions ==========

struct NoStop;

#[async_trait]
impl RunControl for NoStop {
    async fn stop(&self, _pipeline: &Pipeline, _run: &Run) -> Result<()> {
        Ok(())
    }
}

struct ReplayTo(String);

#[async_trait]
impl ReplayControl for ReplayTo {
    async fn replay(&self, _pipeline: &Pipeline, _run: &Run) -> Result<Option<String>> {
        Ok(Some(self.0.clone()))
    }
}

#[tokio::test]
async fn replay_navigates_through_event_channel() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let collaborators = Collaborators {
        run_control: Arc::new(NoStop),
        replay: Arc::new(ReplayTo(
            "/organizations/jenkins/app/detail/master/11/pipeline".to_string(),
        )),
        router: Arc::new(ChannelRouter::new(tx)),
    };
    let mut state = state_with_runs(vec![run_with_id("10")]);
    state.location.search = "?branch=master".to_string();

    let actions = state.current_actions(collaborators).unwrap();
    let outcome = actions.replay().await.unwrap();
    assert_eq!(
        outcome,
        ActionOutcome::Navigated("/organizations/jenkins/app/detail/master/11/pipeline".to_string())
    );

    match rx.try_recv() {
        Ok(AppEvent::Navigate(location)) => {
            assert_eq!(
                location,
                Location {
                    pathname: "/organizations/jenkins/app/detail/master/11/pipeline".to_string(),
                    search: "?branch=master".to_string(),
                }
            );
            state.navigate(location);
        }
        other => panic!("expected Navigate, got {other:?}"),
    }
    assert!(state.location.pathname.ends_with("/11/pipeline"));
}

#[tokio::test]
async fn reload_drops_replay_navigation() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let collaborators = Collaborators {
        run_control: Arc::new(NoStop),
        replay: Arc::new(ReplayTo("/late".to_string())),
        router: Arc::new(ChannelRouter::new(tx)),
    };
    let mut state = state_with_runs(vec![run_with_id("10")]);
    let actions = state.current_actions(collaborators).unwrap();

    state.apply_snapshot(snapshot(pipeline(), vec![run_with_id("10")]));
    assert_eq!(actions.replay().await.unwrap(), ActionOutcome::Discarded);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn stop_is_disabled_for_settled_rows() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let collaborators = Collaborators {
        run_control: Arc::new(NoStop),
        replay: Arc::new(ReplayTo(String::new())),
        router: Arc::new(ChannelRouter::new(tx)),
    };
    let mut state = state_with_runs(vec![run_failed("4")]);
    let actions = state.current_actions(collaborators).unwrap();
    assert!(!actions.stop_enabled());
    assert_eq!(actions.stop().await.unwrap(), ActionOutcome::Disabled);
}

#[test]
fn replay_response_points_at_new_run() {
    let url = replayed_run_url(&pipeline(), &run_with_id("10"), r#"{"id":"11"}"#).unwrap();
    assert_eq!(
        url.as_deref(),
        Some("/organizations/jenkins/app/detail/master/11/pipeline")
    );
}
