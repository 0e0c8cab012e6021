use serde::Deserialize;
use std::fmt;

/// Outcome reported by the backend for a run. `Unknown` is the backend's
/// sentinel for "no result yet"; anything unrecognised is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum RunResult {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
    #[default]
    Unknown,
    Other(String),
}

impl RunResult {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "SUCCESS",
            Self::Unstable => "UNSTABLE",
            Self::Failure => "FAILURE",
            Self::NotBuilt => "NOT_BUILT",
            Self::Aborted => "ABORTED",
            Self::Unknown => "UNKNOWN",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for RunResult {
    fn from(s: String) -> Self {
        match s.as_str() {
            "SUCCESS" => Self::Success,
            "UNSTABLE" => Self::Unstable,
            "FAILURE" => Self::Failure,
            "NOT_BUILT" => Self::NotBuilt,
            "ABORTED" => Self::Aborted,
            "UNKNOWN" => Self::Unknown,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for RunResult {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state reported by the backend for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum RunState {
    Queued,
    Running,
    Paused,
    Skipped,
    NotBuilt,
    #[default]
    Finished,
    Other(String),
}

impl RunState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
            Self::Skipped => "SKIPPED",
            Self::NotBuilt => "NOT_BUILT",
            Self::Finished => "FINISHED",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for RunState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "QUEUED" => Self::Queued,
            "RUNNING" => Self::Running,
            "PAUSED" => Self::Paused,
            "SKIPPED" => Self::Skipped,
            "NOT_BUILT" => Self::NotBuilt,
            "FINISHED" => Self::Finished,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for RunState {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChangeSetEntry {
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cause {
    #[serde(default)]
    pub short_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Link {
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunLinks {
    #[serde(rename = "self", default)]
    pub self_link: Option<Link>,
}

/// One execution of a pipeline as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: String,
    /// Percent-encoded branch or job token.
    pub pipeline: String,
    #[serde(default)]
    pub result: RunResult,
    #[serde(default)]
    pub state: RunState,
    #[serde(default)]
    pub duration_in_millis: Option<i64>,
    #[serde(default)]
    pub estimated_duration_in_millis: Option<i64>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub commit_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub change_set: Vec<ChangeSetEntry>,
    #[serde(default)]
    pub causes: Vec<Cause>,
    #[serde(rename = "_links", default)]
    pub links: RunLinks,
}

impl Run {
    /// Backend resource path of this run, e.g. `/blue/rest/organizations/jenkins/pipelines/p/runs/1/`.
    pub fn self_href(&self) -> Option<&str> {
        self.links.self_link.as_ref().map(|l| l.href.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Backend class name, used for capability checks.
    #[serde(rename = "_class", default)]
    pub class: Option<String>,
}
