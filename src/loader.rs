use crate::capability::CapabilityRegistry;
use crate::model::{Pipeline, Run};
use color_eyre::eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub fn parse_runs(json: &str) -> Result<Vec<Run>> {
    let runs: Vec<Run> = serde_json::from_str(json)?;
    Ok(runs)
}

pub fn parse_pipeline(json: &str) -> Result<Pipeline> {
    let pipeline: Pipeline = serde_json::from_str(json)?;
    Ok(pipeline)
}

#[derive(Deserialize)]
struct ClassEntry {
    #[serde(default)]
    classes: Vec<String>,
}

#[derive(Deserialize)]
struct ClassesResponse {
    map: HashMap<String, ClassEntry>,
}

/// Reads the backend's `classes` response:
/// `{"map": {"<class>": {"classes": ["<capability>", ...]}}}`.
pub fn parse_classes(json: &str) -> Result<CapabilityRegistry> {
    let resp: ClassesResponse = serde_json::from_str(json)?;
    let mut registry = CapabilityRegistry::default();
    for (classifier, entry) in resp.map {
        registry.insert(&classifier, entry.classes);
    }
    Ok(registry)
}

/// Pipeline, runs and capabilities read from disk.
#[derive(Debug)]
pub struct Snapshot {
    pub pipeline: Pipeline,
    pub runs: Vec<Run>,
    pub capabilities: CapabilityRegistry,
}

pub fn load_snapshot(
    pipeline_path: &Path,
    runs_path: &Path,
    classes_path: Option<&Path>,
) -> Result<Snapshot> {
    let pipeline = parse_pipeline(&read(pipeline_path)?)
        .wrap_err_with(|| format!("Invalid pipeline file {}", pipeline_path.display()))?;
    let runs = parse_runs(&read(runs_path)?)
        .wrap_err_with(|| format!("Invalid runs file {}", runs_path.display()))?;

    let mut capabilities = CapabilityRegistry::with_defaults();
    if let Some(path) = classes_path {
        let extra = parse_classes(&read(path)?)
            .wrap_err_with(|| format!("Invalid classes file {}", path.display()))?;
        capabilities.merge(extra);
    }

    tracing::debug!(
        pipeline = %pipeline.name,
        runs = runs.len(),
        classes = capabilities.len(),
        "snapshot loaded"
    );
    Ok(Snapshot {
        pipeline,
        runs,
        capabilities,
    })
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| eyre!("Failed to read {}: {}", path.display(), e))
}
