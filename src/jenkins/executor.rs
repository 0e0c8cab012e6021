use crate::actions::{ReplayControl, RunControl};
use crate::model::{Pipeline, Run};
use crate::url::{build_run_details_url, decode_pipeline_token, DetailTab};
use async_trait::async_trait;
use color_eyre::eyre::{eyre, Result};
use tokio::process::Command;

const STOP_QUERY: &str = "?blocking=true&timeOutInSecs=10";

pub async fn run_curl(args: &[&str]) -> Result<String> {
    let output = Command::new("curl").args(args).output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            eyre!("curl not found. Install it to use stop and replay.")
        } else {
            eyre!("Failed to run curl: {}", e)
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("401") || stderr.contains("403") {
            return Err(eyre!(
                "Jenkins rejected the credentials. Check --user (user:api-token)."
            ));
        }
        if stderr.contains("Could not resolve host") || stderr.contains("Failed to connect") {
            return Err(eyre!("Cannot reach the Jenkins server. Check --server."));
        }
        return Err(eyre!("Jenkins request failed: {}", stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Talks to a Jenkins server's REST API through `curl`.
#[derive(Debug, Clone)]
pub struct JenkinsClient {
    server: String,
    user: Option<String>,
}

impl JenkinsClient {
    pub fn new(server: &str, user: Option<String>) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            user,
        }
    }

    /// Browser URL of a detail path built by [`build_run_details_url`].
    pub fn web_url(&self, detail_path: &str) -> String {
        format!("{}/blue{}", self.server, detail_path)
    }

    async fn request(&self, method: &str, resource: &str) -> Result<String> {
        let url = format!("{}{}", self.server, resource);
        let mut args = vec![
            "-sS",
            "--fail-with-body",
            "-X",
            method,
            "-H",
            "Content-Type: application/json",
        ];
        if let Some(user) = &self.user {
            args.push("-u");
            args.push(user);
        }
        args.push(&url);
        tracing::debug!(method, url = %url, "jenkins request");
        run_curl(&args).await
    }
}

fn run_resource(run: &Run) -> Result<String> {
    let href = run
        .self_href()
        .ok_or_else(|| eyre!("Run {} has no backend link", run.id))?;
    Ok(if href.ends_with('/') {
        href.to_string()
    } else {
        format!("{href}/")
    })
}

pub struct JenkinsRunControl {
    client: JenkinsClient,
}

impl JenkinsRunControl {
    pub fn new(client: JenkinsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RunControl for JenkinsRunControl {
    async fn stop(&self, _pipeline: &Pipeline, run: &Run) -> Result<()> {
        let resource = format!("{}stop/{}", run_resource(run)?, STOP_QUERY);
        self.client.request("PUT", &resource).await?;
        Ok(())
    }
}

pub struct JenkinsReplay {
    client: JenkinsClient,
}

impl JenkinsReplay {
    pub fn new(client: JenkinsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReplayControl for JenkinsReplay {
    async fn replay(&self, pipeline: &Pipeline, run: &Run) -> Result<Option<String>> {
        let resource = format!("{}replay/", run_resource(run)?);
        let body = self.client.request("POST", &resource).await?;
        replayed_run_url(pipeline, run, &body)
    }
}

/// Detail path of the run a replay request queued. The response names the
/// new run; its `pipeline` token falls back to the original run's.
pub fn replayed_run_url(pipeline: &Pipeline, original: &Run, body: &str) -> Result<Option<String>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let Some(id) = value.get("id").and_then(serde_json::Value::as_str) else {
        return Ok(None);
    };
    let token = value
        .get("pipeline")
        .and_then(serde_json::Value::as_str)
        .unwrap_or(original.pipeline.as_str());
    let decoded = decode_pipeline_token(token)?;
    Ok(Some(build_run_details_url(
        pipeline.organization.as_deref(),
        pipeline.full_name.as_deref(),
        &decoded,
        id,
        DetailTab::Pipeline,
    )))
}

/// Stands in for the Jenkins collaborators when no server is configured.
pub struct Offline;

#[async_trait]
impl RunControl for Offline {
    async fn stop(&self, _pipeline: &Pipeline, _run: &Run) -> Result<()> {
        Err(eyre!("No Jenkins server configured. Pass --server to stop runs."))
    }
}

#[async_trait]
impl ReplayControl for Offline {
    async fn replay(&self, _pipeline: &Pipeline, _run: &Run) -> Result<Option<String>> {
        Err(eyre!("No Jenkins server configured. Pass --server to replay runs."))
    }
}

pub async fn open_in_browser(url: &str) -> Result<()> {
    let (cmd, args): (&str, Vec<&str>) = if cfg!(target_os = "macos") {
        ("open", vec![url])
    } else if cfg!(target_os = "windows") {
        ("cmd", vec!["/C", "start", url])
    } else {
        ("xdg-open", vec![url])
    };
    Command::new(cmd)
        .args(&args)
        .spawn()
        .map_err(|e| eyre!("Failed to open browser: {}", e))?;
    Ok(())
}
