//! EYE reasoner subprocess adapter
//!
//! Shells out to the EYE (Euler Yet another proof Engine) N3 reasoner:
//! `eye --nope --pass <state> <rules>`. State and rules are written to
//! temporary files; the configured deadline is enforced with a tokio timeout
//! and the child is killed when the deadline fires.

use crate::config::ReasonerConfig;
use crate::error::{EngineError, EngineResult};
use crate::ports::reasoner::{Reasoner, ReasoningOutput};
use async_trait::async_trait;
use std::io::Write;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tokio::process::Command;

/// Adapter over the EYE executable
pub struct EyeReasoner {
    config: ReasonerConfig,
}

impl EyeReasoner {
    /// Create an adapter, probing for the executable
    ///
    /// Fails with `Unavailable` when EYE is not installed, so a misconfigured
    /// core surfaces at construction rather than mid-run.
    pub fn new(config: ReasonerConfig) -> EngineResult<Self> {
        let reasoner = Self::new_unchecked(config);
        if !reasoner.is_available() {
            return Err(EngineError::Unavailable(format!(
                "EYE reasoner not found at '{}'. Install from https://github.com/eyereasoner/eye",
                reasoner.config.eye_path
            )));
        }
        Ok(reasoner)
    }

    /// Create an adapter without the availability probe (testing)
    pub fn new_unchecked(config: ReasonerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    fn build_command(&self, state_path: &str, rules_path: &str) -> Vec<String> {
        let mut cmd = vec![self.config.eye_path.clone()];
        if self.config.nope {
            cmd.push("--nope".to_string());
        }
        if self.config.pass_all {
            cmd.push("--pass".to_string());
        }
        cmd.push(state_path.to_string());
        cmd.push(rules_path.to_string());
        cmd
    }

    /// Reason over state and rules already on disk
    pub async fn reason_with_files(&self, state_path: &str, rules_path: &str) -> ReasoningOutput {
        let args = self.build_command(state_path, rules_path);
        let start = Instant::now();

        let mut command = Command::new(&args[0]);
        command
            .args(&args[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                return ReasoningOutput::failed(
                    format!("Failed to spawn EYE process: {}", e),
                    duration_ms(start),
                );
            }
        };

        let deadline = Duration::from_secs(self.config.timeout_seconds);
        match tokio::time::timeout(deadline, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                if output.status.success() {
                    ReasoningOutput {
                        success: true,
                        output: String::from_utf8_lossy(&output.stdout).into_owned(),
                        error: None,
                        duration_ms: duration_ms(start),
                        timed_out: false,
                    }
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    let message = if stderr.trim().is_empty() {
                        format!("EYE process exited with {}", output.status)
                    } else {
                        stderr.into_owned()
                    };
                    ReasoningOutput::failed(message, duration_ms(start))
                }
            }
            Ok(Err(e)) => {
                ReasoningOutput::failed(format!("EYE process error: {}", e), duration_ms(start))
            }
            // The dropped future owns the child; kill_on_drop reaps it
            Err(_) => ReasoningOutput::timed_out(
                format!(
                    "EYE reasoning timed out after {}s",
                    self.config.timeout_seconds
                ),
                duration_ms(start),
            ),
        }
    }

    fn write_scratch(suffix: &str, content: &str) -> EngineResult<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .map_err(|e| EngineError::Reasoner(format!("Failed to create temp file: {}", e)))?;
        file.write_all(content.as_bytes())
            .map_err(|e| EngineError::Reasoner(format!("Failed to write temp file: {}", e)))?;
        Ok(file)
    }
}

#[async_trait]
impl Reasoner for EyeReasoner {
    fn is_available(&self) -> bool {
        std::process::Command::new(&self.config.eye_path)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    async fn reason(&self, state: &str, rules: &str) -> ReasoningOutput {
        let start = Instant::now();
        let state_file = match Self::write_scratch(".ttl", state) {
            Ok(file) => file,
            Err(e) => return ReasoningOutput::failed(e.to_string(), duration_ms(start)),
        };
        let rules_file = match Self::write_scratch(".n3", rules) {
            Ok(file) => file,
            Err(e) => return ReasoningOutput::failed(e.to_string(), duration_ms(start)),
        };

        let state_path = state_file.path().to_string_lossy().into_owned();
        let rules_path = rules_file.path().to_string_lossy().into_owned();
        // Temp files stay alive until after the subprocess finishes
        self.reason_with_files(&state_path, &rules_path).await
    }
}

fn duration_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
