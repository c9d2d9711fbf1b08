//! Boundary to the external task framework.
//!
//! Commands never touch process-wide state to hand arguments over: the root
//! path and argument vector are passed explicitly to [`TaskRunner::run`].

use crate::error::{Error, Result};
use crate::registry::TaskRef;

use serde::Deserialize;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Capability to run one external task to completion.
pub trait TaskRunner {
    /// Run `task` against the repository at `root`. The task sees
    /// `[name, root, args...]` as its argument vector.
    fn run(&self, task: &TaskRef, root: &str, args: &[String]) -> Result<()>;
}

/// How task executables are located and launched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Optional interpreter, e.g. `python`.
    pub interpreter: Option<String>,
    /// Directory holding the task executables; `PATH` lookup when unset.
    pub bin_dir: Option<PathBuf>,
    pub suffix: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: None,
            bin_dir: None,
            suffix: ".py".to_string(),
        }
    }
}

/// Runs each task as a child process and waits for it.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    config: RunnerConfig,
}

impl ProcessRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    fn program(&self, task: &TaskRef) -> PathBuf {
        let file = format!("{}{}", task.default_name(), self.config.suffix);
        match &self.config.bin_dir {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    }

    fn command(&self, task: &TaskRef, root: &str, args: &[String]) -> Command {
        let program = self.program(task);
        let mut cmd = match &self.config.interpreter {
            Some(interp) => {
                let mut c = Command::new(interp);
                c.arg(&program);
                c
            }
            None => Command::new(&program),
        };
        cmd.arg(root).args(args);
        cmd
    }
}

impl TaskRunner for ProcessRunner {
    fn run(&self, task: &TaskRef, root: &str, args: &[String]) -> Result<()> {
        let mut cmd = self.command(task, root, args);
        debug!(%task, command = ?cmd, "spawning task");

        let status = cmd.status().map_err(|e| Error::TaskExecutionFailure {
            task: task.to_string(),
            detail: format!("cannot start {}: {}", self.program(task).display(), e),
        })?;
        if !status.success() {
            return Err(Error::TaskExecutionFailure {
                task: task.to_string(),
                detail: format!("exited with {}", status),
            });
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ingest() -> TaskRef {
        TaskRef::new("lsst.pipe.tasks.ingest", "IngestTask")
    }

    #[test]
    fn program_defaults_to_path_lookup() {
        let runner = ProcessRunner::default();
        assert_eq!(runner.program(&ingest()), PathBuf::from("ingest.py"));
    }

    #[test]
    fn command_line_with_interpreter_and_bin_dir() {
        let runner = ProcessRunner::new(RunnerConfig {
            interpreter: Some("python".to_string()),
            bin_dir: Some(PathBuf::from("/opt/pipe_tasks/bin")),
            suffix: ".py".to_string(),
        });
        let cmd = runner.command(&ingest(), "/repo", &["--mode".to_string(), "copy".to_string()]);

        assert_eq!(cmd.get_program(), "python");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["/opt/pipe_tasks/bin/ingest.py", "/repo", "--mode", "copy"]);
    }

    #[test]
    fn missing_executable_is_task_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(RunnerConfig {
            bin_dir: Some(dir.path().to_path_buf()),
            ..RunnerConfig::default()
        });

        let err = runner.run(&ingest(), "/repo", &[]).unwrap_err();
        assert!(matches!(err, Error::TaskExecutionFailure { .. }));
    }
}
