//! The fixed vocabulary of repository-lifecycle operations a job compiles to.

pub mod calib;
pub mod repo;
pub mod task;

pub use calib::IngestCalibrationFiles;
pub use repo::InitRepository;
pub use task::{IngestData, RunTask};

use crate::error::Result;
use crate::framework::TaskRunner;

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    InitRepository(InitRepository),
    IngestData(IngestData),
    IngestCalibrationFiles(IngestCalibrationFiles),
    RunTask(RunTask),
}

impl Command {
    pub fn kind(&self) -> &'static str {
        match self {
            Command::InitRepository(_) => "InitRepository",
            Command::IngestData(_) => "IngestData",
            Command::IngestCalibrationFiles(_) => "IngestCalibrationFiles",
            Command::RunTask(_) => "RunTask",
        }
    }

    pub fn execute(&self, runner: &dyn TaskRunner) -> Result<()> {
        match self {
            Command::InitRepository(cmd) => cmd.execute(),
            Command::IngestData(cmd) => cmd.execute(runner),
            Command::IngestCalibrationFiles(cmd) => cmd.execute(),
            Command::RunTask(cmd) => cmd.execute(runner),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::InitRepository(cmd) => fmt::Display::fmt(cmd, f),
            Command::IngestData(cmd) => fmt::Display::fmt(cmd, f),
            Command::IngestCalibrationFiles(cmd) => fmt::Display::fmt(cmd, f),
            Command::RunTask(cmd) => fmt::Display::fmt(cmd, f),
        }
    }
}

impl From<InitRepository> for Command {
    fn from(cmd: InitRepository) -> Self {
        Command::InitRepository(cmd)
    }
}

impl From<IngestData> for Command {
    fn from(cmd: IngestData) -> Self {
        Command::IngestData(cmd)
    }
}

impl From<IngestCalibrationFiles> for Command {
    fn from(cmd: IngestCalibrationFiles) -> Self {
        Command::IngestCalibrationFiles(cmd)
    }
}

impl From<RunTask> for Command {
    fn from(cmd: RunTask) -> Self {
        Command::RunTask(cmd)
    }
}
