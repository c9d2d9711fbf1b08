use crate::error::Result;
use crate::framework::TaskRunner;
use crate::registry::TaskRef;

use std::fmt;

/// Record files into a repository's registry through an ingestion task.
///
/// File placement is left entirely to the invoked task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestData {
    pub task: TaskRef,
    pub root: String,
    pub options: Vec<String>,
    pub files: Vec<String>,
}

impl IngestData {
    pub fn new(
        task: TaskRef,
        root: impl Into<String>,
        options: Vec<String>,
        files: impl Into<FileList>,
    ) -> Self {
        Self {
            task,
            root: root.into(),
            options,
            files: files.into().0,
        }
    }

    /// Arguments following the root path: options first, then files.
    pub fn args(&self) -> Vec<String> {
        self.options.iter().chain(&self.files).cloned().collect()
    }

    pub fn execute(&self, runner: &dyn TaskRunner) -> Result<()> {
        runner.run(&self.task, &self.root, &self.args())
    }
}

/// One or many file paths; a single path becomes a one-element list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileList(pub Vec<String>);

impl From<Vec<String>> for FileList {
    fn from(files: Vec<String>) -> Self {
        Self(files)
    }
}

impl From<String> for FileList {
    fn from(file: String) -> Self {
        Self(vec![file])
    }
}

impl From<&str> for FileList {
    fn from(file: &str) -> Self {
        Self(vec![file.to_string()])
    }
}

/// Run a processing task against a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTask {
    pub task: TaskRef,
    pub root: String,
    pub args: Vec<String>,
}

impl RunTask {
    pub fn new(task: TaskRef, root: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            task,
            root: root.into(),
            args,
        }
    }

    pub fn execute(&self, runner: &dyn TaskRunner) -> Result<()> {
        runner.run(&self.task, &self.root, &self.args)
    }
}

/// `<name>.py <root> <args...>`
fn write_invocation(
    f: &mut fmt::Formatter<'_>,
    task: &TaskRef,
    root: &str,
    args: &[String],
) -> fmt::Result {
    write!(f, "{}.py {}", task.default_name(), root)?;
    for arg in args {
        write!(f, " {}", arg)?;
    }
    Ok(())
}

impl fmt::Display for IngestData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_invocation(f, &self.task, &self.root, &self.args())
    }
}

impl fmt::Display for RunTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_invocation(f, &self.task, &self.root, &self.args)
    }
}
