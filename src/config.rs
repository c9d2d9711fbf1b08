//! Executor and logging configuration (TOML).
//!
//! Executor config:
//! ```toml
//! [registry]
//! packages = [{ name = "lsst.pipe.tasks", path = "/opt/pipe_tasks/python/lsst/pipe/tasks" }]
//!
//! [registry.overrides]
//! processCcd = { module = "lsst.pipe.tasks.processCcd", class = "ProcessCcdTask" }
//!
//! [runner]
//! interpreter = "python"
//! bin_dir = "/opt/pipe_tasks/bin"
//! ```
//!
//! Logging config:
//! ```toml
//! filter = "job_executor=debug"
//! ansi = false
//! ```

use crate::error::{Error, Result};
use crate::framework::RunnerConfig;
use crate::registry::{self, Package, TaskRef, TaskRegistry};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub registry: RegistryConfig,
    pub runner: RunnerConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    pub packages: Vec<PackageSource>,
    /// Applied after the built-in overrides.
    pub overrides: BTreeMap<String, TaskRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PackageSource {
    pub name: String,
    pub path: PathBuf,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        read_toml(path)
    }

    /// Scan the configured packages and merge all overrides.
    pub fn build_registry(&self) -> Result<TaskRegistry> {
        let packages = self
            .registry
            .packages
            .iter()
            .map(|src| registry::scan_package(&src.name, &src.path))
            .collect::<Result<Vec<Package>>>()?;

        let mut overrides = registry::default_overrides();
        overrides.extend(
            self.registry
                .overrides
                .iter()
                .map(|(name, task)| (name.clone(), task.clone())),
        );
        Ok(TaskRegistry::build(&packages, overrides))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directives.
    pub filter: String,
    pub ansi: bool,
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: true,
            target: false,
        }
    }
}

impl LoggingConfig {
    pub fn load(path: &Path) -> Result<Self> {
        read_toml(path)
    }

    /// Install the global subscriber. `RUST_LOG` overrides `filter`.
    pub fn init(&self) -> Result<()> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&self.filter)
                .map_err(|e| Error::Config(format!("bad log filter '{}': {}", self.filter, e)))?,
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(self.ansi)
            .with_target(self.target)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| Error::Config(e.to_string()))
    }
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    toml::from_str(&text).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.runner.suffix, ".py");

        let registry = cfg.build_registry().unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["ingestCalibs", "ingestImages"]);
    }

    #[test]
    fn full_config_builds_registry() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("tasks");
        fs::create_dir(&pkg).unwrap();
        fs::write(pkg.join("processCcd.py"), "class ProcessCcdTask(object):\n    pass\n").unwrap();

        let text = format!(
            r#"
[registry]
packages = [{{ name = "lsst.pipe.tasks", path = "{}" }}]

[registry.overrides]
ingestImages = {{ module = "lsst.obs.hsc.ingest", class = "HscIngestTask" }}

[runner]
interpreter = "python"
"#,
            pkg.display()
        );
        let path = dir.path().join("executor.toml");
        fs::write(&path, text).unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.runner.interpreter.as_deref(), Some("python"));

        let registry = cfg.build_registry().unwrap();
        assert_eq!(
            registry.get_task("processCcd").unwrap(),
            &TaskRef::new("lsst.pipe.tasks.processCcd", "ProcessCcdTask")
        );
        assert_eq!(registry.get_task("ingestImages").unwrap().class, "HscIngestTask");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logging.toml");
        fs::write(&path, "level = \"debug\"\n").unwrap();

        assert!(matches!(LoggingConfig::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn logging_config_parses() {
        let cfg: LoggingConfig = toml::from_str("filter = \"job_executor=debug\"\nansi = false\n").unwrap();
        assert_eq!(
            cfg,
            LoggingConfig {
                filter: "job_executor=debug".to_string(),
                ansi: false,
                target: false,
            }
        );
    }
}
