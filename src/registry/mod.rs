//! Task registry: logical task name -> (module, class) of the implementation.
//!
//! Names are derived by convention from class names ending in `Task`
//! (`ProcessCcdTask` -> `processCcd`). The convention is not followed
//! consistently by the task packages, so an override table is applied on top
//! and always wins.

pub mod scan;

pub use scan::scan_package;

use crate::error::{Error, Result};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Identifier pair of an external task implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct TaskRef {
    pub module: String,
    pub class: String,
}

impl TaskRef {
    pub fn new(module: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            class: class.into(),
        }
    }

    /// Name the task runs under (`IngestTask` -> `ingest`).
    pub fn default_name(&self) -> String {
        task_key(&self.class).unwrap_or_else(|| self.class.clone())
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.class)
    }
}

/// A class visible at the top level of a module. `module` is the module that
/// defines it, which differs from the listing module for imported names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    pub name: String,
    pub module: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleListing {
    pub name: String,
    pub classes: Vec<ClassEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub modules: Vec<ModuleListing>,
}

/// Derive the logical task name for a class, if it follows the convention.
pub fn task_key(class: &str) -> Option<String> {
    if !class.to_lowercase().ends_with("task") {
        return None;
    }
    let chars: Vec<char> = class.chars().collect();
    // A bare `Task` base class is not a runnable task; it gets no key.
    if chars.len() <= 4 {
        return None;
    }
    let stem = &chars[..chars.len() - 4];
    let mut key: String = stem[0].to_lowercase().collect();
    key.extend(&stem[1..]);
    Some(key)
}

/// Overrides for tasks whose class names do not match their logical names.
pub fn default_overrides() -> Vec<(String, TaskRef)> {
    vec![
        (
            "ingestImages".to_string(),
            TaskRef::new("lsst.pipe.tasks.ingest", "IngestTask"),
        ),
        (
            "ingestCalibs".to_string(),
            TaskRef::new("lsst.pipe.tasks.ingestCalibs", "IngestCalibsTask"),
        ),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    map: BTreeMap<String, TaskRef>,
}

impl TaskRegistry {
    /// Map every eligible class of `packages`, then apply `overrides`.
    pub fn build<I>(packages: &[Package], overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, TaskRef)>,
    {
        let mut map = BTreeMap::new();
        for pkg in packages {
            for module in &pkg.modules {
                for class in &module.classes {
                    if class.module != module.name {
                        continue;
                    }
                    let Some(key) = task_key(&class.name) else {
                        continue;
                    };
                    let task = TaskRef::new(format!("{}.{}", pkg.name, module.name), &class.name);
                    debug!(%key, %task, "registered task by convention");
                    map.insert(key, task);
                }
            }
        }
        for (key, task) in overrides {
            debug!(%key, %task, "registered task override");
            map.insert(key, task);
        }
        Self { map }
    }

    pub fn get_task(&self, name: &str) -> Result<&TaskRef> {
        self.map
            .get(name)
            .ok_or_else(|| Error::UnknownTask(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn class(name: &str, module: &str) -> ClassEntry {
        ClassEntry {
            name: name.to_string(),
            module: module.to_string(),
        }
    }

    fn pipe_tasks() -> Package {
        Package {
            name: "lsst.pipe.tasks".to_string(),
            modules: vec![
                ModuleListing {
                    name: "processCcd".to_string(),
                    classes: vec![
                        class("ProcessCcdConfig", "processCcd"),
                        class("ProcessCcdTask", "processCcd"),
                        // imported, defined elsewhere
                        class("CalibrateTask", "calibrate"),
                    ],
                },
                ModuleListing {
                    name: "ingest".to_string(),
                    classes: vec![class("IngestTask", "ingest"), class("Task", "ingest")],
                },
            ],
        }
    }

    #[test]
    fn task_key_follows_convention() {
        assert_eq!(task_key("ProcessCcdTask").as_deref(), Some("processCcd"));
        assert_eq!(task_key("IngestTASK").as_deref(), Some("ingest"));
        assert_eq!(task_key("ProcessCcdConfig"), None);
        assert_eq!(task_key("Task"), None);
    }

    #[test]
    fn only_defined_classes_are_registered() {
        let registry = TaskRegistry::build(&[pipe_tasks()], Vec::new());

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["ingest", "processCcd"]);
        // the `Task` base class in `ingest` is not registered under any key
        assert!(registry.get_task("t").is_err());
        assert!(registry.get_task("").is_err());
        assert_eq!(
            registry.get_task("processCcd").unwrap(),
            &TaskRef::new("lsst.pipe.tasks.processCcd", "ProcessCcdTask")
        );
        assert!(matches!(
            registry.get_task("calibrate"),
            Err(Error::UnknownTask(name)) if name == "calibrate"
        ));
    }

    #[test]
    fn overrides_win_on_collision() {
        let overrides = vec![(
            "processCcd".to_string(),
            TaskRef::new("lsst.obs.hsc.processCcd", "HscProcessCcdTask"),
        )];
        let registry = TaskRegistry::build(&[pipe_tasks()], overrides);

        assert_eq!(registry.get_task("processCcd").unwrap().module, "lsst.obs.hsc.processCcd");
    }

    #[test]
    fn default_overrides_cover_ingestion() {
        let registry = TaskRegistry::build(&[], default_overrides());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_task("ingestImages").unwrap().default_name(), "ingest");
        assert_eq!(registry.get_task("ingestCalibs").unwrap().default_name(), "ingestCalibs");
    }

    #[test]
    fn task_ref_display_is_qualified() {
        let task = TaskRef::new("lsst.pipe.tasks.ingest", "IngestTask");
        assert_eq!(task.to_string(), "lsst.pipe.tasks.ingest.IngestTask");
    }
}
