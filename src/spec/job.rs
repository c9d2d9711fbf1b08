//! Job description (job.json).
//!
//! JSON shape:
//! {
//!   "input":  { "root": "/data/repo", "mapper": "lsst.obs.hsc.HscMapper" },
//!   "output": { "root": "/data/out" },
//!   "data":   [ { "pfn": "HSCA00001.fits", "meta": {} } ],
//!   "calibs": [ { "pfn": "BIAS-2013-11-03-004.fits", "meta": { "type": "bias" } } ],
//!   "task":   { "name": "processCcd", "args": ["--id", "visit=1"] }
//! }
//!
//! `data` and `calibs` are optional. The presence of `data` means the input
//! repository is built from scratch before the task runs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JobDescription {
    pub input: RepositorySpec,
    pub output: RepositorySpec,

    #[serde(default)]
    pub data: Option<Vec<FileRecord>>,

    #[serde(default)]
    pub calibs: Option<Vec<FileRecord>>,

    pub task: TaskSpec,
}

/// Location and layout convention of a dataset repository.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RepositorySpec {
    pub root: String,

    #[serde(default)]
    pub mapper: Option<String>,

    #[serde(default = "default_readonly")]
    pub readonly: bool,
}

fn default_readonly() -> bool {
    true
}

/// A physical file plus the metadata describing it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileRecord {
    pub pfn: String,

    #[serde(default)]
    pub meta: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TaskSpec {
    pub name: String,

    #[serde(default)]
    pub args: Vec<String>,
}

impl FileRecord {
    #[cfg(test)]
    pub fn new(pfn: impl Into<String>, meta: Map<String, Value>) -> Self {
        Self {
            pfn: pfn.into(),
            meta,
        }
    }

    /// Calibration kind, if the record declares one.
    pub fn calib_type(&self) -> Option<&str> {
        self.meta.get("type").and_then(Value::as_str)
    }

    /// Last path component of `pfn`.
    pub fn file_name(&self) -> &str {
        self.pfn.rsplit('/').next().unwrap_or(&self.pfn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn optional_sections_default() {
        let job: JobDescription = serde_json::from_str(
            r#"{
                "input": { "root": "/in" },
                "output": { "root": "/out" },
                "task": { "name": "processCcd" }
            }"#,
        )
        .unwrap();

        assert!(job.input.readonly);
        assert_eq!(job.input.mapper, None);
        assert_eq!(job.data, None);
        assert_eq!(job.calibs, None);
        assert!(job.task.args.is_empty());
    }

    #[test]
    fn file_record_helpers() {
        let rec: FileRecord = serde_json::from_str(
            r#"{ "pfn": "/cal/FLAT-2013-11-03-g-HSC-004.fits", "meta": { "type": "flat" } }"#,
        )
        .unwrap();

        assert_eq!(rec.calib_type(), Some("flat"));
        assert_eq!(rec.file_name(), "FLAT-2013-11-03-g-HSC-004.fits");
    }
}
