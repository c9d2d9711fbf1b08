//! Structural validation of job descriptions against a JSON Schema.
//!
//! Validation is a hard gate: a document that fails here never reaches the
//! compiler.

use crate::error::{Error, Result};
use crate::spec::JobDescription;

use jsonschema::Validator;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, error};

/// Draft-04 schema bundled with the executor.
const DEFAULT_SCHEMA: &str = include_str!("job.schema.json");

pub struct JobSchema {
    validator: Validator,
}

impl JobSchema {
    /// Compile the bundled schema.
    pub fn bundled() -> Result<Self> {
        let schema: Value = serde_json::from_str(DEFAULT_SCHEMA)?;
        Self::from_value(&schema)
    }

    pub fn from_value(schema: &Value) -> Result<Self> {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| Error::InvalidSchema(e.to_string()))?;
        Ok(Self { validator })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let schema: Value = serde_json::from_str(&text)?;
        debug!(schema = %path.display(), "loaded job schema");
        Self::from_value(&schema)
    }

    /// Check `doc` against the schema. Every violation is logged; the first
    /// one is returned.
    pub fn validate(&self, doc: &Value) -> Result<()> {
        let mut first = None;
        for err in self.validator.iter_errors(doc) {
            let path = err.instance_path.to_string();
            let constraint = err.schema_path.to_string();
            error!(path = %path, constraint = %constraint, "{}", err);
            if first.is_none() {
                first = Some(Error::SchemaViolation {
                    constraint,
                    path: if path.is_empty() { "/".to_string() } else { path },
                    detail: err.to_string(),
                });
            }
        }
        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Parse, validate, then deserialize a job description.
pub fn load_job(text: &str, schema: &JobSchema) -> Result<JobDescription> {
    let doc: Value = serde_json::from_str(text)?;
    schema.validate(&doc)?;
    Ok(serde_json::from_value(doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn valid_job() -> Value {
        json!({
            "input": { "root": "/in", "mapper": "lsst.obs.hsc.HscMapper" },
            "output": { "root": "/out" },
            "data": [ { "pfn": "a.fits", "meta": {} } ],
            "task": { "name": "processCcd", "args": ["--id", "visit=1"] }
        })
    }

    #[test]
    fn bundled_schema_accepts_valid_job() {
        let schema = JobSchema::bundled().unwrap();
        let job = load_job(&valid_job().to_string(), &schema).unwrap();
        assert_eq!(job.task.name, "processCcd");
        assert_eq!(job.data.unwrap().len(), 1);
    }

    #[test]
    fn missing_task_is_rejected() {
        let schema = JobSchema::bundled().unwrap();
        let mut doc = valid_job();
        doc.as_object_mut().unwrap().remove("task");

        match schema.validate(&doc) {
            Err(Error::SchemaViolation { constraint, path, .. }) => {
                assert_eq!(path, "/");
                assert!(constraint.contains("required"), "{constraint}");
            }
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[test]
    fn empty_data_list_is_rejected() {
        let schema = JobSchema::bundled().unwrap();
        let mut doc = valid_job();
        doc["data"] = json!([]);

        match schema.validate(&doc) {
            Err(Error::SchemaViolation { constraint, path, .. }) => {
                assert_eq!(path, "/data");
                assert!(constraint.contains("minItems"), "{constraint}");
            }
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[test]
    fn wrong_type_reports_offending_path() {
        let schema = JobSchema::bundled().unwrap();
        let mut doc = valid_job();
        doc["input"]["root"] = json!(42);

        match schema.validate(&doc) {
            Err(Error::SchemaViolation { path, .. }) => assert_eq!(path, "/input/root"),
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[test]
    fn caller_schema_replaces_bundled_one() {
        let schema = JobSchema::from_value(&json!({
            "type": "object",
            "required": ["extra"]
        }))
        .unwrap();

        assert!(schema.validate(&valid_job()).is_err());
        assert!(schema.validate(&json!({ "extra": 1 })).is_ok());
    }

    #[test]
    fn malformed_schema_is_reported() {
        let err = JobSchema::from_value(&json!({ "type": 12 })).err().unwrap();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }
}
