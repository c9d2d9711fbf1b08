//! Job compiler: validated job description + task registry -> command queue.

use crate::command::calib::KERNEL_TYPE;
use crate::command::{Command, IngestCalibrationFiles, IngestData, InitRepository, RunTask};
use crate::error::{Error, Result};
use crate::registry::TaskRegistry;
use crate::spec::{FileRecord, JobDescription};

use serde_json::Value;

pub const INGEST_IMAGES: &str = "ingestImages";
pub const INGEST_CALIBS: &str = "ingestCalibs";

/// Calibration kinds that get an explicit `--calibType` option.
pub const TYPED_CALIBS: [&str; 5] = ["bias", "dark", "defect", "flat", "fringe"];

pub const DEFAULT_VALIDITY: u64 = 999;

/// Build the ordered command queue for `job`.
///
/// Order:
/// 1) InitRepository (only when `data` is present)
/// 2) IngestData for all raw files
/// 3) one IngestData per calibration record, then one IngestCalibrationFiles
/// 4) RunTask
pub fn compile(job: &JobDescription, registry: &TaskRegistry) -> Result<Vec<Command>> {
    let mut queue = Vec::new();
    let root = &job.input.root;

    if let Some(data) = &job.data {
        if data.is_empty() {
            return Err(Error::EmptyDataSet { field: "data" });
        }
        let mapper = job
            .input
            .mapper
            .as_ref()
            .ok_or_else(|| Error::MissingMapper(root.clone()))?;

        queue.push(InitRepository::new(root, mapper).into());

        let task = registry.get_task(INGEST_IMAGES)?;
        let options = vec!["--mode".to_string(), "copy".to_string()];
        let files: Vec<String> = data.iter().map(|rec| rec.pfn.clone()).collect();
        queue.push(IngestData::new(task.clone(), root, options, files).into());

        if let Some(calibs) = &job.calibs {
            compile_calibs(calibs, root, registry, &mut queue)?;
        }
    }

    let task = registry.get_task(&job.task.name)?;
    let mut args = vec!["--output".to_string(), job.output.root.clone()];
    args.extend(job.task.args.iter().cloned());
    queue.push(RunTask::new(task.clone(), root, args).into());

    Ok(queue)
}

fn compile_calibs(
    calibs: &[FileRecord],
    root: &str,
    registry: &TaskRegistry,
    queue: &mut Vec<Command>,
) -> Result<()> {
    if calibs.is_empty() {
        return Err(Error::EmptyDataSet { field: "calibs" });
    }
    let task = registry.get_task(INGEST_CALIBS)?;

    for rec in calibs {
        let calib_type = calib_type(rec)?;
        if calib_type == Some(KERNEL_TYPE) {
            // kernels are copied, never registered
            continue;
        }
        let options = calib_options(root, calib_type, validity(rec)?);
        queue.push(IngestData::new(task.clone(), root, options, rec.pfn.as_str()).into());
    }
    queue.push(IngestCalibrationFiles::new(root, calibs.to_vec()).into());
    Ok(())
}

/// `--calib <root> [--calibType <type>] --validity <n>`
pub fn calib_options(root: &str, calib_type: Option<&str>, validity: u64) -> Vec<String> {
    let mut opts = vec!["--calib".to_string(), root.to_string()];
    if let Some(t) = calib_type.filter(|t| TYPED_CALIBS.contains(t)) {
        opts.push("--calibType".to_string());
        opts.push(t.to_string());
    }
    opts.push("--validity".to_string());
    opts.push(validity.to_string());
    opts
}

fn calib_type(rec: &FileRecord) -> Result<Option<&str>> {
    match rec.meta.get("type") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(t)) => Ok(Some(t.as_str())),
        Some(other) => Err(Error::IncompleteCalibrationMetadata {
            pfn: rec.pfn.clone(),
            detail: format!("'type' must be a string, got {}", other),
        }),
    }
}

fn validity(rec: &FileRecord) -> Result<u64> {
    match rec.meta.get("validity") {
        None | Some(Value::Null) => Ok(DEFAULT_VALIDITY),
        Some(v) => v
            .as_u64()
            .ok_or_else(|| Error::IncompleteCalibrationMetadata {
                pfn: rec.pfn.clone(),
                detail: format!("'validity' must be a non-negative integer, got {}", v),
            }),
    }
}
