//! Physical placement of calibration files.
//!
//! The calibration ingestion task only updates the repository registry; it
//! never moves files. This command puts each file where the repository
//! layout expects it:
//!
//! ```text
//! <root>/<rendered meta.template>                     records with a template
//! <root>/CALIB/BFKERNEL/<file>                        type == "bfKernel"
//! <root>/CALIB/<type>/<yyyy-mm-dd>/<filter>/<file>    parsed from the file name
//! ```
//!
//! File names follow `type-year-month-day[-cam-band]-ccd.<ext>`; without the
//! optional pair the filter is `NONE`.

use crate::error::{Error, Result};
use crate::spec::FileRecord;

use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const KERNEL_TYPE: &str = "bfKernel";

#[derive(Debug, Clone, PartialEq)]
pub struct IngestCalibrationFiles {
    pub root: String,
    pub records: Vec<FileRecord>,
}

impl IngestCalibrationFiles {
    pub fn new(root: impl Into<String>, records: Vec<FileRecord>) -> Self {
        Self {
            root: root.into(),
            records,
        }
    }

    pub fn execute(&self) -> Result<()> {
        let root = Path::new(&self.root);
        for rec in &self.records {
            let dest = destination(root, rec)?;
            if let Some(parent) = dest.parent() {
                if !parent.exists() {
                    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
                }
            }
            debug!(src = %rec.pfn, dest = %dest.display(), "placing calibration file");
            fs::copy(&rec.pfn, &dest).map_err(|e| Error::io(&rec.pfn, e))?;
        }
        Ok(())
    }
}

impl fmt::Display for IngestCalibrationFiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ingest {} calibration file(s) into {}",
            self.records.len(),
            self.root
        )
    }
}

/// Where `rec` lands under the repository `root`.
pub fn destination(root: &Path, rec: &FileRecord) -> Result<PathBuf> {
    if let Some(template) = rec.meta.get("template").and_then(Value::as_str) {
        return Ok(root.join(render_template(template, &rec.meta)?));
    }
    let name = rec.file_name();
    if rec.calib_type() == Some(KERNEL_TYPE) {
        return Ok(root.join("CALIB").join("BFKERNEL").join(name));
    }
    Ok(root.join(layout_from_name(name)?))
}

/// `BIAS-2013-11-03-004.fits` -> `CALIB/BIAS/2013-11-03/NONE/BIAS-2013-11-03-004.fits`
pub fn layout_from_name(name: &str) -> Result<PathBuf> {
    let stem = name.split('.').next().unwrap_or(name);
    let tokens: Vec<&str> = stem.split('-').collect();
    let filter = match tokens.len() {
        5 => "NONE".to_string(),
        7 => format!("{}-{}", tokens[4], tokens[5]),
        n => {
            return Err(Error::MalformedCalibrationFilename {
                name: name.to_string(),
                tokens: n,
            });
        }
    };
    let date = tokens[1..4].join("-");
    Ok(PathBuf::from("CALIB")
        .join(tokens[0])
        .join(date)
        .join(filter)
        .join(name))
}

/// Substitute `{key}`, `{key:s}`, `{key:Nd}` and `{key:0Nd}` placeholders
/// from `meta`. `{{` and `}}` produce literal braces; `:s` only accepts
/// strings and `d` only integers.
pub fn render_template(template: &str, meta: &Map<String, Value>) -> Result<String> {
    // Capture:
    // 1) key
    // 2) optional format spec after ':'
    const PLACEHOLDER_RE: &str = r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)(?::([^}]*))?\}";
    let re = Regex::new(PLACEHOLDER_RE).map_err(|e| Error::Config(e.to_string()))?;

    let bad_key = |key: &str| Error::TemplateKey {
        template: template.to_string(),
        key: key.to_string(),
    };

    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in re.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        last = whole.end();

        let Some(key) = caps.get(1).map(|m| m.as_str()) else {
            // escaped brace
            out.push_str(&whole.as_str()[..1]);
            continue;
        };
        let spec = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let value = meta.get(key).ok_or_else(|| bad_key(key))?;

        match (spec, value) {
            (_, Value::String(s)) if spec.is_empty() || spec == "s" => out.push_str(s),
            ("", other) => out.push_str(&other.to_string()),
            _ if spec.ends_with('d') => {
                let n = value.as_i64().ok_or_else(|| bad_key(key))?;
                let width = &spec[..spec.len() - 1];
                let pad: usize = if width.is_empty() {
                    0
                } else {
                    width.parse().map_err(|_| bad_key(key))?
                };
                if width.starts_with('0') {
                    out.push_str(&format!("{:0pad$}", n, pad = pad));
                } else {
                    out.push_str(&format!("{:>pad$}", n, pad = pad));
                }
            }
            _ => return Err(bad_key(key)),
        }
    }
    out.push_str(&template[last..]);
    Ok(out)
}
