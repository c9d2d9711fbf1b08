use crate::error::{Error, Result};
use crate::registry::{ClassEntry, ModuleListing, Package};

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Build a package listing from the Python sources in `dir`.
///
/// Every `<module>.py` file and every sub-package (`<module>/__init__.py`)
/// directly inside `dir` becomes one module listing. Only top-level
/// statements are considered:
///
/// ```text
/// class ProcessCcdTask(pipeBase.CmdLineTask):   -> defined in this module
/// from .calibrate import CalibrateTask          -> imported from `.calibrate`
/// ```
///
/// Private modules (leading `_`) are skipped.
pub fn scan_package(name: &str, dir: &Path) -> Result<Package> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut sources: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_dir() {
            let init = path.join("__init__.py");
            if let Some(stem) = path.file_name().and_then(|s| s.to_str()) {
                if init.is_file() {
                    sources.push((stem.to_string(), init));
                }
            }
        } else if path.extension().and_then(|s| s.to_str()) == Some("py") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                sources.push((stem.to_string(), path.clone()));
            }
        }
    }
    sources.retain(|(module, _)| !module.starts_with('_'));
    sources.sort();

    let scanner = Scanner::new()?;
    let mut modules = Vec::with_capacity(sources.len());
    for (module, path) in sources {
        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let classes = scanner.classes(&module, &text);
        debug!(package = name, %module, classes = classes.len(), "scanned module");
        modules.push(ModuleListing {
            name: module,
            classes,
        });
    }

    Ok(Package {
        name: name.to_string(),
        modules,
    })
}

struct Scanner {
    class_def: Regex,
    from_import: Regex,
}

impl Scanner {
    fn new() -> Result<Self> {
        // Capture:
        // 1) class name of a top-level `class X(...):` / `class X:`
        const CLASS_RE: &str = r"^class\s+([A-Za-z_][A-Za-z0-9_]*)\s*[(:]";
        // 1) source module, 2) imported names
        const FROM_RE: &str = r"^from\s+(\.*[A-Za-z0-9_.]*)\s+import\s+(.+?)\s*$";
        let invalid = |e: regex::Error| Error::Config(e.to_string());
        Ok(Self {
            class_def: Regex::new(CLASS_RE).map_err(invalid)?,
            from_import: Regex::new(FROM_RE).map_err(invalid)?,
        })
    }

    fn classes(&self, module: &str, text: &str) -> Vec<ClassEntry> {
        let mut out = Vec::new();
        for line in text.lines() {
            if let Some(caps) = self.class_def.captures(line) {
                out.push(ClassEntry {
                    name: caps[1].to_string(),
                    module: module.to_string(),
                });
            } else if let Some(caps) = self.from_import.captures(line) {
                let source = caps[1].trim_start_matches('.');
                let names = caps[2].trim_start_matches('(').trim_end_matches(')');
                for item in names.split(',') {
                    // `A as B` binds B
                    let Some(bound) = item.split_whitespace().last() else {
                        continue;
                    };
                    if bound == "*" || bound == "\\" {
                        continue;
                    }
                    out.push(ClassEntry {
                        name: bound.to_string(),
                        module: source.to_string(),
                    });
                }
            }
        }
        out
    }
}
