//! Role report on disk.

use std::fs;
use std::path::{Path, PathBuf};

use fabric_election::RoleReport;

use crate::error::Result;

/// Replace the report at `path`. Readers see the old or the new report,
/// never a partial one.
pub fn write_report(path: &Path, report: &RoleReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_path(path);
    fs::write(&tmp, report.to_string())?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn read_report(path: &Path) -> Result<RoleReport> {
    let text = fs::read_to_string(path)?;
    Ok(text.parse::<RoleReport>()?)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
