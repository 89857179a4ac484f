//! Saving binary exports to disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::{IdDssError, Result};

/// Document formats the server renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Docx,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
        }
    }

    /// Last path segment of `GET /export/{id}/{segment}`.
    pub fn path_segment(&self) -> &'static str {
        self.extension()
    }
}

impl FromStr for ExportFormat {
    type Err = IdDssError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "docx" => Ok(Self::Docx),
            "pdf" => Ok(Self::Pdf),
            other => Err(IdDssError::InvalidForm {
                message: format!("unknown export format '{}'", other),
            }),
        }
    }
}

/// `id-dss-session-{id}-{YYYY-MM-DD}.{ext}`
pub fn export_filename(session_id: i64, date: NaiveDate, extension: &str) -> String {
    format!(
        "id-dss-session-{}-{}.{}",
        session_id,
        date.format("%Y-%m-%d"),
        extension
    )
}

/// Write `bytes` into `dir` under the dated export name and return the path.
///
/// The file is written to a temporary sibling first and renamed into place,
/// so an interrupted save never leaves a truncated document behind.
pub fn save_export(
    dir: &Path,
    session_id: i64,
    extension: &str,
    date: NaiveDate,
    bytes: &[u8],
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(session_id, date, extension));
    let temp_path = path.with_extension(format!("{}.tmp", extension));

    let saved = write_synced(&temp_path, bytes).and_then(|()| fs::rename(&temp_path, &path));
    if let Err(e) = saved {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    tracing::debug!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
