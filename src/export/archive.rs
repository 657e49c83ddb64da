//! Archive packaging: bundle rendered reports into one zip file and publish
//! it atomically.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ExportError;
use crate::export::report::ReportFile;

/// Write the archive next to its final location, then publish it with an
/// atomic rename. On any failure the temp file is removed and a previously
/// published archive for the same period is left untouched. Re-publishing
/// the same name replaces the old archive in one step, so repeated exports
/// for a period are safe.
pub fn publish(
    out_dir: &Path,
    archive_name: &str,
    reports: &[ReportFile],
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(out_dir)?;
    let final_path = out_dir.join(archive_name);
    let tmp_path = out_dir.join(format!(".{archive_name}.tmp"));

    match write_archive(&tmp_path, reports) {
        Ok(()) => {
            fs::rename(&tmp_path, &final_path)?;
            Ok(final_path)
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

fn write_archive(path: &Path, reports: &[ReportFile]) -> Result<(), ExportError> {
    let mut archive = ZipWriter::new(File::create(path)?);
    // fixed entry mtime keeps the container deterministic
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    for report in reports {
        archive.start_file(report.name.as_str(), options)?;
        archive.write_all(&report.bytes)?;
    }
    archive.finish()?;
    Ok(())
}
