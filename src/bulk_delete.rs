//! Bulk deletion of ExifTool `_original` backup files.
//!
//! Each path gets its own one-shot process running
//! `-overwrite_original -delete_original! -r <path>`; the status lines of all
//! runs are summed into a single [`BulkDeleteResult`].

use serde::Serialize;
use std::ffi::OsStr;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::path::Path;

use crate::error::Result;
use crate::launcher::OneShot;
use crate::parser::parse_status_line;

/// Fixed arguments preceding the path in every delete invocation.
pub const DELETE_ORIGINALS_ARGS: [&str; 3] = ["-overwrite_original", "-delete_original!", "-r"];

/// Counters reported by ExifTool for a delete-original run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkDeleteResult {
    pub directories_scanned: u64,
    pub image_files_found: u64,
    pub original_files_deleted: u64,
}

impl Add for BulkDeleteResult {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            directories_scanned: self.directories_scanned.saturating_add(other.directories_scanned),
            image_files_found: self.image_files_found.saturating_add(other.image_files_found),
            original_files_deleted: self
                .original_files_deleted
                .saturating_add(other.original_files_deleted),
        }
    }
}

impl AddAssign for BulkDeleteResult {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for BulkDeleteResult {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Parse the status lines of one delete run.
///
/// Unknown phrases and unparseable counts are ignored.
pub fn parse_delete_output(output: &str) -> BulkDeleteResult {
    let mut result = BulkDeleteResult::default();
    for (count, phrase) in output.lines().filter_map(parse_status_line) {
        match phrase {
            "directories scanned" => {
                result.directories_scanned = result.directories_scanned.saturating_add(count)
            }
            "image files found" => {
                result.image_files_found = result.image_files_found.saturating_add(count)
            }
            "original files deleted" => {
                result.original_files_deleted = result.original_files_deleted.saturating_add(count)
            }
            _ => {}
        }
    }
    result
}

/// Delete `_original` backups under every path, one process per path.
///
/// `None` yields a zero result without launching anything. Paths are passed
/// through unchanged, including ones that are not valid UTF-8.
pub fn delete_originals<R, P>(runner: &R, paths: Option<&[P]>) -> Result<BulkDeleteResult>
where
    R: OneShot + ?Sized,
    P: AsRef<Path>,
{
    let Some(paths) = paths else {
        return Ok(BulkDeleteResult::default());
    };

    let mut total = BulkDeleteResult::default();
    for path in paths {
        let path = path.as_ref();
        let mut args: Vec<&OsStr> = DELETE_ORIGINALS_ARGS.iter().map(OsStr::new).collect();
        args.push(path.as_os_str());

        let output = runner.run_once(&args)?;
        let result = parse_delete_output(&output);
        log::debug!(
            target: "exifbatch::bulk_delete",
            "{}: {:?}",
            path.display(),
            result
        );
        total += result;
    }
    Ok(total)
}
