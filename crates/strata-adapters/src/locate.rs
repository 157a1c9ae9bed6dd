//! Finding an existing solution file on disk.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use walkdir::WalkDir;

use strata_core::{application::ApplicationError, error::StrataResult};

/// How deep below the given directory a solution file may sit.
///
/// Depth 1 is the directory itself; depth 2 covers `strata new`'s
/// `<output>/<Name>/<Name>.sln` layout when pointed at the output directory.
const MAX_DEPTH: usize = 2;

/// Resolve `target` to a single solution file with the given extension.
///
/// A file path is returned as-is when it has the extension. A directory is
/// searched; the shallowest match wins and ties are broken by name, so the
/// result does not depend on directory iteration order.
#[instrument(fields(target = %target.display()))]
pub fn find_solution(target: &Path, extension: &str) -> StrataResult<PathBuf> {
    if target.is_file() {
        return if has_extension(target, extension) {
            Ok(target.to_path_buf())
        } else {
            Err(ApplicationError::SolutionNotFound {
                path: target.to_path_buf(),
            }
            .into())
        };
    }

    let mut found: Vec<(usize, PathBuf)> = WalkDir::new(target)
        .min_depth(1)
        .max_depth(MAX_DEPTH)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && has_extension(e.path(), extension))
        .map(|e| (e.depth(), e.into_path()))
        .collect();
    found.sort();

    debug!(candidates = found.len(), "Searched for solution files");

    found
        .into_iter()
        .next()
        .map(|(_, path)| path)
        .ok_or_else(|| {
            ApplicationError::SolutionNotFound {
                path: target.to_path_buf(),
            }
            .into()
        })
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}
