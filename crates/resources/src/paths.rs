//! Output path derivation.

use crate::error::ProcessError;
use std::path::{Path, PathBuf};

/// Makes `path` absolute against the current directory without touching the
/// file system: symlinks are not resolved and case is not normalized.
pub fn absolute(path: &Path) -> Result<PathBuf, ProcessError> {
    std::path::absolute(path).map_err(|e| ProcessError::io(path, e))
}

/// Maps a source file to its location in the target tree.
///
/// The absolute source-root prefix of `source` is replaced by the absolute
/// target root. Both roots are taken literally, so a source path reached
/// through a symlink or spelled with different case is not under the root.
///
/// The prefix is matched whole component by whole component, not as a string:
/// `/src2/a.txt` is not under `/src`.
///
/// # Errors
///
/// Returns `ProcessError::OutsideSourceRoot` when `source` does not start with
/// `source_root`. Inputs are always registered from the same root, so this
/// indicates a misbehaving build context rather than bad input data.
pub fn derive_output_path(
    source_root: &Path,
    target_root: &Path,
    source: &Path,
) -> Result<PathBuf, ProcessError> {
    let root = absolute(source_root)?;
    let source = absolute(source)?;
    let relative = source
        .strip_prefix(&root)
        .map_err(|_| ProcessError::OutsideSourceRoot {
            root: root.clone(),
            path: source.clone(),
        })?;
    Ok(absolute(target_root)?.join(relative))
}
