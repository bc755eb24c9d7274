//! Utility functions for file operations and path manipulation

use crate::config::FileCollisionAction;
use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Get a unique path for a file, handling collisions according to the specified action
///
/// # Arguments
///
/// * `path` - The desired file path
/// * `action` - How to handle file collisions
///
/// # Returns
///
/// Returns the final path to use. For Rename action, this may have a suffix added.
/// For Skip action, returns an error if the file already exists.
/// For Overwrite action, returns the original path unchanged.
///
/// # Examples
///
/// ```
/// use clip_stitch::utils::get_unique_path;
/// use clip_stitch::config::FileCollisionAction;
/// use std::path::Path;
///
/// let path = Path::new("/tmp/final-video.mp4");
/// let unique = get_unique_path(path, FileCollisionAction::Rename).unwrap();
/// // If /tmp/final-video.mp4 exists, returns /tmp/final-video (1).mp4
/// ```
pub fn get_unique_path(path: &Path, action: FileCollisionAction) -> Result<PathBuf> {
    match action {
        FileCollisionAction::Overwrite => Ok(path.to_path_buf()),
        FileCollisionAction::Skip => {
            if path.exists() {
                return Err(already_exists(path));
            }
            Ok(path.to_path_buf())
        }
        FileCollisionAction::Rename => {
            if !path.exists() {
                return Ok(path.to_path_buf());
            }

            let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
                Error::FileCollision {
                    path: path.to_path_buf(),
                    reason: "cannot extract file stem".to_string(),
                }
            })?;

            let extension = path.extension().and_then(|e| e.to_str());

            let parent = path.parent().ok_or_else(|| Error::FileCollision {
                path: path.to_path_buf(),
                reason: "cannot extract parent directory".to_string(),
            })?;

            for i in 1..=MAX_RENAME_ATTEMPTS {
                let new_name = match extension {
                    Some(ext) => format!("{} ({}).{}", stem, i, ext),
                    None => format!("{} ({})", stem, i),
                };
                let new_path = parent.join(new_name);
                if !new_path.exists() {
                    return Ok(new_path);
                }
            }

            Err(Error::FileCollision {
                path: path.to_path_buf(),
                reason: format!(
                    "could not find unique filename after {} attempts",
                    MAX_RENAME_ATTEMPTS
                ),
            })
        }
    }
}

/// Check that an output file name is a single plain path component
///
/// The name is joined onto the workspace and the output directory, so anything
/// that could escape them (separators, `..`, absolute paths) is rejected.
///
/// # Examples
///
/// ```
/// use clip_stitch::utils::validate_output_filename;
///
/// assert!(validate_output_filename("final-video.mp4").is_ok());
/// assert!(validate_output_filename("../final-video.mp4").is_err());
/// assert!(validate_output_filename("").is_err());
/// ```
pub fn validate_output_filename(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidRequest(
            "output filename must not be empty".to_string(),
        ));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(Error::InvalidRequest(format!(
            "output filename '{}' must be a plain file name",
            name
        ))),
    }
}

/// Place the finished file at `to`, all or nothing
///
/// `to` either receives the complete file or is left as it was: an existing
/// file is only replaced (`replace`) by an atomic rename, never truncated in
/// place. Without `replace` an existing `to` is a [`Error::FileCollision`].
///
/// The work runs on the blocking pool and finishes even if the returned
/// future is dropped, so a caller that stops waiting cannot leave a partial
/// file behind. `from` is left for the workspace cleanup when it had to be
/// copied.
pub async fn publish_file(from: &Path, to: &Path, replace: bool) -> Result<()> {
    let (from, to) = (from.to_path_buf(), to.to_path_buf());
    tokio::task::spawn_blocking(move || place_file(&from, &to, replace))
        .await
        .map_err(|e| Error::Unexpected(format!("publish task failed: {e}")))?
}

fn place_file(from: &Path, to: &Path, replace: bool) -> Result<()> {
    // Same filesystem: rename replaces atomically, hard_link refuses an existing target
    let direct = if replace {
        std::fs::rename(from, to)
    } else {
        std::fs::hard_link(from, to)
    };

    match direct {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(already_exists(to)),
        Err(e) => {
            tracing::debug!(
                error = %e,
                from = %from.display(),
                to = %to.display(),
                "direct placement failed, copying through a staged file"
            );
            copy_into_place(from, to, replace)
        }
    }
}

/// Copy `from` into a staged file beside `to`, then persist it onto `to`
///
/// The staged file is deleted on every error path.
fn copy_into_place(from: &Path, to: &Path, replace: bool) -> Result<()> {
    let dir = match to.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut staged = tempfile::Builder::new()
        .prefix(".clip-stitch-")
        .suffix(".partial")
        .tempfile_in(dir)?;
    let mut source = std::fs::File::open(from)?;
    std::io::copy(&mut source, staged.as_file_mut())?;
    staged.as_file().sync_all()?;

    let persisted = if replace {
        staged.persist(to)
    } else {
        staged.persist_noclobber(to)
    };
    match persisted {
        Ok(_) => Ok(()),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Err(already_exists(to)),
        Err(e) => Err(Error::Filesystem(e.error)),
    }
}

fn already_exists(path: &Path) -> Error {
    Error::FileCollision {
        path: path.to_path_buf(),
        reason: "file already exists and collision action is skip".to_string(),
    }
}
