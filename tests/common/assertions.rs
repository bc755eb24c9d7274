//! Custom test assertions

use clip_stitch::JobResult;
use std::path::{Path, PathBuf};

/// Assert no job workspace is left under `work_root`
pub fn assert_no_workspace_left(work_root: &Path) {
    if !work_root.exists() {
        return;
    }
    let leftovers: Vec<PathBuf> = std::fs::read_dir(work_root)
        .expect("read work root")
        .map(|entry| entry.expect("dir entry").path())
        .collect();
    assert!(
        leftovers.is_empty(),
        "job workspace should be removed, found: {:?}",
        leftovers
    );
}

/// Assert nothing was published into `output_dir`
pub fn assert_nothing_published(output_dir: &Path) {
    if !output_dir.exists() {
        return;
    }
    let published: Vec<PathBuf> = std::fs::read_dir(output_dir)
        .expect("read output dir")
        .map(|entry| entry.expect("dir entry").path())
        .collect();
    assert!(
        published.is_empty(),
        "no output should be published on failure, found: {:?}",
        published
    );
}

/// Unwrap a successful result into (path, size)
pub fn expect_success(result: &JobResult) -> (PathBuf, u64) {
    match result {
        JobResult::Success { output_path, size } => (output_path.clone(), *size),
        JobResult::Failure { error, code } => {
            panic!("expected success, got failure [{code}]: {error}")
        }
    }
}

/// Unwrap a failed result into (error, code)
pub fn expect_failure(result: &JobResult) -> (String, String) {
    match result {
        JobResult::Failure { error, code } => (error.clone(), code.clone()),
        JobResult::Success { output_path, .. } => {
            panic!("expected failure, got success at {}", output_path.display())
        }
    }
}
