// Utility Functions
// Locating the directories that publish targets are resolved against

use std::path::{Path, PathBuf};

/// Base directory for `TargetPathType::RelativeToGitRoot` targets: the nearest
/// directory at or above `start` holding a `.git` entry (directory or worktree file).
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Base directory for `TargetPathType::RelativeToCaller` targets
pub fn caller_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn test_pipeline_dir_resolves_to_enclosing_checkout() {
        let checkout = tempfile::tempdir().unwrap();
        fs::create_dir(checkout.path().join(".git")).unwrap();
        let pipelines = checkout.path().join(".azure").join("pipelines");
        fs::create_dir_all(&pipelines).unwrap();

        assert_eq!(
            find_repo_root(&pipelines),
            Some(checkout.path().canonicalize().unwrap())
        );
    }

    #[test]
    fn test_worktree_marker_file_counts_as_checkout() {
        let worktree = tempfile::tempdir().unwrap();
        fs::write(worktree.path().join(".git"), "gitdir: ../.git/worktrees/x").unwrap();

        assert_eq!(
            find_repo_root(worktree.path()),
            Some(worktree.path().canonicalize().unwrap())
        );
    }

    #[test]
    fn test_missing_caller_dir_has_no_checkout() {
        assert_eq!(find_repo_root(Path::new("/no/such/caller/dir")), None);
    }

    #[test]
    fn test_nearest_checkout_wins_over_outer_one() {
        let outer = tempfile::tempdir().unwrap();
        fs::create_dir(outer.path().join(".git")).unwrap();
        let submodule = outer.path().join("vendor").join("shared-pipelines");
        fs::create_dir_all(submodule.join("templates")).unwrap();
        fs::write(submodule.join(".git"), "gitdir: ../../.git/modules/shared").unwrap();

        assert_eq!(
            find_repo_root(&submodule.join("templates")),
            Some(submodule.canonicalize().unwrap())
        );
    }

    #[test]
    fn test_caller_dir_is_current_dir() {
        assert_eq!(caller_dir(), std::env::current_dir().unwrap());
    }
}
