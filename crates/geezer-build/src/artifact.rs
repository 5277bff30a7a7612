//! Which files from the release output directory ship in the runtime image.
//!
//! Kept: entries directly inside the directory that are regular files with
//! an executable bit and whose name does not end in `-` plus exactly 16
//! lowercase hex digits. Cargo names test harnesses that way
//! (`geezer_slots-1a2b3c4d5e6f7081`), so they stay out of the image.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Suffix cargo appends to test-harness binaries.
pub const TEST_HARNESS_SUFFIX: &str = "-[0-9a-f]{16}";

static TEST_HARNESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{TEST_HARNESS_SUFFIX}$")).expect("test harness pattern is a valid regex")
});

pub fn is_test_harness_name(name: &str) -> bool {
    TEST_HARNESS.is_match(name)
}

/// Select shippable artifacts directly inside `dir`, sorted by file name.
pub fn select_artifacts(dir: &Path) -> Result<Vec<PathBuf>, ArtifactError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ArtifactError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut selected = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ArtifactError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();

        let file_type = entry.file_type().map_err(|e| ArtifactError::Inspect {
            path: path.clone(),
            source: e,
        })?;
        if !file_type.is_file() {
            tracing::trace!(path = %path.display(), "skipping non-regular entry");
            continue;
        }

        let name = entry.file_name();
        let name = name.to_string_lossy();
        if is_test_harness_name(&name) {
            tracing::debug!(name = %name, "skipping test harness");
            continue;
        }

        let metadata = entry.metadata().map_err(|e| ArtifactError::Inspect {
            path: path.clone(),
            source: e,
        })?;
        if !is_executable(&metadata) {
            tracing::trace!(name = %name, "skipping non-executable file");
            continue;
        }

        selected.push(path);
    }

    selected.sort();
    Ok(selected)
}

/// Shell command that copies the same selection from `release_dir` into `out_dir`.
///
/// Used inside the builder stage so the image and [`select_artifacts`] agree.
pub fn find_expression(release_dir: &str, out_dir: &str) -> String {
    format!(
        "mkdir -p {out_dir} && find {release_dir} -maxdepth 1 -regextype posix-extended \
         -type f -perm /111 ! -regex '.*{TEST_HARNESS_SUFFIX}' -exec cp {{}} {out_dir}/ \\;"
    )
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read directory {path}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to inspect {path}")]
    Inspect {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harness_suffix_needs_exactly_sixteen_hex() {
        assert!(is_test_harness_name("geezer-slots-1a2b3c4d5e6f7081"));
        assert!(is_test_harness_name("geezer_slots-0000000000000000"));
        assert!(!is_test_harness_name("geezer-slots"));
        assert!(!is_test_harness_name("geezer-slots-deadbeef"));
        assert!(!is_test_harness_name("geezer-slots-1a2b3c4d5e6f708"));
        assert!(!is_test_harness_name("geezer-slots-1a2b3c4d5e6f70811"));
        assert!(!is_test_harness_name("geezer-slots-1a2b3c4d5e6f708g"));
        assert!(!is_test_harness_name("geezer-slots1a2b3c4d5e6f7081"));
    }

    #[test]
    fn uppercase_hex_is_not_a_cargo_hash() {
        assert!(!is_test_harness_name("geezer-slots-1A2B3C4D5E6F7081"));
    }

    #[test]
    fn find_expression_mirrors_filter() {
        let expr = find_expression("target/x86_64-unknown-linux-musl/release", "/out");
        assert!(expr.starts_with("mkdir -p /out && find target/x86_64-unknown-linux-musl/release"));
        assert!(expr.contains("-maxdepth 1"));
        assert!(expr.contains("-type f"));
        assert!(expr.contains("-perm /111"));
        assert!(expr.contains("! -regex '.*-[0-9a-f]{16}'"));
        assert!(expr.ends_with("-exec cp {} /out/ \\;"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn cargo_hash_suffix_always_detected(
                stem in "[a-z][a-z0-9_-]{0,20}",
                hash in "[0-9a-f]{16}",
            ) {
                let name = format!("{stem}-{hash}");
                prop_assert!(is_test_harness_name(&name));
            }

            #[test]
            fn short_hex_suffix_never_detected(
                stem in "[a-z][a-z_]{0,20}",
                hash in "[0-9a-f]{1,15}",
            ) {
                let name = format!("{stem}-{hash}");
                prop_assert!(!is_test_harness_name(&name));
            }
        }
    }
}
