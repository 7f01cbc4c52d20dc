use std::fs;
use std::path::{Path, PathBuf};

fn root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn relative_path(path: &Path) -> String {
    path.strip_prefix(root())
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn collect_rs_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = fs::read_dir(dir).unwrap_or_else(|e| {
        panic!("failed to read dir {}: {e}", dir.display());
    });

    for entry in entries {
        let entry = entry.unwrap_or_else(|e| panic!("failed to read dir entry: {e}"));
        let path = entry.path();

        if path.is_dir() {
            collect_rs_files_recursive(&path, files);
            continue;
        }

        if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
}

/// Every `.rs` file under `relative`, which may also name a single file.
pub fn collect_rs_files(relative: &str) -> Vec<PathBuf> {
    let path = root().join(relative);
    if path.is_file() {
        return vec![path];
    }
    let mut files = Vec::new();
    collect_rs_files_recursive(&path, &mut files);
    files.sort();
    files
}

/// Non-test lines under `relative_dir` containing any pattern. Scanning stops
/// at a file's `#[cfg(test)]` module.
pub fn find_lines_containing(
    relative_dir: &str,
    patterns: &[&str],
) -> Vec<(String, usize, String)> {
    let mut hits = Vec::new();
    for file in collect_rs_files(relative_dir) {
        let content = fs::read_to_string(&file).unwrap_or_else(|e| {
            panic!("failed to read {}: {e}", file.display());
        });

        for (idx, line) in content.lines().enumerate() {
            if line.trim() == "#[cfg(test)]" {
                break;
            }
            if patterns.iter().any(|p| line.contains(p)) {
                hits.push((relative_path(&file), idx + 1, line.to_string()));
            }
        }
    }
    hits
}

/// Lines in `mod.rs` files that are neither module declarations, re-exports
/// nor crate constants.
pub fn find_non_export_lines_in_mod_files(relative_dir: &str) -> Vec<(String, usize, String)> {
    let mut violations = Vec::new();
    for file in collect_rs_files(relative_dir) {
        if file.file_name().and_then(|s| s.to_str()) != Some("mod.rs") {
            continue;
        }

        let content = fs::read_to_string(&file).unwrap_or_else(|e| {
            panic!("failed to read {}: {e}", file.display());
        });

        let mut in_use = false;
        for (idx, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            if in_use {
                in_use = !line.ends_with(';');
                continue;
            }

            if line.is_empty()
                || line.starts_with("//")
                || line.starts_with("#[cfg")
                || line.starts_with("pub mod ")
                || line.starts_with("pub(crate) mod ")
                || line.starts_with("mod ")
                || line.starts_with("pub(crate) const ")
            {
                continue;
            }
            if line.starts_with("pub use ") {
                in_use = !line.ends_with(';');
                continue;
            }

            violations.push((relative_path(&file), idx + 1, raw_line.to_string()));
        }
    }
    violations
}
