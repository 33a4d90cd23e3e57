use std::path::{Component, Path, PathBuf};

/// Canonicalize an existing path, otherwise make it absolute and drop `.` segments
pub fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    absolute
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Compare two paths after normalization, ignoring case where the platform does
pub fn same_path(a: &Path, b: &Path) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    if cfg!(windows) {
        a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
    } else {
        a == b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn trailing_separator_is_ignored() {
        let dir = TempDir::new().unwrap();
        let with_slash = PathBuf::from(format!("{}/", dir.path().display()));
        assert!(same_path(dir.path(), &with_slash));
    }

    #[test]
    fn missing_paths_are_still_comparable() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("out");
        let b = dir.path().join(".").join("out");
        assert!(same_path(&a, &b));
        assert!(!same_path(dir.path(), &a));
    }
}
