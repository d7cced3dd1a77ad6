use contactclient_core::paths::DATA_DIR;
use std::path::{Path, PathBuf};

/// Resolve the data root.
///
/// Priority:
/// 1. `--root` flag / `CONTACTCLIENT_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.contactclient/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_data_root(&cwd).unwrap_or(cwd)
}

fn find_data_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(DATA_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_data_dir_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(DATA_DIR)).unwrap();
        let subdir = dir.path().join("exports/daily");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_data_root(&subdir), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn no_data_dir_found() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_data_root(dir.path()), None);
    }
}
