use std::path::{Path, PathBuf};
use tracing::debug;

/// How many directories `find_file` inspects per starting path by default.
pub const DEFAULT_DEPTH: usize = 6;

/// Look for a file named `name` in each of `paths` and their ancestors.
///
/// Each starting path is checked, then its parent, and so on, for at most
/// `depth` directories. Starting paths that are not directories are skipped.
/// The first hit wins.
pub fn find_file<I, P>(name: &str, paths: I, depth: usize) -> Option<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    debug!(name, "looking for file");
    for start in paths {
        let mut current = Some(start.as_ref());
        for _ in 0..depth {
            let Some(dir) = current.filter(|dir| dir.is_dir()) else {
                break;
            };
            debug!(name, dir = %dir.display(), "checking directory");
            let candidate = dir.join(name);
            if candidate.exists() {
                return Some(candidate);
            }
            current = dir.parent();
        }
    }
    None
}

/// `parts` joined onto `base`, or onto its parent directory if `base` is a
/// file.
pub fn rel<I, P>(base: &Path, parts: I) -> PathBuf
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let root = if base.is_file() {
        base.parent().unwrap_or(base)
    } else {
        base
    };
    let mut path = root.to_path_buf();
    for part in parts {
        path.push(part);
    }
    path
}
