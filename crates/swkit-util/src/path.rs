//! Lexical path helpers.
//!
//! Nothing here touches the file system: build outputs are often compared or
//! rewritten before (or after) the files they name exist.

use std::path::{Component, Path, PathBuf};

/// Normalize a `/`-separated path the way URL and module specifiers are
/// normalized: `.` segments are dropped, `..` segments consume the previous
/// segment, and leading `..` segments of a relative path are kept.
///
/// A leading `/` and a trailing `/` are preserved. An empty result becomes `.`.
#[must_use]
pub fn normalize_posix(path: &str) -> String {
    let absolute = path.starts_with('/');
    let trailing = path.len() > 1 && path.ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                // `/..` stays at the root
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let mut out = String::with_capacity(path.len());
    if absolute {
        out.push('/');
    }
    out.push_str(&segments.join("/"));

    if out.is_empty() {
        return ".".to_string();
    }
    if trailing && !out.ends_with('/') {
        out.push('/');
    }
    out
}

/// Lexically normalize a file-system path (`.` removed, `..` applied).
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve `path` against `base`: absolute paths win, relative ones are
/// joined. The result is lexically normalized.
#[must_use]
pub fn resolve(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    normalize_path(&base.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_posix_relative() {
        assert_eq!(normalize_posix("_nuxt/./chunk.js"), "_nuxt/chunk.js");
        assert_eq!(normalize_posix("../../helper"), "../../helper");
        assert_eq!(normalize_posix("a/b/../../c"), "c");
        assert_eq!(normalize_posix("a/../../c"), "../c");
    }

    #[test]
    fn test_normalize_posix_absolute() {
        assert_eq!(normalize_posix("/_nuxt//entry.js"), "/_nuxt/entry.js");
        assert_eq!(normalize_posix("/../x"), "/x");
        assert_eq!(normalize_posix("/"), "/");
    }

    #[test]
    fn test_normalize_posix_edges() {
        assert_eq!(normalize_posix(""), ".");
        assert_eq!(normalize_posix("./"), ".");
        assert_eq!(normalize_posix("a/b/"), "a/b/");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/project/./src/../sw.ts")),
            PathBuf::from("/project/sw.ts")
        );
        assert_eq!(normalize_path(Path::new("../a/./b")), PathBuf::from("../a/b"));
        assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn test_resolve() {
        let root = Path::new("/project");
        assert_eq!(resolve(root, "sw.ts"), PathBuf::from("/project/sw.ts"));
        assert_eq!(resolve(root, "./src/../sw.ts"), PathBuf::from("/project/sw.ts"));
        assert_eq!(resolve(root, "/elsewhere/sw.ts"), PathBuf::from("/elsewhere/sw.ts"));
    }
}
