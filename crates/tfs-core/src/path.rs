//! Path strings and segment lists.
//!
//! Paths use `/` as the separator. Empty and `.` segments are no-ops; `..`
//! ascends one level and fails at the root.

use tfs_types::{Result, TfsError};

pub const SEPARATOR: char = '/';

pub const PARENT: &str = "..";

pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Split a path into raw segments, dropping empty and `.` segments. `..` is
/// kept for the caller to interpret.
pub fn segments(path: &str) -> Vec<&str> {
    path.split(SEPARATOR)
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// Anchor `path` at the root or at `cwd`, yielding raw segments that may
/// still contain `..`.
pub fn anchored(cwd: &[String], path: &str) -> Vec<String> {
    let mut out: Vec<String> = if is_absolute(path) {
        Vec::new()
    } else {
        cwd.to_vec()
    };
    out.extend(segments(path).into_iter().map(String::from));
    out
}

/// Fold `..` segments lexically. Ascending above the root is
/// [`TfsError::CursorOverflow`].
pub fn fold<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for segment in raw {
        let segment = segment.as_ref();
        if segment == PARENT {
            if out.pop().is_none() {
                return Err(TfsError::CursorOverflow);
            }
        } else if !segment.is_empty() && segment != "." {
            out.push(segment.to_string());
        }
    }
    Ok(out)
}

/// Anchor and fold in one step.
pub fn normalize(cwd: &[String], path: &str) -> Result<Vec<String>> {
    fold(&anchored(cwd, path))
}

/// Render segments as an absolute path; the root is `/`.
pub fn format<S: AsRef<str>>(segments: &[S]) -> String {
    if segments.is_empty() {
        return SEPARATOR.to_string();
    }
    let mut out = String::new();
    for segment in segments {
        out.push(SEPARATOR);
        out.push_str(segment.as_ref());
    }
    out
}

/// Check a single node name: non-empty, no separator, not `.` or `..`.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == PARENT || name.contains(SEPARATOR) {
        return Err(TfsError::InvalidArgument(format!("invalid node name {:?}", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cwd(path: &[&str]) -> Vec<String> {
        path.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_segments_drop_empty_and_dot() {
        assert_eq!(segments("//a/./b//"), vec!["a", "b"]);
        assert_eq!(segments("../x"), vec!["..", "x"]);
        assert!(segments("/").is_empty());
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_anchored() {
        let here = cwd(&["master", "t"]);
        assert_eq!(anchored(&here, "/base"), cwd(&["base"]));
        assert_eq!(anchored(&here, "r"), cwd(&["master", "t", "r"]));
        assert_eq!(anchored(&here, ""), here);
    }

    #[test]
    fn test_normalize_folds_parent() {
        let here = cwd(&["master", "t"]);
        assert_eq!(normalize(&here, "../u/./v").unwrap(), cwd(&["master", "u", "v"]));
        assert_eq!(normalize(&here, "missing/..").unwrap(), here);
        assert!(normalize(&here, "/").unwrap().is_empty());
        assert!(matches!(normalize(&here, "../../.."), Err(TfsError::CursorOverflow)));
        assert!(matches!(normalize(&[], ".."), Err(TfsError::CursorOverflow)));
    }

    #[test]
    fn test_format() {
        assert_eq!(format::<String>(&[]), "/");
        assert_eq!(format(&["master", "tableA"]), "/master/tableA");
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("row1").is_ok());
        for bad in ["", ".", "..", "a/b"] {
            assert!(matches!(validate_name(bad), Err(TfsError::InvalidArgument(_))));
        }
    }
}
