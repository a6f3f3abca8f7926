/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Remote path helpers.
//!
//! Remote paths are always `/` separated, whatever the local platform uses.

use std::path::Path;

pub const SEPARATOR: char = '/';

/// Join a remote directory and an entry below it.
///
/// An empty or `.` directory yields the entry itself, and a trailing
/// separator on the directory is not doubled.
pub fn join(directory: &str, entry: &str) -> String {
    let entry = entry.trim_start_matches(SEPARATOR);
    if entry.is_empty() || entry == "." {
        return directory.to_string();
    }
    match directory {
        "" => entry.to_string(),
        "/" => format!("/{entry}"),
        _ => {
            let directory = directory.trim_end_matches(SEPARATOR);
            format!("{directory}{SEPARATOR}{entry}")
        }
    }
}

/// Resolve `target` against the current remote directory.
pub fn resolve(current: &str, target: &str) -> String {
    if target.starts_with(SEPARATOR) || current == "." {
        target.to_string()
    } else {
        join(current, target)
    }
}

/// The remote path an upload of `local_file` into `remote_directory` writes to.
pub fn upload_target(remote_directory: &str, local_file: &Path) -> Option<String> {
    let name = local_file.file_name()?.to_str()?;
    let directory = match remote_directory.trim_end_matches(SEPARATOR) {
        "" if remote_directory.starts_with(SEPARATOR) => "/",
        d => d,
    };
    Some(join(directory, name))
}

/// Check that a listed entry name can be used as a local file name.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(SEPARATOR)
        && !name.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_plain() {
        assert_eq!(join("this/is/the/pwd", "File 1"), "this/is/the/pwd/File 1");
        assert_eq!(join("dir/", "file"), "dir/file");
        assert_eq!(join("/", "file"), "/file");
        assert_eq!(join("", "file"), "file");
        assert_eq!(join(".", "file"), "./file");
    }

    #[test]
    fn join_current() {
        assert_eq!(join("dir", "."), "dir");
        assert_eq!(join("dir", ""), "dir");
        assert_eq!(join("dir", "/sub"), "dir/sub");
    }

    #[test]
    fn resolve_target() {
        assert_eq!(resolve(".", "some/dir"), "some/dir");
        assert_eq!(resolve("/home/user", "some/dir"), "/home/user/some/dir");
        assert_eq!(resolve("/home/user", "/srv"), "/srv");
        assert_eq!(resolve("/home/user", ".."), "/home/user/..");
    }

    #[test]
    fn upload_target_path() {
        let local = Path::new("local/file/path.txt");
        assert_eq!(
            upload_target("remote/directory", local).unwrap(),
            "remote/directory/path.txt"
        );
        assert_eq!(
            upload_target("remote/directory/", local).unwrap(),
            "remote/directory/path.txt"
        );
        assert_eq!(upload_target("/", local).unwrap(), "/path.txt");
        assert_eq!(upload_target("", local).unwrap(), "path.txt");
        assert!(upload_target("remote", Path::new("/")).is_none());
    }

    #[test]
    fn plain_name() {
        assert!(is_plain_name("File Name.txt"));
        assert!(!is_plain_name(""));
        assert!(!is_plain_name(".."));
        assert!(!is_plain_name("../etc/passwd"));
        assert!(!is_plain_name("a\\b"));
    }
}
