//! Copy-tool lookup on `PATH`.

use std::collections::HashSet;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

/// Returns the candidate executable paths for `binary`.
///
/// A value containing a path separator is returned as-is. A bare name is
/// expanded across the directories listed in `path_env`, in order, with
/// duplicates removed; an empty `PATH` element stands for the working
/// directory.
pub fn binary_candidates(binary: &OsStr, path_env: Option<&OsStr>) -> Vec<PathBuf> {
    let direct = Path::new(binary);
    if has_explicit_path(direct) {
        return vec![direct.to_path_buf()];
    }

    let Some(path_env) = path_env else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    env::split_paths(path_env)
        .map(|dir| {
            if dir.as_os_str().is_empty() {
                direct.to_path_buf()
            } else {
                dir.join(direct)
            }
        })
        .filter(|candidate| seen.insert(candidate.clone()))
        .collect()
}

/// Resolves `binary` to the first runnable candidate on the current `PATH`.
pub fn resolve_binary(binary: &OsStr) -> Option<PathBuf> {
    let path_env = env::var_os("PATH");
    binary_candidates(binary, path_env.as_deref())
        .into_iter()
        .find(|candidate| is_executable(candidate))
}

/// Reports whether `path` is a regular file the current process may execute.
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    metadata.is_file()
        && mode_allows_execution(
            metadata.mode(),
            metadata.uid(),
            metadata.gid(),
            &ProcessIdentity::current(),
        )
}

fn has_explicit_path(path: &Path) -> bool {
    path.is_absolute() || path.components().count() > 1
}

fn mode_allows_execution(mode: u32, owner: u32, group: u32, identity: &ProcessIdentity) -> bool {
    if mode & 0o111 == 0 {
        return false;
    }

    if identity.is_root() {
        return true;
    }

    if owner == identity.euid {
        return mode & 0o100 != 0;
    }

    if identity.in_group(group) {
        return mode & 0o010 != 0;
    }

    mode & 0o001 != 0
}

#[derive(Clone, Debug)]
struct ProcessIdentity {
    euid: u32,
    egid: u32,
    groups: Vec<u32>,
}

impl ProcessIdentity {
    fn current() -> Self {
        let groups = rustix::process::getgroups()
            .map(|groups| groups.into_iter().map(|gid| gid.as_raw()).collect())
            .unwrap_or_default();
        Self {
            euid: rustix::process::geteuid().as_raw(),
            egid: rustix::process::getegid().as_raw(),
            groups,
        }
    }

    const fn is_root(&self) -> bool {
        self.euid == 0
    }

    fn in_group(&self, gid: u32) -> bool {
        self.egid == gid || self.groups.contains(&gid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::os::unix::fs::PermissionsExt;

    fn identity(euid: u32, egid: u32, groups: &[u32]) -> ProcessIdentity {
        ProcessIdentity {
            euid,
            egid,
            groups: groups.to_vec(),
        }
    }

    #[test]
    fn explicit_path_is_returned_verbatim() {
        let candidates = binary_candidates(OsStr::new("/opt/bin/rsync"), None);
        assert_eq!(candidates, vec![PathBuf::from("/opt/bin/rsync")]);

        let relative = binary_candidates(OsStr::new("tools/rsync"), Some(OsStr::new("/usr/bin")));
        assert_eq!(relative, vec![PathBuf::from("tools/rsync")]);
    }

    #[test]
    fn bare_name_expands_across_path_without_duplicates() {
        let path = OsString::from("/usr/local/bin:/usr/bin:/usr/local/bin");
        let candidates = binary_candidates(OsStr::new("rsync"), Some(&path));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/usr/local/bin/rsync"),
                PathBuf::from("/usr/bin/rsync"),
            ]
        );
    }

    #[test]
    fn bare_name_without_path_has_no_candidates() {
        assert!(binary_candidates(OsStr::new("rsync"), None).is_empty());
    }

    #[test]
    fn execution_follows_owner_group_other_classes() {
        let user = identity(1000, 100, &[20]);
        assert!(mode_allows_execution(0o700, 1000, 5, &user));
        assert!(!mode_allows_execution(0o070, 1000, 100, &user));
        assert!(mode_allows_execution(0o010, 0, 20, &user));
        assert!(mode_allows_execution(0o001, 0, 0, &user));
        assert!(!mode_allows_execution(0o644, 1000, 100, &user));
        assert!(mode_allows_execution(0o100, 5, 5, &identity(0, 0, &[])));
    }

    #[test]
    fn is_executable_checks_file_type_and_mode() {
        let temp = tempfile::tempdir().expect("tempdir");
        let tool = temp.path().join("tool");
        fs::write(&tool, b"#!/bin/sh\n").expect("write");
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o644)).expect("chmod");
        assert!(!is_executable(&tool));

        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).expect("chmod");
        assert!(is_executable(&tool));
        assert!(!is_executable(temp.path()));
        assert!(!is_executable(&temp.path().join("missing")));
    }

    #[test]
    fn resolve_accepts_explicit_executable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let tool = temp.path().join("mirror-tool");
        fs::write(&tool, b"#!/bin/sh\n").expect("write");
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).expect("chmod");

        assert_eq!(resolve_binary(tool.as_os_str()), Some(tool));
    }
}
