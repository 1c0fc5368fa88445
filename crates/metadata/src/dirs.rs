//! Directory creation and permission enforcement.

use std::fs::{self, DirBuilder, Permissions};
use std::io;
use std::os::unix::fs::{DirBuilderExt, MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};

use crate::{MetadataError, Owner, TrustError, set_owner};

/// Mode given to a volatile root created from scratch.
pub const VOLATILE_ROOT_MODE: u32 = 0o755;

const TRAVERSE_ALL: u32 = 0o111;

/// Sets the permission bits of `path` to exactly `mode`, regardless of umask.
pub fn set_mode(path: &Path, mode: u32) -> Result<(), MetadataError> {
    fs::set_permissions(path, Permissions::from_mode(mode & 0o7777))
        .map_err(|error| MetadataError::new("set permissions on", path, error))
}

/// Creates `path` and every missing ancestor, giving each directory it
/// creates the permission bits `mode` and the ownership `owner`.
///
/// Directories that already exist are left untouched, owner and mode
/// included. Returns the directories that were created, outermost first.
///
/// Modes are applied after the whole chain exists, innermost first, so a
/// restrictive `mode` never blocks creation of the next segment.
pub fn create_dir_all_owned(
    path: &Path,
    mode: u32,
    owner: Owner,
) -> Result<Vec<PathBuf>, MetadataError> {
    let mut missing = Vec::new();
    let mut cursor = Some(path);
    while let Some(current) = cursor {
        match fs::metadata(current) {
            Ok(metadata) if metadata.is_dir() => break,
            Ok(_) => {
                return Err(MetadataError::new(
                    "create directory",
                    current,
                    io::Error::new(io::ErrorKind::AlreadyExists, "path exists and is not a directory"),
                ));
            }
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                missing.push(current.to_path_buf());
                cursor = current.parent();
            }
            Err(error) => return Err(MetadataError::new("inspect", current, error)),
        }
    }
    missing.reverse();

    let mut created = Vec::with_capacity(missing.len());
    for dir in missing {
        match DirBuilder::new().mode(0o700).create(&dir) {
            Ok(()) => created.push(dir),
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => {}
            Err(error) => return Err(MetadataError::new("create directory", dir, error)),
        }
    }

    for dir in created.iter().rev() {
        set_owner(dir, owner)?;
        set_mode(dir, mode)?;
    }

    Ok(created)
}

/// Makes sure `path` is a directory that everyone can traverse.
///
/// A missing directory (and any missing ancestor) is created with
/// [`VOLATILE_ROOT_MODE`]. An existing one gains the execute bit for user,
/// group and other when any is missing; its other bits are kept. Returns
/// `true` when the directory was created.
pub fn ensure_traversable(path: &Path) -> Result<bool, MetadataError> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => {
            let mode = metadata.mode() & 0o7777;
            if mode & TRAVERSE_ALL != TRAVERSE_ALL {
                set_mode(path, mode | TRAVERSE_ALL)?;
            }
            Ok(false)
        }
        Ok(_) => Err(MetadataError::new(
            "use as directory",
            path,
            io::Error::new(io::ErrorKind::AlreadyExists, "path exists and is not a directory"),
        )),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            DirBuilder::new()
                .recursive(true)
                .mode(VOLATILE_ROOT_MODE)
                .create(path)
                .map_err(|error| MetadataError::new("create directory", path, error))?;
            set_mode(path, VOLATILE_ROOT_MODE)?;
            Ok(true)
        }
        Err(error) => Err(MetadataError::new("inspect", path, error)),
    }
}

/// Verifies that `path` is a real directory owned by root or `caller`
/// and not writable by group or other.
pub fn ensure_trusted_directory(path: &Path, caller: u32) -> Result<(), TrustError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Err(TrustError::Missing {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(TrustError::Stat {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.file_type().is_dir() {
        return Err(TrustError::NotDirectory {
            path: path.to_path_buf(),
        });
    }

    let uid = metadata.uid();
    if uid != 0 && uid != caller {
        return Err(TrustError::Owner {
            path: path.to_path_buf(),
            uid,
        });
    }

    let mode = metadata.mode() & 0o7777;
    if mode & 0o022 != 0 {
        return Err(TrustError::Writable {
            path: path.to_path_buf(),
            mode,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode_of(path: &Path) -> u32 {
        fs::metadata(path).expect("stat").mode() & 0o7777
    }

    #[test]
    fn create_dir_all_owned_applies_mode_to_every_created_segment() {
        let temp = tempfile::tempdir().expect("tempdir");
        let leaf = temp.path().join("a/b/c");

        let created = create_dir_all_owned(&leaf, 0o750, Owner::current()).expect("create");
        assert_eq!(
            created,
            vec![
                temp.path().join("a"),
                temp.path().join("a/b"),
                temp.path().join("a/b/c"),
            ]
        );
        for dir in &created {
            assert_eq!(mode_of(dir), 0o750, "{}", dir.display());
        }
    }

    #[test]
    fn create_dir_all_owned_leaves_existing_segments_untouched() {
        let temp = tempfile::tempdir().expect("tempdir");
        let existing = temp.path().join("shared");
        fs::create_dir(&existing).expect("mkdir");
        set_mode(&existing, 0o711).expect("chmod");

        let created =
            create_dir_all_owned(&existing.join("mine"), 0o700, Owner::current()).expect("create");
        assert_eq!(created, vec![existing.join("mine")]);
        assert_eq!(mode_of(&existing), 0o711);
        assert_eq!(mode_of(&existing.join("mine")), 0o700);
    }

    #[test]
    fn create_dir_all_owned_survives_read_only_mode() {
        let temp = tempfile::tempdir().expect("tempdir");
        let leaf = temp.path().join("ro/inner");

        create_dir_all_owned(&leaf, 0o555, Owner::current()).expect("create");
        assert!(leaf.is_dir());
        assert_eq!(mode_of(&temp.path().join("ro")), 0o555);

        set_mode(&temp.path().join("ro"), 0o755).expect("restore for cleanup");
    }

    #[test]
    fn create_dir_all_owned_is_a_noop_for_existing_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let created = create_dir_all_owned(temp.path(), 0o700, Owner::current()).expect("create");
        assert!(created.is_empty());
    }

    #[test]
    fn create_dir_all_owned_rejects_file_in_the_way() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("file");
        fs::write(&file, b"x").expect("write");

        let error = create_dir_all_owned(&file.join("sub"), 0o755, Owner::current()).unwrap_err();
        assert_eq!(error.path(), file.as_path());
    }

    #[test]
    fn create_dir_all_owned_names_file_blocking_a_deep_chain() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("file");
        fs::write(&file, b"x").expect("write");

        let error = create_dir_all_owned(&file.join("a/b/c"), 0o700, Owner::current())
            .unwrap_err();
        assert_eq!(error.path(), file.as_path());
        assert_eq!(error.source_error().kind(), io::ErrorKind::AlreadyExists);
        assert!(!file.join("a").exists());
    }

    #[test]
    fn ensure_traversable_creates_with_default_mode() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("volatile/root");

        assert!(ensure_traversable(&root).expect("ensure"));
        assert_eq!(mode_of(&root), VOLATILE_ROOT_MODE);
    }

    #[test]
    fn ensure_traversable_adds_execute_bits_only() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("volatile");
        fs::create_dir(&root).expect("mkdir");
        set_mode(&root, 0o700).expect("chmod");

        assert!(!ensure_traversable(&root).expect("ensure"));
        assert_eq!(mode_of(&root), 0o711);
    }

    #[test]
    fn trusted_directory_accepts_private_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        set_mode(temp.path(), 0o755).expect("chmod");
        ensure_trusted_directory(temp.path(), Owner::current().uid).expect("trusted");
    }

    #[test]
    fn trusted_directory_rejects_group_writable() {
        let temp = tempfile::tempdir().expect("tempdir");
        set_mode(temp.path(), 0o775).expect("chmod");
        let error = ensure_trusted_directory(temp.path(), Owner::current().uid).unwrap_err();
        assert!(matches!(error, TrustError::Writable { mode: 0o775, .. }));
    }

    #[test]
    fn trusted_directory_rejects_symlink_and_missing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(temp.path(), &link).expect("symlink");

        let uid = Owner::current().uid;
        assert!(matches!(
            ensure_trusted_directory(&link, uid),
            Err(TrustError::NotDirectory { .. })
        ));
        assert!(matches!(
            ensure_trusted_directory(&temp.path().join("absent"), uid),
            Err(TrustError::Missing { .. })
        ));
    }

    #[test]
    fn trusted_directory_rejects_foreign_owner() {
        let temp = tempfile::tempdir().expect("tempdir");
        set_mode(temp.path(), 0o755).expect("chmod");
        let me = Owner::current().uid;
        if me == 0 {
            // root-owned directories are always accepted
            return;
        }
        let error = ensure_trusted_directory(temp.path(), me.wrapping_add(1)).unwrap_err();
        assert!(matches!(error, TrustError::Owner { .. }));
    }
}
