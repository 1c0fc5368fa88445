//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::os::unix::fs::{PermissionsExt, symlink};
use std::path::{Path, PathBuf};

use engine::{Layout, Mirror, MirrorError, Orchestrator};
use logging::Logger;

/// In-process stand-in for `rsync -a --delete src/ dst`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeMirror;

impl Mirror for TreeMirror {
    fn mirror(&self, source: &Path, destination: &Path) -> Result<(), MirrorError> {
        clear(destination).map_err(|error| io_error(destination, error))?;
        copy_tree(source, destination)
    }
}

/// Mirrors like [`TreeMirror`] for the first `remaining` calls, then fails
/// as if the destination filled up.
#[derive(Debug)]
pub struct FailingAfter {
    remaining: Cell<usize>,
}

impl FailingAfter {
    pub const fn new(calls: usize) -> Self {
        Self {
            remaining: Cell::new(calls),
        }
    }
}

impl Mirror for FailingAfter {
    fn mirror(&self, source: &Path, destination: &Path) -> Result<(), MirrorError> {
        match self.remaining.get() {
            0 => Err(io_error(destination, io::Error::other("disk full"))),
            left => {
                self.remaining.set(left - 1);
                TreeMirror.mirror(source, destination)
            }
        }
    }
}

fn io_error(path: &Path, source: io::Error) -> MirrorError {
    MirrorError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn clear(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

fn copy_tree(source: &Path, destination: &Path) -> Result<(), MirrorError> {
    let entries = fs::read_dir(source).map_err(|error| io_error(source, error))?;
    for entry in entries {
        let entry = entry.map_err(|error| io_error(source, error))?;
        let from = entry.path();
        let to = destination.join(entry.file_name());
        let metadata = fs::symlink_metadata(&from).map_err(|error| io_error(&from, error))?;
        if metadata.file_type().is_symlink() {
            let target = fs::read_link(&from).map_err(|error| io_error(&from, error))?;
            symlink(target, &to).map_err(|error| io_error(&to, error))?;
        } else if metadata.is_dir() {
            fs::create_dir(&to).map_err(|error| io_error(&to, error))?;
            copy_tree(&from, &to)?;
            fs::set_permissions(&to, metadata.permissions()).map_err(|error| io_error(&to, error))?;
        } else {
            fs::copy(&from, &to).map_err(|error| io_error(&from, error))?;
        }
    }
    Ok(())
}

/// A scratch tree with a volatile root and helpers to build sources.
pub struct Scratch {
    _temp: tempfile::TempDir,
    pub base: PathBuf,
    pub layout: Layout,
}

impl Scratch {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let base = temp.path().to_path_buf();
        fs::set_permissions(&base, fs::Permissions::from_mode(0o755)).expect("chmod");
        let layout = Layout::new(base.join("vol"));
        Self {
            _temp: temp,
            base,
            layout,
        }
    }

    /// Creates a source directory holding `files` (relative path, content).
    pub fn source(&self, relative: &str, files: &[(&str, &str)]) -> PathBuf {
        let source = self.base.join(relative);
        fs::create_dir_all(&source).expect("mkdir source");
        for (name, content) in files {
            let path = source.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("mkdir parent");
            }
            fs::write(path, content).expect("write file");
        }
        source
    }

    pub fn orchestrator(&self, sources: &[PathBuf], logger: Logger) -> Orchestrator<TreeMirror> {
        self.orchestrator_with(sources, TreeMirror, logger)
    }

    pub fn orchestrator_with<M: Mirror>(
        &self,
        sources: &[PathBuf],
        mirror: M,
        logger: Logger,
    ) -> Orchestrator<M> {
        Orchestrator::new(self.layout.clone(), sources.to_vec(), mirror, logger)
    }
}

/// Relative path to file content for every regular file below `root`,
/// following `root` itself when it is a symlink.
pub fn contents(root: &Path) -> BTreeMap<PathBuf, String> {
    let mut found = BTreeMap::new();
    collect(root, Path::new(""), &mut found);
    found
}

fn collect(dir: &Path, prefix: &Path, found: &mut BTreeMap<PathBuf, String>) {
    for entry in fs::read_dir(dir).expect("read_dir") {
        let entry = entry.expect("entry");
        let relative = prefix.join(entry.file_name());
        let file_type = entry.file_type().expect("file type");
        if file_type.is_dir() {
            collect(&entry.path(), &relative, found);
        } else if file_type.is_file() {
            found.insert(relative, fs::read_to_string(entry.path()).expect("read"));
        }
    }
}

/// Every path below `root` with its file type, without following links.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, String> {
    let mut found = BTreeMap::new();
    walk_snapshot(root, &mut found);
    found
}

fn walk_snapshot(dir: &Path, found: &mut BTreeMap<PathBuf, String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries {
        let entry = entry.expect("entry");
        let path = entry.path();
        let file_type = entry.file_type().expect("file type");
        let kind = if file_type.is_symlink() {
            format!("link -> {}", fs::read_link(&path).expect("readlink").display())
        } else if file_type.is_dir() {
            "dir".to_owned()
        } else {
            "file".to_owned()
        };
        found.insert(path.clone(), kind);
        if file_type.is_dir() {
            walk_snapshot(&path, found);
        }
    }
}

pub fn expected(files: &[(&str, &str)]) -> BTreeMap<PathBuf, String> {
    files
        .iter()
        .map(|(name, content)| (PathBuf::from(name), (*content).to_owned()))
        .collect()
}

pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|metadata| metadata.file_type().is_symlink())
}
