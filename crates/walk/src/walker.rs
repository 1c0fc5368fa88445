use crate::entry::WalkEntry;
use crate::error::WalkError;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::vec;

/// Depth-first, name-ordered iterator that never follows symlinks.
///
/// A directory is listed only when iteration moves past it, so calling
/// [`Walker::skip_current_dir`] right after a directory entry was yielded
/// keeps its contents from ever being read.
#[derive(Debug)]
pub struct Walker {
    root: Option<WalkEntry>,
    open: Vec<Listing>,
    next_dir: Option<PathBuf>,
    done: bool,
}

#[derive(Debug)]
struct Listing {
    dir: PathBuf,
    names: vec::IntoIter<OsString>,
}

impl Listing {
    fn read(dir: PathBuf) -> Result<Self, WalkError> {
        let reader =
            fs::read_dir(&dir).map_err(|error| WalkError::new("list", dir.clone(), error))?;
        let mut names = Vec::new();
        for entry in reader {
            let entry = entry.map_err(|error| WalkError::new("list", dir.clone(), error))?;
            names.push(entry.file_name());
        }
        names.sort();
        Ok(Self {
            dir,
            names: names.into_iter(),
        })
    }
}

impl Walker {
    pub(crate) fn new(root: PathBuf, include_root: bool) -> Result<Self, WalkError> {
        let metadata = fs::symlink_metadata(&root)
            .map_err(|error| WalkError::new("inspect", root.clone(), error))?;

        let mut walker = Self {
            root: None,
            open: Vec::new(),
            next_dir: None,
            done: false,
        };
        if include_root {
            walker.root = Some(WalkEntry {
                path: root,
                metadata,
            });
        } else if metadata.is_dir() {
            walker.open.push(Listing::read(root)?);
        }
        Ok(walker)
    }

    /// Keeps the walk out of the directory yielded last. No effect when
    /// that entry was not a directory.
    pub fn skip_current_dir(&mut self) {
        self.next_dir = None;
    }

    fn advance(&mut self) -> Option<Result<WalkEntry, WalkError>> {
        if let Some(root) = self.root.take() {
            return Some(Ok(root));
        }
        if let Some(dir) = self.next_dir.take() {
            match Listing::read(dir) {
                Ok(listing) => self.open.push(listing),
                Err(error) => return Some(Err(error)),
            }
        }
        loop {
            let listing = self.open.last_mut()?;
            let Some(name) = listing.names.next() else {
                self.open.pop();
                continue;
            };
            let path = listing.dir.join(name);
            return Some(match fs::symlink_metadata(&path) {
                Ok(metadata) => Ok(WalkEntry { path, metadata }),
                Err(error) => Err(WalkError::new("inspect", path, error)),
            });
        }
    }
}

impl Iterator for Walker {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.advance();
        match &item {
            Some(Ok(entry)) if entry.is_dir() => self.next_dir = Some(entry.path.clone()),
            Some(Ok(_)) => {}
            Some(Err(_)) | None => self.done = true,
        }
        item
    }
}
