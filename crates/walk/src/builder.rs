use crate::error::WalkError;
use crate::walker::Walker;
use std::path::PathBuf;

/// Configures a walk rooted at one path.
#[derive(Clone, Debug)]
pub struct WalkBuilder {
    root: PathBuf,
    include_root: bool,
}

impl WalkBuilder {
    /// Walks `root`, which should be absolute.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            include_root: true,
        }
    }

    /// With `false` the walk starts at the root's children.
    #[must_use]
    pub const fn include_root(mut self, include: bool) -> Self {
        self.include_root = include;
        self
    }

    /// Inspects the root and returns the iterator.
    pub fn build(self) -> Result<Walker, WalkError> {
        Walker::new(self.root, self.include_root)
    }
}
