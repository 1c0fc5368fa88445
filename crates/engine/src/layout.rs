//! Deterministic mapping between sources, volatile paths and backups.
//!
//! A source `/home/u/Projects` owned by `1000:1000` under volatile root
//! `/vol` maps to:
//!
//! - volatile path `/vol/goanysync-1000-1000/home/u/Projects`
//! - backup path `/home/u/Projects-backup_goanysync`
//!
//! [`Layout::decode`] is the structural inverse of
//! [`Layout::volatile_path`]; nothing here touches the filesystem.

use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

use metadata::Owner;

/// Leading text of the per-owner directory under the volatile root.
pub const OWNER_PREFIX: &str = "goanysync-";

/// Suffix appended to a source path to form its backup path.
pub const BACKUP_SUFFIX: &str = "-backup_goanysync";

/// Volatile root plus the encoding rules for paths below it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    root: PathBuf,
}

/// Result of decoding a path under the volatile root.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Decoded {
    /// Owner encoded in the first segment.
    pub owner: Owner,
    /// Absolute source path implied by the rest of the path.
    pub source: PathBuf,
}

/// Everything derived for one source and owner.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MappedPaths {
    /// Where the relocated copy lives.
    pub volatile: PathBuf,
    /// Where the durable copy lives while relocated.
    pub backup: PathBuf,
    /// Recogniser for this source's volatile path under any owner.
    pub pattern: VolatilePattern,
}

/// Recognises volatile paths of one source regardless of owner.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VolatilePattern {
    layout: Layout,
    source: PathBuf,
}

impl VolatilePattern {
    /// Reports whether `path` is this source's volatile path for some owner.
    pub fn matches(&self, path: &Path) -> bool {
        self.layout
            .decode(path)
            .is_some_and(|decoded| decoded.source == self.source)
    }
}

impl Layout {
    /// Creates a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The volatile root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `⟨root⟩/goanysync-⟨uid⟩-⟨gid⟩`.
    pub fn owner_dir(&self, owner: Owner) -> PathBuf {
        self.root.join(owner_segment(owner))
    }

    /// Volatile path of `source` for `owner`.
    ///
    /// Only the normal components of `source` are appended, so
    /// `/srv//cache/` and `/srv/cache` map to the same place.
    pub fn volatile_path(&self, source: &Path, owner: Owner) -> PathBuf {
        let mut path = self.owner_dir(owner);
        for component in source.components() {
            if let Component::Normal(part) = component {
                path.push(part);
            }
        }
        path
    }

    /// Computes the volatile path, the backup path and the owner-agnostic
    /// pattern for `source`.
    pub fn map(&self, source: &Path, owner: Owner) -> MappedPaths {
        MappedPaths {
            volatile: self.volatile_path(source, owner),
            backup: backup_path(source),
            pattern: VolatilePattern {
                layout: self.clone(),
                source: absolute_source(source.components()),
            },
        }
    }

    /// Decodes a path under the volatile root.
    ///
    /// Returns `None` unless `path` lies below the root, its first component
    /// there is a well-formed owner segment and the remainder consists of
    /// plain names only. The owner directory itself decodes to source `/`.
    pub fn decode(&self, path: &Path) -> Option<Decoded> {
        let rest = path.strip_prefix(&self.root).ok()?;
        let mut components = rest.components();
        let owner = match components.next()? {
            Component::Normal(segment) => parse_owner_segment(segment)?,
            _ => return None,
        };

        let mut source = PathBuf::from("/");
        for component in components {
            match component {
                Component::Normal(part) => source.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(Decoded { owner, source })
    }

    /// Reports whether `path` decodes as a volatile path of any owner.
    pub fn is_volatile(&self, path: &Path) -> bool {
        self.decode(path).is_some()
    }
}

/// `⟨source⟩-backup_goanysync`.
pub fn backup_path(source: &Path) -> PathBuf {
    let trimmed = absolute_source(source.components());
    let mut raw: OsString = trimmed.into_os_string();
    raw.push(BACKUP_SUFFIX);
    PathBuf::from(raw)
}

/// `goanysync-⟨uid⟩-⟨gid⟩`.
pub fn owner_segment(owner: Owner) -> String {
    format!("{OWNER_PREFIX}{}-{}", owner.uid, owner.gid)
}

/// Parses an owner segment produced by [`owner_segment`].
///
/// Both ids must be canonical decimal numbers: no sign, no leading zero
/// (except `0` itself) and within `u32`.
pub fn parse_owner_segment(segment: &OsStr) -> Option<Owner> {
    let text = segment.to_str()?;
    let ids = text.strip_prefix(OWNER_PREFIX)?;
    let (uid, gid) = ids.split_once('-')?;
    Some(Owner::new(parse_id(uid)?, parse_id(gid)?))
}

fn parse_id(text: &str) -> Option<u32> {
    let canonical = !text.is_empty()
        && text.bytes().all(|b| b.is_ascii_digit())
        && (text == "0" || !text.starts_with('0'));
    if canonical { text.parse().ok() } else { None }
}

/// Reports whether `a` equals, contains or lies inside `b`, comparing whole
/// components.
///
/// ```
/// use engine::layout::related;
/// use std::path::Path;
///
/// assert!(related(Path::new("/home/u"), Path::new("/home/u/Projects")));
/// assert!(related(Path::new("/home/u/Projects/sub"), Path::new("/home/u/Projects")));
/// assert!(!related(Path::new("/home/u/Projects2"), Path::new("/home/u/Projects")));
/// ```
pub fn related(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

fn absolute_source<'a>(components: impl Iterator<Item = Component<'a>>) -> PathBuf {
    let mut path = PathBuf::from("/");
    for component in components {
        if let Component::Normal(part) = component {
            path.push(part);
        }
    }
    path
}
