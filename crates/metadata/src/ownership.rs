#![allow(unsafe_code)]

use std::fmt;
use std::io;
use std::path::Path;

use rustix::fs::{AtFlags, CWD, chownat};
use rustix::process::{RawGid, RawUid};

use crate::MetadataError;

/// Numeric owner of a filesystem object.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Owner {
    /// User id.
    pub uid: u32,
    /// Group id.
    pub gid: u32,
}

impl Owner {
    /// Creates an owner from raw ids.
    pub const fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }

    /// Effective user and group of the running process.
    pub fn current() -> Self {
        Self {
            uid: rustix::process::geteuid().as_raw(),
            gid: rustix::process::getegid().as_raw(),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.uid, self.gid)
    }
}

fn uid_from_raw(raw: RawUid) -> rustix::fs::Uid {
    rustix::fs::Uid::from_raw(raw)
}

fn gid_from_raw(raw: RawGid) -> rustix::fs::Gid {
    rustix::fs::Gid::from_raw(raw)
}

/// Changes the owner of `path` without following a final symlink.
pub fn set_owner(path: &Path, owner: Owner) -> Result<(), MetadataError> {
    chownat(
        CWD,
        path,
        Some(uid_from_raw(owner.uid)),
        Some(gid_from_raw(owner.gid)),
        AtFlags::SYMLINK_NOFOLLOW,
    )
    .map_err(|error| MetadataError::new("change ownership of", path, io::Error::from(error)))
}
