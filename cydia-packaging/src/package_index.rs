// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Entries in a `Packages` index file.

A `Packages` file aggregates the control metadata of every package in a repository,
augmented with the location, size, and checksums of each `.deb`.

[PackageIndexEntry] represents one such entry. It [Deref]s to [PackageControl] so the
shared control fields are available on both record shapes. [PackageRecord] wraps
either shape when a caller handles both.
*/

use {
    crate::{
        control::ControlStanza,
        error::Result,
        io::{ChecksumType, ContentDigest},
        package_control::{required_i64, PackageControl},
        parser::ControlDefaults,
    },
    std::{
        borrow::Cow,
        ops::{Deref, DerefMut},
    },
};

/// An entry in a `Packages` index file.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct PackageIndexEntry {
    control: PackageControl,
    filename: String,
    size: i64,
    md5sum: String,
    sha1: String,
    sha256: String,
}

impl Deref for PackageIndexEntry {
    type Target = PackageControl;

    fn deref(&self) -> &Self::Target {
        &self.control
    }
}

impl DerefMut for PackageIndexEntry {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.control
    }
}

impl From<PackageIndexEntry> for PackageControl {
    fn from(entry: PackageIndexEntry) -> Self {
        entry.control
    }
}

impl PackageIndexEntry {
    /// Construct an instance from a tokenized stanza.
    ///
    /// Both `Installed-Size` and `Size` must be present and integer valued. Checksums
    /// and the filename are taken verbatim.
    pub fn from_stanza(stanza: &ControlStanza, defaults: &ControlDefaults) -> Result<Self> {
        let control = PackageControl::from_stanza(stanza, defaults)?;
        let size = required_i64(stanza, "Size")?;

        let text = |name: &str| stanza.field_str_or_empty(name).to_string();

        Ok(Self {
            control,
            filename: text("Filename"),
            size,
            md5sum: text(ChecksumType::Md5.packages_field_name()),
            sha1: text(ChecksumType::Sha1.packages_field_name()),
            sha256: text(ChecksumType::Sha256.packages_field_name()),
        })
    }

    /// The control fields of this entry.
    pub fn control(&self) -> &PackageControl {
        &self.control
    }

    /// Path of the `.deb` relative to the repository root.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The filename component of [Self::filename()].
    pub fn deb_filename(&self) -> &str {
        match self.filename.rsplit_once('/') {
            Some((_, s)) => s,
            None => &self.filename,
        }
    }

    /// Size of the `.deb` in bytes, as recorded in the index.
    pub fn size(&self) -> i64 {
        self.size
    }

    /// The hex encoded MD5 of the `.deb`.
    pub fn md5sum(&self) -> &str {
        &self.md5sum
    }

    /// The hex encoded SHA-1 of the `.deb`.
    pub fn sha1(&self) -> &str {
        &self.sha1
    }

    /// The hex encoded SHA-256 of the `.deb`.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    /// The hex digest stored for a given [ChecksumType].
    pub fn digest_hex(&self, checksum: ChecksumType) -> &str {
        match checksum {
            ChecksumType::Md5 => &self.md5sum,
            ChecksumType::Sha1 => &self.sha1,
            ChecksumType::Sha256 => &self.sha256,
        }
    }

    /// Decode the stored digest for a given [ChecksumType].
    ///
    /// Errors if the stored value isn't valid hex.
    pub fn content_digest(&self, checksum: ChecksumType) -> Result<ContentDigest> {
        ContentDigest::from_hex_digest(checksum, self.digest_hex(checksum))
    }

    /// Whether the given content matches the size and stored digests of this entry.
    ///
    /// Checksums that are empty are not consulted.
    pub fn matches_content(&self, data: &[u8]) -> Result<bool> {
        if i64::try_from(data.len()).ok() != Some(self.size) {
            return Ok(false);
        }

        for checksum in [ChecksumType::Sha256, ChecksumType::Sha1, ChecksumType::Md5] {
            if self.digest_hex(checksum).is_empty() {
                continue;
            }

            if self.content_digest(checksum)? != checksum.digest_data(data) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Convert this entry back into a [ControlStanza].
    ///
    /// Index specific fields follow the control fields. Empty text fields are omitted.
    pub fn to_stanza(&self) -> ControlStanza<'_> {
        let mut stanza = self.control.to_stanza();

        if !self.filename.is_empty() {
            stanza.set_field_from_string("Filename".into(), self.filename.as_str().into());
        }
        stanza.set_field_from_string("Size".into(), Cow::Owned(format!("{}", self.size)));

        for checksum in [ChecksumType::Md5, ChecksumType::Sha1, ChecksumType::Sha256] {
            let value = self.digest_hex(checksum);

            if !value.is_empty() {
                stanza.set_field_from_string(checksum.packages_field_name().into(), value.into());
            }
        }

        stanza
    }
}

/// A package record of either shape.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PackageRecord {
    /// Metadata from a package's own `control` file.
    Control(PackageControl),
    /// An entry from a `Packages` index.
    IndexEntry(PackageIndexEntry),
}

impl Deref for PackageRecord {
    type Target = PackageControl;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Control(c) => c,
            Self::IndexEntry(e) => e.control(),
        }
    }
}

impl From<PackageControl> for PackageRecord {
    fn from(v: PackageControl) -> Self {
        Self::Control(v)
    }
}

impl From<PackageIndexEntry> for PackageRecord {
    fn from(v: PackageIndexEntry) -> Self {
        Self::IndexEntry(v)
    }
}

impl PackageRecord {
    /// Obtain the [PackageIndexEntry] if this is an index entry.
    pub fn as_index_entry(&self) -> Option<&PackageIndexEntry> {
        match self {
            Self::Control(_) => None,
            Self::IndexEntry(e) => Some(e),
        }
    }

    /// Convert this record into a [ControlStanza].
    pub fn to_stanza(&self) -> ControlStanza<'_> {
        match self {
            Self::Control(c) => c.to_stanza(),
            Self::IndexEntry(e) => e.to_stanza(),
        }
    }
}
