// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Content digest helpers. */

use {
    crate::error::{CydiaError, Result},
    digest::Digest,
    std::fmt::Formatter,
};

/// Checksum type / digest mechanism.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ChecksumType {
    /// MD5.
    Md5,

    /// SHA-1.
    Sha1,

    /// SHA-256.
    Sha256,
}

impl ChecksumType {
    /// Name of the control field in `Packages` stanzas holding this variant type.
    pub fn packages_field_name(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5sum",
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
        }
    }

    /// Name of the control field in `Release` files holding this variant type.
    pub fn release_field_name(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5Sum",
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
        }
    }

    /// Compute the digest of a byte buffer with this checksum flavor.
    pub fn digest_data(&self, data: &[u8]) -> ContentDigest {
        let digest = match self {
            Self::Md5 => md5::Md5::digest(data).to_vec(),
            Self::Sha1 => sha1::Sha1::digest(data).to_vec(),
            Self::Sha256 => sha2::Sha256::digest(data).to_vec(),
        };

        ContentDigest {
            checksum: *self,
            digest,
        }
    }
}

/// Raw digest bytes tagged with the [ChecksumType] that produced them.
///
/// Digests of different flavors never compare equal.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct ContentDigest {
    checksum: ChecksumType,
    digest: Vec<u8>,
}

impl std::fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({})", self.checksum, self.digest_hex())
    }
}

impl ContentDigest {
    /// Decode a hex digest as stored in a `Packages` stanza.
    pub fn from_hex_digest(checksum: ChecksumType, digest: &str) -> Result<Self> {
        let digest = hex::decode(digest)
            .map_err(|e| CydiaError::ContentDigestBadHex(digest.to_string(), e))?;

        Ok(Self { checksum, digest })
    }

    pub fn digest_bytes(&self) -> &[u8] {
        &self.digest
    }

    /// Lowercase hex rendering, as written in `Release` and `Packages` files.
    pub fn digest_hex(&self) -> String {
        hex::encode(&self.digest)
    }
}
