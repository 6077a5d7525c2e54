// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Error handling. */

use thiserror::Error;

/// Primary crate error type.
#[derive(Debug, Error)]
pub enum CydiaError {
    #[error("{0}")]
    EmptyStanza(&'static str),

    #[error("required numeric field missing: {0}")]
    NumericFieldMissing(&'static str),

    #[error("numeric field {0} is not an integer: {1:?}")]
    NumericFieldInvalid(&'static str, std::num::ParseIntError),

    #[error("bad hex in content digest: {0}; {1:?}")]
    ContentDigestBadHex(String, hex::FromHexError),

    #[error("{0} required files missing. (Need Packages and Release)")]
    RepositoryRequiredFilesMissing(usize),

    #[error("no .deb file(s) found in {0}")]
    RepositoryNoDebFiles(String),

    #[error("repository I/O error on path {0}: {1:?}")]
    RepositoryIoPath(String, std::io::Error),
}

impl CydiaError {
    /// Whether this error stems from a required numeric field being absent or malformed.
    pub fn is_numeric_field_error(&self) -> bool {
        matches!(
            self,
            Self::NumericFieldMissing(_) | Self::NumericFieldInvalid(_, _)
        )
    }
}

/// Result wrapper for this crate.
pub type Result<T> = std::result::Result<T, CydiaError>;
