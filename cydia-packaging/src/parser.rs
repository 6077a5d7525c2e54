// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Lifting stanza text into typed package records.

[StanzaParser] is the entry point. It is configured with [ControlDefaults], which
hold the values substituted for `Homepage` and `Sponsor` when a stanza lacks them.

Parsing is atomic: either a fully populated record is returned or an error is. No
state is retained between calls, so a single parser can be shared freely.
*/

use {
    crate::{
        control::{split_stanzas, tokenize, ControlStanza},
        error::{CydiaError, Result},
        package_control::PackageControl,
        package_index::PackageIndexEntry,
    },
    log::debug,
    serde::{Deserialize, Serialize},
};

/// The value both defaults take unless configured otherwise.
pub const DEFAULT_FIELD_VALUE: &str = "None";

/// Values substituted for optional fields when a stanza doesn't define them.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ControlDefaults {
    /// Value used for `Homepage` when absent.
    pub homepage_default: String,

    /// Value used for `Sponsor` when absent.
    pub sponsor_default: String,
}

impl Default for ControlDefaults {
    fn default() -> Self {
        Self {
            homepage_default: DEFAULT_FIELD_VALUE.to_string(),
            sponsor_default: DEFAULT_FIELD_VALUE.to_string(),
        }
    }
}

impl ControlDefaults {
    /// Set the value substituted for a missing `Homepage`.
    #[must_use]
    pub fn with_homepage_default(mut self, value: impl ToString) -> Self {
        self.homepage_default = value.to_string();
        self
    }

    /// Set the value substituted for a missing `Sponsor`.
    #[must_use]
    pub fn with_sponsor_default(mut self, value: impl ToString) -> Self {
        self.sponsor_default = value.to_string();
        self
    }
}

/// Parses stanza text into [PackageControl] and [PackageIndexEntry] records.
#[derive(Clone, Debug, Default)]
pub struct StanzaParser {
    defaults: ControlDefaults,
}

impl StanzaParser {
    /// Construct a parser using the given defaults.
    pub fn new(defaults: ControlDefaults) -> Self {
        Self { defaults }
    }

    /// The defaults this parser substitutes.
    pub fn defaults(&self) -> &ControlDefaults {
        &self.defaults
    }

    /// Tokenize text into a [ControlStanza].
    ///
    /// See [tokenize()].
    pub fn tokenize<'a>(&self, text: &'a str) -> ControlStanza<'a> {
        tokenize(text)
    }

    /// Parse the control metadata of a single package.
    pub fn parse_control(&self, text: &str) -> Result<PackageControl> {
        let stanza = tokenize(text);
        if stanza.is_empty() {
            return Err(CydiaError::EmptyStanza("unable to parse control file"));
        }

        debug!("parsed control stanza with {} fields", stanza.len());

        PackageControl::from_stanza(&stanza, &self.defaults)
    }

    /// Parse a single entry of a `Packages` index.
    ///
    /// In addition to `Installed-Size`, the `Size` field is mandatory.
    pub fn parse_index_entry(&self, text: &str) -> Result<PackageIndexEntry> {
        let stanza = tokenize(text);
        if stanza.is_empty() {
            return Err(CydiaError::EmptyStanza("unable to parse Packages file"));
        }

        debug!("parsed Packages stanza with {} fields", stanza.len());

        PackageIndexEntry::from_stanza(&stanza, &self.defaults)
    }

    /// Parse every entry of a `Packages` index.
    ///
    /// Stanzas are separated by blank lines. The first stanza failing to parse aborts the
    /// operation.
    pub fn parse_index(&self, text: &str) -> Result<Vec<PackageIndexEntry>> {
        split_stanzas(text)
            .into_iter()
            .map(|stanza| self.parse_index_entry(stanza))
            .collect()
    }
}
