// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Cydia repository metadata primitives.

This crate implements the metadata formats behind Cydia (jailbroken iOS) package
repositories, which follow Debian packaging conventions: *stanzas* of `Key: Value`
fields describing packages, and a `Release` file describing the repository itself.

# A Tour of Functionality

Low-level stanza primitives live in the [control] module. [control::tokenize()]
turns text into a [control::ControlStanza], an ordered collection of
[control::ControlField]. [control::split_stanzas()] separates the stanzas of a
multi-package file.

Typed records are lifted from stanzas by [parser::StanzaParser].
[package_control::PackageControl] holds the metadata of a single package, as found
in the `control` file of a `.deb`. [package_index::PackageIndexEntry] is an entry
in a `Packages` index: the same fields plus the `.deb` location, size, and
checksums. [package_index::PackageRecord] wraps either shape. Defaults for
optional fields are configured through [parser::ControlDefaults].

The [release] module builds `Release` files. [release::ReleaseManifest] holds
repository metadata and a list of [release::ContentSignature] describing the
checksummed index files, and renders the canonical text.

[io] defines checksum flavors and content digests. [repository] contains helpers
for repositories stored in a local directory.

Compression of indices, PGP signing, and running `dpkg` tooling are out of scope:
callers perform those with external tools and hand the results to this crate.
*/

pub mod control;
pub mod error;
pub mod io;
pub mod package_control;
pub mod package_index;
pub mod parser;
pub mod release;
pub mod repository;
