// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! `Release` file primitives.

A `Release` file describes a repository: who publishes it, which suite and
architectures it serves, and the checksums of the index files clients fetch.

[ReleaseManifest] accumulates that metadata and renders the canonical text. Index
files are referenced through [ContentSignature] entries, which are rendered in
insertion order under a single `MD5Sum` field.
*/

use {
    crate::io::{ChecksumType, ContentDigest},
    log::debug,
    std::{borrow::Cow, fmt::Formatter},
};

/// Default value of the `Suite` field.
pub const DEFAULT_SUITE: &str = "beta";

/// Default value of the `Architectures` field.
pub const DEFAULT_ARCHITECTURES: &str = "iphoneos-arm";

/// Default value of the `Components` field.
pub const DEFAULT_COMPONENTS: &str = "main";

/// Logical filename of the uncompressed `Packages` index.
pub const PACKAGES_FILENAME: &str = "Packages";

/// Logical filename of the bzip2 compressed `Packages` index.
pub const PACKAGES_BZ2_FILENAME: &str = "Packages.bz2";

/// Checksum flavor used for signatures in the `Release` file.
pub const SIGNATURE_CHECKSUM: ChecksumType = ChecksumType::Md5;

/// A checksummed file referenced by a `Release` file.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ContentSignature {
    digest: String,
    size: u64,
    name: String,
}

impl ContentSignature {
    /// Construct an instance from an already computed hex digest.
    pub fn new(digest: impl ToString, size: u64, name: impl ToString) -> Self {
        Self {
            digest: digest.to_string(),
            size,
            name: name.to_string(),
        }
    }

    /// Construct an instance by digesting a byte buffer.
    pub fn from_data(data: &[u8], name: impl ToString) -> Self {
        let digest = SIGNATURE_CHECKSUM.digest_data(data);

        Self::from_digest(&digest, data.len() as u64, name)
    }

    /// Construct an instance from a [ContentDigest].
    pub fn from_digest(digest: &ContentDigest, size: u64, name: impl ToString) -> Self {
        Self::new(digest.digest_hex(), size, name)
    }

    /// The hex encoded digest.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// The size of the referenced content in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The logical filename of the referenced content.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ContentSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, " {} {} {}", self.digest, self.size, self.name)
    }
}

/// Repository level metadata rendered to a `Release` file.
///
/// Setters replace values unconditionally and perform no validation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReleaseManifest {
    origin: String,
    label: String,
    suite: String,
    version: i64,
    codename: String,
    architectures: String,
    components: String,
    description: String,
    signatures: Vec<ContentSignature>,
}

impl Default for ReleaseManifest {
    fn default() -> Self {
        Self {
            origin: String::new(),
            label: String::new(),
            suite: DEFAULT_SUITE.to_string(),
            version: 0,
            codename: String::new(),
            architectures: DEFAULT_ARCHITECTURES.to_string(),
            components: DEFAULT_COMPONENTS.to_string(),
            description: String::new(),
            signatures: vec![],
        }
    }
}

impl ReleaseManifest {
    /// Construct an instance with default `Suite`, `Architectures`, and `Components`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The `Origin` field.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Set the `Origin` field.
    pub fn set_origin(&mut self, value: impl ToString) {
        self.origin = value.to_string();
    }

    /// The `Label` field.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Set the `Label` field.
    pub fn set_label(&mut self, value: impl ToString) {
        self.label = value.to_string();
    }

    /// The `Suite` field. (e.g. `beta` or `stable`)
    pub fn suite(&self) -> &str {
        &self.suite
    }

    /// Set the `Suite` field.
    pub fn set_suite(&mut self, value: impl ToString) {
        self.suite = value.to_string();
    }

    /// The `Version` field.
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Set the `Version` field.
    pub fn set_version(&mut self, value: i64) {
        self.version = value;
    }

    /// The `Codename` field.
    pub fn codename(&self) -> &str {
        &self.codename
    }

    /// Set the `Codename` field.
    pub fn set_codename(&mut self, value: impl ToString) {
        self.codename = value.to_string();
    }

    /// The `Architectures` field.
    pub fn architectures(&self) -> &str {
        &self.architectures
    }

    /// Set the `Architectures` field.
    pub fn set_architectures(&mut self, value: impl ToString) {
        self.architectures = value.to_string();
    }

    /// The `Components` field.
    pub fn components(&self) -> &str {
        &self.components
    }

    /// Set the `Components` field.
    pub fn set_components(&mut self, value: impl ToString) {
        self.components = value.to_string();
    }

    /// The `Description` field.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the `Description` field.
    pub fn set_description(&mut self, value: impl ToString) {
        self.description = value.to_string();
    }

    /// Signatures registered so far, in insertion order.
    pub fn signatures(&self) -> &[ContentSignature] {
        &self.signatures
    }

    /// Append a precomputed [ContentSignature].
    pub fn add_signature(&mut self, signature: ContentSignature) {
        self.signatures.push(signature);
    }

    /// Digest buffers and append a signature for each.
    ///
    /// Each item is the content and its logical filename. Signatures are appended in
    /// iteration order. Calling this again appends further signatures.
    pub fn add_content_signature<'a>(
        &mut self,
        buffers: impl IntoIterator<Item = (&'a [u8], &'a str)>,
    ) {
        for (data, name) in buffers {
            let signature = ContentSignature::from_data(data, name);
            debug!(
                "adding signature for {} ({} bytes): {}",
                name,
                signature.size(),
                signature.digest()
            );

            self.add_signature(signature);
        }
    }

    /// Append signatures for the uncompressed and bzip2 compressed `Packages` index.
    ///
    /// The uncompressed index is always registered first.
    pub fn add_packages_signature(&mut self, packages: &[u8], packages_bz2: &[u8]) {
        self.add_content_signature([
            (packages, PACKAGES_FILENAME),
            (packages_bz2, PACKAGES_BZ2_FILENAME),
        ]);
    }

    /// Obtain the scalar fields in rendering order.
    pub fn iter_fields(&self) -> impl Iterator<Item = (&'static str, Cow<'_, str>)> {
        [
            ("Origin", Cow::Borrowed(self.origin.as_str())),
            ("Label", Cow::Borrowed(self.label.as_str())),
            ("Suite", Cow::Borrowed(self.suite.as_str())),
            ("Version", Cow::Owned(format!("{}", self.version))),
            ("Codename", Cow::Borrowed(self.codename.as_str())),
            ("Architectures", Cow::Borrowed(self.architectures.as_str())),
            ("Components", Cow::Borrowed(self.components.as_str())),
            ("Description", Cow::Borrowed(self.description.as_str())),
        ]
        .into_iter()
    }

    /// Render the canonical `Release` file text.
    ///
    /// Every line is newline terminated. The `MD5Sum` field is always emitted, even
    /// when no signatures exist.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for ReleaseManifest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (name, value) in self.iter_fields() {
            writeln!(f, "{}: {}", name, value)?;
        }

        writeln!(f, "{}:", SIGNATURE_CHECKSUM.release_field_name())?;
        for signature in &self.signatures {
            writeln!(f, "{}", signature)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let release = ReleaseManifest::new();

        assert_eq!(release.suite(), "beta");
        assert_eq!(release.architectures(), "iphoneos-arm");
        assert_eq!(release.components(), "main");
        assert_eq!(release.origin(), "");
        assert_eq!(release.version(), 0);
        assert!(release.signatures().is_empty());
    }

    #[test]
    fn render_example() {
        let mut release = ReleaseManifest::new();
        release.set_origin("Example");
        release.add_signature(ContentSignature::new("abc123", 100, "Packages"));

        assert_eq!(
            release.render(),
            "Origin: Example\n\
             Label: \n\
             Suite: beta\n\
             Version: 0\n\
             Codename: \n\
             Architectures: iphoneos-arm\n\
             Components: main\n\
             Description: \n\
             MD5Sum:\n \
             abc123 100 Packages\n"
        );
    }

    #[test]
    fn render_without_signatures() {
        let release = ReleaseManifest::new();

        assert!(release.render().ends_with("Description: \nMD5Sum:\n"));
    }

    #[test]
    fn setters_replace() {
        let mut release = ReleaseManifest::new();
        release.set_origin("a");
        release.set_origin("b");
        release.set_label("Example Repo");
        release.set_suite("stable");
        release.set_version(-3);
        release.set_codename("ios");
        release.set_architectures("darwin-arm");
        release.set_components("main extra");
        release.set_description("A default repo");

        let fields = release
            .iter_fields()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>();

        assert_eq!(
            fields,
            vec![
                "Origin=b",
                "Label=Example Repo",
                "Suite=stable",
                "Version=-3",
                "Codename=ios",
                "Architectures=darwin-arm",
                "Components=main extra",
                "Description=A default repo",
            ]
        );
    }

    #[test]
    fn packages_signature_order() {
        let mut release = ReleaseManifest::new();
        release.add_packages_signature(b"", b"abc");

        let text = release.render();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[8], "MD5Sum:");
        assert_eq!(lines[9], " d41d8cd98f00b204e9800998ecf8427e 0 Packages");
        assert_eq!(lines[10], " 900150983cd24fb0d6963f7d28e17f72 3 Packages.bz2");
    }

    #[test]
    fn repeated_signatures_append() {
        let mut release = ReleaseManifest::new();
        release.add_content_signature([(&b"a"[..], "A")]);
        release.add_content_signature([(&b"b"[..], "B")]);

        let names = release
            .signatures()
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(release.signatures()[0].size(), 1);
    }

    #[test]
    fn render_is_deterministic() {
        let mut release = ReleaseManifest::new();
        release.set_origin("Example");
        release.add_packages_signature(b"Package: foo\n", b"compressed");

        assert_eq!(release.render(), release.render());
    }
}
