// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Package control metadata. */

use {
    crate::{
        control::ControlStanza,
        error::{CydiaError, Result},
        parser::ControlDefaults,
    },
    std::borrow::Cow,
};

/// Obtain a required numeric field from a stanza.
pub(crate) fn required_i64(stanza: &ControlStanza, field: &'static str) -> Result<i64> {
    stanza
        .field_i64(field)
        .ok_or(CydiaError::NumericFieldMissing(field))?
        .map_err(|e| CydiaError::NumericFieldInvalid(field, e))
}

/// The control metadata of a single package.
///
/// This is the content of the `control` file embedded in a `.deb`, e.g. as printed by
/// `dpkg --field`. Fields absent from the source text are empty strings, except
/// `Homepage` and `Sponsor`, which take the values from [ControlDefaults].
/// `Installed-Size` is mandatory.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct PackageControl {
    package: String,
    name: String,
    depends: String,
    version: String,
    architecture: String,
    description: String,
    homepage: String,
    depiction: String,
    maintainer: String,
    author: String,
    sponsor: String,
    section: String,
    installed_size: i64,
}

impl PackageControl {
    /// Construct an instance from a tokenized stanza.
    ///
    /// Errors if `Installed-Size` is missing or isn't an integer.
    pub fn from_stanza(stanza: &ControlStanza, defaults: &ControlDefaults) -> Result<Self> {
        let installed_size = required_i64(stanza, "Installed-Size")?;

        let text = |name: &str| stanza.field_str_or_empty(name).to_string();

        Ok(Self {
            package: text("Package"),
            name: text("Name"),
            depends: text("Depends"),
            version: text("Version"),
            architecture: text("Architecture"),
            description: text("Description"),
            homepage: stanza
                .field_str("Homepage")
                .unwrap_or(&defaults.homepage_default)
                .to_string(),
            depiction: text("Depiction"),
            maintainer: text("Maintainer"),
            author: text("Author"),
            sponsor: stanza
                .field_str("Sponsor")
                .unwrap_or(&defaults.sponsor_default)
                .to_string(),
            section: text("Section"),
            installed_size,
        })
    }

    /// The package identifier. (e.g. `com.example.tweak`)
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The human readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `Depends` field as its original string.
    ///
    /// The expression is not parsed or validated.
    pub fn depends(&self) -> &str {
        &self.depends
    }

    /// The `Version` field as its original string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The `Architecture` field. (e.g. `iphoneos-arm`)
    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    /// The `Description` field.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The `Homepage` field, or the configured default.
    pub fn homepage(&self) -> &str {
        &self.homepage
    }

    /// The `Depiction` URL.
    pub fn depiction(&self) -> &str {
        &self.depiction
    }

    /// The `Maintainer` field.
    pub fn maintainer(&self) -> &str {
        &self.maintainer
    }

    /// The `Author` field.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// The `Sponsor` field, or the configured default.
    pub fn sponsor(&self) -> &str {
        &self.sponsor
    }

    /// The `Section` field.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Estimated disk space required to install the package.
    ///
    /// Any base 10 integer is accepted, including negative values.
    pub fn installed_size(&self) -> i64 {
        self.installed_size
    }

    /// Obtain the text fields of this record in canonical order.
    fn text_fields(&self) -> [(&'static str, &str); 12] {
        [
            ("Package", self.package.as_str()),
            ("Name", self.name.as_str()),
            ("Version", self.version.as_str()),
            ("Architecture", self.architecture.as_str()),
            ("Maintainer", self.maintainer.as_str()),
            ("Author", self.author.as_str()),
            ("Sponsor", self.sponsor.as_str()),
            ("Depends", self.depends.as_str()),
            ("Section", self.section.as_str()),
            ("Description", self.description.as_str()),
            ("Homepage", self.homepage.as_str()),
            ("Depiction", self.depiction.as_str()),
        ]
    }

    /// Convert this record back into a [ControlStanza].
    ///
    /// Empty text fields are omitted.
    pub fn to_stanza(&self) -> ControlStanza<'_> {
        let mut stanza = ControlStanza::default();

        for (name, value) in self.text_fields() {
            if !value.is_empty() {
                stanza.set_field_from_string(name.into(), value.into());
            }
        }

        stanza.set_field_from_string(
            "Installed-Size".into(),
            Cow::Owned(format!("{}", self.installed_size)),
        );

        stanza
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::control::tokenize, indoc::indoc};

    const TWEAK: &str = indoc! {"
        Package: com.example.tweakexample
        Name: TweakExample
        Depends: mobilesubstrate
        Version: 0.0.1
        Architecture: iphoneos-arm
        Description: An awesome MobileSubstrate tweak!
        Depiction: http://example.com/depiction
        Maintainer: foo
        Author: foo
        Section: Tweaks
        Installed-Size: 88
    "};

    #[test]
    fn from_stanza_all_fields() -> Result<()> {
        let control = PackageControl::from_stanza(&tokenize(TWEAK), &ControlDefaults::default())?;

        assert_eq!(control.package(), "com.example.tweakexample");
        assert_eq!(control.name(), "TweakExample");
        assert_eq!(control.depends(), "mobilesubstrate");
        assert_eq!(control.version(), "0.0.1");
        assert_eq!(control.architecture(), "iphoneos-arm");
        assert_eq!(control.description(), "An awesome MobileSubstrate tweak!");
        assert_eq!(control.depiction(), "http://example.com/depiction");
        assert_eq!(control.maintainer(), "foo");
        assert_eq!(control.author(), "foo");
        assert_eq!(control.section(), "Tweaks");
        assert_eq!(control.installed_size(), 88);
        assert_eq!(control.homepage(), "None");
        assert_eq!(control.sponsor(), "None");

        Ok(())
    }

    #[test]
    fn explicit_values_beat_defaults() -> Result<()> {
        let stanza = tokenize("Homepage: http://example.com\nSponsor: acme\nInstalled-Size: 1\n");
        let defaults = ControlDefaults::default()
            .with_homepage_default("http://default.invalid")
            .with_sponsor_default("nobody");

        let control = PackageControl::from_stanza(&stanza, &defaults)?;
        assert_eq!(control.homepage(), "http://example.com");
        assert_eq!(control.sponsor(), "acme");

        Ok(())
    }

    #[test]
    fn installed_size_required() {
        let defaults = ControlDefaults::default();

        let res = PackageControl::from_stanza(&tokenize("Package: foo\n"), &defaults);
        assert!(matches!(
            res,
            Err(CydiaError::NumericFieldMissing("Installed-Size"))
        ));

        let res = PackageControl::from_stanza(&tokenize("Installed-Size: lots\n"), &defaults);
        assert!(matches!(
            res,
            Err(CydiaError::NumericFieldInvalid("Installed-Size", _))
        ));

        let res = PackageControl::from_stanza(&tokenize("installed-size: 4\n"), &defaults);
        assert!(matches!(
            res,
            Err(CydiaError::NumericFieldMissing("Installed-Size"))
        ));
    }

    #[test]
    fn negative_installed_size() -> Result<()> {
        let control = PackageControl::from_stanza(
            &tokenize("Package: a\nInstalled-Size: -5\n"),
            &ControlDefaults::default(),
        )?;

        assert_eq!(control.installed_size(), -5);
        assert!(control.to_stanza().to_string().ends_with("Installed-Size: -5\n"));

        Ok(())
    }

    #[test]
    fn defaults_use_exact_key() -> Result<()> {
        let control = PackageControl::from_stanza(
            &tokenize("homepage: lower\nsponsor: lower\nInstalled-Size: 1\n"),
            &ControlDefaults::default(),
        )?;

        assert_eq!(control.homepage(), "None");
        assert_eq!(control.sponsor(), "None");

        Ok(())
    }

    #[test]
    fn to_stanza_roundtrips_fields() -> Result<()> {
        let defaults = ControlDefaults::default();
        let control = PackageControl::from_stanza(&tokenize(TWEAK), &defaults)?;

        let text = control.to_stanza().to_string();
        assert!(text.starts_with("Package: com.example.tweakexample\nName: TweakExample\n"));
        assert!(text.ends_with("Installed-Size: 88\n"));

        let reparsed = PackageControl::from_stanza(&tokenize(&text), &defaults)?;
        assert_eq!(reparsed, control);

        Ok(())
    }
}
