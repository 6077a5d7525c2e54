// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Defines primitives in control stanzas.

A *stanza* is a block of `Key: Value` lines describing a single record. The
`control` file inside a `.deb` is one stanza. A `Packages` index file is a
series of stanzas separated by blank lines.

[tokenize()] turns text into a [ControlStanza]. Higher level types like
[crate::package_control::PackageControl] are lifted from a stanza.
*/

use {
    once_cell::sync::Lazy,
    regex::Regex,
    std::{borrow::Cow, collections::HashMap, io::Write},
};

/// Matches the start of a field definition.
///
/// The key is a run of non-whitespace characters beginning with a word character and
/// immediately terminated by a colon.
static RE_FIELD_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w[^\s:]*):(.*)$").expect("field line regex should compile"));

/// A field in a control stanza.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ControlField<'a> {
    name: Cow<'a, str>,
    value: Cow<'a, str>,
}

impl<'a> ControlField<'a> {
    /// Construct an instance from a field name and value.
    pub fn new(name: Cow<'a, str>, value: Cow<'a, str>) -> Self {
        Self { name, value }
    }

    /// The name of this field.
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Obtain the value as a [&str].
    ///
    /// Continuation lines are included, separated by newlines.
    pub fn value_str(&self) -> &str {
        self.value.as_ref()
    }

    /// Obtain an iterator of lines in the value.
    ///
    /// Leading whitespace from each line is stripped.
    pub fn iter_lines(&self) -> impl Iterator<Item = &str> {
        self.value.lines().map(|x| x.trim_start())
    }

    /// Write the contents of this field to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.name.as_bytes())?;
        writer.write_all(b": ")?;
        writer.write_all(self.value.as_bytes())?;
        writer.write_all(b"\n")
    }

    fn push_continuation(&mut self, line: &str) {
        let value = self.value.to_mut();
        value.push('\n');
        value.push_str(line);
    }
}

impl<'a> std::fmt::Display for ControlField<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}: {}", self.name, self.value)
    }
}

/// A stanza of control fields.
///
/// A stanza is an ordered series of fields. Field names are compared exactly, so `Foo`
/// and `foo` are distinct fields. A stanza only holds a single occurrence of each field:
/// setting an existing field replaces it.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ControlStanza<'a> {
    fields: Vec<ControlField<'a>>,
}

impl<'a> ControlStanza<'a> {
    /// Whether the stanza is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The number of fields in this stanza.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Set the value of a field via a [ControlField].
    ///
    /// If a field with the same name already exists, the old value is removed and the
    /// incoming field is appended.
    pub fn set_field(&mut self, field: ControlField<'a>) {
        self.fields.retain(|cf| cf.name != field.name);
        self.fields.push(field);
    }

    /// Set the value of a field defined via strings.
    pub fn set_field_from_string(&mut self, name: Cow<'a, str>, value: Cow<'a, str>) {
        self.set_field(ControlField::new(name, value));
    }

    /// Whether a named field is present in this stanza.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Iterate over fields in this stanza.
    ///
    /// Iteration order is insertion order.
    pub fn iter_fields(&self) -> impl Iterator<Item = &ControlField<'a>> {
        self.fields.iter()
    }

    /// Obtain the field with a given name in this stanza.
    pub fn field(&self, name: &str) -> Option<&ControlField<'a>> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Obtain the raw string value of the named field.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.value_str())
    }

    /// Obtain the string value of the named field or an empty string if absent.
    pub fn field_str_or_empty(&self, name: &str) -> &str {
        self.field_str(name).unwrap_or_default()
    }

    /// Obtain the value of a field parsed as a base 10 [i64].
    ///
    /// Surrounding whitespace is not tolerated. A leading sign is.
    pub fn field_i64(&self, name: &str) -> Option<std::result::Result<i64, std::num::ParseIntError>> {
        self.field_str(name).map(|v| v.parse::<i64>())
    }

    /// Convert this stanza to a [HashMap].
    ///
    /// Keys retain their original spelling.
    pub fn as_str_hash_map(&self) -> HashMap<&str, &str> {
        HashMap::from_iter(
            self.fields
                .iter()
                .map(|field| (field.name.as_ref(), field.value_str())),
        )
    }

    /// Serialize the stanza to a writer.
    ///
    /// Every field is terminated by a newline. No blank line is written after the
    /// final field.
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for field in &self.fields {
            field.write(writer)?;
        }

        Ok(())
    }
}

impl<'a> std::fmt::Display for ControlStanza<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for field in &self.fields {
            write!(f, "{}", field)?;
        }

        Ok(())
    }
}

/// Tokenize text into a [ControlStanza].
///
/// The entire input is treated as a single stanza and is scanned line by line.
///
/// A field line begins with a key token (a word character followed by non-whitespace
/// characters) immediately followed by `:`. The value is the remainder of the line with
/// exactly one leading space removed. Keys are case sensitive.
///
/// Indented lines directly following a field are continuation lines and are appended to
/// that field's value, separated by `\n`. All other lines are ignored.
///
/// If a key occurs more than once, the last occurrence wins. An empty stanza is returned
/// if no line looks like a field.
pub fn tokenize(text: &str) -> ControlStanza<'_> {
    let mut stanza = ControlStanza::default();
    // Whether the most recently seen line was part of a field.
    let mut in_field = false;

    for line in text.lines() {
        if let Some(caps) = RE_FIELD_LINE.captures(line) {
            let (name, value) = match (caps.get(1), caps.get(2)) {
                (Some(name), Some(value)) => (name, value.as_str()),
                _ => {
                    in_field = false;
                    continue;
                }
            };

            let value = value.strip_prefix(' ').unwrap_or(value);

            stanza.set_field_from_string(name.as_str().into(), value.into());
            in_field = true;
        } else if in_field
            && line.starts_with([' ', '\t'])
            && !line.trim().is_empty()
        {
            if let Some(field) = stanza.fields.last_mut() {
                field.push_continuation(line);
            }
        } else {
            in_field = false;
        }
    }

    stanza
}

/// Split text holding multiple stanzas into the text of each stanza.
///
/// Stanzas are separated by one or more lines consisting solely of whitespace. Returned
/// slices retain their line terminators.
pub fn split_stanzas(text: &str) -> Vec<&str> {
    let mut stanzas = vec![];
    let mut start = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(begin) = start.take() {
                stanzas.push(&text[begin..offset]);
            }
        } else if start.is_none() {
            start = Some(offset);
        }

        offset += line.len();
    }

    if let Some(begin) = start {
        stanzas.push(&text[begin..]);
    }

    stanzas
}
