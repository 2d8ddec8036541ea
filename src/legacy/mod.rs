//! Readers for legacy localization formats.
//!
//! Each reader turns a file into a flat list of [`LegacyEntry`] values: the
//! key, the unescaped value, and the line span the entry occupies. The span
//! lets blame attribute a key to whoever last edited its first line.
//!
//! | Extension     | Reader                      |
//! |---------------|-----------------------------|
//! | `.properties` | [`properties::parse`]       |
//! | `.dtd`        | [`dtd::parse`]              |
//! | `.po`         | [`po::parse`] (bilingual)   |

pub mod dtd;
pub mod po;
pub mod properties;

/// Supported legacy file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegacyFormat {
    Properties,
    Dtd,
    Po,
}

impl LegacyFormat {
    /// Pick the reader from the file extension.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let extension = path.rsplit_once('.').map(|(_, ext)| ext)?;
        match extension {
            "properties" => Some(Self::Properties),
            "dtd" => Some(Self::Dtd),
            "po" => Some(Self::Po),
            _ => None,
        }
    }
}

/// One key/value pair of a legacy file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyEntry {
    pub key: String,
    /// Value with format-specific escapes resolved.
    pub value: String,
    /// 1-based line that attributes the entry in blame.
    pub line: usize,
    /// 1-based last line of the entry.
    pub end_line: usize,
    /// `false` for bilingual entries that have no translation yet.
    pub translated: bool,
}

/// A parsed legacy file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegacyResource {
    entries: Vec<LegacyEntry>,
}

impl LegacyResource {
    /// Parse `text` with the reader for `format`.
    #[must_use]
    pub fn parse(format: LegacyFormat, text: &str) -> Self {
        let entries = match format {
            LegacyFormat::Properties => properties::parse(text),
            LegacyFormat::Dtd => dtd::parse(text),
            LegacyFormat::Po => po::parse(text),
        };
        Self { entries }
    }

    /// Build a resource from literal key/value pairs, all translated.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .enumerate()
            .map(|(index, (key, value))| LegacyEntry {
                key: key.into(),
                value: value.into(),
                line: index + 1,
                end_line: index + 1,
                translated: true,
            })
            .collect();
        Self { entries }
    }

    /// The entry for `key`. Later duplicates win.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&LegacyEntry> {
        self.entries.iter().rev().find(|entry| entry.key == key)
    }

    /// All entries in file order.
    #[must_use]
    pub fn entries(&self) -> &[LegacyEntry] {
        &self.entries
    }
}

/// 1-based line number of byte offset `offset` in `text`.
pub(crate) fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            LegacyFormat::from_path("browser/foo.properties"),
            Some(LegacyFormat::Properties)
        );
        assert_eq!(LegacyFormat::from_path("a.dtd"), Some(LegacyFormat::Dtd));
        assert_eq!(LegacyFormat::from_path("a.po"), Some(LegacyFormat::Po));
        assert_eq!(LegacyFormat::from_path("a.ftl"), None);
        assert_eq!(LegacyFormat::from_path("README"), None);
    }

    #[test]
    fn later_duplicates_win() {
        let resource = LegacyResource::from_pairs([("a", "1"), ("a", "2")]);
        assert_eq!(resource.get("a").map(|e| e.value.as_str()), Some("2"));
    }

    #[test]
    fn line_numbers() {
        let text = "a\nb\nc";
        assert_eq!(line_of(text, 0), 1);
        assert_eq!(line_of(text, 2), 2);
        assert_eq!(line_of(text, 4), 3);
    }
}
