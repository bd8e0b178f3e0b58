//! `qpkg.cfg` parsing.
//!
//! The file is a shell fragment of `KEY=value` lines. Parsing is lenient:
//! comments, blank lines and anything that is not exactly one `=` away
//! from a pair are dropped without error.

use std::collections::BTreeMap;
use std::collections::btree_map;

/// Key under which the unparsed `qpkg.cfg` text is stored.
pub const RAW_KEY: &str = "";

pub const QPKG_NAME: &str = "QPKG_NAME";
pub const QPKG_VER: &str = "QPKG_VER";
pub const QPKG_DISPLAY_NAME: &str = "QPKG_DISPLAY_NAME";
pub const QPKG_AUTHOR: &str = "QPKG_AUTHOR";
pub const QPKG_LICENSE: &str = "QPKG_LICENSE";
pub const QPKG_SUMMARY: &str = "QPKG_SUMMARY";

/// Characters stripped from both ends of a value.
const VALUE_TRIM: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B', '"'];

/// Package configuration read from `qpkg.cfg`.
///
/// Always holds [`RAW_KEY`] bound to the full file text, next to zero or
/// more parsed pairs. Keys iterate in sorted order, so the raw entry comes
/// first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    entries: BTreeMap<String, String>,
}

impl Configuration {
    /// Parse `qpkg.cfg` text. Never fails.
    ///
    /// A repeated key keeps the value of its last occurrence.
    pub fn parse(raw: &str) -> Self {
        let initial = BTreeMap::from([(RAW_KEY.to_string(), raw.to_string())]);

        let entries = raw
            .split('\n')
            .filter(|line| !line.is_empty())
            .filter_map(parse_line)
            .fold(initial, |mut entries, (key, value)| {
                entries.insert(key.to_string(), value.to_string());
                entries
            });

        Self { entries }
    }

    /// The unparsed `qpkg.cfg` text.
    pub fn raw(&self) -> &str {
        self.entries.get(RAW_KEY).map(String::as_str).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries, the raw entry included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no key besides the raw entry was parsed.
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Parsed pairs only, without the raw entry.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|(key, _)| key.as_str() != RAW_KEY)
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.entries
    }

    pub fn name(&self) -> Option<&str> {
        self.get(QPKG_NAME)
    }

    pub fn version(&self) -> Option<&str> {
        self.get(QPKG_VER)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.get(QPKG_DISPLAY_NAME)
    }

    pub fn author(&self) -> Option<&str> {
        self.get(QPKG_AUTHOR)
    }
}

impl<'a> IntoIterator for &'a Configuration {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<Configuration> for BTreeMap<String, String> {
    fn from(config: Configuration) -> Self {
        config.entries
    }
}

/// Split one line into a key and a cleaned value.
///
/// `a=b=c` is dropped rather than split on the first `=`; values
/// containing `=` are not representable.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.starts_with('#') {
        return None;
    }

    let mut fields = line.split('=');
    let (key, value) = (fields.next()?, fields.next()?);
    if fields.next().is_some() {
        log::trace!("ignoring config line with several separators: {:?}", line);
        return None;
    }

    // an empty key would clobber the raw entry
    let key = key.trim_end();
    if key.is_empty() {
        return None;
    }

    Some((key, value.trim_matches(VALUE_TRIM)))
}
