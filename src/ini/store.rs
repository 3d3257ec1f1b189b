//! INI-style configuration store
//!
//! Loads a configuration file into ordered sections, supports lookups and
//! edits in memory, and writes the canonical form back out on request.

use std::fmt;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, warn};

use crate::error::{Error, Result, StoreError};
use crate::text::TextReader;

use super::parser::{self, COMMENT_MARKERS, Line};
use super::{ConfigValue, Section};

/// Reserved name of the section holding keys that appear before any header
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Lifecycle state of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreState {
    /// Created empty, never loaded or saved
    #[default]
    Unloaded,
    /// Matches the file it was last loaded from or saved to
    Clean,
    /// Modified in memory since the last load or save
    Dirty,
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unloaded => write!(f, "unloaded"),
            Self::Clean => write!(f, "clean"),
            Self::Dirty => write!(f, "dirty"),
        }
    }
}

/// An ordered, in-memory view of an INI-style configuration file
///
/// The default section is always present at the front. It is only counted
/// and written when it holds keys.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    sections: Vec<Section>,
    strict: bool,
    path: Option<PathBuf>,
    state: StoreState,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Create an empty, lenient store
    pub fn new() -> Self {
        Self {
            sections: vec![Section::new(DEFAULT_SECTION)],
            strict: false,
            path: None,
            state: StoreState::Unloaded,
        }
    }

    /// Set the parse mode used by [`reload`](Self::reload)
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether malformed lines are rejected instead of skipped
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Load a file, skipping malformed lines
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path.as_ref(), false)
    }

    /// Load a file, failing on the first malformed line
    pub fn load_strict(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path.as_ref(), true)
    }

    /// Load a file with an explicit parse mode
    pub fn load_with(path: &Path, strict: bool) -> Result<Self> {
        let reader = TextReader::open(path)?.with_comment_markers(COMMENT_MARKERS);
        let sections = read_sections(reader, strict)?;

        let store = Self {
            sections,
            strict,
            path: Some(path.to_path_buf()),
            state: StoreState::Clean,
        };
        debug!(
            path = %path.display(),
            sections = store.section_count(),
            strict,
            "Loaded configuration"
        );
        Ok(store)
    }

    /// Parse configuration text held in memory
    pub fn parse(text: &str, strict: bool) -> Result<Self> {
        let reader =
            TextReader::from_reader(text.as_bytes()).with_comment_markers(COMMENT_MARKERS);
        let sections = read_sections(reader, strict)?;
        Ok(Self {
            sections,
            strict,
            path: None,
            state: StoreState::Clean,
        })
    }

    /// Re-read the remembered file
    ///
    /// The current contents are replaced only if the whole file parses.
    pub fn reload(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(StoreError::NoPath)?;
        let fresh = Self::load_with(&path, self.strict)?;
        self.sections = fresh.sections;
        self.state = StoreState::Clean;
        Ok(())
    }

    /// Save to the remembered path
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(StoreError::NoPath)?;
        self.save_to(&path)
    }

    /// Save to a specific path and remember it
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_string();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::file(parent, e))?;
        }
        std::fs::write(path, content).map_err(|e| Error::file(path, e))?;

        debug!(
            path = %path.display(),
            sections = self.section_count(),
            "Saved configuration"
        );
        self.path = Some(path.to_path_buf());
        self.state = StoreState::Clean;
        Ok(())
    }

    /// Path this store was loaded from or last saved to
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current lifecycle state
    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Whether there are unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.state == StoreState::Dirty
    }

    fn section_index(&self, name: &str) -> Option<usize> {
        if name == DEFAULT_SECTION {
            return Some(0);
        }
        self.sections.iter().position(|s| s.name() == name)
    }

    /// Get a section by name
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.section_index(name).map(|idx| &self.sections[idx])
    }

    /// The section holding keys that appear before any header
    pub fn default_section(&self) -> &Section {
        &self.sections[0]
    }

    /// Sections in file order; the default section is skipped when empty
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections
            .iter()
            .enumerate()
            .filter(|(idx, s)| *idx != 0 || !s.is_empty())
            .map(|(_, s)| s)
    }

    /// Section names in file order
    pub fn section_names(&self) -> Vec<&str> {
        self.sections().map(Section::name).collect()
    }

    /// Number of sections that would be written on save
    pub fn section_count(&self) -> usize {
        self.sections().count()
    }

    /// Whether the store holds no sections
    pub fn is_empty(&self) -> bool {
        self.section_count() == 0
    }

    /// Check if a section exists; the default section always does
    pub fn has_section(&self, section: &str) -> bool {
        self.section_index(section).is_some()
    }

    /// Check if a key exists in a section
    pub fn has_key(&self, section: &str, key: &str) -> bool {
        self.section(section).is_some_and(|s| s.contains_key(key))
    }

    /// Get a value, or `None` if the section or key is absent
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Get a value, falling back to `default` if absent
    pub fn get_or<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.get(section, key).unwrap_or(default)
    }

    /// Get a value that must be present
    pub fn require(&self, section: &str, key: &str) -> Result<&str> {
        let found = self
            .section(section)
            .ok_or_else(|| StoreError::SectionNotFound(section.to_string()))?;
        found.get(key).ok_or_else(|| {
            Error::Store(StoreError::KeyNotFound {
                section: section.to_string(),
                key: key.to_string(),
            })
        })
    }

    /// Get a value parsed as `T`, surfacing lookup and type errors
    pub fn get_parsed<T: ConfigValue>(&self, section: &str, key: &str) -> Result<T> {
        let raw = self.require(section, key)?;
        T::parse_value(raw).ok_or_else(|| {
            Error::Store(StoreError::Type {
                section: section.to_string(),
                key: key.to_string(),
                value: raw.to_string(),
                expected: T::EXPECTED,
            })
        })
    }

    fn parsed_or<T: ConfigValue>(&self, section: &str, key: &str, default: T) -> T {
        match self.get_parsed(section, key) {
            Ok(value) => value,
            Err(e) => {
                debug!(section, key, error = %e, "Using default value");
                default
            }
        }
    }

    /// Get an integer, or `default` if absent or unparsable
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.parsed_or(section, key, default)
    }

    /// Get a float, or `default` if absent or unparsable
    pub fn get_float(&self, section: &str, key: &str, default: f64) -> f64 {
        self.parsed_or(section, key, default)
    }

    /// Get a boolean, or `default` if absent or unparsable
    ///
    /// Accepts `true/false`, `yes/no`, `on/off` and `1/0`, ignoring case.
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.parsed_or(section, key, default)
    }

    fn section_entry(&mut self, name: &str) -> &mut Section {
        let idx = match self.section_index(name) {
            Some(idx) => idx,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx]
    }

    /// Set a value, creating the section if needed
    ///
    /// The value is stored in its trimmed string form. Names that would not
    /// read back as the same section or key are rejected and leave the store
    /// unchanged.
    pub fn set(&mut self, section: &str, key: &str, value: impl ToString) -> Result<()> {
        parser::validate_section_name(section)?;
        parser::validate_key(key)?;
        let value = value.to_string();
        parser::validate_value(key, &value)?;

        self.section_entry(section).insert(key, value.trim().to_string());
        self.state = StoreState::Dirty;
        Ok(())
    }

    /// Remove a section; removing the default section clears its keys
    ///
    /// Returns whether anything was removed.
    pub fn remove_section(&mut self, section: &str) -> bool {
        let removed = match self.section_index(section) {
            Some(0) => {
                let had_keys = !self.sections[0].is_empty();
                self.sections[0].clear();
                had_keys
            }
            Some(idx) => {
                self.sections.remove(idx);
                true
            }
            None => false,
        };
        if removed {
            self.state = StoreState::Dirty;
        }
        removed
    }

    /// Remove a key; returns whether it existed
    pub fn remove_key(&mut self, section: &str, key: &str) -> bool {
        let removed = self
            .section_index(section)
            .and_then(|idx| self.sections[idx].remove(key))
            .is_some();
        if removed {
            self.state = StoreState::Dirty;
        }
        removed
    }
}

/// Read every line into sections, merging repeated headers
fn read_sections<R: BufRead>(mut reader: TextReader<R>, strict: bool) -> Result<Vec<Section>> {
    let mut sections = vec![Section::new(DEFAULT_SECTION)];
    let mut current = 0;

    while let Some(line) = reader.read_line()? {
        match parser::classify(&line) {
            Line::Blank | Line::Comment => {}
            Line::Header(name) => {
                current = if name == DEFAULT_SECTION {
                    0
                } else {
                    match sections.iter().position(|s| s.name() == name) {
                        Some(idx) => idx,
                        None => {
                            sections.push(Section::new(name));
                            sections.len() - 1
                        }
                    }
                };
            }
            Line::Entry { key, value } => {
                sections[current].insert(key, value.to_string());
            }
            Line::Malformed if strict => {
                return Err(StoreError::Parse {
                    line: reader.line_number(),
                    content: line,
                }
                .into());
            }
            Line::Malformed => {
                warn!(line = reader.line_number(), content = %line, "Skipping malformed line");
            }
        }
    }

    Ok(sections)
}

impl fmt::Display for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if section.name() != DEFAULT_SECTION {
                writeln!(f, "[{}]", section.name())?;
            }
            for (key, value) in section.iter() {
                if value.is_empty() {
                    writeln!(f, "{} =", key)?;
                } else {
                    writeln!(f, "{} = {}", key, value)?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigStore {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, false)
    }
}

impl PartialEq for ConfigStore {
    fn eq(&self, other: &Self) -> bool {
        self.sections().eq(other.sections())
    }
}

impl Eq for ConfigStore {}

impl Serialize for ConfigStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.section_count()))?;
        for section in self.sections() {
            map.serialize_entry(section.name(), section)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const STATION: &str = "[Station]\ncallsign = AB3GY\npower = 100\n";

    fn create_test_store() -> ConfigStore {
        let mut store = ConfigStore::new();
        store.set("Station", "callsign", "AB3GY").unwrap();
        store.set("Station", "power", 100).unwrap();
        store.set("Rig", "model", "IC-7300").unwrap();
        store.set("Rig", "split", true).unwrap();
        store
    }

    #[test]
    fn test_new_store() {
        let store = ConfigStore::new();
        assert!(store.is_empty());
        assert_eq!(store.state(), StoreState::Unloaded);
        assert!(store.has_section(DEFAULT_SECTION));
        assert!(!store.is_strict());
        assert_eq!(store.path(), None);
    }

    #[test]
    fn test_station_example() {
        let store: ConfigStore = STATION.parse().unwrap();
        assert_eq!(store.get("Station", "callsign"), Some("AB3GY"));
        assert_eq!(store.get_int("Station", "power", 0), 100);
        assert_eq!(store.get_or("Station", "missing", "N/A"), "N/A");
    }

    #[test]
    fn test_missing_lookups_never_fail() {
        let store = create_test_store();
        assert_eq!(store.get_or("NoSuch", "key", "fallback"), "fallback");
        assert_eq!(store.get("NoSuch", "key"), None);
        assert_eq!(store.get_int("NoSuch", "key", 7), 7);
        assert!(store.get_bool("Rig", "missing", true));
    }

    #[test]
    fn test_typed_getter_fallback() {
        let mut store = ConfigStore::new();
        store.set("S", "K", "abc").unwrap();

        assert_eq!(store.get_int("S", "K", -1), -1);
        assert_eq!(store.get_float("S", "K", 1.5), 1.5);
        assert!(!store.get_bool("S", "K", false));
        assert_eq!(store.get("S", "K"), Some("abc"));
    }

    #[test]
    fn test_get_parsed_surfaces_errors() {
        let store = create_test_store();
        assert_eq!(store.get_parsed::<u16>("Station", "power").unwrap(), 100);
        assert!(store.get_parsed::<bool>("Rig", "split").unwrap());

        let err = store.get_parsed::<i64>("Rig", "model").unwrap_err();
        assert!(matches!(
            err,
            Error::Store(StoreError::Type { expected: "integer", .. })
        ));

        let err = store.get_parsed::<i64>("Nope", "model").unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::SectionNotFound(_))));

        let err = store.require("Rig", "nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_overwrite_semantics() {
        let mut store = ConfigStore::new();
        store.set("S", "K", "a").unwrap();
        store.set("S", "K", "b").unwrap();

        assert_eq!(store.section_count(), 1);
        let section = store.section("S").unwrap();
        assert_eq!(section.len(), 1);
        assert_eq!(section.get("K"), Some("b"));
    }

    #[test]
    fn test_set_rejects_ambiguous_names() {
        let mut store = create_test_store();
        let before = store.clone();

        for key in ["a=b", "[x]", "", "; c", "multi\nline"] {
            let err = store.set("Station", key, "v").unwrap_err();
            assert!(matches!(err, Error::Store(StoreError::InvalidName { .. })));
        }
        assert!(store.set("Bad]Name", "k", "v").is_err());
        assert!(store.set("Station", "k", "two\nlines").is_err());

        assert_eq!(store, before);
    }

    #[test]
    fn test_set_trims_values() {
        let mut store = ConfigStore::new();
        store.set("S", "k", "  spaced  ").unwrap();
        assert_eq!(store.get("S", "k"), Some("spaced"));
    }

    #[test]
    fn test_comment_and_blank_only() {
        let store: ConfigStore = "; one\n\n# two\n   \n".parse().unwrap();
        assert_eq!(store.section_count(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_default_section_keys() {
        let store: ConfigStore = "mode = CW\n[Station]\ncallsign = AB3GY\n".parse().unwrap();
        assert_eq!(store.get(DEFAULT_SECTION, "mode"), Some("CW"));
        assert_eq!(store.section_names(), vec![DEFAULT_SECTION, "Station"]);

        let store: ConfigStore = "[Station]\nx = 1\n[DEFAULT]\nmode = SSB\n".parse().unwrap();
        assert_eq!(store.default_section().get("mode"), Some("SSB"));
    }

    #[test]
    fn test_duplicate_headers_merge() {
        let store: ConfigStore = "[A]\nx = 1\n[B]\ny = 2\n[A]\nz = 3\nx = 4\n".parse().unwrap();
        assert_eq!(store.section_names(), vec!["A", "B"]);
        let a = store.section("A").unwrap();
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![("x", "4"), ("z", "3")]);
    }

    #[test]
    fn test_lenient_skips_malformed_lines() {
        let store: ConfigStore = "[S]\ngarbage\nk = v\n[]\n".parse().unwrap();
        assert_eq!(store.get("S", "k"), Some("v"));
        assert_eq!(store.section_count(), 1);
    }

    #[test]
    fn test_strict_reports_line_number() {
        let err = ConfigStore::parse("; c\n[S]\n\nk = v\ngarbage\n", true).unwrap_err();
        match err {
            Error::Store(StoreError::Parse { line, content }) => {
                assert_eq!(line, 5);
                assert_eq!(content, "garbage");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_remove() {
        let mut store: ConfigStore = "top = 1\n[A]\nx = 1\n[B]\ny = 2\n".parse().unwrap();
        assert_eq!(store.state(), StoreState::Clean);

        assert!(!store.remove_key("A", "nope"));
        assert!(!store.remove_section("Nope"));
        assert_eq!(store.state(), StoreState::Clean);

        assert!(store.remove_key("A", "x"));
        assert!(store.has_section("A"));
        assert!(!store.has_key("A", "x"));
        assert!(store.remove_section("B"));
        assert!(!store.has_section("B"));
        assert!(store.remove_section(DEFAULT_SECTION));
        assert!(store.has_section(DEFAULT_SECTION));
        assert!(store.is_dirty());

        assert_eq!(store.to_string(), "[A]\n");
    }

    #[test]
    fn test_render_canonical_form() {
        let mut store: ConfigStore =
            "  ; header\nmode=CW\n\n[Station]\n  callsign=AB3GY  \nnote =\n[Empty]\n"
                .parse()
                .unwrap();
        store.set("Station", "power", 5).unwrap();

        assert_eq!(
            store.to_string(),
            "mode = CW\n\n[Station]\ncallsign = AB3GY\nnote =\npower = 5\n\n[Empty]\n"
        );
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("station.ini");

        let mut store = create_test_store();
        store.save_to(&path).unwrap();
        assert_eq!(store.state(), StoreState::Clean);
        assert_eq!(store.path(), Some(path.as_path()));

        let loaded = ConfigStore::load_from(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.get("Rig", "split"), Some("true"));
    }

    #[test]
    fn test_save_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("station.ini");

        let mut store = create_test_store();
        store.save_to(&path).unwrap();
        let first = std::fs::read(&path).unwrap();
        store.save().unwrap();
        let second = std::fs::read(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_save_without_path() {
        let mut store = create_test_store();
        let err = store.save().unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::NoPath)));
        assert!(store.is_dirty());
    }

    #[test]
    fn test_failed_save_leaves_store_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not_a_dir");
        std::fs::write(&blocker, "plain file").unwrap();

        let mut store = create_test_store();
        let before = store.clone();

        let err = store.save_to(blocker.join("station.ini")).unwrap_err();
        assert!(matches!(err, Error::File { .. }));
        assert_eq!(store.state(), StoreState::Dirty);
        assert_eq!(store.path(), None);
        assert_eq!(store, before);

        let good = temp_dir.path().join("station.ini");
        store.save_to(&good).unwrap();
        store.set("Station", "power", 5).unwrap();
        assert!(store.save_to(blocker.join("other.ini")).is_err());
        assert_eq!(store.path(), Some(good.as_path()));
        assert!(store.is_dirty());
    }

    #[test]
    fn test_bracketed_keys_survive_round_trip() {
        let text = "[Memories]\nch[1] = 7.074\nch[2] = 14.074\nname = FT8\n";

        let store: ConfigStore = text.parse().unwrap();
        assert_eq!(store.get("Memories", "ch[1]"), Some("7.074"));
        assert_eq!(store.get("Memories", "ch[2]"), Some("14.074"));
        assert_eq!(store.to_string(), text);

        let strict = ConfigStore::parse(text, true).unwrap();
        assert_eq!(strict, store);

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("memories.ini");
        std::fs::write(&path, text).unwrap();
        let mut loaded = ConfigStore::load_from(&path).unwrap();
        loaded.save().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConfigStore::load_from(temp_dir.path().join("absent.ini")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_reload_keeps_contents_on_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("station.ini");
        std::fs::write(&path, STATION).unwrap();

        let mut store = ConfigStore::load_strict(&path).unwrap();
        store.set("Station", "power", 5).unwrap();

        std::fs::write(&path, "[Station]\ncallsign = W1AW\nbroken line\n").unwrap();
        assert!(store.reload().is_err());
        assert_eq!(store.get("Station", "power"), Some("5"));
        assert!(store.is_dirty());

        std::fs::write(&path, "[Station]\ncallsign = W1AW\n").unwrap();
        store.reload().unwrap();
        assert_eq!(store.get("Station", "callsign"), Some("W1AW"));
        assert_eq!(store.get("Station", "power"), None);
        assert_eq!(store.state(), StoreState::Clean);
    }

    #[test]
    fn test_serialize_json() {
        let store: ConfigStore = "top = 1\n[Station]\ncallsign = AB3GY\n".parse().unwrap();
        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(
            json,
            r#"{"DEFAULT":{"top":"1"},"Station":{"callsign":"AB3GY"}}"#
        );
    }
}
