//! Wikilink extraction and title resolution.
//!
//! A wikilink is a `[[Title]]` reference inside note content. Titles are
//! captured between `[[` and the next `]]` and may not contain `]`; there is
//! no nesting and no alias syntax.
//!
//! Resolution is an exact, case-sensitive title match against the current
//! set of notes. Unresolved titles are dropped and a note never links to
//! itself.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

static WIKILINK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("wikilink pattern is valid"));

/// Extract wikilink titles from content, in order of appearance.
///
/// Duplicates are kept; resolution collapses them.
///
/// # Examples
///
/// ```
/// use odyss_core::extract_wikilinks;
///
/// let titles = extract_wikilinks("See [[Plan]] and [[Ideas/2026]]");
/// assert_eq!(titles, vec!["Plan", "Ideas/2026"]);
/// ```
pub fn extract_wikilinks(content: &str) -> Vec<&str> {
    WIKILINK_PATTERN
        .captures_iter(content)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect()
}

/// Title → note id lookup built once per link recomputation.
///
/// When several notes share a title, the lowest id wins so resolution stays
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    by_title: HashMap<String, i64>,
}

impl TitleIndex {
    /// Build the index from `(id, title)` pairs.
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        let mut by_title: HashMap<String, i64> = HashMap::new();
        for (id, title) in titles {
            by_title
                .entry(title.into())
                .and_modify(|existing| *existing = (*existing).min(id))
                .or_insert(id);
        }
        Self { by_title }
    }

    /// Note id for an exact title.
    pub fn resolve(&self, title: &str) -> Option<i64> {
        self.by_title.get(title).copied()
    }

    pub fn len(&self) -> usize {
        self.by_title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_title.is_empty()
    }
}

/// Compute the full outbound link set of a note.
///
/// The result replaces the note's previous link set; it is not a diff.
pub fn resolve_links(note_id: i64, content: &str, index: &TitleIndex) -> BTreeSet<i64> {
    extract_wikilinks(content)
        .into_iter()
        .filter_map(|title| index.resolve(title))
        .filter(|&target| target != note_id)
        .collect()
}
