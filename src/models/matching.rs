//! Match accumulator types shared by every matching strategy.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Which comparison caused a candidate to be accepted. Variant order is the
/// lexicographic order of the labels, so a sorted tag set renders sorted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTag {
    Alias,
    Label,
    Name,
    Url,
}

impl MatchTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTag::Alias => "alias",
            MatchTag::Label => "label",
            MatchTag::Name => "name",
            MatchTag::Url => "url",
        }
    }
}

impl fmt::Display for MatchTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-candidate accumulator: the provenance tags collected so far and the
/// highest similarity ratio observed. Both only ever grow: tags are added,
/// never removed, and the ratio is monotonically non-decreasing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchInfo {
    tags: BTreeSet<MatchTag>,
    highest_ratio: u8,
}

impl MatchInfo {
    /// Accumulator for a URL-substring registry hit: presence in the
    /// registry's own link index counts as certain evidence.
    pub fn url_hit() -> Self {
        let mut info = Self::default();
        info.tags.insert(MatchTag::Url);
        info.highest_ratio = 100;
        info
    }

    /// Record a qualifying name-family comparison (name, alias or label).
    pub fn add_name_match(&mut self, tag: MatchTag, ratio: u8) {
        self.tags.insert(tag);
        self.highest_ratio = self.highest_ratio.max(ratio);
    }

    /// Record a URL confirmation without touching the ratio.
    pub fn mark_url_match(&mut self) {
        self.tags.insert(MatchTag::Url);
    }

    /// Fold another accumulator into this one: tag-set union, maximum ratio.
    pub fn merge(&mut self, other: &MatchInfo) {
        self.tags.extend(other.tags.iter().copied());
        self.highest_ratio = self.highest_ratio.max(other.highest_ratio);
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn has_tag(&self, tag: MatchTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn highest_ratio(&self) -> u8 {
        self.highest_ratio
    }

    /// Sorted `;`-joined provenance tags, e.g. `alias;url`.
    pub fn match_type(&self) -> String {
        self.tags
            .iter()
            .map(MatchTag::as_str)
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// A registry entry accepted by at least one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub ror_id: String,
    pub ror_name: String,
    pub info: MatchInfo,
}

/// Accumulated matches for one row, keyed by ROR id. Ordered so output rows
/// come out deterministically.
pub type MatchMap = BTreeMap<String, MatchCandidate>;
