// src/matching/aggregate.rs
// Merge of partial match maps accumulated across name and URL variants.

use std::collections::btree_map::Entry;

use crate::models::matching::MatchMap;

/// Fold a partial match map into the accumulator. On key collision the
/// provenance tags are unioned and the maximum ratio kept; the canonical name
/// stays with whichever source populated it first.
pub fn merge_matches(acc: &mut MatchMap, partial: MatchMap) {
    for (ror_id, candidate) in partial {
        match acc.entry(ror_id) {
            Entry::Occupied(mut existing) => {
                existing.get_mut().info.merge(&candidate.info);
            }
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matching::{MatchCandidate, MatchInfo, MatchTag};

    fn single(ror_id: &str, name: &str, tag: MatchTag, ratio: u8) -> MatchMap {
        let mut info = MatchInfo::default();
        info.add_name_match(tag, ratio);
        let mut map = MatchMap::new();
        map.insert(
            ror_id.to_string(),
            MatchCandidate {
                ror_id: ror_id.to_string(),
                ror_name: name.to_string(),
                info,
            },
        );
        map
    }

    #[test]
    fn test_collision_unions_tags_and_keeps_max_ratio() {
        let mut acc = single("https://ror.org/1", "Example University", MatchTag::Name, 92);
        merge_matches(
            &mut acc,
            single("https://ror.org/1", "Example University", MatchTag::Alias, 98),
        );

        let candidate = &acc["https://ror.org/1"];
        assert_eq!(candidate.info.match_type(), "alias;name");
        assert_eq!(candidate.info.highest_ratio(), 98);
    }

    #[test]
    fn test_first_seen_name_wins() {
        let mut acc = single("https://ror.org/1", "First Name", MatchTag::Name, 95);
        merge_matches(
            &mut acc,
            single("https://ror.org/1", "Second Name", MatchTag::Label, 95),
        );
        assert_eq!(acc["https://ror.org/1"].ror_name, "First Name");
    }

    #[test]
    fn test_disjoint_keys_are_kept() {
        let mut acc = single("https://ror.org/1", "One", MatchTag::Name, 95);
        merge_matches(&mut acc, single("https://ror.org/2", "Two", MatchTag::Name, 91));
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn test_merge_is_commutative() {
        let a = {
            let mut map = single("https://ror.org/1", "One", MatchTag::Name, 92);
            merge_matches(&mut map, single("https://ror.org/2", "Two", MatchTag::Alias, 97));
            map
        };
        let b = single("https://ror.org/1", "One", MatchTag::Url, 100);

        let mut ab = a.clone();
        merge_matches(&mut ab, b.clone());
        let mut ba = b.clone();
        merge_matches(&mut ba, a.clone());

        // Tag sets and ratios agree regardless of merge order
        for (id, candidate) in &ab {
            assert_eq!(candidate.info, ba[id].info);
        }
        assert_eq!(ab.len(), ba.len());
    }

    #[test]
    fn test_merge_is_associative() {
        let a = single("https://ror.org/1", "One", MatchTag::Name, 92);
        let b = single("https://ror.org/1", "One", MatchTag::Alias, 95);
        let c = single("https://ror.org/2", "Two", MatchTag::Label, 91);

        let mut left = a.clone();
        merge_matches(&mut left, b.clone());
        merge_matches(&mut left, c.clone());

        let mut bc = b.clone();
        merge_matches(&mut bc, c.clone());
        let mut right = a.clone();
        merge_matches(&mut right, bc);

        assert_eq!(left, right);
    }
}
