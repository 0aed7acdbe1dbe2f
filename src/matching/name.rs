// src/matching/name.rs
// Primary matching strategy: textual similarity against registry names.

use log::{debug, info};

use crate::models::matching::{MatchCandidate, MatchInfo, MatchMap, MatchTag};
use crate::ror::response::CandidateRecord;
use crate::ror::RorClient;

use super::normalize::{normalize, similarity_ratio};

/// Run the query-based registry search for one name variant and score every
/// returned candidate. Candidates with no qualifying comparison are dropped.
pub async fn match_names(client: &RorClient, name: &str, threshold: u8) -> MatchMap {
    let normalized = normalize(name);
    if normalized.is_empty() {
        debug!("Name variant {:?} normalizes to nothing, skipping", name);
        return MatchMap::new();
    }

    info!("Searching for {}...", name);

    let mut matches = MatchMap::new();
    for candidate in client.search_by_query(&normalized).await {
        if let Some(info) = score_candidate(&normalized, &candidate, threshold) {
            matches.insert(
                candidate.ror_id.clone(),
                MatchCandidate {
                    ror_id: candidate.ror_id,
                    ror_name: candidate.display_name,
                    info,
                },
            );
        }
    }
    matches
}

/// Compare the normalized input against the candidate's display name, every
/// alias and every label. Each comparison at or above the threshold adds its
/// provenance tag; the accumulator keeps the highest ratio seen.
pub fn score_candidate(
    normalized_input: &str,
    candidate: &CandidateRecord,
    threshold: u8,
) -> Option<MatchInfo> {
    let mut info = MatchInfo::default();

    let name_ratio = similarity_ratio(normalized_input, &normalize(&candidate.display_name));
    if name_ratio >= threshold {
        info.add_name_match(MatchTag::Name, name_ratio);
    }

    for alias in &candidate.aliases {
        let alias_ratio = similarity_ratio(normalized_input, &normalize(alias));
        if alias_ratio >= threshold {
            info.add_name_match(MatchTag::Alias, alias_ratio);
        }
    }

    for label in &candidate.labels {
        let label_ratio = similarity_ratio(normalized_input, &normalize(label));
        if label_ratio >= threshold {
            info.add_name_match(MatchTag::Label, label_ratio);
        }
    }

    if info.is_empty() {
        None
    } else {
        Some(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(display: &str, aliases: &[&str], labels: &[&str]) -> CandidateRecord {
        CandidateRecord {
            ror_id: "https://ror.org/013cjyk83".to_string(),
            display_name: display.to_string(),
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_exact_name_scores_100() {
        let normalized = normalize("Example University (EU)");
        let info = score_candidate(&normalized, &candidate("Example University", &[], &[]), 90)
            .expect("exact name should match");
        assert_eq!(info.highest_ratio(), 100);
        assert_eq!(info.match_type(), "name");
    }

    #[test]
    fn test_alias_and_label_tags_accumulate() {
        let normalized = normalize("Example University");
        let info = score_candidate(
            &normalized,
            &candidate(
                "The Example University of the North",
                &["Example University"],
                &["Examplee University"],
            ),
            90,
        )
        .expect("alias should match");
        assert!(info.has_tag(MatchTag::Alias));
        assert!(info.has_tag(MatchTag::Label));
        assert!(!info.has_tag(MatchTag::Name));
        assert_eq!(info.highest_ratio(), 100);
    }

    #[test]
    fn test_below_threshold_candidate_dropped() {
        let normalized = normalize("Example University");
        let scored = score_candidate(
            &normalized,
            &candidate("Oceanic Research Institute", &["ORI"], &[]),
            90,
        );
        assert!(scored.is_none());
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        // "exampleuniversity" vs "exampleuniversity1": 17/18 edits kept,
        // ratio rounds to 94: passes threshold 94, fails 95.
        let normalized = normalize("Example University");
        let near = candidate("Example University1", &[], &[]);
        assert!(score_candidate(&normalized, &near, 94).is_some());
        assert!(score_candidate(&normalized, &near, 95).is_none());
    }
}
