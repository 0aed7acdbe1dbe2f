// src/matching/url.rs
// Fallback matching strategy: substring search against the registry's link index.

use log::info;

use crate::models::matching::{MatchCandidate, MatchInfo, MatchMap};
use crate::ror::RorClient;

/// Ratio assigned to a URL-substring hit: presence in the registry's own
/// link index is treated as certain evidence.
pub const URL_MATCH_RATIO: u8 = 100;

/// Run a URL-substring registry search for one URL variant. Every returned
/// candidate is accepted unconditionally, tagged `url` at ratio 100.
pub async fn match_url(client: &RorClient, fragment: &str) -> MatchMap {
    info!("Searching for URL {}...", fragment);

    client
        .search_by_url_substring(fragment)
        .await
        .into_iter()
        .map(|candidate| {
            (
                candidate.ror_id.clone(),
                MatchCandidate {
                    ror_id: candidate.ror_id,
                    ror_name: candidate.display_name,
                    info: MatchInfo::url_hit(),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::matching::MatchTag;

    #[test]
    fn test_url_hit_shape() {
        let info = MatchInfo::url_hit();
        assert_eq!(info.highest_ratio(), URL_MATCH_RATIO);
        assert!(info.has_tag(MatchTag::Url));
        assert!(!info.has_tag(MatchTag::Name));
    }
}
