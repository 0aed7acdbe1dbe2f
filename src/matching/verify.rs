// src/matching/verify.rs
// Cross-validation of name-matched candidates against their registered links.

use log::debug;

use crate::models::matching::MatchMap;
use crate::ror::RorClient;

/// For every candidate already accepted by name matching, fetch its
/// registered website links and mark the `url` tag when any input variant and
/// any registered link contain one another. Upgrades only: ratios are left
/// alone and no candidate is added or removed.
pub async fn verify_with_registry_links(
    client: &RorClient,
    matches: &mut MatchMap,
    url_variants: &[String],
) {
    for candidate in matches.values_mut() {
        let ror_urls = client.fetch_links(&candidate.ror_id).await;
        if containment_hit(url_variants, &ror_urls) {
            debug!("URL confirmation for {}", candidate.ror_id);
            candidate.info.mark_url_match();
        }
    }
}

/// Substring containment in either direction, no scheme or slash
/// normalization. Short fragments can over-match.
pub fn containment_hit(input_urls: &[String], ror_urls: &[String]) -> bool {
    input_urls.iter().any(|url| {
        ror_urls
            .iter()
            .any(|ror_url| ror_url.contains(url.as_str()) || url.contains(ror_url.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_input_contained_in_registered_link() {
        assert!(containment_hit(
            &strings(&["example.edu"]),
            &strings(&["https://www.example.edu/about"]),
        ));
    }

    #[test]
    fn test_registered_link_contained_in_input() {
        assert!(containment_hit(
            &strings(&["https://www.example.edu/idp/shibboleth"]),
            &strings(&["www.example.edu"]),
        ));
    }

    #[test]
    fn test_no_overlap() {
        assert!(!containment_hit(
            &strings(&["example.edu"]),
            &strings(&["https://www.other.org"]),
        ));
    }

    #[test]
    fn test_empty_sides() {
        assert!(!containment_hit(&[], &strings(&["https://www.example.edu"])));
        assert!(!containment_hit(&strings(&["example.edu"]), &[]));
    }
}
