//! Rate-limited ROR API client. Every call acquires a slot from the shared
//! limiter before touching the network; transport failures degrade to empty
//! result sets so one bad call never sinks a row.

use anyhow::{anyhow, Context, Result};
use log::{debug, error, warn};
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;

use crate::utils::rate_limit::SlidingWindowLimiter;

use super::response::{CandidateRecord, Organization, SearchResponse};

pub struct RorClient {
    http: Client,
    base_url: String,
    limiter: Arc<SlidingWindowLimiter>,
}

/// Quote a term for the search endpoint.
fn quoted(term: &str) -> String {
    format!("\"{}\"", term)
}

/// Advanced-query clause matching entries whose registered links contain the
/// fragment as a substring.
fn links_substring_clause(fragment: &str) -> String {
    format!("links.value:\"*{}*\"", fragment)
}

impl RorClient {
    pub fn new(base_url: impl Into<String>, limiter: Arc<SlidingWindowLimiter>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            limiter,
        }
    }

    /// Search with the name as an exact quoted query term and as a quoted
    /// affiliation term, unioning the result sets by ROR id.
    pub async fn search_by_query(&self, normalized_name: &str) -> Vec<CandidateRecord> {
        let term = quoted(normalized_name);
        let mut candidates: Vec<CandidateRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for param in ["query", "affiliation"] {
            let response = match self.get_search(&[(param, term.as_str())]).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Registry {} search failed: {:#}", param, e);
                    continue;
                }
            };
            if response.number_of_results == 0 {
                continue;
            }
            for item in response.items {
                if let Some(candidate) = item.into_organization().into_candidate() {
                    // First-seen record wins when both strategies return it
                    if seen.insert(candidate.ror_id.clone()) {
                        candidates.push(candidate);
                    }
                }
            }
        }

        debug!(
            "Query search for {:?} returned {} candidates",
            normalized_name,
            candidates.len()
        );
        candidates
    }

    /// Search for entries whose registered links contain `fragment`.
    pub async fn search_by_url_substring(&self, fragment: &str) -> Vec<CandidateRecord> {
        let clause = links_substring_clause(fragment);
        let response = match self.get_search(&[("query.advanced", clause.as_str())]).await {
            Ok(response) => response,
            Err(e) => {
                error!("Registry URL search failed: {:#}", e);
                return Vec::new();
            }
        };

        response
            .items
            .into_iter()
            .filter_map(|item| item.into_organization().into_candidate())
            .collect()
    }

    /// Fetch an entity's record and extract its website-typed links.
    pub async fn fetch_links(&self, ror_id: &str) -> Vec<String> {
        self.limiter.acquire().await;

        let url = format!("{}/{}", self.base_url, ror_id);
        let organization: Result<Organization> = async {
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .context("registry request failed")?;
            let status = response.status();
            if !status.is_success() {
                return Err(anyhow!("registry returned status {}", status));
            }
            response
                .json::<Organization>()
                .await
                .context("failed to parse registry record")
        }
        .await;

        match organization {
            Ok(organization) => {
                let links = organization.website_links();
                if links.is_empty() {
                    warn!("No website URL found for ROR ID: {}", ror_id);
                }
                links
            }
            Err(e) => {
                error!("Failed to fetch ROR URLs for {}: {:#}", ror_id, e);
                Vec::new()
            }
        }
    }

    async fn get_search(&self, params: &[(&str, &str)]) -> Result<SearchResponse> {
        self.limiter.acquire().await;

        let response = self
            .http
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .context("registry request failed")?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("registry returned status {}", status));
        }
        response
            .json::<SearchResponse>()
            .await
            .context("failed to parse registry search response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_term() {
        assert_eq!(quoted("exampleuniversity"), "\"exampleuniversity\"");
    }

    #[test]
    fn test_links_substring_clause_is_wildcard_bounded() {
        assert_eq!(
            links_substring_clause("example.edu"),
            "links.value:\"*example.edu*\""
        );
    }
}
