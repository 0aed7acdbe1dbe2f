//! Serde models for the ROR v2 organizations API and their reduction into
//! candidate records the matchers can score.

use log::warn;
use serde::Deserialize;

pub const ROR_DISPLAY_TYPE: &str = "ror_display";
pub const LABEL_TYPE: &str = "label";
pub const WEBSITE_LINK_TYPE: &str = "website";

/// Response of the organizations search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub number_of_results: u64,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// A search hit. Affiliation queries wrap the record in an `organization`
/// envelope with scoring metadata; plain queries return the record directly.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SearchItem {
    Wrapped { organization: Organization },
    Plain(Organization),
}

impl SearchItem {
    pub fn into_organization(self) -> Organization {
        match self {
            SearchItem::Wrapped { organization } => organization,
            SearchItem::Plain(organization) => organization,
        }
    }
}

/// A ROR organization record, reduced to the fields matching needs.
#[derive(Debug, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub names: Vec<OrgName>,
    #[serde(default)]
    pub links: Vec<OrgLink>,
}

#[derive(Debug, Deserialize)]
pub struct OrgName {
    pub value: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrgLink {
    pub value: String,
    #[serde(rename = "type", default)]
    pub link_type: Option<String>,
}

/// A registry candidate with its names split the way the scorer consumes
/// them: the canonical display name, every non-canonical name, and the
/// label-typed subset.
#[derive(Debug, Clone)]
pub struct CandidateRecord {
    pub ror_id: String,
    pub display_name: String,
    pub aliases: Vec<String>,
    pub labels: Vec<String>,
}

impl Organization {
    /// The registered website links of this record.
    pub fn website_links(&self) -> Vec<String> {
        self.links
            .iter()
            .filter(|link| link.link_type.as_deref() == Some(WEBSITE_LINK_TYPE))
            .map(|link| link.value.clone())
            .collect()
    }

    /// Reduce to a candidate record. Items missing an id or a canonical
    /// display name are malformed; they are warned about and skipped without
    /// failing the batch.
    pub fn into_candidate(self) -> Option<CandidateRecord> {
        let ror_id = match self.id {
            Some(id) => id,
            None => {
                warn!("Registry item without 'id', skipping");
                return None;
            }
        };

        let display_name = match self
            .names
            .iter()
            .find(|n| n.types.iter().any(|t| t == ROR_DISPLAY_TYPE))
        {
            Some(name) => name.value.clone(),
            None => {
                warn!("No display name found for ROR ID: {}", ror_id);
                return None;
            }
        };

        let aliases = self
            .names
            .iter()
            .filter(|n| !n.types.iter().any(|t| t == ROR_DISPLAY_TYPE))
            .map(|n| n.value.clone())
            .collect();
        let labels = self
            .names
            .iter()
            .filter(|n| n.types.iter().any(|t| t == LABEL_TYPE))
            .map(|n| n.value.clone())
            .collect();

        Some(CandidateRecord {
            ror_id,
            display_name,
            aliases,
            labels,
        })
    }
}
