//! INSPIRE-HEP literature index implementation.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::models::{ExportFormat, IndexHit, RecentQuery};
use crate::sources::{LiteratureIndex, SourceError};
use crate::utils::HttpClient;

/// Default REST API base
pub const INSPIRE_API_BASE: &str = "https://inspirehep.net/api";

/// Default base for human-facing record pages
pub const INSPIRE_SITE_BASE: &str = "https://inspirehep.net";

/// INSPIRE-HEP literature index
///
/// Uses the `/literature` REST endpoint for both the recent-records query and
/// the per-record citation export.
#[derive(Debug, Clone)]
pub struct InspireSource {
    client: HttpClient,
    api_base: String,
    site_base: String,
}

impl InspireSource {
    /// Create a source against the public INSPIRE-HEP instance
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            api_base: INSPIRE_API_BASE.to_string(),
            site_base: INSPIRE_SITE_BASE.to_string(),
        }
    }

    /// Create a source against custom API and site bases
    pub fn with_base_urls(
        client: HttpClient,
        api_base: &str,
        site_base: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client,
            api_base: normalize_base(api_base)?,
            site_base: normalize_base(site_base)?,
        })
    }

    /// Build request URL
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_base, endpoint)
    }

    /// Convert one API hit into an index hit
    fn parse_hit(hit: InspireHit) -> IndexHit {
        let id = hit.id.into_string();
        let metadata = hit.metadata;

        let title = match metadata.titles.into_iter().next() {
            Some(t) => t.title,
            None => {
                tracing::warn!("INSPIRE record {} has no title", id);
                String::new()
            }
        };

        IndexHit {
            title,
            authors: metadata.authors.into_iter().map(|a| a.full_name).collect(),
            r#abstract: metadata.abstracts.into_iter().next().map(|a| a.value),
            external_id: metadata.arxiv_eprints.into_iter().next().map(|e| e.value),
            id,
        }
    }
}

/// Validate a configured base URL and strip its trailing slash
fn normalize_base(base: &str) -> Result<String, SourceError> {
    let url = Url::parse(base)
        .map_err(|e| SourceError::InvalidRequest(format!("Invalid base URL {}: {}", base, e)))?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[async_trait]
impl LiteratureIndex for InspireSource {
    fn id(&self) -> &str {
        "inspire"
    }

    fn name(&self) -> &str {
        "INSPIRE-HEP"
    }

    async fn search_recent(&self, query: &RecentQuery) -> Result<Vec<IndexHit>, SourceError> {
        let url = self.build_url("/literature");
        let size = query.max_results.to_string();
        tracing::debug!("Querying {} for {:?}", url, query.author);

        let response = self
            .client
            .client()
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(&[
                ("sort", "mostrecent"),
                ("size", size.as_str()),
                ("q", query.author.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to query INSPIRE: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let data: LiteratureResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        Ok(data.hits.hits.into_iter().map(Self::parse_hit).collect())
    }

    async fn fetch_export(&self, id: &str, format: ExportFormat) -> Result<String, SourceError> {
        let url = self.build_url(&format!("/literature/{}", id));

        let response = self
            .client
            .client()
            .get(&url)
            .header(ACCEPT, "text/plain")
            .query(&[("format", format.id())])
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch {} for {}: {}", format, id, e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to read {} body: {}", format, e)))?;

        if !format.is_well_formed(&text) {
            return Err(SourceError::Malformed(format!(
                "{} export for {} is not valid",
                format, id
            )));
        }

        Ok(text)
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/literature/{}", self.site_base, id)
    }
}

// ===== INSPIRE API Types =====

#[derive(Debug, Deserialize)]
struct LiteratureResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    #[serde(default)]
    hits: Vec<InspireHit>,
}

#[derive(Debug, Deserialize)]
struct InspireHit {
    id: RawId,
    metadata: InspireMetadata,
}

/// Record ids arrive as strings, older records sometimes as numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InspireMetadata {
    #[serde(default)]
    titles: Vec<InspireTitle>,
    #[serde(default)]
    authors: Vec<InspireAuthor>,
    #[serde(default)]
    abstracts: Vec<InspireValue>,
    #[serde(default)]
    arxiv_eprints: Vec<InspireValue>,
}

#[derive(Debug, Deserialize)]
struct InspireTitle {
    title: String,
}

#[derive(Debug, Deserialize)]
struct InspireAuthor {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct InspireValue {
    value: String,
}
