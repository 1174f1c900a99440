//! Reference lists used to scope the analysis.
//!
//! The LOD Cloud publishes its dataset list as JSON and one SVG diagram per
//! topic. The first decides which KGs are analysed at all, the second splits
//! them by topic.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{QualityError, QualityResult};
use crate::parsing::topic_svg::{entity_id_from_link, extract_topic_links, topic_from_url};

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// GET a document as text.
fn http_get(url: &str) -> QualityResult<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()?;
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(QualityError::NetworkUnavailable(format!(
            "HTTP {status} from {url}"
        )));
    }
    Ok(response.text()?)
}

#[derive(Debug, Deserialize)]
struct DatasetEntry {
    identifier: Option<String>,
}

/// Identifiers of the datasets listed in the LOD Cloud.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceList {
    identifiers: HashSet<String>,
}

impl ReferenceList {
    pub fn new<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            identifiers: identifiers
                .into_iter()
                .map(|s| s.as_ref().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Parse the `key → {identifier, ...}` dataset document.
    pub fn from_json(content: &str) -> QualityResult<Self> {
        let entries: BTreeMap<String, DatasetEntry> = serde_json::from_str(content)?;
        let mut skipped = 0usize;
        let identifiers: Vec<String> = entries
            .into_values()
            .filter_map(|entry| {
                if entry.identifier.is_none() {
                    skipped += 1;
                }
                entry.identifier
            })
            .collect();
        if skipped > 0 {
            debug!("{} datasets without an identifier", skipped);
        }
        Ok(Self::new(identifiers))
    }

    pub fn from_file(path: &Path) -> QualityResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn fetch(url: &str) -> QualityResult<Self> {
        Self::from_json(&http_get(url)?)
    }

    /// Download the list, or read the bundled copy when the download fails.
    pub fn fetch_or_fallback(url: &str, fallback: &Path) -> QualityResult<Self> {
        match Self::fetch(url) {
            Ok(list) => {
                info!("Fetched {} dataset identifiers from {}", list.len(), url);
                Ok(list)
            }
            Err(e) => {
                warn!("{}; using {}", e, fallback.display());
                Self::from_file(fallback)
            }
        }
    }

    pub fn identifiers(&self) -> &HashSet<String> {
        &self.identifiers
    }

    pub fn contains(&self, id: &str) -> bool {
        self.identifiers.contains(id.trim())
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

/// Dataset ids per LOD Cloud topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicMap {
    topics: BTreeMap<String, Vec<String>>,
}

impl TopicMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, topic: &str, ids: Vec<String>) {
        self.topics.insert(topic.to_string(), ids);
    }

    /// Build the map from `(diagram url, svg document)` pairs.
    pub fn from_diagrams<'a, I>(diagrams: I) -> QualityResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut map = Self::new();
        for (url, svg) in diagrams {
            let ids = extract_topic_links(svg)?
                .iter()
                .map(|link| entity_id_from_link(link))
                .collect();
            map.insert(&topic_from_url(url), ids);
        }
        Ok(map)
    }

    /// Download and parse every topic diagram.
    pub fn fetch(urls: &[String]) -> QualityResult<Self> {
        let mut documents = Vec::with_capacity(urls.len());
        for url in urls {
            debug!("Downloading {}", url);
            documents.push((url.as_str(), http_get(url)?));
        }
        let map = Self::from_diagrams(documents.iter().map(|(u, svg)| (*u, svg.as_str())))?;
        info!("Collected {} topics from the LOD Cloud diagrams", map.len());
        Ok(map)
    }

    /// Download the diagrams and save the map, or reuse the saved map on failure.
    pub fn fetch_or_load(urls: &[String], path: &Path) -> QualityResult<Self> {
        match Self::fetch(urls) {
            Ok(map) => {
                map.save(path)?;
                Ok(map)
            }
            Err(e) => {
                warn!("{}; using {}", e, path.display());
                Self::load(path)
            }
        }
    }

    pub fn save(&self, path: &Path) -> QualityResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> QualityResult<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    /// Ids of one topic, trimmed.
    pub fn ids(&self, topic: &str) -> HashSet<String> {
        self.topics
            .get(topic)
            .map(|ids| ids.iter().map(|id| id.trim().to_string()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
