use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::query_utils::{id_string, timestamp};
use crate::host::MangaStatus;

/// Publication status as the server reports it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeriesStatus {
    Ended,
    Ongoing,
    Abandoned,
    Hiatus,
    #[serde(other)]
    Unknown,
}

impl SeriesStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "ENDED" => SeriesStatus::Ended,
            "ONGOING" => SeriesStatus::Ongoing,
            "ABANDONED" => SeriesStatus::Abandoned,
            "HIATUS" => SeriesStatus::Hiatus,
            _ => SeriesStatus::Unknown,
        }
    }

    pub fn manga_status(&self) -> MangaStatus {
        match self {
            SeriesStatus::Ended => MangaStatus::Completed,
            SeriesStatus::Ongoing
            | SeriesStatus::Abandoned
            | SeriesStatus::Hiatus
            | SeriesStatus::Unknown => MangaStatus::Ongoing,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesMetadata {
    pub title: Option<String>,
    pub alternate_titles: Vec<String>,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub language: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "timestamp")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: SeriesMetadata,
}

impl Series {
    pub fn status(&self) -> SeriesStatus {
        self.metadata
            .status
            .as_deref()
            .map(SeriesStatus::parse)
            .unwrap_or(SeriesStatus::Unknown)
    }

    /// Display name first, then the metadata titles, without repeats
    pub fn titles(&self) -> Vec<String> {
        let mut titles = vec![self.name.clone()];

        let extra = self
            .metadata
            .title
            .iter()
            .chain(self.metadata.alternate_titles.iter());
        for title in extra {
            let title = title.trim();
            if !title.is_empty() && !titles.iter().any(|t| t == title) {
                titles.push(title.to_owned());
            }
        }

        titles
    }

    pub fn summary(&self) -> Option<&str> {
        self.metadata
            .summary
            .as_deref()
            .map(str::trim)
            .filter(|summary| !summary.is_empty())
    }
}
