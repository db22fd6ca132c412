use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::query_utils::{id_string, lenient_f64, timestamp};

/// Media types a page may have to be handed to the reader
pub const SUPPORTED_MEDIA_TYPES: [&str; 5] = ["jpeg", "png", "gif", "webp", "pdf"];

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub number: f64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "timestamp")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sort_order: f64,
}

impl Chapter {
    pub fn display_name(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_owned(),
            _ => format!("Chapter {}", self.number),
        }
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .map(str::trim)
            .filter(|summary| !summary.is_empty())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptor {
    pub number: u32,
    #[serde(default)]
    pub media_type: String,
}

impl PageDescriptor {
    /// Accepts a full MIME type (`image/webp`) as well as its bare subtype (`webp`)
    pub fn is_supported(&self) -> bool {
        let media_type = self.media_type.trim();
        let subtype = media_type
            .rsplit_once('/')
            .map_or(media_type, |(_, subtype)| subtype);

        SUPPORTED_MEDIA_TYPES
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(subtype))
    }
}
