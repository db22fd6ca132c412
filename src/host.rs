//! Records and capabilities shared with the reading application that loads this source.
//!
//! The host owns persistence and rendering; this module only describes the shapes that cross
//! the boundary in both directions.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use std::collections::HashMap;

/// Key-value persistence provided by the host (plain state store or keychain)
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, `None` removes the entry
    fn set(&self, key: &str, value: Option<String>);
}

/// [KeyValueStore] kept in process memory, used when the host has no store of its own and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: Option<String>) {
        let mut values = self.values.lock();
        match value {
            Some(value) => {
                values.insert(key.to_owned(), value);
            }
            None => {
                values.remove(key);
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentRating {
    Everyone,
    Mature,
    Adult,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SourceTag {
    pub text: String,
    pub tag_type: String,
}

/// Descriptor the host shows in its source list
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub website_base_url: String,
    pub content_rating: ContentRating,
    pub tags: Vec<SourceTag>,
}

/// Entry of a manga grid
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SeriesTile {
    pub id: String,
    pub title: String,
    pub image: String,
    pub subtitle: Option<String>,
}

impl SeriesTile {
    pub const UNAVAILABLE_ID: &'static str = "placeholder-id";

    /// Placeholder shown in place of results when the server can't be reached
    pub fn unavailable() -> Self {
        Self {
            id: Self::UNAVAILABLE_ID.to_owned(),
            title: "Server unavailable".to_owned(),
            image: String::new(),
            subtitle: Some("Check the server address and credentials".to_owned()),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.id == Self::UNAVAILABLE_ID
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MangaStatus {
    Ongoing,
    Completed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MangaDetail {
    pub id: String,
    pub titles: Vec<String>,
    pub image: String,
    pub status: MangaStatus,
    pub lang_code: String,
    pub description: String,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChapterRecord {
    pub id: String,
    pub manga_id: String,
    pub chap_num: f64,
    pub name: String,
    pub time: Option<DateTime<Utc>>,
    pub sort_index: f64,
    pub lang_code: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChapterDetails {
    pub id: String,
    pub manga_id: String,
    pub pages: Vec<String>,
}

/// One page of a listing together with the cursor of the next one
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub next: Option<u32>,
}

impl<T> PagedResult<T> {
    /// Result for page `page`, continuing to `page + 1` unless `items` is empty
    pub fn page(items: Vec<T>, page: u32) -> Self {
        let next = if items.is_empty() {
            None
        } else {
            Some(page + 1)
        };

        Self { items, next }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub label: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TagGroup {
    pub id: String,
    pub label: String,
    pub tags: Vec<Tag>,
}

impl TagGroup {
    pub fn unavailable() -> Self {
        Self {
            id: "unavailable".to_owned(),
            label: "Server unavailable".to_owned(),
            tags: Vec::new(),
        }
    }
}

/// Search input as the host hands it over
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub title: Option<String>,
    #[serde(default)]
    pub included_tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    Loading,
    Populated,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HomeSection {
    pub id: String,
    pub title: String,
    pub items: Vec<SeriesTile>,
    pub view_more: bool,
    pub state: SectionState,
}

impl HomeSection {
    pub fn loading(id: &str, title: &str) -> Self {
        Self {
            id: id.to_owned(),
            title: title.to_owned(),
            items: Vec::new(),
            view_more: true,
            state: SectionState::Loading,
        }
    }

    pub fn populated(mut self, items: Vec<SeriesTile>) -> Self {
        self.items = items;
        self.state = SectionState::Populated;
        self
    }

    pub fn unavailable() -> Self {
        Self {
            id: "placeholder".to_owned(),
            title: "Server unavailable".to_owned(),
            items: vec![SeriesTile::unavailable()],
            view_more: false,
            state: SectionState::Populated,
        }
    }
}
