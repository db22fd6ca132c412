use bon::Builder;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub trait Query: Serialize + std::fmt::Debug {
    /// Parameters that may repeat, appended after the serialized struct
    fn repeated_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Copy)]
pub struct EmptyQuery {}
impl Query for EmptyQuery {}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
}
impl Query for PageQuery {}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OnDeckQuery {
    pub library_id: u32,
    pub page: u32,
    pub size: u32,
}
impl Query for OnDeckQuery {}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDetailQuery {
    pub series_id: String,
}
impl Query for SeriesDetailQuery {}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChapterQuery {
    #[serde(rename = "chapterID")]
    pub chapter_id: String,
}
impl Query for ChapterQuery {}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateQuery {
    pub api_key: String,
    pub plugin_name: String,
}
impl Query for AuthenticateQuery {}

/// The four filter categories a search tag id can belong to, told apart by their id prefix
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, std::hash::Hash)]
pub enum FilterNamespace {
    Tag,
    Genre,
    Collection,
    Library,
}

impl FilterNamespace {
    pub const ALL: [FilterNamespace; 4] = [
        FilterNamespace::Tag,
        FilterNamespace::Genre,
        FilterNamespace::Collection,
        FilterNamespace::Library,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            FilterNamespace::Tag => "tag-",
            FilterNamespace::Genre => "genre-",
            FilterNamespace::Collection => "collection-",
            FilterNamespace::Library => "library-",
        }
    }

    /// Name of the query parameter the server filters on
    pub fn field(self) -> &'static str {
        match self {
            FilterNamespace::Tag => "tag",
            FilterNamespace::Genre => "genre",
            FilterNamespace::Collection => "collection_id",
            FilterNamespace::Library => "library_id",
        }
    }

    /// Splits a namespaced tag id, `None` for unknown prefixes or an empty value
    pub fn parse_tag_id(id: &str) -> Option<(Self, &str)> {
        Self::ALL.into_iter().find_map(|namespace| {
            id.strip_prefix(namespace.prefix())
                .filter(|value| !value.is_empty())
                .map(|value| (namespace, value))
        })
    }

    pub fn tag_id(self, value: &str) -> String {
        format!("{}{value}", self.prefix())
    }
}

/// Query of the series listing
#[derive(Serialize, Deserialize, Debug, Clone, Builder, PartialEq, Eq)]
pub struct SeriesQuery {
    #[builder(default)]
    pub page: u32,
    #[builder(default = SeriesQuery::PAGE_SIZE)]
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub search: Option<String>,
    #[serde(skip)]
    #[builder(default)]
    pub filters: Vec<(FilterNamespace, String)>,
}

impl SeriesQuery {
    pub const PAGE_SIZE: u32 = 20;

    /// Keeps the filters whose tag ids carry a known namespace prefix and drops the rest
    pub fn filters_from_tag_ids<'a>(
        ids: impl IntoIterator<Item = &'a String>,
    ) -> Vec<(FilterNamespace, String)> {
        ids.into_iter()
            .filter_map(|id| {
                let parsed = FilterNamespace::parse_tag_id(id);
                if parsed.is_none() {
                    tracing::debug!("ignoring tag {id} without a known namespace");
                }

                parsed.map(|(namespace, value)| (namespace, value.to_owned()))
            })
            .collect()
    }
}

impl Query for SeriesQuery {
    fn repeated_params(&self) -> Vec<(&'static str, String)> {
        self.filters
            .iter()
            .map(|(namespace, value)| (namespace.field(), value.clone()))
            .collect()
    }
}

/// Envelope of every listing the server returns
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Listing<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// Ids come as numbers from some endpoints and as strings from others
pub(crate) fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Text(s) => s,
        StringOrNumber::Integer(i) => i.to_string(),
        StringOrNumber::Float(f) => f.to_string(),
    })
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::Text(s)) => s.trim().parse().unwrap_or_default(),
        Some(StringOrNumber::Integer(i)) => i as f64,
        Some(StringOrNumber::Float(f)) => f,
        None => 0.0,
    })
}

/// Parses RFC 3339 as well as the zone-less timestamps the server writes, read as UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

pub(crate) fn timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .as_deref()
        .and_then(parse_timestamp))
}
