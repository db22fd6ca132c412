//! Host entry points for searching and browsing series

use crate::host::{
    ChapterDetails, ChapterRecord, ContentRating, MangaDetail, PagedResult, SearchRequest,
    SeriesTile, SourceInfo, SourceTag, Tag, TagGroup,
};
use crate::requests::library::NamedEntry;
use crate::requests::query_utils::{FilterNamespace, SeriesQuery};
use crate::requests::series::Series;
use crate::requests::Result;
use crate::KavitaClient;

use futures::future;

/// The source as the host sees it
#[derive(Debug, Clone)]
pub struct KavitaSource {
    client: KavitaClient,
}

/// Capitalizes the first character only, `"sci fi"` becomes `"Sci fi"`
pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl KavitaSource {
    pub fn new(client: KavitaClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &KavitaClient {
        &self.client
    }

    pub fn info() -> SourceInfo {
        SourceInfo {
            name: "Kavita".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            description: "Reads series from a self-hosted Kavita server".to_owned(),
            author: "kavita-source contributors".to_owned(),
            website_base_url: "https://www.kavitareader.com".to_owned(),
            content_rating: ContentRating::Everyone,
            tags: vec![SourceTag {
                text: "Self hosted".to_owned(),
                tag_type: "grey".to_owned(),
            }],
        }
    }

    pub(crate) fn tile(&self, series: Series) -> SeriesTile {
        SeriesTile {
            image: self.client.cover_url(&series.id),
            id: series.id,
            title: series.name,
            subtitle: None,
        }
    }

    /// Searches by title and namespaced tags. Never fails: when the server can't be reached a
    /// single placeholder tile is returned instead.
    #[tracing::instrument(skip(self))]
    pub async fn get_search_results(
        &self,
        request: &SearchRequest,
        page: Option<u32>,
    ) -> PagedResult<SeriesTile> {
        if !self.client.config().has_credentials() {
            tracing::warn!("no credentials configured, skipping search");
            return PagedResult::last(vec![SeriesTile::unavailable()]);
        }

        let page = page.unwrap_or(0);
        let query = SeriesQuery::builder()
            .page(page)
            .maybe_search(
                request
                    .title
                    .as_deref()
                    .map(str::trim)
                    .filter(|title| !title.is_empty()),
            )
            .filters(SeriesQuery::filters_from_tag_ids(&request.included_tags))
            .build();

        match self.client.search_series(&query).await {
            Ok(series) => PagedResult::page(
                series.into_iter().map(|s| self.tile(s)).collect(),
                page,
            ),
            Err(e) => {
                tracing::warn!("search failed: {e}");
                PagedResult::last(vec![SeriesTile::unavailable()])
            }
        }
    }

    /// Facets to filter the search with, libraries first. Never fails.
    #[tracing::instrument(skip(self))]
    pub async fn get_search_tags(&self) -> Vec<TagGroup> {
        if !self.client.config().has_credentials() {
            tracing::warn!("no credentials configured, skipping tags");
            return vec![TagGroup::unavailable()];
        }

        let (libraries, genres, tags, collections) = future::join4(
            self.client.get_libraries(),
            self.client.get_genres(),
            self.client.get_tags(),
            self.client.get_collections(),
        )
        .await;

        let libraries = match libraries {
            Ok(libraries) => libraries,
            Err(e) => {
                tracing::warn!("failed to fetch libraries: {e}");
                return vec![TagGroup::unavailable()];
            }
        };

        let mut groups = vec![TagGroup {
            id: "library".to_owned(),
            label: "Libraries".to_owned(),
            tags: libraries
                .into_iter()
                .map(|library| Tag {
                    id: FilterNamespace::Library.tag_id(&library.id),
                    label: capitalize_first(&library.name),
                })
                .collect(),
        }];

        let optional = [
            (FilterNamespace::Genre, "genre", "Genres", genres),
            (FilterNamespace::Tag, "tag", "Tags", tags),
            (FilterNamespace::Collection, "collection", "Collections", collections),
        ];
        for (namespace, id, label, entries) in optional {
            match entries {
                Ok(entries) => groups.push(Self::named_group(namespace, id, label, entries)),
                Err(e) => tracing::warn!("leaving out {id} facet: {e}"),
            }
        }

        groups
    }

    fn named_group(
        namespace: FilterNamespace,
        id: &str,
        label: &str,
        entries: Vec<NamedEntry>,
    ) -> TagGroup {
        TagGroup {
            id: id.to_owned(),
            label: label.to_owned(),
            tags: entries
                .into_iter()
                .map(|entry| Tag {
                    id: namespace.tag_id(&entry.id),
                    label: entry.title,
                })
                .collect(),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_manga_details(&self, id: &str) -> Result<MangaDetail> {
        let series = self.client.get_series(id).await?;

        let description = match series.summary() {
            Some(summary) => summary.to_owned(),
            None => self
                .client
                .get_series_chapters(id)
                .await?
                .iter()
                .find_map(|chapter| chapter.summary().map(str::to_owned))
                .unwrap_or_default(),
        };

        Ok(MangaDetail {
            id: series.id.clone(),
            titles: series.titles(),
            image: self.client.cover_url(&series.id),
            status: series.status().manga_status(),
            lang_code: series
                .metadata
                .language
                .clone()
                .filter(|language| !language.is_empty())
                .unwrap_or_else(|| "en".to_owned()),
            description,
            last_update: series.last_modified,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_chapters(&self, manga_id: &str) -> Result<Vec<ChapterRecord>> {
        let chapters = self.client.get_series_chapters(manga_id).await?;

        Ok(chapters
            .into_iter()
            .map(|chapter| ChapterRecord {
                name: chapter.display_name(),
                id: chapter.id,
                manga_id: manga_id.to_owned(),
                chap_num: chapter.number,
                time: chapter.last_modified,
                sort_index: chapter.sort_order,
                lang_code: "en".to_owned(),
            })
            .collect())
    }

    /// Page image urls of a chapter in server order. Pages with an unsupported media type are
    /// left out, so the count can be lower than the chapter's page count.
    #[tracing::instrument(skip(self))]
    pub async fn get_chapter_details(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterDetails> {
        let pages = self.client.get_chapter_pages(chapter_id).await?;

        let total = pages.len();
        let pages: Vec<String> = pages
            .into_iter()
            .filter(|page| page.is_supported())
            .map(|page| self.client.page_url(chapter_id, page.number))
            .collect();

        if pages.len() != total {
            tracing::debug!(
                "dropped {} pages with unsupported media types",
                total - pages.len()
            );
        }

        Ok(ChapterDetails {
            id: chapter_id.to_owned(),
            manga_id: manga_id.to_owned(),
            pages,
        })
    }
}
