//! Home page sections and their "view more" continuation

use crate::host::{HomeSection, PagedResult, SeriesTile};
use crate::requests::series::Series;
use crate::requests::{Error, Result};
use crate::source::KavitaSource;

use futures::future;

/// Tiles fetched for a section on the home page
pub const HOME_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeFeed {
    OnDeck,
    RecentlyUpdated,
}

impl HomeFeed {
    pub const ALL: [HomeFeed; 2] = [HomeFeed::OnDeck, HomeFeed::RecentlyUpdated];

    pub fn id(self) -> &'static str {
        match self {
            HomeFeed::OnDeck => "ondeck",
            HomeFeed::RecentlyUpdated => "recentlyupdated",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            HomeFeed::OnDeck => "On Deck",
            HomeFeed::RecentlyUpdated => "Recently Updated",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|feed| feed.id() == id)
    }
}

impl KavitaSource {
    /// Feeds enabled in the display options, in page order
    pub fn enabled_feeds(&self) -> Vec<HomeFeed> {
        let display = self.client().config().display_options();

        HomeFeed::ALL
            .into_iter()
            .filter(|feed| match feed {
                HomeFeed::OnDeck => display.show_on_deck,
                HomeFeed::RecentlyUpdated => display.show_recently_updated,
            })
            .collect()
    }

    async fn fetch_feed(&self, feed: HomeFeed, page: u32) -> Result<Vec<Series>> {
        match feed {
            HomeFeed::OnDeck => self.client().get_on_deck(page, HOME_PAGE_SIZE).await,
            HomeFeed::RecentlyUpdated => {
                self.client().get_recently_updated(page, HOME_PAGE_SIZE).await
            }
        }
    }

    /// Hands every enabled section to `on_section` twice: empty while loading, then with its
    /// tiles once its own request resolves. Sections load concurrently, so populated sections
    /// arrive in no particular order. Never fails.
    #[tracing::instrument(skip_all)]
    pub async fn get_home_page_sections<F>(&self, on_section: F)
    where
        F: Fn(HomeSection),
    {
        if !self.client().config().has_credentials() {
            tracing::warn!("no credentials configured, skipping home sections");
            on_section(HomeSection::unavailable());
            return;
        }

        let feeds = self.enabled_feeds();
        for feed in &feeds {
            on_section(HomeSection::loading(feed.id(), feed.title()));
        }

        let on_section = &on_section;
        future::join_all(feeds.into_iter().map(|feed| async move {
            let items = match self.fetch_feed(feed, 0).await {
                Ok(series) => series.into_iter().map(|s| self.tile(s)).collect(),
                Err(e) => {
                    tracing::warn!("failed to load {} section: {e}", feed.id());
                    vec![SeriesTile::unavailable()]
                }
            };

            on_section(HomeSection::loading(feed.id(), feed.title()).populated(items));
        }))
        .await;
    }

    /// Next page of a home section
    #[tracing::instrument(skip(self))]
    pub async fn get_view_more_items(
        &self,
        section_id: &str,
        page: Option<u32>,
    ) -> Result<PagedResult<SeriesTile>> {
        let feed = HomeFeed::from_id(section_id)
            .ok_or_else(|| Error::UnknownSectionError(section_id.to_owned()))?;
        let page = page.unwrap_or(0);

        let series = self.fetch_feed(feed, page).await?;

        Ok(PagedResult::page(
            series.into_iter().map(|s| self.tile(s)).collect(),
            page,
        ))
    }
}
