//! Polling for series updated since a point in time

use crate::requests::series::Series;
use crate::requests::Result;
use crate::source::KavitaSource;

use chrono::{DateTime, Utc};

use std::collections::HashSet;

/// Series requested per page while polling
pub const UPDATES_PAGE_SIZE: u32 = 50;

/// Pages read before a poll gives up on reaching the threshold
pub const MAX_UPDATE_PAGES: u32 = 200;

/// Outcome of scanning one page of the recently updated feed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageScan {
    /// Ids of the page updated at or after the threshold and present in the candidate set
    pub updated: Vec<String>,
    /// An entry older than the threshold was reached, later pages are older still
    pub reached_threshold: bool,
}

/// Scans a page of the feed, which the server sorts newest first.
///
/// Entries without a modification time count as older than any threshold.
pub fn scan_page(entries: &[Series], since: DateTime<Utc>, ids: &HashSet<&str>) -> PageScan {
    let mut scan = PageScan::default();

    for entry in entries {
        match entry.last_modified {
            Some(modified) if modified >= since => {
                if ids.contains(entry.id.as_str()) {
                    scan.updated.push(entry.id.clone());
                }
            }
            _ => {
                scan.reached_threshold = true;
                break;
            }
        }
    }

    scan
}

impl KavitaSource {
    /// Reports which of `ids` changed at or after `since`.
    ///
    /// Pages through the recently updated feed until an entry older than `since` or an empty page
    /// shows up. Matches are handed to `on_updates` after each page, so the host can act on them
    /// before the scan completes.
    ///
    /// A page made only of series already seen ends the scan, as does [MAX_UPDATE_PAGES].
    #[tracing::instrument(skip(self, ids, on_updates), fields(candidates = ids.len()))]
    pub async fn filter_updated_manga<F>(
        &self,
        since: DateTime<Utc>,
        ids: &[String],
        mut on_updates: F,
    ) -> Result<()>
    where
        F: FnMut(Vec<String>),
    {
        let candidates: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut seen: HashSet<String> = HashSet::new();

        for page in 0..MAX_UPDATE_PAGES {
            let entries = self
                .client()
                .get_recently_updated(page, UPDATES_PAGE_SIZE)
                .await?;
            if entries.is_empty() {
                tracing::debug!("reached the end of the feed at page {page}");
                return Ok(());
            }

            let mut fresh = false;
            for entry in &entries {
                fresh |= seen.insert(entry.id.clone());
            }
            if !fresh {
                tracing::warn!("page {page} repeats earlier entries, stopping the poll");
                return Ok(());
            }

            let scan = scan_page(&entries, since, &candidates);
            if !scan.updated.is_empty() {
                tracing::info!("found {} updated series on page {page}", scan.updated.len());
                on_updates(scan.updated);
            }

            if scan.reached_threshold {
                return Ok(());
            }
        }

        tracing::warn!("stopped polling after {MAX_UPDATE_PAGES} pages");

        Ok(())
    }
}
