//! Structs and utilities for making requests to the Kavita server

pub mod chapter;
pub mod library;
pub mod query_utils;
pub mod series;

use crate::middleware::WithoutStoredAuthorization;
use crate::KavitaClient;
use chapter::{Chapter, PageDescriptor};
use library::{AuthToken, Library, NamedEntry};
use query_utils::{
    AuthenticateQuery, ChapterQuery, EmptyQuery, Listing, OnDeckQuery, PageQuery, Query,
    SeriesDetailQuery, SeriesQuery,
};
use series::Series;

use reqwest::header::AUTHORIZATION;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Custom error type that contains all errors that can be emitted by this crate's functions
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    #[error(transparent)]
    RequestWithMiddleWareError(#[from] reqwest_middleware::Error),
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    #[error(transparent)]
    QsError(#[from] serde_qs::Error),
    #[error(transparent)]
    UrlError(#[from] url::ParseError),
    #[error("401 server response")]
    UnauthorizedError,
    #[error("{0} server response")]
    StatusError(StatusCode),
    #[error("server did not return an authentication token")]
    MissingTokenError,
    #[error("unknown home section {0}")]
    UnknownSectionError(String),
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::ReqwestError(e) => e.is_timeout(),
            Error::RequestWithMiddleWareError(reqwest_middleware::Error::Reqwest(e)) => {
                e.is_timeout()
            }
            _ => false,
        }
    }
}

/// Type alias for the [`Result`](std::result::Result) that is used in the crate's functions
pub type Result<T> = std::result::Result<T, Error>;

/// Name the server shows for sessions opened through the API key exchange
pub const PLUGIN_NAME: &str = "kavita-source";

impl KavitaClient {
    /// Full url of `path` below the configured API base, with `query` attached
    pub fn url(&self, path: &str, query: &impl Query) -> Result<Url> {
        Self::url_with_base(&self.config().api_base(), path, query)
    }

    pub fn url_with_base(api_base: &str, path: &str, query: &impl Query) -> Result<Url> {
        let mut url = Url::parse(api_base)?.join(path)?;

        let query_data = serde_qs::to_string(query)?;
        if !query_data.is_empty() {
            url.set_query(Some(&query_data));
        }

        let repeated = query.repeated_params();
        if !repeated.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in repeated {
                pairs.append_pair(key, &value);
            }
        }

        Ok(url)
    }

    /// Lowest level function that executes a GET and checks the status of its response
    #[tracing::instrument(skip(self))]
    pub async fn query(&self, url: Url) -> Result<Response> {
        tracing::debug!("GET {url}");

        let resp = self.client.get(url).send().await?;

        Self::check_status(resp)
    }

    /// Fails with [`Error::UnauthorizedError`] or [`Error::StatusError`] for non-success responses
    fn check_status(resp: Response) -> Result<Response> {
        let status = resp.status();

        if status.is_success() {
            Ok(resp)
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("server rejected the credentials for {}", resp.url());
            Err(Error::UnauthorizedError)
        } else {
            tracing::warn!("got {status} from server for {}", resp.url());
            Err(Error::StatusError(status))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &impl Query) -> Result<T> {
        let resp: Value = self.query(self.url(path, query)?).await?.json().await?;

        Ok(serde_json::from_value(resp)?)
    }

    /// Deserializes the `content` array of a listing response
    pub fn parse_listing<T: DeserializeOwned>(resp: Value) -> Result<Vec<T>> {
        Ok(serde_json::from_value::<Listing<T>>(resp)?.content)
    }

    async fn get_listing<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &impl Query,
    ) -> Result<Vec<T>> {
        let resp: Value = self.query(self.url(path, query)?).await?.json().await?;

        Self::parse_listing(resp)
    }

    /// Searches for series with parameters, specified by `data`
    #[tracing::instrument(skip(self))]
    pub async fn search_series(&self, data: &SeriesQuery) -> Result<Vec<Series>> {
        self.get_listing("Series", data).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_libraries(&self) -> Result<Vec<Library>> {
        self.get_listing("libraries/", &EmptyQuery {}).await
    }

    pub async fn get_genres(&self) -> Result<Vec<NamedEntry>> {
        self.get_listing("Metadata/genres", &EmptyQuery {}).await
    }

    pub async fn get_tags(&self) -> Result<Vec<NamedEntry>> {
        self.get_listing("Metadata/tags", &EmptyQuery {}).await
    }

    pub async fn get_collections(&self) -> Result<Vec<NamedEntry>> {
        self.get_listing("Collection", &EmptyQuery {}).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_series(&self, id: &str) -> Result<Series> {
        self.get_json(&format!("series/{id}/"), &EmptyQuery {}).await
    }

    /// Chapters of the series with the given `id`, in the order the server lists them
    #[tracing::instrument(skip(self))]
    pub async fn get_series_chapters(&self, id: &str) -> Result<Vec<Chapter>> {
        let query = SeriesDetailQuery {
            series_id: id.to_owned(),
        };

        self.get_listing("Series/series-detail", &query).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_chapter_pages(&self, chapter_id: &str) -> Result<Vec<PageDescriptor>> {
        let query = ChapterQuery {
            chapter_id: chapter_id.to_owned(),
        };

        self.get_listing("Series/chapter", &query).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_on_deck(&self, page: u32, size: u32) -> Result<Vec<Series>> {
        let query = OnDeckQuery {
            library_id: 0,
            page,
            size,
        };

        self.get_listing("Series/on-deck/", &query).await
    }

    /// Series ordered by modification time, newest first
    #[tracing::instrument(skip(self))]
    pub async fn get_recently_updated(&self, page: u32, size: u32) -> Result<Vec<Series>> {
        self.get_listing("Series/recently-updated", &PageQuery { page, size }).await
    }

    /// Exchanges an API key for a session token against the server at `api_base`. The stored
    /// authorization is never sent along, `api_base` may be a different server.
    #[tracing::instrument(skip(self, api_key))]
    pub async fn authenticate(&self, api_base: &str, api_key: &str) -> Result<String> {
        let query = AuthenticateQuery {
            api_key: api_key.to_owned(),
            plugin_name: PLUGIN_NAME.to_owned(),
        };
        let url = Self::url_with_base(api_base, "Plugin/authenticate", &query)?;

        let resp = self
            .client
            .post(url)
            .with_extension(WithoutStoredAuthorization)
            .send()
            .await?;
        let token: AuthToken = Self::check_status(resp)?.json().await?;

        match token.token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(Error::MissingTokenError),
        }
    }

    /// Fetches the library list at `api_base` with the given `authorization` instead of the
    /// stored one
    #[tracing::instrument(skip(self, authorization))]
    pub async fn probe(&self, api_base: &str, authorization: &str) -> Result<()> {
        let url = Self::url_with_base(api_base, "libraries/", &EmptyQuery {})?;

        let resp = self
            .client
            .get(url)
            .with_extension(WithoutStoredAuthorization)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;
        Self::check_status(resp)?;

        Ok(())
    }

    pub fn cover_url(&self, series_id: &str) -> String {
        format!("{}Image/series-cover?seriesId={series_id}", self.config().api_base())
    }

    pub fn page_url(&self, chapter_id: &str, page: u32) -> String {
        format!(
            "{}Reader/image?chapterId={chapter_id}&page={page}",
            self.config().api_base()
        )
    }
}
