//! Server address, credentials and display options persisted through the host stores

use crate::host::KeyValueStore;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use std::sync::Arc;

pub const DEFAULT_SERVER_ADDRESS: &str = "http://localhost:5000";

// plaintext keys
const SERVER_ADDRESS_KEY: &str = "serverAddress";
const API_BASE_KEY: &str = "apiBase";
const SHOW_ON_DECK_KEY: &str = "showOnDeck";
const SHOW_RECENTLY_UPDATED_KEY: &str = "showRecentlyUpdated";

// secure keys
const API_KEY_KEY: &str = "apiKey";
const USERNAME_KEY: &str = "username";
const PASSWORD_KEY: &str = "password";
const AUTH_HEADER_KEY: &str = "authorization";

/// How credential material is turned into an `Authorization` header
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    /// API key exchanged for a bearer token through `Plugin/authenticate`
    #[default]
    ApiKeyExchange,
    /// HTTP Basic over `username:password`
    Basic,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    pub show_on_deck: bool,
    pub show_recently_updated: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_on_deck: true,
            show_recently_updated: true,
        }
    }
}

/// Values submitted from the settings form. Missing toggles take the [DisplayOptions] defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    pub server_address: String,
    pub api_key: String,
    pub username: String,
    pub password: String,
    pub show_on_deck: bool,
    pub show_recently_updated: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        let display = DisplayOptions::default();

        Self {
            server_address: String::new(),
            api_key: String::new(),
            username: String::new(),
            password: String::new(),
            show_on_deck: display.show_on_deck,
            show_recently_updated: display.show_recently_updated,
        }
    }
}

/// Trimmed `address`, [DEFAULT_SERVER_ADDRESS] when nothing is left
pub fn normalize_address(address: &str) -> &str {
    match address.trim() {
        "" => DEFAULT_SERVER_ADDRESS,
        address => address,
    }
}

/// API root for `address`: `api/` is appended, with a separating slash unless one is already there
pub fn api_base_for(address: &str) -> String {
    let address = normalize_address(address);

    if address.ends_with('/') {
        format!("{address}api/")
    } else {
        format!("{address}/api/")
    }
}

pub fn basic_auth_header(username: &str, password: &str) -> String {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));

    format!("Basic {encoded}")
}

pub fn bearer_auth_header(token: &str) -> String {
    format!("Bearer {token}")
}

pub struct ConfigStore {
    state: Arc<dyn KeyValueStore>,
    secure: Arc<dyn KeyValueStore>,
    scheme: AuthScheme,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("scheme", &self.scheme)
            .field("api_base", &self.api_base())
            .finish_non_exhaustive()
    }
}

impl ConfigStore {
    pub fn new(
        state: Arc<dyn KeyValueStore>,
        secure: Arc<dyn KeyValueStore>,
        scheme: AuthScheme,
    ) -> Self {
        Self {
            state,
            secure,
            scheme,
        }
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    pub fn server_address(&self) -> String {
        self.state
            .get(SERVER_ADDRESS_KEY)
            .filter(|address| !address.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_owned())
    }

    pub fn api_base(&self) -> String {
        self.state
            .get(API_BASE_KEY)
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| api_base_for(&self.server_address()))
    }

    pub fn auth_header(&self) -> String {
        self.secure.get(AUTH_HEADER_KEY).unwrap_or_default()
    }

    pub fn has_credentials(&self) -> bool {
        !self.auth_header().is_empty()
    }

    pub fn display_options(&self) -> DisplayOptions {
        let defaults = DisplayOptions::default();

        DisplayOptions {
            show_on_deck: self.flag(SHOW_ON_DECK_KEY, defaults.show_on_deck),
            show_recently_updated: self
                .flag(SHOW_RECENTLY_UPDATED_KEY, defaults.show_recently_updated),
        }
    }

    /// Settings currently stored, in the shape the form submits them
    pub fn settings(&self) -> ServerSettings {
        let display = self.display_options();

        ServerSettings {
            server_address: self.server_address(),
            api_key: self.secure.get(API_KEY_KEY).unwrap_or_default(),
            username: self.secure.get(USERNAME_KEY).unwrap_or_default(),
            password: self.secure.get(PASSWORD_KEY).unwrap_or_default(),
            show_on_deck: display.show_on_deck,
            show_recently_updated: display.show_recently_updated,
        }
    }

    /// Overwrites every stored value; `auth_header` must already be derived from `settings`.
    ///
    /// An empty address is stored as [DEFAULT_SERVER_ADDRESS].
    #[tracing::instrument(skip_all, fields(address = %settings.server_address))]
    pub fn store(&self, settings: &ServerSettings, auth_header: String) {
        let address = normalize_address(&settings.server_address);

        self.state.set(API_BASE_KEY, Some(api_base_for(address)));
        self.state.set(SERVER_ADDRESS_KEY, Some(address.to_owned()));
        self.state.set(SHOW_ON_DECK_KEY, Some(settings.show_on_deck.to_string()));
        self.state.set(
            SHOW_RECENTLY_UPDATED_KEY,
            Some(settings.show_recently_updated.to_string()),
        );

        self.secure.set(API_KEY_KEY, Some(settings.api_key.clone()));
        self.secure.set(USERNAME_KEY, Some(settings.username.clone()));
        self.secure.set(PASSWORD_KEY, Some(settings.password.clone()));
        self.secure.set(AUTH_HEADER_KEY, Some(auth_header));

        tracing::info!("stored server settings");
    }

    pub fn reset(&self) {
        for key in [
            SERVER_ADDRESS_KEY,
            API_BASE_KEY,
            SHOW_ON_DECK_KEY,
            SHOW_RECENTLY_UPDATED_KEY,
        ] {
            self.state.set(key, None);
        }

        for key in [API_KEY_KEY, USERNAME_KEY, PASSWORD_KEY, AUTH_HEADER_KEY] {
            self.secure.set(key, None);
        }

        tracing::info!("cleared server settings");
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        match self.state.get(key) {
            Some(value) => value.parse().unwrap_or(default),
            None => default,
        }
    }
}
