//! Settings form and the actions behind it

use crate::config::{
    api_base_for, basic_auth_header, bearer_auth_header, AuthScheme, ServerSettings,
};
use crate::requests::{Error, Result};
use crate::source::KavitaSource;

use serde::{Deserialize, Serialize};

use std::fmt;

pub const SERVER_ADDRESS_ROW: &str = "serverAddress";
pub const API_KEY_ROW: &str = "apiKey";
pub const USERNAME_ROW: &str = "username";
pub const PASSWORD_ROW: &str = "password";
pub const SHOW_ON_DECK_ROW: &str = "showOnDeck";
pub const SHOW_RECENTLY_UPDATED_ROW: &str = "showRecentlyUpdated";
pub const CONNECTION_ROW: &str = "connection";
pub const RESET_ROW: &str = "reset";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FormRow {
    Input {
        id: String,
        label: String,
        value: String,
        secure: bool,
    },
    Toggle {
        id: String,
        label: String,
        value: bool,
    },
    /// Read-only line
    Label {
        id: String,
        label: String,
        value: String,
    },
    Button {
        id: String,
        label: String,
    },
}

impl FormRow {
    pub fn id(&self) -> &str {
        match self {
            FormRow::Input { id, .. }
            | FormRow::Toggle { id, .. }
            | FormRow::Label { id, .. }
            | FormRow::Button { id, .. } => id,
        }
    }

    fn input(id: &str, label: &str, value: String, secure: bool) -> Self {
        FormRow::Input {
            id: id.to_owned(),
            label: label.to_owned(),
            value,
            secure,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FormSection {
    pub id: String,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub rows: Vec<FormRow>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    pub sections: Vec<FormSection>,
}

impl SettingsForm {
    pub fn row(&self, id: &str) -> Option<&FormRow> {
        self.sections
            .iter()
            .flat_map(|section| section.rows.iter())
            .find(|row| row.id() == id)
    }
}

/// Result of trying a server address with a set of credentials
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Unauthorized,
    Failed(String),
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Unauthorized => {
                write!(f, "Unauthorized (401): check your credentials")
            }
            ConnectionStatus::Failed(reason) => write!(f, "{reason}"),
        }
    }
}

impl From<Error> for ConnectionStatus {
    fn from(e: Error) -> Self {
        match e {
            Error::UnauthorizedError => ConnectionStatus::Unauthorized,
            Error::StatusError(status) => {
                ConnectionStatus::Failed(format!("Server responded with status {status}"))
            }
            e if e.is_timeout() => ConnectionStatus::Failed("Request timed out".to_owned()),
            e => ConnectionStatus::Failed(format!("Connection failed: {e}")),
        }
    }
}

impl KavitaSource {
    /// Form prefilled with the stored settings. `connection` is the last credential test result
    /// shown in the readout row.
    pub fn settings_form(&self, connection: Option<&ConnectionStatus>) -> SettingsForm {
        let config = self.client().config();
        let stored = config.settings();

        let mut server_rows = vec![FormRow::input(
            SERVER_ADDRESS_ROW,
            "Server URL",
            stored.server_address,
            false,
        )];
        match config.scheme() {
            AuthScheme::ApiKeyExchange => {
                server_rows.push(FormRow::input(API_KEY_ROW, "API Key", stored.api_key, true));
            }
            AuthScheme::Basic => {
                server_rows.push(FormRow::input(
                    USERNAME_ROW,
                    "Username",
                    stored.username,
                    false,
                ));
                server_rows.push(FormRow::input(
                    PASSWORD_ROW,
                    "Password",
                    stored.password,
                    true,
                ));
            }
        }

        let status = connection.map_or_else(|| "Not tested".to_owned(), ToString::to_string);

        SettingsForm {
            sections: vec![
                FormSection {
                    id: "server".to_owned(),
                    header: Some("Server".to_owned()),
                    footer: Some(
                        "Address of the Kavita server, without the /api path".to_owned(),
                    ),
                    rows: server_rows,
                },
                FormSection {
                    id: "display".to_owned(),
                    header: Some("Home page".to_owned()),
                    footer: None,
                    rows: vec![
                        FormRow::Toggle {
                            id: SHOW_ON_DECK_ROW.to_owned(),
                            label: "Show On Deck".to_owned(),
                            value: stored.show_on_deck,
                        },
                        FormRow::Toggle {
                            id: SHOW_RECENTLY_UPDATED_ROW.to_owned(),
                            label: "Show Recently Updated".to_owned(),
                            value: stored.show_recently_updated,
                        },
                    ],
                },
                FormSection {
                    id: "status".to_owned(),
                    header: None,
                    footer: None,
                    rows: vec![
                        FormRow::Label {
                            id: CONNECTION_ROW.to_owned(),
                            label: "Connection".to_owned(),
                            value: status,
                        },
                        FormRow::Button {
                            id: RESET_ROW.to_owned(),
                            label: "Reset settings".to_owned(),
                        },
                    ],
                },
            ],
        }
    }

    /// Authorization header for `settings` under the configured scheme, empty without credentials.
    ///
    /// The API key variant performs the token exchange against the submitted address.
    pub async fn derive_auth_header(&self, settings: &ServerSettings) -> Result<String> {
        match self.client().config().scheme() {
            AuthScheme::Basic if settings.username.is_empty() => Ok(String::new()),
            AuthScheme::Basic => Ok(basic_auth_header(&settings.username, &settings.password)),
            AuthScheme::ApiKeyExchange if settings.api_key.trim().is_empty() => Ok(String::new()),
            AuthScheme::ApiKeyExchange => {
                let api_base = api_base_for(&settings.server_address);
                let token = self
                    .client()
                    .authenticate(&api_base, settings.api_key.trim())
                    .await?;

                Ok(bearer_auth_header(&token))
            }
        }
    }

    /// Stores the submitted settings. The header is derived first, so a failed exchange leaves
    /// the previous settings untouched.
    #[tracing::instrument(skip_all, fields(address = %settings.server_address))]
    pub async fn submit_settings(&self, settings: &ServerSettings) -> Result<()> {
        let auth_header = self.derive_auth_header(settings).await?;

        self.client().config().store(settings, auth_header);

        Ok(())
    }

    /// Tries `settings` against the server without storing anything
    #[tracing::instrument(skip_all, fields(address = %settings.server_address))]
    pub async fn test_connection(&self, settings: &ServerSettings) -> ConnectionStatus {
        let auth_header = match self.derive_auth_header(settings).await {
            Ok(header) if header.is_empty() => {
                return ConnectionStatus::Failed("No credentials entered".to_owned())
            }
            Ok(header) => header,
            Err(e) => return e.into(),
        };

        let api_base = api_base_for(&settings.server_address);
        let status = match self.client().probe(&api_base, &auth_header).await {
            Ok(()) => ConnectionStatus::Connected,
            Err(e) => e.into(),
        };

        tracing::info!("connection test: {status}");

        status
    }

    pub fn reset_settings(&self) {
        self.client().config().reset();
    }
}
