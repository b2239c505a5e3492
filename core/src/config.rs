//! SDK configuration supplied by the host application.
//!
//! # Design
//! The host builds one `Config` at startup and hands it to `Outtie`, which
//! keeps it by value and only ever reads it. Credentials are `Option` so an
//! unconfigured SDK is representable and reports `MissingSdkKey` /
//! `MissingClientId` instead of failing at construction time.

use serde::{Deserialize, Serialize};

/// Production endpoint of the link service.
pub const DEFAULT_BASE_URL: &str = "https://api.outtie.io";

/// Credentials and endpoint used for every link request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Required. From the Outtie dashboard, Account Settings, Keys section.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Required. From the Outtie dashboard, Account Settings, Keys section.
    #[serde(default)]
    pub sdk_key: Option<String>,

    /// Optional per-user identifier attached to created links for
    /// attribution.
    #[serde(default)]
    pub external_uid: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: None,
            sdk_key: None,
            external_uid: None,
            base_url: default_base_url(),
        }
    }
}

impl Config {
    pub fn new(client_id: impl Into<String>, sdk_key: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            sdk_key: Some(sdk_key.into()),
            ..Self::default()
        }
    }

    pub fn with_external_uid(mut self, uid: impl Into<String>) -> Self {
        self.external_uid = Some(uid.into());
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Read `OUTTIE_CLIENT_ID`, `OUTTIE_SDK_KEY`, `OUTTIE_EXTERNAL_UID` and
    /// `OUTTIE_BASE_URL`. Unset variables leave the default in place.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            client_id: lookup("OUTTIE_CLIENT_ID"),
            sdk_key: lookup("OUTTIE_SDK_KEY"),
            external_uid: lookup("OUTTIE_EXTERNAL_UID"),
            base_url: lookup("OUTTIE_BASE_URL").unwrap_or_else(default_base_url),
        }
    }

    /// Parse a JSON document such as `{"clientId": "...", "sdkKey": "..."}`.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn client_id(&self) -> Option<&str> {
        non_empty(&self.client_id)
    }

    pub fn sdk_key(&self) -> Option<&str> {
        non_empty(&self.sdk_key)
    }

    pub fn external_uid(&self) -> Option<&str> {
        non_empty(&self.external_uid)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

// Empty strings count as unset.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
