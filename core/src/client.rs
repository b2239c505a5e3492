//! Stateless request builder and response parser for the create-link API.
//!
//! # Design
//! `LinkClient` holds only a `Config` and carries no mutable state between
//! calls. Link creation is split into `build_create_link`, which produces an
//! `HttpRequest`, and `parse_create_link`, which consumes an `HttpResponse`.
//! The round-trip in between belongs to the caller.

use std::collections::HashMap;

use url::Url;

use crate::config::Config;
use crate::error::OuttieError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Path segment appended to the configured base.
pub const LINK_ENDPOINT: &str = "create_link";

/// Key of the created link in the service's response body.
pub const OUTTIE_LINK_KEY: &str = "outtie_link";

pub const SDK_KEY_HEADER: &str = "SDK-Key";
pub const CLIENT_ID_HEADER: &str = "Client-ID";

/// Synchronous, stateless client for the create-link endpoint.
#[derive(Debug, Clone)]
pub struct LinkClient {
    config: Config,
}

impl LinkClient {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the create-link URL for `url_string`.
    ///
    /// Query parameters are always emitted in the order `sdkKey`, `clientId`,
    /// `redirect`, `externalUID`, with values form-encoded, so identical input
    /// yields a byte-identical URL. Failures are logged before returning.
    pub fn resolve_url(&self, url_string: &str) -> Result<Url, OuttieError> {
        let result = self.try_resolve_url(url_string);
        match &result {
            Ok(url) => tracing::debug!(%url, "resolved create-link url"),
            Err(e) => tracing::error!(error = ?e, "{e}"),
        }
        result
    }

    fn try_resolve_url(&self, url_string: &str) -> Result<Url, OuttieError> {
        let (sdk_key, client_id) = self.credentials()?;

        let mut url = Url::parse(self.config.base_url()).map_err(|_| OuttieError::InvalidUrl)?;
        if url.query().is_some() || url.fragment().is_some() {
            return Err(OuttieError::InvalidUrl);
        }
        url.path_segments_mut()
            .map_err(|_| OuttieError::InvalidUrl)?
            .pop_if_empty()
            .push(LINK_ENDPOINT);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("sdkKey", sdk_key)
                .append_pair("clientId", client_id)
                .append_pair("redirect", url_string);
            if let Some(uid) = self.config.external_uid() {
                query.append_pair("externalUID", uid);
            }
        }
        Ok(url)
    }

    fn credentials(&self) -> Result<(&str, &str), OuttieError> {
        let sdk_key = self.config.sdk_key().ok_or(OuttieError::MissingSdkKey)?;
        let client_id = self.config.client_id().ok_or(OuttieError::MissingClientId)?;
        Ok((sdk_key, client_id))
    }

    /// Build the POST request that asks the service to wrap `url_string`.
    /// No body; credentials travel both in the query and in headers.
    pub fn build_create_link(&self, url_string: &str) -> Result<HttpRequest, OuttieError> {
        let url = self.resolve_url(url_string)?;
        let (sdk_key, client_id) = self.credentials()?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![
                (SDK_KEY_HEADER.to_string(), sdk_key.to_string()),
                (CLIENT_ID_HEADER.to_string(), client_id.to_string()),
            ],
            body: None,
        })
    }

    /// Extract the created link from the service's response. The body
    /// decides; the status only matters when the body is unusable.
    ///
    /// - body not a flat string-to-string JSON object: `Unexpected { code }`
    ///   for a non-2xx status, otherwise `CouldNotCreateLink`
    /// - `outtie_link` missing or not an absolute URL: `ParsingError`
    pub fn parse_create_link(&self, response: &HttpResponse) -> Result<Url, OuttieError> {
        let body: HashMap<String, String> =
            serde_json::from_str(&response.body).map_err(|_| {
                if response.is_success() {
                    OuttieError::CouldNotCreateLink
                } else {
                    OuttieError::Unexpected {
                        code: response.status,
                    }
                }
            })?;
        let link = body.get(OUTTIE_LINK_KEY).ok_or(OuttieError::ParsingError)?;
        Url::parse(link).map_err(|_| OuttieError::ParsingError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LinkClient {
        LinkClient::new(Config::new("client-1", "key-1"))
    }

    fn query(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn resolve_url_carries_credentials_and_redirect() {
        let url = client().resolve_url("https://shop.example/item?id=4&ref=a b").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("api.outtie.io"));
        assert_eq!(url.path(), "/create_link");
        assert_eq!(
            query(&url),
            vec![
                ("sdkKey".to_string(), "key-1".to_string()),
                ("clientId".to_string(), "client-1".to_string()),
                ("redirect".to_string(), "https://shop.example/item?id=4&ref=a b".to_string()),
            ]
        );
    }

    #[test]
    fn resolve_url_encodes_reserved_characters() {
        let url = client().resolve_url("https://a.example/?x=1&y=2").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.outtie.io/create_link?sdkKey=key-1&clientId=client-1\
             &redirect=https%3A%2F%2Fa.example%2F%3Fx%3D1%26y%3D2"
        );
    }

    #[test]
    fn resolve_url_appends_external_uid_last() {
        let client = LinkClient::new(Config::new("c", "k").with_external_uid("user 9"));
        let url = client.resolve_url("https://a.example").unwrap();
        let pairs = query(&url);
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[3], ("externalUID".to_string(), "user 9".to_string()));
    }

    #[test]
    fn resolve_url_is_deterministic() {
        let a = client().resolve_url("https://a.example/p").unwrap();
        let b = client().resolve_url("https://a.example/p").unwrap();
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn resolve_url_checks_sdk_key_before_client_id() {
        let client = LinkClient::new(Config::default());
        assert_eq!(client.resolve_url("https://a.example"), Err(OuttieError::MissingSdkKey));

        let mut config = Config::default();
        config.sdk_key = Some("k".to_string());
        let client = LinkClient::new(config);
        assert_eq!(client.resolve_url("https://a.example"), Err(OuttieError::MissingClientId));
    }

    #[test]
    fn resolve_url_rejects_unusable_base() {
        let client = LinkClient::new(Config::new("c", "k").with_base_url("not a url"));
        assert_eq!(client.resolve_url("https://a.example"), Err(OuttieError::InvalidUrl));

        let client = LinkClient::new(Config::new("c", "k").with_base_url("mailto:someone"));
        assert_eq!(client.resolve_url("https://a.example"), Err(OuttieError::InvalidUrl));
    }

    #[test]
    fn resolve_url_uses_custom_base() {
        let client = LinkClient::new(Config::new("c", "k").with_base_url("http://127.0.0.1:3000/"));
        let url = client.resolve_url("https://a.example").unwrap();
        assert!(url.as_str().starts_with("http://127.0.0.1:3000/create_link?"));
    }

    #[test]
    fn build_create_link_produces_post_with_headers() {
        let req = client().build_create_link("https://a.example").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert!(req.url.starts_with("https://api.outtie.io/create_link?sdkKey=key-1"));
        assert_eq!(
            req.headers,
            vec![
                ("SDK-Key".to_string(), "key-1".to_string()),
                ("Client-ID".to_string(), "client-1".to_string()),
            ]
        );
        assert_eq!(req.header("sdk-key"), Some("key-1"));
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_link_propagates_configuration_error() {
        let client = LinkClient::new(Config::default());
        let err = client.build_create_link("https://a.example").unwrap_err();
        assert_eq!(err, OuttieError::MissingSdkKey);
    }

    #[test]
    fn parse_create_link_success() {
        let response = HttpResponse::ok(r#"{"outtie_link":"https://x.example/abc"}"#);
        let url = client().parse_create_link(&response).unwrap();
        assert_eq!(url.as_str(), "https://x.example/abc");
    }

    #[test]
    fn parse_create_link_ignores_extra_keys() {
        let response = HttpResponse::ok(r#"{"id":"7","outtie_link":"https://x.example/7"}"#);
        let url = client().parse_create_link(&response).unwrap();
        assert_eq!(url.path(), "/7");
    }

    #[test]
    fn parse_create_link_missing_key() {
        let response = HttpResponse::ok(r#"{"link":"https://x.example/abc"}"#);
        let err = client().parse_create_link(&response).unwrap_err();
        assert_eq!(err, OuttieError::ParsingError);
    }

    #[test]
    fn parse_create_link_invalid_link_value() {
        let response = HttpResponse::ok(r#"{"outtie_link":"not a url"}"#);
        let err = client().parse_create_link(&response).unwrap_err();
        assert_eq!(err, OuttieError::ParsingError);
    }

    #[test]
    fn parse_create_link_bad_json() {
        let response = HttpResponse::ok("not json");
        let err = client().parse_create_link(&response).unwrap_err();
        assert_eq!(err, OuttieError::CouldNotCreateLink);
    }

    #[test]
    fn parse_create_link_non_string_values() {
        let response = HttpResponse::ok(r#"{"outtie_link":"https://x.example","count":3}"#);
        let err = client().parse_create_link(&response).unwrap_err();
        assert_eq!(err, OuttieError::CouldNotCreateLink);
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn parse_create_link_error_status_with_json_body() {
        let response = response(401, r#"{"error":"invalid credentials"}"#);
        let err = client().parse_create_link(&response).unwrap_err();
        assert_eq!(err, OuttieError::ParsingError);
    }

    #[test]
    fn parse_create_link_error_status_with_link() {
        let response = response(500, r#"{"outtie_link":"https://x.example/abc"}"#);
        let url = client().parse_create_link(&response).unwrap();
        assert_eq!(url.as_str(), "https://x.example/abc");
    }

    #[test]
    fn parse_create_link_error_status_with_unusable_body() {
        let err = client().parse_create_link(&response(503, "")).unwrap_err();
        assert_eq!(err, OuttieError::Unexpected { code: 503 });

        let err = client().parse_create_link(&response(502, "<html>")).unwrap_err();
        assert_eq!(err, OuttieError::Unexpected { code: 502 });
    }

    #[test]
    fn resolve_url_rejects_base_with_query_or_fragment() {
        for base in ["http://x/?a=1", "http://x/#top"] {
            let client = LinkClient::new(Config::new("c", "k").with_base_url(base));
            assert_eq!(client.resolve_url("https://a.example"), Err(OuttieError::InvalidUrl));
        }
    }

    #[test]
    fn resolve_url_appends_to_base_path() {
        let client = LinkClient::new(Config::new("c", "k").with_base_url("https://x.example/api/"));
        let url = client.resolve_url("https://a.example").unwrap();
        assert_eq!(url.path(), "/api/create_link");
    }

    /// Run `f` under a subscriber that records `[LEVEL] message` per event.
    fn capture_logs(f: impl FnOnce()) -> Vec<String> {
        use std::sync::{Arc, Mutex};
        use tracing_subscriber::layer::SubscriberExt as _;
        use tracing_subscriber::util::SubscriberInitExt as _;

        struct LogCapture {
            logs: Arc<Mutex<Vec<String>>>,
        }

        impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
            fn on_event(
                &self,
                event: &tracing::Event<'_>,
                _ctx: tracing_subscriber::layer::Context<'_, S>,
            ) {
                struct MessageVisitor(String);

                impl tracing::field::Visit for MessageVisitor {
                    fn record_debug(
                        &mut self,
                        field: &tracing::field::Field,
                        value: &dyn std::fmt::Debug,
                    ) {
                        if field.name() == "message" {
                            self.0 = format!("{value:?}");
                        }
                    }
                }

                let mut visitor = MessageVisitor(String::new());
                event.record(&mut visitor);
                self.logs
                    .lock()
                    .unwrap()
                    .push(format!("[{}] {}", event.metadata().level(), visitor.0));
            }
        }

        let logs = Arc::new(Mutex::new(Vec::new()));
        {
            let _guard = tracing_subscriber::registry()
                .with(LogCapture { logs: logs.clone() })
                .set_default();
            f();
        }
        let captured = logs.lock().unwrap().clone();
        captured
    }

    #[test]
    fn resolve_url_logs_missing_sdk_key() {
        let logs = capture_logs(|| {
            let client = LinkClient::new(Config::new("client-1", ""));
            assert_eq!(client.resolve_url("https://a.example"), Err(OuttieError::MissingSdkKey));
        });
        assert!(
            logs.iter().any(|log| log.contains("ERROR") && log.contains("'sdkKey'")),
            "expected missing sdkKey to be logged, got: {logs:?}"
        );
    }

    #[test]
    fn resolve_url_logs_missing_client_id() {
        let logs = capture_logs(|| {
            let client = LinkClient::new(Config::new("", "key-1"));
            assert_eq!(client.resolve_url("https://a.example"), Err(OuttieError::MissingClientId));
        });
        assert!(
            logs.iter().any(|log| log.contains("ERROR") && log.contains("'clientID'")),
            "expected missing clientID to be logged, got: {logs:?}"
        );
    }
}
