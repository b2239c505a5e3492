//! The `Outtie` facade: one configured SDK instance per host application.
//!
//! # Design
//! `Outtie` owns its `Config` (through `LinkClient`) and never mutates it, so
//! it can be shared freely once built; a host that needs different
//! credentials builds a new instance. Network I/O goes through a `Transport`
//! and every asynchronous completion goes through a `Dispatcher`.
//!
//! Error propagation differs per entry point:
//! - `create_link` swallows configuration errors and hands back the caller's
//!   URL with no error; transport and parsing errors are surfaced next to the
//!   same fallback URL.
//! - `open_link` / `open_external_link` surface nothing and do nothing when
//!   resolution fails.
//!
//! Every error is logged before it is surfaced or swallowed.

use std::sync::Arc;
use std::thread;

use url::Url;

use crate::client::LinkClient;
use crate::config::Config;
use crate::dispatch::{Dispatcher, InlineDispatcher};
use crate::error::OuttieError;
use crate::http::HttpRequest;
use crate::outcome::LinkOutcome;
use crate::present::{Presenter, UrlOpener};
use crate::transport::{Transport, UreqTransport};

#[derive(Clone)]
pub struct Outtie {
    client: LinkClient,
    transport: Arc<dyn Transport>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl Outtie {
    /// An instance using `ureq` for I/O and delivering completions inline on
    /// the worker thread, not on the host's main context.
    ///
    /// Hosts that need completions on their UI thread must supply a
    /// main-context dispatcher, e.g. `with_dispatcher` with a
    /// `MainQueue::dispatcher()` drained from that thread.
    pub fn new(config: Config) -> Self {
        Self::with_parts(
            config,
            Arc::new(UreqTransport::new()),
            Arc::new(InlineDispatcher),
        )
    }

    pub fn with_parts(
        config: Config,
        transport: Arc<dyn Transport>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            client: LinkClient::new(config),
            transport,
            dispatcher,
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn config(&self) -> &Config {
        self.client.config()
    }

    pub fn client(&self) -> &LinkClient {
        &self.client
    }

    /// The create-link URL for `url_string`, or `None` when the SDK is not
    /// configured. The reason is logged.
    pub fn resolve(&self, url_string: &str) -> Option<Url> {
        self.client.resolve_url(url_string).ok()
    }

    /// Create a tracking link for `url_string` without blocking.
    ///
    /// The round-trip runs on a new thread; `completion` is called exactly
    /// once through the dispatcher, also on the misconfigured path.
    pub fn create_link<F>(&self, url_string: &str, completion: F)
    where
        F: FnOnce(LinkOutcome) + Send + 'static,
    {
        let original = url_string.to_string();
        let request = match self.client.build_create_link(&original) {
            Ok(request) => request,
            Err(_) => {
                let outcome = LinkOutcome::unresolved(&original);
                self.dispatcher.dispatch(Box::new(move || completion(outcome)));
                return;
            }
        };

        let client = self.client.clone();
        let transport = Arc::clone(&self.transport);
        let dispatcher = Arc::clone(&self.dispatcher);
        thread::spawn(move || {
            let result = round_trip(&client, transport.as_ref(), &request);
            let outcome = LinkOutcome::from_result(&original, result);
            dispatcher.dispatch(Box::new(move || completion(outcome)));
        });
    }

    /// Blocking variant of `create_link` for hosts that manage their own
    /// threads. Same fallback and error rules; no dispatcher involved.
    pub fn create_link_blocking(&self, url_string: &str) -> LinkOutcome {
        let request = match self.client.build_create_link(url_string) {
            Ok(request) => request,
            Err(_) => return LinkOutcome::unresolved(url_string),
        };
        let result = round_trip(&self.client, self.transport.as_ref(), &request);
        LinkOutcome::from_result(url_string, result)
    }

    /// Present the resolved URL in an embedded browser. Silent no-op when
    /// resolution fails.
    pub fn open_link(&self, presenter: &dyn Presenter, url_string: &str) {
        if let Some(url) = self.resolve(url_string) {
            presenter.present(&url);
        }
    }

    /// Ask the OS to open the resolved URL externally, if anything can.
    /// Silent no-op when resolution fails or no handler exists.
    pub fn open_external_link(&self, opener: &dyn UrlOpener, url_string: &str) {
        let Some(url) = self.resolve(url_string) else {
            return;
        };
        if opener.can_open(&url) {
            opener.open(&url);
        } else {
            tracing::debug!(%url, "no handler can open url");
        }
    }
}

/// Execute `request` and parse the reply. Transport failures become
/// `CouldNotCreateLink`.
fn round_trip(
    client: &LinkClient,
    transport: &dyn Transport,
    request: &HttpRequest,
) -> Result<Url, OuttieError> {
    let response = transport.execute(request).map_err(|e| {
        tracing::warn!(error = %e, url = %request.url, "create_link request failed");
        OuttieError::CouldNotCreateLink
    })?;
    client.parse_create_link(&response)
}
