//! Core of the Outtie link SDK.
//!
//! # Overview
//! Wraps the link service's `POST /create_link` endpoint: given a destination
//! URL, ask the service for a tracking link that redirects to it. Hosts can
//! also present the create-link URL directly in an embedded or external
//! browser.
//!
//! # Design
//! - `LinkClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern).
//! - `Outtie` layers I/O (`Transport`) and main-context delivery
//!   (`Dispatcher`) on top for hosts that want the SDK to do the round-trip.
//! - Configuration is an explicit `Config` value owned by each `Outtie`; there
//!   is no global state.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod outcome;
pub mod present;
pub mod sdk;
pub mod transport;

pub use client::LinkClient;
pub use config::Config;
pub use dispatch::{Dispatcher, InlineDispatcher, MainQueue, MainQueueDispatcher};
pub use error::{ErrorCode, OuttieError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use outcome::LinkOutcome;
pub use present::{Presenter, UrlOpener};
pub use sdk::Outtie;
pub use transport::{Transport, TransportError, UreqTransport};
pub use url::Url;
