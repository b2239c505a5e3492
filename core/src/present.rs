//! Host UI capabilities used by `open_link` and `open_external_link`.
//!
//! The SDK never draws anything itself; it resolves a URL and passes it to
//! one of these.

use url::Url;

/// Shows a URL in a browser view embedded in the host's UI.
pub trait Presenter {
    fn present(&self, url: &Url);
}

/// The operating system's URL-opening facility.
pub trait UrlOpener {
    /// Whether some installed handler can open `url`.
    fn can_open(&self, url: &Url) -> bool;

    fn open(&self, url: &Url);
}

impl<F: Fn(&Url)> Presenter for F {
    fn present(&self, url: &Url) {
        self(url)
    }
}
