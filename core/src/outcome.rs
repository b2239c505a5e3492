//! Result of a create-link call as delivered to the host.
//!
//! # Design
//! Link creation fails open: whatever goes wrong, the host still gets a URL
//! it can use, either the created link or its own input. The error, when
//! there is one worth surfacing, rides alongside instead of replacing it.

use url::Url;

use crate::error::OuttieError;

/// A created link, or the caller's original URL plus the reason creation
/// failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    /// The link the service created. `None` on every fallback path.
    pub link: Option<Url>,
    /// The caller's input, byte for byte.
    pub original: String,
    pub error: Option<OuttieError>,
}

impl LinkOutcome {
    pub fn created(original: &str, link: Url) -> Self {
        Self {
            link: Some(link),
            original: original.to_string(),
            error: None,
        }
    }

    /// `created` on success, `fallback` to `original` on failure.
    pub fn from_result(original: &str, result: Result<Url, OuttieError>) -> Self {
        match result {
            Ok(link) => {
                tracing::debug!(%link, "created outtie link");
                Self::created(original, link)
            }
            Err(e) => Self::fallback(original, e),
        }
    }

    /// Hand back `original` untouched with `error` attached. The error is
    /// logged first.
    pub fn fallback(original: &str, error: OuttieError) -> Self {
        tracing::error!(error = ?error, "{error}");
        Self {
            link: None,
            original: original.to_string(),
            error: Some(error),
        }
    }

    /// Hand back `original` untouched without surfacing an error. Used when
    /// the SDK is misconfigured: the resolver has already logged why.
    pub fn unresolved(original: &str) -> Self {
        Self {
            link: None,
            original: original.to_string(),
            error: None,
        }
    }

    /// The URL the host should use: the created link, else its own input.
    pub fn url(&self) -> &str {
        self.link.as_ref().map_or(self.original.as_str(), Url::as_str)
    }

    pub fn is_created(&self) -> bool {
        self.error.is_none() && self.link.is_some()
    }

    pub fn into_result(self) -> (String, Option<OuttieError>) {
        let url = match self.link {
            Some(link) => link.into(),
            None => self.original,
        };
        (url, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_keeps_original_and_error() {
        let outcome = LinkOutcome::fallback("https://a.example/x", OuttieError::ParsingError);
        assert_eq!(outcome.url(), "https://a.example/x");
        assert_eq!(outcome.error, Some(OuttieError::ParsingError));
        assert!(!outcome.is_created());
    }

    #[test]
    fn fallback_returns_input_byte_for_byte() {
        for input in ["https://Shop.Example", "https://a.example:443/a b", "not a url"] {
            let outcome = LinkOutcome::fallback(input, OuttieError::CouldNotCreateLink);
            assert_eq!(outcome.url(), input);
            assert!(outcome.link.is_none());
        }
    }

    #[test]
    fn unresolved_carries_no_error() {
        let outcome = LinkOutcome::unresolved("https://a.example");
        assert!(outcome.error.is_none());
        assert_eq!(outcome.url(), "https://a.example");
    }

    #[test]
    fn from_result_picks_branch() {
        let link = Url::parse("https://x.example/1").unwrap();
        let ok = LinkOutcome::from_result("https://a.example", Ok(link));
        assert_eq!(ok.url(), "https://x.example/1");
        assert_eq!(ok.original, "https://a.example");

        let err = LinkOutcome::from_result(
            "https://a.example",
            Err(OuttieError::Unexpected { code: 500 }),
        );
        assert_eq!(err.url(), "https://a.example");
        assert_eq!(err.error, Some(OuttieError::Unexpected { code: 500 }));
    }

    #[test]
    fn created_is_created() {
        let link = Url::parse("https://x.example/abc").unwrap();
        let outcome = LinkOutcome::created("https://a.example", link);
        assert!(outcome.is_created());
        let (url, error) = outcome.into_result();
        assert_eq!(url, "https://x.example/abc");
        assert!(error.is_none());

        let (url, error) = LinkOutcome::unresolved("https://Shop.Example").into_result();
        assert_eq!(url, "https://Shop.Example");
        assert!(error.is_none());
    }
}
