//! Error types for the Outtie link SDK.
//!
//! # Design
//! The set is closed: hosts match on these variants and the C ABI maps each
//! one to a stable `ErrorCode`. `Display` produces the fixed, user-facing
//! description for each kind so hosts can show it without a lookup table.

use thiserror::Error;

/// Errors produced while resolving or creating an Outtie link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OuttieError {
    /// `client_id` was not configured.
    #[error(
        "Remember to set your 'clientID' parameter before calling any Outtie functions. \
         Find your 'clientId' in your Outtie.io dashboard, Account Settings, Keys section."
    )]
    MissingClientId,

    /// `sdk_key` was not configured.
    #[error(
        "Remember to set your 'sdkKey' parameter before calling any Outtie functions. \
         Find your 'sdkKey' in your Outtie.io dashboard, Account Settings, Keys section."
    )]
    MissingSdkKey,

    /// The create-link URL could not be built from the configured base.
    #[error("The URL you provided is invalid. Please check and make sure this link is still active and reachable.")]
    InvalidUrl,

    /// The round-trip failed or the body was not a flat string map.
    #[error("Unable to create an commissionable affiliate link with provided URL.")]
    CouldNotCreateLink,

    /// The body decoded but carried no usable `outtie_link`.
    #[error("Error returning a Outtie Link")]
    ParsingError,

    /// The service answered with a non-2xx status and a body that is not a
    /// flat string map.
    #[error("An unexpected error occurred.")]
    Unexpected { code: u16 },
}

/// Stable numeric codes for `OuttieError`, shared with the C ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    MissingClientId = 1,
    MissingSdkKey = 2,
    InvalidUrl = 3,
    CouldNotCreateLink = 4,
    ParsingError = 5,
    Unexpected = 6,
}

impl OuttieError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OuttieError::MissingClientId => ErrorCode::MissingClientId,
            OuttieError::MissingSdkKey => ErrorCode::MissingSdkKey,
            OuttieError::InvalidUrl => ErrorCode::InvalidUrl,
            OuttieError::CouldNotCreateLink => ErrorCode::CouldNotCreateLink,
            OuttieError::ParsingError => ErrorCode::ParsingError,
            OuttieError::Unexpected { .. } => ErrorCode::Unexpected,
        }
    }

    /// True for the setup errors that `Outtie::create_link` swallows.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            OuttieError::MissingClientId | OuttieError::MissingSdkKey | OuttieError::InvalidUrl
        )
    }
}

impl ErrorCode {
    /// Reverse of `OuttieError::code`. `Unexpected` comes back with code 0
    /// since the status is not part of the numeric code.
    pub fn to_error(self) -> OuttieError {
        match self {
            ErrorCode::MissingClientId => OuttieError::MissingClientId,
            ErrorCode::MissingSdkKey => OuttieError::MissingSdkKey,
            ErrorCode::InvalidUrl => OuttieError::InvalidUrl,
            ErrorCode::CouldNotCreateLink => OuttieError::CouldNotCreateLink,
            ErrorCode::ParsingError => OuttieError::ParsingError,
            ErrorCode::Unexpected => OuttieError::Unexpected { code: 0 },
        }
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(ErrorCode::MissingClientId),
            2 => Some(ErrorCode::MissingSdkKey),
            3 => Some(ErrorCode::InvalidUrl),
            4 => Some(ErrorCode::CouldNotCreateLink),
            5 => Some(ErrorCode::ParsingError),
            6 => Some(ErrorCode::Unexpected),
            _ => None,
        }
    }
}
