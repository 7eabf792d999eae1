//! Error types for the loader

use crate::config::PlayerVariant;

/// Every failure the loader can observe.
///
/// Only [`LoaderError::InvalidLookupKey`] ever reaches integrating code as an
/// error; the rest are logged by the stage that hit them and turned into a
/// degraded result.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum LoaderError {
    /// The companion attribute was missing or did not hold a valid config.
    #[error("Invalid animation config: {reason}")]
    InvalidConfig { reason: String },

    /// The player library module could not be loaded.
    #[error("Cannot load {variant} player library: {reason}")]
    LibraryUnavailable {
        variant: PlayerVariant,
        reason: String,
    },

    /// A stronger variant was requested after a weaker one was loaded.
    #[error("The {loaded} player is already loaded, cannot load the {requested} player")]
    VariantConflict {
        loaded: PlayerVariant,
        requested: PlayerVariant,
    },

    /// The request for an animation source never produced a response.
    #[error("Cannot load animation({src}): {reason}")]
    Fetch { src: String, reason: String },

    /// The response for an animation source carried a failure status.
    #[error("Cannot load animation({src}): HTTP {status}")]
    HttpStatus { src: String, status: u16 },

    /// The response body was not a usable animation payload.
    #[error("Cannot load animation({src}): {reason}")]
    Payload { src: String, reason: String },

    /// The player library refused to build a player for a container.
    #[error("Cannot create player in {target}: {reason}")]
    PlayerCreation { target: String, reason: String },

    /// The visibility observer could not be created.
    #[error("Cannot observe visibility: {reason}")]
    Observer { reason: String },

    /// `getAnimation` was called with a key of an unknown shape.
    #[error("Invalid animation lookup key: {reason}")]
    InvalidLookupKey { reason: String },
}

impl LoaderError {
    /// Whether a later setup pass may succeed where this one failed.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::LibraryUnavailable { .. }
                | Self::Fetch { .. }
                | Self::HttpStatus { .. }
                | Self::Payload { .. }
                | Self::Observer { .. }
        )
    }

    /// Error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "config",
            Self::LibraryUnavailable { .. } | Self::VariantConflict { .. } => "library",
            Self::Fetch { .. } | Self::HttpStatus { .. } | Self::Payload { .. } => "payload",
            Self::PlayerCreation { .. } | Self::Observer { .. } => "player",
            Self::InvalidLookupKey { .. } => "query",
        }
    }
}

impl From<serde_json::Error> for LoaderError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
