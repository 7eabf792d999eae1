//! lottie-loader
//!
//! Lifecycle manager for declaratively-marked Lottie animations: finds
//! containers, resolves the player library, fetches and caches payloads,
//! keeps one player per container across soft navigations and drives
//! visibility-based playback.
//!
//! The crate never touches a browser API directly. A [`Host`] supplies the
//! document, network, module loading and page globals; [`Session`] runs setup
//! passes against it.

pub mod cache;
pub mod config;
pub mod error;
pub mod host;
pub mod library;
pub mod query;
pub mod registry;
pub mod scanner;
pub mod session;
pub mod visibility;

pub use cache::SourceCache;
pub use config::{AnimationConfig, Autoplay, LoaderOptions, PlayerVariant};
pub use error::LoaderError;
pub use host::{
    Candidate, ContainerElement, FetchResponse, Host, Payload, Player, PlayerLibrary,
    PlayerOptions, RendererSettings, VisibilityCallback, VisibilityEntry, VisibilityObserver,
};
pub use library::LibraryResolver;
pub use query::{AnimationQuery, LookupKey};
pub use registry::{AnimationRecord, AnimationRegistry};
pub use scanner::{scan_containers, ScannedContainer};
pub use session::{NavigationGate, PassOutcome, Session};
pub use visibility::{effective_threshold, VisibilityDriver};

/// Loader result type
pub type Result<T> = core::result::Result<T, LoaderError>;
