//! Setup pass orchestration.
//!
//! A [`Session`] owns everything that outlives a single pass (library handle,
//! payload cache, registry, observer) and sequences one pass as
//! scan → resolve library → fetch sources → reconcile → rebuild observer →
//! publish → announce.
//!
//! Overlapping passes: every pass takes a new epoch. A pass that wakes up
//! from its suspension points to find a newer epoch stops before touching
//! the registry, so the latest pass always wins. Its finished fetches still
//! land in the cache.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::{debug, error, info};

use crate::cache::SourceCache;
use crate::config::LoaderOptions;
use crate::error::LoaderError;
use crate::host::{Host, VisibilityObserver};
use crate::library::LibraryResolver;
use crate::query::AnimationQuery;
use crate::registry::AnimationRegistry;
use crate::scanner::scan_containers;
use crate::visibility::build_observer;

/// How a setup pass ended.
pub enum PassOutcome<H: Host> {
    /// No directive-marked container was found. If the previous page had
    /// animations, they were released and an empty query was published.
    NoContainers,
    /// The player library could not be loaded or conflicts with the loaded one.
    LibraryUnavailable(LoaderError),
    /// A newer pass started while this one was suspended.
    Superseded,
    /// The query object was published and announced.
    Ready(Rc<AnimationQuery<H>>),
}

impl<H: Host> PassOutcome<H> {
    pub fn query(&self) -> Option<&Rc<AnimationQuery<H>>> {
        match self {
            PassOutcome::Ready(query) => Some(query),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PassOutcome::Ready(_))
    }
}

impl<H: Host> fmt::Debug for PassOutcome<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassOutcome::NoContainers => f.write_str("NoContainers"),
            PassOutcome::LibraryUnavailable(err) => {
                f.debug_tuple("LibraryUnavailable").field(err).finish()
            }
            PassOutcome::Superseded => f.write_str("Superseded"),
            PassOutcome::Ready(query) => f.debug_tuple("Ready").field(query).finish(),
        }
    }
}

/// Page-lifetime loader state. Built once, reconciled on every pass.
pub struct Session<H: Host> {
    host: H,
    options: LoaderOptions,
    library: LibraryResolver<H>,
    cache: SourceCache,
    registry: AnimationRegistry<H>,
    observer: RefCell<Option<Rc<H::Observer>>>,
    query: RefCell<Option<Rc<AnimationQuery<H>>>>,
    epoch: Cell<u64>,
}

impl<H: Host> Session<H> {
    pub fn new(host: H, options: LoaderOptions) -> Self {
        Self {
            host,
            options,
            library: LibraryResolver::new(),
            cache: SourceCache::new(),
            registry: AnimationRegistry::new(),
            observer: RefCell::new(None),
            query: RefCell::new(None),
            epoch: Cell::new(0),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    pub fn library(&self) -> &LibraryResolver<H> {
        &self.library
    }

    /// Number of passes started so far.
    pub fn epoch(&self) -> u64 {
        self.epoch.get()
    }

    /// The most recently published query object.
    pub fn current_query(&self) -> Option<Rc<AnimationQuery<H>>> {
        self.query.borrow().clone()
    }

    /// Run one setup pass against the current document.
    pub async fn run_pass(&self) -> PassOutcome<H> {
        let epoch = self.epoch.get().wrapping_add(1);
        self.epoch.set(epoch);
        debug!("setup pass {epoch} started");

        let containers = scan_containers(&self.host, &self.options);
        if containers.is_empty() {
            if self.registry.prune(&containers) > 0 {
                self.replace_observer(None);
                self.publish_empty();
            }
            debug!("setup pass {epoch}: no lottie containers");
            return PassOutcome::NoContainers;
        }

        let resolved = self.library.resolve(&self.host, &containers).await;
        if self.epoch.get() != epoch {
            debug!("setup pass {epoch} superseded while loading the player");
            return PassOutcome::Superseded;
        }
        let library = match resolved {
            Ok(library) => library,
            Err(err) => {
                if matches!(err, LoaderError::VariantConflict { .. }) {
                    error!("{err}");
                }
                return PassOutcome::LibraryUnavailable(err);
            }
        };

        self.cache
            .ensure(&self.host, containers.iter().map(|c| c.config.src.as_str()))
            .await;

        if self.epoch.get() != epoch {
            debug!("setup pass {epoch} superseded by pass {}", self.epoch.get());
            return PassOutcome::Superseded;
        }

        let records = self.registry.reconcile(&containers, &library, &self.cache);

        let observer = build_observer(&self.host, &records);
        self.replace_observer(observer.clone());

        let variant = self.library.variant().unwrap_or_default();
        let query = Rc::new(AnimationQuery::new(records, variant, observer));
        *self.query.borrow_mut() = Some(Rc::clone(&query));

        self.host.publish(&query, &library);
        self.host.announce(&query);
        info!(
            "setup pass {epoch}: {} animation(s) ready with the {variant} player",
            query.len()
        );
        PassOutcome::Ready(query)
    }

    /// Replace the published query with an empty one so the page global
    /// stops handing out destroyed players. Nothing is announced.
    fn publish_empty(&self) {
        let Some(library) = self.library.handle() else {
            self.query.replace(None);
            return;
        };
        let variant = self.library.variant().unwrap_or_default();
        let query = Rc::new(AnimationQuery::new(Vec::new(), variant, None));
        *self.query.borrow_mut() = Some(Rc::clone(&query));
        self.host.publish(&query, &library);
    }

    fn replace_observer(&self, next: Option<Rc<H::Observer>>) {
        let previous = self.observer.replace(next);
        if let Some(previous) = previous {
            previous.disconnect();
        }
    }
}

/// Decides which page-lifecycle signals start a pass.
///
/// The initial load always does. The first soft-navigation signal after it
/// is skipped when configured, since frameworks fire it for the initial page
/// as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationGate {
    skip_first: bool,
    initial_started: bool,
    seen_navigation: bool,
}

impl NavigationGate {
    pub fn new(skip_first: bool) -> Self {
        Self {
            skip_first,
            ..Self::default()
        }
    }

    /// Record the initial-load pass. Returns `true` when it should run.
    pub fn on_initial_load(&mut self) -> bool {
        if self.initial_started {
            return false;
        }
        self.initial_started = true;
        true
    }

    /// Record a navigation signal. Returns `true` when it should run a pass.
    pub fn on_navigation(&mut self) -> bool {
        let first = !self.seen_navigation;
        self.seen_navigation = true;
        !(first && self.skip_first && self.initial_started)
    }
}
