//! Lazy, memoized resolution of the player library.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use crate::config::PlayerVariant;
use crate::error::LoaderError;
use crate::host::Host;
use crate::scanner::ScannedContainer;
use crate::Result;

/// Variant needed to render every container: `Full` if any asks for it.
pub fn required_variant<E>(containers: &[ScannedContainer<E>]) -> PlayerVariant {
    containers
        .iter()
        .map(|c| c.config.player)
        .max()
        .unwrap_or_default()
}

/// Whether a loaded variant can render a `requested` container set.
pub fn covers(loaded: PlayerVariant, requested: PlayerVariant) -> bool {
    loaded >= requested
}

/// Holds the library handle for the page's lifetime.
///
/// Once a variant is loaded it is never replaced: a weaker request reuses it,
/// a stronger one is a configuration conflict.
pub struct LibraryResolver<H: Host> {
    loaded: RefCell<Option<(PlayerVariant, Rc<H::Library>)>>,
}

impl<H: Host> Default for LibraryResolver<H> {
    fn default() -> Self {
        Self {
            loaded: RefCell::new(None),
        }
    }
}

impl<H: Host> LibraryResolver<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoized variant, if any library has been loaded.
    pub fn variant(&self) -> Option<PlayerVariant> {
        self.loaded.borrow().as_ref().map(|(v, _)| *v)
    }

    /// The memoized handle, if any library has been loaded.
    pub fn handle(&self) -> Option<Rc<H::Library>> {
        self.loaded.borrow().as_ref().map(|(_, lib)| Rc::clone(lib))
    }

    /// Return a library able to render every container, loading it on first use.
    ///
    /// A stronger request than the active variant is a `VariantConflict`;
    /// the caller decides whether it is worth reporting.
    pub async fn resolve(
        &self,
        host: &H,
        containers: &[ScannedContainer<H::Element>],
    ) -> Result<Rc<H::Library>> {
        let requested = required_variant(containers);

        if let Some((loaded, library)) = self.loaded.borrow().as_ref() {
            if covers(*loaded, requested) {
                debug!("reusing {loaded} player for {requested} request");
                return Ok(Rc::clone(library));
            }
            return Err(LoaderError::VariantConflict {
                loaded: *loaded,
                requested,
            });
        }

        match host.load_library(requested).await {
            Ok(library) => {
                let mut loaded = self.loaded.borrow_mut();
                // An overlapping pass may have memoized a handle while this
                // load was in flight. The first memoized variant stays active.
                if let Some((active, handle)) = loaded.as_ref() {
                    if covers(*active, requested) {
                        debug!("discarding {requested} player, {active} is already active");
                        return Ok(Rc::clone(handle));
                    }
                    return Err(LoaderError::VariantConflict {
                        loaded: *active,
                        requested,
                    });
                }
                let library = Rc::new(library);
                *loaded = Some((requested, Rc::clone(&library)));
                debug!("loaded {requested} player");
                Ok(library)
            }
            Err(err) => {
                warn!("Cannot load lottie-web script: {err}");
                Err(match err {
                    LoaderError::LibraryUnavailable { .. } => err,
                    other => LoaderError::LibraryUnavailable {
                        variant: requested,
                        reason: other.to_string(),
                    },
                })
            }
        }
    }
}
