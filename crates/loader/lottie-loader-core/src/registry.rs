//! Live animation records, one per container.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use log::{debug, warn};
use uuid::Uuid;

use crate::cache::SourceCache;
use crate::config::AnimationConfig;
use crate::host::{Host, Payload, Player, PlayerLibrary, PlayerOptions, RendererSettings};
use crate::scanner::ScannedContainer;

/// Immutable snapshot of one container's animation.
///
/// The record owns its player; the container is only a back-reference.
pub struct AnimationRecord<H: Host> {
    id: String,
    config: AnimationConfig,
    container: H::Element,
    player: Option<H::Player>,
}

impl<H: Host> AnimationRecord<H> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn container(&self) -> &H::Element {
        &self.container
    }

    /// The player, present iff the payload was loaded.
    pub fn player(&self) -> Option<&H::Player> {
        self.player.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.player.is_some()
    }

    fn release(&self) {
        if let Some(player) = &self.player {
            player.destroy();
        }
    }
}

impl<H: Host> fmt::Debug for AnimationRecord<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationRecord")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("container", &self.container)
            .field("is_loaded", &self.is_loaded())
            .finish()
    }
}

/// Player options derived from a container's config.
pub fn player_options(config: &AnimationConfig) -> PlayerOptions {
    PlayerOptions {
        loop_playback: config.loop_playback,
        autoplay: config.autoplay.player_flag(),
        renderer: RendererSettings::default(),
    }
}

/// Fresh identifier for records without a configured id.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// The set of live records, reconciled against each scan.
pub struct AnimationRegistry<H: Host> {
    records: RefCell<Vec<Rc<AnimationRecord<H>>>>,
}

impl<H: Host> Default for AnimationRegistry<H> {
    fn default() -> Self {
        Self {
            records: RefCell::new(Vec::new()),
        }
    }
}

impl<H: Host> AnimationRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the live records in scan order.
    pub fn records(&self) -> Vec<Rc<AnimationRecord<H>>> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Destroy every record whose container is not in `containers`.
    /// Returns how many were dropped.
    pub fn prune(&self, containers: &[ScannedContainer<H::Element>]) -> usize {
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|record| {
            let alive = containers.iter().any(|c| c.element == record.container);
            if !alive {
                debug!("destroying animation {}", record.id);
                record.release();
            }
            alive
        });
        before - records.len()
    }

    /// Bring the registry in line with `containers`.
    ///
    /// Stale records are destroyed before anything is created. Loaded
    /// records of surviving containers are kept as they are; unloaded ones
    /// are rebuilt if their payload has since arrived.
    pub fn reconcile(
        &self,
        containers: &[ScannedContainer<H::Element>],
        library: &H::Library,
        cache: &SourceCache,
    ) -> Vec<Rc<AnimationRecord<H>>> {
        self.prune(containers);

        let existing = self.records.borrow().clone();
        let mut taken: HashSet<String> = existing.iter().map(|r| r.id.clone()).collect();
        let mut next = Vec::with_capacity(containers.len());

        for scanned in containers {
            let prior = existing
                .iter()
                .find(|r| r.container == scanned.element)
                .cloned();

            let record = match prior {
                Some(record) if record.is_loaded() => record,
                Some(record) => match cache.get(&record.config.src) {
                    Some(payload) => Rc::new(instantiate(
                        record.id.clone(),
                        scanned,
                        library,
                        Some(payload),
                    )),
                    None => record,
                },
                None => {
                    let id = claim_id(scanned.config.id.as_deref(), &mut taken);
                    Rc::new(instantiate(
                        id,
                        scanned,
                        library,
                        cache.get(&scanned.config.src),
                    ))
                }
            };
            next.push(record);
        }

        *self.records.borrow_mut() = next.clone();
        next
    }
}

fn claim_id(configured: Option<&str>, taken: &mut HashSet<String>) -> String {
    let id = match configured {
        Some(id) if !taken.contains(id) => id.to_string(),
        Some(id) => {
            warn!("Duplicate lottie animation id {id:?}, generating a new one");
            generate_id()
        }
        None => generate_id(),
    };
    taken.insert(id.clone());
    id
}

fn instantiate<H: Host>(
    id: String,
    scanned: &ScannedContainer<H::Element>,
    library: &H::Library,
    payload: Option<Payload>,
) -> AnimationRecord<H> {
    let player = match payload {
        None => {
            debug!(
                "animation {id} has no data for {}, leaving it unloaded",
                scanned.config.src
            );
            None
        }
        Some(payload) => {
            let options = player_options(&scanned.config);
            match library.load_animation(&scanned.element, &options, &payload) {
                Ok(player) => Some(player),
                Err(err) => {
                    warn!("{err}");
                    None
                }
            }
        }
    };

    AnimationRecord {
        id,
        config: scanned.config.clone(),
        container: scanned.element.clone(),
        player,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Autoplay;

    #[test]
    fn visible_autoplay_starts_paused() {
        let config = AnimationConfig::new("a.json");
        let options = player_options(&config);
        assert!(options.loop_playback);
        assert!(!options.autoplay);
        assert!(options.renderer.view_box_only);
    }

    #[test]
    fn immediate_autoplay_is_passed_through() {
        let config = AnimationConfig::new("a.json")
            .with_autoplay(Autoplay::Immediate)
            .with_loop(false);
        let options = player_options(&config);
        assert!(options.autoplay);
        assert!(!options.loop_playback);
    }

    #[test]
    fn generated_ids_are_non_empty_and_distinct() {
        let a = generate_id();
        let b = generate_id();
        assert!(!a.is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn duplicate_configured_ids_are_replaced() {
        let mut taken = HashSet::new();
        assert_eq!(claim_id(Some("hero"), &mut taken), "hero");
        let second = claim_id(Some("hero"), &mut taken);
        assert_ne!(second, "hero");
        assert!(!second.is_empty());
    }
}
