//! Visibility-driven play/pause through one shared observer.

use std::rc::Rc;

use log::{debug, warn};

use crate::config::Autoplay;
use crate::host::{Host, Player, VisibilityEntry, VisibilityObserver};
use crate::registry::AnimationRecord;

/// Shared threshold for a set of per-animation thresholds: the smallest one,
/// clamped to `[0, 1]`. NaN counts as 0; an empty set yields 0.
pub fn effective_threshold<I>(thresholds: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    thresholds
        .into_iter()
        .map(|t| if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) })
        .reduce(f64::min)
        .unwrap_or(0.0)
}

/// Plays or pauses the records watched by one observer.
pub struct VisibilityDriver<H: Host> {
    watched: Vec<Rc<AnimationRecord<H>>>,
    threshold: f64,
}

impl<H: Host> VisibilityDriver<H> {
    /// Watch the loaded, visibility-driven records among `records`.
    pub fn new(records: &[Rc<AnimationRecord<H>>]) -> Self {
        let watched: Vec<_> = records
            .iter()
            .filter(|r| r.is_loaded() && r.config().autoplay == Autoplay::Visible)
            .cloned()
            .collect();
        let threshold = effective_threshold(watched.iter().map(|r| r.config().visible_threshold));
        Self { watched, threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn watched(&self) -> &[Rc<AnimationRecord<H>>] {
        &self.watched
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    /// Apply one batch of intersection changes. Unknown targets are ignored.
    pub fn handle(&self, entries: &[VisibilityEntry<H::Element>]) {
        for entry in entries {
            let Some(record) = self.watched.iter().find(|r| *r.container() == entry.target) else {
                continue;
            };
            let Some(player) = record.player() else {
                continue;
            };
            if entry.is_intersecting && entry.intersection_ratio >= self.threshold {
                player.play();
            } else {
                player.pause();
            }
        }
    }
}

/// Build the shared observer for `records`, or `None` when nothing is
/// visibility-driven.
pub fn build_observer<H: Host>(
    host: &H,
    records: &[Rc<AnimationRecord<H>>],
) -> Option<Rc<H::Observer>> {
    let driver = VisibilityDriver::new(records);
    if driver.is_empty() {
        return None;
    }

    let threshold = driver.threshold();
    let containers: Vec<H::Element> = driver
        .watched()
        .iter()
        .map(|r| r.container().clone())
        .collect();

    let observer = match host.observe_visibility(
        threshold,
        Box::new(move |entries: &[VisibilityEntry<H::Element>]| driver.handle(entries)),
    ) {
        Ok(observer) => observer,
        Err(err) => {
            warn!("{err}");
            return None;
        }
    };
    for container in &containers {
        observer.observe(container);
    }
    debug!(
        "observing {} animation(s) at threshold {threshold}",
        containers.len()
    );
    Some(Rc::new(observer))
}
