//! Discovery of animation containers in the current document.

use log::warn;

use crate::config::{AnimationConfig, LoaderOptions};
use crate::error::LoaderError;
use crate::host::{Candidate, Host};

/// A container and its resolved config.
#[derive(Clone, Debug, PartialEq)]
pub struct ScannedContainer<E> {
    pub element: E,
    pub config: AnimationConfig,
}

/// Read every directive-marked element and parse its config.
///
/// Elements whose config is missing or malformed are dropped with a warning;
/// the rest keep document order.
pub fn scan_containers<H: Host>(
    host: &H,
    options: &LoaderOptions,
) -> Vec<ScannedContainer<H::Element>> {
    host.candidates(&options.directive_attribute, &options.config_attribute)
        .into_iter()
        .filter_map(|candidate| match parse_candidate(&candidate) {
            Ok(config) => Some(ScannedContainer {
                element: candidate.element,
                config,
            }),
            Err(err) => {
                warn!(
                    "Cannot parse lottie animation data {:?}: {}",
                    candidate.element, err
                );
                None
            }
        })
        .collect()
}

fn parse_candidate<E>(candidate: &Candidate<E>) -> Result<AnimationConfig, LoaderError> {
    match candidate.raw_config.as_deref() {
        Some(raw) => AnimationConfig::parse(raw),
        None => Err(LoaderError::InvalidConfig {
            reason: "missing config attribute".into(),
        }),
    }
}
