//! Sample Lottie payloads and page layouts shared by the loader's tests.
//!
//! `fixtures/manifest.json` maps short names to files under `fixtures/`.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    payloads: BTreeMap<String, String>,
    containers: BTreeMap<String, String>,
}

/// One directive-marked element as it would appear in a page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerFixture {
    pub element_id: String,
    /// Raw value of the config attribute; `None` when the attribute is absent.
    pub config: Option<String>,
}

/// Read the file registered as `name` in one section of the manifest.
fn read(section: &BTreeMap<String, String>, kind: &str, name: &str) -> Result<String> {
    let rel = section
        .get(name)
        .ok_or_else(|| anyhow!("no {kind} fixture named '{name}'"))?;
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../../fixtures")
        .join(rel);
    fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
}

/// Animation payloads, served by the tests as response bodies.
pub mod payloads {
    use super::*;

    pub fn names() -> Vec<String> {
        MANIFEST.payloads.keys().cloned().collect()
    }

    /// The payload exactly as it would come over the wire.
    pub fn json(name: &str) -> Result<String> {
        read(&MANIFEST.payloads, "payload", name)
    }

    /// The payload parsed, for comparing against what a player received.
    pub fn value(name: &str) -> Result<serde_json::Value> {
        let body = json(name)?;
        serde_json::from_str(&body).with_context(|| format!("payload '{name}' is not JSON"))
    }
}

/// Container sets describing a page's directive-marked elements.
pub mod containers {
    use super::*;

    pub fn names() -> Vec<String> {
        MANIFEST.containers.keys().cloned().collect()
    }

    pub fn load(name: &str) -> Result<Vec<ContainerFixture>> {
        let body = read(&MANIFEST.containers, "container set", name)?;
        serde_json::from_str(&body).with_context(|| format!("container set '{name}'"))
    }
}
