//! Per-container animation config and loader-wide options.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LoaderError;

/// Capability tier of the rendering engine. `Full` is a superset of `Light`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerVariant {
    #[default]
    Light,
    Full,
}

impl PlayerVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerVariant::Light => "light",
            PlayerVariant::Full => "full",
        }
    }
}

impl fmt::Display for PlayerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When playback starts. Declared as `true`, `false` or `"visible"`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "AutoplayRepr", into = "AutoplayRepr")]
pub enum Autoplay {
    /// Play as soon as the player is created.
    Immediate,
    /// Never start on its own.
    Disabled,
    /// Play only while the container is in the viewport.
    #[default]
    Visible,
}

impl Autoplay {
    /// The `autoplay` flag handed to the player library. Visibility-driven
    /// animations always start paused.
    pub fn player_flag(self) -> bool {
        matches!(self, Autoplay::Immediate)
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum AutoplayRepr {
    Flag(bool),
    Keyword(AutoplayKeyword),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum AutoplayKeyword {
    Visible,
}

impl From<AutoplayRepr> for Autoplay {
    fn from(repr: AutoplayRepr) -> Self {
        match repr {
            AutoplayRepr::Flag(true) => Autoplay::Immediate,
            AutoplayRepr::Flag(false) => Autoplay::Disabled,
            AutoplayRepr::Keyword(AutoplayKeyword::Visible) => Autoplay::Visible,
        }
    }
}

impl From<Autoplay> for AutoplayRepr {
    fn from(autoplay: Autoplay) -> Self {
        match autoplay {
            Autoplay::Immediate => AutoplayRepr::Flag(true),
            Autoplay::Disabled => AutoplayRepr::Flag(false),
            Autoplay::Visible => AutoplayRepr::Keyword(AutoplayKeyword::Visible),
        }
    }
}

/// Resolved configuration of one container, declared values merged over the
/// defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    /// Locator of the animation payload.
    pub src: String,
    /// Caller-assigned stable id; a random one is generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub player: PlayerVariant,
    #[serde(rename = "loop", default = "default_loop")]
    pub loop_playback: bool,
    #[serde(default)]
    pub autoplay: Autoplay,
    #[serde(default)]
    pub visible_threshold: f64,
}

fn default_loop() -> bool {
    true
}

impl AnimationConfig {
    /// Config for `src` with every other field at its default.
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            id: None,
            player: PlayerVariant::default(),
            loop_playback: default_loop(),
            autoplay: Autoplay::default(),
            visible_threshold: 0.0,
        }
    }

    /// Parse the serialized config held by a container's companion attribute.
    pub fn parse(raw: &str) -> Result<Self, LoaderError> {
        let config: AnimationConfig = serde_json::from_str(raw)?;
        if config.src.is_empty() {
            return Err(LoaderError::InvalidConfig {
                reason: "`src` must not be empty".into(),
            });
        }
        Ok(config)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_player(mut self, player: PlayerVariant) -> Self {
        self.player = player;
        self
    }

    pub fn with_autoplay(mut self, autoplay: Autoplay) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn with_loop(mut self, loop_playback: bool) -> Self {
        self.loop_playback = loop_playback;
        self
    }

    pub fn with_visible_threshold(mut self, threshold: f64) -> Self {
        self.visible_threshold = threshold;
        self
    }
}

/// Page-level loader options. Every field has a default, so an empty object
/// (or no object at all) is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderOptions {
    /// Boolean-style attribute marking an animation container.
    pub directive_attribute: String,
    /// Companion attribute holding the JSON config.
    pub config_attribute: String,
    /// Event dispatched on `document` after every completed setup pass.
    pub ready_event: String,
    /// Soft-navigation event that re-runs the setup pass.
    pub navigation_event: String,
    /// Skip the first navigation event when it repeats the initial load.
    pub skip_first_navigation: bool,
    /// `window` property receiving the query object.
    pub query_global: String,
    /// `window` property receiving the player library handle.
    pub library_global: String,
    /// Module specifier of the light player.
    pub light_module: String,
    /// Module specifier of the full player.
    pub full_module: String,
    /// Maximum level forwarded to the console: off, error, warn, info, debug, trace.
    pub log_level: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            directive_attribute: "data-lottie".into(),
            config_attribute: "data-lottie-data".into(),
            ready_event: "astro-lottie:ready".into(),
            navigation_event: "astro:page-load".into(),
            skip_first_navigation: true,
            query_global: "astroLottie".into(),
            library_global: "lottie".into(),
            light_module: "lottie-web/build/player/lottie_light".into(),
            full_module: "lottie-web".into(),
            log_level: "warn".into(),
        }
    }
}

impl LoaderOptions {
    /// Module specifier to import for `variant`.
    pub fn module_for(&self, variant: PlayerVariant) -> &str {
        match variant {
            PlayerVariant::Light => &self.light_module,
            PlayerVariant::Full => &self.full_module,
        }
    }

    /// Parsed `log_level`, falling back to `Warn` for unknown names.
    pub fn max_log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Warn)
    }
}
