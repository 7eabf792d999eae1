//! The seam between the lifecycle manager and the page it runs in.
//!
//! Everything that touches the DOM, the network, module loading or page
//! globals goes through [`Host`]. The browser implementation lives in
//! `lottie-loader-wasm`; tests drive the core with an in-memory host.

use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::config::PlayerVariant;
use crate::query::AnimationQuery;
use crate::Result;

/// Parsed animation payload, shared between the cache and every player built
/// from it.
pub type Payload = Rc<serde_json::Value>;

/// A DOM element that may host an animation. Equality is element identity.
pub trait ContainerElement: Clone + PartialEq + fmt::Debug + 'static {
    /// The element's `id` attribute, `None` when unset or empty.
    fn element_id(&self) -> Option<String>;
}

/// One rendered animation owned by a record.
pub trait Player: 'static {
    fn play(&self);
    fn pause(&self);
    /// Release timers and DOM nodes held by the player.
    fn destroy(&self);
}

/// Renderer settings handed to the player library.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RendererSettings {
    /// Scale to the container's box instead of the payload's native size.
    pub view_box_only: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            view_box_only: true,
        }
    }
}

/// Arguments of a `loadAnimation` call, minus container and payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerOptions {
    pub loop_playback: bool,
    pub autoplay: bool,
    pub renderer: RendererSettings,
}

/// A loaded variant of the rendering engine.
pub trait PlayerLibrary: 'static {
    type Element: ContainerElement;
    type Player: Player;

    fn load_animation(
        &self,
        container: &Self::Element,
        options: &PlayerOptions,
        payload: &Payload,
    ) -> Result<Self::Player>;
}

/// One intersection change reported by the observer.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityEntry<E> {
    pub target: E,
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

/// Callback invoked with every batch of intersection changes.
pub type VisibilityCallback<E> = Box<dyn Fn(&[VisibilityEntry<E>])>;

/// A live viewport-intersection watcher.
pub trait VisibilityObserver: 'static {
    type Element: ContainerElement;

    fn observe(&self, element: &Self::Element);
    fn disconnect(&self);
}

/// An element bearing the directive attribute, with the raw value of its
/// companion config attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate<E> {
    pub element: E,
    pub raw_config: Option<String>,
}

/// Response to a payload request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status >= 400
    }
}

/// Page capabilities needed by a setup pass.
pub trait Host: Sized + 'static {
    type Element: ContainerElement;
    type Player: Player;
    type Library: PlayerLibrary<Element = Self::Element, Player = Self::Player>;
    type Observer: VisibilityObserver<Element = Self::Element>;

    /// Every element carrying `directive_attribute`, in document order.
    fn candidates(
        &self,
        directive_attribute: &str,
        config_attribute: &str,
    ) -> Vec<Candidate<Self::Element>>;

    /// Load the module implementing `variant`.
    fn load_library(&self, variant: PlayerVariant) -> LocalBoxFuture<'_, Result<Self::Library>>;

    /// GET `src`. An `Err` means no response was received at all.
    fn fetch(&self, src: &str) -> LocalBoxFuture<'_, Result<FetchResponse>>;

    /// Create an intersection observer firing at `threshold`.
    fn observe_visibility(
        &self,
        threshold: f64,
        callback: VisibilityCallback<Self::Element>,
    ) -> Result<Self::Observer>;

    /// Replace the page-global query object and library handle.
    fn publish(&self, query: &Rc<AnimationQuery<Self>>, library: &Rc<Self::Library>);

    /// Tell the page that animations are ready.
    fn announce(&self, query: &Rc<AnimationQuery<Self>>);
}
