//! In-memory page used to drive setup passes without a browser.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};

use lottie_loader::{
    AnimationQuery, Candidate, ContainerElement, FetchResponse, Host, LoaderError, Payload,
    Player, PlayerLibrary, PlayerOptions, PlayerVariant, Result, VisibilityCallback,
    VisibilityEntry, VisibilityObserver,
};

/// Name of the fixture payload most tests serve.
pub const BALL: &str = "bouncing-ball";

/// Player lifecycle, in the order it happened across the whole page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    Created(String),
    Destroyed(String),
}

type EventLog = Rc<RefCell<Vec<PlayerEvent>>>;

fn label(element: &MockElement) -> String {
    element.element_id().unwrap_or_default()
}

struct ElementData {
    id: Option<String>,
    config: Option<String>,
}

/// Element handle; equality is identity, like DOM nodes.
#[derive(Clone)]
pub struct MockElement(Rc<ElementData>);

impl MockElement {
    pub fn new(id: Option<&str>, config: Option<&str>) -> Self {
        Self(Rc::new(ElementData {
            id: id.map(str::to_string),
            config: config.map(str::to_string),
        }))
    }
}

impl PartialEq for MockElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for MockElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<div id={:?}>", self.0.id)
    }
}

impl ContainerElement for MockElement {
    fn element_id(&self) -> Option<String> {
        self.0.id.clone().filter(|id| !id.is_empty())
    }
}

pub struct PlayerState {
    pub container: MockElement,
    pub options: PlayerOptions,
    pub payload: Payload,
    pub variant: PlayerVariant,
    pub playing: Cell<bool>,
    pub destroyed: Cell<bool>,
    pub play_calls: Cell<u32>,
    pub pause_calls: Cell<u32>,
    events: EventLog,
}

#[derive(Clone)]
pub struct MockPlayer(pub Rc<PlayerState>);

impl MockPlayer {
    pub fn same(&self, other: &MockPlayer) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Player for MockPlayer {
    fn play(&self) {
        self.0.play_calls.set(self.0.play_calls.get() + 1);
        self.0.playing.set(true);
    }

    fn pause(&self) {
        self.0.pause_calls.set(self.0.pause_calls.get() + 1);
        self.0.playing.set(false);
    }

    fn destroy(&self) {
        self.0.playing.set(false);
        self.0.destroyed.set(true);
        self.0
            .events
            .borrow_mut()
            .push(PlayerEvent::Destroyed(label(&self.0.container)));
    }
}

pub struct MockLibrary {
    pub variant: PlayerVariant,
    players: Rc<RefCell<Vec<MockPlayer>>>,
    events: EventLog,
}

impl PlayerLibrary for MockLibrary {
    type Element = MockElement;
    type Player = MockPlayer;

    fn load_animation(
        &self,
        container: &MockElement,
        options: &PlayerOptions,
        payload: &Payload,
    ) -> Result<MockPlayer> {
        let player = MockPlayer(Rc::new(PlayerState {
            container: container.clone(),
            options: *options,
            payload: Rc::clone(payload),
            variant: self.variant,
            playing: Cell::new(options.autoplay),
            destroyed: Cell::new(false),
            play_calls: Cell::new(0),
            pause_calls: Cell::new(0),
            events: Rc::clone(&self.events),
        }));
        self.events
            .borrow_mut()
            .push(PlayerEvent::Created(label(container)));
        self.players.borrow_mut().push(player.clone());
        Ok(player)
    }
}

pub struct ObserverState {
    pub threshold: f64,
    pub observed: RefCell<Vec<MockElement>>,
    pub disconnected: Cell<bool>,
    callback: VisibilityCallback<MockElement>,
}

#[derive(Clone)]
pub struct MockObserver(pub Rc<ObserverState>);

impl MockObserver {
    /// Deliver a batch of intersection changes, as the browser would.
    pub fn fire(&self, entries: &[VisibilityEntry<MockElement>]) {
        (self.0.callback)(entries);
    }

    pub fn observes(&self, element: &MockElement) -> bool {
        self.0.observed.borrow().iter().any(|e| e == element)
    }
}

impl VisibilityObserver for MockObserver {
    type Element = MockElement;

    fn observe(&self, element: &MockElement) {
        self.0.observed.borrow_mut().push(element.clone());
    }

    fn disconnect(&self) {
        self.0.disconnected.set(true);
        self.0.observed.borrow_mut().clear();
    }
}

#[derive(Clone)]
enum MockResponse {
    Body(String),
    Status(u16),
    NetworkError,
}

#[derive(Default)]
struct Page {
    elements: RefCell<Vec<MockElement>>,
    responses: RefCell<HashMap<String, MockResponse>>,
    gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
    fetch_log: RefCell<Vec<String>>,
    library_loads: RefCell<Vec<PlayerVariant>>,
    library_gates: RefCell<HashMap<PlayerVariant, oneshot::Receiver<()>>>,
    library_broken: Cell<bool>,
    players: Rc<RefCell<Vec<MockPlayer>>>,
    events: EventLog,
    observers: RefCell<Vec<MockObserver>>,
    published: RefCell<Vec<Rc<AnimationQuery<MockHost>>>>,
    announced: RefCell<Vec<Rc<AnimationQuery<MockHost>>>>,
}

/// Cheap to clone; clones share the same page.
#[derive(Clone, Default)]
pub struct MockHost {
    page: Rc<Page>,
}

pub fn entry(target: &MockElement, is_intersecting: bool, ratio: f64) -> VisibilityEntry<MockElement> {
    VisibilityEntry {
        target: target.clone(),
        is_intersecting,
        intersection_ratio: ratio,
    }
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a directive-marked element holding `config`.
    pub fn add_container(&self, id: &str, config: &str) -> MockElement {
        self.add_raw(Some(id), Some(config))
    }

    pub fn add_raw(&self, id: Option<&str>, config: Option<&str>) -> MockElement {
        let element = MockElement::new(id, config);
        self.page.elements.borrow_mut().push(element.clone());
        element
    }

    /// Append every element of a fixture container set.
    pub fn load_fixture_page(&self, name: &str) -> Vec<MockElement> {
        lottie_test_fixtures::containers::load(name)
            .expect("container fixture")
            .into_iter()
            .map(|c| self.add_raw(Some(&c.element_id), c.config.as_deref()))
            .collect()
    }

    pub fn remove(&self, element: &MockElement) {
        self.page.elements.borrow_mut().retain(|e| e != element);
    }

    pub fn clear(&self) {
        self.page.elements.borrow_mut().clear();
    }

    pub fn serve(&self, src: &str, body: &str) {
        self.page
            .responses
            .borrow_mut()
            .insert(src.to_string(), MockResponse::Body(body.to_string()));
    }

    /// Serve the named fixture payload at `src`.
    pub fn serve_fixture(&self, src: &str, name: &str) {
        let body = lottie_test_fixtures::payloads::json(name).expect("payload fixture");
        self.serve(src, &body);
    }

    pub fn serve_status(&self, src: &str, status: u16) {
        self.page
            .responses
            .borrow_mut()
            .insert(src.to_string(), MockResponse::Status(status));
    }

    pub fn fail_network(&self, src: &str) {
        self.page
            .responses
            .borrow_mut()
            .insert(src.to_string(), MockResponse::NetworkError);
    }

    /// Hold the next fetch of `src` until the returned sender fires.
    pub fn gate(&self, src: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.page.gates.borrow_mut().insert(src.to_string(), rx);
        tx
    }

    /// Hold the next load of `variant` until the returned sender fires.
    pub fn gate_library(&self, variant: PlayerVariant) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.page.library_gates.borrow_mut().insert(variant, rx);
        tx
    }

    pub fn break_library(&self, broken: bool) {
        self.page.library_broken.set(broken);
    }

    pub fn fetches(&self) -> Vec<String> {
        self.page.fetch_log.borrow().clone()
    }

    pub fn fetch_count(&self, src: &str) -> usize {
        self.page.fetch_log.borrow().iter().filter(|s| *s == src).count()
    }

    pub fn library_loads(&self) -> Vec<PlayerVariant> {
        self.page.library_loads.borrow().clone()
    }

    pub fn players(&self) -> Vec<MockPlayer> {
        self.page.players.borrow().clone()
    }

    pub fn player_events(&self) -> Vec<PlayerEvent> {
        self.page.events.borrow().clone()
    }

    pub fn observers(&self) -> Vec<MockObserver> {
        self.page.observers.borrow().clone()
    }

    pub fn published(&self) -> Vec<Rc<AnimationQuery<MockHost>>> {
        self.page.published.borrow().clone()
    }

    pub fn announced(&self) -> Vec<Rc<AnimationQuery<MockHost>>> {
        self.page.announced.borrow().clone()
    }
}

impl Host for MockHost {
    type Element = MockElement;
    type Player = MockPlayer;
    type Library = MockLibrary;
    type Observer = MockObserver;

    fn candidates(
        &self,
        _directive_attribute: &str,
        _config_attribute: &str,
    ) -> Vec<Candidate<MockElement>> {
        self.page
            .elements
            .borrow()
            .iter()
            .map(|element| Candidate {
                element: element.clone(),
                raw_config: element.0.config.clone(),
            })
            .collect()
    }

    fn load_library(&self, variant: PlayerVariant) -> LocalBoxFuture<'_, Result<MockLibrary>> {
        self.page.library_loads.borrow_mut().push(variant);
        let broken = self.page.library_broken.get();
        let gate = self.page.library_gates.borrow_mut().remove(&variant);
        let players = Rc::clone(&self.page.players);
        let events = Rc::clone(&self.page.events);
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if broken {
                return Err(LoaderError::LibraryUnavailable {
                    variant,
                    reason: "module not found".into(),
                });
            }
            Ok(MockLibrary {
                variant,
                players,
                events,
            })
        }
        .boxed_local()
    }

    fn fetch(&self, src: &str) -> LocalBoxFuture<'_, Result<FetchResponse>> {
        self.page.fetch_log.borrow_mut().push(src.to_string());
        let gate = self.page.gates.borrow_mut().remove(src);
        let response = self.page.responses.borrow().get(src).cloned();
        let src = src.to_string();
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            match response {
                Some(MockResponse::Body(body)) => Ok(FetchResponse::ok(body)),
                Some(MockResponse::Status(status)) => Ok(FetchResponse {
                    status,
                    body: String::new(),
                }),
                None => Ok(FetchResponse {
                    status: 404,
                    body: "Not Found".into(),
                }),
                Some(MockResponse::NetworkError) => Err(LoaderError::Fetch {
                    src,
                    reason: "connection refused".into(),
                }),
            }
        }
        .boxed_local()
    }

    fn observe_visibility(
        &self,
        threshold: f64,
        callback: VisibilityCallback<MockElement>,
    ) -> Result<MockObserver> {
        let observer = MockObserver(Rc::new(ObserverState {
            threshold,
            observed: RefCell::new(Vec::new()),
            disconnected: Cell::new(false),
            callback,
        }));
        self.page.observers.borrow_mut().push(observer.clone());
        Ok(observer)
    }

    fn publish(&self, query: &Rc<AnimationQuery<Self>>, _library: &Rc<MockLibrary>) {
        self.page.published.borrow_mut().push(Rc::clone(query));
    }

    fn announce(&self, query: &Rc<AnimationQuery<Self>>) {
        self.page.announced.borrow_mut().push(Rc::clone(query));
    }
}
