//! Page-lifecycle triggers for setup passes.
//!
//! The initial pass runs on the next animation frame so the DOM can settle.
//! Later passes follow the soft-navigation event.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Event;

use lottie_loader::{NavigationGate, Session};

use crate::host::WebHost;
use crate::player::describe;

type EventClosure = Closure<dyn FnMut(Event)>;

/// Keeps the navigation listener registered for the page's lifetime.
pub struct Lifecycle {
    session: Rc<Session<WebHost>>,
    gate: RefCell<NavigationGate>,
    listener: RefCell<Option<EventClosure>>,
}

impl Lifecycle {
    pub fn session(&self) -> &Rc<Session<WebHost>> {
        &self.session
    }
}

/// Start a pass without waiting for it. Every failure inside is already
/// logged and turned into an outcome, so nothing rejects.
pub fn spawn_pass(session: &Rc<Session<WebHost>>) {
    let session = Rc::clone(session);
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = session.run_pass().await;
        debug!("setup pass finished: {outcome:?}");
    });
}

/// Schedule the initial pass and subscribe to soft navigations.
pub fn attach(session: Rc<Session<WebHost>>) -> Result<Rc<Lifecycle>, JsError> {
    let lifecycle = Rc::new(Lifecycle {
        gate: RefCell::new(NavigationGate::new(session.options().skip_first_navigation)),
        session,
        listener: RefCell::new(None),
    });
    let host = lifecycle.session.host();

    if lifecycle.gate.borrow_mut().on_initial_load() {
        let initial = Rc::clone(&lifecycle);
        let on_frame = Closure::once_into_js(move |_timestamp: f64| {
            spawn_pass(&initial.session);
        });
        host.window()
            .request_animation_frame(on_frame.unchecked_ref())
            .map_err(|e| JsError::new(&describe(&e)))?;
    }

    let weak = Rc::downgrade(&lifecycle);
    let listener = Closure::wrap(Box::new(move |_event: Event| {
        let Some(lifecycle) = weak.upgrade() else {
            return;
        };
        let run = lifecycle.gate.borrow_mut().on_navigation();
        if run {
            spawn_pass(&lifecycle.session);
        } else {
            debug!("skipping navigation event already covered by the initial pass");
        }
    }) as Box<dyn FnMut(Event)>);

    host.document()
        .add_event_listener_with_callback(
            &lifecycle.session.options().navigation_event,
            listener.as_ref().unchecked_ref(),
        )
        .map_err(|e| JsError::new(&describe(&e)))?;
    lifecycle.listener.replace(Some(listener));

    Ok(lifecycle)
}
