//! `IntersectionObserver` wrapper.

use js_sys::Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use lottie_loader::{LoaderError, Result, VisibilityCallback, VisibilityEntry, VisibilityObserver};

use crate::player::{describe, DomElement};

type ObserverClosure = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// One browser observer plus the closure it calls back into.
pub struct WebVisibilityObserver {
    observer: IntersectionObserver,
    // Dropping the closure invalidates the JS callback.
    _callback: ObserverClosure,
}

impl WebVisibilityObserver {
    pub fn new(threshold: f64, on_change: VisibilityCallback<DomElement>) -> Result<Self> {
        let callback = Closure::wrap(Box::new(move |entries: Array, _: IntersectionObserver| {
            let batch: Vec<VisibilityEntry<DomElement>> = entries
                .iter()
                .filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|e| VisibilityEntry {
                    target: DomElement(e.target()),
                    is_intersecting: e.is_intersecting(),
                    intersection_ratio: e.intersection_ratio(),
                })
                .collect();
            on_change(&batch);
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                .map_err(|e| LoaderError::Observer {
                    reason: describe(&e),
                })?;

        Ok(Self {
            observer,
            _callback: callback,
        })
    }

    pub fn as_js(&self) -> &JsValue {
        self.observer.as_ref()
    }
}

impl VisibilityObserver for WebVisibilityObserver {
    type Element = DomElement;

    fn observe(&self, element: &DomElement) {
        self.observer.observe(&element.0);
    }

    fn disconnect(&self) {
        self.observer.disconnect();
    }
}
