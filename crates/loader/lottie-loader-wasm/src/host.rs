//! Browser implementation of the loader [`Host`].

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use js_sys::{Promise, Reflect};
use log::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CustomEvent, CustomEventInit, Document, Element, Response, Window};

use lottie_loader::{
    AnimationQuery, Candidate, FetchResponse, Host, LoaderError, LoaderOptions, PlayerVariant,
    Result, VisibilityCallback,
};

use crate::observer::WebVisibilityObserver;
use crate::player::{describe, DomElement, JsAnimationItem, JsLottie};
use crate::query::AstroLottie;

#[wasm_bindgen(inline_js = "export function import_module(specifier) { return import(specifier); }")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn import_module(specifier: &str) -> std::result::Result<Promise, JsValue>;
}

/// The current window and document.
pub struct WebHost {
    window: Window,
    document: Document,
    options: LoaderOptions,
    published: RefCell<Option<JsValue>>,
}

impl WebHost {
    pub fn new(options: LoaderOptions) -> std::result::Result<Self, JsError> {
        let window = web_sys::window().ok_or_else(|| JsError::new("no global `window`"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("window has no document"))?;
        Ok(Self {
            window,
            document,
            options,
            published: RefCell::new(None),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn set_global(&self, name: &str, value: &JsValue) {
        if let Err(err) = Reflect::set(&self.window, &JsValue::from_str(name), value) {
            warn!("Cannot assign window.{name}: {}", describe(&err));
        }
    }
}

fn unavailable(variant: PlayerVariant, err: &JsValue) -> LoaderError {
    LoaderError::LibraryUnavailable {
        variant,
        reason: describe(err),
    }
}

fn fetch_error(src: &str, err: &JsValue) -> LoaderError {
    LoaderError::Fetch {
        src: src.to_string(),
        reason: describe(err),
    }
}

impl Host for WebHost {
    type Element = DomElement;
    type Player = JsAnimationItem;
    type Library = JsLottie;
    type Observer = WebVisibilityObserver;

    fn candidates(
        &self,
        directive_attribute: &str,
        config_attribute: &str,
    ) -> Vec<Candidate<DomElement>> {
        let selector = format!("[{directive_attribute}]");
        let nodes = match self.document.query_selector_all(&selector) {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!("Cannot query {selector}: {}", describe(&err));
                return Vec::new();
            }
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| Candidate {
                raw_config: element.get_attribute(config_attribute),
                element: DomElement(element),
            })
            .collect()
    }

    fn load_library(&self, variant: PlayerVariant) -> LocalBoxFuture<'_, Result<JsLottie>> {
        let specifier = self.options.module_for(variant).to_string();
        async move {
            let promise = import_module(&specifier).map_err(|e| unavailable(variant, &e))?;
            let module = JsFuture::from(promise)
                .await
                .map_err(|e| unavailable(variant, &e))?;
            let default = Reflect::get(&module, &JsValue::from_str("default"))
                .map_err(|e| unavailable(variant, &e))?;
            let handle = if default.is_undefined() { module } else { default };
            JsLottie::new(handle, variant)
        }
        .boxed_local()
    }

    fn fetch(&self, src: &str) -> LocalBoxFuture<'_, Result<FetchResponse>> {
        let src = src.to_string();
        async move {
            let response: Response = JsFuture::from(self.window.fetch_with_str(&src))
                .await
                .and_then(|r| r.dyn_into::<Response>())
                .map_err(|e| fetch_error(&src, &e))?;
            let status = response.status();
            if status >= 400 {
                return Ok(FetchResponse {
                    status,
                    body: String::new(),
                });
            }
            let text = response.text().map_err(|e| fetch_error(&src, &e))?;
            let body = JsFuture::from(text)
                .await
                .map_err(|e| fetch_error(&src, &e))?
                .as_string()
                .unwrap_or_default();
            Ok(FetchResponse { status, body })
        }
        .boxed_local()
    }

    fn observe_visibility(
        &self,
        threshold: f64,
        callback: VisibilityCallback<DomElement>,
    ) -> Result<WebVisibilityObserver> {
        WebVisibilityObserver::new(threshold, callback)
    }

    fn publish(&self, query: &Rc<AnimationQuery<Self>>, library: &Rc<JsLottie>) {
        let object = JsValue::from(AstroLottie::new(Rc::clone(query)));
        self.set_global(&self.options.query_global, &object);
        self.set_global(&self.options.library_global, library.handle());
        self.published.replace(Some(object));
    }

    fn announce(&self, query: &Rc<AnimationQuery<Self>>) {
        let detail = self
            .published
            .borrow()
            .clone()
            .unwrap_or_else(|| JsValue::from(AstroLottie::new(Rc::clone(query))));
        let init = CustomEventInit::new();
        init.set_detail(&detail);
        match CustomEvent::new_with_event_init_dict(&self.options.ready_event, &init) {
            Ok(event) => {
                if let Err(err) = self.document.dispatch_event(&event) {
                    warn!("Cannot dispatch {}: {}", self.options.ready_event, describe(&err));
                }
            }
            Err(err) => warn!("Cannot create {}: {}", self.options.ready_event, describe(&err)),
        }
    }
}
