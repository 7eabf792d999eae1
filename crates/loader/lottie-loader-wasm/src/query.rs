//! The page-global `astroLottie` object.

use std::rc::Rc;

use js_sys::{Array, Object, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

use lottie_loader::{AnimationQuery, AnimationRecord, LoaderError, LookupKey, Result};

use crate::host::WebHost;
use crate::player::DomElement;

/// Decode the argument of `getAnimation`: an id string, `{ container }` or
/// `{ elementId }`.
pub fn lookup_key(value: &JsValue) -> Result<LookupKey<DomElement>> {
    if let Some(id) = value.as_string() {
        return Ok(LookupKey::Id(id));
    }
    if value.is_object() {
        let container = Reflect::get(value, &JsValue::from_str("container"))
            .unwrap_or(JsValue::UNDEFINED);
        if !container.is_undefined() {
            return container
                .dyn_into::<Element>()
                .map(|el| LookupKey::Container(DomElement(el)))
                .map_err(|_| LoaderError::InvalidLookupKey {
                    reason: "container must be an Element".into(),
                });
        }
    }
    let json: serde_json::Value =
        serde_wasm_bindgen::from_value(value.clone()).map_err(|e| LoaderError::InvalidLookupKey {
            reason: e.to_string(),
        })?;
    LookupKey::from_json(&json)
}

/// Frozen JS view of a record: `{ id, config, container, isLoaded, player }`.
pub fn record_to_js(record: &AnimationRecord<WebHost>) -> JsValue {
    let obj = Object::new();
    let config = record
        .config()
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::UNDEFINED);
    let player = record
        .player()
        .map(|p| p.as_js().clone())
        .unwrap_or(JsValue::UNDEFINED);

    let fields: [(&str, JsValue); 5] = [
        ("id", JsValue::from_str(record.id())),
        ("config", config),
        ("container", record.container().as_ref().clone()),
        ("isLoaded", JsValue::from_bool(record.is_loaded())),
        ("player", player),
    ];
    for (key, value) in fields.iter() {
        let _ = Reflect::set(&obj, &JsValue::from_str(key), value);
    }
    Object::freeze(&obj).into()
}

/// Query object published on `window` after every completed setup pass.
#[wasm_bindgen]
pub struct AstroLottie {
    query: Rc<AnimationQuery<WebHost>>,
}

impl AstroLottie {
    pub fn new(query: Rc<AnimationQuery<WebHost>>) -> Self {
        Self { query }
    }
}

#[wasm_bindgen]
impl AstroLottie {
    /// Look up an animation by id, `{ container }` or `{ elementId }`.
    /// Returns `undefined` when nothing matches; throws on other key shapes.
    #[wasm_bindgen(js_name = getAnimation)]
    pub fn get_animation(&self, key: JsValue) -> std::result::Result<JsValue, JsError> {
        let key = lookup_key(&key).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(self
            .query
            .get(&key)
            .map(|record| record_to_js(&record))
            .unwrap_or(JsValue::UNDEFINED))
    }

    /// Every animation of the current page, in document order.
    #[wasm_bindgen(js_name = getAllAnimations)]
    pub fn get_all_animations(&self) -> Array {
        self.query
            .all()
            .iter()
            .map(|record| record_to_js(record))
            .collect()
    }

    /// The shared `IntersectionObserver`, or `undefined`.
    #[wasm_bindgen(getter)]
    pub fn observer(&self) -> JsValue {
        self.query
            .observer()
            .map(|o| o.as_js().clone())
            .unwrap_or(JsValue::UNDEFINED)
    }

    /// The loaded player variant: `"light"` or `"full"`.
    #[wasm_bindgen(getter)]
    pub fn player(&self) -> String {
        self.query.player_variant().to_string()
    }
}
