//! Bindings to the lottie-web module and its animation items.

use js_sys::{Function, Object, Reflect};
use log::warn;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

use lottie_loader::{
    ContainerElement, LoaderError, Payload, Player, PlayerLibrary, PlayerOptions, PlayerVariant,
    Result,
};

/// A container element. Equality is `===`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomElement(pub Element);

impl ContainerElement for DomElement {
    fn element_id(&self) -> Option<String> {
        let id = self.0.id();
        (!id.is_empty()).then_some(id)
    }
}

impl AsRef<JsValue> for DomElement {
    fn as_ref(&self) -> &JsValue {
        self.0.as_ref()
    }
}

/// Best-effort human-readable form of a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}

fn set(target: &Object, key: &str, value: &JsValue) -> std::result::Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(key), value).map(|_| ())
}

/// Convert a cached payload into a plain JS object for `loadAnimation`.
pub fn payload_to_js(payload: &Payload) -> std::result::Result<JsValue, serde_wasm_bindgen::Error> {
    serde_json::Value::serialize(payload, &serde_wasm_bindgen::Serializer::json_compatible())
}

/// The default export of `lottie-web` (or its light build).
pub struct JsLottie {
    handle: JsValue,
    load_animation: Function,
    variant: PlayerVariant,
}

impl JsLottie {
    /// Wrap a loaded module, checking that it exposes `loadAnimation`.
    pub fn new(handle: JsValue, variant: PlayerVariant) -> Result<Self> {
        let load_animation = Reflect::get(&handle, &JsValue::from_str("loadAnimation"))
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| LoaderError::LibraryUnavailable {
                variant,
                reason: "module has no loadAnimation function".into(),
            })?;
        Ok(Self {
            handle,
            load_animation,
            variant,
        })
    }

    pub fn handle(&self) -> &JsValue {
        &self.handle
    }

    pub fn variant(&self) -> PlayerVariant {
        self.variant
    }

    fn params(
        container: &DomElement,
        options: &PlayerOptions,
        payload: &Payload,
    ) -> std::result::Result<Object, JsValue> {
        let renderer = Object::new();
        set(
            &renderer,
            "viewBoxOnly",
            &JsValue::from_bool(options.renderer.view_box_only),
        )?;

        let params = Object::new();
        set(&params, "container", container.as_ref())?;
        set(&params, "loop", &JsValue::from_bool(options.loop_playback))?;
        set(&params, "autoplay", &JsValue::from_bool(options.autoplay))?;
        set(&params, "animationData", &payload_to_js(payload)?)?;
        set(&params, "rendererSettings", &renderer)?;
        Ok(params)
    }
}

impl PlayerLibrary for JsLottie {
    type Element = DomElement;
    type Player = JsAnimationItem;

    fn load_animation(
        &self,
        container: &DomElement,
        options: &PlayerOptions,
        payload: &Payload,
    ) -> Result<JsAnimationItem> {
        let creation_error = |e: &JsValue| LoaderError::PlayerCreation {
            target: format!("{container:?}"),
            reason: describe(e),
        };
        let params = Self::params(container, options, payload).map_err(|e| creation_error(&e))?;
        let item = self
            .load_animation
            .call1(&self.handle, &params)
            .map_err(|e| creation_error(&e))?;
        Ok(JsAnimationItem(item))
    }
}

/// An `AnimationItem` returned by `loadAnimation`.
#[derive(Clone, Debug)]
pub struct JsAnimationItem(JsValue);

impl JsAnimationItem {
    pub fn as_js(&self) -> &JsValue {
        &self.0
    }

    fn invoke(&self, method: &str) {
        let result = Reflect::get(&self.0, &JsValue::from_str(method))
            .and_then(|f| f.dyn_into::<Function>().map_err(JsValue::from))
            .and_then(|f| f.call0(&self.0));
        if let Err(err) = result {
            warn!("AnimationItem.{method}() failed: {}", describe(&err));
        }
    }
}

impl Player for JsAnimationItem {
    fn play(&self) {
        self.invoke("play");
    }

    fn pause(&self) {
        self.invoke("pause");
    }

    fn destroy(&self) {
        self.invoke("destroy");
    }
}
