//! Browser entry point for the Lottie loader.
//!
//! `install(options)` wires a [`lottie_loader::Session`] to the current page:
//! the first setup pass runs on the next animation frame, later passes run on
//! every soft navigation, and each completed pass publishes an
//! [`AstroLottie`] query object on `window`.

use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use wasm_bindgen::prelude::*;

use lottie_loader::{LoaderOptions, Session};

pub mod host;
pub mod logging;
pub mod navigation;
pub mod observer;
pub mod player;
pub mod query;

pub use host::WebHost;
pub use navigation::Lifecycle;
pub use query::AstroLottie;

thread_local! {
    static INSTALLED: RefCell<Option<Rc<Lifecycle>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn on_start() {
    console_error_panic_hook::set_once();
}

/// Decode `install` options. `undefined` and `null` select the defaults.
pub fn parse_options(options: JsValue) -> Result<LoaderOptions, JsError> {
    if options.is_undefined() || options.is_null() {
        return Ok(LoaderOptions::default());
    }
    serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsError::new(&format!("invalid loader options: {e}")))
}

/// Attach the loader to the page. Calling it again is a no-op.
#[wasm_bindgen]
pub fn install(options: JsValue) -> Result<(), JsError> {
    if INSTALLED.with(|slot| slot.borrow().is_some()) {
        return Ok(());
    }
    let options = parse_options(options)?;
    logging::init(options.max_log_level());

    let host = WebHost::new(options.clone())?;
    let session = Rc::new(Session::new(host, options));
    let lifecycle = navigation::attach(session)?;
    INSTALLED.with(|slot| slot.replace(Some(lifecycle)));
    info!("lottie loader installed");
    Ok(())
}

