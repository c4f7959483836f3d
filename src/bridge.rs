/// Typed wrappers over the host framework and grid library JS modules

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::Element;

use crate::error::{describe, WidgetError};
use crate::stack::SwipeResults;

// Host framework component API
#[wasm_bindgen(module = "/host.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn setComponentValue(value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn setFrameHeight(height: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn onRender(callback: &js_sys::Function) -> Result<(), JsValue>;
}

// Grid library
#[wasm_bindgen(module = "/grid.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn createGrid(container: &Element, spec: JsValue) -> Result<JsValue, JsValue>;

    fn destroyGrid(grid: &JsValue);
}

/// Serialize to plain JS objects (maps become objects, not `Map`s)
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, WidgetError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).map_err(WidgetError::from)
}

/// Hand the results to the host; fire-and-forget
pub fn send_results(results: &SwipeResults) -> Result<(), WidgetError> {
    let value = to_js(results)?;
    setComponentValue(value).map_err(|e| WidgetError::Bridge(describe(&e)))?;
    log::info!(
        "Sent results: {} swiped, {} remaining",
        results.total_swiped,
        results.remaining_cards
    );
    Ok(())
}

pub fn set_frame_height(height: u32) -> Result<(), WidgetError> {
    setFrameHeight(height).map_err(|e| WidgetError::Bridge(describe(&e)))
}

/// Register for host render events and announce readiness
pub fn on_render(callback: &js_sys::Function) -> Result<(), WidgetError> {
    onRender(callback).map_err(|e| WidgetError::Bridge(describe(&e)))
}

/// Build a grid inside `container`; the returned handle goes to `destroy_grid`
pub fn create_grid<T: Serialize>(container: &Element, spec: &T) -> Result<JsValue, WidgetError> {
    let spec = to_js(spec)?;
    createGrid(container, spec).map_err(|e| WidgetError::Grid(describe(&e)))
}

pub fn destroy_grid(grid: &JsValue) {
    destroyGrid(grid);
}

/// Resolve after `ms` milliseconds on the UI thread's timer queue
pub async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window().map(|window| {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
        });
        if !matches!(scheduled, Some(Ok(_))) {
            // No timer available; resolve right away rather than hang.
            let _ = resolve.call0(&JsValue::NULL);
        }
    });

    if let Err(e) = JsFuture::from(promise).await {
        log::warn!("Timer failed: {}", describe(&e));
    }
}
