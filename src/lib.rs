/// Swipe Cards - a swipeable card stack widget for notebook and dashboard hosts
/// Built with Rust + WASM + Yew

mod bridge;
pub mod card;
mod error;
pub mod highlight;
pub mod stack;
pub mod theme;
pub mod ui;

use std::rc::Rc;

use serde::Deserialize;
use wasm_bindgen::prelude::*;
use web_sys::Element;
use yew::{AppHandle, Callback};

use crate::card::{RenderArgs, FRAME_HEIGHT_CARDS};
use crate::stack::SwipeResults;
use crate::theme::{ThemeSetting, ThemeWatcher};
use crate::ui::{SwipeDeck, SwipeDeckProps};

pub use error::WidgetError;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Settings fixed at mount time
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct WidgetConfig {
    #[serde(default)]
    pub theme: ThemeSetting,
}

impl WidgetConfig {
    fn from_js(value: JsValue) -> Result<WidgetConfig, WidgetError> {
        if value.is_undefined() || value.is_null() {
            return Ok(WidgetConfig::default());
        }
        Ok(serde_wasm_bindgen::from_value(value)?)
    }
}

/// A mounted widget. Owns its root element, the Yew app rendered into it
/// and, for the `auto` theme, the listeners that keep the theme current.
#[wasm_bindgen]
pub struct SwipeCards {
    root: Element,
    theme: ThemeSetting,
    app: Option<AppHandle<SwipeDeck>>,
    watcher: Option<ThemeWatcher>,
}

#[wasm_bindgen]
impl SwipeCards {
    /// Replace the contents with a fresh deck built from host render args
    pub fn render(&mut self, args: JsValue) -> Result<(), JsValue> {
        let args: RenderArgs = serde_wasm_bindgen::from_value(args).map_err(WidgetError::from)?;
        self.render_args(args);
        Ok(())
    }

    /// Change notification from the host: `auto`, `light` or `dark`
    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&mut self, setting: &str) -> Result<(), JsValue> {
        self.theme = setting.parse()?;
        self.sync_theme();
        Ok(())
    }

    /// Tear down the app and every listener
    pub fn destroy(mut self) {
        self.unmount();
        self.watcher = None;
    }
}

impl SwipeCards {
    fn new(root: Element, config: WidgetConfig) -> SwipeCards {
        SwipeCards {
            root,
            theme: config.theme,
            app: None,
            watcher: None,
        }
    }

    pub fn render_args(&mut self, args: RenderArgs) {
        let args = Rc::new(args);
        log::info!(
            "Rendering {} cards in {:?} mode",
            args.cards.len(),
            args.display_mode
        );

        self.sync_theme();
        self.unmount();

        let props = SwipeDeckProps {
            args: args.clone(),
            on_results: Callback::from(|results: SwipeResults| {
                if let Err(e) = bridge::send_results(&results) {
                    log::error!("Could not send results: {}", e);
                }
            }),
        };
        self.app = Some(yew::Renderer::<SwipeDeck>::with_root_and_props(self.root.clone(), props).render());

        if !args.cards.is_empty() {
            if let Err(e) = bridge::set_frame_height(args.frame_height()) {
                log::warn!("Could not set frame height: {}", e);
            }
        }
    }

    fn sync_theme(&mut self) {
        theme::refresh(self.theme);
        match self.theme {
            ThemeSetting::Auto => {
                if self.watcher.is_none() {
                    self.watcher = Some(ThemeWatcher::start());
                }
            }
            ThemeSetting::Light | ThemeSetting::Dark => self.watcher = None,
        }
    }

    fn unmount(&mut self) {
        if let Some(app) = self.app.take() {
            app.destroy();
        }
        self.root.set_inner_html("");
    }
}

/// Mount a widget into `root` and render `args` right away
#[wasm_bindgen]
pub fn mount(root: Element, args: JsValue, config: JsValue) -> Result<SwipeCards, JsValue> {
    let mut widget = SwipeCards::new(root, WidgetConfig::from_js(config)?);
    widget.render(args)?;
    Ok(widget)
}

/// Drive a widget from the host's render events
///
/// The widget lives inside the render callback for the life of the page.
#[wasm_bindgen]
pub fn run(root_id: &str, config: JsValue) -> Result<(), JsValue> {
    let config = WidgetConfig::from_js(config)?;
    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(root_id))
        .ok_or(WidgetError::Missing("root element"))?;

    let mut widget = SwipeCards::new(root, config);
    let on_render = Closure::<dyn FnMut(JsValue)>::new(move |args: JsValue| {
        if let Err(e) = widget.render(args) {
            log::error!("Render failed: {}", error::describe(&e));
        }
    });
    bridge::on_render(on_render.as_ref().unchecked_ref())?;
    on_render.forget();

    bridge::set_frame_height(FRAME_HEIGHT_CARDS)?;
    Ok(())
}
