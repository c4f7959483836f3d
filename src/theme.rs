/// Light/dark theme selection
///
/// Detection works on a `ThemeProbe`, a snapshot of what the embedding
/// document exposes. Gathering the snapshot and applying the result are the
/// only parts that touch the DOM.
use std::cell::Cell;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, MediaQueryList, MutationObserver, MutationObserverInit, Window};

use crate::bridge;
use crate::error::{describe, WidgetError};

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";
const APP_CONTAINER: &str =
    ".stApp, .main, [data-testid=\"stAppViewContainer\"], .css-1d391kg, .css-fg4pbf";
const OBSERVED_CONTAINER: &str = ".stApp, .main, [data-testid=\"stAppViewContainer\"]";
/// Background colors the host uses for its dark themes
const KNOWN_DARK_BACKGROUNDS: [&str; 3] = ["14, 17, 23", "38, 39, 48", "11, 11, 11"];
/// Parent mutations are re-probed after this delay
const REPROBE_DELAY_MS: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSetting {
    #[default]
    Auto,
    Light,
    Dark,
}

impl FromStr for ThemeSetting {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "" => Ok(ThemeSetting::Auto),
            "light" => Ok(ThemeSetting::Light),
            "dark" => Ok(ThemeSetting::Dark),
            other => Err(WidgetError::UnknownTheme(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn body_class(&self) -> &'static str {
        match self {
            Theme::Light => "light-theme",
            Theme::Dark => "dark-theme",
        }
    }
}

/// What the embedding document tells us about its theme
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeProbe {
    pub data_theme: Option<String>,
    pub root_classes: Vec<String>,
    pub body_classes: Vec<String>,
    pub app_background: Option<String>,
    pub color_scheme: Option<String>,
}

/// Walk the detection chain over a probe
///
/// 1. an explicit `data-theme` attribute on the root element
/// 2. `dark` / `dark-theme` class names on the root or body
/// 3. app container background brightness, then known dark backgrounds
/// 4. a `dark` computed `color-scheme`, whenever the above said light
pub fn detect(probe: &ThemeProbe) -> Theme {
    let has = |classes: &[String], name: &str| classes.iter().any(|c| c == name);

    let mut dark = if let Some(value) = &probe.data_theme {
        value == "dark"
    } else if has(&probe.root_classes, "dark")
        || has(&probe.body_classes, "dark-theme")
        || has(&probe.body_classes, "dark")
    {
        true
    } else if let Some(background) = &probe.app_background {
        match parse_rgb(background) {
            Some((r, g, b)) => brightness(r, g, b) < 128.0,
            None => KNOWN_DARK_BACKGROUNDS.iter().any(|c| background.contains(c)),
        }
    } else {
        false
    };

    if !dark {
        dark = probe.color_scheme.as_deref().map(str::trim) == Some("dark");
    }

    if dark { Theme::Dark } else { Theme::Light }
}

/// Parse an opaque `rgb(r, g, b)` color
pub fn parse_rgb(color: &str) -> Option<(u8, u8, u8)> {
    static RGB: OnceLock<Regex> = OnceLock::new();
    let re = RGB.get_or_init(|| {
        Regex::new(r"rgb\((\d+),\s*(\d+),\s*(\d+)\)").expect("valid rgb pattern")
    });

    let caps = re.captures(color)?;
    let channel = |i: usize| caps.get(i)?.as_str().parse::<u8>().ok();
    Some((channel(1)?, channel(2)?, channel(3)?))
}

/// Perceived brightness on a 0-255 scale
pub fn brightness(r: u8, g: u8, b: u8) -> f64 {
    (f64::from(r) * 299.0 + f64::from(g) * 587.0 + f64::from(b) * 114.0) / 1000.0
}

/// Pick a theme for a setting, probing the parent document for `Auto`
pub fn resolve(setting: ThemeSetting) -> Theme {
    match setting {
        ThemeSetting::Light => Theme::Light,
        ThemeSetting::Dark => Theme::Dark,
        ThemeSetting::Auto => match probe_parent() {
            Ok(probe) => detect(&probe),
            Err(e) => {
                log::info!("Theme detection fallback: {}", e);
                if prefers_dark() { Theme::Dark } else { Theme::Light }
            }
        },
    }
}

/// Resolve and apply in one go, logging instead of failing
pub fn refresh(setting: ThemeSetting) -> Theme {
    let theme = resolve(setting);
    if let Err(e) = apply(theme) {
        log::warn!("Could not apply theme: {}", e);
    }
    theme
}

/// Mark the local document with the chosen theme
pub fn apply(theme: Theme) -> Result<(), WidgetError> {
    let document = local_document()?;
    let root = document
        .document_element()
        .ok_or(WidgetError::Missing("document element"))?;
    root.set_attribute("data-theme", theme.as_str())
        .map_err(|e| WidgetError::Dom(describe(&e)))?;

    if let Some(body) = document.body() {
        body.set_class_name(theme.body_class());
    }

    log::info!("Applied theme: {}", theme.as_str());
    Ok(())
}

/// OS-level dark preference of the local window
pub fn prefers_dark() -> bool {
    dark_media_query().map(|mq| mq.matches()).unwrap_or(false)
}

/// Snapshot the parent document's theme signals
///
/// Fails when there is no parent or it is cross-origin.
pub fn probe_parent() -> Result<ThemeProbe, WidgetError> {
    let (parent, document) = parent_document()?;
    let root = document
        .document_element()
        .ok_or(WidgetError::Missing("parent document element"))?;

    let mut probe = ThemeProbe {
        data_theme: root.get_attribute("data-theme"),
        root_classes: class_names(&root),
        body_classes: document.body().map(|b| class_names(&b)).unwrap_or_default(),
        ..ThemeProbe::default()
    };

    if let Ok(Some(app)) = document.query_selector(APP_CONTAINER) {
        probe.app_background = computed_property(&parent, &app, "background-color");
    }
    probe.color_scheme = computed_property(&parent, &root, "color-scheme");

    Ok(probe)
}

/// Liveness flag shared between a watcher and its deferred re-probes
#[derive(Debug, Clone)]
struct WatchGuard(Rc<Cell<bool>>);

impl WatchGuard {
    fn new() -> WatchGuard {
        WatchGuard(Rc::new(Cell::new(true)))
    }

    fn is_live(&self) -> bool {
        self.0.get()
    }

    fn revoke(&self) {
        self.0.set(false);
    }

    /// Re-detect after `delay_ms` unless the watcher was dropped meanwhile
    async fn reprobe_after(self, delay_ms: i32) {
        bridge::sleep(delay_ms).await;
        if self.is_live() {
            refresh(ThemeSetting::Auto);
        }
    }
}

/// Keeps an `Auto` theme in sync with the OS and the parent document
///
/// Listeners are removed when the watcher is dropped, and re-probes still
/// waiting on their delay are discarded.
pub struct ThemeWatcher {
    guard: WatchGuard,
    media: Option<MediaQueryList>,
    on_media_change: Closure<dyn FnMut(web_sys::Event)>,
    observer: Option<MutationObserver>,
    _on_mutation: Option<Closure<dyn FnMut(js_sys::Array, MutationObserver)>>,
}

impl ThemeWatcher {
    pub fn start() -> ThemeWatcher {
        let guard = WatchGuard::new();
        let on_media_change = {
            let guard = guard.clone();
            Closure::<dyn FnMut(web_sys::Event)>::new(move |_| {
                if guard.is_live() {
                    refresh(ThemeSetting::Auto);
                }
            })
        };

        let media = dark_media_query();
        if let Some(mq) = &media {
            if let Err(e) = mq.add_event_listener_with_callback(
                "change",
                on_media_change.as_ref().unchecked_ref(),
            ) {
                log::warn!("Could not watch color scheme: {}", describe(&e));
            }
        }

        let (observer, on_mutation) = match observe_parent(&guard) {
            Ok((observer, callback)) => (Some(observer), Some(callback)),
            Err(e) => {
                log::info!("Could not set up theme monitoring: {}", e);
                (None, None)
            }
        };

        ThemeWatcher {
            guard,
            media,
            on_media_change,
            observer,
            _on_mutation: on_mutation,
        }
    }
}

impl Drop for ThemeWatcher {
    fn drop(&mut self) {
        self.guard.revoke();
        if let Some(mq) = &self.media {
            let _ = mq.remove_event_listener_with_callback(
                "change",
                self.on_media_change.as_ref().unchecked_ref(),
            );
        }
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
    }
}

type MutationCallback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

fn observe_parent(guard: &WatchGuard) -> Result<(MutationObserver, MutationCallback), WidgetError> {
    let (_, document) = parent_document()?;

    let guard = guard.clone();
    let callback = MutationCallback::new(move |_records, _observer| {
        wasm_bindgen_futures::spawn_local(guard.clone().reprobe_after(REPROBE_DELAY_MS));
    });
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
        .map_err(|e| WidgetError::Dom(describe(&e)))?;

    let watch = |target: &Element, attributes: &[&str]| -> Result<(), WidgetError> {
        let filter: js_sys::Array = attributes.iter().map(|a| JsValue::from_str(a)).collect();
        let init = MutationObserverInit::new();
        init.set_attributes(true);
        init.set_attribute_filter(&filter);
        observer
            .observe_with_options(target, &init)
            .map_err(|e| WidgetError::Dom(describe(&e)))
    };

    if let Some(root) = document.document_element() {
        watch(&root, &["class", "data-theme", "style"])?;
    }
    if let Some(body) = document.body() {
        watch(&body, &["class", "style"])?;
    }
    if let Ok(Some(app)) = document.query_selector(OBSERVED_CONTAINER) {
        watch(&app, &["style", "class"])?;
    }

    Ok((observer, callback))
}

fn local_document() -> Result<Document, WidgetError> {
    web_sys::window()
        .ok_or(WidgetError::Missing("window"))?
        .document()
        .ok_or(WidgetError::Missing("document"))
}

fn dark_media_query() -> Option<MediaQueryList> {
    web_sys::window()?.match_media(DARK_QUERY).ok().flatten()
}

/// The parent window and its document, read through `Reflect` so a
/// cross-origin parent yields an error instead of a trap
///
/// A top-level page is its own parent; that counts as having none, since
/// the local document only carries the theme this module applied.
fn parent_document() -> Result<(Window, Document), WidgetError> {
    let window = web_sys::window().ok_or(WidgetError::Missing("window"))?;
    let parent = window
        .parent()
        .map_err(|e| WidgetError::ParentInaccessible(describe(&e)))?
        .filter(|parent| parent != &window)
        .ok_or(WidgetError::Missing("parent window"))?;

    let document = js_sys::Reflect::get(&parent, &JsValue::from_str("document"))
        .map_err(|e| WidgetError::ParentInaccessible(describe(&e)))?
        .dyn_into::<Document>()
        .map_err(|_| WidgetError::Missing("parent document"))?;

    Ok((parent, document))
}

fn class_names(element: &Element) -> Vec<String> {
    element
        .class_name()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn computed_property(window: &Window, element: &Element, property: &str) -> Option<String> {
    let style = window.get_computed_style(element).ok()??;
    style
        .get_property_value(property)
        .ok()
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_data_theme_attribute_wins() {
        let probe = ThemeProbe {
            data_theme: Some("dark".to_string()),
            app_background: Some("rgb(255, 255, 255)".to_string()),
            ..ThemeProbe::default()
        };
        assert_eq!(detect(&probe), Theme::Dark);

        let probe = ThemeProbe {
            data_theme: Some("light".to_string()),
            body_classes: classes(&["dark"]),
            ..ThemeProbe::default()
        };
        assert_eq!(detect(&probe), Theme::Light);
    }

    #[test]
    fn test_class_names() {
        for probe in [
            ThemeProbe { root_classes: classes(&["app", "dark"]), ..ThemeProbe::default() },
            ThemeProbe { body_classes: classes(&["dark-theme"]), ..ThemeProbe::default() },
            ThemeProbe { body_classes: classes(&["dark"]), ..ThemeProbe::default() },
        ] {
            assert_eq!(detect(&probe), Theme::Dark);
        }

        let probe = ThemeProbe {
            root_classes: classes(&["darkish"]),
            ..ThemeProbe::default()
        };
        assert_eq!(detect(&probe), Theme::Light);
    }

    #[test]
    fn test_background_brightness() {
        let probe = ThemeProbe {
            app_background: Some("rgb(14, 17, 23)".to_string()),
            ..ThemeProbe::default()
        };
        assert_eq!(detect(&probe), Theme::Dark);

        let probe = ThemeProbe {
            app_background: Some("rgb(255, 255, 255)".to_string()),
            ..ThemeProbe::default()
        };
        assert_eq!(detect(&probe), Theme::Light);
    }

    #[test]
    fn test_known_dark_background_without_rgb_match() {
        let probe = ThemeProbe {
            app_background: Some("rgba(38, 39, 48, 1)".to_string()),
            ..ThemeProbe::default()
        };
        assert_eq!(detect(&probe), Theme::Dark);

        let probe = ThemeProbe {
            app_background: Some("rgba(0, 0, 0, 0)".to_string()),
            ..ThemeProbe::default()
        };
        assert_eq!(detect(&probe), Theme::Light);
    }

    #[test]
    fn test_color_scheme_overrides_light() {
        let probe = ThemeProbe {
            data_theme: Some("light".to_string()),
            color_scheme: Some("dark".to_string()),
            ..ThemeProbe::default()
        };
        assert_eq!(detect(&probe), Theme::Dark);

        let probe = ThemeProbe {
            color_scheme: Some("light dark".to_string()),
            ..ThemeProbe::default()
        };
        assert_eq!(detect(&probe), Theme::Light);
    }

    #[test]
    fn test_empty_probe_is_light() {
        assert_eq!(detect(&ThemeProbe::default()), Theme::Light);
    }

    #[test]
    fn test_parse_rgb() {
        assert_eq!(parse_rgb("rgb(1, 2, 3)"), Some((1, 2, 3)));
        assert_eq!(parse_rgb("rgb(255,255,255)"), Some((255, 255, 255)));
        assert_eq!(parse_rgb("rgb(300, 0, 0)"), None);
        assert_eq!(parse_rgb("#ffffff"), None);
    }

    #[test]
    fn test_brightness() {
        assert_eq!(brightness(0, 0, 0), 0.0);
        assert_eq!(brightness(255, 255, 255), 255.0);
        assert!(brightness(14, 17, 23) < 128.0);
    }

    #[test]
    fn test_theme_setting_from_str() {
        assert_eq!("dark".parse::<ThemeSetting>().unwrap(), ThemeSetting::Dark);
        assert_eq!(" Light ".parse::<ThemeSetting>().unwrap(), ThemeSetting::Light);
        assert_eq!("".parse::<ThemeSetting>().unwrap(), ThemeSetting::Auto);
        assert!("sepia".parse::<ThemeSetting>().is_err());
    }

    #[test]
    fn test_watch_guard_revoke_reaches_clones() {
        let guard = WatchGuard::new();
        let pending = guard.clone();
        assert!(pending.is_live());

        guard.revoke();
        assert!(!pending.is_live());
        assert!(!guard.is_live());
    }

    #[test]
    fn test_theme_names() {
        assert_eq!(Theme::Dark.as_str(), "dark");
        assert_eq!(Theme::Light.body_class(), "light-theme");
    }
}
