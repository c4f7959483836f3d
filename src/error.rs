/// Error type for the widget's fallible DOM and bridge calls
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("invalid render arguments: {0}")]
    Args(#[from] serde_wasm_bindgen::Error),

    #[error("no {0} available")]
    Missing(&'static str),

    #[error("unknown theme setting '{0}'")]
    UnknownTheme(String),

    #[error("parent document is not accessible: {0}")]
    ParentInaccessible(String),

    #[error("DOM call failed: {0}")]
    Dom(String),

    #[error("host bridge call failed: {0}")]
    Bridge(String),

    #[error("grid construction failed: {0}")]
    Grid(String),
}

impl From<WidgetError> for JsValue {
    fn from(e: WidgetError) -> Self {
        js_sys::Error::new(&e.to_string()).into()
    }
}

/// Readable text for a thrown JS value
pub fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(err) => String::from(err.message()),
        None => format!("{:?}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(WidgetError::Missing("window").to_string(), "no window available");
        assert_eq!(
            WidgetError::UnknownTheme("sepia".to_string()).to_string(),
            "unknown theme setting 'sepia'"
        );
        assert_eq!(
            WidgetError::Grid("agGrid is not defined".to_string()).to_string(),
            "grid construction failed: agGrid is not defined"
        );
    }
}
