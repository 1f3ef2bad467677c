use embedbridge_transport::TransportError;
use wasm_bindgen::JsValue;

pub(crate) fn to_js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&format!("{context}: {err}")).into()
}

/// Describe a value thrown by the browser.
pub(crate) fn describe(thrown: &JsValue) -> String {
    if let Some(text) = thrown.as_string() {
        return text;
    }
    js_sys::JSON::stringify(thrown)
        .ok()
        .and_then(|text| text.as_string())
        .unwrap_or_else(|| "unknown browser error".to_string())
}

pub(crate) fn rejected(thrown: JsValue) -> TransportError {
    TransportError::Rejected(describe(&thrown))
}
