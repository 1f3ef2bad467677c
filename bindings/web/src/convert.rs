use serde_json::Value;
use wasm_bindgen::JsValue;

/// Convert a structured-clone value to JSON. Values JSON cannot express become `Null`.
pub(crate) fn js_to_json(value: &JsValue) -> Value {
    if value.is_undefined() {
        return Value::Null;
    }
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|text| text.as_string())
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or(Value::Null)
}

pub(crate) fn json_to_js(value: &Value) -> Result<JsValue, JsValue> {
    let text = serde_json::to_string(value)
        .map_err(|err| crate::error::to_js_error("encode failed", err))?;
    js_sys::JSON::parse(&text)
}
