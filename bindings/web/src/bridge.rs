use std::rc::Rc;

use embedbridge_frame::MessageKind;
use embedbridge_session::{Session, SessionConfig, SessionOptions};
use js_sys::Function;
use tracing::warn;
use wasm_bindgen::prelude::*;

use crate::convert::{js_to_json, json_to_js};
use crate::error::{describe, to_js_error};
use crate::host::WindowHost;

/// JS-facing bridge session for the current window.
#[wasm_bindgen]
pub struct EmbedBridge {
    session: Session,
}

#[wasm_bindgen]
impl EmbedBridge {
    /// `options` accepts `pageId`, `targetOrigin`, `allowWildcard` and
    /// `allowedOrigins`; pass `undefined` for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        options: JsValue,
        on_ready: Option<Function>,
        on_error: Option<Function>,
    ) -> Result<EmbedBridge, JsValue> {
        let options: SessionOptions = if options.is_undefined() || options.is_null() {
            SessionOptions::default()
        } else {
            serde_json::from_value(js_to_json(&options))
                .map_err(|err| to_js_error("invalid options", err))?
        };
        let host =
            WindowHost::new().ok_or_else(|| to_js_error("init failed", "no window context"))?;

        let mut config = SessionConfig::from_options(options);
        if let Some(on_ready) = on_ready {
            config = config.on_ready(move || {
                if let Err(thrown) = on_ready.call0(&JsValue::NULL) {
                    warn!(error = %describe(&thrown), "onReady callback threw");
                }
            });
        }
        if let Some(on_error) = on_error {
            config = config.on_error(move |err| {
                let arg = JsValue::from(js_sys::Error::new(&err.to_string()));
                if let Err(thrown) = on_error.call1(&JsValue::NULL, &arg) {
                    warn!(error = %describe(&thrown), "onError callback threw");
                }
            });
        }

        Ok(Self {
            session: Session::initialize(Rc::new(host), config),
        })
    }

    #[wasm_bindgen(getter, js_name = pageId)]
    pub fn page_id(&self) -> String {
        self.session.page_id().to_string()
    }

    #[wasm_bindgen(getter, js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.session.is_ready()
    }

    #[wasm_bindgen(js_name = sendData)]
    pub fn send_data(&self, data: JsValue, options: JsValue) {
        let options = match js_to_json(&options) {
            serde_json::Value::Object(options) => Some(options),
            _ => None,
        };
        self.session.send_data(&js_to_json(&data), options);
    }

    /// `kind` is one of `info`, `success`, `error`, `data`; defaults to `info`.
    #[wasm_bindgen(js_name = sendMessage)]
    pub fn send_message(&self, text: &str, kind: Option<String>) -> Result<(), JsValue> {
        let kind = match kind {
            Some(kind) => kind
                .parse::<MessageKind>()
                .map_err(|err| to_js_error("sendMessage failed", err))?,
            None => MessageKind::default(),
        };
        self.session.send_message(text, kind);
        Ok(())
    }

    pub fn resize(&self, height: u32) {
        self.session.resize(height);
    }

    #[wasm_bindgen(js_name = autoResize)]
    pub fn auto_resize(&self) -> u32 {
        self.session.auto_resize()
    }

    pub fn close(&self) {
        self.session.close();
    }

    /// Register `handler(params)` for `command`, replacing any earlier one.
    #[wasm_bindgen(js_name = onCommand)]
    pub fn on_command(&self, command: String, handler: Function) {
        let name = command.clone();
        self.session.on_command(command, move |params| {
            let result = json_to_js(params).and_then(|arg| handler.call1(&JsValue::NULL, &arg));
            if let Err(thrown) = result {
                warn!(command = %name, error = %describe(&thrown), "command handler threw");
            }
        });
    }

    /// Stop listening for host messages.
    pub fn teardown(&self) -> bool {
        self.session.teardown()
    }
}
