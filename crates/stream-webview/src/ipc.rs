//! IPC protocol between the bridge and the embedded flow content.
//!
//! Messages flow in both directions:
//! - **Content -> Rust**: the page calls `window.stream.ipc.send(kind, payload)`,
//!   which posts `{"kind": ..., "payload": ...}` through `window.ipc.postMessage`.
//! - **Rust -> Content**: Rust evaluates `window.stream.ipc._dispatch(kind, payload)`
//!   in the page.
//!
//! The page never talks to Rust synchronously. The SCORM-style API object it
//! sees (`window.API_1484_11`) is a local shim that answers from a cached copy
//! of the flow and forwards every call over IPC.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stream_common::{BridgeError, ContentSize};

use crate::backend::ContentOptions;

/// A typed IPC message from the content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcMessage {
    /// The message type / command name.
    pub kind: String,
    /// The message payload (arbitrary JSON).
    #[serde(default)]
    pub payload: IpcPayload,
}

/// Payload of an IPC message: either a simple string or structured JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IpcPayload {
    Text(String),
    Json(Value),
    #[default]
    None,
}

impl IpcMessage {
    /// Parse an IPC message from a raw JSON string (from JS postMessage).
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Create a simple text message.
    pub fn text(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: IpcPayload::Text(text.into()),
        }
    }

    /// Create a JSON message.
    pub fn json(kind: impl Into<String>, value: Value) -> Self {
        Self {
            kind: kind.into(),
            payload: IpcPayload::Json(value),
        }
    }
}

// =============================================================================
// CONTENT MESSAGES
// =============================================================================

/// Message kinds the content is allowed to send.
pub const ALLOWED_IPC_KINDS: &[&str] = &["scorm", "flow_changed", "measured", "console"];

/// Check whether an IPC message kind is in the allowlist.
pub fn is_ipc_kind_allowed(kind: &str) -> bool {
    ALLOWED_IPC_KINDS.contains(&kind)
}

/// One call on the SCORM-style API surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScormCall {
    Initialize,
    Terminate,
    Commit,
    GetValue(String),
    SetValue(String, String),
    GetLastError,
    GetErrorString(String),
    GetDiagnostic(String),
}

impl ScormCall {
    /// Build a call from its SCORM method name and string arguments.
    pub fn from_parts(method: &str, args: &[String]) -> Option<Self> {
        let arg = |i: usize| args.get(i).cloned().unwrap_or_default();
        let call = match method {
            "Initialize" => Self::Initialize,
            "Terminate" => Self::Terminate,
            "Commit" => Self::Commit,
            "GetValue" => Self::GetValue(arg(0)),
            "SetValue" => Self::SetValue(arg(0), arg(1)),
            "GetLastError" => Self::GetLastError,
            "GetErrorString" => Self::GetErrorString(arg(0)),
            "GetDiagnostic" => Self::GetDiagnostic(arg(0)),
            _ => return None,
        };
        Some(call)
    }
}

/// A decoded message from the content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentMessage {
    Scorm(ScormCall),
    /// The edit callback fired with the latest serialized flow.
    FlowChanged(String),
    /// The content re-rendered and reports its intrinsic size.
    Measured(Result<ContentSize, BridgeError>),
    Console { level: String, message: String },
}

impl ContentMessage {
    /// Decode a raw message. Returns `None` for unknown kinds or malformed
    /// payloads; measurement problems decode to `Measured(Err(..))`.
    pub fn decode(msg: &IpcMessage) -> Option<Self> {
        match msg.kind.as_str() {
            "scorm" => {
                let IpcPayload::Json(value) = &msg.payload else {
                    return None;
                };
                let method = value.get("method")?.as_str()?;
                let args: Vec<String> = value
                    .get("args")
                    .and_then(Value::as_array)
                    .map(|a| a.iter().map(value_to_string).collect())
                    .unwrap_or_default();
                ScormCall::from_parts(method, &args).map(Self::Scorm)
            }
            "flow_changed" => match &msg.payload {
                IpcPayload::Text(s) => Some(Self::FlowChanged(s.clone())),
                IpcPayload::Json(Value::Null) | IpcPayload::None => None,
                IpcPayload::Json(v) => Some(Self::FlowChanged(v.to_string())),
            },
            "measured" => Some(Self::Measured(decode_measurement(&msg.payload))),
            "console" => {
                let (level, message) = match &msg.payload {
                    IpcPayload::Text(s) => ("log".to_string(), s.clone()),
                    IpcPayload::Json(v) => (
                        v.get("level")
                            .and_then(Value::as_str)
                            .unwrap_or("log")
                            .to_string(),
                        v.get("message").map(value_to_string).unwrap_or_default(),
                    ),
                    IpcPayload::None => return None,
                };
                Some(Self::Console { level, message })
            }
            _ => None,
        }
    }
}

fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn decode_measurement(payload: &IpcPayload) -> Result<ContentSize, BridgeError> {
    let IpcPayload::Json(value) = payload else {
        return Err(BridgeError::MeasurementUnavailable(
            "measurement payload is not an object".into(),
        ));
    };
    if let Some(reason) = value.get("error").and_then(Value::as_str) {
        return Err(BridgeError::MeasurementUnavailable(reason.to_string()));
    }
    let dim = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| BridgeError::MeasurementUnavailable(format!("missing or invalid {name}")))
    };
    Ok(ContentSize {
        width: dim("width")?,
        height: dim("height")?,
    })
}

// =============================================================================
// SCRIPTS
// =============================================================================

/// JavaScript snippet that sets up the IPC bridge and the SCORM API shim.
/// Injected as an initialization script after the bootstrap script.
pub const IPC_INIT_SCRIPT: &str = r#"
(function() {
    var stream = window.stream = window.stream || {};
    var send = function(kind, payload) {
        window.ipc.postMessage(JSON.stringify({
            kind: kind,
            payload: payload === undefined ? null : payload
        }));
    };
    stream.ipc = {
        send: send,
        _handlers: {},
        on: function(kind, callback) {
            this._handlers[kind] = callback;
        },
        _dispatch: function(kind, payload) {
            var handler = this._handlers[kind];
            if (handler) {
                handler(payload);
            }
        }
    };

    var scorm = function(method, args) {
        send('scorm', { method: method, args: args || [] });
        return 'true';
    };
    window.API_1484_11 = {
        Initialize: function(x) { return scorm('Initialize', [x || '']); },
        Terminate: function(x) { return scorm('Terminate', [x || '']); },
        Commit: function(x) { return scorm('Commit', [x || '']); },
        GetValue: function(key) {
            return key === 'flowchart' ? (stream.flow || '') : '';
        },
        SetValue: function(key, value) {
            if (key === 'flowchart') { stream.flow = value; }
            return scorm('SetValue', [key, value]);
        },
        GetLastError: function() { return '0'; },
        GetErrorString: function() { return 'No Error'; },
        GetDiagnostic: function() { return 'No Error'; }
    };

    var outer = function() {
        return document.getElementById('outer') || document.body;
    };
    var measure = function() {
        var svg = outer() && outer().getElementsByTagName('svg')[0];
        if (!svg) {
            send('measured', { error: 'no svg element' });
            return;
        }
        try {
            send('measured', {
                width: svg.width.baseVal.value,
                height: svg.height.baseVal.value
            });
        } catch (e) {
            send('measured', { error: String(e) });
        }
    };
    stream.rendered = measure;

    // The flow widget calls window.install(flow, callback) and invokes the
    // callback with the new serialized flow after every edit.
    window.install = window.install || function() {};
    stream.install = function(install) {
        install(stream.flow || '', function(data) {
            stream.flow = data;
            send('flow_changed', data);
            window.requestAnimationFrame(measure);
        });
        window.requestAnimationFrame(measure);
    };

    stream.ipc.on('zoom', function(z) {
        if (outer()) { outer().style.zoom = String(z); }
    });

    ['log', 'info', 'warn', 'error'].forEach(function(level) {
        var original = console[level];
        console[level] = function() {
            var message = Array.prototype.map.call(arguments, String).join(' ');
            send('console', { level: level, message: message });
            if (original) { original.apply(console, arguments); }
        };
    });

    window.addEventListener('DOMContentLoaded', function() {
        var el = outer();
        var options = stream.options || {};
        if (el && el.classList) {
            el.classList.toggle('readonly', !!options.readonly);
            el.classList.toggle('noname', !!options.noTitle);
        }
        if (typeof window.install === 'function') {
            stream.install(window.install);
        }
    });
})();
"#;

/// Script exposing the starting flow and content options to the page.
/// Runs before `IPC_INIT_SCRIPT` and before any page script.
pub fn bootstrap_script(flow: &str, options: &ContentOptions) -> String {
    let flow_json = serde_json::to_string(flow).unwrap_or_else(|_| "\"\"".to_string());
    let options_json = serde_json::to_string(options).unwrap_or_else(|_| "{}".to_string());
    format!(
        "window.stream = window.stream || {{}};\nwindow.stream.flow = {flow_json};\nwindow.stream.options = {options_json};\n"
    )
}

/// Generate a JS snippet that dispatches a message to the content's handler table.
pub fn js_dispatch_message(kind: &str, payload: &Value) -> String {
    let payload_json = serde_json::to_string(payload).unwrap_or_else(|_| "null".to_string());
    format!(
        "window.stream && window.stream.ipc && window.stream.ipc._dispatch({}, {});",
        serde_json::to_string(kind).unwrap_or_else(|_| "\"unknown\"".to_string()),
        payload_json,
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(raw: &str) -> Option<ContentMessage> {
        IpcMessage::from_json(raw).as_ref().and_then(ContentMessage::decode)
    }

    #[test]
    fn ipc_kind_allowlist() {
        assert!(is_ipc_kind_allowed("scorm"));
        assert!(is_ipc_kind_allowed("flow_changed"));
        assert!(!is_ipc_kind_allowed("eval"));
        assert!(!is_ipc_kind_allowed("SCORM"));
        assert!(!is_ipc_kind_allowed(""));
    }

    #[test]
    fn decodes_scorm_set_value() {
        let msg = decode(
            r#"{"kind":"scorm","payload":{"method":"SetValue","args":["flowchart","{\"n\":1}"]}}"#,
        );
        assert_eq!(
            msg,
            Some(ContentMessage::Scorm(ScormCall::SetValue(
                "flowchart".into(),
                "{\"n\":1}".into()
            )))
        );
    }

    #[test]
    fn decodes_scorm_without_args() {
        let msg = decode(r#"{"kind":"scorm","payload":{"method":"Terminate"}}"#);
        assert_eq!(msg, Some(ContentMessage::Scorm(ScormCall::Terminate)));
    }

    #[test]
    fn unknown_scorm_method_is_rejected() {
        assert_eq!(
            decode(r#"{"kind":"scorm","payload":{"method":"Explode","args":[]}}"#),
            None
        );
    }

    #[test]
    fn decodes_flow_changed_text_and_object() {
        assert_eq!(
            decode(r#"{"kind":"flow_changed","payload":"{\"a\":1}"}"#),
            Some(ContentMessage::FlowChanged("{\"a\":1}".into()))
        );
        assert_eq!(
            decode(r#"{"kind":"flow_changed","payload":{"a":1}}"#),
            Some(ContentMessage::FlowChanged("{\"a\":1}".into()))
        );
        assert_eq!(decode(r#"{"kind":"flow_changed","payload":null}"#), None);
    }

    #[test]
    fn decodes_measurement() {
        assert_eq!(
            decode(r#"{"kind":"measured","payload":{"width":812.5,"height":300}}"#),
            Some(ContentMessage::Measured(Ok(ContentSize {
                width: 812.5,
                height: 300.0
            })))
        );
    }

    #[test]
    fn broken_measurement_is_unavailable() {
        for raw in [
            r#"{"kind":"measured","payload":{"error":"no svg element"}}"#,
            r#"{"kind":"measured","payload":{"width":800}}"#,
            r#"{"kind":"measured","payload":{"width":"wide","height":3}}"#,
            r#"{"kind":"measured","payload":{"width":-1,"height":3}}"#,
            r#"{"kind":"measured","payload":"800x600"}"#,
        ] {
            match decode(raw) {
                Some(ContentMessage::Measured(Err(BridgeError::MeasurementUnavailable(_)))) => {}
                other => panic!("{raw} decoded to {other:?}"),
            }
        }
    }

    #[test]
    fn decodes_console() {
        assert_eq!(
            decode(r#"{"kind":"console","payload":{"level":"error","message":"boom"}}"#),
            Some(ContentMessage::Console {
                level: "error".into(),
                message: "boom".into()
            })
        );
    }

    #[test]
    fn message_without_payload_parses() {
        let msg = IpcMessage::from_json(r#"{"kind":"flow_changed"}"#).unwrap();
        assert!(matches!(msg.payload, IpcPayload::None));
    }

    #[test]
    fn bootstrap_script_escapes_flow() {
        let script = bootstrap_script(
            "{\"label\":\"</script>\"}",
            &ContentOptions {
                read_only: true,
                hide_title: false,
            },
        );
        assert!(script.contains(r#"window.stream.flow = "{\"label\":\"</script>\"}";"#));
        assert!(script.contains(r#""readonly":true"#));
        assert!(script.contains(r#""noTitle":false"#));
    }

    #[test]
    fn dispatch_message_quotes_kind() {
        let js = js_dispatch_message("zoom", &json!(0.5));
        assert!(js.ends_with("_dispatch(\"zoom\", 0.5);"));
    }

    #[test]
    fn init_script_installs_scorm_shim() {
        assert!(IPC_INIT_SCRIPT.contains("window.API_1484_11"));
        assert!(IPC_INIT_SCRIPT.contains("'flow_changed'"));
        assert!(IPC_INIT_SCRIPT.contains("'measured'"));
    }
}
