//! Shared protocol types for traffic between the host page and the two
//! sandboxed editor contexts (command execution and view rendering).
//!
//! Every message is a JSON [`Envelope`] carrying the context handle it is
//! addressed to (host to sandbox) or originated from (sandbox to host), and a
//! [`Payload`] tagged by its `type` field.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque identifier the host platform issues per sandboxed context instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextHandle(String);

impl ContextHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContextHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ContextHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Direction of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Host to sandbox
    Message,
    /// Sandbox to host
    Event,
}

/// The unit of all cross-context traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Target context for messages, originating context for events.
    pub context: ContextHandle,
    pub kind: MessageKind,
    pub payload: Payload,
}

impl Envelope {
    /// A host-to-sandbox message.
    pub fn to_sandbox(context: ContextHandle, payload: Payload) -> Self {
        Self {
            context,
            kind: MessageKind::Message,
            payload,
        }
    }

    /// A sandbox-to-host event.
    pub fn to_host(context: ContextHandle, payload: Payload) -> Self {
        Self {
            context,
            kind: MessageKind::Event,
            payload,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(frame: &str) -> serde_json::Result<Self> {
        serde_json::from_str(frame)
    }
}

/// Message bodies, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Payload {
    /// Run instruction text in the execution sandbox. Answered by `onCommandReturn`.
    ExecuteCommand { id: u64, command: String },

    /// Mount a view in the rendering sandbox. Answered by `onCommandReturn`.
    ExecuteRender(RenderPayload),

    /// Call a method registered in the rendered view. Answered by `onCommandReturn`.
    Invoke {
        id: u64,
        name: String,
        #[serde(default)]
        args: Vec<Value>,
    },

    /// Reply to `executeCommand`, `executeRender` or `invoke`.
    OnCommandReturn(Reply),

    /// Service call from the rendered view to the host. Answered by `onActionReturn`.
    OnPluginAction {
        id: u64,
        name: String,
        #[serde(default)]
        args: Vec<Value>,
    },

    /// Reply to `onPluginAction`.
    OnActionReturn(Reply),

    /// A sandbox finished loading.
    OnPluginReady(ContextInfo),

    /// A sandbox is unloading.
    OnPluginClose,

    /// The document has unsaved changes.
    OnChanged,

    /// The document was saved.
    OnSaved,

    OnSheetsChanged(SheetsInfo),

    OnActiveSheetChanged(SheetsInfo),

    /// The editor produced a download URL for the document.
    OnDownloadUrl { url: String },

    /// The editor produced a print URL for the document.
    OnPrintUrl {
        url: String,
        #[serde(rename = "downloadType")]
        download_type: String,
    },

    /// Propagate the debug flag into a sandbox.
    SetDebug { debug: String },

    /// Sent to the execution sandbox once it is ready.
    Initialize(InitializeOptions),

    /// Start a download of the (rewritten) URL.
    Download { url: String },

    /// Print the (rewritten) URL.
    Print {
        url: String,
        #[serde(rename = "downloadType")]
        download_type: String,
    },
}

impl Payload {
    /// The `type` tag, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Payload::ExecuteCommand { .. } => "executeCommand",
            Payload::ExecuteRender(_) => "executeRender",
            Payload::Invoke { .. } => "invoke",
            Payload::OnCommandReturn(_) => "onCommandReturn",
            Payload::OnPluginAction { .. } => "onPluginAction",
            Payload::OnActionReturn(_) => "onActionReturn",
            Payload::OnPluginReady(_) => "onPluginReady",
            Payload::OnPluginClose => "onPluginClose",
            Payload::OnChanged => "onChanged",
            Payload::OnSaved => "onSaved",
            Payload::OnSheetsChanged(_) => "onSheetsChanged",
            Payload::OnActiveSheetChanged(_) => "onActiveSheetChanged",
            Payload::OnDownloadUrl { .. } => "onDownloadUrl",
            Payload::OnPrintUrl { .. } => "onPrintUrl",
            Payload::SetDebug { .. } => "setDebug",
            Payload::Initialize(_) => "initialize",
            Payload::Download { .. } => "download",
            Payload::Print { .. } => "print",
        }
    }

    /// Request or reply id, when the payload carries one.
    pub fn id(&self) -> Option<u64> {
        match self {
            Payload::ExecuteCommand { id, .. }
            | Payload::Invoke { id, .. }
            | Payload::OnPluginAction { id, .. } => Some(*id),
            Payload::ExecuteRender(render) => Some(render.id),
            Payload::OnCommandReturn(reply) | Payload::OnActionReturn(reply) => Some(reply.id),
            _ => None,
        }
    }
}

/// Error details carried by a failed [`Reply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    pub message: String,
}

/// Outcome of a correlated request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
}

impl Reply {
    pub fn ok(id: u64, data: Value) -> Self {
        Self {
            id,
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(id: u64, message: impl Into<String>) -> Self {
        Self {
            id,
            success: false,
            data: None,
            error: Some(RemoteError {
                message: message.into(),
            }),
        }
    }

    /// Build a reply from a handler result.
    pub fn from_result(id: u64, result: Result<Value, String>) -> Self {
        match result {
            Ok(data) => Reply::ok(id, data),
            Err(message) => Reply::err(id, message),
        }
    }

    /// Data on success (null when absent), the error message otherwise.
    pub fn into_result(self) -> Result<Value, String> {
        if self.success {
            Ok(self.data.unwrap_or(Value::Null))
        } else {
            Err(self
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "unknown error".to_string()))
        }
    }
}

/// HTML attributes of a `<link>`, `<style>` or `<script>` element.
pub type Attributes = BTreeMap<String, String>;

/// A style or script resource for the rendered view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resource {
    /// Inline source text
    Inline(String),
    /// An element with attributes and optional inline body
    Element {
        /// Append to `<head>` instead of the view container
        #[serde(default, skip_serializing_if = "is_false")]
        head: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        html: Option<String>,
        #[serde(flatten)]
        attrs: Attributes,
    },
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Where the view is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IframeTarget {
    /// Render the template into an iframe
    Enabled(bool),
    /// Load this URL into an iframe
    Url(String),
}

/// View definition shipped into the rendering sandbox.
///
/// Methods and services travel by name only: each side resolves names
/// against its own registered handlers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPayload {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// View methods the host may `invoke`
    #[serde(default)]
    pub methods: Vec<String>,
    /// Host services the view may call, with their declared parameter names
    #[serde(default)]
    pub services: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub link: Vec<Attributes>,
    #[serde(default)]
    pub style: Vec<Resource>,
    #[serde(default)]
    pub script: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iframe: Option<IframeTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xhr: Option<bool>,
}

/// Sheet list snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SheetsInfo {
    #[serde(default)]
    pub sheets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
}

/// Data announced with `onPluginReady`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
    #[serde(default)]
    pub sheets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
}

/// Whether a URL notification is intercepted or redirected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UrlTarget {
    /// Report generated URLs back to the host
    Intercept(bool),
    /// Always use this URL
    Fixed(String),
}

/// Settings pushed to the execution sandbox after it signals readiness.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
    #[serde(default)]
    pub download_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<UrlTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_url: Option<UrlTarget>,
}
