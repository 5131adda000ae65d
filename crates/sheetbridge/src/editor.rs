//! Host-side editor bridge.
//!
//! An [`Editor`] owns the connection state for one embedded document: which
//! sandbox is ready, what was rendered, the save/change flags, the pending
//! requests and the event registry. Outbound traffic goes through a
//! [`Transport`]; inbound frames are fed to [`Editor::dispatch`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use serde_json::Value;
use sheetbridge_protocol::{
    ContextHandle, ContextInfo, Envelope, InitializeOptions, Payload, Reply, SheetsInfo,
};
use sheetbridge_writer::Plan;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

use crate::config::{ContextRole, EditorConfig, EditorMode};
use crate::correlation::{Correlator, RequestKind, SettleHook};
use crate::deferred::Deferred;
use crate::error::{Error, Result};
use crate::events::EventRegistry;
use crate::services::{RenderConfig, Service};
use crate::transport::Transport;

const SHEET_NAMES: &str = "Api.GetSheets().map(function(sheet){return sheet.GetName();})";
const ACTIVE_SHEET: &str = "Api.GetActiveSheet().GetName()";

/// Event delivered to listeners.
#[derive(Clone)]
pub struct EditorEvent {
    pub name: String,
    pub data: Value,
    /// The editor that emitted the event
    pub target: Editor,
}

impl fmt::Debug for EditorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorEvent")
            .field("name", &self.name)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

/// Code to run in the execution sandbox.
#[derive(Debug, Clone, PartialEq)]
pub enum Code {
    /// A single instruction
    Command(String),
    /// Tasks run one after another, threading their results
    Plan(Plan),
}

impl From<String> for Code {
    fn from(command: String) -> Self {
        Code::Command(command)
    }
}

impl From<&str> for Code {
    fn from(command: &str) -> Self {
        Code::Command(command.to_string())
    }
}

impl From<Plan> for Code {
    fn from(plan: Plan) -> Self {
        Code::Plan(plan)
    }
}

#[derive(Debug)]
struct State {
    execution_ready: bool,
    view_ready: bool,
    rendered: bool,
    changed: bool,
    saved: bool,
    auto_sync: bool,
}

impl Default for State {
    /// A freshly opened document has nothing to save
    fn default() -> Self {
        Self {
            execution_ready: false,
            view_ready: false,
            rendered: false,
            changed: false,
            saved: true,
            auto_sync: false,
        }
    }
}

struct Inner {
    config: EditorConfig,
    transport: Arc<dyn Transport>,
    correlator: Correlator,
    events: EventRegistry<EditorEvent>,
    services: Mutex<HashMap<String, Service>>,
    methods: Mutex<Vec<String>>,
    state: Mutex<State>,
    ready: watch::Sender<bool>,
}

/// Handle to an embedded editor. Cheap to clone.
#[derive(Clone)]
pub struct Editor {
    inner: Arc<Inner>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("contexts", &self.inner.config.contexts)
            .field("pending", &self.inner.correlator.len())
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Create an editor posting through `transport`.
    ///
    /// Fails with [`Error::Config`] when the configuration is inconsistent.
    pub fn new(config: EditorConfig, transport: impl Transport + 'static) -> Result<Self> {
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: EditorConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let config = config.resolve()?;
        let events = EventRegistry::new();
        for (name, handler) in &config.handlers {
            events.set_handler(name, handler.clone());
        }
        let state = State {
            auto_sync: config.auto_sync.unwrap_or(false),
            ..State::default()
        };
        let (ready, _) = watch::channel(false);
        debug!(contexts = ?config.contexts, "editor created");

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                transport,
                correlator: Correlator::new(),
                events,
                services: Mutex::new(HashMap::new()),
                methods: Mutex::new(Vec::new()),
                state: Mutex::new(state),
                ready,
            }),
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.inner.config
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        lock(&self.inner.state)
    }

    fn timeout(&self, timeout: Option<Duration>) -> Option<Duration> {
        timeout.or(self.inner.config.default_timeout)
    }

    fn post(&self, role: ContextRole, payload: Payload) -> Result<()> {
        let context = self.inner.config.contexts.handle(role).clone();
        self.inner
            .transport
            .post(&Envelope::to_sandbox(context, payload))
    }

    /// Register a request, post it, and hand back its deferred
    fn request(
        &self,
        role: ContextRole,
        kind: RequestKind,
        label: &str,
        timeout: Option<Duration>,
        hook: Option<SettleHook>,
        payload: impl FnOnce(u64) -> Payload,
    ) -> Deferred {
        let context = self.inner.config.contexts.handle(role).clone();
        let (id, deferred) =
            match self
                .inner
                .correlator
                .register(context, kind, label, self.timeout(timeout), hook)
            {
                Ok(registered) => registered,
                Err(e) => return Deferred::rejected(e),
            };
        debug!(id, %kind, %role, "dispatching request");
        if let Err(e) = self.post(role, payload(id)) {
            self.inner.correlator.fail(id, e);
        }
        deferred
    }

    // ----- execution sandbox -----

    /// Run one instruction in the execution sandbox.
    pub fn execute_command(&self, command: &str, timeout: Option<Duration>) -> Deferred {
        if command.trim().is_empty() {
            return Deferred::rejected(Error::InvalidRequest("empty command".to_string()));
        }
        if !self.state().execution_ready {
            return Deferred::rejected(Error::NotReady(ContextRole::Execution));
        }
        let command = command.to_string();
        let label = command.clone();
        self.request(
            ContextRole::Execution,
            RequestKind::Command,
            &label,
            timeout,
            None,
            move |id| Payload::ExecuteCommand { id, command },
        )
    }

    /// Run the tasks of `plan` strictly in order.
    ///
    /// Each task is invoked with the value the previous one returned; the
    /// first failure stops the plan. Resolves with the last task's value.
    pub async fn run_plan(&self, plan: &Plan, timeout: Option<Duration>) -> Result<Value> {
        let mut accumulator: Option<Value> = None;
        for (step, task) in plan.iter().enumerate() {
            trace!(step, kind = ?task.kind(), "running plan task");
            let value = self
                .execute_command(&task.invoke(accumulator.as_ref()), timeout)
                .await?;
            accumulator = Some(value);
        }
        Ok(accumulator.unwrap_or(Value::Null))
    }

    /// Build code from `args` and run it.
    ///
    /// ```no_run
    /// # async fn demo(editor: sheetbridge::Editor) -> sheetbridge::Result<()> {
    /// use sheetbridge_writer::Document;
    ///
    /// editor
    ///     .execute_code(
    ///         |rows: Vec<f64>| {
    ///             let mut doc = Document::new();
    ///             let sheet = doc.sheet("Data");
    ///             for value in rows {
    ///                 sheet.row().number(value, None);
    ///             }
    ///             Ok(doc.build()?.into())
    ///         },
    ///         vec![1.0, 2.0],
    ///         None,
    ///     )
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute_code<A, F>(&self, f: F, args: A, timeout: Option<Duration>) -> Result<Value>
    where
        F: FnOnce(A) -> Result<Code>,
    {
        match f(args)? {
            Code::Command(command) => self.execute_command(&command, timeout).await,
            Code::Plan(plan) => self.run_plan(&plan, timeout).await,
        }
    }

    /// Names of every sheet in the document
    pub async fn get_sheet_names(&self, timeout: Option<Duration>) -> Result<Vec<String>> {
        let value = self.execute_command(SHEET_NAMES, timeout).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get_active_sheet(&self, timeout: Option<Duration>) -> Result<String> {
        let value = self.execute_command(ACTIVE_SHEET, timeout).await?;
        Ok(serde_json::from_value(value)?)
    }

    // ----- rendering sandbox -----

    /// Mount a view in the rendering sandbox.
    ///
    /// The config's services replace any previously installed ones. Emits
    /// `PluginRendered` or `RenderingError` once the sandbox answers.
    pub fn render_plugin(&self, config: RenderConfig, timeout: Option<Duration>) -> Deferred {
        if !config.is_renderable() {
            return Deferred::rejected(Error::InvalidRequest(
                "render config needs a template or an iframe".to_string(),
            ));
        }
        if !self.state().view_ready {
            return Deferred::rejected(Error::NotReady(ContextRole::View));
        }

        {
            let mut services = lock(&self.inner.services);
            services.clear();
            for service in &config.services {
                services.insert(service.name.clone(), service.clone());
            }
        }
        *lock(&self.inner.methods) = config.methods.clone();
        self.state().rendered = false;

        let weak = Arc::downgrade(&self.inner);
        let hook: SettleHook = Box::new(move |result: &Result<Value>| render_settled(weak, result));
        self.request(
            ContextRole::View,
            RequestKind::Render,
            "render",
            timeout,
            Some(hook),
            move |id| Payload::ExecuteRender(config.payload(id)),
        )
    }

    /// Call a method declared by the rendered view.
    pub fn invoke_view(&self, name: &str, args: Vec<Value>, timeout: Option<Duration>) -> Deferred {
        if !self.state().view_ready {
            return Deferred::rejected(Error::NotReady(ContextRole::View));
        }
        if !lock(&self.inner.methods).iter().any(|m| m == name) {
            return Deferred::rejected(Error::InvalidRequest(format!(
                "view method [{}] was not declared",
                name
            )));
        }
        let name = name.to_string();
        let label = name.clone();
        self.request(
            ContextRole::View,
            RequestKind::Invoke,
            &label,
            timeout,
            None,
            move |id| Payload::Invoke { id, name, args },
        )
    }

    /// Bound handle for a declared view method
    pub fn method(&self, name: &str) -> ViewMethod {
        ViewMethod {
            editor: self.clone(),
            name: name.to_string(),
        }
    }

    // ----- events -----

    /// Add a listener for `event` (case-insensitive)
    pub fn on<F>(&self, event: &str, listener: F)
    where
        F: Fn(&EditorEvent) + Send + Sync + 'static,
    {
        self.inner.events.on(event, Arc::new(listener));
    }

    /// Replace the direct handler for `event`; it runs after the listeners
    pub fn set_handler<F>(&self, event: &str, handler: F)
    where
        F: Fn(&EditorEvent) + Send + Sync + 'static,
    {
        self.inner.events.set_handler(event, Arc::new(handler));
    }

    /// Emit `event` locally, returning how many callbacks ran
    pub fn emit(&self, event: &str, data: Value) -> usize {
        let event = EditorEvent {
            name: event.to_string(),
            data,
            target: self.clone(),
        };
        let count = self.inner.events.emit(&event.name, &event);
        trace!(event = %event.name, count, "emitted event");
        count
    }

    // ----- state -----

    pub fn read_only(&self) -> bool {
        self.inner.config.mode == EditorMode::View
    }

    pub fn is_ready(&self) -> bool {
        self.state().execution_ready
    }

    pub fn is_view_ready(&self) -> bool {
        self.state().view_ready
    }

    pub fn is_changed(&self) -> bool {
        self.state().changed
    }

    pub fn is_saved(&self) -> bool {
        self.state().saved
    }

    pub fn is_rendered(&self) -> bool {
        self.state().rendered
    }

    pub fn auto_sync(&self) -> bool {
        self.state().auto_sync
    }

    /// Turning auto-sync on requires a download hook
    pub fn set_auto_sync(&self, enabled: bool) -> Result<()> {
        if enabled && self.inner.config.download_as.is_none() {
            return Err(Error::Config(
                "auto_sync requires a download_as hook".to_string(),
            ));
        }
        self.state().auto_sync = enabled;
        Ok(())
    }

    /// Wait until the execution sandbox has announced itself
    pub async fn ready(&self) -> Result<()> {
        let mut rx = self.inner.ready.subscribe();
        rx.wait_for(|ready| *ready)
            .await
            .map(|_| ())
            .map_err(|_| Error::Closed)
    }

    // ----- inbound -----

    /// Handle one inbound frame.
    ///
    /// Frames from unknown contexts are dropped. Only malformed frames are
    /// reported as errors.
    pub fn dispatch(&self, frame: &str) -> Result<()> {
        let envelope = Envelope::from_json(frame)?;
        let Some(role) = self.inner.config.contexts.role_of(&envelope.context) else {
            debug!(context = %envelope.context, kind = envelope.payload.type_name(), "dropping frame from unknown context");
            return Ok(());
        };
        trace!(%role, kind = envelope.payload.type_name(), "inbound frame");
        self.handle(role, envelope.context, envelope.payload)
    }

    /// Dispatch frames until the channel closes
    pub async fn serve(&self, mut rx: mpsc::UnboundedReceiver<String>) {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = self.dispatch(&frame) {
                warn!(error = %e, "dropping malformed frame");
            }
        }
        debug!("inbound channel closed");
    }

    fn handle(&self, role: ContextRole, context: ContextHandle, payload: Payload) -> Result<()> {
        match (role, payload) {
            (_, Payload::OnCommandReturn(reply)) => {
                let id = reply.id;
                let result = reply
                    .into_result()
                    .map_err(|message| Error::Remote { message });
                self.inner.correlator.settle(id, &context, result);
            }
            (ContextRole::View, Payload::OnPluginAction { id, name, args }) => {
                self.call_service(id, name, args)?;
            }
            (ContextRole::Execution, Payload::OnPluginReady(info)) => {
                self.execution_ready(info)?;
            }
            (ContextRole::View, Payload::OnPluginReady(info)) => {
                self.view_ready(info)?;
            }
            (ContextRole::Execution, Payload::OnPluginClose) => {
                self.state().execution_ready = false;
                self.inner.ready.send_replace(false);
                info!("execution context closed");
                self.emit("close", Value::Null);
            }
            (ContextRole::View, Payload::OnPluginClose) => {
                {
                    let mut state = self.state();
                    state.view_ready = false;
                    state.rendered = false;
                }
                info!("view context closed");
                self.emit("PluginClose", Value::Null);
            }
            (ContextRole::Execution, Payload::OnChanged) => {
                {
                    let mut state = self.state();
                    state.changed = true;
                    state.saved = false;
                }
                self.emit("changed", Value::Null);
            }
            (ContextRole::Execution, Payload::OnSaved) => self.saved(),
            (ContextRole::Execution, Payload::OnSheetsChanged(info)) => {
                self.emit("SheetsChanged", sheets_value(&info)?);
            }
            (ContextRole::Execution, Payload::OnActiveSheetChanged(info)) => {
                self.emit("ActiveSheetChanged", sheets_value(&info)?);
            }
            (ContextRole::Execution, Payload::OnDownloadUrl { url }) => {
                let url = match &self.inner.config.download_url {
                    Some(rewrite) => rewrite.apply(&url),
                    None => url,
                };
                debug!(%url, "starting download");
                self.post(ContextRole::Execution, Payload::Download { url })?;
            }
            (ContextRole::Execution, Payload::OnPrintUrl { url, download_type }) => {
                let url = match &self.inner.config.print_url {
                    Some(rewrite) => rewrite.apply(&url),
                    None => url,
                };
                debug!(%url, %download_type, "starting print");
                self.post(ContextRole::Execution, Payload::Print { url, download_type })?;
            }
            (role, payload) => {
                debug!(%role, kind = payload.type_name(), "ignoring unexpected message");
            }
        }
        Ok(())
    }

    fn execution_ready(&self, info: ContextInfo) -> Result<()> {
        self.state().execution_ready = true;
        self.inner.ready.send_replace(true);
        info!(sheets = info.sheets.len(), "execution context ready");

        let config = &self.inner.config;
        let options = InitializeOptions {
            debug: config.debug.clone(),
            download_types: config.download_types.clone(),
            download_url: config.download_url.as_ref().map(|url| url.target()),
            print_url: config.print_url.as_ref().map(|url| url.target()),
        };
        self.post(ContextRole::Execution, Payload::Initialize(options))?;
        self.emit("ready", serde_json::to_value(&info)?);
        Ok(())
    }

    fn view_ready(&self, info: ContextInfo) -> Result<()> {
        let debug = self.inner.config.debug.clone();
        let propagate = {
            let mut state = self.state();
            state.view_ready = true;
            state.rendered = false;
            debug.is_some() && info.debug != debug
        };
        info!("view context ready");
        if let (true, Some(debug)) = (propagate, debug) {
            self.post(ContextRole::View, Payload::SetDebug { debug })?;
        }
        self.emit("PluginOpen", serde_json::to_value(&info)?);
        Ok(())
    }

    fn saved(&self) {
        let auto_sync = {
            let mut state = self.state();
            if state.saved {
                return;
            }
            state.saved = true;
            state.changed = false;
            state.auto_sync
        };
        if auto_sync {
            if let Some(download) = &self.inner.config.download_as {
                debug!("auto-sync download after save");
                download();
            }
        }
        self.emit("saved", Value::Null);
    }

    /// Run a service for the view and post its reply when done
    fn call_service(&self, id: u64, name: String, args: Vec<Value>) -> Result<()> {
        let service = lock(&self.inner.services).get(&name).cloned();
        let Some(service) = service else {
            debug!(id, %name, "view called an unknown service");
            let reply = Reply::err(id, format!("Service [{}] is not registered", name));
            return self.post(ContextRole::View, Payload::OnActionReturn(reply));
        };
        if service.params.len() != args.len() {
            debug!(
                id,
                %name,
                expected = service.params.len(),
                got = args.len(),
                "service called with unexpected arity"
            );
        }
        let Ok(runtime) = Handle::try_current() else {
            // the view is waiting on this id
            let reply = Reply::err(id, Error::NoRuntime.to_string());
            self.post(ContextRole::View, Payload::OnActionReturn(reply))?;
            return Err(Error::NoRuntime);
        };
        let editor = self.clone();
        let call = (service.handler)(args);
        runtime.spawn(async move {
            let reply = Reply::from_result(id, call.await);
            if let Err(e) = editor.post(ContextRole::View, Payload::OnActionReturn(reply)) {
                warn!(id, error = %e, "failed to post service reply");
            }
        });
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn sheets_value(info: &SheetsInfo) -> Result<Value> {
    Ok(serde_json::to_value(info)?)
}

fn render_settled(inner: Weak<Inner>, result: &Result<Value>) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let editor = Editor { inner };
    match result {
        Ok(_) => {
            editor.state().rendered = true;
            editor.emit("PluginRendered", Value::Null);
        }
        Err(e) => {
            warn!(error = %e, "view failed to render");
            editor.emit("RenderingError", Value::String(e.to_string()));
        }
    }
}

/// A view method bound to its editor.
#[derive(Debug, Clone)]
pub struct ViewMethod {
    editor: Editor,
    name: String,
}

impl ViewMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: Vec<Value>, timeout: Option<Duration>) -> Deferred {
        self.editor.invoke_view(&self.name, args, timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextRegistry;
    use crate::transport::ChannelTransport;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn editor() -> (Editor, mpsc::UnboundedReceiver<String>) {
        let (transport, rx) = ChannelTransport::new();
        let config = EditorConfig::new(ContextRegistry::new("exec", "view"));
        (Editor::new(config, transport).unwrap(), rx)
    }

    fn frame(context: &str, payload: Payload) -> String {
        Envelope::to_host(context.into(), payload).to_json().unwrap()
    }

    #[tokio::test]
    async fn test_not_ready_sends_nothing() {
        let (editor, mut rx) = editor();
        let err = editor.execute_command("1+1", None).await.unwrap_err();
        assert!(matches!(err, Error::NotReady(ContextRole::Execution)));
        let err = editor
            .render_plugin(RenderConfig::template("<p/>"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotReady(ContextRole::View)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_ready_posts_initialize() {
        let (editor, mut rx) = editor();
        editor
            .dispatch(&frame("exec", Payload::OnPluginReady(ContextInfo::default())))
            .unwrap();
        assert!(editor.is_ready());

        let sent = Envelope::from_json(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(sent.context.as_str(), "exec");
        assert_eq!(sent.payload.type_name(), "initialize");
    }

    #[tokio::test]
    async fn test_unknown_context_is_dropped() {
        let (editor, mut rx) = editor();
        editor
            .dispatch(&frame("stranger", Payload::OnPluginReady(ContextInfo::default())))
            .unwrap();
        assert!(!editor.is_ready());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_frame_is_an_error() {
        let (editor, _rx) = editor();
        assert!(matches!(editor.dispatch("{not json"), Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_empty_command_rejected() {
        let (editor, _rx) = editor();
        let err = editor.execute_command("  ", None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_sheet_events_carry_snapshot() {
        let (editor, _rx) = editor();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        editor.on("sheetschanged", move |event| log.lock().unwrap().push(event.data.clone()));

        let info = SheetsInfo {
            sheets: vec!["Sheet1".into(), "Q1".into()],
            active: Some("Q1".into()),
        };
        editor
            .dispatch(&frame("exec", Payload::OnSheetsChanged(info)))
            .unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![json!({"sheets": ["Sheet1", "Q1"], "active": "Q1"})]
        );
    }

    #[tokio::test]
    async fn test_download_url_rewritten() {
        let (transport, mut rx) = ChannelTransport::new();
        let config = EditorConfig {
            download_url: Some(crate::config::UrlRewrite::rewrite(|url| {
                format!("/proxy?u={}", url)
            })),
            ..EditorConfig::new(ContextRegistry::new("exec", "view"))
        };
        let editor = Editor::new(config, transport).unwrap();
        editor
            .dispatch(&frame(
                "exec",
                Payload::OnDownloadUrl {
                    url: "/cache/doc.xlsx".into(),
                },
            ))
            .unwrap();

        let sent = Envelope::from_json(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(
            sent.payload,
            Payload::Download {
                url: "/proxy?u=/cache/doc.xlsx".into()
            }
        );
    }

    #[test]
    fn test_service_without_runtime_replies_with_error() {
        let (editor, mut rx) = editor();
        lock(&editor.inner.services).insert(
            "lookup".to_string(),
            Service::new("lookup", ["key"], crate::services::handler(|_| async { Ok(Value::Null) })),
        );

        let err = editor
            .dispatch(&frame(
                "view",
                Payload::OnPluginAction {
                    id: 4,
                    name: "lookup".into(),
                    args: vec![json!("k")],
                },
            ))
            .unwrap_err();
        assert!(matches!(err, Error::NoRuntime));

        let sent = Envelope::from_json(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(sent.context.as_str(), "view");
        assert_eq!(
            sent.payload,
            Payload::OnActionReturn(Reply::err(4, Error::NoRuntime.to_string()))
        );
    }

    #[test]
    fn test_set_auto_sync_requires_hook() {
        let (editor, _rx) = editor();
        assert!(!editor.auto_sync());
        assert!(matches!(editor.set_auto_sync(true), Err(Error::Config(_))));
        editor.set_auto_sync(false).unwrap();
    }

    #[test]
    fn test_read_only_follows_mode() {
        let (transport, _rx) = ChannelTransport::new();
        let config = EditorConfig {
            mode: EditorMode::View,
            ..EditorConfig::default()
        };
        assert!(Editor::new(config, transport).unwrap().read_only());
    }
}
