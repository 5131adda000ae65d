//! Sandbox-side endpoints.
//!
//! These run inside the isolated contexts the host talks to. The execution
//! sandbox hands instruction text to an [`Engine`]; the view sandbox resolves
//! method names against its own handler table and calls host services.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use sheetbridge_protocol::{
    ContextHandle, ContextInfo, Envelope, InitializeOptions, Payload, RenderPayload, Reply,
    SheetsInfo, UrlTarget,
};
use tracing::{debug, trace};

use crate::correlation::{Correlator, RequestKind};
use crate::deferred::Deferred;
use crate::error::{Error, Result};
use crate::transport::Transport;

/// Evaluates instruction text against the hosted document.
pub trait Engine: Send {
    /// Run `command`, returning its value or the message it threw
    fn execute(&mut self, command: &str) -> std::result::Result<Value, String>;
}

impl<F> Engine for F
where
    F: FnMut(&str) -> std::result::Result<Value, String> + Send,
{
    fn execute(&mut self, command: &str) -> std::result::Result<Value, String> {
        self(command)
    }
}

/// What the execution sandbox did with a URL notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlAction {
    Download { url: String },
    Print { url: String, download_type: String },
}

/// Execution context endpoint.
pub struct ExecutionSandbox<E> {
    context: ContextHandle,
    engine: E,
    transport: Arc<dyn Transport>,
    debug: Option<String>,
    options: Option<InitializeOptions>,
    actions: Vec<UrlAction>,
}

impl<E: Engine> ExecutionSandbox<E> {
    pub fn new(context: impl Into<ContextHandle>, engine: E, transport: Arc<dyn Transport>) -> Self {
        Self {
            context: context.into(),
            engine,
            transport,
            debug: None,
            options: None,
            actions: Vec::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn debug(&self) -> Option<&str> {
        self.debug.as_deref()
    }

    /// Settings received from the host, once initialized
    pub fn options(&self) -> Option<&InitializeOptions> {
        self.options.as_ref()
    }

    /// Downloads and prints performed so far
    pub fn actions(&self) -> &[UrlAction] {
        &self.actions
    }

    fn post(&self, payload: Payload) -> Result<()> {
        self.transport
            .post(&Envelope::to_host(self.context.clone(), payload))
    }

    /// Handle one frame from the host
    pub fn handle(&mut self, frame: &str) -> Result<()> {
        let envelope = Envelope::from_json(frame)?;
        match envelope.payload {
            Payload::ExecuteCommand { id, command } => {
                trace!(id, %command, "executing command");
                let result = self.engine.execute(&command);
                if let Err(message) = &result {
                    debug!(id, %message, "command failed");
                }
                self.post(Payload::OnCommandReturn(Reply::from_result(id, result)))?;
            }
            Payload::SetDebug { debug } => self.debug = Some(debug),
            Payload::Initialize(options) => {
                if options.debug.is_some() {
                    self.debug = options.debug.clone();
                }
                self.options = Some(options);
            }
            Payload::Download { url } => self.actions.push(UrlAction::Download { url }),
            Payload::Print { url, download_type } => {
                self.actions.push(UrlAction::Print { url, download_type })
            }
            other => debug!(kind = other.type_name(), "execution sandbox ignoring message"),
        }
        Ok(())
    }

    pub fn announce_ready(&self, sheets: SheetsInfo) -> Result<()> {
        self.post(Payload::OnPluginReady(ContextInfo {
            name: None,
            debug: self.debug.clone(),
            sheets: sheets.sheets,
            active: sheets.active,
        }))
    }

    pub fn close(&self) -> Result<()> {
        self.post(Payload::OnPluginClose)
    }

    pub fn notify_changed(&self) -> Result<()> {
        self.post(Payload::OnChanged)
    }

    pub fn notify_saved(&self) -> Result<()> {
        self.post(Payload::OnSaved)
    }

    pub fn notify_sheets_changed(&self, sheets: SheetsInfo) -> Result<()> {
        self.post(Payload::OnSheetsChanged(sheets))
    }

    pub fn notify_active_sheet_changed(&self, sheets: SheetsInfo) -> Result<()> {
        self.post(Payload::OnActiveSheetChanged(sheets))
    }

    /// The editor generated a download URL.
    ///
    /// Intercepted URLs go to the host for rewriting, a fixed URL replaces
    /// it, otherwise the URL is used as is.
    pub fn download_url(&mut self, url: &str) -> Result<()> {
        match self.options.as_ref().and_then(|o| o.download_url.clone()) {
            Some(UrlTarget::Intercept(true)) => self.post(Payload::OnDownloadUrl {
                url: url.to_string(),
            }),
            Some(UrlTarget::Fixed(fixed)) => {
                self.actions.push(UrlAction::Download { url: fixed });
                Ok(())
            }
            _ => {
                self.actions.push(UrlAction::Download {
                    url: url.to_string(),
                });
                Ok(())
            }
        }
    }

    /// The editor generated a print URL
    pub fn print_url(&mut self, url: &str, download_type: &str) -> Result<()> {
        let download_type = download_type.to_string();
        match self.options.as_ref().and_then(|o| o.print_url.clone()) {
            Some(UrlTarget::Intercept(true)) => self.post(Payload::OnPrintUrl {
                url: url.to_string(),
                download_type,
            }),
            Some(UrlTarget::Fixed(fixed)) => {
                self.actions.push(UrlAction::Print {
                    url: fixed,
                    download_type,
                });
                Ok(())
            }
            _ => {
                self.actions.push(UrlAction::Print {
                    url: url.to_string(),
                    download_type,
                });
                Ok(())
            }
        }
    }
}

/// Method registered in the view
pub type MethodFn = Box<dyn FnMut(Vec<Value>) -> std::result::Result<Value, String> + Send>;

/// Rendering context endpoint.
///
/// Methods are registered ahead of time; a render that declares a method
/// missing from the table fails.
pub struct ViewSandbox {
    context: ContextHandle,
    transport: Arc<dyn Transport>,
    methods: HashMap<String, MethodFn>,
    rendered: Option<RenderPayload>,
    correlator: Correlator,
    debug: Option<String>,
}

impl ViewSandbox {
    pub fn new(context: impl Into<ContextHandle>, transport: Arc<dyn Transport>) -> Self {
        Self {
            context: context.into(),
            transport,
            methods: HashMap::new(),
            rendered: None,
            correlator: Correlator::new(),
            debug: None,
        }
    }

    pub fn register<F>(&mut self, name: &str, method: F) -> &mut Self
    where
        F: FnMut(Vec<Value>) -> std::result::Result<Value, String> + Send + 'static,
    {
        self.methods.insert(name.to_string(), Box::new(method));
        self
    }

    /// The view currently mounted
    pub fn rendered(&self) -> Option<&RenderPayload> {
        self.rendered.as_ref()
    }

    pub fn debug(&self) -> Option<&str> {
        self.debug.as_deref()
    }

    fn post(&self, payload: Payload) -> Result<()> {
        self.transport
            .post(&Envelope::to_host(self.context.clone(), payload))
    }

    /// Handle one frame from the host
    pub fn handle(&mut self, frame: &str) -> Result<()> {
        let envelope = Envelope::from_json(frame)?;
        match envelope.payload {
            Payload::ExecuteRender(render) => {
                let id = render.id;
                let missing = render
                    .methods
                    .iter()
                    .find(|name| !self.methods.contains_key(name.as_str()))
                    .cloned();
                let reply = match missing {
                    Some(name) => Reply::err(id, format!("Method [{}] is not registered", name)),
                    None => {
                        debug!(id, methods = render.methods.len(), "view rendered");
                        self.rendered = Some(render);
                        Reply::ok(id, Value::Null)
                    }
                };
                self.post(Payload::OnCommandReturn(reply))?;
            }
            Payload::Invoke { id, name, args } => {
                let reply = Reply::from_result(id, self.invoke(&name, args));
                self.post(Payload::OnCommandReturn(reply))?;
            }
            Payload::OnActionReturn(reply) => {
                let id = reply.id;
                let result = reply
                    .into_result()
                    .map_err(|message| Error::Remote { message });
                self.correlator.settle(id, &envelope.context, result);
            }
            Payload::SetDebug { debug } => self.debug = Some(debug),
            other => debug!(kind = other.type_name(), "view sandbox ignoring message"),
        }
        Ok(())
    }

    fn invoke(&mut self, name: &str, args: Vec<Value>) -> std::result::Result<Value, String> {
        let declared = self
            .rendered
            .as_ref()
            .is_some_and(|render| render.methods.iter().any(|m| m == name));
        if !declared {
            return Err(format!("Method [{}] is not available", name));
        }
        match self.methods.get_mut(name) {
            Some(method) => method(args),
            None => Err(format!("Method [{}] is not registered", name)),
        }
    }

    /// Call a host service declared by the mounted view
    pub fn call_service(&self, name: &str, args: Vec<Value>, timeout: Option<Duration>) -> Deferred {
        let declared = self
            .rendered
            .as_ref()
            .is_some_and(|render| render.services.contains_key(name));
        if !declared {
            return Deferred::rejected(Error::InvalidRequest(format!(
                "service [{}] was not declared by the view",
                name
            )));
        }
        let (id, deferred) = match self.correlator.register(
            self.context.clone(),
            RequestKind::Service,
            name,
            timeout,
            None,
        ) {
            Ok(registered) => registered,
            Err(e) => return Deferred::rejected(e),
        };
        let payload = Payload::OnPluginAction {
            id,
            name: name.to_string(),
            args,
        };
        if let Err(e) = self.post(payload) {
            self.correlator.fail(id, e);
        }
        deferred
    }

    pub fn announce_ready(&self) -> Result<()> {
        self.post(Payload::OnPluginReady(ContextInfo {
            debug: self.debug.clone(),
            ..ContextInfo::default()
        }))
    }

    pub fn close(&mut self) -> Result<()> {
        self.rendered = None;
        self.post(Payload::OnPluginClose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChannelTransport;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn sent(rx: &mut mpsc::UnboundedReceiver<String>) -> Payload {
        Envelope::from_json(&rx.try_recv().unwrap()).unwrap().payload
    }

    fn to_view(payload: Payload) -> String {
        Envelope::to_sandbox("view".into(), payload).to_json().unwrap()
    }

    #[test]
    fn test_execution_replies_with_engine_result() {
        let (transport, mut rx) = ChannelTransport::new();
        let engine = |command: &str| -> std::result::Result<Value, String> {
            match command {
                "ok" => Ok(json!(1)),
                _ => Err("ReferenceError".to_string()),
            }
        };
        let mut sandbox = ExecutionSandbox::new("exec", engine, Arc::new(transport));

        let frame = |id, command: &str| {
            Envelope::to_sandbox(
                "exec".into(),
                Payload::ExecuteCommand {
                    id,
                    command: command.to_string(),
                },
            )
            .to_json()
            .unwrap()
        };
        sandbox.handle(&frame(1, "ok")).unwrap();
        sandbox.handle(&frame(2, "boom")).unwrap();

        assert_eq!(sent(&mut rx), Payload::OnCommandReturn(Reply::ok(1, json!(1))));
        assert_eq!(
            sent(&mut rx),
            Payload::OnCommandReturn(Reply::err(2, "ReferenceError"))
        );
    }

    #[test]
    fn test_download_url_follows_initialize() {
        let (transport, mut rx) = ChannelTransport::new();
        let engine = |_: &str| -> std::result::Result<Value, String> { Ok(Value::Null) };
        let mut sandbox = ExecutionSandbox::new("exec", engine, Arc::new(transport));

        sandbox.download_url("/a").unwrap();
        assert_eq!(sandbox.actions(), &[UrlAction::Download { url: "/a".into() }]);

        let init = InitializeOptions {
            download_url: Some(UrlTarget::Intercept(true)),
            ..InitializeOptions::default()
        };
        sandbox
            .handle(&Envelope::to_sandbox("exec".into(), Payload::Initialize(init)).to_json().unwrap())
            .unwrap();
        sandbox.download_url("/b").unwrap();
        assert_eq!(sent(&mut rx), Payload::OnDownloadUrl { url: "/b".into() });
        assert_eq!(sandbox.actions().len(), 1);
    }

    #[test]
    fn test_render_fails_on_unregistered_method() {
        let (transport, mut rx) = ChannelTransport::new();
        let mut view = ViewSandbox::new("view", Arc::new(transport));
        view.register("refresh", |_| Ok(Value::Null));

        let render = RenderPayload {
            id: 4,
            template: Some("<p/>".into()),
            methods: vec!["refresh".into(), "missing".into()],
            ..RenderPayload::default()
        };
        view.handle(&to_view(Payload::ExecuteRender(render))).unwrap();
        assert_eq!(
            sent(&mut rx),
            Payload::OnCommandReturn(Reply::err(4, "Method [missing] is not registered"))
        );
        assert!(view.rendered().is_none());
    }

    #[test]
    fn test_invoke_requires_declared_method() {
        let (transport, mut rx) = ChannelTransport::new();
        let mut view = ViewSandbox::new("view", Arc::new(transport));
        view.register("double", |args| {
            let n = args.first().and_then(Value::as_f64).unwrap_or(0.0);
            Ok(json!(n * 2.0))
        });
        view.register("hidden", |_| Ok(Value::Null));

        let render = RenderPayload {
            id: 1,
            template: Some("<p/>".into()),
            methods: vec!["double".into()],
            ..RenderPayload::default()
        };
        view.handle(&to_view(Payload::ExecuteRender(render))).unwrap();
        sent(&mut rx);

        view.handle(&to_view(Payload::Invoke {
            id: 2,
            name: "double".into(),
            args: vec![json!(21)],
        }))
        .unwrap();
        assert_eq!(sent(&mut rx), Payload::OnCommandReturn(Reply::ok(2, json!(42.0))));

        view.handle(&to_view(Payload::Invoke {
            id: 3,
            name: "hidden".into(),
            args: vec![],
        }))
        .unwrap();
        assert_eq!(
            sent(&mut rx),
            Payload::OnCommandReturn(Reply::err(3, "Method [hidden] is not available"))
        );
    }

    #[tokio::test]
    async fn test_undeclared_service_rejected() {
        let (transport, mut rx) = ChannelTransport::new();
        let view = ViewSandbox::new("view", Arc::new(transport));
        let err = view.call_service("save", vec![], None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(rx.try_recv().is_err());
    }
}
