//! Loopback wiring an editor to in-process sandboxes.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use sheetbridge::protocol::Envelope;
use sheetbridge::{
    ChannelTransport, ContextRegistry, Editor, EditorConfig, EditorEvent, Engine,
    ExecutionSandbox, Transport, ViewSandbox,
};
use tokio::sync::oneshot;

pub const EXEC: &str = "exec";
pub const VIEW: &str = "view";

/// Engine answering commands from a script, `null` once exhausted.
pub struct ScriptedEngine {
    replies: VecDeque<Result<Value, String>>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl Engine for ScriptedEngine {
    fn execute(&mut self, command: &str) -> Result<Value, String> {
        self.seen.lock().unwrap().push(command.to_string());
        self.replies.pop_front().unwrap_or(Ok(Value::Null))
    }
}

pub struct Loopback {
    pub editor: Editor,
    pub exec: Arc<Mutex<ExecutionSandbox<ScriptedEngine>>>,
    pub view: Arc<Mutex<ViewSandbox>>,
    /// Every command the execution sandbox ran
    pub commands: Arc<Mutex<Vec<String>>>,
}

pub fn config() -> EditorConfig {
    EditorConfig::new(ContextRegistry::new(EXEC, VIEW))
}

/// Wire `config` to both sandboxes. Must run inside a Tokio runtime.
pub fn loopback(config: EditorConfig, replies: Vec<Result<Value, String>>) -> Loopback {
    let (host_transport, mut host_rx) = ChannelTransport::new();
    let editor = Editor::new(config, host_transport).unwrap();

    let (sandbox_transport, sandbox_rx) = ChannelTransport::new();
    let sandbox_transport: Arc<dyn Transport> = Arc::new(sandbox_transport);

    let commands = Arc::new(Mutex::new(Vec::new()));
    let engine = ScriptedEngine {
        replies: replies.into(),
        seen: commands.clone(),
    };
    let exec = Arc::new(Mutex::new(ExecutionSandbox::new(
        EXEC,
        engine,
        sandbox_transport.clone(),
    )));
    let view = Arc::new(Mutex::new(ViewSandbox::new(VIEW, sandbox_transport)));

    let (exec_route, view_route) = (exec.clone(), view.clone());
    tokio::spawn(async move {
        while let Some(frame) = host_rx.recv().await {
            let envelope = Envelope::from_json(&frame).unwrap();
            match envelope.context.as_str() {
                EXEC => exec_route.lock().unwrap().handle(&frame).unwrap(),
                VIEW => view_route.lock().unwrap().handle(&frame).unwrap(),
                other => panic!("frame for unknown context {}", other),
            }
        }
    });

    let host = editor.clone();
    tokio::spawn(async move { host.serve(sandbox_rx).await });

    Loopback {
        editor,
        exec,
        view,
        commands,
    }
}

impl Loopback {
    pub async fn exec_ready(&self) {
        self.exec
            .lock()
            .unwrap()
            .announce_ready(Default::default())
            .unwrap();
        self.editor.ready().await.unwrap();
    }

    pub async fn view_ready(&self) {
        let open = next_event(&self.editor, "PluginOpen");
        self.view.lock().unwrap().announce_ready().unwrap();
        open.await.unwrap();
    }

    /// Wait until every frame already sent in either direction was handled.
    ///
    /// Two command round trips through the execution sandbox: the first
    /// drains inbound frames, the second drains what the host posted while
    /// handling them.
    pub async fn flush(&self) {
        for _ in 0..2 {
            self.editor.execute_command("0", None).await.unwrap();
        }
    }
}

/// Resolves with the next `name` event
pub fn next_event(editor: &Editor, name: &str) -> oneshot::Receiver<EditorEvent> {
    let (tx, rx) = oneshot::channel();
    let tx = Mutex::new(Some(tx));
    editor.on(name, move |event| {
        if let Some(tx) = tx.lock().unwrap().take() {
            let _ = tx.send(event.clone());
        }
    });
    rx
}
