//! Asynchronous bridge between a host application and an embedded
//! spreadsheet editor.
//!
//! The editor runs in isolated contexts that are only reachable through
//! message passing: an execution context evaluating instruction text against
//! the document and a view context rendering plugin UI. Every request gets a
//! correlation id and a [`Deferred`] that settles with the matching reply,
//! or with [`Error::Timeout`].
//!
//! # Architecture
//!
//! - **Editor** (`editor.rs`): host-side state, requests, inbound dispatch
//! - **Correlation** (`correlation.rs`): pending request table and timers
//! - **Events** (`events.rs`): case-insensitive listeners and direct handlers
//! - **Services** (`services.rs`): view definitions and host services
//! - **Sandbox** (`sandbox.rs`): execution and view endpoints
//! - **Transport** (`transport.rs`): outbound frame delivery
//!
//! # Example
//!
//! ```no_run
//! use sheetbridge::{ChannelTransport, ContextRegistry, Editor, EditorConfig};
//! use sheetbridge_writer::Document;
//!
//! # async fn demo() -> sheetbridge::Result<()> {
//! let (transport, _outbound) = ChannelTransport::new();
//! let editor = Editor::new(
//!     EditorConfig::new(ContextRegistry::new("exec-1", "view-1")),
//!     transport,
//! )?;
//! editor.ready().await?;
//!
//! let mut doc = Document::new();
//! doc.sheet("Report").row().cell("Total", None).number(42, None);
//! editor.run_plan(&doc.build()?, None).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod correlation;
pub mod deferred;
pub mod editor;
pub mod error;
pub mod events;
pub mod sandbox;
pub mod services;
pub mod transport;

pub use config::{ContextRegistry, ContextRole, DownloadHook, EditorConfig, EditorMode, UrlRewrite};
pub use correlation::{Correlator, RequestKind};
pub use deferred::Deferred;
pub use editor::{Code, Editor, EditorEvent, ViewMethod};
pub use error::{Error, Result};
pub use events::{EventRegistry, Listener};
pub use sandbox::{Engine, ExecutionSandbox, MethodFn, UrlAction, ViewSandbox};
pub use services::{handler, Handler, HandlerFuture, RenderConfig, Service};
pub use transport::{ChannelTransport, Transport};

pub use sheetbridge_protocol as protocol;
