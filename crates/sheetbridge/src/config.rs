//! Editor configuration and context registry.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use sheetbridge_protocol::{ContextHandle, UrlTarget};

use crate::error::{Error, Result};
use crate::events::Listener;
use crate::editor::EditorEvent;

/// Which sandboxed context a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextRole {
    /// Runs instruction text against the document
    Execution,
    /// Renders plugin UI
    View,
}

impl fmt::Display for ContextRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextRole::Execution => f.write_str("Execution"),
            ContextRole::View => f.write_str("View"),
        }
    }
}

/// Handles the host platform issued for the two sandboxed contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRegistry {
    pub execution: ContextHandle,
    pub view: ContextHandle,
}

impl ContextRegistry {
    pub fn new(execution: impl Into<ContextHandle>, view: impl Into<ContextHandle>) -> Self {
        Self {
            execution: execution.into(),
            view: view.into(),
        }
    }

    /// Role of an inbound message's origin, `None` for unknown handles
    pub fn role_of(&self, handle: &ContextHandle) -> Option<ContextRole> {
        if handle == &self.execution {
            Some(ContextRole::Execution)
        } else if handle == &self.view {
            Some(ContextRole::View)
        } else {
            None
        }
    }

    pub fn handle(&self, role: ContextRole) -> &ContextHandle {
        match role {
            ContextRole::Execution => &self.execution,
            ContextRole::View => &self.view,
        }
    }
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new("execution", "view")
    }
}

/// Editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Edit,
    View,
}

/// Called to start a download of the document (auto-sync after a save).
pub type DownloadHook = Arc<dyn Fn() + Send + Sync>;

/// How a download/print URL reported by the editor is replaced.
#[derive(Clone)]
pub enum UrlRewrite {
    /// The document's own URL
    SameAsDocument(String),
    /// Always use this URL
    Fixed(String),
    /// Map the editor's URL
    Rewrite(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl UrlRewrite {
    pub fn rewrite<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        UrlRewrite::Rewrite(Arc::new(f))
    }

    pub fn apply(&self, url: &str) -> String {
        match self {
            UrlRewrite::SameAsDocument(fixed) | UrlRewrite::Fixed(fixed) => fixed.clone(),
            UrlRewrite::Rewrite(f) => f(url),
        }
    }

    /// What the execution sandbox is told at initialization
    pub(crate) fn target(&self) -> UrlTarget {
        match self {
            UrlRewrite::SameAsDocument(fixed) | UrlRewrite::Fixed(fixed) => {
                UrlTarget::Fixed(fixed.clone())
            }
            UrlRewrite::Rewrite(_) => UrlTarget::Intercept(true),
        }
    }
}

impl fmt::Debug for UrlRewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlRewrite::SameAsDocument(url) => f.debug_tuple("SameAsDocument").field(url).finish(),
            UrlRewrite::Fixed(url) => f.debug_tuple("Fixed").field(url).finish(),
            UrlRewrite::Rewrite(_) => f.write_str("Rewrite(..)"),
        }
    }
}

/// Configuration for an [`Editor`](crate::Editor).
#[derive(Clone, Default)]
pub struct EditorConfig {
    pub contexts: ContextRegistry,
    pub mode: EditorMode,
    /// Download after every save. Defaults to on when `download_as` is set.
    pub auto_sync: Option<bool>,
    pub download_as: Option<DownloadHook>,
    /// Replacement for download URLs
    pub download_url: Option<UrlRewrite>,
    pub print_url: Option<UrlRewrite>,
    /// Formats offered for download; uppercased on construction
    pub download_types: Vec<String>,
    pub debug: Option<String>,
    /// Timeout for calls that pass none
    pub default_timeout: Option<Duration>,
    /// Direct handlers bound at construction, by event name
    pub handlers: Vec<(String, Listener<EditorEvent>)>,
}

impl EditorConfig {
    pub fn new(contexts: ContextRegistry) -> Self {
        Self {
            contexts,
            ..Self::default()
        }
    }

    /// Bind a direct handler for `event`
    pub fn handler<F>(mut self, event: &str, handler: F) -> Self
    where
        F: Fn(&EditorEvent) + Send + Sync + 'static,
    {
        self.handlers.push((event.to_string(), Arc::new(handler)));
        self
    }

    /// Validate and fill in defaults.
    pub(crate) fn resolve(mut self) -> Result<Self> {
        match (self.auto_sync, &self.download_as) {
            (Some(true), None) => {
                return Err(Error::Config(
                    "auto_sync requires a download_as hook".to_string(),
                ))
            }
            (None, Some(_)) => self.auto_sync = Some(true),
            _ => {}
        }
        if self.contexts.execution == self.contexts.view {
            return Err(Error::Config(format!(
                "execution and view contexts share the handle {}",
                self.contexts.execution
            )));
        }
        self.download_types = self
            .download_types
            .iter()
            .map(|t| t.to_uppercase())
            .collect();
        Ok(self)
    }

    /// Printing is allowed when a print URL is configured
    pub fn can_print(&self) -> bool {
        self.print_url.is_some()
    }
}

impl fmt::Debug for EditorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorConfig")
            .field("contexts", &self.contexts)
            .field("mode", &self.mode)
            .field("auto_sync", &self.auto_sync)
            .field("download_as", &self.download_as.is_some())
            .field("download_url", &self.download_url)
            .field("print_url", &self.print_url)
            .field("download_types", &self.download_types)
            .field("debug", &self.debug)
            .field("default_timeout", &self.default_timeout)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
