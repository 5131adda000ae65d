//! Host services and view definitions for the rendering sandbox.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use sheetbridge_protocol::{Attributes, IframeTarget, RenderPayload, Resource};

/// Future returned by a service handler. Errors travel back as messages.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, String>> + Send>>;

/// Host-side implementation of a service the view may call.
pub type Handler = Arc<dyn Fn(Vec<Value>) -> HandlerFuture + Send + Sync>;

/// Wrap an async closure as a [`Handler`]
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, String>> + Send + 'static,
{
    Arc::new(move |args| -> HandlerFuture { Box::pin(f(args)) })
}

/// A named host service with its declared parameter names.
#[derive(Clone)]
pub struct Service {
    pub name: String,
    /// Used for diagnostics only
    pub params: Vec<String>,
    pub handler: Handler,
}

impl Service {
    pub fn new<I, S>(name: &str, params: I, handler: Handler) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            params: params.into_iter().map(Into::into).collect(),
            handler,
        }
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// What to mount in the rendering sandbox.
///
/// ```
/// use sheetbridge::{handler, RenderConfig};
/// use serde_json::json;
///
/// let config = RenderConfig::template("<div id=\"app\"></div>")
///     .method("refresh")
///     .service("lookup", ["key"], handler(|args| async move {
///         Ok(json!({ "key": args.first().cloned() }))
///     }))
///     .script("console.log('mounted')");
/// assert!(config.is_renderable());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    pub template: Option<String>,
    pub iframe: Option<IframeTarget>,
    pub methods: Vec<String>,
    pub services: Vec<Service>,
    pub link: Vec<Attributes>,
    pub style: Vec<Resource>,
    pub script: Vec<Resource>,
    pub xhr: Option<bool>,
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn template(template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            ..Self::default()
        }
    }

    pub fn iframe(target: IframeTarget) -> Self {
        Self {
            iframe: Some(target),
            ..Self::default()
        }
    }

    pub fn with_iframe(mut self, target: IframeTarget) -> Self {
        self.iframe = Some(target);
        self
    }

    /// Declare a method the host may invoke in the view
    pub fn method(mut self, name: &str) -> Self {
        self.methods.push(name.to_string());
        self
    }

    pub fn service<I, S>(mut self, name: &str, params: I, handler: Handler) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services.push(Service::new(name, params, handler));
        self
    }

    pub fn link(mut self, attrs: Attributes) -> Self {
        self.link.push(attrs);
        self
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style.push(Resource::Inline(style.into()));
        self
    }

    pub fn script(mut self, script: impl Into<String>) -> Self {
        self.script.push(Resource::Inline(script.into()));
        self
    }

    pub fn resource_script(mut self, resource: Resource) -> Self {
        self.script.push(resource);
        self
    }

    pub fn xhr(mut self, enabled: bool) -> Self {
        self.xhr = Some(enabled);
        self
    }

    /// A view needs either a template or an iframe. Empty values and
    /// `iframe: false` count as absent.
    pub fn is_renderable(&self) -> bool {
        let template = self.template.as_deref().is_some_and(|t| !t.is_empty());
        let iframe = match &self.iframe {
            Some(IframeTarget::Enabled(enabled)) => *enabled,
            Some(IframeTarget::Url(url)) => !url.is_empty(),
            None => false,
        };
        template || iframe
    }

    pub(crate) fn payload(&self, id: u64) -> RenderPayload {
        let services: BTreeMap<String, Vec<String>> = self
            .services
            .iter()
            .map(|service| (service.name.clone(), service.params.clone()))
            .collect();
        RenderPayload {
            id,
            template: self.template.clone(),
            methods: self.methods.clone(),
            services,
            link: self.link.clone(),
            style: self.style.clone(),
            script: self.script.clone(),
            iframe: self.iframe.clone(),
            xhr: self.xhr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_payload_carries_names_only() {
        let config = RenderConfig::template("<p></p>")
            .method("refresh")
            .service("save", ["name", "rows"], handler(|_| async { Ok(Value::Null) }))
            .xhr(true);

        let payload = config.payload(9);
        assert_eq!(payload.id, 9);
        assert_eq!(payload.methods, vec!["refresh"]);
        assert_eq!(
            payload.services.get("save"),
            Some(&vec!["name".to_string(), "rows".to_string()])
        );
        assert_eq!(
            serde_json::to_value(&payload).unwrap()["services"],
            json!({"save": ["name", "rows"]})
        );
    }

    #[test]
    fn test_renderable() {
        assert!(!RenderConfig::new().method("m").is_renderable());
        assert!(RenderConfig::iframe(IframeTarget::Url("/view".into())).is_renderable());
        assert!(!RenderConfig::iframe(IframeTarget::Enabled(false)).is_renderable());
        assert!(!RenderConfig::iframe(IframeTarget::Url(String::new())).is_renderable());
        assert!(!RenderConfig::template("").is_renderable());
        assert!(RenderConfig::template("<p></p>")
            .with_iframe(IframeTarget::Enabled(false))
            .is_renderable());
    }

    #[tokio::test]
    async fn test_handler_runs() {
        let h = handler(|args| async move { Ok(json!(args.len())) });
        assert_eq!(h(vec![json!(1), json!(2)]).await, Ok(json!(2)));
    }
}
