use markup::{AttributeMap, ComponentTags, DecodeError};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Upcast helper so `dyn Component` can be downcast to its concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of UI whose state renders to markup.
///
/// `render` must be a pure function of the component's fields: rendering twice without a
/// state change has to produce the same markup, or every synchronization reports changes.
pub trait Component: AsAny {
    fn render(&self) -> Result<String, RenderError>;

    /// Apply props passed by an embedding component. All-or-nothing: on error the component
    /// must be left unchanged.
    ///
    /// The default accepts no props.
    fn decode_attributes(&mut self, attributes: &AttributeMap) -> Result<(), DecodeError> {
        match attributes.iter().next() {
            None => Ok(()),
            Some((name, _)) => Err(DecodeError::Custom(format!(
                "component takes no attributes, got `{name}`"
            ))),
        }
    }

    fn on_mount(&mut self) {}

    fn on_dismount(&mut self) {}
}

impl dyn Component {
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

impl fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Component")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RenderError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<fmt::Error> for RenderError {
    fn from(err: fmt::Error) -> Self {
        RenderError::with_source("formatting markup failed", err)
    }
}

type Factory = Box<dyn Fn() -> Box<dyn Component>>;

/// Maps component tags to constructors.
///
/// Tags are matched the way the tokenizer emits them: ASCII lowercase.
#[derive(Default)]
pub struct Registry {
    factories: HashMap<String, Factory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `tag`. Returns `true` if an earlier registration was replaced.
    pub fn register<F>(&mut self, tag: &str, factory: F) -> bool
    where
        F: Fn() -> Box<dyn Component> + 'static,
    {
        self.factories
            .insert(tag.to_ascii_lowercase(), Box::new(factory))
            .is_some()
    }

    pub fn register_default<T: Component + Default>(&mut self, tag: &str) -> bool {
        self.register(tag, || Box::new(T::default()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    pub fn create(&self, tag: &str) -> Option<Box<dyn Component>> {
        self.factories.get(tag).map(|factory| factory())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl ComponentTags for Registry {
    fn is_component(&self, tag: &str) -> bool {
        self.contains(tag)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.factories.keys().collect();
        tags.sort_unstable();
        f.debug_struct("Registry").field("tags", &tags).finish()
    }
}
