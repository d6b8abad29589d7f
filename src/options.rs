use crate::loader::FileLoader;
use std::fmt;
use std::sync::Arc;

/// Who turns a relative location into something loadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// Resolve against the consuming stylesheet's directory before loading.
    /// The loader only ever sees the resolved location.
    #[default]
    PathStack,
    /// Pass the location as written (plus suffix) together with the
    /// consuming stylesheet's source, and let the loader decide.
    LoaderRelative,
}

/// Which at-rule keyword marks a mixin definition in fetched stylesheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefinitionForm {
    /// `@define-mixin name { ... }`, grafted as is.
    #[default]
    Direct,
    /// `@mixin-definition name { ... }`, renamed to `@define-mixin` when it
    /// is grafted so an earlier mixin pass over the source file leaves it alone.
    Deferred,
}

pub const DEFINE_MIXIN: &str = "define-mixin";
pub const MIXIN_DEFINITION: &str = "mixin-definition";

impl DefinitionForm {
    /// Keyword to look for in the fetched stylesheet.
    pub fn keyword(self) -> &'static str {
        match self {
            DefinitionForm::Direct => DEFINE_MIXIN,
            DefinitionForm::Deferred => MIXIN_DEFINITION,
        }
    }
}

/// Construction-time settings for [`crate::MixinFrom`].
#[derive(Clone)]
pub struct Options {
    pub loader: Option<Arc<dyn FileLoader>>,
    pub default_suffix: String,
    pub resolution: Resolution,
    pub definitions: DefinitionForm,
}

impl Options {
    pub fn new() -> Self {
        Options::default()
    }

    pub fn loader(mut self, loader: impl FileLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn default_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.default_suffix = suffix.into();
        self
    }

    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn definitions(mut self, definitions: DefinitionForm) -> Self {
        self.definitions = definitions;
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Options {
            loader: None,
            default_suffix: ".css".to_string(),
            resolution: Resolution::default(),
            definitions: DefinitionForm::default(),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("loader", &self.loader.as_ref().map(|_| "<loader>"))
            .field("default_suffix", &self.default_suffix)
            .field("resolution", &self.resolution)
            .field("definitions", &self.definitions)
            .finish()
    }
}
