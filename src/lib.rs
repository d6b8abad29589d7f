pub mod error;
pub mod graft;
pub mod loader;
pub mod options;
pub mod parser;
pub mod processor;
pub mod reference;
pub mod stringify;
pub mod tree;

pub use error::{Error, ParseError, Result};
pub use loader::{FileLoader, MemoryLoader};
pub use options::{DefinitionForm, Options, Resolution};
pub use processor::MixinFrom;
pub use tree::Root;

// ── Core API ───────────────────────────────────────────────────────

/// Parse `css`, inline every `@mixin name from <location>` definition
/// using `options`, and return the printed stylesheet.
pub async fn mixin_from(css: &str, source: Option<&str>, options: Options) -> Result<String> {
    MixinFrom::new(options).process_css(css, source).await
}
