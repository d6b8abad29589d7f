use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;

/// Fetches the text of a stylesheet named by a resolved location.
///
/// `base` is the consuming stylesheet's source when the loader is expected
/// to interpret relative locations itself, and `None` otherwise. Access
/// policy (which paths may be read, how) belongs entirely to the loader.
pub trait FileLoader: Send + Sync {
    fn load(
        &self,
        location: &str,
        base: Option<&str>,
    ) -> BoxFuture<'static, anyhow::Result<String>>;
}

impl<F, Fut> FileLoader for F
where
    F: Fn(String, Option<String>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
{
    fn load(
        &self,
        location: &str,
        base: Option<&str>,
    ) -> BoxFuture<'static, anyhow::Result<String>> {
        self(location.to_string(), base.map(str::to_string)).boxed()
    }
}

/// A loader backed by an in-memory map from location to stylesheet text.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        MemoryLoader::default()
    }

    pub fn with_file(mut self, location: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.insert(location.into(), text.into());
        self
    }
}

impl FileLoader for MemoryLoader {
    fn load(
        &self,
        location: &str,
        _base: Option<&str>,
    ) -> BoxFuture<'static, anyhow::Result<String>> {
        let result = self
            .files
            .get(location)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No such file: {}", location));
        futures::future::ready(result).boxed()
    }
}
