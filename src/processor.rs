use crate::error::{Error, Result};
use crate::graft::Definition;
use crate::options::Options;
use crate::parser::parse_with_source;
use crate::reference::{resolve, Reference};
use crate::stringify::to_css;
use crate::tree::Root;
use futures::future::try_join_all;

/// Name of the at-rule that requests a mixin.
pub const MIXIN_DIRECTIVE: &str = "mixin";

/// Inlines mixin definitions referenced with `@mixin name from 'file'`.
///
/// ```css
/// .foo {
///   @mixin fancyMixin from './fooMixin';
/// }
/// ```
///
/// The `@define-mixin fancyMixin` found in `fooMixin.css` is added to the top
/// of the requesting stylesheet and the directive becomes `@mixin fancyMixin;`,
/// ready for a regular mixin pass.
#[derive(Debug, Clone, Default)]
pub struct MixinFrom {
    options: Options,
}

impl MixinFrom {
    pub fn new(options: Options) -> Self {
        MixinFrom { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Resolve every `from` directive in `root` and graft the definitions.
    ///
    /// All loads are started before any is awaited. Definitions are grafted
    /// only once every load has succeeded, each at the top of the stylesheet,
    /// so the grafted block lists them in directive order. On error, the
    /// directive rewrites already made are kept and nothing is grafted.
    ///
    /// A missing loader fails the call before the tree is touched, even when
    /// the stylesheet has no `from` directive at all.
    pub async fn process(&self, root: &mut Root) -> Result<()> {
        let loader = self.options.loader.as_ref().ok_or(Error::Config)?;

        let references = self.collect_references(root);
        if references.is_empty() {
            return Ok(());
        }

        let loads = references.iter().map(|reference| {
            tracing::trace!(location = %reference.location, "loading mixin source");
            loader.load(&reference.location, reference.base.as_deref())
        });
        let texts = try_join_all(loads).await.map_err(Error::Load)?;

        let definitions = references
            .iter()
            .zip(&texts)
            .map(|(reference, text)| Definition::extract(text, reference, self.options.definitions))
            .collect::<Result<Vec<_>>>()?;

        for definition in definitions.into_iter().rev() {
            tracing::debug!(
                mixin = %definition.name,
                location = %definition.location,
                "grafting mixin definition"
            );
            root.prepend(definition.into_node());
        }
        Ok(())
    }

    /// Parse `css`, process it and print the result.
    pub async fn process_css(&self, css: &str, source: Option<&str>) -> Result<String> {
        let mut root = parse_with_source(css, source).map_err(|err| Error::Parse {
            location: source.unwrap_or("<input>").to_string(),
            source: err,
        })?;
        self.process(&mut root).await?;
        Ok(to_css(&root))
    }

    /// Find the `from` directives, rewrite each to a plain `@mixin name`
    /// and return what has to be fetched, in document order.
    fn collect_references(&self, root: &mut Root) -> Vec<Reference> {
        let source = root.source.clone();
        let suffix = self.options.default_suffix.as_str();
        let resolution = self.options.resolution;

        let mut references = Vec::new();
        root.walk_at_rules_mut(MIXIN_DIRECTIVE, |at| {
            if let Some(reference) = resolve(&at.params, source.as_deref(), suffix, resolution) {
                tracing::debug!(
                    mixin = %reference.mixin_name,
                    location = %reference.location,
                    "resolved mixin reference"
                );
                at.params = reference.mixin_name.clone();
                references.push(reference);
            }
        });
        references
    }
}
