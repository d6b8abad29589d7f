use crate::error::{Error, Result};
use crate::options::{DefinitionForm, DEFINE_MIXIN};
use crate::parser::parse_with_source;
use crate::reference::Reference;
use crate::tree::{AtRule, Node};

/// A mixin definition pulled out of a fetched stylesheet, waiting to be
/// grafted. It keeps whatever keyword it was written with until
/// [`Definition::into_node`] turns it into `@define-mixin`.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    pub location: String,
    rule: AtRule,
}

impl Definition {
    /// Parse `text` (the contents of `reference.location`) and detach the
    /// first definition named `reference.mixin_name`.
    pub fn extract(text: &str, reference: &Reference, form: DefinitionForm) -> Result<Definition> {
        let mut foreign =
            parse_with_source(text, Some(&reference.location)).map_err(|source| Error::Parse {
                location: reference.location.clone(),
                source,
            })?;

        let keyword = form.keyword();
        let rule = foreign
            .take_at_rule(|at| at.name == keyword && at.params == reference.mixin_name)
            .ok_or_else(|| Error::DefinitionNotFound {
                name: reference.mixin_name.clone(),
                location: reference.location.clone(),
            })?;

        Ok(Definition {
            name: reference.mixin_name.clone(),
            location: reference.location.clone(),
            rule,
        })
    }

    /// The keyword the definition was found under.
    pub fn keyword(&self) -> &str {
        &self.rule.name
    }

    /// The node to insert into the consuming stylesheet.
    pub fn into_node(self) -> Node {
        let mut rule = self.rule;
        rule.name = DEFINE_MIXIN.to_string();
        Node::AtRule(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stringify::node_to_css;

    fn reference(name: &str) -> Reference {
        Reference {
            mixin_name: name.to_string(),
            location: "/mixins.css".to_string(),
            base: None,
        }
    }

    #[test]
    fn test_extracts_named_definition() {
        let text = "@define-mixin a { color: red; }\n@define-mixin b { color: blue; }";
        let def = Definition::extract(text, &reference("b"), DefinitionForm::Direct).unwrap();
        assert_eq!(def.name, "b");
        assert_eq!(
            node_to_css(&def.into_node()),
            "@define-mixin b {\n  color: blue;\n}"
        );
    }

    #[test]
    fn test_first_matching_definition_wins() {
        let text = "@define-mixin a { color: red; }\n@define-mixin a { color: blue; }";
        let def = Definition::extract(text, &reference("a"), DefinitionForm::Direct).unwrap();
        assert_eq!(
            node_to_css(&def.into_node()),
            "@define-mixin a {\n  color: red;\n}"
        );
    }

    #[test]
    fn test_nested_definition_is_found() {
        let text = "@media screen { @define-mixin a { color: red; } }";
        assert!(Definition::extract(text, &reference("a"), DefinitionForm::Direct).is_ok());
    }

    #[test]
    fn test_deferred_definition_is_renamed_on_graft() {
        let text = "@mixin-definition a { color: red; }";
        let def = Definition::extract(text, &reference("a"), DefinitionForm::Deferred).unwrap();
        assert_eq!(def.keyword(), "mixin-definition");
        let node = def.into_node();
        assert_eq!(node.as_at_rule().map(|at| at.name.as_str()), Some("define-mixin"));
    }

    #[test]
    fn test_deferred_form_ignores_direct_keyword() {
        let text = "@define-mixin a { color: red; }";
        let err = Definition::extract(text, &reference("a"), DefinitionForm::Deferred).unwrap_err();
        assert!(matches!(err, Error::DefinitionNotFound { .. }));
    }

    #[test]
    fn test_missing_definition() {
        let err = Definition::extract("", &reference("a"), DefinitionForm::Direct).unwrap_err();
        assert_eq!(err.to_string(), "Failed to find mixin a at /mixins.css");
    }

    #[test]
    fn test_unparseable_text() {
        let err =
            Definition::extract("@define-mixin a {", &reference("a"), DefinitionForm::Direct)
                .unwrap_err();
        match err {
            Error::Parse { location, source } => {
                assert_eq!(location, "/mixins.css");
                assert_eq!(source.message, "Unclosed block");
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
    }
}
