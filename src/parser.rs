use crate::error::{ParseError, Position};
use crate::tree::*;

/// Parser state: tracks position in the input string.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
    /// Number of blocks currently open.
    depth: usize,
}

/// Deepest block nesting accepted before parsing fails.
pub const MAX_NESTING: usize = 256;

/// Parse a stylesheet that has no known origin.
pub fn parse(input: &str) -> Result<Root, ParseError> {
    parse_with_source(input, None)
}

/// Parse a stylesheet, remembering where it was loaded from.
pub fn parse_with_source(input: &str, source: Option<&str>) -> Result<Root, ParseError> {
    let mut parser = Parser {
        input,
        pos: 0,
        depth: 0,
    };
    let nodes = parser.parse_nodes(true)?;
    Ok(Root {
        nodes,
        source: source.map(str::to_string),
    })
}

impl<'a> Parser<'a> {
    // ── Helpers ──────────────────────────────────────────────────────

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    fn starts_with(&self, s: &str) -> bool {
        self.remaining().starts_with(s)
    }

    fn eat_char(&mut self, ch: char) -> bool {
        if self.peek_char() == Some(ch) {
            self.advance(ch.len_utf8());
            true
        } else {
            false
        }
    }

    fn expect_char(&mut self, ch: char) -> Result<(), ParseError> {
        if self.eat_char(ch) {
            Ok(())
        } else {
            Err(self.error_point(format!("Expected '{}'", ch)))
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Current position in the source.
    fn position(&self) -> Position {
        self.position_at(self.pos)
    }

    fn position_at(&self, offset: usize) -> Position {
        let consumed = &self.input[..offset];
        let line = consumed.matches('\n').count();
        let last_newline = consumed.rfind('\n').map(|i| i + 1).unwrap_or(0);
        Position {
            line,
            column: offset - last_newline,
            offset,
        }
    }

    /// Create an error at a single point (current position).
    fn error_point(&self, message: String) -> ParseError {
        let pos = self.position();
        ParseError::syntax_error(message, pos, pos)
    }

    /// Create an error spanning from `begin` to the current position.
    fn error_span(&self, message: String, begin: Position) -> ParseError {
        ParseError::syntax_error(message, begin, self.position())
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.advance(ch.len_utf8());
            } else {
                break;
            }
        }
    }

    // ── Node lists ──────────────────────────────────────────────────

    /// Parse nodes until end of input (top level) or until a `}` that
    /// closes the enclosing block. The closing brace is left for the caller.
    fn parse_nodes(&mut self, top_level: bool) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_ws();
            match self.peek_char() {
                None => return Ok(nodes),
                Some('}') if top_level => {
                    return Err(self.error_point("Unexpected '}'".to_string()));
                }
                Some('}') => return Ok(nodes),
                Some(';') => self.advance(1),
                Some('@') => nodes.push(Node::AtRule(self.parse_at_rule()?)),
                Some('/') if self.starts_with("/*") => {
                    nodes.push(Node::Comment(self.parse_comment()?));
                }
                Some(_) => nodes.push(self.parse_rule_or_decl()?),
            }
        }
    }

    fn parse_block(&mut self) -> Result<Vec<Node>, ParseError> {
        let begin = self.position();
        if self.depth >= MAX_NESTING {
            return Err(self.error_point(format!(
                "Blocks nested deeper than {} levels",
                MAX_NESTING
            )));
        }
        self.expect_char('{')?;
        self.depth += 1;
        let nodes = self.parse_nodes(false);
        self.depth -= 1;
        let nodes = nodes?;
        if self.eat_char('}') {
            Ok(nodes)
        } else {
            Err(self.error_span("Unclosed block".to_string(), begin))
        }
    }

    // ── Statements ──────────────────────────────────────────────────

    fn parse_comment(&mut self) -> Result<String, ParseError> {
        let begin = self.position();
        self.advance(2);
        match self.remaining().find("*/") {
            Some(end) => {
                let text = self.remaining()[..end].trim().to_string();
                self.advance(end + 2);
                Ok(text)
            }
            None => {
                self.pos = self.input.len();
                Err(self.error_span("Unclosed comment".to_string(), begin))
            }
        }
    }

    fn parse_at_rule(&mut self) -> Result<AtRule, ParseError> {
        let begin = self.position();
        self.expect_char('@')?;
        let name_start = self.pos;
        while let Some(ch) = self.peek_char() {
            if is_name_char(ch) {
                self.advance(ch.len_utf8());
            } else {
                break;
            }
        }
        if self.pos == name_start {
            return Err(self.error_span("At-rule without name".to_string(), begin));
        }
        let name = self.input[name_start..self.pos].to_string();
        let params = self.parse_prelude()?;

        match self.peek_char() {
            Some('{') => {
                let nodes = self.parse_block()?;
                Ok(AtRule::with_nodes(name, params, nodes))
            }
            Some(';') => {
                self.advance(1);
                Ok(AtRule::new(name, params))
            }
            // `}` or end of input: the last statement of a block may omit `;`
            _ => Ok(AtRule::new(name, params)),
        }
    }

    fn parse_rule_or_decl(&mut self) -> Result<Node, ParseError> {
        let begin = self.position();
        let prelude = self.parse_prelude()?;

        if self.peek_char() == Some('{') {
            let nodes = self.parse_block()?;
            return Ok(Node::Rule(Rule {
                selector: prelude,
                nodes,
            }));
        }

        let end = self.position();
        self.eat_char(';');
        match prelude.split_once(':') {
            Some((prop, value)) if !prop.trim().is_empty() => Ok(Node::Decl(Decl {
                prop: prop.trim().to_string(),
                value: value.trim().to_string(),
            })),
            _ => Err(ParseError::syntax_error(
                format!("Unknown word '{}'", prelude),
                begin,
                end,
            )),
        }
    }

    /// Consume raw text up to the next `;`, `{` or `}` that is not inside
    /// quotes, parentheses or a comment. Comments are dropped from the
    /// returned text. The terminator itself is not consumed.
    fn parse_prelude(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let mut text = String::new();
        let mut chunk_start = self.pos;
        let mut depth = 0usize;
        while let Some(ch) = self.peek_char() {
            match ch {
                '"' | '\'' => {
                    self.skip_string(ch)?;
                    continue;
                }
                '/' if self.starts_with("/*") => {
                    text.push_str(&self.input[chunk_start..self.pos]);
                    self.parse_comment()?;
                    chunk_start = self.pos;
                    continue;
                }
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ';' | '{' | '}' if depth == 0 => break,
                _ => {}
            }
            self.advance(ch.len_utf8());
        }
        if depth > 0 && self.at_end() {
            let begin = self.position_at(start);
            return Err(self.error_span("Unclosed bracket".to_string(), begin));
        }
        text.push_str(&self.input[chunk_start..self.pos]);
        Ok(text.trim().to_string())
    }

    /// Skip over a quoted string. A backslash escapes the next character.
    fn skip_string(&mut self, quote: char) -> Result<(), ParseError> {
        let begin = self.position();
        self.advance(quote.len_utf8());
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    return Err(self.error_span("Unclosed string".to_string(), begin));
                }
                Some('\\') => {
                    self.advance(1);
                    if let Some(next) = self.peek_char() {
                        self.advance(next.len_utf8());
                    }
                }
                Some(ch) if ch == quote => {
                    self.advance(ch.len_utf8());
                    return Ok(());
                }
                Some(ch) => self.advance(ch.len_utf8()),
            }
        }
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_rules_and_at_rules() {
        let root = parse(".a {\n  color: red;\n  @mixin foo from './bar.css';\n}\n").unwrap();
        assert_eq!(root.nodes.len(), 1);
        let Node::Rule(rule) = &root.nodes[0] else {
            panic!("expected a rule, got {:?}", root.nodes[0]);
        };
        assert_eq!(rule.selector, ".a");
        assert_eq!(
            rule.nodes,
            vec![
                Node::Decl(Decl {
                    prop: "color".to_string(),
                    value: "red".to_string(),
                }),
                Node::AtRule(AtRule::new("mixin", "foo from './bar.css'")),
            ]
        );
    }

    #[test]
    fn test_parse_at_rule_with_block() {
        let root = parse("@define-mixin foo { color: red; }").unwrap();
        assert_eq!(
            root.nodes,
            vec![Node::AtRule(AtRule::with_nodes(
                "define-mixin",
                "foo",
                vec![Node::Decl(Decl {
                    prop: "color".to_string(),
                    value: "red".to_string(),
                })],
            ))]
        );
    }

    #[test]
    fn test_last_statement_may_omit_semicolon() {
        let root = parse("a { color: red }").unwrap();
        let Node::Rule(rule) = &root.nodes[0] else {
            panic!("expected a rule");
        };
        assert_eq!(rule.nodes.len(), 1);
    }

    #[test]
    fn test_braces_inside_strings_are_not_structure() {
        let root = parse("a { content: \"}{;\"; }").unwrap();
        let Node::Rule(rule) = &root.nodes[0] else {
            panic!("expected a rule");
        };
        assert_eq!(
            rule.nodes[0],
            Node::Decl(Decl {
                prop: "content".to_string(),
                value: "\"}{;\"".to_string(),
            })
        );
    }

    #[test]
    fn test_semicolon_inside_parens() {
        let root = parse("a { background: url(data:image/png;base64,AAA); }").unwrap();
        let Node::Rule(rule) = &root.nodes[0] else {
            panic!("expected a rule");
        };
        assert_eq!(rule.nodes.len(), 1);
    }

    #[test]
    fn test_comments_are_kept() {
        let root = parse("/* hello */\na {}").unwrap();
        assert_eq!(root.nodes[0], Node::Comment("hello".to_string()));
    }

    #[test]
    fn test_source_is_recorded() {
        let root = parse_with_source("", Some("/a/b.css")).unwrap();
        assert!(root.nodes.is_empty());
        assert_eq!(root.source.as_deref(), Some("/a/b.css"));
    }

    #[test]
    fn test_error_unclosed_block() {
        let err = parse("a {\n  color: red;\n").unwrap_err();
        assert_eq!(err.code, "css-syntax-error");
        assert_eq!(err.message, "Unclosed block");
        assert_eq!(err.begin.line, 0);
        assert_eq!(err.begin.column, 2);
        assert!(err.begin.offset < err.end.offset);
    }

    #[test]
    fn test_error_unexpected_close() {
        let err = parse("a {}\n}").unwrap_err();
        assert_eq!(err.message, "Unexpected '}'");
        assert_eq!(err.begin.line, 1);
    }

    #[test]
    fn test_error_unclosed_string() {
        let err = parse("a { content: \"oops\n}").unwrap_err();
        assert_eq!(err.message, "Unclosed string");
        assert_eq!(err.begin.line, 0);
    }

    #[test]
    fn test_error_unclosed_comment() {
        let err = parse("a {} /* never").unwrap_err();
        assert_eq!(err.message, "Unclosed comment");
    }

    #[test]
    fn test_error_unknown_word() {
        let err = parse("a { color }").unwrap_err();
        assert!(err.message.starts_with("Unknown word"));
    }

    #[test]
    fn test_comment_inside_value_is_dropped() {
        let root = parse("a { margin: 0 /* don't touch */; }").unwrap();
        let Node::Rule(rule) = &root.nodes[0] else {
            panic!("expected a rule");
        };
        assert_eq!(
            rule.nodes,
            vec![Node::Decl(Decl {
                prop: "margin".to_string(),
                value: "0".to_string(),
            })]
        );
    }

    #[test]
    fn test_terminators_inside_comment_are_not_structure() {
        let root = parse("a /* { */ { color: red /* ; } */; }").unwrap();
        let Node::Rule(rule) = &root.nodes[0] else {
            panic!("expected a rule");
        };
        assert_eq!(rule.selector, "a");
        assert_eq!(
            rule.nodes,
            vec![Node::Decl(Decl {
                prop: "color".to_string(),
                value: "red".to_string(),
            })]
        );
    }

    #[test]
    fn test_comment_is_dropped_from_at_rule_params() {
        let root = parse("@mixin foo from './bar' /* shared */;").unwrap();
        assert_eq!(
            root.nodes,
            vec![Node::AtRule(AtRule::new("mixin", "foo from './bar'"))]
        );
    }

    #[test]
    fn test_error_unclosed_comment_in_value() {
        let err = parse("a { color: red /* oops }").unwrap_err();
        assert_eq!(err.message, "Unclosed comment");
    }

    #[test]
    fn test_nesting_limit() {
        let deep = "a {".repeat(MAX_NESTING + 1) + &"}".repeat(MAX_NESTING + 1);
        let err = parse(&deep).unwrap_err();
        assert!(err.message.starts_with("Blocks nested deeper than"));

        let ok = "a {".repeat(MAX_NESTING) + &"}".repeat(MAX_NESTING);
        assert!(parse(&ok).is_ok());
    }
}
