use crate::tree::*;

struct CssWriter {
    buf: String,
    depth: usize,
}

impl CssWriter {
    fn new() -> Self {
        CssWriter {
            buf: String::new(),
            depth: 0,
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.buf.push_str("  ");
        }
    }

    fn write_nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.indent();
            self.write_node(node);
            self.buf.push('\n');
        }
    }

    fn write_node(&mut self, node: &Node) {
        match node {
            Node::Rule(rule) => {
                self.buf.push_str(&rule.selector);
                self.buf.push(' ');
                self.write_block(&rule.nodes);
            }
            Node::AtRule(at) => {
                self.buf.push('@');
                self.buf.push_str(&at.name);
                if !at.params.is_empty() {
                    self.buf.push(' ');
                    self.buf.push_str(&at.params);
                }
                match &at.nodes {
                    Some(nodes) => {
                        self.buf.push(' ');
                        self.write_block(nodes);
                    }
                    None => self.buf.push(';'),
                }
            }
            Node::Decl(decl) => {
                self.buf.push_str(&decl.prop);
                self.buf.push_str(": ");
                self.buf.push_str(&decl.value);
                self.buf.push(';');
            }
            Node::Comment(text) => {
                self.buf.push_str("/* ");
                self.buf.push_str(text);
                self.buf.push_str(" */");
            }
        }
    }

    fn write_block(&mut self, nodes: &[Node]) {
        if nodes.is_empty() {
            self.buf.push_str("{}");
            return;
        }
        self.buf.push_str("{\n");
        self.depth += 1;
        self.write_nodes(nodes);
        self.depth -= 1;
        self.indent();
        self.buf.push('}');
    }
}

/// Print a stylesheet in canonical form: one statement per line,
/// blocks indented by two spaces.
pub fn to_css(root: &Root) -> String {
    let mut w = CssWriter::new();
    w.write_nodes(&root.nodes);
    w.buf
}

/// Print a single node (and its block) without a trailing newline.
pub fn node_to_css(node: &Node) -> String {
    let mut w = CssWriter::new();
    w.write_node(node);
    w.buf
}
