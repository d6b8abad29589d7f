/// A declaration inside a block: `color: red`.
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub prop: String,
    pub value: String,
}

/// A qualified rule: `selector { nodes }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub nodes: Vec<Node>,
}

/// An at-rule: `@name params;` or `@name params { nodes }`.
///
/// `nodes` is `None` for the block-less form and `Some` (possibly empty)
/// when the at-rule carries a block.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub name: String,
    pub params: String,
    pub nodes: Option<Vec<Node>>,
}

/// Any node that can appear in a stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
    Decl(Decl),
    /// Comment text without the `/*` `*/` delimiters.
    Comment(String),
}

/// A parsed stylesheet together with the identity it was loaded from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    pub nodes: Vec<Node>,
    /// Where the stylesheet came from (usually a file path). Used as the
    /// base when resolving relative references.
    pub source: Option<String>,
}

impl AtRule {
    pub fn new(name: impl Into<String>, params: impl Into<String>) -> Self {
        AtRule {
            name: name.into(),
            params: params.into(),
            nodes: None,
        }
    }

    pub fn with_nodes(
        name: impl Into<String>,
        params: impl Into<String>,
        nodes: Vec<Node>,
    ) -> Self {
        AtRule {
            name: name.into(),
            params: params.into(),
            nodes: Some(nodes),
        }
    }
}

impl Node {
    /// Child nodes of a container node, if it has a block.
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Rule(rule) => Some(&rule.nodes),
            Node::AtRule(at) => at.nodes.as_ref(),
            Node::Decl(_) | Node::Comment(_) => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Rule(rule) => Some(&mut rule.nodes),
            Node::AtRule(at) => at.nodes.as_mut(),
            Node::Decl(_) | Node::Comment(_) => None,
        }
    }

    pub fn as_at_rule(&self) -> Option<&AtRule> {
        match self {
            Node::AtRule(at) => Some(at),
            _ => None,
        }
    }
}

impl Root {
    pub fn new() -> Self {
        Root::default()
    }

    /// Insert a node as the first child of the stylesheet.
    pub fn prepend(&mut self, node: Node) {
        self.nodes.insert(0, node);
    }

    /// Visit every at-rule called `name`, depth-first in declaration order,
    /// including at-rules nested inside rule and at-rule blocks.
    pub fn walk_at_rules_mut<F>(&mut self, name: &str, mut visit: F)
    where
        F: FnMut(&mut AtRule),
    {
        walk_at_rules_mut(&mut self.nodes, name, &mut visit);
    }

    /// Count at-rules called `name` anywhere in the tree.
    pub fn count_at_rules(&self, name: &str) -> usize {
        count_at_rules(&self.nodes, name)
    }

    /// Detach and return the first at-rule (depth-first) for which
    /// `matches` holds. The rest of the tree is left in place.
    pub fn take_at_rule<P>(&mut self, matches: P) -> Option<AtRule>
    where
        P: Fn(&AtRule) -> bool,
    {
        take_at_rule(&mut self.nodes, &matches)
    }
}

fn walk_at_rules_mut<F>(nodes: &mut [Node], name: &str, visit: &mut F)
where
    F: FnMut(&mut AtRule),
{
    for node in nodes.iter_mut() {
        if let Node::AtRule(at) = node {
            if at.name == name {
                visit(at);
            }
        }
        if let Some(children) = node.children_mut() {
            walk_at_rules_mut(children, name, visit);
        }
    }
}

fn count_at_rules(nodes: &[Node], name: &str) -> usize {
    nodes
        .iter()
        .map(|node| {
            let own = matches!(node, Node::AtRule(at) if at.name == name) as usize;
            own + node.children().map_or(0, |c| count_at_rules(c, name))
        })
        .sum()
}

fn take_at_rule<P>(nodes: &mut Vec<Node>, matches: &P) -> Option<AtRule>
where
    P: Fn(&AtRule) -> bool,
{
    for i in 0..nodes.len() {
        if nodes[i].as_at_rule().is_some_and(|at| matches(at)) {
            match nodes.remove(i) {
                Node::AtRule(at) => return Some(at),
                _ => unreachable!(),
            }
        }
        if let Some(children) = nodes[i].children_mut() {
            if let Some(found) = take_at_rule(children, matches) {
                return Some(found);
            }
        }
    }
    None
}
