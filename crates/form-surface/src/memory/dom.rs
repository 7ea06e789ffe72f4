use std::collections::BTreeMap;

use crate::query::Query;

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<usize>,
    pub parent: Option<usize>,
    pub checked: bool,
    pub hidden: bool,
    pub generation: u64,
}

impl Node {
    fn new(tag: &str, parent: Option<usize>) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
            parent,
            checked: false,
            hidden: false,
            generation: 0,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn is_input(&self, kind: &str) -> bool {
        self.tag == "input" && self.attr("type") == Some(kind)
    }
}

const BLOCK_TAGS: &[&str] = &[
    "div", "p", "tr", "li", "ul", "table", "fieldset", "legend", "h5", "section", "textarea",
];

/// Arena-backed element tree. Node 0 is the document root.
#[derive(Clone, Debug)]
pub(crate) struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    pub const ROOT: usize = 0;

    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("html", None)],
        }
    }

    pub fn add(&mut self, parent: usize, tag: &str) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::new(tag, Some(parent)));
        self.nodes[parent].children.push(id);
        id
    }

    pub fn add_text(&mut self, parent: usize, tag: &str, text: &str) -> usize {
        let id = self.add(parent, tag);
        self.nodes[id].text = text.to_string();
        id
    }

    pub fn set_attr(&mut self, id: usize, name: &str, value: &str) -> &mut Self {
        self.nodes[id]
            .attrs
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn set_hidden(&mut self, id: usize, hidden: bool) {
        self.nodes[id].hidden = hidden;
    }

    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: usize) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn is_visible(&self, id: usize) -> bool {
        let mut current = Some(id);
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if node.hidden {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Visible text of the node and its visible descendants. Block elements
    /// start a new line, inline ones are separated by a space.
    pub fn text_of(&self, id: usize) -> String {
        let mut raw = String::new();
        self.collect_text(id, &mut raw);
        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn collect_text(&self, id: usize, out: &mut String) {
        let node = &self.nodes[id];
        if node.hidden {
            return;
        }
        let block = BLOCK_TAGS.contains(&node.tag.as_str());
        if block {
            out.push('\n');
        }
        let own = node.text.trim();
        if !own.is_empty() {
            out.push(' ');
            out.push_str(own);
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
        if block {
            out.push('\n');
        }
    }

    /// Visible descendants in document order, excluding `scope` itself.
    pub fn descendants(&self, scope: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[scope].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.hidden {
                continue;
            }
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Every descendant in document order, hidden ones included.
    pub fn subtree(&self, scope: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[scope].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children.iter().rev().copied());
        }
        out
    }

    pub fn ancestors(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.nodes[id].parent, move |idx| self.nodes[*idx].parent)
    }

    pub fn matches(&self, id: usize, query: &Query) -> bool {
        let node = &self.nodes[id];
        if !query.matches_tag(&node.tag) {
            return false;
        }
        if !query
            .attrs
            .iter()
            .all(|filter| filter.matches(node.attr(&filter.name)))
        {
            return false;
        }
        if let Some(text) = &query.text {
            if !text.matches(&self.text_of(id)) {
                return false;
            }
        }
        if let Some(descendant) = &query.has_descendant {
            return self
                .descendants(id)
                .into_iter()
                .any(|child| self.matches(child, descendant));
        }
        true
    }

    pub fn find(&self, scope: usize, query: &Query) -> Vec<usize> {
        if !self.is_visible(scope) {
            return Vec::new();
        }
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.matches(*id, query))
            .collect()
    }

    pub fn find_by_attr(&self, name: &str, value: &str) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|id| self.nodes[*id].attr(name) == Some(value))
            .collect()
    }

    /// Simulates a re-render: every existing handle becomes stale.
    pub fn rerender(&mut self) {
        for node in &mut self.nodes {
            node.generation += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_subtrees_are_not_found() {
        let mut dom = Dom::new();
        let panel = dom.add(Dom::ROOT, "div");
        dom.add_text(panel, "button", "Ok");
        assert_eq!(dom.find(Dom::ROOT, &Query::tag("button")).len(), 1);
        dom.node_mut(panel).unwrap().hidden = true;
        assert!(dom.find(Dom::ROOT, &Query::tag("button")).is_empty());
    }

    #[test]
    fn block_children_render_on_their_own_lines() {
        let mut dom = Dom::new();
        let set = dom.add(Dom::ROOT, "fieldset");
        dom.add_text(set, "legend", "Características do trabalho");
        dom.add_text(set, "div", "TRABALHO A QUENTE");
        assert_eq!(
            dom.text_of(set),
            "Características do trabalho\nTRABALHO A QUENTE"
        );
    }

    #[test]
    fn text_includes_descendants() {
        let mut dom = Dom::new();
        let row = dom.add(Dom::ROOT, "tr");
        dom.add_text(row, "td", "001");
        dom.add_text(row, "td", "Trabalho em altura?");
        assert_eq!(dom.text_of(row), "001 Trabalho em altura?");
        assert!(dom.matches(
            row,
            &Query::tag("tr").has(Query::tag("td").text_contains("altura"))
        ));
    }
}
