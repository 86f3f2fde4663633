use crate::node::VisualNode;

/// Owns one display node and offers class-name helpers on it.
#[derive(Clone, Debug)]
pub struct NodeWrapper {
    node: VisualNode,
}

impl NodeWrapper {
    pub fn new() -> Self {
        Self::with_node(VisualNode::new("div"))
    }

    pub fn with_node(node: VisualNode) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &VisualNode {
        &self.node
    }

    pub fn id(&self) -> String {
        self.node.id()
    }

    pub fn set_id(&self, id: impl Into<String>) {
        self.node.set_id(id);
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.node.has_class(name)
    }

    pub fn add_class(&self, name: &str) {
        self.node.add_class(name);
    }

    pub fn remove_class(&self, name: &str) {
        self.node.remove_class(name);
    }

    /// Add or remove `name`. With `force` unset the class is flipped.
    ///
    /// Returns whether the class is present afterwards.
    pub fn toggle_class(&self, name: &str, force: Option<bool>) -> bool {
        let present = force.unwrap_or_else(|| !self.has_class(name));
        if present {
            self.add_class(name);
        } else {
            self.remove_class(name);
        }
        present
    }
}

impl Default for NodeWrapper {
    fn default() -> Self {
        Self::new()
    }
}
