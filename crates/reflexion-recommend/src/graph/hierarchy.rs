//! Containment hierarchy: parents, children, ascendants, descendants.

use reflexion_core::errors::GraphError;

use super::reflexion_graph::ReflexionGraph;

impl ReflexionGraph {
    /// Make `parent` the parent of `child`, or detach `child` with `None`.
    /// Both nodes must live in the same subgraph; cycles are rejected.
    pub fn set_parent(&mut self, child: &str, parent: Option<&str>) -> Result<(), GraphError> {
        let child_idx = self.require_node(child)?;
        if let Some(parent) = parent {
            let parent_idx = self.require_node(parent)?;
            self.require_subgraph(parent_idx, self.graph[child_idx].subgraph)?;
            if self.ascendants(parent).iter().any(|a| a == child) {
                return Err(GraphError::HierarchyCycle {
                    child: child.to_string(),
                    parent: parent.to_string(),
                });
            }
        }

        let before = self.snapshot_mapping(&[child.to_string()]);
        let old_parent = self.parents.get(child).cloned();
        let old_ascendants = old_parent
            .as_deref()
            .map(|p| self.ascendants(p))
            .unwrap_or_default();

        if let Some(old_parent) = self.parents.remove(child) {
            if let Some(siblings) = self.children.get_mut(&old_parent) {
                siblings.retain(|c| c != child);
            }
        }
        if let Some(parent) = parent {
            self.parents.insert(child.to_string(), parent.to_string());
            self.children
                .entry(parent.to_string())
                .or_default()
                .push(child.to_string());
        }

        self.publish_mapping_diff(before);
        if old_parent.as_deref() != parent {
            let new_ascendants = parent.map(|p| self.ascendants(p)).unwrap_or_default();
            self.publish_hierarchy_change(child, old_ascendants, new_ascendants);
        }
        self.refresh_states();
        Ok(())
    }

    pub fn parent(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    pub fn children(&self, id: &str) -> &[String] {
        self.children.get(id).map(|c| c.as_slice()).unwrap_or(&[])
    }

    /// `id` followed by its parent, grandparent, and so on up to the root.
    /// Empty if `id` is unknown.
    pub fn ascendants(&self, id: &str) -> Vec<String> {
        if !self.contains_node(id) {
            return Vec::new();
        }
        let mut result = vec![id.to_string()];
        let mut current = id;
        while let Some(parent) = self.parents.get(current) {
            result.push(parent.clone());
            current = parent.as_str();
        }
        result
    }

    /// The subtree rooted at `id` in post-order (children first, `id` last).
    /// Empty if `id` is unknown.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut result = self.subtree_pre_order(id);
        result.reverse();
        result
    }

    pub fn is_descendant_of(&self, id: &str, ancestor: &str) -> bool {
        self.ascendants(id).iter().any(|a| a == ancestor)
    }

    /// The subtree rooted at `id`, parents before children.
    pub(crate) fn subtree_pre_order(&self, id: &str) -> Vec<String> {
        if !self.contains_node(id) {
            return Vec::new();
        }
        let mut result = Vec::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            for child in self.children(&current).iter().rev() {
                stack.push(child.clone());
            }
            result.push(current);
        }
        result
    }
}
