use tracing::debug;

use crate::{
    ast::BoolOp,
    builder::{AttributeGroup, BuilderError, Node, NodeId, QueryBuilder},
};

impl QueryBuilder {
    /// Add a blank attribute to `group`, joined to its neighbours by `operator`.
    ///
    /// `origin` is the child the user clicked "add" on. The new attribute goes
    /// right after it, or at the end of the group when there is no origin. When
    /// `operator` differs from the group's own operator, the group is split so
    /// that every group keeps a single operator:
    ///
    /// ```text
    /// (a & b & c), add | after b   =>  (a & (b | new) & c)
    /// (a & b),     add | at end    =>  ((a & b) | new)
    /// ```
    ///
    /// A group with at most one child simply takes the new operator. Splits that
    /// would nest a group inside a group with the same operator are flattened
    /// instead, so the tree always serializes to the form it parses back into.
    pub fn create_attribute(
        &mut self,
        group: NodeId,
        operator: BoolOp,
        origin: Option<NodeId>,
    ) -> Result<NodeId, BuilderError> {
        let (count, current) = {
            let target = self.group(group)?;
            (target.children.len(), target.operator)
        };
        let origin_index = match origin {
            Some(origin) => Some(self.child_index(group, origin)?),
            None => None,
        };

        let blank = self.blank_attribute();
        let attribute = self.arena.insert(Node::Attribute(blank));

        if count <= 1 {
            self.retype_group(group, operator)?;
            self.attach(group, attribute, insert_position(origin_index))?;
        } else if current == operator {
            self.attach(group, attribute, insert_position(origin_index))?;
        } else if let Some(origin) = origin.filter(|id| self.is_group_with(*id, operator)) {
            // The origin already joins its children with `operator`
            self.append(origin, attribute)?;
        } else if let (Some(origin), Some(index)) = (origin, origin_index) {
            debug!(%group, %origin, %operator, "wrapping origin in a new group");
            let subgroup = self.new_group(operator);
            self.attach(group, subgroup, index)?;
            self.append(subgroup, origin)?;
            self.append(subgroup, attribute)?;
        } else if let Some(parent) = self
            .arena
            .parent(group)
            .filter(|id| self.is_group_with(*id, operator))
        {
            // Joining the whole group with `operator` is joining it in the parent
            let index = self.child_index(parent, group)?;
            self.attach(parent, attribute, index + 1)?;
        } else {
            debug!(%group, from = %current, to = %operator, "pushing group down");
            let subgroup = self.new_group(current);
            let children = self.children(group)?.to_vec();
            for child in children {
                self.append(subgroup, child)?;
            }
            self.retype_group(group, operator)?;
            self.append(group, subgroup)?;
            self.append(group, attribute)?;
        }

        Ok(attribute)
    }

    /// Delete a node and everything below it.
    ///
    /// Non-root groups left with a single child are dissolved into their parent,
    /// cascading upwards; a surviving subgroup that shares the parent's operator
    /// is flattened into it. A root group left holding only a nested group absorbs
    /// that group's children. Root groups themselves cannot be removed; remove
    /// their token instead.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), BuilderError> {
        if let Node::Group(group) = self.node(id)? {
            if group.is_root {
                return Err(BuilderError::RootRemoval(id));
            }
        }

        let parent = self.arena.parent(id);
        if let Some(parent) = parent {
            self.group_mut(parent)?.children.retain(|child| *child != id);
        }
        self.arena.remove_subtree(id);

        let mut current = parent;
        while let Some(group) = current {
            current = self.dissolve_if_sparse(group)?;
        }
        Ok(())
    }

    /// Returns the next group to check when `group` was dissolved.
    fn dissolve_if_sparse(&mut self, id: NodeId) -> Result<Option<NodeId>, BuilderError> {
        let group = self.group(id)?;
        if group.children.len() > 1 {
            return Ok(None);
        }

        if group.is_root {
            self.absorb_only_subgroup(id)?;
            return Ok(None);
        }

        let Some(parent) = self.arena.parent(id) else {
            return Ok(None);
        };
        let index = self.child_index(parent, id)?;
        let remaining = self.children(id)?.to_vec();

        debug!(group = %id, %parent, "dissolving group");
        let parent_operator = self.group(parent)?.operator;
        let mut position = index;
        for child in remaining {
            // A subgroup with the parent's operator would be redundant
            let merged = match self.node(child)? {
                Node::Group(subgroup) if subgroup.operator == parent_operator => {
                    Some(subgroup.children.clone())
                }
                _ => None,
            };
            match merged {
                Some(grandchildren) => {
                    for grandchild in grandchildren {
                        self.attach(parent, grandchild, position)?;
                        position += 1;
                    }
                    self.group_mut(id)?.children.retain(|c| *c != child);
                    self.arena.remove(child);
                }
                None => {
                    self.attach(parent, child, position)?;
                    position += 1;
                }
            }
        }
        self.group_mut(parent)?.children.retain(|child| *child != id);
        self.arena.remove(id);

        Ok(Some(parent))
    }

    fn absorb_only_subgroup(&mut self, root: NodeId) -> Result<(), BuilderError> {
        let only = match self.children(root)? {
            [only] => *only,
            _ => return Ok(()),
        };
        let operator = match self.node(only)? {
            Node::Group(subgroup) => subgroup.operator,
            Node::Attribute(_) => return Ok(()),
        };

        debug!(%root, subgroup = %only, "lifting subgroup into root");
        let grandchildren = self.children(only)?.to_vec();
        for child in grandchildren {
            self.append(root, child)?;
        }
        self.group_mut(root)?.children.retain(|child| *child != only);
        self.arena.remove(only);
        self.retype_group(root, operator)
    }

    /// Change the operator joining a group's children.
    ///
    /// Nested groups that end up with the same operator as their parent are
    /// merged into it: subgroups already using `operator` are spliced into
    /// `id`, and `id` itself is spliced into a parent using `operator`, after
    /// which `id` no longer exists.
    pub fn set_group_operator(&mut self, id: NodeId, operator: BoolOp) -> Result<(), BuilderError> {
        self.retype_group(id, operator)?;

        let nested: Vec<NodeId> = self
            .children(id)?
            .iter()
            .copied()
            .filter(|child| self.is_group_with(*child, operator))
            .collect();
        for subgroup in nested {
            self.splice_into_parent(subgroup)?;
        }

        if self
            .arena
            .parent(id)
            .is_some_and(|parent| self.is_group_with(parent, operator))
        {
            debug!(group = %id, %operator, "merging group into parent");
            self.splice_into_parent(id)?;
        }
        Ok(())
    }

    /// Move the children of `id` into its parent, in place of `id`.
    fn splice_into_parent(&mut self, id: NodeId) -> Result<(), BuilderError> {
        let Some(parent) = self.arena.parent(id) else {
            return Ok(());
        };
        let mut position = self.child_index(parent, id)?;
        for child in self.children(id)?.to_vec() {
            self.attach(parent, child, position)?;
            position += 1;
        }
        self.group_mut(parent)?.children.retain(|child| *child != id);
        self.arena.remove(id);
        Ok(())
    }

    fn is_group_with(&self, id: NodeId, operator: BoolOp) -> bool {
        matches!(self.arena.get(id), Some(Node::Group(group)) if group.operator == operator)
    }

    pub(crate) fn new_group(&mut self, operator: BoolOp) -> NodeId {
        let label = self.settings.operator_label(operator);
        self.arena
            .insert(Node::Group(AttributeGroup::new(operator, label, false)))
    }
}

fn insert_position(origin_index: Option<usize>) -> usize {
    origin_index.map_or(usize::MAX, |index| index + 1)
}
