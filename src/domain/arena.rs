//! Arena-backed tableau tree.
//!
//! Nodes live in a generational arena and refer to each other through [`NodeId`]
//! handles. Nothing is ever removed, so a handle stays valid for the lifetime of
//! the arena that issued it.

use std::collections::VecDeque;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{instrument, trace};

use crate::domain::formula;

/// Stable handle to a node in a [`TableauArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

/// Child slot of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// One signed subformula at one position in the tableau.
#[derive(Debug, Clone)]
pub struct Node {
    sign: bool,
    text: String,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    closed: bool,
    expanded: bool,
}

impl Node {
    /// Truth value asserted for this subformula
    pub fn sign(&self) -> bool {
        self.sign
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// Every branch through this node is contradictory.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn is_atomic(&self) -> bool {
        formula::is_literal(&self.text)
    }

    /// Present children, left first.
    pub fn children(&self) -> impl Iterator<Item = NodeId> {
        self.left.into_iter().chain(self.right)
    }
}

/// Renders as `T(p&q)` or `F(p)*`, the star marking a closed node.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}){}",
            if self.sign { 'T' } else { 'F' },
            self.text,
            if self.closed { "*" } else { "" }
        )
    }
}

/// Append-only tree of tableau nodes.
#[derive(Debug, Default)]
pub struct TableauArena {
    arena: Arena<Node>,
    root: Option<NodeId>,
}

impl TableauArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the parentless root node.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_root(&mut self, sign: bool, text: &str) -> NodeId {
        let id = self.insert(sign, text, None);
        self.root = Some(id);
        id
    }

    /// Creates a node in the given child slot of `parent`.
    ///
    /// The slot must be empty; the tree only grows at its frontier.
    #[instrument(level = "trace", skip(self))]
    pub fn attach(&mut self, parent: NodeId, side: Side, sign: bool, text: &str) -> NodeId {
        debug_assert!(self.child(parent, side).is_none(), "child slot already taken");
        let id = self.insert(sign, text, Some(parent));
        let parent_node = self.node_mut(parent);
        match side {
            Side::Left => parent_node.left = Some(id),
            Side::Right => parent_node.right = Some(id),
        }
        id
    }

    fn insert(&mut self, sign: bool, text: &str, parent: Option<NodeId>) -> NodeId {
        let closed = parent.is_some_and(|p| self.node(p).closed)
            || self.contradicts_ancestor(parent, sign, text);
        let node = Node {
            sign,
            text: text.to_string(),
            parent,
            left: None,
            right: None,
            closed,
            expanded: formula::is_literal(text),
        };
        let id = NodeId(self.arena.insert(node));
        trace!("insert {} -> {:?}", self.node(id), id);
        id
    }

    /// Walks the ancestor chain looking for the same text under the opposite sign.
    fn contradicts_ancestor(&self, start: Option<NodeId>, sign: bool, text: &str) -> bool {
        let mut current = start;
        while let Some(id) = current {
            let ancestor = self.node(id);
            if ancestor.sign != sign && ancestor.text == text {
                return true;
            }
            current = ancestor.parent;
        }
        false
    }

    /// Closes ancestors of `id` whose children are now all closed.
    ///
    /// Stops at the first ancestor that stays open: nothing above it can close first.
    #[instrument(level = "trace", skip(self))]
    pub fn propagate_contradiction(&mut self, id: NodeId) {
        let mut current = self.node(id).parent;
        while let Some(ancestor_id) = current {
            let ancestor = self.node(ancestor_id);
            let all_closed = match (ancestor.left, ancestor.right) {
                (Some(l), Some(r)) => self.node(l).closed && self.node(r).closed,
                (Some(only), None) | (None, Some(only)) => self.node(only).closed,
                (None, None) => false,
            };
            if !all_closed {
                break;
            }
            let ancestor = self.node_mut(ancestor_id);
            ancestor.closed = true;
            trace!("closed {}", ancestor);
            current = ancestor.parent;
        }
    }

    pub(crate) fn mark_expanded(&mut self, id: NodeId) {
        self.node_mut(id).expanded = true;
    }

    /// Node behind a handle issued by this arena.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.arena[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.arena[id.0]
    }

    pub fn child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        let node = self.node(id);
        match side {
            Side::Left => node.left,
            Side::Right => node.right,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// All nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.arena.iter().map(|(idx, node)| (NodeId(idx), node))
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            current: self.node(id).parent,
        }
    }

    /// Breadth-first walk from the root, left child before right.
    pub fn level_order(&self) -> LevelOrder<'_> {
        LevelOrder::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.level_order()
            .map(|(level, _, _)| level + 1)
            .max()
            .unwrap_or(0)
    }

    /// Leaves of the tree, in level order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.level_order()
            .filter(|(_, _, node)| node.is_leaf())
            .map(|(_, id, _)| id)
            .collect()
    }
}

pub struct Ancestors<'a> {
    arena: &'a TableauArena,
    current: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.arena.node(id);
        self.current = node.parent;
        Some((id, node))
    }
}

/// Level-order iterator yielding `(level, id, node)`, the root at level 0.
pub struct LevelOrder<'a> {
    arena: &'a TableauArena,
    queue: VecDeque<(usize, NodeId)>,
}

impl<'a> LevelOrder<'a> {
    fn new(arena: &'a TableauArena) -> Self {
        let mut queue = VecDeque::new();
        if let Some(root) = arena.root() {
            queue.push_back((0, root));
        }
        Self { arena, queue }
    }
}

impl<'a> Iterator for LevelOrder<'a> {
    type Item = (usize, NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (level, id) = self.queue.pop_front()?;
        let node = self.arena.node(id);
        for child in node.children() {
            self.queue.push_back((level + 1, child));
        }
        Some((level, id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_atomic_root_when_inserting_then_node_is_expanded_leaf() {
        let mut arena = TableauArena::new();
        let root = arena.insert_root(true, "p");

        let node = arena.node(root);
        assert!(node.is_leaf());
        assert!(node.is_atomic());
        assert!(node.is_expanded());
        assert!(!node.is_closed());
        assert_eq!(arena.root(), Some(root));
    }

    #[test]
    fn given_ancestor_with_opposite_sign_when_attaching_then_child_is_closed() {
        let mut arena = TableauArena::new();
        let root = arena.insert_root(true, "p&~p");
        let p = arena.attach(root, Side::Left, true, "p");
        let not_p = arena.attach(p, Side::Left, true, "~p");
        let p_false = arena.attach(not_p, Side::Left, false, "p");

        assert!(!arena.node(p).is_closed());
        assert!(!arena.node(not_p).is_closed());
        assert!(arena.node(p_false).is_closed());
    }

    #[test]
    fn given_same_sign_ancestor_when_attaching_then_child_stays_open() {
        let mut arena = TableauArena::new();
        let root = arena.insert_root(true, "p|p");
        let p = arena.attach(root, Side::Left, true, "p");
        let again = arena.attach(p, Side::Left, true, "p");

        assert!(!arena.node(again).is_closed());
    }

    #[test]
    fn given_closed_chain_when_propagating_then_closes_up_to_root() {
        let mut arena = TableauArena::new();
        let root = arena.insert_root(true, "p&~p");
        let p = arena.attach(root, Side::Left, true, "p");
        arena.propagate_contradiction(p);
        let p_false = arena.attach(p, Side::Left, false, "p");
        arena.propagate_contradiction(p_false);

        assert!(arena.node(p).is_closed());
        assert!(arena.node(root).is_closed());
    }

    #[test]
    fn given_branch_with_one_open_arm_when_propagating_then_parent_stays_open() {
        let mut arena = TableauArena::new();
        let root = arena.insert_root(true, "p");
        let left = arena.attach(root, Side::Left, false, "p");
        let right = arena.attach(root, Side::Right, true, "q");
        arena.propagate_contradiction(left);
        arena.propagate_contradiction(right);

        assert!(arena.node(left).is_closed());
        assert!(!arena.node(right).is_closed());
        assert!(!arena.node(root).is_closed());
    }

    #[test]
    fn given_tree_when_walking_level_order_then_visits_left_before_right() {
        let mut arena = TableauArena::new();
        let root = arena.insert_root(true, "a|b");
        let a = arena.attach(root, Side::Left, true, "a");
        let b = arena.attach(root, Side::Right, true, "b");
        let c = arena.attach(a, Side::Left, true, "c");

        let order: Vec<_> = arena.level_order().map(|(level, id, _)| (level, id)).collect();
        assert_eq!(order, vec![(0, root), (1, a), (1, b), (2, c)]);
        assert_eq!(arena.depth(), 3);
        assert_eq!(arena.leaves(), vec![b, c]);
    }

    #[test]
    fn given_deep_node_when_listing_ancestors_then_nearest_comes_first() {
        let mut arena = TableauArena::new();
        let root = arena.insert_root(true, "a");
        let b = arena.attach(root, Side::Left, true, "b");
        let c = arena.attach(b, Side::Left, true, "c");

        let ancestors: Vec<_> = arena.ancestors(c).map(|(id, _)| id).collect();
        assert_eq!(ancestors, vec![b, root]);
    }

    #[test]
    fn given_node_when_displaying_then_shows_sign_text_and_closed_marker() {
        let mut arena = TableauArena::new();
        let root = arena.insert_root(true, "p");
        let closed = arena.attach(root, Side::Left, false, "p");

        assert_eq!(arena.node(root).to_string(), "T(p)");
        assert_eq!(arena.node(closed).to_string(), "F(p)*");
    }
}
