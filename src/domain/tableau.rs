//! Signed tableau engine.
//!
//! The engine owns the node arena and a FIFO work list of nodes awaiting expansion.
//! Expanding a node applies its connective's rule at every open leaf below it;
//! closed subtrees are never visited again.

use std::collections::VecDeque;

use tracing::{debug, instrument, trace};

use crate::domain::arena::{Node, NodeId, Side, TableauArena};
use crate::domain::entities::{Model, SignedFormula, TableauStats, Verdict};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::formula;
use crate::domain::rules::{self, Extension};

/// Truth tree for one formula under one asserted sign.
#[derive(Debug)]
pub struct Tableau {
    arena: TableauArena,
    root: NodeId,
    pending: VecDeque<NodeId>,
}

impl Tableau {
    /// Validates `formula` and plants it as the root under `sign`.
    ///
    /// # Errors
    /// Any syntax error found by [`formula::validate`].
    #[instrument(level = "debug")]
    pub fn new(sign: bool, formula: &str) -> DomainResult<Self> {
        let normalized = formula::validate(formula)?;
        let mut arena = TableauArena::new();
        let root = arena.insert_root(sign, &normalized);

        let mut pending = VecDeque::new();
        if !arena.node(root).is_atomic() {
            pending.push_back(root);
        }
        Ok(Self {
            arena,
            root,
            pending,
        })
    }

    /// Expands pending nodes until none is left.
    #[instrument(level = "debug", skip(self))]
    pub fn reduce(&mut self) {
        while let Some(id) = self.pending.pop_front() {
            self.reduce_node(id);
        }
        debug!("reduce: done, {} nodes", self.arena.len());
    }

    fn reduce_node(&mut self, id: NodeId) {
        let node = self.arena.node(id);
        if node.is_expanded() || node.is_closed() || node.is_atomic() {
            self.arena.mark_expanded(id);
            return;
        }

        let sign = node.sign();
        let text = node.text().to_string();
        let Some(split) = formula::split(&text) else {
            // validation guarantees every non-literal splits
            self.arena.mark_expanded(id);
            return;
        };
        let extension = rules::extension(&split, sign);
        trace!("reduce {}: {} -> {:?}", node, split.operator, extension);

        for leaf in self.open_leaves(id) {
            self.append(leaf, &extension);
        }
        self.arena.mark_expanded(id);
    }

    /// Open leaves at or below `id`, found breadth-first without entering closed subtrees.
    fn open_leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let node = self.arena.node(current);
            if node.is_closed() {
                continue;
            }
            if node.is_leaf() {
                leaves.push(current);
            } else {
                queue.extend(node.children().filter(|&c| !self.arena.node(c).is_closed()));
            }
        }
        leaves
    }

    /// Attaches `extension` below `leaf`, then propagates and schedules the new nodes.
    fn append(&mut self, leaf: NodeId, extension: &Extension) {
        let created = match extension {
            Extension::Chain(chain) => self.append_chain(leaf, Side::Left, chain),
            Extension::Branch(left, right) => {
                let mut created = self.append_chain(leaf, Side::Left, left);
                created.extend(self.append_chain(leaf, Side::Right, right));
                created
            }
        };

        for id in created {
            self.arena.propagate_contradiction(id);
            let node = self.arena.node(id);
            if !node.is_closed() && !node.is_expanded() {
                self.pending.push_back(id);
            }
        }
    }

    /// First entry goes into `side` of `parent`, each further entry below the previous one.
    fn append_chain(&mut self, parent: NodeId, side: Side, chain: &[SignedFormula]) -> Vec<NodeId> {
        let mut created = Vec::with_capacity(chain.len());
        let mut anchor = (parent, side);
        for signed in chain {
            let id = self
                .arena
                .attach(anchor.0, anchor.1, signed.sign, &signed.text);
            created.push(id);
            anchor = (id, Side::Left);
        }
        created
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }

    /// True iff every branch closed.
    ///
    /// # Errors
    /// [`DomainError::Unfinished`] while nodes are still pending.
    pub fn is_contradictory(&self) -> DomainResult<bool> {
        self.ensure_finished()?;
        Ok(self.arena.node(self.root).is_closed())
    }

    pub fn verdict(&self) -> DomainResult<Verdict> {
        Ok(if self.is_contradictory()? {
            Verdict::Unsatisfiable
        } else {
            Verdict::Satisfiable
        })
    }

    /// Literal assignments along the leftmost open branch; empty when closed.
    ///
    /// # Errors
    /// [`DomainError::Unfinished`] while nodes are still pending.
    #[instrument(level = "debug", skip(self))]
    pub fn model(&self) -> DomainResult<Model> {
        let mut model = Model::new();
        if self.is_contradictory()? {
            return Ok(model);
        }

        let mut current = Some(self.root);
        while let Some(id) = current {
            let node = self.arena.node(id);
            if node.is_atomic() {
                model.assign(node.text(), node.sign());
            }
            current = node
                .children()
                .find(|&child| !self.arena.node(child).is_closed());
        }
        debug!("model: {}", model);
        Ok(model)
    }

    fn ensure_finished(&self) -> DomainResult<()> {
        if self.is_finished() {
            Ok(())
        } else {
            Err(DomainError::Unfinished)
        }
    }

    /// Diagnostic walk: `(level, id, node)` from the root, left before right.
    pub fn level_order(&self) -> impl Iterator<Item = (usize, NodeId, &Node)> {
        self.arena.level_order()
    }

    pub fn stats(&self) -> TableauStats {
        let (closed, open): (Vec<_>, Vec<_>) = self
            .arena
            .leaves()
            .into_iter()
            .partition(|&leaf| self.arena.node(leaf).is_closed());
        TableauStats {
            nodes: self.arena.len(),
            open_branches: open.len(),
            closed_branches: closed.len(),
            depth: self.arena.depth(),
        }
    }

    pub fn arena(&self) -> &TableauArena {
        &self.arena
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Sign asserted at the root.
    pub fn sign(&self) -> bool {
        self.arena.node(self.root).sign()
    }

    /// Normalised root formula.
    pub fn formula(&self) -> &str {
        self.arena.node(self.root).text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solved(sign: bool, formula: &str) -> Tableau {
        let mut tableau = Tableau::new(sign, formula).unwrap();
        tableau.reduce();
        tableau
    }

    #[test]
    fn given_literal_when_constructing_then_nothing_is_pending() {
        let tableau = Tableau::new(true, "p").unwrap();

        assert!(tableau.is_finished());
        assert_eq!(tableau.arena().len(), 1);
    }

    #[test]
    fn given_compound_formula_when_constructing_then_root_is_pending() {
        let tableau = Tableau::new(true, "p&q").unwrap();

        assert!(!tableau.is_finished());
        assert_eq!(tableau.is_contradictory(), Err(DomainError::Unfinished));
        assert_eq!(tableau.model(), Err(DomainError::Unfinished));
    }

    #[test]
    fn given_malformed_formula_when_constructing_then_fails_before_building() {
        assert_eq!(
            Tableau::new(true, "p&(q").unwrap_err(),
            DomainError::UnbalancedParenthesis { position: 2 }
        );
    }

    #[test]
    fn given_contradiction_when_reducing_then_chain_closes() {
        let tableau = solved(true, "p&~p");

        // T(p&~p) -> T(p) -> T(~p) -> F(p)*
        let texts: Vec<_> = tableau.level_order().map(|(_, _, n)| n.to_string()).collect();
        assert_eq!(texts, vec!["T(p&~p)*", "T(p)*", "T(~p)*", "F(p)*"]);
        assert!(tableau.is_contradictory().unwrap());
    }

    #[test]
    fn given_disjunction_when_reducing_then_branches_below_root() {
        let tableau = solved(true, "p|q");

        let root = tableau.arena().node(tableau.root());
        let left = tableau.arena().node(root.left().unwrap());
        let right = tableau.arena().node(root.right().unwrap());
        assert_eq!((left.text(), left.sign()), ("p", true));
        assert_eq!((right.text(), right.sign()), ("q", true));
        assert_eq!(tableau.stats().open_branches, 2);
    }

    #[test]
    fn given_node_expanded_after_branching_when_reducing_then_applies_to_every_open_leaf() {
        // the conjunction splits first; (a|b) then branches and (c|d) must land under both arms
        let tableau = solved(true, "(a|b)&(c|d)");

        let stats = tableau.stats();
        assert_eq!(stats.open_branches, 4);
        assert_eq!(stats.nodes, 1 + 2 + 2 + 4);
    }

    #[test]
    fn given_closed_branch_when_reducing_then_pending_subformulas_are_pruned() {
        // T(p) closes against F(p); the T(q|r) below it is never expanded
        let tableau = solved(true, "~p&(p&(q|r))");

        assert!(tableau.is_contradictory().unwrap());
        assert_eq!(tableau.arena().len(), 6);
        let (_, pruned) = tableau
            .arena()
            .iter()
            .find(|(_, n)| n.text() == "q|r")
            .unwrap();
        assert!(pruned.is_closed());
        assert!(pruned.is_leaf());
    }

    #[test]
    fn given_finished_tableau_when_reducing_again_then_nothing_changes() {
        let mut tableau = solved(true, "(p=q)&(q>r)&~(p|r)");
        let before: Vec<_> = tableau
            .arena()
            .iter()
            .map(|(id, n)| (id, n.is_closed(), n.is_expanded()))
            .collect();

        tableau.reduce();

        let after: Vec<_> = tableau
            .arena()
            .iter()
            .map(|(id, n)| (id, n.is_closed(), n.is_expanded()))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn given_closed_root_when_extracting_model_then_it_is_empty() {
        let tableau = solved(true, "(p>q)&p&~q");

        assert_eq!(tableau.verdict().unwrap(), Verdict::Unsatisfiable);
        assert!(tableau.model().unwrap().is_empty());
    }

    #[test]
    fn given_tautology_under_false_sign_when_reducing_then_closes() {
        let tableau = solved(false, "p|~p");

        assert!(tableau.is_contradictory().unwrap());
    }

    #[test]
    fn given_redundant_parens_when_constructing_then_root_text_is_normalised() {
        let tableau = Tableau::new(false, " ((p > q)) ").unwrap();

        assert_eq!(tableau.formula(), "p>q");
        assert!(!tableau.sign());
    }
}
