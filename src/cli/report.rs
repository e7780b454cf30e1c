//! Text rendering of finished tableaux
//!
//! Pure functions over engine state; printing happens in `commands`.

use std::collections::HashMap;

use itertools::Itertools;
use termtree::Tree;

use crate::domain::{Model, NodeId, Tableau};

/// One line per depth level, nodes tab separated, `*` marking closed ones.
pub fn render_levels(tableau: &Tableau) -> String {
    tableau
        .level_order()
        .chunk_by(|(level, _, _)| *level)
        .into_iter()
        .map(|(_, nodes)| nodes.map(|(_, _, node)| node.to_string()).join("\t"))
        .join("\n")
}

/// Indented tree, one node per line.
///
/// Subtrees are assembled bottom-up in reverse level order, so depth is not limited by
/// the call stack.
pub fn render_tree(tableau: &Tableau) -> Tree<String> {
    let nodes: Vec<_> = tableau.level_order().collect();
    let mut built: HashMap<NodeId, Tree<String>> = HashMap::with_capacity(nodes.len());

    for (_, id, node) in nodes.into_iter().rev() {
        let leaves: Vec<_> = node.children().filter_map(|child| built.remove(&child)).collect();
        built.insert(id, Tree::new(node.to_string()).with_leaves(leaves));
    }

    let root = tableau.root();
    built
        .remove(&root)
        .unwrap_or_else(|| Tree::new(tableau.arena().node(root).to_string()))
}

pub fn render_model(model: &Model) -> String {
    if model.is_empty() {
        "(none)".to_string()
    } else {
        model.to_string()
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
    fn given_branching_tableau_when_rendering_levels_then_one_line_per_depth() {
        let tableau = solved(true, "p|q");

        assert_eq!(render_levels(&tableau), "T(p|q)\nT(p)\tT(q)");
    }

    #[test]
    fn given_closed_chain_when_rendering_levels_then_marks_closed_nodes() {
        let tableau = solved(true, "p&~p");

        assert_eq!(render_levels(&tableau), "T(p&~p)*\nT(p)*\nT(~p)*\nF(p)*");
    }

    #[test]
    fn given_branching_tableau_when_rendering_tree_then_children_are_indented() {
        let tableau = solved(true, "p|q");

        let rendered = render_tree(&tableau).to_string();

        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "T(p|q)");
        assert!(lines[1].ends_with("T(p)"));
        assert!(lines[2].ends_with("T(q)"));
    }

    #[test]
    fn given_deep_negation_chain_when_rendering_tree_then_one_line_per_node() {
        let depth = 1500;
        let tableau = solved(true, &format!("{}p", "~".repeat(depth)));

        let rendered = render_tree(&tableau).to_string();

        assert_eq!(rendered.lines().count(), depth + 1);
        assert!(rendered.lines().last().unwrap().ends_with("T(p)"));
    }

    #[test]
    fn given_empty_model_when_rendering_then_prints_none() {
        assert_eq!(render_model(&Model::new()), "(none)");
    }

    #[test]
    fn given_model_when_rendering_then_sorted_by_literal() {
        let model: Model = [("q".to_string(), false), ("p".to_string(), true)]
            .into_iter()
            .collect();

        assert_eq!(render_model(&model), "p = true  q = false");
    }
}
