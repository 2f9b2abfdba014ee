//! Conjunction reordering.
//!
//! Inside a pure `and` chain the result set does not depend on the order of the
//! conjuncts, only the emission order and the evaluation cost do. The rewrite
//! sorts each chain so that low-priority (cheap, selective) generators run
//! before high-priority (expensive) ones.

use crate::{ExprNode, QueryAtom, QueryOp};
use std::collections::HashMap;

/// Reorder every maximal all-`and` subtree of `node` by generator priority.
///
/// The atom leaves of such a subtree are collected depth-first, stable-sorted
/// ascending by `priorities[key]` (absent keys default to 0) and rebuilt as a
/// right-leaning chain `And(l0, And(l1, .. And(ln-2, ln-1)))`. Subtrees holding
/// at most one atom are left untouched, as are subtrees containing any other
/// operator. The rewrite is pure and idempotent.
pub fn reorder_conjunctions(node: ExprNode, priorities: &HashMap<String, i32>) -> ExprNode {
    if node.is_all_and() {
        let mut atoms: Vec<QueryAtom> = node.leaf_atoms().into_iter().cloned().collect();
        if atoms.len() > 1 {
            atoms.sort_by_key(|atom| priorities.get(&atom.key).copied().unwrap_or(0));
            if let Some(innermost) = atoms.pop() {
                let mut chain = ExprNode::Atom(innermost);
                while let Some(atom) = atoms.pop() {
                    chain = ExprNode::Operator {
                        op: QueryOp::And,
                        children: vec![ExprNode::Atom(atom), chain],
                    };
                }
                return chain;
            }
        }
    }
    match node {
        leaf @ ExprNode::Atom(_) => leaf,
        ExprNode::Operator { op, children } => ExprNode::Operator {
            op,
            children: children
                .into_iter()
                .map(|child| reorder_conjunctions(child, priorities))
                .collect(),
        },
    }
}
