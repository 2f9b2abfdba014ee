//! Two-polarity, pull-driven evaluation of expression trees.
//!
//! Negative evaluation of an operator is rewritten with De Morgan's rules into
//! negative evaluation of its children, so `not` reaches the atoms as a
//! negative generator invocation and no complement set is ever built.

use crate::{EvalError, ExprNode, IEnvironment, ItemStream, QueryOp};
use std::collections::HashSet;
use std::hash::Hash;

impl ExprNode {
    /// Evaluate the tree as a query root: no upstream source, positive polarity.
    pub fn evaluate<'e, TEnv>(
        &'e self,
        env: &'e TEnv,
    ) -> Result<ItemStream<'e, TEnv::Item>, EvalError>
    where
        TEnv: IEnvironment,
        TEnv::Item: 'e,
    {
        self.eval(env, None, true)
    }

    /// Evaluate the subtree.
    ///
    /// With `source = None` the subtree generates items from nothing; otherwise
    /// it filters the given stream. `positive` selects the polarity: positively
    /// evaluated nodes yield matching items, negatively evaluated nodes yield
    /// the source items that do not match.
    pub fn eval<'e, TEnv>(
        &'e self,
        env: &'e TEnv,
        source: Option<ItemStream<'e, TEnv::Item>>,
        positive: bool,
    ) -> Result<ItemStream<'e, TEnv::Item>, EvalError>
    where
        TEnv: IEnvironment,
        TEnv::Item: 'e,
    {
        match self {
            ExprNode::Atom(atom) => {
                let generator = env
                    .generator(&atom.key)
                    .ok_or_else(|| EvalError::InvalidGenerator(atom.key.clone()))?;
                match source {
                    None => generator.generate(&atom.value, &atom.opts, positive),
                    Some(stream) => generator.filter(stream, &atom.value, &atom.opts, positive),
                }
            }
            ExprNode::Operator { op, children } => match (op, children.as_slice()) {
                (QueryOp::Root, [child]) => child.eval(env, source, positive),
                (QueryOp::Not, [child]) => match source {
                    None => Err(EvalError::not_supported(
                        "'not' requires an upstream source to filter",
                    )),
                    Some(stream) => child.eval(env, Some(stream), !positive),
                },
                (QueryOp::And, [first, second]) | (QueryOp::Pipe, [first, second]) => {
                    if positive {
                        intersection(env, source, first, second, true, true)
                    } else {
                        union(env, source, first, second, false, false)
                    }
                }
                (QueryOp::Or, [first, second]) => {
                    if positive {
                        union(env, source, first, second, true, true)
                    } else {
                        intersection(env, source, first, second, false, false)
                    }
                }
                (QueryOp::Subtract, [first, second]) => {
                    if positive {
                        intersection(env, source, first, second, true, false)
                    } else {
                        union(env, source, first, second, false, true)
                    }
                }
                (op, _) => Err(EvalError::Unfulfilled(*op)),
            },
        }
    }
}

/// Pipe-through filtering: the output of `first` becomes the input of `second`.
/// Preserves the emission order of the left operand.
fn intersection<'e, TEnv>(
    env: &'e TEnv,
    source: Option<ItemStream<'e, TEnv::Item>>,
    first: &'e ExprNode,
    second: &'e ExprNode,
    positive1: bool,
    positive2: bool,
) -> Result<ItemStream<'e, TEnv::Item>, EvalError>
where
    TEnv: IEnvironment,
    TEnv::Item: 'e,
{
    let upstream = first.eval(env, source, positive1)?;
    second.eval(env, Some(upstream), positive2)
}

/// Evaluate both operands independently over the same source and chain their
/// output, dropping second-operand items that already appeared in the first
/// operand's output.
///
/// A filtered source is drained once into a buffer so each operand gets its own
/// pass; the memory cost is of the same order as the dedup set.
fn union<'e, TEnv>(
    env: &'e TEnv,
    source: Option<ItemStream<'e, TEnv::Item>>,
    first: &'e ExprNode,
    second: &'e ExprNode,
    positive1: bool,
    positive2: bool,
) -> Result<ItemStream<'e, TEnv::Item>, EvalError>
where
    TEnv: IEnvironment,
    TEnv::Item: 'e,
{
    let (source1, source2) = match source {
        None => (None, None),
        Some(stream) => {
            let buffer: Vec<TEnv::Item> = stream.collect::<Result<_, _>>()?;
            let replay = buffer.clone();
            (
                Some(Box::new(buffer.into_iter().map(Ok)) as ItemStream<'e, TEnv::Item>),
                Some(Box::new(replay.into_iter().map(Ok)) as ItemStream<'e, TEnv::Item>),
            )
        }
    };
    let first_stream = first.eval(env, source1, positive1)?;
    let second_stream = second.eval(env, source2, positive2)?;
    Ok(Box::new(UnionIter {
        first: first_stream,
        second: second_stream,
        yielded: HashSet::new(),
        first_done: false,
    }))
}

struct UnionIter<'i, TItem> {
    first: ItemStream<'i, TItem>,
    second: ItemStream<'i, TItem>,
    yielded: HashSet<TItem>,
    first_done: bool,
}

impl<'i, TItem: Clone + Eq + Hash> Iterator for UnionIter<'i, TItem> {
    type Item = Result<TItem, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.first_done {
            match self.first.next() {
                Some(Ok(item)) => {
                    self.yielded.insert(item.clone());
                    return Some(Ok(item));
                }
                Some(Err(err)) => return Some(Err(err)),
                None => self.first_done = true,
            }
        }
        loop {
            match self.second.next()? {
                Ok(item) => {
                    if !self.yielded.contains(&item) {
                        return Some(Ok(item));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
