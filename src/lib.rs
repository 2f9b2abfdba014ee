//! Query parsing tool (query_pt) is a library to parse human-written boolean filter
//! queries like `path:/etc and ( size:1024 or size:2048 ) and not symlink` into an
//! expression tree ([ExprNode]) and lazily evaluate the tree against a pluggable
//! universe of items.
//!
//! # Overview
//! Filter queries show up wherever a tool lets its users narrow down a large set of
//! objects: files on disk, log records, media entries.
//! Writing an ad-hoc splitter per tool keeps the query language inconsistent and the
//! evaluation strategy eager.
//! This library separates the query language from the universe it is applied to:
//! the engine owns tokenization, parsing and boolean evaluation, while the caller
//! supplies the universe through the [IEnvironment] and [IGenerator] contracts.
//!
//! # Design
//! A query string passes through four stages.
//! The [QueryTokenizer] splits the input on unquoted whitespace, honoring single
//! and double quotes and backslash escapes.
//! The [Annotator] classifies every lexeme as an operator symbol or a `key:value`
//! atom ([QueryAtom]).
//! The tree builder inside [QueryParser] assembles the annotated tokens into an
//! [ExprNode] tree by recursive descent, with unary `not` binding tightest, the
//! binary operators `and`, `or`, `|` and `-` sharing one priority level and
//! associating to the left, and parentheses grouping sub-expressions.
//! Finally [reorder_conjunctions] stable-sorts pure `and` chains by a
//! caller-supplied generator priority table, so cheap selective filters run before
//! expensive ones.
//!
//! Evaluation is pull-driven and two-polarity: every node is evaluated either
//! positively (yield items matching the subexpression) or negatively (yield items
//! of the upstream source that do not match).
//! Operators rewrite polarity with De Morgan's rules, so `not` is pushed down to
//! the atoms and the engine never materializes a complement universe.
//! Atoms resolve to generators registered in the environment; a generator either
//! produces items from nothing or filters an upstream stream, and opts in to each
//! mode separately.
//!
//! # Example
//!
//! The following program evaluates queries over a toy universe of integers.
//!
//! ```
//! use query_pt::{
//!     DefaultEnvironment, EvalError, IGenerator, ItemStream, Opts, QueryParser,
//! };
//! use std::rc::Rc;
//!
//! /// `upto:N` generates the integers `0..N`.
//! struct UpTo;
//!
//! impl IGenerator for UpTo {
//!     type Item = u64;
//!     fn key(&self) -> &'static str {
//!         "upto"
//!     }
//!     fn generate<'g>(
//!         &'g self,
//!         value: &str,
//!         _opts: &Opts,
//!         positive: bool,
//!     ) -> Result<ItemStream<'g, u64>, EvalError> {
//!         if !positive {
//!             return Err(EvalError::not_supported(
//!                 "generator 'upto' does not support negative generation",
//!             ));
//!         }
//!         let limit: u64 = value
//!             .parse()
//!             .map_err(|err| EvalError::generator("upto", err))?;
//!         Ok(Box::new((0..limit).map(Ok)))
//!     }
//! }
//!
//! /// `multiple:K` keeps the multiples of `K` (or drops them in negative mode).
//! struct MultipleOf;
//!
//! impl IGenerator for MultipleOf {
//!     type Item = u64;
//!     fn key(&self) -> &'static str {
//!         "multiple"
//!     }
//!     fn filter<'g>(
//!         &'g self,
//!         source: ItemStream<'g, u64>,
//!         value: &str,
//!         _opts: &Opts,
//!         positive: bool,
//!     ) -> Result<ItemStream<'g, u64>, EvalError> {
//!         let divisor: u64 = value
//!             .parse()
//!             .map_err(|err| EvalError::generator("multiple", err))?;
//!         Ok(Box::new(source.filter(move |entry| match entry {
//!             Ok(item) => (item % divisor == 0) == positive,
//!             Err(_) => true,
//!         })))
//!     }
//! }
//!
//! let mut env = DefaultEnvironment::new();
//! env.add_generator(Rc::new(UpTo)).unwrap();
//! env.add_generator(Rc::new(MultipleOf)).unwrap();
//!
//! let parser = QueryParser::new();
//! let tree = parser.parse("upto:20 and multiple:3 and not multiple:6").unwrap();
//! let matched: Vec<u64> = tree
//!     .evaluate(&env)
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(matched, vec![3, 9, 15]);
//! ```

mod annotation;
mod environment;
mod error;
mod evaluation;
pub mod examples;
mod expression;
mod logger;
mod normalization;
mod parsing;
mod tokenization;

#[cfg(test)]
mod __tests__;

pub use normalization::reorder_conjunctions;

use once_cell::unsync::OnceCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

#[derive(Debug, Hash, Clone, PartialEq, Eq)]
/// Element of the split query string.
///
/// `start` and `end` are byte offsets into the original query; quoting and escape
/// processing can make `token` differ from the raw slice they delimit.
pub struct Lex<TToken> {
    pub token: TToken,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Operator of an expression tree node.
///
/// `Root` is the implicit unary wrapper around a finished tree; the other five
/// operators are written in the query itself.
pub enum QueryOp {
    Root,
    Not,
    And,
    Or,
    Pipe,
    Subtract,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Options attached to an atom in the bracketed form `key[flag,name=value]:value`.
pub struct Opts {
    entries: HashMap<String, Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A `key:value` term of a query, resolved to a generator at evaluation time.
///
/// A lexeme without a colon (or whose head does not match the key character class
/// `[-a-z0-5]+`) becomes an atom whose key is the whole lexeme and whose value is
/// empty.
pub struct QueryAtom {
    pub key: String,
    pub value: String,
    pub opts: Opts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An annotated lexeme: an operator word, a parenthesis, or an atom.
pub enum QueryToken {
    Operator(QueryOp),
    OpenParen,
    CloseParen,
    Atom(QueryAtom),
}

#[derive(Clone, PartialEq, Eq)]
/// Expression tree of a parsed query.
///
/// Every leaf is an atom and every interior node is an operator whose arity is
/// satisfied ([is_fulfilled](ExprNode::is_fulfilled)) for trees produced by
/// [QueryParser].
pub enum ExprNode {
    Atom(QueryAtom),
    Operator { op: QueryOp, children: Vec<ExprNode> },
}

/// Splits a raw query string into lexemes, honoring quotes and escapes.
pub struct QueryTokenizer {
    debug: OnceCell<Log<&'static str>>,
}

/// Classifies lexemes into [QueryToken]s.
pub struct Annotator;

/// Parser facade composing tokenization, annotation, tree building and
/// conjunction reordering.
pub struct QueryParser {
    tokenizer: QueryTokenizer,
    annotator: Annotator,
    priorities: HashMap<String, i32>,
    debug: OnceCell<Log<&'static str>>,
}

#[derive(Debug)]
/// An error returned when the query string cannot be tokenized or parsed.
pub struct ParseError {
    pub pointer: usize,
    pub message: String,
}

#[derive(Debug)]
/// An error raised while evaluating an expression tree.
pub enum EvalError {
    /// The environment has no generator registered under the atom key.
    InvalidGenerator(String),
    /// A generator or operator was asked for a mode it does not implement
    /// (generation vs filtering, negative polarity, `not` without a source).
    NotSupported { message: String },
    /// An operator node whose arity is not satisfied was evaluated.
    Unfulfilled(QueryOp),
    /// A failure inside a generator, carrying the generator key and the cause.
    Generator { key: String, cause: Box<dyn Error> },
}

/// A lazily produced stream of items.
///
/// An error terminates the stream from the consumer's point of view; items already
/// yielded remain valid.
pub type ItemStream<'i, TItem> = Box<dyn Iterator<Item = Result<TItem, EvalError>> + 'i>;

/// The universe a query is evaluated against.
///
/// An environment resolves atom keys to generators and optionally assigns the
/// generator priorities used by [reorder_conjunctions].
pub trait IEnvironment {
    type Item: Debug + Clone + Eq + Hash;

    /// Look up the generator registered under `key`.
    fn generator(&self, key: &str) -> Option<&dyn IGenerator<Item = Self::Item>>;

    /// Reordering priority of the generator; lower values run earlier in a
    /// conjunction chain.
    fn priority(&self, _key: &str) -> i32 {
        0
    }
}

/// A named plugin that produces or filters items.
///
/// Implementations override [generate](IGenerator::generate) and/or
/// [filter](IGenerator::filter); the default bodies reject the mode with
/// [EvalError::NotSupported]. A generator that does not support negative
/// polarity returns the same error itself.
pub trait IGenerator {
    type Item;

    /// Registration key of the generator, matched against atom keys.
    fn key(&self) -> &'static str;

    /// Produce items from nothing (the atom has no upstream source).
    fn generate<'g>(
        &'g self,
        _value: &str,
        _opts: &Opts,
        _positive: bool,
    ) -> Result<ItemStream<'g, Self::Item>, EvalError> {
        Err(EvalError::not_supported(format!(
            "generator '{}' does not support item generation",
            self.key()
        )))
    }

    /// Filter an upstream stream of items.
    fn filter<'g>(
        &'g self,
        _source: ItemStream<'g, Self::Item>,
        _value: &str,
        _opts: &Opts,
        _positive: bool,
    ) -> Result<ItemStream<'g, Self::Item>, EvalError> {
        Err(EvalError::not_supported(format!(
            "generator '{}' does not support item filtering",
            self.key()
        )))
    }
}

/// A ready-made [IEnvironment] backed by a registry of [Rc] generators and a
/// priority table.
pub struct DefaultEnvironment<TItem> {
    generators: HashMap<&'static str, Rc<dyn IGenerator<Item = TItem>>>,
    priorities: HashMap<String, i32>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// A enum structure to assign multiple level debugging to the tokenizer and the
/// parser.
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}
