use crate::{ExprNode, QueryAtom, QueryOp};
use ptree::TreeItem;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};

impl QueryOp {
    /// Operator for a query symbol; `Root` has no written form.
    pub fn from_symbol(symbol: &str) -> Option<QueryOp> {
        match symbol {
            "not" => Some(QueryOp::Not),
            "-" => Some(QueryOp::Subtract),
            "and" => Some(QueryOp::And),
            "or" => Some(QueryOp::Or),
            "|" => Some(QueryOp::Pipe),
            _ => None,
        }
    }

    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            QueryOp::Root => None,
            QueryOp::Not => Some("not"),
            QueryOp::And => Some("and"),
            QueryOp::Or => Some("or"),
            QueryOp::Pipe => Some("|"),
            QueryOp::Subtract => Some("-"),
        }
    }

    /// Binding priority: `not` binds tightest, the binary operators share one
    /// level and associate to the left, and `Root` wraps the whole tree.
    pub fn priority(&self) -> u32 {
        match self {
            QueryOp::Not => 0,
            QueryOp::And | QueryOp::Or | QueryOp::Pipe | QueryOp::Subtract => 1,
            QueryOp::Root => 1000,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            QueryOp::Root | QueryOp::Not => 1,
            QueryOp::And | QueryOp::Or | QueryOp::Pipe | QueryOp::Subtract => 2,
        }
    }
}

impl Display for QueryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol().unwrap_or("root"))
    }
}

impl ExprNode {
    /// Create a leaf node without options.
    pub fn atom(key: &str, value: &str) -> ExprNode {
        ExprNode::Atom(QueryAtom::new(key, value))
    }

    /// Create an operator node over the given children.
    pub fn operator(op: QueryOp, children: Vec<ExprNode>) -> ExprNode {
        ExprNode::Operator { op, children }
    }

    pub fn op(&self) -> Option<QueryOp> {
        match self {
            ExprNode::Atom(_) => None,
            ExprNode::Operator { op, .. } => Some(*op),
        }
    }

    pub fn children(&self) -> &[ExprNode] {
        match self {
            ExprNode::Atom(_) => &[],
            ExprNode::Operator { children, .. } => children,
        }
    }

    /// Whether every operator node of the subtree has its arity satisfied.
    pub fn is_fulfilled(&self) -> bool {
        match self {
            ExprNode::Atom(_) => true,
            ExprNode::Operator { op, children } => {
                children.len() == op.arity() && children.iter().all(ExprNode::is_fulfilled)
            }
        }
    }

    /// Whether the subtree is a pure conjunction: an `and` node whose descendant
    /// operators are all `and` and whose leaves are therefore all atoms.
    pub fn is_all_and(&self) -> bool {
        match self {
            ExprNode::Operator {
                op: QueryOp::And,
                children,
            } => children
                .iter()
                .all(|child| matches!(child, ExprNode::Atom(_)) || child.is_all_and()),
            _ => false,
        }
    }

    /// Collect the atom leaves of the subtree in depth-first order.
    pub fn leaf_atoms(&self) -> Vec<&QueryAtom> {
        let mut atoms = Vec::new();
        self.walk_atoms(&mut atoms);
        atoms
    }

    fn walk_atoms<'n>(&'n self, atoms: &mut Vec<&'n QueryAtom>) {
        match self {
            ExprNode::Atom(atom) => atoms.push(atom),
            ExprNode::Operator { children, .. } => {
                for child in children {
                    child.walk_atoms(atoms);
                }
            }
        }
    }

    /// Print the tree to stdout.
    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(self)
    }
}

impl Display for ExprNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprNode::Atom(atom) => write!(f, "{}", atom),
            ExprNode::Operator { op, children } => match (op, children.as_slice()) {
                (QueryOp::Root, [child]) => write!(f, "{}", child),
                (QueryOp::Not, [child]) => write!(f, "not {}", child),
                (op, [left, right]) => write!(f, "( {} {} {} )", left, op, right),
                (op, children) => {
                    write!(f, "{}", op)?;
                    for child in children {
                        write!(f, " {}", child)?;
                    }
                    Ok(())
                }
            },
        }
    }
}

impl Debug for ExprNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprNode::Atom(atom) => {
                let mut debug_struct = f.debug_struct("Atom");
                debug_struct
                    .field("key", &atom.key)
                    .field("value", &atom.value);
                if !atom.opts.is_empty() {
                    debug_struct.field("opts", &atom.opts);
                }
                debug_struct.finish()
            }
            ExprNode::Operator { op, children } => {
                let mut debug_struct = f.debug_struct("Operator");
                debug_struct.field("op", op);
                if !children.is_empty() {
                    debug_struct.field("children", children);
                }
                debug_struct.finish()
            }
        }
    }
}

impl TreeItem for ExprNode {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        match self {
            ExprNode::Atom(atom) => write!(f, "{}", atom),
            ExprNode::Operator { op, .. } => write!(f, "{}", op),
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        match self {
            ExprNode::Atom(_) => Cow::Borrowed(&[]),
            ExprNode::Operator { children, .. } => Cow::from(children),
        }
    }
}
