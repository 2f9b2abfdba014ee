use crate::normalization::reorder_conjunctions;
use crate::{
    Annotator, ExprNode, Lex, Log, ParseError, QueryOp, QueryParser, QueryToken, QueryTokenizer,
};
use once_cell::unsync::OnceCell;
use std::collections::HashMap;

/// Recursive-descent builder over the annotated token stream.
///
/// Grammar: `expr := term (binop term)*`,
/// `term := "not" term | atom | "(" expr ")"`.
struct TreeBuilder<'t> {
    tokens: &'t [Lex<QueryToken>],
    cursor: usize,
    /// Query length in bytes, used as the error pointer at end of input.
    end: usize,
    /// Number of open parenthesis groups.
    depth: usize,
}

impl<'t> TreeBuilder<'t> {
    fn new(tokens: &'t [Lex<QueryToken>], end: usize) -> Self {
        Self {
            tokens,
            cursor: 0,
            end,
            depth: 0,
        }
    }

    fn build(mut self) -> Result<ExprNode, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::new(0, "empty query".to_string()));
        }
        let expr = self.parse_expr()?;
        if let Some(leftover) = self.peek() {
            let message = match leftover.token {
                QueryToken::CloseParen => "extra closing parenthesis",
                _ => "expected an operator",
            };
            return Err(ParseError::new(leftover.start, message.to_string()));
        }
        Ok(ExprNode::Operator {
            op: QueryOp::Root,
            children: vec![expr],
        })
    }

    fn parse_expr(&mut self) -> Result<ExprNode, ParseError> {
        let mut node = self.parse_term()?;
        while let Some(op) = self.peek_binary() {
            self.cursor += 1;
            let operand = self.parse_term()?;
            node = ExprNode::Operator {
                op,
                children: vec![node, operand],
            };
        }
        Ok(node)
    }

    fn parse_term(&mut self) -> Result<ExprNode, ParseError> {
        let token = match self.tokens.get(self.cursor) {
            Some(token) => token,
            None => {
                return Err(ParseError::new(
                    self.end,
                    "operator not fulfilled".to_string(),
                ));
            }
        };
        self.cursor += 1;
        match &token.token {
            QueryToken::Atom(atom) => Ok(ExprNode::Atom(atom.clone())),
            QueryToken::Operator(QueryOp::Not) => {
                let operand = self.parse_term()?;
                Ok(ExprNode::Operator {
                    op: QueryOp::Not,
                    children: vec![operand],
                })
            }
            QueryToken::OpenParen => {
                self.depth += 1;
                let expr = self.parse_expr()?;
                match self.tokens.get(self.cursor) {
                    Some(Lex {
                        token: QueryToken::CloseParen,
                        ..
                    }) => {
                        self.cursor += 1;
                        self.depth -= 1;
                        Ok(expr)
                    }
                    Some(other) => {
                        Err(ParseError::new(other.start, "expected an operator".to_string()))
                    }
                    None => Err(ParseError::new(
                        self.end,
                        "missing closing parenthesis".to_string(),
                    )),
                }
            }
            QueryToken::CloseParen => {
                let message = if self.depth == 0 {
                    "extra closing parenthesis"
                } else {
                    "operator not fulfilled"
                };
                Err(ParseError::new(token.start, message.to_string()))
            }
            QueryToken::Operator(_) => Err(ParseError::new(
                token.start,
                "operator not fulfilled".to_string(),
            )),
        }
    }

    fn peek(&self) -> Option<&Lex<QueryToken>> {
        self.tokens.get(self.cursor)
    }

    fn peek_binary(&self) -> Option<QueryOp> {
        match &self.peek()?.token {
            QueryToken::Operator(op) if op.arity() == 2 => Some(*op),
            _ => None,
        }
    }
}

impl QueryParser {
    pub fn new() -> Self {
        Self {
            tokenizer: QueryTokenizer::new(),
            annotator: Annotator::new(),
            priorities: HashMap::new(),
            debug: OnceCell::new(),
        }
    }

    /// Assign a reordering priority to a generator key; lower values move the
    /// atom earlier in a conjunction chain. Unassigned keys default to 0.
    pub fn set_priority(&mut self, key: &str, priority: i32) {
        self.priorities.insert(key.to_string(), priority);
    }

    /// Replace the whole priority table.
    pub fn set_priorities(&mut self, priorities: HashMap<String, i32>) {
        self.priorities = priorities;
    }

    /// Set a log label to debug the parser.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.debug
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    pub fn tokenizer(&self) -> &QueryTokenizer {
        &self.tokenizer
    }

    /// Split `query` into lexemes without annotating or parsing it.
    pub fn tokenize(&self, query: &str) -> Result<Vec<Lex<String>>, ParseError> {
        self.tokenizer.tokenize(query)
    }

    /// Tag lexemes as operators, parentheses and atoms.
    pub fn annotate(&self, lexemes: Vec<Lex<String>>) -> Vec<Lex<QueryToken>> {
        self.annotator.annotate(lexemes)
    }

    /// Parse `query` into a [Root](QueryOp::Root)-wrapped expression tree with
    /// its conjunction chains reordered by the priority table.
    pub fn parse(&self, query: &str) -> Result<ExprNode, ParseError> {
        #[cfg(debug_assertions)]
        let debug = self.debug.get().map_or(Log::None, |log| *log);

        let lexemes = self.tokenize(query)?;
        let tokens = self.annotate(lexemes);
        match TreeBuilder::new(&tokens, query.len()).build() {
            Ok(tree) => {
                let tree = reorder_conjunctions(tree, &self.priorities);
                #[cfg(debug_assertions)]
                {
                    if debug.order() >= Log::Verbose(()).order() {
                        println!("[{}; Tree]: {:?}", debug, tree);
                    } else if debug.order() >= Log::Success(()).order() {
                        println!("[{}; Parsing success]: {}", debug, tree);
                    }
                }
                Ok(tree)
            }
            Err(err) => {
                #[cfg(debug_assertions)]
                if debug.order() >= Log::Default(()).order() {
                    println!("[{}; Parsing failed]: {} at {}", debug, err.message, err.pointer);
                }
                Err(err)
            }
        }
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}
