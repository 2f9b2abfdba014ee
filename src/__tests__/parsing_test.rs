use crate::{ExprNode, ParseError, QueryOp, QueryParser};

fn parse(query: &str) -> ExprNode {
    match QueryParser::new().parse(query) {
        Ok(tree) => tree,
        Err(err) => panic!("query {:?} failed to parse: {:?}", query, err),
    }
}

fn parse_err(query: &str) -> ParseError {
    match QueryParser::new().parse(query) {
        Ok(tree) => panic!("query {:?} unexpectedly parsed: {:?}", query, tree),
        Err(err) => err,
    }
}

fn root(child: ExprNode) -> ExprNode {
    ExprNode::operator(QueryOp::Root, vec![child])
}

#[test]
fn binary_operators_associate_left() {
    assert_eq!(
        parse("a:1 and b:2 or c:3"),
        root(ExprNode::operator(
            QueryOp::Or,
            vec![
                ExprNode::operator(
                    QueryOp::And,
                    vec![ExprNode::atom("a", "1"), ExprNode::atom("b", "2")],
                ),
                ExprNode::atom("c", "3"),
            ],
        ))
    );
}

#[test]
fn not_binds_tighter_than_binaries() {
    assert_eq!(
        parse("not a:1 and b:2"),
        root(ExprNode::operator(
            QueryOp::And,
            vec![
                ExprNode::operator(QueryOp::Not, vec![ExprNode::atom("a", "1")]),
                ExprNode::atom("b", "2"),
            ],
        ))
    );
    assert_eq!(
        parse("a:1 and not b:2"),
        root(ExprNode::operator(
            QueryOp::And,
            vec![
                ExprNode::atom("a", "1"),
                ExprNode::operator(QueryOp::Not, vec![ExprNode::atom("b", "2")]),
            ],
        ))
    );
}

#[test]
fn not_nests() {
    assert_eq!(
        parse("not not a:1"),
        root(ExprNode::operator(
            QueryOp::Not,
            vec![ExprNode::operator(
                QueryOp::Not,
                vec![ExprNode::atom("a", "1")],
            )],
        ))
    );
}

#[test]
fn parentheses_group_subexpressions() {
    assert_eq!(
        parse("a:1 and ( b:2 or c:3 )"),
        root(ExprNode::operator(
            QueryOp::And,
            vec![
                ExprNode::atom("a", "1"),
                ExprNode::operator(
                    QueryOp::Or,
                    vec![ExprNode::atom("b", "2"), ExprNode::atom("c", "3")],
                ),
            ],
        ))
    );
}

#[test]
fn subtract_and_pipe_parse_as_binaries() {
    assert_eq!(
        parse("a:1 - b:2"),
        root(ExprNode::operator(
            QueryOp::Subtract,
            vec![ExprNode::atom("a", "1"), ExprNode::atom("b", "2")],
        ))
    );
    assert_eq!(
        parse("a:1 | b:2"),
        root(ExprNode::operator(
            QueryOp::Pipe,
            vec![ExprNode::atom("a", "1"), ExprNode::atom("b", "2")],
        ))
    );
}

#[test]
fn digits_above_five_keep_the_whole_lexeme_as_key() {
    assert_eq!(
        parse("foo:bar and baz6:qux"),
        root(ExprNode::operator(
            QueryOp::And,
            vec![
                ExprNode::atom("foo", "bar"),
                ExprNode::atom("baz6:qux", ""),
            ],
        ))
    );
}

#[test]
fn missing_closing_parenthesis_is_rejected() {
    let query = "path:/etc and ( size:100";
    let err = parse_err(query);
    assert_eq!(err.message, "missing closing parenthesis");
    assert_eq!(err.pointer, query.len());
}

#[test]
fn extra_closing_parenthesis_is_rejected() {
    let err = parse_err("path:/etc ) and size:100");
    assert_eq!(err.message, "extra closing parenthesis");
    assert_eq!(err.pointer, 10);

    let err = parse_err(") a:1");
    assert_eq!(err.message, "extra closing parenthesis");
    assert_eq!(err.pointer, 0);

    let err = parse_err("a:1 and ( b:2 ) )");
    assert_eq!(err.message, "extra closing parenthesis");
}

#[test]
fn missing_operand_is_rejected() {
    let query = "path:/etc and size:100 and";
    let err = parse_err(query);
    assert_eq!(err.message, "operator not fulfilled");
    assert_eq!(err.pointer, query.len());

    assert_eq!(parse_err("and a:1").message, "operator not fulfilled");
    assert_eq!(parse_err("a:1 and or b:2").message, "operator not fulfilled");
    assert_eq!(parse_err("not").message, "operator not fulfilled");
    assert_eq!(parse_err("( )").message, "operator not fulfilled");
    assert_eq!(parse_err("a:1 and ( b:2 or )").message, "operator not fulfilled");
}

#[test]
fn adjacent_terms_are_rejected() {
    let err = parse_err("a:1 b:2");
    assert_eq!(err.message, "expected an operator");
    assert_eq!(err.pointer, 4);

    assert_eq!(parse_err("( a:1 b:2 )").message, "expected an operator");
}

#[test]
fn blank_queries_are_rejected() {
    assert_eq!(parse_err("").message, "empty query");
    assert_eq!(parse_err("   ").message, "empty query");
}

#[test]
fn parsed_trees_are_fulfilled() {
    let queries = [
        "a:1",
        "not a:1",
        "a:1 and b:2 and c:3",
        "a:1 and ( b:2 or not c:3 ) - d:4",
        "path:/etc and ( size:1024 or size:2048 ) and not symlink",
    ];
    for query in queries {
        let tree = parse(query);
        assert!(tree.is_fulfilled(), "tree of {:?} is not fulfilled", query);
        assert_eq!(tree.op(), Some(QueryOp::Root));
    }
}

#[test]
fn display_renders_query_syntax() {
    assert_eq!(
        parse("a:1 and not b:2").to_string(),
        "( a:1 and not b:2 )"
    );
    assert_eq!(parse("sym").to_string(), "sym");
}

#[test]
fn operator_table_matches_the_grammar() {
    use crate::QueryOp::*;
    for op in [Root, Not, And, Or, Pipe, Subtract] {
        match op {
            Not => assert_eq!((op.priority(), op.arity()), (0, 1)),
            Root => assert_eq!((op.priority(), op.arity()), (1000, 1)),
            _ => assert_eq!((op.priority(), op.arity()), (1, 2)),
        }
        if let Some(symbol) = op.symbol() {
            assert_eq!(QueryOp::from_symbol(symbol), Some(op));
        }
    }
    assert_eq!(QueryOp::from_symbol("root"), None);
}

#[test]
fn root_has_one_child() {
    let tree = parse("a:1 or b:2");
    assert_eq!(tree.children().len(), 1);
    assert_eq!(tree.children()[0].op(), Some(QueryOp::Or));
    assert_eq!(tree.leaf_atoms().len(), 2);
}

#[test]
fn parser_log_label_is_set_once() {
    let parser = QueryParser::new();
    assert!(parser.set_log(crate::Log::Verbose("parser")).is_ok());
    assert!(parser.set_log(crate::Log::None).is_err());
    assert!(parser.tokenizer().set_log(crate::Log::Success("tok")).is_ok());
    parser.parse("a:1 and b:2").unwrap();
}

#[test]
fn trees_print_without_panicking() {
    parse("path:/etc and ( size:1024 or size:2048 ) and not symlink")
        .print()
        .unwrap();
}
