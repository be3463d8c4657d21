use sexpr::{
    ast::{Node, NodeType},
    error::{ParseError, RuntimeError},
    interpreter::{
        parser::{ParserOptions, parse, parse_with_options},
        value::Value,
    },
};

fn auto_close() -> ParserOptions {
    ParserOptions { auto_close_on_eof: true }
}

#[test]
fn builds_trees_from_varied_input() {
    let sources = [
        "[]",
        "1",
        "1 3 3.4 5.6789",
        "[1 2 3]",
        "[1\n\t 2\n\n3\n]",
        "[1.2 2.4 3.44 5.678]",
        "[1.2 2.4 3.44 5.678 [1 1.2 1.3 [2] 1.4] 4 5 [6 [7] 8] [9 10] [] 11 12 13]",
        "[1 [ 1 2 3 ] 3] 4 [5 6] 7 8",
        "(1 2 3)",
        "() (1) ()",
        "(1 2 [] [3[4[5]]] 6 (7))",
        "[(1[2])]",
        "([(1[2])]3)",
        "(a\t\tb c def GHIJ 1 1.23)",
        "(a :b :cdef :GHI [jkl\t\t:hijk])",
        ":true\n\n\n\n:false\n:nil\na\nCBD",
        "\"ABC\t\tDEF\t[] GHI :jkl mno\" :aBC def ghij \"foo BAR\" # extra",
        "\"ABC\t\\n\tDEF\t[] GHI :jkl mno\" # AABBCBCC\n:aBC #def ghij\n \"foo\" # BAR",
        "{}",
        "{:foo 1}",
        "[{:foo 1}]",
        "set {:foo 1\n:bar 2} {:baz {{{[(1)]}}}}",
        "(fn [a b c] [(print a b c)])",
        "{:a 1.11 :b \"STRING VALUE\"} ()",
        "(fn word [] [(print %1 %2 %3 %*)]) (word \"a\" \"b\" \"c\")",
        "(print \"hello world\" \"beautiful world!\") (echo :brave :new :world)",
        "(+ 1 2 3 4)",
        "{+ 1 2 3 4}",
        "[+ 1 2 3 4]",
    ];

    for source in sources {
        let root = parse(source.as_bytes()).unwrap_or_else(|e| {
            panic!("parsing {source:?} failed: {e}");
        });
        assert_eq!(root.node_type(), NodeType::List);

        // Weak round-trip: the encoded form must parse to an equal tree.
        let encoded = root.encode();
        let reparsed = parse(encoded.as_bytes()).unwrap_or_else(|e| {
            panic!("reparsing {encoded:?} (from {source:?}) failed: {e}");
        });
        assert_eq!(root, reparsed, "round trip changed the tree for {source:?}");
    }
}

#[test]
fn encode_normalizes() {
    let cases = [
        ("1   2\t3", "1 2 3"),
        ("[1\n\t 2\n\n3\n]", "[1 2 3]"),
        ("(+ 1 2)", "(+ 1 2)"),
        ("+5", "5"),
        ("-7", "-7"),
        ("-1.23", "-1.23"),
        ("1.50", "1.5"),
        ("5.0", "5.0"),
        ("{:a 1}", "{:a 1}"),
        ("# only a comment", ""),
        ("\"a\nb\"", "\"a\\nb\""),
        ("\"a\\nb\"", "\"a\\nb\""),
        ("\"tab\\there\"", "\"tab\\there\""),
        ("(fn [a] [(+ a 1)])", "(fn [a] [(+ a 1)])"),
        ("(a :b \"c\")", "(a :b \"c\")"),
    ];

    for (source, expected) in cases {
        let root = parse(source.as_bytes()).unwrap();
        assert_eq!(root.encode(), expected, "encoding of {source:?}");
    }
}

#[test]
fn reports_unexpected_tokens_with_positions() {
    let err = parse(b")").unwrap_err();
    assert_eq!(err,
               ParseError::UnexpectedToken { token:  ")".to_owned(),
                                             line:   1,
                                             column: 1 });
    assert_eq!(err.to_string(),
               "syntax error: unexpected token \")\" (around (line 1) (column 1))");

    let err = parse(b"\n  }").unwrap_err();
    assert_eq!(err,
               ParseError::UnexpectedToken { token:  "}".to_owned(),
                                             line:   2,
                                             column: 3 });

    // A close bracket of the wrong kind.
    let err = parse(b"(]").unwrap_err();
    assert_eq!(err,
               ParseError::UnexpectedToken { token:  "]".to_owned(),
                                             line:   1,
                                             column: 2 });

    // An atom needs a word after the colon.
    let err = parse(b":123").unwrap_err();
    assert_eq!(err,
               ParseError::UnexpectedToken { token:  "123".to_owned(),
                                             line:   1,
                                             column: 2 });
}

#[test]
fn reports_unexpected_eof_with_positions() {
    let err = parse(b"(").unwrap_err();
    assert_eq!(err, ParseError::UnexpectedEof { line: 1, column: 2 });
    assert_eq!(err.to_string(),
               "syntax error: unexpected EOF (around (line 1) (column 2))");

    assert_eq!(parse(b"[1 2").unwrap_err(),
               ParseError::UnexpectedEof { line: 1, column: 5 });
    assert_eq!(parse(b"\"abc").unwrap_err(),
               ParseError::UnexpectedEof { line: 1, column: 5 });
    assert_eq!(parse(b"1.").unwrap_err(),
               ParseError::UnexpectedEof { line: 1, column: 3 });
    assert_eq!(parse(b"{:a 1").unwrap_err(),
               ParseError::UnexpectedEof { line: 1, column: 6 });
}

#[test]
fn rejects_out_of_range_integers() {
    let err = parse(b"99999999999999999999").unwrap_err();
    assert_eq!(err,
               ParseError::NumberOutOfRange { token:  "99999999999999999999".to_owned(),
                                              line:   1,
                                              column: 1 });

    assert!(parse(b"9223372036854775807").is_ok());
    assert!(parse(b"-9223372036854775808").is_ok());
    assert!(parse(b"-9223372036854775809").is_err());
}

#[test]
fn normalizes_signed_numbers() {
    let root = parse(b"+5").unwrap();
    let children = root.children();
    assert_eq!(children[0].value(), Some(&Value::Int(5)));

    let root = parse(b"-1.23").unwrap();
    let children = root.children();
    assert_eq!(children[0].value(), Some(&Value::Float(-1.23)));
}

#[test]
fn auto_close_mode_closes_open_containers() {
    let cases = [
        ("(", "()"),
        ("[1 (2", "[1 (2)]"),
        ("{:a 1", "{:a 1}"),
        ("((([", "((([])))"),
        ("\"abc", "\"abc\""),
        ("[1 2 3]", "[1 2 3]"),
    ];

    for (source, expected) in cases {
        let root = parse_with_options(source.as_bytes(), auto_close()).unwrap_or_else(|e| {
            panic!("auto-close parse of {source:?} failed: {e}");
        });
        assert_eq!(root.encode(), expected, "auto-close encode of {source:?}");
    }

    // Auto-close never reports an unexpected EOF...
    let truncated = ["(", "[", "{", "(+ 1", "[1 [2 [3", "\"half", "(\"half", "{:a"];
    for source in truncated {
        match parse_with_options(source.as_bytes(), auto_close()) {
            Ok(_) => {},
            Err(ParseError::UnexpectedEof { .. }) => {
                panic!("auto-close reported unexpected EOF for {source:?}");
            },
            Err(_) => {},
        }
    }

    // ...but still rejects genuinely bad tokens.
    assert!(matches!(parse_with_options(b"(]", auto_close()),
                     Err(ParseError::UnexpectedToken { .. })));

    // Without the option the same input is an error.
    assert!(matches!(parse(b"("), Err(ParseError::UnexpectedEof { .. })));
}

#[test]
fn leaf_nodes_reject_children() {
    let leaf = Node::new(None, Value::Int(1));
    let child = Node::new(None, Value::Int(2));
    assert_eq!(leaf.push(child), Err(RuntimeError::NotAContainer));
}

#[test]
fn children_know_their_parent() {
    let root = parse(b"[1 [2]]").unwrap();

    let top = root.children();
    let list = &top[0];
    assert!(list.parent().is_some_and(|p| std::sync::Arc::ptr_eq(&p, &root)));

    let elements = list.children();
    let inner = &elements[1];
    assert!(inner.parent().is_some_and(|p| std::sync::Arc::ptr_eq(&p, list)));
}

#[test]
fn string_contents_survive_round_trips() {
    let root = parse(b"\"ABC \\q DEF\"").unwrap();
    let children = root.children();
    assert_eq!(children[0].value(),
               Some(&Value::String("ABC \\q DEF".to_owned())));

    let encoded = root.encode();
    let reparsed = parse(encoded.as_bytes()).unwrap();
    assert_eq!(root, reparsed);
}

#[test]
fn atoms_keep_their_spelling() {
    let root = parse(b":true :nil :foo").unwrap();
    let spellings: Vec<String> = root.children()
                                     .iter()
                                     .filter_map(|n| n.value().map(Value::raw))
                                     .collect();
    assert_eq!(spellings, vec![":true", ":nil", ":foo"]);
}
