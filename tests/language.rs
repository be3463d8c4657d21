use sexpr::{
    error::Error,
    interpreter::{
        evaluator::{Interpreter, builtin},
        parser::{ParserOptions, parse_with_options},
    },
};

fn assert_result(src: &str, expected: &str) {
    match sexpr::run(src) {
        Ok(value) => assert_eq!(value.to_string(), expected, "result of {src:?}"),
        Err(e) => panic!("script {src:?} failed: {e}"),
    }
}

fn assert_failure(src: &str) -> Error {
    match sexpr::run(src) {
        Ok(value) => panic!("script {src:?} succeeded with {value} but was expected to fail"),
        Err(e) => e,
    }
}

#[test]
fn top_level_values() {
    assert_result("1 2 3", "[1 2 3]");
    assert_result("[1 2 [3 4]]", "[[1 2 [3 4]]]");
    assert_result(":true :false :nil", "[:true :false :nil]");
    assert_result("\"hello\"", "[\"hello\"]");
    assert_result("1.5 -2", "[1.5 -2]");
    assert_result("# only a comment", "[]");
    assert_result("", "[]");
}

#[test]
fn addition() {
    assert_result("(+ 1 2 3 4)", "[10]");
    assert_result("(+ (+ 1 2 3 4))", "[10]");
    assert_result("(+ (+ 1 2 3 4) 10)", "[20]");
    assert_result("(+ 1 2.5)", "[3.5]");
    assert_result("(+)", "[0]");
}

#[test]
fn equality() {
    assert_result("(= 1 1 1 1)", "[:true]");
    assert_result("(= 1 2)", "[:false]");
    assert_result("(= 1 1 1 1 1 2 14)", "[:false]");
    assert_result("(= \"a\" \"a\")", "[:true]");
    assert_result("(= 1 1.0)", "[:false]");
}

#[test]
fn bindings() {
    assert_result("(set foo 3) (get foo)", "[3 3]");
    assert_result("(get missing)", "[:nil]");
    assert_result("(set foo (+ 3 3)) (get foo)", "[6 6]");
    assert_result("(get foo) (set foo 3) (get foo) (get foo)", "[:nil 3 3 3]");
}

#[test]
fn echo_streams_arguments() {
    assert_result("(echo \"hello\" \"world!\")", "[[\"hello\" \"world!\"]]");
    assert_result("(echo \"hello\" (echo \"world!\"))", "[[\"hello\" \"world!\"]]");
    assert_result("(echo \"hello\" (echo (echo (echo \"world!\"))))",
                  "[[\"hello\" \"world!\"]]");
    assert_result("(echo (set foo 1) (get foo))", "[[1 1]]");
}

#[test]
fn literals_in_call_position() {
    assert_result("(1)", "[1]");
    assert_result("(10)", "[10]");
    assert_result("(\"anyvalue\")", "[\"anyvalue\"]");
    assert_result("(:unbound_atom)", "[:unbound_atom]");
    assert_result("()", "[[]]");
    assert_result("(((1)))", "[1]");
}

#[test]
fn short_circuiting_callees() {
    // nop never reads its arguments; the producer must stop cleanly.
    assert_result("(nop 1 2 3)", "[:nil]");
    assert_result("[(nop [ [ (echo :hello) ]])]", "[[:nil]]");
    assert_result("(:false (echo \"hello\"))", "[:false]");
    assert_result("(:true (echo \"hello\" (echo \"world\")))", "[:true]");
}

#[test]
fn maps() {
    assert_result("{}", "[{}]");
    assert_result("{:a}", "[{:a :nil}]");
    assert_result("{ :a 1     }", "[{:a 1}]");
    assert_result("{:a 1 :b 2}", "[{:a 1 :b 2}]");
    assert_result("{:b 2 :a 1}", "[{:a 1 :b 2}]");
    assert_result("{:a 1 :b 2 :c 3 :e [1 2 3]}", "[{:a 1 :b 2 :c 3 :e [1 2 3]}]");
    assert_result("[{:a 1 :b 2} [1 2 3] 4 :foo]", "[[{:a 1 :b 2} [1 2 3] 4 :foo]]");
}

#[test]
fn nested_containers() {
    assert_result("([1])", "[[1]]");
    assert_result("( [1  2  3 ] )", "[[1 2 3]]");
    assert_result("(([1 2 3 {:a 4}]))", "[[1 2 3 {:a 4}]]");
    assert_result("((([[\"foo\" \"bar\"]])))", "[[[\"foo\" \"bar\"]]]");
}

#[test]
fn user_defined_functions() {
    assert_result("(defn foo [w] (echo (get w))) (foo \"HEY\")", "[:true \"HEY\"]");
    assert_result("(defn two [] 1 2) (two)", "[:true [1 2]]");
    assert_result("(defn sq [x] (+ (get x) (get x))) (sq 21)", "[:true 42]");

    // Parameters bind in a frame local to the call.
    assert_result("(set w \"outer\") (defn show [w] (echo (get w))) (show \"inner\") (get w)",
                  "[\"outer\" :true \"inner\" \"outer\"]");
}

#[test]
fn undefined_function_is_a_hard_error() {
    let err = assert_failure("(frobnicate 1)");
    assert_eq!(err.to_string(), "undefined function \"frobnicate\"");

    let err = assert_failure("(frobnicate)");
    assert_eq!(err.to_string(), "undefined function \"frobnicate\"");

    // The error surfaces from nested positions too.
    assert_failure("(+ 1 (frobnicate))");
    assert_failure("[(frobnicate)]");
    assert_failure("{:a (frobnicate)}");
}

#[test]
fn bound_values_in_call_position() {
    assert_result("(set x 5) (x)", "[5 5]");

    let err = assert_failure("(set x 5) (x 1 2)");
    assert_eq!(err.to_string(), "not a function: \"x\"");
}

#[test]
fn type_errors_from_hosts() {
    let err = assert_failure("(+ 1 \"two\")");
    assert_eq!(err.to_string(), "type error: cannot add a string value");
}

#[test]
fn auto_close_changes_eof_handling() {
    // Without the option an open expression is an error.
    assert!(sexpr::run("(").is_err());

    // With it, the dangling container closes and evaluates.
    let interp = Interpreter::new();
    builtin::install(&interp);

    let options = ParserOptions { auto_close_on_eof: true };
    let root = parse_with_options(b"(", options).unwrap();
    assert_eq!(root.encode(), "()");

    let (_ctx, value) = interp.eval(&root).unwrap();
    assert_eq!(value.to_string(), "[[]]");
}

#[test]
fn each_eval_gets_a_fresh_top_level_frame() {
    let interp = Interpreter::new();
    builtin::install(&interp);

    let root = parse_with_options(b"(set counter 1)", ParserOptions::default()).unwrap();
    let (_ctx, value) = interp.eval(&root).unwrap();
    assert_eq!(value.to_string(), "[1]");

    // Top-level bindings live in the evaluation's own frame; a later eval
    // against the same interpreter starts clean.
    let root = parse_with_options(b"(get counter)", ParserOptions::default()).unwrap();
    let (_ctx, value) = interp.eval(&root).unwrap();
    assert_eq!(value.to_string(), "[:nil]");

    // Bindings registered on the root scope do persist.
    interp.root().set("counter", sexpr::interpreter::value::Value::Int(2));
    let root = parse_with_options(b"(get counter)", ParserOptions::default()).unwrap();
    let (_ctx, value) = interp.eval(&root).unwrap();
    assert_eq!(value.to_string(), "[2]");
}

#[test]
fn custom_host_functions() {
    let interp = Interpreter::new();
    builtin::install(&interp);

    interp.defn("first", |ctx| {
        if ctx.next() {
            let value = ctx.argument()?;
            ctx.yield_value(value);
        }
        Ok(())
    });

    let root = parse_with_options(b"(first 1 2 3)", ParserOptions::default()).unwrap();
    let (_ctx, value) = interp.eval(&root).unwrap();
    assert_eq!(value.to_string(), "[1]");
}
