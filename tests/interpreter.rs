use std::cell::RefCell;
use std::rc::Rc;

use loxide::error::LoxideErrors;
use loxide::Session;

fn capturing_session() -> (Session, Rc<RefCell<Vec<u8>>>) {
    let out = Rc::new(RefCell::new(Vec::new()));
    (Session::with_output(out.clone()), out)
}

fn run(code: &str) -> (String, Option<LoxideErrors>) {
    let (mut session, out) = capturing_session();
    let result = session.run(code);
    let output = String::from_utf8(out.borrow().clone()).unwrap();
    (output, result.err())
}

fn run_ok(code: &str) -> String {
    let (output, errors) = run(code);
    assert!(errors.is_none(), "unexpected errors: {errors:?}");
    output
}

fn run_err(code: &str) -> (String, LoxideErrors) {
    let (output, errors) = run(code);
    (output, errors.expect("expected errors"))
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(run_ok("print 1 + 2 * 3;"), "7\n");
    assert_eq!(run_ok("print (1 + 2) * 3;"), "9\n");
    assert_eq!(run_ok("print 8 - 4 / 2;"), "6\n");
    assert_eq!(run_ok("print -3 + 1;"), "-2\n");
}

#[test]
fn string_concatenation() {
    assert_eq!(run_ok(r#"var a = "hi"; var b = "!"; print a + b;"#), "hi!\n");
}

#[test]
fn block_scoping_and_shadowing() {
    assert_eq!(
        run_ok("var x = 1; { var x = 2; print x; } print x;"),
        "2\n1\n"
    );
}

#[test]
fn closure_captures_mutable_counter() {
    let source = "\
fun make() {
  var n = 0;
  fun inc() {
    n = n + 1;
    return n;
  }
  return inc;
}
var c = make();
print c();
print c();
print c();";
    assert_eq!(run_ok(source), "1\n2\n3\n");
}

#[test]
fn independent_closures_do_not_share_state() {
    let source = "\
fun make() {
  var n = 0;
  fun inc() {
    n = n + 1;
    return n;
  }
  return inc;
}
var a = make();
var b = make();
print a();
print a();
print b();";
    assert_eq!(run_ok(source), "1\n2\n1\n");
}

#[test]
fn deeply_nested_closures_share_one_cell() {
    let source = "\
var get;
var set;
{
  var n = 10;
  {
    fun read() { return n; }
    fun write(v) { n = v; }
    get = read;
    set = write;
  }
}
set(42);
print get();";
    assert_eq!(run_ok(source), "42\n");
}

#[test]
fn inheritance_with_super_call() {
    let source = r#"
class A {
  greet() {
    print "hi";
  }
}
class B < A {
  greet() {
    super.greet();
    print "there";
  }
}
B().greet();"#;
    assert_eq!(run_ok(source), "hi\nthere\n");
}

#[test]
fn method_found_through_inheritance_chain() {
    let source = r#"
class A { who() { print "A"; } }
class B < A {}
class C < B {}
C().who();"#;
    assert_eq!(run_ok(source), "A\n");
}

#[test]
fn super_binds_this_of_the_caller() {
    let source = r#"
class A {
  name() { return this.n; }
}
class B < A {
  name() { return "B:" + super.name(); }
}
var b = B();
b.n = "x";
print b.name();"#;
    assert_eq!(run_ok(source), "B:x\n");
}

#[test]
fn initializer_sets_fields() {
    let source = "class P { init(n) { this.n = n; } } var p = P(7); print p.n;";
    assert_eq!(run_ok(source), "7\n");
}

#[test]
fn initializer_returns_instance_on_bare_return() {
    let source = "\
class P {
  init() {
    this.x = 1;
    return;
    this.x = 2;
  }
}
print P().x;";
    assert_eq!(run_ok(source), "1\n");
}

#[test]
fn class_arity_follows_initializer() {
    let (_, errors) = run_err("class P { init(a, b) {} } P(1);");
    assert_eq!(errors.exit_code(), 70);
    assert_eq!(
        errors.render(),
        "Expected 2 arguments but got 1.\n[line 1]"
    );
}

#[test]
fn bound_method_keeps_its_instance() {
    let source = r#"
class P {
  init(n) { this.n = n; }
  show() { print this.n; }
}
var m = P("bound").show;
m();"#;
    assert_eq!(run_ok(source), "bound\n");
}

#[test]
fn fields_shadow_methods() {
    let source = r#"
class P {
  m() { return "method"; }
}
var p = P();
fun replacement() { return "field"; }
p.m = replacement;
print p.m();"#;
    assert_eq!(run_ok(source), "field\n");
}

#[test]
fn methods_can_reference_class_name() {
    let source = r#"
class P {
  other() { return P(); }
}
print P().other();"#;
    assert_eq!(run_ok(source), "P instance\n");
}

#[test]
fn addition_type_error_is_runtime_70() {
    let (output, errors) = run_err(r#"print "a" + 1;"#);
    assert_eq!(output, "");
    assert_eq!(errors.exit_code(), 70);
    assert_eq!(
        errors.render(),
        "Operands must be two numbers or two strings.\n[line 1]"
    );
}

#[test]
fn assignment_is_right_associative_and_returns_value() {
    assert_eq!(run_ok("var a = 1; a = a = 2; print a;"), "2\n");
}

#[test]
fn logical_operators_return_deciding_operand() {
    assert_eq!(run_ok(r#"print "a" or "b";"#), "a\n");
    assert_eq!(run_ok(r#"print nil or "b";"#), "b\n");
    assert_eq!(run_ok(r#"print nil and "b";"#), "nil\n");
    assert_eq!(run_ok("print 1 and 2;"), "2\n");
    assert_eq!(run_ok("print false or false;"), "false\n");
}

#[test]
fn short_circuit_skips_side_effects() {
    let source = "\
var called = false;
fun touch() { called = true; return true; }
var _ = false and touch();
print called;
var __ = true or touch();
print called;";
    assert_eq!(run_ok(source), "false\nfalse\n");
}

#[test]
fn truthiness_treats_only_nil_and_false_as_falsy() {
    assert_eq!(run_ok("print !nil;"), "true\n");
    assert_eq!(run_ok("print !false;"), "true\n");
    assert_eq!(run_ok("print !0;"), "false\n");
    assert_eq!(run_ok(r#"print !"";"#), "false\n");
}

#[test]
fn number_formatting_round_trips() {
    assert_eq!(run_ok("print 7;"), "7\n");
    assert_eq!(run_ok("print 2.5 * 2;"), "5\n");
    assert_eq!(run_ok("print 10 / 4;"), "2.5\n");
    assert_eq!(run_ok("print 0.1 + 0.2;"), "0.30000000000000004\n");
}

#[test]
fn division_by_zero_prints_infinity() {
    assert_eq!(run_ok("print 1 / 0;"), "inf\n");
}

#[test]
fn equality_semantics() {
    assert_eq!(run_ok("print nil == nil;"), "true\n");
    assert_eq!(run_ok("print 1 == 1;"), "true\n");
    assert_eq!(run_ok(r#"print 1 == "1";"#), "false\n");
    assert_eq!(run_ok("print nil == false;"), "false\n");
    assert_eq!(run_ok(r#"print "a" != "b";"#), "true\n");
}

#[test]
fn control_flow_for_loop() {
    assert_eq!(
        run_ok("for (var i = 0; i < 3; i = i + 1) print i;"),
        "0\n1\n2\n"
    );
}

#[test]
fn control_flow_while_with_condition() {
    let source = "\
var a = 0;
var b = 1;
while (b < 30) {
  var t = a + b;
  a = b;
  b = t;
  print b;
}";
    assert_eq!(run_ok(source), "1\n2\n3\n5\n8\n13\n21\n34\n");
}

#[test]
fn if_else_branches() {
    assert_eq!(run_ok(r#"if (1 < 2) print "then"; else print "else";"#), "then\n");
    assert_eq!(run_ok(r#"if (1 > 2) print "then"; else print "else";"#), "else\n");
}

#[test]
fn callable_display_formats() {
    assert_eq!(run_ok("fun f() {} print f;"), "<fn f>\n");
    assert_eq!(run_ok("print clock;"), "<native fun>\n");
    assert_eq!(run_ok("class K {} print K;"), "K\n");
    assert_eq!(run_ok("class K {} print K();"), "K instance\n");
}

#[test]
fn clock_returns_a_number() {
    assert_eq!(run_ok("print clock() >= 0;"), "true\n");
}

#[test]
fn runtime_errors() {
    let (_, errors) = run_err("print x;");
    assert_eq!(errors.render(), "Undefined variable 'x'.\n[line 1]");

    let (_, errors) = run_err(r#""notfun"();"#);
    assert_eq!(
        errors.render(),
        "Can only call functions and classes.\n[line 1]"
    );

    let (_, errors) = run_err("fun f(a, b) {} f(1);");
    assert_eq!(errors.render(), "Expected 2 arguments but got 1.\n[line 1]");

    let (_, errors) = run_err("var x = 1;\nprint x.field;");
    assert_eq!(errors.render(), "Only instances have properties.\n[line 2]");

    let (_, errors) = run_err("var x = 1; x.field = 2;");
    assert_eq!(errors.render(), "Only instances have fields.\n[line 1]");

    let (_, errors) = run_err("class K {} print K().missing;");
    assert_eq!(errors.render(), "Undefined property 'missing'.\n[line 1]");

    let (_, errors) = run_err("print -\"s\";");
    assert_eq!(errors.render(), "Operand must be a number.\n[line 1]");

    let (_, errors) = run_err("print 1 < \"2\";");
    assert_eq!(
        errors.render(),
        "Operands must be numbers when using the '<' operator.\n[line 1]"
    );
}

#[test]
fn superclass_must_be_a_class() {
    let (_, errors) = run_err("var NotAClass = 1;\nclass B < NotAClass {}");
    assert_eq!(errors.exit_code(), 70);
    assert_eq!(errors.render(), "Superclass must be a class.\n[line 2]");
}

#[test]
fn output_before_runtime_error_is_kept() {
    let (output, errors) = run_err("print 1; print x; print 2;");
    assert_eq!(output, "1\n");
    assert_eq!(errors.exit_code(), 70);
}

#[test]
fn static_errors() {
    // the parser also misses its expression afterwards, as in the book
    let (_, errors) = run_err(r#"print "oops;"#);
    assert_eq!(errors.exit_code(), 65);
    let rendered = errors.render();
    assert!(rendered.contains("[line 1] Error: Unterminated string."));
    assert!(rendered.contains("[line 1] Error at end: Expect expression."));

    let (_, errors) = run_err("return 1;");
    assert_eq!(
        errors.render(),
        "[line 1] Error at 'return': Can't return from top-level code."
    );

    let (_, errors) = run_err("print this;");
    assert_eq!(
        errors.render(),
        "[line 1] Error at 'this': Can't use 'this' outside of a class."
    );

    let (_, errors) = run_err("class A < A {}");
    assert_eq!(
        errors.render(),
        "[line 1] Error at 'A': A class can't inherit from itself."
    );

    let (_, errors) = run_err("{ var x = x; }");
    assert_eq!(
        errors.render(),
        "[line 1] Error at 'x': Can't read local variable in its own initializer."
    );
}

#[test]
fn static_errors_suppress_execution() {
    let (output, errors) = run_err("print 1; return 2;");
    assert_eq!(output, "");
    assert_eq!(errors.exit_code(), 65);
}

#[test]
fn trailing_dot_is_a_syntax_error() {
    let (_, errors) = run_err("print 123.;");
    assert_eq!(errors.exit_code(), 65);
    assert_eq!(
        errors.render(),
        "[line 1] Error at ';': Expect property name after '.'."
    );
}

#[test]
fn keyword_prefix_identifier_is_not_a_keyword() {
    assert_eq!(run_ok(r#"var orchid = "flower"; print orchid;"#), "flower\n");
}

#[test]
fn top_level_self_reference_fails_at_runtime() {
    let (_, errors) = run_err("var x = x;");
    assert_eq!(errors.exit_code(), 70);
    assert_eq!(errors.render(), "Undefined variable 'x'.\n[line 1]");
}

#[test]
fn parser_reports_multiple_errors_in_one_run() {
    let (_, errors) = run_err("var ;\nvar x = 1;\nfun ;");
    assert_eq!(errors.exit_code(), 65);
    assert_eq!(errors.nested.len(), 2);
}

#[test]
fn argument_cap_is_255() {
    let args = vec!["0"; 256].join(", ");
    let (_, errors) = run_err(&format!("fun f() {{}} f({args});"));
    assert_eq!(errors.exit_code(), 65);
    assert!(errors
        .render()
        .contains("Can't have more than 255 arguments."));
}

#[test]
fn session_state_persists_across_turns() {
    let (mut session, out) = capturing_session();
    session.run("var a = 1;").unwrap();
    session.run("fun next() { a = a + 1; return a; }").unwrap();
    session.run("print next();").unwrap();
    session.run("print next();").unwrap();
    assert_eq!(String::from_utf8(out.borrow().clone()).unwrap(), "2\n3\n");
}

#[test]
fn session_survives_errors_between_turns() {
    let (mut session, out) = capturing_session();
    session.run("var a = 10;").unwrap();
    assert!(session.run("print b;").is_err());
    assert!(session.run("var ;").is_err());
    session.run("print a;").unwrap();
    assert_eq!(String::from_utf8(out.borrow().clone()).unwrap(), "10\n");
}

#[test]
fn split_turns_match_single_run() {
    let source = "var a = 0; a = a + 1; print a; a = a + 1; print a;";

    let (mut split, split_out) = capturing_session();
    split.run("var a = 0; a = a + 1; print a;").unwrap();
    split.run("a = a + 1; print a;").unwrap();

    let whole = run_ok(source);
    assert_eq!(
        String::from_utf8(split_out.borrow().clone()).unwrap(),
        whole
    );
}

#[test]
fn closure_from_earlier_turn_reports_correct_line() {
    let (mut session, _) = capturing_session();
    session.run("fun bad() { return 1 + nil; }").unwrap();
    let errors = session.run("bad();").unwrap_err();
    assert_eq!(
        errors.render(),
        "Operands must be two numbers or two strings.\n[line 1]"
    );
}

#[test]
fn class_defined_in_earlier_turn_is_constructible() {
    let (mut session, out) = capturing_session();
    session
        .run("class P { init(n) { this.n = n; } get() { return this.n; } }")
        .unwrap();
    session.run("var p = P(5);").unwrap();
    session.run("print p.get();").unwrap();
    assert_eq!(String::from_utf8(out.borrow().clone()).unwrap(), "5\n");
}

#[test]
fn nested_this_through_closure_in_method() {
    let source = r#"
class Counter {
  init() { this.n = 0; }
  bump() {
    fun go() { return "bumped"; }
    this.n = this.n + 1;
    print go();
    print this.n;
  }
}
var c = Counter();
c.bump();
c.bump();"#;
    assert_eq!(run_ok(source), "bumped\n1\nbumped\n2\n");
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let source = "\
// leading comment
print 1; // trailing comment

// a line of its own
print 2;";
    assert_eq!(run_ok(source), "1\n2\n");
}

#[test]
fn multi_line_string_keeps_line_count_for_diagnostics() {
    let (_, errors) = run_err("var s = \"a\nb\";\nprint t;");
    assert_eq!(errors.render(), "Undefined variable 't'.\n[line 3]");
}
