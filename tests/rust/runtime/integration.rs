use pl0_compiler::parser::CompiledProgram;
use pl0_compiler::{lexer, parser};
use pl0_runtime::interpreter::{Interpreter, RuntimeError};
use pl0_runtime::trace::TraceSink;

fn compile(source: &str) -> CompiledProgram {
    let mut records = Vec::new();
    lexer::tokenize(source, &mut records).expect("fixture lexes");
    parser::parse(records.as_slice()).expect("fixture compiles")
}

fn run(source: &str, input: &str) -> Vec<i64> {
    let program = compile(source);
    let mut trace = TraceSink::<Vec<u8>>::disabled();
    Interpreter::new(&program)
        .execute(input.as_bytes(), &mut trace)
        .expect("fixture runs to halt")
        .outputs
}

fn run_err(source: &str, input: &str) -> RuntimeError {
    let program = compile(source);
    let mut trace = TraceSink::<Vec<u8>>::disabled();
    Interpreter::new(&program)
        .execute(input.as_bytes(), &mut trace)
        .expect_err("fixture must fail at runtime")
}

#[test]
fn evaluates_a_constant_expression() {
    let outputs = run("program p; begin write(2+3*4) end.", "");
    assert_eq!(outputs, vec![14]);
}

#[test]
fn squares_its_input() {
    let outputs = run("program p; var x; begin read(x); write(x*x) end.", "7\n");
    assert_eq!(outputs, vec![49]);
}

#[test]
fn while_loop_sums_one_through_ten() {
    let source = "program p; const c := 10; var i, s; \
                  begin s := 0; i := 1; \
                  while i <= c do begin s := s + i; i := i + 1 end; \
                  write(s) end.";
    assert_eq!(run(source, ""), vec![55]);
}

#[test]
fn while_loop_whose_condition_is_false_up_front_is_skipped() {
    let source = "program p; var i; begin i := 9; while i < 9 do i := 0; write(i) end.";
    assert_eq!(run(source, ""), vec![9]);
}

#[test]
fn odd_selects_the_branch() {
    let source = "program p; var x; begin read(x); if odd x then write(1) else write(0) end.";
    assert_eq!(run(source, "6\n"), vec![0]);
    assert_eq!(run(source, "7\n"), vec![1]);
}

#[test]
fn calls_a_procedure_with_an_argument() {
    let source =
        "program p; var n; procedure f(x); begin write(x*x) end; begin read(n); call f(n) end.";
    assert_eq!(run(source, "5\n"), vec![25]);
}

#[test]
fn nested_procedure_reaches_outer_cells_through_the_display() {
    // `inner` reads `outer`'s parameter (level difference 1) and writes the
    // program-level variable (level difference 2).
    let source = "program p;\n\
                  var n;\n\
                  procedure outer(x);\n\
                    procedure inner();\n\
                    begin n := x + x end;\n\
                  begin call inner() end;\n\
                  begin read(n); call outer(n); write(n) end.";
    assert_eq!(run(source, "4\n"), vec![8]);
}

#[test]
fn sibling_procedure_locals_do_not_collide() {
    let source = "program p;\n\
                  var r;\n\
                  procedure double(v);\n\
                  begin r := v + v end;\n\
                  begin read(r); call double(r); call double(r); write(r) end.";
    assert_eq!(run(source, "3\n"), vec![12]);
}

#[test]
fn write_pops_its_arguments_from_the_stack_top() {
    // Each WRT pops, so a multi-value write emits last-first.
    assert_eq!(run("program p; begin write(1, 2+3, 7) end.", ""), vec![7, 5, 1]);
}

#[test]
fn read_fills_identifiers_in_order() {
    let source = "program p; var a, b; begin read(a, b); write(a-b) end.";
    assert_eq!(run(source, "9 4\n"), vec![5]);
}

#[test]
fn multiple_arguments_arrive_in_declaration_order() {
    let source = "program p; var n; procedure diff(a, b); begin n := a - b end; \
                  begin call diff(9, 4); write(n) end.";
    assert_eq!(run(source, ""), vec![5]);
}

#[test]
fn dangling_else_binds_to_the_nearest_if() {
    let source = "program p; var x; begin read(x); \
                  if x > 1 then if x > 2 then write(2) else write(1) else write(0) end.";
    assert_eq!(run(source, "3\n"), vec![2]);
    assert_eq!(run(source, "2\n"), vec![1]);
    assert_eq!(run(source, "0\n"), vec![0]);
}

#[test]
fn recursion_counts_down() {
    let source = "program p;\n\
                  var n;\n\
                  procedure count(k);\n\
                  begin if k > 0 then begin write(k); n := k - 1; call count(n) end end;\n\
                  begin call count(3) end.";
    assert_eq!(run(source, ""), vec![3, 2, 1]);
}

#[test]
fn division_truncates_toward_zero() {
    assert_eq!(run("program p; begin write(7/2) end.", ""), vec![3]);
}

#[test]
fn division_by_zero_is_fatal() {
    let error = run_err("program p; begin write(1/0) end.", "");
    assert!(matches!(error, RuntimeError::DivisionByZero { .. }));
}

#[test]
fn reading_past_end_of_input_is_fatal() {
    let error = run_err("program p; var x; begin read(x) end.", "");
    assert!(matches!(error, RuntimeError::ReadPastEof { .. }));
}

#[test]
fn malformed_input_integers_are_fatal() {
    let error = run_err("program p; var x; begin read(x) end.", "seven\n");
    assert!(matches!(
        error,
        RuntimeError::ReadMalformed { ref input, .. } if input == "seven"
    ));
}

#[test]
fn trace_records_instructions_and_the_stack_top_down() {
    let program = compile("program p; begin write(2+3*4) end.");
    let mut trace = TraceSink::new(Vec::new());
    Interpreter::new(&program)
        .execute("".as_bytes(), &mut trace)
        .expect("fixture runs");
    let buffer = trace.into_inner().expect("sink was enabled");
    let text = String::from_utf8(buffer).expect("trace is UTF-8");
    let lines: Vec<&str> = text.lines().collect();

    // First step: the entry jump over an empty declaration section, followed
    // by the root activation (four control cells plus a one-entry display).
    assert_eq!(lines[0], "0: JMP 0 1");
    assert_eq!(lines[1], "[4]: 0");
    assert_eq!(lines[2], "[3]: 0");
    assert_eq!(lines[3], "[2]: 4");
    assert_eq!(lines[4], "[1]: 0");
    assert_eq!(lines[5], "[0]: 0");

    // The halting OPR traces its instruction line only.
    assert_eq!(*lines.last().expect("trace is nonempty"), "7: OPR 0 0");

    // Every line is either an instruction or a stack cell.
    for line in &lines {
        assert!(
            line.contains(": "),
            "unexpected trace line: {line}"
        );
    }
}

#[test]
fn execution_counts_steps() {
    let program = compile("program p; begin write(1) end.");
    let mut trace = TraceSink::<Vec<u8>>::disabled();
    let outcome = Interpreter::new(&program)
        .execute("".as_bytes(), &mut trace)
        .expect("fixture runs");
    // JMP, LIT, WRT, OPR.
    assert_eq!(outcome.steps, 4);
}
