use glich::{run, Runtime, Value};

#[test]
fn test_write_statements() {
    let source = r#"
        writeln "Hello world";
        write 10 + 2, " and ", 10 - 2;
    "#;
    assert_eq!(run(source), "Hello world\n12 and 8");
}

#[test]
fn test_variables_persist_across_statements() {
    let source = r#"
        let total = 0;
        let i = 1;
        do
            total += i;
            i += 1;
        until i > 10;
        loop
        write total;
    "#;
    assert_eq!(run(source), "55");
}

#[test]
fn test_if_chain() {
    let source = r#"
        function judge(n) {
            if n < 0
                result = "negative";
            elseif n = 0
                result = "zero";
            else
                result = "positive";
            endif
        }
        write @judge(-5), " ", @judge(0), " ", @judge(5);
    "#;
    assert_eq!(run(source), "negative zero positive");
}

#[test]
fn test_runaway_loop_is_cut_off() {
    let source = r#"
        let i = 0;
        do
            i += 1;
        loop
        write i;
    "#;
    assert_eq!(run(source), "1000");
}

#[test]
fn test_nested_loops() {
    let source = r#"
        let total = 0;
        let i = 0;
        do
            i += 1;
            let j = 0;
            do
                j += 1;
                total += 1;
            until j = 3;
            loop
        until i = 4;
        loop
        write total;
    "#;
    assert_eq!(run(source), "12");
}

#[test]
fn test_error_values_flow_through_expressions() {
    let source = r#"
        let e = error "blown fuse";
        write e + 1 - 2 * 3;
    "#;
    assert_eq!(run(source), "Error: line 2: blown fuse");
}

#[test]
fn test_diagnostics_carry_line_numbers() {
    let source = "let a = 1;\nb = 2;\nwrite a;";
    assert_eq!(run(source), "line 2: variable \"b\" not found.\n1");
}

#[test]
fn test_function_result_and_recursion() {
    let source = r#"
        function fact(n) {
            if n <= 1
                result = 1;
            else
                result = n * @fact(n - 1);
            endif
        }
        write @fact(10);
    "#;
    assert_eq!(run(source), "3628800");
}

#[test]
fn test_command_writes_but_returns_nothing() {
    let source = r#"
        command banner(t) { writeln "== " + t + " =="; }
        call banner("report");
        call banner("end");
    "#;
    assert_eq!(run(source), "== report ==\n== end ==\n");
}

#[test]
fn test_object_definition_and_use() {
    let source = r#"
        object interval {
            values beg end;
            function width { result = end - beg; }
        }
        let iv = {interval, 10, 25};
        iv[1] = 12;
        write iv[.width], " ", iv.beg, " ", iv.end;
    "#;
    assert_eq!(run(source), "13 12 25");
}

#[test]
fn test_object_assignment_by_slot_name() {
    let source = r#"
        object interval {
            values beg end;
            function width { result = end - beg; }
        }
        let iv = {interval, 10, 25};
        iv["beg"] = 12;
        iv["end"] += 5;
        writeln iv[.width], " ", iv.beg, " ", iv.end;
        iv["mid"] = 0;
    "#;
    assert_eq!(run(source), "18 12 30\nline 10: unknown value \"mid\".\n");
}

#[test]
fn test_mark_scopes_definitions() {
    let mut rt = Runtime::new();
    let out = rt.run_script(
        r#"
        mark session;
        function f { result = 42; }
        write @f();
        clear session;
        write " ", @f();
        "#,
    );
    assert_eq!(out, "42 Error: function \"f\" not found.");
}

#[test]
fn test_runtime_persists_between_runs() {
    let mut rt = Runtime::new();
    rt.run_script("let x = 7;");
    assert_eq!(rt.run_script("write x * 3;"), "21");
    assert_eq!(rt.evaluate("x + 1"), Value::Number(8));
}

#[test]
fn test_set_operators_on_rlists() {
    let source = r#"
        let a = 1..10 | 20..30;
        let b = 5..25;
        writeln a & b;
        writeln a | b;
        writeln a \ b;
        writeln a ^ b;
    "#;
    assert_eq!(
        run(source),
        "5..10 | 20..25\n1..30\n1..4 | 26..30\n1..4 | 11..19 | 26..30\n"
    );
}

#[test]
fn test_sentinel_comparison_errors() {
    // Finite fields compare with numbers; the open timeline ends have
    // no number counterpart.
    assert_eq!(run("write 2460176f = 2460176;"), "true");
    assert_eq!(
        run("write future = 1;"),
        "Error: field sentinel has no number value"
    );
    assert_eq!(
        run("write past < 0;"),
        "Error: field sentinel has no number value"
    );
}

#[test]
fn test_complement_is_involutive() {
    let source = "write ~~(5..10 | 20..30);";
    assert_eq!(run(source), "5..10 | 20..30");
}

#[test]
fn test_at_if_and_strict_booleans() {
    assert_eq!(run("write @if(2 > 1, \"yes\", \"no\");"), "yes");
    let out = run("write @if(2 + 1, \"yes\", \"no\");");
    assert_eq!(out, "Error: expected boolean, got number");
}

#[test]
fn test_file_output() {
    let path = std::env::temp_dir().join("glich_file_stmt_test.txt");
    let path_str = path.to_str().unwrap();
    let source = format!(
        "file log \"{}\";\nwrite.log \"first\";\nwriteln.log \" second\";",
        path_str
    );
    let out = run(&source);
    assert_eq!(out, "");
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "first second\n");
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_lex_error_cap_aborts() {
    let out = run("$ $ $ $ $ $ $ write 1;");
    assert!(out.contains("too many errors, aborting run."));
}
