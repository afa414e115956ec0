use pl0_compiler::lexer::{self, LexError};
use pl0_compiler::token::{TokenKind, TokenReader};

fn lex(source: &str) -> String {
    let mut out = Vec::new();
    lexer::tokenize(source, &mut out).expect("fixture lexes cleanly");
    String::from_utf8(out).expect("records are UTF-8")
}

#[test]
fn keywords_identifiers_and_positions() {
    let records = lex("program p;\nvar x;\n");
    let lines: Vec<&str> = records.lines().collect();
    assert_eq!(
        lines,
        vec![
            "PROGRAM(program)(1,1)",
            "IDENT(p)(1,9)",
            "SEMI(;)(1,10)",
            "VAR(var)(2,1)",
            "IDENT(x)(2,5)",
            "SEMI(;)(2,6)",
            "EOF(EOF)(0,0)",
        ]
    );
}

#[test]
fn keywords_are_case_insensitive_and_lowered() {
    let records = lex("PROGRAM Sum;");
    let lines: Vec<&str> = records.lines().collect();
    assert_eq!(lines[0], "PROGRAM(program)(1,1)");
    assert_eq!(lines[1], "IDENT(sum)(1,9)");
}

#[test]
fn operators_and_delimiters() {
    let records = lex("x := y <= 2 <> 3");
    let lines: Vec<&str> = records.lines().collect();
    assert_eq!(
        lines,
        vec![
            "IDENT(x)(1,1)",
            "COLONEQ(:=)(1,3)",
            "IDENT(y)(1,6)",
            "LOP(<=)(1,8)",
            "INTEGER(2)(1,11)",
            "LOP(<>)(1,13)",
            "INTEGER(3)(1,16)",
            "EOF(EOF)(0,0)",
        ]
    );
}

#[test]
fn additive_and_multiplicative_operators_keep_their_lexeme() {
    let records = lex("a + b * c / d - e");
    assert!(records.contains("AOP(+)"));
    assert!(records.contains("AOP(-)"));
    assert!(records.contains("MOP(*)"));
    assert!(records.contains("MOP(/)"));
}

#[test]
fn period_terminates_the_stream() {
    let records = lex("program p; begin end. @ trailing junk");
    let lines: Vec<&str> = records.lines().collect();
    assert_eq!(lines[lines.len() - 2], "END(end)(1,18)");
    assert_eq!(lines[lines.len() - 1], "EOF(EOF)(0,0)");
}

#[test]
fn letter_inside_a_number_is_rejected() {
    let mut out = Vec::new();
    let error = lexer::tokenize("x := 12a", &mut out).unwrap_err();
    assert!(matches!(
        error,
        LexError::MalformedNumber { ref lexeme, row: 1, .. } if lexeme == "12a"
    ));
}

#[test]
fn stray_characters_are_rejected() {
    let mut out = Vec::new();
    let error = lexer::tokenize("x @", &mut out).unwrap_err();
    assert!(matches!(
        error,
        LexError::InvalidCharacter { ref lexeme, .. } if lexeme == "@"
    ));

    let mut out = Vec::new();
    let error = lexer::tokenize("x : 1", &mut out).unwrap_err();
    assert!(matches!(
        error,
        LexError::InvalidCharacter { ref lexeme, .. } if lexeme == ":"
    ));
}

#[test]
fn records_round_trip_through_the_adapter() {
    let records = lex("write(n);");
    let mut reader = TokenReader::new(records.as_bytes());

    let token = reader.next_token().expect("record parses");
    assert_eq!(token.kind, TokenKind::Write);
    assert_eq!((token.row, token.column), (1, 1));

    let token = reader.next_token().expect("record parses");
    assert_eq!(token.kind, TokenKind::LParen);
    assert_eq!(token.lexeme, "(");

    let token = reader.next_token().expect("record parses");
    assert_eq!(token.kind, TokenKind::Ident);
    assert_eq!(token.lexeme, "n");

    // The `)` lexeme must survive the nested-parentheses record format.
    let token = reader.next_token().expect("record parses");
    assert_eq!(token.kind, TokenKind::RParen);
    assert_eq!(token.lexeme, ")");

    let token = reader.next_token().expect("record parses");
    assert_eq!(token.kind, TokenKind::Semi);

    let token = reader.next_token().expect("record parses");
    assert_eq!(token.kind, TokenKind::Eof);

    // Reading past the end keeps yielding EOF.
    let token = reader.next_token().expect("stream stays at end");
    assert_eq!(token.kind, TokenKind::Eof);
}

#[test]
fn adapter_skips_blank_lines_and_flags_garbage() {
    let mut reader = TokenReader::new("\n\nIDENT(x)(3,1)\n\nnot a record\n".as_bytes());

    let token = reader.next_token().expect("record parses");
    assert_eq!(token.kind, TokenKind::Ident);
    assert_eq!((token.row, token.column), (3, 1));

    let token = reader.next_token().expect("read succeeds");
    assert_eq!(token.kind, TokenKind::Error);
    assert_eq!(token.lexeme, "not a record");
}
