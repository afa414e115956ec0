//! FIRST sets for the grammar's nonterminals.
//!
//! Purely diagnostic: the parser inlines its own alternative selection, and
//! reaches for these sets only when composing a syntax error message.  The
//! contents follow the grammar in `parser.rs` directly; `ε` marks a
//! nonterminal that may produce nothing.

/// The grammar's nonterminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonTerminal {
    Prog,
    Block,
    CondeclOpt,
    ConstList,
    ConstDef,
    ConstListTail,
    VardeclOpt,
    ProcOpt,
    Proc,
    ParamListOpt,
    IdListOpt,
    ProcTail,
    Body,
    StatementList,
    StatementTail,
    Statement,
    ElseOpt,
    Lexp,
    Exp,
    SignOpt,
    ExpTail,
    Term,
    TermTail,
    Factor,
    ExpList,
    ExpListTail,
    ExpListOpt,
    ArgListOpt,
    IdList,
    IdListTail,
}

impl NonTerminal {
    pub fn name(self) -> &'static str {
        match self {
            NonTerminal::Prog => "<prog>",
            NonTerminal::Block => "<block>",
            NonTerminal::CondeclOpt => "<condecl_opt>",
            NonTerminal::ConstList => "<const_list>",
            NonTerminal::ConstDef => "<const>",
            NonTerminal::ConstListTail => "<const_list_tail>",
            NonTerminal::VardeclOpt => "<vardecl_opt>",
            NonTerminal::ProcOpt => "<proc_opt>",
            NonTerminal::Proc => "<proc>",
            NonTerminal::ParamListOpt => "<param_list_opt>",
            NonTerminal::IdListOpt => "<id_list_opt>",
            NonTerminal::ProcTail => "<proc_tail>",
            NonTerminal::Body => "<body>",
            NonTerminal::StatementList => "<statement_list>",
            NonTerminal::StatementTail => "<statement_tail>",
            NonTerminal::Statement => "<statement>",
            NonTerminal::ElseOpt => "<else_opt>",
            NonTerminal::Lexp => "<lexp>",
            NonTerminal::Exp => "<exp>",
            NonTerminal::SignOpt => "<sign_opt>",
            NonTerminal::ExpTail => "<exp_tail>",
            NonTerminal::Term => "<term>",
            NonTerminal::TermTail => "<term_tail>",
            NonTerminal::Factor => "<factor>",
            NonTerminal::ExpList => "<exp_list>",
            NonTerminal::ExpListTail => "<exp_list_tail>",
            NonTerminal::ExpListOpt => "<exp_list_opt>",
            NonTerminal::ArgListOpt => "<arg_list_opt>",
            NonTerminal::IdList => "<id_list>",
            NonTerminal::IdListTail => "<id_list_tail>",
        }
    }

    /// Terminals (plus `ε`) that can begin this nonterminal.
    pub fn first(self) -> &'static [&'static str] {
        match self {
            NonTerminal::Prog => &["PROGRAM"],
            NonTerminal::Block => &["CONST", "VAR", "PROCEDURE", "BEGIN"],
            NonTerminal::CondeclOpt => &["CONST", "ε"],
            NonTerminal::ConstList => &["ID"],
            NonTerminal::ConstDef => &["ID"],
            NonTerminal::ConstListTail => &["COMMA", "ε"],
            NonTerminal::VardeclOpt => &["VAR", "ε"],
            NonTerminal::ProcOpt => &["PROCEDURE", "ε"],
            NonTerminal::Proc => &["PROCEDURE"],
            NonTerminal::ParamListOpt => &["LPAREN"],
            NonTerminal::IdListOpt => &["ID", "ε"],
            NonTerminal::ProcTail => &["SEMI", "ε"],
            NonTerminal::Body => &["BEGIN"],
            NonTerminal::StatementList => {
                &["ID", "IF", "WHILE", "CALL", "BEGIN", "READ", "WRITE"]
            }
            NonTerminal::StatementTail => &["SEMI", "ε"],
            NonTerminal::Statement => &["ID", "IF", "WHILE", "CALL", "BEGIN", "READ", "WRITE"],
            NonTerminal::ElseOpt => &["ELSE", "ε"],
            NonTerminal::Lexp => &["ODD", "ID", "INTEGER", "LPAREN", "AOP"],
            NonTerminal::Exp => &["AOP", "ID", "INTEGER", "LPAREN"],
            NonTerminal::SignOpt => &["AOP", "ε"],
            NonTerminal::ExpTail => &["AOP", "ε"],
            NonTerminal::Term => &["ID", "INTEGER", "LPAREN"],
            NonTerminal::TermTail => &["MOP", "ε"],
            NonTerminal::Factor => &["ID", "INTEGER", "LPAREN"],
            NonTerminal::ExpList => &["ID", "INTEGER", "LPAREN", "AOP"],
            NonTerminal::ExpListTail => &["COMMA", "ε"],
            NonTerminal::ExpListOpt => &["ID", "INTEGER", "LPAREN", "AOP", "ε"],
            NonTerminal::ArgListOpt => &["LPAREN", "ε"],
            NonTerminal::IdList => &["ID"],
            NonTerminal::IdListTail => &["COMMA", "ε"],
        }
    }
}
