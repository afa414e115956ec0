//! LL(1) predictive parser with interleaved semantic actions.
//!
//! The parser keeps an explicit stack of pending grammar symbols, seeded with
//! `<prog>`.  Each step removes the front symbol and either matches a
//! terminal against the lookahead, expands a nonterminal into its right-hand
//! side, or fires a marker: the semantic actions (spelled `_assignment`,
//! `_while`, ... in the grammar) that drive symbol-table insertion and P-code
//! emission in the same left-to-right pass.
//!
//! ```text
//! <prog>          → "program" ID _prog ";" <block> _end_prog
//! <block>         → <condecl_opt> <vardecl_opt> <proc_opt> _begin_body <body>
//! <condecl_opt>   → "const" <const_list> ";" | ε
//! <const_list>    → <const> _const <const_list_tail>
//! <const>         → ID ":=" INTEGER
//! <const_list_tail> → "," <const> _const <const_list_tail> | ε
//! <vardecl_opt>   → "var" <id_list> _var ";" | ε
//! <proc_opt>      → <proc> | ε
//! <proc>          → "procedure" ID <param_list_opt> _proc ";" <block> _out_proc <proc_tail>
//! <param_list_opt> → "(" <id_list_opt> ")"
//! <proc_tail>     → ";" <proc> | ";" | ε
//! <body>          → "begin" <statement_list> "end"
//! <statement>     → ID ":=" <exp> _assignment
//!                 | "if" <lexp> _if "then" <statement> _else_if <else_opt> _end_else
//!                 | "while" <lexp> _while "do" <statement> _end_while
//!                 | "call" ID <arg_list_opt> _call
//!                 | <body>
//!                 | "read" "(" <id_list> _read ")"
//!                 | "write" "(" <exp_list> _write ")"
//! <lexp>          → "odd" <exp> _oddlexp | <exp> LOP <exp> _cmplexp
//! <exp>           → <sign_opt> <term> <exp_tail>
//! <exp_tail>      → AOP <term> _aop_exp <exp_tail> | ε
//! <term>          → <factor> <term_tail>
//! <term_tail>     → MOP <factor> _mop_term <term_tail> | ε
//! <factor>        → ID _id_factor | INTEGER _integer_factor | "(" <exp> ")"
//! <exp_list>      → <exp> _exp_explist <exp_list_tail>
//! ```
//!
//! The bare-`";"` alternative of `<proc_tail>` is a deliberate loosening:
//! conventional sources write `end; begin` between the last procedure and the
//! enclosing body, so after consuming the separator the parser peeks for
//! `procedure` before committing to another `<proc>`.

use std::collections::VecDeque;
use std::io::BufRead;
use std::mem;

use thiserror::Error;

use crate::firstset::NonTerminal;
use crate::pcode::{opr, CodeBuffer, Instruction, Opcode, PatchError};
use crate::symtab::{SemanticError, SymbolKind, SymbolTable};
use crate::token::{Token, TokenKind, TokenReader};

/// Syntactic and semantic failures.  All are fatal: the first error aborts
/// the compile and the driver exits nonzero.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("({row},{column}) syntax error: expected {expected}, found '{found}'")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        row: u32,
        column: u32,
    },
    #[error("({row},{column}) syntax error: {symbol} cannot start with '{found}', FIRST: {{ {first} }}")]
    NoAlternative {
        symbol: &'static str,
        first: String,
        found: String,
        row: u32,
        column: u32,
    },
    #[error("malformed token record: {0}")]
    MalformedRecord(String),
    #[error("({row},{column}) integer literal '{lexeme}' is out of range")]
    IntegerOverflow {
        lexeme: String,
        row: u32,
        column: u32,
    },
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result of a successful compile: the instruction stream and the frozen
/// scope tree the interpreter sizes activation records from.
#[derive(Debug)]
pub struct CompiledProgram {
    pub code: Vec<Instruction>,
    pub symbols: SymbolTable,
}

/// Parse the token record stream and generate code for it.
pub fn parse<R: BufRead>(input: R) -> Result<CompiledProgram, ParseError> {
    Parser::new(input)?.run()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GrammarSymbol {
    Terminal(TokenKind),
    Rule(NonTerminal),
    Marker(Action),
}

/// The `_`-prefixed markers of the grammar.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Prog,
    EndProg,
    Const,
    Var,
    Proc,
    OutProc,
    BeginBody,
    Assignment,
    If,
    ElseIf,
    EndElse,
    While,
    EndWhile,
    Call,
    Read,
    Write,
    ExpExplist,
    OddLexp,
    CmpLexp,
    AopExp,
    MopTerm,
    IntegerFactor,
    IdFactor,
}

/// Scratch state shared between terminal matches and semantic actions.  Each
/// queue is filled by the terminals a production consumes and drained by the
/// marker that ends it.
#[derive(Debug, Default)]
struct ParseContext {
    /// Identifier lexemes.  Factor-level actions take the newest entry,
    /// declaration- and statement-level actions take the oldest, matching
    /// the order the grammar interleaves them in.
    pending_names: VecDeque<String>,
    pending_values: VecDeque<i64>,
    /// Operator stacks: parenthesized subexpressions nest, so the innermost
    /// action must see the newest operator.
    pending_aop: Vec<char>,
    pending_mop: Vec<char>,
    pending_lop: Vec<i64>,
    call_arg_count: usize,
    /// Condition start PCs of the enclosing `while` statements, recorded at
    /// expansion so `_end_while` can emit the loop-back jump.
    while_starts: Vec<usize>,
}

struct Parser<R> {
    tokens: TokenReader<R>,
    lookahead: Token,
    stack: VecDeque<GrammarSymbol>,
    ctx: ParseContext,
    symbols: SymbolTable,
    code: CodeBuffer,
}

impl<R: BufRead> Parser<R> {
    fn new(input: R) -> Result<Self, ParseError> {
        let mut tokens = TokenReader::new(input);
        let lookahead = fetch(&mut tokens)?;
        let mut stack = VecDeque::new();
        stack.push_back(GrammarSymbol::Rule(NonTerminal::Prog));
        Ok(Self {
            tokens,
            lookahead,
            stack,
            ctx: ParseContext::default(),
            symbols: SymbolTable::new(),
            code: CodeBuffer::new(),
        })
    }

    fn run(mut self) -> Result<CompiledProgram, ParseError> {
        while let Some(symbol) = self.stack.pop_front() {
            match symbol {
                GrammarSymbol::Terminal(kind) => self.match_terminal(kind)?,
                GrammarSymbol::Rule(rule) => self.expand(rule)?,
                GrammarSymbol::Marker(action) => self.fire(action)?,
            }
        }
        Ok(CompiledProgram {
            code: self.code.into_code(),
            symbols: self.symbols,
        })
    }

    /// Consume the lookahead and pull the next token.
    fn advance(&mut self) -> Result<Token, ParseError> {
        let next = fetch(&mut self.tokens)?;
        let token = mem::replace(&mut self.lookahead, next);
        if token.row > 0 {
            self.symbols.set_row(token.row);
        }
        Ok(token)
    }

    fn match_terminal(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.lookahead.kind != kind {
            return Err(self.unexpected(kind.describe()));
        }
        let token = self.advance()?;
        match kind {
            TokenKind::Ident => self.ctx.pending_names.push_back(token.lexeme),
            TokenKind::Integer => {
                let value = token.lexeme.parse().map_err(|_| ParseError::IntegerOverflow {
                    lexeme: token.lexeme.clone(),
                    row: token.row,
                    column: token.column,
                })?;
                self.ctx.pending_values.push_back(value);
            }
            TokenKind::Aop => self.ctx.pending_aop.push(sign_of(&token.lexeme)),
            TokenKind::Mop => self
                .ctx
                .pending_mop
                .push(if token.lexeme == "/" { '/' } else { '*' }),
            TokenKind::Lop => {
                let selector =
                    lop_selector(&token.lexeme).ok_or_else(|| ParseError::UnexpectedToken {
                        expected: "a relational operator",
                        found: token.lexeme.clone(),
                        row: token.row,
                        column: token.column,
                    })?;
                self.ctx.pending_lop.push(selector);
            }
            _ => {}
        }
        Ok(())
    }

    /// Replace the front of the symbol stack with `symbols`, in order.
    fn push_rule(&mut self, symbols: &[GrammarSymbol]) {
        for symbol in symbols.iter().rev() {
            self.stack.push_front(*symbol);
        }
    }

    fn expand(&mut self, rule: NonTerminal) -> Result<(), ParseError> {
        use GrammarSymbol::{Marker as M, Rule as R, Terminal as T};
        use NonTerminal as N;
        use TokenKind as K;

        let kind = self.lookahead.kind;
        match rule {
            N::Prog => match kind {
                K::Program => self.push_rule(&[
                    T(K::Program),
                    T(K::Ident),
                    M(Action::Prog),
                    T(K::Semi),
                    R(N::Block),
                    M(Action::EndProg),
                ]),
                _ => return Err(self.no_alternative(rule)),
            },
            N::Block => match kind {
                K::Const | K::Var | K::Procedure | K::Begin => self.push_rule(&[
                    R(N::CondeclOpt),
                    R(N::VardeclOpt),
                    R(N::ProcOpt),
                    M(Action::BeginBody),
                    R(N::Body),
                ]),
                _ => return Err(self.no_alternative(rule)),
            },
            N::CondeclOpt => {
                if kind == K::Const {
                    self.push_rule(&[T(K::Const), R(N::ConstList), T(K::Semi)]);
                }
            }
            N::ConstList => match kind {
                K::Ident => self.push_rule(&[
                    R(N::ConstDef),
                    M(Action::Const),
                    R(N::ConstListTail),
                ]),
                _ => return Err(self.no_alternative(rule)),
            },
            N::ConstDef => match kind {
                K::Ident => self.push_rule(&[T(K::Ident), T(K::ColonEq), T(K::Integer)]),
                _ => return Err(self.no_alternative(rule)),
            },
            N::ConstListTail => {
                if kind == K::Comma {
                    self.push_rule(&[
                        T(K::Comma),
                        R(N::ConstDef),
                        M(Action::Const),
                        R(N::ConstListTail),
                    ]);
                }
            }
            N::VardeclOpt => {
                if kind == K::Var {
                    self.push_rule(&[T(K::Var), R(N::IdList), M(Action::Var), T(K::Semi)]);
                }
            }
            N::ProcOpt => {
                if kind == K::Procedure {
                    self.push_rule(&[R(N::Proc)]);
                }
            }
            N::Proc => match kind {
                K::Procedure => self.push_rule(&[
                    T(K::Procedure),
                    T(K::Ident),
                    R(N::ParamListOpt),
                    M(Action::Proc),
                    T(K::Semi),
                    R(N::Block),
                    M(Action::OutProc),
                    R(N::ProcTail),
                ]),
                _ => return Err(self.no_alternative(rule)),
            },
            N::ParamListOpt => match kind {
                K::LParen => self.push_rule(&[T(K::LParen), R(N::IdListOpt), T(K::RParen)]),
                _ => return Err(self.no_alternative(rule)),
            },
            N::IdListOpt => {
                if kind == K::Ident {
                    self.push_rule(&[R(N::IdList)]);
                }
            }
            N::ProcTail => {
                if kind == K::Semi {
                    // Consume the separator, then peek: the fixtures also put
                    // a `;` between the last procedure and the outer body.
                    self.advance()?;
                    if self.lookahead.kind == K::Procedure {
                        self.push_rule(&[R(N::Proc)]);
                    }
                }
            }
            N::Body => match kind {
                K::Begin => self.push_rule(&[T(K::Begin), R(N::StatementList), T(K::End)]),
                _ => return Err(self.no_alternative(rule)),
            },
            N::StatementList => match kind {
                K::Ident | K::If | K::While | K::Call | K::Begin | K::Read | K::Write => {
                    self.push_rule(&[R(N::Statement), R(N::StatementTail)])
                }
                _ => return Err(self.no_alternative(rule)),
            },
            N::StatementTail => {
                if kind == K::Semi {
                    self.push_rule(&[T(K::Semi), R(N::Statement), R(N::StatementTail)]);
                }
            }
            N::Statement => match kind {
                K::Ident => self.push_rule(&[
                    T(K::Ident),
                    T(K::ColonEq),
                    R(N::Exp),
                    M(Action::Assignment),
                ]),
                K::If => self.push_rule(&[
                    T(K::If),
                    R(N::Lexp),
                    M(Action::If),
                    T(K::Then),
                    R(N::Statement),
                    M(Action::ElseIf),
                    R(N::ElseOpt),
                    M(Action::EndElse),
                ]),
                K::While => {
                    // The condition's code starts at the current PC; remember
                    // it for `_end_while`'s loop-back jump.
                    self.ctx.while_starts.push(self.code.pc());
                    self.push_rule(&[
                        T(K::While),
                        R(N::Lexp),
                        M(Action::While),
                        T(K::Do),
                        R(N::Statement),
                        M(Action::EndWhile),
                    ]);
                }
                K::Call => {
                    self.ctx.call_arg_count = 0;
                    self.push_rule(&[
                        T(K::Call),
                        T(K::Ident),
                        R(N::ArgListOpt),
                        M(Action::Call),
                    ]);
                }
                K::Begin => self.push_rule(&[R(N::Body)]),
                K::Read => self.push_rule(&[
                    T(K::Read),
                    T(K::LParen),
                    R(N::IdList),
                    M(Action::Read),
                    T(K::RParen),
                ]),
                K::Write => {
                    self.ctx.call_arg_count = 0;
                    self.push_rule(&[
                        T(K::Write),
                        T(K::LParen),
                        R(N::ExpList),
                        M(Action::Write),
                        T(K::RParen),
                    ]);
                }
                _ => return Err(self.no_alternative(rule)),
            },
            N::ElseOpt => {
                if kind == K::Else {
                    self.push_rule(&[T(K::Else), R(N::Statement)]);
                }
            }
            N::Lexp => match kind {
                K::Odd => self.push_rule(&[T(K::Odd), R(N::Exp), M(Action::OddLexp)]),
                K::Aop | K::Ident | K::Integer | K::LParen => self.push_rule(&[
                    R(N::Exp),
                    T(K::Lop),
                    R(N::Exp),
                    M(Action::CmpLexp),
                ]),
                _ => return Err(self.no_alternative(rule)),
            },
            N::Exp => match kind {
                K::Aop | K::Ident | K::Integer | K::LParen => {
                    self.push_rule(&[R(N::SignOpt), R(N::Term), R(N::ExpTail)])
                }
                _ => return Err(self.no_alternative(rule)),
            },
            N::SignOpt => {
                // Consumed inline so the sign does not land in `pending_aop`.
                // No action reads it: a leading sign parses but generates no
                // code.
                if kind == K::Aop {
                    self.advance()?;
                }
            }
            N::ExpTail => {
                if kind == K::Aop {
                    self.push_rule(&[
                        T(K::Aop),
                        R(N::Term),
                        M(Action::AopExp),
                        R(N::ExpTail),
                    ]);
                }
            }
            N::Term => match kind {
                K::Ident | K::Integer | K::LParen => {
                    self.push_rule(&[R(N::Factor), R(N::TermTail)])
                }
                _ => return Err(self.no_alternative(rule)),
            },
            N::TermTail => {
                if kind == K::Mop {
                    self.push_rule(&[
                        T(K::Mop),
                        R(N::Factor),
                        M(Action::MopTerm),
                        R(N::TermTail),
                    ]);
                }
            }
            N::Factor => match kind {
                K::Ident => self.push_rule(&[T(K::Ident), M(Action::IdFactor)]),
                K::Integer => self.push_rule(&[T(K::Integer), M(Action::IntegerFactor)]),
                K::LParen => self.push_rule(&[T(K::LParen), R(N::Exp), T(K::RParen)]),
                _ => return Err(self.no_alternative(rule)),
            },
            N::ExpList => match kind {
                K::Aop | K::Ident | K::Integer | K::LParen => self.push_rule(&[
                    R(N::Exp),
                    M(Action::ExpExplist),
                    R(N::ExpListTail),
                ]),
                _ => return Err(self.no_alternative(rule)),
            },
            N::ExpListTail => {
                if kind == K::Comma {
                    self.push_rule(&[
                        T(K::Comma),
                        R(N::Exp),
                        M(Action::ExpExplist),
                        R(N::ExpListTail),
                    ]);
                }
            }
            N::ExpListOpt => {
                if matches!(kind, K::Aop | K::Ident | K::Integer | K::LParen) {
                    self.push_rule(&[R(N::ExpList)]);
                }
            }
            N::ArgListOpt => {
                if kind == K::LParen {
                    self.push_rule(&[T(K::LParen), R(N::ExpListOpt), T(K::RParen)]);
                }
            }
            N::IdList => match kind {
                K::Ident => self.push_rule(&[T(K::Ident), R(N::IdListTail)]),
                _ => return Err(self.no_alternative(rule)),
            },
            N::IdListTail => {
                if kind == K::Comma {
                    self.push_rule(&[T(K::Comma), T(K::Ident), R(N::IdListTail)]);
                }
            }
        }
        Ok(())
    }

    fn fire(&mut self, action: Action) -> Result<(), ParseError> {
        match action {
            Action::Prog => {
                let name = self.pop_oldest_name();
                let root = self.symbols.current_scope_id();
                self.symbols.set_owner(root, &name);
                // Entry jump over the procedure bodies; `_begin_body` patches it.
                self.code.push_pending_jump();
                self.code.emit(Opcode::Jmp, 0, 0);
            }
            Action::EndProg => {
                self.code.emit(Opcode::Opr, 0, opr::RET);
            }
            Action::Const => {
                let name = self.pop_oldest_name();
                let value = self
                    .ctx
                    .pending_values
                    .pop_front()
                    .expect("constant value queued before _const");
                self.symbols.insert_const(&name, value)?;
            }
            Action::Var => {
                while let Some(name) = self.ctx.pending_names.pop_front() {
                    self.symbols.insert_var(&name)?;
                }
            }
            Action::Proc => {
                // Queued names are the procedure followed by its parameters.
                let mut names = mem::take(&mut self.ctx.pending_names);
                let name = names.pop_front().expect("procedure name queued before _proc");
                let handle = self.symbols.insert_proc(&name, names.len())?;
                let inner = self.symbols.enter_proc_layer();
                self.symbols.set_owner(inner, &name);
                self.symbols.bind_inner_scope(handle, inner);
                for param in names {
                    self.symbols.insert_param(&param)?;
                }
                // Skip over the nested body until call time.
                self.code.push_pending_jump();
                self.code.emit(Opcode::Jmp, 0, 0);
            }
            Action::OutProc => {
                self.code.emit(Opcode::Opr, 0, opr::RET);
                self.symbols.exit_proc_layer()?;
            }
            Action::BeginBody => {
                let pc = self.code.pc();
                self.code.patch_pending_jump(pc)?;
                let current = self.symbols.current_scope_id();
                self.symbols.fill_entry(current, pc as i64);
            }
            Action::Assignment => {
                let name = self.pop_oldest_name();
                let (level_diff, offset) = self.data_slot(&name)?;
                self.code.emit(Opcode::Sto, level_diff, i64::from(offset + 3));
            }
            Action::If => {
                self.code.new_label("if_JPC", self.code.pc());
                self.code.emit(Opcode::Jpc, 0, 0);
            }
            Action::ElseIf => {
                self.code.new_label("else_JMP", self.code.pc());
                self.code.emit(Opcode::Jmp, 0, 0);
                let pc = self.code.pc();
                self.code.back_patch("if_JPC", pc)?;
            }
            Action::EndElse => {
                let pc = self.code.pc();
                self.code.back_patch("else_JMP", pc)?;
            }
            Action::While => {
                self.code.new_label("while_JPC", self.code.pc());
                self.code.emit(Opcode::Jpc, 0, 0);
            }
            Action::EndWhile => {
                let start = self
                    .ctx
                    .while_starts
                    .pop()
                    .expect("while statement records its condition start");
                self.code.emit(Opcode::Jmp, 0, start as i64);
                let pc = self.code.pc();
                self.code.back_patch("while_JPC", pc)?;
            }
            Action::Call => {
                let name = self.pop_oldest_name();
                let (symbol, level_diff) = self.symbols.find_global(&name)?;
                let (param_count, entry) = match symbol.kind {
                    SymbolKind::Proc {
                        param_count,
                        entry_address,
                        ..
                    } => (param_count, entry_address),
                    _ => return Err(self.symbols.type_mismatch(&name).into()),
                };
                if self.ctx.call_arg_count != param_count {
                    return Err(SemanticError::ParamCountMismatch {
                        name,
                        expected: param_count,
                        actual: self.ctx.call_arg_count,
                        row: self.symbols.current_row(),
                    }
                    .into());
                }
                // Stage the evaluated arguments for the interpreter; `CAL`
                // moves them into the fresh frame's param slots.
                for index in 0..self.ctx.call_arg_count {
                    self.code.emit(Opcode::Sto, -1, index as i64);
                }
                self.code.emit(Opcode::Cal, level_diff, entry);
                self.ctx.call_arg_count = 0;
            }
            Action::Read => {
                while let Some(name) = self.ctx.pending_names.pop_front() {
                    let (level_diff, offset) = self.data_slot(&name)?;
                    self.code.emit(Opcode::Red, 0, 0);
                    self.code.emit(Opcode::Sto, level_diff, i64::from(offset + 3));
                }
            }
            Action::Write => {
                for _ in 0..self.ctx.call_arg_count {
                    self.code.emit(Opcode::Wrt, 0, 0);
                }
                self.ctx.call_arg_count = 0;
            }
            Action::ExpExplist => {
                self.ctx.call_arg_count += 1;
            }
            Action::OddLexp => {
                self.code.emit(Opcode::Opr, 0, opr::ODD);
            }
            Action::CmpLexp => {
                let selector = self
                    .ctx
                    .pending_lop
                    .pop()
                    .expect("relational operator queued before _cmplexp");
                self.code.emit(Opcode::Opr, 0, selector);
            }
            Action::AopExp => {
                let operator = self
                    .ctx
                    .pending_aop
                    .pop()
                    .expect("additive operator queued before _aop_exp");
                let selector = if operator == '+' { opr::ADD } else { opr::SUB };
                self.code.emit(Opcode::Opr, 0, selector);
            }
            Action::MopTerm => {
                let operator = self
                    .ctx
                    .pending_mop
                    .pop()
                    .expect("multiplicative operator queued before _mop_term");
                let selector = if operator == '*' { opr::MUL } else { opr::DIV };
                self.code.emit(Opcode::Opr, 0, selector);
            }
            Action::IntegerFactor => {
                let value = self
                    .ctx
                    .pending_values
                    .pop_back()
                    .expect("integer queued before _integer_factor");
                self.code.emit(Opcode::Lit, 0, value);
            }
            Action::IdFactor => {
                let name = self
                    .ctx
                    .pending_names
                    .pop_back()
                    .expect("identifier queued before _id_factor");
                let (symbol, level_diff) = self.symbols.find_global(&name)?;
                match symbol.kind {
                    SymbolKind::Const { value } => {
                        self.code.emit(Opcode::Lit, 0, value);
                    }
                    SymbolKind::Var { offset } | SymbolKind::Param { offset } => {
                        self.code
                            .emit(Opcode::Lod, level_diff, i64::from(offset + 3));
                    }
                    SymbolKind::Proc { .. } => {
                        return Err(self.symbols.type_mismatch(&name).into());
                    }
                }
            }
        }
        Ok(())
    }

    /// Oldest queued identifier: the one a declaration or statement opened with.
    fn pop_oldest_name(&mut self) -> String {
        self.ctx
            .pending_names
            .pop_front()
            .expect("grammar queues a name before this action")
    }

    /// Resolve a name that must denote a data cell (var or param).
    fn data_slot(&self, name: &str) -> Result<(i32, i32), ParseError> {
        let (symbol, level_diff) = self.symbols.find_global(name)?;
        match symbol.kind {
            SymbolKind::Var { offset } | SymbolKind::Param { offset } => Ok((level_diff, offset)),
            _ => Err(self.symbols.type_mismatch(name).into()),
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::UnexpectedToken {
            expected,
            found: self.lookahead.lexeme.clone(),
            row: self.lookahead.row,
            column: self.lookahead.column,
        }
    }

    fn no_alternative(&self, rule: NonTerminal) -> ParseError {
        ParseError::NoAlternative {
            symbol: rule.name(),
            first: rule.first().join(" "),
            found: self.lookahead.lexeme.clone(),
            row: self.lookahead.row,
            column: self.lookahead.column,
        }
    }
}

fn fetch<R: BufRead>(tokens: &mut TokenReader<R>) -> Result<Token, ParseError> {
    let token = tokens.next_token()?;
    if token.kind == TokenKind::Error {
        return Err(ParseError::MalformedRecord(token.lexeme));
    }
    Ok(token)
}

fn sign_of(lexeme: &str) -> char {
    if lexeme == "-" {
        '-'
    } else {
        '+'
    }
}

fn lop_selector(lexeme: &str) -> Option<i64> {
    Some(match lexeme {
        "=" => opr::EQ,
        "<>" => opr::NE,
        "<" => opr::LT,
        "<=" => opr::LE,
        ">" => opr::GT,
        ">=" => opr::GE,
        _ => return None,
    })
}
