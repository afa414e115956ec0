//! P-code instruction set and the append-only code buffer.
//!
//! Every instruction is an opcode plus two signed operands: `L`, the level
//! difference between the use site and the defining site, and `A`, an offset,
//! immediate, address, or sub-operator selector.  Instructions are indexed
//! from 0 and immutable once emitted, except through the explicit back-patch
//! interfaces below, which only ever rewrite an `A` field.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// Push a literal.
    Lit,
    /// Push a variable or parameter cell.
    Lod,
    /// Pop into a variable or parameter cell; `L = -1` stages a call argument.
    Sto,
    /// Call the procedure entered at `A`.
    Cal,
    /// Grow the data stack by `A` cells.
    Int,
    /// Unconditional jump.
    Jmp,
    /// Pop; jump if zero.
    Jpc,
    /// Arithmetic, comparison, and return, selected by `A` (see [`opr`]).
    Opr,
    /// Read an integer from standard input and push it.
    Red,
    /// Pop and append to the buffered program output.
    Wrt,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Lit => "LIT",
            Opcode::Lod => "LOD",
            Opcode::Sto => "STO",
            Opcode::Cal => "CAL",
            Opcode::Int => "INT",
            Opcode::Jmp => "JMP",
            Opcode::Jpc => "JPC",
            Opcode::Opr => "OPR",
            Opcode::Red => "RED",
            Opcode::Wrt => "WRT",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Sub-operator selectors carried in the `A` field of an `OPR` instruction.
pub mod opr {
    /// Procedure return; doubles as halt when the return stack is empty.
    pub const RET: i64 = 0;
    pub const NEG: i64 = 1;
    pub const ADD: i64 = 2;
    pub const SUB: i64 = 3;
    pub const MUL: i64 = 4;
    pub const DIV: i64 = 5;
    pub const ODD: i64 = 6;
    pub const EQ: i64 = 7;
    pub const NE: i64 = 8;
    pub const LT: i64 = 9;
    pub const LE: i64 = 10;
    pub const GT: i64 = 11;
    pub const GE: i64 = 12;
}

/// One three-address instruction.  Displays as `OP L A`, the format shared by
/// code listings and the execution trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub op: Opcode,
    pub l: i32,
    pub a: i64,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.op, self.l, self.a)
    }
}

/// Back-patch failures.  These indicate a compiler bug rather than bad input,
/// but they propagate like every other error.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("no pending jump to patch")]
    EmptyJumpStack,
    #[error("label '{0}' not found")]
    UnknownLabel(&'static str),
}

#[derive(Debug, Clone)]
struct Label {
    id: &'static str,
    place: usize,
}

/// Append-only instruction buffer with the two patching mechanisms the
/// generator needs: a jump stack for procedure-entry skip jumps, and named
/// labels resolved newest-first for nested `if`/`while`.
#[derive(Debug, Default)]
pub struct CodeBuffer {
    code: Vec<Instruction>,
    labels: Vec<Label>,
    jump_stack: Vec<usize>,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next instruction index.
    pub fn pc(&self) -> usize {
        self.code.len()
    }

    /// Append an instruction; returns its index.
    pub fn emit(&mut self, op: Opcode, l: i32, a: i64) -> usize {
        let index = self.code.len();
        self.code.push(Instruction { op, l, a });
        index
    }

    /// Remember the current PC as the site of a jump whose target is not yet
    /// known.  Call just before emitting that `JMP`.
    pub fn push_pending_jump(&mut self) {
        self.jump_stack.push(self.pc());
    }

    /// Resolve the most recent pending jump to `target`.
    pub fn patch_pending_jump(&mut self, target: usize) -> Result<(), PatchError> {
        let place = self.jump_stack.pop().ok_or(PatchError::EmptyJumpStack)?;
        self.code[place].a = target as i64;
        Ok(())
    }

    /// Record a named label pointing at `place`.
    pub fn new_label(&mut self, id: &'static str, place: usize) {
        self.labels.push(Label { id, place });
    }

    /// Patch the newest label named `id` to `target` and discard it.  The
    /// newest-first search is what lets `if` and `while` nest.
    pub fn back_patch(&mut self, id: &'static str, target: usize) -> Result<(), PatchError> {
        let position = self
            .labels
            .iter()
            .rposition(|label| label.id == id)
            .ok_or(PatchError::UnknownLabel(id))?;
        let label = self.labels.remove(position);
        self.code[label.place].a = target as i64;
        Ok(())
    }

    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    pub fn into_code(self) -> Vec<Instruction> {
        self.code
    }
}
