//! Machine-readable execution trace output.
//!
//! One `pc: OP L A` line per executed instruction, followed by the full data
//! stack from the top down as `[index]: value` lines.  The format is stable:
//! a separate animation tool replays it.

use std::io::{self, Write};

use pl0_compiler::pcode::Instruction;

/// Trace sink over any writer; a disabled sink records nothing.
#[derive(Debug)]
pub struct TraceSink<W> {
    out: Option<W>,
}

impl<W: Write> TraceSink<W> {
    pub fn new(out: W) -> Self {
        Self { out: Some(out) }
    }

    pub fn disabled() -> Self {
        Self { out: None }
    }

    pub fn instruction(&mut self, pc: usize, instruction: &Instruction) -> io::Result<()> {
        if let Some(out) = &mut self.out {
            writeln!(out, "{pc}: {instruction}")?;
        }
        Ok(())
    }

    pub fn stack(&mut self, cells: &[i64]) -> io::Result<()> {
        if let Some(out) = &mut self.out {
            for (index, value) in cells.iter().enumerate().rev() {
                writeln!(out, "[{index}]: {value}")?;
            }
        }
        Ok(())
    }

    /// Recover the writer, e.g. to inspect a buffered trace in tests.
    pub fn into_inner(self) -> Option<W> {
        self.out
    }
}
