//! P-code interpreter executing against display-chained activation records.
//!
//! All activations live on one growable data stack.  A frame starts with four
//! control cells (dynamic link, return address, static link, local-area
//! size), then the param and var cells, then the display: one base address
//! per lexical level up to and including the frame's own, the last entry
//! being the frame itself.  Expression scratch grows above the display.  The
//! static-link cell holds the absolute address of the display so `LOD`/`STO`
//! never recompute it.
//!
//! The generator emits data operands as `offset + 3`; with the size word
//! sitting between the control cells and the data area, the effective cell
//! address is `display[current_level − L] + A + 1`.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use thiserror::Error;

use pl0_compiler::parser::CompiledProgram;
use pl0_compiler::pcode::{opr, Instruction, Opcode};
use pl0_compiler::symtab::{ScopeId, SymbolTable};

use crate::trace::TraceSink;

/// Runtime failures.  Every variant carries the program counter of the
/// faulting instruction.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("pc {pc}: division by zero")]
    DivisionByZero { pc: usize },
    #[error("pc {pc}: end of input while reading")]
    ReadPastEof { pc: usize },
    #[error("pc {pc}: malformed integer '{input}' on standard input")]
    ReadMalformed { pc: usize, input: String },
    #[error("pc {pc}: jump target {target} is out of range")]
    BadJump { pc: usize, target: i64 },
    #[error("pc {pc}: no procedure enters at {target}")]
    UnknownEntry { pc: usize, target: i64 },
    #[error("pc {pc}: data stack underflow")]
    StackUnderflow { pc: usize },
    #[error("pc {pc}: address {address} is outside the data stack")]
    BadAddress { pc: usize, address: i64 },
    #[error("pc {pc}: level difference {level_diff} exceeds the current nesting depth")]
    BadLevel { pc: usize, level_diff: i32 },
    #[error("pc {pc}: call site staged {staged} arguments, callee expects {expected}")]
    StagedArityMismatch {
        pc: usize,
        staged: usize,
        expected: usize,
    },
    #[error("pc {pc}: unknown operator selector {selector}")]
    UnknownOperator { pc: usize, selector: i64 },
    #[error("pc {pc}: no instruction at this address")]
    PcOutOfRange { pc: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// `WRT` values in emission order, flushed by the driver at halt.
    pub outputs: Vec<i64>,
    /// Instructions executed.
    pub steps: u64,
}

/// Public interpreter facade over a compiled program.
#[derive(Debug, Clone)]
pub struct Interpreter<'a> {
    code: &'a [Instruction],
    symbols: &'a SymbolTable,
}

impl<'a> Interpreter<'a> {
    pub fn new(program: &'a CompiledProgram) -> Self {
        Self {
            code: &program.code,
            symbols: &program.symbols,
        }
    }

    /// Run to halt, reading `RED` integers from `input` and recording every
    /// step into `trace`.
    pub fn execute<R: BufRead, W: Write>(
        &self,
        input: R,
        trace: &mut TraceSink<W>,
    ) -> Result<ExecutionOutcome, RuntimeError> {
        VmState::new(self.code, self.symbols).run(IntReader::new(input), trace)
    }
}

/// Shadow record of an active frame; the cells themselves live on the stack.
#[derive(Debug, Clone, Copy)]
struct Frame {
    base: usize,
    level: i32,
}

struct VmState<'a> {
    code: &'a [Instruction],
    symbols: &'a SymbolTable,
    pc: usize,
    stack: Vec<i64>,
    return_stack: Vec<usize>,
    frames: Vec<Frame>,
    /// Values parked by `STO -1` until the next `CAL` claims them.
    staged_args: Vec<i64>,
    outputs: Vec<i64>,
    steps: u64,
}

enum Flow {
    Continue,
    Halt,
}

impl<'a> VmState<'a> {
    fn new(code: &'a [Instruction], symbols: &'a SymbolTable) -> Self {
        Self {
            code,
            symbols,
            pc: 0,
            stack: Vec::new(),
            return_stack: Vec::new(),
            frames: Vec::new(),
            staged_args: Vec::new(),
            outputs: Vec::new(),
            steps: 0,
        }
    }

    fn run<R: BufRead, W: Write>(
        mut self,
        mut input: IntReader<R>,
        trace: &mut TraceSink<W>,
    ) -> Result<ExecutionOutcome, RuntimeError> {
        // Root activation for the program itself.
        self.push_frame(ScopeId(0), 0)?;

        loop {
            let pc = self.pc;
            let instruction = *self
                .code
                .get(pc)
                .ok_or(RuntimeError::PcOutOfRange { pc })?;
            self.pc += 1;
            self.steps += 1;
            trace.instruction(pc, &instruction)?;

            match instruction.op {
                Opcode::Lit => self.stack.push(instruction.a),
                Opcode::Lod => {
                    let address = self.cell_address(instruction.l, instruction.a)?;
                    let value = self.read_cell(address)?;
                    self.stack.push(value);
                }
                Opcode::Sto => {
                    let value = self.pop()?;
                    if instruction.l == -1 {
                        self.staged_args.push(value);
                    } else {
                        let address = self.cell_address(instruction.l, instruction.a)?;
                        self.write_cell(address, value)?;
                    }
                }
                Opcode::Cal => {
                    let target = self.jump_target(instruction.a)?;
                    let scope = self.symbols.find_proc_by_entry(instruction.a).ok_or(
                        RuntimeError::UnknownEntry {
                            pc,
                            target: instruction.a,
                        },
                    )?;
                    self.return_stack.push(self.pc);
                    self.push_frame(scope, self.pc)?;
                    self.pc = target;
                }
                Opcode::Int => {
                    let cells = instruction.a.max(0) as usize;
                    self.stack.extend(std::iter::repeat(0).take(cells));
                }
                Opcode::Jmp => self.pc = self.jump_target(instruction.a)?,
                Opcode::Jpc => {
                    let condition = self.pop()?;
                    if condition == 0 {
                        self.pc = self.jump_target(instruction.a)?;
                    }
                }
                Opcode::Opr => {
                    if let Flow::Halt = self.operate(instruction.a)? {
                        // The halt step traces its instruction but no stack.
                        break;
                    }
                }
                Opcode::Red => {
                    let value = input.read_int(pc)?;
                    self.stack.push(value);
                }
                Opcode::Wrt => {
                    let value = self.pop()?;
                    self.outputs.push(value);
                }
            }

            trace.stack(&self.stack)?;
        }

        Ok(ExecutionOutcome {
            outputs: self.outputs,
            steps: self.steps,
        })
    }

    /// Build an activation for `scope` at the top of the stack.
    fn push_frame(&mut self, scope: ScopeId, return_address: usize) -> Result<(), RuntimeError> {
        let layer = self.symbols.scope(scope);
        let slots = layer.frame_slots().max(0) as usize;
        let level = layer.level;
        let base = self.stack.len();
        let caller = self.frames.last().copied();

        self.stack.push(caller.map_or(0, |frame| frame.base) as i64); // dynamic link
        self.stack.push(return_address as i64);
        self.stack.push((base + 4 + slots) as i64); // static link: display start
        self.stack.push(slots as i64);
        self.stack.extend(std::iter::repeat(0).take(slots));

        // Display: bases for the outer levels come from the caller's display,
        // the frame's own base closes it.
        if level > 0 {
            let caller = caller.expect("nested frames always have a caller");
            // The caller's static-link cell holds its display start address.
            let caller_display = self.stack[caller.base + 2];
            for outer in 0..level {
                let entry = self.read_cell(caller_display + i64::from(outer))?;
                self.stack.push(entry);
            }
        }
        self.stack.push(base as i64);

        // Claim staged call arguments, newest first: the value staged last
        // came from the deepest stack cell, i.e. the first argument.
        let expected = layer.param_count();
        if self.staged_args.len() != expected {
            return Err(RuntimeError::StagedArityMismatch {
                pc: self.pc,
                staged: self.staged_args.len(),
                expected,
            });
        }
        for slot in 0..expected {
            let value = self.staged_args.pop().expect("length checked above");
            self.stack[base + 4 + slot] = value;
        }

        self.frames.push(Frame { base, level });
        Ok(())
    }

    fn operate(&mut self, selector: i64) -> Result<Flow, RuntimeError> {
        let pc = self.pc - 1;
        match selector {
            opr::RET => {
                // Return with an empty call stack is the program halting.
                let Some(return_pc) = self.return_stack.pop() else {
                    return Ok(Flow::Halt);
                };
                let frame = self
                    .frames
                    .pop()
                    .expect("an active frame backs every return");
                self.stack.truncate(frame.base);
                self.pc = return_pc;
            }
            opr::NEG => {
                let value = self.pop()?;
                self.stack.push(-value);
            }
            opr::ADD | opr::SUB | opr::MUL | opr::DIV => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                let value = match selector {
                    opr::ADD => lhs + rhs,
                    opr::SUB => lhs - rhs,
                    opr::MUL => lhs * rhs,
                    _ => {
                        if rhs == 0 {
                            return Err(RuntimeError::DivisionByZero { pc });
                        }
                        lhs / rhs
                    }
                };
                self.stack.push(value);
            }
            opr::ODD => {
                let value = self.pop()?;
                self.stack.push(value % 2);
            }
            opr::EQ | opr::NE | opr::LT | opr::LE | opr::GT | opr::GE => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                let truth = match selector {
                    opr::EQ => lhs == rhs,
                    opr::NE => lhs != rhs,
                    opr::LT => lhs < rhs,
                    opr::LE => lhs <= rhs,
                    opr::GT => lhs > rhs,
                    _ => lhs >= rhs,
                };
                self.stack.push(i64::from(truth));
            }
            other => {
                return Err(RuntimeError::UnknownOperator {
                    pc,
                    selector: other,
                })
            }
        }
        Ok(Flow::Continue)
    }

    /// Resolve a `LOD`/`STO` operand pair to an absolute stack address.
    fn cell_address(&self, level_diff: i32, a: i64) -> Result<i64, RuntimeError> {
        let pc = self.pc - 1;
        let frame = self.frames.last().expect("a frame is always active");
        let level = frame.level - level_diff;
        if level < 0 {
            return Err(RuntimeError::BadLevel { pc, level_diff });
        }
        let display = self.stack[frame.base + 2];
        let target_base = self.read_cell(display + i64::from(level))?;
        Ok(target_base + a + 1)
    }

    fn read_cell(&self, address: i64) -> Result<i64, RuntimeError> {
        usize::try_from(address)
            .ok()
            .and_then(|index| self.stack.get(index).copied())
            .ok_or(RuntimeError::BadAddress {
                pc: self.pc.saturating_sub(1),
                address,
            })
    }

    fn write_cell(&mut self, address: i64, value: i64) -> Result<(), RuntimeError> {
        let pc = self.pc.saturating_sub(1);
        let index = usize::try_from(address)
            .ok()
            .filter(|&index| index < self.stack.len())
            .ok_or(RuntimeError::BadAddress { pc, address })?;
        self.stack[index] = value;
        Ok(())
    }

    fn pop(&mut self) -> Result<i64, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow {
            pc: self.pc.saturating_sub(1),
        })
    }

    fn jump_target(&self, a: i64) -> Result<usize, RuntimeError> {
        usize::try_from(a)
            .ok()
            .filter(|&target| target < self.code.len())
            .ok_or(RuntimeError::BadJump {
                pc: self.pc.saturating_sub(1),
                target: a,
            })
    }
}

/// Whitespace-separated integer reader over standard input (or any reader).
struct IntReader<R> {
    input: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> IntReader<R> {
    fn new(input: R) -> Self {
        Self {
            input,
            pending: VecDeque::new(),
        }
    }

    fn read_int(&mut self, pc: usize) -> Result<i64, RuntimeError> {
        loop {
            if let Some(word) = self.pending.pop_front() {
                return word
                    .parse()
                    .map_err(|_| RuntimeError::ReadMalformed { pc, input: word });
            }
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(RuntimeError::ReadPastEof { pc });
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_owned));
        }
    }
}
