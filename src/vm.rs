use std::io::{self, Write};

use crate::lang::value::{Value, ValueError};
use crate::runtime_error::ExecError;
use crate::state::ProgramState;
use crate::token::{ArithOp, Condition, Form, InstructionKind, Operand, Slot, Token};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on executed instructions for one `run`.
    pub max_steps: Option<u64>,
    /// Stop `run` as soon as any diagnostic has been recorded.
    pub halt_on_error: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_steps: None,
            halt_on_error: true,
        }
    }
}

/// Observable effect of a single step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    /// The state was already terminal; nothing happened.
    Halted,
    /// An instruction ran without producing output.
    Executed,
    /// `PRINT` resolved this value.
    Printed(Value),
    /// `DUMP` asked for the current state to be rendered.
    Dumped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Control reached the end of the instruction list.
    Completed,
    /// A diagnostic was recorded and `halt_on_error` is set.
    Errored,
    /// `max_steps` instructions ran without the program finishing.
    StepLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub outcome: RunOutcome,
}

/// Sequential interpreter over a [`ProgramState`].
///
/// The engine owns the state for the whole run. `step` executes exactly one
/// instruction; `run` loops over `step` without growing the call stack.
pub struct Engine {
    state: ProgramState,
    config: EngineConfig,
    steps: u64,
}

type Handled = Result<StepEvent, ExecError>;

impl Engine {
    pub fn new(state: ProgramState) -> Self {
        Self::with_config(state, EngineConfig::default())
    }

    pub fn with_config(state: ProgramState, config: EngineConfig) -> Self {
        Engine {
            state,
            config,
            steps: 0,
        }
    }

    pub fn state(&self) -> &ProgramState {
        &self.state
    }

    pub fn into_state(self) -> ProgramState {
        self.state
    }

    /// Instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Advances the instruction pointer and executes the instruction there.
    ///
    /// A failing instruction records one diagnostic in `errors` and leaves
    /// the variables as they were. Stepping a terminal state is a no-op.
    pub fn step(&mut self) -> StepEvent {
        if self.state.is_terminal() {
            return StepEvent::Halted;
        }

        self.state.instruction_pointer += 1;
        self.steps += 1;

        let program = self.state.shared_instructions();
        let token = &program[self.state.instruction_pointer as usize];

        match self.execute(token) {
            Ok(event) => event,
            Err(e) => {
                self.state.errors.push(e);
                StepEvent::Executed
            }
        }
    }

    /// Steps until the program finishes, an error halts it or the step
    /// limit is reached. `PRINT` and `DUMP` output goes to `out`.
    pub fn run<W: Write>(&mut self, out: &mut W) -> io::Result<RunSummary> {
        let start = self.steps;

        loop {
            if let Some(max) = self.config.max_steps {
                if self.steps - start >= max && !self.state.is_terminal() {
                    return Ok(self.summary(start, RunOutcome::StepLimit));
                }
            }

            match self.step() {
                StepEvent::Halted => return Ok(self.summary(start, RunOutcome::Completed)),
                StepEvent::Executed => {}
                StepEvent::Printed(value) => writeln!(out, "> {}", value)?,
                StepEvent::Dumped => write!(out, "{}", self.state.render_dump())?,
            }

            if self.config.halt_on_error && self.state.has_errors() {
                return Ok(self.summary(start, RunOutcome::Errored));
            }
        }
    }

    fn summary(&self, start: u64, outcome: RunOutcome) -> RunSummary {
        RunSummary {
            steps: self.steps - start,
            outcome,
        }
    }

    /// 1-based source line of the current instruction.
    fn line(&self) -> usize {
        self.state.instruction_pointer as usize + 1
    }

    fn execute(&mut self, token: &Token) -> Handled {
        let expected = token.kind.slots().len();
        if token.operands.len() != expected {
            return Err(ExecError::ArityMismatch {
                mnemonic: token.kind.mnemonic(),
                expected,
                found: token.operands.len(),
                line: self.line(),
            });
        }

        match token.kind {
            InstructionKind::SetSimple | InstructionKind::Set => self.exec_set(token),
            InstructionKind::Increment => self.exec_step_by(token, ArithOp::Add),
            InstructionKind::Decrement => self.exec_step_by(token, ArithOp::Sub),
            InstructionKind::Arithmetic(op, form) => self.exec_arithmetic(token, op, form),
            InstructionKind::Jump(cond, form) => self.exec_jump(token, cond, form),
            InstructionKind::Print => self.exec_print(token),
            InstructionKind::Dump => Ok(StepEvent::Dumped),
            // Labels were bound before the run started.
            InstructionKind::Declare | InstructionKind::Nop => Ok(StepEvent::Executed),
        }
    }

    fn require<'t>(&self, token: &'t Token, slot: Slot) -> Result<&'t Operand, ExecError> {
        token.operand(slot).ok_or_else(|| ExecError::MissingOperand {
            mnemonic: token.kind.mnemonic(),
            slot: slot.name(),
            line: self.line(),
        })
    }

    /// Name in `slot`; literals are not valid there.
    fn require_name<'t>(&self, token: &'t Token, slot: Slot) -> Result<&'t str, ExecError> {
        match self.require(token, slot)? {
            Operand::Name(name) => Ok(name),
            other => Err(ExecError::TypeMismatch {
                mnemonic: token.kind.mnemonic(),
                detail: format!("{} must be a name, got {}", slot, other),
                line: self.line(),
            }),
        }
    }

    fn lookup(&self, name: &str) -> Result<&Value, ExecError> {
        self.state
            .variable(name)
            .ok_or_else(|| ExecError::UnknownVariable {
                name: name.to_string(),
                line: self.line(),
            })
    }

    /// Literal value of `operand`, or the current value of the variable it
    /// names.
    fn resolve(&self, operand: &Operand) -> Result<Value, ExecError> {
        match operand {
            Operand::Name(name) => self.lookup(name).cloned(),
            Operand::Integer(n) => Ok(Value::Integer(*n)),
            Operand::Float(n) => Ok(Value::Float(*n)),
            Operand::Text(s) => Ok(Value::Text(s.clone())),
        }
    }

    fn value_error(&self, token: &Token, e: ValueError) -> ExecError {
        match e {
            ValueError::DivisionByZero => ExecError::DivisionByZero { line: self.line() },
            ValueError::TypeMismatch { .. } => ExecError::TypeMismatch {
                mnemonic: token.kind.mnemonic(),
                detail: e.to_string(),
                line: self.line(),
            },
        }
    }

    fn exec_set(&mut self, token: &Token) -> Handled {
        let target = self.require_name(token, Slot::Target)?;
        let value = match token.kind {
            InstructionKind::Set => self.resolve(self.require(token, Slot::Right)?)?,
            _ => Value::Integer(0),
        };
        self.state.variables.insert(target.to_string(), value);
        Ok(StepEvent::Executed)
    }

    /// `INC` / `DEC`: the target must already exist.
    fn exec_step_by(&mut self, token: &Token, op: ArithOp) -> Handled {
        let target = self.require_name(token, Slot::Target)?;
        let result = self
            .lookup(target)?
            .apply(op, &Value::Integer(1))
            .map_err(|e| self.value_error(token, e))?;
        self.state.variables.insert(target.to_string(), result);
        Ok(StepEvent::Executed)
    }

    /// Two-operand form: `target = target <op> right`.
    /// Three-operand form: `target = left <op> right`, target must exist.
    fn exec_arithmetic(&mut self, token: &Token, op: ArithOp, form: Form) -> Handled {
        let target = self.require_name(token, Slot::Target)?;

        let left = match form {
            Form::Simple => self.lookup(target)?.clone(),
            Form::Full => self.resolve(self.require(token, Slot::Left)?)?,
        };
        let right = self.resolve(self.require(token, Slot::Right)?)?;

        if matches!(op, ArithOp::Div | ArithOp::Mod) && is_zero(&right) {
            return Err(ExecError::DivisionByZero { line: self.line() });
        }
        if form == Form::Full {
            self.lookup(target)?;
        }

        let result = left
            .apply(op, &right)
            .map_err(|e| self.value_error(token, e))?;
        self.state.variables.insert(target.to_string(), result);
        Ok(StepEvent::Executed)
    }

    /// Jumps to the target label when `left <cond> right` holds. The
    /// two-operand form compares against an implicit left of `0`.
    fn exec_jump(&mut self, token: &Token, cond: Condition, form: Form) -> Handled {
        let label = self.require_name(token, Slot::Target)?;
        let destination = self
            .state
            .label(label)
            .ok_or_else(|| ExecError::UnknownLabel {
                label: label.to_string(),
                line: self.line(),
            })?;

        let left = match form {
            Form::Simple => Value::Integer(0),
            Form::Full => self.resolve(self.require(token, Slot::Left)?)?,
        };
        let right = self.resolve(self.require(token, Slot::Right)?)?;

        let taken = left
            .satisfies(cond, &right)
            .map_err(|e| self.value_error(token, e))?;
        if taken {
            self.state.instruction_pointer = destination as isize;
        }
        Ok(StepEvent::Executed)
    }

    fn exec_print(&mut self, token: &Token) -> Handled {
        let value = self.resolve(self.require(token, Slot::Right)?)?;
        Ok(StepEvent::Printed(value))
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Integer(n) => *n == 0,
        Value::Float(n) => *n == 0.0,
        Value::Text(_) => false,
    }
}
