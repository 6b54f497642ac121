use ecow::EcoString;
use tracing::{debug, trace};

use super::error::{ExecutionError, Outcome, ResourceExceededError, RuntimeError};
use super::frame::Frame;
use super::instruction_set::{ConstIndex, Instruction, JumpTarget};
use super::program::CompiledProgram;
use super::stack::Stack;
use crate::Vec;
use crate::api::ExecutionOptions;
use crate::values::{NativeRegistry, Value};

/// The lane virtual machine.
///
/// A `Vm` borrows the host's native registry and owns the mutable state of a
/// run: the operand stack and the frame stack. The program itself is only
/// borrowed by [`Vm::run`], so one compiled program can drive any number of
/// VMs at once.
///
/// # Example
///
/// ```
/// use lanes_core::api::{compile, CompilationOptions};
/// use lanes_core::values::{NativeRegistry, Value};
/// use lanes_core::vm::{Outcome, Vm};
///
/// let program = compile(br#"{"lanes":{"main":{"cards":[{"ScalarInt":7}]}}}"#,
///     &CompilationOptions::default()).unwrap();
/// let natives = NativeRegistry::new();
/// let mut vm = Vm::new(&natives);
/// assert_eq!(vm.run(&program), Ok(Outcome::Finished));
/// assert_eq!(vm.stack(), &[Value::Int(7)]);
/// ```
pub struct Vm<'r> {
    natives: &'r NativeRegistry<'r>,
    options: ExecutionOptions,
    stack: Stack<Value>,
    frames: Stack<Frame>,
    executed: u64,
}

/// What to do after an instruction.
enum Flow {
    Next,
    Goto(u32),
    Halt(Outcome),
}

impl<'r> Vm<'r> {
    pub fn new(natives: &'r NativeRegistry<'r>) -> Self {
        Self::with_options(natives, ExecutionOptions::default())
    }

    pub fn with_options(natives: &'r NativeRegistry<'r>, options: ExecutionOptions) -> Self {
        Vm {
            natives,
            stack: Stack::new(options.max_stack_size),
            frames: Stack::new(options.max_call_depth),
            options,
            executed: 0,
        }
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Operand stack left behind by the last run, bottom first.
    pub fn stack(&self) -> &[Value] {
        self.stack.as_slice()
    }

    /// Number of instructions the last run executed.
    pub fn instructions_executed(&self) -> u64 {
        self.executed
    }

    /// Discard all run state.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.frames.clear();
        self.executed = 0;
    }

    /// Execute `program` from its entry lane until it returns or aborts.
    ///
    /// Every run starts from a reset state. When the run fails, both stacks
    /// are discarded before the error is returned.
    pub fn run(&mut self, program: &CompiledProgram) -> Result<Outcome, ExecutionError> {
        self.reset();

        let result = self.execute(program);
        match &result {
            Ok(outcome) => debug!(
                ?outcome,
                executed = self.executed,
                stack = self.stack.len(),
                "Run finished"
            ),
            Err(err) => {
                debug!(error = %err, executed = self.executed, "Run failed");
                self.stack.clear();
                self.frames.clear();
            }
        }
        result
    }

    fn execute(&mut self, program: &CompiledProgram) -> Result<Outcome, ExecutionError> {
        let entry = program.entry();
        let mut ip = program.lane_info(entry).map_or(0, |lane| lane.entry);
        debug!(lane = %lane_name(program, entry), "Entering entry lane");
        self.push_frame(Frame::new(entry, None))?;

        loop {
            if let Some(limit) = self.options.max_instructions {
                if self.executed >= limit {
                    return Err(ResourceExceededError::InstructionLimit { limit }.into());
                }
            }

            let instruction = *program
                .instruction(ip)
                .ok_or(RuntimeError::CorruptProgram { offset: ip })?;
            trace!(ip, ?instruction, stack = self.stack.len(), "Executing");
            self.executed += 1;

            match self.step(program, ip, instruction)? {
                Flow::Next => ip += 1,
                Flow::Goto(target) => ip = target,
                Flow::Halt(outcome) => return Ok(outcome),
            }
        }
    }

    fn step(
        &mut self,
        program: &CompiledProgram,
        ip: u32,
        instruction: Instruction,
    ) -> Result<Flow, ExecutionError> {
        use Instruction::*;
        match instruction {
            StringLiteral(index) | ScalarInt(index) => {
                let value = program
                    .constant(index)
                    .ok_or(RuntimeError::CorruptProgram { offset: ip })?
                    .to_value();
                self.push(value)?;
            }
            ScalarNil => self.push(Value::Nil)?,
            SetVar(index) => {
                let value = self.pop(ip)?;
                let name = program.name(index);
                self.current_frame(ip)?.set(name, value);
            }
            ReadVar(index) => {
                let name = program.name(index);
                let value = self
                    .current_frame(ip)?
                    .get(&name)
                    .cloned()
                    .ok_or(RuntimeError::UndefinedVariable { name })?;
                self.push(value)?;
            }
            Equals => {
                let right = self.pop(ip)?;
                let left = self.pop(ip)?;
                let equal = left
                    .try_equals(&right)
                    .ok_or(RuntimeError::TypeMismatch {
                        left: left.kind(),
                        right: right.kind(),
                    })?;
                self.push(Value::Bool(equal))?;
            }
            CallNative(index) => self.call_native(program, ip, index)?,
            IfTrue(target) => {
                if self.pop_condition(ip)? {
                    return self.call_lane(program, ip, target);
                }
            }
            IfElse { then, r#else } => {
                let target = if self.pop_condition(ip)? { then } else { r#else };
                return self.call_lane(program, ip, target);
            }
            Jump(target) => return self.call_lane(program, ip, target),
            Return => {
                let frame = self
                    .frames
                    .pop()
                    .ok_or(RuntimeError::CorruptProgram { offset: ip })?;
                debug!(lane = %lane_name(program, frame.lane), "Returning from lane");
                return Ok(match frame.return_to {
                    Some(resume) => Flow::Goto(resume),
                    None => Flow::Halt(Outcome::Finished),
                });
            }
            Abort => {
                debug!(ip, "Abort");
                return Ok(Flow::Halt(Outcome::Aborted));
            }
        }
        Ok(Flow::Next)
    }

    fn call_native(
        &mut self,
        program: &CompiledProgram,
        ip: u32,
        index: ConstIndex,
    ) -> Result<(), ExecutionError> {
        let name = program.name(index);
        let natives = self.natives;
        let function = natives
            .get(&name)
            .ok_or_else(|| RuntimeError::UnknownNativeFunction { name: name.clone() })?;

        let args = self.pop_args(ip, function.arity())?;
        debug!(%name, argc = args.len(), "Calling native function");

        match function.call(&args) {
            Ok(Some(result)) => self.push(result),
            Ok(None) => Ok(()),
            Err(source) => Err(RuntimeError::NativeCallFailed { name, source }.into()),
        }
    }

    /// Enter the lane owning `target`, binding its declared arguments.
    fn call_lane(
        &mut self,
        program: &CompiledProgram,
        ip: u32,
        target: JumpTarget,
    ) -> Result<Flow, ExecutionError> {
        let lane = program
            .lane_info(target.lane)
            .ok_or(RuntimeError::CorruptProgram { offset: ip })?;
        let args = self.pop_args(ip, lane.arity())?;

        let mut frame = Frame::new(target.lane, Some(ip + 1));
        for (&name, value) in lane.arguments.iter().zip(args) {
            frame.set(program.name(name), value);
        }
        debug!(
            lane = %lane.name,
            offset = target.offset,
            depth = self.frames.len() + 1,
            "Calling lane"
        );
        self.push_frame(frame)?;
        Ok(Flow::Goto(target.offset))
    }

    fn current_frame(&mut self, ip: u32) -> Result<&mut Frame, ExecutionError> {
        self.frames
            .peek_mut()
            .ok_or_else(|| RuntimeError::CorruptProgram { offset: ip }.into())
    }

    fn push(&mut self, value: Value) -> Result<(), ExecutionError> {
        self.stack.push(value).map_err(|_| {
            ResourceExceededError::OperandStackOverflow {
                max_size: self.stack.capacity(),
            }
            .into()
        })
    }

    fn push_frame(&mut self, frame: Frame) -> Result<(), ExecutionError> {
        self.frames.push(frame).map_err(|_| {
            ResourceExceededError::CallStackOverflow {
                max_depth: self.frames.capacity(),
            }
            .into()
        })
    }

    fn pop(&mut self, ip: u32) -> Result<Value, ExecutionError> {
        self.stack.pop().ok_or_else(|| {
            RuntimeError::StackUnderflow {
                offset: ip,
                needed: 1,
                available: 0,
            }
            .into()
        })
    }

    fn pop_args(&mut self, ip: u32, count: usize) -> Result<Vec<Value>, ExecutionError> {
        let available = self.stack.len();
        self.stack.pop_n(count).ok_or_else(|| {
            RuntimeError::StackUnderflow {
                offset: ip,
                needed: count,
                available,
            }
            .into()
        })
    }

    fn pop_condition(&mut self, ip: u32) -> Result<bool, ExecutionError> {
        let condition = self.pop(ip)?;
        condition.as_bool().ok_or_else(|| {
            RuntimeError::ExpectedBoolean {
                found: condition.kind(),
            }
            .into()
        })
    }
}

fn lane_name(program: &CompiledProgram, ordinal: u32) -> EcoString {
    program
        .lane_info(ordinal)
        .map(|lane| lane.name.clone())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "runtime_test.rs"]
mod runtime_test;
