use tracing::{debug, trace};

use crate::bytecode::ir::Bytecode;
use crate::bytecode::op::{Opcode, read_u16};
use crate::lang::value::Value;
use crate::runtime::runtime_error::RuntimeError;

/// Default operand stack capacity.
pub const STACK_SIZE: usize = 2048;

#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Operand stack capacity; pushing past it is a `StackOverflow`.
    pub stack_size: usize,
    /// Instruction budget per `run`, unlimited when `None`.
    pub max_steps: Option<usize>,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            stack_size: STACK_SIZE,
            max_steps: None,
        }
    }
}

/// Stack-based bytecode interpreter.
///
/// Instructions and constants are borrowed read-only from the package; the
/// VM owns only its operand stack. `sp` always points at the next free
/// slot, so `0 <= sp <= stack_size`.
pub struct Vm<'a> {
    instructions: &'a [u8],
    constants: &'a [Value],
    stack: Vec<Value>,
    sp: usize,
    config: VmConfig,
    steps: usize,
}

impl<'a> Vm<'a> {
    pub fn new(bytecode: &'a Bytecode) -> Self {
        Self::with_config(bytecode, VmConfig::default())
    }

    pub fn with_config(bytecode: &'a Bytecode, config: VmConfig) -> Self {
        Self {
            instructions: bytecode.instructions.as_bytes(),
            constants: &bytecode.constants,
            stack: vec![Value::Null; config.stack_size],
            sp: 0,
            config,
            steps: 0,
        }
    }

    /// The value on top of the stack, if any.
    pub fn stack_top(&self) -> Option<&Value> {
        self.sp.checked_sub(1).map(|top| &self.stack[top])
    }

    /// Live portion of the stack, bottom first.
    pub fn stack(&self) -> &[Value] {
        &self.stack[..self.sp]
    }

    /// Executes the whole instruction stream from the start with an empty
    /// stack. There is no halt opcode: execution ends at the end of the
    /// stream or at the first error.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        self.sp = 0;
        self.steps = 0;

        let ins = self.instructions;
        debug!(bytes = ins.len(), constants = self.constants.len(), "vm run start");

        let mut ip = 0;
        while ip < ins.len() {
            self.check_limits()?;

            let byte = ins[ip];
            let op = Opcode::try_from(byte).map_err(|_| RuntimeError::UnknownOpcode { opcode: byte, ip })?;
            trace!(ip, op = op.name(), sp = self.sp, "exec");

            match op {
                Opcode::Constant => {
                    let index = read_u16(&ins[ip + 1..]).ok_or(RuntimeError::TruncatedOperand {
                        name: op.name(),
                        ip,
                    })? as usize;
                    ip += 2;

                    let value = self.constants.get(index).cloned().ok_or(
                        RuntimeError::ConstantOutOfRange {
                            index,
                            len: self.constants.len(),
                        },
                    )?;
                    self.push(value)?;
                }
                Opcode::Add => self.arithmetic(ArithOp::Add)?,
                Opcode::Sub => self.arithmetic(ArithOp::Sub)?,
                Opcode::Mul => self.arithmetic(ArithOp::Mul)?,
                Opcode::Div => self.arithmetic(ArithOp::Div)?,
            }

            ip += 1;
        }

        debug!(sp = self.sp, steps = self.steps, "vm run finished");
        Ok(())
    }

    fn check_limits(&mut self) -> Result<(), RuntimeError> {
        self.steps += 1;

        if let Some(limit) = self.config.max_steps {
            if self.steps > limit {
                return Err(RuntimeError::StepLimitExceeded { limit });
            }
        }

        Ok(())
    }

    /// Pops right then left, pushes the result.
    fn arithmetic(&mut self, op: ArithOp) -> Result<(), RuntimeError> {
        let right = self.pop()?;
        let left = self.pop()?;
        let result = binary_arithmetic(op, &left, &right)?;
        self.push(result)
    }

    fn push(&mut self, value: Value) -> Result<(), RuntimeError> {
        if self.sp >= self.stack.len() {
            return Err(RuntimeError::StackOverflow {
                capacity: self.stack.len(),
            });
        }
        self.stack[self.sp] = value;
        self.sp += 1;
        Ok(())
    }

    fn pop(&mut self) -> Result<Value, RuntimeError> {
        if self.sp == 0 {
            return Err(RuntimeError::StackUnderflow);
        }
        self.sp -= 1;
        Ok(std::mem::replace(&mut self.stack[self.sp], Value::Null))
    }
}

/// The binary operators the VM evaluates; each arithmetic opcode maps to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }

    /// Checked integer arithmetic: overflow and division by zero are errors.
    fn apply(self, a: i64, b: i64) -> Result<i64, RuntimeError> {
        let result = match self {
            ArithOp::Add => a.checked_add(b),
            ArithOp::Sub => a.checked_sub(b),
            ArithOp::Mul => a.checked_mul(b),
            ArithOp::Div if b == 0 => return Err(RuntimeError::DivisionByZero),
            ArithOp::Div => a.checked_div(b),
        };

        result.ok_or(RuntimeError::IntegerOverflow {
            left: a,
            op: self.symbol(),
            right: b,
        })
    }
}

/// Operands of different types are a `TypeMismatch`; anything else
/// non-integer is `UnsupportedOperands`.
fn binary_arithmetic(op: ArithOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => op.apply(*a, *b).map(Value::Integer),
        _ if left.type_name() != right.type_name() => Err(RuntimeError::TypeMismatch {
            left: left.type_name(),
            op: op.symbol(),
            right: right.type_name(),
        }),
        _ => Err(RuntimeError::UnsupportedOperands {
            left: left.type_name(),
            op: op.symbol(),
            right: right.type_name(),
        }),
    }
}
