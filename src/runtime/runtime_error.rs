/// Errors raised while executing bytecode.
///
/// Execution stops at the first one; the stack keeps whatever was on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("stack overflow (capacity {capacity})")]
    StackOverflow { capacity: usize },

    #[error("stack underflow")]
    StackUnderflow,

    /// Operands of different types.
    #[error("type mismatch: {left} {op} {right}")]
    TypeMismatch {
        left: &'static str,
        op: &'static str,
        right: &'static str,
    },

    /// Operands of the same type, but not one the operator works on.
    #[error("unsupported operand types for {op}: {left} and {right}")]
    UnsupportedOperands {
        left: &'static str,
        op: &'static str,
        right: &'static str,
    },

    #[error("unknown opcode {opcode} at ip={ip}")]
    UnknownOpcode { opcode: u8, ip: usize },

    #[error("truncated operand for {name} at ip={ip}")]
    TruncatedOperand { name: &'static str, ip: usize },

    #[error("constant index {index} out of range (pool has {len} entries)")]
    ConstantOutOfRange { index: usize, len: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow: {left} {op} {right}")]
    IntegerOverflow {
        left: i64,
        op: &'static str,
        right: i64,
    },

    #[error("execution step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },
}
