use crate::bytecode::ir::Bytecode;
use crate::bytecode::op::{Opcode, read_operands};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StackCheckError {
    pub message: String,
}

impl StackCheckError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Validates a bytecode package before it is executed.
///
/// A single linear walk over the instruction stream: every opcode must be
/// known, every operand complete, every constant index in range, and the
/// simulated stack height must stay within `0..=capacity`. There are no
/// jumps, so the walk sees every instruction exactly once.
pub fn check_bytecode_with_capacity(bc: &Bytecode, capacity: usize) -> Result<(), StackCheckError> {
    let ins = bc.instructions.as_bytes();
    let mut ip = 0;
    let mut h: usize = 0;

    while ip < ins.len() {
        let op = Opcode::try_from(ins[ip])
            .map_err(|e| StackCheckError::new(format!("{} at ip={}", e, ip)))?;
        let def = op.definition();

        let (operands, read) = read_operands(&def, &ins[ip + 1..]);
        if read < def.operand_len() {
            return Err(StackCheckError::new(format!(
                "truncated operands for {} at ip={}",
                def.name, ip
            )));
        }

        if op == Opcode::Constant {
            let index = operands.first().copied().unwrap_or_default();
            if index >= bc.constants.len() {
                return Err(StackCheckError::new(format!(
                    "constant index {} out of range at ip={} (pool has {} entries)",
                    index,
                    ip,
                    bc.constants.len()
                )));
            }
        }

        let (pops, pushes) = op.stack_effect();
        h = h.checked_sub(pops).ok_or_else(|| {
            StackCheckError::new(format!(
                "stack underflow at ip={}, op={}, needed {} items",
                ip, def.name, pops
            ))
        })?;
        h += pushes;
        if h > capacity {
            return Err(StackCheckError::new(format!(
                "stack overflow at ip={}, op={}, capacity {}",
                ip, def.name, capacity
            )));
        }

        ip += 1 + read;
    }

    Ok(())
}

/// Check a package against the default VM stack capacity.
pub fn check_bytecode(bc: &Bytecode) -> Result<(), StackCheckError> {
    check_bytecode_with_capacity(bc, crate::runtime::vm::STACK_SIZE)
}
