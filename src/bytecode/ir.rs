use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::lang::value::Value;

/// A flat, encoded instruction stream.
///
/// `Display` renders the disassembly (see `bytecode::disasm`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructions(pub Vec<u8>);

impl Instructions {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an encoded instruction and returns the offset it starts at.
    pub fn push(&mut self, instruction: &[u8]) -> usize {
        let position = self.0.len();
        self.0.extend_from_slice(instruction);
        position
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for Instructions {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Instructions {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl FromIterator<Vec<u8>> for Instructions {
    /// Concatenates already-encoded instructions.
    fn from_iter<I: IntoIterator<Item = Vec<u8>>>(iter: I) -> Self {
        Self(iter.into_iter().flatten().collect())
    }
}

/// A compiled program: what the compiler hands to the VM.
///
/// Every `OpConstant` operand in `instructions` indexes into `constants`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Value>,
}

impl Bytecode {
    pub fn new(instructions: Instructions, constants: Vec<Value>) -> Self {
        Self {
            instructions,
            constants,
        }
    }

    /// Serializes the package with postcard, for `.apec` files.
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::op::{Opcode, make};

    #[test]
    fn test_push_returns_offsets() {
        let mut ins = Instructions::new();
        assert_eq!(ins.push(&make(Opcode::Constant, &[0])), 0);
        assert_eq!(ins.push(&make(Opcode::Add, &[])), 3);
        assert_eq!(ins.len(), 4);
    }

    #[test]
    fn test_collect_concatenates() {
        let ins: Instructions = [make(Opcode::Constant, &[1]), make(Opcode::Sub, &[])]
            .into_iter()
            .collect();
        assert_eq!(ins.as_bytes(), &[0, 0, 1, 2]);
    }

    #[test]
    fn test_postcard_round_trip() {
        let bc = Bytecode::new(
            [make(Opcode::Constant, &[0]), make(Opcode::Constant, &[1]), make(Opcode::Mul, &[])]
                .into_iter()
                .collect(),
            vec![Value::Integer(6), Value::String("seven".into())],
        );
        let bytes = bc.to_bytes().unwrap();
        assert_eq!(Bytecode::from_bytes(&bytes).unwrap(), bc);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(Bytecode::from_bytes(&[0xFF, 0xFF, 0xFF]).is_err());
    }
}
