use serde::{Deserialize, Serialize};

// =============================================================================
// OPCODE - one byte per instruction, followed by fixed-width operands
// =============================================================================

/// Instruction opcodes. The discriminant is the byte written to the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// Push `constants[operand]`. One 2-byte operand, so the pool holds at
    /// most 65536 entries.
    Constant = 0,

    // arithmetic: pop right, pop left, push result
    Add = 1,
    Sub = 2,
    Mul = 3,
    Div = 4,
}

/// Human-readable name and operand layout of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Definition {
    pub name: &'static str,
    /// Byte width of each operand, in order.
    pub operand_widths: &'static [usize],
}

impl Definition {
    /// Total bytes taken by the operands.
    pub fn operand_len(&self) -> usize {
        self.operand_widths.iter().sum()
    }
}

impl Opcode {
    pub const ALL: [Opcode; 5] = [
        Opcode::Constant,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
    ];

    pub fn definition(self) -> Definition {
        match self {
            Opcode::Constant => Definition {
                name: "OpConstant",
                operand_widths: &[2],
            },
            Opcode::Add => Definition {
                name: "OpAdd",
                operand_widths: &[],
            },
            Opcode::Sub => Definition {
                name: "OpSub",
                operand_widths: &[],
            },
            Opcode::Mul => Definition {
                name: "OpMul",
                operand_widths: &[],
            },
            Opcode::Div => Definition {
                name: "OpDiv",
                operand_widths: &[],
            },
        }
    }

    pub fn name(self) -> &'static str {
        self.definition().name
    }

    /// Net effect on stack depth: `(pops, pushes)`.
    pub fn stack_effect(self) -> (usize, usize) {
        match self {
            Opcode::Constant => (0, 1),
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => (2, 1),
        }
    }
}

/// A byte that does not name any opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown opcode {0}")]
pub struct UnknownOpcode(pub u8);

impl TryFrom<u8> for Opcode {
    type Error = UnknownOpcode;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Opcode::ALL
            .into_iter()
            .find(|op| *op as u8 == byte)
            .ok_or(UnknownOpcode(byte))
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Encodes one instruction: the opcode byte, then each operand big-endian
/// at its declared width.
///
/// Missing operands encode as zero and extra ones are ignored. Operands wider
/// than their slot are truncated, so callers keep them in range (the compiler
/// bounds constant indices before emitting).
pub fn make(op: Opcode, operands: &[usize]) -> Vec<u8> {
    let def = op.definition();
    let mut instruction = Vec::with_capacity(1 + def.operand_len());
    instruction.push(op as u8);

    for (i, width) in def.operand_widths.iter().enumerate() {
        let operand = operands.get(i).copied().unwrap_or(0);
        match *width {
            2 => instruction.extend_from_slice(&(operand as u16).to_be_bytes()),
            w => instruction.extend(std::iter::repeat_n(0, w)),
        }
    }

    instruction
}

/// Decodes the operands that follow an opcode byte. Inverse of [`make`].
///
/// Returns the operands and the number of bytes consumed. Decoding stops at
/// the first operand that does not fit in `ins`, so a consumed count below
/// `def.operand_len()` means the instruction is truncated.
pub fn read_operands(def: &Definition, ins: &[u8]) -> (Vec<usize>, usize) {
    let mut operands = Vec::with_capacity(def.operand_widths.len());
    let mut offset = 0;

    for &width in def.operand_widths {
        let Some(bytes) = ins.get(offset..offset + width) else {
            break;
        };
        let operand = match width {
            2 => read_u16(bytes).map(usize::from).unwrap_or_default(),
            _ => 0,
        };
        operands.push(operand);
        offset += width;
    }

    (operands, offset)
}

/// Reads one big-endian `u16` from the front of `ins`.
pub fn read_u16(ins: &[u8]) -> Option<u16> {
    match ins {
        [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make() {
        assert_eq!(make(Opcode::Constant, &[65534]), vec![0, 0xFF, 0xFE]);
        assert_eq!(make(Opcode::Constant, &[1]), vec![0, 0x00, 0x01]);
        assert_eq!(make(Opcode::Add, &[]), vec![1]);
        assert_eq!(make(Opcode::Div, &[]), vec![4]);
    }

    #[test]
    fn test_read_operands_inverts_make() {
        let def = Opcode::Constant.definition();
        for value in 0..=usize::from(u16::MAX) {
            let ins = make(Opcode::Constant, &[value]);
            assert_eq!(read_operands(&def, &ins[1..]), (vec![value], 2));
        }
    }

    #[test]
    fn test_read_operands_truncated() {
        let def = Opcode::Constant.definition();
        assert_eq!(read_operands(&def, &[0xFF]), (vec![], 0));
    }

    #[test]
    fn test_read_u16() {
        assert_eq!(read_u16(&[0x01, 0x02, 0x03]), Some(0x0102));
        assert_eq!(read_u16(&[0x01]), None);
    }

    #[test]
    fn test_opcode_from_byte() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::try_from(op as u8), Ok(op));
        }
        assert_eq!(Opcode::try_from(200), Err(UnknownOpcode(200)));
    }

    #[test]
    fn test_definitions() {
        let names: Vec<_> = Opcode::ALL.iter().map(|op| op.name()).collect();
        assert_eq!(names, vec!["OpConstant", "OpAdd", "OpSub", "OpMul", "OpDiv"]);
        assert_eq!(Opcode::Constant.definition().operand_len(), 2);
        assert_eq!(Opcode::Mul.definition().operand_len(), 0);
    }
}
