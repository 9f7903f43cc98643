use std::collections::BTreeMap;
use std::fmt;

use crate::bytecode::ir::{Bytecode, Instructions};
use crate::bytecode::op::{Definition, Opcode, read_operands};

/// Print disassembly of a bytecode package
pub fn print_bc(bc: &Bytecode) {
    println!("=== BYTECODE PROGRAM ===\n");
    print!("{}", disassemble(&bc.instructions));
    println!();

    println!("=== CONSTANTS ({}) ===", bc.constants.len());
    for (i, value) in bc.constants.iter().enumerate() {
        println!("  {:04}  {:<8} {}", i, value.type_name(), value);
    }
    println!();
}

// =============================================================================
// String output (for testing/logging)
// =============================================================================

/// Return disassembly as a String, one line per instruction.
pub fn disassemble(ins: &[u8]) -> String {
    let mut output = String::new();
    let mut ip = 0;

    while ip < ins.len() {
        let op = match Opcode::try_from(ins[ip]) {
            Ok(op) => op,
            Err(err) => {
                output.push_str(&format!("ERROR: {}\n", err));
                ip += 1;
                continue;
            }
        };

        let def = op.definition();
        let (operands, read) = read_operands(&def, &ins[ip + 1..]);
        if read < def.operand_len() {
            output.push_str(&format!("ERROR: truncated operands for {}\n", def.name));
            break;
        }

        output.push_str(&format!("{:04} {}\n", ip, format_instruction(&def, &operands)));
        ip += 1 + read;
    }

    output
}

fn format_instruction(def: &Definition, operands: &[usize]) -> String {
    let mut out = def.name.to_string();
    for operand in operands {
        out.push_str(&format!(" {}", operand));
    }
    out
}

impl fmt::Display for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&disassemble(self))
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Per-opcode instruction counts, by opcode name. Stops at the first
/// undecodable byte or truncated instruction.
pub fn op_counts(ins: &[u8]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    let mut ip = 0;

    while let Some(op) = ins.get(ip).and_then(|b| Opcode::try_from(*b).ok()) {
        let next = ip + 1 + op.definition().operand_len();
        if next > ins.len() {
            break;
        }
        *counts.entry(op.name()).or_insert(0) += 1;
        ip = next;
    }

    counts
}

/// Print bytecode statistics
pub fn print_bc_stats(bc: &Bytecode) {
    println!("=== BYTECODE STATISTICS ===\n");
    println!("Bytes:      {}", bc.instructions.len());
    println!("Constants:  {}", bc.constants.len());
    println!();

    let counts = op_counts(&bc.instructions);
    let total: usize = counts.values().sum();

    println!("Op frequency:");
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));

    for (op, count) in sorted {
        let pct = (count as f64 / total as f64) * 100.0;
        println!("  {:<14} {:>4} ({:>5.1}%)", op, count, pct);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::op::make;
    use pretty_assertions::assert_eq;

    fn concat(parts: &[Vec<u8>]) -> Instructions {
        parts.iter().cloned().collect()
    }

    #[test]
    fn test_instructions_display() {
        let ins = concat(&[
            make(Opcode::Constant, &[1]),
            make(Opcode::Constant, &[2]),
            make(Opcode::Constant, &[65535]),
            make(Opcode::Add, &[]),
        ]);
        assert_eq!(
            ins.to_string(),
            "0000 OpConstant 1\n0003 OpConstant 2\n0006 OpConstant 65535\n0009 OpAdd\n"
        );
    }

    #[test]
    fn test_all_arithmetic_ops() {
        let ins = concat(&[
            make(Opcode::Sub, &[]),
            make(Opcode::Mul, &[]),
            make(Opcode::Div, &[]),
        ]);
        assert_eq!(ins.to_string(), "0000 OpSub\n0001 OpMul\n0002 OpDiv\n");
    }

    #[test]
    fn test_unknown_opcode_continues() {
        let ins = Instructions::from(vec![99, 1]);
        assert_eq!(ins.to_string(), "ERROR: unknown opcode 99\n0001 OpAdd\n");
    }

    #[test]
    fn test_truncated_operands_stop() {
        let ins = Instructions::from(vec![1, 0, 0xFF]);
        assert_eq!(
            ins.to_string(),
            "0000 OpAdd\nERROR: truncated operands for OpConstant\n"
        );
        let ins = Instructions::from(vec![0, 0]);
        assert_eq!(ins.to_string(), "ERROR: truncated operands for OpConstant\n");
    }

    #[test]
    fn test_empty_stream() {
        assert_eq!(Instructions::new().to_string(), "");
    }

    #[test]
    fn test_op_counts() {
        let ins = concat(&[
            make(Opcode::Constant, &[0]),
            make(Opcode::Constant, &[1]),
            make(Opcode::Add, &[]),
            make(Opcode::Constant, &[2]),
            make(Opcode::Mul, &[]),
        ]);
        let counts = op_counts(&ins);
        assert_eq!(counts.get("OpConstant"), Some(&3));
        assert_eq!(counts.get("OpAdd"), Some(&1));
        assert_eq!(counts.get("OpMul"), Some(&1));
        assert_eq!(counts.get("OpDiv"), None);
    }

    #[test]
    fn test_op_counts_skip_truncated_tail() {
        let mut ins = concat(&[make(Opcode::Constant, &[0]), make(Opcode::Add, &[])]);
        ins.0.extend_from_slice(&[Opcode::Constant as u8, 0x00]);

        let counts = op_counts(&ins);
        assert_eq!(counts.get("OpConstant"), Some(&1));
        assert_eq!(counts.get("OpAdd"), Some(&1));
        assert!(disassemble(&ins).ends_with("ERROR: truncated operands for OpConstant\n"));
    }
}
