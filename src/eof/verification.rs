//! Body layout and opcode-pass validation for EOF1 containers.

use crate::{
    eof::{CodeInfo, EofHeader},
    opcode::{self, OpcodeSet},
    utils::read_i16,
};
use bitvec::{bitvec, order::Lsb0, vec::BitVec};
use core::fmt;
use std::vec::Vec;

/// Validates the body of an EOF1 container against its already-decoded header.
///
/// `body` is everything after the header: the type section, the concatenated code sections, and
/// the data section, in that order. `opcodes` is the allowed-opcode set with the EOF deltas
/// already applied.
pub fn validate_body(
    header: &EofHeader,
    body: &[u8],
    opcodes: &OpcodeSet,
) -> Result<(), EofValidationError> {
    if body.len() != header.body_size() {
        return Err(EofValidationError::LengthMismatch);
    }

    let type_section = &body[..header.types_size as usize];
    for chunk in type_section.chunks_exact(4) {
        let entry = CodeInfo::new(chunk[0], chunk[1], u16::from_be_bytes([chunk[2], chunk[3]]));
        entry
            .validate()
            .map_err(|_| EofValidationError::BadTypeEntry)?;
    }

    let mut offset = header.types_size as usize;
    for &size in &header.code_sizes {
        let size = size as usize;
        let section = &body[offset..offset + size];
        validate_code_section(section, opcodes)?;
        offset += size;
    }

    // Remainder must be exactly the declared data section; no further checks apply to it.
    debug_assert_eq!(body.len() - offset, header.data_size as usize);

    Ok(())
}

/// Validates one code section in isolation: opcode legality, immediate skipping, relative-jump
/// bounds, per-section termination, and the immediate/jump-target cross-check.
///
/// Each code section is walked independently from its own local offset 0, rather than as part of
/// a container-wide concatenated stream: a jump may not cross into a different code section.
fn validate_code_section(code: &[u8], opcodes: &OpcodeSet) -> Result<(), EofValidationError> {
    if code.is_empty() {
        return Err(EofValidationError::BadTerminatorOpcode);
    }

    let mut immediates: BitVec<u8, Lsb0> = bitvec![u8, Lsb0; 0; code.len()];
    let mut jump_targets: Vec<usize> = Vec::new();

    let mut p = 0usize;
    while p < code.len() {
        let op = code[p];
        let is_last_byte = p == code.len() - 1;
        // SELFDESTRUCT is excluded from the in-body allowed set but is still legal as the single
        // terminating byte (spec invariant 9's terminator asymmetry).
        let legal_here = opcodes.contains(op) || (op == opcode::SELFDESTRUCT && is_last_byte);
        if !legal_here {
            return Err(EofValidationError::UndefinedOpcode);
        }
        p += 1;

        if opcode::is_push(op) {
            let operand_len = opcode::push_immediate_size(op) as usize;
            if p + operand_len > code.len() {
                return Err(EofValidationError::ImmediateOverrun);
            }
            for i in p..p + operand_len {
                immediates.set(i, true);
            }
            p += operand_len;
            continue;
        }

        match op {
            opcode::RJUMP | opcode::RJUMPI => {
                if p + 2 > code.len() {
                    return Err(EofValidationError::ImmediateOverrun);
                }
                immediates.set(p, true);
                immediates.set(p + 1, true);
                let offset = read_i16(code, p) as isize;
                let target = offset + (p as isize) + 2;
                if target < 0 || target >= code.len() as isize {
                    return Err(EofValidationError::JumpOutOfBounds);
                }
                jump_targets.push(target as usize);
                p += 2;
            }
            opcode::RJUMPV => {
                if p >= code.len() {
                    return Err(EofValidationError::ImmediateOverrun);
                }
                let table_size = code[p] as usize;
                if table_size == 0 {
                    return Err(EofValidationError::EmptyJumpTable);
                }
                let table_bytes = table_size * 2;
                if p + 1 + table_bytes > code.len() {
                    return Err(EofValidationError::ImmediateOverrun);
                }
                immediates.set(p, true);
                for i in p + 1..p + 1 + table_bytes {
                    immediates.set(i, true);
                }
                let base = p + 1 + table_bytes;
                for entry in 0..table_size {
                    let entry_offset = p + 1 + entry * 2;
                    let offset = read_i16(code, entry_offset) as isize;
                    let target = offset + base as isize;
                    if target < 0 || target >= code.len() as isize {
                        return Err(EofValidationError::JumpOutOfBounds);
                    }
                    jump_targets.push(target as usize);
                }
                p = base;
            }
            _ => {}
        }
    }

    if !opcode::is_terminating(code[code.len() - 1]) {
        return Err(EofValidationError::BadTerminatorOpcode);
    }

    for target in jump_targets {
        if immediates[target] {
            return Err(EofValidationError::JumpIntoImmediate);
        }
    }

    Ok(())
}

/// Rejection reasons for EOF1 body/opcode validation.
///
/// Legacy passthrough and header-level rejections are not represented here; see
/// [`crate::eof::EofDecodeError`] for header- and type-section-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EofValidationError {
    /// Declared body size does not match the actual remainder after the header.
    LengthMismatch,
    /// A type entry's inputs/outputs/max_stack is out of bounds.
    BadTypeEntry,
    /// Opcode byte is not a member of the allowed set.
    UndefinedOpcode,
    /// A PUSH or jump immediate extends past the code section's end.
    ImmediateOverrun,
    /// An RJUMPV table declared zero entries.
    EmptyJumpTable,
    /// Computed jump target falls outside the code section.
    JumpOutOfBounds,
    /// Computed jump target lands on an immediate byte.
    JumpIntoImmediate,
    /// Code section's final byte is not a terminating opcode.
    BadTerminatorOpcode,
}

impl fmt::Display for EofValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LengthMismatch => "declared body size does not match actual length",
            Self::BadTypeEntry => "type entry inputs, outputs, or max_stack out of bounds",
            Self::UndefinedOpcode => "opcode is not defined",
            Self::ImmediateOverrun => "immediate operand extends past code section end",
            Self::EmptyJumpTable => "RJUMPV table has zero entries",
            Self::JumpOutOfBounds => "jump target is outside the code section",
            Self::JumpIntoImmediate => "jump target lands on an immediate byte",
            Self::BadTerminatorOpcode => "code section does not end on a terminating opcode",
        };
        f.write_str(s)
    }
}

impl core::error::Error for EofValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn opcodes() -> OpcodeSet {
        OpcodeSet::legacy_defined().with_eof_deltas()
    }

    fn header(types_size: u16, code_sizes: Vec<u16>, data_size: u16) -> EofHeader {
        let sum_code_sizes = code_sizes.iter().map(|&s| s as usize).sum();
        EofHeader {
            types_size,
            code_sizes,
            data_size,
            sum_code_sizes,
        }
    }

    #[test]
    fn minimal_body_accepts() {
        let h = header(4, Vec::from([1u16]), 0);
        let mut body = Vec::from([0u8, 0, 0, 0]); // one type entry
        body.push(opcode::STOP);
        assert_eq!(validate_body(&h, &body, &opcodes()), Ok(()));
    }

    #[test]
    fn length_mismatch_rejected() {
        let h = header(4, Vec::from([1u16]), 0);
        let body = Vec::from([0u8, 0, 0, 0, 0, 0]); // two trailing bytes too many
        assert_eq!(
            validate_body(&h, &body, &opcodes()),
            Err(EofValidationError::LengthMismatch)
        );
    }

    #[test]
    fn push_overrun_rejected() {
        let h = header(4, Vec::from([1u16]), 0);
        let mut body = Vec::from([0u8, 0, 0, 0]);
        body.push(opcode::PUSH1); // no operand byte, no terminator
        assert_eq!(
            validate_body(&h, &body, &opcodes()),
            Err(EofValidationError::ImmediateOverrun)
        );
    }

    #[test]
    fn rjump_into_immediate_rejected() {
        let h = header(4, Vec::from([6u16]), 0);
        let mut body = Vec::from([0u8, 0, 0, 0]);
        // PUSH1 0x00, RJUMP -2 (lands on its own second offset byte), INVALID, STOP
        body.extend_from_slice(&[opcode::PUSH1, 0x00, opcode::RJUMP, 0xFF, 0xFE, opcode::STOP]);
        assert_eq!(
            validate_body(&h, &body, &opcodes()),
            Err(EofValidationError::JumpIntoImmediate)
        );
    }

    #[test]
    fn undefined_opcode_rejected() {
        let h = header(4, Vec::from([1u16]), 0);
        let mut body = Vec::from([0u8, 0, 0, 0]);
        body.push(0x0C); // gap in the opcode table
        assert_eq!(
            validate_body(&h, &body, &opcodes()),
            Err(EofValidationError::UndefinedOpcode)
        );
    }

    #[test]
    fn selfdestruct_allowed_only_as_terminator() {
        let h = header(4, Vec::from([1u16]), 0);
        let mut body = Vec::from([0u8, 0, 0, 0]);
        body.push(opcode::SELFDESTRUCT);
        assert_eq!(validate_body(&h, &body, &opcodes()), Ok(()));

        let h2 = header(4, Vec::from([2u16]), 0);
        let mut body2 = Vec::from([0u8, 0, 0, 0]);
        body2.extend_from_slice(&[opcode::SELFDESTRUCT, opcode::STOP]);
        assert_eq!(
            validate_body(&h2, &body2, &opcodes()),
            Err(EofValidationError::UndefinedOpcode)
        );
    }

    #[test]
    fn rjump_cannot_cross_section_boundary() {
        // Two code sections, each 4 bytes. RJUMP in section 0 that would need to reach into
        // section 1 is out of bounds for section 0 alone.
        let h = header(4, Vec::from([4u16, 1u16]), 0);
        let mut body = Vec::from([0u8, 0, 0, 0]);
        body.extend_from_slice(&[opcode::RJUMP, 0x00, 0x05, opcode::STOP]);
        body.push(opcode::STOP);
        assert_eq!(
            validate_body(&h, &body, &opcodes()),
            Err(EofValidationError::JumpOutOfBounds)
        );
    }
}
