//! EVM Object Format (EOF) v1 container validation.
//!
//! `validate_code` is the primary entry point: it accepts any byte sequence, treating anything
//! that does not start with the EOF magic as ordinary legacy code (always accepted), and running
//! the full EOF1 header, type-section, and opcode-pass validation otherwise.
pub mod code_info;
pub(crate) mod decode_helpers;
pub mod header;
pub mod verification;

pub use code_info::CodeInfo;
pub use header::{EofHeader, KIND_CODE, KIND_DATA, KIND_TERMINAL, KIND_TYPE, MAX_CODE_SECTIONS};
pub use verification::{validate_body, EofValidationError};

use crate::opcode::OpcodeSet;
use core::fmt;

/// EOF magic number, as a `u16`.
pub const EOF_MAGIC: u16 = 0xEF00;

/// EOF magic bytes.
pub const EOF_MAGIC_BYTES: [u8; 2] = [0xEF, 0x00];

/// The only EOF version this validator understands.
pub const VERSION_1: u8 = 0x01;

/// Maximum stack height a code section may declare (spec invariant 4).
pub const MAX_STACK_HEIGHT: usize = 1023;

/// Returns `true` if `code` begins with the EOF magic bytes `EF 00`.
///
/// This is a magic-only check; it says nothing about whether `code` is a well-formed EOF
/// container.
#[inline]
pub fn is_eof_code(code: &[u8]) -> bool {
    code.len() >= 2 && code[0] == EOF_MAGIC_BYTES[0] && code[1] == EOF_MAGIC_BYTES[1]
}

/// Returns the EOF version byte, or `0` if `code` does not start with the EOF magic.
///
/// Meaningful only when `code.len() >= 3`; shorter EOF-prefixed inputs are rejected by
/// [`validate_code`] regardless of what this probe returns.
#[inline]
pub fn get_eof_version(code: &[u8]) -> u8 {
    if !is_eof_code(code) {
        return 0;
    }
    code.get(2).copied().unwrap_or(0)
}

/// Validates `code` as either legacy bytecode (always accepted) or an EOF1 container.
///
/// `opcode_defined` reports which of the 256 opcode values are defined by the active hardfork;
/// the validator applies the fixed EOF deltas (`+INVALID`, `-PC`, `-SELFDESTRUCT`, `-CALLCODE`)
/// on top of it before checking opcode legality.
pub fn validate_code(code: &[u8], opcode_defined: impl FnMut(u8) -> bool) -> bool {
    validate_code_inner(code, opcode_defined).is_ok()
}

/// Like [`validate_code`] but returns the specific rejection reason instead of a boolean.
pub fn validate_code_inner(
    code: &[u8],
    opcode_defined: impl FnMut(u8) -> bool,
) -> Result<(), EofError> {
    if !is_eof_code(code) {
        // Legacy passthrough: this validator has no opinion on non-EOF code.
        return Ok(());
    }

    let (header, body) = EofHeader::decode(code)?;
    let opcodes = OpcodeSet::from_fn(opcode_defined).with_eof_deltas();
    validate_body(&header, body, &opcodes)?;
    Ok(())
}

/// Errors produced while decoding or validating an EOF1 container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EofDecodeError {
    /// Input ended before a required field could be read.
    MissingInput,
    /// The first two bytes are not the EOF magic `EF 00`.
    InvalidEOFMagicNumber,
    /// Magic bytes are present but the version byte is not `0x01`.
    InvalidEOFVersion,
    /// Byte at the mandated types-kind position is not `KIND_TYPE`.
    InvalidTypesKind,
    /// `type_section_size` is zero or not a multiple of [`code_info`]'s entry size.
    InvalidCodeInfo,
    /// Byte at the mandated code-kind position is not `KIND_CODE`.
    InvalidCodeKind,
    /// `num_code_sections` is zero.
    ZeroCodeSections,
    /// `num_code_sections` exceeds [`MAX_CODE_SECTIONS`].
    TooManyCodeSections,
    /// A declared code section size is zero.
    ZeroSize,
    /// Not enough input remained to read all declared code section sizes.
    ShortInputForSizes,
    /// Code section count does not match `type_section_size / 4`.
    MismatchCodeAndInfoSize,
    /// Byte at the mandated kind position after the code sizes is not `KIND_DATA`.
    InvalidKindAfterCode {
        /// The unexpected byte found in its place.
        invalid_kind: u8,
    },
    /// Byte at the mandated header-terminator position is not `0x00`.
    InvalidTerminalByte,
    /// A type entry's `inputs`, `outputs`, or `max_stack` is out of bounds.
    InvalidCodeInfoInputValue {
        /// The offending value.
        value: u8,
    },
    /// A type entry's `outputs` is out of bounds.
    InvalidCodeInfoOutputValue {
        /// The offending value.
        value: u8,
    },
    /// A type entry's `max_stack` exceeds [`MAX_STACK_HEIGHT`].
    InvalidCodeInfoMaxStackValue {
        /// The offending value.
        value: u16,
    },
}

impl fmt::Display for EofDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput => f.write_str("input ended before a required field"),
            Self::InvalidEOFMagicNumber => f.write_str("missing EOF magic bytes"),
            Self::InvalidEOFVersion => f.write_str("unsupported EOF version"),
            Self::InvalidTypesKind => f.write_str("expected KIND_TYPE marker"),
            Self::InvalidCodeInfo => f.write_str("invalid type section size"),
            Self::InvalidCodeKind => f.write_str("expected KIND_CODE marker"),
            Self::ZeroCodeSections => f.write_str("num_code_sections is zero"),
            Self::TooManyCodeSections => f.write_str("num_code_sections exceeds the maximum"),
            Self::ZeroSize => f.write_str("a declared section size is zero"),
            Self::ShortInputForSizes => f.write_str("input too short for declared code sizes"),
            Self::MismatchCodeAndInfoSize => {
                f.write_str("code section count does not match type section size")
            }
            Self::InvalidKindAfterCode { invalid_kind } => {
                write!(f, "expected KIND_DATA marker, found {invalid_kind:#04x}")
            }
            Self::InvalidTerminalByte => f.write_str("expected header terminator byte"),
            Self::InvalidCodeInfoInputValue { value } => {
                write!(f, "type entry inputs out of bounds: {value:#04x}")
            }
            Self::InvalidCodeInfoOutputValue { value } => {
                write!(f, "type entry outputs out of bounds: {value:#04x}")
            }
            Self::InvalidCodeInfoMaxStackValue { value } => {
                write!(f, "type entry max_stack out of bounds: {value:#06x}")
            }
        }
    }
}

impl core::error::Error for EofDecodeError {}

/// Combined decode/validation error for [`validate_code_inner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EofError {
    /// Header or type-section decode failure.
    Decode(EofDecodeError),
    /// Body/opcode-pass validation failure.
    Validation(EofValidationError),
}

impl From<EofDecodeError> for EofError {
    fn from(err: EofDecodeError) -> Self {
        EofError::Decode(err)
    }
}

impl From<EofValidationError> for EofError {
    fn from(err: EofValidationError) -> Self {
        EofError::Validation(err)
    }
}

impl fmt::Display for EofError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EofError::Decode(e) => write!(f, "EOF decode error: {e}"),
            EofError::Validation(e) => write!(f, "EOF validation error: {e}"),
        }
    }
}

impl core::error::Error for EofError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode;

    fn all_defined(_: u8) -> bool {
        true
    }

    #[test]
    fn magic_and_version_probe() {
        assert!(is_eof_code(&[0xEF, 0x00, 0x01]));
        assert!(!is_eof_code(&[0xEF, 0x01]));
        assert!(!is_eof_code(&[0xEF]));
        assert_eq!(get_eof_version(&[0xEF, 0x00, 0x01]), 1);
        assert_eq!(get_eof_version(&[0x60, 0x00]), 0);
    }

    #[test]
    fn legacy_code_passes_through() {
        let code = [0x60, 0x00, 0x60, 0x00, 0xF3];
        assert!(validate_code(&code, all_defined));
    }

    /// Header (13B) + one type entry (4B) + one code section holding `STOP` (1B) + empty data.
    fn minimal_eof1() -> Vec<u8> {
        let mut code = Vec::new();
        code.extend_from_slice(&[0xEF, 0x00, VERSION_1]);
        code.push(KIND_TYPE);
        code.extend_from_slice(&4u16.to_be_bytes());
        code.push(KIND_CODE);
        code.extend_from_slice(&1u16.to_be_bytes()); // num_code_sections
        code.extend_from_slice(&1u16.to_be_bytes()); // code_sizes[0]
        code.push(KIND_DATA);
        code.extend_from_slice(&0u16.to_be_bytes());
        code.push(KIND_TERMINAL);
        code.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // type entry: 0 in, 0 out, 0 stack
        code.push(0x00); // STOP
        code
    }

    #[test]
    fn minimum_accepted_eof1() {
        assert!(validate_code(&minimal_eof1(), all_defined));
    }

    #[test]
    fn wrong_version_rejected() {
        let mut code = minimal_eof1();
        code[2] = 0x02;
        assert!(!validate_code(&code, all_defined));
    }

    #[test]
    fn zero_code_sections_rejected() {
        let code = hex::decode("ef00010100000200000300000000").unwrap();
        assert!(!validate_code(&code, all_defined));
    }

    #[test]
    fn push_overrun_rejected() {
        let mut code = minimal_eof1();
        // Overwrite header to declare a 1-byte code section containing a bare PUSH1 (no operand).
        let len = code.len();
        code[len - 1] = opcode::PUSH1;
        assert!(!validate_code(&code, all_defined));
    }
}
