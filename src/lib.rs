//! EVM Object Format (EOF) v1 bytecode validator.
//!
//! Given a candidate contract code byte sequence, [`eof::validate_code`] returns whether it is
//! acceptable: legacy bytecode (anything not starting with the EOF magic) always passes, while
//! EOF-prefixed bytecode is fully parsed and checked against the EOF1 header grammar, type
//! section bounds, and opcode-pass rules.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc as std;

pub mod eof;
pub mod opcode;
pub mod utils;

/// Re-export of the `bitvec` crate, used for the opcode membership set and the per-section
/// immediate bitmap.
pub use bitvec;
pub use eof::{
    get_eof_version,
    is_eof_code,
    validate_code,
    validate_code_inner,
    EofDecodeError,
    EofError,
    EofValidationError,
    EOF_MAGIC,
    EOF_MAGIC_BYTES,
};
pub use opcode::OpcodeSet;
