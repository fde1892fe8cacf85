//! Opcode name constants and the "defined opcode" table used by EOF validation.
//!
//! The table is a 256-bit membership set rather than a full opcode info table (stack
//! inputs/outputs, gas, ...) because the EOF validator only ever asks one question of an
//! opcode: is it defined. See [`OpcodeSet`].

use bitvec::{bitarr, order::Lsb0, BitArr};

/// The `0x00` ("STOP") opcode.
pub const STOP: u8 = 0x00;
/// The `0x01` ("ADD") opcode.
pub const ADD: u8 = 0x01;
/// The `0x02` ("MUL") opcode.
pub const MUL: u8 = 0x02;
/// The `0x03` ("SUB") opcode.
pub const SUB: u8 = 0x03;
/// The `0x04` ("DIV") opcode.
pub const DIV: u8 = 0x04;
/// The `0x05` ("SDIV") opcode.
pub const SDIV: u8 = 0x05;
/// The `0x06` ("MOD") opcode.
pub const MOD: u8 = 0x06;
/// The `0x07` ("SMOD") opcode.
pub const SMOD: u8 = 0x07;
/// The `0x08` ("ADDMOD") opcode.
pub const ADDMOD: u8 = 0x08;
/// The `0x09` ("MULMOD") opcode.
pub const MULMOD: u8 = 0x09;
/// The `0x0A` ("EXP") opcode.
pub const EXP: u8 = 0x0A;
/// The `0x0B` ("SIGNEXTEND") opcode.
pub const SIGNEXTEND: u8 = 0x0B;
/// The `0x10` ("LT") opcode.
pub const LT: u8 = 0x10;
/// The `0x11` ("GT") opcode.
pub const GT: u8 = 0x11;
/// The `0x12` ("SLT") opcode.
pub const SLT: u8 = 0x12;
/// The `0x13` ("SGT") opcode.
pub const SGT: u8 = 0x13;
/// The `0x14` ("EQ") opcode.
pub const EQ: u8 = 0x14;
/// The `0x15` ("ISZERO") opcode.
pub const ISZERO: u8 = 0x15;
/// The `0x16` ("AND") opcode.
pub const AND: u8 = 0x16;
/// The `0x17` ("OR") opcode.
pub const OR: u8 = 0x17;
/// The `0x18` ("XOR") opcode.
pub const XOR: u8 = 0x18;
/// The `0x19` ("NOT") opcode.
pub const NOT: u8 = 0x19;
/// The `0x1A` ("BYTE") opcode.
pub const BYTE: u8 = 0x1A;
/// The `0x1B` ("SHL") opcode.
pub const SHL: u8 = 0x1B;
/// The `0x1C` ("SHR") opcode.
pub const SHR: u8 = 0x1C;
/// The `0x1D` ("SAR") opcode.
pub const SAR: u8 = 0x1D;
/// The `0x1E` ("CLZ") opcode.
pub const CLZ: u8 = 0x1E;
/// The `0x20` ("KECCAK256") opcode.
pub const KECCAK256: u8 = 0x20;
/// The `0x30` ("ADDRESS") opcode.
pub const ADDRESS: u8 = 0x30;
/// The `0x31` ("BALANCE") opcode.
pub const BALANCE: u8 = 0x31;
/// The `0x32` ("ORIGIN") opcode.
pub const ORIGIN: u8 = 0x32;
/// The `0x33` ("CALLER") opcode.
pub const CALLER: u8 = 0x33;
/// The `0x34` ("CALLVALUE") opcode.
pub const CALLVALUE: u8 = 0x34;
/// The `0x35` ("CALLDATALOAD") opcode.
pub const CALLDATALOAD: u8 = 0x35;
/// The `0x36` ("CALLDATASIZE") opcode.
pub const CALLDATASIZE: u8 = 0x36;
/// The `0x37` ("CALLDATACOPY") opcode.
pub const CALLDATACOPY: u8 = 0x37;
/// The `0x38` ("CODESIZE") opcode.
pub const CODESIZE: u8 = 0x38;
/// The `0x39` ("CODECOPY") opcode.
pub const CODECOPY: u8 = 0x39;
/// The `0x3A` ("GASPRICE") opcode.
pub const GASPRICE: u8 = 0x3A;
/// The `0x3B` ("EXTCODESIZE") opcode.
pub const EXTCODESIZE: u8 = 0x3B;
/// The `0x3C` ("EXTCODECOPY") opcode.
pub const EXTCODECOPY: u8 = 0x3C;
/// The `0x3D` ("RETURNDATASIZE") opcode.
pub const RETURNDATASIZE: u8 = 0x3D;
/// The `0x3E` ("RETURNDATACOPY") opcode.
pub const RETURNDATACOPY: u8 = 0x3E;
/// The `0x3F` ("EXTCODEHASH") opcode.
pub const EXTCODEHASH: u8 = 0x3F;
/// The `0x40` ("BLOCKHASH") opcode.
pub const BLOCKHASH: u8 = 0x40;
/// The `0x41` ("COINBASE") opcode.
pub const COINBASE: u8 = 0x41;
/// The `0x42` ("TIMESTAMP") opcode.
pub const TIMESTAMP: u8 = 0x42;
/// The `0x43` ("NUMBER") opcode.
pub const NUMBER: u8 = 0x43;
/// The `0x44` ("DIFFICULTY") opcode.
pub const DIFFICULTY: u8 = 0x44;
/// The `0x45` ("GASLIMIT") opcode.
pub const GASLIMIT: u8 = 0x45;
/// The `0x46` ("CHAINID") opcode.
pub const CHAINID: u8 = 0x46;
/// The `0x47` ("SELFBALANCE") opcode.
pub const SELFBALANCE: u8 = 0x47;
/// The `0x48` ("BASEFEE") opcode.
pub const BASEFEE: u8 = 0x48;
/// The `0x49` ("BLOBHASH") opcode.
pub const BLOBHASH: u8 = 0x49;
/// The `0x4A` ("BLOBBASEFEE") opcode.
pub const BLOBBASEFEE: u8 = 0x4A;
/// The `0x50` ("POP") opcode.
pub const POP: u8 = 0x50;
/// The `0x51` ("MLOAD") opcode.
pub const MLOAD: u8 = 0x51;
/// The `0x52` ("MSTORE") opcode.
pub const MSTORE: u8 = 0x52;
/// The `0x53` ("MSTORE8") opcode.
pub const MSTORE8: u8 = 0x53;
/// The `0x54` ("SLOAD") opcode.
pub const SLOAD: u8 = 0x54;
/// The `0x55` ("SSTORE") opcode.
pub const SSTORE: u8 = 0x55;
/// The `0x56` ("JUMP") opcode.
///
/// Still defined inside EOF code: invariant 6's fixed deltas do not touch it. EOF code never
/// contains a *dynamic* jump target in practice (static jumps use [`RJUMP`]/[`RJUMPI`] instead),
/// but this validator does not reject `JUMP` on that basis.
pub const JUMP: u8 = 0x56;
/// The `0x57` ("JUMPI") opcode.
///
/// Still defined inside EOF code, for the same reason as [`JUMP`].
pub const JUMPI: u8 = 0x57;
/// The `0x58` ("PC") opcode.
///
/// Disabled as an in-body EOF opcode (spec invariant 6): static jumps make the program counter
/// meaningless.
pub const PC: u8 = 0x58;
/// The `0x59` ("MSIZE") opcode.
pub const MSIZE: u8 = 0x59;
/// The `0x5A` ("GAS") opcode.
pub const GAS: u8 = 0x5A;
/// The `0x5B` ("JUMPDEST") opcode.
pub const JUMPDEST: u8 = 0x5B;
/// The `0x5C` ("RJUMP") opcode.
///
/// Unconditional static relative jump (EIP-4200). Reuses the legacy `TLOAD` byte value; the two
/// meanings never collide since EOF code is validated and executed under its own opcode table.
pub const RJUMP: u8 = 0x5C;
/// The `0x5D` ("RJUMPI") opcode.
///
/// Conditional static relative jump (EIP-4200). Reuses the legacy `TSTORE` byte value.
pub const RJUMPI: u8 = 0x5D;
/// The `0x5E` ("RJUMPV") opcode.
///
/// Static relative jump table (EIP-4200). Reuses the legacy `MCOPY` byte value.
pub const RJUMPV: u8 = 0x5E;
/// The `0x5F` ("PUSH0") opcode.
pub const PUSH0: u8 = 0x5F;
/// The `0x60` ("PUSH1") opcode.
pub const PUSH1: u8 = 0x60;
/// The `0x7F` ("PUSH32") opcode.
pub const PUSH32: u8 = 0x7F;
/// The `0x80` ("DUP1") opcode.
pub const DUP1: u8 = 0x80;
/// The `0x8F` ("DUP16") opcode.
pub const DUP16: u8 = 0x8F;
/// The `0x90` ("SWAP1") opcode.
pub const SWAP1: u8 = 0x90;
/// The `0x9F` ("SWAP16") opcode.
pub const SWAP16: u8 = 0x9F;
/// The `0xA0` ("LOG0") opcode.
pub const LOG0: u8 = 0xA0;
/// The `0xA4` ("LOG4") opcode.
pub const LOG4: u8 = 0xA4;
/// The `0xF0` ("CREATE") opcode.
pub const CREATE: u8 = 0xF0;
/// The `0xF1` ("CALL") opcode.
pub const CALL: u8 = 0xF1;
/// The `0xF2` ("CALLCODE") opcode.
///
/// Disabled as an in-body EOF opcode (spec invariant 6); not reachable via the legacy table
/// delta either, since it is only ever removed, never added back.
pub const CALLCODE: u8 = 0xF2;
/// The `0xF3` ("RETURN") opcode.
pub const RETURN: u8 = 0xF3;
/// The `0xF4` ("DELEGATECALL") opcode.
pub const DELEGATECALL: u8 = 0xF4;
/// The `0xF5` ("CREATE2") opcode.
pub const CREATE2: u8 = 0xF5;
/// The `0xFA` ("STATICCALL") opcode.
pub const STATICCALL: u8 = 0xFA;
/// The `0xFD` ("REVERT") opcode.
pub const REVERT: u8 = 0xFD;
/// The `0xFE` ("INVALID") opcode.
///
/// Always defined inside EOF (spec invariant 6), regardless of what the hardfork table says.
pub const INVALID: u8 = 0xFE;
/// The `0xFF` ("SELFDESTRUCT") opcode.
///
/// Disabled as an in-body EOF opcode, but still the only legal terminator byte that can
/// follow it (the terminator asymmetry, spec invariant 9).
pub const SELFDESTRUCT: u8 = 0xFF;

/// Returns `true` if `op` is one of `PUSH1..=PUSH32`.
///
/// `PUSH0` is intentionally excluded: it takes no immediate and is not part of this family.
#[inline]
pub const fn is_push(op: u8) -> bool {
    op >= PUSH1 && op <= PUSH32
}

/// Number of immediate operand bytes for a `PUSH1..=PUSH32` opcode.
#[inline]
pub const fn push_immediate_size(op: u8) -> u8 {
    op - PUSH1 + 1
}

/// Opcodes that legally terminate an EOF code section (spec invariant 9).
///
/// `SELFDESTRUCT` is deliberately included here even though [`OpcodeSet::with_eof_deltas`]
/// removes it as an in-body opcode: the EIP-3670 removal was staged so that the byte remains
/// legal only in the terminating position.
pub const fn is_terminating(op: u8) -> bool {
    matches!(op, STOP | RETURN | REVERT | INVALID | SELFDESTRUCT)
}

/// A 256-bit membership set over opcode byte values.
///
/// Backed by a fixed-size [`bitvec`] array so that membership tests are branch-free and the
/// set itself never allocates. This is the concrete representation for the `opcode_defined`
/// collaborator described in the EOF validator's external interface.
#[derive(Clone, PartialEq, Eq)]
pub struct OpcodeSet {
    bits: BitArr!(for 256, in u8, Lsb0),
}

impl OpcodeSet {
    /// Builds a set from a membership predicate, e.g. a hardfork's opcode table.
    pub fn from_fn(mut opcode_defined: impl FnMut(u8) -> bool) -> Self {
        let mut bits = bitarr![u8, Lsb0; 0; 256];
        for op in 0..=u8::MAX {
            bits.set(op as usize, opcode_defined(op));
            if op == u8::MAX {
                break;
            }
        }
        Self { bits }
    }

    /// Returns `true` if `op` is a member of this set.
    #[inline]
    pub fn contains(&self, op: u8) -> bool {
        self.bits[op as usize]
    }

    /// Returns a copy of `self` with `op` forced to `defined`.
    #[must_use]
    pub fn with(mut self, op: u8, defined: bool) -> Self {
        self.bits.set(op as usize, defined);
        self
    }

    /// The set of opcodes defined by a representative recent hardfork (through Cancun's
    /// `TLOAD`/`TSTORE`/`MCOPY` and `PUSH0`), used as the default `opcode_defined` table when
    /// callers do not supply their own.
    pub fn legacy_defined() -> Self {
        const DEFINED: &[u8] = &[
            STOP, ADD, MUL, SUB, DIV, SDIV, MOD, SMOD, ADDMOD, MULMOD, EXP, SIGNEXTEND, LT, GT,
            SLT, SGT, EQ, ISZERO, AND, OR, XOR, NOT, BYTE, SHL, SHR, SAR, CLZ, KECCAK256, ADDRESS,
            BALANCE, ORIGIN, CALLER, CALLVALUE, CALLDATALOAD, CALLDATASIZE, CALLDATACOPY,
            CODESIZE, CODECOPY, GASPRICE, EXTCODESIZE, EXTCODECOPY, RETURNDATASIZE,
            RETURNDATACOPY, EXTCODEHASH, BLOCKHASH, COINBASE, TIMESTAMP, NUMBER, DIFFICULTY,
            GASLIMIT, CHAINID, SELFBALANCE, BASEFEE, BLOBHASH, BLOBBASEFEE, POP, MLOAD, MSTORE,
            MSTORE8, SLOAD, SSTORE, JUMP, JUMPI, PC, MSIZE, GAS, JUMPDEST, RJUMP, RJUMPI, RJUMPV,
            PUSH0, CREATE, CALL, CALLCODE, RETURN, DELEGATECALL, CREATE2, STATICCALL, REVERT,
            SELFDESTRUCT,
        ];
        let mut bits = bitarr![u8, Lsb0; 0; 256];
        for &op in DEFINED {
            bits.set(op as usize, true);
        }
        for op in PUSH1..=PUSH32 {
            bits.set(op as usize, true);
        }
        for op in DUP1..=DUP16 {
            bits.set(op as usize, true);
        }
        for op in SWAP1..=SWAP16 {
            bits.set(op as usize, true);
        }
        for op in LOG0..=LOG4 {
            bits.set(op as usize, true);
        }
        Self { bits }
    }

    /// Applies the fixed EOF deltas from spec invariant 6: adds `INVALID`, removes `PC`,
    /// `SELFDESTRUCT` and `CALLCODE`.
    #[must_use]
    pub fn with_eof_deltas(self) -> Self {
        self.with(INVALID, true)
            .with(PC, false)
            .with(SELFDESTRUCT, false)
            .with(CALLCODE, false)
    }
}

impl core::fmt::Debug for OpcodeSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OpcodeSet")
            .field("defined_count", &self.bits.count_ones())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_defined_excludes_gaps() {
        let set = OpcodeSet::legacy_defined();
        assert!(set.contains(STOP));
        assert!(set.contains(PUSH1));
        assert!(set.contains(RJUMP));
        assert!(!set.contains(0x0C));
        assert!(!set.contains(0x21));
        assert!(!set.contains(0xA5));
        assert!(!set.contains(0xFB));
    }

    #[test]
    fn eof_deltas_add_and_remove() {
        let set = OpcodeSet::legacy_defined().with_eof_deltas();
        assert!(set.contains(INVALID));
        assert!(!set.contains(PC));
        assert!(!set.contains(SELFDESTRUCT));
        assert!(!set.contains(CALLCODE));
        // Untouched opcodes keep their legacy membership.
        assert!(set.contains(ADD));
    }

    #[test]
    fn push_helpers() {
        assert!(is_push(PUSH1));
        assert!(is_push(PUSH32));
        assert!(!is_push(PUSH0));
        assert_eq!(push_immediate_size(PUSH1), 1);
        assert_eq!(push_immediate_size(PUSH32), 32);
    }
}
