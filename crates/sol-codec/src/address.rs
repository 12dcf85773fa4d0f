//! Addresses, blockhashes, and program-derived address (PDA) derivation.
//!
//! A Solana address is a raw 32-byte value, textually shown as Base58.
//! Regular account addresses are Ed25519 public keys; program-derived
//! addresses are SHA-256 outputs deliberately chosen to fall off the
//! Ed25519 curve so no private key can ever exist for them.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signature, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::error::SolError;

/// The string appended to PDA derivation input as a domain separator.
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// A 32-byte account or program identifier.
///
/// Equality, ordering, and hashing are all by raw byte content. The
/// ordering is the unsigned byte-lexicographic one the account compiler
/// relies on; replacing it with any text-based comparison breaks wire
/// compatibility.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 32]);

impl Address {
    pub const LENGTH: usize = 32;

    pub const fn new(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }

    /// Construct from a slice; fails unless it is exactly 32 bytes.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, SolError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SolError::Decode(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Address(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Verify an Ed25519 signature over `message` against this address.
    ///
    /// Returns `false` for bad signatures and for addresses that are not
    /// valid public keys (e.g. PDAs); never errors.
    pub fn verify(&self, signature: &[u8; 64], message: &[u8]) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        let signature = Signature::from_bytes(signature);
        key.verify_strict(message, &signature).is_ok()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolError::Decode(format!("base58 decode failed: {e}")))?;
        Address::try_from_slice(&bytes)
    }
}

/// A recent blockhash: 32 raw bytes, shown as Base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Blockhash([u8; 32]);

impl Blockhash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Blockhash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blockhash({self})")
    }
}

impl FromStr for Blockhash {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolError::Decode(format!("base58 decode failed: {e}")))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| SolError::Decode(format!("expected 32 bytes, got {}", v.len())))?;
        Ok(Blockhash(arr))
    }
}

// ---------------------------------------------------------------------------
// Well-known program ids
// ---------------------------------------------------------------------------

/// System Program: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM: Address = Address([0u8; 32]);

/// SPL Token Program: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM: Address = Address([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79,
    0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff,
    0x00, 0xa9,
]);

/// Token-2022 Program: `TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb`
pub const TOKEN_2022_PROGRAM: Address = Address([
    0x06, 0xdd, 0xf6, 0xe1, 0xee, 0x75, 0x8f, 0xde, 0x18, 0x42, 0x5d, 0xbc, 0xe4, 0x6c, 0xcd,
    0xda, 0xb6, 0x1a, 0xfc, 0x4d, 0x83, 0xb9, 0x0d, 0x27, 0xfe, 0xbd, 0xf9, 0x28, 0xd8, 0xa1,
    0x8b, 0xfc,
]);

/// Associated Token Account Program: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM: Address = Address([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
]);

/// Compute Budget Program: `ComputeBudget111111111111111111111111111111`
pub const COMPUTE_BUDGET_PROGRAM: Address = Address([
    0x03, 0x06, 0x46, 0x6f, 0xe5, 0x21, 0x17, 0x32, 0xff, 0xec, 0xad, 0xba, 0x72, 0xc3, 0x9b,
    0xe7, 0xbc, 0x8c, 0xe5, 0xbb, 0xc5, 0xf7, 0x12, 0x6b, 0x2c, 0x43, 0x9b, 0x3a, 0x40, 0x00,
    0x00, 0x00,
]);

/// Rent sysvar: `SysvarRent111111111111111111111111111111111`
pub const SYSVAR_RENT: Address = Address([
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x2c, 0x5c, 0x51, 0x21, 0x8c, 0xc9, 0x4c, 0x3d, 0x4a, 0xf1,
    0x7f, 0x58, 0xda, 0xee, 0x08, 0x9b, 0xa1, 0xfd, 0x44, 0xe3, 0xdb, 0xd9, 0x8a, 0x00, 0x00,
    0x00, 0x00,
]);

// ---------------------------------------------------------------------------
// Program-derived addresses
// ---------------------------------------------------------------------------

/// Find a valid program-derived address for the given seeds and program.
///
/// Tries bump seeds from 255 down to 0 and returns the first candidate
/// whose hash is not a valid Ed25519 curve point, together with the bump
/// that produced it. Deterministic: same seeds and program always yield
/// the same result.
pub fn find_program_address(
    seeds: &[&[u8]],
    program: &Address,
) -> Result<(Address, u8), SolError> {
    for bump in (0u8..=255).rev() {
        if let Some(address) = create_program_address(seeds, bump, program) {
            return Ok((address, bump));
        }
    }

    Err(SolError::NoValidAddressFound)
}

/// Derive the PDA for seeds + bump, or `None` if the candidate lands on
/// the curve and must be rejected.
pub fn create_program_address(seeds: &[&[u8]], bump: u8, program: &Address) -> Option<Address> {
    let mut hasher = Sha256::new();

    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.update(program.as_bytes());
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&hash) {
        return None;
    }

    Some(Address(hash))
}

/// Derive the associated token account address for a wallet + mint pair.
///
/// The seeds are `[owner, token_program, mint]`, derived under the
/// associated token program. Pass [`TOKEN_PROGRAM`] or
/// [`TOKEN_2022_PROGRAM`] depending on which program owns the mint.
pub fn derive_associated_token_address(
    owner: &Address,
    mint: &Address,
    token_program: &Address,
) -> Result<(Address, u8), SolError> {
    find_program_address(
        &[owner.as_bytes(), token_program.as_bytes(), mint.as_bytes()],
        &ASSOCIATED_TOKEN_PROGRAM,
    )
}

/// Check whether 32 bytes decompress to a valid Ed25519 curve point.
fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}
