//! Client-side codec and transaction compiler for the Solana wire format.
//!
//! This crate builds, canonicalizes, serializes, parses, signs and
//! fee-estimates transactions in the exact binary layout validators
//! consume — all without pulling in `solana-sdk` (which drags in tokio
//! and 200+ transitive dependencies). The format is consensus-critical:
//! a wrong account ordering, privilege flag, length prefix or signature
//! slot produces a transaction the network rejects or, worse, one that
//! means something else.
//!
//! Everything here is pure, synchronous, deterministic logic over
//! immutable inputs. Network transport and key storage live elsewhere:
//! the crate hands out serialized byte buffers and accepts raw
//! base64/bytes back, and signing goes through the [`Signer`] capability
//! trait.

pub mod address;
pub mod compact;
pub mod compiler;
pub mod compute_budget;
pub mod convert;
pub mod error;
pub mod instruction;
pub mod message;
pub mod signer;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use address::{
    derive_associated_token_address, find_program_address, Address, Blockhash,
    ASSOCIATED_TOKEN_PROGRAM, COMPUTE_BUDGET_PROGRAM, SYSTEM_PROGRAM, SYSVAR_RENT,
    TOKEN_2022_PROGRAM, TOKEN_PROGRAM,
};
pub use compiler::AddressLookupTableAccount;
pub use error::SolError;
pub use instruction::{AccountMeta, Instruction};
pub use message::{
    CompiledAddressLookupTable, CompiledInstruction, Message, MessageHeader, MessageVersion,
};
pub use signer::Signer;
pub use transaction::{LegacyTransaction, VersionedTransaction, SIGNATURE_LENGTH};
