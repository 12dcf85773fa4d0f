//! Signed transactions in both wire formats.
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes each
//!   message                 (see message module)
//! ```
//!
//! [`LegacyTransaction`] trusts caller ordering: signatures are appended
//! in the order `sign` is called. [`VersionedTransaction`] instead keeps a
//! fixed slot per required signer and places each signature into the slot
//! whose account verifies it, so multiple parties may sign in any order.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};

use crate::address::{Address, Blockhash, COMPUTE_BUDGET_PROGRAM};
use crate::compact::{decode_length, encode_length};
use crate::compute_budget::compute_budget_fee;
use crate::error::SolError;
use crate::instruction::Instruction;
use crate::message::{Message, MessageVersion};
use crate::signer::Signer;

pub const SIGNATURE_LENGTH: usize = 64;

/// A pre-versioning transaction: a legacy message plus signatures in call
/// order.
#[derive(Debug, Clone)]
pub struct LegacyTransaction {
    pub message: Message,
    signatures: Vec<[u8; 64]>,
}

impl LegacyTransaction {
    /// Compile a legacy transaction from instructions. The message is
    /// fixed from here on; only signatures accumulate.
    pub fn new(
        fee_payer: &Address,
        recent_blockhash: Blockhash,
        instructions: &[Instruction],
    ) -> Self {
        LegacyTransaction {
            message: Message::new_legacy(fee_payer, recent_blockhash, instructions),
            signatures: Vec::new(),
        }
    }

    /// Sign the message and append the signature. Callers must sign in
    /// account-table order; the legacy format has no way to reorder.
    pub fn sign(&mut self, signer: &impl Signer) {
        let data = self.message.serialize();
        self.signatures.push(signer.sign(&data));
    }

    /// Append an externally produced signature.
    pub fn add_signature(&mut self, signature: [u8; 64]) {
        self.signatures.push(signature);
    }

    pub fn signatures(&self) -> &[[u8; 64]] {
        &self.signatures
    }

    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let required = self.message.header.num_required_signatures as usize;
        if self.signatures.len() != required {
            return Err(SolError::IncompleteSignatures {
                filled: self.signatures.len(),
                required,
            });
        }

        Ok(assemble(&self.signatures, &self.message.serialize()))
    }

    pub fn to_base64(&self) -> Result<String, SolError> {
        Ok(BASE64_STANDARD.encode(self.serialize()?))
    }

    pub fn from_base64(encoded: &str) -> Result<Self, SolError> {
        let bytes = BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| SolError::Decode(format!("base64 decode failed: {e}")))?;
        Self::deserialize(&bytes)
    }

    /// Parse a serialized legacy transaction. All-zero signatures are
    /// placeholders for parties that have not signed yet and are dropped.
    pub fn deserialize(data: &[u8]) -> Result<Self, SolError> {
        let (declared, signatures, message_bytes) = split_signatures(data)?;

        let message = Message::deserialize(message_bytes)?;
        if message.version != MessageVersion::Legacy {
            return Err(SolError::Decode(
                "legacy transaction carries a versioned message".into(),
            ));
        }
        check_counts(declared, &message)?;

        Ok(LegacyTransaction {
            message,
            signatures: signatures
                .into_iter()
                .filter(|s| s.iter().any(|&b| b != 0))
                .collect(),
        })
    }

    /// Total fee in lamports: per-signature base fee plus the declared
    /// priority fee (see [`calculate_fee`](VersionedTransaction::calculate_fee)).
    pub fn calculate_fee(&self, lamports_per_signature: u64) -> u64 {
        fee_for(&self.message, self.signatures.len(), lamports_per_signature)
    }
}

/// A versioned transaction: a message plus one signature slot per
/// required signer, addressed by account rather than by position.
#[derive(Debug, Clone)]
pub struct VersionedTransaction {
    pub message: Message,
    signatures: Vec<Option<[u8; 64]>>,
}

impl VersionedTransaction {
    pub fn new(message: Message) -> Self {
        let slots = message.header.num_required_signatures as usize;
        VersionedTransaction {
            message,
            signatures: vec![None; slots],
        }
    }

    /// Sign the message and place the signature into the matching slot.
    /// Returns `false` if the signer is not one of the required signers.
    pub fn sign(&mut self, signer: &impl Signer) -> bool {
        let data = self.message.serialize();
        let signature = signer.sign(&data);
        self.place(signature, &data)
    }

    /// Place an already-computed signature (e.g. from a remote co-signer)
    /// into the slot whose account verifies it. Returns `false` when no
    /// required signer matches.
    pub fn place_signature(&mut self, signature: [u8; 64]) -> bool {
        let data = self.message.serialize();
        self.place(signature, &data)
    }

    fn place(&mut self, signature: [u8; 64], data: &[u8]) -> bool {
        let required = self.signatures.len().min(self.message.accounts.len());
        for i in 0..required {
            if self.message.accounts[i].verify(&signature, data) {
                self.signatures[i] = Some(signature);
                return true;
            }
        }
        false
    }

    pub fn is_complete(&self) -> bool {
        self.signatures.iter().all(Option::is_some)
    }

    pub fn signatures(&self) -> &[Option<[u8; 64]>] {
        &self.signatures
    }

    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let filled: Vec<[u8; 64]> = self.signatures.iter().flatten().copied().collect();
        if filled.len() != self.signatures.len() {
            return Err(SolError::IncompleteSignatures {
                filled: filled.len(),
                required: self.signatures.len(),
            });
        }

        Ok(assemble(&filled, &self.message.serialize()))
    }

    pub fn to_base64(&self) -> Result<String, SolError> {
        Ok(BASE64_STANDARD.encode(self.serialize()?))
    }

    pub fn from_base64(encoded: &str) -> Result<Self, SolError> {
        let bytes = BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| SolError::Decode(format!("base64 decode failed: {e}")))?;
        Self::deserialize(&bytes)
    }

    /// Parse a serialized transaction, legacy or V0. Declared signatures
    /// fill their slots verbatim, zeros included: a zeroed slot in an
    /// exchanged partially-signed transaction is still a slot.
    pub fn deserialize(data: &[u8]) -> Result<Self, SolError> {
        let (declared, signatures, message_bytes) = split_signatures(data)?;

        let message = Message::deserialize(message_bytes)?;
        check_counts(declared, &message)?;

        let mut slots = vec![None; message.header.num_required_signatures as usize];
        for (slot, signature) in slots.iter_mut().zip(signatures) {
            *slot = Some(signature);
        }

        Ok(VersionedTransaction {
            message,
            signatures: slots,
        })
    }

    /// Total fee in lamports: `lamports_per_signature` for each filled
    /// slot (at least one), plus the priority fee declared by the
    /// message's compute-budget instruction pair, if any.
    pub fn calculate_fee(&self, lamports_per_signature: u64) -> u64 {
        let filled = self.signatures.iter().flatten().count();
        fee_for(&self.message, filled, lamports_per_signature)
    }
}

fn assemble(signatures: &[[u8; 64]], message: &[u8]) -> Vec<u8> {
    let mut buf =
        Vec::with_capacity(3 + signatures.len() * SIGNATURE_LENGTH + message.len());
    buf.extend_from_slice(&encode_length(signatures.len()));
    for signature in signatures {
        buf.extend_from_slice(signature);
    }
    buf.extend_from_slice(message);
    buf
}

/// Strip the signature block off the front of a serialized transaction.
fn split_signatures(data: &[u8]) -> Result<(usize, Vec<[u8; 64]>, &[u8]), SolError> {
    let (count, mut rest) = decode_length(data)?;

    let mut signatures = Vec::with_capacity(count);
    for _ in 0..count {
        if rest.len() < SIGNATURE_LENGTH {
            return Err(SolError::Decode(
                "unexpected end of data while reading signatures".into(),
            ));
        }
        let (sig, tail) = rest.split_at(SIGNATURE_LENGTH);
        signatures.push(sig.try_into().expect("64-byte slice"));
        rest = tail;
    }

    Ok((count, signatures, rest))
}

fn check_counts(declared: usize, message: &Message) -> Result<(), SolError> {
    let required = message.header.num_required_signatures as usize;
    if required == 0 {
        return Err(SolError::FeePayerMissing);
    }
    if declared > 0 && declared != required {
        return Err(SolError::SignatureCountMismatch { declared, required });
    }
    Ok(())
}

fn fee_for(message: &Message, filled_signatures: usize, lamports_per_signature: u64) -> u64 {
    let signature_fee = lamports_per_signature * filled_signatures.max(1) as u64;

    let payloads: Vec<&[u8]> = message
        .instructions
        .iter()
        .filter(|ix| {
            message.accounts.get(ix.program_index as usize) != Some(&COMPUTE_BUDGET_PROGRAM)
        })
        .map(|ix| ix.data.as_slice())
        .collect();

    signature_fee + compute_budget_fee(&payloads)
}
