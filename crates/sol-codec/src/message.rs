//! The compiled transaction body and its wire format.
//!
//! ```text
//! Message:
//!   version tag             1 byte, V0 only (0x80 + version; legacy omits it)
//!   num_required_sigs       u8
//!   num_readonly_signed     u8
//!   num_readonly_unsigned   u8
//!   account_keys            compact-u16 count, 32 bytes each
//!   recent_blockhash        32 bytes
//!   instructions            compact-u16 count, each:
//!     program_index         u8
//!     account_indices       compact-u16 count, u8 each
//!     data                  compact-u16 length, raw bytes
//!   lookup_tables (V0)      compact-u16 count, each:
//!     table_address         32 bytes
//!     writable_indexes      compact-u16 count, u8 each
//!     readonly_indexes      compact-u16 count, u8 each
//! ```

use crate::address::{Address, Blockhash};
use crate::compact::{decode_length, encode_length};
use crate::compiler::{self, AddressLookupTableAccount};
use crate::error::SolError;
use crate::instruction::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageVersion {
    Legacy,
    V0,
}

/// The three header counts from which the signer/writable partitions of
/// the account table are reconstructed by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction whose account references have been replaced by indices
/// into the message's account table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// A lookup-table reference carried by a V0 message. The indexes point
/// into the external table's address list, not the message's own table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledAddressLookupTable {
    pub key: Address,
    pub writable_indexes: Vec<u8>,
    pub readonly_indexes: Vec<u8>,
}

/// A compiled, versioned transaction body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub version: MessageVersion,
    pub header: MessageHeader,
    pub accounts: Vec<Address>,
    pub recent_blockhash: Blockhash,
    pub instructions: Vec<CompiledInstruction>,
    pub address_lookup_tables: Vec<CompiledAddressLookupTable>,
}

impl Message {
    /// Compile a legacy message: no lookup tables, no version tag on the
    /// wire.
    pub fn new_legacy(
        fee_payer: &Address,
        recent_blockhash: Blockhash,
        instructions: &[Instruction],
    ) -> Self {
        compiler::compile(
            MessageVersion::Legacy,
            fee_payer,
            instructions,
            recent_blockhash,
            &[],
        )
    }

    /// Compile a V0 message, resolving unsigned accounts through the
    /// supplied lookup tables where possible.
    pub fn new_v0(
        fee_payer: &Address,
        recent_blockhash: Blockhash,
        instructions: &[Instruction],
        lookup_tables: &[AddressLookupTableAccount],
    ) -> Self {
        compiler::compile(
            MessageVersion::V0,
            fee_payer,
            instructions,
            recent_blockhash,
            lookup_tables,
        )
    }

    /// A copy of this message carrying a different recent blockhash.
    /// Account ordering and instruction indices are untouched.
    pub fn with_new_blockhash(&self, recent_blockhash: Blockhash) -> Self {
        Message {
            recent_blockhash,
            ..self.clone()
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);

        if self.version == MessageVersion::V0 {
            buf.push(0x80);
        }

        buf.push(self.header.num_required_signatures);
        buf.push(self.header.num_readonly_signed_accounts);
        buf.push(self.header.num_readonly_unsigned_accounts);

        buf.extend_from_slice(&encode_length(self.accounts.len()));
        for account in &self.accounts {
            buf.extend_from_slice(account.as_bytes());
        }

        buf.extend_from_slice(self.recent_blockhash.as_bytes());

        buf.extend_from_slice(&encode_length(self.instructions.len()));
        for instruction in &self.instructions {
            buf.push(instruction.program_index);
            buf.extend_from_slice(&encode_length(instruction.account_indices.len()));
            buf.extend_from_slice(&instruction.account_indices);
            buf.extend_from_slice(&encode_length(instruction.data.len()));
            buf.extend_from_slice(&instruction.data);
        }

        if self.version == MessageVersion::V0 {
            // Only tables that resolved at least one address go on the
            // wire.
            let tables: Vec<&CompiledAddressLookupTable> = self
                .address_lookup_tables
                .iter()
                .filter(|t| !t.writable_indexes.is_empty() || !t.readonly_indexes.is_empty())
                .collect();
            buf.extend_from_slice(&encode_length(tables.len()));
            for table in tables {
                buf.extend_from_slice(table.key.as_bytes());
                buf.extend_from_slice(&encode_length(table.writable_indexes.len()));
                buf.extend_from_slice(&table.writable_indexes);
                buf.extend_from_slice(&encode_length(table.readonly_indexes.len()));
                buf.extend_from_slice(&table.readonly_indexes);
            }
        }

        buf
    }

    /// Parse a serialized message, auto-detecting legacy vs V0 from the
    /// first byte. Consumes the whole buffer.
    pub fn deserialize(data: &[u8]) -> Result<Self, SolError> {
        let first = *data
            .first()
            .ok_or_else(|| SolError::Decode("empty message".into()))?;

        let (version, mut data) = if first > 127 {
            let version = first - 128;
            if version != 0 {
                return Err(SolError::UnsupportedVersion(version));
            }
            (MessageVersion::V0, &data[1..])
        } else {
            (MessageVersion::Legacy, data)
        };

        let header_bytes = take(&mut data, 3, "message header")?;
        let header = MessageHeader {
            num_required_signatures: header_bytes[0],
            num_readonly_signed_accounts: header_bytes[1],
            num_readonly_unsigned_accounts: header_bytes[2],
        };

        let account_count;
        (account_count, data) = decode_length(data)?;
        let mut accounts = Vec::with_capacity(account_count);
        for _ in 0..account_count {
            let bytes = take(&mut data, Address::LENGTH, "account key")?;
            accounts.push(Address::try_from_slice(bytes)?);
        }

        let blockhash_bytes = take(&mut data, 32, "recent blockhash")?;
        let recent_blockhash = Blockhash::new(blockhash_bytes.try_into().expect("32-byte slice"));

        let instruction_count;
        (instruction_count, data) = decode_length(data)?;
        let mut instructions = Vec::with_capacity(instruction_count);
        for _ in 0..instruction_count {
            let program_index = take(&mut data, 1, "program index")?[0];

            let index_count;
            (index_count, data) = decode_length(data)?;
            let account_indices = take(&mut data, index_count, "account indices")?.to_vec();

            let data_len;
            (data_len, data) = decode_length(data)?;
            let payload = take(&mut data, data_len, "instruction data")?.to_vec();

            instructions.push(CompiledInstruction {
                program_index,
                account_indices,
                data: payload,
            });
        }

        let mut address_lookup_tables = Vec::new();
        if version == MessageVersion::V0 {
            let table_count;
            (table_count, data) = decode_length(data)?;
            for _ in 0..table_count {
                let key = Address::try_from_slice(take(&mut data, Address::LENGTH, "table key")?)?;

                let writable_count;
                (writable_count, data) = decode_length(data)?;
                let writable_indexes = take(&mut data, writable_count, "writable indexes")?.to_vec();

                let readonly_count;
                (readonly_count, data) = decode_length(data)?;
                let readonly_indexes = take(&mut data, readonly_count, "readonly indexes")?.to_vec();

                address_lookup_tables.push(CompiledAddressLookupTable {
                    key,
                    writable_indexes,
                    readonly_indexes,
                });
            }
        }

        if !data.is_empty() {
            return Err(SolError::Decode(format!(
                "{} trailing bytes after message",
                data.len()
            )));
        }

        Ok(Message {
            version,
            header,
            accounts,
            recent_blockhash,
            instructions,
            address_lookup_tables,
        })
    }
}

/// Split `count` bytes off the front of `data`, or fail naming the field
/// that was truncated.
fn take<'a>(data: &mut &'a [u8], count: usize, what: &str) -> Result<&'a [u8], SolError> {
    if data.len() < count {
        return Err(SolError::Decode(format!(
            "unexpected end of data while reading {what}"
        )));
    }
    let (head, rest) = data.split_at(count);
    *data = rest;
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::SYSTEM_PROGRAM;
    use crate::instruction::AccountMeta;

    fn blockhash() -> Blockhash {
        "FwRYtTPRk5N4wUeP87rTw9kQVSwigB6kbikGzzeCMrW5"
            .parse()
            .unwrap()
    }

    fn transfer_message(version: MessageVersion) -> Message {
        let fee_payer = Address::new([1; 32]);
        let to = Address::new([2; 32]);
        let instruction = Instruction::transfer(fee_payer, to, 100);
        match version {
            MessageVersion::Legacy => Message::new_legacy(&fee_payer, blockhash(), &[instruction]),
            MessageVersion::V0 => Message::new_v0(&fee_payer, blockhash(), &[instruction], &[]),
        }
    }

    #[test]
    fn legacy_wire_layout() {
        let message = transfer_message(MessageVersion::Legacy);
        let bytes = message.serialize();

        // No version tag: the first byte is the signature count, <= 127.
        assert_eq!(bytes[0], message.header.num_required_signatures);
        assert_eq!(bytes[1], 0);
        assert_eq!(bytes[2], 1);
        assert_eq!(bytes[3], 3); // account count
    }

    #[test]
    fn v0_wire_layout_has_version_tag() {
        let message = transfer_message(MessageVersion::V0);
        let bytes = message.serialize();

        assert_eq!(bytes[0], 0x80);
        assert_eq!(bytes[1], message.header.num_required_signatures);
        // Trailing lookup-table count for a table-free message is zero.
        assert_eq!(*bytes.last().unwrap(), 0);
    }

    #[test]
    fn blockhash_sits_after_account_table() {
        let message = transfer_message(MessageVersion::Legacy);
        let bytes = message.serialize();

        let offset = 3 + 1 + 3 * 32;
        assert_eq!(&bytes[offset..offset + 32], message.recent_blockhash.as_bytes());
    }

    #[test]
    fn legacy_roundtrip() {
        let message = transfer_message(MessageVersion::Legacy);
        let recovered = Message::deserialize(&message.serialize()).unwrap();
        assert_eq!(recovered, message);
    }

    #[test]
    fn v0_roundtrip() {
        let message = transfer_message(MessageVersion::V0);
        let recovered = Message::deserialize(&message.serialize()).unwrap();
        assert_eq!(recovered, message);
    }

    #[test]
    fn v0_roundtrip_with_lookup_table() {
        let fee_payer = Address::new([1; 32]);
        let offloaded = Address::new([5; 32]);
        let program = Address::new([9; 32]);
        let instruction = Instruction::new(
            program,
            vec![
                AccountMeta::signer_and_writable(fee_payer),
                AccountMeta::writable(offloaded),
            ],
            vec![0xAB],
        );
        let table = AddressLookupTableAccount {
            key: Address::new([7; 32]),
            addresses: vec![offloaded],
        };

        let message = Message::new_v0(&fee_payer, blockhash(), &[instruction], &[table]);
        assert_eq!(message.address_lookup_tables.len(), 1);

        let recovered = Message::deserialize(&message.serialize()).unwrap();
        assert_eq!(recovered, message);
    }

    #[test]
    fn rejects_unknown_version() {
        let err = Message::deserialize(&[0x81, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, SolError::UnsupportedVersion(1)));
    }

    #[test]
    fn rejects_empty_buffer() {
        assert!(Message::deserialize(&[]).is_err());
    }

    #[test]
    fn rejects_truncated_account_table() {
        let message = transfer_message(MessageVersion::Legacy);
        let bytes = message.serialize();
        assert!(Message::deserialize(&bytes[..20]).is_err());
    }

    #[test]
    fn rejects_trailing_garbage() {
        let mut bytes = transfer_message(MessageVersion::Legacy).serialize();
        bytes.push(0xFF);
        assert!(Message::deserialize(&bytes).is_err());
    }

    #[test]
    fn with_new_blockhash_replaces_only_the_blockhash() {
        let message = transfer_message(MessageVersion::V0);
        let new_hash: Blockhash = "EwRYtTPRk5N4wUeP87rTw9kQVSwigB6kbikGzzeCMrW4"
            .parse()
            .unwrap();

        let updated = message.with_new_blockhash(new_hash);

        assert_eq!(updated.recent_blockhash, new_hash);
        assert_eq!(updated.version, message.version);
        assert_eq!(updated.header, message.header);
        assert_eq!(updated.accounts, message.accounts);
        assert_eq!(updated.instructions, message.instructions);
        assert_eq!(updated.address_lookup_tables, message.address_lookup_tables);
    }
}
