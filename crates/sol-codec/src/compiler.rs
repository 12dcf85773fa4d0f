//! Account-table compilation: privilege resolution and index assignment.
//!
//! Compilation turns a fee payer plus a list of instructions into the
//! canonical account table the network expects. The ordering is
//! consensus-critical: fee payer first, then writable signers, read-only
//! signers, writable non-signers, read-only non-signers, each group in
//! unsigned byte-lexicographic address order. The `BTreeMap` keyed by
//! `Address` supplies exactly that order, independent of instruction
//! order or any hash-map iteration quirks.

use std::collections::BTreeMap;

use crate::address::{Address, Blockhash};
use crate::instruction::Instruction;
use crate::message::{
    CompiledAddressLookupTable, CompiledInstruction, Message, MessageHeader, MessageVersion,
};

/// An on-chain address lookup table: its own address plus the list of
/// addresses a V0 message may reference by index instead of inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressLookupTableAccount {
    pub key: Address,
    pub addresses: Vec<Address>,
}

/// Merged privilege flags for one address across all instructions.
#[derive(Default, Clone, Copy)]
struct Privileges {
    signer: bool,
    writable: bool,
    /// Set when the address is a called program. Invoked addresses must
    /// stay in the inline table; validators load programs before lookup
    /// tables are resolved.
    invoked: bool,
}

/// Addresses a lookup table resolved out of the inline table, with their
/// indexes into that table's own address list.
#[derive(Default)]
struct ResolvedTable {
    writable: Vec<(u8, Address)>,
    readonly: Vec<(u8, Address)>,
}

pub(crate) fn compile(
    version: MessageVersion,
    fee_payer: &Address,
    instructions: &[Instruction],
    recent_blockhash: Blockhash,
    lookup_tables: &[AddressLookupTableAccount],
) -> Message {
    // Fold every instruction into an address -> privileges map, OR-merging
    // flags on repeat sightings.
    let mut privileges: BTreeMap<Address, Privileges> = BTreeMap::new();
    for instruction in instructions {
        privileges.entry(instruction.program).or_default().invoked = true;
        for meta in &instruction.accounts {
            let entry = privileges.entry(meta.address).or_default();
            entry.signer |= meta.signer;
            entry.writable |= meta.writable;
        }
    }

    // The fee payer signs and is debited no matter how instructions
    // reference it.
    {
        let entry = privileges.entry(*fee_payer).or_default();
        entry.signer = true;
        entry.writable = true;
    }

    // Partition into the four privilege buckets. BTreeMap iteration keeps
    // each bucket byte-ordered.
    let mut writable_signed = Vec::new();
    let mut readonly_signed = Vec::new();
    let mut writable_unsigned = Vec::new();
    let mut readonly_unsigned = Vec::new();
    for (&address, p) in &privileges {
        if address == *fee_payer {
            continue;
        }
        match (p.signer, p.writable) {
            (true, true) => writable_signed.push(address),
            (true, false) => readonly_signed.push(address),
            (false, true) => writable_unsigned.push(address),
            (false, false) => readonly_unsigned.push(address),
        }
    }

    // Offload unsigned accounts to lookup tables where possible. Signed
    // accounts and invoked programs always stay inline.
    let mut resolved: Vec<ResolvedTable> = lookup_tables
        .iter()
        .map(|_| ResolvedTable::default())
        .collect();
    let mut extract = |bucket: Vec<Address>, writable: bool| -> Vec<Address> {
        bucket
            .into_iter()
            .filter(|address| {
                if privileges[address].invoked {
                    return true;
                }
                for (table, out) in lookup_tables.iter().zip(resolved.iter_mut()) {
                    if let Some(index) = table.addresses.iter().position(|a| a == address) {
                        let list = if writable {
                            &mut out.writable
                        } else {
                            &mut out.readonly
                        };
                        list.push((index as u8, *address));
                        return false;
                    }
                }
                true
            })
            .collect()
    };
    let writable_unsigned = extract(writable_unsigned, true);
    let readonly_unsigned = extract(readonly_unsigned, false);

    // Inline account table and the header counts derived from it.
    let mut accounts = Vec::with_capacity(privileges.len());
    accounts.push(*fee_payer);
    accounts.extend_from_slice(&writable_signed);
    accounts.extend_from_slice(&readonly_signed);
    accounts.extend_from_slice(&writable_unsigned);
    accounts.extend_from_slice(&readonly_unsigned);

    let header = MessageHeader {
        num_required_signatures: (1 + writable_signed.len() + readonly_signed.len()) as u8,
        num_readonly_signed_accounts: readonly_signed.len() as u8,
        num_readonly_unsigned_accounts: readonly_unsigned.len() as u8,
    };

    // Instruction indices are computed against the full concatenated
    // ordering: inline table, then every table's writable entries, then
    // every table's readonly entries.
    let mut positions: BTreeMap<Address, u8> = BTreeMap::new();
    let mut next = 0u8;
    let mut assign = |address: Address, positions: &mut BTreeMap<Address, u8>| {
        positions.entry(address).or_insert_with(|| {
            let index = next;
            next = next.wrapping_add(1);
            index
        });
    };
    for &address in &accounts {
        assign(address, &mut positions);
    }
    for table in &resolved {
        for &(_, address) in &table.writable {
            assign(address, &mut positions);
        }
    }
    for table in &resolved {
        for &(_, address) in &table.readonly {
            assign(address, &mut positions);
        }
    }

    let compiled_instructions = instructions
        .iter()
        .map(|instruction| CompiledInstruction {
            program_index: positions[&instruction.program],
            account_indices: instruction
                .accounts
                .iter()
                .map(|meta| positions[&meta.address])
                .collect(),
            data: instruction.data.clone(),
        })
        .collect();

    // A table only earns a message entry if it resolved something.
    let address_lookup_tables = lookup_tables
        .iter()
        .zip(resolved)
        .filter(|(_, out)| !out.writable.is_empty() || !out.readonly.is_empty())
        .map(|(table, out)| CompiledAddressLookupTable {
            key: table.key,
            writable_indexes: out.writable.iter().map(|&(i, _)| i).collect(),
            readonly_indexes: out.readonly.iter().map(|&(i, _)| i).collect(),
        })
        .collect();

    Message {
        version,
        header,
        accounts,
        recent_blockhash,
        instructions: compiled_instructions,
        address_lookup_tables,
    }
}
