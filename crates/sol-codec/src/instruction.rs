//! Instructions and the account roles they reference.
//!
//! Every instruction kind reduces to the same `{program, accounts, data}`
//! shape; the compiler and serializer never see anything else. Constructor
//! functions below cover the instruction kinds this crate knows how to
//! build — anything exotic goes through [`Instruction::new`].

use crate::address::{
    Address, ASSOCIATED_TOKEN_PROGRAM, COMPUTE_BUDGET_PROGRAM, SYSTEM_PROGRAM, SYSVAR_RENT,
    TOKEN_2022_PROGRAM, TOKEN_PROGRAM,
};

/// System Program `Transfer` instruction index (little-endian u32).
const SYSTEM_TRANSFER_INDEX: u32 = 2;

/// SPL Token `TransferChecked` instruction tag.
const TOKEN_TRANSFER_CHECKED_TAG: u8 = 12;

/// Compute Budget `SetComputeUnitLimit` / `SetComputeUnitPrice` tags.
pub(crate) const COMPUTE_UNIT_LIMIT_TAG: u8 = 2;
pub(crate) const COMPUTE_UNIT_PRICE_TAG: u8 = 3;

/// A single account reference within an instruction: the address plus its
/// privilege flags.
///
/// The same address may appear in many instructions with different flags;
/// the compiler merges them by boolean OR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub address: Address,
    pub signer: bool,
    pub writable: bool,
}

impl AccountMeta {
    pub fn readonly(address: Address) -> Self {
        AccountMeta {
            address,
            signer: false,
            writable: false,
        }
    }

    pub fn writable(address: Address) -> Self {
        AccountMeta {
            address,
            signer: false,
            writable: true,
        }
    }

    pub fn signer(address: Address) -> Self {
        AccountMeta {
            address,
            signer: true,
            writable: false,
        }
    }

    pub fn signer_and_writable(address: Address) -> Self {
        AccountMeta {
            address,
            signer: true,
            writable: true,
        }
    }
}

/// An instruction before compilation: the program to invoke, the accounts
/// it touches (order significant), and opaque payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program: Address,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

impl Instruction {
    pub fn new(program: Address, accounts: Vec<AccountMeta>, data: Vec<u8>) -> Self {
        Instruction {
            program,
            accounts,
            data,
        }
    }

    /// Build a native SOL transfer (System Program `Transfer`).
    pub fn transfer(from: Address, to: Address, lamports: u64) -> Self {
        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&SYSTEM_TRANSFER_INDEX.to_le_bytes());
        data.extend_from_slice(&lamports.to_le_bytes());

        Instruction {
            program: SYSTEM_PROGRAM,
            accounts: vec![
                AccountMeta::signer_and_writable(from),
                AccountMeta::writable(to),
            ],
            data,
        }
    }

    /// Build an SPL Token `TransferChecked`.
    ///
    /// `amount` is in the token's base units. When `signers` is non-empty
    /// the owner is a multisig account and the listed signers authorize
    /// the transfer in its place.
    pub fn spl_transfer(
        from: Address,
        to: Address,
        mint: Address,
        owner: Address,
        amount: u64,
        decimals: u8,
        signers: &[Address],
    ) -> Self {
        Self::token_transfer(TOKEN_PROGRAM, from, to, mint, owner, amount, decimals, signers)
    }

    /// Token-2022 variant of [`Instruction::spl_transfer`].
    pub fn token_2022_transfer(
        from: Address,
        to: Address,
        mint: Address,
        owner: Address,
        amount: u64,
        decimals: u8,
        signers: &[Address],
    ) -> Self {
        Self::token_transfer(
            TOKEN_2022_PROGRAM,
            from,
            to,
            mint,
            owner,
            amount,
            decimals,
            signers,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn token_transfer(
        program: Address,
        from: Address,
        to: Address,
        mint: Address,
        owner: Address,
        amount: u64,
        decimals: u8,
        signers: &[Address],
    ) -> Self {
        // Tag + u64 LE amount + decimals = 10 bytes.
        let mut data = Vec::with_capacity(10);
        data.push(TOKEN_TRANSFER_CHECKED_TAG);
        data.extend_from_slice(&amount.to_le_bytes());
        data.push(decimals);

        let mut accounts = vec![
            AccountMeta::writable(from),
            AccountMeta::readonly(mint),
            AccountMeta::writable(to),
            if signers.is_empty() {
                AccountMeta::signer(owner)
            } else {
                AccountMeta::readonly(owner)
            },
        ];
        accounts.extend(signers.iter().copied().map(AccountMeta::signer));

        Instruction {
            program,
            accounts,
            data,
        }
    }

    /// Create an associated token account owned by the SPL Token program.
    pub fn create_associated_token_account(
        payer: Address,
        associated_token: Address,
        owner: Address,
        mint: Address,
    ) -> Self {
        Self::create_associated_account(payer, associated_token, owner, mint, TOKEN_PROGRAM)
    }

    /// Create an associated token account owned by the Token-2022 program.
    pub fn create_associated_token_2022_account(
        payer: Address,
        associated_token: Address,
        owner: Address,
        mint: Address,
    ) -> Self {
        Self::create_associated_account(payer, associated_token, owner, mint, TOKEN_2022_PROGRAM)
    }

    fn create_associated_account(
        payer: Address,
        associated_token: Address,
        owner: Address,
        mint: Address,
        token_program: Address,
    ) -> Self {
        Instruction {
            program: ASSOCIATED_TOKEN_PROGRAM,
            accounts: vec![
                AccountMeta::signer_and_writable(payer),
                AccountMeta::writable(associated_token),
                AccountMeta::readonly(owner),
                AccountMeta::readonly(mint),
                AccountMeta::readonly(SYSTEM_PROGRAM),
                AccountMeta::readonly(token_program),
                AccountMeta::readonly(SYSVAR_RENT),
            ],
            data: vec![0],
        }
    }

    /// Cap the transaction's compute units.
    pub fn set_compute_unit_limit(units: u32) -> Self {
        let mut data = Vec::with_capacity(5);
        data.push(COMPUTE_UNIT_LIMIT_TAG);
        data.extend_from_slice(&units.to_le_bytes());

        Instruction {
            program: COMPUTE_BUDGET_PROGRAM,
            accounts: Vec::new(),
            data,
        }
    }

    /// Set the priority fee in micro-lamports per compute unit.
    pub fn set_compute_unit_price(micro_lamports: u64) -> Self {
        let mut data = Vec::with_capacity(9);
        data.push(COMPUTE_UNIT_PRICE_TAG);
        data.extend_from_slice(&micro_lamports.to_le_bytes());

        Instruction {
            program: COMPUTE_BUDGET_PROGRAM,
            accounts: Vec::new(),
            data,
        }
    }
}
