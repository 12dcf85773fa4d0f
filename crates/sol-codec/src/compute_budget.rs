//! Decoding compute-budget instructions and the priority-fee estimate
//! derived from them.
//!
//! Two instruction tags matter here: `SetComputeUnitLimit` (2, LE u32
//! unit count) and `SetComputeUnitPrice` (3, LE u64 price in
//! micro-lamports per unit). Together they determine a transaction's
//! priority fee.

use crate::convert;
use crate::instruction::{COMPUTE_UNIT_LIMIT_TAG, COMPUTE_UNIT_PRICE_TAG};

/// Decode a `SetComputeUnitLimit` payload. Returns 0 when the tag does
/// not match or the payload is truncated.
pub fn decode_unit_limit(data: &[u8]) -> u32 {
    match data.split_first() {
        Some((&COMPUTE_UNIT_LIMIT_TAG, rest)) if rest.len() >= 4 => {
            u32::from_le_bytes(rest[..4].try_into().expect("4-byte slice"))
        }
        _ => 0,
    }
}

/// Decode a `SetComputeUnitPrice` payload (micro-lamports per unit).
/// Returns 0 when the tag does not match or the payload is truncated.
pub fn decode_unit_price(data: &[u8]) -> u64 {
    match data.split_first() {
        Some((&COMPUTE_UNIT_PRICE_TAG, rest)) if rest.len() >= 8 => {
            u64::from_le_bytes(rest[..8].try_into().expect("8-byte slice"))
        }
        _ => 0,
    }
}

/// Estimate the priority fee, in lamports, declared by a set of
/// instruction payloads.
///
/// Only the exact {limit, price} pair produces an estimate, in either
/// order; any other count, an unrecognized tag, or a zero limit or price
/// yields 0. The product is in micro-lamports and is rescaled with
/// ceiling rounding.
pub fn compute_budget_fee(data: &[&[u8]]) -> u64 {
    if data.len() != 2 {
        return 0;
    }

    let mut unit_limit = 0u32;
    let mut unit_price = 0u64;
    for payload in data {
        match payload.first() {
            Some(&COMPUTE_UNIT_LIMIT_TAG) => unit_limit = decode_unit_limit(payload),
            Some(&COMPUTE_UNIT_PRICE_TAG) => unit_price = decode_unit_price(payload),
            _ => return 0,
        }
    }

    if unit_limit == 0 || unit_price == 0 {
        return 0;
    }

    convert::micro_to_lamports(unit_limit as u128 * unit_price as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn decodes_unit_limit() {
        assert_eq!(decode_unit_limit(&h("022e720200")), 160_302);
        assert_eq!(decode_unit_limit(&h("02c0d40100")), 120_000);
    }

    #[test]
    fn decodes_unit_price() {
        assert_eq!(decode_unit_price(&h("03ab05000000000000")), 1451);
        assert_eq!(decode_unit_price(&h("037427000000000000")), 10_100);
    }

    #[test]
    fn wrong_tag_decodes_to_zero() {
        assert_eq!(decode_unit_limit(&h("03ab05000000000000")), 0);
        assert_eq!(decode_unit_price(&h("02c0d40100")), 0);
    }

    #[test]
    fn truncated_payload_decodes_to_zero() {
        assert_eq!(decode_unit_limit(&h("02c0d4")), 0);
        assert_eq!(decode_unit_price(&h("03ab05")), 0);
        assert_eq!(decode_unit_limit(&[]), 0);
    }

    #[test]
    fn fee_for_limit_price_pair() {
        // 120_000 units * 10_100 micro-lamports = 1212 lamports.
        let price = h("037427000000000000");
        let limit = h("02c0d40100");

        assert_eq!(compute_budget_fee(&[&price, &limit]), 1212);
        // Order does not matter.
        assert_eq!(compute_budget_fee(&[&limit, &price]), 1212);
    }

    #[test]
    fn fee_rounds_up_to_whole_lamports() {
        // 160_302 * 1451 = 232_598_202 micro-lamports -> 233 lamports.
        let limit = h("022e720200");
        let price = h("03ab05000000000000");

        assert_eq!(compute_budget_fee(&[&limit, &price]), 233);
        assert_eq!(compute_budget_fee(&[&price, &limit]), 233);
    }

    #[test]
    fn fee_requires_exactly_two_payloads() {
        let limit = h("02c0d40100");
        let price = h("037427000000000000");

        assert_eq!(compute_budget_fee(&[]), 0);
        assert_eq!(compute_budget_fee(&[&limit]), 0);
        assert_eq!(compute_budget_fee(&[&limit, &price, &limit]), 0);
    }

    #[test]
    fn fee_is_zero_for_unrecognized_tags() {
        let limit = h("02c0d40100");
        let other = h("0001020304");

        assert_eq!(compute_budget_fee(&[&limit, &other]), 0);
    }

    #[test]
    fn fee_is_zero_when_either_side_is_zero() {
        let zero_limit = h("0200000000");
        let price = h("037427000000000000");

        assert_eq!(compute_budget_fee(&[&zero_limit, &price]), 0);
    }
}
