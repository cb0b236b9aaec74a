#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for sealing and opening vaults.
//!
//! Every case pays for a 100,000-round PBKDF2 derivation, so case counts are
//! kept small.

use data_encoding::BASE64;
use digisafe_crypto_core::{create_vault, open_vault, CryptoError, VaultEnvelope};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Item {
    id: u64,
    #[serde(rename = "type")]
    kind: String,
    name: String,
    date: String,
}

fn item_strategy() -> impl Strategy<Value = Item> {
    (any::<u64>(), "(image|text)", "\\PC{0,40}", "[0-9]{4}-[0-9]{2}-[0-9]{2}")
        .prop_map(|(id, kind, name, date)| Item { id, kind, name, date })
}

fn pin_strategy() -> impl Strategy<Value = String> {
    "\\PC{1,12}"
}

fn flip_ciphertext_byte(envelope: &VaultEnvelope, index: usize) -> VaultEnvelope {
    let mut bytes = BASE64.decode(envelope.ciphertext.as_bytes()).unwrap();
    let i = index % bytes.len();
    bytes[i] ^= 0x01;
    VaultEnvelope {
        ciphertext: BASE64.encode(&bytes),
        ..envelope.clone()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// create → open with the same PIN returns the payload unchanged.
    #[test]
    fn roundtrip_recovers_payload(
        items in proptest::collection::vec(item_strategy(), 0..6),
        pin in pin_strategy(),
    ) {
        let env = create_vault(&items, &pin).unwrap();
        let opened: Vec<Item> = open_vault(&env, &pin).unwrap();
        prop_assert_eq!(opened, items);
    }

    /// Any other PIN is rejected with the generic authentication error.
    #[test]
    fn other_pin_is_rejected(
        items in proptest::collection::vec(item_strategy(), 0..3),
        pin in pin_strategy(),
        other in pin_strategy(),
    ) {
        prop_assume!(pin != other);
        let env = create_vault(&items, &pin).unwrap();
        let result = open_vault::<Vec<Item>>(&env, &other);
        prop_assert!(matches!(result, Err(CryptoError::Authentication)));
    }

    /// Flipping one ciphertext bit is caught even with the right PIN.
    #[test]
    fn single_byte_tamper_is_rejected(
        items in proptest::collection::vec(item_strategy(), 1..4),
        pin in pin_strategy(),
        index in any::<usize>(),
    ) {
        let env = create_vault(&items, &pin).unwrap();
        let tampered = flip_ciphertext_byte(&env, index);
        let result = open_vault::<Vec<Item>>(&tampered, &pin);
        prop_assert!(matches!(result, Err(CryptoError::Authentication)));
    }

    /// The serialized envelope never contains the PIN.
    #[test]
    fn envelope_never_contains_pin(
        items in proptest::collection::vec(item_strategy(), 0..3),
        pin in "[0-9]{4,6}",
    ) {
        let env = create_vault(&items, &pin).unwrap();
        let json = env.to_json().unwrap();
        prop_assert!(!json.contains(&pin));
        prop_assert!(!json.contains(&BASE64.encode(pin.as_bytes())));
    }
}
