#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Security properties of the vault envelope: tamper detection across every
//! byte, salt/nonce freshness, and absence of PIN material.

use std::collections::HashSet;

use data_encoding::BASE64;
use digisafe_crypto_core::{
    create_vault, derive_key, open_vault, CryptoError, VaultEnvelope, VaultKey, SALT_LEN,
};
use serde_json::{json, Value};

fn note_payload() -> Value {
    json!([{"id": 1, "type": "text", "name": "note.txt", "date": "2024-01-01"}])
}

#[test]
fn single_item_scenario() {
    let env = create_vault(&note_payload(), "4242").unwrap();
    let opened: Value = open_vault(&env, "4242").unwrap();
    assert_eq!(opened, note_payload());
    assert!(matches!(
        open_vault::<Value>(&env, "0000"),
        Err(CryptoError::Authentication)
    ));
}

#[test]
fn every_ciphertext_byte_is_authenticated() {
    let env = create_vault(&json!([1]), "4242").unwrap();
    let (key, _): (VaultKey, Value) = VaultKey::unlock(&env, "4242").unwrap();
    let bytes = BASE64.decode(env.ciphertext.as_bytes()).unwrap();

    for i in 0..bytes.len() {
        let mut tampered = bytes.clone();
        tampered[i] ^= 0x80;
        let env = VaultEnvelope {
            ciphertext: BASE64.encode(&tampered),
            ..env.clone()
        };
        assert!(
            matches!(key.open::<Value>(&env), Err(CryptoError::Authentication)),
            "flipping byte {i} must be detected"
        );
    }
}

#[test]
fn tampered_salt_or_iv_is_authentication_failure() {
    let env = create_vault(&note_payload(), "4242").unwrap();

    let mut salt = BASE64.decode(env.salt.as_bytes()).unwrap();
    salt[0] ^= 0xFF;
    let bad_salt = VaultEnvelope {
        salt: BASE64.encode(&salt),
        ..env.clone()
    };
    assert!(matches!(
        open_vault::<Value>(&bad_salt, "4242"),
        Err(CryptoError::Authentication)
    ));

    let mut iv = BASE64.decode(env.iv.as_bytes()).unwrap();
    iv[11] ^= 0xFF;
    let bad_iv = VaultEnvelope {
        iv: BASE64.encode(&iv),
        ..env.clone()
    };
    assert!(matches!(
        open_vault::<Value>(&bad_iv, "4242"),
        Err(CryptoError::Authentication)
    ));
}

#[test]
fn malformed_base64_fails_like_wrong_pin() {
    let env = create_vault(&note_payload(), "4242").unwrap();
    let broken = VaultEnvelope {
        ciphertext: "%%%not-base64%%%".into(),
        ..env
    };
    let err = open_vault::<Value>(&broken, "4242").unwrap_err();
    assert!(matches!(err, CryptoError::Authentication));
    assert_eq!(err.to_string(), CryptoError::Authentication.to_string());
}

#[test]
fn salts_and_ivs_are_fresh_per_creation() {
    let mut salts = HashSet::new();
    let mut ivs = HashSet::new();
    let mut ciphertexts = HashSet::new();
    for _ in 0..16 {
        let env = create_vault(&note_payload(), "4242").unwrap();
        assert!(salts.insert(env.salt));
        assert!(ivs.insert(env.iv));
        assert!(ciphertexts.insert(env.ciphertext));
    }
}

#[test]
fn derivation_is_deterministic() {
    let salt = [0x42u8; SALT_LEN];
    let a = derive_key("4242", &salt).unwrap();
    let b = derive_key("4242", &salt).unwrap();
    assert_eq!(a.expose(), b.expose());
}

#[test]
fn no_field_equals_or_encodes_the_pin() {
    let pin = "424242";
    let env = create_vault(&note_payload(), pin).unwrap();
    let encoded_pin = BASE64.encode(pin.as_bytes());
    for field in [&env.salt, &env.iv, &env.ciphertext] {
        assert_ne!(field, pin);
        assert_ne!(field, &encoded_pin);
        assert!(!field.contains(pin));
        let decoded = BASE64.decode(field.as_bytes()).unwrap();
        assert!(!decoded.windows(pin.len()).any(|w| w == pin.as_bytes()));
    }
    assert!(!env.to_json().unwrap().contains(pin));
}

#[test]
fn envelope_survives_storage_as_string() {
    let env = create_vault(&note_payload(), "9876").unwrap();
    let stored = env.to_json().unwrap();
    let restored = VaultEnvelope::from_json(&stored).unwrap();
    let opened: Value = open_vault(&restored, "9876").unwrap();
    assert_eq!(opened, note_payload());
}
