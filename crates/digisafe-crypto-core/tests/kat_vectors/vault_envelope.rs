//! A fixed envelope produced outside this crate (PBKDF2-SHA256 100k +
//! AES-256-GCM, tag appended, standard base64), as a browser client
//! would write it.

use digisafe_crypto_core::{open_vault, CryptoError, VaultEnvelope};
use serde_json::{json, Value};

const FIXED_ENVELOPE: &str = r#"{
    "salt": "MDEyMzQ1Njc4OWFiY2RlZg==",
    "iv": "AQIDBAUGBwgJCgsM",
    "ciphertext": "BsW2jbaFsavRf9HzABKLRO4LmTaSC0CkwV1InEaRNgK4lCZX+81gd1cO80PEH+UouDccUh05x0k349PCn8/K+GPmaxLayr+FBslSpclI"
}"#;

#[test]
fn fixed_envelope_opens_to_known_payload() {
    let envelope = VaultEnvelope::from_json(FIXED_ENVELOPE).unwrap();
    let payload: Value = open_vault(&envelope, "4242").unwrap();
    assert_eq!(
        payload,
        json!([{"id": 1, "type": "text", "name": "note.txt", "date": "2024-01-01"}])
    );
}

#[test]
fn fixed_envelope_rejects_other_pin() {
    let envelope = VaultEnvelope::from_json(FIXED_ENVELOPE).unwrap();
    assert!(matches!(
        open_vault::<Value>(&envelope, "0000"),
        Err(CryptoError::Authentication)
    ));
}
