//! PBKDF2-HMAC-SHA256 known answers for `derive_key`.
//!
//! Expected values were computed outside this crate (Python `hashlib`,
//! which matches WebCrypto `deriveBits`), so a change to the iteration
//! count, hash or PIN encoding shows up here.

use digisafe_crypto_core::{derive_key, PBKDF2_ITERATIONS};

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[test]
fn iteration_count_is_pinned() {
    assert_eq!(PBKDF2_ITERATIONS, 100_000);
}

/// PIN "4242", salt "0123456789abcdef", 100,000 iterations, 32-byte output.
#[test]
fn derive_key_pin_4242() {
    let key = derive_key("4242", b"0123456789abcdef").unwrap();
    assert_eq!(
        hex(key.expose()),
        "0f1b53f912a255eb7aaab8a9a326eebb100cf803d46c20ac6637c5109c1ce23e"
    );
}
