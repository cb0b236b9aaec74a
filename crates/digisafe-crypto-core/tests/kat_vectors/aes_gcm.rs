//! AES-256-GCM known answer through the crate's own `decrypt`/`encrypt`.

use digisafe_crypto_core::symmetric::{decrypt, encrypt, SealedData};
use digisafe_crypto_core::SecretBytes;

/// NIST SP 800-38D test case 14: zero key, zero IV, 16 zero bytes of
/// plaintext, no AAD. Ciphertext and tag are stored back to back.
///
/// CT:  cea7403d4d606b6e074ec5d3baf39d18
/// Tag: d0d1c8a799996bf0265b98b5d48ab919
#[test]
fn nist_test_case_14_through_decrypt() {
    let key = SecretBytes::new([0u8; 32]);
    let sealed = SealedData {
        nonce: [0u8; 12],
        ciphertext: vec![
            0xce, 0xa7, 0x40, 0x3d, 0x4d, 0x60, 0x6b, 0x6e, 0x07, 0x4e, 0xc5, 0xd3, 0xba, 0xf3,
            0x9d, 0x18, 0xd0, 0xd1, 0xc8, 0xa7, 0x99, 0x99, 0x6b, 0xf0, 0x26, 0x5b, 0x98, 0xb5,
            0xd4, 0x8a, 0xb9, 0x19,
        ],
    };
    let plaintext = decrypt(&sealed, &key).unwrap();
    assert_eq!(plaintext.expose(), &[0u8; 16]);
}

#[test]
fn encrypt_appends_sixteen_byte_tag() {
    let key = SecretBytes::new([0u8; 32]);
    let sealed = encrypt(&[0u8; 16], &key).unwrap();
    assert_eq!(sealed.ciphertext.len(), 32);
}
