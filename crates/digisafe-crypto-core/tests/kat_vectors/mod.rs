mod aes_gcm;
mod pbkdf2_sha256;
mod vault_envelope;
