use sha2::{Digest, Sha256};

/// Derived key length in bytes
pub const KEY_LEN: usize = 32;

/// Progress is reported whenever the position is a multiple of this
const PROGRESS_INTERVAL: usize = 50_000;

/// Key for the XOR stream obfuscator
///
/// NOT ENCRYPTION. The keystream is a SHA-256 digest of the password repeated
/// with a position-dependent tweak: `key[i % 32] ^ (i * 31 mod 256)`. It hides
/// content from casual inspection only; anyone holding one plaintext/ciphertext
/// pair recovers the key. The formula is part of the `.enc`/`.ec` container
/// format and must not change without changing the format.
///
/// Derived from a password; lives for one call only.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherKey([u8; KEY_LEN]);

impl CipherKey {
    /// SHA-256 of the UTF-8 password bytes
    pub fn derive(password: &str) -> Self {
        Self(Sha256::digest(password.as_bytes()).into())
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Keystream byte at position `i`
    #[inline]
    pub fn keystream_byte(&self, i: usize) -> u8 {
        // (i * 31) mod 256 only depends on the low byte of i
        self.0[i % KEY_LEN] ^ (i as u8).wrapping_mul(31)
    }

    /// XOR the keystream into `data` in place
    pub fn apply(&self, data: &mut [u8], progress: &mut dyn FnMut(u8, &str)) {
        let len = data.len();
        for (i, byte) in data.iter_mut().enumerate() {
            *byte ^= self.keystream_byte(i);

            if i % PROGRESS_INTERVAL == 0 {
                let pct = (i as u64 * 100 / len as u64) as u8;
                progress(pct, &format!("Cipher: {}%", pct));
            }
        }
        progress(100, "Cipher complete");
    }
}

impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CipherKey(..)")
    }
}

/// Obfuscate `data` with `password`
/// A missing or empty password returns the input unchanged.
pub fn encrypt(data: &[u8], password: Option<&str>) -> Vec<u8> {
    encrypt_with_progress(data, password, &mut |_, _| {})
}

/// Reverse [`encrypt`]; the transform is its own inverse
pub fn decrypt(data: &[u8], password: Option<&str>) -> Vec<u8> {
    encrypt(data, password)
}

pub fn encrypt_with_progress(
    data: &[u8],
    password: Option<&str>,
    progress: &mut dyn FnMut(u8, &str),
) -> Vec<u8> {
    let mut out = data.to_vec();
    match password {
        Some(password) if !password.is_empty() => {
            CipherKey::derive(password).apply(&mut out, progress);
        }
        _ => {}
    }
    out
}

pub fn decrypt_with_progress(
    data: &[u8],
    password: Option<&str>,
    progress: &mut dyn FnMut(u8, &str),
) -> Vec<u8> {
    encrypt_with_progress(data, password, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut original = vec![0u8; 100];
        rng.fill_bytes(&mut original);

        let encrypted = encrypt(&original, Some("secret"));
        assert_ne!(encrypted, original);
        assert_eq!(decrypt(&encrypted, Some("secret")), original);
    }

    #[test]
    fn test_key_is_sha256_of_password() {
        let key = CipherKey::derive("abc");
        // SHA-256("abc")
        let expected: [u8; 32] = [
            0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae,
            0x22, 0x23, 0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61,
            0xf2, 0x00, 0x15, 0xad,
        ];
        assert_eq!(key.as_bytes(), &expected);
    }

    #[test]
    fn test_keystream_formula() {
        let key = CipherKey::derive("x");
        let zeros = vec![0u8; 600];
        let stream = encrypt(&zeros, Some("x"));
        for (i, &b) in stream.iter().enumerate() {
            let expected = key.as_bytes()[i % KEY_LEN] ^ ((i * 31) % 256) as u8;
            assert_eq!(b, expected, "position {}", i);
        }
        // Same key byte, different tweak: 32 * 31 mod 256 = 224
        assert_eq!(stream[0] ^ stream[32], 224);
    }

    #[test]
    fn test_empty_password_is_noop() {
        let data = b"plain bytes".to_vec();
        assert_eq!(encrypt(&data, None), data);
        assert_eq!(encrypt(&data, Some("")), data);
        assert_eq!(decrypt(&data, Some("")), data);
    }

    #[test]
    fn test_wrong_password_does_not_recover() {
        let data = b"some private text".to_vec();
        let encrypted = encrypt(&data, Some("right"));
        assert_ne!(decrypt(&encrypted, Some("wrong")), data);
    }

    #[test]
    fn test_empty_data() {
        assert!(encrypt(b"", Some("pw")).is_empty());
    }

    #[test]
    fn test_debug_hides_key() {
        assert_eq!(format!("{:?}", CipherKey::derive("pw")), "CipherKey(..)");
    }

    proptest! {
        #[test]
        fn prop_roundtrip(
            data in proptest::collection::vec(any::<u8>(), 0..2048),
            password in "[a-zA-Z0-9ñ€ ]{1,24}",
        ) {
            let encrypted = encrypt(&data, Some(&password));
            prop_assert_eq!(decrypt(&encrypted, Some(&password)), data);
        }
    }
}
