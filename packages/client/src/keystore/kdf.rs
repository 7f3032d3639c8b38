//! Key derivation and decryption for PKCS#12.
//!
//! Two families:
//! 1. The PKCS#12 KDF (RFC 7292 Appendix B), used for the integrity MAC and
//!    the legacy `pbeWithSHAAnd3-KeyTripleDES-CBC` scheme.
//! 2. PBES2 (RFC 8018): PBKDF2 with an HMAC PRF, then AES-CBC.

use cipher::{BlockDecryptMut, KeyIvInit, block_padding::Pkcs7};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::digest::FixedOutputReset;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use crate::error::DecryptionFailed;

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type Des3CbcDec = cbc::Decryptor<des::TdesEde3>;

/// PKCS#12 KDF ID values (RFC 7292 Appendix B.3).
pub(crate) const ID_KEY: u8 = 1;
pub(crate) const ID_IV: u8 = 2;
pub(crate) const ID_MAC: u8 = 3;

/// Digest used by the PKCS#12 integrity MAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MacDigest {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

/// PBKDF2 pseudo-random function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prf {
    HmacSha1,
    HmacSha224,
    HmacSha256,
    HmacSha384,
    HmacSha512,
}

/// PBES2 encryption scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pbes2Cipher {
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
}

impl Pbes2Cipher {
    fn key_len(self) -> usize {
        match self {
            Pbes2Cipher::Aes128Cbc => 16,
            Pbes2Cipher::Aes192Cbc => 24,
            Pbes2Cipher::Aes256Cbc => 32,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Pbes2Cipher::Aes128Cbc => "AES-128-CBC",
            Pbes2Cipher::Aes192Cbc => "AES-192-CBC",
            Pbes2Cipher::Aes256Cbc => "AES-256-CBC",
        }
    }
}

/// Encode a password as BMP (UTF-16BE) with two trailing zero bytes, per PKCS#12.
pub(crate) fn password_to_bmp(password: &str) -> Zeroizing<Vec<u8>> {
    if password.is_empty() {
        return Zeroizing::new(Vec::new());
    }
    let mut bmp = Zeroizing::new(Vec::with_capacity(password.len() * 2 + 2));
    for c in password.encode_utf16() {
        bmp.push((c >> 8) as u8);
        bmp.push(c as u8);
    }
    bmp.push(0);
    bmp.push(0);
    bmp
}

/// PKCS#12 KDF (RFC 7292 Appendix B.2).
///
/// `v` is the digest block size in bytes (64 for SHA-1/SHA-256, 128 for
/// SHA-384/SHA-512). `password` must already be BMP-encoded.
fn pkcs12_kdf<D>(
    id: u8,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    output_len: usize,
    v: usize,
) -> Zeroizing<Vec<u8>>
where
    D: Digest + FixedOutputReset,
{
    let u = <D as Digest>::output_size();
    let d_block = vec![id; v];

    let s = extend_to_multiple(salt, v);
    let p = extend_to_multiple(password, v);

    let mut i_block = Zeroizing::new(Vec::with_capacity(s.len() + p.len()));
    i_block.extend_from_slice(&s);
    i_block.extend_from_slice(&p);

    let num_blocks = output_len.div_ceil(u);
    let mut result = Zeroizing::new(Vec::with_capacity(num_blocks * u));

    for block_idx in 0..num_blocks {
        // A = H^c(D || I)
        let mut hasher = D::new();
        Digest::update(&mut hasher, &d_block);
        Digest::update(&mut hasher, i_block.as_slice());
        let mut a = Digest::finalize_reset(&mut hasher);

        for _ in 1..iterations {
            Digest::update(&mut hasher, &a);
            a = Digest::finalize_reset(&mut hasher);
        }

        result.extend_from_slice(&a);

        if block_idx + 1 < num_blocks {
            let b = extend_to_multiple(&a, v);
            for j in 0..(i_block.len() / v) {
                add_one_plus_b(&mut i_block[j * v..(j + 1) * v], &b);
            }
        }
    }

    result.truncate(output_len);
    result
}

/// Repeat `data` to fill a multiple of `v` bytes. Empty stays empty.
fn extend_to_multiple(data: &[u8], v: usize) -> Zeroizing<Vec<u8>> {
    if data.is_empty() {
        return Zeroizing::new(Vec::new());
    }
    let len = data.len().div_ceil(v) * v;
    let mut out = Zeroizing::new(Vec::with_capacity(len));
    while out.len() < len {
        let take = (len - out.len()).min(data.len());
        out.extend_from_slice(&data[..take]);
    }
    out
}

/// (I_j + B + 1) mod 2^(v*8), in place.
fn add_one_plus_b(block: &mut [u8], b: &[u8]) {
    let mut carry: u16 = 1;
    for k in (0..block.len()).rev() {
        let sum = u16::from(block[k]) + u16::from(b[k]) + carry;
        block[k] = sum as u8;
        carry = sum >> 8;
    }
}

macro_rules! verify_mac_with {
    ($hash:ty, $v:expr, $bmp:expr, $salt:expr, $iterations:expr, $data:expr, $expected:expr) => {{
        let key = pkcs12_kdf::<$hash>(
            ID_MAC,
            $bmp,
            $salt,
            $iterations,
            <$hash as Digest>::output_size(),
            $v,
        );
        match Hmac::<$hash>::new_from_slice(&key) {
            Ok(mut mac) => {
                mac.update($data);
                mac.verify_slice($expected).is_ok()
            }
            Err(_) => false,
        }
    }};
}

impl MacDigest {
    /// Recompute the integrity MAC over `data` and compare in constant time.
    pub(crate) fn verify(
        self,
        bmp_password: &[u8],
        salt: &[u8],
        iterations: u32,
        data: &[u8],
        expected: &[u8],
    ) -> bool {
        match self {
            MacDigest::Sha1 => {
                verify_mac_with!(Sha1, 64, bmp_password, salt, iterations, data, expected)
            }
            MacDigest::Sha256 => {
                verify_mac_with!(Sha256, 64, bmp_password, salt, iterations, data, expected)
            }
            MacDigest::Sha384 => {
                verify_mac_with!(Sha384, 128, bmp_password, salt, iterations, data, expected)
            }
            MacDigest::Sha512 => {
                verify_mac_with!(Sha512, 128, bmp_password, salt, iterations, data, expected)
            }
        }
    }
}

/// Decrypt with pbeWithSHAAnd3-KeyTripleDES-CBC.
pub(crate) fn decrypt_pbe_sha1_3des(
    ciphertext: &[u8],
    bmp_password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<Vec<u8>>, DecryptionFailed> {
    let failed = || DecryptionFailed { cipher: "3DES-CBC" };

    let key = pkcs12_kdf::<Sha1>(ID_KEY, bmp_password, salt, iterations, 24, 64);
    let iv = pkcs12_kdf::<Sha1>(ID_IV, bmp_password, salt, iterations, 8, 64);

    let decryptor = Des3CbcDec::new_from_slices(&key, &iv).map_err(|_| failed())?;

    let mut buf = Zeroizing::new(ciphertext.to_vec());
    let len = decryptor
        .decrypt_padded_mut::<Pkcs7>(buf.as_mut_slice())
        .map_err(|_| failed())?
        .len();
    buf.truncate(len);
    Ok(buf)
}

/// Decrypt with PBES2: PBKDF2 over the UTF-8 password, then AES-CBC.
pub(crate) fn decrypt_pbes2(
    ciphertext: &[u8],
    password: &str,
    salt: &[u8],
    iterations: u32,
    prf: Prf,
    cipher: Pbes2Cipher,
    iv: &[u8],
) -> Result<Zeroizing<Vec<u8>>, DecryptionFailed> {
    let failed = || DecryptionFailed {
        cipher: cipher.name(),
    };

    let mut key = Zeroizing::new(vec![0u8; cipher.key_len()]);
    let password = password.as_bytes();
    match prf {
        Prf::HmacSha1 => pbkdf2::pbkdf2_hmac::<Sha1>(password, salt, iterations, &mut key),
        Prf::HmacSha224 => pbkdf2::pbkdf2_hmac::<Sha224>(password, salt, iterations, &mut key),
        Prf::HmacSha256 => pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key),
        Prf::HmacSha384 => pbkdf2::pbkdf2_hmac::<Sha384>(password, salt, iterations, &mut key),
        Prf::HmacSha512 => pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut key),
    }

    let mut buf = Zeroizing::new(ciphertext.to_vec());
    let len = match cipher {
        Pbes2Cipher::Aes128Cbc => Aes128CbcDec::new_from_slices(&key, iv)
            .map_err(|_| failed())?
            .decrypt_padded_mut::<Pkcs7>(buf.as_mut_slice())
            .map_err(|_| failed())?
            .len(),
        Pbes2Cipher::Aes192Cbc => Aes192CbcDec::new_from_slices(&key, iv)
            .map_err(|_| failed())?
            .decrypt_padded_mut::<Pkcs7>(buf.as_mut_slice())
            .map_err(|_| failed())?
            .len(),
        Pbes2Cipher::Aes256Cbc => Aes256CbcDec::new_from_slices(&key, iv)
            .map_err(|_| failed())?
            .decrypt_padded_mut::<Pkcs7>(buf.as_mut_slice())
            .map_err(|_| failed())?
            .len(),
    };
    buf.truncate(len);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kdf_is_deterministic_and_id_separated() {
        let password = password_to_bmp("test");
        let salt = b"saltsalt";
        let key = pkcs12_kdf::<Sha1>(ID_KEY, &password, salt, 2048, 24, 64);
        assert_eq!(key.len(), 24);

        let again = pkcs12_kdf::<Sha1>(ID_KEY, &password, salt, 2048, 24, 64);
        assert_eq!(key, again);

        let iv = pkcs12_kdf::<Sha1>(ID_IV, &password, salt, 2048, 8, 64);
        assert_eq!(iv.len(), 8);
        assert_ne!(&key[..8], &iv[..]);
    }

    #[test]
    fn kdf_output_spans_multiple_digest_blocks() {
        let password = password_to_bmp("test");
        let long = pkcs12_kdf::<Sha256>(ID_KEY, &password, b"salt", 3, 80, 64);
        assert_eq!(long.len(), 80);
        let short = pkcs12_kdf::<Sha256>(ID_KEY, &password, b"salt", 3, 32, 64);
        assert_eq!(&long[..32], &short[..]);

        let wide = pkcs12_kdf::<Sha512>(ID_MAC, &password, b"salt", 1, 64, 128);
        assert_eq!(wide.len(), 64);
    }

    #[test]
    fn bmp_encoding_appends_terminator() {
        assert!(password_to_bmp("").is_empty());
        assert_eq!(password_to_bmp("A").as_slice(), &[0x00, 0x41, 0x00, 0x00]);
        assert_eq!(
            password_to_bmp("ab").as_slice(),
            &[0x00, 0x61, 0x00, 0x62, 0x00, 0x00]
        );
        // Non-ASCII goes through UTF-16.
        assert_eq!(password_to_bmp("é").as_slice(), &[0x00, 0xE9, 0x00, 0x00]);
    }

    #[test]
    fn carry_propagates_across_bytes() {
        let mut block = [0x00, 0xFF, 0xFF];
        add_one_plus_b(&mut block, &[0x00, 0x00, 0x00]);
        assert_eq!(block, [0x01, 0x00, 0x00]);
    }

    #[test]
    fn mac_rejects_wrong_digest_value() {
        let bmp = password_to_bmp("changeit");
        assert!(!MacDigest::Sha256.verify(&bmp, b"salt", 1, b"data", &[0u8; 32]));
    }

    #[test]
    fn truncated_ciphertext_fails_cleanly() {
        let err = decrypt_pbes2(
            &[1, 2, 3],
            "changeit",
            b"salt",
            1,
            Prf::HmacSha256,
            Pbes2Cipher::Aes256Cbc,
            &[0u8; 16],
        )
        .unwrap_err();
        assert_eq!(err.cipher, "AES-256-CBC");
    }
}
