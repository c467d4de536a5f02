//! Password-based file encryption using PBKDF2 + AES-CBC
//!
//! This module implements the single-file cipher primitive that the batch
//! orchestrator drives through the [`Cipher`] trait:
//! - PBKDF2-HMAC (sha1, sha256 or sha512) derives `keylen` bytes of key
//!   material from the password, salt and iteration count
//! - AES-CBC with PKCS#7 padding encrypts the file contents
//! - HMAC-SHA256 authenticates the ciphertext
//!
//! The key material is split as:
//! - encryption key: 16, 24 or 32 bytes depending on the algorithm
//! - IV: 16 bytes
//! - MAC key: 32 bytes
//!
//! The IV is part of the derived key material, not random per file. Every
//! file encrypted with the same password, salt and parameters shares one key
//! and IV, so encryption is deterministic and files that begin with the same
//! blocks produce the same leading ciphertext blocks. Use a distinct salt to
//! separate batches.
//!
//! The ciphertext file format is:
//! - AES-CBC ciphertext: variable length, a multiple of 16 bytes
//! - tag: 32 bytes of HMAC-SHA256 over the ciphertext

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{CipherError, Result};
use crate::file_ops;
use crate::options::CipherOptions;

/// Names accepted for `algorithm`
pub const ALGORITHMS: &[&str] = &["aes-128-cbc", "aes-192-cbc", "aes-256-cbc"];

/// Names accepted for `digest`
pub const DIGESTS: &[&str] = &["sha1", "sha256", "sha512"];

/// Length of the CBC initialization vector in bytes
const IV_LEN: usize = 16;

/// Length of the HMAC key in bytes
const MAC_KEY_LEN: usize = 32;

/// Length of the HMAC-SHA256 tag in bytes
const TAG_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Synchronous single-file encrypt/decrypt contract
///
/// `encode` reads plaintext from `options.input` and writes ciphertext to
/// `options.output`; `decode` does the reverse.
pub trait Cipher {
    fn encode(&self, options: &CipherOptions) -> Result<()>;
    fn decode(&self, options: &CipherOptions) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Algorithm {
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
}

impl Algorithm {
    fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "aes-128-cbc" => Ok(Self::Aes128Cbc),
            "aes-192-cbc" => Ok(Self::Aes192Cbc),
            "aes-256-cbc" => Ok(Self::Aes256Cbc),
            _ => Err(CipherError::BadAlgorithm {
                algorithm: name.to_owned(),
            }),
        }
    }

    fn key_len(self) -> usize {
        match self {
            Self::Aes128Cbc => 16,
            Self::Aes192Cbc => 24,
            Self::Aes256Cbc => 32,
        }
    }

    fn encrypt(self, key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Aes128Cbc => cbc_encrypt::<cbc::Encryptor<Aes128>>(key, iv, plaintext),
            Self::Aes192Cbc => cbc_encrypt::<cbc::Encryptor<Aes192>>(key, iv, plaintext),
            Self::Aes256Cbc => cbc_encrypt::<cbc::Encryptor<Aes256>>(key, iv, plaintext),
        }
    }

    fn decrypt(self, key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Aes128Cbc => cbc_decrypt::<cbc::Decryptor<Aes128>>(key, iv, ciphertext),
            Self::Aes192Cbc => cbc_decrypt::<cbc::Decryptor<Aes192>>(key, iv, ciphertext),
            Self::Aes256Cbc => cbc_decrypt::<cbc::Decryptor<Aes256>>(key, iv, ciphertext),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Digest {
    Sha1,
    Sha256,
    Sha512,
}

impl Digest {
    fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(CipherError::BadDigest {
                digest: name.to_owned(),
            }),
        }
    }
}

fn cbc_encrypt<E: KeyIvInit + BlockEncryptMut>(
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let encryptor = E::new_from_slices(key, iv)
        .map_err(|_| CipherError::unknown("invalid key or IV length"))?;
    Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn cbc_decrypt<D: KeyIvInit + BlockDecryptMut>(
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let decryptor = D::new_from_slices(key, iv)
        .map_err(|_| CipherError::unknown("invalid key or IV length"))?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::BadDecrypt)
}

/// Key material split into its three parts
struct KeySchedule {
    material: Zeroizing<Vec<u8>>,
    key_len: usize,
}

impl KeySchedule {
    fn enc_key(&self) -> &[u8] {
        &self.material[..self.key_len]
    }

    fn iv(&self) -> &[u8] {
        &self.material[self.key_len..self.key_len + IV_LEN]
    }

    fn mac_key(&self) -> &[u8] {
        &self.material[self.key_len + IV_LEN..self.key_len + IV_LEN + MAC_KEY_LEN]
    }
}

/// Derive `options.keylen` bytes of key material with PBKDF2
fn derive_keys(options: &CipherOptions, algorithm: Algorithm) -> Result<KeySchedule> {
    let digest = Digest::parse(&options.digest)?;

    if options.iterations == 0 {
        return Err(CipherError::unknown("iterations must be greater than zero"));
    }

    let needed = algorithm.key_len() + IV_LEN + MAC_KEY_LEN;
    if options.keylen < needed {
        return Err(CipherError::unknown(format!(
            "keylen {} is too short for {}; at least {} bytes are required",
            options.keylen, options.algorithm, needed
        )));
    }

    let password = options.password.as_bytes();
    let salt = options.salt.as_bytes();
    let mut material = Zeroizing::new(vec![0u8; options.keylen]);
    match digest {
        Digest::Sha1 => pbkdf2_hmac::<Sha1>(password, salt, options.iterations, &mut material),
        Digest::Sha256 => pbkdf2_hmac::<Sha256>(password, salt, options.iterations, &mut material),
        Digest::Sha512 => pbkdf2_hmac::<Sha512>(password, salt, options.iterations, &mut material),
    }

    Ok(KeySchedule {
        material,
        key_len: algorithm.key_len(),
    })
}

fn mac(key: &[u8]) -> Result<HmacSha256> {
    <HmacSha256 as Mac>::new_from_slice(key).map_err(|_| CipherError::unknown("invalid MAC key"))
}

/// Encrypt plaintext under the parameters in `options`
///
/// Returns the binary format: ciphertext(variable) + tag(32)
pub fn encrypt(options: &CipherOptions, plaintext: &[u8]) -> Result<Vec<u8>> {
    let algorithm = Algorithm::parse(&options.algorithm)?;
    let keys = derive_keys(options, algorithm)?;

    let mut output = algorithm.encrypt(keys.enc_key(), keys.iv(), plaintext)?;
    let mut tag = mac(keys.mac_key())?;
    tag.update(&output);
    output.extend_from_slice(&tag.finalize().into_bytes());

    Ok(output)
}

/// Decrypt ciphertext under the parameters in `options`
///
/// Any authentication or padding failure is reported as `BadDecrypt`.
pub fn decrypt(options: &CipherOptions, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let algorithm = Algorithm::parse(&options.algorithm)?;
    let keys = derive_keys(options, algorithm)?;

    if ciphertext.len() < TAG_LEN {
        return Err(CipherError::BadDecrypt);
    }
    let (body, tag) = ciphertext.split_at(ciphertext.len() - TAG_LEN);

    let mut expected = mac(keys.mac_key())?;
    expected.update(body);
    expected
        .verify_slice(tag)
        .map_err(|_| CipherError::BadDecrypt)?;

    algorithm.decrypt(keys.enc_key(), keys.iv(), body)
}

/// [`Cipher`] backed by files on disk and the functions in this module
#[derive(Debug, Clone, Copy, Default)]
pub struct Pbkdf2Cipher;

impl Cipher for Pbkdf2Cipher {
    fn encode(&self, options: &CipherOptions) -> Result<()> {
        // Validate names before touching the filesystem.
        Algorithm::parse(&options.algorithm)?;
        Digest::parse(&options.digest)?;

        let plaintext = Zeroizing::new(file_ops::read_file(&options.input)?);
        let ciphertext = encrypt(options, &plaintext)?;
        file_ops::write_file_secure(&options.output, &ciphertext)?;
        debug!(
            input = %options.input.display(),
            output = %options.output.display(),
            bytes = ciphertext.len(),
            "encoded"
        );
        Ok(())
    }

    fn decode(&self, options: &CipherOptions) -> Result<()> {
        Algorithm::parse(&options.algorithm)?;
        Digest::parse(&options.digest)?;

        let ciphertext = file_ops::read_file(&options.input)?;
        let plaintext = Zeroizing::new(decrypt(options, &ciphertext)?);
        file_ops::write_file_secure(&options.output, &plaintext)?;
        debug!(
            input = %options.input.display(),
            output = %options.output.display(),
            bytes = plaintext.len(),
            "decoded"
        );
        Ok(())
    }
}
