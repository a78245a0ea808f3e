use chia_bls::{PublicKey, SecretKey};
use chia_sha2::Sha256;
use hex_literal::hex;
use num_bigint::BigInt;

use crate::standard::DEFAULT_HIDDEN_PUZZLE_HASH;

/// The order of the BLS12-381 prime-order subgroup.
const GROUP_ORDER_BYTES: [u8; 32] =
    hex!("73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001");

/// The scalar offset a synthetic key adds to the original key: the domain
/// hash of (public key ‖ hidden puzzle hash), reduced into the group.
pub fn synthetic_offset(public_key: &PublicKey, hidden_puzzle_hash: &[u8; 32]) -> SecretKey {
    let mut hasher = Sha256::new();
    hasher.update(public_key.to_bytes());
    hasher.update(hidden_puzzle_hash);
    let bytes: [u8; 32] = hasher.finalize();
    SecretKey::from_bytes(&mod_by_group_order(bytes)).unwrap()
}

/// Offset a public key by the synthetic offset's point, binding it to
/// `hidden_puzzle_hash` without access to any private material.
pub fn synthetic_public_key(public_key: &PublicKey, hidden_puzzle_hash: &[u8; 32]) -> PublicKey {
    public_key + &synthetic_offset(public_key, hidden_puzzle_hash).public_key()
}

/// Offset a secret key by the synthetic offset scalar. The corresponding
/// public key equals [`synthetic_public_key`] of the original public key.
pub fn synthetic_secret_key(secret_key: &SecretKey, hidden_puzzle_hash: &[u8; 32]) -> SecretKey {
    secret_key + &synthetic_offset(&secret_key.public_key(), hidden_puzzle_hash)
}

/// Derivation with the default hidden puzzle `(=)`, which has no solution
/// and therefore leaves the synthetic key as the only spend path.
pub trait DeriveSynthetic {
    #[must_use]
    fn derive_synthetic_hidden(&self, hidden_puzzle_hash: &[u8; 32]) -> Self;

    #[must_use]
    fn derive_synthetic(&self) -> Self
    where
        Self: Sized,
    {
        self.derive_synthetic_hidden(&DEFAULT_HIDDEN_PUZZLE_HASH)
    }
}

impl DeriveSynthetic for PublicKey {
    fn derive_synthetic_hidden(&self, hidden_puzzle_hash: &[u8; 32]) -> Self {
        synthetic_public_key(self, hidden_puzzle_hash)
    }
}

impl DeriveSynthetic for SecretKey {
    fn derive_synthetic_hidden(&self, hidden_puzzle_hash: &[u8; 32]) -> Self {
        synthetic_secret_key(self, hidden_puzzle_hash)
    }
}

fn mod_by_group_order(bytes: [u8; 32]) -> [u8; 32] {
    let value = BigInt::from_signed_bytes_be(bytes.as_slice());
    let group_order = BigInt::from_signed_bytes_be(&GROUP_ORDER_BYTES);
    let modulo = ((value % &group_order) + &group_order) % &group_order;
    let mut byte_vec = modulo.to_bytes_be().1;
    if byte_vec.len() < 32 {
        let pad = vec![0; 32 - byte_vec.len()];
        byte_vec.splice(0..0, pad);
    }
    byte_vec.try_into().unwrap()
}
