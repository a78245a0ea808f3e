use chia_bls::{
    master_to_wallet_hardened_intermediate, master_to_wallet_unhardened_intermediate,
    DerivableKey, PublicKey, SecretKey,
};

use crate::error::{Result, WalletError};

/// A master key that may or may not carry private material. Watch-only
/// wallets hold the public half and can only derive unhardened children.
#[derive(Clone, PartialEq, Eq)]
pub enum MasterKey {
    Public(PublicKey),
    Secret(SecretKey),
}

impl MasterKey {
    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Public(pk) => *pk,
            Self::Secret(sk) => sk.public_key(),
        }
    }

    pub fn secret_key(&self) -> Option<&SecretKey> {
        match self {
            Self::Public(_) => None,
            Self::Secret(sk) => Some(sk),
        }
    }
}

impl From<SecretKey> for MasterKey {
    fn from(sk: SecretKey) -> Self {
        Self::Secret(sk)
    }
}

impl From<PublicKey> for MasterKey {
    fn from(pk: PublicKey) -> Self {
        Self::Public(pk)
    }
}

/// Derive the intermediate secret key under the fixed wallet path
/// (purpose 12381, coin type 8444, wallet type 2).
pub fn intermediate_secret_key(master: &SecretKey, hardened: bool) -> SecretKey {
    if hardened {
        master_to_wallet_hardened_intermediate(master)
    } else {
        master_to_wallet_unhardened_intermediate(master)
    }
}

/// Derive the intermediate public key under the fixed wallet path. Only the
/// unhardened path exists for public material.
pub fn intermediate_public_key(master: &PublicKey) -> PublicKey {
    master_to_wallet_unhardened_intermediate(master)
}

/// Derive the key pair at `index` below an intermediate secret key.
pub fn secret_key_at_index(intermediate: &SecretKey, index: u32, hardened: bool) -> SecretKey {
    if hardened {
        intermediate.derive_hardened(index)
    } else {
        intermediate.derive_unhardened(index)
    }
}

/// Derive the public key at `index` below an intermediate public key.
/// Hardened indices cannot be reached from public material.
pub fn public_key_at_index(
    intermediate: &PublicKey,
    index: u32,
    hardened: bool,
) -> Result<PublicKey> {
    if hardened {
        return Err(WalletError::HardenedDerivation);
    }
    Ok(intermediate.derive_unhardened(index))
}
