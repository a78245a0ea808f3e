use chia_bls::SecretKey;
use clvm_traits::ToClvm;
use clvm_utils::CurriedProgram;
use clvmr::serde::node_from_bytes;
use clvmr::Allocator;
use chia_puzzles::CAT_PUZZLE;
use verdant_protocol::{Bytes32, Program, SpendBundle};
use verdant_puzzles::{CatArgs, StandardArgs};

use crate::error::Result;
use crate::key_store::{KeyPair, KeyStore};
use crate::sign::{sign_spend_bundle, SignMode};
use crate::standard::standard_puzzle_reveal;

/// One implementation per coin type: how a derived key pair turns into a
/// puzzle, and how the keys sign an assembled bundle. A sync engine only
/// needs this surface; it never learns what kind of coin it is driving.
pub trait Wallet {
    /// The puzzle hash a coin of this type locks to for `key_pair`.
    fn puzzle_hash(&self, key_pair: &KeyPair) -> Bytes32;

    /// The full puzzle reveal for `key_pair`.
    fn puzzle(&self, a: &mut Allocator, key_pair: &KeyPair) -> Result<Program>;

    /// Sign whatever obligations the bundle's spends produce with the keys
    /// this wallet holds, extending the bundle's aggregate in place.
    fn sign_spend(&self, bundle: &mut SpendBundle, agg_sig_me_extra_data: Bytes32) -> Result<()>;
}

/// Every secret key a store can contribute to signing: the synthetic keys
/// its coins actually lock to, plus the raw derived keys and the master for
/// obligations that name them directly.
fn signing_keys(key_store: &KeyStore) -> Vec<SecretKey> {
    let mut keys = Vec::new();
    for key_pair in key_store.keys() {
        keys.extend(key_pair.synthetic_secret_key.clone());
    }
    keys.extend(key_store.secret_key().cloned());
    for key_pair in key_store.keys() {
        keys.extend(key_pair.secret_key.clone());
    }
    keys
}

/// The plain single-signature coin type.
pub struct StandardWallet {
    pub key_store: KeyStore,
}

impl StandardWallet {
    pub fn new(key_store: KeyStore) -> Self {
        Self { key_store }
    }
}

impl Wallet for StandardWallet {
    fn puzzle_hash(&self, key_pair: &KeyPair) -> Bytes32 {
        StandardArgs::curry_tree_hash(key_pair.synthetic_public_key).into()
    }

    fn puzzle(&self, a: &mut Allocator, key_pair: &KeyPair) -> Result<Program> {
        standard_puzzle_reveal(a, key_pair.synthetic_public_key)
    }

    fn sign_spend(&self, bundle: &mut SpendBundle, agg_sig_me_extra_data: Bytes32) -> Result<()> {
        sign_spend_bundle(
            bundle,
            &signing_keys(&self.key_store),
            agg_sig_me_extra_data,
            SignMode::Partial,
        )
    }
}

/// The asset-token coin type: the same standard puzzle, wrapped for one
/// asset id.
pub struct CatWallet {
    pub key_store: KeyStore,
    pub asset_id: Bytes32,
}

impl CatWallet {
    pub fn new(key_store: KeyStore, asset_id: Bytes32) -> Self {
        Self {
            key_store,
            asset_id,
        }
    }
}

impl Wallet for CatWallet {
    fn puzzle_hash(&self, key_pair: &KeyPair) -> Bytes32 {
        CatArgs::curry_tree_hash(
            self.asset_id,
            StandardArgs::curry_tree_hash(key_pair.synthetic_public_key),
        )
        .into()
    }

    fn puzzle(&self, a: &mut Allocator, key_pair: &KeyPair) -> Result<Program> {
        let inner = standard_puzzle_reveal(a, key_pair.synthetic_public_key)?;
        let mod_ptr =
            node_from_bytes(a, &CAT_PUZZLE).map_err(|_| chia_traits::Error::InvalidClvm)?;
        let inner_ptr = inner.to_node(a)?;
        let curried = CurriedProgram {
            program: mod_ptr,
            args: CatArgs::new(self.asset_id, inner_ptr),
        }
        .to_clvm(a)?;
        Ok(Program::from_node(a, curried)?)
    }

    fn sign_spend(&self, bundle: &mut SpendBundle, agg_sig_me_extra_data: Bytes32) -> Result<()> {
        sign_spend_bundle(
            bundle,
            &signing_keys(&self.key_store),
            agg_sig_me_extra_data,
            SignMode::Partial,
        )
    }
}
