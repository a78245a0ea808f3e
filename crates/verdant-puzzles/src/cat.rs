use chia_bls::PublicKey;
use chia_puzzles::{
    CAT_PUZZLE_HASH, DELEGATED_TAIL_HASH, EVERYTHING_WITH_SIGNATURE_HASH,
    GENESIS_BY_COIN_ID_HASH,
};
use clvm_traits::{FromClvm, ToClvm};
use clvm_utils::{CurriedProgram, ToTreeHash, TreeHash};
use verdant_protocol::{Bytes32, Coin};

use crate::proof::{CoinProof, LineageProof};

/// Curry arguments of the asset-token wrapper. `asset_id` is the tree hash
/// of the TAIL program that authorizes issuance and melting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToClvm, FromClvm)]
#[clvm(curry)]
pub struct CatArgs<I> {
    pub mod_hash: Bytes32,
    pub asset_id: Bytes32,
    pub inner_puzzle: I,
}

impl<I> CatArgs<I> {
    pub fn new(asset_id: Bytes32, inner_puzzle: I) -> Self {
        Self {
            mod_hash: CAT_PUZZLE_HASH.into(),
            asset_id,
            inner_puzzle,
        }
    }
}

impl CatArgs<TreeHash> {
    pub fn curry_tree_hash(asset_id: Bytes32, inner_puzzle: TreeHash) -> TreeHash {
        CurriedProgram {
            program: TreeHash::new(CAT_PUZZLE_HASH),
            args: CatArgs::new(asset_id, inner_puzzle),
        }
        .tree_hash()
    }
}

/// Solution of the asset-token wrapper. Every field after the inner solution
/// exists to let the wrapper check its ring neighbors and the running
/// subtotal of the whole spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToClvm, FromClvm)]
#[clvm(list)]
pub struct CatSolution<I> {
    pub inner_puzzle_solution: I,
    pub lineage_proof: Option<LineageProof>,
    pub prev_coin_id: Bytes32,
    pub this_coin_info: Coin,
    pub next_coin_proof: CoinProof,
    pub prev_subtotal: i64,
    pub extra_delta: i64,
}

/// TAIL that restricts issuance to spending one specific genesis coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToClvm, FromClvm)]
#[clvm(curry)]
pub struct GenesisByCoinIdTailArgs {
    pub genesis_coin_id: Bytes32,
}

impl GenesisByCoinIdTailArgs {
    pub fn new(genesis_coin_id: Bytes32) -> Self {
        Self { genesis_coin_id }
    }

    pub fn curry_tree_hash(genesis_coin_id: Bytes32) -> TreeHash {
        CurriedProgram {
            program: TreeHash::new(GENESIS_BY_COIN_ID_HASH),
            args: GenesisByCoinIdTailArgs::new(genesis_coin_id),
        }
        .tree_hash()
    }
}

/// TAIL that allows any issuance or melt signed by the curried key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToClvm, FromClvm)]
#[clvm(curry)]
pub struct EverythingWithSignatureTailArgs {
    pub public_key: PublicKey,
}

impl EverythingWithSignatureTailArgs {
    pub fn new(public_key: PublicKey) -> Self {
        Self { public_key }
    }

    pub fn curry_tree_hash(public_key: PublicKey) -> TreeHash {
        CurriedProgram {
            program: TreeHash::new(EVERYTHING_WITH_SIGNATURE_HASH),
            args: EverythingWithSignatureTailArgs::new(public_key),
        }
        .tree_hash()
    }
}

/// TAIL that defers the issuance rules to a signed delegated puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToClvm, FromClvm)]
#[clvm(curry)]
pub struct DelegatedTailArgs {
    pub public_key: PublicKey,
}

impl DelegatedTailArgs {
    pub fn new(public_key: PublicKey) -> Self {
        Self { public_key }
    }

    pub fn curry_tree_hash(public_key: PublicKey) -> TreeHash {
        CurriedProgram {
            program: TreeHash::new(DELEGATED_TAIL_HASH),
            args: DelegatedTailArgs::new(public_key),
        }
        .tree_hash()
    }
}
