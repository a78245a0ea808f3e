use chia_bls::PublicKey;
use chia_puzzles::P2_DELEGATED_PUZZLE_OR_HIDDEN_PUZZLE_HASH;
use clvm_traits::{clvm_quote, FromClvm, ToClvm};
use clvm_utils::{CurriedProgram, ToTreeHash, TreeHash};
use hex_literal::hex;

/// Curry arguments of the standard transaction puzzle. The only argument is
/// the synthetic key, which commits to both the original key and the hidden
/// puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToClvm, FromClvm)]
#[clvm(curry)]
pub struct StandardArgs {
    pub synthetic_key: PublicKey,
}

impl StandardArgs {
    pub fn new(synthetic_key: PublicKey) -> Self {
        Self { synthetic_key }
    }

    pub fn curry_tree_hash(synthetic_key: PublicKey) -> TreeHash {
        CurriedProgram {
            program: TreeHash::new(P2_DELEGATED_PUZZLE_OR_HIDDEN_PUZZLE_HASH),
            args: StandardArgs::new(synthetic_key),
        }
        .tree_hash()
    }
}

/// Solution of the standard transaction puzzle.
///
/// Spending through the synthetic key leaves `original_public_key` empty and
/// supplies a delegated puzzle; revealing the hidden puzzle supplies the
/// original key instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToClvm, FromClvm)]
#[clvm(list)]
pub struct StandardSolution<P, S> {
    pub original_public_key: Option<PublicKey>,
    pub delegated_puzzle: P,
    pub solution: S,
}

impl<T> StandardSolution<(u8, T), ()> {
    /// Output the provided condition list directly, without using the hidden
    /// puzzle.
    pub fn from_conditions(conditions: T) -> Self {
        Self {
            original_public_key: None,
            delegated_puzzle: clvm_quote!(conditions),
            solution: (),
        }
    }
}

/// The serialized default hidden puzzle, `(=)`, which cannot be satisfied.
pub const DEFAULT_HIDDEN_PUZZLE: [u8; 3] = hex!("ff0980");

/// The puzzle hash of [`DEFAULT_HIDDEN_PUZZLE`].
pub const DEFAULT_HIDDEN_PUZZLE_HASH: [u8; 32] = hex!(
    "
    711d6c4e32c92e53179b199484cf8c897542bc57f2b22582799f9d657eec4699
    "
);

#[cfg(test)]
mod tests {
    use super::*;

    use chia_puzzles::P2_DELEGATED_PUZZLE_OR_HIDDEN_PUZZLE;
    use clvm_utils::tree_hash;
    use clvmr::{serde::node_from_bytes, Allocator};

    #[test]
    fn default_hidden_puzzle_hash() {
        assert_eq!(
            clvm_utils::tree_hash_from_bytes(&DEFAULT_HIDDEN_PUZZLE)
                .unwrap()
                .to_bytes(),
            DEFAULT_HIDDEN_PUZZLE_HASH
        );
    }

    #[test]
    fn curry_tree_hash_matches_allocation() {
        let synthetic_key = PublicKey::default();

        let mut a = Allocator::new();
        let mod_ptr = node_from_bytes(&mut a, &P2_DELEGATED_PUZZLE_OR_HIDDEN_PUZZLE).unwrap();

        let curried_ptr = CurriedProgram {
            program: mod_ptr,
            args: StandardArgs::new(synthetic_key),
        }
        .to_clvm(&mut a)
        .unwrap();

        assert_eq!(
            tree_hash(&a, curried_ptr),
            StandardArgs::curry_tree_hash(synthetic_key)
        );
    }
}
