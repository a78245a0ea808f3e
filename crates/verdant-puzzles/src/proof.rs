use clvm_traits::{ClvmDecoder, ClvmEncoder, FromClvm, FromClvmError, ToClvm, ToClvmError};
use verdant_protocol::Bytes32;

/// Proof that a coin descends from a coin of the same kind. For wrapped
/// coins, `inner_puzzle_hash` is the hash of the parent's puzzle with the
/// wrapper peeled off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToClvm, FromClvm)]
#[clvm(list)]
pub struct LineageProof {
    pub parent_parent_coin_info: Bytes32,
    pub parent_inner_puzzle_hash: Bytes32,
    pub parent_amount: u64,
}

/// Proof for an eve coin, which has no wrapped parent to point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToClvm, FromClvm)]
#[clvm(list)]
pub struct EveProof {
    pub parent_parent_coin_info: Bytes32,
    pub parent_amount: u64,
}

/// Either kind of proof; decodes by shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proof {
    Lineage(LineageProof),
    Eve(EveProof),
}

impl<N, E: ClvmEncoder<Node = N>> ToClvm<E> for Proof {
    fn to_clvm(&self, encoder: &mut E) -> Result<N, ToClvmError> {
        match self {
            Self::Lineage(lineage_proof) => lineage_proof.to_clvm(encoder),
            Self::Eve(eve_proof) => eve_proof.to_clvm(encoder),
        }
    }
}

impl<N, D: ClvmDecoder<Node = N>> FromClvm<D> for Proof {
    fn from_clvm(decoder: &D, node: N) -> Result<Self, FromClvmError> {
        LineageProof::from_clvm(decoder, decoder.clone_node(&node))
            .map(Self::Lineage)
            .or_else(|_| EveProof::from_clvm(decoder, node).map(Self::Eve))
    }
}

/// A ring neighbor description inside an asset-coin solution: who created it
/// and what it looks like under the wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToClvm, FromClvm)]
#[clvm(list)]
pub struct CoinProof {
    pub parent_coin_info: Bytes32,
    pub inner_puzzle_hash: Bytes32,
    pub amount: u64,
}
