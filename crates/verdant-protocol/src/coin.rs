use std::io::Cursor;

use chia_sha2::Sha256;
use chia_traits::Streamable;
use clvm_traits::{
    clvm_list, destructure_list, match_list, ClvmDecoder, ClvmEncoder, FromClvm, FromClvmError,
    ToClvm, ToClvmError,
};

use crate::bytes::{Bytes32, BytesImpl};

/// A ledger coin. Its identity is the hash of the three fields, with the
/// amount in the canonical minimal encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coin {
    pub parent_coin_info: Bytes32,
    pub puzzle_hash: Bytes32,
    pub amount: u64,
}

impl Coin {
    pub fn new(parent_coin_info: Bytes32, puzzle_hash: Bytes32, amount: u64) -> Self {
        Self {
            parent_coin_info,
            puzzle_hash,
            amount,
        }
    }

    pub fn coin_id(&self) -> Bytes32 {
        let mut hasher = Sha256::new();
        hasher.update(self.parent_coin_info);
        hasher.update(self.puzzle_hash);

        let amount_bytes = self.amount.to_be_bytes();
        if self.amount >= 0x8000_0000_0000_0000_u64 {
            hasher.update([0_u8]);
            hasher.update(amount_bytes);
        } else {
            let start = match self.amount {
                n if n >= 0x0080_0000_0000_0000_u64 => 0,
                n if n >= 0x8000_0000_0000_u64 => 1,
                n if n >= 0x0080_0000_0000_u64 => 2,
                n if n >= 0x8000_0000_u64 => 3,
                n if n >= 0x0080_0000_u64 => 4,
                n if n >= 0x8000_u64 => 5,
                n if n >= 0x80_u64 => 6,
                n if n > 0 => 7,
                _ => 8,
            };
            hasher.update(&amount_bytes[start..]);
        }

        Bytes32::new(hasher.finalize())
    }
}

impl Streamable for Coin {
    fn update_digest(&self, digest: &mut Sha256) {
        self.parent_coin_info.update_digest(digest);
        self.puzzle_hash.update_digest(digest);
        self.amount.update_digest(digest);
    }

    fn stream(&self, out: &mut Vec<u8>) -> chia_traits::Result<()> {
        self.parent_coin_info.stream(out)?;
        self.puzzle_hash.stream(out)?;
        self.amount.stream(out)
    }

    fn parse<const TRUSTED: bool>(input: &mut Cursor<&[u8]>) -> chia_traits::Result<Self> {
        Ok(Self {
            parent_coin_info: Bytes32::parse::<TRUSTED>(input)?,
            puzzle_hash: Bytes32::parse::<TRUSTED>(input)?,
            amount: u64::parse::<TRUSTED>(input)?,
        })
    }
}

impl<N, E: ClvmEncoder<Node = N>> ToClvm<E> for Coin {
    fn to_clvm(&self, encoder: &mut E) -> Result<N, ToClvmError> {
        clvm_list!(self.parent_coin_info, self.puzzle_hash, self.amount).to_clvm(encoder)
    }
}

impl<N, D: ClvmDecoder<Node = N>> FromClvm<D> for Coin {
    fn from_clvm(decoder: &D, node: N) -> Result<Self, FromClvmError> {
        let destructure_list!(parent_coin_info, puzzle_hash, amount) =
            <match_list!(BytesImpl<32>, BytesImpl<32>, u64)>::from_clvm(decoder, node)?;
        Ok(Coin {
            parent_coin_info,
            puzzle_hash,
            amount,
        })
    }
}
