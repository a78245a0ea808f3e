use std::io::Cursor;

use chia_bls::Signature;
use chia_sha2::Sha256;
use chia_traits::Streamable;

use crate::bytes::Bytes32;
use crate::coin_spend::CoinSpend;

/// The atomic submission unit: an ordered list of coin spends plus one
/// aggregated signature over all of their signing obligations.
///
/// The signature field is the only part of the bundle that is ever extended
/// after assembly; incremental co-signing folds additional signatures into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendBundle {
    pub coin_spends: Vec<CoinSpend>,
    pub aggregated_signature: Signature,
}

impl SpendBundle {
    pub fn new(coin_spends: Vec<CoinSpend>, aggregated_signature: Signature) -> Self {
        Self {
            coin_spends,
            aggregated_signature,
        }
    }

    /// An empty bundle whose signature is the identity element, ready to be
    /// extended and signed.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Signature::default())
    }

    /// Concatenate coin spends in argument order and aggregate all of the
    /// signatures into one.
    pub fn aggregate(spend_bundles: &[SpendBundle]) -> SpendBundle {
        let mut coin_spends = Vec::<CoinSpend>::new();
        let mut aggregated_signature = Signature::default();
        for sb in spend_bundles {
            coin_spends.extend_from_slice(&sb.coin_spends[..]);
            aggregated_signature.aggregate(&sb.aggregated_signature);
        }
        SpendBundle {
            coin_spends,
            aggregated_signature,
        }
    }

    /// The canonical transaction id: the hash of the bundle's streamable
    /// encoding.
    pub fn name(&self) -> Bytes32 {
        self.hash().into()
    }
}

impl Streamable for SpendBundle {
    fn update_digest(&self, digest: &mut Sha256) {
        self.coin_spends.update_digest(digest);
        digest.update(self.aggregated_signature.to_bytes());
    }

    fn stream(&self, out: &mut Vec<u8>) -> chia_traits::Result<()> {
        self.coin_spends.stream(out)?;
        out.extend_from_slice(&self.aggregated_signature.to_bytes());
        Ok(())
    }

    fn parse<const TRUSTED: bool>(input: &mut Cursor<&[u8]>) -> chia_traits::Result<Self> {
        Ok(Self {
            coin_spends: Vec::<CoinSpend>::parse::<TRUSTED>(input)?,
            aggregated_signature: Signature::parse::<TRUSTED>(input)?,
        })
    }
}
