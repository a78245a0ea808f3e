use chia_bls::PublicKey;
use clvm_traits::{FromClvmError, ToClvmError};
use clvmr::error::EvalErr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WalletError {
    #[error("hardened derivation requires a secret key")]
    HardenedDerivation,

    #[error("ring contains no coins")]
    EmptyRing,

    #[error("ring spans more than one asset id")]
    MixedAssetIds,

    #[error("malformed signature condition with opcode {0}")]
    MalformedCondition(u8),

    #[error("no secret key available for public key {0:?}")]
    MissingKey(PublicKey),

    #[error("puzzle reveal does not match the expected template")]
    Uncurry,

    #[error("puzzle execution failed: {0}")]
    Eval(String),

    #[error(transparent)]
    Protocol(#[from] chia_traits::Error),

    #[error("clvm encoding failed: {0}")]
    ToClvm(#[from] ToClvmError),

    #[error("clvm decoding failed: {0}")]
    FromClvm(#[from] FromClvmError),
}

impl From<EvalErr> for WalletError {
    fn from(err: EvalErr) -> Self {
        Self::Eval(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;
