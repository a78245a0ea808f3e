//! Transaction crafting for a coin-set ledger: hierarchical key derivation
//! with synthetic keys, asset-token ring spends, and signature aggregation
//! over executed puzzle output.
//!
//! Everything here is a pure function over the value types in
//! `verdant-protocol`; network access, coin selection and persistence belong
//! to the layers above.

pub use chia_bls as bls;

mod cat;
mod conditions;
mod error;
mod key_store;
mod keys;
mod sign;
mod standard;
mod wallet;

pub use cat::*;
pub use conditions::*;
pub use error::*;
pub use key_store::*;
pub use keys::*;
pub use sign::*;
pub use standard::*;
pub use wallet::*;
