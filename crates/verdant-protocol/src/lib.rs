//! Value types shared by every layer of the wallet: byte strings, serialized
//! CLVM programs, coins, coin spends and spend bundles, together with the
//! ledger's canonical streamable encoding of each.

mod bytes;
mod coin;
mod coin_spend;
mod program;
mod spend_bundle;

pub use bytes::{Bytes, Bytes32, Bytes48, Bytes96, BytesImpl};
pub use coin::Coin;
pub use coin_spend::CoinSpend;
pub use program::Program;
pub use spend_bundle::SpendBundle;
