use std::io::Cursor;

use chia_sha2::Sha256;
use chia_traits::Streamable;

use crate::coin::Coin;
use crate::program::Program;

/// An intent to consume a coin: the full puzzle reveal and the solution it is
/// run against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoinSpend {
    pub coin: Coin,
    pub puzzle_reveal: Program,
    pub solution: Program,
}

impl CoinSpend {
    pub fn new(coin: Coin, puzzle_reveal: Program, solution: Program) -> Self {
        Self {
            coin,
            puzzle_reveal,
            solution,
        }
    }
}

impl Streamable for CoinSpend {
    fn update_digest(&self, digest: &mut Sha256) {
        self.coin.update_digest(digest);
        self.puzzle_reveal.update_digest(digest);
        self.solution.update_digest(digest);
    }

    fn stream(&self, out: &mut Vec<u8>) -> chia_traits::Result<()> {
        self.coin.stream(out)?;
        self.puzzle_reveal.stream(out)?;
        self.solution.stream(out)
    }

    fn parse<const TRUSTED: bool>(input: &mut Cursor<&[u8]>) -> chia_traits::Result<Self> {
        Ok(Self {
            coin: Coin::parse::<TRUSTED>(input)?,
            puzzle_reveal: Program::parse::<TRUSTED>(input)?,
            solution: Program::parse::<TRUSTED>(input)?,
        })
    }
}
