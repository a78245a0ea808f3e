use chia_bls::PublicKey;
use clvm_traits::FromClvm;
use clvmr::allocator::{Allocator, NodePtr, SExp};
use clvmr::cost::Cost;

use crate::error::{Result, WalletError};

/// Signature over a bare message.
pub const AGG_SIG_UNSAFE: u8 = 49;
/// Signature over a message suffixed with the coin id and network tag.
pub const AGG_SIG_ME: u8 = 50;
/// Creates a child coin.
pub const CREATE_COIN: u8 = 51;

/// The create-coin amount that marks the TAIL-reveal bookkeeping condition
/// emitted during issuance and melting. Such conditions carry no value and
/// are excluded when summing a spend's output amounts.
pub const MELT_SENTINEL: i64 = -113;

/// The largest message an aggregated-signature condition may carry.
pub const MAX_AGG_SIG_MESSAGE: usize = 1024;

/// Cost budget for executing a single puzzle during assembly or signing.
pub const MAX_COST: Cost = 11_000_000_000;

/// A signing obligation extracted from executed puzzle output.
#[derive(Debug, Clone, PartialEq)]
pub struct AggSigCondition {
    pub opcode: u8,
    pub public_key: PublicKey,
    pub message: Vec<u8>,
}

fn opcode(a: &Allocator, node: NodePtr) -> Option<u8> {
    match a.sexp(node) {
        SExp::Atom => {
            let buf = a.atom(node);
            match buf.as_ref() {
                [op] => Some(*op),
                _ => None,
            }
        }
        SExp::Pair(..) => None,
    }
}

/// Sum the amounts of all create-coin conditions in `conditions`, excluding
/// the [`MELT_SENTINEL`] bookkeeping amount. The filter deliberately checks
/// the amount alone, never the puzzle hash, for bit-compatibility with the
/// reference validator; conditions of any other shape are skipped, not
/// rejected.
pub fn created_amount(a: &Allocator, conditions: NodePtr) -> i64 {
    let mut total = 0;

    let mut conds = conditions;
    while let Some((c, tail)) = a.next(conds) {
        conds = tail;
        let SExp::Pair(op, rest) = a.sexp(c) else {
            continue;
        };
        if opcode(a, op) != Some(CREATE_COIN) {
            continue;
        }
        let Some((puzzle_hash, rest)) = a.next(rest) else {
            continue;
        };
        if matches!(a.sexp(puzzle_hash), SExp::Pair(..)) {
            continue;
        }
        let Some((amount, _)) = a.next(rest) else {
            continue;
        };
        let Ok(amount) = i64::from_clvm(a, amount) else {
            continue;
        };
        if amount == MELT_SENTINEL {
            continue;
        }
        total += amount;
    }

    total
}

/// Extract every aggregated-signature condition from executed puzzle
/// output. Conditions with the two signature opcodes must consist of
/// exactly an opcode, a 48-byte public key and a message of at most
/// [`MAX_AGG_SIG_MESSAGE`] bytes; anything else with those opcodes is an
/// error rather than a skip.
pub fn agg_sig_conditions(a: &Allocator, conditions: NodePtr) -> Result<Vec<AggSigCondition>> {
    let mut found = Vec::new();

    let mut conds = conditions;
    while let Some((c, tail)) = a.next(conds) {
        conds = tail;
        let SExp::Pair(op, rest) = a.sexp(c) else {
            continue;
        };
        let Some(op) = opcode(a, op) else {
            continue;
        };
        if op != AGG_SIG_UNSAFE && op != AGG_SIG_ME {
            continue;
        }
        let malformed = WalletError::MalformedCondition(op);

        let Some((pk_node, rest)) = a.next(rest) else {
            return Err(malformed);
        };
        let Some((msg_node, rest)) = a.next(rest) else {
            return Err(malformed);
        };
        if !matches!(a.sexp(rest), SExp::Atom) || a.atom_len(rest) != 0 {
            return Err(malformed);
        }

        let SExp::Atom = a.sexp(pk_node) else {
            return Err(malformed);
        };
        let pk_atom = a.atom(pk_node);
        let pk_bytes: [u8; 48] = pk_atom
            .as_ref()
            .try_into()
            .map_err(|_| malformed.clone())?;
        let public_key =
            PublicKey::from_bytes(&pk_bytes).map_err(|_| malformed.clone())?;

        let SExp::Atom = a.sexp(msg_node) else {
            return Err(malformed);
        };
        let msg_atom = a.atom(msg_node);
        if msg_atom.as_ref().len() > MAX_AGG_SIG_MESSAGE {
            return Err(malformed);
        }

        found.push(AggSigCondition {
            opcode: op,
            public_key,
            message: msg_atom.as_ref().to_vec(),
        });
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    use clvm_traits::{clvm_list, ToClvm};
    use verdant_protocol::{Bytes, Bytes32};

    #[test]
    fn sums_create_coin_amounts() {
        let mut a = Allocator::new();
        let conditions = clvm_list!(
            clvm_list!(CREATE_COIN, Bytes32::new([1; 32]), 1000),
            clvm_list!(CREATE_COIN, Bytes32::new([2; 32]), 2000),
            // a non-signature, non-create condition is ignored
            clvm_list!(80_u8, 5),
        )
        .to_clvm(&mut a)
        .unwrap();

        assert_eq!(created_amount(&a, conditions), 3000);
    }

    #[test]
    fn skips_melt_sentinel_regardless_of_puzzle_hash() {
        let mut a = Allocator::new();
        let conditions = clvm_list!(
            clvm_list!(CREATE_COIN, (), MELT_SENTINEL),
            clvm_list!(CREATE_COIN, Bytes32::new([7; 32]), MELT_SENTINEL),
            clvm_list!(CREATE_COIN, Bytes32::new([1; 32]), 500),
        )
        .to_clvm(&mut a)
        .unwrap();

        assert_eq!(created_amount(&a, conditions), 500);
    }

    #[test]
    fn skips_malformed_create_coin() {
        let mut a = Allocator::new();
        let conditions = clvm_list!(
            // bare atom instead of a condition list
            123_u8,
            // amount missing
            clvm_list!(CREATE_COIN, Bytes32::new([1; 32])),
            clvm_list!(CREATE_COIN, Bytes32::new([2; 32]), 42),
        )
        .to_clvm(&mut a)
        .unwrap();

        assert_eq!(created_amount(&a, conditions), 42);
    }

    #[test]
    fn extracts_agg_sig_conditions() {
        let mut a = Allocator::new();
        let pk = PublicKey::default();
        let conditions = clvm_list!(
            clvm_list!(AGG_SIG_ME, pk, Bytes::new(vec![1, 2, 3])),
            clvm_list!(CREATE_COIN, Bytes32::new([1; 32]), 1000),
            clvm_list!(AGG_SIG_UNSAFE, pk, Bytes::new(vec![4])),
        )
        .to_clvm(&mut a)
        .unwrap();

        let found = agg_sig_conditions(&a, conditions).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].opcode, AGG_SIG_ME);
        assert_eq!(found[0].message, vec![1, 2, 3]);
        assert_eq!(found[1].opcode, AGG_SIG_UNSAFE);
        assert_eq!(found[1].message, vec![4]);
    }

    #[test]
    fn rejects_extra_fields() {
        let mut a = Allocator::new();
        let pk = PublicKey::default();
        let conditions = clvm_list!(clvm_list!(
            AGG_SIG_ME,
            pk,
            Bytes::new(vec![1]),
            Bytes::new(vec![2])
        ))
        .to_clvm(&mut a)
        .unwrap();

        assert_eq!(
            agg_sig_conditions(&a, conditions),
            Err(WalletError::MalformedCondition(AGG_SIG_ME))
        );
    }

    #[test]
    fn rejects_short_public_key() {
        let mut a = Allocator::new();
        let conditions = clvm_list!(clvm_list!(
            AGG_SIG_UNSAFE,
            Bytes::new(vec![1; 47]),
            Bytes::new(vec![2])
        ))
        .to_clvm(&mut a)
        .unwrap();

        assert_eq!(
            agg_sig_conditions(&a, conditions),
            Err(WalletError::MalformedCondition(AGG_SIG_UNSAFE))
        );
    }

    #[test]
    fn rejects_oversized_message() {
        let mut a = Allocator::new();
        let pk = PublicKey::default();
        let conditions = clvm_list!(clvm_list!(
            AGG_SIG_ME,
            pk,
            Bytes::new(vec![0; MAX_AGG_SIG_MESSAGE + 1])
        ))
        .to_clvm(&mut a)
        .unwrap();

        assert_eq!(
            agg_sig_conditions(&a, conditions),
            Err(WalletError::MalformedCondition(AGG_SIG_ME))
        );
    }
}
