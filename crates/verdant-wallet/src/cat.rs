use chia_puzzles::{CAT_PUZZLE, CAT_PUZZLE_HASH};
use clvm_traits::{clvm_list, clvm_quote, FromClvm, ToClvm};
use clvm_utils::{tree_hash, CurriedProgram};
use clvmr::allocator::NodePtr;
use clvmr::serde::node_from_bytes;
use clvmr::Allocator;
use verdant_protocol::{Bytes32, Coin, CoinSpend, Program};
use verdant_puzzles::{CatArgs, CatSolution, CoinProof, LineageProof};

use crate::conditions::{created_amount, CREATE_COIN, MAX_COST, MELT_SENTINEL};
use crate::error::{Result, WalletError};

/// An asset-token coin prepared for spending: the inner puzzle and solution
/// that drive it, plus everything the wrapper needs to verify its ancestry.
///
/// `extra_delta` shifts this coin's contribution to the ring total; anything
/// other than zero must be justified to the TAIL program or the spend is
/// rejected by the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendableCat {
    pub coin: Coin,
    pub asset_id: Bytes32,
    pub lineage_proof: Option<LineageProof>,
    pub inner_puzzle: Program,
    pub inner_solution: Program,
    pub extra_delta: i64,
}

impl SpendableCat {
    pub fn new(
        coin: Coin,
        asset_id: Bytes32,
        lineage_proof: LineageProof,
        inner_puzzle: Program,
        inner_solution: Program,
    ) -> Self {
        Self {
            coin,
            asset_id,
            lineage_proof: Some(lineage_proof),
            inner_puzzle,
            inner_solution,
            extra_delta: 0,
        }
    }

    /// The eve coin is the only one without a lineage proof.
    pub fn eve(
        coin: Coin,
        asset_id: Bytes32,
        inner_puzzle: Program,
        inner_solution: Program,
    ) -> Self {
        Self {
            coin,
            asset_id,
            lineage_proof: None,
            inner_puzzle,
            inner_solution,
            extra_delta: 0,
        }
    }

    pub fn with_extra_delta(mut self, extra_delta: i64) -> Self {
        self.extra_delta = extra_delta;
        self
    }

    /// Recover the asset id and lineage proof from the parent's coin spend.
    /// The parent's puzzle reveal must be the asset-token wrapper; anything
    /// else cannot prove this coin's ancestry.
    pub fn from_parent_spend(
        parent_spend: &CoinSpend,
        coin: Coin,
        inner_puzzle: Program,
        inner_solution: Program,
    ) -> Result<Self> {
        let mut a = Allocator::new();
        let parent_puzzle = parent_spend.puzzle_reveal.to_node(&mut a)?;

        let parent = CurriedProgram::<NodePtr, CatArgs<NodePtr>>::from_clvm(&a, parent_puzzle)
            .map_err(|_| WalletError::Uncurry)?;
        if tree_hash(&a, parent.program).to_bytes() != CAT_PUZZLE_HASH {
            return Err(WalletError::Uncurry);
        }

        let lineage_proof = LineageProof {
            parent_parent_coin_info: parent_spend.coin.parent_coin_info,
            parent_inner_puzzle_hash: tree_hash(&a, parent.args.inner_puzzle).into(),
            parent_amount: parent_spend.coin.amount,
        };

        Ok(Self {
            coin,
            asset_id: parent.args.asset_id,
            lineage_proof: Some(lineage_proof),
            inner_puzzle,
            inner_solution,
            extra_delta: 0,
        })
    }

    /// The full puzzle reveal: the asset-token wrapper curried around the
    /// inner puzzle.
    pub fn puzzle_reveal(&self, a: &mut Allocator) -> Result<Program> {
        let mod_ptr = node_from_bytes(a, &CAT_PUZZLE).map_err(|_| chia_traits::Error::InvalidClvm)?;
        let inner_ptr = self.inner_puzzle.to_node(a)?;
        let curried = CurriedProgram {
            program: mod_ptr,
            args: CatArgs::new(self.asset_id, inner_ptr),
        }
        .to_clvm(a)?;
        Ok(Program::from_node(a, curried)?)
    }

    pub fn puzzle_hash(&self) -> Result<Bytes32> {
        Ok(CatArgs::curry_tree_hash(self.asset_id, self.inner_puzzle.tree_hash()?).into())
    }
}

/// Each coin's change to the asset's circulating amount within this ring:
/// the sum of its created (non-sentinel) amounts minus the coin's own value
/// is implied later by the wrapper; here we only sum the outputs and
/// subtract the declared extra delta, exactly like the reference scanner.
pub fn spend_deltas(cats: &[SpendableCat]) -> Result<Vec<i64>> {
    let mut a = Allocator::new();
    let checkpoint = a.checkpoint();

    let mut deltas = Vec::with_capacity(cats.len());
    for cat in cats {
        a.restore_checkpoint(&checkpoint);
        let solution_ptr = cat.inner_solution.to_node(&mut a)?;
        let (_cost, output) = cat
            .inner_puzzle
            .run(&mut a, 0, MAX_COST, &solution_ptr)?;
        deltas.push(created_amount(&a, output) - cat.extra_delta);
    }
    Ok(deltas)
}

/// Running subtotals of the deltas, shifted so the smallest value is zero.
/// The wrapper only accepts non-negative subtotals.
pub fn ring_subtotals(deltas: &[i64]) -> Vec<i64> {
    let mut subtotal = 0;
    let mut subtotals = Vec::with_capacity(deltas.len());
    for delta in deltas {
        subtotals.push(subtotal);
        subtotal += delta;
    }

    let offset = subtotals.iter().copied().min().unwrap_or(0);
    for value in &mut subtotals {
        *value -= offset;
    }
    subtotals
}

/// Produce one coin spend per input such that the whole set validates as a
/// single ring. Input order defines adjacency: coin `i` commits to the ids
/// of coins `i - 1` and `i + 1` modulo the ring size, so submitting a
/// subset of the output invalidates the rest.
pub fn cat_spends(cats: &[SpendableCat]) -> Result<Vec<CoinSpend>> {
    let Some(first) = cats.first() else {
        return Err(WalletError::EmptyRing);
    };
    if cats.iter().any(|cat| cat.asset_id != first.asset_id) {
        return Err(WalletError::MixedAssetIds);
    }

    let deltas = spend_deltas(cats)?;
    let subtotals = ring_subtotals(&deltas);

    let mut a = Allocator::new();
    let mut spends = Vec::with_capacity(cats.len());

    for (i, cat) in cats.iter().enumerate() {
        let prev = &cats[(i + cats.len() - 1) % cats.len()];
        let next = &cats[(i + 1) % cats.len()];

        let inner_solution = cat.inner_solution.to_node(&mut a)?;
        let solution = CatSolution {
            inner_puzzle_solution: inner_solution,
            lineage_proof: cat.lineage_proof,
            prev_coin_id: prev.coin.coin_id(),
            this_coin_info: cat.coin,
            next_coin_proof: CoinProof {
                parent_coin_info: next.coin.parent_coin_info,
                inner_puzzle_hash: next.inner_puzzle.tree_hash()?.into(),
                amount: next.coin.amount,
            },
            prev_subtotal: subtotals[i],
            extra_delta: cat.extra_delta,
        }
        .to_clvm(&mut a)?;

        spends.push(CoinSpend::new(
            cat.coin,
            cat.puzzle_reveal(&mut a)?,
            Program::from_node(&a, solution)?,
        ));
    }

    Ok(spends)
}

/// Issue a new asset by spending `origin` (any standard coin): the eve coin
/// both creates the real payout coin and reveals the TAIL plus its solution
/// inside the sentinel bookkeeping condition.
///
/// The returned spend consumes the eve coin; the caller must separately make
/// `origin` create it.
pub fn issue_cat(
    origin_coin_id: Bytes32,
    tail: &Program,
    tail_solution: &Program,
    inner_puzzle_hash: Bytes32,
    amount: u64,
) -> Result<CoinSpend> {
    let asset_id: Bytes32 = tail.tree_hash()?.into();

    let mut a = Allocator::new();
    let tail_ptr = tail.to_node(&mut a)?;
    let tail_solution_ptr = tail_solution.to_node(&mut a)?;

    let conditions = clvm_quote!(clvm_list!(
        clvm_list!(
            CREATE_COIN,
            (),
            MELT_SENTINEL,
            tail_ptr,
            tail_solution_ptr
        ),
        clvm_list!(
            CREATE_COIN,
            inner_puzzle_hash,
            amount,
            clvm_list!(inner_puzzle_hash)
        ),
    ))
    .to_clvm(&mut a)?;
    let inner_puzzle = Program::from_node(&a, conditions)?;

    let eve_coin = Coin::new(
        origin_coin_id,
        CatArgs::curry_tree_hash(asset_id, inner_puzzle.tree_hash()?).into(),
        amount,
    );

    let eve = SpendableCat::eve(eve_coin, asset_id, inner_puzzle, Program::default());
    Ok(cat_spends(&[eve])?.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    use clvm_traits::ToClvm;
    use verdant_protocol::Bytes;
    use verdant_puzzles::Memos;

    fn quoted_conditions(create_coins: &[(Bytes32, i64)]) -> Program {
        let mut a = Allocator::new();
        let mut conditions = a.nil();
        for (puzzle_hash, amount) in create_coins.iter().rev() {
            let condition = clvm_list!(CREATE_COIN, *puzzle_hash, *amount)
                .to_clvm(&mut a)
                .unwrap();
            conditions = a.new_pair(condition, conditions).unwrap();
        }
        let quoted = clvm_quote!(conditions).to_clvm(&mut a).unwrap();
        Program::from_node(&a, quoted).unwrap()
    }

    fn cat(seed: u8, asset_id: Bytes32, amount: u64, outputs: &[(Bytes32, i64)]) -> SpendableCat {
        SpendableCat::new(
            Coin::new(Bytes32::new([seed; 32]), Bytes32::new([seed + 1; 32]), amount),
            asset_id,
            LineageProof {
                parent_parent_coin_info: Bytes32::new([seed + 2; 32]),
                parent_inner_puzzle_hash: Bytes32::new([seed + 3; 32]),
                parent_amount: amount,
            },
            quoted_conditions(outputs),
            Program::default(),
        )
    }

    #[test]
    fn empty_ring_is_rejected() {
        assert_eq!(cat_spends(&[]), Err(WalletError::EmptyRing));
    }

    #[test]
    fn mixed_asset_ids_are_rejected() {
        let asset_a = Bytes32::new([10; 32]);
        let asset_b = Bytes32::new([20; 32]);
        let cats = vec![
            cat(1, asset_a, 100, &[(Bytes32::new([9; 32]), 100)]),
            cat(5, asset_b, 100, &[(Bytes32::new([9; 32]), 100)]),
        ];
        assert_eq!(cat_spends(&cats), Err(WalletError::MixedAssetIds));
    }

    #[test]
    fn subtotals_are_normalized_to_zero_minimum() {
        assert_eq!(ring_subtotals(&[]), Vec::<i64>::new());
        assert_eq!(ring_subtotals(&[0]), vec![0]);
        assert_eq!(ring_subtotals(&[100, -100]), vec![0, 100]);
        assert_eq!(ring_subtotals(&[-100, 100]), vec![100, 0]);
        assert_eq!(ring_subtotals(&[-50, -50, 100]), vec![100, 50, 0]);

        let subtotals = ring_subtotals(&[37, -90, 53, 0]);
        assert_eq!(subtotals.iter().copied().min(), Some(0));
    }

    #[test]
    fn deltas_exclude_sentinel_and_extra_delta() {
        let asset_id = Bytes32::new([10; 32]);
        let cats = vec![
            cat(
                1,
                asset_id,
                100,
                &[(Bytes32::new([9; 32]), 60), (Bytes32::new([8; 32]), 40)],
            ),
            cat(5, asset_id, 50, &[(Bytes32::default(), MELT_SENTINEL)]).with_extra_delta(-20),
        ];

        let deltas = spend_deltas(&cats).unwrap();
        assert_eq!(deltas, vec![100, 20]);
    }

    #[test]
    fn ring_links_neighbors_in_input_order() {
        let asset_id = Bytes32::new([10; 32]);
        let target = Bytes32::new([9; 32]);
        let cats = vec![
            cat(1, asset_id, 100, &[(target, 100)]),
            cat(5, asset_id, 200, &[(target, 200)]),
            cat(9, asset_id, 300, &[(target, 300)]),
        ];

        let spends = cat_spends(&cats).unwrap();
        assert_eq!(spends.len(), 3);

        let mut a = Allocator::new();
        for (i, spend) in spends.iter().enumerate() {
            let prev = &cats[(i + cats.len() - 1) % cats.len()];
            let next = &cats[(i + 1) % cats.len()];

            let ptr = spend.solution.to_node(&mut a).unwrap();
            let solution = CatSolution::<NodePtr>::from_clvm(&a, ptr).unwrap();

            assert_eq!(solution.prev_coin_id, prev.coin.coin_id());
            assert_eq!(solution.this_coin_info, cats[i].coin);
            assert_eq!(
                solution.next_coin_proof.parent_coin_info,
                next.coin.parent_coin_info
            );
            assert_eq!(
                solution.next_coin_proof.inner_puzzle_hash,
                Bytes32::from(next.inner_puzzle.tree_hash().unwrap())
            );
            assert_eq!(solution.next_coin_proof.amount, next.coin.amount);
            assert_eq!(solution.extra_delta, 0);
            assert_eq!(solution.lineage_proof, cats[i].lineage_proof);
        }
    }

    #[test]
    fn balanced_ring_has_zero_subtotals() {
        let asset_id = Bytes32::new([10; 32]);
        let target = Bytes32::new([9; 32]);
        // each coin recreates its own value, so every running subtotal is 0
        let cats = vec![
            cat(1, asset_id, 100, &[(target, 100)]),
            cat(5, asset_id, 200, &[(target, 200)]),
        ];

        let mut a = Allocator::new();
        for spend in cat_spends(&cats).unwrap() {
            let ptr = spend.solution.to_node(&mut a).unwrap();
            let solution = CatSolution::<NodePtr>::from_clvm(&a, ptr).unwrap();
            assert_eq!(solution.prev_subtotal, 0);
        }
    }

    #[test]
    fn rotation_relabels_the_ring() {
        let asset_id = Bytes32::new([10; 32]);
        let target = Bytes32::new([9; 32]);
        let cats = vec![
            cat(1, asset_id, 100, &[(target, 100)]),
            cat(5, asset_id, 200, &[(target, 200)]),
            cat(9, asset_id, 300, &[(target, 300)]),
        ];
        let mut rotated = cats.clone();
        rotated.rotate_left(1);

        let links = |spends: &[CoinSpend]| {
            let mut a = Allocator::new();
            let mut out = Vec::new();
            for spend in spends {
                let ptr = spend.solution.to_node(&mut a).unwrap();
                let solution = CatSolution::<NodePtr>::from_clvm(&a, ptr).unwrap();
                out.push((
                    spend.coin.coin_id(),
                    solution.prev_coin_id,
                    solution.next_coin_proof.parent_coin_info,
                ));
            }
            out.sort();
            out
        };

        assert_eq!(
            links(&cat_spends(&cats).unwrap()),
            links(&cat_spends(&rotated).unwrap())
        );
    }

    #[test]
    fn single_coin_ring_links_to_itself() {
        let asset_id = Bytes32::new([10; 32]);
        let target = Bytes32::new([9; 32]);
        let cats = vec![cat(1, asset_id, 100, &[(target, 100)])];

        let spends = cat_spends(&cats).unwrap();
        let mut a = Allocator::new();
        let ptr = spends[0].solution.to_node(&mut a).unwrap();
        let solution = CatSolution::<NodePtr>::from_clvm(&a, ptr).unwrap();

        assert_eq!(solution.prev_coin_id, cats[0].coin.coin_id());
        assert_eq!(
            solution.next_coin_proof.parent_coin_info,
            cats[0].coin.parent_coin_info
        );
    }

    #[test]
    fn puzzle_reveal_matches_puzzle_hash() {
        let asset_id = Bytes32::new([10; 32]);
        let cats = vec![cat(1, asset_id, 100, &[(Bytes32::new([9; 32]), 100)])];

        let spends = cat_spends(&cats).unwrap();
        assert_eq!(
            Bytes32::from(spends[0].puzzle_reveal.tree_hash().unwrap()),
            cats[0].puzzle_hash().unwrap()
        );
    }

    #[test]
    fn issuance_reveals_tail_in_sentinel_condition() {
        let origin_coin_id = Bytes32::new([1; 32]);
        // TAIL `(q)` returns nil; good enough to exercise the plumbing
        let tail = Program::from(vec![0xff, 0x01, 0x80]);
        let inner_puzzle_hash = Bytes32::new([42; 32]);

        let spend = issue_cat(origin_coin_id, &tail, &Program::default(), inner_puzzle_hash, 640)
            .unwrap();

        let asset_id = Bytes32::from(tail.tree_hash().unwrap());
        assert_eq!(spend.coin.parent_coin_info, origin_coin_id);
        assert_eq!(spend.coin.amount, 640);

        // eve solution carries no lineage proof and links to itself
        let mut a = Allocator::new();
        let ptr = spend.solution.to_node(&mut a).unwrap();
        let solution = CatSolution::<NodePtr>::from_clvm(&a, ptr).unwrap();
        assert_eq!(solution.lineage_proof, None);
        assert_eq!(solution.prev_coin_id, spend.coin.coin_id());
        assert_eq!(solution.prev_subtotal, 0);

        // the delta scanner must see only the real payout
        let eve_inner = {
            let parent_puzzle = spend.puzzle_reveal.to_node(&mut a).unwrap();
            let parent =
                CurriedProgram::<NodePtr, CatArgs<NodePtr>>::from_clvm(&a, parent_puzzle).unwrap();
            assert_eq!(parent.args.asset_id, asset_id);
            Program::from_node(&a, parent.args.inner_puzzle).unwrap()
        };
        let (_cost, output) = eve_inner.run(&mut a, 0, MAX_COST, &()).unwrap();
        assert_eq!(created_amount(&a, output), 640);
    }

    #[test]
    fn provenance_from_parent_spend() {
        let asset_id = Bytes32::new([10; 32]);
        let target = Bytes32::new([9; 32]);
        let parent_cat = cat(1, asset_id, 100, &[(target, 100)]);
        let parent_spend = cat_spends(&[parent_cat.clone()]).unwrap().remove(0);

        let child_coin = Coin::new(parent_spend.coin.coin_id(), target, 100);
        let child = SpendableCat::from_parent_spend(
            &parent_spend,
            child_coin,
            Program::default(),
            Program::default(),
        )
        .unwrap();

        assert_eq!(child.asset_id, asset_id);
        assert_eq!(
            child.lineage_proof,
            Some(LineageProof {
                parent_parent_coin_info: parent_spend.coin.parent_coin_info,
                parent_inner_puzzle_hash: Bytes32::from(
                    parent_cat.inner_puzzle.tree_hash().unwrap()
                ),
                parent_amount: parent_spend.coin.amount,
            })
        );
    }

    #[test]
    fn provenance_rejects_non_cat_parent() {
        let coin = Coin::new(Bytes32::new([1; 32]), Bytes32::new([2; 32]), 100);
        let parent_spend = CoinSpend::new(coin, Program::default(), Program::default());

        assert_eq!(
            SpendableCat::from_parent_spend(
                &parent_spend,
                coin,
                Program::default(),
                Program::default()
            ),
            Err(WalletError::Uncurry)
        );
    }

    #[test]
    fn memos_hint_counts_toward_delta() {
        // the optional fourth field hints wrapped coins at wallets without
        // affecting the scanned amount
        let hint = Bytes32::new([3; 32]);
        let mut a = Allocator::new();
        let condition = clvm_list!(
            CREATE_COIN,
            hint,
            75,
            Memos::Some(clvm_list!(Bytes::new(hint.to_vec())))
        )
        .to_clvm(&mut a)
        .unwrap();
        let conditions = a.new_pair(condition, a.nil()).unwrap();

        assert_eq!(created_amount(&a, conditions), 75);
    }
}
