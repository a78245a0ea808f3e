use clvm_traits::{FromClvm, ToClvm};
use clvmr::NodePtr;

/// Optional trailing field of a create-coin condition. Nil when no memos are
/// attached; otherwise typically a list of memo atoms, but any structure is
/// allowed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ToClvm, FromClvm)]
#[clvm(untagged, list)]
pub enum Memos<T = NodePtr> {
    #[default]
    None,
    Some(T),
}
