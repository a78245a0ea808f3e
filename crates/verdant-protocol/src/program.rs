use std::io::Cursor;
use std::ops::Deref;

use chia_sha2::Sha256;
use chia_traits::Streamable;
use clvm_traits::{FromClvm, FromClvmError, ToClvm, ToClvmError};
use clvm_utils::{tree_hash_from_bytes, TreeHash};
use clvmr::allocator::NodePtr;
use clvmr::cost::Cost;
use clvmr::error::EvalErr;
use clvmr::run_program;
use clvmr::serde::{node_from_bytes, node_to_bytes};
use clvmr::{Allocator, ChiaDialect, ClvmFlags};

use crate::bytes::Bytes;

/// A CLVM program in its serialized form.
///
/// The wallet passes programs around as opaque byte strings and only touches
/// an [`Allocator`] at the boundaries: when a puzzle is curried, executed, or
/// a solution is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Program(Bytes);

impl Default for Program {
    fn default() -> Self {
        // the serialization of nil
        Self(vec![0x80].into())
    }
}

impl Program {
    pub fn new(bytes: Bytes) -> Self {
        Self(bytes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_inner()
    }

    /// The tree hash of the deserialized program. This is what coin puzzle
    /// hashes commit to.
    pub fn tree_hash(&self) -> chia_traits::Result<TreeHash> {
        tree_hash_from_bytes(self.0.as_ref()).map_err(|_| chia_traits::Error::InvalidClvm)
    }

    /// Deserialize into `a` for currying or inspection.
    pub fn to_node(&self, a: &mut Allocator) -> chia_traits::Result<NodePtr> {
        node_from_bytes(a, self.0.as_ref()).map_err(|_| chia_traits::Error::InvalidClvm)
    }

    /// Serialize a structure out of `a`.
    pub fn from_node(a: &Allocator, node: NodePtr) -> chia_traits::Result<Self> {
        let bytes = node_to_bytes(a, node).map_err(|_| chia_traits::Error::InvalidClvm)?;
        Ok(Self(bytes.into()))
    }

    /// Run the program against `arg`, returning the cost and the unparsed
    /// output.
    pub fn run<A: ToClvm<Allocator>>(
        &self,
        a: &mut Allocator,
        flags: u32,
        max_cost: Cost,
        arg: &A,
    ) -> Result<(Cost, NodePtr), EvalErr> {
        let arg = arg.to_clvm(a).map_err(|_| {
            EvalErr::InternalError(
                a.nil(),
                "failed to convert argument to CLVM objects".to_string(),
            )
        })?;
        let program = node_from_bytes(a, self.0.as_ref())
            .map_err(|_| EvalErr::InternalError(a.nil(), "invalid serialized program".to_string()))?;
        let dialect = ChiaDialect::new(ClvmFlags::from_bits_truncate(flags));
        let reduction = run_program(a, &dialect, program, arg, max_cost)?;
        Ok((reduction.0, reduction.1))
    }
}

impl Streamable for Program {
    fn update_digest(&self, digest: &mut Sha256) {
        self.0.update_digest(digest);
    }

    fn stream(&self, out: &mut Vec<u8>) -> chia_traits::Result<()> {
        self.0.stream(out)
    }

    fn parse<const TRUSTED: bool>(input: &mut Cursor<&[u8]>) -> chia_traits::Result<Self> {
        Ok(Self(Bytes::parse::<TRUSTED>(input)?))
    }
}

impl FromClvm<Allocator> for Program {
    fn from_clvm(a: &Allocator, node: NodePtr) -> Result<Self, FromClvmError> {
        Ok(Self(
            node_to_bytes(a, node)
                .map_err(|error| FromClvmError::Custom(error.to_string()))?
                .into(),
        ))
    }
}

impl ToClvm<Allocator> for Program {
    fn to_clvm(&self, a: &mut Allocator) -> Result<NodePtr, ToClvmError> {
        node_from_bytes(a, self.0.as_ref()).map_err(|error| ToClvmError::Custom(error.to_string()))
    }
}

impl From<Bytes> for Program {
    fn from(value: Bytes) -> Self {
        Self(value)
    }
}

impl From<Program> for Bytes {
    fn from(value: Program) -> Self {
        value.0
    }
}

impl From<Vec<u8>> for Program {
    fn from(value: Vec<u8>) -> Self {
        Self(Bytes::new(value))
    }
}

impl From<&[u8]> for Program {
    fn from(value: &[u8]) -> Self {
        Self(value.into())
    }
}

impl AsRef<[u8]> for Program {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl Deref for Program {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}
