//! Error types shared by the byte-level and typed tables.

use std::collections::TryReserveError;
use std::fmt;

use thiserror::Error;

/// Which half of an entry an argument refers to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Block {
    Key,
    Value,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Key => f.write_str("key"),
            Block::Value => f.write_str("value"),
        }
    }
}

/// A caller-supplied argument the table cannot accept.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum ArgumentError {
    #[error("{block} width must be greater than zero")]
    ZeroWidth { block: Block },
    #[error("{block} block is {got} bytes, table stores {expected}-byte {block}s")]
    WidthMismatch {
        block: Block,
        expected: usize,
        got: usize,
    },
}

/// Failure of a table operation.
///
/// A missing key is not an error: lookups report it through `Option`,
/// `contains` through `bool` and `erase` through `EraseOutcome::NotFound`.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum TableError {
    /// The table was destroyed and holds no bucket array.
    #[error("table storage is not initialized")]
    NotInitialized,
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),
    /// A bucket array or payload block could not be allocated. The table is
    /// left as it was before the failing step.
    #[error("backing allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_block() {
        let e = TableError::from(ArgumentError::WidthMismatch {
            block: Block::Value,
            expected: 8,
            got: 3,
        });
        assert_eq!(
            e.to_string(),
            "invalid argument: value block is 3 bytes, table stores 8-byte values"
        );

        let e = TableError::from(ArgumentError::ZeroWidth { block: Block::Key });
        assert_eq!(e.to_string(), "invalid argument: key width must be greater than zero");
        assert_eq!(TableError::NotInitialized.to_string(), "table storage is not initialized");
    }

    #[test]
    fn allocation_failure_converts_from_try_reserve() {
        let mut v: Vec<u8> = Vec::new();
        let err = v.try_reserve_exact(usize::MAX).unwrap_err();
        let e: TableError = err.into();
        assert!(matches!(e, TableError::Allocation(_)));
    }
}
