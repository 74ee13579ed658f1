use alloc::collections::TryReserveError;
use core::fmt;

/// Errors reported by fallible [`ProbingTable`](crate::ProbingTable)
/// operations.
///
/// A missing key is not an error; lookups and removals report it as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The slot array could not be allocated, either at creation or while
    /// growing. The table is left exactly as it was before the call.
    AllocationFailure(TryReserveError),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::AllocationFailure(err) => {
                write!(f, "failed to allocate slot array: {err}")
            }
        }
    }
}

impl core::error::Error for TableError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            TableError::AllocationFailure(err) => Some(err),
        }
    }
}

impl From<TryReserveError> for TableError {
    fn from(err: TryReserveError) -> Self {
        TableError::AllocationFailure(err)
    }
}
