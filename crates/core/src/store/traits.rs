use crate::errors::CoreError;
use crate::models::position::Position;

/// Seam to the tabular store that holds the position ledger.
///
/// The contract is whole-table: `read` returns every row in stored order,
/// `update` replaces the entire table. Callers read-modify-write; the last
/// write wins. Store failures are fatal to the current interaction — there
/// is no retry here.
pub trait PositionStore: Send + Sync {
    /// Read the full ledger, in stored row order.
    fn read(&self) -> Result<Vec<Position>, CoreError>;

    /// Replace the stored table with `positions`.
    fn update(&self, positions: &[Position]) -> Result<(), CoreError>;
}
