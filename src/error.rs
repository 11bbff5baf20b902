use crate::ata::layout::Field;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentifyError {
    #[error("identify record must be exactly {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
}

/// A defect in a [`FieldLayout`](crate::ata::layout::FieldLayout) table.
///
/// These are configuration errors: they are reported when the table is built,
/// and the standard table is checked while the crate compiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("text field {0:?} has odd width {1}")]
    OddTextWidth(Field, usize),
    #[error("field {0:?} is declared with the wrong kind")]
    KindMismatch(Field),
    #[error("field {0:?} has width {1}, which does not fit its kind")]
    WidthMismatch(Field, usize),
    #[error("field {0:?} extends past the end of the record")]
    OutOfBounds(Field),
    #[error("fields {0:?} and {1:?} overlap")]
    Overlap(Field, Field),
    #[error("field {0:?} is listed more than once")]
    DuplicateField(Field),
}
