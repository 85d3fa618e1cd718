use thiserror::Error;

/// Errors surfaced by the line tree, command execution, and history.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("position out of range")]
    OutOfRange,

    #[error("invariant violated: {0}")]
    InvariantViolation(&'static str),

    #[error("history block discipline violated: {0}")]
    HistoryDiscipline(&'static str),

    #[error("command cannot be reverted: {0}")]
    Irreversible(&'static str),

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}

impl PartialEq for CoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::OutOfRange, Self::OutOfRange) => true,
            (Self::InvariantViolation(a), Self::InvariantViolation(b)) => a == b,
            (Self::HistoryDiscipline(a), Self::HistoryDiscipline(b)) => a == b,
            (Self::Irreversible(a), Self::Irreversible(b)) => a == b,
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
