use thiserror::Error;

/// Internal failure taxonomy for the registries, slot tables, and
/// transport (§7). The command surface never propagates these to the
/// operator; it matches on them and turns every `Err` into a `cmd-error`
/// notification carrying the `Display` text, the same way the teacher's
/// `executor::command_error` turns a spawn `io::Error` into a shell exit
/// code instead of unwinding.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("unknown file type: {0}")]
    UnknownType(String),

    #[error("printer name already used: {0}")]
    DuplicatePrinter(String),

    #[error("unknown printer: {0}")]
    UnknownPrinter(String),

    #[error("max printers reached")]
    PrinterCapacityExhausted,

    #[error("job limit reached")]
    JobCapacityExhausted,

    #[error("not a valid job number: {0}")]
    InvalidJobId(usize),

    #[error("job already finished/aborted")]
    JobAlreadyTerminal,

    #[error("job could not be cancelled: {0}")]
    CancelFailed(#[source] std::io::Error),

    #[error("job could not be paused: {0}")]
    PauseFailed(#[source] std::io::Error),

    #[error("job could not be continued: {0}")]
    ResumeFailed(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
