/// Interned index of a declared file type (e.g. `txt`, `pdf`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub usize);

/// Stable slot index of a declared printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrinterId(pub usize);

/// Stable slot index of a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub usize);

impl std::fmt::Display for PrinterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A printer's lifecycle state (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterStatus {
    Disabled,
    Idle,
    Busy,
}

impl std::fmt::Display for PrinterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PrinterStatus::Disabled => "disabled",
            PrinterStatus::Idle => "idle",
            PrinterStatus::Busy => "busy",
        };
        write!(f, "{s}")
    }
}

/// A job's lifecycle state (§3). `Deleted` is transient: it exists only
/// long enough for the retention dequeue to emit its notifications before
/// the slot is reclaimed (see `retention.rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Created,
    Running,
    Paused,
    Finished,
    Aborted,
    Deleted,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Created => "created",
            JobStatus::Running => "running",
            JobStatus::Paused => "paused",
            JobStatus::Finished => "finished",
            JobStatus::Aborted => "aborted",
            JobStatus::Deleted => "deleted",
        };
        write!(f, "{s}")
    }
}

/// The set of printer ids a job is allowed to run on, frozen at job
/// creation. Backed by a `u64` so up to 64 printer slots are addressable;
/// `SupervisorConfig::max_printers` must not exceed that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Eligibility(u64);

impl Eligibility {
    pub const EMPTY: Eligibility = Eligibility(0);

    pub fn single(id: PrinterId) -> Self {
        let mut e = Eligibility::EMPTY;
        e.insert(id);
        e
    }

    pub fn all(count: usize) -> Self {
        if count >= 64 {
            Eligibility(u64::MAX)
        } else {
            Eligibility((1u64 << count) - 1)
        }
    }

    pub fn insert(&mut self, id: PrinterId) {
        self.0 |= 1u64 << id.0;
    }

    pub fn contains(&self, id: PrinterId) -> bool {
        self.0 & (1u64 << id.0) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eligibility_all_marks_every_declared_printer() {
        let e = Eligibility::all(3);
        assert!(e.contains(PrinterId(0)));
        assert!(e.contains(PrinterId(1)));
        assert!(e.contains(PrinterId(2)));
        assert!(!e.contains(PrinterId(3)));
    }

    #[test]
    fn eligibility_single_marks_only_that_printer() {
        let e = Eligibility::single(PrinterId(2));
        assert!(!e.contains(PrinterId(0)));
        assert!(!e.contains(PrinterId(1)));
        assert!(e.contains(PrinterId(2)));
    }

    #[test]
    fn eligibility_insert_accumulates() {
        let mut e = Eligibility::EMPTY;
        assert!(e.is_empty());
        e.insert(PrinterId(0));
        e.insert(PrinterId(5));
        assert!(e.contains(PrinterId(0)));
        assert!(e.contains(PrinterId(5)));
        assert!(!e.contains(PrinterId(1)));
        assert!(!e.is_empty());
    }
}
