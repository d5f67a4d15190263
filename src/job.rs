use std::time::Instant;

use crate::error::{Result, SupervisorError};
use crate::registry::ConversionStep;
use crate::types::{Eligibility, JobId, JobStatus, PrinterId, TypeId};

/// A single print job (§3).
#[derive(Debug)]
pub struct Job {
    pub id: JobId,
    pub file_type: TypeId,
    pub status: JobStatus,
    pub eligibility: Eligibility,
    pub file: String,
    pub printer: Option<PrinterId>,
    pub path: Option<Vec<ConversionStep>>,
}

/// The supervisor's fixed-capacity job table, indexed by slot, plus the
/// job-id-keyed side tables the spec calls out separately (§3): the
/// active process-group id (0 = none) and the terminal-state timestamp.
///
/// Unlike `PrinterTable`, slots here are reclaimed: `free` clears a slot
/// so `create` can hand its index out again, mirroring `find_free_job_id`
/// scanning for a `NULL` entry in the original job array.
#[derive(Debug)]
pub struct JobTable {
    slots: Vec<Option<Job>>,
    pgid: Vec<u32>,
    completed_at: Vec<Option<Instant>>,
}

impl JobTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            pgid: vec![0; capacity],
            completed_at: vec![None; capacity],
        }
    }

    pub fn create(
        &mut self,
        file_type: TypeId,
        file: String,
        eligibility: Eligibility,
    ) -> Result<JobId> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(SupervisorError::JobCapacityExhausted)?;

        let id = JobId(index);
        self.slots[index] = Some(Job {
            id,
            file_type,
            status: JobStatus::Created,
            eligibility,
            file,
            printer: None,
            path: None,
        });
        self.pgid[index] = 0;
        self.completed_at[index] = None;
        Ok(id)
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// All live jobs in ascending id order — the order the scanner and
    /// job-enumeration command are required to honor (§5).
    pub fn iter_in_order(&self) -> impl Iterator<Item = &Job> {
        self.slots.iter().flatten()
    }

    pub fn pgid(&self, id: JobId) -> u32 {
        self.pgid[id.0]
    }

    pub fn set_pgid(&mut self, id: JobId, pgid: u32) {
        self.pgid[id.0] = pgid;
    }

    pub fn clear_pgid(&mut self, id: JobId) {
        self.pgid[id.0] = 0;
    }

    pub fn completed_at(&self, id: JobId) -> Option<Instant> {
        self.completed_at[id.0]
    }

    pub fn stamp_completed_now(&mut self, id: JobId) {
        self.completed_at[id.0] = Some(Instant::now());
    }

    /// Find the job whose pipeline-leader process group matches `pgid`.
    /// Mirrors `find_job_from_pid`'s linear scan in the original C source;
    /// the job table is small enough that this is not worth a hash index.
    pub fn find_by_pgid(&self, pgid: u32) -> Option<JobId> {
        if pgid == 0 {
            return None;
        }
        self.pgid
            .iter()
            .position(|&p| p == pgid)
            .map(JobId)
            .filter(|id| self.slots[id.0].is_some())
    }

    /// Reclaim a slot after its job has reached the transient `Deleted`
    /// state, making the index available to a future `create`.
    pub fn free(&mut self, id: JobId) {
        self.slots[id.0] = None;
        self.pgid[id.0] = 0;
        self.completed_at[id.0] = None;
    }
}
