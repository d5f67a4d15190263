//! Terminal-job dequeue (§4.5). Grounded on `cli.c`'s
//! `dequeue_finished_jobs`/`delete_job`: a fixed retention window after
//! which a terminal job's slot is reclaimed.

use std::time::{Duration, Instant};

use log::debug;

use crate::events::{EventSink, Notification};
use crate::job::JobTable;
use crate::types::JobStatus;

/// Reclaim any `finished`/`aborted` job whose completion is older than
/// `retention_window`. Runs after every command dispatch (§5).
pub fn reclaim(jobs: &mut JobTable, retention_window: Duration, sink: &dyn EventSink, now: Instant) {
    let expired: Vec<_> = jobs
        .iter_in_order()
        .filter(|job| matches!(job.status, JobStatus::Finished | JobStatus::Aborted))
        .filter_map(|job| {
            jobs.completed_at(job.id)
                .filter(|&completed_at| now.duration_since(completed_at) >= retention_window)
                .map(|_| job.id)
        })
        .collect();

    for job_id in expired {
        if let Some(job) = jobs.get_mut(job_id) {
            job.status = JobStatus::Deleted;
        }
        sink.notify(Notification::JobStatus {
            job_id,
            status: JobStatus::Deleted,
        });
        sink.notify(Notification::JobDeleted { job_id });
        jobs.free(job_id);
        debug!("job {job_id} reclaimed after retention window");
    }
}
