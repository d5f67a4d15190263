//! Drains child-status changes and maps them to job/printer transitions
//! (§4.4). Grounded on `cli.c`'s `readline_callback`/`sigchld_handler` (the
//! flag-then-drain structure) and `job_control.rs`'s `WaitOutcome`.

use log::{debug, info};

use crate::events::{EventSink, Notification};
use crate::job::JobTable;
use crate::printer::PrinterTable;
use crate::process_group::{self, WaitOutcome};
use crate::types::{JobStatus, PrinterStatus};

/// Drain all pending child-status changes non-blockingly and apply each to
/// the job/printer tables. Called from the pre-block hook whenever the
/// SIGCHLD flag is set (§5).
pub fn drain(jobs: &mut JobTable, printers: &mut PrinterTable, sink: &dyn EventSink) {
    loop {
        match process_group::try_reap_any() {
            Ok(Some((pid, outcome))) => apply(jobs, printers, sink, pid as u32, outcome),
            Ok(None) => break,
            Err(_) => break,
        }
    }
}

fn apply(
    jobs: &mut JobTable,
    printers: &mut PrinterTable,
    sink: &dyn EventSink,
    pid: u32,
    outcome: WaitOutcome,
) {
    let Some(job_id) = jobs.find_by_pgid(pid) else {
        // Not one of ours (or already reclaimed) — nothing to do.
        return;
    };

    match outcome {
        WaitOutcome::Exited(0) => {
            finish(jobs, printers, sink, job_id, JobStatus::Finished);
            info!("job {job_id} finished exit=0");
            sink.notify(Notification::JobFinished { job_id, exit_code: 0 });
        }
        WaitOutcome::Exited(code) => {
            finish(jobs, printers, sink, job_id, JobStatus::Aborted);
            info!("job {job_id} aborted exit={code}");
            sink.notify(Notification::JobAborted {
                job_id,
                exit_code: Some(code),
                signal: None,
            });
        }
        WaitOutcome::Signaled(signum) => {
            finish(jobs, printers, sink, job_id, JobStatus::Aborted);
            info!("job {job_id} aborted signal={signum}");
            sink.notify(Notification::JobAborted {
                job_id,
                exit_code: None,
                signal: Some(signum),
            });
        }
        WaitOutcome::Stopped => {
            if let Some(job) = jobs.get_mut(job_id) {
                job.status = JobStatus::Paused;
            }
            debug!("job {job_id} paused");
            sink.notify(Notification::JobStatus {
                job_id,
                status: JobStatus::Paused,
            });
        }
        WaitOutcome::Continued => {
            if let Some(job) = jobs.get_mut(job_id) {
                job.status = JobStatus::Running;
            }
            debug!("job {job_id} running (continued)");
            sink.notify(Notification::JobStatus {
                job_id,
                status: JobStatus::Running,
            });
        }
    }
}

/// Common tail of a terminal transition (§4.4): release the printer back to
/// idle unless it was disabled in the meantime, clear the job's process
/// group, and stamp completion for retention.
fn finish(
    jobs: &mut JobTable,
    printers: &mut PrinterTable,
    sink: &dyn EventSink,
    job_id: crate::types::JobId,
    status: JobStatus,
) {
    let printer_id = jobs.get(job_id).and_then(|job| job.printer);

    if let Some(job) = jobs.get_mut(job_id) {
        job.status = status;
    }
    jobs.clear_pgid(job_id);
    jobs.stamp_completed_now(job_id);

    if let Some(printer_id) = printer_id {
        if let Some(printer) = printers.get_mut(printer_id) {
            if printer.status != PrinterStatus::Disabled {
                printer.status = PrinterStatus::Idle;
                sink.notify(Notification::PrinterStatus {
                    printer_id,
                    status: PrinterStatus::Idle,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingEventSink;
    use crate::types::{Eligibility, TypeId};

    fn setup() -> (JobTable, PrinterTable, crate::types::JobId, crate::types::PrinterId) {
        let mut jobs = JobTable::new(4);
        let mut printers = PrinterTable::new(4);
        let printer_id = printers.declare("p1", TypeId(0)).unwrap();
        printers.get_mut(printer_id).unwrap().status = PrinterStatus::Busy;
        let job_id = jobs
            .create(TypeId(0), "f.txt".into(), Eligibility::single(printer_id))
            .unwrap();
        jobs.get_mut(job_id).unwrap().printer = Some(printer_id);
        jobs.get_mut(job_id).unwrap().status = JobStatus::Running;
        jobs.set_pgid(job_id, 4242);
        (jobs, printers, job_id, printer_id)
    }

    #[test]
    fn clean_exit_finishes_job_and_frees_printer() {
        let (mut jobs, mut printers, job_id, printer_id) = setup();
        let sink = RecordingEventSink::new();
        apply(&mut jobs, &mut printers, &sink, 4242, WaitOutcome::Exited(0));

        assert_eq!(jobs.get(job_id).unwrap().status, JobStatus::Finished);
        assert_eq!(jobs.pgid(job_id), 0);
        assert!(jobs.completed_at(job_id).is_some());
        assert_eq!(printers.get(printer_id).unwrap().status, PrinterStatus::Idle);
    }

    #[test]
    fn nonzero_exit_aborts_job() {
        let (mut jobs, mut printers, job_id, _printer_id) = setup();
        let sink = RecordingEventSink::new();
        apply(&mut jobs, &mut printers, &sink, 4242, WaitOutcome::Exited(7));
        assert_eq!(jobs.get(job_id).unwrap().status, JobStatus::Aborted);
    }

    #[test]
    fn disabled_printer_stays_disabled_after_job_finishes() {
        let (mut jobs, mut printers, job_id, printer_id) = setup();
        printers.get_mut(printer_id).unwrap().status = PrinterStatus::Disabled;
        let sink = RecordingEventSink::new();
        apply(&mut jobs, &mut printers, &sink, 4242, WaitOutcome::Exited(0));

        assert_eq!(jobs.get(job_id).unwrap().status, JobStatus::Finished);
        assert_eq!(printers.get(printer_id).unwrap().status, PrinterStatus::Disabled);
    }

    #[test]
    fn stopped_pauses_without_touching_printer() {
        let (mut jobs, mut printers, job_id, printer_id) = setup();
        let sink = RecordingEventSink::new();
        apply(&mut jobs, &mut printers, &sink, 4242, WaitOutcome::Stopped);

        assert_eq!(jobs.get(job_id).unwrap().status, JobStatus::Paused);
        assert_eq!(printers.get(printer_id).unwrap().status, PrinterStatus::Busy);
    }

    #[test]
    fn unknown_pid_is_ignored() {
        let (mut jobs, mut printers, _job_id, _printer_id) = setup();
        let sink = RecordingEventSink::new();
        apply(&mut jobs, &mut printers, &sink, 9999, WaitOutcome::Exited(0));
        // No panic, no job touched — nothing asserts on state because
        // nothing should have changed.
    }
}
