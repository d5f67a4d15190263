//! Readiness tick (§4.1). Grounded on `cli.c`'s `run_available_jobs`: walk
//! jobs in id order, ask the path selector for a printer, and hand runnable
//! jobs to the spawner.

use log::{debug, warn};

use crate::events::{EventSink, Notification};
use crate::job::JobTable;
use crate::path_selector;
use crate::printer::PrinterTable;
use crate::registry::ConversionRegistry;
use crate::spawner;
use crate::transport::PrinterTransport;
use crate::types::{JobStatus, PrinterStatus};

/// Scan for `created` jobs with a usable printer and spawn them. Called
/// from the pre-block hook (§4.1, §5) — not concurrent with the reaper,
/// both run only in the foreground.
pub fn scan(
    jobs: &mut JobTable,
    printers: &mut PrinterTable,
    registry: &ConversionRegistry,
    transport: &dyn PrinterTransport,
    sink: &dyn EventSink,
) {
    let created: Vec<_> = jobs
        .iter_in_order()
        .filter(|job| job.status == JobStatus::Created)
        .map(|job| job.id)
        .collect();

    for job_id in created {
        let Some(job) = jobs.get(job_id) else { continue };
        let Some(selection) = path_selector::select_printer(job, printers, registry) else {
            debug!("job {job_id} has no runnable printer yet");
            continue;
        };

        let printer_id = selection.printer_id;
        let printer_name = printers.get(printer_id).unwrap().name.clone();
        let printer_type_name = registry
            .type_name(printers.get(printer_id).unwrap().file_type)
            .to_string();
        let file = job.file.clone();

        debug!("job {job_id} handed to spawner on printer {printer_name}");
        match spawner::spawn_pipeline(
            &file,
            &selection.path,
            &printer_name,
            &printer_type_name,
            transport,
        ) {
            Ok(spawned) => {
                let job = jobs.get_mut(job_id).unwrap();
                job.status = JobStatus::Running;
                job.printer = Some(printer_id);
                job.path = Some(selection.path);
                jobs.set_pgid(job_id, spawned.leader_pid as u32);

                printers.get_mut(printer_id).unwrap().status = PrinterStatus::Busy;

                log::info!(
                    "job {job_id} spawned on printer {printer_name} pgid={}",
                    spawned.leader_pid
                );
                sink.notify(Notification::JobStarted {
                    job_id,
                    printer_name,
                    pid: spawned.leader_pid,
                    stage_argv0s: spawned.stage_argv0s,
                });
            }
            Err(err) => {
                // Not runnable this tick; retried on the next scanner pass.
                warn!("job {job_id} failed to spawn on printer {printer_name}: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingEventSink;
    use crate::types::{Eligibility, TypeId};

    #[test]
    fn job_with_no_eligible_idle_printer_stays_created() {
        let mut jobs = JobTable::new(4);
        let mut printers = PrinterTable::new(4);
        let registry = ConversionRegistry::new();
        let sink = RecordingEventSink::new();
        let transport = crate::transport::FileTransport::new(
            std::env::temp_dir().join("imprimer-scanner-test"),
        )
        .unwrap();

        let job_id = jobs
            .create(TypeId(0), "f.txt".into(), Eligibility::EMPTY)
            .unwrap();

        scan(&mut jobs, &mut printers, &registry, &transport, &sink);

        assert_eq!(jobs.get(job_id).unwrap().status, JobStatus::Created);
        assert!(sink.notifications().is_empty());
    }
}
