//! Observer notifications (§6), kept distinct from the ambient `log`-facade
//! diagnostic logging used elsewhere in the crate (SPEC_FULL §9).
//!
//! Grounded on the `sf_*` notification contract named in the conversion
//! registry/printer-transport write-up (§6) and on the teacher's pattern of
//! a small recording double standing in for a real sink in tests.

use std::sync::Mutex;

use crate::types::{JobId, JobStatus, PrinterId, PrinterStatus};

/// The fixed, documented set of observable events a supervisor MUST emit.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    PrinterDefined { printer_id: PrinterId, name: String },
    PrinterStatus { printer_id: PrinterId, status: PrinterStatus },
    JobCreated { job_id: JobId },
    JobStarted { job_id: JobId, printer_name: String, pid: i32, stage_argv0s: Vec<String> },
    JobStatus { job_id: JobId, status: JobStatus },
    JobFinished { job_id: JobId, exit_code: i32 },
    JobAborted { job_id: JobId, exit_code: Option<i32>, signal: Option<i32> },
    JobDeleted { job_id: JobId },
    CmdOk,
    CmdError { message: String },
}

pub trait EventSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Production default: render one line per notification to stdout, in lieu
/// of whatever real front-end a deployment renders these through.
#[derive(Debug, Default)]
pub struct StdoutEventSink;

impl EventSink for StdoutEventSink {
    fn notify(&self, notification: Notification) {
        println!("{}", describe(&notification));
    }
}

fn describe(notification: &Notification) -> String {
    match notification {
        Notification::PrinterDefined { printer_id, name } => {
            format!("printer-defined {printer_id} {name}")
        }
        Notification::PrinterStatus { printer_id, status } => {
            format!("printer-status {printer_id} {status}")
        }
        Notification::JobCreated { job_id } => format!("job-created {job_id}"),
        Notification::JobStarted {
            job_id,
            printer_name,
            pid,
            stage_argv0s,
        } => format!(
            "job-started {job_id} printer={printer_name} pid={pid} stages=[{}]",
            stage_argv0s.join(",")
        ),
        Notification::JobStatus { job_id, status } => format!("job-status {job_id} {status}"),
        Notification::JobFinished { job_id, exit_code } => {
            format!("job-finished {job_id} exit={exit_code}")
        }
        Notification::JobAborted {
            job_id,
            exit_code,
            signal,
        } => format!(
            "job-aborted {job_id} exit={:?} signal={:?}",
            exit_code, signal
        ),
        Notification::JobDeleted { job_id } => format!("job-deleted {job_id}"),
        Notification::CmdOk => "cmd-ok".to_string(),
        Notification::CmdError { message } => format!("cmd-error {message}"),
    }
}

/// Test double: accumulates every notification for assertions.
#[derive(Default)]
pub struct RecordingEventSink {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl EventSink for RecordingEventSink {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_accumulates_in_order() {
        let sink = RecordingEventSink::new();
        sink.notify(Notification::CmdOk);
        sink.notify(Notification::JobCreated { job_id: JobId(0) });

        let recorded = sink.notifications();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0], Notification::CmdOk);
        assert_eq!(recorded[1], Notification::JobCreated { job_id: JobId(0) });
    }
}
