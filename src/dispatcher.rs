//! The supervisor proper: command dispatch, job-control verbs (§4.6/§4.7),
//! and the pre-block hook. Grounded on `cli.c`'s `parse_command` verb
//! dispatch table and `run_cli`'s reap/retention/scan cycle around the
//! blocking line read.

use std::time::Instant;

use log::{info, warn};

use crate::command::{self, Command};
use crate::config::SupervisorConfig;
use crate::error::SupervisorError;
use crate::events::{EventSink, Notification, StdoutEventSink};
use crate::job::JobTable;
use crate::printer::PrinterTable;
use crate::process_group;
use crate::process_group::install_sigchld_handler;
use crate::reaper;
use crate::registry::ConversionRegistry;
use crate::retention;
use crate::scanner;
use crate::transport::{FileTransport, PrinterTransport};
use crate::types::{Eligibility, JobId, JobStatus, PrinterStatus};

/// What the interactive loop should do after dispatching one line.
#[derive(Debug, PartialEq, Eq)]
pub enum ExecutionAction {
    Continue,
    Exit(i32),
}

pub struct Supervisor {
    pub registry: ConversionRegistry,
    pub printers: PrinterTable,
    pub jobs: JobTable,
    config: SupervisorConfig,
    transport: Box<dyn PrinterTransport>,
    sink: Box<dyn EventSink>,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> std::io::Result<Self> {
        let transport = FileTransport::new(&config.spool_dir)?;
        Ok(Self::with_collaborators(
            config,
            Box::new(transport),
            Box::new(StdoutEventSink),
        ))
    }

    pub fn with_collaborators(
        config: SupervisorConfig,
        transport: Box<dyn PrinterTransport>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        Self {
            printers: PrinterTable::new(config.max_printers),
            jobs: JobTable::new(config.max_jobs),
            registry: ConversionRegistry::new(),
            config,
            transport,
            sink,
        }
    }

    /// Install the supervisor's one signal handler. Must run once before
    /// the interactive loop starts (§5).
    pub fn install_signal_handler(&self) -> std::io::Result<()> {
        install_sigchld_handler()
    }

    /// Run the reap/retention/scan cycle (§4.1, §5). Called by the line
    /// source immediately before it blocks for the next line, and once
    /// more after every dispatched command.
    pub fn pre_block_hook(&mut self) {
        if process_group::take_child_status_flag() {
            reaper::drain(&mut self.jobs, &mut self.printers, self.sink.as_ref());
        }
        retention::reclaim(
            &mut self.jobs,
            self.config.retention_window,
            self.sink.as_ref(),
            Instant::now(),
        );
        scanner::scan(
            &mut self.jobs,
            &mut self.printers,
            &self.registry,
            self.transport.as_ref(),
            self.sink.as_ref(),
        );
    }

    pub fn dispatch(&mut self, line: &str) -> ExecutionAction {
        let Some(cmd) = command::parse_line(line) else {
            return ExecutionAction::Continue;
        };

        let action = self.dispatch_command(cmd);
        self.pre_block_hook();
        action
    }

    fn dispatch_command(&mut self, cmd: Command) -> ExecutionAction {
        match cmd.verb.as_str() {
            "help" => {
                self.print_help();
                self.ok()
            }
            "quit" => ExecutionAction::Exit(-1),
            "type" => self.cmd_type(&cmd.args),
            "printer" => self.cmd_printer(&cmd.args),
            "conversion" => self.cmd_conversion(&cmd.args),
            "printers" => self.cmd_printers(),
            "jobs" => self.cmd_jobs(),
            "print" => self.cmd_print(&cmd.args),
            "cancel" => self.cmd_cancel(&cmd.args),
            "pause" => self.cmd_pause(&cmd.args),
            "resume" => self.cmd_resume(&cmd.args),
            "disable" => self.cmd_disable(&cmd.args),
            "enable" => self.cmd_enable(&cmd.args),
            other => self.error(format!("unknown command: {other}")),
        }
    }

    fn ok(&self) -> ExecutionAction {
        self.sink.notify(Notification::CmdOk);
        ExecutionAction::Continue
    }

    fn error(&self, message: String) -> ExecutionAction {
        self.sink.notify(Notification::CmdError { message });
        ExecutionAction::Continue
    }

    fn print_help(&self) {
        println!("commands: help quit type printer conversion printers jobs print cancel pause resume disable enable");
    }

    fn cmd_type(&mut self, args: &[String]) -> ExecutionAction {
        let [name] = args else {
            return self.error("usage: type <name>".to_string());
        };
        self.registry.define_type(name);
        self.ok()
    }

    fn cmd_printer(&mut self, args: &[String]) -> ExecutionAction {
        let [name, type_name] = args else {
            return self.error("usage: printer <name> <type>".to_string());
        };
        let Some(type_id) = self.registry.find_type(type_name) else {
            return self.error(SupervisorError::UnknownType(type_name.clone()).to_string());
        };
        match self.printers.declare(name, type_id) {
            Ok(printer_id) => {
                self.sink.notify(Notification::PrinterDefined {
                    printer_id,
                    name: name.clone(),
                });
                self.ok()
            }
            Err(err) => self.error(err.to_string()),
        }
    }

    fn cmd_conversion(&mut self, args: &[String]) -> ExecutionAction {
        if args.len() < 3 {
            return self.error("usage: conversion <from> <to> <cmd> [args...]".to_string());
        }
        let Some(from) = self.registry.find_type(&args[0]) else {
            return self.error(SupervisorError::UnknownType(args[0].clone()).to_string());
        };
        let Some(to) = self.registry.find_type(&args[1]) else {
            return self.error(SupervisorError::UnknownType(args[1].clone()).to_string());
        };
        let argv = args[2..].to_vec();
        self.registry.define_conversion(from, to, argv);
        self.ok()
    }

    fn cmd_printers(&mut self) -> ExecutionAction {
        for printer in self.printers.iter_in_order() {
            println!(
                "{} {} {} {}",
                printer.id,
                printer.name,
                self.registry.type_name(printer.file_type),
                printer.status
            );
        }
        self.ok()
    }

    fn cmd_jobs(&mut self) -> ExecutionAction {
        for job in self.jobs.iter_in_order() {
            println!(
                "{} {} {} {}",
                job.id,
                self.registry.type_name(job.file_type),
                job.file,
                job.status
            );
        }
        self.ok()
    }

    fn cmd_print(&mut self, args: &[String]) -> ExecutionAction {
        let Some((file, printer_names)) = args.split_first() else {
            return self.error("usage: print <file> [printer...]".to_string());
        };
        let Some(file_type) = self.registry.infer_file_type(file) else {
            return self.error(format!("unknown file type for: {file}"));
        };

        let eligibility = if printer_names.is_empty() {
            Eligibility::all(self.printers.iter_in_order().count())
        } else {
            let mut eligibility = Eligibility::EMPTY;
            for name in printer_names {
                let Some(printer_id) = self.printers.find_by_name(name) else {
                    return self.error(SupervisorError::UnknownPrinter(name.clone()).to_string());
                };
                eligibility.insert(printer_id);
            }
            eligibility
        };

        match self.jobs.create(file_type, file.clone(), eligibility) {
            Ok(job_id) => {
                self.sink.notify(Notification::JobCreated { job_id });
                info!("job {job_id} created for {file}");
                self.ok()
            }
            Err(err) => self.error(err.to_string()),
        }
    }

    fn cmd_cancel(&mut self, args: &[String]) -> ExecutionAction {
        let Some(job_id) = self.parse_job_id(args) else {
            return self.error("usage: cancel <job-id>".to_string());
        };
        let Some(job) = self.jobs.get(job_id) else {
            return self.error(SupervisorError::InvalidJobId(job_id.0).to_string());
        };

        match job.status {
            JobStatus::Created => {
                self.jobs.get_mut(job_id).unwrap().status = JobStatus::Aborted;
                self.jobs.stamp_completed_now(job_id);
                self.sink.notify(Notification::JobStatus {
                    job_id,
                    status: JobStatus::Aborted,
                });
                self.sink.notify(Notification::JobAborted {
                    job_id,
                    exit_code: Some(0),
                    signal: None,
                });
                self.ok()
            }
            JobStatus::Running | JobStatus::Paused => {
                let pgid = self.jobs.pgid(job_id) as libc::pid_t;
                let paused = job.status == JobStatus::Paused;
                if let Err(err) = process_group::send_terminate_to_group(pgid) {
                    warn!("cancel of job {job_id} failed to signal group {pgid}: {err}");
                    return self.error(SupervisorError::CancelFailed(err).to_string());
                }
                if paused {
                    let _ = process_group::send_continue_to_group(pgid);
                }
                self.ok()
            }
            JobStatus::Finished | JobStatus::Aborted | JobStatus::Deleted => {
                self.error(SupervisorError::JobAlreadyTerminal.to_string())
            }
        }
    }

    fn cmd_pause(&mut self, args: &[String]) -> ExecutionAction {
        self.signal_active_job(args, process_group::send_stop_to_group, |e| {
            SupervisorError::PauseFailed(e)
        })
    }

    fn cmd_resume(&mut self, args: &[String]) -> ExecutionAction {
        self.signal_active_job(args, process_group::send_continue_to_group, |e| {
            SupervisorError::ResumeFailed(e)
        })
    }

    fn signal_active_job(
        &mut self,
        args: &[String],
        signal: fn(libc::pid_t) -> std::io::Result<()>,
        to_error: fn(std::io::Error) -> SupervisorError,
    ) -> ExecutionAction {
        let Some(job_id) = self.parse_job_id(args) else {
            return self.error("usage: <job-id>".to_string());
        };
        let Some(job) = self.jobs.get(job_id) else {
            return self.error(SupervisorError::InvalidJobId(job_id.0).to_string());
        };
        if !matches!(job.status, JobStatus::Running | JobStatus::Paused) {
            return self.error(format!("job {job_id} has no active process group"));
        }
        let pgid = self.jobs.pgid(job_id) as libc::pid_t;
        match signal(pgid) {
            Ok(()) => self.ok(),
            Err(err) => self.error(to_error(err).to_string()),
        }
    }

    fn cmd_disable(&mut self, args: &[String]) -> ExecutionAction {
        self.toggle_printer(args, PrinterStatus::Disabled)
    }

    fn cmd_enable(&mut self, args: &[String]) -> ExecutionAction {
        let [name] = args else {
            return self.error("usage: enable <printer>".to_string());
        };
        let Some(printer_id) = self.printers.find_by_name(name) else {
            return self.error(SupervisorError::UnknownPrinter(name.clone()).to_string());
        };
        let printer = self.printers.get_mut(printer_id).unwrap();
        match printer.status {
            PrinterStatus::Disabled => {
                printer.status = PrinterStatus::Idle;
                self.sink.notify(Notification::PrinterStatus {
                    printer_id,
                    status: PrinterStatus::Idle,
                });
                self.ok()
            }
            PrinterStatus::Idle => self.ok(),
            PrinterStatus::Busy => self.error(format!("printer {name} is busy")),
        }
    }

    fn toggle_printer(&mut self, args: &[String], target: PrinterStatus) -> ExecutionAction {
        let [name] = args else {
            return self.error("usage: disable <printer>".to_string());
        };
        let Some(printer_id) = self.printers.find_by_name(name) else {
            return self.error(SupervisorError::UnknownPrinter(name.clone()).to_string());
        };
        let printer = self.printers.get_mut(printer_id).unwrap();
        if printer.status != target {
            printer.status = target;
            self.sink.notify(Notification::PrinterStatus {
                printer_id,
                status: target,
            });
        }
        self.ok()
    }

    fn parse_job_id(&self, args: &[String]) -> Option<JobId> {
        let [id] = args else { return None };
        id.parse::<usize>().ok().map(JobId)
    }
}
