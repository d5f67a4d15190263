//! Pipeline leader fork and per-stage process spawning (§4.3).
//!
//! Grounded on the teacher's `execute_pipeline`: a captured pgid threaded
//! into each stage's `pre_exec` closure to join a single process group,
//! pipes created with `os_pipe` between stages, and the printer/input
//! descriptors converted to `Stdio` the same way `OutputHandle`/
//! `InputHandle` do there. The outer fork of the pipeline *leader* itself
//! (absent from the teacher, which only ever runs in the foreground
//! process) is grounded on `cli.c`'s `run_job`, which forks once for the
//! leader and the leader forks again per conversion stage.

use std::fs::File;
use std::io;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Child, Command, ExitStatus, Stdio};

use os_pipe::pipe;

use crate::process_group;
use crate::registry::ConversionStep;
use crate::transport::PrinterTransport;

const DEFAULT_COPY_PROGRAM: &str = "cat";

/// What the spawner hands back to the dispatcher on success (§4.3 step 4):
/// the leader's pid, which doubles as the job's process-group id, and the
/// ordered stage program names for the job-started notification.
pub struct SpawnedPipeline {
    pub leader_pid: i32,
    pub stage_argv0s: Vec<String>,
}

/// Open the printer, fork the pipeline leader, and return immediately on the
/// parent side. Never runs the stages in the calling process.
///
/// The supervisor is single-threaded (§5), which is what makes the raw
/// `fork()` below sound: no other thread can be holding a lock the child
/// would deadlock retrying.
pub fn spawn_pipeline(
    file: &str,
    path: &[ConversionStep],
    printer_name: &str,
    printer_file_type: &str,
    transport: &dyn PrinterTransport,
) -> io::Result<SpawnedPipeline> {
    let printer_file = transport.connect(printer_name, printer_file_type)?;
    let input_file = File::open(file)?;

    let stage_argv: Vec<Vec<String>> = if path.is_empty() {
        vec![vec![DEFAULT_COPY_PROGRAM.to_string()]]
    } else {
        path.iter().map(|step| step.argv.clone()).collect()
    };
    let stage_argv0s: Vec<String> = stage_argv
        .iter()
        .map(|argv| argv[0].clone())
        .collect();

    // SAFETY: single-threaded parent, no locks held by any other thread to
    // inherit in a potentially inconsistent state across the fork.
    let leader_pid = unsafe { libc::fork() };

    if leader_pid < 0 {
        return Err(io::Error::last_os_error());
    }

    if leader_pid > 0 {
        // Parent side: close the race on the leader's new process group
        // (§4.3 step 2), then drop our copies of the descriptors the leader
        // now owns.
        process_group::set_process_group(leader_pid, leader_pid)?;
        drop(printer_file);
        drop(input_file);
        return Ok(SpawnedPipeline {
            leader_pid,
            stage_argv0s,
        });
    }

    run_leader(input_file, printer_file, stage_argv)
}

/// The pipeline leader. Never returns to the caller of `spawn_pipeline`.
fn run_leader(input_file: File, printer_file: File, stage_argv: Vec<Vec<String>>) -> ! {
    // Child side of the same race closed in the parent.
    let _ = process_group::set_process_group(0, 0);

    // §4.3 step 3a: unblock termination and broken-pipe so a cancelled
    // pipeline dies promptly even though the supervisor leaves them at
    // default disposition already — this is belt-and-braces against a
    // parent that had reset them before forking.
    unsafe {
        libc::signal(libc::SIGTERM, libc::SIG_DFL);
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    let leader_pid = unsafe { libc::getpid() };
    let exit_code = run_stages(input_file, printer_file, &stage_argv, leader_pid);
    std::process::exit(exit_code);
}

/// Spawn every stage, wiring stdin/stdout through pipes (or the input file
/// for stage 0 / the printer descriptor for the last stage), and wait for
/// all of them. Returns the aggregate exit code (§4.3 step 3d): the first
/// non-zero/signalled stage's code, or 0 if every stage exited cleanly.
fn run_stages(
    input_file: File,
    printer_file: File,
    stage_argv: &[Vec<String>],
    leader_pid: libc::pid_t,
) -> i32 {
    let last_index = stage_argv.len() - 1;
    let mut children: Vec<Child> = Vec::with_capacity(stage_argv.len());
    let mut next_stdin = Stdio::from(input_file);

    for (idx, argv) in stage_argv.iter().enumerate() {
        let is_last = idx == last_index;

        let stdout = if is_last {
            match printer_file.try_clone() {
                Ok(file) => Stdio::from(file),
                Err(_) => return kill_and_fail(children),
            }
        } else {
            match pipe() {
                Ok((reader, writer)) => {
                    let this_stdin = std::mem::replace(&mut next_stdin, Stdio::from(reader));
                    match spawn_stage(argv, this_stdin, Stdio::from(writer), leader_pid) {
                        Ok(child) => {
                            children.push(child);
                            continue;
                        }
                        Err(_) => return kill_and_fail(children),
                    }
                }
                Err(_) => return kill_and_fail(children),
            }
        };

        let this_stdin = std::mem::replace(&mut next_stdin, Stdio::null());
        match spawn_stage(argv, this_stdin, stdout, leader_pid) {
            Ok(child) => children.push(child),
            Err(_) => return kill_and_fail(children),
        }
    }

    wait_for_all(children)
}

fn kill_and_fail(children: Vec<Child>) -> i32 {
    for mut child in children {
        let _ = child.kill();
        let _ = child.wait();
    }
    1
}

fn spawn_stage(
    argv: &[String],
    stdin: Stdio,
    stdout: Stdio,
    leader_pid: libc::pid_t,
) -> io::Result<Child> {
    let mut command = Command::new(&argv[0]);
    command.args(&argv[1..]);
    command.stdin(stdin).stdout(stdout).stderr(Stdio::inherit());

    // Join the leader's process group rather than create a new one — the
    // whole pipeline lives in the group the spawner already registered as
    // the job's pgid.
    unsafe {
        command.pre_exec(move || {
            if libc::setpgid(0, leader_pid) != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }

    command.spawn()
}

fn wait_for_all(children: Vec<Child>) -> i32 {
    let mut aggregate = 0;
    for mut child in children {
        match child.wait() {
            Ok(status) => {
                let code = exit_code(status);
                if code != 0 && aggregate == 0 {
                    aggregate = code;
                }
            }
            Err(_) => {
                if aggregate == 0 {
                    aggregate = 1;
                }
            }
        }
    }
    aggregate
}

/// Maps `ExitStatus` to the code the leader exits with: a normal exit keeps
/// its status, a signal death propagates the raw signal number (§4.3d) —
/// not the teacher's shell-style `128 + signal` offset.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    if let Some(signal) = status.signal() {
        return signal;
    }
    1
}
