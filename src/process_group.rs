//! Unix process-group and signal plumbing.
//!
//! Generalizes the teacher's `job_control.rs` (`set_process_group`,
//! `send_continue_to_group`, `wait_for_pid`) from a single foreground
//! child to whole-process-group signalling and non-blocking reaping of
//! many concurrently running pipeline leaders, per §4.4 and §4.7.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set by the SIGCHLD handler; cleared and drained by the pre-block hook
/// (§5). The handler does the absolute minimum admissible in a signal
/// handler: store one flag and return.
static CHILD_STATUS_CHANGED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigchld(_signum: libc::c_int) {
    CHILD_STATUS_CHANGED.store(true, Ordering::SeqCst);
}

/// Install the supervisor's one and only signal handler. All other
/// signals retain their default disposition (§5).
pub fn install_sigchld_handler() -> io::Result<()> {
    let rc = unsafe { libc::signal(libc::SIGCHLD, on_sigchld as libc::sighandler_t) };
    if rc == libc::SIG_ERR {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Read and clear the child-status flag. Returns `true` if a drain pass
/// is warranted.
pub fn take_child_status_flag() -> bool {
    CHILD_STATUS_CHANGED.swap(false, Ordering::SeqCst)
}

/// Outcome of one reaped child-status change (§4.4).
#[derive(Debug, Clone, Copy)]
pub enum WaitOutcome {
    Exited(i32),
    Signaled(i32),
    Stopped,
    Continued,
}

/// Non-blocking `waitpid(-1, …)`: returns the next available status change
/// for any child of this process, or `None` if nothing is pending right
/// now. Called in a loop by the reaper until it drains (§4.4).
pub fn try_reap_any() -> io::Result<Option<(libc::pid_t, WaitOutcome)>> {
    let mut raw_status: libc::c_int = 0;
    loop {
        let pid = unsafe {
            libc::waitpid(
                -1,
                &mut raw_status,
                libc::WNOHANG | libc::WUNTRACED | libc::WCONTINUED,
            )
        };

        if pid == 0 {
            return Ok(None);
        }
        if pid < 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                continue;
            }
            if err.raw_os_error() == Some(libc::ECHILD) {
                // No children left to wait for.
                return Ok(None);
            }
            return Err(err);
        }

        let outcome = if unsafe { libc::WIFEXITED(raw_status) } {
            WaitOutcome::Exited(unsafe { libc::WEXITSTATUS(raw_status) })
        } else if unsafe { libc::WIFSIGNALED(raw_status) } {
            WaitOutcome::Signaled(unsafe { libc::WTERMSIG(raw_status) })
        } else if unsafe { libc::WIFSTOPPED(raw_status) } {
            WaitOutcome::Stopped
        } else if unsafe { libc::WIFCONTINUED(raw_status) } {
            WaitOutcome::Continued
        } else {
            continue;
        };

        return Ok(Some((pid, outcome)));
    }
}

/// Put `pid` into process group `pgid`, tolerating the races and benign
/// errors the teacher's `set_process_group` already accounts for (the
/// child may have already exec'd or exited by the time we call this from
/// the parent side).
pub fn set_process_group(pid: libc::pid_t, pgid: libc::pid_t) -> io::Result<()> {
    loop {
        let rc = unsafe { libc::setpgid(pid, pgid) };
        if rc == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(code) if code == libc::EINTR => continue,
            Some(code) if code == libc::EACCES || code == libc::ESRCH => return Ok(()),
            _ => return Err(err),
        }
    }
}

fn signal_group(pgid: libc::pid_t, signal: libc::c_int) -> io::Result<()> {
    if pgid <= 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "invalid process group id",
        ));
    }
    loop {
        let rc = unsafe { libc::kill(-pgid, signal) };
        if rc == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EINTR) {
            continue;
        }
        return Err(err);
    }
}

/// Send termination to every process in the group (§4.7 `cancel`).
pub fn send_terminate_to_group(pgid: libc::pid_t) -> io::Result<()> {
    signal_group(pgid, libc::SIGTERM)
}

/// Send stop to every process in the group (§4.7 `pause`).
pub fn send_stop_to_group(pgid: libc::pid_t) -> io::Result<()> {
    signal_group(pgid, libc::SIGSTOP)
}

/// Send continue to every process in the group (§4.7 `resume`, and the
/// second signal `cancel` sends to a paused job so termination can be
/// delivered).
pub fn send_continue_to_group(pgid: libc::pid_t) -> io::Result<()> {
    signal_group(pgid, libc::SIGCONT)
}
