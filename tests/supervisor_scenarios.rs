//! End-to-end scenarios S1-S6 (SPEC_FULL §8). Spawns the built binary with
//! piped stdin/stdout, exactly as the teacher's `signal_handling.rs` and
//! `job_control_regressions.rs` do, using real external commands (`cat`,
//! `false`, `sleep`) as conversion stages. Unix-only: the spawner's
//! process-group and signal semantics have no portable equivalent.

#![cfg(unix)]

use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

struct Supervisor {
    child: Child,
}

impl Supervisor {
    fn spawn(spool_dir: &std::path::Path) -> Self {
        let child = Command::new(env!("CARGO_BIN_EXE_imprimer"))
            .env("IMPRIMER_SPOOL_DIR", spool_dir)
            .env("IMPRIMER_RETENTION_SECS", "1")
            .env("RUST_LOG", "off")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn imprimer");
        Self { child }
    }

    fn send(&mut self, line: &str) {
        let stdin = self.child.stdin.as_mut().expect("stdin");
        writeln!(stdin, "{line}").expect("write line");
        std::thread::sleep(Duration::from_millis(150));
    }

    fn finish(mut self) -> String {
        {
            let stdin = self.child.stdin.as_mut().expect("stdin");
            let _ = writeln!(stdin, "quit");
        }
        let output = self.child.wait_with_output().expect("wait output");
        String::from_utf8_lossy(&output.stdout).into_owned()
    }
}

fn write_input_file(dir: &std::path::Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write input file");
    path.to_str().unwrap().to_string()
}

#[test]
fn s1_happy_path_no_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let spool = dir.path().join("spool");
    let file = write_input_file(dir.path(), "f.txt", "hello\n");

    let mut sup = Supervisor::spawn(&spool);
    sup.send("type txt");
    sup.send("printer p1 txt");
    sup.send("enable p1");
    sup.send(&format!("print {file}"));
    sup.send("jobs");

    let stdout = sup.finish();
    assert!(stdout.contains("job-started"), "stdout was: {stdout}");
    assert!(stdout.contains("job-finished 0 exit=0"), "stdout was: {stdout}");
    assert!(stdout.contains("0 txt") && stdout.contains("finished"), "stdout was: {stdout}");
}

#[test]
fn s2_two_stage_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let spool = dir.path().join("spool");
    let file = write_input_file(dir.path(), "f.a", "payload\n");

    let mut sup = Supervisor::spawn(&spool);
    sup.send("type a");
    sup.send("type b");
    sup.send("type c");
    sup.send("conversion a b cat");
    sup.send("conversion b c cat");
    sup.send("printer p1 c");
    sup.send("enable p1");
    sup.send(&format!("print {file}"));
    sup.send("jobs");

    let stdout = sup.finish();
    assert!(
        stdout.contains("stages=[cat,cat]"),
        "stdout was: {stdout}"
    );
    assert!(stdout.contains("job-finished 0 exit=0"), "stdout was: {stdout}");
}

#[test]
fn s3_pause_resume_cancel() {
    let dir = tempfile::tempdir().unwrap();
    let spool = dir.path().join("spool");
    let file = write_input_file(dir.path(), "f.a", "payload\n");

    let mut sup = Supervisor::spawn(&spool);
    sup.send("type a");
    sup.send("type c");
    sup.send("conversion a c sleep 5");
    sup.send("printer p1 c");
    sup.send("enable p1");
    sup.send(&format!("print {file}"));
    sup.send("pause 0");
    sup.send("resume 0");
    sup.send("cancel 0");
    sup.send("jobs");

    let stdout = sup.finish();
    assert!(stdout.contains("job-status 0 paused"), "stdout was: {stdout}");
    assert!(stdout.contains("job-status 0 running"), "stdout was: {stdout}");
    assert!(
        stdout.contains("job-aborted 0"),
        "stdout was: {stdout}"
    );
}

#[test]
fn s4_eligibility_restriction_prefers_named_printer() {
    let dir = tempfile::tempdir().unwrap();
    let spool = dir.path().join("spool");
    let file = write_input_file(dir.path(), "f.c", "payload\n");

    let mut sup = Supervisor::spawn(&spool);
    sup.send("type c");
    sup.send("printer p1 c");
    sup.send("printer p2 c");
    sup.send("enable p1");
    sup.send("enable p2");
    sup.send(&format!("print {file} p2"));
    sup.send("jobs");

    let stdout = sup.finish();
    assert!(stdout.contains("job-started 0 printer=p2"), "stdout was: {stdout}");
    assert!(!stdout.contains("printer=p1"), "stdout was: {stdout}");
}

#[test]
fn s5_failing_stage_aborts_job() {
    let dir = tempfile::tempdir().unwrap();
    let spool = dir.path().join("spool");
    let file = write_input_file(dir.path(), "f.a", "payload\n");

    let mut sup = Supervisor::spawn(&spool);
    sup.send("type a");
    sup.send("type b");
    sup.send("conversion a b false");
    sup.send("printer p1 b");
    sup.send("enable p1");
    sup.send(&format!("print {file}"));
    sup.send("jobs");

    let stdout = sup.finish();
    assert!(stdout.contains("job-aborted 0"), "stdout was: {stdout}");
}

#[test]
fn s6_cancel_of_never_started_job() {
    let dir = tempfile::tempdir().unwrap();
    let spool = dir.path().join("spool");
    let file = write_input_file(dir.path(), "f.a", "payload\n");

    let mut sup = Supervisor::spawn(&spool);
    sup.send("type a");
    sup.send(&format!("print {file}"));
    sup.send("cancel 0");
    sup.send("jobs");

    let stdout = sup.finish();
    assert!(
        stdout.contains("job-aborted 0 exit=Some(0) signal=None"),
        "stdout was: {stdout}"
    );
}
