//! Runs the waitgate binary and drives it with signals

use std::io::{BufRead, BufReader, Lines};
use std::process::{Child, ChildStdout, Command, Stdio};

fn launch(args: &[&str]) -> (Child, Lines<BufReader<ChildStdout>>) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_waitgate"))
        .args(args)
        .env("RUST_LOG", "waitgate=debug")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn waitgate");
    let stdout = child.stdout.take().expect("piped stdout");
    (child, BufReader::new(stdout).lines())
}

fn send(child: &Child, signal: libc::c_int) {
    unsafe {
        libc::kill(child.id() as libc::pid_t, signal);
    }
}

fn next_line(lines: &mut Lines<BufReader<ChildStdout>>) -> Option<String> {
    lines.next().map(|line| line.expect("read stdout"))
}

#[test]
fn reload_then_terminate_exits_cleanly() {
    let (mut child, mut lines) = launch(&["a", "b"]);

    assert_eq!(next_line(&mut lines).as_deref(), Some("started: [a, b]"));
    send(&child, libc::SIGHUP);
    assert_eq!(next_line(&mut lines).as_deref(), Some("reloaded"));
    send(&child, libc::SIGTERM);
    assert_eq!(next_line(&mut lines).as_deref(), Some("stopped"));

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(0));
    assert_eq!(next_line(&mut lines), None);
}

#[test]
fn arguments_pass_through_verbatim() {
    let (mut child, mut lines) = launch(&["--", "--flag", "two words", "-x"]);

    assert_eq!(
        next_line(&mut lines).as_deref(),
        Some("started: [--flag, two words, -x]")
    );
    send(&child, libc::SIGINT);
    assert_eq!(next_line(&mut lines).as_deref(), Some("stopped"));
    assert_eq!(child.wait().unwrap().code(), Some(0));
}

#[test]
fn no_arguments_prints_empty_list() {
    let (mut child, mut lines) = launch(&[]);
    assert_eq!(next_line(&mut lines).as_deref(), Some("started: []"));
    send(&child, libc::SIGTERM);
    assert_eq!(next_line(&mut lines).as_deref(), Some("stopped"));
    assert_eq!(child.wait().unwrap().code(), Some(0));
}

#[test]
fn interrupt_signal_exits_non_zero_without_stopping() {
    let (mut child, mut lines) = launch(&["--interrupt-signal", "USR1", "x"]);

    assert_eq!(next_line(&mut lines).as_deref(), Some("started: [x]"));
    send(&child, libc::SIGUSR1);

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(1));
    assert_eq!(next_line(&mut lines), None);
}

#[test]
fn interrupt_then_terminate_still_exits_interrupted() {
    for _ in 0..5 {
        let (mut child, mut lines) = launch(&["--interrupt-signal", "USR1", "x"]);

        assert_eq!(next_line(&mut lines).as_deref(), Some("started: [x]"));
        send(&child, libc::SIGUSR1);
        send(&child, libc::SIGTERM);

        let status = child.wait().unwrap();
        assert_eq!(status.code(), Some(1));
        assert_eq!(next_line(&mut lines), None);
    }
}

#[test]
fn unknown_interrupt_signal_is_a_usage_error() {
    let (mut child, mut lines) = launch(&["--interrupt-signal", "NOPE"]);
    assert_eq!(child.wait().unwrap().code(), Some(2));
    assert_eq!(next_line(&mut lines), None);
}

#[test]
fn unhandleable_interrupt_signal_fails_setup() {
    let (mut child, mut lines) = launch(&["--interrupt-signal", "KILL"]);
    assert_eq!(child.wait().unwrap().code(), Some(50));
    assert_eq!(next_line(&mut lines), None);
}
