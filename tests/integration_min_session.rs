// Minimal integration test that drives the compiled binary through a PTY.
// This exercises the real event loop and crossterm input handling without
// relying on internal modules.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Marked Unix-only and ignored by default to avoid CI/platform issues.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn started_session_exits_back_to_setup_and_quits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("flits");
    let cmd = format!("{} --words vis --duration 1 --start", bin.display());

    let mut p = spawn(cmd)?;

    // Countdown is running for the only word
    std::thread::sleep(Duration::from_millis(300));

    // First ESC stops the session, second one quits from setup
    p.send("\x1b")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("\x1b")?;

    p.expect(Eof)?;
    Ok(())
}

#[test]
#[ignore]
fn list_prints_word_bank() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("flits");
    let mut p = spawn(format!("{} --list", bin.display()))?;

    p.expect("Groep 3")?;
    p.expect(Eof)?;
    Ok(())
}
