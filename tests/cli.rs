//! Binary-level behaviour: exit codes and console output.

use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};

const BIN: &str = env!("CARGO_BIN_EXE_coi-serve");

#[test]
fn missing_build_directory_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(BIN)
        .current_dir(dir.path())
        .env("COI_SERVE_SERVER__HOST", "127.0.0.1")
        .env("COI_SERVE_SERVER__PORT", "0")
        .output()
        .expect("run binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
    assert!(stderr.contains("build/web"), "stderr: {stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Serving web app"), "stdout: {stdout}");
}

#[cfg(unix)]
#[test]
fn interrupt_stops_server_with_code_0() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("build/web")).unwrap();

    let mut child = Command::new(BIN)
        .current_dir(dir.path())
        .env("COI_SERVE_SERVER__HOST", "127.0.0.1")
        .env("COI_SERVE_SERVER__PORT", "0")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn binary");

    let stdout = child.stdout.take().unwrap();
    let mut lines = BufReader::new(stdout).lines();
    let mut banner = Vec::new();
    for line in lines.by_ref() {
        let line = line.unwrap();
        let done = line.contains("Press Ctrl+C to stop");
        banner.push(line);
        if done {
            break;
        }
    }
    let banner = banner.join("\n");
    assert!(banner.contains("http://localhost:"), "banner: {banner}");
    assert!(banner.contains("Directory: build/web"), "banner: {banner}");

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("run kill");
    assert!(status.success());

    let exit = child.wait().unwrap();
    assert_eq!(exit.code(), Some(0));

    let rest: Vec<String> = lines.map_while(Result::ok).collect();
    assert!(
        rest.iter().any(|l| l.contains("Server stopped")),
        "output after interrupt: {rest:?}"
    );
}
