use std::{
    io::{BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    path::Path,
    process::{Command, Output, Stdio},
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Duration,
};

#[derive(Debug)]
struct Captured {
    request_line: String,
    headers: Vec<String>,
    body: String,
}

/// Minimal HTTP/1.1 endpoint standing in for the error-reporting backend.
fn fake_backend() -> (String, Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            let tx = tx.clone();
            thread::spawn(move || serve(stream, tx));
        }
    });

    (format!("http://testkey@{}/7", addr), rx)
}

fn serve(mut stream: TcpStream, tx: Sender<Captured>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    loop {
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).unwrap_or(0) == 0 {
            return;
        }

        let mut headers = Vec::new();
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                return;
            }
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
            headers.push(line.to_string());
        }

        let mut body = vec![0; content_length];
        if reader.read_exact(&mut body).is_err() {
            return;
        }

        let _ = tx.send(Captured {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        });

        if stream
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
            .is_err()
        {
            return;
        }
    }
}

fn sevlog(args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sevlog"));
    cmd.args(args)
        .env_remove("SEVLOG_DSN")
        .env_remove("SEVLOG_LOG_FILE")
        .stdin(Stdio::null());
    cmd
}

fn run(args: &[&str]) -> Output {
    sevlog(args).output().unwrap()
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn quiet_info_goes_to_the_log_file_only() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");

    let output = run(&["info", "hello", "world", "--log-file", log.to_str().unwrap()]);

    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("hello world"));
    let contents = read(&log);
    assert!(contents.starts_with("INFO : "), "{contents}");
    assert!(contents.trim_end().ends_with("hello world"));
}

#[test]
fn verbose_info_also_goes_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");

    let output = run(&["info", "visible", "--verbose", "--log-file", log.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("INFO : ") && stdout.contains("visible"), "{stdout}");
    assert!(read(&log).contains("visible"));
}

#[test]
fn verbose_errors_go_to_stderr() {
    let output = run(&["error", "broken", "-v"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: "));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("broken"));
}

#[test]
fn pipe_logs_each_stdin_line() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("pipe.log");

    let mut child = sevlog(&["pipe", "-s", "warning", "--log-file", log.to_str().unwrap()])
        .stdin(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"first\nsecond\n")
        .unwrap();
    assert!(child.wait().unwrap().success());

    let lines: Vec<_> = read(&log).lines().map(str::to_owned).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line.starts_with("WARN : ")));
    assert!(lines[0].ends_with("first") && lines[1].ends_with("second"));
}

#[test]
fn fatal_flushes_remote_and_exits_non_zero() {
    let (dsn, requests) = fake_backend();
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("fatal.log");

    let output = run(&[
        "fatal",
        "boom",
        "--name",
        "worker",
        "--dsn",
        &dsn,
        "--log-file",
        log.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));

    let contents = read(&log);
    assert!(contents.starts_with("FATAL: "), "{contents}");
    assert!(contents.contains("boom"));

    let request = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(request.request_line.starts_with("POST /api/7/store/"));
    assert!(request
        .headers
        .iter()
        .any(|h| h.to_ascii_lowercase().starts_with("x-sentry-auth") && h.contains("sentry_key=testkey")));

    let payload: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(payload["level"], "fatal");
    assert_eq!(payload["logger"], "worker");
    assert!(payload["message"]["formatted"]
        .as_str()
        .unwrap()
        .ends_with("boom"));

    assert!(requests.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn close_drains_pending_remote_deliveries() {
    let (dsn, requests) = fake_backend();

    let output = run(&["warning", "disk", "low", "--dsn", &dsn]);

    assert!(output.status.success());
    let request = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    let payload: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(payload["level"], "warning");
    assert!(payload["message"]["formatted"]
        .as_str()
        .unwrap()
        .ends_with("disk low"));
}

#[test]
fn invalid_dsn_keeps_local_logging_alive() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("app.log");

    let output = run(&[
        "info",
        "still logging",
        "--dsn",
        "https://missing-key.example.com/1",
        "--log-file",
        log.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let contents = read(&log);
    assert!(contents.contains("ERROR: "));
    assert!(contents.contains("remote reporting disabled"));
    assert!(contents.contains("still logging"));
}
