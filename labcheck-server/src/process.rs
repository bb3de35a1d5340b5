//! Checker process execution: one subprocess per student, strictly in
//! sequence, with the combined output persisted and forwarded line by line.

use std::fmt;
use std::io;
use std::process::Stdio;
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::mpsc;

use crate::config::{CheckerPaths, ServerConfig};

/// How one student's check ended.
#[derive(Debug)]
pub enum CheckOutcome {
    /// The checker ran to completion and the result file was written.
    Done,
    /// Checker script or input file absent; no process was spawned.
    MissingFiles,
    /// The checker could not be spawned or its output could not be
    /// persisted.
    Failed(String),
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Done => f.write_str("✅ Готово"),
            CheckOutcome::MissingFiles => {
                f.write_str("❌ Скрипт или node_sessions.xls не найдены")
            }
            CheckOutcome::Failed(reason) => write!(f, "❌ Ошибка: {reason}"),
        }
    }
}

/// Lazy line sequence over a child's stdout and stderr, merged in arrival
/// order. Forward-only: once a pipe reports end of stream it stays closed.
pub struct OutputLines {
    stdout: Option<Lines<BufReader<ChildStdout>>>,
    stderr: Option<Lines<BufReader<ChildStderr>>>,
}

enum Next {
    Stdout(Option<String>),
    Stderr(Option<String>),
}

impl OutputLines {
    pub fn new(child: &mut Child) -> Self {
        Self {
            stdout: child.stdout.take().map(|out| BufReader::new(out).lines()),
            stderr: child.stderr.take().map(|err| BufReader::new(err).lines()),
        }
    }

    /// The next line from whichever pipe produces one first. `None` once
    /// both pipes are closed.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            let next = match (self.stdout.as_mut(), self.stderr.as_mut()) {
                (None, None) => return Ok(None),
                (Some(out), None) => Next::Stdout(out.next_line().await?),
                (None, Some(err)) => Next::Stderr(err.next_line().await?),
                // Both next_line calls are cancellation safe, no partial
                // line is lost by the losing branch.
                (Some(out), Some(err)) => tokio::select! {
                    line = out.next_line() => Next::Stdout(line?),
                    line = err.next_line() => Next::Stderr(line?),
                },
            };
            match next {
                Next::Stdout(Some(line)) | Next::Stderr(Some(line)) => return Ok(Some(line)),
                Next::Stdout(None) => self.stdout = None,
                Next::Stderr(None) => self.stderr = None,
            }
        }
    }
}

/// Runs the lab's checker for every selected student, one after another,
/// forwarding banners and checker output into `tx` as they are produced.
pub async fn run_checks(
    id: u64,
    config: Arc<ServerConfig>,
    lab: String,
    students: Vec<String>,
    tx: mpsc::Sender<String>,
) {
    send_line(&tx, format!("=== Проверка лабораторной {lab} ===")).await;

    let mut outcomes = Vec::with_capacity(students.len());
    for student in students {
        send_line(&tx, format!("--- Студент: {student} ---")).await;

        let paths = config.resolve(&lab, &student);
        let outcome = if paths.runnable() {
            match run_student(id, &config, &paths, &tx).await {
                Ok(()) => {
                    send_line(
                        &tx,
                        format!("✅ Готово, результат сохранён в {}", paths.result.display()),
                    )
                    .await;
                    CheckOutcome::Done
                }
                Err(e) => {
                    log::warn!(id, student:display; "checker failed: {e}");
                    let outcome = CheckOutcome::Failed(e.to_string());
                    send_line(&tx, outcome.to_string()).await;
                    outcome
                }
            }
        } else {
            let outcome = CheckOutcome::MissingFiles;
            send_line(&tx, outcome.to_string()).await;
            outcome
        };
        outcomes.push((student, outcome));
    }

    send_line(&tx, String::from("=== Проверка завершена ===")).await;

    let done = outcomes
        .iter()
        .filter(|(_, outcome)| matches!(outcome, CheckOutcome::Done))
        .count();
    log::info!(id, students = outcomes.len(), done; "check run finished");
}

/// Runs one student's checker, writing every output line through to the
/// result file while forwarding it to the response.
///
/// The result file is opened before the spawn and closed on every exit
/// path, matching the per-student scope of the run.
async fn run_student(
    id: u64,
    config: &ServerConfig,
    paths: &CheckerPaths,
    tx: &mpsc::Sender<String>,
) -> io::Result<()> {
    log::debug!(id, script:debug = paths.script, data:debug = paths.data; "spawning checker");

    let mut file = File::create(&paths.result).await?;

    let mut command = Command::new(&config.python);
    command
        .arg(&paths.script)
        .arg(&paths.data)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = command.spawn()?;

    let mut lines = OutputLines::new(&mut child);
    while let Some(line) = lines.next_line().await? {
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        send_line(tx, line).await;
    }

    // The status is only logged, a failing checker still counts as a
    // finished run with whatever it printed.
    let status = child.wait().await?;
    file.flush().await?;
    log::debug!(id, status:display = status; "checker exited");
    Ok(())
}

/// The receiver is the http response body. A closed receiver means the
/// client went away; the run still finishes so the result files stay
/// complete.
async fn send_line(tx: &mpsc::Sender<String>, line: String) {
    let _ = tx.send(line + "\n").await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Child {
        let mut command = Command::new("sh");
        command
            .args(["-c", script])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command.spawn().expect("sh is available")
    }

    #[tokio::test]
    async fn merges_both_pipes() {
        let mut child = sh("echo out; echo err 1>&2");
        let mut lines = OutputLines::new(&mut child);

        let mut seen = Vec::new();
        while let Some(line) = lines.next_line().await.expect("readable") {
            seen.push(line);
        }
        child.wait().await.expect("waitable");

        seen.sort();
        assert_eq!(seen, ["err", "out"]);
    }

    #[tokio::test]
    async fn preserves_emission_order_within_a_pipe() {
        let mut child = sh("echo one; echo two; echo three");
        let mut lines = OutputLines::new(&mut child);

        let mut seen = Vec::new();
        while let Some(line) = lines.next_line().await.expect("readable") {
            seen.push(line);
        }
        child.wait().await.expect("waitable");

        assert_eq!(seen, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn exhausted_sequence_stays_exhausted() {
        let mut child = sh("true");
        let mut lines = OutputLines::new(&mut child);

        while lines.next_line().await.expect("readable").is_some() {}
        child.wait().await.expect("waitable");

        assert!(lines.next_line().await.expect("readable").is_none());
    }

    #[test]
    fn outcome_status_strings() {
        assert_eq!(CheckOutcome::Done.to_string(), "✅ Готово");
        assert_eq!(
            CheckOutcome::MissingFiles.to_string(),
            "❌ Скрипт или node_sessions.xls не найдены"
        );
        assert_eq!(
            CheckOutcome::Failed(String::from("boom")).to_string(),
            "❌ Ошибка: boom"
        );
    }
}
