//! `outmask run`: spawns a job command and redacts its stdout and stderr.
//!
//! Each pipe gets its own [`Redactor`], since a redactor carries per-stream state;
//! all of them share one compiled [`SkipTable`]. With `--merge-output` both
//! redactors write into a [`SharedWriter`] around stdout.

use std::io::{self, Write};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info, trace, warn};
use outmask_core::{RedactionStats, Redactor, RunReport, SharedWriter, SkipTable, StreamReport};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::{JoinError, JoinHandle};

use crate::cli::RunCommand;
use crate::commands::{finalize_run, info_msg, RunOptions};

type PumpHandle = JoinHandle<io::Result<RedactionStats>>;

/// Runs the job to completion. Returns the job's exit code.
pub async fn run_job(table: Arc<SkipTable>, cmd: &RunCommand, opts: &RunOptions) -> Result<i32> {
    let (program, args) = cmd.command.split_first().context("No command given to run")?;
    info!("Spawning job command '{}'.", program);
    let recorded: Vec<String> = cmd.command.iter().map(|arg| redact_arg(&table, arg)).collect();
    let mut report = RunReport::start(Some(recorded), table.needles().len());

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn '{}'", program))?;
    let child_stdout = child.stdout.take().context("Job stdout was not captured")?;
    let child_stderr = child.stderr.take().context("Job stderr was not captured")?;

    let (out_task, err_task): (PumpHandle, PumpHandle) = if cmd.merge_output {
        let shared = SharedWriter::new(io::stdout());
        (
            spawn_pump("stdout", child_stdout, Redactor::with_table(shared.clone(), Arc::clone(&table)), cmd.chunk_size),
            spawn_pump("stderr", child_stderr, Redactor::with_table(shared, Arc::clone(&table)), cmd.chunk_size),
        )
    } else {
        (
            spawn_pump("stdout", child_stdout, Redactor::with_table(io::stdout(), Arc::clone(&table)), cmd.chunk_size),
            spawn_pump("stderr", child_stderr, Redactor::with_table(io::stderr(), Arc::clone(&table)), cmd.chunk_size),
        )
    };

    let (out_res, err_res) = tokio::join!(out_task, err_task);
    let pumped = collect(out_res, "stdout").and_then(|out| collect(err_res, "stderr").map(|err| (out, err)));
    let (out_stats, err_stats) = match pumped {
        Ok(stats) => stats,
        Err(e) => {
            warn!("Output forwarding failed; stopping job.");
            let _ = child.kill().await;
            return Err(e);
        }
    };

    let status = child.wait().await.context("Failed to wait for job command")?;
    let exit_code = exit_code_of(status);
    debug!("Job exited with status {} (exit code {}).", status, exit_code);
    if exit_code != 0 && !opts.quiet {
        info_msg(format!("Job exited with code {}.", exit_code));
    }

    report.add_stream(StreamReport::from_stats("stdout", &table, &out_stats));
    report.add_stream(StreamReport::from_stats("stderr", &table, &err_stats));
    report.finish(Some(exit_code));
    finalize_run(&report, opts)?;
    Ok(exit_code)
}

fn spawn_pump<R, W>(name: &'static str, mut reader: R, mut redactor: Redactor<W>, chunk_size: usize) -> PumpHandle
where
    R: AsyncRead + Unpin + Send + 'static,
    W: Write + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; chunk_size.max(1)];
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            trace!("{}: read {} byte(s), {} retained.", name, n, redactor.retained_len());
            let chunk = buf[..n].to_vec();
            redactor = on_blocking_thread(redactor, move |r| {
                r.write_chunk(&chunk)?;
                r.flush()
            })
            .await?;
        }
        debug!("{}: reached EOF.", name);
        let redactor = on_blocking_thread(redactor, |r| r.finish()).await?;
        Ok::<_, io::Error>(redactor.stats().clone())
    })
}

/// Sink writes may block on a slow log consumer, so they run on the blocking pool.
async fn on_blocking_thread<W, F>(mut redactor: Redactor<W>, op: F) -> io::Result<Redactor<W>>
where
    W: Write + Send + 'static,
    F: FnOnce(&mut Redactor<W>) -> io::Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&mut redactor).map(|()| redactor))
        .await
        .map_err(io::Error::other)?
}

/// Command lines end up in the report, and may carry a secret themselves.
fn redact_arg(table: &Arc<SkipTable>, arg: &str) -> String {
    let mut redactor = Redactor::with_table(Vec::new(), Arc::clone(table));
    match redactor.write_chunk(arg.as_bytes()).and_then(|_| redactor.into_inner()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

fn collect(res: std::result::Result<io::Result<RedactionStats>, JoinError>, name: &str) -> Result<RedactionStats> {
    res.with_context(|| format!("Forwarding task for job {} failed", name))?
        .with_context(|| format!("Failed to forward job {}", name))
}

#[cfg(unix)]
fn exit_code_of(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::time::Duration;

    /// Holds its first write until `gate` fires.
    struct GatedSink {
        gate: Option<Receiver<()>>,
        out: Vec<u8>,
    }

    impl Write for GatedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Some(gate) = self.gate.take() {
                gate.recv_timeout(Duration::from_secs(5))
                    .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "other stream never got through"))?;
            }
            self.out.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Fires `signal` on its first write.
    struct SignalSink {
        signal: Option<Sender<()>>,
    }

    impl Write for SignalSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Some(signal) = self.signal.take() {
                let _ = signal.send(());
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_blocked_sink_does_not_stall_other_stream() {
        let table = Arc::new(SkipTable::compile(["hunter2"], "#"));
        let (tx, rx) = mpsc::channel();

        let slow_sink = GatedSink { gate: Some(rx), out: Vec::new() };
        let slow = spawn_pump("stdout", &b"pw=hunter2\n"[..], Redactor::with_table(slow_sink, Arc::clone(&table)), 64);
        let fast_sink = SignalSink { signal: Some(tx) };
        let fast = spawn_pump("stderr", &b"ok\n"[..], Redactor::with_table(fast_sink, table), 64);

        let (slow, fast) = tokio::join!(slow, fast);
        assert_eq!(fast.unwrap().unwrap().bytes_out, 3);
        let stats = slow.unwrap().unwrap();
        assert_eq!(stats.total_redactions(), 1);
        assert_eq!(stats.bytes_out, 5);
    }
}
