use crate::error::RenderError;
use std::io::{self, Read, Write};
use std::process::{Child, Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Runs `cmd` with `input` on stdin and collects its output.
///
/// A program that cannot be found maps to [`RenderError::DependencyMissing`]
/// with `missing_hint` attached. Exit status is left for the caller to judge.
pub fn run_piped(
    cmd: &mut Command,
    input: Vec<u8>,
    timeout: Option<Duration>,
    missing_hint: &str,
) -> Result<Output, RenderError> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    debug!("spawn {} stdin_bytes={} timeout={:?}", program, input.len(), timeout);

    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(RenderError::DependencyMissing {
                dependency: program,
                hint: missing_hint.to_string(),
            });
        }
        Err(err) => return Err(err.into()),
    };

    // Feed stdin from its own thread so a child that writes before it has
    // read everything can't deadlock against us.
    let stdin = child.stdin.take();
    let feeder = thread::spawn(move || -> io::Result<()> {
        let Some(mut stdin) = stdin else {
            return Ok(());
        };
        match stdin.write_all(&input) {
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
    });

    // On timeout the feeder is left behind: a grandchild may still hold the
    // pipe, and waiting on it would outlast the limit.
    let output = wait_with_timeout(&mut child, timeout)?;
    feeder
        .join()
        .map_err(|_| RenderError::failed("stdin writer thread panicked"))??;
    Ok(output)
}

fn drain<R: Read + Send + 'static>(reader: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut r) = reader {
            r.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join_drain(handle: JoinHandle<io::Result<Vec<u8>>>, name: &str) -> Result<Vec<u8>, RenderError> {
    handle
        .join()
        .map_err(|_| RenderError::failed(format!("{name} reader thread panicked")))?
        .map_err(RenderError::from)
}

fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> Result<Output, RenderError> {
    let stdout_thread = drain(child.stdout.take());
    let stderr_thread = drain(child.stderr.take());

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            let stdout = join_drain(stdout_thread, "stdout")?;
            let stderr = join_drain(stderr_thread, "stderr")?;
            return Ok(Output {
                status,
                stdout,
                stderr,
            });
        }

        if let Some(limit) = timeout
            && start.elapsed() > limit
        {
            warn!("renderer process timed out after {:?}", limit);
            let _ = child.kill();
            child.wait()?;
            // The readers are detached, not joined. Anything the killed child
            // spawned can keep the pipes open well past the limit; the threads
            // finish on their own once the last writer goes away.
            drop(stdout_thread);
            drop(stderr_thread);
            return Err(RenderError::Timeout {
                secs: limit.as_secs(),
            });
        }

        thread::sleep(Duration::from_millis(20));
    }
}
