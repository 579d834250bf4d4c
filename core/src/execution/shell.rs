use std::{
    fs::File,
    path::PathBuf,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use anyhow::Context as _;
use tokio::{
    io::AsyncReadExt as _,
    process::{Child, Command},
};

use super::{model::*, Executor};

/// Runs a request as `<shell> -c <command>`, redirecting stdin/stdout to the
/// requested files.
///
/// The time limit is enforced as a wall-clock timeout; an expired process is
/// killed along with everything it forked, and reported with
/// `exceeded_cpu_limits`. The memory limit is applied with `ulimit -v` inside
/// the shell script. At most [`Self::MAX_STDERR_BYTES`] of stderr are kept.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: PathBuf,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellExecutor {
    pub const DEFAULT_SHELL: &str = "/bin/sh";
    pub const MAX_STDERR_BYTES: u64 = 1 << 20;

    pub fn new() -> Self {
        Self {
            shell: Self::DEFAULT_SHELL.into(),
        }
    }

    pub fn shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    fn make_script(req: &ExecutionRequest) -> anyhow::Result<String> {
        let Some(mb) = req.memory_limit else {
            return Ok(req.command.clone());
        };
        let kb = mb
            .checked_mul(1024)
            .with_context(|| format!("Memory limit too large: {} MB", mb))?;
        Ok(format!("ulimit -v {}; {}", kb, req.command))
    }

    async fn run(&self, req: &ExecutionRequest) -> anyhow::Result<ExecutionResult> {
        let stdin = match &req.input_filename {
            Some(path) => File::open(path)
                .map(Stdio::from)
                .with_context(|| format!("Failed to open input file {}", path.to_string_lossy()))?,
            None => Stdio::null(),
        };
        let stdout = match &req.output_filename {
            Some(path) => File::create(path)
                .map(Stdio::from)
                .with_context(|| {
                    format!("Failed to create output file {}", path.to_string_lossy())
                })?,
            None => Stdio::null(),
        };

        let script = Self::make_script(req)?;
        let mut cmd = Command::new(&self.shell);
        cmd.args(["-c", &script])
            .stdin(stdin)
            .stdout(stdout)
            .stderr(Stdio::piped());
        // Own process group, so a timeout can take down forked children too.
        #[cfg(unix)]
        cmd.process_group(0);
        let mut proc = cmd
            .spawn()
            .with_context(|| {
                format!(
                    "Failed to spawn '{} -c {}'",
                    self.shell.to_string_lossy(),
                    &script
                )
            })?;
        let mut stderr = proc.stderr.take().context("Failed to open stderr")?;
        let mut stderr_buf = Vec::new();

        let start_at = tokio::time::Instant::now();
        let res = {
            let capture = async {
                let mut head = (&mut stderr).take(Self::MAX_STDERR_BYTES);
                let n = tokio::io::copy(&mut head, &mut stderr_buf).await?;
                // Keep draining so the child never blocks on a full pipe.
                tokio::io::copy(&mut stderr, &mut tokio::io::sink()).await?;
                Ok::<_, std::io::Error>(n)
            };
            let fut = async {
                tokio::try_join!(capture, proc.wait())
                    .context("Failed to communicate with subprocess")
            };
            match req.time_limit {
                Some(secs) => tokio::time::timeout(Duration::from_secs(secs), fut)
                    .await
                    .ok(),
                None => Some(fut.await),
            }
        };
        let elapsed = tokio::time::Instant::now().duration_since(start_at);

        let info = match res {
            None => {
                self.kill_tle_process(&mut proc).await;
                ExecutionInfo::signaled("SIGKILL").exceeded_cpu_limits(true)
            }
            Some(Err(e)) => return Err(e),
            Some(Ok((_, status))) => Self::make_execution_info(status),
        };

        Ok(ExecutionResult {
            info,
            stderr: String::from_utf8_lossy(&stderr_buf).into(),
            elapsed,
        })
    }

    async fn kill_tle_process(&self, proc: &mut Child) {
        #[cfg(unix)]
        if let Some(pgid) = proc.id() {
            let status = Command::new(&self.shell)
                .args(["-c", &format!("kill -s KILL -- -{}", pgid)])
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;
            match status {
                Ok(s) if s.success() => {
                    if let Err(e) = proc.wait().await {
                        log::warn!("Failed to reap TLE process: {:#}", e);
                    }
                    return;
                }
                Ok(s) => log::warn!("Failed to kill process group {}: {}", pgid, s),
                Err(e) => log::warn!("Failed to kill process group {}: {:#}", pgid, e),
            }
        }
        proc.kill()
            .await
            .unwrap_or_else(|e| log::warn!("Failed to kill TLE process: {:#}", e));
    }

    fn make_execution_info(status: ExitStatus) -> ExecutionInfo {
        match self::terminating_signal(&status) {
            Some(signo) => {
                let name = self::signal_name(signo);
                let exceeded = name == "SIGXCPU";
                ExecutionInfo::signaled(name).exceeded_cpu_limits(exceeded)
            }
            None => ExecutionInfo {
                exit_code: status.code(),
                ..Default::default()
            },
        }
    }
}

impl Executor for ShellExecutor {
    fn execute(&self, request: &ExecutionRequest) -> anyhow::Result<ExecutionResult> {
        log::debug!("Executing: {}", request.command);
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start process runtime")?;
        rt.block_on(self.run(request))
    }
}

#[cfg(unix)]
fn terminating_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

fn signal_name(signo: i32) -> String {
    const NAMES: [&str; 31] = [
        "SIGHUP", "SIGINT", "SIGQUIT", "SIGILL", "SIGTRAP", "SIGABRT", "SIGBUS", "SIGFPE",
        "SIGKILL", "SIGUSR1", "SIGSEGV", "SIGUSR2", "SIGPIPE", "SIGALRM", "SIGTERM",
        "SIGSTKFLT", "SIGCHLD", "SIGCONT", "SIGSTOP", "SIGTSTP", "SIGTTIN", "SIGTTOU", "SIGURG",
        "SIGXCPU", "SIGXFSZ", "SIGVTALRM", "SIGPROF", "SIGWINCH", "SIGIO", "SIGPWR", "SIGSYS",
    ];
    usize::try_from(signo - 1)
        .ok()
        .and_then(|i| NAMES.get(i))
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("SIG{}", signo))
}
