//! Subprocess plumbing shared by all tool adapters.
//!
//! Each external tool runs as its own process with a hard wall-clock
//! deadline. On Unix every child is placed in its own process group so
//! cancellation can take the tool's own children down with it.

use crate::error::SourceError;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Live children of the current scan, keyed by tool name. The orchestrator
/// kills everything still registered when the global deadline fires or the
/// caller cancels the scan.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    inner: Mutex<HashMap<String, u32>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, tool: &str, pid: u32) {
        if let Ok(mut map) = self.inner.lock() {
            map.insert(tool.to_string(), pid);
        }
    }

    fn deregister(&self, tool: &str) {
        if let Ok(mut map) = self.inner.lock() {
            map.remove(tool);
        }
    }

    pub fn kill_all(&self) {
        let pids: Vec<(String, u32)> = match self.inner.lock() {
            Ok(mut map) => map.drain().collect(),
            Err(_) => return,
        };
        for (tool, pid) in pids {
            warn!(tool = %tool, pid, "killing still-running tool process group");
            kill_group(pid);
        }
    }
}

#[cfg(unix)]
fn kill_group(pid: u32) {
    // Negative pid signals the whole process group, so children spawned by
    // the tool itself do not survive as orphans.
    unsafe {
        libc::kill(-(pid as i32), libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}

/// Cheap local availability probe. Never runs an actual scan.
pub fn probe(binary: &str, args: &[&str]) -> bool {
    Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Run one tool invocation under a hard deadline. A hung tool is killed
/// (process group and all) and reported as `TimedOut`; it can never block
/// the orchestrator indefinitely.
pub fn run_tool(
    tool: &str,
    binary: &str,
    args: &[&str],
    cwd: &Path,
    timeout: Duration,
    registry: &ProcessRegistry,
) -> Result<CommandOutput, SourceError> {
    debug!(tool, binary, ?timeout, "invoking external tool");

    let mut command = Command::new(binary);
    command
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SourceError::NotInstalled);
        }
        Err(e) => {
            return Err(SourceError::NonZeroExit {
                code: -1,
                stderr: e.to_string(),
            });
        }
    };

    let pid = child.id();
    registry.register(tool, pid);

    // Drain pipes on their own threads; a tool emitting more than the pipe
    // buffer holds must not deadlock against our wait.
    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            kill_group(pid);
            let _ = child.kill();
            let _ = child.wait();
            registry.deregister(tool);
            return Err(SourceError::TimedOut {
                secs: timeout.as_secs(),
            });
        }
        Err(e) => {
            registry.deregister(tool);
            return Err(SourceError::NonZeroExit {
                code: -1,
                stderr: e.to_string(),
            });
        }
    };

    registry.deregister(tool);

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    Ok(CommandOutput {
        status: status.code().unwrap_or(-1),
        stdout,
        stderr,
    })
}

fn spawn_reader<R: Read + Send + 'static>(
    pipe: Option<R>,
) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_probe_missing_binary() {
        assert!(!probe("definitely-not-a-real-binary-xyz", &["--version"]));
    }

    #[test]
    fn test_run_tool_not_installed() {
        let registry = ProcessRegistry::new();
        let result = run_tool(
            "ghost",
            "definitely-not-a-real-binary-xyz",
            &[],
            Path::new("."),
            Duration::from_secs(5),
            &registry,
        );
        assert_eq!(result.unwrap_err(), SourceError::NotInstalled);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_tool_captures_output() {
        let registry = ProcessRegistry::new();
        let out = run_tool(
            "echo",
            "echo",
            &["hello"],
            Path::new("."),
            Duration::from_secs(5),
            &registry,
        )
        .unwrap();
        assert_eq!(out.status, 0);
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_tool_enforces_timeout() {
        let registry = ProcessRegistry::new();
        let start = Instant::now();
        let result = run_tool(
            "sleeper",
            "sleep",
            &["30"],
            Path::new("."),
            Duration::from_millis(200),
            &registry,
        );
        assert!(matches!(result, Err(SourceError::TimedOut { .. })));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn test_registry_kill_all_unblocks_wait() {
        use std::sync::Arc;

        let registry = Arc::new(ProcessRegistry::new());
        let worker_registry = Arc::clone(&registry);
        let handle = std::thread::spawn(move || {
            run_tool(
                "sleeper",
                "sleep",
                &["30"],
                Path::new("."),
                Duration::from_secs(30),
                &worker_registry,
            )
        });

        // Give the child a moment to spawn, then cancel it.
        std::thread::sleep(Duration::from_millis(300));
        let start = Instant::now();
        registry.kill_all();
        let result = handle.join().unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
        // Killed by signal: surfaces as a non-zero/-1 exit, not success.
        match result {
            Ok(out) => assert_ne!(out.status, 0),
            Err(_) => {}
        }
    }
}
