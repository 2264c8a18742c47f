//! Subprocess management and JSON IPC for the WINE bridge process.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use host_bridge_protocol::{Command, Request, Response, ResponseData, ResponseResult};

/// Errors from the Excel COM bridge transport.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Failed to spawn WINE bridge process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Bridge process not running")]
    NotRunning,

    #[error("Failed to send command to bridge: {0}")]
    SendFailed(String),

    #[error("Failed to read response from bridge: {0}")]
    ReadFailed(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bridge returned error: {0}")]
    HostFault(String),

    #[error("Unexpected response data")]
    UnexpectedResponse,

    #[error("WINE not found. Install WINE and ensure 'wine' is in PATH.")]
    WineNotFound,

    #[error("Bridge executable not found at: {0}")]
    BridgeExeNotFound(String),
}

impl From<BridgeError> for sheetdrive::HostError {
    fn from(e: BridgeError) -> Self {
        match e {
            BridgeError::NotRunning => sheetdrive::HostError::NotRunning,
            BridgeError::HostFault(message) => sheetdrive::HostError::Fault(message),
            BridgeError::UnexpectedResponse => sheetdrive::HostError::UnexpectedResponse,
            other => sheetdrive::HostError::Transport(other.to_string()),
        }
    }
}

/// Configuration for the Excel COM bridge.
pub struct BridgeConfig {
    /// Path to the `excel-com-bridge.exe` Windows executable.
    /// If None, will search in common locations relative to the current binary.
    pub bridge_exe_path: Option<PathBuf>,

    /// Path to the WINE executable. Defaults to "wine".
    pub wine_path: PathBuf,

    /// Optional WINEPREFIX to use (for isolating the WINE environment).
    pub wine_prefix: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bridge_exe_path: None,
            wine_path: PathBuf::from("wine"),
            wine_prefix: None,
        }
    }
}

/// The Excel COM automation host adapter.
///
/// Owns the WINE subprocess lifecycle and the JSON IPC channel. All methods
/// take `&self`; access to the child's pipes is serialized internally. The
/// process is spawned lazily by `launch`/`attach` (through the
/// [`sheetdrive::AutomationHost`] impl), not by [`ExcelComHost::new`].
pub struct ExcelComHost {
    config: BridgeConfig,
    child: Mutex<Option<Child>>,
    stdin: Mutex<Option<ChildStdin>>,
    stdout: Mutex<Option<BufReader<ChildStdout>>>,
    next_id: AtomicU64,
}

impl ExcelComHost {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            child: Mutex::new(None),
            stdin: Mutex::new(None),
            stdout: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Spawn the bridge process if it is not already running.
    pub(crate) fn spawn_bridge(&self) -> Result<(), BridgeError> {
        if self.stdin.lock().unwrap().is_some() {
            return Ok(());
        }

        let exe_path = self
            .config
            .bridge_exe_path
            .clone()
            .unwrap_or_else(find_bridge_exe);

        if !exe_path.exists() {
            return Err(BridgeError::BridgeExeNotFound(
                exe_path.display().to_string(),
            ));
        }

        let mut cmd = std::process::Command::new(&self.config.wine_path);

        if let Some(prefix) = &self.config.wine_prefix {
            cmd.env("WINEPREFIX", prefix);
        }

        cmd.arg(&exe_path);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::inherit()); // Bridge diagnostics go to our stderr

        tracing::info!(exe = %exe_path.display(), "spawning WINE bridge");
        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BridgeError::WineNotFound
            } else {
                BridgeError::SpawnFailed(e)
            }
        })?;

        let stdin = child.stdin.take().expect("stdin was piped");
        let stdout = child.stdout.take().expect("stdout was piped");

        *self.child.lock().unwrap() = Some(child);
        *self.stdin.lock().unwrap() = Some(stdin);
        *self.stdout.lock().unwrap() = Some(BufReader::new(stdout));

        Ok(())
    }

    /// Send a command to the bridge and wait for the response.
    pub(crate) fn send_command(
        &self,
        command: Command,
    ) -> Result<Option<ResponseData>, BridgeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let request = Request { id, command };
        let json = serde_json::to_string(&request)?;

        // Send the request
        {
            let mut stdin = self.stdin.lock().unwrap();
            let stdin = stdin.as_mut().ok_or(BridgeError::NotRunning)?;
            writeln!(stdin, "{json}").map_err(|e| BridgeError::SendFailed(e.to_string()))?;
            stdin
                .flush()
                .map_err(|e| BridgeError::SendFailed(e.to_string()))?;
        }

        // Read the response
        let response: Response = {
            let mut stdout = self.stdout.lock().unwrap();
            let stdout = stdout.as_mut().ok_or(BridgeError::NotRunning)?;
            let mut line = String::new();
            stdout
                .read_line(&mut line)
                .map_err(|e| BridgeError::ReadFailed(e.to_string()))?;

            if line.is_empty() {
                return Err(BridgeError::NotRunning);
            }

            serde_json::from_str(&line)?
        };

        match response.result {
            ResponseResult::Ok { data } => Ok(data),
            ResponseResult::Error { message } => Err(BridgeError::HostFault(message)),
        }
    }

    /// Send `Quit` (best-effort), then reap the bridge process.
    pub(crate) fn shutdown(&self) -> Result<(), BridgeError> {
        let _ = self.send_command(Command::Quit);
        self.teardown();
        Ok(())
    }

    /// Drop the pipes without quitting the host. The bridge exits on stdin
    /// EOF, releasing its COM references but leaving Excel running.
    pub(crate) fn teardown(&self) {
        self.stdin.lock().unwrap().take();
        self.stdout.lock().unwrap().take();
        if let Some(mut child) = self.child.lock().unwrap().take() {
            let _ = child.wait();
            tracing::info!("WINE bridge exited");
        }
    }
}

/// Convert a Linux filesystem path to a WINE (Windows) path.
///
/// WINE maps `/` to `Z:\`, so `/home/user/file.xlsx` becomes
/// `Z:\home\user\file.xlsx`. The WINE prefix's `drive_c` maps to `C:\`.
pub fn linux_to_wine_path(linux_path: &Path) -> String {
    let abs = if linux_path.is_absolute() {
        linux_path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(linux_path)
    };

    // WINE maps the root filesystem to Z:
    format!("Z:{}", abs.display()).replace('/', "\\")
}

/// Attempt to locate the bridge exe relative to the current executable or in
/// common paths.
fn find_bridge_exe() -> PathBuf {
    // Check next to the current executable
    if let Ok(mut exe) = std::env::current_exe() {
        exe.pop();
        let candidate = exe.join("excel-com-bridge.exe");
        if candidate.exists() {
            return candidate;
        }
    }

    // Check in the target directory (for development)
    let target_path = PathBuf::from("target/x86_64-pc-windows-gnu/release/excel-com-bridge.exe");
    if target_path.exists() {
        return target_path;
    }

    let target_path = PathBuf::from("target/x86_64-pc-windows-gnu/debug/excel-com-bridge.exe");
    if target_path.exists() {
        return target_path;
    }

    // Default: assume it's in the current directory
    PathBuf::from("excel-com-bridge.exe")
}
