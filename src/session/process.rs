//! External downloader and player processes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::config::CommandSettings;
use crate::error::{Error, Result};

/// How often the exit watcher polls a running player.
const EXIT_POLL: Duration = Duration::from_millis(50);

/// Called once when a player process is gone, however it ended.
pub type ExitCallback = Box<dyn FnOnce() + Send + 'static>;

/// A running player.
pub trait PlaybackProcess: Send {
    fn pid(&self) -> u32;
    /// Best-effort stop; does not wait for the process to exit.
    fn terminate(&mut self);
}

/// The "run an external program" capability the session is built on.
pub trait ProcessRunner: Send + Sync {
    /// Fetch `url` into `dest`. Blocks until the downloader exits; success is exit code 0.
    /// `dest` must not exist until the download is complete.
    fn download(&self, url: &str, dest: &Path) -> Result<()>;

    /// Start playing `path`; `on_exit` fires when the player exits.
    fn play(&self, path: &Path, on_exit: ExitCallback) -> Result<Box<dyn PlaybackProcess>>;
}

/// Runs the configured programs with `std::process`.
pub struct SystemRunner {
    commands: CommandSettings,
}

impl SystemRunner {
    pub fn new(commands: CommandSettings) -> Self {
        Self { commands }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Hidden sibling the downloader writes to; the store never lists it.
fn partial_path(dest: &Path) -> PathBuf {
    dest.with_file_name(format!(".{}.part", file_label(dest)))
}

impl ProcessRunner for SystemRunner {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let program = &self.commands.download_program;
        let part = partial_path(dest);
        let mut cmd = Command::new(program);
        for flag in [&self.commands.download_silent_flag, &self.commands.download_output_flag] {
            if !flag.is_empty() {
                cmd.arg(flag);
            }
        }
        cmd.arg(&part)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        log::debug!("downloading {url} to {}", dest.display());
        let status = cmd.status().map_err(|e| Error::Download {
            filename: file_label(dest),
            code: None,
            reason: format!("cannot run {program}: {e}"),
        })?;

        if !status.success() {
            let _ = fs::remove_file(&part);
            return Err(Error::Download {
                filename: file_label(dest),
                code: status.code(),
                reason: format!("{program} exited with {status}"),
            });
        }

        // The clip only appears under its real name once it is complete.
        fs::rename(&part, dest).map_err(|e| {
            let _ = fs::remove_file(&part);
            Error::Download {
                filename: file_label(dest),
                code: Some(0),
                reason: format!("cannot move finished download into place: {e}"),
            }
        })
    }

    fn play(&self, path: &Path, on_exit: ExitCallback) -> Result<Box<dyn PlaybackProcess>> {
        let program = &self.commands.player_program;
        let child = Command::new(program)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| Error::PlaybackSpawn {
                program: program.clone(),
                source,
            })?;

        let pid = child.id();
        let child = Arc::new(Mutex::new(child));
        let watched = Arc::clone(&child);
        thread::spawn(move || {
            loop {
                let exited = match watched.lock() {
                    Ok(mut c) => !matches!(c.try_wait(), Ok(None)),
                    Err(_) => true,
                };
                if exited {
                    break;
                }
                thread::sleep(EXIT_POLL);
            }
            on_exit();
        });

        Ok(Box::new(ChildProcess { pid, child }))
    }
}

struct ChildProcess {
    pid: u32,
    child: Arc<Mutex<Child>>,
}

impl PlaybackProcess for ChildProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn terminate(&mut self) {
        if let Ok(mut c) = self.child.lock() {
            if let Err(e) = c.kill() {
                log::debug!("kill {} failed: {e}", self.pid);
            }
        }
    }
}
