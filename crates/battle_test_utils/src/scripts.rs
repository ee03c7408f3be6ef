//! Stub engine executables for process-level tests.
//!
//! Each stub is a small `sh` script written into a temporary directory that
//! lives as long as the [`ScriptDir`].

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Temporary directory holding stub engine scripts.
#[derive(Debug)]
pub struct ScriptDir {
    dir: TempDir,
}

impl ScriptDir {
    /// Create an empty script directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create script dir"),
        }
    }

    /// Directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write an executable script named `name` running `body` under `sh`.
    ///
    /// # Panics
    ///
    /// Panics if the script cannot be written.
    #[must_use]
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
        path
    }

    /// Engine that drains stdin and prints `output`.
    #[must_use]
    pub fn echo(&self, name: &str, output: &str) -> PathBuf {
        self.script(name, &format!("cat > /dev/null\nprintf '%s' '{output}'"))
    }

    /// Engine that drains stdin and prints `prefix` followed by its seed
    /// argument and `suffix`.
    #[must_use]
    pub fn echo_seed(&self, name: &str, prefix: &str, suffix: &str) -> PathBuf {
        self.script(
            name,
            &format!("cat > /dev/null\nprintf '%s%s%s' '{prefix}' \"$1\" '{suffix}'"),
        )
    }

    /// Engine that copies stdin to `capture` and prints `output`.
    #[must_use]
    pub fn capture_input(&self, name: &str, capture: &Path, output: &str) -> PathBuf {
        self.script(
            name,
            &format!(
                "cat > '{}'\nprintf '%s' '{output}'",
                capture.display()
            ),
        )
    }

    /// Engine that writes `message` to stderr and exits with `code`.
    #[must_use]
    pub fn failing(&self, name: &str, message: &str, code: i32) -> PathBuf {
        self.script(
            name,
            &format!("cat > /dev/null\nprintf '%s' '{message}' >&2\nexit {code}"),
        )
    }

    /// Engine that records its pid in `pidfile`, then sleeps for `seconds`.
    ///
    /// `exec` keeps the recorded pid the one that gets killed.
    #[must_use]
    pub fn sleeping(&self, name: &str, pidfile: &Path, seconds: u32) -> PathBuf {
        self.script(
            name,
            &format!("echo $$ > '{}'\nexec sleep {seconds}", pidfile.display()),
        )
    }
}

impl Default for ScriptDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the process `pid` still exists (and is not a zombie).
#[cfg(target_os = "linux")]
#[must_use]
pub fn process_alive(pid: u32) -> bool {
    match fs::read_to_string(format!("/proc/{pid}/stat")) {
        // Field 3 is the state; `Z` means exited but not yet reaped by its parent.
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .and_then(|rest| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z"),
        Err(_) => false,
    }
}
