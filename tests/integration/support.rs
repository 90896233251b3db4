// Shared fixtures: a temp directory standing in for /etc/iet and /proc/net/iet,
// plus a command runner that records instead of executing

use ietlv::core::{CommandOutput, CommandRunner, Config, Overrides, TargetManager};
use ietlv::Result;
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const BASE: &str = "iqn.2007-12.net.enpraxis";

#[derive(Default)]
pub struct FakeRunner {
    pub daemon_down: bool,
    /// Command-line prefixes that should exit with the given status
    pub failures: Vec<(String, i32)>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub fn failing(prefix: &str, code: i32) -> Self {
        Self {
            failures: vec![(prefix.to_string(), code)],
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Calls other than the pgrep liveness probe
    pub fn actions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("pgrep"))
            .collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let line = format!("{} {}", program, args.join(" "));
        self.calls.borrow_mut().push(line.clone());

        if program == "pgrep" {
            return Ok(if self.daemon_down {
                CommandOutput {
                    status: Some(1),
                    ..Default::default()
                }
            } else {
                CommandOutput {
                    status: Some(0),
                    stdout: "812\n".to_string(),
                    stderr: String::new(),
                }
            });
        }

        let status = self
            .failures
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map_or(0, |(_, code)| *code);

        Ok(CommandOutput {
            status: Some(status),
            stdout: String::new(),
            stderr: if status == 0 {
                String::new()
            } else {
                format!("{} failed", program)
            },
        })
    }
}

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new(volume_table: &str, ietd_conf: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("volume"), volume_table).unwrap();
        fs::write(dir.path().join("session"), "tid:1 name:iqn.2007-12.net.enpraxis:web\n").unwrap();
        fs::write(dir.path().join("ietd.conf"), ietd_conf).unwrap();
        Self { dir }
    }

    pub fn ietd_conf_path(&self) -> PathBuf {
        self.dir.path().join("ietd.conf")
    }

    pub fn ietd_conf(&self) -> String {
        fs::read_to_string(self.ietd_conf_path()).unwrap()
    }

    pub fn config(&self) -> Config {
        Config {
            iqn_base: Some(BASE.to_string()),
            volgroup: Some("vg_spare".to_string()),
            ietd_config: self.ietd_conf_path(),
            volume_table: self.dir.path().join("volume"),
            session_table: self.dir.path().join("session"),
            ..Default::default()
        }
    }

    pub fn manager(&self, runner: FakeRunner) -> TargetManager<FakeRunner> {
        let settings = self.config().resolve(&Overrides::default()).unwrap();
        TargetManager::with_runner(settings, runner)
    }
}
