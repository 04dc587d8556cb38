//! Orchestrator wired to the real Lima and docker adapters over a simulated
//! `limactl` and host.

#![allow(clippy::expect_used)]

use std::cell::{Cell, RefCell};
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{ExitStatus, Output};
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use berth_cli::application::ports::{
    CommandRunner, ContainerRuntime, DependencyLookup, GuestVm, HostActions, ProgressReporter,
};
use berth_cli::application::services::lifecycle::Orchestrator;
use berth_cli::domain::{StageError, VmConfig};
use berth_cli::infra::docker::{DockerRuntime, DockerSettings};
use berth_cli::infra::lima::LimaVm;
use tempfile::TempDir;

type Log = Rc<RefCell<Vec<String>>>;

fn output(code: i32, stdout: &str, stderr: &str) -> Output {
    Output {
        status: ExitStatus::from_raw(code << 8),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// A pretend Lima installation with a single Ubuntu guest.
#[derive(Default)]
struct Limactl {
    log: Log,
    created: Cell<bool>,
    running: Cell<bool>,
    docker_installed: Cell<bool>,
    in_docker_group: Cell<bool>,
    failing: RefCell<Vec<&'static str>>,
}

impl Limactl {
    fn respond(&self, line: &str) -> Output {
        if self.failing.borrow().iter().any(|f| line.contains(f)) {
            return output(100, "", "E: simulated failure");
        }
        if line.starts_with("limactl list") {
            let list = match (self.created.get(), self.running.get()) {
                (false, _) => "",
                (true, true) => "berth Running\n",
                (true, false) => "berth Stopped\n",
            };
            return output(0, list, "");
        }
        if line.contains("command -v docker") {
            return output(i32::from(!self.docker_installed.get()), "", "");
        }
        if line.contains("getent group docker") {
            return output(i32::from(!self.in_docker_group.get()), "", "");
        }
        if line.starts_with("limactl create") {
            self.created.set(true);
        } else if line.starts_with("limactl start") {
            self.running.set(true);
        } else if line.starts_with("limactl stop") {
            self.running.set(false);
        } else if line.starts_with("limactl delete") {
            self.created.set(false);
            self.running.set(false);
        } else if line.contains("install -y docker.io") {
            self.docker_installed.set(true);
        } else if line.contains("usermod -aG docker") {
            self.in_docker_group.set(true);
        }
        output(0, "", "")
    }
}

struct SharedRunner(Rc<Limactl>);

impl CommandRunner for SharedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, Duration::from_secs(1))
            .await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<Output> {
        let line = format!("{program} {}", args.join(" "));
        let out = self.0.respond(&line);
        let query = line.starts_with("limactl list")
            || line.contains("command -v docker")
            || line.contains("getent group docker");
        if !query {
            self.0.log.borrow_mut().push(line);
        }
        Ok(out)
    }
}

struct RecordingHost(Log);

#[async_trait(?Send)]
impl HostActions for RecordingHost {
    async fn run(&self, args: &[&str]) -> Result<()> {
        self.0.borrow_mut().push(format!("host {}", args.join(" ")));
        Ok(())
    }
}

struct Quiet;
impl ProgressReporter for Quiet {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

struct Installed(&'static [&'static str]);
impl DependencyLookup for Installed {
    fn is_available(&self, command: &str) -> bool {
        self.0.iter().any(|c| *c == command)
    }
}

struct Harness {
    limactl: Rc<Limactl>,
    dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        Self {
            limactl: Rc::new(Limactl::default()),
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn docker_settings(&self) -> DockerSettings {
        DockerSettings {
            app_name: "berth".to_string(),
            app_dir: self.dir.path().join("app"),
            launch_agents_dir: self.dir.path().join("LaunchAgents"),
            ssh_port: 41122,
        }
    }

    fn plist(&self) -> PathBuf {
        self.dir.path().join("LaunchAgents").join("com.berth.berth.plist")
    }

    fn orchestrator(&self, lookup: &Installed) -> Result<Orchestrator> {
        self.orchestrator_with(VmConfig::default(), lookup)
    }

    fn orchestrator_with(&self, vm: VmConfig, lookup: &Installed) -> Result<Orchestrator> {
        let host: Rc<dyn HostActions> = Rc::new(RecordingHost(Rc::clone(&self.limactl.log)));
        let vm: Rc<dyn GuestVm> = Rc::new(LimaVm::new(
            SharedRunner(Rc::clone(&self.limactl)),
            host,
            vm,
        ));
        let docker = DockerRuntime::new(self.docker_settings(), Rc::clone(&vm), Rc::new(Quiet));
        let containers: Vec<Box<dyn ContainerRuntime>> = vec![Box::new(docker)];
        Ok(Orchestrator::new(vm, containers, lookup)?)
    }

    fn ready(&self) -> Orchestrator {
        self.orchestrator(&Installed(&["limactl", "docker", "ssh", "launchctl"]))
            .expect("dependencies present")
    }

    fn log(&self) -> Vec<String> {
        self.limactl.log.borrow().clone()
    }

    fn position(&self, needle: &str) -> usize {
        self.log()
            .iter()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("`{needle}` never ran: {:#?}", self.log()))
    }

    fn ran(&self, needle: &str) -> bool {
        self.log().iter().any(|l| l.contains(needle))
    }
}

#[tokio::test]
async fn first_start_creates_vm_then_provisions_then_starts_docker() {
    let h = Harness::new();

    h.ready().start().await.expect("start");

    let create = h.position("limactl create --name=berth");
    let boot = h.position("limactl start --tty=false berth");
    let install = h.position("apt-get install -y docker.io");
    let restart = h.position("limactl stop berth");
    let service = h.position("sudo service docker start");
    let load = h.position("host launchctl load");
    assert!(create < boot && boot < install && install < restart);
    assert!(restart < service && service < load);
    assert!(h.plist().exists());
}

#[tokio::test]
async fn next_start_reuses_the_provisioned_vm() {
    let h = Harness::new();
    h.ready().start().await.expect("first start");
    h.limactl.log.borrow_mut().clear();

    h.ready().start().await.expect("second start");

    assert!(!h.ran("limactl create"));
    assert!(!h.ran("apt-get"));
    assert!(!h.ran("limactl stop"));
    assert!(h.ran("sudo service docker start"));
}

#[tokio::test]
async fn start_on_running_vm_does_not_reboot_it() {
    let h = Harness::new();
    h.ready().start().await.expect("first start");
    h.limactl.log.borrow_mut().clear();

    h.ready().start().await.expect("second start");

    assert!(!h.ran("limactl start"));
    assert!(h.ran("sudo service docker start"));
}

#[tokio::test]
async fn changed_resources_stop_running_vm_before_edit() {
    let h = Harness::new();
    h.ready().start().await.expect("first start");
    h.limactl.log.borrow_mut().clear();

    let vm = VmConfig {
        cpu: 6,
        changed: true,
        ..VmConfig::default()
    };
    h.orchestrator_with(vm, &Installed(&["limactl", "docker", "ssh", "launchctl"]))
        .expect("dependencies present")
        .start()
        .await
        .expect("restart with new resources");

    let stop = h.position("limactl stop berth");
    let edit = h.position("limactl edit berth --cpus=6");
    let boot = h.position("limactl start --tty=false berth");
    assert!(stop < edit && edit < boot);
    assert!(h.limactl.running.get());
}

#[tokio::test]
async fn second_stop_is_a_no_op() {
    let h = Harness::new();
    h.ready().start().await.expect("start");
    h.ready().stop().await.expect("first stop");
    h.limactl.log.borrow_mut().clear();

    h.ready().stop().await.expect("second stop");

    assert!(!h.ran("limactl stop"));
    assert!(!h.limactl.running.get());
}

#[tokio::test]
async fn failed_install_names_runtime_and_stage() {
    let h = Harness::new();
    h.limactl.failing.borrow_mut().push("install -y docker.io");

    let err = h.ready().start().await.expect_err("install fails");

    let chain = format!("{err:#}");
    assert!(
        chain.starts_with("error provisioning docker: error at 'provisioning in VM'"),
        "{chain}"
    );
    assert!(err.chain().any(|e| e.downcast_ref::<StageError>().is_some()));
    assert!(!h.ran("sudo service docker start"));
    assert!(!h.plist().exists());
}

#[tokio::test]
async fn stop_still_stops_vm_when_docker_refuses() {
    let h = Harness::new();
    h.ready().start().await.expect("start");
    h.limactl.failing.borrow_mut().push("service docker stop");
    h.limactl.log.borrow_mut().clear();

    h.ready().stop().await.expect("stop succeeds");

    assert!(h.position("service docker stop") < h.position("limactl stop berth"));
    assert!(!h.ran("launchctl unload"));
}

#[tokio::test]
async fn delete_removes_host_files_before_the_vm() {
    let h = Harness::new();
    h.ready().start().await.expect("start");
    h.limactl.log.borrow_mut().clear();

    h.ready().delete().await.expect("delete");

    assert!(h.position("host launchctl unload") < h.position("limactl delete --force berth"));
    assert!(!h.plist().exists());
    assert!(!h.dir.path().join("app").join("socket.sh").exists());
    assert!(!h.limactl.created.get());
}

#[tokio::test]
async fn delete_without_vm_is_a_no_op() {
    let h = Harness::new();

    h.ready().delete().await.expect("delete");

    assert!(h.log().is_empty());
}

#[test]
fn missing_runtime_cli_fails_construction() {
    let h = Harness::new();

    let err = h
        .orchestrator(&Installed(&["limactl"]))
        .err()
        .expect("docker missing");

    assert_eq!(
        err.to_string(),
        "dependency check failed for docker: docker, ssh, launchctl not found"
    );
}

#[test]
fn vm_dependencies_are_checked_before_runtimes() {
    let h = Harness::new();

    let err = h.orchestrator(&Installed(&[])).err().expect("nothing installed");

    assert_eq!(
        err.to_string(),
        "dependency check failed for vm: limactl not found"
    );
}
