//! Docker engine inside the guest VM, reachable from the host through a
//! forwarded unix socket.

mod launchd;

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use async_trait::async_trait;

pub use launchd::LaunchAgent;

use crate::application::Pipeline;
use crate::application::ports::{
    ContainerRuntime, Dependencies, GuestActions, GuestVm, HostActions, ProgressReporter,
};

pub const DOCKER_RUNTIME: &str = "docker";

const DOCKER_CLI: &str = "docker";
/// Carries the forwarded docker socket from the guest.
const SSH: &str = "ssh";
const LAUNCHCTL: &str = "launchctl";
const GUEST_DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Host locations the adapter writes to.
#[derive(Debug, Clone)]
pub struct DockerSettings {
    pub app_name: String,
    pub app_dir: PathBuf,
    pub launch_agents_dir: PathBuf,
    pub ssh_port: u16,
}

pub struct DockerRuntime {
    host: Rc<dyn HostActions>,
    guest: Rc<dyn GuestVm>,
    reporter: Rc<dyn ProgressReporter>,
    agent: LaunchAgent,
    app_dir: PathBuf,
    ssh_port: u16,
}

impl DockerRuntime {
    pub fn new(
        settings: DockerSettings,
        guest: Rc<dyn GuestVm>,
        reporter: Rc<dyn ProgressReporter>,
    ) -> Self {
        let agent = LaunchAgent::new(
            format!("com.berth.{}", settings.app_name),
            settings.launch_agents_dir,
        );
        Self {
            host: guest.host(),
            guest,
            reporter,
            agent,
            app_dir: settings.app_dir,
            ssh_port: settings.ssh_port,
        }
    }

    /// Host end of the forwarded docker socket.
    #[must_use]
    pub fn socket(&self) -> PathBuf {
        self.app_dir.join("docker.sock")
    }

    #[must_use]
    pub fn script(&self) -> PathBuf {
        self.app_dir.join("socket.sh")
    }

    #[must_use]
    pub fn launch_agent(&self) -> &LaunchAgent {
        &self.agent
    }

    async fn docker_installed(&self) -> bool {
        self.guest
            .run(&["sh", "-c", "command -v docker"])
            .await
            .is_ok()
    }

    async fn user_in_docker_group(&self) -> bool {
        self.guest
            .run(&["sh", "-c", r#"getent group docker | grep -qw "$USER""#])
            .await
            .is_ok()
    }

    /// Inspect the guest, then queue only the setup steps still missing.
    pub async fn provision_pipeline(&self) -> Pipeline<'_> {
        let installed = self.docker_installed().await;
        let in_group = self.user_in_docker_group().await;
        tracing::debug!(installed, in_group, "docker provisioning state");

        let mut p = Pipeline::new(DOCKER_RUNTIME);
        p.stage("provisioning");

        if !installed {
            p.stage("setting up socket");
            let host = &self.host;
            let socket = self.socket().display().to_string();
            p.add(async move {
                host.run(&["sudo", "ln", "-sfn", socket.as_str(), GUEST_DOCKER_SOCKET])
                    .await
            });

            p.stage("provisioning in VM");
            p.add(self.guest.run(&["sudo", "apt-get", "update", "-y"]));
            p.add(self.guest.run(&[
                "sudo",
                "DEBIAN_FRONTEND=noninteractive",
                "apt-get",
                "install",
                "-y",
                "docker.io",
            ]));
        }

        if !in_group {
            p.add(self.guest.run(&["sh", "-c", r#"sudo usermod -aG docker "$USER""#]));
            p.stage("restarting VM to complete setup");
            p.add(self.guest.stop());
            p.add(self.guest.start());
        }

        p.stage("setting up socket");
        let script = self.script();
        let socket = self.socket();
        let ssh_port = self.ssh_port;
        p.add(async move { launchd::write_socket_forwarding_script(&script, &socket, ssh_port) });
        let agent = &self.agent;
        let script = self.script();
        let log_dir = self.app_dir.clone();
        p.add(async move { agent.write(&script, &log_dir) });
        p
    }

    pub fn start_pipeline(&self) -> Pipeline<'_> {
        let mut p = Pipeline::new(DOCKER_RUNTIME);
        p.stage("starting");
        p.add(self.guest.run(&["sudo", "service", "docker", "start"]));
        p.add(self.launchctl("load"));
        p
    }

    pub fn stop_pipeline(&self) -> Pipeline<'_> {
        let mut p = Pipeline::new(DOCKER_RUNTIME);
        p.stage("stopping");
        p.add(self.guest.run(&["sudo", "service", "docker", "stop"]));
        p.add(self.launchctl("unload"));
        p
    }

    /// Empty when provisioning never wrote the launch agent.
    pub fn teardown_pipeline(&self) -> Pipeline<'_> {
        let mut p = Pipeline::new(DOCKER_RUNTIME);
        p.stage("teardown");
        if !self.agent.file().is_file() {
            tracing::debug!(plist = %self.agent.file().display(), "no launch agent, nothing to remove");
            return p;
        }
        p.add(self.launchctl("unload"));
        let files = [self.agent.file(), self.script(), self.socket()];
        p.add(async move {
            for file in &files {
                launchd::remove_if_exists(file)?;
            }
            Ok(())
        });
        p
    }

    async fn launchctl(&self, verb: &'static str) -> Result<()> {
        let plist = self.agent.file().display().to_string();
        self.host.run(&[LAUNCHCTL, verb, plist.as_str()]).await
    }
}

impl Dependencies for DockerRuntime {
    fn dependencies(&self) -> &[&str] {
        &[DOCKER_CLI, SSH, LAUNCHCTL]
    }
}

#[async_trait(?Send)]
impl ContainerRuntime for DockerRuntime {
    fn name(&self) -> &str {
        DOCKER_RUNTIME
    }

    async fn provision(&self) -> Result<()> {
        self.provision_pipeline()
            .await
            .run(&*self.reporter)
            .await?;
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        self.start_pipeline().run(&*self.reporter).await?;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stop_pipeline().run(&*self.reporter).await?;
        Ok(())
    }

    async fn teardown(&self) -> Result<()> {
        self.teardown_pipeline().run(&*self.reporter).await?;
        Ok(())
    }
}
