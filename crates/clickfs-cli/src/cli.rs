use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clickfs_client::{ApiClient, ClientConfig, TaskQuery};
use clickfs_fuse::attr::AttrDefaults;
use clickfs_fuse::mount::parse_mount_options;
use clickfs_fuse::session::{mount_blocking, SessionConfig};
use clickfs_fuse::{BlockingSource, RemoteSource};
use serde_json::Value;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::info;

use crate::config::{CliConfig, MountConfig};
use crate::format::{render, ObjectKind, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "clickup")]
#[command(about = "ClickUp API client with a read-only FUSE view", long_about = None)]
pub struct Cli {
    #[arg(long, env = "CLICKUP_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "CLICKUP_API_URL", global = true)]
    pub url: Option<String>,

    /// TOML or JSON configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The authenticated user.
    User,
    /// Teams the user belongs to.
    Teams,
    Team {
        id: String,
    },
    Spaces {
        team_id: String,
    },
    Projects {
        space_id: String,
    },
    Tasks {
        team_id: String,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        include_closed: bool,
        #[arg(long)]
        subtasks: bool,
        #[arg(long)]
        order_by: Option<String>,
        #[arg(long)]
        reverse: bool,
        /// Only tasks in this status; repeatable.
        #[arg(long = "status")]
        statuses: Vec<String>,
        /// Only tasks assigned to this user id; repeatable.
        #[arg(long = "assignee")]
        assignees: Vec<String>,
    },
    /// Mount the read-only filesystem and serve until unmounted.
    Mount {
        mountpoint: PathBuf,
        /// Comma-separated mount options.
        #[arg(short = 'o', long)]
        options: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let file = CliConfig::load(self.config.as_deref())?;
        let client = ApiClient::new(&self.client_config(&file.client))?;

        match self.command {
            Command::Mount {
                ref mountpoint,
                ref options,
            } => mount(client, &file.mount, mountpoint.clone(), options.clone()).await,
            ref command => {
                let (kind, value) = fetch(&client, command).await?;
                println!("{}", render(kind, &value, self.format)?);
                Ok(())
            }
        }
    }

    /// File settings overlaid with flags and environment.
    pub fn client_config(&self, base: &ClientConfig) -> ClientConfig {
        let mut config = base.clone();
        if let Some(ref key) = self.api_key {
            config.api_key = Some(key.clone());
        }
        if let Some(ref url) = self.url {
            config.api_url = url.clone();
        }
        config
    }
}

/// Task filters from the `tasks` subcommand flags. Unset flags are left to
/// the server defaults.
pub fn task_query(command: &Command) -> Option<TaskQuery> {
    match command {
        Command::Tasks {
            page,
            include_closed,
            subtasks,
            order_by,
            reverse,
            statuses,
            assignees,
            ..
        } => Some(TaskQuery {
            page: *page,
            order_by: order_by.clone(),
            reverse: reverse.then_some(true),
            subtasks: subtasks.then_some(true),
            include_closed: include_closed.then_some(true),
            statuses: statuses.clone(),
            assignees: assignees.clone(),
            ..TaskQuery::default()
        }),
        _ => None,
    }
}

pub async fn fetch(client: &ApiClient, command: &Command) -> Result<(ObjectKind, Value)> {
    let result = match command {
        Command::User => (ObjectKind::User, client.user().await?),
        Command::Teams => (ObjectKind::Teams, client.teams().await?),
        Command::Team { id } => (ObjectKind::Team, client.team(id).await?),
        Command::Spaces { team_id } => (ObjectKind::Spaces, client.spaces(team_id).await?),
        Command::Projects { space_id } => (ObjectKind::Projects, client.projects(space_id).await?),
        Command::Tasks { team_id, .. } => {
            let query = task_query(command).unwrap_or_default();
            (ObjectKind::Tasks, client.tasks(team_id, &query).await?)
        }
        Command::Mount { .. } => anyhow::bail!("mount is not a query"),
    };
    Ok(result)
}

pub fn session_config(
    mountpoint: PathBuf,
    options: Option<&str>,
    mount: &MountConfig,
) -> Result<SessionConfig> {
    let mount_options = parse_mount_options(options.unwrap_or(&mount.options))?;

    // Unset ids follow the owner of the mountpoint directory.
    let owner = match (mount.uid, mount.gid) {
        (Some(uid), Some(gid)) => AttrDefaults { uid, gid },
        (uid, gid) => {
            let dir = AttrDefaults::of_path(&mountpoint)?;
            AttrDefaults {
                uid: uid.unwrap_or(dir.uid),
                gid: gid.unwrap_or(dir.gid),
            }
        }
    };

    let mut session = SessionConfig::new(mountpoint, mount_options);
    session.fs_config.owner = owner;
    let ttl = Duration::from_secs(mount.attr_ttl_secs);
    session.fs_config.attr_timeout = ttl;
    session.fs_config.entry_timeout = ttl;

    Ok(session)
}

async fn mount(
    client: ApiClient,
    mount: &MountConfig,
    mountpoint: PathBuf,
    options: Option<String>,
) -> Result<()> {
    let session = session_config(mountpoint, options.as_deref(), mount)?;
    let source: Arc<dyn RemoteSource> = Arc::new(BlockingSource::new(client, Handle::current()));

    info!(mountpoint = %session.mountpoint.display(), "starting mount");
    tokio::task::spawn_blocking(move || mount_blocking(&session, source)).await??;
    Ok(())
}
