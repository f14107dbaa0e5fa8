use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use nuget_sandbox::config::{self, SandboxConfig};
use nuget_sandbox::logging::init_logging;
use nuget_sandbox::release::ReleaseId;
use nuget_sandbox::release::store::LocalPackageStore;
use nuget_sandbox::service::tools::{
    FindBestVersionMatchInput, FrameworkCompatibilityInput, GetNearestFrameworkInput,
};
use nuget_sandbox::service::{FrameworkPrecedenceInput, ToolsFactory, ToolsService};

#[derive(Parser)]
#[command(name = "nuget-sandbox")]
#[command(version, about = "Query several NuGet client library releases side by side")]
struct Cli {
    /// Configuration file (defaults to <data dir>/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available releases, newest first
    Versions {
        /// List releases published on the configured feeds instead
        #[arg(long)]
        remote: bool,
    },
    /// Write the module packages of a release into the package folder
    Install {
        version: String,
        #[arg(long, default_value = "net45")]
        tfm: String,
    },
    /// Framework names known to a release
    Frameworks {
        #[arg(long)]
        version: Option<String>,
    },
    /// Whether a project framework can consume a package framework
    Compat {
        project: String,
        package: String,
        #[arg(long)]
        version: Option<String>,
    },
    /// Nearest package framework for a project
    Nearest {
        project: String,
        #[arg(required = true)]
        packages: Vec<String>,
        #[arg(long)]
        version: Option<String>,
    },
    /// Compatible catalog frameworks, nearest first
    Precedence {
        framework: String,
        #[arg(long)]
        exclude_portable: bool,
        #[arg(long)]
        include_profiles: bool,
        /// Comma separated identifiers to leave out
        #[arg(long)]
        exclude_identifiers: Option<String>,
        #[arg(long)]
        version: Option<String>,
    },
    /// Best version for a range
    BestMatch {
        range: String,
        #[arg(required = true)]
        versions: Vec<String>,
        #[arg(long)]
        version: Option<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Service for `version`, or for the latest release when none is given
async fn service(factory: &ToolsFactory, version: Option<String>) -> anyhow::Result<Arc<ToolsService>> {
    let version = match version {
        Some(version) => version,
        None => factory
            .get_latest_version()
            .await
            .ok_or_else(|| anyhow!("No release is available; run `nuget-sandbox install <version>` first"))?
            .to_string(),
    };

    factory
        .get_service(&version)
        .await?
        .ok_or_else(|| anyhow!("Release {} is not available", version))
}

async fn run(command: Command, config: SandboxConfig) -> anyhow::Result<()> {
    let factory = ToolsFactory::from_config(&config)?;

    match command {
        Command::Versions { remote: false } => print_json(&factory.get_available_versions().await),
        Command::Versions { remote: true } => {
            let cancel = CancellationToken::new();
            let on_ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_ctrl_c.cancel();
                }
            });
            print_json(&factory.get_versions_from_sources(&cancel).await?)
        }
        Command::Install { version, tfm } => {
            let release = ReleaseId::parse(&version)
                .ok_or_else(|| anyhow!("'{}' is not a release version", version))?;
            let store = LocalPackageStore::new(config.packages_dir());
            store
                .install_release(&release, &tfm)
                .with_context(|| format!("Failed to install {}", release))?;
            print_json(&release)
        }
        Command::Frameworks { version: None } => print_json(&*factory.get_framework_list_latest().await?),
        Command::Frameworks { version: Some(version) } => {
            let list = factory
                .get_framework_list(&version)
                .await?
                .ok_or_else(|| anyhow!("Release {} is not available", version))?;
            print_json(&*list)
        }
        Command::Compat {
            project,
            package,
            version,
        } => {
            let service = service(&factory, version).await?;
            print_json(&service.framework_compatibility(FrameworkCompatibilityInput {
                project: Some(project),
                package: Some(package),
            })?)
        }
        Command::Nearest {
            project,
            packages,
            version,
        } => {
            let service = service(&factory, version).await?;
            print_json(&service.get_nearest_framework(GetNearestFrameworkInput {
                project: Some(project),
                package: Some(packages.join("\n")),
            })?)
        }
        Command::Precedence {
            framework,
            exclude_portable,
            include_profiles,
            exclude_identifiers,
            version,
        } => {
            let service = service(&factory, version).await?;
            print_json(&service.framework_precedence(FrameworkPrecedenceInput {
                framework: Some(framework),
                exclude_portable,
                include_profiles,
                exclude_identifiers,
            })?)
        }
        Command::BestMatch {
            range,
            versions,
            version,
        } => {
            let service = service(&factory, version).await?;
            print_json(&service.find_best_version_match(FindBestVersionMatchInput {
                version_range: Some(range),
                versions: Some(versions.join("\n")),
            })?)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(config::config_path);
    let config = SandboxConfig::load(&config_path)?;
    let _guard = init_logging(&config.log, &config::log_path());

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command, config))
}
