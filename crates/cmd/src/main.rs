// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    env, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use aos_archive::{ArchiveSite, Catalog, IndexClient, PageCache, Platform, Project, ResourceType};
use aos_common_telemetry::{LogFormat, LoggingOptions, init_global_logging, set_panic_hook};
use aos_downloader::{DownloadRequest, Downloader, DownloaderConfig};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use snafu::{OptionExt, Report, ResultExt, Whatever, whatever};
use tokio_util::sync::CancellationToken;
use tracing::debug;

mod build_info;
mod progress;
mod render;
mod signal;

use crate::progress::IndicatifProgress;

/// Log level used when neither `--debug` nor `RUST_LOG` is given. Progress
/// bars share the terminal with stderr logs, so only warnings show by default.
const QUIET_LOG_LEVEL: &str = "warn";

#[derive(Debug, Parser)]
#[clap(
name = "aos",
about = "Browse and download sources published on opensource.apple.com",
author = build_info::AUTHOR,
version = build_info::FULL_VERSION)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Clone, Args)]
struct GlobalArgs {
    /// Ignore cached index pages and fetch them again
    #[arg(long, global = true)]
    no_cache: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Also write rolling log files into this directory
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Format of log output (text or json)
    #[arg(long, global = true, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl GlobalArgs {
    fn logging_options(&self) -> LoggingOptions {
        let level = if self.debug {
            Some("debug".to_string())
        } else if env::var_os("RUST_LOG").is_some() {
            None
        } else {
            Some(QUIET_LOG_LEVEL.to_string())
        };

        LoggingOptions {
            dir: self.log_dir.clone(),
            level,
            log_format: self.log_format,
            ..LoggingOptions::default()
        }
    }

    fn catalog(&self) -> Result<Catalog, Whatever> {
        let client = reqwest::Client::builder()
            .user_agent(build_info::USER_AGENT)
            .build()
            .whatever_context("failed to build HTTP client")?;
        let cache = PageCache::from_env().whatever_context("failed to locate the page cache")?;
        Ok(Catalog::new(
            IndexClient::new(client, ArchiveSite::default()),
            cache,
            self.no_cache,
        ))
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every published project
    #[command(long_about = r"

List every project published on the archive.
Examples:

aos list
aos list --source

")]
    List(ListArgs),
    /// List the versions of a project
    #[command(long_about = r"

List the published versions of a project, oldest first.
Examples:

aos versions xnu

")]
    Versions(VersionsArgs),
    /// Show the projects shipped with a platform release
    #[command(long_about = r"

Show the projects shipped with a platform release.
Examples:

aos release macos 10.12.2
aos release xcode 8.2 -q
aos release ios --known

")]
    Release(ReleaseArgs),
    /// Download project tarballs
    #[command(long_about = r"

Download project tarballs into a directory.
Examples:

aos fetch xnu 3789.1.32 .
aos fetch dyld 421.1 433.5 ~/src

")]
    Fetch(FetchArgs),
    /// Inspect or delete the page cache
    #[command(subcommand)]
    Cache(CacheCommands),
    /// Print a shell completion script
    #[command(long_about = r"

Print a shell completion script to stdout.
Examples:

aos completion zsh > ~/.zfunc/_aos

")]
    Completion(CompletionArgs),
}

/// Selects tarball or source listings.
#[derive(Debug, Clone, Copy, Args)]
#[group(multiple = false)]
struct ResourceArgs {
    /// Use the source tree listings
    #[arg(short, long)]
    source: bool,

    /// Use the tarball listings (default)
    #[arg(short, long)]
    tarballs: bool,
}

impl ResourceArgs {
    const fn resource_type(self) -> ResourceType {
        if self.source {
            ResourceType::Source
        } else {
            ResourceType::Tarballs
        }
    }
}

#[derive(Debug, Clone, Args)]
struct ListArgs {
    #[command(flatten)]
    resource: ResourceArgs,
}

impl ListArgs {
    async fn run(&self, global: &GlobalArgs) -> Result<(), Whatever> {
        let projects = global
            .catalog()?
            .projects(self.resource.resource_type())
            .await
            .whatever_context("failed to list projects")?;
        print_lines(&projects);
        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
struct VersionsArgs {
    /// Project name, e.g. `xnu`
    project: String,

    #[command(flatten)]
    resource: ResourceArgs,
}

impl VersionsArgs {
    async fn run(&self, global: &GlobalArgs) -> Result<(), Whatever> {
        let versions = global
            .catalog()?
            .versions(self.resource.resource_type(), &self.project)
            .await
            .with_whatever_context(|_| format!("failed to list versions of {}", self.project))?;
        print_lines(&versions);
        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
struct ReleaseArgs {
    /// One of macos, xcode (developer-tools), ios, server
    platform: Platform,

    /// Release version, e.g. `10.12.2`
    #[arg(required_unless_present = "known")]
    version: Option<String>,

    /// Print only project names and versions
    #[arg(short, long)]
    quiet: bool,

    /// List the known release versions of the platform
    #[arg(long, conflicts_with = "version")]
    known: bool,
}

impl ReleaseArgs {
    async fn run(&self, global: &GlobalArgs) -> Result<(), Whatever> {
        if self.known {
            for version in self.platform.known_releases() {
                println!("{version}");
            }
            return Ok(());
        }

        let version = self
            .version
            .as_deref()
            .whatever_context("a release version is required")?;
        let projects = global
            .catalog()?
            .release(self.platform, version)
            .await
            .with_whatever_context(|_| format!("failed to list {} {version}", self.platform))?;
        print!("{}", render::release_table(&projects, self.quiet));
        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
struct FetchArgs {
    /// Project name, e.g. `xnu`
    project: String,

    /// One or more versions followed by the destination directory
    #[arg(num_args = 2.., required = true, value_name = "VERSION... DEST")]
    targets: Vec<String>,
}

impl FetchArgs {
    fn split_targets(&self) -> Result<(&[String], &Path), Whatever> {
        let Some((dest, versions)) = self.targets.split_last() else {
            whatever!("expected at least one version and a destination");
        };
        if versions.is_empty() {
            whatever!("expected at least one version before the destination");
        }
        Ok((versions, Path::new(dest)))
    }

    fn urls(&self, site: &ArchiveSite, versions: &[String]) -> Vec<String> {
        versions
            .iter()
            .map(|version| Project::new(self.project.as_str(), version.as_str()).tarball_url(site))
            .collect()
    }

    async fn run(&self) -> Result<(), Whatever> {
        let (versions, dest) = self.split_targets()?;
        let request = DownloadRequest::builder()
            .dest_dir(dest)
            .urls(self.urls(&ArchiveSite::default(), versions))
            .build();

        let config = DownloaderConfig::builder()
            .user_agent(build_info::USER_AGENT.to_string())
            .build();
        let downloader = Downloader::new(config, Arc::new(IndicatifProgress::new()))
            .whatever_context("failed to create downloader")?;

        let cancel = CancellationToken::new();
        let watcher = signal::cancel_on_signal(cancel.clone());
        let outcome = downloader.fetch(&request, &cancel).await;
        watcher.abort();

        let results = match outcome {
            Ok(results) => results,
            Err(err) if err.is_cancelled() => whatever!("download cancelled"),
            Err(err) => {
                return Err(err).whatever_context(format!("failed to fetch {}", self.project));
            }
        };

        for result in results {
            debug!(url = %result.url, duration = %result.duration, "fetched");
            println!("{}", result.path.display());
        }
        Ok(())
    }
}

#[derive(Debug, Subcommand)]
enum CacheCommands {
    /// List cached project pages
    List(ResourceArgs),
    /// Delete the whole page cache
    Delete,
}

impl CacheCommands {
    async fn run(&self) -> Result<(), Whatever> {
        let cache = PageCache::from_env().whatever_context("failed to locate the page cache")?;
        match self {
            Self::List(resource) => {
                let names = cache
                    .list(resource.resource_type())
                    .await
                    .whatever_context("failed to list the cache")?;
                print_lines(&names);
            }
            Self::Delete => {
                cache
                    .clear()
                    .await
                    .whatever_context("failed to delete the cache")?;
                println!("Deleted {}", cache.root().display());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
struct CompletionArgs {
    shell: Shell,
}

impl CompletionArgs {
    fn run(&self) {
        clap_complete::generate(self.shell, &mut Cli::command(), "aos", &mut io::stdout());
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

async fn run(cli: Cli) -> Result<(), Whatever> {
    match &cli.commands {
        Commands::List(args) => args.run(&cli.global).await,
        Commands::Versions(args) => args.run(&cli.global).await,
        Commands::Release(args) => args.run(&cli.global).await,
        Commands::Fetch(args) => args.run().await,
        Commands::Cache(cmd) => cmd.run().await,
        Commands::Completion(args) => {
            args.run();
            Ok(())
        }
    }
}

fn main() -> Report<Whatever> {
    human_panic::setup_panic!();

    Report::capture(|| {
        let cli = Cli::parse();
        let _guards = init_global_logging("aos", &cli.global.logging_options());
        set_panic_hook();

        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .whatever_context("failed to start the async runtime")?
            .block_on(run(cli))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_definition() { Cli::command().debug_assert(); }

    #[test]
    fn test_every_subcommand_has_a_summary() {
        let cli = Cli::command();
        for sub in cli.get_subcommands() {
            let about = sub.get_about().map(ToString::to_string).unwrap_or_default();
            assert!(!about.trim().is_empty(), "{} has no summary", sub.get_name());
        }

        let fetch = cli.find_subcommand("fetch").unwrap();
        let long_about = fetch.get_long_about().unwrap().to_string();
        assert!(long_about.contains("aos fetch xnu 3789.1.32 ."));
    }

    #[test]
    fn test_list_defaults_to_tarballs() {
        let cli = parse(&["aos", "list"]);
        let Commands::List(args) = cli.commands else {
            panic!("expected list");
        };
        assert_eq!(args.resource.resource_type(), ResourceType::Tarballs);

        let cli = parse(&["aos", "list", "-s"]);
        let Commands::List(args) = cli.commands else {
            panic!("expected list");
        };
        assert_eq!(args.resource.resource_type(), ResourceType::Source);
    }

    #[test]
    fn test_source_and_tarballs_conflict() {
        assert!(Cli::try_parse_from(["aos", "list", "-s", "-t"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["aos", "versions", "xnu", "--no-cache", "-d", "--log-format", "json"]);
        assert!(cli.global.no_cache);
        assert!(cli.global.debug);
        assert_eq!(cli.global.log_format, LogFormat::Json);
        assert_eq!(
            cli.global.logging_options().level.as_deref(),
            Some("debug")
        );
    }

    #[test]
    fn test_release_platform_aliases() {
        let cli = parse(&["aos", "release", "xcode", "8.2", "-q"]);
        let Commands::Release(args) = cli.commands else {
            panic!("expected release");
        };
        assert_eq!(args.platform, Platform::Xcode);
        assert_eq!(args.version.as_deref(), Some("8.2"));
        assert!(args.quiet);

        assert!(Cli::try_parse_from(["aos", "release", "windows", "10"]).is_err());
    }

    #[test]
    fn test_release_requires_version_unless_known() {
        assert!(Cli::try_parse_from(["aos", "release", "macos"]).is_err());
        let cli = parse(&["aos", "release", "macos", "--known"]);
        let Commands::Release(args) = cli.commands else {
            panic!("expected release");
        };
        assert!(args.known);
    }

    #[test]
    fn test_fetch_splits_versions_and_destination() {
        let cli = parse(&["aos", "fetch", "dyld", "421.1", "433.5", "/tmp/src"]);
        let Commands::Fetch(args) = cli.commands else {
            panic!("expected fetch");
        };
        let (versions, dest) = args.split_targets().unwrap();
        assert_eq!(versions, ["421.1", "433.5"]);
        assert_eq!(dest, Path::new("/tmp/src"));
        assert_eq!(
            args.urls(&ArchiveSite::default(), versions),
            vec![
                "https://opensource.apple.com/tarballs/dyld/dyld-421.1.tar.gz",
                "https://opensource.apple.com/tarballs/dyld/dyld-433.5.tar.gz",
            ]
        );
    }

    #[test]
    fn test_fetch_needs_version_and_destination() {
        assert!(Cli::try_parse_from(["aos", "fetch", "dyld", "421.1"]).is_err());
    }

    #[test]
    fn test_cache_and_completion_commands() {
        let cli = parse(&["aos", "cache", "list", "-s"]);
        assert!(matches!(cli.commands, Commands::Cache(CacheCommands::List(r)) if r.source));
        let cli = parse(&["aos", "cache", "delete"]);
        assert!(matches!(cli.commands, Commands::Cache(CacheCommands::Delete)));
        let cli = parse(&["aos", "completion", "zsh"]);
        assert!(matches!(cli.commands, Commands::Completion(CompletionArgs { shell: Shell::Zsh })));
    }
}
