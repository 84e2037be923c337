//! Artalk Community CLI - validate, build and diff the plugin and theme registry

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use artalk_community_core::RegistryPaths;
use artalk_community_remote::config::{
    DEFAULT_CDN, DEFAULT_GITHUB_API, DEFAULT_GITHUB_DOWNLOADS, DEFAULT_NPM_REGISTRY,
    DEFAULT_TIMEOUT_SECS,
};
use artalk_community_remote::{DEFAULT_RELEASE_REPO, Endpoints, SriAlgorithm};

mod commands;
mod display;
mod error;
mod exit_codes;

use error::CliError;

#[derive(Parser)]
#[command(name = "artalk-community")]
#[command(author = "Artalk Contributors")]
#[command(version)]
#[command(about = "Validate, build and diff the Artalk community plugin and theme registry", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    paths: PathArgs,

    #[command(flatten)]
    remote: RemoteArgs,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

/// Where the lists and the catalog live
#[derive(Args, Debug)]
struct PathArgs {
    /// Registry checkout containing plugins.yaml, themes.yaml and dist/
    #[arg(long, global = true, env = "ARTALK_COMMUNITY_ROOT", default_value = ".")]
    root: PathBuf,

    /// Plugin list (default: <root>/plugins.yaml)
    #[arg(long, global = true)]
    plugins: Option<PathBuf>,

    /// Theme list (default: <root>/themes.yaml)
    #[arg(long, global = true)]
    themes: Option<PathBuf>,

    /// Catalog to write and diff (default: <root>/dist/registry.json)
    #[arg(long, global = true)]
    output: Option<PathBuf>,
}

impl PathArgs {
    fn resolve(&self) -> RegistryPaths {
        RegistryPaths::from_root(&self.root).with_overrides(
            self.plugins.clone(),
            self.themes.clone(),
            self.output.clone(),
        )
    }
}

/// Remote services
#[derive(Args, Debug)]
struct RemoteArgs {
    /// npm registry base URL
    #[arg(long, global = true, env = "NPM_REGISTRY", default_value = DEFAULT_NPM_REGISTRY)]
    npm_registry: String,

    /// GitHub REST API base URL
    #[arg(long, global = true, env = "GITHUB_API_URL", default_value = DEFAULT_GITHUB_API)]
    github_api: String,

    /// Origin serving release assets
    #[arg(long, global = true, env = "GITHUB_SERVER_URL", default_value = DEFAULT_GITHUB_DOWNLOADS)]
    github_downloads: String,

    /// CDN serving npm package files
    #[arg(long, global = true, env = "CDN_BASE", default_value = DEFAULT_CDN)]
    cdn: String,

    /// Token sent to the GitHub API and release downloads only
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
}

impl RemoteArgs {
    fn endpoints(&self) -> Endpoints {
        Endpoints {
            npm_registry: self.npm_registry.clone(),
            github_api: self.github_api.clone(),
            github_downloads: self.github_downloads.clone(),
            cdn: self.cdn.clone(),
            ..Default::default()
        }
        .with_github_token(self.github_token.clone())
        .with_timeout(Duration::from_secs(self.timeout))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check plugins.yaml and themes.yaml for missing and malformed fields
    Validate {
        /// Output validation results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch npm and GitHub metadata and write the catalog
    Build {
        /// Rebuild every entry instead of reusing the previous catalog
        #[arg(long)]
        no_cache: bool,

        /// Hash algorithm for integrity digests
        #[arg(long, default_value = "sha512")]
        algorithm: SriAlgorithm,
    },

    /// Check whether the catalog differs from the latest published release
    Diff {
        /// Repository whose latest release carries registry.json
        #[arg(long, default_value = DEFAULT_RELEASE_REPO)]
        repo: String,

        /// Print a line diff when the catalogs differ
        #[arg(long)]
        show_diff: bool,

        /// File to append `is_diff=<1|0>` to (set by GitHub Actions)
        #[arg(long, env = "GITHUB_OUTPUT")]
        github_output: Option<PathBuf>,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> error::Result<()> {
    let paths = cli.paths.resolve();
    let endpoints = cli.remote.endpoints();
    tracing::debug!(?paths, "Resolved registry paths");

    match cli.command {
        Commands::Validate { json } => commands::validate::run(&paths, json),

        Commands::Build {
            no_cache,
            algorithm,
        } => commands::build::run(&paths, &endpoints, algorithm, !no_cache).await,

        Commands::Diff {
            repo,
            show_diff,
            github_output,
        } => {
            commands::diff::run(
                &paths,
                &endpoints,
                &repo,
                show_diff,
                github_output.as_deref(),
            )
            .await
        }
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.debug);

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::internal(format!("failed to start runtime: {}", e)))
        .and_then(|runtime| runtime.block_on(run(cli)));

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_paths_resolve() {
        let cli = Cli::try_parse_from([
            "artalk-community",
            "--root",
            "/srv/community",
            "validate",
            "--output",
            "/tmp/registry.json",
        ])
        .unwrap();

        let paths = cli.paths.resolve();
        assert_eq!(paths.plugins, PathBuf::from("/srv/community/plugins.yaml"));
        assert_eq!(paths.themes, PathBuf::from("/srv/community/themes.yaml"));
        assert_eq!(paths.output, PathBuf::from("/tmp/registry.json"));
    }

    #[test]
    fn test_build_arguments() {
        let cli = Cli::try_parse_from([
            "artalk-community",
            "build",
            "--no-cache",
            "--algorithm",
            "sha384",
            "--timeout",
            "5",
            "--cdn",
            "https://cdn.example.com",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Commands::Build {
                no_cache: true,
                algorithm: SriAlgorithm::Sha384
            }
        ));
        let endpoints = cli.remote.endpoints();
        assert_eq!(endpoints.timeout, Duration::from_secs(5));
        assert_eq!(endpoints.cdn, "https://cdn.example.com");

        assert!(Cli::try_parse_from(["artalk-community", "build", "--algorithm", "md5"]).is_err());
    }

    #[test]
    fn test_diff_defaults() {
        let cli = Cli::try_parse_from(["artalk-community", "diff"]).unwrap();
        match cli.command {
            Commands::Diff {
                repo, show_diff, ..
            } => {
                assert_eq!(repo, "ArtalkJS/Community");
                assert!(!show_diff);
            }
            _ => panic!("expected diff"),
        }
    }
}
