//! Repopix CLI - host images in a GitHub repository.

use clap::{Parser, Subcommand};
use repopix_core::LinkFormat;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Repopix - image hosting backed by a GitHub repository
#[derive(Parser, Debug)]
#[command(name = "repopix")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Repository configuration file, layered beneath GITHUB_* variables
    #[arg(long, env = "REPOPIX_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Settings file (default: <config dir>/repopix/github-image-host-settings.json)
    #[arg(long, env = "REPOPIX_SETTINGS", global = true)]
    settings: Option<PathBuf>,

    #[command(flatten)]
    repo: RepoArgs,

    /// Auth code, required when one is configured
    #[arg(long, env = "REPOPIX_AUTH_CODE", global = true, hide_env_values = true)]
    auth_code: Option<String>,

    /// Six-digit verification code, required when two-factor is enabled
    #[arg(long, global = true)]
    otp: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the repository configuration.
#[derive(clap::Args, Debug, Default)]
struct RepoArgs {
    /// Repository owner
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Repository name
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Branch
    #[arg(long, global = true)]
    branch: Option<String>,

    /// Content root inside the repository
    #[arg(long, global = true)]
    root: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Browse hosted images
    Images {
        #[command(subcommand)]
        command: ImageCommands,
    },

    /// Upload files or whole folders
    Upload {
        /// Files and folders to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Target category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Delete an image by repository path
    Delete {
        /// Repository path of the image
        path: String,
    },

    /// Print a shareable link for an image
    Link {
        /// Repository path of the image
        path: String,
        /// Link format: raw, markdown or html
        #[arg(short, long, default_value = "raw")]
        format: LinkFormat,
    },

    /// Manage local settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug)]
enum CategoryCommands {
    /// List categories
    List,

    /// Create a category
    Create {
        /// Category name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum ImageCommands {
    /// List images
    List {
        /// Case-insensitive name filter
        #[arg(short, long, default_value = "")]
        query: String,
        /// Only images in this category ("Uncategorized" for the root)
        #[arg(short, long)]
        category: Option<String>,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommands {
    /// Show current settings
    Show,

    /// Change settings
    Set(commands::SettingsArgs),

    /// Enable the verification step after checking a sample code
    EnableTwoFactor {
        /// Six-digit verification code
        code: String,
    },

    /// Restore defaults
    Reset,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("repopix={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if matches!(cli.command, Commands::Version) {
        println!("repopix {}", repopix_core::VERSION);
        return Ok(());
    }

    let settings = commands::settings_store(cli.settings.as_deref())?;
    commands::check_access(&settings, cli.auth_code.as_deref(), cli.otp.as_deref())?;

    let overrides = commands::Overrides {
        owner: cli.repo.owner,
        repo: cli.repo.repo,
        branch: cli.repo.branch,
        root: cli.repo.root,
    };
    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Categories { command } => {
            let host = commands::connect(config_file, &overrides)?;
            match command {
                CategoryCommands::List => commands::categories_list(&host).await,
                CategoryCommands::Create { name } => commands::categories_create(&host, &name).await,
            }
        }
        Commands::Images { command } => {
            let host = commands::connect(config_file, &overrides)?;
            match command {
                ImageCommands::List {
                    query,
                    category,
                    json,
                } => commands::images_list(&host, query, category, json).await,
            }
        }
        Commands::Upload { paths, category } => {
            let host = commands::connect(config_file, &overrides)?;
            commands::upload(&host, &paths, category.as_deref()).await
        }
        Commands::Delete { path } => {
            let host = commands::connect(config_file, &overrides)?;
            commands::delete(&host, &path).await
        }
        Commands::Link { path, format } => {
            let host = commands::connect(config_file, &overrides)?;
            commands::link(&host, &path, format).await
        }
        Commands::Settings { command } => match command {
            SettingsCommands::Show => commands::settings_show(&settings),
            SettingsCommands::Set(args) => commands::settings_set(&settings, args),
            SettingsCommands::EnableTwoFactor { code } => {
                commands::settings_enable_two_factor(&settings, &code)
            }
            SettingsCommands::Reset => commands::settings_reset(&settings),
        },
        Commands::Version => Ok(()),
    }
}
