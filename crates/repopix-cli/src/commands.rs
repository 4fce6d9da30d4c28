//! CLI command implementations.

use anyhow::{anyhow, Context};
use repopix_core::{
    collect_uploads, enable_two_factor, AccessGate, AnimationSpeed, GalleryFilter, ImageHost,
    LinkFormat, RepositoryConfig, SettingsPatch, SettingsStore, UploadItem, UploadQueue,
    UploadStatus,
};
use repopix_store::GitHubStore;
use std::path::{Path, PathBuf};

/// Host type every repository command runs against.
pub type Host = ImageHost<GitHubStore>;

/// Command-line overrides for the repository configuration.
#[derive(Debug, Default)]
pub struct Overrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub root: Option<String>,
}

impl Overrides {
    fn apply(&self, mut config: RepositoryConfig) -> RepositoryConfig {
        if let Some(owner) = &self.owner {
            config.owner.clone_from(owner);
        }
        if let Some(repo) = &self.repo {
            config.repo.clone_from(repo);
        }
        if let Some(branch) = &self.branch {
            config = config.with_branch(branch.as_str());
        }
        if let Some(root) = &self.root {
            config = config.with_root(root);
        }
        config
    }
}

/// Arguments of `settings set`.
#[derive(clap::Args, Debug, Default)]
pub struct SettingsArgs {
    /// Enable or disable animations
    #[arg(long)]
    pub animations: Option<bool>,

    /// Animation speed: slow, normal or fast
    #[arg(long)]
    pub animation_speed: Option<AnimationSpeed>,

    /// Enable or disable the background decoration
    #[arg(long)]
    pub background: Option<bool>,

    /// Background opacity between 0 and 1
    #[arg(long)]
    pub background_opacity: Option<f64>,

    /// Background image URL
    #[arg(long, conflicts_with = "clear_background_image")]
    pub background_image_url: Option<String>,

    /// Remove the background image
    #[arg(long)]
    pub clear_background_image: bool,

    /// New auth code
    #[arg(long, conflicts_with = "clear_code")]
    pub code: Option<String>,

    /// Remove the auth code, leaving the application open
    #[arg(long)]
    pub clear_code: bool,

    /// Turn the verification step off
    #[arg(long)]
    pub disable_two_factor: bool,
}

impl From<SettingsArgs> for SettingsPatch {
    fn from(args: SettingsArgs) -> Self {
        Self {
            enable_animations: args.animations,
            animation_speed: args.animation_speed,
            enable_background: args.background,
            background_opacity: args.background_opacity,
            background_image_url: if args.clear_background_image {
                Some(None)
            } else {
                args.background_image_url.map(Some)
            },
            auth_code: if args.clear_code {
                Some(None)
            } else {
                args.code.map(Some)
            },
            two_factor_enabled: args.disable_two_factor.then_some(false),
        }
    }
}

/// Resolves the settings file.
pub fn settings_store(path: Option<&Path>) -> anyhow::Result<SettingsStore> {
    match path {
        Some(path) => Ok(SettingsStore::at(path)),
        None => SettingsStore::default_location()
            .ok_or_else(|| anyhow!("could not determine config directory, pass --settings")),
    }
}

/// Refuses to continue unless the access gate opens.
pub fn check_access(
    settings: &SettingsStore,
    code: Option<&str>,
    otp: Option<&str>,
) -> anyhow::Result<()> {
    let current = settings.load();
    AccessGate::new(&current)
        .login(code, otp)
        .context("access denied, pass --auth-code (and --otp when two-factor is enabled)")
}

/// Loads the repository configuration and connects to GitHub.
pub fn connect(file: Option<&Path>, overrides: &Overrides) -> anyhow::Result<Host> {
    let config = overrides.apply(RepositoryConfig::load(file, None)?);
    tracing::debug!(?config, "Using repository configuration");
    Ok(ImageHost::github(config)?)
}

/// List categories.
pub async fn categories_list(host: &Host) -> anyhow::Result<()> {
    let categories = host.list_categories().await?;
    for category in categories {
        println!("{:<24} {}", category.name, category.path);
    }
    Ok(())
}

/// Create a category.
pub async fn categories_create(host: &Host, name: &str) -> anyhow::Result<()> {
    let category = host.create_category(name).await?;
    println!("Created category {} at {}", category.name, category.path);
    Ok(())
}

/// List images, optionally filtered.
pub async fn images_list(
    host: &Host,
    query: String,
    category: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let images = host.list_images().await?;
    let filter = GalleryFilter { query, category };
    let shown = filter.apply(&images);

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("No images found.");
        return Ok(());
    }
    for image in shown {
        println!(
            "{:<16} {:>10}  {}",
            image.category.as_deref().unwrap_or(repopix_core::UNCATEGORIZED),
            format_size(image.size),
            image.path
        );
    }
    Ok(())
}

/// Upload files and folders one at a time.
pub async fn upload(host: &Host, paths: &[PathBuf], category: Option<&str>) -> anyhow::Result<()> {
    let items = collect_uploads(paths)?;
    if items.is_empty() {
        println!("No images to upload.");
        return Ok(());
    }

    let total = items.len();
    let mut queue = UploadQueue::with_callback(Box::new(move |item: &UploadItem| {
        report(item, total);
    }));
    queue.extend(items);

    let summary = queue.run(host, category).await;
    println!(
        "Uploaded {} of {} file(s), {} failed",
        summary.succeeded, total, summary.failed
    );

    if summary.failed > 0 {
        return Err(anyhow!("{} upload(s) failed", summary.failed));
    }
    Ok(())
}

fn report(item: &UploadItem, total: usize) {
    let label = match &item.subfolder {
        Some(sub) => format!("{sub}/{}", item.file_name),
        None => item.file_name.clone(),
    };
    match item.status {
        UploadStatus::Uploading => eprintln!("Uploading {label} ({total} queued)"),
        UploadStatus::Success => println!("{}", item.url.as_deref().unwrap_or_default()),
        UploadStatus::Error => eprintln!(
            "Failed {label}: {}",
            item.error.as_deref().unwrap_or("unknown error")
        ),
        UploadStatus::Pending => {}
    }
}

/// Delete an image.
pub async fn delete(host: &Host, path: &str) -> anyhow::Result<()> {
    host.delete(path).await?;
    println!("Deleted {path}");
    Ok(())
}

/// Print a shareable link.
pub async fn link(host: &Host, path: &str, format: LinkFormat) -> anyhow::Result<()> {
    let image = host.find_image(path).await?;
    println!("{}", image.link(format));
    Ok(())
}

/// Show current settings.
pub fn settings_show(store: &SettingsStore) -> anyhow::Result<()> {
    let mut settings = store.load();
    if settings.auth_code.is_some() {
        settings.auth_code = Some("********".to_string());
    }
    println!("# {}", store.path().display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

/// Change settings.
pub fn settings_set(store: &SettingsStore, args: SettingsArgs) -> anyhow::Result<()> {
    store.update(args.into())?;
    println!("Settings saved to {}", store.path().display());
    Ok(())
}

/// Turn on the verification step.
pub fn settings_enable_two_factor(store: &SettingsStore, code: &str) -> anyhow::Result<()> {
    let settings = enable_two_factor(store, code)?;
    if settings.auth_code.is_none() {
        println!("Two-factor enabled; it takes effect once an auth code is set.");
    } else {
        println!("Two-factor enabled.");
    }
    Ok(())
}

/// Restore default settings.
pub fn settings_reset(store: &SettingsStore) -> anyhow::Result<()> {
    store.reset()?;
    println!("Settings reset to defaults.");
    Ok(())
}

/// Format bytes as human-readable size.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
