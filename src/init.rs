use anyhow::{anyhow, Context, Result};
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::client::{ApiClient, Credentials};
use crate::config::Config;
use crate::rate_limiter::RateLimiter;

pub struct InitOptions {
    pub config_path: Option<PathBuf>,
    pub no_prompt: bool,
    pub force: bool,
}

/// Default location of the user config file
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cfctl")
        .join("config.toml")
}

async fn verify_credentials(config: &Config, credentials: &Credentials) -> Result<()> {
    let client = ApiClient::with_base_url(
        credentials,
        config.api.base_url.as_str(),
        RateLimiter::from_limits(&config.limits),
    )?;
    client.get("/user", &[]).await?;
    Ok(())
}

/// Write a config file, prompting for credentials unless `no_prompt` is set.
///
/// Without prompts the file is built from the defaults and any `CFCTL_*`
/// environment variables.
///
/// # Errors
///
/// Returns an error if:
/// - The file already exists and `force` is not set
/// - A prompt fails or the entered credentials are rejected
/// - The file cannot be written
pub async fn initialize_config(opts: InitOptions) -> Result<()> {
    let config_path = opts.config_path.unwrap_or_else(default_config_path);

    if config_path.exists() && !opts.force {
        return Err(anyhow!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        ));
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut config = Config::from_env()?;

    if !opts.no_prompt {
        println!("Initializing cfctl configuration...\n");
        let theme = ColorfulTheme::default();

        let email: String = Input::with_theme(&theme)
            .with_prompt("Account email")
            .with_initial_text(config.api.email.clone().unwrap_or_default())
            .interact_text()?;
        let key = Password::with_theme(&theme)
            .with_prompt("Global API key")
            .interact()?;

        let credentials = Credentials::new(email.as_str(), key.as_str());
        print!("Testing credentials... ");
        match verify_credentials(&config, &credentials).await {
            Ok(()) => println!("✓ Success"),
            Err(e) => {
                println!("✗ Failed");
                return Err(anyhow!("Credential check failed: {}", e));
            }
        }
        config.api.email = Some(email);
        config.api.key = Some(key);

        let workers: u32 = Input::with_theme(&theme)
            .with_prompt("Number of workers sharing this account's quota")
            .default(config.limits.workers)
            .interact_text()?;
        config.limits.workers = workers;

        let formats = ["text", "json"];
        let format = Select::with_theme(&theme)
            .with_prompt("Log format")
            .items(&formats)
            .default(0)
            .interact()?;
        config.logging.format = formats[format].to_string();
    }

    write_config(&config_path, &config)?;

    println!("\nConfiguration created at: {}", config_path.display());
    Ok(())
}

fn write_config(path: &Path, config: &Config) -> Result<()> {
    let toml = toml::to_string_pretty(config)?;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    // The mode above only applies to new files; tighten an overwritten one too
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(toml.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
