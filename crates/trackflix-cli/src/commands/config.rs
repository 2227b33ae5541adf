use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use owo_colors::OwoColorize;
use serde_json::json;
use trackflix_config::{Config, PathManager};

use super::prompts;
use crate::output::{mask_string, styled_table, Output};
use crate::ConfigCommands;

pub async fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::Init { api_key, backend_url, force } => init_config(api_key, backend_url, force, output),
        ConfigCommands::Path => {
            let paths = PathManager::default();
            output.info(paths.config_file().display().to_string());
            Ok(())
        }
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config_file = paths.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Run 'trackflix config init' to create one. Defaults are used until then.");
    }

    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let api_key = if full {
        config.omdb.api_key.clone()
    } else {
        mask_string(&config.omdb.api_key)
    };

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file.display().to_string(),
            "server": {
                "bind_address": config.server.bind_address,
                "allowed_origin": config.server.allowed_origin,
                "session_ttl_hours": config.server.session_ttl_hours,
                "secure_cookies": config.server.secure_cookies,
                "bcrypt_cost": config.server.bcrypt_cost,
                "data_dir": config.server.data_dir.as_ref().map(|d| d.display().to_string()),
            },
            "omdb": { "api_key": api_key, "base_url": config.omdb.base_url },
            "client": {
                "backend_url": config.client.backend_url,
                "request_timeout_secs": config.client.request_timeout_secs,
            },
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    println!("\n{} {}\n", "Configuration".bright_cyan().bold(), config_file.display());

    let mut table = styled_table(&["Setting", "Value"]);
    let users_dir = config
        .server
        .data_dir
        .as_ref()
        .map(|d| d.join("users"))
        .unwrap_or_else(|| paths.users_dir());
    let rows = [
        ("server.bind_address", config.server.bind_address.clone()),
        ("server.allowed_origin", config.server.allowed_origin.clone()),
        ("server.session_ttl_hours", config.server.session_ttl_hours.to_string()),
        ("server.secure_cookies", config.server.secure_cookies.to_string()),
        ("server.bcrypt_cost", config.server.bcrypt_cost.to_string()),
        ("server users", users_dir.display().to_string()),
        ("omdb.api_key", api_key),
        ("omdb.base_url", config.omdb.base_url.clone()),
        ("client.backend_url", config.client.backend_url.clone()),
        (
            "client.request_timeout_secs",
            config
                .client
                .request_timeout_secs
                .map_or_else(|| "none".to_string(), |s| s.to_string()),
        ),
    ];
    for (setting, value) in rows {
        table.add_row(vec![Cell::new(setting), Cell::new(value)]);
    }
    output.table(&table);

    if !config.is_omdb_configured() {
        output.warn("OMDb API key is not set; search and detail commands will fail");
    }
    Ok(())
}

fn init_config(api_key: Option<String>, backend_url: Option<String>, force: bool, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create {}: {}", paths.config_dir().display(), e))?;
    let config_file = paths.config_file();

    if config_file.exists()
        && !force
        && !prompts::prompt_yes_no(
            &format!("{} exists. Update it?", config_file.display()),
            false,
            output,
        )?
    {
        return Ok(());
    }

    let mut config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    config.omdb.api_key = prompts::value_or_prompt(api_key, "OMDb API key")?;
    config.client.backend_url = match backend_url {
        Some(url) => url,
        None => prompts::prompt_string("Watchlist server URL", Some(&config.client.backend_url))?,
    };
    config
        .validate_client()
        .map_err(|e| eyre!("Invalid configuration: {}", e))?;

    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;
    output.success(format!("Configuration saved to {}", config_file.display()));
    Ok(())
}
