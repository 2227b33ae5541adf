use color_eyre::eyre::eyre;
use color_eyre::Result;
use trackflix_config::Config;
use tracing::info;

use super::context::CommandContext;
use crate::output::Output;

pub async fn run_serve(bind: Option<String>, output: &Output) -> Result<()> {
    let ctx = CommandContext::load()?;
    let mut config: Config = ctx.config;
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }

    let users_dir = config
        .server
        .data_dir
        .as_ref()
        .map(|d| d.join("users"))
        .unwrap_or_else(|| ctx.paths.users_dir());

    info!(
        bind = %config.server.bind_address,
        origin = %config.server.allowed_origin,
        "Starting watchlist server"
    );
    output.info(format!("Serving on http://{} (Ctrl-C to stop)", config.server.bind_address));

    trackflix_server::serve(&config, users_dir)
        .await
        .map_err(|e| eyre!("Server failed: {}", e))
}
