use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;
use trackflix_sources::{AccountService, LoginOutcome};
use tracing::warn;

use super::context::CommandContext;
use super::prompts;
use super::ui::Spinner;
use crate::output::Output;

pub async fn run_signup(name: Option<String>, email: Option<String>, output: &Output) -> Result<()> {
    let ctx = CommandContext::load()?;
    let name = prompts::value_or_prompt(name, "Name")?;
    let email = prompts::value_or_prompt(email, "Email")?;
    let password = prompts::prompt_new_password()?;

    let spinner = Spinner::start(output, "Creating account...");
    let result = ctx.backend.signup(&name, &email, &password).await;
    spinner.finish();

    let user = result.map_err(|e| ctx.backend_error("Signup", e))?;
    if output.is_human() {
        output.success(format!("Account created for {}", user.email));
        output.info("Run 'trackflix login' to start a session.");
    } else {
        output.json(&json!({ "type": "signup", "user": user }));
    }
    Ok(())
}

pub async fn run_login(email: Option<String>, output: &Output) -> Result<()> {
    let mut ctx = CommandContext::load()?;
    let email = prompts::value_or_prompt(email, "Email")?;
    let password = prompts::prompt_password("Password")?;

    let spinner = Spinner::start(output, "Logging in...");
    let result = ctx.session.login(ctx.backend.as_ref(), &email, &password).await;
    spinner.finish();

    match result.map_err(|e| ctx.backend_error("Login", e))? {
        LoginOutcome::Success => {
            ctx.remember_login(&email)?;
            output.success(format!("Logged in as {}", email));
            Ok(())
        }
        LoginOutcome::Rejected(reason) => {
            output.error(format!("Login failed: {}", reason));
            Err(eyre!("Authentication failed"))
        }
    }
}

/// Ends the server session; the local cache is cleared whatever the server says
pub async fn run_logout(output: &Output) -> Result<()> {
    let mut ctx = CommandContext::load()?;
    let Some(email) = ctx.session.email() else {
        output.info("Not logged in");
        return Ok(());
    };

    let result = ctx.session.logout(ctx.backend.as_ref()).await;
    ctx.forget_login()?;

    if let Err(e) = result {
        warn!("Server logout failed: {}", e);
        output.warn(format!("Server did not confirm logout ({}); local session cleared", e));
    } else {
        output.success(format!("Logged out {}", email));
    }
    Ok(())
}

pub async fn run_whoami(output: &Output) -> Result<()> {
    let ctx = CommandContext::load()?;
    let cached = ctx.session.email();

    let spinner = Spinner::start(output, "Checking session...");
    let server_user = ctx.backend.current_user().await;
    spinner.finish();

    if !output.is_human() {
        let server = server_user.as_ref().ok().and_then(|u| u.as_ref());
        output.json(&json!({
            "type": "whoami",
            "cached_email": cached,
            "logged_in_at": ctx.cache.logged_in_at().map(|t| t.to_rfc3339()),
            "server_user": server,
        }));
        return Ok(());
    }

    match (cached, server_user) {
        (None, _) => output.info("Not logged in"),
        (Some(email), Ok(Some(user))) => {
            output.success(format!("Logged in as {} <{}>", user.name, email));
            if let Some(at) = ctx.cache.logged_in_at() {
                output.info(format!("Session started {}", at.format("%Y-%m-%d %H:%M UTC")));
            }
        }
        (Some(email), Ok(None)) => {
            output.warn(format!("Cached login for {} but the server session has expired", email));
            output.info("Run 'trackflix login' again.");
        }
        (Some(email), Err(e)) => {
            output.warn(format!("Cached login for {}; server unreachable: {}", email, e));
        }
    }
    Ok(())
}
