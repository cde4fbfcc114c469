//! DailyTrack - command line entry point
//!
//! Runs a single command against the tracker backend and exits.

#![allow(clippy::print_stdout)]

use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use dailytrack_core::View;
use dailytrack_lib::utils::{init_logging, log_command_execution};
use dailytrack_lib::{AppContext, ControllerError, ViewModel};
use tracing::{debug, info};

const USAGE: &str = "usage: dailytrack <status | login EMAIL PASSWORD | logout | weekly | team | \
                     forgot EMAIL | reset TOKEN PASSWORD | views>";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before the config so DAILYTRACK_* overrides apply
    let dotenv = dotenvy::dotenv();

    let config = dailytrack_infra::config::load().context("failed to load configuration")?;
    init_logging(&config.logging);
    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) => debug!(error = %e, "No .env file loaded"),
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map_or("status", String::as_str);
    let rest = args.get(1..).unwrap_or(&[]);

    let launch_url = std::env::var("DAILYTRACK_LAUNCH_URL").ok();
    let ctx = AppContext::new_with_launch_url(config, launch_url.as_deref())
        .await
        .context("failed to build application context")?;
    ctx.start_background().await.context("failed to start health monitor")?;

    let started = Instant::now();
    let outcome = run(&ctx, command, rest).await;
    log_command_execution(command, started.elapsed(), outcome.is_ok());

    ctx.shutdown().await.context("failed to shut down cleanly")?;
    outcome
}

fn shown(err: ControllerError) -> anyhow::Error {
    anyhow!(err.user_message())
}

async fn run(ctx: &AppContext, command: &str, args: &[String]) -> Result<()> {
    let controller = &ctx.controller;

    match (command, args) {
        ("status", []) => {
            ctx.probe_backend().await;
            let report = ctx.status_report().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ("login", [email, password]) => {
            let user = controller.login(email, password).await.map_err(shown)?;
            println!("Signed in as {} ({})", user.display_name(), user.role);
        }
        ("logout", []) => {
            controller.logout().await;
            println!("Signed out");
        }
        ("weekly", []) => {
            controller.navigate(View::Performance).map_err(shown)?;
            if let ViewModel::Performance { summary, rows, scope, .. } =
                controller.load_current_view().await.map_err(shown)?
            {
                println!(
                    "Week {} to {}: {:.1}h logged, {:.1}h remaining ({}%)",
                    summary.week_start, summary.week_end, summary.hours, summary.remaining,
                    summary.percent
                );
                println!("{} rows in scope ({scope})", rows.len());
            }
        }
        ("team", []) => {
            controller.navigate(View::TeamReport).map_err(shown)?;
            if let ViewModel::TeamReport { rows, source } =
                controller.load_current_view().await.map_err(shown)?
            {
                debug!(?source, "Team report loaded");
                for row in rows {
                    println!(
                        "{:<32} {:>4} entries {:>7.1}h total {:>6.1}h/day",
                        row.email,
                        row.entries,
                        row.total_hours.unwrap_or(0.0),
                        row.avg_daily.unwrap_or(0.0)
                    );
                }
            }
        }
        ("forgot", [email]) => {
            controller.forgot_password(email).await.map_err(shown)?;
            println!("Check your email for a reset link");
        }
        ("reset", [token, password]) => {
            controller.reset_password(token, password).await.map_err(shown)?;
            println!("Password reset successfully. You can now sign in.");
        }
        ("views", []) => {
            let menu = controller.menu();
            if menu.is_empty() {
                bail!("Not signed in");
            }
            for view in menu {
                println!("{view}");
            }
        }
        _ => bail!(USAGE),
    }
    Ok(())
}
