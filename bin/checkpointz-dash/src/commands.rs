use std::io::{self, Write};

use anyhow::{anyhow, Context};
use checkpointz_cache::QueryClient;
use checkpointz_dashboard::{
    app::{is_settled, Dashboard, DashboardEvent},
    config::DashboardConfig,
    get_started::{find_client, CLIENTS},
    render::RenderContext,
    views::GraffitiFormat,
};
use checkpointz_rpc::CheckpointzClient;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use itertools::Itertools;
use tokio::{runtime::Handle, sync::broadcast, sync::mpsc};
use tracing::{debug, info};

use crate::cli::{Commands, WatchCommand};

type Events = mpsc::UnboundedReceiver<DashboardEvent>;

fn connect(
    config: &DashboardConfig,
    handle: Handle,
) -> anyhow::Result<(Dashboard<CheckpointzClient>, Events)> {
    let client = CheckpointzClient::new(&config.endpoint, config.request_timeout())
        .context("invalid endpoint")?;
    info!(endpoint = client.base_url(), "connecting to checkpointz");
    Ok(Dashboard::new(
        QueryClient::new(handle),
        client,
        config.clone(),
    ))
}

fn print(out: &str) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(out.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

pub async fn run(command: Commands, config: DashboardConfig, handle: Handle) -> anyhow::Result<()> {
    match command {
        Commands::Watch(cmd) => watch(cmd, config, handle, None).await,
        command => one_shot(command, config, handle).await,
    }
}

/// Waits for the data the command needs, renders once and returns.
async fn one_shot(command: Commands, config: DashboardConfig, handle: Handle) -> anyhow::Result<()> {
    let ctx = RenderContext::new(config.color);
    let (mut dashboard, mut events) = connect(&config, handle)?;

    let status_settled = |d: &Dashboard<CheckpointzClient>| is_settled(&d.status());

    match command {
        Commands::Status => {
            dashboard.wait_until(&mut events, status_settled).await;
            print(&dashboard.render_status(&ctx))
        }
        Commands::Upstreams(cmd) => {
            dashboard.upstream_search.set(cmd.search);
            dashboard.wait_until(&mut events, status_settled).await;
            print(&dashboard.render_upstreams(&ctx))
        }
        Commands::Checkpoints(cmd) => {
            dashboard.slot_search.set(cmd.search);
            dashboard
                .wait_until(&mut events, |d| {
                    is_settled(&d.status()) && is_settled(&d.beacon_slots())
                })
                .await;
            print(&dashboard.render_checkpoints(&ctx))
        }
        Commands::Slot(cmd) => {
            dashboard.open_slot(cmd.slot);
            dashboard
                .wait_until(&mut events, |d| d.slot().is_some_and(|s| is_settled(&s)))
                .await;
            let graffiti = if cmd.hex {
                GraffitiFormat::Hex
            } else {
                GraffitiFormat::Ascii
            };
            let out = dashboard
                .render_slot(&ctx, graffiti)
                .ok_or_else(|| anyhow!("slot {} was not opened", cmd.slot))?;
            print(&out)
        }
        Commands::GetStarted(cmd) => {
            let client = match cmd.client.as_deref() {
                Some(name) => Some(find_client(name).ok_or_else(|| {
                    anyhow!(
                        "unknown client {name:?}, expected one of: {}",
                        CLIENTS.iter().map(|client| client.name).join(", ")
                    )
                })?),
                None => None,
            };
            dashboard.wait_until(&mut events, status_settled).await;
            print(&dashboard.render_get_started(&ctx, client))
        }
        Commands::Watch(_) => Err(anyhow!("watch is not a one-shot command")),
    }
}

/// Redraws the full dashboard every time a polled query changes, until the
/// shutdown signal fires.
pub async fn watch(
    cmd: WatchCommand,
    config: DashboardConfig,
    handle: Handle,
    mut shutdown: Option<broadcast::Receiver<()>>,
) -> anyhow::Result<()> {
    let (mut dashboard, mut events) = connect(&config, handle)?;
    dashboard.upstream_search.set(cmd.upstream_search);
    dashboard.slot_search.set(cmd.slot_search);

    redraw(&dashboard, config.color)?;
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                debug!(?event, "redrawing");
                redraw(&dashboard, config.color)?;
            }
            _ = async {
                match shutdown.as_mut() {
                    Some(shutdown) => {
                        let _ = shutdown.recv().await;
                    }
                    None => std::future::pending::<()>().await,
                }
            } => {
                info!("shutting down");
                break;
            }
        }
    }
    Ok(())
}

fn redraw(dashboard: &Dashboard<CheckpointzClient>, color: bool) -> anyhow::Result<()> {
    let out = dashboard.render(&RenderContext::new(color));
    let mut stdout = io::stdout().lock();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    stdout.write_all(out.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
