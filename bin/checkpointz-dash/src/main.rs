use checkpointz_dash::{
    cli::{Cli, Commands},
    commands,
};
use checkpointz_dashboard::config::DashboardConfig;
use checkpointz_executor::DashExecutor;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set the default log level from the verbosity flag if not set
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", cli.log_level());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = DashboardConfig::load(cli.config.as_deref(), cli.overrides())?;
    let executor = DashExecutor::new()?;
    let handle = executor.handle();

    let result = match cli.command {
        Commands::Watch(cmd) => {
            info!("Starting dashboard");
            let task = executor.spawn_cancellable(move |shutdown| {
                commands::watch(cmd, config, handle, Some(shutdown))
            });
            executor.block_on(task)?.unwrap_or(Ok(()))
        }
        command => executor.block_on(commands::run(command, config, handle)),
    };

    executor.shutdown();
    result
}
