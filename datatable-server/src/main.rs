use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use datatable_server::MockServer;
use datatable_server::ServerConfig;
use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use tokio_util::sync::CancellationToken;

/// Mock user and task API.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// Number of generated users.
    #[arg(long, default_value_t = 30)]
    users: usize,

    /// Seed of the dataset generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Latency of /api/users in milliseconds.
    #[arg(long, default_value_t = 300)]
    users_latency_ms: u64,

    /// Latency of /api/users/with-tasks in milliseconds.
    #[arg(long, default_value_t = 500)]
    with_tasks_latency_ms: u64,

    /// Latency of /api/users/{id}/tasks in milliseconds.
    #[arg(long, default_value_t = 200)]
    tasks_latency_ms: u64,

    /// Make the tasks endpoint of this user id fail. Repeatable.
    #[arg(long = "fail-tasks", value_name = "ID")]
    fail_tasks: Vec<u64>,

    /// Log verbosity (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = TermLogger::init(
        args.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let config = ServerConfig::default()
        .with_addr(args.addr)
        .with_dataset_size(args.users)
        .with_seed(args.seed)
        .with_users_latency(Duration::from_millis(args.users_latency_ms))
        .with_embedded_latency(Duration::from_millis(args.with_tasks_latency_ms))
        .with_tasks_latency(Duration::from_millis(args.tasks_latency_ms))
        .with_failing_tasks(args.fail_tasks);

    let server = match MockServer::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            log::error!("failed to bind {}: {}", args.addr, e);
            std::process::exit(1);
        }
    };

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    if let Err(e) = server.run_until(shutdown).await {
        log::error!("server error: {}", e);
        std::process::exit(1);
    }
}
