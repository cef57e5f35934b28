use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use reservation_control_plane::actors::{spawn_authority, spawn_broker, spawn_controller};
use reservation_control_plane::clock::ActorClock;
use reservation_control_plane::config::ControlPlaneConfig;
use reservation_control_plane::logger;
use reservation_control_plane::peer_registry::PeerRegistry;
use reservation_control_plane::plugin::NullPlugin;
use reservation_control_plane::policy::AdmitAllPolicy;
use reservation_control_plane::store::InMemoryStore;
use reservation_control_plane::tick::TickService;

#[derive(Parser)]
#[command(name = "control-plane", about = "Reservation control-plane actor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the actor with the automatic tick service and run until interrupted.
    Run {
        #[arg(long)]
        config: PathBuf,
    },
    /// Start the actor and drive `cycles` manual ticks, then exit. For local
    /// smoke-testing without waiting on wall-clock cycle boundaries.
    Tick {
        #[arg(long)]
        config: PathBuf,
        #[arg(long, default_value_t = 1)]
        cycles: u64,
    },
}

#[actix_rt::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Command::Run { config } | Command::Tick { config, .. } => config,
    };

    let config = match ControlPlaneConfig::from_file(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to load configuration from {}: {e}", config_path.display());
            return ExitCode::FAILURE;
        }
    };

    logger::init(config.logging.level_filter(), &config.logging.log_file);

    let clock = ActorClock::new(config.clock.beginning_of_time_ms, config.clock.cycle_ms);
    let store = Arc::new(InMemoryStore::new());
    let peer_registry = Arc::new(PeerRegistry::new());
    let policy = Arc::new(AdmitAllPolicy);

    let addr = match config.actor.category.as_str() {
        "authority" => spawn_authority(&config.actor.name, clock, policy, Arc::new(NullPlugin), store, peer_registry),
        "broker" => spawn_broker(&config.actor.name, clock, policy, store, peer_registry),
        "controller" => spawn_controller(&config.actor.name, clock, policy, store, peer_registry),
        other => {
            eprintln!("unknown actor category '{other}' in configuration, expected authority|broker|controller");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Run { .. } => {
            let tick_service = TickService::new(clock, config.clock.cycle_ms as u64);
            tick_service.register(Arc::new(reservation_control_plane::actor::KernelTickHandle::new(addr.clone(), &config.actor.name)));
            let cycle_ms = config.clock.cycle_ms.max(1) as u64;
            tick_service.start(move || chrono::Utc::now().timestamp_millis());
            log::info!("actor '{}' running with automatic tick every {}ms; ctrl-c to stop", config.actor.name, cycle_ms);
            let _ = tokio::signal::ctrl_c().await;
            tick_service.stop();
            ExitCode::SUCCESS
        }
        Command::Tick { cycles, .. } => {
            let tick_service = TickService::new(clock, config.clock.cycle_ms as u64);
            tick_service.register(Arc::new(reservation_control_plane::actor::KernelTickHandle::new(addr.clone(), &config.actor.name)));
            for _ in 0..cycles {
                tick_service.tick();
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            log::info!("drove {cycles} manual ticks for actor '{}'", config.actor.name);
            ExitCode::SUCCESS
        }
    }
}
