mod config;
mod shutdown;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use commands::TickDriver;
use net::BanList;
use observability::TickMetrics;
use session::SessionRegistry;
use world::{FallbackGate, MemoryWorld, PermissionGate};

use crate::config::{parse_cli_args, ServerConfig};
use crate::shutdown::{shutdown_channel, ShutdownRx};

#[tokio::main]
async fn main() {
    observability::init_logging();

    let config = parse_cli_args();
    tracing::info!(
        addr = %config.net.listen_addr,
        tps = config.tick.tps,
        "remote command server starting"
    );

    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    tokio::select! {
        _ = shutdown::wait_for_signal() => {
            tracing::info!("shutdown signal received, stopping server");
            shutdown_tx.trigger();
            // Give subsystems a moment to finish
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        _ = run_server(config, shutdown_rx) => {}
    }

    tracing::info!("server stopped");
}

async fn run_server(config: ServerConfig, shutdown_rx: ShutdownRx) {
    let registry = Arc::new(Mutex::new(SessionRegistry::new()));

    let bans = if config.ban.file.is_empty() {
        BanList::empty()
    } else {
        match BanList::load(&config.ban.file) {
            Ok(bans) => bans,
            Err(e) => {
                tracing::warn!(file = %config.ban.file, error = %e, "could not read ban list, starting with none");
                BanList::empty()
            }
        }
    };

    let listener = match tokio::net::TcpListener::bind(&config.net.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %config.net.listen_addr, error = %e, "failed to bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!(addr = %config.net.listen_addr, "listening");

    tokio::spawn(net::run_listener(
        listener,
        Arc::clone(&registry),
        bans,
        shutdown_rx.clone().into_inner(),
    ));

    // Tick thread (blocking); all command execution happens there.
    let tick_handle = std::thread::spawn(move || {
        run_tick_thread(registry, config, shutdown_rx);
    });
    let _ = tick_handle.join();
}

fn run_tick_thread(
    registry: Arc<Mutex<SessionRegistry>>,
    config: ServerConfig,
    shutdown_rx: ShutdownRx,
) {
    let mut world = MemoryWorld::new();
    for name in &config.world.extra_worlds {
        world.add_world(name);
    }
    for name in &config.world.players {
        world.add_player(name, false);
    }
    for name in &config.world.online_players {
        world.add_player(name, true);
    }

    let gate = config.permissions.enabled.then(|| {
        FallbackGate::new(
            &config.permissions.online_node,
            &config.permissions.offline_node,
            config.permissions.default_build_radius,
        )
    });

    let driver = TickDriver::new(config.to_driver_config());
    let tick_duration = Duration::from_millis(1000 / config.tick.tps.max(1) as u64);
    let budget_us = tick_duration.as_micros();
    let mut tick_number: u64 = 0;

    tracing::info!(tps = config.tick.tps, "tick loop running");

    loop {
        let tick_start = Instant::now();
        let shutting_down = shutdown_rx.is_shutdown();
        {
            let mut registry = registry.lock().unwrap();
            if shutting_down {
                // Mark every session; this same tick finalizes them, which
                // drops the outbound senders and lets the writers flush.
                registry.close_all();
            }
            let summary = driver.tick(
                &mut registry,
                &mut world,
                gate.as_ref().map(|g| g as &dyn PermissionGate),
            );
            TickMetrics {
                tick_number,
                duration_us: tick_start.elapsed().as_micros(),
                command_count: summary.commands,
                session_count: summary.sessions,
            }
            .log(budget_us);

            if shutting_down && registry.is_empty() {
                break;
            }
        }

        tick_number += 1;
        let elapsed = tick_start.elapsed();
        if elapsed < tick_duration {
            std::thread::sleep(tick_duration - elapsed);
        }
    }

    tracing::info!(tick = tick_number, "tick loop stopped");
}
