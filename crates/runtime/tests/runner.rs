//! The async run loop against a free-running simulator and raw channels.
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dbot_core::{Location, Point};
use runtime::{
    Bot, ChannelTransport, InMemoryCollisionRepo, OutboundCommand, Runner, RuntimeConfig,
    RuntimeError, SimConnection, SimMap, SimulatedServer, spawn_ticker,
};

fn fast_config() -> RuntimeConfig {
    RuntimeConfig {
        loop_period: Duration::from_millis(5),
        action_period: Duration::from_millis(20),
        ..RuntimeConfig::default()
    }
}

fn bot(config: RuntimeConfig) -> Bot {
    Bot::builder("alpha")
        .config(config)
        .repository(Arc::new(InMemoryCollisionRepo::new()))
        .seed(1)
        .build()
        .expect("bot should build")
}

/// Walks a corridor in real time, then shuts down on request.
///
/// Phases:
/// 1. Connect to a simulator ticking every 20ms
/// 2. Travel to the far end of the corridor
/// 3. Resolve the shutdown future; the runner must log the bot out
#[tokio::test]
async fn runner_walks_the_corridor_and_logs_out_on_shutdown() {
    let server = Arc::new(Mutex::new(
        SimulatedServer::new().with_map(SimMap::parse("corridor", "########\n#......#\n########")),
    ));
    let ticker = spawn_ticker(server.clone(), Duration::from_millis(20));
    let connection = SimConnection::connect(
        server.clone(),
        "alpha",
        Location::new("corridor", Point::new(1, 1)),
    )
    .expect("connect");

    let mut bot = bot(fast_config());
    bot.travel([Point::new(6, 1)]);
    let runner = Runner::new(bot, connection);

    // ============================================================================
    // Phase 1: run until the avatar reaches the end
    // ============================================================================
    let watched = server.clone();
    let arrived = async move {
        loop {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let at_end = watched
                .lock()
                .expect("simulator lock")
                .location_of("alpha")
                .is_some_and(|location| location.point == Point::new(6, 1));
            if at_end {
                break;
            }
        }
    };
    let bot = tokio::time::timeout(Duration::from_secs(10), runner.run_until(arrived))
        .await
        .expect("bot should reach the end in time")
        .expect("runner should stop cleanly");
    println!("✓ Reached the end of the corridor");

    // ============================================================================
    // Phase 2: shutdown logged the bot out
    // ============================================================================
    assert!(bot.is_logging_out());
    assert!(
        server
            .lock()
            .expect("simulator lock")
            .location_of("alpha")
            .is_none()
    );
    ticker.abort();
}

#[tokio::test]
async fn dead_transport_exhausts_the_error_budget() {
    let (transport, peer) = ChannelTransport::pair();
    drop(peer);
    let runner = Runner::new(
        bot(RuntimeConfig {
            max_errors: 2,
            ..fast_config()
        }),
        transport,
    );

    let result = tokio::time::timeout(Duration::from_secs(5), runner.run())
        .await
        .expect("runner should give up quickly");
    assert!(matches!(
        result,
        Err(RuntimeError::TooManyErrors { count: 3, max: 2 })
    ));
}

#[tokio::test]
async fn logging_out_ends_the_loop_once_flushed() {
    let (transport, mut peer) = ChannelTransport::pair();
    let mut bot = bot(fast_config());
    bot.logout();
    let runner = Runner::new(bot, transport);

    let bot = tokio::time::timeout(Duration::from_secs(5), runner.run())
        .await
        .expect("runner should stop on its own")
        .expect("clean exit");
    assert!(bot.pending_commands().is_empty());

    let mut sent = Vec::new();
    while let Ok(command) = peer.commands.try_recv() {
        sent.push(command);
    }
    assert_eq!(sent.last(), Some(&OutboundCommand::Logout));
}
