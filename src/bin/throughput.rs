//! End-to-end throughput driver.
//!
//! Feeds a seeded random workload (90% limit orders, 10% cancels of
//! recently issued ids) through the full command ring -> engine -> event
//! ring path and reports sustained commands per second.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use flashmatch::{run_output, Engine, InputCommand, OrderId, Side, MAX_SYMBOLS};

const COMMANDS: u64 = 20_000_000;
const SEED: u64 = 0x5EED_CAFE;

// Cancels target ids issued within this window, so most hit live orders.
const CANCEL_WINDOW: OrderId = 1024;

fn main() {
    println!("Starting engine (pool warm-up takes a moment)...");
    let (mut engine, mut commands, mut events) = Engine::new();

    let outputs = Arc::new(AtomicU64::new(0));
    let outputs_seen = Arc::clone(&outputs);

    thread::spawn(move || engine.run(true));
    thread::spawn(move || {
        run_output(&mut events, move |_ev| {
            outputs_seen.fetch_add(1, Ordering::Relaxed);
        })
    });

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);

    // Limit orders are accepted in submission order, so the producer can
    // predict every issued id without hearing back from the engine.
    let mut issued: OrderId = 0;

    println!("Pushing {} commands...", COMMANDS);
    let start = Instant::now();

    for _ in 0..COMMANDS {
        let cmd = if issued > 0 && rng.gen_ratio(1, 10) {
            let window = issued.min(CANCEL_WINDOW);
            InputCommand::cancel(issued - rng.gen_range(0..window))
        } else {
            issued += 1;
            InputCommand::limit(
                rng.gen_range(0..MAX_SYMBOLS as u16),
                if rng.gen_bool(0.5) { Side::Bid } else { Side::Ask },
                100 + rng.gen_range(0..200),
                rng.gen_range(1..=1000),
                rng.gen_range(1..=1000),
            )
        };
        commands.push(cmd);
    }

    // Every command produces at least one event; wait for the tail to
    // drain through the output ring.
    while outputs.load(Ordering::Relaxed) < COMMANDS {
        thread::sleep(Duration::from_micros(10));
    }

    let elapsed = start.elapsed();
    let per_op = elapsed.as_nanos() as f64 / COMMANDS as f64;

    println!(
        "{} commands in {:.2?} -> {:.0} ns/op, {:.1}M cmd/s",
        COMMANDS,
        elapsed,
        per_op,
        COMMANDS as f64 / elapsed.as_secs_f64() / 1e6,
    );
    println!(
        "{} limit orders issued, {} events observed",
        issued,
        outputs.load(Ordering::Relaxed),
    );

    // The dispatch loops never return; the process ends here.
    std::process::exit(0);
}
