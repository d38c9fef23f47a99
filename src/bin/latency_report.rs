//! Per-command latency report.
//!
//! Drives the matching core synchronously with pre-generated commands and
//! records each `apply` into an HDR histogram. Events are drained from
//! the ring between measurements so the output side never back-pressures.

use std::time::Instant;

use hdrhistogram::Histogram;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use flashmatch::{Engine, InputCommand, OutputEvent, Side, DISTRIBUTOR_BUFFER};

const ITERATIONS: usize = 1_000_000;
const WARMUP: usize = 10_000;
const SEED: u64 = 0xFACE_FEED;

fn random_limit(rng: &mut ChaCha8Rng) -> InputCommand {
    InputCommand::limit(
        0,
        if rng.gen_bool(0.5) { Side::Bid } else { Side::Ask },
        8000 + rng.gen_range(0..200),
        rng.gen_range(1..=100),
        rng.gen_range(1..=100),
    )
}

fn main() {
    println!("Preparing latency report...");

    let (mut engine, _commands, mut events) = Engine::with_capacity(1 << 21);
    engine.matcher.warm_up();

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut histogram = Histogram::<u64>::new_with_bounds(1, 1_000_000, 3).unwrap();
    let mut drain_buf = vec![OutputEvent::default(); DISTRIBUTOR_BUFFER];

    // Train the branch predictor and fault in the hot structures before
    // taking any measurements.
    println!("Warming up ({} ops)...", WARMUP);
    for _ in 0..WARMUP {
        let cmd = random_limit(&mut rng);
        engine.matcher.apply(&cmd);
        while events.try_read(&mut drain_buf) > 0 {}
    }

    println!("Measuring {} ops...", ITERATIONS);
    let mut total_ns = 0u64;

    for _ in 0..ITERATIONS {
        let cmd = random_limit(&mut rng);

        let start = Instant::now();
        std::hint::black_box(engine.matcher.apply(&cmd));
        let elapsed = start.elapsed().as_nanos() as u64;

        histogram.record(elapsed).unwrap_or(());
        total_ns += elapsed;

        while events.try_read(&mut drain_buf) > 0 {}
    }

    println!("\n=== Latency Report (ns) ===");
    println!("Total ops:  {}", ITERATIONS);
    println!(
        "Throughput: {:.2} ops/sec",
        ITERATIONS as f64 / (total_ns as f64 / 1e9)
    );
    println!("---------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("P99.99: {:6} ns", histogram.value_at_quantile(0.9999));
    println!("Max:    {:6} ns", histogram.max());
}
