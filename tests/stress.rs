//! Stress tests: contention at one price, deep sweeps, rapid churn, and
//! conservation of quantity under a random workload.

use flashmatch::{
    Consumer, Engine, EventType, OrderId, OutputEvent, Side, FREE_SLOTS,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn new_engine(capacity: usize) -> (Engine, Consumer<OutputEvent>) {
    let (engine, _commands, events) = Engine::with_capacity(capacity);
    (engine, events)
}

fn drain(events: &mut Consumer<OutputEvent>) -> Vec<OutputEvent> {
    let mut buf = [OutputEvent::default(); 512];
    let mut all = Vec::new();
    loop {
        let n = events.try_read(&mut buf);
        if n == 0 {
            return all;
        }
        all.extend_from_slice(&buf[..n]);
    }
}

#[test]
fn test_single_price_level_contention() {
    const ORDERS: u32 = 1_000;
    let (mut engine, mut events) = new_engine(1 << 14);
    let m = &mut engine.matcher;

    for i in 0..ORDERS {
        m.limit(0, Side::Ask, 500, 10, (i % 100) as u16);
    }
    drain(&mut events);
    assert_eq!(m.order_count(), ORDERS as usize);

    // One bid takes out the whole level.
    m.limit(0, Side::Bid, 500, ORDERS * 10, 999);
    let evs = drain(&mut events);

    let execs = evs
        .iter()
        .filter(|e| e.kind == EventType::Execution)
        .count();
    assert_eq!(execs, ORDERS as usize);
    assert_eq!(m.order_count(), 0);
    assert_eq!(m.best_ask(0), None);
    assert_eq!(m.best_bid(0), None);
}

#[test]
fn test_fifo_priority_under_contention() {
    let (mut engine, mut events) = new_engine(1 << 12);
    let m = &mut engine.matcher;

    for i in 0..100u16 {
        m.limit(0, Side::Ask, 500, 10, i);
    }
    drain(&mut events);

    // Take out exactly the first 50.
    m.limit(0, Side::Bid, 500, 500, 999);
    let evs = drain(&mut events);

    let counters: Vec<OrderId> = evs
        .iter()
        .filter(|e| e.kind == EventType::Execution)
        .map(|e| e.counter_order_id)
        .collect();
    assert_eq!(counters.len(), 50);
    for (i, &counter) in counters.iter().enumerate() {
        assert_eq!(counter, i as OrderId + 1, "fill {} out of order", i);
    }

    assert_eq!(m.order_count(), 50);
    assert_eq!(m.resting_size(51), Some(10));
}

#[test]
fn test_rapid_add_cancel_cycles() {
    const CYCLES: usize = 10_000;
    let (mut engine, mut events) = new_engine(1 << 15);
    let m = &mut engine.matcher;

    for cycle in 0..CYCLES {
        m.limit(0, Side::Bid, 500 + (cycle % 50) as u32, 10, 1);
        let id = m.last_order_id();
        m.cancel(id);
        let evs = drain(&mut events);
        assert_eq!(evs.len(), 2);
        assert_eq!(evs[0].kind, EventType::Order);
        assert_eq!(evs[1].kind, EventType::Cancel);
    }

    assert_eq!(m.order_count(), 0);
    assert_eq!(m.last_order_id(), CYCLES as OrderId);
}

#[test]
fn test_slot_churn_past_free_ring_capacity() {
    // Rest, then cancel, far more orders than the recycled-slot ring can
    // hold; surplus slots are dropped but the pool keeps serving.
    let churn = (FREE_SLOTS * 3) as usize;
    let (mut engine, mut events) = new_engine(1 << 14);
    let m = &mut engine.matcher;

    for i in 0..churn {
        m.limit(0, Side::Bid, 100 + (i % 200) as u32, 5, 1);
    }
    drain(&mut events);
    assert_eq!(m.order_count(), churn);

    for id in 1..=churn as OrderId {
        m.cancel(id);
    }
    drain(&mut events);
    assert_eq!(m.order_count(), 0);

    // Everything still works after the churn.
    m.limit(0, Side::Ask, 150, 5, 2);
    m.limit(0, Side::Bid, 150, 5, 3);
    let evs = drain(&mut events);
    assert_eq!(
        evs.iter()
            .filter(|e| e.kind == EventType::Execution)
            .count(),
        1
    );
    assert_eq!(m.order_count(), 0);
}

#[test]
fn test_deep_ladder_sweep() {
    const LEVELS: u32 = 500;
    let (mut engine, mut events) = new_engine(1 << 12);
    let m = &mut engine.matcher;

    for i in 0..LEVELS {
        m.limit(0, Side::Ask, 1_000 + i, 2, 1);
    }
    drain(&mut events);

    // Sweep the entire ladder and rest what is left.
    m.limit(0, Side::Bid, 1_000 + LEVELS, LEVELS * 2 + 7, 2);
    let evs = drain(&mut events);

    let execs: Vec<_> = evs
        .iter()
        .filter(|e| e.kind == EventType::Execution)
        .collect();
    assert_eq!(execs.len(), LEVELS as usize);

    // Strictly ascending price walk.
    for (i, exec) in execs.iter().enumerate() {
        assert_eq!(exec.price, 1_000 + i as u32);
        assert_eq!(exec.size, 2);
    }

    assert_eq!(m.best_ask(0), None);
    assert_eq!(m.best_bid(0), Some(1_000 + LEVELS));
    assert_eq!(m.resting_size(m.last_order_id()), Some(7));
}

#[test]
fn test_quantity_conservation_under_random_workload() {
    const OPS: usize = 5_000;
    let (mut engine, mut events) = new_engine(1 << 14);
    let mut rng = ChaCha8Rng::seed_from_u64(0xC0DE_5EED);

    for _ in 0..OPS {
        let side = if rng.gen_bool(0.5) { Side::Bid } else { Side::Ask };
        let price = rng.gen_range(100..130);
        let size = rng.gen_range(1..100);
        engine.matcher.limit(0, side, price, size, 1);
        let id = engine.matcher.last_order_id();

        // Immediately after placement: what the aggressor traded plus
        // what rests must equal what was submitted.
        let traded: u32 = drain(&mut events)
            .iter()
            .filter(|e| e.kind == EventType::Execution && e.order_id == id)
            .map(|e| e.size)
            .sum();
        let resting = engine.matcher.resting_size(id).unwrap_or(0);
        assert_eq!(traded + resting, size, "quantity leak on order {}", id);
    }
}
