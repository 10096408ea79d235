//! Stress and model tests for the order book.
//!
//! These tests verify:
//! 1. Every structural invariant holds after long random submit/cancel runs
//! 2. The book agrees with a naive reference model line for line
//! 3. Identical command streams produce identical state roots
//! 4. Throughput is reasonable
//!
//! ## Running Stress Tests
//!
//! ```bash
//! cargo test --release --test stress_test -- --nocapture
//! ```

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use tob_book::orderbook::LevelSummary;
use tob_book::{BookError, BookEvent, OrderBook, Side};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

/// Operations in the throughput run
const STRESS_OP_COUNT: usize = 200_000;

/// Operations in the model comparison runs (validated after every step)
const MODEL_OP_COUNT: usize = 5_000;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Op {
    Submit {
        owner: u64,
        price: u64,
        quantity: u64,
        side: Side,
        id: u64,
    },
    Cancel {
        id: u64,
    },
}

/// Generate a deterministic operation stream.
///
/// Prices cluster around 1000 so that crossing rejections, equal-price
/// queueing and level removals all happen often. Cancels mostly target IDs
/// that were submitted, sometimes ones that never were.
fn generate_ops(count: usize, seed: u64) -> Vec<Op> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut ops = Vec::with_capacity(count);
    let mut next_id = 1u64;

    for _ in 0..count {
        if next_id > 1 && rng.gen_bool(0.4) {
            let id = if rng.gen_bool(0.05) {
                next_id + 1_000_000
            } else {
                rng.gen_range(1..next_id)
            };
            ops.push(Op::Cancel { id });
        } else {
            let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            let price = match side {
                Side::Buy => rng.gen_range(980..=1_005),
                Side::Sell => rng.gen_range(995..=1_020),
            };
            ops.push(Op::Submit {
                owner: rng.gen_range(1..=50),
                price,
                quantity: rng.gen_range(1..=100),
                side,
                id: next_id,
            });
            next_id += 1;
        }
    }

    ops
}

/// Naive reference book: one Vec per price, linear scans everywhere.
#[derive(Default)]
struct Model {
    bids: BTreeMap<u64, Vec<(u64, u64)>>,
    asks: BTreeMap<u64, Vec<(u64, u64)>>,
    owners: HashMap<u64, (u64, Side, u64)>,
}

impl Model {
    fn side(&mut self, side: Side) -> &mut BTreeMap<u64, Vec<(u64, u64)>> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn best(&self, side: Side) -> Option<(u64, u64)> {
        let level = match side {
            Side::Buy => self.bids.iter().next_back(),
            Side::Sell => self.asks.iter().next(),
        };
        level.map(|(p, orders)| (*p, orders.iter().map(|(_, q)| q).sum()))
    }

    fn tob_line(&self, side: Side) -> String {
        let symbol = if side == Side::Sell { "S" } else { "B" };
        match self.best(side) {
            Some((p, v)) => format!("B, {}, {}, {}", symbol, p, v),
            None => format!("B, {}, -, -", symbol),
        }
    }

    fn submit(
        &mut self,
        owner: u64,
        price: u64,
        quantity: u64,
        side: Side,
        id: u64,
    ) -> Vec<String> {
        let crosses = match side {
            Side::Sell => self.best(Side::Buy).map_or(false, |(bid, _)| price <= bid),
            Side::Buy => self.best(Side::Sell).map_or(false, |(ask, _)| price >= ask),
        };
        if crosses {
            return vec![format!("R, {}, {}", owner, id)];
        }

        let before = self.best(side).map(|(p, _)| p);
        self.side(side).entry(price).or_default().push((id, quantity));
        self.owners.insert(id, (owner, side, price));

        let mut lines = vec![format!("A, {}, {}", owner, id)];
        let touches_top = match (before, side) {
            (None, _) => true,
            (Some(b), Side::Buy) => price >= b,
            (Some(b), Side::Sell) => price <= b,
        };
        if touches_top {
            lines.push(self.tob_line(side));
        }
        lines
    }

    fn cancel(&mut self, id: u64) -> Option<Vec<String>> {
        let (owner, side, price) = self.owners.remove(&id)?;
        let before = self.best(side);

        let levels = self.side(side);
        let orders = levels.get_mut(&price)?;
        orders.retain(|(oid, _)| *oid != id);
        if orders.is_empty() {
            levels.remove(&price);
        }

        let mut lines = vec![format!("A, {}, {}", owner, id)];
        if before.map(|(p, _)| p) == Some(price) {
            lines.push(self.tob_line(side));
        }
        Some(lines)
    }

    fn depth(&self, side: Side) -> Vec<LevelSummary> {
        let summary = |(p, orders): (&u64, &Vec<(u64, u64)>)| LevelSummary {
            price: *p,
            orders: orders.len(),
            volume: orders.iter().map(|(_, q)| q).sum(),
        };
        match side {
            Side::Buy => self.bids.iter().rev().map(summary).collect(),
            Side::Sell => self.asks.iter().map(summary).collect(),
        }
    }
}

fn lines(book: &mut OrderBook, op: Op) -> Result<Vec<String>, BookError> {
    let events = match op {
        Op::Submit { owner, price, quantity, side, id } => {
            book.submit(owner, price, quantity, side, id)?
        }
        Op::Cancel { id } => book.cancel(id)?,
    };
    Ok(events.iter().map(|e| e.to_string()).collect())
}

/// Run a deterministic stream and return the final state root.
fn run_deterministic_sequence(seed: u64, count: usize) -> [u8; 32] {
    let mut book = OrderBook::with_capacity(count);
    for op in generate_ops(count, seed) {
        let _ = lines(&mut book, op);
    }
    book.state_root().expect("state root")
}

// ============================================================================
// MODEL TESTS
// ============================================================================

#[test]
fn model_agrees_with_book() {
    for seed in [1u64, 7, 42, 1337] {
        let mut book = OrderBook::with_capacity(MODEL_OP_COUNT);
        let mut model = Model::default();

        for (step, op) in generate_ops(MODEL_OP_COUNT, seed).into_iter().enumerate() {
            let actual = lines(&mut book, op);
            let expected = match op {
                Op::Submit { owner, price, quantity, side, id } => {
                    Some(model.submit(owner, price, quantity, side, id))
                }
                Op::Cancel { id } => model.cancel(id),
            };

            match (actual, expected) {
                (Ok(a), Some(e)) => assert_eq!(a, e, "seed {} step {} {:?}", seed, step, op),
                (Err(BookError::OrderNotFound(_)), None) => {}
                (a, e) => panic!(
                    "seed {} step {} {:?}: book {:?}, model {:?}",
                    seed, step, op, a, e
                ),
            }

            book.validate()
                .unwrap_or_else(|err| panic!("seed {} step {}: {}", seed, step, err));
        }

        assert_eq!(book.depth(Side::Buy), model.depth(Side::Buy));
        assert_eq!(book.depth(Side::Sell), model.depth(Side::Sell));
        for (price, orders) in &model.bids {
            let ids: Vec<u64> = orders.iter().map(|(id, _)| *id).collect();
            assert_eq!(book.orders_at(Side::Buy, *price), ids, "FIFO at bid {}", price);
        }
        for (price, orders) in &model.asks {
            let ids: Vec<u64> = orders.iter().map(|(id, _)| *id).collect();
            assert_eq!(book.orders_at(Side::Sell, *price), ids, "FIFO at ask {}", price);
        }
    }
}

#[test]
fn never_crossed() {
    let mut book = OrderBook::with_capacity(MODEL_OP_COUNT);

    for op in generate_ops(MODEL_OP_COUNT, 99) {
        let _ = lines(&mut book, op);
        if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
            assert!(ask.price > bid.price, "crossed: bid {} ask {}", bid.price, ask.price);
        }
    }
}

#[test]
fn failed_cancel_leaves_state_untouched() {
    let mut book = OrderBook::with_capacity(1_000);
    for op in generate_ops(1_000, 5) {
        let _ = lines(&mut book, op);
    }

    let root = book.state_root().unwrap();
    let count = book.order_count();

    for id in [0u64, 5_000_000, u64::MAX] {
        assert!(matches!(book.cancel(id), Err(BookError::OrderNotFound(_))));
    }
    assert_eq!(book.state_root().unwrap(), root);
    assert_eq!(book.order_count(), count);
}

// ============================================================================
// DETERMINISM
// ============================================================================

#[test]
fn determinism_same_seed_same_root() {
    let root1 = run_deterministic_sequence(12345, 20_000);
    let root2 = run_deterministic_sequence(12345, 20_000);
    assert_eq!(root1, root2, "same stream must produce the same state root");

    let root3 = run_deterministic_sequence(54321, 20_000);
    assert_ne!(root1, root3, "different streams should diverge");
}

// ============================================================================
// STRESS
// ============================================================================

#[test]
fn stress_200k_ops() {
    let ops = generate_ops(STRESS_OP_COUNT, 42);
    let mut book = OrderBook::with_capacity(STRESS_OP_COUNT);

    let start = Instant::now();
    let mut rejected = 0usize;
    let mut not_found = 0usize;
    let mut tob_updates = 0usize;
    for op in ops {
        let result = match op {
            Op::Submit { owner, price, quantity, side, id } => {
                book.submit(owner, price, quantity, side, id)
            }
            Op::Cancel { id } => book.cancel(id),
        };
        match result {
            Ok(events) => {
                if matches!(events[0], BookEvent::Rejected { .. }) {
                    rejected += 1;
                }
                tob_updates += events.iter().filter(|e| e.is_top_of_book()).count();
            }
            Err(_) => not_found += 1,
        }
    }
    let elapsed = start.elapsed();

    println!("\n=== STRESS: {} ops ===", STRESS_OP_COUNT);
    println!("  Elapsed:         {:>12.2?}", elapsed);
    println!("  Ops/sec:         {:>12.0}", STRESS_OP_COUNT as f64 / elapsed.as_secs_f64());
    println!("  Rejected:        {:>12}", rejected);
    println!("  Cancel misses:   {:>12}", not_found);
    println!("  ToB updates:     {:>12}", tob_updates);
    println!("  Resting orders:  {:>12}", book.order_count());
    println!("  Bid/ask levels:  {:>6}/{:<6}", book.bid_levels(), book.ask_levels());

    book.validate().unwrap();
    assert!(rejected > 0, "stream should exercise the crossing rule");
    assert!(not_found > 0, "stream should exercise unknown cancels");
    assert!(tob_updates > 0, "stream should move the top of book");
}
