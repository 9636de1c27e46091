//! Bounded open/close chains: the raw material for synthetic trading
//! histories. A chain never closes more than it has opened, so every leg is
//! accepted by the ledger as-is.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::index::sample;
use rand_chacha::ChaCha8Rng;

use crate::types::transaction::Action;

/// One leg of a generated chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainLeg {
    pub at: DateTime<Utc>,
    pub action: Action,
    pub quantity: f64,
}

/// Produce up to `max_legs` legs at distinct timestamps drawn from `times`.
///
/// The first leg always opens, sized 20..500 whole shares. Later legs open
/// or close with equal probability, sized below the first leg. A close that
/// would overshoot the open total is clamped to what remains and ends the
/// chain; the chain also ends as soon as it returns to flat.
pub fn transaction_chain(
    max_legs: usize,
    times: &[DateTime<Utc>],
    rng: &mut ChaCha8Rng,
) -> Vec<ChainLeg> {
    if max_legs == 0 || times.is_empty() {
        return Vec::new();
    }

    let legs_wanted = max_legs.min(times.len());
    let mut picked: Vec<DateTime<Utc>> = sample(rng, times.len(), legs_wanted)
        .into_iter()
        .map(|i| times[i])
        .collect();
    picked.sort();

    let first_size = rng.gen_range(20..500) as f64;
    let mut legs = vec![ChainLeg {
        at: picked[0],
        action: Action::Open,
        quantity: first_size,
    }];

    let mut opened = first_size;
    let mut closed = 0.0;

    for &at in picked.iter().skip(1) {
        let action = if rng.gen_bool(0.5) {
            Action::Open
        } else {
            Action::Close
        };
        let size = rng.gen_range(1..first_size as u64) as f64;

        match action {
            Action::Open => {
                opened += size;
                legs.push(ChainLeg {
                    at,
                    action,
                    quantity: size,
                });
            }
            Action::Close => {
                let remaining = opened - closed;
                if size >= remaining {
                    // Close out whatever is left and stop.
                    legs.push(ChainLeg {
                        at,
                        action,
                        quantity: remaining,
                    });
                    return legs;
                }
                closed += size;
                legs.push(ChainLeg {
                    at,
                    action,
                    quantity: size,
                });
            }
        }
    }

    legs
}
