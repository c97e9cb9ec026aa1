// src/core/pause.rs
use std::thread;
use std::time::Duration;

use rand_distr::{Distribution, Uniform};

/// Delay used to let the portal finish rendering after a click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pause {
    None,
    Fixed(Duration),
    /// Uniform draw in `[min, max]`, in milliseconds.
    Between { min_ms: u64, max_ms: u64 },
}

impl Pause {
    pub fn between_ms(min_ms: u64, max_ms: u64) -> Self {
        if min_ms >= max_ms {
            Pause::Fixed(Duration::from_millis(min_ms))
        } else {
            Pause::Between { min_ms, max_ms }
        }
    }

    pub fn duration(&self) -> Duration {
        match *self {
            Pause::None => Duration::ZERO,
            Pause::Fixed(d) => d,
            Pause::Between { min_ms, max_ms } => match Uniform::new_inclusive(min_ms, max_ms) {
                Ok(dist) => {
                    let mut rng = rand::rng();
                    Duration::from_millis(dist.sample(&mut rng))
                }
                Err(_) => Duration::from_millis(min_ms),
            },
        }
    }

    pub fn sleep(&self) {
        let d = self.duration();
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}
