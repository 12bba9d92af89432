//! Politeness delay before each detail request.

use std::time::Duration;

use gamescore_shared::PolitenessWindow;
use rand::Rng;

/// Source of the wait inserted before each detail request.
pub trait DelayPolicy: Send {
    fn next_delay(&mut self) -> Duration;
}

/// Whole seconds drawn uniformly from an inclusive window.
#[derive(Debug, Clone, Copy)]
pub struct RandomDelay {
    window: PolitenessWindow,
}

impl RandomDelay {
    pub fn new(window: PolitenessWindow) -> Self {
        Self { window }
    }
}

impl DelayPolicy for RandomDelay {
    fn next_delay(&mut self) -> Duration {
        let PolitenessWindow { min_secs, max_secs } = self.window;
        if min_secs >= max_secs {
            return Duration::from_secs(min_secs);
        }
        Duration::from_secs(rand::rng().random_range(min_secs..=max_secs))
    }
}

/// The same delay every time. `FixedDelay::zero()` disables waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    pub fn zero() -> Self {
        Self(Duration::ZERO)
    }
}

impl DelayPolicy for FixedDelay {
    fn next_delay(&mut self) -> Duration {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_delay_stays_in_window() {
        let mut delay = RandomDelay::new(PolitenessWindow {
            min_secs: 2,
            max_secs: 10,
        });
        for _ in 0..200 {
            let secs = delay.next_delay().as_secs();
            assert!((2..=10).contains(&secs), "{secs}s outside window");
        }
    }

    #[test]
    fn degenerate_window_is_exact() {
        let mut delay = RandomDelay::new(PolitenessWindow {
            min_secs: 3,
            max_secs: 3,
        });
        assert_eq!(delay.next_delay(), Duration::from_secs(3));
    }

    #[test]
    fn fixed_zero_delay() {
        assert_eq!(FixedDelay::zero().next_delay(), Duration::ZERO);
    }
}
