// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Polling helpers for tests that wait on worker threads and tasks.

use std::{
    future::Future,
    thread,
    time::{Duration, Instant},
};

const TIMEOUT: Duration = Duration::from_secs(5);
const FIRST_TICK: Duration = Duration::from_millis(5);
const MAX_TICK: Duration = Duration::from_millis(100);

/// Tracks the give-up time and the backoff between checks.
struct Deadline {
    at: Instant,
    tick: Duration,
}

impl Deadline {
    fn new() -> Deadline {
        Deadline {
            at: Instant::now() + TIMEOUT,
            tick: FIRST_TICK,
        }
    }

    /// Panics with the message once the deadline has passed, otherwise returns how long to
    /// wait before the next check.
    fn next_tick(&mut self, error_msg: &str) -> Duration {
        if Instant::now() >= self.at {
            panic!("{}", error_msg);
        }
        let tick = self.tick;
        self.tick = (self.tick * 2).min(MAX_TICK);
        tick
    }
}

/// Blocks until the predicate holds, panicking with `error_msg` after a few seconds.
pub fn eventually<F>(predicate: F, error_msg: &str)
where
    F: Fn() -> bool,
{
    let mut deadline = Deadline::new();
    while !predicate() {
        thread::sleep(deadline.next_tick(error_msg));
    }
}

/// Async form of [`eventually`]; sleeps on the tokio timer between checks.
pub async fn eventually_async<F, Fut>(mut predicate: F, error_msg: &str)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let mut deadline = Deadline::new();
    while !predicate().await {
        tokio::time::sleep(deadline.next_tick(error_msg)).await;
    }
}

#[cfg(test)]
mod test {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::{eventually, Deadline, MAX_TICK};

    #[test]
    fn test_backoff_is_capped() {
        let mut deadline = Deadline::new();
        let ticks: Vec<Duration> = (0..8).map(|_| deadline.next_tick("expired")).collect();
        assert_eq!(Duration::from_millis(5), ticks[0]);
        assert_eq!(Duration::from_millis(10), ticks[1]);
        assert_eq!(MAX_TICK, ticks[7]);
    }

    #[test]
    fn test_eventually_retries_until_true() {
        let calls = AtomicUsize::new(0);
        eventually(
            || calls.fetch_add(1, Ordering::SeqCst) >= 2,
            "Predicate never held",
        );
        assert_eq!(3, calls.load(Ordering::SeqCst));
    }

    #[test]
    #[should_panic(expected = "expired")]
    fn test_expired_deadline_panics() {
        let mut deadline = Deadline::new();
        deadline.at = std::time::Instant::now();
        deadline.next_tick("expired");
    }
}
