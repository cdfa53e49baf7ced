//! Naive Fibonacci micro-benchmark.
//!
//! Deliberately exponential recursion, useful as a main-thread stall to watch
//! the fps overlay dip and recover, or as a crude single-core yardstick.

use std::time::{Duration, Instant};

/// `fib(0) = fib(1) = 1`, then the usual sum. No memoization.
pub fn fib(n: u32) -> u64 {
    if n <= 1 {
        return 1;
    }
    fib(n - 1) + fib(n - 2)
}

/// Result of one timed [`fib`] run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FibReport {
    pub n: u32,
    pub value: u64,
    pub elapsed: Duration,
}

/// Compute `fib(n)` and time it.
pub fn run_fib(n: u32) -> FibReport {
    let t0 = Instant::now();
    let value = fib(n);
    FibReport {
        n,
        value,
        elapsed: t0.elapsed(),
    }
}

impl std::fmt::Display for FibReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fib: {} -- {:.3}s", self.value, self.elapsed.as_secs_f64())
    }
}
