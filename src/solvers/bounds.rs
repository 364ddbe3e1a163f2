use log::info;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// A trait for objects deciding whether a search may go on.
///
/// Bounds are only checked between two solver calls.
pub trait ComputationalBounds {
    /// Returns `true` iff the search may go on with the given iteration number.
    fn within_bounds(&self, iteration: usize) -> bool;
}

/// Bounds on the number of iterations, the search time and the total time, with a cooperative cancellation flag.
///
/// Unset limits are not checked.
/// The search time is measured from the creation of this object,
/// while the total time is measured from the instant given by [with_total_start](Self::with_total_start) (defaults to the creation of this object).
///
/// # Example
///
/// ```
/// # use liftsat::solvers::{ComputationalBounds, SearchLimits};
/// # use std::time::Duration;
/// let limits = SearchLimits::default()
///     .with_max_iterations(3)
///     .with_max_search_time(Duration::from_secs(3600));
/// assert!(limits.within_bounds(3));
/// assert!(!limits.within_bounds(4));
/// limits.cancellation_flag().store(true, std::sync::atomic::Ordering::Relaxed);
/// assert!(!limits.within_bounds(0));
/// ```
#[derive(Debug, Clone)]
pub struct SearchLimits {
    max_iterations: Option<usize>,
    max_search_time: Option<Duration>,
    max_total_time: Option<Duration>,
    search_start: Instant,
    total_start: Instant,
    cancelled: Arc<AtomicBool>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            max_iterations: None,
            max_search_time: None,
            max_total_time: None,
            search_start: now,
            total_start: now,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl SearchLimits {
    /// Sets the maximal iteration number.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Sets the maximal search time.
    pub fn with_max_search_time(mut self, max_search_time: Duration) -> Self {
        self.max_search_time = Some(max_search_time);
        self
    }

    /// Sets the maximal total time.
    pub fn with_max_total_time(mut self, max_total_time: Duration) -> Self {
        self.max_total_time = Some(max_total_time);
        self
    }

    /// Sets the instant the total time is measured from.
    pub fn with_total_start(mut self, total_start: Instant) -> Self {
        self.total_start = total_start;
        self
    }

    /// Returns the flag that cancels the search when set to `true`.
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

impl ComputationalBounds for SearchLimits {
    fn within_bounds(&self, iteration: usize) -> bool {
        if self.cancelled.load(Ordering::Relaxed) {
            info!("search cancelled");
            return false;
        }
        if let Some(max) = self.max_iterations {
            if iteration > max {
                info!("maximal number of iterations ({}) reached", max);
                return false;
            }
        }
        if let Some(max) = self.max_search_time {
            if self.search_start.elapsed() > max {
                info!("maximal search time ({:.3}s) reached", max.as_secs_f64());
                return false;
            }
        }
        if let Some(max) = self.max_total_time {
            if self.total_start.elapsed() > max {
                info!("maximal total time ({:.3}s) reached", max.as_secs_f64());
                return false;
            }
        }
        true
    }
}
