#[cfg(target_arch = "wasm32")]
thread_local! {
    static PERFORMANCE: Option<web_sys::Performance> =
        web_sys::window().and_then(|w| w.performance());
}

#[cfg(target_arch = "wasm32")]
pub fn performance_now() -> f64 {
    PERFORMANCE.with(|perf| perf.as_ref().map(|p| p.now()).unwrap_or(0.0))
}

// Native builds have no Performance API; tick timing reads as zero.
#[cfg(not(target_arch = "wasm32"))]
pub fn performance_now() -> f64 {
    0.0
}

/// Wall-clock cost of a block of work, for `SimulationMetrics`.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: f64,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            start: performance_now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        if self.start <= 0.0 {
            return 0.0;
        }
        let end = performance_now();
        if end >= self.start {
            end - self.start
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn native_stopwatch_reports_zero() {
        let watch = Stopwatch::start();
        assert_eq!(watch.elapsed_ms(), 0.0);
    }
}
