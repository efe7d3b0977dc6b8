//! Opt-in stage timings for path synthesis.
//!
//! Timing is collected only with the `path_engine_metrics` feature on native
//! targets (`std::time::Instant` is unavailable on `wasm32`). Otherwise every
//! call is a pass-through and [`PathMetrics::end`] returns `None`.

/// Synthesis stages that can be timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Anchor padding and the smoothing-spline fit.
    SplineFit,
    /// Dense curve evaluation and travel-time parametrization.
    FineSampling,
    /// Damped-spring direction integration.
    DirectionIntegration,
    /// Picking frame indices by travel time.
    FrameSampling,
    /// Direction to camera-angle conversion.
    AngleConversion,
}

impl TimingBucket {
    pub const ALL: [Self; 5] = [
        Self::SplineFit,
        Self::FineSampling,
        Self::DirectionIntegration,
        Self::FrameSampling,
        Self::AngleConversion,
    ];
}

/// Cumulative nanoseconds per stage.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathTimingReport {
    pub spline_fit_ns: u64,
    pub fine_sampling_ns: u64,
    pub direction_integration_ns: u64,
    pub frame_sampling_ns: u64,
    pub angle_conversion_ns: u64,
}

impl PathTimingReport {
    #[must_use]
    pub fn bucket_ns(&self, bucket: TimingBucket) -> u64 {
        match bucket {
            TimingBucket::SplineFit => self.spline_fit_ns,
            TimingBucket::FineSampling => self.fine_sampling_ns,
            TimingBucket::DirectionIntegration => self.direction_integration_ns,
            TimingBucket::FrameSampling => self.frame_sampling_ns,
            TimingBucket::AngleConversion => self.angle_conversion_ns,
        }
    }

    #[must_use]
    pub fn total_ns(&self) -> u64 {
        TimingBucket::ALL
            .iter()
            .fold(0u64, |acc, &bucket| acc.saturating_add(self.bucket_ns(bucket)))
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    #[cfg(all(feature = "path_engine_metrics", not(target_arch = "wasm32")))]
    fn slot(&mut self, bucket: TimingBucket) -> &mut u64 {
        match bucket {
            TimingBucket::SplineFit => &mut self.spline_fit_ns,
            TimingBucket::FineSampling => &mut self.fine_sampling_ns,
            TimingBucket::DirectionIntegration => &mut self.direction_integration_ns,
            TimingBucket::FrameSampling => &mut self.frame_sampling_ns,
            TimingBucket::AngleConversion => &mut self.angle_conversion_ns,
        }
    }
}

/// Stage timer threaded through a synthesis run.
#[derive(Debug, Default)]
pub struct PathMetrics {
    #[cfg(all(feature = "path_engine_metrics", not(target_arch = "wasm32")))]
    report: PathTimingReport,
}

impl PathMetrics {
    /// Clears all counters.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "path_engine_metrics", not(target_arch = "wasm32")))]
        {
            self.report = PathTimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<PathTimingReport> {
        #[cfg(all(feature = "path_engine_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "path_engine_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f`, adding its wall time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "path_engine_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            let slot = self.report.slot(bucket);
            *slot = slot.saturating_add(nanos);
            result
        }

        #[cfg(not(all(feature = "path_engine_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_total_sums_every_stage() {
        let report = PathTimingReport {
            spline_fit_ns: 1_000,
            fine_sampling_ns: 2_000,
            angle_conversion_ns: 3_000,
            ..PathTimingReport::default()
        };
        assert_eq!(report.total_ns(), 6_000);
        assert!((report.total_ms() - 0.006).abs() < 1e-12);
        assert_eq!(report.bucket_ns(TimingBucket::FineSampling), 2_000);
    }

    #[test]
    fn time_passes_result_through() {
        let mut metrics = PathMetrics::default();
        metrics.begin();
        let value = metrics.time(TimingBucket::DirectionIntegration, || 7 * 6);
        assert_eq!(value, 42);
    }

    #[cfg(not(all(feature = "path_engine_metrics", not(target_arch = "wasm32"))))]
    #[test]
    fn disabled_metrics_report_nothing() {
        let mut metrics = PathMetrics::default();
        metrics.begin();
        metrics.time(TimingBucket::SplineFit, || ());
        assert!(metrics.end().is_none());
    }

    #[cfg(all(feature = "path_engine_metrics", not(target_arch = "wasm32")))]
    #[test]
    fn enabled_metrics_return_a_report() {
        let mut metrics = PathMetrics::default();
        metrics.begin();
        metrics.time(TimingBucket::SplineFit, || std::hint::black_box(1 + 1));
        assert!(metrics.end().is_some());
    }
}
