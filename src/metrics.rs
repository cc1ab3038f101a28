//! Performance metrics and statistics tracking for the scoring service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

use crate::types::ScoreResult;

/// Metrics collector for scoring activity
pub struct ScoringMetrics {
    /// Total records scored successfully
    pub requests_scored: AtomicU64,
    /// Records flagged as fraud
    pub fraud_flagged: AtomicU64,
    /// Scoring calls that failed (validation or internal)
    pub requests_failed: AtomicU64,
    /// Scored records by risk tier
    by_tier: RwLock<HashMap<String, u64>>,
    /// Scoring times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Fraud probability distribution buckets
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ScoringMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            requests_scored: AtomicU64::new(0),
            fraud_flagged: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            by_tier: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record one successfully scored record
    pub fn record_score(&self, processing_time: Duration, result: &ScoreResult) {
        let scored = self.requests_scored.fetch_add(1, Ordering::Relaxed) + 1;

        if result.is_fraud {
            self.fraud_flagged.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut by_tier) = self.by_tier.write() {
            *by_tier.entry(result.risk_tier.as_str().to_string()).or_insert(0) += 1;
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (result.probability * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }

        if scored % 100 == 0 {
            info!(
                scored = scored,
                flagged = self.fraud_flagged.load(Ordering::Relaxed),
                "Scoring milestone"
            );
        }
    }

    /// Record a scoring call that failed
    pub fn record_failure(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get scoring time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = match self.processing_times.read() {
            Ok(times) => times,
            Err(_) => return ProcessingStats::default(),
        };
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: sorted.last().copied().unwrap_or(0),
        }
    }

    /// Get current throughput (records per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get scored records by risk tier
    pub fn get_tier_counts(&self) -> HashMap<String, u64> {
        self.by_tier.read().map(|t| t.clone()).unwrap_or_default()
    }

    /// Get fraud probability distribution
    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or([0; 10])
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let scored = self.requests_scored.load(Ordering::Relaxed);
        let flagged = self.fraud_flagged.load(Ordering::Relaxed);
        let failed = self.requests_failed.load(Ordering::Relaxed);
        let flag_rate = if scored > 0 {
            (flagged as f64 / scored as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let by_tier = self.get_tier_counts();
        let score_dist = self.get_score_distribution();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║            FRAUD SCORING SERVICE - METRICS SUMMARY           ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Records Scored:   {:>8}  │  Throughput: {:>6.1} rec/s      ║",
            scored, throughput
        );
        info!(
            "║ Fraud Flagged:    {:>8}  │  Flag Rate:  {:>6.1}%           ║",
            flagged, flag_rate
        );
        info!("║ Failed Requests:  {:>8}                                  ║", failed);
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Scoring Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5}  ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Records by Risk Tier:                                        ║");
        for (tier, count) in &by_tier {
            let pct = if scored > 0 {
                (*count as f64 / scored as f64) * 100.0
            } else {
                0.0
            };
            info!("║   {:10}: {:>6} ({:>5.1}%)                                ║", tier, count, pct);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Fraud Probability Distribution:                              ║");
        let total: u64 = score_dist.iter().sum();
        for (i, &count) in score_dist.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar_len = (pct / 2.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for ScoringMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoring time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<ScoringMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ScoringMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScoringPolicy;

    #[test]
    fn test_metrics_recording() {
        let metrics = ScoringMetrics::new();
        let policy = ScoringPolicy::default();

        metrics.record_score(
            Duration::from_micros(100),
            &ScoreResult::from_probability(0.85, &policy),
        );
        metrics.record_score(
            Duration::from_micros(200),
            &ScoreResult::from_probability(0.12, &policy),
        );
        metrics.record_failure();

        assert_eq!(metrics.requests_scored.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.fraud_flagged.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.requests_failed.load(Ordering::Relaxed), 1);

        let tiers = metrics.get_tier_counts();
        assert_eq!(tiers.get("HIGH"), Some(&1));
        assert_eq!(tiers.get("LOW"), Some(&1));
    }

    #[test]
    fn test_processing_stats() {
        let metrics = ScoringMetrics::new();
        let policy = ScoringPolicy::default();

        for us in [100, 200, 300, 400, 500] {
            metrics.record_score(
                Duration::from_micros(us),
                &ScoreResult::from_probability(0.5, &policy),
            );
        }

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.mean_us, 300);
        assert_eq!(stats.max_us, 500);
    }

    #[test]
    fn test_top_probability_lands_in_last_bucket() {
        let metrics = ScoringMetrics::new();
        let policy = ScoringPolicy::default();

        metrics.record_score(
            Duration::from_micros(50),
            &ScoreResult::from_probability(1.0, &policy),
        );

        let dist = metrics.get_score_distribution();
        assert_eq!(dist[9], 1);
    }
}
