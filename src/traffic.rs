use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_distr::{LogNormal, Normal};

use crate::models::GenError;

/// A categorical distribution: keys plus non-negative weights, normalized at
/// sampling time. Validated once at construction; every draw is independent.
#[derive(Debug, Clone)]
pub struct WeightedTable<K> {
    keys: Vec<K>,
    index: WeightedIndex<f64>,
}

impl<K> WeightedTable<K> {
    /// Build a table from `(key, weight)` pairs. Empty tables, negative
    /// weights and all-zero weights are caller configuration bugs and abort
    /// the build.
    pub fn new(entries: Vec<(K, f64)>) -> Result<Self, GenError> {
        if entries.is_empty() {
            return Err(GenError::InvalidDistribution(
                "distribution has no entries".to_string(),
            ));
        }
        if entries.iter().any(|(_, w)| *w < 0.0 || !w.is_finite()) {
            return Err(GenError::InvalidDistribution(
                "weights must be finite and non-negative".to_string(),
            ));
        }

        let (keys, weights): (Vec<K>, Vec<f64>) = entries.into_iter().unzip();
        let index = WeightedIndex::new(&weights).map_err(|e| {
            GenError::InvalidDistribution(format!("no positive-weight entries: {}", e))
        })?;

        Ok(WeightedTable { keys, index })
    }

    /// Draw one key with probability proportional to its weight.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &K {
        &self.keys[self.index.sample(rng)]
    }
}

/// Tagged parameter set for the numeric sub-generators, so the response-size
/// mixture is a data table rather than inline branching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeDistribution {
    LogNormal { mu: f64, sigma: f64 },
    Normal { mean: f64, std_dev: f64 },
}

impl SizeDistribution {
    /// Sample one value, clamped to zero on the left; sizes and latencies are
    /// non-negative integers in the log format.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        let value = match self {
            SizeDistribution::LogNormal { mu, sigma } => {
                // Parameters are fixed constants, always valid.
                LogNormal::new(*mu, *sigma).expect("invalid lognormal parameters").sample(rng)
            }
            SizeDistribution::Normal { mean, std_dev } => {
                Normal::new(*mean, *std_dev).expect("invalid normal parameters").sample(rng)
            }
        };
        value.max(0.0) as u64
    }
}

/// The weighted distributions that shape synthetic traffic: endpoints,
/// methods, status codes and user agents, plus the response-size mixture and
/// latency model.
#[derive(Debug, Clone)]
pub struct TrafficModel {
    pub endpoints: WeightedTable<String>,
    pub methods: WeightedTable<String>,
    pub status_codes: WeightedTable<u16>,
    pub user_agents: WeightedTable<String>,
    /// Three-way response-size mixture: typical API response, small status
    /// check, large download.
    pub size_mixture: WeightedTable<SizeDistribution>,
    /// Right-skewed latency model: mostly fast responses with a long tail.
    pub response_time: SizeDistribution,
}

impl TrafficModel {
    /// Realistic defaults: a small REST API with mostly-read traffic, a
    /// three-quarters 200 rate, and desktop-Chrome-dominated browser share.
    pub fn new() -> Self {
        let endpoints = WeightedTable::new(vec![
            ("/api/users".to_string(), 0.2),
            ("/api/products".to_string(), 0.25),
            ("/api/orders".to_string(), 0.2),
            ("/api/auth/login".to_string(), 0.1),
            ("/api/auth/logout".to_string(), 0.05),
            ("/api/cart".to_string(), 0.1),
            ("/api/search".to_string(), 0.05),
            ("/health".to_string(), 0.03),
            ("/metrics".to_string(), 0.02),
        ]);

        let methods = WeightedTable::new(vec![
            ("GET".to_string(), 0.6),
            ("POST".to_string(), 0.2),
            ("PUT".to_string(), 0.1),
            ("DELETE".to_string(), 0.1),
        ]);

        let status_codes = WeightedTable::new(vec![
            (200, 0.75),
            (201, 0.05),
            (301, 0.02),
            (304, 0.03),
            (400, 0.05),
            (401, 0.03),
            (403, 0.02),
            (404, 0.03),
            (500, 0.02),
        ]);

        let user_agents = WeightedTable::new(vec![
            (
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
                0.4,
            ),
            (
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15".to_string(),
                0.2,
            ),
            (
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0".to_string(),
                0.15,
            ),
            (
                "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Mobile/15E148 Safari/604.1".to_string(),
                0.1,
            ),
            (
                "Mozilla/5.0 (Linux; Android 11; SM-G991B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.120 Mobile Safari/537.36".to_string(),
                0.1,
            ),
            (
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36 Edg/91.0.864.59".to_string(),
                0.05,
            ),
        ]);

        let size_mixture = WeightedTable::new(vec![
            // Typical API response body.
            (SizeDistribution::LogNormal { mu: 8.0, sigma: 0.5 }, 0.7),
            // Small status-check response.
            (SizeDistribution::Normal { mean: 500.0, std_dev: 100.0 }, 0.2),
            // Large download.
            (SizeDistribution::Normal { mean: 500_000.0, std_dev: 100_000.0 }, 0.1),
        ]);

        // Built-in tables are non-empty with positive weights.
        TrafficModel {
            endpoints: endpoints.expect("default endpoint table"),
            methods: methods.expect("default method table"),
            status_codes: status_codes.expect("default status table"),
            user_agents: user_agents.expect("default user agent table"),
            size_mixture: size_mixture.expect("default size mixture"),
            response_time: SizeDistribution::LogNormal { mu: 3.0, sigma: 1.0 },
        }
    }
}

impl Default for TrafficModel {
    fn default() -> Self {
        Self::new()
    }
}
