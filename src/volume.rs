use chrono::{DateTime, Duration, Timelike, Utc};
use rand::Rng;
use rand_distr::{Distribution, Poisson};
use tracing::debug;

use crate::models::GenError;

/// Shapes synthetic request volume over a historical window with a diurnal
/// curve: per-minute Poisson counts with a higher mean inside the
/// business-hours band.
#[derive(Debug, Clone)]
pub struct VolumeShaper {
    pub window_days: i64,
    /// Inclusive hour band (UTC) with elevated traffic.
    pub business_hours: (u32, u32),
    /// Mean requests per minute inside the band.
    pub busy_rate: f64,
    /// Mean requests per minute outside the band.
    pub quiet_rate: f64,
}

impl Default for VolumeShaper {
    fn default() -> Self {
        VolumeShaper {
            window_days: 7,
            business_hours: (8, 18),
            busy_rate: 5.0,
            quiet_rate: 1.0,
        }
    }
}

impl VolumeShaper {
    /// Produce up to `requested` timestamps in ascending order over the window
    /// ending at `end`.
    ///
    /// Each minute of the window draws a Poisson count at the band's rate and
    /// scatters that many events uniformly within the minute. Over-production
    /// is downsampled uniformly without replacement and re-sorted so the final
    /// sequence stays chronological. Under-production delivers fewer
    /// timestamps than requested; that is a data condition for the caller to
    /// report, not an error here.
    pub fn timestamps<R: Rng + ?Sized>(
        &self,
        end: DateTime<Utc>,
        requested: usize,
        rng: &mut R,
    ) -> Result<Vec<DateTime<Utc>>, GenError> {
        if requested == 0 {
            return Err(GenError::InvalidRequest(
                "requested line count must be positive".to_string(),
            ));
        }
        if self.busy_rate < 0.0 || self.quiet_rate < 0.0 {
            return Err(GenError::InvalidRequest(
                "traffic rates must be non-negative".to_string(),
            ));
        }

        let start = end - Duration::days(self.window_days);
        let (band_start, band_end) = self.business_hours;

        let mut timestamps = Vec::new();
        let mut minute = start;
        while minute < end {
            let hour = minute.hour();
            let rate = if hour >= band_start && hour <= band_end {
                self.busy_rate
            } else {
                self.quiet_rate
            };

            let count = if rate > 0.0 {
                // Poisson parameters are validated above.
                Poisson::new(rate).expect("invalid poisson rate").sample(rng) as u64
            } else {
                0
            };
            for _ in 0..count {
                let offset_ms = rng.gen_range(0..60_000);
                timestamps.push(minute + Duration::milliseconds(offset_ms));
            }

            minute += Duration::minutes(1);
        }
        timestamps.sort();

        if timestamps.len() > requested {
            let picked = rand::seq::index::sample(rng, timestamps.len(), requested);
            let mut sampled: Vec<DateTime<Utc>> =
                picked.into_iter().map(|i| timestamps[i]).collect();
            // Selection order is arbitrary; restore chronology.
            sampled.sort();
            timestamps = sampled;
        } else if timestamps.len() < requested {
            debug!(
                produced = timestamps.len(),
                requested, "window produced fewer timestamps than requested"
            );
        }

        Ok(timestamps)
    }
}
