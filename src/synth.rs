use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::parser::TIMESTAMP_FORMAT;
use crate::traffic::TrafficModel;
use crate::volume::VolumeShaper;

/// Small pool of "regular visitor" addresses reused across lines to simulate
/// returning clients.
const RECURRING_IPS: [&str; 5] = [
    "192.168.1.100",
    "10.0.0.50",
    "172.16.0.100",
    "192.168.0.200",
    "10.0.0.25",
];

const RECURRING_IP_CHANCE: f64 = 0.3;
const REFERRER_CHANCE: f64 = 0.3;

const REFERRER_HOSTS: [&str; 6] = [
    "www.google.com",
    "www.bing.com",
    "news.ycombinator.com",
    "twitter.com",
    "partner.example.com",
    "blog.example.org",
];

const REFERRER_PATHS: [&str; 5] = ["search", "products", "deals", "articles/2023", "r/programming"];

/// Emits synthetic access-log lines: one per timestamp from the
/// [`VolumeShaper`], fields drawn from the [`TrafficModel`]. Every emitted
/// line round-trips through the line parser.
pub struct LogLineSynthesizer {
    model: TrafficModel,
    shaper: VolumeShaper,
    rng: StdRng,
}

impl LogLineSynthesizer {
    pub fn new(model: TrafficModel, shaper: VolumeShaper) -> Self {
        Self::from_rng(model, shaper, StdRng::from_entropy())
    }

    /// Seeded constructor for reproducible output.
    pub fn with_seed(model: TrafficModel, shaper: VolumeShaper, seed: u64) -> Self {
        Self::from_rng(model, shaper, StdRng::seed_from_u64(seed))
    }

    fn from_rng(model: TrafficModel, shaper: VolumeShaper, rng: StdRng) -> Self {
        LogLineSynthesizer { model, shaper, rng }
    }

    /// Generate up to `requested` lines ending at `end`, written in ascending
    /// timestamp order. Returns the number of lines delivered, which is below
    /// `requested` when the window produced less traffic than asked for.
    pub fn generate<W: Write>(
        &mut self,
        end: DateTime<Utc>,
        requested: usize,
        writer: &mut W,
    ) -> Result<usize> {
        let timestamps = self
            .shaper
            .timestamps(end, requested, &mut self.rng)
            .map_err(|e| anyhow::Error::new(e).context("volume shaping failed"))?;

        if timestamps.len() < requested {
            warn!(
                delivered = timestamps.len(),
                requested, "delivering fewer lines than requested"
            );
        }

        let delivered = timestamps.len();
        for timestamp in timestamps {
            let line = self.synth_line(timestamp);
            writeln!(writer, "{}", line).context("Failed to write log line")?;
        }

        Ok(delivered)
    }

    /// Generate into a file at `path`, creating or truncating it.
    pub fn generate_to_path(
        &mut self,
        end: DateTime<Utc>,
        requested: usize,
        path: &Path,
    ) -> Result<usize> {
        let file =
            File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?;
        let mut writer = BufWriter::new(file);
        let delivered = self.generate(end, requested, &mut writer)?;
        writer.flush().context("Failed to flush output file")?;
        info!(delivered, path = ?path, "wrote synthetic log file");
        Ok(delivered)
    }

    /// Format one line for `timestamp`, sampling every other field.
    pub fn synth_line(&mut self, timestamp: DateTime<Utc>) -> String {
        let method = self.model.methods.sample(&mut self.rng).clone();
        let endpoint = self.model.endpoints.sample(&mut self.rng).clone();
        let status = *self.model.status_codes.sample(&mut self.rng);
        let user_agent = self.model.user_agents.sample(&mut self.rng).clone();
        let bytes_sent = {
            let dist = *self.model.size_mixture.sample(&mut self.rng);
            dist.sample(&mut self.rng)
        };
        let response_time = self.model.response_time.sample(&mut self.rng);
        let referrer = self.referrer();
        let ip = self.ip();

        format!(
            "{} - - [{}] \"{} {} HTTP/1.1\" {} {} \"{}\" \"{}\" {}",
            ip,
            timestamp.format(TIMESTAMP_FORMAT),
            method,
            endpoint,
            status,
            bytes_sent,
            referrer,
            user_agent,
            response_time,
        )
    }

    /// 30% chance of a recurring-visitor address, else a fresh dotted quad.
    fn ip(&mut self) -> String {
        if self.rng.gen_bool(RECURRING_IP_CHANCE) {
            RECURRING_IPS[self.rng.gen_range(0..RECURRING_IPS.len())].to_string()
        } else {
            format!(
                "{}.{}.{}.{}",
                self.rng.gen_range(1..255),
                self.rng.gen_range(0..255),
                self.rng.gen_range(0..255),
                self.rng.gen_range(1..255)
            )
        }
    }

    /// 30% chance of a synthetic referrer URI, else the `-` placeholder.
    fn referrer(&mut self) -> String {
        if self.rng.gen_bool(REFERRER_CHANCE) {
            let host = REFERRER_HOSTS[self.rng.gen_range(0..REFERRER_HOSTS.len())];
            let path = REFERRER_PATHS[self.rng.gen_range(0..REFERRER_PATHS.len())];
            format!("https://{}/{}", host, path)
        } else {
            "-".to_string()
        }
    }
}
