//! Turns decoded events into spawn decisions for whatever renders them.
//!
//! Rendering itself is somebody else's job.  This module only decides *whether* a post
//! shows up and *how*: its speed and whether it is one of the rare special ones.
use crate::config;
use crate::event::DecodedEvent;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};


/// Operator-tunable knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    pub base_speed: f32,
    pub discard_fraction: f64,
    pub special_chance: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            base_speed: 1.0,
            discard_fraction: 0.0,
            special_chance: 0.05,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_speed.is_finite() && self.base_speed > 0.0) {
            return Err(format!("Base speed must be > 0, got {}", self.base_speed));
        }
        if !(0.0..=1.0).contains(&self.discard_fraction) {
            return Err(format!(
                "Discard fraction must be within 0.0..=1.0, got {}",
                self.discard_fraction
            ));
        }
        if !(0.0..=1.0).contains(&self.special_chance) {
            return Err(format!(
                "Special chance must be within 0.0..=1.0, got {}",
                self.special_chance
            ));
        }
        Ok(())
    }
}

impl From<&config::Viewer> for Params {
    fn from(cfg: &config::Viewer) -> Self {
        Self {
            base_speed: *cfg.base_speed,
            discard_fraction: *cfg.discard_fraction,
            special_chance: *cfg.special_chance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spawn {
    pub text: String,
    pub permalink: Option<String>,
    pub speed: f32,
    pub special: bool,
}

/// Speeds are spread by up to a quarter either side of the base speed.
const SPEED_JITTER: f32 = 0.25;

#[derive(Debug)]
pub struct Spawner<R = StdRng> {
    params: Params,
    rng: R,
    admitted: u64,
    discarded: u64,
}

impl Spawner<StdRng> {
    pub fn new(params: Params) -> Result<Self, String> {
        Self::with_rng(params, StdRng::from_entropy())
    }
}

impl<R: Rng> Spawner<R> {
    pub fn with_rng(params: Params, rng: R) -> Result<Self, String> {
        params.validate()?;
        Ok(Self {
            params,
            rng,
            admitted: 0,
            discarded: 0,
        })
    }

    /// Decide what, if anything, to spawn for `event`.
    pub fn admit(&mut self, event: DecodedEvent) -> Option<Spawn> {
        if self.rng.gen_bool(self.params.discard_fraction) {
            self.discarded += 1;
            log::trace!("Discarding post: {}", event.text);
            return None;
        }
        self.admitted += 1;
        let jitter = self.rng.gen_range(1.0 - SPEED_JITTER..=1.0 + SPEED_JITTER);
        Some(Spawn {
            speed: self.params.base_speed * jitter,
            special: self.rng.gen_bool(self.params.special_chance),
            text: event.text,
            permalink: event.permalink,
        })
    }

    pub fn params(&self) -> Params {
        self.params
    }
    pub fn admitted(&self) -> u64 {
        self.admitted
    }
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}
