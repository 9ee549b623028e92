//! Order ids
//!
//! Ids look like `DP48291304`: a two-letter brand prefix, the last six digits of
//! the current Unix time in milliseconds and a two-digit random suffix.
//!
//! These ids are meant to be read out to a human. They are not unique: two
//! submissions in the same millisecond with the same random draw collide.

use std::fmt;

use rand::{Rng, rngs::ThreadRng};
use thiserror::Error;

/// Errors raised when configuring an id generator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderIdError {
    /// The prefix is not exactly two ASCII letters.
    #[error("order id prefix must be two ASCII letters, got {0:?}")]
    InvalidPrefix(String),
}

/// Source of the current time.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        jiff::Timestamp::now().as_millisecond()
    }
}

/// Source of random suffixes.
pub trait RandomSource {
    /// A value in `0..upper`.
    fn below(&mut self, upper: u32) -> u32;
}

/// Thread-local RNG.
#[derive(Debug, Default)]
pub struct ThreadRandom(ThreadRng);

impl RandomSource for ThreadRandom {
    fn below(&mut self, upper: u32) -> u32 {
        self.0.gen_range(0..upper)
    }
}

/// A generated order id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(String);

impl OrderId {
    /// The id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse text that has the shape of an order id.
    pub fn parse(text: &str) -> Option<Self> {
        Self::is_well_formed(text).then(|| Self(text.to_string()))
    }

    /// Whether text has the shape of an order id: two letters then eight digits.
    pub fn is_well_formed(text: &str) -> bool {
        let bytes = text.as_bytes();

        bytes.len() == 10
            && bytes.iter().take(2).all(u8::is_ascii_uppercase)
            && bytes.iter().skip(2).all(u8::is_ascii_digit)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates order ids from an injected clock and random source.
#[derive(Debug)]
pub struct OrderIdGenerator<C = SystemClock, R = ThreadRandom> {
    prefix: String,
    clock: C,
    random: R,
}

impl OrderIdGenerator {
    /// Generator backed by the wall clock and thread RNG.
    ///
    /// # Errors
    ///
    /// Returns [`OrderIdError::InvalidPrefix`] if the prefix is not two ASCII letters.
    pub fn system(prefix: &str) -> Result<Self, OrderIdError> {
        Self::new(prefix, SystemClock, ThreadRandom::default())
    }
}

impl<C: Clock, R: RandomSource> OrderIdGenerator<C, R> {
    /// Create a generator. The prefix is upper-cased.
    ///
    /// # Errors
    ///
    /// Returns [`OrderIdError::InvalidPrefix`] if the prefix is not two ASCII letters.
    pub fn new(prefix: &str, clock: C, random: R) -> Result<Self, OrderIdError> {
        if prefix.len() != 2 || !prefix.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(OrderIdError::InvalidPrefix(prefix.to_string()));
        }

        Ok(Self {
            prefix: prefix.to_ascii_uppercase(),
            clock,
            random,
        })
    }

    /// Produce the next id.
    pub fn generate(&mut self) -> OrderId {
        let millis = self.clock.now_millis().rem_euclid(1_000_000);
        let suffix = self.random.below(100);

        OrderId(format!("{}{millis:06}{suffix:02}", self.prefix))
    }
}
