//! Deterministic low-density corruption of the compressed stream.

use tracing::debug;

use crate::stream::ByteSink;

/// Seed used when no explicit seed is configured.
pub const DEFAULT_SEED: u64 = 0x3141_5926_5358_9793;

/// Pseudo-random byte corrupter.
///
/// Each byte advances the state three rounds of `state * 15 ^ 1`. Whenever the
/// top 16 bits of the result are zero (about one byte in 65536) the byte is
/// XORed with bits 40..48 of the state. No outside entropy is used, so the same
/// seed and the same byte count always corrupt the same positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzInjector {
    state: u64,
    enabled: bool,
    injected: u64,
}

impl Default for FuzzInjector {
    fn default() -> Self {
        Self::disabled()
    }
}

impl FuzzInjector {
    /// An enabled injector starting from `seed`.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self {
            state: seed,
            enabled: true,
            injected: 0,
        }
    }

    /// A pass-through injector.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            state: DEFAULT_SEED,
            enabled: false,
            injected: 0,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current mixing state.
    #[must_use]
    pub const fn state(&self) -> u64 {
        self.state
    }

    /// Number of bytes corrupted so far.
    #[must_use]
    pub const fn injected(&self) -> u64 {
        self.injected
    }

    /// Returns `byte`, possibly corrupted. Disabled injectors neither change the
    /// byte nor advance.
    pub fn apply(&mut self, byte: u8) -> u8 {
        if !self.enabled {
            return byte;
        }

        for _ in 0..3 {
            self.state = mix(self.state);
        }

        if self.state >> 48 == 0 {
            let mask = (self.state >> 40) as u8;
            self.injected += 1;
            debug!(state = self.state, mask, "injecting fuzz corruption");
            byte ^ mask
        } else {
            byte
        }
    }
}

#[inline]
const fn mix(state: u64) -> u64 {
    (state << 4).wrapping_sub(state) ^ 1
}

/// Sink adapter that runs every byte through a [`FuzzInjector`] before
/// forwarding it.
pub struct FuzzedSink<'a, S: ?Sized> {
    inner: &'a mut S,
    injector: &'a mut FuzzInjector,
}

impl<'a, S: ByteSink + ?Sized> FuzzedSink<'a, S> {
    pub fn new(inner: &'a mut S, injector: &'a mut FuzzInjector) -> Self {
        Self { inner, injector }
    }
}

impl<S: ByteSink + ?Sized> ByteSink for FuzzedSink<'_, S> {
    #[inline]
    fn push(&mut self, byte: u8) {
        let byte = self.injector.apply(byte);
        self.inner.push(byte);
    }
}
