//! Scripted randomness for exercising the refinement pass exactly.

use std::collections::VecDeque;

use crate::EntropySource;

/// An [`EntropySource`] that replays fixed sequences and counts draws.
///
/// Exhausted sequences yield `0.0` interference, index `0` and no tunnelling.
#[derive(Debug, Default, Clone)]
pub struct ScriptedEntropy {
    interference: VecDeque<f64>,
    picks: VecDeque<usize>,
    tunnels: VecDeque<bool>,
    interference_draws: usize,
    pick_draws: usize,
    tunnel_probabilities: Vec<f64>,
}

impl ScriptedEntropy {
    /// An empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue interference values.
    #[must_use]
    pub fn with_interference<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        self.interference.extend(values);
        self
    }

    /// Queue picked indices.
    #[must_use]
    pub fn with_picks<I>(mut self, picks: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        self.picks.extend(picks);
        self
    }

    /// Queue tunnelling outcomes.
    #[must_use]
    pub fn with_tunnels<I>(mut self, tunnels: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        self.tunnels.extend(tunnels);
        self
    }

    /// Interference values drawn so far.
    #[must_use]
    pub const fn interference_draws(&self) -> usize {
        self.interference_draws
    }

    /// Indices drawn so far.
    #[must_use]
    pub const fn pick_draws(&self) -> usize {
        self.pick_draws
    }

    /// Probabilities passed to [`EntropySource::tunnel`], in order.
    #[must_use]
    pub fn tunnel_probabilities(&self) -> &[f64] {
        &self.tunnel_probabilities
    }
}

impl EntropySource for ScriptedEntropy {
    fn interference(&mut self) -> f64 {
        self.interference_draws = self.interference_draws.saturating_add(1);
        self.interference.pop_front().unwrap_or(0.0)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.pick_draws = self.pick_draws.saturating_add(1);
        self.picks
            .pop_front()
            .unwrap_or(0)
            .min(len.saturating_sub(1))
    }

    fn tunnel(&mut self, probability: f64) -> bool {
        self.tunnel_probabilities.push(probability);
        self.tunnels.pop_front().unwrap_or(false)
    }
}
