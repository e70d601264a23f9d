//! Policy port - action selection given a value oracle

/// Picks one of the legal actions, or none.
///
/// `None` means "no action can be taken here"; the training loop treats it
/// as the end of the episode rather than as a failure.
pub trait Policy<S, A> {
    fn select<'a>(
        &mut self,
        state: &S,
        legal_actions: &'a [A],
        values: &dyn Fn(&S, &A) -> f64,
    ) -> Option<&'a A>;

    /// Episode-counter capability.
    ///
    /// Policies whose behaviour depends on the episode index return
    /// themselves here so the training loop can advance them.
    ///
    /// # Default Implementation
    ///
    /// Returns `None`.
    fn as_scheduled(&mut self) -> Option<&mut dyn EpisodeScheduled> {
        None
    }

    /// Current exploration probability, if the policy has one. Reported in
    /// episode summaries only.
    fn exploration_rate(&self) -> Option<f64> {
        None
    }
}

/// A policy driven by an externally owned episode counter
pub trait EpisodeScheduled {
    fn set_episode(&mut self, episode: usize);

    fn episode(&self) -> usize;
}
