//! Render-session tokens.
//!
//! Each render runs under a [`RenderToken`]. [`RenderSessions`] hands tokens
//! out per sink key and cancels the previous render on a sink as soon as a
//! new one begins there, so two reveals never interleave in one bubble.
use std::collections::HashMap;
use std::hash::Hash;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct RenderToken {
    cancel: CancellationToken,
    generation: u64,
}

impl RenderToken {
    /// A token not tracked by any registry; cancelled only through [`RenderToken::cancel`].
    pub fn detached() -> Self {
        Self {
            cancel: CancellationToken::new(),
            generation: 0,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Registry of in-flight renders, one per sink key.
#[derive(Debug)]
pub struct RenderSessions<K> {
    active: HashMap<K, RenderToken>,
    next_generation: u64,
}

impl<K> Default for RenderSessions<K> {
    fn default() -> Self {
        Self {
            active: HashMap::new(),
            next_generation: 1,
        }
    }
}

impl<K: Eq + Hash + Clone> RenderSessions<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a render on `key`, invalidating any render already running there.
    ///
    /// ```
    /// use woodchat_render::RenderSessions;
    ///
    /// let mut sessions = RenderSessions::new();
    /// let first = sessions.begin("bubble-1");
    /// let second = sessions.begin("bubble-1");
    /// assert!(first.is_cancelled());
    /// assert!(!second.is_cancelled());
    /// assert_eq!(sessions.active(), 1);
    /// ```
    pub fn begin(&mut self, key: K) -> RenderToken {
        let token = RenderToken {
            cancel: CancellationToken::new(),
            generation: self.next_generation,
        };
        self.next_generation += 1;
        if let Some(previous) = self.active.insert(key, token.clone()) {
            tracing::debug!(
                generation = previous.generation,
                "render.session.superseded"
            );
            previous.cancel();
        }
        token
    }

    /// Forget `token` once its render is over. A newer token on the same key is left alone.
    pub fn finish(&mut self, key: &K, token: &RenderToken) {
        if self
            .active
            .get(key)
            .is_some_and(|current| current.generation == token.generation)
        {
            self.active.remove(key);
        }
    }

    pub fn cancel(&mut self, key: &K) {
        if let Some(token) = self.active.remove(key) {
            token.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, token) in self.active.drain() {
            token.cancel();
        }
    }

    pub fn active(&self) -> usize {
        self.active.len()
    }

    pub fn is_rendering(&self, key: &K) -> bool {
        self.active.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_ignores_stale_tokens() {
        let mut sessions = RenderSessions::new();
        let old = sessions.begin(1u32);
        let new = sessions.begin(1u32);
        sessions.finish(&1, &old);
        assert!(sessions.is_rendering(&1));
        sessions.finish(&1, &new);
        assert!(!sessions.is_rendering(&1));
        assert!(!new.is_cancelled());
    }

    #[test]
    fn independent_keys_do_not_interfere() {
        let mut sessions = RenderSessions::new();
        let a = sessions.begin("a");
        let b = sessions.begin("b");
        assert!(!a.is_cancelled());
        assert!(!b.is_cancelled());
        sessions.cancel(&"a");
        assert!(a.is_cancelled());
        assert!(!b.is_cancelled());
    }

    #[test]
    fn cancel_all_clears_registry() {
        let mut sessions = RenderSessions::new();
        let tokens: Vec<_> = (0..3).map(|i| sessions.begin(i)).collect();
        sessions.cancel_all();
        assert_eq!(sessions.active(), 0);
        assert!(tokens.iter().all(RenderToken::is_cancelled));
    }

    #[tokio::test]
    async fn cancelled_future_resolves() {
        let token = RenderToken::detached();
        let waiter = {
            let token = token.clone();
            tokio::spawn(async move { token.cancelled().await })
        };
        token.cancel();
        waiter.await.unwrap();
    }
}
