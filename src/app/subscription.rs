//! Cancellable push subscriptions.
//!
//! A [`Subscription`] owns the disposer that releases one platform listener.
//! The disposer runs exactly once: on [`Subscription::cancel`], or when the
//! token is dropped.  Holding every token of an activation in one owner
//! therefore releases all of them on every exit path, including panics
//! and partial setup.

use log::debug;

type Disposer = Box<dyn FnOnce() + Send>;

/// Token for one live platform listener.
pub struct Subscription {
    label: &'static str,
    disposer: Option<Disposer>,
}

impl Subscription {
    /// Wrap a disposer.  `label` only appears in log lines.
    pub fn new(label: &'static str, disposer: impl FnOnce() + Send + 'static) -> Self {
        Self {
            label,
            disposer: Some(Box::new(disposer)),
        }
    }

    /// A subscription with nothing to release (e.g. a listener that the
    /// platform tears down by itself).
    pub fn detached(label: &'static str) -> Self {
        Self {
            label,
            disposer: None,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Release the listener now.
    pub fn cancel(mut self) {
        self.dispose();
    }

    fn dispose(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            debug!("unsubscribe {}", self.label);
            disposer();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("label", &self.label)
            .field("live", &self.disposer.is_some())
            .finish()
    }
}
