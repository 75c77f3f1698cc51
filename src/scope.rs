//! Deactivation handles.
//!
//! A [`Scope`] is what an [`Observer`](crate::Observer) hands back when it is
//! opened. Closing the scope is the signal that the activation has ended.

use std::fmt;

/// A single-use deactivation action.
///
/// Closing consumes the scope, so it can never run twice. Dropping a scope
/// closes it; use [`Scope::detach`] to discard the action instead.
#[must_use = "dropping a Scope closes it immediately"]
pub struct Scope {
    on_close: Option<Box<dyn FnOnce()>>,
}

impl Scope {
    /// Create a scope that runs `f` when closed.
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self {
            on_close: Some(Box::new(f)),
        }
    }

    /// A scope whose close does nothing.
    pub fn noop() -> Self {
        Self { on_close: None }
    }

    /// Run the deactivation action.
    pub fn close(mut self) {
        if let Some(f) = self.on_close.take() {
            f();
        }
    }

    /// Forget the deactivation action without running it.
    pub fn detach(mut self) {
        self.on_close = None;
    }

    /// Combine two scopes; the result closes `self` first, then `other`.
    pub fn and(self, other: Scope) -> Scope {
        Scope::new(move || {
            self.close();
            other.close();
        })
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::noop()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        if let Some(f) = self.on_close.take() {
            f();
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("pending", &self.on_close.is_some())
            .finish()
    }
}

/// The handle returned by [`Observable::subscribe`](crate::Observable::subscribe).
///
/// Closing (or dropping) a subscription closes the observer's open
/// activation, if any, and stops further activations from reaching it.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    scope: Scope,
}

impl Subscription {
    /// Wrap the scope that undoes a subscribe call.
    pub fn new(scope: Scope) -> Self {
        Self { scope }
    }

    /// Unsubscribe.
    pub fn close(self) {
        self.scope.close();
    }

    /// Keep the subscription alive for as long as its source lives.
    pub fn detach(self) {
        self.scope.detach();
    }

    /// Convert into the underlying scope.
    pub fn into_scope(self) -> Scope {
        self.scope
    }
}

impl From<Subscription> for Scope {
    fn from(subscription: Subscription) -> Self {
        subscription.scope
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("scope", &self.scope)
            .finish()
    }
}
