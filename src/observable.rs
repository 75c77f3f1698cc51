//! The observable type and its combinators.
//!
//! Every combinator is built from [`Observable::make`] and
//! [`Observable::flat_map`], so activation and deactivation timing follows
//! directly from those two.

use crate::both::Both;
use crate::controller::Controller;
use crate::observer::{observers, Observer};
use crate::scope::{Scope, Subscription};
use std::fmt;
use std::rc::Rc;

type SubscribeFn<T> = dyn Fn(Rc<dyn Observer<T>>) -> Scope;

/// A source that is either inactive or active with a value of type `T`.
///
/// Each call to [`subscribe`](Observable::subscribe) starts an independent
/// observation. Observables are cheap to clone; clones share the same
/// underlying source.
///
/// ```rust,no_run
/// use scope_observable::prelude::*;
///
/// let volume = Controller::<i32>::new();
/// let loud = volume.observe().filter(|v| *v > 80);
/// let _subscription = loud.subscribe(observers::on_enter(|v: i32| println!("loud: {v}")));
/// volume.set(90);
/// ```
pub struct Observable<T> {
    subscribe_fn: Rc<SubscribeFn<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: self.subscribe_fn.clone(),
        }
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Build an observable from its subscribe implementation.
    ///
    /// `f` receives each new observer and returns the scope that undoes the
    /// subscription.
    pub fn make(f: impl Fn(Rc<dyn Observer<T>>) -> Scope + 'static) -> Self {
        Self {
            subscribe_fn: Rc::new(f),
        }
    }

    /// Attach `observer` to this observable's activations from now on.
    pub fn subscribe(&self, observer: impl Observer<T>) -> Subscription {
        self.subscribe_rc(Rc::new(observer))
    }

    pub(crate) fn subscribe_rc(&self, observer: Rc<dyn Observer<T>>) -> Subscription {
        Subscription::new((self.subscribe_fn)(observer))
    }

    /// Activates each subscriber once, at subscribe time, and stays active
    /// until the subscription is closed.
    pub fn just(value: T) -> Self {
        Self::make(move |observer| observer.open(value.clone()))
    }

    /// Never activates.
    pub fn empty() -> Self {
        Self::make(|_| Scope::noop())
    }

    /// [`just`](Observable::just) for `Some`, [`empty`](Observable::empty)
    /// for `None`.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::just(value),
            None => Self::empty(),
        }
    }

    /// Activates with `f(value)` whenever this activates with `value`.
    pub fn map<R: Clone + 'static>(&self, f: impl Fn(T) -> R + 'static) -> Observable<R> {
        self.flat_map(move |value| Observable::just(f(value)))
    }

    /// On each activation, subscribes to `f(value)` and forwards its
    /// activations. Deactivating this tears the inner subscription down.
    pub fn flat_map<R: Clone + 'static>(
        &self,
        f: impl Fn(T) -> Observable<R> + 'static,
    ) -> Observable<R> {
        let source = self.clone();
        let f = Rc::new(f);
        Observable::make(move |observer: Rc<dyn Observer<R>>| {
            let f = f.clone();
            source
                .subscribe(move |value: T| f(value).subscribe_rc(observer.clone()).into_scope())
                .into_scope()
        })
    }

    /// Active while this is active with a value satisfying `predicate`.
    ///
    /// The predicate runs once per activation.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Observable<T> {
        self.flat_map(move |value| {
            if predicate(&value) {
                Observable::just(value)
            } else {
                Observable::empty()
            }
        })
    }

    /// Active while both this and `other` are active.
    pub fn and<U: Clone + 'static>(&self, other: &Observable<U>) -> Observable<Both<T, U>> {
        let other = other.clone();
        self.flat_map(move |first: T| {
            other.flat_map(move |second: U| Observable::just(Both::new(first.clone(), second)))
        })
    }

    /// Like [`and`](Observable::and), but `other` only counts if it
    /// activated after this did.
    ///
    /// `other`'s activations are copied into an internal controller, which
    /// is reset whenever this activates. Both wiring subscriptions live as
    /// long as the sources do, so each call adds two permanent subscribers:
    /// build the combinator once, not inside a `flat_map` closure.
    pub fn and_then<U: Clone + 'static>(&self, other: &Observable<U>) -> Observable<Both<T, U>> {
        let other_after_this = Controller::<U>::new();

        let controller = other_after_this.clone();
        other
            .subscribe(move |value: U| {
                controller.set(value);
                let controller = controller.clone();
                Scope::new(move || controller.reset())
            })
            .detach();

        let controller = other_after_this.clone();
        self.subscribe(observers::on_enter(move |_: T| controller.reset()))
            .detach();

        self.and(&other_after_this.observe())
    }

    /// See [`not`].
    pub fn not(observable: &Observable<T>) -> Observable<()> {
        not(observable)
    }
}

/// Active with `()` exactly while `observable` is inactive.
///
/// The subscription to `observable` lives as long as `observable` does, so
/// each call adds a permanent subscriber: build it once, not inside a
/// `flat_map` closure.
pub fn not<T: Clone + 'static>(observable: &Observable<T>) -> Observable<()> {
    let opposite = Controller::<()>::new();
    opposite.set(());

    let controller = opposite.clone();
    observable
        .subscribe(move |_: T| {
            controller.reset();
            let controller = controller.clone();
            Scope::new(move || controller.set(()))
        })
        .detach();

    opposite.observe()
}

impl<T: Clone + 'static> From<Option<T>> for Observable<T> {
    fn from(value: Option<T>) -> Self {
        Self::from_option(value)
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}
