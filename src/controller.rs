//! The mutable source that drives observables from imperative code.
//!
//! Subscribers live in a slot map arena keyed by [`ObserverKey`], plus an
//! insertion-order list so activations fan out in subscription order.
//! Mutations that arrive while another one is being applied (for example a
//! `reset` issued from inside an observer) are queued and applied once the
//! current one finishes, still inside the outermost call. Unsubscribing is
//! the exception: the subscriber is detached on the spot, so a fan-out in
//! progress never opens it again.

use crate::observable::Observable;
use crate::observer::Observer;
use crate::scope::{Scope, Subscription};
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

new_key_type! {
    /// Identifies one subscriber of a controller.
    pub(crate) struct ObserverKey;
}

struct Entry<T> {
    observer: Rc<dyn Observer<T>>,
    /// The scope of the current activation, if this subscriber is open.
    scope: Option<Scope>,
}

enum Op<T> {
    Set(T),
    Reset,
    Subscribe(ObserverKey),
}

struct ControllerState<T> {
    entries: SlotMap<ObserverKey, Entry<T>>,
    order: Vec<ObserverKey>,
    value: Option<T>,
    pending: VecDeque<Op<T>>,
    running: bool,
}

/// A mutable activation source.
///
/// At any time a controller is either inactive or active with one value.
/// Handles are cheap to clone and share the same state.
///
/// ```rust,no_run
/// use scope_observable::prelude::*;
///
/// let connected = Controller::<String>::new();
/// let _subscription = connected.subscribe(|name: String| {
///     println!("connected to {name}");
///     Scope::new(|| println!("disconnected"))
/// });
/// connected.set("living room".to_string());
/// connected.reset();
/// ```
pub struct Controller<T> {
    state: Rc<RefCell<ControllerState<T>>>,
}

impl<T> Clone for Controller<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Clone + 'static> Default for Controller<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Controller<T> {
    /// Create an inactive controller.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ControllerState {
                entries: SlotMap::with_key(),
                order: Vec::new(),
                value: None,
                pending: VecDeque::new(),
                running: false,
            })),
        }
    }

    /// Activate every subscriber with `value`.
    ///
    /// If already active, the previous value is deactivated first.
    pub fn set(&self, value: T) {
        self.sequence(Op::Set(value));
    }

    /// Deactivate every subscriber. Does nothing when inactive.
    pub fn reset(&self) {
        self.sequence(Op::Reset);
    }

    /// Whether the controller currently holds a value.
    pub fn is_active(&self) -> bool {
        self.state.borrow().value.is_some()
    }

    /// A clone of the current value.
    pub fn get(&self) -> Option<T> {
        self.state.borrow().value.clone()
    }

    /// Number of attached subscribers, open or not.
    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Attach an observer. If the controller is active the observer is
    /// opened right away with the current value.
    pub fn subscribe(&self, observer: impl Observer<T>) -> Subscription {
        self.subscribe_rc(Rc::new(observer))
    }

    pub(crate) fn subscribe_rc(&self, observer: Rc<dyn Observer<T>>) -> Subscription {
        let key = {
            let mut state = self.state.borrow_mut();
            let key = state.entries.insert(Entry {
                observer,
                scope: None,
            });
            state.order.push(key);
            key
        };
        trace!(?key, "controller subscribe");
        self.sequence(Op::Subscribe(key));

        let weak: Weak<RefCell<ControllerState<T>>> = Rc::downgrade(&self.state);
        Subscription::new(Scope::new(move || {
            if let Some(state) = weak.upgrade() {
                Controller { state }.unsubscribe(key);
            }
        }))
    }

    /// View this controller as an [`Observable`].
    pub fn observe(&self) -> Observable<T> {
        let controller = self.clone();
        Observable::make(move |observer| controller.subscribe_rc(observer).into_scope())
    }

    fn sequence(&self, op: Op<T>) {
        {
            let mut state = self.state.borrow_mut();
            state.pending.push_back(op);
            if state.running {
                return;
            }
            state.running = true;
        }

        let _guard = RunGuard { state: &self.state };
        loop {
            let op = self.state.borrow_mut().pending.pop_front();
            match op {
                Some(op) => self.apply(op),
                None => break,
            }
        }
    }

    fn apply(&self, op: Op<T>) {
        match op {
            Op::Set(value) => {
                self.close_all();
                let keys = {
                    let mut state = self.state.borrow_mut();
                    state.value = Some(value.clone());
                    state.order.clone()
                };
                trace!(subscribers = keys.len(), "controller set");
                for key in keys {
                    self.open(key, value.clone());
                }
            }
            Op::Reset => {
                let was_active = self.state.borrow_mut().value.take().is_some();
                if was_active {
                    trace!("controller reset");
                    self.close_all();
                }
            }
            Op::Subscribe(key) => {
                let value = self.state.borrow().value.clone();
                if let Some(value) = value {
                    self.open(key, value);
                }
            }
        }
    }

    /// Detach `key` right away, even in the middle of a fan-out, then close
    /// its open activation if it has one.
    fn unsubscribe(&self, key: ObserverKey) {
        let entry = {
            let mut state = self.state.borrow_mut();
            state.order.retain(|k| *k != key);
            state.entries.remove(key)
        };
        trace!(?key, "controller unsubscribe");
        if let Some(Entry {
            scope: Some(scope), ..
        }) = entry
        {
            scope.close();
        }
    }

    fn open(&self, key: ObserverKey, value: T) {
        let observer = {
            let state = self.state.borrow();
            match state.entries.get(key) {
                Some(entry) if entry.scope.is_none() => entry.observer.clone(),
                _ => return,
            }
        };
        let scope = observer.open(value);
        let orphaned = {
            let mut state = self.state.borrow_mut();
            match state.entries.get_mut(key) {
                Some(entry) => {
                    entry.scope = Some(scope);
                    None
                }
                None => Some(scope),
            }
        };
        if let Some(scope) = orphaned {
            scope.close();
        }
    }

    fn close_all(&self) {
        let scopes: Vec<Scope> = {
            let mut state = self.state.borrow_mut();
            let ControllerState { entries, order, .. } = &mut *state;
            order
                .iter()
                .filter_map(|key| entries.get_mut(*key).and_then(|entry| entry.scope.take()))
                .collect()
        };
        for scope in scopes {
            scope.close();
        }
    }
}

/// Clears the running flag even if an observer panics mid-operation, so
/// the controller stays usable afterwards.
struct RunGuard<'a, T> {
    state: &'a Rc<RefCell<ControllerState<T>>>,
}

impl<T> Drop for RunGuard<'_, T> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.running = false;
            if std::thread::panicking() {
                state.pending.clear();
            }
        }
    }
}

impl<T: Clone + 'static> From<&Controller<T>> for Observable<T> {
    fn from(controller: &Controller<T>) -> Self {
        controller.observe()
    }
}

impl<T: Clone + 'static> From<Controller<T>> for Observable<T> {
    fn from(controller: Controller<T>) -> Self {
        controller.observe()
    }
}

impl<T: fmt::Debug> fmt::Debug for Controller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_borrow() {
            Ok(state) => f
                .debug_struct("Controller")
                .field("value", &state.value)
                .field("subscribers", &state.entries.len())
                .finish(),
            Err(_) => f.debug_struct("Controller").finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::observers::on_enter;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recorder(log: &Log) -> impl Observer<i32> {
        let log = log.clone();
        move |value: i32| {
            log.borrow_mut().push(format!("open {value}"));
            let log = log.clone();
            Scope::new(move || log.borrow_mut().push(format!("close {value}")))
        }
    }

    #[test]
    fn test_set_and_reset() {
        let log: Log = Default::default();
        let controller = Controller::new();
        let _subscription = controller.subscribe(recorder(&log));

        controller.set(1);
        controller.reset();
        assert_eq!(*log.borrow(), vec!["open 1", "close 1"]);
        assert!(!controller.is_active());
    }

    #[test]
    fn test_set_twice_deactivates_previous() {
        let log: Log = Default::default();
        let controller = Controller::new();
        let _subscription = controller.subscribe(recorder(&log));

        controller.set(1);
        controller.set(2);
        assert_eq!(*log.borrow(), vec!["open 1", "close 1", "open 2"]);
        assert_eq!(controller.get(), Some(2));
    }

    #[test]
    fn test_reset_when_inactive_is_noop() {
        let log: Log = Default::default();
        let controller = Controller::new();
        let _subscription = controller.subscribe(recorder(&log));

        controller.reset();
        controller.reset();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_subscribe_replays_current_value() {
        let log: Log = Default::default();
        let controller = Controller::new();
        controller.set(5);
        let _subscription = controller.subscribe(recorder(&log));
        assert_eq!(*log.borrow(), vec!["open 5"]);
    }

    #[test]
    fn test_fan_out_follows_subscription_order() {
        let log: Log = Default::default();
        let controller = Controller::new();
        let subs: Vec<Subscription> = (0..3)
            .map(|i| {
                let log = log.clone();
                controller.subscribe(on_enter(move |v: i32| {
                    log.borrow_mut().push(format!("{i}:{v}"))
                }))
            })
            .collect();

        // Free a slot, then subscribe again; the new subscriber goes last.
        let mut subs = subs.into_iter();
        if let Some(first) = subs.next() {
            first.close();
        }
        let _rest: Vec<Subscription> = subs.collect();
        let _late = {
            let log = log.clone();
            controller.subscribe(on_enter(move |v: i32| log.borrow_mut().push(format!("late:{v}"))))
        };

        controller.set(9);
        assert_eq!(*log.borrow(), vec!["1:9", "2:9", "late:9"]);
    }

    #[test]
    fn test_unsubscribe_closes_open_scope_once() {
        let log: Log = Default::default();
        let controller = Controller::new();
        let subscription = controller.subscribe(recorder(&log));

        controller.set(3);
        subscription.close();
        controller.set(4);
        controller.reset();
        assert_eq!(*log.borrow(), vec!["open 3", "close 3"]);
        assert_eq!(controller.subscriber_count(), 0);
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let log: Log = Default::default();
        let controller = Controller::new();
        {
            let _subscription = controller.subscribe(recorder(&log));
            controller.set(1);
        }
        controller.set(2);
        assert_eq!(*log.borrow(), vec!["open 1", "close 1"]);
    }

    #[test]
    fn test_reentrant_reset_is_deferred() {
        let log: Log = Default::default();
        let controller = Controller::new();
        let handle = controller.clone();
        let _resetter = controller.subscribe(move |value: i32| {
            if value < 0 {
                handle.reset();
            }
            Scope::noop()
        });
        let _subscription = controller.subscribe(recorder(&log));

        controller.set(-1);
        // The second subscriber still sees the activation before the
        // queued reset runs.
        assert_eq!(*log.borrow(), vec!["open -1", "close -1"]);
        assert!(!controller.is_active());
    }

    #[test]
    fn test_reentrant_unsubscribe_skips_open() {
        let log: Log = Default::default();
        let controller = Controller::new();
        let second: Rc<RefCell<Option<Subscription>>> = Default::default();

        let _first = {
            let second = second.clone();
            controller.subscribe(move |_: i32| {
                if let Some(subscription) = second.borrow_mut().take() {
                    subscription.close();
                }
                Scope::noop()
            })
        };
        *second.borrow_mut() = Some(controller.subscribe(recorder(&log)));

        controller.set(7);
        assert!(log.borrow().is_empty());
        assert_eq!(controller.subscriber_count(), 1);
    }

    #[test]
    fn test_reentrant_unsubscribe_closes_open_scope() {
        let log: Log = Default::default();
        let controller = Controller::new();
        let second: Rc<RefCell<Option<Subscription>>> = Default::default();

        *second.borrow_mut() = Some(controller.subscribe(recorder(&log)));
        controller.set(1);
        let _closer = {
            let second = second.clone();
            controller.subscribe(move |value: i32| {
                if value == 2 {
                    if let Some(subscription) = second.borrow_mut().take() {
                        subscription.close();
                    }
                }
                Scope::noop()
            })
        };

        controller.set(2);
        controller.set(3);
        assert_eq!(*log.borrow(), vec!["open 1", "close 1", "open 2", "close 2"]);
    }

    #[test]
    fn test_and_with_shared_source() {
        let log: Log = Default::default();
        let controller = Controller::new();
        let pairs = controller.observe().and(&controller.observe());
        let _subscription = {
            let log = log.clone();
            pairs.subscribe(move |pair: crate::Both<i32, i32>| {
                log.borrow_mut().push(format!("open {:?}", pair.clone().into_tuple()));
                let log = log.clone();
                Scope::new(move || {
                    log.borrow_mut()
                        .push(format!("close {:?}", pair.into_tuple()))
                })
            })
        };

        controller.set(1);
        controller.set(2);
        controller.reset();
        assert_eq!(
            *log.borrow(),
            vec!["open (1, 1)", "close (1, 1)", "open (2, 2)", "close (2, 2)"]
        );
    }

    #[test]
    fn test_controller_survives_observer_panic() {
        let controller = Controller::new();
        let _subscription = controller.subscribe(|value: i32| {
            if value == 13 {
                panic!("unlucky");
            }
            Scope::noop()
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| controller.set(13)));
        assert!(result.is_err());

        controller.set(1);
        assert_eq!(controller.get(), Some(1));
    }

    #[test]
    fn test_dropping_controller_closes_scopes() {
        let log: Log = Default::default();
        let subscription = {
            let controller = Controller::new();
            let subscription = controller.subscribe(recorder(&log));
            controller.set(8);
            subscription
        };
        assert_eq!(*log.borrow(), vec!["open 8", "close 8"]);
        subscription.close();
    }
}
