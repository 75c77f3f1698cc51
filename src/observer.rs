//! Observers and the helper constructors in [`observers`].

use crate::scope::Scope;

/// Receives activations from an [`Observable`](crate::Observable).
///
/// `open` is called when the observable becomes active with `value`. The
/// returned [`Scope`] is closed when it becomes inactive again. Calls to
/// `open` and closes of the returned scopes strictly alternate.
///
/// Any `Fn(T) -> Scope` closure is an observer.
pub trait Observer<T>: 'static {
    /// Called on activation; the returned scope is closed on deactivation.
    fn open(&self, value: T) -> Scope;
}

impl<T, F> Observer<T> for F
where
    F: Fn(T) -> Scope + 'static,
{
    fn open(&self, value: T) -> Scope {
        self(value)
    }
}

/// Convenience observers for side effects on entry or exit.
pub mod observers {
    use super::Observer;
    use crate::both::Both;
    use crate::scope::Scope;

    /// Run `f` when the observable activates.
    pub fn on_enter<T: 'static>(f: impl Fn(T) + 'static) -> impl Observer<T> {
        move |value: T| {
            f(value);
            Scope::noop()
        }
    }

    /// Run `f` with the activation value when the observable deactivates.
    pub fn on_exit<T: 'static>(f: impl Fn(T) + 'static) -> impl Observer<T> {
        let f = std::rc::Rc::new(f);
        move |value: T| {
            let f = f.clone();
            Scope::new(move || f(value))
        }
    }

    /// [`on_enter`] for pair activations, with the pair unpacked.
    pub fn on_enter_both<A: 'static, B: 'static>(
        f: impl Fn(A, B) + 'static,
    ) -> impl Observer<Both<A, B>> {
        on_enter(move |pair: Both<A, B>| f(pair.first, pair.second))
    }

    /// [`on_exit`] for pair activations, with the pair unpacked.
    pub fn on_exit_both<A: 'static, B: 'static>(
        f: impl Fn(A, B) + 'static,
    ) -> impl Observer<Both<A, B>> {
        on_exit(move |pair: Both<A, B>| f(pair.first, pair.second))
    }

    pub use crate::both::both;
}

#[cfg(test)]
mod tests {
    use super::observers::*;
    use super::*;
    use crate::Both;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_on_enter_runs_on_open() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let observer = {
            let log = log.clone();
            on_enter(move |v: i32| log.borrow_mut().push(format!("enter {v}")))
        };
        let scope = observer.open(1);
        assert_eq!(*log.borrow(), vec!["enter 1"]);
        scope.close();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_on_exit_runs_on_close() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let observer = {
            let log = log.clone();
            on_exit(move |v: i32| log.borrow_mut().push(format!("exit {v}")))
        };
        let scope = observer.open(7);
        assert!(log.borrow().is_empty());
        scope.close();
        assert_eq!(*log.borrow(), vec!["exit 7"]);
    }

    #[test]
    fn test_both_helpers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let enter = {
            let log = log.clone();
            on_enter_both(move |a: i32, b: &'static str| log.borrow_mut().push(format!("+{a}{b}")))
        };
        let exit = {
            let log = log.clone();
            on_exit_both(move |a: i32, b: &'static str| log.borrow_mut().push(format!("-{a}{b}")))
        };
        let s1 = enter.open(Both::new(1, "x"));
        let s2 = exit.open(Both::new(2, "y"));
        s1.close();
        s2.close();
        assert_eq!(*log.borrow(), vec!["+1x", "-2y"]);
    }
}
