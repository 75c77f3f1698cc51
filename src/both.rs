//! Pair values produced by [`Observable::and`](crate::Observable::and).

/// Two values activated together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Both<A, B> {
    /// Value of the left-hand observable.
    pub first: A,
    /// Value of the right-hand observable.
    pub second: B,
}

impl<A, B> Both<A, B> {
    /// Pair two values.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Split into `(first, second)`.
    pub fn into_tuple(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A, B> From<(A, B)> for Both<A, B> {
    fn from((first, second): (A, B)) -> Self {
        Self::new(first, second)
    }
}

/// Adapt a two-argument function so it accepts a [`Both`].
///
/// ```rust,no_run
/// use scope_observable::{both, Both};
///
/// let sum = both(|a: i32, b: i32| a + b);
/// assert_eq!(sum(Both::new(1, 2)), 3);
/// ```
pub fn both<A, B, R>(f: impl Fn(A, B) -> R) -> impl Fn(Both<A, B>) -> R {
    move |pair| f(pair.first, pair.second)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_adapter() {
        let describe = both(|name: &str, count: u32| format!("{name}:{count}"));
        assert_eq!(describe(Both::new("tabs", 3)), "tabs:3");
    }

    #[test]
    fn test_tuple_conversion() {
        let pair: Both<_, _> = (1, "a").into();
        assert_eq!(pair.first, 1);
        assert_eq!(pair.into_tuple(), (1, "a"));
    }
}
