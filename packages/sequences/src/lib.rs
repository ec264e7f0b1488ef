//! Pull-based lazy sequences producing values on demand.
//!
//! A [`Sequence`] produces values only when asked: nothing runs at
//! construction time, and combinators merely describe the pipeline. The
//! pull protocol is two calls - [`has_next`][Sequence::has_next] forces
//! production of the next value if none is buffered, and
//! [`next_value`][Sequence::next_value] consumes it (returning
//! [`Exhausted`] past the end).
//!
//! This package is entirely single-threaded and synchronous; it shares no
//! state or machinery with the concurrency primitives elsewhere in this
//! workspace.
//!
//! # Example
//!
//! ```rust
//! use sequences::Sequence;
//!
//! // An infinite sequence is fine - values are only produced on demand.
//! let mut state = (0_u64, 1_u64);
//! let fibonacci = Sequence::from_fn(move || {
//!     let value = state.0;
//!     state = (state.1, state.0 + state.1);
//!     Some(value)
//! });
//!
//! let first: Vec<_> = fibonacci.take(8).collect();
//! assert_eq!(first, [0, 1, 1, 2, 3, 5, 8, 13]);
//! ```

use std::fmt;

use thiserror::Error;

/// The error returned when reading past the end of a sequence.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("sequence is exhausted")]
pub struct Exhausted {
    _private: (),
}

impl Exhausted {
    fn new() -> Self {
        Self { _private: () }
    }
}

/// A lazy sequence of values, produced one pull at a time.
///
/// Construct one from a pull closure ([`from_fn`][Self::from_fn]) or from
/// anything iterable ([`of`][Self::of]), then either drive it through the
/// pull protocol (`has_next` / `next_value`) or compose it with the lazy
/// combinators. `Sequence` also implements [`Iterator`], so it plugs into
/// `for` loops and the standard adapters.
pub struct Sequence<T> {
    source: Box<dyn Iterator<Item = T>>,

    /// A value produced by `has_next` but not yet consumed.
    buffered: Option<T>,
}

impl<T> Sequence<T>
where
    T: 'static,
{
    /// Creates a sequence that pulls values from a closure until it returns
    /// [`None`].
    pub fn from_fn<F>(produce: F) -> Self
    where
        F: FnMut() -> Option<T> + 'static,
    {
        Self {
            source: Box::new(std::iter::from_fn(produce)),
            buffered: None,
        }
    }

    /// Creates a sequence over anything iterable.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sequences::Sequence;
    ///
    /// let mut numbers = Sequence::of([1, 2, 3]);
    /// assert_eq!(numbers.next_value(), Ok(1));
    /// ```
    pub fn of<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self {
            source: Box::new(values.into_iter()),
            buffered: None,
        }
    }

    /// Whether another value is available, forcing production if none is
    /// buffered.
    ///
    /// Repeated calls without an intervening [`next_value`][Self::next_value]
    /// do not consume anything.
    pub fn has_next(&mut self) -> bool {
        if self.buffered.is_none() {
            self.buffered = self.source.next();
        }

        self.buffered.is_some()
    }

    /// Consumes and returns the next value, or [`Exhausted`] past the end.
    pub fn next_value(&mut self) -> Result<T, Exhausted> {
        if self.buffered.is_none() {
            self.buffered = self.source.next();
        }

        self.buffered.take().ok_or_else(Exhausted::new)
    }

    /// The remaining values, including any buffered one, as a plain
    /// iterator. This is what the combinators compose over.
    fn into_inner(self) -> impl Iterator<Item = T> + 'static {
        self.buffered.into_iter().chain(self.source)
    }

    /// Maps every value through `transform`, lazily.
    pub fn map<U, F>(self, transform: F) -> Sequence<U>
    where
        U: 'static,
        F: FnMut(T) -> U + 'static,
    {
        Sequence {
            source: Box::new(self.into_inner().map(transform)),
            buffered: None,
        }
    }

    /// Maps every value to its own sequence and flattens the results into
    /// one sequence, lazily.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sequences::Sequence;
    ///
    /// let expanded: Vec<_> = Sequence::of([1, 2, 3])
    ///     .flat_map(|i| Sequence::of(0..i))
    ///     .collect();
    /// assert_eq!(expanded, [0, 0, 1, 0, 1, 2]);
    /// ```
    pub fn flat_map<U, F>(self, expand: F) -> Sequence<U>
    where
        U: 'static,
        F: FnMut(T) -> Sequence<U> + 'static,
    {
        Sequence {
            source: Box::new(self.into_inner().flat_map(expand)),
            buffered: None,
        }
    }

    /// Keeps only the values `predicate` accepts, lazily.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: FnMut(&T) -> bool + 'static,
    {
        Self {
            source: Box::new(self.into_inner().filter(predicate)),
            buffered: None,
        }
    }

    /// Truncates the sequence to at most `count` values. This is what makes
    /// infinite sequences consumable.
    pub fn take(self, count: usize) -> Self {
        Self {
            source: Box::new(self.into_inner().take(count)),
            buffered: None,
        }
    }

    /// Produces values for as long as `predicate` accepts them, then stops
    /// for good.
    pub fn take_while<F>(self, predicate: F) -> Self
    where
        F: FnMut(&T) -> bool + 'static,
    {
        Self {
            source: Box::new(self.into_inner().take_while(predicate)),
            buffered: None,
        }
    }

    /// Folds the whole sequence into a single value. Terminal: this drives
    /// the pipeline to exhaustion.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sequences::Sequence;
    ///
    /// let factorial = Sequence::of(1..=5).fold(1, |acc, i| acc * i);
    /// assert_eq!(factorial, 120);
    /// ```
    pub fn fold<R, F>(self, initial: R, combine: F) -> R
    where
        F: FnMut(R, T) -> R,
    {
        self.into_inner().fold(initial, combine)
    }

    /// Consumes the sequence, invoking `consume` for every value.
    pub fn for_each<F>(self, consume: F)
    where
        F: FnMut(T),
    {
        self.into_inner().for_each(consume);
    }
}

impl<T> Iterator for Sequence<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.buffered.is_none() {
            self.buffered = self.source.next();
        }

        self.buffered.take()
    }
}

impl<T> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("has_buffered", &self.buffered.is_some())
            .finish_non_exhaustive()
    }
}

impl<T> FromIterator<T> for Sequence<T>
where
    T: 'static,
{
    /// Materializes the iterator's values and sequences over them. Prefer
    /// [`Sequence::of`] to keep a `'static` iterable lazy.
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::of(iter.into_iter().collect::<Vec<_>>())
    }
}
