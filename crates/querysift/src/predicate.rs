//! Compiled predicates.
//!
//! A [`Predicate`] is an ordinary boxed closure over `&T`. It is built once
//! per query and never fails when evaluated.

use std::fmt;

use crate::coerce::Comparison;
use crate::record::Property;
use crate::value::{optional_equals, FieldValue, Scalar, ScalarRef};

type Test<T> = dyn Fn(&T) -> bool + Send + Sync;

/// A compiled filter over records of type `T`.
///
/// # Example
///
/// ```
/// use querysift::Predicate;
///
/// let even = Predicate::new(|n: &i32| n % 2 == 0);
/// let small = Predicate::new(|n: &i32| *n < 5);
/// let both = even.and(small);
///
/// assert_eq!(both.filter(&[1, 2, 3, 4, 6]), vec![&2, &4]);
/// ```
pub struct Predicate<T> {
    test: Box<Test<T>>,
}

impl<T> Predicate<T> {
    /// Wraps a closure.
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Predicate {
            test: Box::new(test),
        }
    }

    /// Combines two predicates; both must hold. `self` is evaluated first.
    pub fn and(self, other: Predicate<T>) -> Self
    where
        T: 'static,
    {
        Predicate::new(move |record: &T| self.matches(record) && other.matches(record))
    }

    /// Combines two predicates; either must hold. `self` is evaluated first.
    pub fn or(self, other: Predicate<T>) -> Self
    where
        T: 'static,
    {
        Predicate::new(move |record: &T| self.matches(record) || other.matches(record))
    }

    /// Negates the predicate.
    pub fn negate(self) -> Self
    where
        T: 'static,
    {
        Predicate::new(move |record: &T| !self.matches(record))
    }

    /// Tests a single record.
    pub fn matches(&self, record: &T) -> bool {
        (self.test)(record)
    }

    /// Borrows this predicate as a plain closure, e.g. for `Iterator::filter`.
    pub fn as_fn(&self) -> impl Fn(&T) -> bool + '_ {
        move |record: &T| self.matches(record)
    }

    /// Returns references to matching records, in input order.
    pub fn filter<'a>(&self, records: &'a [T]) -> Vec<&'a T> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// Returns clones of matching records, in input order.
    pub fn filter_cloned(&self, records: &[T]) -> Vec<T>
    where
        T: Clone,
    {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }

    /// Keeps only matching records.
    pub fn filter_mut(&self, records: &mut Vec<T>) {
        records.retain(|r| self.matches(r));
    }

    /// Counts matching records.
    pub fn count(&self, records: &[T]) -> usize {
        records.iter().filter(|r| self.matches(r)).count()
    }

    /// Returns `true` if any record matches.
    pub fn any(&self, records: &[T]) -> bool {
        records.iter().any(|r| self.matches(r))
    }

    /// Returns `true` if every record matches.
    pub fn all(&self, records: &[T]) -> bool {
        records.iter().all(|r| self.matches(r))
    }

    /// Finds the first matching record.
    pub fn find<'a>(&self, records: &'a [T]) -> Option<&'a T> {
        records.iter().find(|r| self.matches(r))
    }

    /// Finds the index of the first matching record.
    pub fn position(&self, records: &[T]) -> Option<usize> {
        records.iter().position(|r| self.matches(r))
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").finish_non_exhaustive()
    }
}

/// Builds the predicate of one clause from its checked comparison.
pub(crate) fn build<T: 'static>(property: Property<T>, comparison: Comparison) -> Predicate<T> {
    let read = property.accessor();

    match comparison {
        Comparison::Equals { expected, negate } => Predicate::new(move |record: &T| {
            let equal = optional_equals(
                read(record).as_scalar().as_ref(),
                expected.as_ref().map(Scalar::as_ref).as_ref(),
            );
            equal != negate
        }),

        Comparison::Order { op, bound } => Predicate::new(move |record: &T| {
            read(record)
                .as_scalar()
                .and_then(|actual| actual.compare(&bound.as_ref()))
                .is_some_and(|ordering| op.eval(ordering))
        }),

        Comparison::Edge { text, starts } => Predicate::new(move |record: &T| {
            match read(record).as_scalar().as_ref().and_then(ScalarRef::as_str) {
                Some(s) if starts => s.starts_with(text.as_str()),
                Some(s) => s.ends_with(text.as_str()),
                None => false,
            }
        }),

        Comparison::OneOf(candidates) => Predicate::new(move |record: &T| {
            let actual = read(record).as_scalar();
            candidates
                .iter()
                .any(|c| optional_equals(actual.as_ref(), c.as_ref().map(Scalar::as_ref).as_ref()))
        }),

        Comparison::Contains(needle) => Predicate::new(move |record: &T| {
            let needle = needle.as_ref().map(Scalar::as_ref);
            match read(record) {
                FieldValue::Sequence(items) => items
                    .iter()
                    .any(|item| optional_equals(item.as_ref(), needle.as_ref())),
                _ => false,
            }
        }),

        Comparison::SequenceEquals { expected, negate } => Predicate::new(move |record: &T| {
            let equal = match read(record) {
                FieldValue::Sequence(items) => {
                    items.len() == expected.len()
                        && items.iter().zip(&expected).all(|(item, want)| {
                            optional_equals(
                                item.as_ref(),
                                want.as_ref().map(Scalar::as_ref).as_ref(),
                            )
                        })
                }
                _ => false,
            };
            equal != negate
        }),
    }
}
