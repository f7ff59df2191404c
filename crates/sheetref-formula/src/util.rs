//! Small collection helpers shared by function implementations

use ahash::AHashSet;
use std::hash::Hash;

/// A value or an arbitrarily nested list of values
///
/// Function arguments arrive in this shape: a scalar, a range (list of rows),
/// or a list of ranges.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested<T> {
    Item(T),
    List(Vec<Nested<T>>),
}

impl<T> From<T> for Nested<T> {
    fn from(item: T) -> Self {
        Nested::Item(item)
    }
}

impl<T> FromIterator<Nested<T>> for Nested<T> {
    fn from_iter<I: IntoIterator<Item = Nested<T>>>(iter: I) -> Self {
        Nested::List(iter.into_iter().collect())
    }
}

/// Iterator over the leaves of nested values, see [`flatten`]
#[derive(Debug)]
pub struct Leaves<T> {
    stack: Vec<std::vec::IntoIter<Nested<T>>>,
}

impl<T> Iterator for Leaves<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let next = self.stack.last_mut()?.next();
            match next {
                Some(Nested::Item(item)) => return Some(item),
                Some(Nested::List(list)) => self.stack.push(list.into_iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Yield every leaf of `items`, depth first, in order
///
/// ```
/// use sheetref_formula::util::{flatten, Nested};
///
/// let nested = vec![
///     Nested::Item(1),
///     Nested::List(vec![Nested::Item(2), Nested::List(vec![Nested::Item(3)])]),
/// ];
/// assert_eq!(flatten(nested).collect::<Vec<_>>(), vec![1, 2, 3]);
/// ```
pub fn flatten<T, I>(items: I) -> Leaves<T>
where
    I: IntoIterator<Item = Nested<T>>,
{
    Leaves {
        stack: vec![items.into_iter().collect::<Vec<_>>().into_iter()],
    }
}

/// Remove duplicates, keeping the first occurrence of each value
pub fn uniqueify<T, I>(seq: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = AHashSet::new();
    seq.into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
