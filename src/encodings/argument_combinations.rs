use permutator::{CartesianProductIterator, IteratorReset};

/// A lazy iterator over the cross product of a list of candidate sets.
///
/// Combinations are produced in odometer order: the last position advances first,
/// and carries propagate to the left, resetting the positions to their right to their first candidate.
/// If some candidate set is empty, there is no combination at all.
/// If the list of candidate sets is empty, the only combination is the empty one.
///
/// The iterator can be restarted with [reset](Self::reset).
///
/// # Example
///
/// ```
/// # use liftsat::encodings::ArgumentCombinations;
/// let first = [1, 2];
/// let second = [3, 4, 5];
/// let candidates = [&first[..], &second[..]];
/// let combinations = ArgumentCombinations::new(&candidates);
/// assert_eq!(6, combinations.n_combinations());
/// assert_eq!(
///     vec![vec![1, 3], vec![1, 4], vec![1, 5], vec![2, 3], vec![2, 4], vec![2, 5]],
///     combinations.collect::<Vec<Vec<i32>>>(),
/// );
/// ```
pub struct ArgumentCombinations<'a, T> {
    candidates: &'a [&'a [T]],
    product: Option<CartesianProductIterator<'a, T>>,
    empty_combination_pending: bool,
}

impl<'a, T> ArgumentCombinations<'a, T>
where
    T: Copy,
{
    /// Builds a new iterator given the candidate sets.
    pub fn new(candidates: &'a [&'a [T]]) -> Self {
        // the cartesian product iterator requires at least one position and no empty set
        let product = if candidates.is_empty() || candidates.iter().any(|c| c.is_empty()) {
            None
        } else {
            Some(CartesianProductIterator::new(candidates))
        };
        Self {
            candidates,
            product,
            empty_combination_pending: candidates.is_empty(),
        }
    }

    /// Restarts the iteration from the first combination.
    pub fn reset(&mut self) {
        if let Some(p) = self.product.as_mut() {
            p.reset();
        }
        self.empty_combination_pending = self.candidates.is_empty();
    }

    /// Returns the total number of combinations, regardless of the current position of the iterator.
    pub fn n_combinations(&self) -> usize {
        self.candidates.iter().map(|c| c.len()).product()
    }
}

impl<T> Iterator for ArgumentCombinations<'_, T>
where
    T: Copy,
{
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.empty_combination_pending {
            self.empty_combination_pending = false;
            return Some(vec![]);
        }
        self.product
            .as_mut()?
            .next()
            .map(|combination| combination.into_iter().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odometer_order() {
        let a = ['a', 'b'];
        let b = ['x'];
        let c = ['0', '1'];
        let candidates = [&a[..], &b[..], &c[..]];
        let combinations = ArgumentCombinations::new(&candidates).collect::<Vec<Vec<char>>>();
        assert_eq!(
            vec![
                vec!['a', 'x', '0'],
                vec!['a', 'x', '1'],
                vec!['b', 'x', '0'],
                vec!['b', 'x', '1'],
            ],
            combinations
        );
    }

    #[test]
    fn test_counts_and_distinctness() {
        let sets: Vec<Vec<usize>> = vec![(0..3).collect(), (0..4).collect(), (0..2).collect()];
        let refs = sets.iter().map(|s| s.as_slice()).collect::<Vec<&[usize]>>();
        let it = ArgumentCombinations::new(&refs);
        assert_eq!(24, it.n_combinations());
        let mut all = it.collect::<Vec<Vec<usize>>>();
        assert_eq!(24, all.len());
        let sorted = {
            let mut s = all.clone();
            s.sort_unstable();
            s
        };
        assert_eq!(sorted, all);
        all.dedup();
        assert_eq!(24, all.len());
    }

    #[test]
    fn test_empty_candidate_set() {
        let a = [1, 2];
        let b: [i32; 0] = [];
        let candidates = [&a[..], &b[..], &a[..]];
        let it = ArgumentCombinations::new(&candidates);
        assert_eq!(0, it.n_combinations());
        assert_eq!(0, it.count());
    }

    #[test]
    fn test_empty_first_candidate_set() {
        let a = [1, 2];
        let b: [i32; 0] = [];
        let candidates = [&b[..], &a[..]];
        let mut it = ArgumentCombinations::new(&candidates);
        assert_eq!(None, it.next());
        it.reset();
        assert_eq!(None, it.next());
    }

    #[test]
    fn test_no_position() {
        let candidates: [&[usize]; 0] = [];
        let mut it = ArgumentCombinations::new(&candidates);
        assert_eq!(1, it.n_combinations());
        assert_eq!(Some(vec![]), it.next());
        assert_eq!(None, it.next());
        it.reset();
        assert_eq!(Some(vec![]), it.next());
        assert_eq!(None, it.next());
    }

    #[test]
    fn test_reset() {
        let a = [1, 2];
        let candidates = [&a[..]];
        let mut it = ArgumentCombinations::new(&candidates);
        assert_eq!(2, it.by_ref().count());
        assert_eq!(None, it.next());
        it.reset();
        assert_eq!(vec![vec![1], vec![2]], it.collect::<Vec<Vec<i32>>>());
    }

    #[test]
    fn test_reset_midway() {
        let a = [1, 2];
        let b = [3, 4];
        let candidates = [&a[..], &b[..]];
        let mut it = ArgumentCombinations::new(&candidates);
        assert_eq!(Some(vec![1, 3]), it.next());
        assert_eq!(Some(vec![1, 4]), it.next());
        it.reset();
        assert_eq!(4, it.count());
    }
}
