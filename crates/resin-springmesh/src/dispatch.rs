//! Data-parallel loops used by the tick passes.
//!
//! With the `parallel` feature these run on the rayon thread pool; without
//! it they are plain iterator loops. Each call returns only after every
//! element has been processed, which is the barrier between passes.

use std::ops::Add;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runs `f` on every element.
pub fn for_each_mut<T, F>(items: &mut [T], f: F)
where
    T: Send,
    F: Fn(&mut T) + Sync + Send,
{
    #[cfg(feature = "parallel")]
    items.par_iter_mut().for_each(f);
    #[cfg(not(feature = "parallel"))]
    items.iter_mut().for_each(f);
}

/// Runs `f` on every element together with its index.
pub fn for_each_indexed_mut<T, F>(items: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    #[cfg(feature = "parallel")]
    items
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, item)| f(i, item));
    #[cfg(not(feature = "parallel"))]
    items
        .iter_mut()
        .enumerate()
        .for_each(|(i, item)| f(i, item));
}

/// Maps every element, preserving order.
pub fn map<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(feature = "parallel")]
    return items.par_iter().map(f).collect();
    #[cfg(not(feature = "parallel"))]
    return items.iter().map(f).collect();
}

/// Runs `f` on every element and sums the results.
pub fn sum_mut<T, S, F>(items: &mut [T], f: F) -> S
where
    T: Send,
    S: Send + Default + Add<Output = S>,
    F: Fn(&mut T) -> S + Sync + Send,
{
    #[cfg(feature = "parallel")]
    return items.par_iter_mut().map(f).reduce(S::default, |a, b| a + b);
    #[cfg(not(feature = "parallel"))]
    return items.iter_mut().map(f).fold(S::default(), |a, b| a + b);
}
