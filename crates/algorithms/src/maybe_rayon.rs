/// Compatibility layer for rayon/sequential execution.
///
/// With the `parallel` feature enabled this re-exports rayon's parallel
/// iterators; without it, a sequential stand-in provides the same
/// `into_par_iter()` entry point so the per-tile and per-row loops compile
/// unchanged.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential stand-in for `rayon::prelude::IntoParallelIterator`.
    ///
    /// Resolves `into_par_iter()` to `into_iter()`, after which the rest of
    /// the chain uses the standard `Iterator` methods.
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
