//! Walking `source()` chains.
//!
//! These helpers work on any `std::error::Error`, not just [`Error`](crate::Error),
//! so code that receives an `anyhow::Error` or a `thiserror` enum can still find
//! the diagnostic error inside it.

use std::error::Error as StdError;

/// Iterator over an error and its transitive sources, outermost first.
///
/// Created by [`chain()`].
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

/// Iterate over `err` followed by each error in its `source()` chain.
///
/// ```rust
/// use errtrail::{chain, Error};
///
/// let io = std::io::Error::other("disk full");
/// let err = Error::adopt(io);
///
/// let messages: Vec<String> = chain(&err).skip(1).map(|e| e.to_string()).collect();
/// assert_eq!(messages, vec!["disk full"]);
/// ```
pub fn chain<'a>(err: &'a (dyn StdError + 'static)) -> Chain<'a> {
    Chain { next: Some(err) }
}

/// Find the first error in `err`'s chain (including `err` itself) matching `predicate`.
///
/// ```rust
/// use errtrail::{find_in_chain, Error};
///
/// let err = Error::adopt(std::io::Error::other("disk full"));
/// let io = find_in_chain(&err, |e| e.is::<std::io::Error>());
/// assert_eq!(io.map(|e| e.to_string()), Some("disk full".to_string()));
/// ```
pub fn find_in_chain<'a, P>(
    err: &'a (dyn StdError + 'static),
    mut predicate: P,
) -> Option<&'a (dyn StdError + 'static)>
where
    P: FnMut(&(dyn StdError + 'static)) -> bool,
{
    chain(err).find(|e| predicate(*e))
}
