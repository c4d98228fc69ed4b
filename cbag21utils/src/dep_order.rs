//!
//! # Dependency-Ordering Trait and Helpers
//!

// Std-lib
use std::collections::HashSet;
use std::marker::PhantomData;

///
/// # Dependency-Ordering Trait
///
/// Cell hierarchies form a directed graph: each cellview instantiates its masters,
/// which instantiate theirs, and so on. Masters are frequently shared.
/// Writers and checkers want them children-first, each exactly once.
///
/// Implementers provide `process`, which pushes each *direct* dependency of `item`
/// onto the [DepOrderer]. The orderer recurses depth-first,
/// de-duplicates, and calls `fail` with the offending item when it finds a cycle.
///
/// ```text
/// struct MasterOrder;
/// impl DepOrder for MasterOrder {
///     type Item = Ptr<CellView>;
///     type Error = LayoutError;
///     fn process(item: &Self::Item, orderer: &mut DepOrderer<Self>) -> Result<(), Self::Error> {
///         for inst in item.instances() {
///             orderer.push(inst.master())?;
///         }
///         Ok(())
///     }
///     fn fail(item: &Self::Item) -> Self::Error {
///         LayoutError::msg(format!("Cycle at {}", item.name()))
///     }
/// }
/// let ordered = MasterOrder::order(&roots)?;
/// ```
///
pub trait DepOrder: Sized {
    /// Item Type. Typically pointers or keys to the nodes in the dependency graph.
    type Item: Clone + Eq + std::hash::Hash;
    /// Error Type
    type Error;

    /// Dependency-order all entries in slice `items`
    fn order(items: &[Self::Item]) -> Result<Vec<Self::Item>, Self::Error> {
        DepOrderer::<Self>::order(items)
    }
    /// Process a single `item`, pushing each of its direct dependencies
    fn process(item: &Self::Item, orderer: &mut DepOrderer<Self>) -> Result<(), Self::Error>;
    /// Create the error reported when `item` closes a dependency cycle
    fn fail(item: &Self::Item) -> Self::Error;
}

/// # Dependency Order Helper
/// Public solely for use in the call-signature of [DepOrder::process].
pub struct DepOrderer<P: DepOrder> {
    /// Ordered, completed items
    stack: Vec<P::Item>,
    /// Completed items, for quick membership tests
    seen: HashSet<P::Item>,
    /// Items with an open recursive frame, for cycle detection
    pending: HashSet<P::Item>,
    p: PhantomData<P>,
}
impl<P: DepOrder> DepOrderer<P> {
    /// Dependency-order all entries in slice `items`
    pub fn order(items: &[P::Item]) -> Result<Vec<P::Item>, P::Error> {
        let len = items.len();
        let mut this = Self {
            stack: Vec::with_capacity(len),
            seen: HashSet::with_capacity(len),
            pending: HashSet::new(),
            p: PhantomData,
        };
        for item in items.iter() {
            this.push(item)?;
        }
        Ok(this.stack)
    }
    /// Push `item`'s dependencies, and then itself, onto the stack
    pub fn push(&mut self, item: &P::Item) -> Result<(), P::Error> {
        if self.seen.contains(item) {
            return Ok(());
        }
        if !self.pending.insert(item.clone()) {
            return Err(P::fail(item));
        }
        P::process(item, self)?;
        self.pending.remove(item);
        self.seen.insert(item.clone());
        self.stack.push(item.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Graph over small integers, stored as an adjacency list
    struct Edges;
    thread_local! {
        static GRAPH: std::cell::RefCell<Vec<Vec<usize>>> = std::cell::RefCell::new(Vec::new());
    }
    impl DepOrder for Edges {
        type Item = usize;
        type Error = usize;
        fn process(item: &usize, orderer: &mut DepOrderer<Self>) -> Result<(), usize> {
            let deps = GRAPH.with(|g| g.borrow()[*item].clone());
            for d in deps.iter() {
                orderer.push(d)?;
            }
            Ok(())
        }
        fn fail(item: &usize) -> usize {
            *item
        }
    }
    fn set_graph(g: Vec<Vec<usize>>) {
        GRAPH.with(|cell| *cell.borrow_mut() = g);
    }

    #[test]
    fn children_first() -> Result<(), usize> {
        // 0 -> {1, 2}, 1 -> {2}, 2 -> {}
        set_graph(vec![vec![1, 2], vec![2], vec![]]);
        let order = Edges::order(&[0, 1])?;
        assert_eq!(order, vec![2, 1, 0]);
        Ok(())
    }
    #[test]
    fn detects_cycles() {
        // 0 -> 1 -> 2 -> 0
        set_graph(vec![vec![1], vec![2], vec![0]]);
        assert_eq!(Edges::order(&[0]), Err(0));
    }
}
