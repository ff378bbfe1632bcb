/// This module implements a variant of
/// [pathfinding's astar function](https://docs.rs/pathfinding/latest/pathfinding/directed/astar/index.html)
/// with an explicit closed set. The open frontier is a binary heap of indices into an
/// [IndexMap] which stores, per discovered node, its predecessor and best known cost.
use fxhash::{FxBuildHasher, FxHashSet};
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;
use num_traits::Zero;

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::Hash;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

struct SmallestCostHolder<K> {
    estimated_cost: K,
    cost: K,
    index: usize,
}

impl<K: PartialEq> Eq for SmallestCostHolder<K> {}

impl<K: PartialEq> PartialEq for SmallestCostHolder<K> {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_cost.eq(&other.estimated_cost) && self.cost.eq(&other.cost)
    }
}

impl<K: Ord> PartialOrd for SmallestCostHolder<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for SmallestCostHolder<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Smallest estimated total cost first. Ties go to the larger accumulated cost, which
        // expands nodes closer to the goal first.
        match other.estimated_cost.cmp(&self.estimated_cost) {
            Ordering::Equal => self.cost.cmp(&other.cost),
            s => s,
        }
    }
}

fn reverse_path<N: Clone, C>(parents: &FxIndexMap<N, (usize, C)>, start: usize) -> Vec<N> {
    let mut path = std::iter::successors(Some(start), |&i| {
        parents.get_index(i).map(|(_, &(p, _))| p)
    })
    .map_while(|i| parents.get_index(i).map(|(node, _)| node.clone()))
    .collect::<Vec<N>>();
    path.reverse();
    path
}

/// Runs A* from `start` until a node satisfying `success` is finalised. Returns the path
/// including `start` together with its cost, or [None] if the frontier runs dry.
///
/// Nodes are finalised once and never reopened, which is sound for a consistent heuristic.
/// A frontier entry is only replaced if the new cost is strictly lower than the stored one.
pub fn astar<N, C, FN, IN, FH, FS>(
    start: &N,
    mut successors: FN,
    mut heuristic: FH,
    mut success: FS,
) -> Option<(Vec<N>, C)>
where
    N: Eq + Hash + Clone,
    C: Zero + Ord + Copy,
    FN: FnMut(&N) -> IN,
    IN: IntoIterator<Item = (N, C)>,
    FH: FnMut(&N) -> C,
    FS: FnMut(&N) -> bool,
{
    let mut to_see = BinaryHeap::new();
    to_see.push(SmallestCostHolder {
        estimated_cost: heuristic(start),
        cost: Zero::zero(),
        index: 0,
    });
    let mut parents: FxIndexMap<N, (usize, C)> = FxIndexMap::default();
    parents.insert(start.clone(), (usize::MAX, Zero::zero()));
    let mut closed: FxHashSet<usize> = FxHashSet::default();
    while let Some(SmallestCostHolder { cost, index, .. }) = to_see.pop() {
        // A node may sit in the heap several times if a cheaper way to it was found later;
        // only the first pop counts.
        if !closed.insert(index) {
            continue;
        }
        let successors = {
            let (node, _) = parents.get_index(index)?;
            if success(node) {
                let path = reverse_path(&parents, index);
                return Some((path, cost));
            }
            successors(node)
        };
        for (successor, move_cost) in successors {
            let new_cost = cost + move_cost;
            let h;
            let n;
            match parents.entry(successor) {
                Vacant(e) => {
                    h = heuristic(e.key());
                    n = e.index();
                    e.insert((index, new_cost));
                }
                Occupied(mut e) => {
                    if closed.contains(&e.index()) || e.get().1 <= new_cost {
                        continue;
                    }
                    h = heuristic(e.key());
                    n = e.index();
                    e.insert((index, new_cost));
                }
            }

            to_see.push(SmallestCostHolder {
                estimated_cost: new_cost + h,
                cost: new_cost,
                index: n,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A line graph 0 - 1 - ... - 9 with a costly shortcut from 0 to 9.
    fn line_successors(n: &u32) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        if *n > 0 {
            out.push((n - 1, 1));
        }
        if *n < 9 {
            out.push((n + 1, 1));
        }
        if *n == 0 {
            out.push((9, 20));
        }
        out
    }

    #[test]
    fn takes_cheaper_route() {
        let (path, cost) = astar(&0, line_successors, |n| 9 - n, |n| *n == 9).unwrap();
        assert_eq!(cost, 9);
        assert_eq!(path, (0..=9).collect::<Vec<_>>());
    }

    #[test]
    fn start_is_goal() {
        let (path, cost) = astar(&4, line_successors, |_| 0, |n| *n == 4).unwrap();
        assert_eq!(path, vec![4]);
        assert_eq!(cost, 0);
    }

    #[test]
    fn exhausted_frontier() {
        assert!(astar(&0u32, line_successors, |_| 0, |n| *n == 42).is_none());
    }
}
