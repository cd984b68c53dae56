use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

use crate::traits::Pather;

/// A node with its cumulative cost from the search start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathNode<N> {
    pub node: N,
    pub cost: i32,
}

// ---------------------------------------------------------------------------
// Frontier entries
// ---------------------------------------------------------------------------

/// Open-list entry, ordered by `cost` then by insertion `seq`.
struct Frontier<N> {
    node: N,
    cost: i32,
    seq: u64,
}

impl<N> PartialEq for Frontier<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.seq == other.seq
    }
}

impl<N> Eq for Frontier<N> {}

impl<N> Ord for Frontier<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so BinaryHeap (max-heap) pops the cheapest, oldest entry first.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<N> PartialOrd for Frontier<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-node search record.
struct Visit<N> {
    cost: i32,
    parent: Option<N>,
    closed: bool,
}

struct Search<N> {
    open: BinaryHeap<Frontier<N>>,
    nodes: HashMap<N, Visit<N>>,
    seq: u64,
}

impl<N: Copy + Eq + Hash> Search<N> {
    fn new(start: N) -> Self {
        let mut s = Self {
            open: BinaryHeap::new(),
            nodes: HashMap::new(),
            seq: 0,
        };
        s.nodes.insert(
            start,
            Visit {
                cost: 0,
                parent: None,
                closed: false,
            },
        );
        s.push(start, 0);
        s
    }

    fn push(&mut self, node: N, cost: i32) {
        let seq = self.seq;
        self.seq += 1;
        self.open.push(Frontier { node, cost, seq });
    }

    /// Pop the next unsettled node and mark it closed.
    fn pop(&mut self) -> Option<(N, i32)> {
        while let Some(current) = self.open.pop() {
            let Some(visit) = self.nodes.get_mut(&current.node) else {
                continue;
            };
            // Skip stale entries.
            if visit.closed || visit.cost != current.cost {
                continue;
            }
            visit.closed = true;
            return Some((current.node, current.cost));
        }
        None
    }

    /// Relax the edge `from -> to` with the given tentative cost.
    fn relax(&mut self, from: N, to: N, tentative: i32) {
        match self.nodes.entry(to) {
            Entry::Occupied(mut e) => {
                let v = e.get_mut();
                if v.closed || tentative >= v.cost {
                    return;
                }
                v.cost = tentative;
                v.parent = Some(from);
            }
            Entry::Vacant(e) => {
                e.insert(Visit {
                    cost: tentative,
                    parent: Some(from),
                    closed: false,
                });
            }
        }
        self.push(to, tentative);
    }

    /// Walk parents back from `goal`. The start node is not included.
    fn path_to(&self, goal: N) -> Vec<N> {
        let mut path = Vec::new();
        let mut cur = goal;
        while let Some(parent) = self.nodes.get(&cur).and_then(|v| v.parent) {
            path.push(cur);
            cur = parent;
        }
        path.reverse();
        path
    }
}

/// Uniform-cost search from `start` to the nearest node satisfying `is_goal`.
///
/// Returns the path excluding `start` and including the goal node, an empty
/// path when `start` itself is a goal, or `None` when the frontier is
/// exhausted first. Equal-cost nodes are expanded in insertion order, so the
/// result is reproducible.
pub fn dijkstra<N, G, P>(start: N, mut is_goal: G, pather: &P) -> Option<Vec<N>>
where
    N: Copy + Eq + Hash,
    G: FnMut(N) -> bool,
    P: Pather<N> + ?Sized,
{
    let mut search = Search::new(start);
    let mut nbuf = Vec::with_capacity(4);

    while let Some((current, cost)) = search.pop() {
        if is_goal(current) {
            return Some(search.path_to(current));
        }
        nbuf.clear();
        pather.neighbors(current, &mut nbuf);
        for &n in nbuf.iter() {
            search.relax(current, n, cost + 1);
        }
    }
    None
}

/// Bounded flood fill: every node reachable from `start` with cumulative
/// cost ≤ `range`, in the order they were settled.
///
/// `start` is always the first entry, with cost 0, even for a negative range.
pub fn dijkstra_range<N, P>(start: N, range: i32, pather: &P) -> Vec<PathNode<N>>
where
    N: Copy + Eq + Hash,
    P: Pather<N> + ?Sized,
{
    let mut search = Search::new(start);
    let mut nbuf = Vec::with_capacity(4);
    let mut results = Vec::new();

    while let Some((current, cost)) = search.pop() {
        results.push(PathNode {
            node: current,
            cost,
        });
        let tentative = cost + 1;
        if tentative > range {
            continue;
        }
        nbuf.clear();
        pather.neighbors(current, &mut nbuf);
        for &n in nbuf.iter() {
            search.relax(current, n, tentative);
        }
    }
    results
}
