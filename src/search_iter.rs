use common_macros::hash_map;
use num::Integer;
use priority_queue::PriorityQueue;
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Add;
use trait_set::trait_set;

trait_set! {
    pub trait SearchNode = Clone + Hash + Eq + Debug;
}

pub struct BfsIter<T: SearchNode, S: FnMut(&T) -> Vec<T>> {
    queue: VecDeque<(T, usize)>,
    depths: HashMap<T, usize>,
    parents: HashMap<T, Option<T>>,
    successor: S,
}

impl<T: SearchNode, S: FnMut(&T) -> Vec<T>> BfsIter<T, S> {
    pub fn new(start: T, successor: S) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back((start.clone(), 0));
        Self {
            queue,
            depths: hash_map!(start.clone() => 0),
            successor,
            parents: hash_map!(start.clone() => None),
        }
    }

    pub fn path_back_from(&self, node: &T) -> VecDeque<T> {
        path_back_from(node, &self.parents)
    }

    pub fn depth_for(&self, node: &T) -> Option<usize> {
        self.depths.get(node).copied()
    }

    pub fn all_depths(&self) -> HashMap<T, usize> {
        self.depths.clone()
    }
}

impl<T: SearchNode, S: FnMut(&T) -> Vec<T>> Iterator for BfsIter<T, S> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.pop_front().map(|(parent, depth)| {
            for child in (self.successor)(&parent) {
                if !self.depths.contains_key(&child) {
                    self.depths.insert(child.clone(), depth + 1);
                    self.parents.insert(child.clone(), Some(parent.clone()));
                    self.queue.push_back((child, depth + 1));
                }
            }
            parent
        })
    }
}

/// Walks back-pointers from `node`; the result runs from `node` to the root.
fn path_back_from<T: SearchNode>(node: &T, parents: &HashMap<T, Option<T>>) -> VecDeque<T> {
    let mut result = VecDeque::new();
    let mut current = node;
    result.push_back(current.clone());
    while let Some(Some(parent)) = parents.get(current) {
        result.push_back(parent.clone());
        current = parent;
    }
    result
}

trait_set! {
    pub trait Estimator = Integer + Copy + Clone + Add<Output=Self> + PartialOrd + Ord + Debug + Default
}

/// Frontier priority. `PriorityQueue` pops the greatest entry, so the ordering
/// is inverted: lower f wins, then lower h, then the earlier insertion.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
struct TotalEstimate<N: Estimator> {
    from_start: N,
    estimate_to_goal: N,
    insertion: u64,
}

impl<N: Estimator> TotalEstimate<N> {
    fn next_cost(&self, step_cost: N, estimate_to_goal: N, insertion: u64) -> Self {
        Self {
            from_start: self.from_start + step_cost,
            estimate_to_goal,
            insertion,
        }
    }

    fn total(&self) -> N {
        self.from_start + self.estimate_to_goal
    }
}

impl<N: Estimator> Ord for TotalEstimate<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .total()
            .cmp(&self.total())
            .then_with(|| other.estimate_to_goal.cmp(&self.estimate_to_goal))
            .then_with(|| other.insertion.cmp(&self.insertion))
    }
}

impl<N: Estimator> PartialOrd for TotalEstimate<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first search yielding nodes in expansion order. Each node is yielded
/// once; a node is closed when it is yielded.
pub struct PrioritySearchIter<
    N: Estimator,
    T: SearchNode,
    S: FnMut(&T) -> Vec<(T, N)>,
    H: Fn(&T) -> N,
> {
    queue: PriorityQueue<T, TotalEstimate<N>>,
    costs: HashMap<T, N>,
    parents: HashMap<T, Option<T>>,
    successor: S,
    heuristic: H,
    insertions: u64,
    expanded: usize,
}

impl<N: Estimator, T: SearchNode, S: FnMut(&T) -> Vec<(T, N)>, H: Fn(&T) -> N>
    PrioritySearchIter<N, T, S, H>
{
    pub fn a_star(start: T, successor: S, heuristic: H) -> Self {
        let mut queue = PriorityQueue::new();
        let start_estimate = TotalEstimate {
            estimate_to_goal: heuristic(&start),
            ..TotalEstimate::default()
        };
        queue.push(start.clone(), start_estimate);
        Self {
            queue,
            costs: HashMap::new(),
            successor,
            parents: hash_map!(start.clone() => None),
            heuristic,
            insertions: 1,
            expanded: 0,
        }
    }

    pub fn path_back_from(&self, node: &T) -> VecDeque<T> {
        path_back_from(node, &self.parents)
    }

    /// Final cost of a closed node.
    pub fn cost_for(&self, node: &T) -> Option<N> {
        self.costs.get(node).copied()
    }

    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn frontier_len(&self) -> usize {
        self.queue.len()
    }
}

impl<N: Estimator, T: SearchNode, S: FnMut(&T) -> Vec<(T, N)>, H: Fn(&T) -> N> Iterator
    for PrioritySearchIter<N, T, S, H>
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let (parent, cost) = self.queue.pop()?;
        self.expanded += 1;
        self.costs.insert(parent.clone(), cost.from_start);
        for (child, step_cost) in (self.successor)(&parent) {
            if self.costs.contains_key(&child) {
                continue;
            }
            let estimate = (self.heuristic)(&child);
            match self.queue.get_priority(&child).copied() {
                Some(queued) => {
                    let candidate = cost.next_cost(step_cost, estimate, queued.insertion);
                    if candidate.from_start < queued.from_start {
                        self.parents.insert(child.clone(), Some(parent.clone()));
                        self.queue.change_priority(&child, candidate);
                    }
                }
                None => {
                    let candidate = cost.next_cost(step_cost, estimate, self.insertions);
                    self.insertions += 1;
                    self.parents.insert(child.clone(), Some(parent.clone()));
                    self.queue.push(child, candidate);
                }
            }
        }
        Some(parent)
    }
}
