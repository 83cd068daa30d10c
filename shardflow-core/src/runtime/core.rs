use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Position of a processor inside a [`PipelineExecutor`](super::PipelineExecutor).
pub type ProcessorId = usize;

/// Directed edge: `from` pushes chunks that `to` pulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: ProcessorId,
    pub to: ProcessorId,
}

impl Edge {
    pub fn new(from: ProcessorId, to: ProcessorId) -> Self {
        Self { from, to }
    }
}

/// Topological sort of `num_nodes` processors (Kahn's algorithm).
///
/// Among processors that are ready at the same time the lowest id comes
/// first, so the order is deterministic. A cycle leaves its members out of
/// the result; callers compare the length against `num_nodes`.
pub fn topo_sort(num_nodes: usize, edges: &[Edge]) -> Vec<ProcessorId> {
    let mut in_degree = vec![0usize; num_nodes];
    let adj = downstream_map(num_nodes, edges);
    for edge in edges {
        in_degree[edge.to] += 1;
    }

    let mut queue: BinaryHeap<Reverse<ProcessorId>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, deg)| **deg == 0)
        .map(|(id, _)| Reverse(id))
        .collect();

    let mut result = Vec::with_capacity(num_nodes);
    while let Some(Reverse(node)) = queue.pop() {
        result.push(node);
        for &next in &adj[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push(Reverse(next));
            }
        }
    }
    result
}

/// Downstream processors of every node, indexed by id.
pub fn downstream_map(num_nodes: usize, edges: &[Edge]) -> Vec<Vec<ProcessorId>> {
    let mut adj = vec![Vec::new(); num_nodes];
    for edge in edges {
        adj[edge.from].push(edge.to);
    }
    adj
}

#[cfg(test)]
#[path = "tests/core_tests.rs"]
mod tests;
