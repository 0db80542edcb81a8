//! Unit tests for the dominator engine on small hand-built graphs.

use super::*;
use crate::{DfsIndex, DominatorError};

/// Adjacency-list graph over `usize` vertices. Successors are enumerated
/// in insertion order, so DFS numbering is deterministic.
struct AdjacencyGraph {
    successors: Vec<Vec<usize>>,
}

impl AdjacencyGraph {
    fn new(vertex_count: usize, edges: &[(usize, usize)]) -> Self {
        let mut successors = vec![Vec::new(); vertex_count];
        for &(from, to) in edges {
            successors[from].push(to);
        }
        Self { successors }
    }
}

impl Successors for AdjacencyGraph {
    type Vertex = usize;

    fn for_each_successor(&self, vertex: &usize, visit: &mut dyn FnMut(&usize)) {
        for w in &self.successors[*vertex] {
            visit(w);
        }
    }
}

fn idom_raw<V: Clone + Eq + std::hash::Hash>(dominators: &Dominators<V>) -> Vec<usize> {
    dominators
        .immediate_dominators()
        .iter()
        .map(|idx| idx.index())
        .collect()
}

#[test]
fn single_vertex() {
    let graph = AdjacencyGraph::new(1, &[]);
    let dominators = Dominators::compute(&0, &graph, 1);

    assert_eq!(dominators.vertex_count(), 1);
    assert_eq!(idom_raw(&dominators), vec![0]);
    assert!(dominators.dominator_tree().is_empty());
    assert!(dominators.dominates(&0, &0).unwrap());
    assert!(dominators.dominators_of(&0).unwrap().is_empty());
}

#[test]
fn linear_chain() {
    // 0 -> 1 -> 2 -> 3
    let graph = AdjacencyGraph::new(4, &[(0, 1), (1, 2), (2, 3)]);
    let dominators = Dominators::compute(&0, &graph, 4);

    assert_eq!(idom_raw(&dominators), vec![0, 0, 1, 2]);
    assert_eq!(
        dominators.dominators_of(&3).unwrap(),
        vec![&2usize, &1, &0]
    );
    assert!(dominators.dominates(&1, &3).unwrap());
    assert!(!dominators.dominates(&3, &1).unwrap());
}

#[test]
fn if_else_diamond() {
    //     0
    //    / \
    //   1   2
    //    \ /
    //     3
    let graph = AdjacencyGraph::new(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
    let dominators = Dominators::compute(&0, &graph, 4);

    // DFS order: 0, 1, 3, 2 -- the merge gets index 2, the else arm 3.
    assert_eq!(dominators.vertex_indices()[&3], DfsIndex::from_raw(2));
    assert_eq!(idom_raw(&dominators), vec![0, 0, 0, 0]);

    // Neither arm dominates the merge.
    assert!(!dominators.dominates(&1, &3).unwrap());
    assert!(!dominators.dominates(&2, &3).unwrap());
    assert!(dominators.dominates(&0, &3).unwrap());
}

#[test]
fn loop_back_edge() {
    // 0 -> 1 <-> 2, 1 -> 3
    let graph = AdjacencyGraph::new(4, &[(0, 1), (1, 2), (2, 1), (1, 3)]);
    let dominators = Dominators::compute(&0, &graph, 4);

    assert_eq!(idom_raw(&dominators), vec![0, 0, 1, 1]);
    assert!(dominators.dominates(&1, &2).unwrap());
    assert!(dominators.dominates(&1, &3).unwrap());
    assert!(!dominators.dominates(&2, &3).unwrap());
}

#[test]
fn self_loop_is_consistent() {
    // 1 sits in its own predecessor set; eval of an unlinked vertex
    // returns the vertex itself and the semi fold is a no-op.
    let graph = AdjacencyGraph::new(3, &[(0, 1), (1, 1), (1, 2)]);
    let dominators = Dominators::compute(&0, &graph, 3);

    assert_eq!(idom_raw(&dominators), vec![0, 0, 1]);
    assert!(dominators.dominates(&1, &1).unwrap());
    assert_eq!(dominators.dominators_of(&1).unwrap(), vec![&0usize]);
}

#[test]
fn parallel_edges_collapse() {
    let graph = AdjacencyGraph::new(3, &[(0, 1), (0, 1), (1, 2), (1, 2)]);
    let dominators = Dominators::compute(&0, &graph, 3);

    assert_eq!(idom_raw(&dominators), vec![0, 0, 1]);
}

#[test]
fn unreachable_vertices_are_absent() {
    // 3 and 4 are disconnected from the entry.
    let graph = AdjacencyGraph::new(5, &[(0, 1), (1, 2), (3, 4)]);
    let dominators = Dominators::compute(&0, &graph, 5);

    assert_eq!(dominators.vertex_count(), 3);
    assert!(!dominators.vertex_indices().contains_key(&3));
    assert_eq!(
        dominators.dominates(&0, &3),
        Err(DominatorError::VertexNotFound)
    );
    assert_eq!(
        dominators.dominators_of(&4),
        Err(DominatorError::VertexNotFound)
    );
}

#[test]
fn unknown_vertex_on_either_side() {
    let graph = AdjacencyGraph::new(2, &[(0, 1)]);
    let dominators = Dominators::compute(&0, &graph, 2);

    assert_eq!(
        dominators.dominates(&7, &1),
        Err(DominatorError::VertexNotFound)
    );
    assert_eq!(
        dominators.dominates(&0, &7),
        Err(DominatorError::VertexNotFound)
    );
}

#[test]
fn dominator_tree_children_are_ascending() {
    let graph = AdjacencyGraph::new(6, &[(0, 1), (1, 2), (1, 3), (2, 4), (3, 4), (1, 5)]);
    let dominators = Dominators::compute(&0, &graph, 6);

    for children in dominators.dominator_tree().values() {
        assert!(children.windows(2).all(|pair| pair[0] < pair[1]));
    }
    let edge_count: usize = dominators.dominator_tree().values().map(Vec::len).sum();
    assert_eq!(edge_count, dominators.vertex_count() - 1);
}

#[test]
fn entry_convention() {
    let graph = AdjacencyGraph::new(3, &[(0, 1), (1, 2), (2, 0)]);
    let dominators = Dominators::compute(&0, &graph, 3);

    // The entry is its own idom by convention, dominates everything, and
    // has an empty strict-dominator chain.
    assert_eq!(dominators.immediate_dominators()[DfsIndex::from_raw(0)].index(), 0);
    assert!(dominators.dominates(&0, &0).unwrap());
    assert!(dominators.dominates(&0, &2).unwrap());
    assert!(dominators.dominators_of(&0).unwrap().is_empty());
}

#[test]
fn validate_accepts_fresh_engine() {
    let graph = AdjacencyGraph::new(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
    let dominators = Dominators::compute(&0, &graph, 4);
    assert_eq!(dominators.validate(), Ok(()));
}
