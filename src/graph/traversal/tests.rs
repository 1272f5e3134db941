use std::collections::HashSet;

use roaring::RoaringBitmap;

use super::*;
use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::graph::store::ChunkedGraph;

fn graph(vertex_count: usize, arrows: &[(usize, usize)]) -> ChunkedGraph {
    ChunkedGraph::from_arrows_with_config(
        GraphConfig::default().with_chunk_size(2),
        vertex_count,
        arrows.iter().map(|&(v, u)| (v, u, 0)),
    )
    .unwrap()
}

fn scenario() -> ChunkedGraph {
    graph(5, &[(0, 1), (0, 3), (1, 2), (1, 4), (4, 3)])
}

#[test]
fn test_bfs_visits_scenario_in_level_order() {
    let g = scenario();
    assert_eq!(g.bfs(0).unwrap().collect::<Vec<_>>(), vec![0, 1, 3, 2, 4]);
    assert_eq!(g.bfs(4).unwrap().collect::<Vec<_>>(), vec![4, 3]);
}

#[test]
fn test_dfs_visits_lowest_neighbor_first() {
    // 0 -> 1,2 ; 1 -> 3 ; 2 -> 3
    let g = graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
    assert_eq!(g.dfs(0).unwrap().collect::<Vec<_>>(), vec![0, 1, 3, 2]);
    assert_eq!(g.dfs(0).unwrap().count(), 4);
}

#[test]
fn test_backward_traversals_follow_predecessors() {
    let g = scenario();
    assert_eq!(g.bfs_prev(3).unwrap().collect::<Vec<_>>(), vec![3, 0, 4, 1]);
    assert_eq!(g.dfs_prev(3).unwrap().collect::<Vec<_>>(), vec![3, 0, 4, 1]);
    assert_eq!(g.bfs_prev(0).unwrap().collect::<Vec<_>>(), vec![0]);
}

#[test]
fn test_cycles_terminate() {
    let g = graph(3, &[(0, 1), (1, 2), (2, 0), (2, 2)]);
    assert_eq!(g.bfs(1).unwrap().collect::<Vec<_>>(), vec![1, 2, 0]);
    assert_eq!(g.dfs(2).unwrap().collect::<Vec<_>>(), vec![2, 0, 1]);
}

#[test]
fn test_with_data_yields_payloads() {
    let mut g = scenario();
    for v in 0..5 {
        g.set_vertex_data(v, 100 + v as u32).unwrap();
    }
    let visited: Vec<_> = g.bfs(1).unwrap().with_data().collect();
    assert_eq!(visited, vec![(1, 101), (2, 102), (4, 104), (3, 103)]);
}

#[test]
fn test_invalid_start_is_rejected() {
    let g = scenario();
    assert!(matches!(
        g.bfs(5),
        Err(GraphError::VertexOutOfRange { vertex: 5, vertex_count: 5 })
    ));
}

#[test]
fn test_premarked_vertices_are_skipped() {
    let g = scenario();
    let mut visited = DenseVisited::new();
    visited.insert(1);
    let order: Vec<_> = g
        .traverse_with(0, Direction::Forward, Order::BreadthFirst, &mut visited)
        .unwrap()
        .collect();
    assert_eq!(order, vec![0, 3]);

    // Start already visited: nothing to yield.
    let again: Vec<_> = g
        .traverse_with(0, Direction::Forward, Order::BreadthFirst, &mut visited)
        .unwrap()
        .collect();
    assert!(again.is_empty());
    assert_eq!(visited.iter().collect::<Vec<_>>(), vec![0, 1, 3]);
}

#[test]
fn test_shared_visited_set_counts_components() {
    let g = graph(6, &[(0, 1), (1, 0), (2, 3), (3, 2), (4, 4)]);
    let mut visited = DenseVisited::with_capacity(g.vertex_count());
    let mut components = 0;
    for v in 0..g.vertex_count() {
        if visited.contains(v) {
            continue;
        }
        components += 1;
        g.traverse_with(v, Direction::Forward, Order::DepthFirst, &mut visited)
            .unwrap()
            .for_each(drop);
    }
    assert_eq!(components, 4);
    assert_eq!(visited.len(), 6);
}

#[test]
fn test_visited_set_implementations_agree() {
    let g = graph(
        12,
        &[(0, 5), (0, 9), (5, 2), (9, 2), (2, 11), (11, 0), (7, 8)],
    );
    let dense: Vec<_> = g.bfs(0).unwrap().collect();
    let hashed: Vec<_> = g
        .traverse_with(0, Direction::Forward, Order::BreadthFirst, HashSet::new())
        .unwrap()
        .collect();
    let roaring = g
        .traverse_with(0, Direction::Forward, Order::BreadthFirst, RoaringBitmap::new())
        .unwrap();
    let roaring_order: Vec<_> = roaring.collect();
    assert_eq!(dense, vec![0, 5, 9, 2, 11]);
    assert_eq!(hashed, dense);
    assert_eq!(roaring_order, dense);
}

#[test]
fn test_dense_visited_grows_on_demand() {
    let mut visited = DenseVisited::with_capacity(4);
    assert!(visited.insert(200));
    assert!(!visited.insert(200));
    assert!(visited.contains(200));
    assert!(!visited.contains(10_000));
    assert_eq!(visited.len(), 1);
    visited.clear();
    assert!(visited.is_empty());
    assert!(!visited.contains(200));
}

#[test]
fn test_traversal_reports_its_visited_set() {
    let g = scenario();
    let mut walk = g.dfs(0).unwrap();
    assert_eq!(walk.next(), Some(0));
    // Neighbors of 0 are marked as soon as they are enqueued.
    assert!(walk.visited().contains(3));
    assert!(!walk.visited().contains(2));
    assert_eq!(walk.direction(), Direction::Forward);
    assert_eq!(walk.order(), Order::DepthFirst);
    let rest: Vec<_> = walk.by_ref().collect();
    assert_eq!(rest, vec![1, 2, 4, 3]);
    assert_eq!(walk.next(), None);
    assert_eq!(walk.into_visited().len(), 5);
}
