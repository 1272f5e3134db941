use chunkgraph::{ChunkedGraph, Direction, GraphConfig, Order};
use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

fn build(vertex_count: usize, arrows: &[(usize, usize)]) -> (ChunkedGraph, DiGraph<(), ()>) {
    let config = GraphConfig::default().with_chunk_size(4);
    let graph = ChunkedGraph::from_arrows_with_config(config, vertex_count, arrows.iter().map(|&(v, u)| (v, u, 0)))
        .unwrap();
    let mut reference = DiGraph::new();
    for _ in 0..vertex_count {
        reference.add_node(());
    }
    for &(v, u) in arrows.iter().collect::<BTreeSet<_>>() {
        reference.add_edge(NodeIndex::new(v), NodeIndex::new(u), ());
    }
    (graph, reference)
}

fn reachable(reference: &DiGraph<(), ()>, start: usize, direction: Direction) -> BTreeSet<usize> {
    let mut out = BTreeSet::new();
    match direction {
        Direction::Forward => {
            let mut bfs = Bfs::new(reference, NodeIndex::new(start));
            while let Some(n) = bfs.next(reference) {
                out.insert(n.index());
            }
        }
        Direction::Backward => {
            let reversed = Reversed(reference);
            let mut bfs = Bfs::new(reversed, NodeIndex::new(start));
            while let Some(n) = bfs.next(reversed) {
                out.insert(n.index());
            }
        }
    }
    out
}

fn assert_no_repeats(order: &[usize]) {
    let unique: BTreeSet<_> = order.iter().copied().collect();
    assert_eq!(unique.len(), order.len(), "traversal repeated a vertex: {order:?}");
}

#[test]
fn test_scenario_matches_reference() {
    let (graph, reference) = build(5, &[(0, 1), (0, 3), (1, 2), (1, 4), (4, 3)]);
    let order: Vec<_> = graph.bfs(0).unwrap().collect();
    assert_eq!(order, vec![0, 1, 3, 2, 4]);
    assert_eq!(order.iter().copied().collect::<BTreeSet<_>>(), reachable(&reference, 0, Direction::Forward));
}

proptest! {
    #[test]
    fn test_traversals_cover_reference_closure(
        vertex_count in 1usize..48,
        raw in proptest::collection::vec((any::<u16>(), any::<u16>()), 0..160),
        start in any::<u16>(),
    ) {
        let arrows: Vec<_> = raw
            .iter()
            .map(|&(v, u)| (v as usize % vertex_count, u as usize % vertex_count))
            .collect();
        let start = start as usize % vertex_count;
        let (graph, reference) = build(vertex_count, &arrows);

        for direction in [Direction::Forward, Direction::Backward] {
            let expected = reachable(&reference, start, direction);
            for order in [Order::BreadthFirst, Order::DepthFirst] {
                let walk: Vec<_> = graph.traverse(start, direction, order).unwrap().collect();
                prop_assert_eq!(walk.first().copied(), Some(start));
                assert_no_repeats(&walk);
                prop_assert_eq!(walk.iter().copied().collect::<BTreeSet<_>>(), expected.clone());
            }
        }
    }

    #[test]
    fn test_bfs_yields_vertices_by_distance(
        vertex_count in 1usize..48,
        raw in proptest::collection::vec((any::<u16>(), any::<u16>()), 0..160),
    ) {
        let arrows: Vec<_> = raw
            .iter()
            .map(|&(v, u)| (v as usize % vertex_count, u as usize % vertex_count))
            .collect();
        let (graph, reference) = build(vertex_count, &arrows);
        let distances: HashMap<NodeIndex, usize> = dijkstra(&reference, NodeIndex::new(0), None, |_| 1usize);

        let levels: Vec<_> = graph
            .bfs(0)
            .unwrap()
            .map(|v| distances[&NodeIndex::new(v)])
            .collect();
        prop_assert!(levels.windows(2).all(|w| w[0] <= w[1]), "levels out of order: {:?}", levels);
    }
}
