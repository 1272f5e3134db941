//! Tests for chunk storage.

use std::collections::BTreeMap;

use super::*;
use crate::error::GraphError;

fn config(chunk_size: usize) -> GraphConfig {
    GraphConfig::default()
        .with_chunk_size(chunk_size)
        .with_initial_sibling_capacity(2)
}

fn run_of<C: Chunk>(chunk: &C, vertex: usize) -> Vec<(usize, u32)> {
    chunk.neighbors(vertex).collect()
}

#[test]
fn test_gap_chunk_keeps_runs_sorted() {
    let mut chunk = GapChunk::<u32>::with_base(0, &config(4));
    for &u in &[7, 3, 9, 1] {
        assert!(chunk.try_add_arrow(2, u, u as u32 * 10, false).unwrap());
    }
    assert_eq!(chunk.sibling_count(2), 4);
    assert_eq!(run_of(&chunk, 2), vec![(1, 10), (3, 30), (7, 70), (9, 90)]);
    assert_eq!(chunk.index_of(2, 7), Ok(2));
    assert_eq!(chunk.index_of(2, 5), Err(2));
    assert_eq!(chunk.index_of(2, 100), Err(4));
    chunk.check_layout().unwrap();
}

#[test]
fn test_duplicate_insert_is_noop_or_update() {
    let mut chunk = GapChunk::<u32>::with_base(0, &config(4));
    assert!(chunk.try_add_arrow(0, 1, 5, false).unwrap());
    assert!(!chunk.try_add_arrow(0, 1, 6, false).unwrap());
    assert_eq!(chunk.arrow_at(0, 0).unwrap(), 5);
    assert!(!chunk.try_add_arrow(0, 1, 6, true).unwrap());
    assert_eq!(chunk.arrow_at(0, 0).unwrap(), 6);
    assert_eq!(chunk.sibling_count(0), 1);
}

#[test]
fn test_mutations_on_both_sides_of_the_gap() {
    let mut chunk = GapChunk::<u32>::with_base(8, &config(8));
    // Fill every vertex so the gap must travel across populated runs.
    for v in 8..16 {
        for u in 0..3 {
            chunk.try_add_arrow(v, u * 4 + (v % 4), (v * 100 + u) as u32, false).unwrap();
        }
    }
    assert_eq!(chunk.used(), 24);

    // After the gap owner (15), then before it.
    chunk.try_add_arrow(11, 50, 1, false).unwrap();
    assert_eq!(chunk.gap_vertex(), 11);
    chunk.try_add_arrow(14, 51, 2, false).unwrap();
    assert_eq!(chunk.gap_vertex(), 14);
    chunk.try_add_arrow(9, 52, 3, false).unwrap();
    assert_eq!(chunk.gap_vertex(), 9);
    assert!(chunk.try_remove_arrow(14, 51));
    assert!(chunk.try_remove_arrow(11, 50));
    assert!(!chunk.try_remove_arrow(11, 50));

    for v in 8..16 {
        let run = run_of(&chunk, v);
        let expected_len = if v == 9 { 4 } else { 3 };
        assert_eq!(run.len(), expected_len, "vertex {v}");
        for (u, d) in run {
            if u == 52 {
                assert_eq!(d, 3);
            } else {
                assert_eq!(d, (v * 100 + (u - v % 4) / 4) as u32);
            }
        }
    }
    chunk.check_layout().unwrap();
}

#[test]
fn test_repeated_grows_preserve_payloads() {
    let mut chunk = GapChunk::<u32>::with_base(0, &config(4));
    let mut capacities = Vec::new();
    for i in 0..64usize {
        let v = i % 4;
        chunk.try_add_arrow(v, i, (i as u32) ^ 0xABCD, false).unwrap();
        if capacities.last() != Some(&chunk.capacity()) {
            capacities.push(chunk.capacity());
        }
    }
    assert!(capacities.len() >= 3, "expected several grows, saw {capacities:?}");
    for v in 0..4 {
        for (u, d) in chunk.neighbors(v) {
            assert_eq!(u % 4, v);
            assert_eq!(d, (u as u32) ^ 0xABCD);
        }
        assert_eq!(chunk.sibling_count(v), 16);
    }
    chunk.check_layout().unwrap();
}

#[test]
fn test_remove_at_and_remove_all() {
    let mut chunk = GapChunk::<u32>::with_base(0, &config(4));
    for u in 0..5 {
        chunk.try_add_arrow(1, u, 0, false).unwrap();
        chunk.try_add_arrow(3, u, 0, false).unwrap();
    }
    assert_eq!(chunk.remove_arrow_at(1, 2).unwrap(), 2);
    assert!(matches!(
        chunk.remove_arrow_at(1, 4),
        Err(GraphError::SiblingOutOfRange { vertex: 1, position: 4, count: 4 })
    ));
    let free_before = chunk.free();
    assert_eq!(chunk.remove_all_arrows(3), 5);
    assert_eq!(chunk.free(), free_before + 5);
    assert_eq!(chunk.sibling_count(3), 0);
    assert_eq!(chunk.remove_all_arrows(3), 0);
    assert_eq!(run_of(&chunk, 1).iter().map(|p| p.0).collect::<Vec<_>>(), vec![0, 1, 3, 4]);
    chunk.check_layout().unwrap();
}

#[test]
fn test_matches_model_under_mixed_operations() {
    let mut chunk = GapChunk::<u32>::with_base(0, &config(8));
    let mut model: BTreeMap<(usize, usize), u32> = BTreeMap::new();
    // Deterministic pseudo-random sequence.
    let mut state = 0x2545_F491u64;
    for step in 0..2_000u32 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let v = (state % 8) as usize;
        let u = ((state >> 8) % 24) as usize;
        if (state >> 20) % 3 == 0 {
            assert_eq!(chunk.try_remove_arrow(v, u), model.remove(&(v, u)).is_some());
        } else {
            let inserted = chunk.try_add_arrow(v, u, step, true).unwrap();
            assert_eq!(inserted, model.insert((v, u), step).is_none());
        }
    }
    chunk.check_layout().unwrap();
    for v in 0..8 {
        let expected: Vec<_> = model.range((v, 0)..(v + 1, 0)).map(|(&(_, u), &d)| (u, d)).collect();
        assert_eq!(run_of(&chunk, v), expected);
    }
}

#[test]
fn test_take_and_put_vertex_shift_slots() {
    let mut chunk = GapChunk::<u32>::with_base(0, &config(4));
    for v in 0..4 {
        chunk.set_vertex_data(v, v as u32 + 100).unwrap();
        for u in 0..=v {
            chunk.try_add_arrow(v, u + 10 * v, 1, false).unwrap();
        }
    }

    let evicted = chunk.put_vertex(1, VertexSlot {
        data: 7,
        siblings: vec![42],
        arrows: vec![9],
    });
    assert_eq!(evicted.data, 103);
    assert_eq!(evicted.siblings, vec![30, 31, 32, 33]);
    assert_eq!(chunk.vertex_data(1), 7);
    assert_eq!(run_of(&chunk, 1), vec![(42, 9)]);
    assert_eq!(chunk.vertex_data(2), 101);
    assert_eq!(run_of(&chunk, 2), vec![(10, 1), (11, 1)]);
    assert_eq!(chunk.vertex_data(3), 102);
    chunk.check_layout().unwrap();

    let taken = chunk.take_vertex(0);
    assert_eq!(taken.siblings, vec![0]);
    assert_eq!(chunk.vertex_data(0), 7);
    assert_eq!(run_of(&chunk, 2).len(), 3);
    assert_eq!(chunk.sibling_count(3), 0);
    assert_eq!(chunk.vertex_data(3), 0);
    chunk.check_layout().unwrap();
}

#[test]
fn test_renumber_preserves_order() {
    let mut chunk = GapChunk::<u32>::with_base(0, &config(2));
    for u in [1, 4, 6] {
        chunk.try_add_arrow(0, u, 0, false).unwrap();
        chunk.try_add_arrow(1, u, 0, false).unwrap();
    }
    chunk.remove_arrow_at(0, 0).unwrap(); // leave the gap mid-chunk
    chunk.renumber(|x| if x >= 4 { x + 1 } else { x });
    assert_eq!(chunk.neighbors(0).targets().collect::<Vec<_>>(), vec![5, 7]);
    assert_eq!(chunk.neighbors(1).targets().collect::<Vec<_>>(), vec![1, 5, 7]);
    chunk.check_layout().unwrap();
}

#[test]
fn test_compact_chunk_rejects_wide_values() {
    let mut chunk = GapChunk::<u16>::with_base(0, &config(4));
    assert!(matches!(
        chunk.try_add_arrow(0, 1, 70_000, false),
        Err(GraphError::PayloadTooWide { value: 70_000, max: 65_535 })
    ));
    assert!(matches!(
        chunk.try_add_arrow(0, 65_535, 0, false),
        Err(GraphError::CapacityExceeded { what: "vertex index", .. })
    ));
    assert_eq!(chunk.used(), 0);
    assert!(chunk.set_vertex_data(0, 65_535).is_ok());
    assert!(chunk.set_vertex_data(0, 65_536).is_err());
}

#[test]
fn test_gap_chunk_enforces_optional_arity() {
    let mut chunk = GapChunk::<u32>::with_base(0, &config(4).with_max_arity(Some(2)));
    chunk.try_add_arrow(0, 1, 0, false).unwrap();
    chunk.try_add_arrow(0, 2, 0, false).unwrap();
    assert!(matches!(
        chunk.try_add_arrow(0, 3, 0, false),
        Err(GraphError::CapacityExceeded { what: "arity", limit: 2, requested: 3 })
    ));
    // Updating an existing arrow does not count against the arity.
    assert!(!chunk.try_add_arrow(0, 2, 5, true).unwrap());
}

#[test]
fn test_fixed_chunk_basic_operations() {
    let mut chunk = FixedChunk::<u32>::with_base(4, &config(4).with_max_arity(Some(3)));
    assert_eq!(chunk.arity(), 3);
    for u in [9, 2, 5] {
        assert!(chunk.try_add_arrow(6, u, u as u32, false).unwrap());
    }
    assert!(chunk.try_add_arrow(6, 1, 0, false).is_err());
    assert_eq!(run_of(&chunk, 6), vec![(2, 2), (5, 5), (9, 9)]);
    assert_eq!(chunk.remove_arrow_at(6, 1).unwrap(), 5);
    assert!(chunk.try_remove_arrow(6, 9));
    assert_eq!(chunk.sibling_count(6), 1);

    chunk.try_add_arrow(7, 1, 11, false).unwrap();
    let evicted = chunk.put_vertex(4, VertexSlot::vacant(3));
    assert_eq!(evicted.siblings, vec![1]);
    assert_eq!(chunk.vertex_data(4), 3);
    assert_eq!(run_of(&chunk, 7), vec![(2, 2)]);
    let taken = chunk.take_vertex(4);
    assert_eq!(taken.data, 3);
    assert_eq!(run_of(&chunk, 6), vec![(2, 2)]);

    let stats = chunk.stats();
    assert_eq!(stats.capacity, 12);
    assert_eq!(stats.used, 1);
    chunk.check_layout().unwrap();
}
