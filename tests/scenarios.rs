//! End-to-end usage across the crate's containers.

use std::sync::Arc;
use std::thread;

use hotpath_containers::{
    AppendVec, FastStack, Indexed, ObjectPool, PoolManager, PtrList, ShortVec, SparseVec,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_free_middle_of_three() {
    init_logging();

    let mut pool = ObjectPool::<u32, 4>::new();
    pool.new_object(42).unwrap();
    let seven = pool.new_object(7).unwrap();
    pool.new_object(13).unwrap();

    pool.free(seven).unwrap();

    assert_eq!(pool.iter().copied().collect::<Vec<_>>(), [42, 13]);
    assert_eq!(pool.len(), 2);
}

#[derive(Debug)]
struct Particle {
    id: u32,
    ttl: u8,
}

#[test]
fn test_frame_loop_recycles_pools() {
    init_logging();

    let manager = PoolManager::<Particle, 16>::with_capacity(2);
    let mut survivors = Vec::new();

    for frame in 0..10u32 {
        let mut particles = manager.scoped();
        for i in 0..40 {
            particles
                .new_object(Particle {
                    id: frame * 100 + i,
                    ttl: (i % 4) as u8,
                })
                .unwrap();
        }

        particles.for_each_mut(|p| p.ttl = p.ttl.saturating_sub(1));
        particles.retain(|p| p.ttl > 0);
        survivors.push(particles.len());
        assert!(particles.iter().all(|p| p.id / 100 == frame));

        // Chunks survive the round trip through the manager
        if frame > 0 {
            assert_eq!(particles.chunk_count(), 3);
        }
    }

    assert!(survivors.iter().all(|n| *n == 20));
    assert_eq!(manager.resident(), 1);
}

#[test]
fn test_adjacency_with_sparse_and_stack() {
    init_logging();

    // Depth-first walk over a small graph whose adjacency rows are sparse
    let mut edges = SparseVec::<Indexed<ShortVec<u32, 32>>, 4>::new();
    let links = [(0, 1), (0, 2), (1, 3), (2, 3), (3, 4), (4, 5), (5, 6), (6, 7)];
    for (from, to) in links {
        edges.find_or_add(from).value.push(to);
    }
    assert!(edges.is_promoted());

    let mut stack = FastStack::with_capacity(2);
    let mut seen = PtrList::<Indexed<ShortVec<u32, 32>>, 4>::new();
    let mut order = Vec::new();
    stack.push(0u32);

    while let Some(node) = stack.pop() {
        order.push(node);
        let Some(row) = edges.get(node) else {
            continue;
        };
        if !seen.insert(row) {
            continue;
        }
        for next in row.value.iter().rev() {
            stack.push(*next);
        }
    }

    assert_eq!(order.first(), Some(&0));
    assert!(order.contains(&7));
    assert_eq!(seen.len(), 7);
}

#[test]
fn test_concurrent_tags_are_unique() {
    init_logging();

    const THREADS: u64 = 6;
    let seq = Arc::new(AppendVec::new());

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let seq = Arc::clone(&seq);
            thread::spawn(move || seq.emplace_back((t << 32) | 0xabc))
        })
        .collect();
    let mut positions: Vec<usize> = workers.into_iter().map(|w| w.join().unwrap()).collect();

    positions.sort_unstable();
    assert_eq!(positions, (0..THREADS as usize).collect::<Vec<_>>());

    let mut tags = seq.lock().clone();
    tags.sort_unstable();
    tags.dedup();
    assert_eq!(tags.len(), THREADS as usize);
}
