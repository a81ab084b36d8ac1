//! Walkthrough of every container in the crate.
//!
//! Run with `RUST_LOG=debug` to see arena spills, sparse promotions and
//! stack growth as they happen.

use hotpath_containers::{
    AppendVec, FastStack, Indexed, MemError, ObjectPool, PoolManager, PtrList, ShortVec,
    SparseVec,
};

fn main() -> Result<(), MemError> {
    env_logger::init();

    // Short sequences stay in the inline arena until they outgrow it
    let mut digits = ShortVec::<u8, 16>::new();
    digits.extend(0..16);
    println!("16 digits inline: {}", digits.is_inline());
    digits.push(16);
    println!("17 digits inline: {}", digits.is_inline());

    // Pool objects keep their address; freeing relinks neighbours
    let mut pool = ObjectPool::<&str, 4>::new();
    let _a = pool.new_object("alpha")?;
    let b = pool.new_object("beta")?;
    let _c = pool.new_object("gamma")?;
    pool.free(b)?;
    println!("live objects: {:?}", pool);
    if let Err(err) = pool.free(b) {
        println!("second free rejected: {err}");
    }

    // Pools checked out in a scope go back to the manager
    let manager = PoolManager::<u64, 32>::with_capacity(2);
    for frame in 0..3 {
        let mut work = manager.scoped();
        for i in 0..100 {
            work.new_object(frame * 1000 + i)?;
        }
        println!("frame {frame}: {} objects in {} chunks", work.len(), work.chunk_count());
    }
    println!("resident pools: {}", manager.resident());

    // Small index sets stay linear, larger ones are promoted once
    let mut hits = SparseVec::<Indexed<u32>, 4>::new();
    for index in [3, 9, 3, 27, 81, 3, 243] {
        hits.find_or_add(index).value += 1;
    }
    println!("promoted: {}, hits on 3: {}", hits.is_promoted(), hits[3].value);

    let names = [String::from("x"), String::from("x")];
    let mut members = PtrList::<String>::new();
    members.insert(&names[0]);
    members.insert(&names[1]);
    println!("distinct objects with equal values: {}", members.len());

    // Concurrent appends report positions, not references
    let events = AppendVec::new();
    std::thread::scope(|s| {
        for worker in 0..4 {
            let events = &events;
            s.spawn(move || events.emplace_back(worker));
        }
    });
    println!("events appended: {}", events.len());

    let mut stack = FastStack::with_capacity(2);
    stack.push2(1, 2);
    stack.push(3);
    while let Some(top) = stack.pop() {
        print!("{top} ");
    }
    println!();

    Ok(())
}
