//! Basic binmap usage example

use binmap::{LocalMap, LockFreeMap, MapConfig, MutexMap};
use std::thread;

fn main() {
    println!("binmap Basic Usage Example");
    println!("==========================");

    // An 8-bit key space split into 3-bit groups walks 3 levels per key.
    let config = MapConfig::new(3, 8).expect("valid shape");
    let map: LockFreeMap<u8, u32> = LockFreeMap::with_config(config).expect("key fits u8");
    println!("Shape: fanout {}, depth {}", config.fanout(), config.depth());

    map.insert(5, 50);
    map.insert(13, 130);
    println!("  get(5)  = {:?}", map.get(5));
    println!("  get(13) = {:?}", map.get(13));
    println!("  get(21) = {:?}", map.get(21));
    println!("  stats   = {:?}", map.stats());

    // Many threads growing one map.
    println!("\nLock-free map, 4 writer threads:");
    let shared: LockFreeMap<u64, u64> = LockFreeMap::new();
    thread::scope(|s| {
        for t in 0..4u64 {
            let shared = &shared;
            s.spawn(move || {
                for k in 0..10_000u64 {
                    let key = k * 4 + t;
                    shared.insert(key << 20, key);
                }
            });
        }
    });
    let stats = shared.stats();
    println!("  nodes published: {}", stats.nodes);
    println!("  lost install races: {}", stats.discarded);
    println!("  get(7 << 20) = {:?}", shared.get(7 << 20));

    // The mutex map locks a node only while installing a missing child.
    println!("\nMutex map used as a set of counters:");
    let counters: MutexMap<u32, u64> = MutexMap::new();
    thread::scope(|s| {
        for _ in 0..4 {
            let counters = &counters;
            s.spawn(move || {
                for k in 0..1_000u32 {
                    counters.query(k % 3).fetch_add(1);
                }
            });
        }
    });
    for k in 0..3 {
        println!("  counter {k} = {:?}", counters.get(k));
    }

    // Exclusive access needs no synchronization at all, and any value type works.
    println!("\nLocal map:");
    let mut local: LocalMap<u16, Vec<u16>> = LocalMap::with_branch_bits(4).expect("valid width");
    for k in 0..100u16 {
        local.query(k % 10).push(k);
    }
    println!("  bucket 3 = {:?}", local.get(3));
    println!("  nodes    = {}", local.count_nodes());

    match LockFreeMap::<u8, u8>::with_config(MapConfig::default()) {
        Ok(_) => println!("\nunexpected: 64-bit shape accepted for u8 keys"),
        Err(err) => println!("\nRejected shape: {err}"),
    }
}
