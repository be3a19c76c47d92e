//! Basic usage example for blockheap
//!
//! This example demonstrates the fundamental operations:
//! - Opening a queue backed by a file
//! - Enqueueing 1024 integers
//! - Dequeueing them in descending order into a text file

use blockheap::{Options, PriorityQueue};
use std::fs::File;
use std::io::{BufWriter, Write};

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    // 256 items per block forces a few splits and compactions
    let options = Options::new().capacity(256).truncate(true);
    let mut queue = PriorityQueue::open("./example_queue.dat", options)?;

    println!("Queue opened with {} items per block", queue.capacity());

    for item in 0..1024 {
        queue.enqueue(item)?;
    }
    println!("Enqueued {} items into {} blocks", queue.len(), queue.block_count());

    let mut out = BufWriter::new(File::create("./out.txt")?);
    for item in queue.drain() {
        writeln!(out, "{}", item?)?;
    }
    out.flush()?;
    println!("Wrote dequeued items to ./out.txt");

    let stats = queue.cache_stats();
    println!(
        "Cache: {} activations, {} loads, {} flushes ({:.1}% hits)",
        stats.activations,
        stats.loads,
        stats.flushes,
        stats.hit_rate() * 100.0
    );

    queue.close()?;
    println!("Queue closed");

    Ok(())
}
