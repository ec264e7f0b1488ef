//! Producer/consumer rendezvous through a manual-reset event.
//!
//! One producer publishes a value and then sets the event; consumers that
//! registered before the set are resumed by the producer's thread, and
//! consumers arriving after it resume inline.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use signals::ManualResetEvent;

fn main() {
    println!("=== Manual-Reset Event Example ===");

    let event = Arc::new(ManualResetEvent::new(false));
    let published = Arc::new(AtomicU64::new(0));

    // Consumers register before the value exists; each continuation reads
    // the published value once the event signals it is safe to do so.
    for consumer in 1..=3 {
        let published = Arc::clone(&published);
        let suspended = event.register_waiter(move || {
            let value = published.load(Ordering::Acquire);
            println!("consumer {consumer} observed {value}");
        });
        println!("consumer {consumer} suspended: {suspended}");
    }

    let producer = {
        let event = Arc::clone(&event);
        let published = Arc::clone(&published);
        thread::spawn(move || {
            // Publish the data first, then broadcast the signal. The three
            // continuations above run right here, on the producer's thread.
            thread::sleep(Duration::from_millis(50));
            published.store(42, Ordering::Release);
            event.set();
        })
    };

    producer.join().expect("producer thread must not panic");

    // The event stays set, so a late arrival does not suspend at all.
    let suspended = event.register_waiter(|| println!("late consumer resumed inline"));
    println!("late consumer suspended: {suspended}");

    println!("Example completed successfully!");
}
