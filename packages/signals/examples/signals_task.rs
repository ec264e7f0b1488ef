//! Spawning a task and retrieving its result, on both outcome paths.

use std::panic::{self, AssertUnwindSafe};

use signals::{Failure, Task};

fn main() {
    println!("=== Task Example ===");

    // The happy path: the producer runs on its own thread and the blocking
    // retrieval returns its value.
    let task = Task::spawn(|| {
        println!("producing on {:?}", std::thread::current().id());
        21 * 2
    });
    println!("got {}", task.get_result());

    // The failure path: a panic escaping the producer is captured at the
    // runtime boundary and re-raised at the point of retrieval.
    let task = Task::<i32>::spawn(|| panic!("the producer gave up"));

    let payload = panic::catch_unwind(AssertUnwindSafe(|| task.get_result()))
        .expect_err("retrieval re-raises the captured failure");
    let failure = Failure::from_panic(payload);
    println!("failed with: {failure}");

    println!("Example completed successfully!");
}
