//! Composing continuations on a task with the chaining API.
//!
//! Each attachment is an independent subscription; a single completion
//! triggers every attached handler exactly once, in attachment order, on
//! the completing thread.

use std::thread;
use std::time::Duration;

use signals::Task;

fn main() {
    println!("=== Task Chaining Example ===");

    let (task, completion) = Task::new();

    let task = task
        .on_success(|value| println!("success handler saw {value}"))
        .on_failure(|failure| println!("failure handler saw {failure}"))
        .on_finally(|| println!("finally handler ran"));

    let producer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        // The three handlers above run on this thread, in order; the
        // failure handler is skipped because the outcome is a success.
        completion.complete_with_value("pipeline output".to_string());
    });

    producer.join().expect("producer thread must not panic");
    assert!(task.is_completed());

    // Handlers attached after completion run immediately, right here.
    let _task = task.on_finally(|| println!("late finally ran inline"));

    println!("Example completed successfully!");
}
