//! Lazy sequence pipelines: an infinite generator, a fold and a flat-map.

use sequences::Sequence;

fn fibonacci() -> Sequence<u64> {
    let mut state = (0_u64, 1_u64);
    Sequence::from_fn(move || {
        let value = state.0;
        state = (state.1, state.0 + state.1);
        Some(value)
    })
}

fn main() {
    println!("=== Sequences Example ===");

    // The generator is infinite; take() bounds what we actually pull.
    print!("fibonacci:");
    fibonacci().take(10).for_each(|value| print!(" {value}"));
    println!();

    // A terminal fold drives the pipeline to exhaustion.
    let factorial = Sequence::of(1..=5).fold(1_u64, |acc, i| acc * i);
    println!("5! = {factorial}");

    // Each value expands into its own sequence; the expansions are
    // flattened into one stream.
    Sequence::of([1, 2, 3, 4])
        .flat_map(|i| Sequence::of(0..i))
        .for_each(|value| {
            if value == 0 {
                println!();
            }
            print!("* ");
        });
    println!();

    println!("Example completed successfully!");
}
