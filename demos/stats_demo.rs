use clap::Parser;
use probe_table::ProbingTable;

#[derive(Parser, Debug)]
struct Args {
    /// Number of distinct keys to insert.
    #[arg(short = 'n', long = "keys", default_value_t = 1000)]
    keys: usize,

    /// Insert/remove cycles of fresh keys to run after filling the table.
    #[arg(short = 'c', long = "churn", default_value_t = 0)]
    churn: usize,
}

fn main() {
    let args = Args::parse();

    let mut table: ProbingTable<usize> = ProbingTable::new();
    println!("Inserting {} keys...", args.keys);
    for i in 0..args.keys {
        if let Err(err) = table.insert(format!("user{i}"), i) {
            eprintln!("insert of user{i} failed: {err}");
            return;
        }
    }

    println!(
        "Capacity after fill: {} ({} live)",
        table.capacity(),
        table.len()
    );
    table.probe_histogram().print();
    table.probe_stats().print();

    if args.churn == 0 {
        return;
    }

    println!();
    println!("Running {} insert/remove cycles...", args.churn);
    let mut resizes = 0;
    for i in 0..args.churn {
        let capacity = table.capacity();
        let key = format!("churn{i}");
        if let Err(err) = table.insert(key.as_str(), i) {
            eprintln!("insert of {key} failed: {err}");
            return;
        }
        table.remove(&key);
        if table.capacity() != capacity {
            resizes += 1;
        }
    }

    println!(
        "Capacity after churn: {} ({} live, {} resizes)",
        table.capacity(),
        table.len(),
        resizes
    );
    table.probe_histogram().print();
    table.probe_stats().print();
}
