use salary_norm::{init_logger, Pipeline};

fn main() {
    init_logger(log::LevelFilter::Info);
    let mut pipeline = Pipeline::default();
    pipeline.load_jobs();
    pipeline.list_jobs();

    println!();
    if let Some(stats) = pipeline.stats() {
        println!("{:>12} {}", "All", stats);
    }
    for (level, stats) in pipeline.stats_by_level() {
        println!("{:>12} {}", level, stats);
    }
}
