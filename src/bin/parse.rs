use clap::Parser;
use salary_norm::{init_logger, Config, RngDraw, SalaryEngine};
use tiny_bail::prelude::*;

/// Parse one salary string and print the normalized figure.
#[derive(Parser, Debug)]
struct Args {
    /// The raw salary text, e.g. "20 - 30 triệu" or "Up to 2000 USD".
    #[arg(required = true)]
    salary: Vec<String>,
    /// A job title, used for an estimate if the text has no figure.
    #[arg(long)]
    title: Option<String>,
    /// A job level, used for an estimate if the text has no figure.
    #[arg(long)]
    level: Option<String>,
    /// Path to a RON config file.
    #[arg(long, default_value = Config::FILE_PATH)]
    config: String,
}

fn main() {
    init_logger(log::LevelFilter::Warn);
    let args = Args::parse();
    let config = r!(Config::load(&args.config));
    let engine = r!(SalaryEngine::new(config));

    let salary = args.salary.join(" ");
    let report = engine.evaluate(Some(&salary));
    println!("{}", report);

    // Only estimate when asked to, by giving a title or level.
    if engine.is_estimable(report.state) && (args.title.is_some() || args.level.is_some()) {
        let title = args.title.as_deref().unwrap_or_default();
        let estimate = engine.estimate(title, args.level.as_deref(), &mut RngDraw::thread());
        println!(
            "{} ({} band, x{})",
            estimate.label, estimate.level, estimate.multiplier,
        );
    }
}
