use salary_norm::{init_logger, Config, Pipeline, RngDraw, SalaryEngine};
use tiny_bail::prelude::*;

fn main() {
    init_logger(log::LevelFilter::Info);
    let config = r!(Config::load(Config::FILE_PATH));
    let engine = r!(SalaryEngine::new(config));
    let mut pipeline = Pipeline::new(engine);
    pipeline.load_jobs();
    pipeline.reparse_jobs(&mut RngDraw::thread());
    pipeline.save_jobs();
}
