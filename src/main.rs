use std::process;

fn main() {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();

    if let Err(e) = cub_tfrecord::run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
