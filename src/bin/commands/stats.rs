use sdoh::lens::report::render_stats;
use sdoh::lens::utils::OutputFormat;
use sdoh::SdohConfig;

pub fn run(config: &SdohConfig, output_format: OutputFormat) {
    let service = super::open_stats(config);
    match service.get_stats() {
        Ok(stats) => println!("{}", render_stats(&stats, output_format)),
        Err(e) => {
            eprintln!("ERROR: unable to read stats: {}", e);
            std::process::exit(1);
        }
    }
}
