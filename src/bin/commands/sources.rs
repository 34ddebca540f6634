use sdoh::lens::report::{render_rows, source_rows};
use sdoh::lens::utils::OutputFormat;
use sdoh::SdohConfig;

pub fn run(config: &SdohConfig, output_format: OutputFormat) {
    let service = super::open_stats(config);
    match service.list_sources() {
        Ok(sources) => println!("{}", render_rows(&source_rows(&sources), output_format)),
        Err(e) => {
            eprintln!("ERROR: unable to read data sources: {}", e);
            std::process::exit(1);
        }
    }
}
