use clap::Args;
use sdoh::lens::report::render_location;
use sdoh::lens::utils::OutputFormat;
use sdoh::SdohConfig;

/// Arguments for the Query command
#[derive(Args)]
pub struct QueryArgs {
    /// Location id: an 11-digit tract FIPS or a 5-digit county FIPS
    #[clap(value_name = "LOCATION_ID")]
    pub location_id: String,

    /// Location type as stored in PLACES: tract or county
    #[clap(short = 't', long, default_value = "tract")]
    pub location_type: String,
}

pub fn run(config: &SdohConfig, args: QueryArgs, output_format: OutputFormat) {
    let QueryArgs {
        location_id,
        location_type,
    } = args;

    let loader = super::open_loader(config);
    match loader.query_location(&location_id, &location_type) {
        Ok(data) => println!("{}", render_location(&data, output_format)),
        Err(e) => {
            eprintln!("ERROR: query failed: {}", e);
            std::process::exit(1);
        }
    }
}
