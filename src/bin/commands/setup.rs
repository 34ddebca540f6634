use clap::Args;
use sdoh::config::get_store_info;
use sdoh::lens::utils::OutputFormat;
use sdoh::{reset_schema, SdohConfig};

/// Arguments for the Setup command
#[derive(Args)]
pub struct SetupArgs {
    /// Keep existing tables and rows instead of dropping them first
    #[clap(long)]
    pub keep_existing: bool,
}

pub fn run(config: &SdohConfig, args: SetupArgs, output_format: OutputFormat) {
    let SetupArgs { keep_existing } = args;
    let path = config.store_path();

    if let Err(e) = reset_schema(&path, !keep_existing) {
        eprintln!("ERROR: failed to set up database: {}", e);
        std::process::exit(1);
    }

    let info = get_store_info(config);
    if output_format.is_json() {
        super::print_json(&info, output_format);
    } else {
        println!("Database setup complete at: {}", info.path);
        println!("Schema: {}", info.schema);
    }
}
