use clap::{Args, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use sdoh::fetch::{
    pull_all_states, FetchClient, PullProgress, PullProgressCallback, STATE_FIPS_CODES,
};
use sdoh::lens::utils::OutputFormat;
use sdoh::SdohConfig;
use std::sync::Arc;
use std::time::Duration;

/// Arguments for the Pull command
#[derive(Args)]
pub struct PullArgs {
    #[clap(subcommand)]
    pub command: PullCommands,
}

#[derive(Subcommand)]
pub enum PullCommands {
    /// Fetch and load every census tract, state by state
    Svi {
        /// Seconds to wait between state requests (default from config)
        #[clap(long)]
        delay: Option<u64>,

        /// Only pull these state FIPS codes, comma separated
        #[clap(long, value_delimiter = ',')]
        states: Vec<String>,
    },
}

pub fn run(config: &SdohConfig, args: PullArgs, output_format: OutputFormat) {
    match args.command {
        PullCommands::Svi { delay, states } => {
            run_svi(config, delay, states, output_format);
        }
    }
}

fn run_svi(config: &SdohConfig, delay: Option<u64>, states: Vec<String>, format: OutputFormat) {
    let loader = super::open_loader(config);
    let client = FetchClient::new(config.request_timeout());
    let delay = delay
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.request_delay());

    let selected: Vec<&str> = if states.is_empty() {
        STATE_FIPS_CODES.to_vec()
    } else {
        states.iter().map(String::as_str).collect()
    };

    let pb = ProgressBar::new(selected.len() as u64);
    if let Ok(sty) = ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}/{len:3} {msg}",
    ) {
        pb.set_style(sty.progress_chars("##-"));
    }

    let bar = pb.clone();
    let callback: PullProgressCallback = Arc::new(move |progress: PullProgress| match progress {
        PullProgress::StateLoaded {
            state_fips,
            records,
        } => {
            bar.set_message(format!("state {}: {} tracts", state_fips, records));
            bar.inc(1);
        }
        PullProgress::StateFailed { state_fips, .. } => {
            bar.set_message(format!("state {}: failed", state_fips));
            bar.inc(1);
        }
        PullProgress::Started { .. } | PullProgress::Completed { .. } => {}
    });

    let summary = pull_all_states(&client, &loader, &selected, delay, Some(callback));
    pb.finish_and_clear();

    if format.is_json() {
        super::print_json(&summary, format);
        return;
    }

    println!(
        "Completed SVI data pull. Total records added: {}",
        summary.total_records
    );
    println!("States loaded: {}", summary.states_loaded);
    for (state, error) in &summary.failed_states {
        println!("  state {} failed: {}", state, error);
    }

    match loader.get_stats() {
        Ok(stats) => {
            println!("\nFinal Database Statistics:");
            println!("  svi_data_count: {}", stats.svi_data_count);
            println!("  places_data_count: {}", stats.places_data_count);
        }
        Err(e) => eprintln!("Error reading stats: {}", e),
    }
}
