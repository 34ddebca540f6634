use clap::{Args, Subcommand};
use sdoh::fetch::{FetchClient, PlacesQuery, SviQuery, DEFAULT_MEASURES, EXTENDED_MEASURES};
use sdoh::lens::report::{delta_rows, last_updated_rows, render_rows};
use sdoh::lens::utils::OutputFormat;
use sdoh::{LoadSummary, RawPayload, SdohConfig, SdohLoader, SdohError};
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the Load command
#[derive(Args)]
pub struct LoadArgs {
    #[clap(subcommand)]
    pub command: LoadCommands,
}

/// Load subcommands
#[derive(Subcommand)]
pub enum LoadCommands {
    /// Load SVI tracts; reads --json or --csv when given, otherwise queries the SVI API
    Svi {
        /// ArcGIS JSON response saved to disk
        #[clap(long)]
        json: Option<PathBuf>,

        /// CSV file with SVI columns
        #[clap(long)]
        csv: Option<PathBuf>,

        /// Two-digit state FIPS code, e.g. 01
        #[clap(long)]
        state: Option<String>,

        /// Five-digit county FIPS code, e.g. 01001
        #[clap(long)]
        county: Option<String>,

        /// Maximum number of records to request
        #[clap(long)]
        limit: Option<u32>,
    },

    /// Load PLACES measures; reads --json or --csv when given, otherwise queries the PLACES API
    Places {
        /// Socrata JSON response saved to disk
        #[clap(long)]
        json: Option<PathBuf>,

        /// CSV file with PLACES columns
        #[clap(long)]
        csv: Option<PathBuf>,

        /// Two-letter state abbreviation, e.g. AL
        #[clap(long)]
        state_abbr: Option<String>,

        /// County FIPS prefix for location ids
        #[clap(long)]
        county: Option<String>,

        /// Measure id to request, repeatable (default: CSMOKING, BPHIGH, DEPRESSION, OBESITY, DIABETES)
        #[clap(long = "measure")]
        measures: Vec<String>,

        /// Maximum number of records to request
        #[clap(long)]
        limit: Option<u32>,
    },

    /// Load SVI and the extended PLACES measure set for one state
    All {
        /// Two-digit state FIPS code, e.g. 01
        #[clap(long)]
        state_fips: String,

        /// Two-letter state abbreviation, e.g. AL
        #[clap(long)]
        state_abbr: String,
    },
}

#[derive(Debug, Serialize)]
struct LoadResult {
    table: &'static str,
    #[serde(flatten)]
    summary: LoadSummary,
}

pub fn run(config: &SdohConfig, args: LoadArgs, output_format: OutputFormat) {
    let loader = super::open_loader(config);
    let client = FetchClient::new(config.request_timeout());

    match args.command {
        LoadCommands::Svi {
            json,
            csv,
            state,
            county,
            limit,
        } => {
            let payload = local_payload(json, csv).unwrap_or_else(|| {
                client.fetch_svi(&SviQuery {
                    state_fips: state,
                    county_fips: county,
                    limit: Some(limit.unwrap_or(config.svi_record_limit)),
                    all_fields: false,
                })
            });
            let result = payload.and_then(|p| loader.load_svi(&p));
            report("svi_data", result, output_format);
        }
        LoadCommands::Places {
            json,
            csv,
            state_abbr,
            county,
            measures,
            limit,
        } => {
            let measures = if measures.is_empty() {
                DEFAULT_MEASURES.iter().map(|m| m.to_string()).collect()
            } else {
                measures
            };
            let payload = local_payload(json, csv).unwrap_or_else(|| {
                client.fetch_places(&PlacesQuery {
                    state_abbr,
                    county_fips: county,
                    measures,
                    limit: limit.unwrap_or(config.places_record_limit),
                })
            });
            let result = payload.and_then(|p| loader.load_places(&p));
            report("places_data", result, output_format);
        }
        LoadCommands::All {
            state_fips,
            state_abbr,
        } => run_all(
            config,
            &loader,
            &client,
            &state_fips,
            &state_abbr,
            output_format,
        ),
    }
}

/// Payload from local files, `None` when neither file was given
fn local_payload(
    json: Option<PathBuf>,
    csv: Option<PathBuf>,
) -> Option<Result<RawPayload, SdohError>> {
    if json.is_none() && csv.is_none() {
        return None;
    }
    Some(RawPayload::from_files(json.as_deref(), csv.as_deref()))
}

fn report(table: &'static str, result: Result<LoadSummary, SdohError>, format: OutputFormat) {
    match result {
        Ok(summary) => {
            if format.is_json() {
                super::print_json(&LoadResult { table, summary }, format);
            } else {
                println!("Loaded {} rows into {}", summary.rows_affected, table);
            }
        }
        Err(e) => {
            eprintln!("ERROR: failed to load {}: {}", table, e);
            std::process::exit(1);
        }
    }
}

fn run_all(
    config: &SdohConfig,
    loader: &SdohLoader,
    client: &FetchClient,
    state_fips: &str,
    state_abbr: &str,
    format: OutputFormat,
) {
    let before = match loader.get_stats() {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let svi_query = SviQuery {
        state_fips: Some(state_fips.to_string()),
        limit: Some(config.svi_record_limit),
        ..Default::default()
    };
    match client
        .fetch_svi(&svi_query)
        .and_then(|p| loader.load_svi(&p))
    {
        Ok(summary) => println!("SVI: loaded {} rows", summary.rows_affected),
        Err(e) => eprintln!("Error loading SVI data: {}", e),
    }

    let places_query = PlacesQuery {
        state_abbr: Some(state_abbr.to_string()),
        county_fips: None,
        measures: EXTENDED_MEASURES.iter().map(|m| m.to_string()).collect(),
        limit: config.places_record_limit,
    };
    match client
        .fetch_places(&places_query)
        .and_then(|p| loader.load_places(&p))
    {
        Ok(summary) => println!("PLACES: loaded {} rows", summary.rows_affected),
        Err(e) => eprintln!("Error loading PLACES data: {}", e),
    }

    let after = match loader.get_stats() {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let deltas = delta_rows(&before, &after);
    if format.is_json() {
        super::print_json(&deltas, format);
    } else {
        println!("\nFinal Database Statistics");
        println!("{}", render_rows(&deltas, format));
        println!("\nLast Updated Times");
        println!("{}", render_rows(&last_updated_rows(&after), format));
    }
}
