use clap::Args;
use sdoh::config::{format_size, get_store_info, StoreInfo};
use sdoh::lens::utils::OutputFormat;
use sdoh::SdohConfig;
use serde::Serialize;

/// Arguments for the Config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Also list the files in the data directory
    #[clap(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Serialize)]
struct ConfigInfo {
    config_file: String,
    data_dir: String,
    request_delay_secs: u64,
    request_timeout_secs: u64,
    svi_record_limit: u32,
    places_record_limit: u32,
    store: StoreInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<Vec<FileInfo>>,
}

#[derive(Debug, Serialize)]
struct FileInfo {
    name: String,
    size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
}

pub fn run(config: &SdohConfig, args: ConfigArgs, output_format: OutputFormat) {
    let ConfigArgs { verbose } = args;

    let files = if verbose {
        let mut file_list = Vec::new();
        if let Ok(entries) = std::fs::read_dir(&config.data_dir) {
            for entry in entries.flatten() {
                if let Ok(metadata) = entry.metadata() {
                    if metadata.is_file() {
                        let modified = metadata.modified().ok().map(|t| {
                            let datetime: chrono::DateTime<chrono::Utc> = t.into();
                            datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string()
                        });
                        file_list.push(FileInfo {
                            name: entry.file_name().to_string_lossy().to_string(),
                            size_bytes: metadata.len(),
                            modified,
                        });
                    }
                }
            }
        }
        file_list.sort_by(|a, b| a.name.cmp(&b.name));
        Some(file_list)
    } else {
        None
    };

    let info = ConfigInfo {
        config_file: config.config_file.clone(),
        data_dir: config.data_dir.clone(),
        request_delay_secs: config.request_delay_secs,
        request_timeout_secs: config.request_timeout_secs,
        svi_record_limit: config.svi_record_limit,
        places_record_limit: config.places_record_limit,
        store: get_store_info(config),
        files,
    };

    if output_format.is_json() {
        super::print_json(&info, output_format);
    } else {
        print_config_table(config, &info);
    }
}

fn print_config_table(config: &SdohConfig, info: &ConfigInfo) {
    println!("sdoh Configuration");
    println!("==================\n");

    println!("Config file:        {}", info.config_file);
    println!("{}", config.summary());
    println!();

    println!("SQLite Store:");
    println!("  Path:           {}", info.store.path);
    if let Some(size) = info.store.size_bytes {
        println!("  Size:           {}", format_size(size));
    }
    println!("  Schema:         {}", info.store.schema);
    if !info.store.missing_tables.is_empty() {
        println!("  Missing tables: {}", info.store.missing_tables.join(", "));
    }

    if let Some(files) = &info.files {
        println!();
        println!("Files:");
        for f in files {
            println!(
                "  {:<32} {:>10}  {}",
                f.name,
                format_size(f.size_bytes),
                f.modified.as_deref().unwrap_or("")
            );
        }
    }
}
