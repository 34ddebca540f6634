//! Output format shared by every sdoh command
//!
//! [`OutputFormat`] owns the serialization choices: which JSON encoding a
//! variant means and which table style it draws with. Row-specific layouts
//! (PSV headers, section titles) live in `lens::report`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Rounded table (default)
    #[default]
    Table,
    Markdown,
    Json,
    JsonPretty,
    /// One JSON object per line
    JsonLine,
    /// Pipe-separated values with a header line
    Psv,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        Self::Table,
        Self::Markdown,
        Self::Json,
        Self::JsonPretty,
        Self::JsonLine,
        Self::Psv,
    ];

    /// Canonical name, as accepted by `--format`
    pub fn name(self) -> &'static str {
        self.aliases()[0]
    }

    /// Accepted spellings, canonical name first
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Table => &["table", "pretty"],
            Self::Markdown => &["markdown", "md"],
            Self::Json => &["json"],
            Self::JsonPretty => &["json-pretty", "jsonpretty"],
            Self::JsonLine => &["json-line", "jsonline", "jsonl", "ndjson"],
            Self::Psv => &["psv", "pipe"],
        }
    }

    pub fn is_json(self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty | Self::JsonLine)
    }

    /// Encode a single value; `None` for the non-JSON variants
    ///
    /// A single value under `json-line` is one compact line.
    pub fn to_json<T: Serialize + ?Sized>(
        self,
        value: &T,
    ) -> Result<Option<String>, serde_json::Error> {
        match self {
            Self::JsonPretty => serde_json::to_string_pretty(value).map(Some),
            Self::Json | Self::JsonLine => serde_json::to_string(value).map(Some),
            _ => Ok(None),
        }
    }

    /// Encode a list of rows; `json-line` writes each row on its own line
    pub fn rows_to_json<T: Serialize>(
        self,
        rows: &[T],
    ) -> Result<Option<String>, serde_json::Error> {
        match self {
            Self::JsonLine => rows
                .iter()
                .map(serde_json::to_string)
                .collect::<Result<Vec<_>, _>>()
                .map(|lines| Some(lines.join("\n"))),
            _ => self.to_json(rows),
        }
    }

    /// Draw rows as a table; `None` unless this is `table` or `markdown`
    #[cfg(feature = "display")]
    pub fn to_table<T: tabled::Tabled>(self, rows: impl IntoIterator<Item = T>) -> Option<String> {
        use tabled::settings::Style;

        match self {
            Self::Table => Some(tabled::Table::new(rows).with(Style::rounded()).to_string()),
            Self::Markdown => Some(tabled::Table::new(rows).with(Style::markdown()).to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.aliases().contains(&lower.as_str()))
            .ok_or_else(|| {
                format!(
                    "Unknown output format '{}'. Valid formats: {}",
                    s,
                    Self::ALL.map(OutputFormat::name).join(", ")
                )
            })
    }
}
