use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use pilecheck::{Capacity, CheckConfig};

/// Rate foundation piles of an ETABS model against their capacities.
#[derive(Parser, Debug)]
#[command(name = "pilecheck", version, about)]
pub struct Args {
    /// JSON workbook holding the four exported sheets
    pub workbook: PathBuf,

    /// JSON check configuration (capacities, thresholds, cases)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON column schema overriding the ETABS header names
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Output case to envelope; repeat to select several, in priority order
    #[arg(long = "case")]
    pub cases: Vec<String>,

    /// Envelope every case present in the force table
    #[arg(long, conflicts_with = "cases")]
    pub all_cases: bool,

    /// Section capacity as SECTION=TENSION:COMPRESSION
    #[arg(long = "capacity", value_parser = parse_capacity)]
    pub capacities: Vec<(String, Capacity)>,

    /// Ratio at which a pile becomes a warning
    #[arg(long)]
    pub yellow: Option<f64>,

    /// Ratio at which a pile becomes overloaded
    #[arg(long)]
    pub red: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// List section labels and output cases, then exit
    #[arg(long)]
    pub list: bool,

    /// Log every stage
    #[arg(short, long)]
    pub verbose: bool,
}

/// How results are printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table sorted by ratio.
    Text,
    /// The full assessment as JSON.
    Json,
}

impl Args {
    /// Layer command-line values over a loaded configuration.
    pub fn apply_overrides(&self, config: &mut CheckConfig) {
        if !self.cases.is_empty() {
            config.selected_cases = self.cases.clone();
        }
        for (section, capacity) in &self.capacities {
            config.capacities.insert(section.clone(), *capacity);
        }
        if let Some(yellow) = self.yellow {
            config.yellow_threshold = yellow;
        }
        if let Some(red) = self.red {
            config.red_threshold = red;
        }
    }
}

/// Parse `SECTION=TENSION:COMPRESSION`.
fn parse_capacity(value: &str) -> Result<(String, Capacity), String> {
    let (section, limits) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected SECTION=TENSION:COMPRESSION, got `{value}`"))?;
    let (tension, compression) = limits
        .split_once(':')
        .ok_or_else(|| format!("expected TENSION:COMPRESSION after `=`, got `{limits}`"))?;
    let parse = |text: &str| {
        text.trim()
            .parse::<f64>()
            .map_err(|err| format!("invalid capacity `{text}`: {err}"))
    };
    Ok((
        section.trim().to_string(),
        Capacity::new(parse(tension)?, parse(compression)?),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_capacity_pairs() {
        let (section, capacity) = parse_capacity("P60=50:500").expect("valid capacity");
        assert_eq!(section, "P60");
        assert_eq!(capacity, Capacity::new(50.0, 500.0));
        assert!(parse_capacity("P60=50").is_err());
        assert!(parse_capacity("P60").is_err());
        assert!(parse_capacity("P60=a:1").is_err());
    }

    #[test]
    fn command_line_overrides_config() {
        let args = Args::parse_from([
            "pilecheck",
            "model.json",
            "--case",
            "ULS2",
            "--case",
            "ULS1",
            "--capacity",
            "P60=50:500",
            "--red",
            "1.1",
        ]);
        let mut config = CheckConfig::for_cases(["DL"]).with_capacity("P60", 10.0, 20.0);
        args.apply_overrides(&mut config);
        assert_eq!(config.selected_cases, ["ULS2", "ULS1"]);
        assert_eq!(config.capacities["P60"], Capacity::new(50.0, 500.0));
        assert_eq!(config.red_threshold, 1.1);
        assert_eq!(config.yellow_threshold, 0.9);
        assert_eq!(args.format, OutputFormat::Text);
    }
}
