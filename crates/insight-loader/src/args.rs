use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

pub const DEFAULT_CONCURRENCY: usize = 4;

pub const USAGE: &str = "\
Usage:
  insight-loader                          Score every id in DATA_FILE
  insight-loader --file PATH              Score every id in a CSV with a company_id column
  insight-loader --ids TCS INFY ...       Score specific companies

Options:
  --dry-run                Print insights as JSON without writing to the database
  --concurrency N          Max companies processed in parallel (default: 4)
  --scoring-config PATH    JSON file overriding scoring thresholds
  --help                   Show this message";

#[derive(Debug, Clone, PartialEq)]
pub struct LoaderArgs {
    pub file: Option<PathBuf>,
    pub ids: Vec<String>,
    pub concurrency: usize,
    pub scoring_config: Option<PathBuf>,
    pub dry_run: bool,
    pub help: bool,
}

impl LoaderArgs {
    /// Parse arguments, excluding the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let concurrency = match value_of(args, "--concurrency")? {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => bail!("--concurrency must be a positive number, got '{}'", raw),
            },
            None => DEFAULT_CONCURRENCY,
        };

        let ids = match args.iter().position(|a| a == "--ids") {
            Some(idx) => args[idx + 1..]
                .iter()
                .take_while(|a| !a.starts_with("--"))
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        Ok(Self {
            file: value_of(args, "--file")?.map(PathBuf::from),
            ids,
            concurrency,
            scoring_config: value_of(args, "--scoring-config")?.map(PathBuf::from),
            dry_run: args.iter().any(|a| a == "--dry-run"),
            help: args.iter().any(|a| a == "--help" || a == "-h"),
        })
    }
}

/// Value following `flag`, if the flag is present.
fn value_of<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a String>> {
    match args.iter().position(|a| a == flag) {
        Some(i) => args
            .get(i + 1)
            .filter(|v| !v.starts_with("--"))
            .map(Some)
            .ok_or_else(|| anyhow!("{} needs a value", flag)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<LoaderArgs> {
        let args: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        LoaderArgs::parse(&args)
    }

    #[test]
    fn test_defaults() {
        let args = parse("").unwrap();
        assert_eq!(args.file, None);
        assert!(args.ids.is_empty());
        assert_eq!(args.concurrency, DEFAULT_CONCURRENCY);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_ids_stop_at_next_flag() {
        let args = parse("--ids TCS INFY --dry-run --concurrency 8").unwrap();
        assert_eq!(args.ids, vec!["TCS", "INFY"]);
        assert!(args.dry_run);
        assert_eq!(args.concurrency, 8);
    }

    #[test]
    fn test_paths() {
        let args = parse("--file ids.csv --scoring-config strict.json").unwrap();
        assert_eq!(args.file, Some(PathBuf::from("ids.csv")));
        assert_eq!(args.scoring_config, Some(PathBuf::from("strict.json")));
    }

    #[test]
    fn test_bad_values() {
        assert!(parse("--concurrency 0").is_err());
        assert!(parse("--concurrency many").is_err());
        assert!(parse("--file").is_err());
        assert!(parse("--file --dry-run").is_err());
    }
}
