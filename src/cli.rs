use crate::input::InputFormat;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Classify mitochondrial samples against a phylotree.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress log output. Set once to keep warnings only, twice to silence everything.
    #[arg(
        short = 'q',
        long,
        action = ArgAction::Count,
        global = true,
        conflicts_with = "verbose"
    )]
    pub quiet: u8,

    /// Log verbosity. Set once for debug output, twice for trace output.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Args {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet > 0 {
            match self.quiet {
                1 => log::LevelFilter::Warn,
                _ => log::LevelFilter::Off,
            }
        } else {
            match self.verbose {
                0 => log::LevelFilter::Info,
                1 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            }
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rank every phylotree node for each sample and write a report
    Classify {
        /// Sample file (HSD text or VCF/BCF)
        #[arg(long = "in")]
        input: PathBuf,

        /// Output report (tab separated)
        #[arg(long = "out")]
        output: PathBuf,

        #[arg(long, value_enum, default_value = "hsd")]
        format: InputFormat,

        /// Phylotree version, resolved to phylotree<VERSION>.json in the tree directory
        #[arg(long)]
        phylotree: Option<String>,

        /// Ranking metric: 1/kulczynski, 2/hamming or 3/jaccard
        #[arg(long)]
        metric: Option<String>,

        /// Add the found, missing and remaining polymorphism columns
        #[arg(long)]
        extended: bool,

        /// Also write a JSON report to this path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Number of ranked haplogroups kept per sample
        #[arg(long)]
        hits: Option<usize>,

        /// Weight polymorphisms by their phylogenetic stability
        #[arg(long, conflicts_with = "unweighted")]
        weighted: bool,

        /// Count polymorphisms instead of weighting them
        #[arg(long)]
        unweighted: bool,

        /// Worker threads (default: available parallelism)
        #[arg(long)]
        threads: Option<usize>,

        /// Directory holding phylotree and weight files
        #[arg(long)]
        tree_dir: Option<PathBuf>,

        /// Tab-separated polymorphism annotations
        #[arg(long)]
        annotations: Option<PathBuf>,

        /// Minimum heteroplasmy fraction for VCF calls to count
        #[arg(long)]
        heteroplasmy: Option<f64>,
    },

    /// Print a haplogroup's lineage and expected polymorphisms
    Inspect {
        /// Haplogroup name
        node: String,

        #[arg(long)]
        phylotree: Option<String>,

        #[arg(long)]
        tree_dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classify() {
        let args = Args::try_parse_from([
            "haplorank-tools",
            "classify",
            "--in",
            "samples.hsd",
            "--out",
            "out.txt",
            "--metric",
            "2",
            "--unweighted",
            "--hits",
            "3",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.log_level(), log::LevelFilter::Debug);
        match args.command {
            Commands::Classify {
                input,
                format,
                metric,
                unweighted,
                weighted,
                hits,
                extended,
                ..
            } => {
                assert_eq!(input, PathBuf::from("samples.hsd"));
                assert_eq!(format, InputFormat::Hsd);
                assert_eq!(metric.as_deref(), Some("2"));
                assert!(unweighted);
                assert!(!weighted);
                assert_eq!(hits, Some(3));
                assert!(!extended);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_flags() {
        assert!(Args::try_parse_from([
            "haplorank-tools",
            "classify",
            "--in",
            "a",
            "--out",
            "b",
            "--weighted",
            "--unweighted",
        ])
        .is_err());
        assert!(Args::try_parse_from(["haplorank-tools", "-q", "-v", "inspect", "H"]).is_err());
    }

    #[test]
    fn test_quiet_levels() {
        let args = Args::try_parse_from(["haplorank-tools", "-qq", "inspect", "H"]).unwrap();
        assert_eq!(args.log_level(), log::LevelFilter::Off);
    }
}
