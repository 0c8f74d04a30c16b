use clap::Parser;
use haplorank_tools::cli::{Args, Commands};
use haplorank_tools::commands::{self, classify::ClassifyOptions};
use haplorank_tools::config::Config;
use haplorank_tools::export::ReportLayout;
use std::io::Write;

fn init_logging(level: log::LevelFilter) {
    if let Err(e) = env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            let level = record.level().as_str().to_lowercase();
            writeln!(buf, "[haplorank {:>5}] {}", level, record.args())
        })
        .try_init()
    {
        eprintln!("failed to setup logger: {}", e);
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.log_level());
    let show_progress = args.quiet == 0;
    let config = Config::load();

    let result = match args.command {
        Commands::Classify {
            input,
            output,
            format,
            phylotree,
            metric,
            extended,
            json,
            hits,
            weighted,
            unweighted,
            threads,
            tree_dir,
            annotations,
            heteroplasmy,
        } => commands::classify::run(ClassifyOptions {
            input,
            output,
            format,
            tree_dir: tree_dir.unwrap_or_else(|| config.tree_dir()),
            phylotree: phylotree.unwrap_or_else(|| config.phylotree.clone()),
            metric: metric.unwrap_or_else(|| config.metric.clone()),
            weighted: if weighted || unweighted { weighted } else { config.weighted },
            hits: hits.unwrap_or(config.hits),
            layout: if extended { ReportLayout::Extended } else { ReportLayout::Simple },
            json,
            annotations,
            heteroplasmy_threshold: heteroplasmy.unwrap_or(config.heteroplasmy_threshold),
            threads: threads.or(config.threads).unwrap_or_else(|| {
                std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
            }),
            show_progress,
        }),
        Commands::Inspect {
            node,
            phylotree,
            tree_dir,
        } => commands::inspect::run(
            &tree_dir.unwrap_or_else(|| config.tree_dir()),
            &phylotree.unwrap_or_else(|| config.phylotree.clone()),
            &node,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
