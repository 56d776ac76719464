//! onto-repair CLI: conflict detection and repair for ontology alignments.

use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use onto_repair::class::Ontology;
use onto_repair::config::RepairConfig;
use onto_repair::conflict::ConflictSetBuilder;
use onto_repair::export::{export_conflict_sets, write_conflict_sets};
use onto_repair::hierarchy::HierarchyIndex;
use onto_repair::mapping::MappingStatus;
use onto_repair::pipeline::{FilterMode, RepairStage};
use onto_repair::problem::{LoadedProblem, RepairProblem, mapping_specs, write_json};
use onto_repair::repair::{CoherenceRepairer, PromptArbiter};

#[derive(Parser)]
#[command(
    name = "onto-repair",
    version,
    about = "Conflict detection and repair for ontology alignments"
)]
struct Cli {
    /// Repair config file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build conflict sets and report them.
    Check {
        /// Problem file (JSON).
        problem: PathBuf,

        /// Write the conflict-set dump here (overrides `dump_path`).
        #[arg(long)]
        dump: Option<PathBuf>,

        /// Print conflict sets as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Run the repair stage and write the surviving mappings.
    Repair {
        /// Problem file (JSON).
        problem: PathBuf,

        /// Where to write the repaired mappings (JSON).
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Flag defective mappings instead of removing them.
        #[arg(long)]
        flag: bool,

        /// Answer reviews from the problem's reference alignment.
        #[arg(long, conflicts_with = "interactive")]
        reference: bool,

        /// Ask on the terminal before each removal.
        #[arg(long)]
        interactive: bool,
    },

    /// Show problem statistics.
    Info {
        /// Problem file (JSON).
        problem: PathBuf,
    },
}

fn load(path: &std::path::Path) -> Result<LoadedProblem> {
    Ok(RepairProblem::load(path)?.resolve()?)
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RepairConfig::load(path)?,
        None => RepairConfig::default(),
    };

    match cli.command {
        Commands::Check {
            problem,
            dump,
            json,
        } => {
            let loaded = load(&problem)?;
            let report = ConflictSetBuilder::new(config.to_builder_config())
                .build(&loaded.mappings, &loaded.taxonomy)?;

            println!(
                "{} conflict sets ({} classes checked, {} skipped)",
                report.conflict_sets.len(),
                report.checklist_len,
                report.skipped_classes.len()
            );
            if json {
                let exported =
                    export_conflict_sets(&report.conflict_sets, &loaded.mappings, &loaded.taxonomy);
                println!(
                    "{}",
                    serde_json::to_string_pretty(&exported).into_diagnostic()?
                );
            }
            if let Some(path) = dump.or(config.dump_path) {
                let file = std::fs::File::create(&path).into_diagnostic()?;
                let mut out = BufWriter::new(file);
                write_conflict_sets(
                    &mut out,
                    &report.conflict_sets,
                    &loaded.mappings,
                    &loaded.taxonomy,
                )
                .into_diagnostic()?;
                println!("Conflict sets written to {}", path.display());
            }
        }

        Commands::Repair {
            problem,
            output,
            flag,
            reference,
            interactive,
        } => {
            let mut loaded = load(&problem)?;
            if flag {
                config.mode = FilterMode::Flag;
            }

            let mut stage = RepairStage::from_config(&config);
            if reference || interactive {
                let coherence = CoherenceRepairer::new(config.to_builder_config());
                let coherence = if reference {
                    coherence.with_arbiter(Box::new(loaded.oracle()))
                } else {
                    let names = loaded
                        .taxonomy
                        .classes()
                        .iter()
                        .map(|m| (m.id, m.label.clone()));
                    let stdin = std::io::stdin().lock();
                    coherence.with_arbiter(Box::new(
                        PromptArbiter::new(stdin, std::io::stderr()).with_names(names),
                    ))
                };
                stage = stage.replace(Box::new(coherence));
            }

            let before = loaded.mappings.active_len();
            let report = stage.run(&mut loaded.mappings, &loaded.taxonomy)?;
            for (name, run) in &report.runs {
                println!(
                    "{name}: {} affected, {} confirmed, {} unresolved",
                    run.removed_count,
                    run.confirmed.len(),
                    run.unresolved_conflicts.len()
                );
            }
            println!(
                "{before} active mappings before, {} after ({:?} mode)",
                loaded.mappings.active_len(),
                stage.mode()
            );

            if let Some(path) = output {
                let specs = mapping_specs(&loaded.taxonomy, &loaded.mappings);
                write_json(&path, &specs)?;
                println!("Mappings written to {}", path.display());
            }
        }

        Commands::Info { problem } => {
            let loaded = load(&problem)?;
            let t = &loaded.taxonomy;
            println!("Classes:        {}", t.len());
            println!("  source:       {}", t.count_in(Ontology::Source));
            println!("  target:       {}", t.count_in(Ontology::Target));
            println!("Disjoint pairs: {}", t.disjointness().len());
            println!(
                "Deprecated:     {}",
                t.classes().iter().filter(|m| t.is_deprecated(m.id)).count()
            );
            println!("Mappings:       {}", loaded.mappings.len());
            let counts = loaded.mappings.status_counts();
            for status in [
                MappingStatus::Unknown,
                MappingStatus::Correct,
                MappingStatus::Incorrect,
                MappingStatus::Flagged,
            ] {
                println!(
                    "  {:<12}  {}",
                    format!("{status}:"),
                    counts.get(&status).copied().unwrap_or(0)
                );
            }
            println!("Reference:      {}", loaded.reference.len());
        }
    }

    Ok(())
}
