mod config;

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use patient_triage_core::controller::{InteractionController, TriageError};
use patient_triage_core::{Gender, GuidanceLookup, ReportDocument, VisitRecord, VisitRequest, VisitTimestamp};
use patient_triage_model::SymptomVocabulary;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Disease prediction and patient history")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict a disease, store the visit and write a report
    Predict {
        /// Patient name
        #[arg(long)]
        name: String,
        /// Age in years (1 or greater)
        #[arg(long, allow_negative_numbers = true)]
        age: i64,
        /// Male, Female or Other
        #[arg(long, default_value = "Other")]
        gender: Gender,
        /// Contact information
        #[arg(long, default_value = "")]
        contact: String,
        /// Symptom name; repeat or comma-separate (at least 3)
        #[arg(long = "symptom", value_delimiter = ',')]
        symptoms: Vec<String>,
        /// Visit date (YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS"); defaults to now
        #[arg(long)]
        date: Option<VisitTimestamp>,
    },
    /// Show visit history for a patient, most recent first
    History {
        /// Exact patient name
        name: String,
    },
    /// List selectable symptoms
    Symptoms {
        /// Only show symptoms containing this text
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show diet and medication guidance for a disease
    Guidance {
        /// Disease name as predicted
        disease: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("patient_triage_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = cli.settings;

    let controller = settings
        .triage_config()
        .build()
        .context("failed to load triage configuration")?;
    tracing::debug!(classifier = controller.classifier_name(), "controller ready");

    match cli.command {
        Some(Commands::Predict {
            name,
            age,
            gender,
            contact,
            symptoms,
            date,
        }) => {
            controller
                .initialize_store()
                .with_context(|| format!("failed to open {}", settings.db_path.display()))?;
            let request = VisitRequest {
                name,
                age,
                gender,
                contact_info: contact,
                symptoms,
                visit_date: date,
            };
            predict(&controller, request, &settings.report_dir)?;
        }
        Some(Commands::History { name }) => {
            let visits = controller
                .history(&name)
                .with_context(|| format!("failed to read {}", settings.db_path.display()))?;
            if visits.is_empty() {
                println!("No records found for {}", name);
            } else {
                print_history(&visits);
            }
        }
        Some(Commands::Symptoms { filter }) => {
            for symptom in controller.symptom_vocabulary() {
                if filter.as_deref().map_or(true, |f| symptom.contains(f)) {
                    println!("{}", symptom);
                }
            }
        }
        Some(Commands::Guidance { disease }) => {
            print_guidance(&controller.guidance(&disease));
        }
        None => {
            println!("Use 'triage --help' for commands");
        }
    }

    Ok(())
}

fn predict(
    controller: &InteractionController,
    request: VisitRequest,
    report_dir: &Path,
) -> anyhow::Result<()> {
    let vocab = SymptomVocabulary;
    for unknown in vocab.unknown(&request.symptoms) {
        let suggestions = vocab.suggest(unknown, 3);
        if suggestions.is_empty() {
            eprintln!("warning: '{}' is not a known symptom and will not be used for prediction", unknown);
        } else {
            eprintln!(
                "warning: '{}' is not a known symptom; did you mean {}?",
                unknown,
                suggestions.join(", ")
            );
        }
    }

    let outcome = match controller.predict(request) {
        Ok(outcome) => outcome,
        Err(TriageError::Validation(e)) => {
            // Input problems are warnings; nothing was stored
            eprintln!("warning: {}", e);
            eprintln!("Selecting more symptoms improves the accuracy of the prediction.");
            return Ok(());
        }
        Err(e) => return Err(e).context("prediction failed"),
    };

    println!("Predicted Disease: {}", outcome.record.predicted_disease);
    print_guidance(&outcome.guidance);

    let path = write_report(&outcome.report, report_dir)?;
    println!();
    println!("Visit #{} saved on {}", outcome.record.id, outcome.record.visit_date);
    println!("Report: {} (sha256 {})", path.display(), outcome.report.sha256);
    Ok(())
}

fn write_report(report: &ReportDocument, dir: &Path) -> anyhow::Result<std::path::PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create report directory {}", dir.display()))?;
    let path = dir.join(&report.file_name);
    std::fs::write(&path, &report.bytes)
        .with_context(|| format!("failed to write report {}", path.display()))?;
    Ok(path)
}

fn print_guidance(lookup: &GuidanceLookup) {
    match lookup.guidance() {
        Some(g) => {
            println!("Suggested Diet: {}", g.suggested_diet);
            println!("Foods to Eat: {}", g.foods_to_eat);
            println!("Foods to Avoid: {}", g.foods_to_avoid);
            println!("Medication: {}", g.medication);
            println!("Additional Tips: {}", g.tips_or_default());
        }
        None => {
            if let Some(message) = lookup.error_message() {
                eprintln!("error: {}", message);
            }
        }
    }
}

fn print_history(visits: &[VisitRecord]) {
    println!(
        "{:<5} {:<20} {:>4} {:<7} {:<20} {:<22} {:<20} Symptoms",
        "ID", "Name", "Age", "Gender", "Contact Info", "Predicted Disease", "Visit Date"
    );
    for v in visits {
        println!(
            "{:<5} {:<20} {:>4} {:<7} {:<20} {:<22} {:<20} {}",
            v.id,
            v.name,
            v.age,
            v.gender,
            v.contact_info,
            v.predicted_disease,
            v.visit_date,
            v.symptoms_display()
        );
    }
}
