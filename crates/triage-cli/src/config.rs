//! Startup settings.
//!
//! Every setting can come from a flag, the environment, or a `.env` file
//! (loaded before parsing). The result is turned into a [`TriageConfig`] once
//! and handed to the core.

use std::path::PathBuf;

use clap::Args;
use patient_triage_core::{ReportFormat, TriageConfig};

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// SQLite file holding the visit log
    #[arg(long = "db", env = "TRIAGE_DB_PATH", default_value = "patient_data.db", global = true)]
    pub db_path: PathBuf,

    /// Forest model artifact (JSON); the built-in classifier is used when unset
    #[arg(long = "model", env = "TRIAGE_MODEL_PATH", global = true)]
    pub model_path: Option<PathBuf>,

    /// Disease profile table (JSON) for the built-in classifier
    #[arg(long = "profiles", env = "TRIAGE_PROFILES_PATH", global = true)]
    pub profiles_path: Option<PathBuf>,

    /// Guidance table (JSON); the built-in table is used when unset
    #[arg(long = "guidance-table", env = "TRIAGE_GUIDANCE_PATH", global = true)]
    pub guidance_path: Option<PathBuf>,

    /// Directory reports are written to
    #[arg(long, env = "TRIAGE_REPORT_DIR", default_value = ".", global = true)]
    pub report_dir: PathBuf,

    /// Report format: text, json or pdf
    #[arg(long, env = "TRIAGE_REPORT_FORMAT", default_value = "text", global = true)]
    pub format: ReportFormat,
}

impl Settings {
    pub fn triage_config(&self) -> TriageConfig {
        TriageConfig::new(self.db_path.clone())
            .with_model_path(self.model_path.clone())
            .with_profiles_path(self.profiles_path.clone())
            .with_guidance_path(self.guidance_path.clone())
            .with_report_format(self.format)
    }
}
