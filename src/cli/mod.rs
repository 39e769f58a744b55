use clap::Parser;
use std::path::PathBuf;

use crate::config::{JanitorSettings, LogFormat};

#[derive(Parser, Debug)]
#[command(name = "janitor")]
#[command(about = "Decommission StatefulSets and empty their object storage bucket")]
#[command(long_about = "Janitor scales each listed StatefulSet to zero, deletes the \
                       PersistentVolumeClaims created from its volume claim templates, \
                       optionally waits for the scale-down, and finally empties the \
                       configured S3 bucket.")]
pub struct Cli {
    /// Path to the job file
    #[arg(long, short = 'c', help = "Job file listing statefulsets and the optional awsConfig bucket")]
    pub config: PathBuf,

    /// Path to a settings file (defaults to ./janitor.toml when present)
    #[arg(long, help = "Runtime settings file in TOML (poll delay, logging, kube context)")]
    pub settings: Option<PathBuf>,

    /// Override the delay before the convergence check
    #[arg(long, help = "Seconds to wait before re-reading a StatefulSet that has waitMinutes set")]
    pub poll_delay_seconds: Option<u64>,

    /// Kubeconfig context to use
    #[arg(long, help = "Use this kubeconfig context instead of the ambient configuration")]
    pub kube_context: Option<String>,

    /// Log output format
    #[arg(long, value_enum, help = "Log format: json or pretty")]
    pub log_format: Option<LogFormat>,

    /// Enable debug logging
    #[arg(long, short = 'v', help = "Log at debug level")]
    pub verbose: bool,
}

impl Cli {
    /// Apply command line overrides on top of loaded settings
    pub fn apply_overrides(&self, settings: &mut JanitorSettings) {
        if let Some(seconds) = self.poll_delay_seconds {
            settings.poll_delay_seconds = seconds;
        }
        if let Some(context) = &self.kube_context {
            settings.kube_context = Some(context.clone());
        }
        if let Some(format) = self.log_format {
            settings.log_format = format;
        }
        if self.verbose {
            settings.log_level = "debug".to_string();
        }
    }
}
