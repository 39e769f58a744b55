use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use janitor::cli::Cli;
use janitor::{
    init_telemetry, install_crypto_provider, Decommissioner, Janitor, JanitorSettings, JobSpec,
    KubeClusterClient, S3BucketPurger,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    JanitorSettings::load_env_file()?;
    let mut settings = JanitorSettings::load(cli.settings.as_deref())?;
    cli.apply_overrides(&mut settings);
    init_telemetry(&settings.logging())?;
    install_crypto_provider();

    let job = JobSpec::load(&cli.config)?;

    tokio::runtime::Runtime::new()?.block_on(async { run(job, settings).await })
}

async fn run(job: JobSpec, settings: JanitorSettings) -> Result<()> {
    if job.is_empty() {
        info!("Job lists no statefulsets and no bucket; nothing to do");
        return Ok(());
    }

    let mut janitor = Janitor::<KubeClusterClient, S3BucketPurger>::new();

    if !job.statefulsets.is_empty() {
        let client = KubeClusterClient::connect(settings.kube_context.as_deref())
            .await
            .context("Failed to create Kubernetes client")?;
        janitor = janitor
            .with_decommissioner(Decommissioner::new(client).with_poll_delay(settings.poll_delay()));
    }

    if let Some(bucket) = &job.aws_config {
        janitor = janitor.with_purger(S3BucketPurger::from_bucket_config(bucket).await);
    }

    match janitor.run(&job).await {
        Ok(summary) => {
            info!(correlation.id = %summary.correlation_id, "Janitor run completed");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Janitor run failed");
            Err(e.into())
        }
    }
}
