use anyhow::{bail, Context};
use std::env;
use tpo_admin::analytics::{dashboard_stats, group_by_job, job_analytics, student_analytics};
use tpo_admin::{seed, ApiClient, DataSource, Settings, Store};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const USAGE: &str = "usage: tpo-report [--demo] [--students | --job <id> | --grouped]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the report on stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // Command-line flags
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }
    let use_demo = args.iter().any(|a| a == "--demo");
    let want_students = args.iter().any(|a| a == "--students");
    let want_grouped = args.iter().any(|a| a == "--grouped");
    let job_id = match args.iter().position(|a| a == "--job") {
        Some(i) => {
            let raw = args.get(i + 1).with_context(|| format!("--job needs an id\n{}", USAGE))?;
            Some(Uuid::parse_str(raw).with_context(|| format!("invalid job id {:?}", raw))?)
        }
        None => None,
    };
    if [want_students, want_grouped, job_id.is_some()].iter().filter(|f| **f).count() > 1 {
        bail!("pick one report\n{}", USAGE);
    }

    let source: Box<dyn DataSource> = if use_demo {
        tracing::info!("reporting on demo data");
        Box::new(Store::with_snapshot(seed::demo_snapshot()))
    } else {
        let settings = Settings::from_env().context("failed to load configuration")?;
        tracing::info!(api = %settings.api_url, "reporting on live data");
        Box::new(ApiClient::from_settings(&settings)?)
    };

    let snapshot = source.load_snapshot().await.context("failed to load data")?;

    let report = if want_students {
        serde_json::to_value(student_analytics(&snapshot.students))?
    } else if want_grouped {
        serde_json::to_value(group_by_job(&snapshot.applications))?
    } else if let Some(job_id) = job_id {
        if !snapshot.jobs.iter().any(|j| j.id == job_id) {
            bail!("no job with id {}", job_id);
        }
        serde_json::to_value(job_analytics(job_id, &snapshot.applications))?
    } else {
        serde_json::to_value(dashboard_stats(
            &snapshot.students,
            &snapshot.companies,
            &snapshot.jobs,
            &snapshot.applications,
        ))?
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
