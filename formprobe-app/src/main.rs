use anyhow::{Context, Result};
use clap::Parser;

use formprobe_common::observability::{init_logging, LogConfig};
use formprobe_common::ReportFormat;
use formprobe_config::{ProbeConfig, ProbeConfigLoader, TimingConfig};
use formprobe_drivers::webdriver::driver::ProbeSession;
use formprobe_engine::capability::BrowserDriver;
use formprobe_engine::sequencer::{CredentialPlan, RunPlan, RunReport, Sequencer, Timing};
use formprobe_engine::target::{CandidateList, Target};
use std::time::Duration;
use tracing::warn;

use prompts::ConsoleOperator;
mod prompts;

/// Interactive single-session form probe: open a page, optionally fill a
/// phone field, then drive a wordlist through one input field.
#[derive(Parser, Debug)]
#[command(name = "formprobe", version)]
struct Cli {
    /// Path to the optional YAML config file.
    #[arg(long, default_value = "formprobe.yaml")]
    config: std::path::PathBuf,

    /// Override the WebDriver endpoint from config.
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Run the browser without a visible window.
    #[arg(long)]
    headless: bool,

    /// Print the final report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg: ProbeConfig = ProbeConfigLoader::new().with_file(&cli.config).load()?;
    let log_path = init_logging(LogConfig::default())?;

    println!("=== formprobe interactive session ===");
    println!("(log file: {})\n", log_path.display());

    let raw_target = prompts::prompt("1) Target page URL (e.g. https://example.com): ")?;
    let target = Target::parse(&raw_target)?;

    let endpoint = cli
        .webdriver_url
        .clone()
        .unwrap_or_else(|| cfg.webdriver.endpoint.clone());
    let headless = cli.headless || cfg.webdriver.headless;

    println!("\n-> Starting the browser session ({endpoint})...");
    let mut session = ProbeSession::connect(&endpoint, headless)
        .await
        .context("could not start a browser session, is the WebDriver service running?")?;

    // Open the page right away so the operator can inspect it while
    // answering the remaining prompts. The sequencer re-acquires the target
    // itself, so a failure here only delays the operator's view.
    if let Err(e) = session.navigate(target.as_str()).await {
        warn!(target = %target, error = %e, "initial page open failed");
        println!("Warning: could not open the page yet ({e}). The browser stays open.");
    }

    // The session must be released on every path from here on.
    let outcome = gather_and_run(&mut session, &cfg, &target).await;
    let closed = session.close().await;

    let report = outcome?;
    closed.context("failed to close the browser session")?;

    let format = if cli.json {
        ReportFormat::Json
    } else {
        ReportFormat::Text
    };
    render_report(&report, format)?;
    Ok(())
}

/// Collect the remaining operator inputs, validate the wordlist, and drive
/// the sequencer. The browser is already engaged when this runs; a missing
/// or empty wordlist aborts with a diagnostic and the caller closes the
/// session.
async fn gather_and_run(
    session: &mut ProbeSession,
    cfg: &ProbeConfig,
    target: &Target,
) -> Result<RunReport> {
    println!("\nAnswer the next prompts; you can switch to the opened browser to inspect elements.");

    let credential = match prompts::prompt_optional(
        "\n2) CSS selector for the phone field (Enter to skip): ",
    )? {
        Some(selector) => {
            let value = prompts::prompt("3) Phone number to enter: ")?;
            let submit_selector = prompts::prompt_optional(
                "4) CSS selector for the phone submit button (Enter to skip): ",
            )?;
            Some(CredentialPlan {
                selector,
                value,
                submit_selector,
            })
        }
        None => {
            println!("-> No phone selector, the credential stage will be skipped.");
            None
        }
    };

    let candidate_selector = prompts::prompt("\n5) CSS selector for the candidate input: ")?;
    let candidate_submit_selector =
        prompts::prompt_optional("6) CSS selector for its submit button (Enter to skip): ")?;
    let wordlist_path =
        prompts::prompt_with_default("7) Wordlist file (default: wordlist.txt): ", "wordlist.txt")?;

    let raw_list = std::fs::read_to_string(&wordlist_path)
        .with_context(|| format!("cannot read wordlist '{wordlist_path}'"))?;
    let candidates = CandidateList::parse(&raw_list)
        .with_context(|| format!("wordlist '{wordlist_path}' has no usable entries"))?;

    let plan = RunPlan {
        target: target.clone(),
        credential,
        candidate_selector,
        candidate_submit_selector,
        candidates,
    };

    println!(
        "\n-> Starting the run ({} candidates)...\n",
        plan.candidates.len()
    );
    let mut operator = ConsoleOperator;
    let report = Sequencer::new(session, &mut operator, timing_from(&cfg.timing))
        .run(&plan)
        .await;
    Ok(report)
}

fn render_report(report: &RunReport, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Text => println!("\n{report}"),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

/// Apply the config file's optional overrides onto the engine defaults.
fn timing_from(cfg: &TimingConfig) -> Timing {
    let mut timing = Timing::default();
    if let Some(secs) = cfg.credential_timeout_secs {
        timing.credential_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = cfg.candidate_timeout_secs {
        timing.candidate_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = cfg.retry_timeout_secs {
        timing.retry_timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = cfg.poll_interval_ms {
        timing.poll_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = cfg.navigation_settle_ms {
        timing.navigation_settle = Duration::from_millis(ms);
    }
    if let Some(ms) = cfg.refresh_settle_ms {
        timing.refresh_settle = Duration::from_millis(ms);
    }
    if let Some(ms) = cfg.injection_settle_ms {
        timing.injection_settle = Duration::from_millis(ms);
    }
    if let Some(ms) = cfg.candidate_settle_ms {
        timing.candidate_settle = Duration::from_millis(ms);
    }
    timing
}
