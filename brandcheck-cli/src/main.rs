mod config;
mod explain;

use anyhow::Context;
use brandcheck_core::adapters::{
    FsWritePort, JsonLinesAuditSink, RuleTextAdvisor, StaticVisionPort,
};
use brandcheck_core::pipeline::{
    write_certificate_artifacts, write_check_artifacts, write_fix_artifacts,
};
use brandcheck_core::{CertifyError, Engine, Registry, ToolError, share};
use brandcheck_render::{
    render_certificate_md, render_explanation_md, render_remediation_md, render_report_md,
    render_rules_md,
};
use brandcheck_types::audit::Advice;
use brandcheck_types::report::OverallStatus;
use brandcheck_types::scene::SceneDocument;
use brandcheck_types::vision::VisionObservation;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{CliOverrides, ConfigMerger};
use fs_err as fs;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "brandcheck",
    version,
    about = "Brand-guideline compliance checks and auto-remediation for ad creatives."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a scene document and print its compliance report.
    Check(CheckArgs),
    /// Propose and apply fixes (default: dry-run; the document is left alone).
    Fix(FixArgs),
    /// Check a document and issue a certificate unless it fails.
    Certify(CertifyArgs),
    /// List the rules in the built-in catalog.
    ListRules(ListRulesArgs),
    /// Explain what a rule checks and how its violations are fixed.
    Explain(ExplainArgs),
}

#[derive(Debug, clap::Args)]
struct EngineArgs {
    /// Config file (default: ./brandcheck.toml when present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Policy set to validate against.
    #[arg(long)]
    policy_set: Option<String>,

    /// Physical width, in millimetres, the document width maps onto.
    #[arg(long)]
    reference_width_mm: Option<f64>,

    /// Maximum rule evaluations running at once.
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Enable a rule by id (repeatable).
    #[arg(long = "enable-rule")]
    enable_rules: Vec<String>,

    /// Disable a rule by id (repeatable).
    #[arg(long = "disable-rule")]
    disable_rules: Vec<String>,

    /// Append audit entries to this JSON-lines file.
    #[arg(long)]
    audit_log: Option<Utf8PathBuf>,

    /// Precomputed vision observation (JSON) to fuse into the report.
    #[arg(long)]
    vision: Option<Utf8PathBuf>,

    /// Write report artifacts (json + markdown) to this directory.
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl EngineArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            policy_set: self.policy_set.clone(),
            reference_width_mm: self.reference_width_mm,
            max_concurrency: self.max_concurrency,
            enable: self.enable_rules.clone(),
            disable: self.disable_rules.clone(),
            audit_log: self.audit_log.clone(),
        }
    }
}

#[derive(Debug, Parser)]
struct CheckArgs {
    /// Scene document (JSON).
    document: Utf8PathBuf,

    /// Ask for advice on each failed result.
    #[arg(long, default_value_t = false)]
    advise: bool,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Debug, Parser)]
struct FixArgs {
    /// Scene document (JSON).
    document: Utf8PathBuf,

    /// Write the fixed document back to its path. If omitted, only reports and artifacts
    /// are produced.
    #[arg(long, default_value_t = false)]
    write: bool,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Debug, Parser)]
struct CertifyArgs {
    /// Scene document (JSON).
    document: Utf8PathBuf,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Debug, Parser)]
struct ListRulesArgs {
    /// Only rules enabled for this policy set.
    #[arg(long)]
    policy_set: Option<String>,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Rule id to explain (e.g., "logo-min-size", "safe-zone").
    rule_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match real_main(cli).await {
        Ok(()) => ExitCode::from(0),
        Err(ToolError::PolicyBlock) => ExitCode::from(2),
        Err(ToolError::Internal(e)) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

async fn real_main(cli: Cli) -> Result<(), ToolError> {
    match cli.cmd {
        Command::Check(args) => cmd_check(args).await,
        Command::Fix(args) => cmd_fix(args).await,
        Command::Certify(args) => cmd_certify(args).await,
        Command::ListRules(args) => Ok(cmd_list_rules(args)?),
        Command::Explain(args) => Ok(cmd_explain(args)?),
    }
}

fn build_engine(args: &EngineArgs) -> anyhow::Result<Engine> {
    let file_config = config::load_or_default(args.config.as_deref(), Utf8Path::new("."))
        .context("load brandcheck.toml config")?;
    let merged = ConfigMerger::new(file_config).merge(&args.overrides());
    debug!(
        "merged config: policy_set={}, overrides={:?}, max_concurrency={}",
        merged.settings.policy_set, merged.settings.overrides, merged.settings.max_concurrency
    );

    let mut engine = Engine::new(Registry::builtin(), merged.settings)?;
    if let Some(path) = merged.audit_log {
        engine = engine.with_audit(Arc::new(JsonLinesAuditSink::new(path)));
    }
    if let Some(path) = &args.vision {
        let observation: VisionObservation =
            read_json(path).context("load vision observation")?;
        engine = engine.with_vision(Arc::new(StaticVisionPort::observation(observation)));
    }
    Ok(engine)
}

async fn cmd_check(args: CheckArgs) -> Result<(), ToolError> {
    let mut engine = build_engine(&args.engine)?;
    if args.advise {
        engine = engine.with_advisor(Arc::new(RuleTextAdvisor));
    }
    let doc: SceneDocument = read_json(&args.document).context("load scene document")?;
    let doc = share(doc);

    let report = engine.check(&doc).await;
    let advice = engine.advise(&report).await;

    if let Some(out_dir) = &args.engine.out_dir {
        write_check_artifacts(&report, out_dir, &FsWritePort)?;
        info!("wrote report artifacts to {}", out_dir);
    }

    match args.engine.format {
        OutputFormat::Text => {
            print!("{}", render_report_md(&report));
            print!("{}", render_advice_md(&advice));
        }
        OutputFormat::Json => print_json(&report)?,
    }

    if report.overall_status == OverallStatus::Fail {
        return Err(ToolError::PolicyBlock);
    }
    Ok(())
}

async fn cmd_fix(args: FixArgs) -> Result<(), ToolError> {
    let engine = build_engine(&args.engine)?;
    let doc: SceneDocument = read_json(&args.document).context("load scene document")?;
    let doc = share(doc);

    let outcome = engine.remediate(&doc).await?;

    if args.write {
        if outcome.summary.applied > 0 {
            let fixed = doc.read().await;
            write_json(&args.document, &*fixed)?;
            info!("updated {}", args.document);
        }
    } else {
        info!("dry-run: pass --write to update {}", args.document);
    }

    if let Some(out_dir) = &args.engine.out_dir {
        write_fix_artifacts(&outcome, out_dir, &FsWritePort)?;
        info!("wrote remediation artifacts to {}", out_dir);
    }

    match args.engine.format {
        OutputFormat::Text => print!("{}", render_remediation_md(&outcome)),
        OutputFormat::Json => print_json(&outcome)?,
    }

    if outcome.after.overall_status == OverallStatus::Fail {
        return Err(ToolError::PolicyBlock);
    }
    Ok(())
}

async fn cmd_certify(args: CertifyArgs) -> Result<(), ToolError> {
    let engine = build_engine(&args.engine)?;
    let doc: SceneDocument = read_json(&args.document).context("load scene document")?;
    let report = engine.check(&share(doc)).await;

    let certificate = match engine.certify(&report) {
        Ok(certificate) => certificate,
        Err(err @ CertifyError::Failing { .. }) => {
            error!("{}", err);
            if args.engine.format == OutputFormat::Text {
                print!("{}", render_report_md(&report));
            }
            return Err(ToolError::PolicyBlock);
        }
        Err(err) => return Err(anyhow::Error::new(err).into()),
    };

    if let Some(out_dir) = &args.engine.out_dir {
        write_certificate_artifacts(&certificate, out_dir, &FsWritePort)?;
        info!("wrote certificate artifacts to {}", out_dir);
    }

    match args.engine.format {
        OutputFormat::Text => print!("{}", render_certificate_md(&certificate)),
        OutputFormat::Json => print_json(&certificate)?,
    }
    Ok(())
}

fn cmd_list_rules(args: ListRulesArgs) -> anyhow::Result<()> {
    let registry = Registry::builtin();
    let rules = match &args.policy_set {
        Some(set) => {
            if !registry.knows_policy_set(set) {
                anyhow::bail!(
                    "Unknown policy set: '{}'\n\nAvailable policy sets: {}",
                    set,
                    registry.policy_sets().join(", ")
                );
            }
            registry.list_enabled(set)
        }
        None => registry.rules().to_vec(),
    };

    match args.format {
        OutputFormat::Text => {
            println!("Ruleset {}\n", registry.version());
            print!("{}", render_rules_md(&rules));
            println!();
            println!("Use 'brandcheck explain <rule-id>' for details.");
        }
        OutputFormat::Json => print_json(&rules)?,
    }
    Ok(())
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    let registry = Registry::builtin();
    let variants = registry.variants(&args.rule_id);
    if variants.is_empty() {
        let mut available: Vec<&str> = registry.rules().iter().map(|r| r.id.as_str()).collect();
        available.dedup();
        anyhow::bail!(
            "Unknown rule id: '{}'\n\nAvailable rules: {}",
            args.rule_id,
            available.join(", ")
        );
    }

    let advice = explain::lookup_guidance(&args.rule_id).map(|g| g.to_advice());
    for (i, rule) in variants.iter().enumerate() {
        if i > 0 {
            println!();
        }
        if !rule.policy_sets.is_empty() {
            println!("<!-- policy sets: {} -->", rule.policy_sets.join(", "));
        }
        // Guidance is shared by every variant; print it once, after the last one.
        let last = i + 1 == variants.len();
        print!(
            "{}",
            render_explanation_md(rule, advice.as_ref().filter(|_| last))
        );
    }
    Ok(())
}

fn render_advice_md(advice: &[Advice]) -> String {
    if advice.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n## Advice\n\n");
    for a in advice {
        out.push_str(&format!("- `{}`: {}", a.rule_id, a.explanation));
        if let Some(fix) = &a.suggested_fix {
            out.push_str(&format!(" Suggested fix: {}", fix));
        }
        out.push('\n');
    }
    out
}

fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> anyhow::Result<T> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path))
}

fn write_json<T: Serialize + ?Sized>(path: &Utf8Path, v: &T) -> anyhow::Result<()> {
    let mut contents = serde_json::to_string_pretty(v).context("serialize json")?;
    contents.push('\n');
    fs::write(path, contents).with_context(|| format!("write {}", path))
}

fn print_json<T: Serialize + ?Sized>(v: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(v).context("serialize json")?);
    Ok(())
}
