use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use medrisk_data::{InsuranceCompany, SizeBucket};
use medrisk_engine::config;
use medrisk_engine::{
    recommend_for_label, AgeGroup, HeatmapCell, PredictionResult, RecommendationFilter, Region,
    RiskEngine, RiskHistory, UserInput, CONFIG_FILE,
};
use medrisk_model::FeatureContribution;

#[derive(Debug, Parser)]
#[command(
    name = "medrisk",
    version,
    about = "Estimate cancer treatment cost, financial burden and matching insurers",
    long_about = "medrisk predicts the cost of a cancer treatment course, corrects it for the\n\
        hospital type, rates the burden against annual income and ranks insurers\n\
        suited to that risk level.\n\n\
        EXAMPLES:\n\
        \n  medrisk init\n\
        \n  medrisk check\n\
        \n  medrisk predict --cancer 위암 --age-group 40s --hospital-type 종합병원 --income 42000000\n\
        \n  medrisk recommend --risk-level high --mobile-only\n\
        \n  medrisk heatmap"
)]
struct Cli {
    /// Config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a default config file
    Init,
    /// Load every source and the model, then print a summary
    Check,
    /// Predict cost and risk for one patient profile
    Predict(PredictArgs),
    /// Rank insurers for a risk level
    Recommend(RecommendArgs),
    /// Mean logged risk score per age group and region
    Heatmap(HeatmapArgs),
}

#[derive(Debug, Args)]
struct PredictArgs {
    /// Cancer type as named in the statistics source
    #[arg(long)]
    cancer: Option<String>,

    /// 20s, 30s, 40s, 50s or 60+
    #[arg(long)]
    age_group: AgeGroup,

    #[arg(long, default_value = "other")]
    region: Region,

    /// Hospital type as named in the cost source
    #[arg(long)]
    hospital_type: String,

    /// Annual income in won
    #[arg(long)]
    income: f64,

    #[arg(long)]
    inpatient: bool,

    #[arg(long)]
    family_history: bool,

    /// Override the average inpatient days of the cancer type
    #[arg(long)]
    avg_days: Option<f64>,

    /// Override the patient count of the cancer type
    #[arg(long)]
    patient_count: Option<u64>,

    /// Show per-feature contributions to the cost estimate
    #[arg(long)]
    explain: bool,

    #[command(flatten)]
    filter: FilterArgs,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct RecommendArgs {
    /// very low, low, moderate, high, very high (Korean labels accepted)
    #[arg(long)]
    risk_level: String,

    #[command(flatten)]
    filter: FilterArgs,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct FilterArgs {
    /// Keep insurers offering this coverage type
    #[arg(long)]
    coverage_type: Option<String>,

    /// Keep insurers in this premium tier
    #[arg(long)]
    price_tier: Option<String>,

    /// Keep insurers that accept mobile enrollment
    #[arg(long)]
    mobile_only: bool,
}

impl FilterArgs {
    fn to_filter(&self) -> RecommendationFilter {
        RecommendationFilter {
            coverage_type: self.coverage_type.clone(),
            price_tier: self.price_tier.clone(),
            mobile_only: self.mobile_only,
        }
    }
}

#[derive(Debug, Args)]
struct HeatmapArgs {
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let rc = match &cli.command {
        Command::Init => run_init(&cli.config),
        Command::Check => run_check(&cli.config),
        Command::Predict(args) => run_predict(&cli.config, args),
        Command::Recommend(args) => run_recommend(&cli.config, args),
        Command::Heatmap(args) => run_heatmap(&cli.config, args),
    };
    std::process::exit(rc);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn load_engine(config_path: &Path) -> Result<RiskEngine, i32> {
    if !config_path.exists() {
        eprintln!(
            "error: '{}' not found (run 'medrisk init')",
            config_path.display()
        );
        return Err(2);
    }
    RiskEngine::load(config_path).map_err(|e| {
        eprintln!("error: {e}");
        2
    })
}

fn run_init(config_path: &Path) -> i32 {
    if config_path.exists() {
        eprintln!("error: '{}' already exists", config_path.display());
        return 2;
    }
    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("error: failed to create '{}': {e}", parent.display());
            return 2;
        }
    }
    if let Err(e) = fs::write(config_path, config::generate_config()) {
        eprintln!("error: failed to write '{}': {e}", config_path.display());
        return 2;
    }
    println!("✓ Created {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  place the source files listed under [sources] and the model under [model]");
    println!("  medrisk check    # Validate sources and model");
    0
}

fn run_check(config_path: &Path) -> i32 {
    let engine = match load_engine(config_path) {
        Ok(e) => e,
        Err(rc) => return rc,
    };
    let model = engine.predictor().model();
    println!("✓ Config valid: {}", config_path.display());
    println!("cancer types:    {}", engine.cancer_stats().len());
    println!("income rows:     {}", engine.income_stats().len());
    println!("hospital types:  {}", engine.predictor().corrections().len());
    for (hospital_type, factor) in engine.predictor().corrections().iter() {
        println!("  {hospital_type}: {factor:.3}");
    }
    let buckets = bucket_counts(engine.companies());
    println!(
        "insurers:        {} (large {}, medium {}, small {})",
        engine.companies().len(),
        buckets.get(&SizeBucket::Large).copied().unwrap_or(0),
        buckets.get(&SizeBucket::Medium).copied().unwrap_or(0),
        buckets.get(&SizeBucket::Small).copied().unwrap_or(0),
    );
    println!(
        "model:           {} ({} features)",
        model.backend_type(),
        model.num_features()
    );
    0
}

#[derive(Serialize)]
struct PredictOutput<'a> {
    result: &'a PredictionResult,
    history_recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    contributions: Option<Vec<FeatureContribution>>,
    recommendations: Vec<InsuranceCompany>,
}

fn run_predict(config_path: &Path, args: &PredictArgs) -> i32 {
    let engine = match load_engine(config_path) {
        Ok(e) => e,
        Err(rc) => return rc,
    };

    let mut input = UserInput::new(args.age_group, args.hospital_type.clone(), args.income)
        .with_region(args.region)
        .with_inpatient(args.inpatient)
        .with_family_history(args.family_history);
    if let Some(cancer) = &args.cancer {
        let profile = engine.cancer_stats().profile(cancer);
        if profile.is_default {
            log::warn!("no statistics for cancer type '{cancer}', using defaults");
        }
        input = input.with_profile(&profile);
    }
    if let Some(days) = args.avg_days {
        input = input.with_avg_days(days);
    }
    if let Some(count) = args.patient_count {
        input = input.with_patient_count(count);
    }

    let prediction = match engine.predict(&input) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };
    let contributions = if args.explain {
        match prediction.explain.contributions() {
            Ok(c) => Some(c),
            Err(e) => {
                eprintln!("warning: could not explain prediction: {e}");
                None
            }
        }
    } else {
        None
    };
    let recommendations = args
        .filter
        .to_filter()
        .apply(engine.recommend(prediction.result.risk_level));

    if args.json {
        let out = PredictOutput {
            result: &prediction.result,
            history_recorded: prediction.history_recorded,
            contributions,
            recommendations,
        };
        return print_json(&out);
    }

    let r = &prediction.result;
    println!("cancer type:     {}", r.cancer_name);
    println!("hospital type:   {} (x{:.3})", r.hospital_type, r.correction_factor);
    println!("expected cost:   {} won", group_thousands(r.corrected_cost));
    println!("burden ratio:    {:.2}% of annual income", r.burden_ratio_pct);
    println!(
        "risk level:      {} ({}), gauge {}",
        r.risk_level,
        r.risk_level.korean_label(),
        r.gauge_score
    );
    if !prediction.history_recorded {
        eprintln!("warning: prediction was not written to the risk history");
    }
    if let Some(contributions) = &contributions {
        println!("cost drivers:");
        for c in contributions {
            println!("  {:<15} {:>12.1} (value {})", c.feature, c.contribution, c.value);
        }
    }
    print_companies(&recommendations);
    0
}

fn run_recommend(config_path: &Path, args: &RecommendArgs) -> i32 {
    let engine = match load_engine(config_path) {
        Ok(e) => e,
        Err(rc) => return rc,
    };
    let ranked = match recommend_for_label(&args.risk_level, engine.companies()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };
    let companies = args.filter.to_filter().apply(ranked);
    if args.json {
        return print_json(&companies);
    }
    print_companies(&companies);
    0
}

fn run_heatmap(config_path: &Path, args: &HeatmapArgs) -> i32 {
    let cfg = match config::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };
    let history = match RiskHistory::load(&cfg.history.path) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };
    let cells = history.heatmap();
    if args.json {
        return print_json(&cells);
    }
    if cells.is_empty() {
        println!("no risk history recorded yet");
        return 0;
    }
    print!("{}", render_heatmap(&cells));
    0
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{s}");
            0
        }
        Err(e) => {
            eprintln!("error: failed to serialize output: {e}");
            1
        }
    }
}

fn print_companies(companies: &[InsuranceCompany]) {
    if companies.is_empty() {
        println!("no matching insurers");
        return;
    }
    println!("recommended insurers:");
    for (i, c) in companies.iter().enumerate() {
        println!(
            "  {:>2}. {}  {}  {} enrolled  {}",
            i + 1,
            c.name,
            c.size,
            group_thousands(c.enrollment),
            if c.mobile_enrollment { "mobile" } else { "offline" }
        );
    }
}

fn bucket_counts(companies: &[InsuranceCompany]) -> BTreeMap<SizeBucket, usize> {
    let mut counts = BTreeMap::new();
    for c in companies {
        *counts.entry(c.size).or_insert(0) += 1;
    }
    counts
}

/// `1234567` -> `1,234,567`
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Age groups as rows, regions as columns; empty cells show `-`
fn render_heatmap(cells: &[HeatmapCell]) -> String {
    let mut out = format!("{:<6}", "age");
    for region in Region::ALL {
        out.push_str(&format!("{:>10}", region.label()));
    }
    out.push('\n');
    for age in AgeGroup::ALL {
        if !cells.iter().any(|c| c.age_group == age) {
            continue;
        }
        out.push_str(&format!("{:<6}", age.label()));
        for region in Region::ALL {
            match cells
                .iter()
                .find(|c| c.age_group == age && c.region == region)
            {
                Some(c) => out.push_str(&format!("{:>10.1}", c.mean_risk_score)),
                None => out.push_str(&format!("{:>10}", "-")),
            }
        }
        out.push('\n');
    }
    out
}
