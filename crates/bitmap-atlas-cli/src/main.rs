use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bitmap_atlas_core::config::{
    AlgorithmFamily, GuillotineChoice, GuillotineSplit, MaxRectsHeuristic, ScoreMetric,
};
use bitmap_atlas_core::registry::{ComponentKind, ComponentRegistry, ExportKind};
use bitmap_atlas_core::{
    AssetCollector, AtlasExporter, AtlasLayout, AttemptOutcome, Document, PackerConfig,
    pack_blocks, pack_blocks_with, search_rng,
};
use clap::{ArgAction, Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, warn};

mod exporters;
mod panels;

use exporters::{JsonExporter, PreviewExporter, TemplateExporter};
use panels::TemplatePanelGenerator;

#[derive(Parser, Debug)]
#[command(
    name = "bitmap-atlas",
    about = "Pack the bitmaps referenced by an authored document into one atlas",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search orderings and write the atlas layout
    Pack(PackArgs),
    /// List the distinct bitmaps referenced by the document
    Inspect(InspectArgs),
    /// Pack, then generate one source file per panel
    Panels(PanelArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Authored document (JSON)
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Atlas base name (files will be name.json/.png)
    #[arg(short, long, default_value = "atlas", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (overrides layout/search options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    // Layout
    /// Max width
    #[arg(long, default_value_t = 2048, help_heading = "Layout")]
    max_width: u32,
    /// Max height
    #[arg(long, default_value_t = 2048, help_heading = "Layout")]
    max_height: u32,
    /// Border padding (around entire atlas)
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    border_padding: u32,
    /// Padding between images
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    texture_padding: u32,

    // Algorithms/Heuristics/Search
    /// Algorithm: skyline | maxrects | guillotine
    #[arg(long, value_parser = ["skyline", "maxrects", "guillotine"], default_value = "maxrects", help_heading = "Algorithms")]
    algorithm: String,
    /// MaxRects heuristic: baf|bssf|blsf|bl|cp
    #[arg(long, default_value = "baf", help_heading = "Heuristics")]
    heuristic: String,
    /// Guillotine choice: baf|bssf|blsf|waf|wssf|wlsf
    #[arg(long, default_value = "baf", help_heading = "Heuristics")]
    g_choice: String,
    /// Guillotine split: slas|llas|minas|maxas|sas|las
    #[arg(long, default_value = "slas", help_heading = "Heuristics")]
    g_split: String,
    /// Seed for the random orderings (omit for a fresh seed each run)
    #[arg(long, help_heading = "Search")]
    seed: Option<u64>,
    /// Score metric: block_area | bounding_area
    #[arg(long, default_value = "block_area", help_heading = "Search")]
    score_metric: String,
    /// Evaluate attempts in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Search")]
    parallel: bool,

    // Export
    /// Metadata format: json | template
    #[arg(long, default_value = "json", value_parser = ["json", "template"], help_heading = "Export")]
    metadata: String,
    /// External template file (handlebars), used when --metadata template
    #[arg(long, help_heading = "Export")]
    template: Option<PathBuf>,
    /// Write a PNG preview of the layout to this path
    #[arg(long, help_heading = "Export")]
    preview: Option<PathBuf>,
    /// Draw red outlines in the preview
    #[arg(long, default_value_t = false, help_heading = "Export")]
    outlines: bool,
    /// Export layout stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: search and report but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct InspectArgs {
    /// Authored document (JSON)
    input: PathBuf,
}

#[derive(Parser, Debug, Clone)]
struct PanelArgs {
    #[command(flatten)]
    pack: PackArgs,
    /// Panel template (handlebars); a built-in template is used when omitted
    #[arg(long, help_heading = "Panels")]
    panel_template: Option<PathBuf>,
    /// File extension of generated panel sources
    #[arg(long, default_value = "ts", help_heading = "Panels")]
    panel_ext: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet).map(|_| ()),
        Commands::Inspect(args) => run_inspect(args),
        Commands::Panels(args) => run_panels(args, cli.progress && !cli.quiet),
    }
}

fn load_document(path: &Path) -> anyhow::Result<Document> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read document {}", path.display()))?;
    Document::from_json(&text).with_context(|| format!("parse document {}", path.display()))
}

/// Loaded document, collected bitmaps, and the config used; returned so `panels` can reuse them.
struct PackRun {
    doc: Document,
    collector: AssetCollector,
    layout: AtlasLayout,
    yaml: YamlConfig,
}

fn run_pack(args: &PackArgs, show_progress: bool) -> anyhow::Result<Option<PackRun>> {
    let (cfg, yaml) = build_config(args)?;

    if args.print_config {
        match args.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(None);
    }

    let doc = load_document(&args.input)?;
    let mut collector = AssetCollector::new();
    for (index, item) in doc.items.iter().enumerate() {
        collector
            .check_item(index, item)
            .with_context(|| format!("collect bitmaps from {}", args.input.display()))?;
    }
    info!(
        items = doc.items.len(),
        bitmaps = collector.len(),
        "collected bitmaps"
    );

    let layout = search(collector.blocks(), &cfg, show_progress)?;
    collector.commit(&layout);
    info!(
        winner = %layout.winner,
        width = layout.width,
        height = layout.height,
        occupancy = format!("{:.2}%", layout.stats.occupancy * 100.0),
        waste = format!("{:.2}%", layout.stats.waste_percentage()),
        "stats"
    );

    if !args.dry_run {
        fs::create_dir_all(&args.out_dir)
            .with_context(|| format!("create out_dir {}", args.out_dir.display()))?;
        let mut exporters: Vec<Box<dyn AtlasExporter>> = Vec::new();
        match args.metadata.as_str() {
            "template" => {
                let tpl = match &args.template {
                    Some(path) => fs::read_to_string(path)
                        .with_context(|| format!("read template {}", path.display()))?,
                    None => include_str!("templates/atlas.hbs").to_string(),
                };
                exporters.push(Box::new(TemplateExporter::new(
                    args.out_dir.join(format!("{}.template.json", args.name)),
                    tpl,
                    format!("{}.png", args.name),
                )));
            }
            _ => exporters.push(Box::new(JsonExporter::new(
                args.out_dir.join(format!("{}.json", args.name)),
            ))),
        }
        if let Some(path) = &args.preview {
            exporters.push(Box::new(PreviewExporter::new(path.clone(), args.outlines)));
        }
        for exporter in exporters.iter_mut() {
            exporter.export(&layout)?;
        }
    }

    if let Some(stats_path) = &args.export_stats {
        let mut value = serde_json::to_value(layout.stats)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("wasted_area".into(), layout.stats.wasted_area().into());
            obj.insert(
                "waste_percentage".into(),
                serde_json::json!(layout.stats.waste_percentage()),
            );
        }
        if !args.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&value)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!("{}", layout.stats.summary());
        }
    }

    Ok(Some(PackRun {
        doc,
        collector,
        layout,
        yaml,
    }))
}

fn search(
    blocks: &[bitmap_atlas_core::Block],
    cfg: &PackerConfig,
    show_progress: bool,
) -> anyhow::Result<AtlasLayout> {
    if cfg.parallel {
        if !cfg!(feature = "parallel") {
            warn!("--parallel requested but the `parallel` feature is off; running sequentially");
        }
        return Ok(pack_blocks(blocks, cfg)?);
    }
    if !show_progress {
        return Ok(pack_blocks(blocks, cfg)?);
    }

    use indicatif::{ProgressBar, ProgressStyle};
    let total = (blocks.len() + bitmap_atlas_core::ordering::FIXED_ORDERINGS) as u64;
    let bar = ProgressBar::new(total);
    bar.set_style(ProgressStyle::with_template(
        "{spinner:.green} searching {pos}/{len} [{elapsed_precise}] {wide_msg}",
    )?);
    let mut fits = 0usize;
    let mut rng = search_rng(cfg);
    let result = pack_blocks_with(blocks, cfg, cfg, &mut rng, |outcome: &AttemptOutcome| {
        if outcome.is_fit() {
            fits += 1;
        }
        bar.set_message(format!("{} ({} fit)", outcome.label(), fits));
        bar.inc(1);
    });
    bar.finish_and_clear();
    Ok(result?)
}

fn run_inspect(args: &InspectArgs) -> anyhow::Result<()> {
    let doc = load_document(&args.input)?;
    let blocks = AssetCollector::collect(&doc.items)?;
    for b in &blocks {
        let refs: Vec<&str> = b.refs.iter().map(|r| r.name.as_str()).collect();
        println!("{}\t{}x{}\t{}", b.name, b.width, b.height, refs.join(","));
    }
    let total: u64 = blocks.iter().map(|b| b.area()).sum();
    println!(
        "bitmaps={} items={} area={}",
        blocks.len(),
        doc.items.len(),
        total
    );
    Ok(())
}

fn run_panels(args: &PanelArgs, show_progress: bool) -> anyhow::Result<()> {
    let Some(run) = run_pack(&args.pack, show_progress)? else {
        return Ok(());
    };

    let mut registry = ComponentRegistry::with_defaults();
    for c in &run.yaml.components {
        registry.register(c.kind, &c.pattern, c.export)?;
    }
    for (index, item) in run.doc.items.iter().enumerate() {
        registry.add(index, item);
    }

    let tpl = match &args.panel_template {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("read template {}", path.display()))?,
        None => include_str!("templates/panel.hbs").to_string(),
    };
    let generator = TemplatePanelGenerator::new(&tpl)?;
    let written = panels::write_panels(
        &registry,
        &run.doc,
        &run.collector,
        &generator,
        &args.pack.out_dir,
        &args.panel_ext,
        args.pack.dry_run,
    )?;
    info!(panels = written, images = run.layout.records.len(), "panels generated");
    Ok(())
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

fn build_config(args: &PackArgs) -> anyhow::Result<(PackerConfig, YamlConfig)> {
    let (family, mr_heuristic, g_choice, g_split, score_metric) = parse_algo(args)?;
    let cfg = PackerConfig {
        max_width: args.max_width,
        max_height: args.max_height,
        border_padding: args.border_padding,
        texture_padding: args.texture_padding,
        family,
        mr_heuristic,
        g_choice,
        g_split,
        seed: args.seed,
        score_metric,
        parallel: args.parallel,
    };
    // Config file sets layout/search options en bloc
    let yaml = match &args.config {
        Some(path) => {
            let file = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            serde_yaml::from_str::<YamlConfig>(&file)
                .with_context(|| format!("parse config {}", path.display()))?
        }
        None => YamlConfig::default(),
    };
    let cfg = yaml.apply(cfg);
    cfg.validate()?;
    Ok((cfg, yaml))
}

fn parse_algo(
    args: &PackArgs,
) -> anyhow::Result<(
    AlgorithmFamily,
    MaxRectsHeuristic,
    GuillotineChoice,
    GuillotineSplit,
    ScoreMetric,
)> {
    let family: AlgorithmFamily = args
        .algorithm
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown algorithm: {}", args.algorithm))?;
    let h: MaxRectsHeuristic = args
        .heuristic
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown heuristic: {}", args.heuristic))?;
    let g_choice: GuillotineChoice = args
        .g_choice
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown guillotine choice: {}", args.g_choice))?;
    let g_split: GuillotineSplit = args
        .g_split
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown guillotine split: {}", args.g_split))?;
    let metric: ScoreMetric = args
        .score_metric
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown score metric: {}", args.score_metric))?;
    Ok((family, h, g_choice, g_split, metric))
}

/// Extra component pattern from the YAML config.
#[derive(Debug, Deserialize, Clone)]
struct ComponentPattern {
    kind: ComponentKind,
    pattern: String,
    #[serde(default = "default_export_kind")]
    export: ExportKind,
}

fn default_export_kind() -> ExportKind {
    ExportKind::Component
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    family: Option<String>,
    heuristic: Option<String>,
    g_choice: Option<String>,
    g_split: Option<String>,
    max_width: Option<u32>,
    max_height: Option<u32>,
    border_padding: Option<u32>,
    texture_padding: Option<u32>,
    seed: Option<u64>,
    score_metric: Option<String>,
    parallel: Option<bool>,
    #[serde(default)]
    components: Vec<ComponentPattern>,
}

impl YamlConfig {
    fn apply(&self, mut cfg: PackerConfig) -> PackerConfig {
        if let Some(v) = self.max_width {
            cfg.max_width = v;
        }
        if let Some(v) = self.max_height {
            cfg.max_height = v;
        }
        if let Some(v) = self.border_padding {
            cfg.border_padding = v;
        }
        if let Some(v) = self.texture_padding {
            cfg.texture_padding = v;
        }
        if let Some(v) = self.seed {
            cfg.seed = Some(v);
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        if let Some(v) = &self.family {
            cfg.family = parse_or_keep("family", v, cfg.family);
        }
        if let Some(v) = &self.heuristic {
            cfg.mr_heuristic = parse_or_keep("heuristic", v, cfg.mr_heuristic);
        }
        if let Some(v) = &self.g_choice {
            cfg.g_choice = parse_or_keep("g_choice", v, cfg.g_choice);
        }
        if let Some(v) = &self.g_split {
            cfg.g_split = parse_or_keep("g_split", v, cfg.g_split);
        }
        if let Some(v) = &self.score_metric {
            cfg.score_metric = parse_or_keep("score_metric", v, cfg.score_metric);
        }
        cfg
    }
}

/// Parses a YAML enum value; an unknown value keeps `current` and logs a warning.
fn parse_or_keep<T: std::str::FromStr + std::fmt::Debug>(key: &str, value: &str, current: T) -> T {
    match value.parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!(key, value, keeping = ?current, "unknown value in config; ignored");
            current
        }
    }
}
