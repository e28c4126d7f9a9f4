//! Process command implementation.
//!
//! The process command:
//! 1. Loads the analysis config
//! 2. Resolves the input event files
//! 3. Computes the event weight scale (with an optional cross-section pre-pass)
//! 4. Books the collection tree
//! 5. Fills it, sequentially or in parallel shards
//! 6. Finalizes and writes the collections

use crate::aggregator::{
    Aggregatable, Aggregator, AggregatorGroup, CategoryIndex, PairAssignmentSolver, Snapshot,
};
use crate::output::{generate_text_summary, write_collections};
use crate::parser::{read_events, resolve_inputs, CollectionsFile, EventReader, RawEvent};
use crate::selection::{NormalizedEvent, SelectionProfile};
use crate::utils::config::{
    load_config, AnalysisConfig, DEFAULT_LUMINOSITY, PROGRESS_INTERVAL, SCHEMA_VERSION,
};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::{debug, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Key of the collection filled with every event
pub const ALL_EVENTS_KEY: &str = "all_events";

/// Key of the collection filled with events passing the lepton requirement
pub const EVENT_SELECTION_KEY: &str = "event_selection";

/// Arguments for the process command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ProcessArgs {
    /// Single event file or list file of event paths
    pub input: PathBuf,

    /// Output path for the JSON collections
    pub output: PathBuf,

    /// Target integrated luminosity (pb^-1)
    pub luminosity: f64,

    /// Target cross-section (pb); 0 keeps the generator normalisation
    pub cross_section: f64,

    /// Optional TOML analysis config
    pub config: Option<PathBuf>,

    /// Number of parallel shards (1 = sequential)
    pub jobs: usize,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for ProcessArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::from("hists.json"),
            luminosity: DEFAULT_LUMINOSITY,
            cross_section: 0.0,
            config: None,
            jobs: 1,
            print_summary: false,
        }
    }
}

/// Collection tree plus the counters the output document reports
///
/// One instance per shard; shards are combined with [`merge_shard`](Self::merge_shard).
#[derive(Debug, Clone)]
struct Analysis {
    profile: SelectionProfile,
    min_leptons: usize,
    scale: f64,
    root: AggregatorGroup,
    processed: u64,
    selected: u64,
}

impl Analysis {
    fn new(config: &AnalysisConfig, scale: f64) -> Result<Self> {
        Ok(Self {
            profile: SelectionProfile::from_cuts(&config.cuts),
            min_leptons: config.min_leptons,
            scale,
            root: book_collections(config)?,
            processed: 0,
            selected: 0,
        })
    }

    /// Select one raw event and route it
    fn process(&mut self, raw: &RawEvent) -> Result<()> {
        let event = NormalizedEvent::new(raw, &self.profile);
        let weight = event.weight() * self.scale;

        self.root.tag_fill(&event, ALL_EVENTS_KEY, weight)?;
        if event.sorted_leptons().len() >= self.min_leptons {
            self.root.tag_fill(&event, EVENT_SELECTION_KEY, weight)?;
            self.selected += 1;
        }
        self.processed += 1;

        Ok(())
    }

    /// Fold a later shard into this one
    fn merge_shard(&mut self, mut shard: Analysis) -> Result<()> {
        self.root.merge(&shard.root)?;
        self.root.append_rows(&mut shard.root);
        self.processed += shard.processed;
        self.selected += shard.selected;
        Ok(())
    }
}

/// Book the `all_events` and `event_selection` multiplicity categories
///
/// **Public** - the tree every run fills, exposed for library users
pub fn book_collections(config: &AnalysisConfig) -> Result<AggregatorGroup> {
    let solver = PairAssignmentSolver::new(config.pair_target_mass);
    let make = |tag: &str| {
        Aggregator::new(tag)
            .with_rows(config.store_rows)
            .with_solver(solver)
    };

    let mut root = AggregatorGroup::new("collections").with_strict_routing(true);
    for key in [ALL_EVENTS_KEY, EVENT_SELECTION_KEY] {
        root.register(
            key,
            CategoryIndex::new(key, config.max_jet_multiplicity, make),
        )?;
    }
    Ok(root)
}

/// Execute the process command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Config or input files that cannot be read or parsed
/// * An event without missing energy
/// * A zero sum of weights when reweighting to a cross-section
/// * Output write failures
///
/// # Example
/// ```ignore
/// let args = ProcessArgs {
///     input: PathBuf::from("ttbar.jsonl"),
///     output: PathBuf::from("ttbar_hists.json"),
///     ..Default::default()
/// };
/// execute_process(args)?;
/// ```
pub fn execute_process(args: ProcessArgs) -> Result<CollectionsFile> {
    let start_time = Instant::now();

    info!("Step 1/6: Loading analysis config...");
    let config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    debug!("Analysis config: {:?}", config);

    info!("Step 2/6: Resolving input files...");
    let files = resolve_inputs(&args.input)
        .with_context(|| format!("Failed to resolve input {}", args.input.display()))?;

    info!("Step 3/6: Computing weight scale...");
    let mut scale = args.luminosity / files.len() as f64;
    if args.cross_section > 0.0 {
        let sum_weights = sum_weights(&files)?;
        if sum_weights == 0.0 {
            bail!("Sum of event weights is zero, cannot normalise to a cross-section");
        }
        info!(
            "Sum of weights {:.6e}, reweighting to {} pb",
            sum_weights, args.cross_section
        );
        scale *= args.cross_section / sum_weights;
    }
    info!("Weight scale: {:.6e}", scale);

    info!("Step 4/6: Booking collections...");
    let template = Analysis::new(&config, scale)?;

    info!("Step 5/6: Filling collections...");
    let mut analysis = if args.jobs > 1 {
        fill_sharded(template, &files, args.jobs)?
    } else {
        fill_sequential(template, files)?
    };
    analysis.root.finalize()?;
    info!(
        "Processed {} events, {} selected",
        analysis.processed, analysis.selected
    );

    info!("Step 6/6: Writing collections...");
    let Snapshot::Group(collections) = analysis.root.write() else {
        bail!("Collection root did not produce a group snapshot");
    };
    let document = CollectionsFile {
        version: SCHEMA_VERSION.to_string(),
        luminosity: args.luminosity,
        cross_section: (args.cross_section > 0.0).then_some(args.cross_section),
        weight_scale: scale,
        events_processed: analysis.processed,
        events_selected: analysis.selected,
        collections,
        generated_at: Utc::now().to_rfc3339(),
    };

    write_collections(&document, &args.output).context("Failed to write collections JSON")?;
    info!("✓ Collections written to: {}", args.output.display());

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("COLLECTION SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Input:  {}", args.input.display());
        println!("Output: {}", args.output.display());
        println!("\n{}", generate_text_summary(&document));
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!("Processing completed in {:.2}s", elapsed.as_secs_f64());

    Ok(document)
}

/// Sum of generator weights over every input event
///
/// A missing weight counts as 0.
fn sum_weights(files: &[PathBuf]) -> Result<f64> {
    let mut sum = 0.0;
    for event in EventReader::new(files.to_vec()) {
        let event = event.context("Failed to read event during sum-of-weights pass")?;
        sum += event.weight.unwrap_or(0.0);
    }
    Ok(sum)
}

fn fill_sequential(mut analysis: Analysis, files: Vec<PathBuf>) -> Result<Analysis> {
    for (index, event) in EventReader::new(files).enumerate() {
        if index % PROGRESS_INTERVAL == 0 {
            info!("Processing event {}", index);
        }
        let event = event.context("Failed to read event")?;
        analysis
            .process(&event)
            .with_context(|| format!("Failed to process event {}", index))?;
    }
    Ok(analysis)
}

/// Fill contiguous shards in parallel, then merge them in shard order
fn fill_sharded(template: Analysis, files: &[PathBuf], jobs: usize) -> Result<Analysis> {
    let events = read_events(files).context("Failed to read events")?;
    let shard_len = events.len().div_ceil(jobs).max(1);
    info!(
        "Filling {} events in {} shards of up to {}",
        events.len(),
        events.len().div_ceil(shard_len),
        shard_len
    );

    let shards: Vec<Result<Analysis>> = events
        .par_chunks(shard_len)
        .enumerate()
        .map(|(shard, chunk)| {
            let mut analysis = template.clone();
            let offset = shard * shard_len;
            for (i, event) in chunk.iter().enumerate() {
                analysis
                    .process(event)
                    .with_context(|| format!("Failed to process event {}", offset + i))?;
            }
            debug!("Shard {} filled {} events", shard, chunk.len());
            Ok(analysis)
        })
        .collect();

    let mut total = template;
    for shard in shards {
        total.merge_shard(shard?)?;
    }
    Ok(total)
}

/// Validate process arguments
///
/// **Public** - can be called before execute_process for early validation
pub fn validate_args(args: &ProcessArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        bail!("Input path cannot be empty");
    }

    if !args.input.exists() {
        bail!("Input {} does not exist", args.input.display());
    }

    if !args.luminosity.is_finite() || args.luminosity <= 0.0 {
        bail!("Luminosity must be a positive number");
    }

    if !args.cross_section.is_finite() || args.cross_section < 0.0 {
        bail!("Cross-section must be zero or a positive number");
    }

    if args.jobs == 0 {
        bail!("jobs must be greater than 0");
    }

    if let Some(config) = &args.config {
        if !Path::new(config).is_file() {
            bail!("Config file {} does not exist", config.display());
        }
    }

    Ok(())
}
