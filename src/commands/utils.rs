use crate::output::{generate_text_summary, read_collections};
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Validate a collections JSON file
pub fn validate_collections_file(file_path: PathBuf) -> Result<()> {
    println!("Validating collections: {}", file_path.display());

    let document = read_collections(&file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;

    if document.version != SCHEMA_VERSION {
        log::warn!(
            "File schema v{} differs from current v{}",
            document.version,
            SCHEMA_VERSION
        );
    }

    println!("✓ Valid collections JSON");
    println!("  Version: {}", document.version);
    println!("  Generated: {}", document.generated_at);
    println!("  Collections: {}", document.collections.collections().len());
    println!();
    println!("{}", generate_text_summary(&document));

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Delphes Hists Collections Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string            - Schema version (e.g., '1.0.0')");
        println!("  luminosity: number         - Target luminosity (pb^-1)");
        println!("  cross_section: number?     - Target cross-section (pb), if reweighted");
        println!("  weight_scale: number       - Scale applied to generator weights");
        println!("  events_processed: number   - Events read from the input");
        println!("  events_selected: number    - Events entering event_selection");
        println!("  collections: object        - Collection tree");
        println!("    node: 'group'            - Group or category index");
        println!("      name, kind: string     - Node name, 'group' or 'categories'");
        println!("      children: object       - Key -> child node, in booking order");
        println!("    node: 'collection'       - One histogram bundle");
        println!("      tag: string            - Collection tag (histogram name infix)");
        println!("      events: number         - Fill calls");
        println!("      histograms: object     - Key -> weighted histogram with sumw2");
        println!("      record: object         - Flat record of the last event (-999 = absent)");
        println!("      rows: array            - One record per filled event");
        println!("  generated_at: string       - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Delphes Hists v{}", env!("CARGO_PKG_VERSION"));
    println!("Collections Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Event selection and weighted histogram collections for Delphes-style events.");
}
