//! Plain-text yield table for a collections document.

use crate::aggregator::CollectionSnapshot;
use crate::parser::schema::CollectionsFile;

/// Histogram filled exactly once per event, used for weighted yields
const YIELD_KEY: &str = "nLep";

/// Weighted yield and its statistical error for one collection
pub fn collection_yield(collection: &CollectionSnapshot) -> (f64, f64) {
    match collection.histograms.get(YIELD_KEY) {
        Some(h) => {
            let sumw2: f64 = h.sumw2.iter().sum::<f64>() + h.underflow_sumw2 + h.overflow_sumw2;
            (h.total_weight(), sumw2.sqrt())
        }
        None => (0.0, 0.0),
    }
}

/// Render one row per collection, depth-first
///
/// **Public** - printed by `process --summary` and `validate`
pub fn generate_text_summary(document: &CollectionsFile) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "  Luminosity: {} pb^-1   Weight scale: {:.6e}",
        document.luminosity, document.weight_scale
    ));
    if let Some(xs) = document.cross_section {
        lines.push(format!("  Cross-section: {} pb", xs));
    }
    lines.push(format!(
        "  Events processed: {}   selected: {}",
        document.events_processed, document.events_selected
    ));
    lines.push(String::new());

    lines.push("  ┏━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┳━━━━━━━━━━━━┳━━━━━━━━━━━━━━━━━━━━━━━━━━━━┓".to_string());
    lines.push(format!("  ┃ {:<32} ┃ {:^10} ┃ {:^26} ┃", "Collection", "Events", "Yield"));
    lines.push("  ┣━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━╋━━━━━━━━━━━━╋━━━━━━━━━━━━━━━━━━━━━━━━━━━━┫".to_string());

    for (path, collection) in document.collections.collections() {
        let (yield_w, error) = collection_yield(collection);
        lines.push(format!(
            "  ┃ {:<32} ┃ {:>10} ┃ {:>12.4e} ± {:<11.3e} ┃",
            shorten_path(&path),
            collection.events,
            yield_w,
            error
        ));
    }

    lines.push("  ┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┻━━━━━━━━━━━━┻━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".to_string());

    lines.join("\n")
}

/// Keep the last 29 characters of long paths behind a `...` marker
fn shorten_path(path: &str) -> String {
    let len = path.chars().count();
    if len <= 32 {
        return path.to_string();
    }
    let tail: String = path.chars().skip(len - 29).collect();
    format!("...{}", tail)
}
