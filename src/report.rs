//! Console rendering of command results.

use std::fmt::Write;

use crate::product_type::ProductSelection;
use crate::sync::{ChangeSetOutcome, ProductListing};
use crate::workspace::WriteOutcome;

/// Grouped product listing, one block per product type
pub fn render_listing(listing: &ProductListing) -> String {
    if listing.is_empty() {
        return match listing.selection {
            ProductSelection::All => "No products found in any category".to_string(),
            ProductSelection::One(product_type) => format!("No products found of type: {}", product_type),
        };
    }

    let mut out = String::new();
    for group in &listing.groups {
        let _ = writeln!(out, "\n{} ({} products):", group.product_type, group.names.len());
        for name in &group.names {
            let _ = writeln!(out, "  - {}", name);
        }
    }
    out.trim_end().to_string()
}

pub fn render_write(outcome: &WriteOutcome) -> String {
    match outcome {
        WriteOutcome::Written(path) => format!("  ✓ Data written to {}", path.display()),
        WriteOutcome::Unchanged(path) => format!("  ℹ Data in {} has not changed", path.display()),
    }
}

pub fn render_clone(product: &str, src_version: &str, outcome: &WriteOutcome) -> String {
    match outcome {
        WriteOutcome::Written(_) => render_write(outcome),
        WriteOutcome::Unchanged(_) => format!(
            "  ℹ Data for product {} version {} has not changed",
            product, src_version
        ),
    }
}

/// The request JSON for a dry run, a confirmation line otherwise
pub fn render_change_set(outcome: &ChangeSetOutcome) -> String {
    match outcome {
        ChangeSetOutcome::DryRun { request_json } => request_json.clone(),
        ChangeSetOutcome::Submitted {
            product,
            entity,
            receipt,
        } => {
            let mut out = format!(
                "  ✓ Changeset {} created for product {} ({}) with entity ID {}",
                receipt.change_set_id, product, entity.product_type, entity.entity_id
            );
            if let Some(arn) = &receipt.change_set_arn {
                let _ = write!(out, "\n    ARN: {}", arn);
            }
            out
        }
    }
}
