//! Final run reporting
//!
//! Human-facing summary of what a run did and what the integrity audit still
//! finds missing.

use crate::audit::IntegrityReport;
use crate::state::RunSummary;

/// Prints the end-of-run summary to stdout
pub fn print_summary(summary: &RunSummary, report: &IntegrityReport) {
    println!("=== Crawl Summary ===\n");

    println!("Entities:");
    println!("  Total:   {}", summary.total_entities);
    println!("  Fetched: {}", summary.fetched);
    println!("  Skipped: {}", summary.skipped);
    println!("  Failed:  {}", summary.failed);
    if let Some(last_error) = &summary.last_error {
        println!("  Last error: {}", last_error);
    }
    println!();

    print_report(report);
}

/// Prints the integrity audit breakdown to stdout
pub fn print_report(report: &IntegrityReport) {
    println!("Integrity:");
    println!(
        "  Missing basic data: {}",
        report.missing_basic_data.len()
    );
    println!("  Missing icons:      {}", report.missing_icons.len());
    println!("  Missing details:    {}", report.missing_details.len());

    if report.is_complete() {
        println!("\n✓ Persisted data is complete");
    } else {
        if !report.missing_details.is_empty() {
            println!("\n  Entities missing details: {:?}", report.missing_details);
        }
        if !report.missing_icons.is_empty() {
            println!("  Entities missing icons: {:?}", report.missing_icons);
        }
        if !report.missing_basic_data.is_empty() {
            println!(
                "  Entities missing basic data: {:?}",
                report.missing_basic_data
            );
        }
        println!("\n✗ Persisted data is incomplete; re-run to fetch the rest");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EntityOutcome;

    #[test]
    fn test_summary_counts_flow_through() {
        let mut summary = RunSummary::new(3);
        summary.record(EntityOutcome::Fetched);
        summary.record(EntityOutcome::Skipped);
        summary.record(EntityOutcome::Failed);

        // print_summary only formats; make sure nothing panics on a full struct
        let report = IntegrityReport {
            missing_basic_data: vec![],
            missing_icons: vec![2],
            missing_details: vec![1],
        };
        print_summary(&summary, &report);
        print_report(&IntegrityReport::default());
    }
}
