//! Terminal summaries of cleaning and analysis results

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{
    column_summary, flagged_rows, FeatureRanking, MissingProfile, MutationRecord, OutlierResult,
};

fn section_header(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_indented(table: &Table) {
    // Indent the table
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

/// Summary of a cleaning session
#[derive(Debug, Default)]
pub struct CleaningSummary {
    pub initial_rows: usize,
    pub initial_columns: usize,
    pub final_rows: usize,
    pub final_columns: usize,
    pub changes: Vec<MutationRecord>,
}

impl CleaningSummary {
    pub fn new(initial_shape: (usize, usize)) -> Self {
        Self {
            initial_rows: initial_shape.0,
            initial_columns: initial_shape.1,
            final_rows: initial_shape.0,
            final_columns: initial_shape.1,
            ..Default::default()
        }
    }

    pub fn finish(&mut self, final_shape: (usize, usize), changes: &[MutationRecord]) {
        self.final_rows = final_shape.0;
        self.final_columns = final_shape.1;
        self.changes = changes.to_vec();
    }

    pub fn display(&self) {
        section_header("📋", "CLEANING SUMMARY");

        let mut table = new_table(&["Metric", "Value"]);
        table.add_row(vec![
            Cell::new("📁 Rows"),
            Cell::new(format!("{} → {}", self.initial_rows, self.final_rows)),
        ]);
        table.add_row(vec![
            Cell::new("📊 Columns"),
            Cell::new(format!("{} → {}", self.initial_columns, self.final_columns)),
        ]);
        table.add_row(vec![
            Cell::new("✏️  Changes"),
            Cell::new(self.changes.len()).fg(if self.changes.is_empty() {
                Color::White
            } else {
                Color::Green
            }),
        ]);
        print_indented(&table);

        if self.changes.is_empty() {
            println!();
            println!("      {}", style("No changes made yet.").dim());
            return;
        }

        section_header("📝", "CHANGES LOG");
        let mut log = new_table(&["#", "Kind", "Description"]);
        for record in &self.changes {
            log.add_row(vec![
                Cell::new(record.sequence),
                Cell::new(record.kind()).fg(Color::Yellow),
                Cell::new(record.mutation.describe()),
            ]);
        }
        print_indented(&log);
    }
}

/// Display per-column missing value counts
pub fn display_missing_profile(profiles: &[MissingProfile]) {
    section_header("🕳️ ", "MISSING VALUES");

    let mut table = new_table(&["Column", "Missing", "Ratio"]);
    for profile in profiles {
        let color = if profile.missing == 0 {
            Color::White
        } else {
            Color::Red
        };
        table.add_row(vec![
            Cell::new(&profile.column),
            Cell::new(profile.missing).fg(color),
            Cell::new(format!("{:.1}%", profile.ratio * 100.0)).fg(color),
        ]);
    }
    print_indented(&table);
}

/// Display flagged outliers, at most `limit` rows of detail
pub fn display_outliers(results: &[OutlierResult], limit: usize) {
    section_header("🎯", "OUTLIERS");

    let rows = flagged_rows(results);
    println!(
        "      {} flagged cell(s) across {} row(s)",
        style(results.len()).yellow().bold(),
        style(rows.len()).yellow().bold()
    );
    println!();

    let mut per_column = new_table(&["Column", "Flagged"]);
    for (column, count) in column_summary(results) {
        per_column.add_row(vec![Cell::new(column), Cell::new(count).fg(Color::Red)]);
    }
    print_indented(&per_column);

    if results.is_empty() {
        return;
    }

    println!();
    let mut detail = new_table(&["Row", "Column", "Score"]);
    for result in results.iter().take(limit) {
        detail.add_row(vec![
            Cell::new(result.row),
            Cell::new(&result.column),
            Cell::new(format!("{:.3}", result.score)),
        ]);
    }
    print_indented(&detail);

    if results.len() > limit {
        println!(
            "      {}",
            style(format!("... {} more", results.len() - limit)).dim()
        );
    }
}

/// Display the top `top` features of a ranking
pub fn display_importance(ranking: &FeatureRanking, top: usize) {
    section_header(
        "🏆",
        &format!("TOP FEATURES FOR '{}'", ranking.target.to_uppercase()),
    );

    println!(
        "      {} task on {} row(s) ({} excluded for missing values)",
        style(ranking.task).cyan(),
        style(ranking.rows_used).yellow(),
        style(ranking.rows_excluded).dim()
    );
    println!();

    let mut table = new_table(&["Rank", "Feature", "Importance"]);
    for (rank, entry) in ranking.top(top).iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&entry.feature),
            Cell::new(format!("{:.4}", entry.score)).fg(if rank < 3 {
                Color::Green
            } else {
                Color::White
            }),
        ]);
    }
    print_indented(&table);
}
