//! Subcommand runners: load, process, report and save

use std::time::Instant;

use anyhow::{Context, Result};
use console::style;

use super::args::{CleanArgs, ImportanceArgs, InputArgs, OutlierArgs};
use super::prompts::confirm_drop;
use crate::pipeline::{
    analyze_missing_values, flagged_rows, load_table, save_table, Cleaner, FeatureRanker,
    FillValue, Mutation, OutlierDetector, Scalar, Table, TextCleaning,
};
use crate::report::{
    display_importance, display_missing_profile, display_outliers, export_changes_log,
    export_importance, export_outliers, CleaningSummary,
};
use crate::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_count, print_info, print_run_card, print_step_header, print_success,
};

/// Load the input file and apply `--select`.
fn load_input(source: &InputArgs) -> Result<Table> {
    let spinner = create_spinner("Loading dataset...");
    let table = load_table(&source.input, source.format, source.infer_schema_length)?;
    let table = if source.select.is_empty() {
        table
    } else {
        table
            .select(&source.select)
            .context("Failed to select columns")?
    };
    finish_with_success(
        &spinner,
        &format!(
            "Loaded {} rows × {} columns",
            table.height(),
            table.width()
        ),
    );
    Ok(table)
}

pub fn run_clean(args: &CleanArgs) -> Result<()> {
    let output_path = args.output_path();

    print_banner(env!("CARGO_PKG_VERSION"));
    let mut settings = Vec::new();
    if !args.drop_columns.is_empty() {
        settings.push(("Drop columns", args.drop_columns.join(", ")));
    }
    if let Some((start, end)) = args.drop_rows {
        settings.push(("Drop rows", format!("{}..={}", start, end)));
    }
    if let Some(value) = &args.fill_value {
        settings.push(("Fill value", value.clone()));
    } else if args.fill_strategy {
        settings.push(("Fill", "mean / mode".to_string()));
    }
    if !args.clean_text.is_empty() {
        settings.push(("Clean text", args.clean_text.join(", ")));
    }
    print_run_card(&args.source.input, Some(&output_path), &settings);

    print_step_header(1, "Load Dataset");
    let table = load_input(&args.source)?;
    let mut summary = CleaningSummary::new((table.height(), table.width()));
    display_missing_profile(&analyze_missing_values(&table)?);

    let mut cleaner = Cleaner::new(table);
    let mut step = 2;

    if !args.drop_columns.is_empty() {
        print_step_header(step, "Drop Columns");
        step += 1;
        if args.no_confirm || confirm_drop(args.drop_columns.len(), "column(s)")? {
            cleaner.drop_columns(&args.drop_columns)?;
            print_success(&format!("Dropped {}", args.drop_columns.join(", ")));
        } else {
            print_info("Skipped column drop");
        }
    }

    if let Some((start, end)) = args.drop_rows {
        print_step_header(step, "Drop Rows");
        step += 1;
        if args.no_confirm || confirm_drop(end - start + 1, "row(s)")? {
            cleaner.drop_rows(start, end)?;
            print_success(&format!("Dropped rows {}..={}", start, end));
        } else {
            print_info("Skipped row drop");
        }
    }

    if !args.replace.is_empty() {
        print_step_header(step, "Replace Values");
        step += 1;
        for replacement in &args.replace {
            cleaner.search_and_replace(
                &replacement.column,
                replacement.search.clone(),
                replacement.replacement.clone(),
            )?;
            print_success(&format!(
                "{}: {} → {}",
                replacement.column, replacement.search, replacement.replacement
            ));
        }
    }

    if !args.clean_text.is_empty() {
        print_step_header(step, "Normalize Text");
        step += 1;
        let options = if args.thorough {
            TextCleaning::thorough()
        } else {
            TextCleaning::default()
        };
        for column in &args.clean_text {
            cleaner.clean_column_with(column, options)?;
        }
        print_count("text column(s) normalized", args.clean_text.len(), None);
    }

    let fill = match (&args.fill_value, args.fill_strategy) {
        (Some(raw), _) => Some(FillValue::from(Scalar::parse(raw))),
        (None, true) => Some(FillValue::Strategy),
        (None, false) => None,
    };
    if let Some(fill) = fill {
        print_step_header(step, "Fill Missing Values");
        step += 1;
        cleaner.fill_missing_values(fill)?;
        let filled: usize = match cleaner.show_changes_log().last().map(|r| &r.mutation) {
            Some(Mutation::FillMissing { fills }) => fills.iter().map(|f| f.filled).sum(),
            _ => 0,
        };
        print_success(&format!("Filled {} cell(s)", filled));
    }

    print_step_header(step, "Save Results");
    let step_start = Instant::now();
    let spinner = create_spinner("Writing output file...");
    save_table(cleaner.table(), &output_path)?;
    finish_with_success(&spinner, &format!("Saved to {}", output_path.display()));
    println!(
        "      {}",
        style(format!("{:.2}s", step_start.elapsed().as_secs_f64())).dim()
    );

    if let Some(log_path) = &args.log_output {
        export_changes_log(
            cleaner.show_changes_log(),
            (cleaner.original().height(), cleaner.original().width()),
            (cleaner.table().height(), cleaner.table().width()),
            &args.source.input,
            log_path,
        )?;
        print_success(&format!("Change log written to {}", log_path.display()));
    }

    summary.finish(
        (cleaner.table().height(), cleaner.table().width()),
        cleaner.show_changes_log(),
    );
    summary.display();
    print_completion("Cleaning complete!");
    Ok(())
}

pub fn run_outliers(args: &OutlierArgs) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));
    print_run_card(
        &args.source.input,
        args.export.as_deref(),
        &[
            ("Method", args.method.to_string()),
            ("Threshold", format!("{}", args.threshold)),
        ],
    );

    print_step_header(1, "Load Dataset");
    let table = load_input(&args.source)?;

    print_step_header(2, "Outlier Detection");
    let spinner = create_spinner("Scoring numeric columns...");
    let results = OutlierDetector::new(&table).detect(args.method, args.threshold)?;
    if results.is_empty() {
        finish_with_success(&spinner, "No outliers flagged");
    } else {
        finish_with_warning(
            &spinner,
            &format!("{} row(s) flagged", flagged_rows(&results).len()),
        );
    }
    display_outliers(&results, args.limit);

    if let Some(export_path) = &args.export {
        export_outliers(
            &results,
            args.method,
            args.threshold,
            &args.source.input,
            export_path,
        )?;
        print_success(&format!("Results written to {}", export_path.display()));
    }

    print_completion("Outlier detection complete!");
    Ok(())
}

pub fn run_importance(args: &ImportanceArgs) -> Result<()> {
    let config = args.forest_config();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_run_card(
        &args.source.input,
        args.export.as_deref(),
        &[
            ("Target", args.target.clone()),
            ("Trees", config.n_trees.to_string()),
            ("Max depth", config.max_depth.to_string()),
            ("Seed", config.seed.to_string()),
        ],
    );

    print_step_header(1, "Load Dataset");
    let table = load_input(&args.source)?;

    print_step_header(2, "Feature Importance");
    let spinner = create_spinner(&format!("Growing {} trees...", config.n_trees));
    let ranking = FeatureRanker::with_config(&table, config.clone())
        .feature_importance(&args.target)
        .with_context(|| format!("Failed to rank features against '{}'", args.target))?;
    finish_with_success(
        &spinner,
        &format!("Ranked {} feature(s)", ranking.importances.len()),
    );
    display_importance(&ranking, args.top);

    if let Some(export_path) = &args.export {
        export_importance(&ranking, &config, &args.source.input, export_path)?;
        print_success(&format!("Ranking written to {}", export_path.display()));
    }

    print_completion("Feature ranking complete!");
    Ok(())
}
