// Entry point and high-level CLI flow.
//
// - Option [1] (re)loads both spreadsheet exports, printing diagnostics.
// - Option [2] asks for an optional month/dispatch selection, builds the
//   report, writes the CSV/JSON outputs, and prints markdown previews.
// - Option [3] re-exports the loaded datasets in their source shape.
// - After generating a report, the user can go back to the menu or exit.

use km_report::cache::{DatasetCache, LoadedData, SourcePair};
use km_report::error::Result;
use km_report::filter::{self, ReportFilter};
use km_report::loader::{CancellationColumns, IssuanceColumns, LoadReport};
use km_report::metrics;
use km_report::output;
use km_report::reports;
use km_report::util::{format_int, format_number, format_percent};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;

// Load-once dataset cache so filter changes re-run only the in-memory
// pipeline, not the file reads.
static CACHE: Lazy<Mutex<DatasetCache>> = Lazy::new(|| Mutex::new(DatasetCache::new()));

const ISSUANCES_FILE: &str = "EMISSOES_KM.csv";
const CANCELLATIONS_FILE: &str = "CANCELAMENTOS_KM.csv";

fn sources() -> SourcePair {
    SourcePair {
        issuances: ISSUANCES_FILE.into(),
        cancellations: CANCELLATIONS_FILE.into(),
    }
}

fn load_data() -> Result<LoadedData> {
    let mut cache = CACHE.lock().unwrap();
    cache.load_or_reuse(
        &sources(),
        &IssuanceColumns::default(),
        &CancellationColumns::default(),
    )
}

/// Read a single line of input after printing a prompt.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the menu after generating a report.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_load_diagnostics(name: &str, report: &LoadReport) {
    println!(
        "{}: {} rows loaded",
        name,
        format_int(report.total_rows as i64)
    );
    if !report.missing_columns.is_empty() {
        println!(
            "Note: {} file is missing column(s): {} (affected sections will be skipped)",
            name,
            report.missing_columns.join(", ")
        );
    }
}

/// Handle option [1]: force a fresh read of both source files.
fn handle_load() {
    {
        let mut cache = CACHE.lock().unwrap();
        cache.invalidate();
    }
    match load_data() {
        Ok(data) => {
            print_load_diagnostics("Issuances", &data.issuance_report);
            print_load_diagnostics("Cancellations", &data.cancellation_report);
            println!();
        }
        Err(e) => {
            eprintln!("Failed to load source files: {}\n", e);
        }
    }
}

/// Let the user pick one value from a list, blank meaning "all".
fn pick_from(label: &str, values: &[String]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    println!("Available {}s:", label);
    for (i, v) in values.iter().enumerate() {
        println!("  [{}] {}", i + 1, v);
    }
    let choice = read_line(&format!("Select {} (blank for all): ", label));
    if choice.is_empty() {
        return None;
    }
    match choice.parse::<usize>() {
        Ok(n) if (1..=values.len()).contains(&n) => Some(values[n - 1].clone()),
        _ => {
            println!("Invalid choice, using all {}s.", label);
            None
        }
    }
}

/// Handle option [2]: build the report and write every output file.
///
/// This function is intentionally side-effectful:
/// - writes the timeline, monthly-rate, and category CSV files,
/// - writes the JSON summary,
/// - and prints markdown previews of each section to the console.
fn handle_generate_report() {
    let data = match load_data() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}\n", e);
            return;
        }
    };

    let report_filter = ReportFilter {
        month: pick_from("month", &filter::distinct_months(&data.issuances)),
        dispatch: pick_from("dispatch group", &filter::distinct_dispatches(&data.issuances)),
    };

    println!("\nGenerating report...\n");
    let report = reports::build_report(&data, &report_filter);

    println!(
        "Total issued: {}",
        format_number(report.summary.total_issued, 0)
    );
    println!(
        "Total cancelled: {}",
        format_int(report.summary.total_cancelled as i64)
    );
    println!(
        "Cancellation rate: {} (target {})\n",
        format_percent(report.summary.cancellation_rate, 2),
        format_percent(metrics::TARGET_RATE, 2)
    );

    let timeline = reports::timeline_rows(&report.timeline);
    let file = "report_timeline.csv";
    if let Err(e) = output::write_csv(file, &timeline) {
        eprintln!("Write error: {}", e);
    }
    output::preview_section(
        "Issuances x Cancellations (daily)",
        Some("filtered selection"),
        &timeline,
        5,
    );
    println!("(Full table exported to {})\n", file);

    let monthly = reports::monthly_rate_rows(&report.monthly_rate);
    let file = "report_monthly_rate.csv";
    if let Err(e) = output::write_csv(file, &monthly) {
        eprintln!("Write error: {}", e);
    }
    output::preview_section(
        "Cancellation Rate vs Target (monthly)",
        Some("all months on file"),
        &monthly,
        6,
    );
    println!("(Full table exported to {})\n", file);

    write_breakdown(
        "Issuances by User",
        "report_issuances_by_user.csv",
        report.issuances_by_user.as_deref(),
    );
    write_breakdown(
        "Cancellations by Reason",
        "report_cancellations_by_reason.csv",
        report.cancellations_by_reason.as_deref(),
    );
    write_breakdown(
        "Cancellations by User",
        "report_cancellations_by_user.csv",
        report.cancellations_by_user.as_deref(),
    );

    if let Err(e) = output::write_json("summary.json", &report.summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary stats exported to summary.json\n");
}

fn write_breakdown(
    title: &str,
    file: &str,
    counts: Option<&[km_report::types::CategoryCount]>,
) {
    match counts {
        Some(counts) => {
            let rows = reports::category_rows(counts);
            if let Err(e) = output::write_csv(file, &rows) {
                eprintln!("Write error: {}", e);
            }
            output::preview_section(title, None, &rows, 5);
            println!("(Full table exported to {})\n", file);
        }
        None => {
            println!("Skipping {}: source file has no such column.\n", title);
        }
    }
}

/// Handle option [3]: re-export both loaded datasets in their source shape.
fn handle_export_raw() {
    let data = match load_data() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}\n", e);
            return;
        }
    };
    let rows = reports::issuance_export_rows(&data.issuances);
    if let Err(e) = output::write_csv("emissoes_export.csv", &rows) {
        eprintln!("Write error: {}", e);
    }
    let rows = reports::cancellation_export_rows(&data.cancellations);
    if let Err(e) = output::write_csv("cancelamentos_export.csv", &rows) {
        eprintln!("Write error: {}", e);
    }
    println!("Raw datasets exported to emissoes_export.csv and cancelamentos_export.csv\n");
}

fn main() {
    loop {
        println!("KM Issuance/Cancellation Report");
        println!("[1] Load source files");
        println!("[2] Generate report");
        println!("[3] Export raw datasets\n");
        match read_line("Enter choice: ").as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_generate_report();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => {
                println!();
                handle_export_raw();
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
            }
        }
    }
}
