//! sheetref CLI - resolve spreadsheet references and evaluate operators

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sheetref_core::{
    Address, AddressCell, CellError, CellValue, ResolvedRange, Workbook, WorkbookMetadata,
};
use sheetref_formula::{
    apply, linest_degree, BinaryOperator, Diagnostic, ReferenceResolver, Severity,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetref")]
#[command(
    author,
    version,
    about = "Spreadsheet reference resolver and operator evaluator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the commands that resolve references
#[derive(clap::Args)]
struct ResolveArgs {
    /// Reference in A1, R1C1, structured or defined-name notation
    reference: String,

    /// Sheet the reference is written on
    #[arg(short, long, default_value = "")]
    sheet: String,

    /// Cell relative references are resolved against, e.g. `Sheet1!C5`
    #[arg(short, long)]
    anchor: Option<String>,

    /// Workbook metadata (sheets, names, tables) as JSON
    #[arg(short, long)]
    workbook: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical address of a reference
    Resolve(ResolveArgs),

    /// Print every cell of a reference, one row per line
    Cells(ResolveArgs),

    /// Evaluate one binary operator, e.g. `apply 5 + "3"`
    Apply {
        /// Left operand (empty string for a blank cell)
        left: String,

        /// Operator symbol or name, e.g. `+`, `&`, `mult`
        op: String,

        /// Right operand (empty string for a blank cell)
        right: String,
    },

    /// Guess the polynomial degree of the LINEST formula at a cell
    Linest {
        /// Sheet-qualified cell holding the formula, e.g. `Report!B5`
        cell: String,

        /// Workbook metadata as JSON
        #[arg(short, long)]
        workbook: PathBuf,
    },

    /// Show the sheets, defined names and tables of a workbook
    Info {
        /// Workbook metadata as JSON
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve(args) => resolve(&args),
        Commands::Cells(args) => list_cells(&args),
        Commands::Apply { left, op, right } => apply_operator(&left, &op, &right),
        Commands::Linest { cell, workbook } => show_linest(&cell, &workbook),
        Commands::Info { input } => show_info(&input),
    }
}

fn load_workbook(path: &Path) -> Result<Workbook> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let metadata: WorkbookMetadata = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse '{}'", path.display()))?;
    Workbook::from_metadata(metadata)
        .with_context(|| format!("Invalid workbook '{}'", path.display()))
}

fn create_address(args: &ResolveArgs) -> Result<Address> {
    let workbook = args.workbook.as_deref().map(load_workbook).transpose()?;
    let resolver = workbook
        .as_ref()
        .map(ReferenceResolver::for_workbook)
        .unwrap_or_default();

    let anchor = args
        .anchor
        .as_deref()
        .map(|a| AddressCell::parse(a).with_context(|| format!("Invalid anchor '{}'", a)))
        .transpose()?;

    resolver
        .create(args.reference.as_str(), &args.sheet, anchor.as_ref())
        .with_context(|| format!("Failed to resolve '{}'", args.reference))
}

fn resolve(args: &ResolveArgs) -> Result<()> {
    let address = create_address(args)?;
    let size = address.size();
    let kind = if address.is_range() { "range" } else { "cell" };

    println!("{}", address);
    println!("  Kind: {}", kind);
    println!("  Size: {} rows x {} columns", size.height, size.width);

    Ok(())
}

fn list_cells(args: &ResolveArgs) -> Result<()> {
    let address = create_address(args)?;
    let size = address.size();
    if !address.boundaries().is_complete() || size.height.saturating_mul(size.width) > 100_000 {
        bail!("{} has too many cells to list", address);
    }

    let mut out = io::stdout().lock();
    let write_row = |out: &mut io::StdoutLock<'_>, row: &[AddressCell]| {
        let line: Vec<String> = row.iter().map(AddressCell::address).collect();
        writeln!(out, "{}", line.join("\t"))
    };

    match address.resolve_range() {
        ResolvedRange::Cell(cell) => writeln!(out, "{}", cell.address()),
        ResolvedRange::Line(cells) => write_row(&mut out, cells.as_slice()),
        ResolvedRange::Grid(rows) => rows
            .iter()
            .try_for_each(|row| write_row(&mut out, row.as_slice())),
    }
    .context("Failed to write to stdout")?;

    Ok(())
}

/// Read an operand the way it would be typed into a cell
fn parse_operand(text: &str) -> CellValue {
    if text.is_empty() {
        return CellValue::Empty;
    }
    if text.eq_ignore_ascii_case("TRUE") {
        return CellValue::Boolean(true);
    }
    if text.eq_ignore_ascii_case("FALSE") {
        return CellValue::Boolean(false);
    }
    if let Some(err) = CellError::from_code(text) {
        return CellValue::Error(err);
    }
    match text.parse::<f64>() {
        Ok(n) => CellValue::Number(n),
        Err(_) => CellValue::string(text),
    }
}

fn apply_operator(left: &str, op: &str, right: &str) -> Result<()> {
    let op: BinaryOperator = op.parse()?;
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    let result = apply(&parse_operand(left), op, &parse_operand(right), &mut diagnostics);

    for diagnostic in &diagnostics {
        let label = match diagnostic.severity {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        };
        eprintln!("{}: {}", label, diagnostic.message);
    }
    println!("{}", result);

    Ok(())
}

fn show_linest(cell: &str, input: &Path) -> Result<()> {
    let workbook = load_workbook(input)?;
    let cell = AddressCell::parse(cell).with_context(|| format!("Invalid cell '{}'", cell))?;

    let (degree, coef) = linest_degree(&workbook, &cell);
    println!("{}", cell);
    println!("  Degree: {}", degree);
    println!("  Coefficient: {}", coef);

    Ok(())
}

fn show_info(input: &Path) -> Result<()> {
    let workbook = load_workbook(input)?;

    println!("File: {}", input.display());
    println!("Sheets: {}", workbook.sheet_count());
    for (i, sheet) in workbook.sheets().enumerate() {
        println!("  Sheet {}: \"{}\"", i, sheet);
    }

    let names = workbook.named_ranges();
    if !names.is_empty() {
        println!();
        println!("Defined names: {}", names.len());
        for name in names.iter() {
            println!("  {} = {}", name.name, name.expression());
        }
    }

    let tables = workbook.tables();
    if !tables.is_empty() {
        println!();
        println!("Tables: {}", tables.len());
        for (table, sheet) in tables.iter() {
            println!(
                "  {} on \"{}\": {} ({} columns)",
                table.name,
                sheet,
                table.reference,
                table.columns.len()
            );
        }
    }

    Ok(())
}
