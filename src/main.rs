// orcamento-pdf: Generate customer quotes for Vidraçaria Ambires

use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

use orcamento_pdf::session::{self, Action};
use orcamento_pdf::{generate_quote_to, quote_file_name, AppError, Field, QuoteDraft};

// ============================================================================
// Data Structures
// ============================================================================

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Gera orçamentos em PDF para a Vidraçaria Ambires")]
struct Args {
    /// Session script (JSON array of form actions), applied first
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Customer name
    #[arg(short, long)]
    name: Option<String>,

    /// Customer CNPJ or CPF (punctuation optional)
    #[arg(short = 'c', long)]
    tax_id: Option<String>,

    /// Customer phone (punctuation optional)
    #[arg(short, long)]
    phone: Option<String>,

    /// Line item as "DESCRIPTION;QUANTITY;COLOR" (repeatable)
    #[arg(short, long = "item")]
    items: Vec<String>,

    /// Observations printed in the footer
    #[arg(long)]
    observations: Option<String>,

    /// Total amount in cents, digits only (e.g. 250000 for R$ 2.500,00)
    #[arg(short, long)]
    total: Option<String>,

    /// Quote date (YYYY-MM-DD or DD/MM/YYYY, defaults to today; empty for none)
    #[arg(short, long)]
    date: Option<String>,

    /// Output filename (defaults to orcamento<date>.pdf in --out-dir)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for the default output filename
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Erro: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), AppError> {
    let mut draft = QuoteDraft::new();

    if let Some(path) = &args.script {
        let actions = session::load_script(path)?;
        session::replay(&mut draft, &actions)?;
    }

    let actions = flag_actions(&args)?;
    session::replay(&mut draft, &actions)?;

    let output_file = args
        .output
        .unwrap_or_else(|| args.out_dir.join(quote_file_name(draft.quote_date())));

    generate_quote_to(&draft, &output_file)?;

    println!("✓ Gerado: {}", output_file.display());
    if !draft.customer().name.is_empty() {
        println!("  Cliente: {}", draft.customer().name);
    }
    println!("  Data: {}", draft.display_value(Field::QuoteDate));
    println!("  Itens: {}", draft.items().len());
    if let Some(total) = draft.total_amount_display() {
        println!("  Total: {}", total);
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Command-line fields as form actions, in form order.
fn flag_actions(args: &Args) -> Result<Vec<Action>, AppError> {
    let mut actions = Vec::new();

    let fields = [
        (Field::QuoteDate, &args.date),
        (Field::CustomerName, &args.name),
        (Field::CustomerTaxId, &args.tax_id),
        (Field::CustomerPhone, &args.phone),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            actions.push(Action::set(field, value));
        }
    }

    for item in &args.items {
        actions.extend(session::item_actions(item)?);
    }

    if let Some(observations) = &args.observations {
        actions.push(Action::set(Field::Observations, observations));
    }
    if let Some(total) = &args.total {
        actions.push(Action::set(Field::TotalAmount, total));
    }

    Ok(actions)
}
