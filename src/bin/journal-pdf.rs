//! Journal PDF CLI tool
//!
//! Runs the upload service, formats a single manuscript from the command line,
//! or reports what the pipeline would see in an input file.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use journal_pdf::config::{
    Assets, ServiceConfig, DEFAULT_BIND, DEFAULT_BODY_IMAGE, DEFAULT_FOOTER_TEXT,
    DEFAULT_HEADER_IMAGE, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_OFFICE_PROGRAM, DEFAULT_UPLOADS_DIR,
};
use journal_pdf::convert::OfficeConverter;
use journal_pdf::docx::{find_placeholder, SourceDocument, DEFAULT_PLACEHOLDER};
use journal_pdf::pdf::count_pages;
use journal_pdf::pipeline::Pipeline;
use journal_pdf::raster::DEFAULT_DPI;

/// Journal PDF - Format manuscripts with the journal's header, figure and footer
#[derive(Parser)]
#[command(name = "journal-pdf")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Serve the upload form on the default address
    journal-pdf serve

    # Format paper4.docx in the current directory with the fixed file names
    journal-pdf format

    # Format a specific manuscript
    journal-pdf format -i paper.docx -o paper_final.pdf --body-image figure.png

    # Show where the figure placeholder sits
    journal-pdf inspect paper.docx")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the upload service
    Serve {
        /// Address to listen on
        #[arg(long, env = "JOURNAL_PDF_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,

        /// Directory uploads and their PDFs are written to
        #[arg(long, env = "JOURNAL_PDF_UPLOADS", default_value = DEFAULT_UPLOADS_DIR)]
        uploads: PathBuf,

        /// Logo drawn in the header band
        #[arg(long, env = "JOURNAL_PDF_HEADER_IMAGE", default_value = DEFAULT_HEADER_IMAGE)]
        header_image: PathBuf,

        /// Figure inserted at the placeholder
        #[arg(long, env = "JOURNAL_PDF_BODY_IMAGE", default_value = DEFAULT_BODY_IMAGE)]
        body_image: PathBuf,

        /// Office suite executable used for DOCX conversion
        #[arg(long, env = "JOURNAL_PDF_SOFFICE", default_value = DEFAULT_OFFICE_PROGRAM)]
        soffice: String,

        /// Largest accepted request body, in bytes
        #[arg(long, env = "JOURNAL_PDF_MAX_UPLOAD", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
        max_upload_bytes: usize,
    },

    /// Format one manuscript
    Format {
        /// Manuscript to format
        #[arg(short, long, default_value = "paper4.docx")]
        input: PathBuf,

        /// Where the plain conversion is written
        #[arg(long, default_value = "temp_output.pdf")]
        converted: PathBuf,

        /// Formatted output PDF
        #[arg(short, long, default_value = "formatted_paper_with_images_and_footnotes.pdf")]
        output: PathBuf,

        /// Logo drawn in the header band
        #[arg(long, default_value = "picture1.png")]
        header_image: PathBuf,

        /// Figure inserted at the placeholder
        #[arg(long, default_value = "Image1.png")]
        body_image: PathBuf,

        /// Footer text; lines are separated by newlines
        #[arg(long, default_value = DEFAULT_FOOTER_TEXT)]
        footer_text: String,

        /// Token marking where the figure goes
        #[arg(long, default_value = DEFAULT_PLACEHOLDER)]
        placeholder: String,

        /// Resolution written into the figure's metadata
        #[arg(long, default_value_t = DEFAULT_DPI)]
        dpi: u32,

        /// Office suite executable used for DOCX conversion
        #[arg(long, env = "JOURNAL_PDF_SOFFICE", default_value = DEFAULT_OFFICE_PROGRAM)]
        soffice: String,
    },

    /// Show paragraph and placeholder details of a DOCX, or the page count of a PDF
    Inspect {
        /// DOCX or PDF file to inspect
        input: PathBuf,

        /// Token to look for in a DOCX
        #[arg(long, default_value = DEFAULT_PLACEHOLDER)]
        placeholder: String,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            bind, uploads, header_image, body_image, soffice, max_upload_bytes,
        } => {
            let config = ServiceConfig {
                bind,
                uploads_dir: uploads,
                max_upload_bytes,
                office_program: soffice,
                assets: Assets {
                    header_image: Some(header_image),
                    body_image: Some(body_image),
                    ..Assets::default()
                },
            };
            cmd_serve(config)
        }
        Commands::Format {
            input, converted, output, header_image, body_image,
            footer_text, placeholder, dpi, soffice,
        } => {
            let assets = Assets {
                header_image: Some(header_image),
                body_image: Some(body_image),
                footer_text,
                placeholder,
                target_dpi: dpi,
            };
            cmd_format(input, converted, output, assets, soffice)
        }
        Commands::Inspect { input, placeholder } => cmd_inspect(input, &placeholder),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Log to stderr, filtered by `RUST_LOG`
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "journal_pdf=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run the upload service until interrupted
fn cmd_serve(config: ServiceConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(journal_pdf::server::serve(config))?;
    Ok(())
}

/// Convert and format one manuscript
fn cmd_format(
    input: PathBuf,
    converted: PathBuf,
    output: PathBuf,
    assets: Assets,
    soffice: String,
) -> anyhow::Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let pipeline = Pipeline::new(OfficeConverter::new(soffice), assets);

    eprintln!("Formatting {}...", input.display());
    let outcome = pipeline
        .run_with_paths(&input, &converted, &output)
        .with_context(|| format!("failed to format {}", input.display()))?;

    match outcome.report.placeholder_index {
        Some(index) if outcome.report.body_image_drawn => {
            eprintln!("Figure placed for placeholder in paragraph {}", index)
        }
        Some(index) => eprintln!("Placeholder found in paragraph {} but no figure was drawn", index),
        None => eprintln!("No placeholder found"),
    }
    eprintln!("Pages: {}", outcome.report.page_count);
    eprintln!("Output: {}", outcome.final_pdf.display());

    Ok(())
}

/// Print what the pipeline would see in `input`
fn cmd_inspect(input: PathBuf, placeholder: &str) -> anyhow::Result<()> {
    let is_pdf = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    println!("File: {}", input.display());

    if is_pdf {
        let pages = count_pages(&input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        println!("Pages: {}", pages);
        return Ok(());
    }

    let document = SourceDocument::open(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    println!("Paragraphs: {}", document.len());
    match find_placeholder(&document, placeholder) {
        Some(index) => println!("Placeholder {}: paragraph {}", placeholder, index),
        None => println!("Placeholder {}: not found", placeholder),
    }

    Ok(())
}
