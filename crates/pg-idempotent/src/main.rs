//! pg-idempotent CLI
//!
//! Command-line tool that rewrites PostgreSQL migration files so they can
//! be applied more than once.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use pg_idempotent::files::{self, DEFAULT_BACKUP_DIR};
use pg_idempotent::report;
use pg_idempotent::CliError;
use pg_idempotent_core::{TransformOptions, Transformer};

/// Make PostgreSQL migration scripts safe to re-run.
#[derive(Parser)]
#[command(name = "pg-idempotent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Dollar-quote tag for generated DO blocks.
    #[arg(long, global = true, env = "PG_IDEMPOTENT_TAG", default_value = "pg_idempotent")]
    tag: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a SQL file into its idempotent version.
    Transform {
        /// SQL file to transform.
        input: PathBuf,

        /// Write the result here instead of overwriting the input.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not back up the input before overwriting it.
        #[arg(long)]
        no_backup: bool,

        /// Keep timestamped backups in this directory instead of next to
        /// the input.
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_BACKUP_DIR)]
        backup_dir: Option<PathBuf>,

        /// Skip structural validation of the output.
        #[arg(long)]
        no_validate: bool,

        /// Show statistics before transforming.
        #[arg(long)]
        stats: bool,
    },

    /// Analyze a SQL file without transforming it.
    Check {
        /// SQL file to analyze.
        input: PathBuf,

        /// Print statistics and statements as JSON.
        #[arg(long)]
        json: bool,

        /// Number of statements to list.
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Show the transformed SQL without writing it.
    Preview {
        /// SQL file to preview.
        input: PathBuf,

        /// Number of lines to show.
        #[arg(short = 'n', long, default_value_t = 20)]
        lines: usize,
    },

    /// Transform every matching file in a directory.
    Batch {
        /// Directory containing SQL files.
        directory: PathBuf,

        /// File name pattern (`*` and `?` wildcards).
        #[arg(short, long, default_value = "*.sql")]
        pattern: String,

        /// Write results under this directory instead of in place.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Search subdirectories.
        #[arg(short, long)]
        recursive: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = TransformOptions::new().with_wrapper_tag(&cli.tag)?;

    match cli.command {
        Commands::Transform {
            input,
            output,
            no_backup,
            backup_dir,
            no_validate,
            stats,
        } => {
            let options = if no_validate {
                options.without_validation()
            } else {
                options
            };
            let transformer = Transformer::with_options(options);
            let sql = files::read_sql(&input)?;

            if stats {
                print!("{}", report::render_stats(&transformer.stats(&sql)));
            }

            let result = transformer.transform(&sql);
            if !result.success {
                let err = CliError::TransformFailed {
                    path: input,
                    errors: result.errors,
                };
                eprintln!("Error: {err}");
                return Ok(ExitCode::FAILURE);
            }

            let target = match output {
                Some(path) => path,
                None => {
                    if !no_backup {
                        let backup = match &backup_dir {
                            Some(dir) => files::backup_file(&input, dir)?,
                            None => files::sibling_backup(&input)?,
                        };
                        info!("Backup created: {}", backup.display());
                    }
                    input.clone()
                }
            };
            files::write_sql(&target, &result.transformed_sql)?;

            println!("Transformation completed");
            println!("  - Processed {} statements", result.statement_count);
            println!("  - Transformed {} statements", result.transformed_count);
            print_list("Warnings:", &result.warnings);
            print_list("Errors:", &result.errors);
            if let Some(validation) = &result.validation {
                if validation.valid {
                    println!("Validation passed");
                } else {
                    warn!("Validation found {} issue(s)", validation.issues.len());
                }
            }
            println!("Output written to: {}", target.display());
        }

        Commands::Check { input, json, limit } => {
            let transformer = Transformer::with_options(options);
            let sql = files::read_sql(&input)?;
            let statements = transformer.split_and_classify(&sql);
            let summary = pg_idempotent_core::StatisticsSummary::from_statements(&statements);

            if json {
                let value = serde_json::json!({
                    "file": input.display().to_string(),
                    "summary": summary,
                    "statements": statements,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print!("{}", report::render_stats(&summary));
                print!("{}", report::render_statements(&statements, limit));
            }
        }

        Commands::Preview { input, lines } => {
            let transformer = Transformer::with_options(options);
            let sql = files::read_sql(&input)?;
            let result = transformer.transform(&sql);
            if !result.success {
                let err = CliError::TransformFailed {
                    path: input,
                    errors: result.errors,
                };
                eprintln!("Error: {err}");
                return Ok(ExitCode::FAILURE);
            }

            let name = input.file_name().unwrap_or_default().to_string_lossy();
            println!("Preview: {name}");
            println!("{:-<60}", "");
            print!("{}", report::render_preview(&result.transformed_sql, lines));
        }

        Commands::Batch {
            directory,
            pattern,
            output_dir,
            recursive,
        } => {
            let transformer = Transformer::with_options(options);
            let inputs = files::find_sql_files(&directory, &pattern, recursive)?;
            if inputs.is_empty() {
                warn!("No files found matching pattern: {pattern}");
                return Ok(ExitCode::SUCCESS);
            }
            info!("Found {} files to process", inputs.len());

            let mut succeeded = 0;
            let mut failed = 0;
            for path in &inputs {
                match process_file(&transformer, path, &directory, output_dir.as_deref()) {
                    Ok(()) => succeeded += 1,
                    Err(err) => {
                        failed += 1;
                        eprintln!("  failed: {err}");
                    }
                }
            }

            println!("\nSummary:");
            println!("  - {succeeded} files processed successfully");
            println!("  - {failed} files failed");
            if failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn process_file(
    transformer: &Transformer,
    path: &Path,
    base: &Path,
    output_dir: Option<&Path>,
) -> pg_idempotent::Result<()> {
    let relative = files::relative_path(path, base);
    if files::is_supabase_migration(path) {
        println!("\nProcessing: {} (Supabase migration)", relative.display());
    } else {
        println!("\nProcessing: {}", relative.display());
    }

    let sql = files::read_sql(path)?;
    let result = transformer.transform(&sql);
    if !result.success {
        return Err(CliError::TransformFailed {
            path: path.to_path_buf(),
            errors: result.errors.into_iter().take(2).collect(),
        });
    }

    let target = output_dir.map_or_else(|| path.to_path_buf(), |dir| dir.join(&relative));
    files::write_sql(&target, &result.transformed_sql)?;
    println!(
        "  {}/{} statements transformed",
        result.transformed_count, result.statement_count
    );
    Ok(())
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{title}");
    for item in items {
        println!("  - {item}");
    }
}
