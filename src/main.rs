//! asksql CLI Entry Point
//!
//! Connects to MySQL, then answers questions until `quit`.
//! Answers go to stdout. Logs go to stderr.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use asksql::{
    logging, CompletionClient, ConfigArgs, GeminiGenerator, MySqlDatabase, OutputFormat,
    QueryExecutor, Session, Translator,
};

/// asksql - ask a MySQL database questions in plain language
#[derive(Parser)]
#[command(name = "asksql")]
#[command(about = "Translate questions into read-only SQL and run them against MySQL")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Print answers as JSON lines
    #[arg(long)]
    json: bool,

    /// Answer a single question and exit
    #[arg(short, long)]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();

    let settings = match cli.config.resolve() {
        Ok(settings) => settings,
        Err(err) => {
            error!(error_code = err.error_code(), "invalid configuration");
            eprintln!("{}", err.message());
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Connecting to MySQL…");
    let db = match MySqlDatabase::connect(&settings.connection).await {
        Ok(db) => db,
        Err(err) => {
            error!(error_code = err.error_code(), "startup connection failed");
            eprintln!("MySQL connection failed: {}", err.message());
            return ExitCode::FAILURE;
        }
    };

    let format = if cli.json { OutputFormat::Json } else { OutputFormat::Text };
    let generator = GeminiGenerator::new(settings.api_key.clone())
        .with_timeout(settings.generation_timeout);
    let completion = CompletionClient::new(generator, settings.model.clone(), settings.retry);
    info!(model = completion.model(), "ready for questions");

    let outcome = {
        let session = Session::new(
            Translator::new(&db, &completion),
            QueryExecutor::new(&db)
                .with_max_display_rows(settings.max_display_rows)
                .with_timeout(settings.query_timeout),
        );
        run(&session, cli.question.as_deref(), format).await
    };

    if let Err(err) = db.close().await {
        error!(error_code = err.error_code(), error = %err, "failed to close connection pool");
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    session: &Session<'_, MySqlDatabase, GeminiGenerator>,
    question: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match question {
        Some(question) => {
            let answer = session.answer(question).await;
            format.write(&mut io::stdout(), &answer).context("failed to write answer")
        }
        None => session.run(format).await.context("interactive session failed"),
    }
}
