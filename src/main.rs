use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use pocketpal::commands::{self, capture::ConfirmationScreen, Command, Input};
use pocketpal::services::workflow::{CaptureWorkflow, ExtractionCompletion};
use pocketpal::settings::{Settings, DEFAULT_CONFIG_PATH};

#[derive(Debug, Parser)]
#[command(name = "pocketpal", about = "Capture expenses from receipts or by hand")]
struct Args {
    /// Optional settings file (TOML).
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    /// Override the currency label.
    #[arg(long, env = "POCKETPAL_CURRENCY")]
    currency: Option<String>,
}

enum Event {
    Input(Input),
    Extraction(ExtractionCompletion),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = Settings::load(&args.config)?;
    if let Some(currency) = args.currency {
        settings.currency = currency;
    }
    pocketpal::init_tracing(&settings.log_level);
    tracing::info!(config = %args.config, currency = %settings.currency, "PocketPal starting");

    let currency = settings.currency.clone();
    let mut workflow = CaptureWorkflow::from_settings(&settings).with_confirmation_sink(Box::new(
        ConfirmationScreen {
            currency: currency.clone(),
        },
    ));

    println!("{}", commands::capture::render(&workflow, &currency));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let event = tokio::select! {
            input = commands::next_input(&mut lines) => Event::Input(input?),
            Some(completion) = workflow.next_completion() => Event::Extraction(completion),
        };

        match event {
            Event::Input(Input::Closed) => break,
            Event::Input(Input::Unreadable(err)) => {
                tracing::warn!(error = %err, "Skipping unreadable input line");
                println!("! Could not read that line: {err}");
            }
            Event::Input(Input::Line(line)) => match commands::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => println!("{}", commands::execute(&mut workflow, command, &currency)),
                Err(err) => println!("! {err}"),
            },
            Event::Extraction(completion) => {
                if workflow.apply_completion(completion) {
                    println!("{}", commands::capture::render(&workflow, &currency));
                }
            }
        }
    }

    tracing::info!(saved = workflow.expenses().len(), "PocketPal exiting");
    Ok(())
}
