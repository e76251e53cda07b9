// Command-line interface for bridgefmt
//
// This binary converts message content between Matrix and Slack using the bridgefmt-babel library.
// Lookups (users, rooms, media) are answered from the [lookup] tables of the configuration, see
// resolver.rs.
//
// Usage:
//  bridgefmt to-slack <event.json> [--config <path>] [-o <file>]    - Matrix content → Slack message
//  bridgefmt to-matrix <message.json> [--config <path>] [-o <file>] - Slack message → Matrix content
//  bridgefmt inspect <event.json> [--config <path>]                 - Blocks, text and flattened blocks
//
// Input may be a bare message or a whole event (Matrix `content`, Slack `event` are unwrapped).
// `-` reads standard input. Logging goes to stderr and is controlled by BRIDGEFMT_LOG.

mod resolver;

use anyhow::{Context, Result};
use bridgefmt_babel::{
    flatten_blocks, InboundOptions, MatrixMessage, MatrixMessageParser, OutboundOptions,
    SlackMessage, SlackMessageParser,
};
use bridgefmt_config::{BridgeConfig, Loader};
use clap::{Arg, ArgMatches, Command, ValueHint};
use resolver::StaticResolver;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fs;
use std::io::Read;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "BRIDGEFMT_LOG";

fn input_arg(help: &'static str) -> Arg {
    Arg::new("input")
        .help(help)
        .required(true)
        .value_hint(ValueHint::FilePath)
}

fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .help("Write the result to FILE instead of stdout")
        .value_hint(ValueHint::FilePath)
}

fn build_cli() -> Command {
    Command::new("bridgefmt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert rich text between Matrix and Slack")
        .long_about(
            "bridgefmt converts message formatting for a Matrix <-> Slack bridge.\n\n\
            Commands:\n  \
            - to-slack:  Matrix HTML content to Slack mrkdwn text and blocks\n  \
            - to-matrix: Slack text, blocks and attachments to Matrix HTML\n  \
            - inspect:   Show the block tree next to the text it should flatten to\n\n\
            Examples:\n  \
            bridgefmt to-slack event.json                 # Print the Slack message\n  \
            bridgefmt to-matrix message.json -o out.json  # Write the Matrix content\n  \
            cat event.json | bridgefmt inspect -          # Read from stdin",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a bridgefmt.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("to-slack")
                .about("Convert Matrix message content into a Slack message")
                .arg(input_arg("Matrix event or content JSON ('-' for stdin)"))
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("to-matrix")
                .about("Convert a Slack message into Matrix message content")
                .arg(input_arg("Slack message or event JSON ('-' for stdin)"))
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show the blocks and text produced from Matrix content")
                .arg(input_arg("Matrix event or content JSON ('-' for stdin)")),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let matches = build_cli().get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()))?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let (name, sub_matches) = matches
        .subcommand()
        .context("missing subcommand, use --help for usage information")?;
    let input = sub_matches
        .get_one::<String>("input")
        .context("input is required")?;
    let output = sub_matches
        .try_get_one::<String>("output")
        .ok()
        .flatten()
        .map(|s| s.as_str());

    let result = match name {
        "to-slack" => runtime.block_on(handle_to_slack(input, &config))?,
        "to-matrix" => runtime.block_on(handle_to_matrix(input, &config))?,
        "inspect" => runtime.block_on(handle_inspect(input, &config))?,
        other => anyhow::bail!("unknown subcommand '{other}'"),
    };
    write_output(output, &result)
}

/// Handle the to-slack command
async fn handle_to_slack(input: &str, config: &BridgeConfig) -> Result<Value> {
    let message: MatrixMessage = read_message(input, "content")?;
    let resolver = StaticResolver::new(config.lookup.clone());
    let parser = MatrixMessageParser::new(InboundOptions::from(config.inbound.clone()));

    let slack = parser
        .format_message(&resolver, &message)
        .await
        .context("conversion to Slack failed")?;
    Ok(serde_json::to_value(slack)?)
}

/// Handle the to-matrix command
async fn handle_to_matrix(input: &str, config: &BridgeConfig) -> Result<Value> {
    let message: SlackMessage = read_message(input, "event")?;
    let resolver = StaticResolver::new(config.lookup.clone());
    let parser = SlackMessageParser::new(OutboundOptions::from(config.outbound.clone()));

    let matrix = parser
        .format_message(&resolver, &message)
        .await
        .context("conversion to Matrix failed")?;
    Ok(serde_json::to_value(matrix)?)
}

/// Handle the inspect command
async fn handle_inspect(input: &str, config: &BridgeConfig) -> Result<Value> {
    let message: MatrixMessage = read_message(input, "content")?;
    let resolver = StaticResolver::new(config.lookup.clone());
    let options = InboundOptions::from(config.inbound.clone());
    let parser = MatrixMessageParser::new(options.clone());

    let slack = parser
        .format_message(&resolver, &message)
        .await
        .context("conversion to Slack failed")?;
    let blocks = slack.blocks.unwrap_or_default();
    let flattened = flatten_blocks(&blocks, &options);
    let consistent = flattened.trim_end() == slack.text.trim_end();

    Ok(json!({
        "consistent": consistent,
        "text": slack.text,
        "flattened": flattened,
        "blocks": blocks,
    }))
}

/// Reads a JSON document, unwrapping `wrapper` when the input is a whole event.
fn read_message<T: DeserializeOwned>(input: &str, wrapper: &str) -> Result<T> {
    let source = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        buffer
    } else {
        fs::read_to_string(input).with_context(|| format!("failed to read file '{input}'"))?
    };

    let mut value: Value =
        serde_json::from_str(&source).with_context(|| format!("'{input}' is not valid JSON"))?;
    let inner = value
        .get_mut(wrapper)
        .filter(|v| v.is_object())
        .map(Value::take);
    if let Some(inner) = inner {
        debug!(wrapper, "unwrapping event");
        value = inner;
    }
    serde_json::from_value(value).with_context(|| format!("'{input}' is not a message"))
}

fn write_output(output: Option<&str>, value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => fs::write(path, format!("{text}\n"))
            .with_context(|| format!("failed to write file '{path}'")),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> Result<BridgeConfig> {
    let loader = Loader::new().with_optional_file("bridgefmt.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().context("failed to load configuration")
}
