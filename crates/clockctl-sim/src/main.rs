//! CLI entry point for the clockctl scenario runner and probes.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use clockctl_core::{DividerConfig, FractionalRatio, IntegerRatio, SystemStatus, DEFAULT_IDCODE};
use clockctl_sim::{divider_half_periods, probe_idcode, run_scenario, Scenario, ScenarioReport};
use log::LevelFilter;
use serde as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;

const USAGE_TEXT: &str = "\
Usage: clockctl <command> [options]

Commands:
  run <scenario.json> [--until <t>] [--trace] [--json]  Run a scenario
  idcode [--idcode <hex>]                               Read IDCODE over a probe
  divider --ratio <hex> [--fractional] [--ticks <n>]    Print divider half-periods

Options:
  --until <t>       End time, overriding the scenario's own
  --trace           Print every trace event (run only)
  --json            Print the report as JSON (run only)
  --idcode <hex>    Identification word to configure (default: 0x4D434453)
  --ratio <hex>     Integer code 0-3, or packed N.F byte with --fractional
  --ticks <n>       Source ticks to simulate (default: 64)
  -v, --verbose     Log at debug level to stderr
  -h, --help        Show this help message

Examples:
  clockctl run scenarios/bist_then_drain.json --trace
  clockctl idcode --idcode 0x12345679
  clockctl divider --ratio 0x38 --fractional --ticks 40
";

const DEFAULT_TICKS: u64 = 64;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(RunArgs),
    Idcode(IdcodeArgs),
    Divider(DividerArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    input: PathBuf,
    until: Option<u64>,
    trace: bool,
    json: bool,
    verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct IdcodeArgs {
    idcode: u32,
    verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct DividerArgs {
    config: DividerConfig,
    ticks: u64,
    verbose: bool,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

impl Command {
    const fn verbose(&self) -> bool {
        match self {
            Self::Run(args) => args.verbose,
            Self::Idcode(args) => args.verbose,
            Self::Divider(args) => args.verbose,
        }
    }
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "run" => parse_run_args(args)
            .map(Command::Run)
            .map(ParseResult::Command),
        "idcode" => parse_idcode_args(args)
            .map(Command::Idcode)
            .map(ParseResult::Command),
        "divider" => parse_divider_args(args)
            .map(Command::Divider)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_hex(text: &str) -> Result<u32, String> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16).map_err(|_| format!("invalid hex value: {text}"))
}

fn parse_decimal(text: &str) -> Result<u64, String> {
    text.parse().map_err(|_| format!("invalid decimal value: {text}"))
}

fn option_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String, String> {
    args.next()
        .map(|value| value.to_string_lossy().to_string())
        .ok_or_else(|| format!("missing value for {flag}"))
}

#[allow(clippy::while_let_on_iterator)]
fn parse_run_args(mut args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut until = None;
    let mut trace = false;
    let mut json = false;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }

        if arg == "--trace" {
            trace = true;
            continue;
        }

        if arg == "--json" {
            json = true;
            continue;
        }

        if arg == "--until" {
            until = Some(parse_decimal(&option_value(&mut args, "--until")?)?);
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple scenario paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing scenario path".to_string())?;
    Ok(RunArgs {
        input,
        until,
        trace,
        json,
        verbose,
    })
}

#[allow(clippy::while_let_on_iterator)]
fn parse_idcode_args(mut args: impl Iterator<Item = OsString>) -> Result<IdcodeArgs, String> {
    let mut idcode = DEFAULT_IDCODE;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }

        if arg == "--idcode" {
            idcode = parse_hex(&option_value(&mut args, "--idcode")?)?;
            continue;
        }

        return Err(format!("unknown option: {}", arg.to_string_lossy()));
    }

    Ok(IdcodeArgs { idcode, verbose })
}

#[allow(clippy::while_let_on_iterator)]
fn parse_divider_args(mut args: impl Iterator<Item = OsString>) -> Result<DividerArgs, String> {
    let mut ratio: Option<u32> = None;
    let mut fractional = false;
    let mut ticks = DEFAULT_TICKS;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }

        if arg == "--fractional" {
            fractional = true;
            continue;
        }

        if arg == "--ratio" {
            ratio = Some(parse_hex(&option_value(&mut args, "--ratio")?)?);
            continue;
        }

        if arg == "--ticks" {
            ticks = parse_decimal(&option_value(&mut args, "--ticks")?)?;
            continue;
        }

        return Err(format!("unknown option: {}", arg.to_string_lossy()));
    }

    let ratio = ratio.ok_or_else(|| "missing --ratio".to_string())?;
    let byte = u8::try_from(ratio).map_err(|_| format!("ratio out of range: {ratio:#x}"))?;
    let config = if fractional {
        FractionalRatio::from_byte(byte)
            .map(DividerConfig::Fractional)
            .map_err(|e| e.to_string())?
    } else {
        IntegerRatio::from_code(byte)
            .map(DividerConfig::Integer)
            .map_err(|e| e.to_string())?
    };
    Ok(DividerArgs {
        config,
        ticks,
        verbose,
    })
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    let _ = builder.try_init();
}

fn source_name(source: Option<usize>) -> &'static str {
    match source {
        Some(0) => "A",
        Some(_) => "B",
        None => "none",
    }
}

fn print_status(status: &SystemStatus) {
    let arbiter = &status.arbiter;
    println!(
        "  functional source: {}",
        source_name(status.functional_source)
    );
    println!(
        "  arbiter: requested {:?}, effective {:?}, driving {:?}, test mode {}",
        arbiter.requested, arbiter.effective, arbiter.driving, arbiter.is_test_mode
    );
    println!(
        "  bist: {:?}, {} patterns, active {}, done {}",
        status.bist_state, status.bist_count, status.bist_active, status.bist_done
    );
    println!(
        "  tap: {:?}, instruction {:#06b}",
        status.tap_state, status.instruction
    );
    println!(
        "  queue: {} queued, {} pending, full {}, empty {}",
        status.queue_occupancy, status.pending_items, status.queue_full, status.queue_empty
    );
    let counters = &status.counters;
    println!(
        "  counters: {} delivered, {} refused writes, {} empty reads, {} tap resets, \
         {} handovers, {} bist runs",
        counters.delivered_items,
        counters.refused_writes,
        counters.empty_reads,
        counters.tap_resets,
        counters.selector_handovers,
        counters.completed_bist_runs
    );
}

fn print_report(args: &RunArgs, report: &ScenarioReport) {
    if args.trace {
        for event in &report.trace {
            println!("{event:?}");
        }
    }
    println!(
        "Ran {} to t={} ({} edges)",
        args.input.display(),
        report.status.time,
        report.edges
    );
    print_status(&report.status);
    let received: Vec<String> = report
        .received
        .iter()
        .map(|item| format!("{item:#x}"))
        .collect();
    println!("  received: [{}]", received.join(", "));
}

fn run_run(args: &RunArgs) -> Result<(), i32> {
    let report = Scenario::load(&args.input)
        .and_then(|scenario| run_scenario(&scenario, args.until, args.trace))
        .map_err(|e| {
            eprintln!("error: {e}");
            1
        })?;

    if args.json {
        let text = serde_json::to_string_pretty(&report).map_err(|e| {
            eprintln!("error: failed to encode report: {e}");
            1
        })?;
        println!("{text}");
    } else {
        print_report(args, &report);
    }
    Ok(())
}

fn run_idcode(args: &IdcodeArgs) {
    let probe = probe_idcode(args.idcode);
    println!(
        "IDCODE {:#010x} ({} TCK cycles)",
        probe.value, probe.tck_cycles
    );
}

fn run_divider(args: &DividerArgs) {
    let halves = divider_half_periods(args.config, args.ticks);
    let rendered: Vec<String> = halves.iter().map(ToString::to_string).collect();
    println!("{:?} over {} ticks", args.config, args.ticks);
    println!("half-periods: {}", rendered.join(" "));
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(command)) => {
            init_logging(command.verbose());
            match command {
                Command::Run(args) => match run_run(&args) {
                    Ok(()) => 0,
                    Err(code) => code,
                },
                Command::Idcode(args) => {
                    run_idcode(&args);
                    0
                }
                Command::Divider(args) => {
                    run_divider(&args);
                    0
                }
            }
        }
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}
