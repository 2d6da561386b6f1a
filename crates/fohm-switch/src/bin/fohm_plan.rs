#![forbid(unsafe_code)]

use std::process::ExitCode;
use std::sync::Arc;

use fohm_decompose::{BankLayoutProvider, ChannelIndex, StandardLayout};
use fohm_runtime::RuntimeMode;
use fohm_switch::{ResistanceChannel, SimulatedSwitch, configuration_record};

#[derive(Debug, Clone)]
struct CliArgs {
    channel: ChannelIndex,
    mode: RuntimeMode,
    json: bool,
    simulate: bool,
    values: Vec<f64>,
}

#[derive(Debug, Clone)]
enum CliParseError {
    Help,
    Message(String),
}

fn parse_cli_args(args: &[String]) -> Result<CliArgs, CliParseError> {
    let mut channel = 0u8;
    let mut mode = RuntimeMode::Strict;
    let mut json = false;
    let mut simulate = false;
    let mut values = Vec::new();

    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "-h" | "--help" => return Err(CliParseError::Help),
            "--channel" => {
                let Some(value) = args.get(index + 1) else {
                    return Err(CliParseError::Message(String::from(
                        "missing value for --channel",
                    )));
                };
                channel = value.parse().map_err(|_| {
                    CliParseError::Message(format!("invalid channel `{value}`"))
                })?;
                index += 2;
            }
            "--hardened" => {
                mode = RuntimeMode::Hardened;
                index += 1;
            }
            "--json" => {
                json = true;
                index += 1;
            }
            "--simulate" => {
                simulate = true;
                index += 1;
            }
            flag if flag.starts_with("--") => {
                return Err(CliParseError::Message(format!(
                    "unrecognized argument `{flag}`"
                )));
            }
            raw => {
                let value = raw.parse::<f64>().map_err(|_| {
                    CliParseError::Message(format!("invalid resistance `{raw}`"))
                })?;
                values.push(value);
                index += 1;
            }
        }
    }

    if values.is_empty() {
        return Err(CliParseError::Message(String::from(
            "at least one resistance value is required",
        )));
    }
    let channel =
        ChannelIndex::new(channel).map_err(|err| CliParseError::Message(err.to_string()))?;

    Ok(CliArgs {
        channel,
        mode,
        json,
        simulate,
        values,
    })
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} [--channel <n>] [--hardened] [--json] [--simulate] <ohms>...");
    eprintln!("  --channel <n>  resistance channel 0..16 (default 0)");
    eprintln!("  --hardened     cross-check decompositions and verify closures");
    eprintln!("  --json         print configuration records as JSON lines");
    eprintln!("  --simulate     apply each plan to a simulated switch and measure it");
}

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();
    let program = argv
        .first()
        .cloned()
        .unwrap_or_else(|| String::from("fohm-plan"));

    let args = match parse_cli_args(&argv[1..]) {
        Ok(args) => args,
        Err(CliParseError::Help) => {
            print_usage(&program);
            return ExitCode::SUCCESS;
        }
        Err(CliParseError::Message(message)) => {
            eprintln!("{message}");
            print_usage(&program);
            return ExitCode::from(2);
        }
    };

    fohm_switch::init_tracing("warn");

    let layout = match StandardLayout.layout(args.channel) {
        Ok(layout) => layout,
        Err(error) => {
            eprintln!("layout error: {error}");
            return ExitCode::from(2);
        }
    };
    let sim = Arc::new(SimulatedSwitch::new());
    let channel = ResistanceChannel::new(Arc::clone(&sim), layout, args.mode);

    let mut failed = 0usize;
    for &ohms in &args.values {
        let outcome = if args.simulate {
            channel
                .set_resistance(ohms)
                .map(|applied| (applied.decomposition, applied.plan))
        } else {
            channel.plan(ohms)
        };
        let (decomposition, plan) = match outcome {
            Ok(outcome) => outcome,
            Err(error) => {
                eprintln!("{ohms}: {error}");
                failed += 1;
                continue;
            }
        };

        if args.json {
            let record = configuration_record(args.channel, &decomposition, &plan, args.mode);
            println!("{}", record.to_json_line());
            continue;
        }
        println!(
            "{} requested={ohms} quantized={} active={:?} closures={}",
            args.channel,
            decomposition.resistance_ohms(),
            decomposition.active,
            plan.len()
        );
        for pair in &plan {
            println!("  {pair}");
        }
        if args.simulate {
            match sim.measure_resistance(channel.layout()) {
                Some(measured) => println!("  measured={measured}"),
                None => println!("  measured=open"),
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} values failed", args.values.len());
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
