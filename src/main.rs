use colored::Colorize;
use flote::testbench::Testbench;
use std::collections::HashMap;
use std::env;
use std::process::ExitCode;

/// Thin CLI wrapper: elaborate a source file, optionally drive it with a
/// line-oriented stimulus script, and optionally write the resulting VCD.
/// Carries no simulation logic of its own; see [`flote::testbench`].
fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{}: {}", "error".red().bold(), msg);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let mut source_path: Option<&str> = None;
    let mut stimulus_path: Option<&str> = None;
    let mut vcd_path: Option<&str> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--stimulus" => {
                i += 1;
                stimulus_path = Some(args.get(i).ok_or("--stimulus requires a path")?);
            }
            "--vcd" => {
                i += 1;
                vcd_path = Some(args.get(i).ok_or("--vcd requires a path")?);
            }
            other => source_path = Some(other),
        }
        i += 1;
    }
    let source_path = source_path.ok_or("usage: flote <source.flote> [--stimulus <path>] [--vcd <path>]")?;

    let mut tb = flote::elaborate_file(source_path).map_err(|e| e.to_string())?;

    for warning in tb.warnings() {
        eprintln!("{}", warning);
    }

    if let Some(path) = stimulus_path {
        let script = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        drive(&mut tb, &script).map_err(|e| e.to_string())?;
    }

    if let Some(path) = vcd_path {
        tb.save_vcd(path).map_err(|e| e.to_string())?;
    } else {
        println!("{}", tb.dump_vcd());
    }

    Ok(())
}

/// Runs a minimal stimulus script: one instruction per line, either
/// `wait <ticks>` or `update <id>=<bits>[,<id>=<bits>]*`.
fn drive(tb: &mut Testbench, script: &str) -> Result<(), String> {
    for line in script.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| format!("malformed stimulus line: {:?}", line))?;
        match command {
            "wait" => {
                let ticks: u64 = rest.trim().parse().map_err(|_| format!("invalid tick count: {:?}", rest))?;
                tb.wait(ticks);
            }
            "update" => {
                let mut stimulus = HashMap::new();
                for pair in rest.trim().split(',') {
                    let (id, bits) = pair.split_once('=').ok_or_else(|| format!("malformed stimulus entry: {:?}", pair))?;
                    stimulus.insert(id.trim().to_string(), bits.trim().to_string());
                }
                tb.update(&stimulus).map_err(|e| e.to_string())?;
            }
            other => return Err(format!("unknown stimulus command: {:?}", other)),
        }
    }
    Ok(())
}
