//! # Directory Picker Host Daemon
//!
//! Serves the directory picker channel over stdin/stdout.

use core_types::Platform;
use dirpickerd::{load_settings, HostRuntime, HostRuntimeConfig};
use env_logger::Env;
use std::env;
use std::io;
use std::path::Path;
use std::process;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    let config = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage(&args[0]);
        process::exit(1);
    });

    let mut runtime = HostRuntime::new(config).unwrap_or_else(|e| {
        eprintln!("Failed to create runtime: {}", e);
        process::exit(1);
    });

    let stdin = io::stdin();
    if let Err(e) = runtime.run(stdin.lock(), io::stdout().lock()) {
        eprintln!("Runtime error: {}", e);
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<HostRuntimeConfig, String> {
    let mut config = HostRuntimeConfig::default();
    let mut i = 1;

    // Settings load first so the other flags override them
    if let Some(pos) = args.iter().position(|a| a == "--settings") {
        let path = args
            .get(pos + 1)
            .ok_or_else(|| "Missing value for --settings".to_string())?;
        config.settings = load_settings(Path::new(path))
            .map_err(|e| format!("Failed to read settings file: {}", e))?;
    }

    while i < args.len() {
        match args[i].as_str() {
            "--settings" => {
                i += 1;
            }
            "--platform" | "-p" => {
                i += 1;
                let name = args
                    .get(i)
                    .ok_or_else(|| "Missing value for --platform".to_string())?;
                config.settings.platform =
                    Platform::from_name(name).ok_or_else(|| format!("Invalid platform: {}", name))?;
            }
            "--platform-version" => {
                i += 1;
                let version = args
                    .get(i)
                    .ok_or_else(|| "Missing value for --platform-version".to_string())?;
                config.settings.platform_version = version.clone();
            }
            "--volume" => {
                i += 1;
                let spec = args
                    .get(i)
                    .ok_or_else(|| "Missing value for --volume".to_string())?;
                let (name, root) = spec
                    .split_once('=')
                    .ok_or_else(|| format!("Invalid volume (expected NAME=DIR): {}", spec))?;
                config.settings = config.settings.with_volume(name, root);
            }
            "--choose" | "-c" => {
                i += 1;
                let location = args
                    .get(i)
                    .ok_or_else(|| "Missing value for --choose".to_string())?;
                config.choices.push(location.clone());
            }
            "--max-requests" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| "Missing value for --max-requests".to_string())?;
                config.max_requests = value
                    .parse()
                    .map_err(|_| format!("Invalid max-requests value: {}", value))?;
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other => {
                return Err(format!("Unknown option: {}", other));
            }
        }
        i += 1;
    }

    Ok(config)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --settings <FILE>         Settings file (JSON)");
    eprintln!("  -p, --platform <NAME>     android, ios, macos, linux or windows");
    eprintln!("  --platform-version <V>    Version reported by getPlatformVersion");
    eprintln!("  --volume <NAME=DIR>       Expose DIR as a document volume");
    eprintln!("  -c, --choose <LOCATION>   Location the chooser answers with (repeatable)");
    eprintln!("  --max-requests <N>        Maximum requests to serve (0 = unlimited)");
    eprintln!("  -h, --help                Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --platform linux --choose /srv/data", program);
    eprintln!(
        "  {} --platform android --volume primary=/srv/data --choose content://dirpicker.documents/tree/primary%3A",
        program
    );
}
