//! dbcon demo binary
//!
//! Run with: cargo run -- [options]
//!
//! Options:
//!   --config <path>   JSON engine configuration
//!   --script <path>   Replay JSON-line commands ("-" reads stdin)
//!   --headless        Run the script on the in-memory console and print
//!                     the visible surface after the responses
//!
//! Without a script, draws a frame on the terminal and echoes each decoded
//! key until Esc is pressed.

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use log::{info, warn};

use dbcon::protocol::{parse_command, serialize_response};
use dbcon::renderer::ansi_ibm::cp437_to_char;
use dbcon::{
    Console, ConsoleEngine, CursorPosition, EngineConfig, MemoryConsole, Rectangle, Response,
    Session, Surface, Target, TerminalConsole,
};

/// Raw code of the Escape key
const ESC: i32 = 0x1B;

/// Window size of the headless console
const HEADLESS_SIZE: (usize, usize) = (80, 25);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<String> = None;
    let mut script_path: Option<String> = None;
    let mut headless = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "--script" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: {} requires a path", args[i]);
                    std::process::exit(1);
                }
                let value = Some(args[i + 1].clone());
                if args[i] == "--config" {
                    config_path = value;
                } else {
                    script_path = value;
                }
                i += 2;
            }
            "--headless" => {
                headless = true;
                i += 1;
            }
            "--help" | "-h" => {
                println!("dbcon-demo v0.1.0");
                println!();
                println!("Usage: dbcon-demo [--config <path>] [--script <path>] [--headless]");
                println!();
                println!("Options:");
                println!("  --config <path>  JSON engine configuration");
                println!("  --script <path>  Replay JSON-line commands (\"-\" for stdin)");
                println!("  --headless       Use the in-memory console and print the result");
                println!("  --help, -h       Show this help");
                std::process::exit(0);
            }
            other => {
                eprintln!("Error: unknown argument '{}'", other);
                std::process::exit(1);
            }
        }
    }

    let config = match &config_path {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    info!("Configuration: {:?}", config);

    match script_path {
        Some(path) => {
            let reader: Box<dyn BufRead> = if path == "-" {
                Box::new(BufReader::new(io::stdin()))
            } else {
                Box::new(BufReader::new(File::open(&path)?))
            };

            if headless {
                let (cols, rows) = HEADLESS_SIZE;
                let engine = ConsoleEngine::new(MemoryConsole::new(cols, rows), config);
                let session = run_script(Session::new(engine), reader)?;
                if let Some(surface) = session.engine().surface(Target::Visible) {
                    let grid = surface.grid();
                    // Blank line between the responses and the screen dump
                    println!();
                    for row in 0..grid.dimensions().rows {
                        let line: String = grid
                            .row(row)
                            .unwrap_or_default()
                            .iter()
                            .map(|cell| cp437_to_char(cell.glyph))
                            .collect();
                        println!("{}", line.trim_end());
                    }
                }
            } else {
                let engine = ConsoleEngine::new(TerminalConsole::new(), config);
                run_script(Session::new(engine), reader)?;
            }
        }
        None => {
            if headless {
                warn!("--headless has no effect without --script");
            }
            run_interactive(config)?;
        }
    }

    Ok(())
}

/// Replay JSON-line commands, writing one response per line to stdout
fn run_script<C: Console>(
    mut session: Session<C>,
    reader: Box<dyn BufRead>,
) -> io::Result<Session<C>> {
    let mut out = io::stdout().lock();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let response = match parse_command(trimmed) {
            Ok(cmd) => session.apply(cmd),
            Err(e) => Response::Error {
                message: format!("invalid command: {}", e),
            },
        };
        writeln!(out, "{}", serialize_response(&response))?;
    }
    Ok(session)
}

/// Echo decoded keys inside a frame until Esc
fn run_interactive(config: EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = ConsoleEngine::new(TerminalConsole::new(), config);
    engine.initialize()?;
    let dims = engine.dimensions();
    info!("Surfaces: {}x{}", dims.columns, dims.rows);

    let mut status = String::from("Press any key (Esc quits)");
    loop {
        engine.draw_rect(Rectangle::new(0, 0, dims.columns, dims.rows), None);
        engine.write_at(2, 0, " dbcon ", None);

        let mut pos = CursorPosition::new(2, 2);
        engine.write_advance(&mut pos, &status, None);
        engine.present();
        engine.set_visible_cursor(pos);

        let key = engine.poll_input(true);
        let event = engine.last_input();
        if event.raw_code == ESC && !event.is_extended {
            break;
        }
        status = format!(
            "Key: {:3}  raw: {:3}  extended: {}",
            key,
            event.raw_code,
            if event.is_extended { "yes" } else { "no" }
        );
    }

    Ok(())
}
