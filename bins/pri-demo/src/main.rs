use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;

use pri_config::toml_config;
use pri_core::debug;
use pri_engine::{facade, Controller, EventKind};

#[derive(Parser, Debug)]
#[command(author, version, about = "ISDN PRI/BRI call-control engine demo driver")]
struct Args {
    /// TOML config file describing side/layout/switch-variant/features.
    config: String,

    /// Optional script of facade commands to run, one per line
    /// (`setup <number>`, `answer <call-id>`, `hangup <call-id>`,
    /// `restart`). Without this, the driver just brings the link up and
    /// waits, printing whatever D-channel-driven events arrive.
    #[arg(long)]
    script: Option<String>,
}

fn load_config(path: &str) -> pri_config::ControllerConfig {
    match toml_config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to load configuration from {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn run_script(ctl: &mut Controller, path: &str) {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("failed to open script {path}: {e}");
            return;
        }
    };
    let mut outstanding = Vec::new();
    for line in std::io::BufReader::new(file).lines().map_while(Result::ok) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("setup") => {
                let number = parts.next().map(str::to_string);
                let req = facade::SetupRequest { called_number: number, ..Default::default() };
                if let Some(handle) = facade::setup(ctl, req) {
                    outstanding.push(handle);
                    tracing::info!("setup queued");
                }
            }
            Some("answer") => {
                if let Some(h) = outstanding.first().copied() {
                    facade::answer(ctl, h);
                }
            }
            Some("hangup") => {
                if let Some(h) = outstanding.pop() {
                    facade::hangup(ctl, h, None);
                }
            }
            Some("restart") => facade::restart(ctl, None),
            Some(other) => tracing::warn!(command = other, "unknown script command"),
            None => {}
        }
    }
}

fn main() {
    let args = Args::parse();
    let _log_guard = debug::setup_logging_default(None);

    let config = load_config(&args.config);
    let mut ctl = Controller::new(config);
    ctl.start();

    if let Some(script) = &args.script {
        run_script(&mut ctl, script);
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("failed to set Ctrl+C handler");

    let mut stdin_bytes = Vec::new();
    while running.load(Ordering::SeqCst) {
        ctl.tick(Instant::now());
        while let Some(event) = ctl.poll_event() {
            print_event(&event);
        }
        while let Some(frame) = ctl.poll_outbound() {
            log_outbound_frame(&frame);
        }
        if read_available_stdin(&mut stdin_bytes) {
            ctl.receive(&stdin_bytes);
            stdin_bytes.clear();
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// Outbound D-channel octets go to stderr as a hex dump; stdout is
/// reserved for `print_event` so a host piping stdin/stdout to a real
/// transport doesn't have the two directions interleaved on one stream.
fn log_outbound_frame(frame: &[u8]) {
    let hex: String = frame.iter().map(|b| format!("{b:02x}")).collect();
    eprintln!("OUT {hex}");
}

/// Drains whatever is currently buffered on stdin without blocking past
/// what's already available; real D-channel octets arrive this way when
/// the driver is wired to an external transport rather than a script.
fn read_available_stdin(buf: &mut Vec<u8>) -> bool {
    use std::io::Read;
    let mut stdin = std::io::stdin();
    let mut chunk = [0u8; 256];
    match stdin.read(&mut chunk) {
        Ok(0) | Err(_) => false,
        Ok(n) => {
            buf.extend_from_slice(&chunk[..n]);
            true
        }
    }
}

fn print_event(event: &pri_engine::Event) {
    match &event.kind {
        EventKind::Ring { calling, called, .. } => {
            println!("RING calling={calling:?} called={called:?}");
        }
        EventKind::Hangup { cause, .. } => println!("HANGUP cause={cause:?}"),
        other => println!("{other:?}"),
    }
}
