//! Router inventory example
//!
//! Connects to a RouterOS device and prints what mikrossh learns about it:
//! hardware, resources, clock, NTP and the IP services table.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example router_info -- --host 192.168.88.1 --user admin --password secret
//! ```
//!
//! Set `RUST_LOG=mikrossh=debug` to see every command sent.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use mikrossh::{HostKeyVerification, RouterBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    println!("=== mikrossh Router Info ===\n");
    println!("Connecting to {}:{}...", args.host, args.port);

    let mut builder = RouterBuilder::new(&args.host)
        .port(args.port)
        .username(&args.user)
        .delay_factor(args.delay)
        .timeout(Duration::from_secs(args.timeout));

    if args.insecure {
        builder = builder.host_key_verification(HostKeyVerification::Disabled);
    }

    if let Some(password) = &args.password {
        builder = builder.password(password);
    } else if let Some(key_path) = &args.key {
        builder = builder.private_key(key_path);
    } else {
        eprintln!("Error: Must provide either --password or --key");
        std::process::exit(1);
    }

    let mut router = builder.connect().await?;
    println!("Connected to {}\n", router);

    // --- Hardware ---
    println!("--- Hardware ---\n");
    let resources = router.resources();
    println!("CPU:      {} @ {} MHz", resources.cpu, resources.cpu_frequency);
    println!("Memory:   {} bytes", resources.memory);
    println!("Storage:  {} bytes", resources.storage);
    println!("Version:  {}", resources.version);

    match router.routerboard() {
        Some(board) => {
            println!("Model:    {} ({})", board.model, board.revision);
            println!("Serial:   {}", board.serial_number);
            println!("Firmware: {} (upgrade: {})", board.current_firmware, board.upgrade_firmware);
        }
        None => println!("Not a RouterBOARD (CHR or x86)"),
    }
    if let Some(license) = router.license() {
        println!("License:  level {} ({})", license.level, license.software_id);
    }
    println!();

    // --- Clock ---
    println!("--- Clock ---\n");
    let mut system = router.system();
    println!(
        "{} {} {} (UTC{})",
        system.clock_date_get().await?,
        system.clock_time_get().await?,
        system.clock_time_zone_get().await?,
        system.clock_gmt_offset_get().await?
    );
    println!("DST active: {}", system.clock_dst_active_get().await?);
    println!();

    // --- NTP ---
    println!("--- NTP ---\n");
    let client = system.ntp_client_get().await?;
    println!("Client enabled: {} ({}, vrf {})", client.enabled, client.mode, client.vrf);
    for server in &client.servers {
        println!("  server {} [{}]", server, server.address_type());
    }
    println!("Status: {}", client.status);
    if let Some(synced) = client.synced_server {
        println!(
            "Synced to {} (stratum {}, offset {} ms)",
            synced, client.synced_stratum, client.system_offset
        );
    }

    let server = system.ntp_server_get().await?;
    println!("Server enabled: {}", server.enabled);
    println!();

    // --- Services ---
    println!("--- IP Services ---\n");
    for (name, service) in router.services() {
        let state = if service.disabled { "disabled" } else { "enabled" };
        let from = if service.available_from.is_empty() {
            "anywhere".to_string()
        } else {
            service.available_from.join(", ")
        };
        println!("{:<8} {:>5}  {:<8} from {}", name, service.port, state, from);
    }
    println!();

    // --- Raw command ---
    println!("--- Raw Command ---\n");
    println!("{}", router.cmd("/system identity print").await?);

    println!("\nClosing connection...");
    router.disconnect().await?;
    println!("Done!");

    Ok(())
}

/// Simple argument parser
struct Args {
    host: String,
    port: u16,
    user: String,
    password: Option<String>,
    key: Option<PathBuf>,
    timeout: u64,
    delay: f64,
    insecure: bool,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "192.168.88.1".to_string();
        let mut port = 22u16;
        let mut user = "admin".to_string();
        let mut password = None;
        let mut key = None;
        let mut timeout = 30u64;
        let mut delay = 0.0;
        let mut insecure = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    i += 1;
                    if i < args.len() {
                        host = args[i].clone();
                    }
                }
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = args[i].parse().unwrap_or(22);
                    }
                }
                "--user" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        user = args[i].clone();
                    }
                }
                "--password" | "-P" => {
                    i += 1;
                    if i < args.len() {
                        password = Some(args[i].clone());
                    }
                }
                "--key" | "-k" => {
                    i += 1;
                    if i < args.len() {
                        key = Some(PathBuf::from(&args[i]));
                    }
                }
                "--timeout" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        timeout = args[i].parse().unwrap_or(30);
                    }
                }
                "--delay" | "-d" => {
                    i += 1;
                    if i < args.len() {
                        delay = args[i].parse().unwrap_or(0.0);
                    }
                }
                "--insecure" => {
                    insecure = true;
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {}
            }
            i += 1;
        }

        Self {
            host,
            port,
            user,
            password,
            key,
            timeout,
            delay,
            insecure,
        }
    }

    fn print_help() {
        println!(
            r#"mikrossh router info example

Prints hardware, clock, NTP and service details of a RouterOS device.

USAGE:
    cargo run --example router_info -- [OPTIONS]

OPTIONS:
    -h, --host <HOST>        Target host [default: 192.168.88.1]
    -p, --port <PORT>        SSH port [default: 22]
    -u, --user <USER>        Username [default: admin]
    -P, --password <PASS>    Password for authentication
    -k, --key <PATH>         Path to private key file
    -t, --timeout <SECS>     Prompt timeout in seconds [default: 30]
    -d, --delay <FACTOR>     Delay factor for slow links [default: 0]
        --insecure           Skip host key verification
        --help               Print help information
"#
        );
    }
}
