//! Router configuration example
//!
//! Renames a RouterOS device, sets its login note, points the NTP client at
//! a pair of servers and moves the API service to a new port. Without
//! `--apply` it only shows the current values.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example configure -- --host 192.168.88.1 --user admin --password secret \
//!     --identity core-01 --ntp 200.160.7.186,201.49.148.135 --api-port 8730 --apply
//! ```

use std::env;

use mikrossh::{RouterBuilder, ServiceName};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut router = RouterBuilder::new(&args.host)
        .username(&args.user)
        .password(&args.password)
        .delay_factor(args.delay)
        .connect()
        .await?;
    println!("Connected to {}\n", router);

    println!("Identity: {}", router.identity());
    println!("Note:     {:?}", router.system().note_get().await?);
    println!("NTP:      {:?}", router.system().ntp_client_get().await?.servers);
    if let Some(api) = router.service(ServiceName::Api) {
        println!("API port: {}", api.port);
    }

    if !args.apply {
        println!("\nDry run; pass --apply to change the router.");
        router.disconnect().await?;
        return Ok(());
    }

    println!("\n--- Applying ---\n");

    if let Some(identity) = &args.identity {
        router.system().identity_set(identity).await?;
        println!("Identity set: {}", router.identity());
    }

    if let Some(note) = &args.note {
        router.system().note_set(note, true).await?;
        println!("Note set");
    }

    if !args.ntp.is_empty() {
        let servers: Vec<&str> = args.ntp.iter().map(String::as_str).collect();
        router
            .system()
            .ntp_client_set(&servers, true, "unicast", "main")
            .await?;
        println!("NTP servers set: {}", servers.join(", "));
    }

    if let Some(port) = args.api_port {
        router.ip().port_set("api", port).await?;
        if let Some(api) = router.service(ServiceName::Api) {
            println!("API port now {}", api.port);
        }
    }

    println!("\n{}", router.system().history_system_get().await?);

    router.disconnect().await?;
    Ok(())
}

/// Simple argument parser
struct Args {
    host: String,
    user: String,
    password: String,
    delay: f64,
    identity: Option<String>,
    note: Option<String>,
    ntp: Vec<String>,
    api_port: Option<i64>,
    apply: bool,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut parsed = Self {
            host: "192.168.88.1".to_string(),
            user: "admin".to_string(),
            password: String::new(),
            delay: 0.0,
            identity: None,
            note: None,
            ntp: Vec::new(),
            api_port: None,
            apply: false,
        };

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1).cloned();
            match args[i].as_str() {
                "--host" | "-h" => parsed.host = value.unwrap_or(parsed.host),
                "--user" | "-u" => parsed.user = value.unwrap_or(parsed.user),
                "--password" | "-P" => parsed.password = value.unwrap_or_default(),
                "--delay" | "-d" => {
                    parsed.delay = value.and_then(|v| v.parse().ok()).unwrap_or(0.0)
                }
                "--identity" => parsed.identity = value,
                "--note" => parsed.note = value,
                "--ntp" => {
                    parsed.ntp = value
                        .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                        .unwrap_or_default()
                }
                "--api-port" => parsed.api_port = value.and_then(|v| v.parse().ok()),
                "--apply" => {
                    parsed.apply = true;
                    i += 1;
                    continue;
                }
                "--help" => {
                    println!(
                        "USAGE: cargo run --example configure -- --host <HOST> --user <USER> \
                         --password <PASS> [--delay <F>] [--identity <NAME>] [--note <TEXT>] \
                         [--ntp <IP,IP>] [--api-port <PORT>] [--apply]"
                    );
                    std::process::exit(0);
                }
                _ => {
                    i += 1;
                    continue;
                }
            }
            i += 2;
        }

        parsed
    }
}
