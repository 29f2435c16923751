//! veritee CLI — attested-enclave trust walkthrough.
//!
//! Commands:
//!   veritee demo     — full flow from config creation to identity retirement
//!   veritee vector   — print the canonical signing bytes for the reference envelope

use std::env;

use serde::{Deserialize, Serialize};
use veritee_core::{
    CanonicalEncode, Encoder, EphemeralKeypair, IntentEnvelope, IntentScope, Measurement,
    TrustRegistry,
};

/// Example payload an enclave would sign: an oracle-style sensor reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SensorReading {
    location: String,
    temperature: u64,
}

impl CanonicalEncode for SensorReading {
    fn encode(&self, enc: &mut Encoder) {
        self.location.encode(enc);
        self.temperature.encode(enc);
    }
}

fn print_usage() {
    println!(
        r#"
veritee — attestation-gated enclave identity registry

Usage: veritee <command>

Commands:
  demo       Run the full trust flow against an in-process registry
  vector     Print the canonical signing bytes for the reference envelope
  help       Show this message
"#
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "demo" => cmd_demo(),
        "vector" => cmd_vector(),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
        }
    }
}

fn cmd_vector() {
    let envelope = IntentEnvelope::new(
        IntentScope(0),
        1744038900000,
        SensorReading {
            location: "San Francisco".to_string(),
            temperature: 13,
        },
    );
    println!("{}", hex::encode(envelope.signing_bytes()));
}

fn cmd_demo() {
    println!("\nStep 1: Declaring expected measurements...");
    println!("{}", "-".repeat(60));

    let registry = TrustRegistry::new();
    let pcrs = [
        Measurement::digest(b"demo kernel image"),
        Measurement::digest(b"demo application image"),
        Measurement::digest(b"demo boot ramdisk"),
    ];
    let (config, capability) = registry.create_config(
        "0x1::weather::WEATHER",
        "weather-oracle",
        pcrs[0].clone(),
        pcrs[1].clone(),
        pcrs[2].clone(),
    );
    println!("  Config:     {} '{}'", &config.id[..8], config.name);
    println!("  Version:    {}", config.version());
    println!("  PCR0:       {}...", &config.pcr(0).to_string()[..16]);
    println!("  Capability: tag {}", capability.application_tag());

    println!("\nStep 2: Enclave boots with an ephemeral keypair...");
    println!("{}", "-".repeat(60));

    let keypair = EphemeralKeypair::generate();
    let document = keypair.attest(&pcrs);
    println!("  Public key: {}", hex::encode(keypair.public_key()));
    println!("  Attestation entries: {}", document.pcrs.len());

    println!("\nStep 3: Registering the enclave identity...");
    println!("{}", "-".repeat(60));

    let identity = match registry.register_enclave(&config.id, &document) {
        Ok(identity) => identity,
        Err(e) => {
            eprintln!("  Registration failed: {}", e);
            return;
        }
    };
    println!(
        "  Identity {} bound to config version {}",
        &identity.id[..8],
        identity.config_version
    );

    println!("\nStep 4: Enclave signs a reading...");
    println!("{}", "-".repeat(60));

    let reading = SensorReading {
        location: "San Francisco".to_string(),
        temperature: 13,
    };
    let response = keypair.signed_response(reading, 1744038900000, IntentScope(0));
    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("  Serialization error: {}", e),
    }

    println!("\nStep 5: Anyone verifies the signature...");
    println!("{}", "-".repeat(60));

    let signature = match response.signature_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("  Bad signature encoding: {}", e);
            return;
        }
    };
    let ok = registry
        .verify_signature(
            &identity.id,
            response.envelope.intent,
            response.envelope.timestamp_ms,
            &response.envelope.data,
            &signature,
        )
        .unwrap_or(false);
    println!("  Genuine envelope verifies: {}", ok);

    let tampered = registry
        .verify_signature(
            &identity.id,
            response.envelope.intent,
            response.envelope.timestamp_ms + 1,
            &response.envelope.data,
            &signature,
        )
        .unwrap_or(false);
    println!("  Tampered timestamp verifies: {}", tampered);

    println!("\nStep 6: Rotating measurements (new release)...");
    println!("{}", "-".repeat(60));

    let new_version = match registry.update_measurements(
        &config.id,
        &capability,
        Measurement::digest(b"demo kernel image v2"),
        Measurement::digest(b"demo application image v2"),
        Measurement::digest(b"demo boot ramdisk v2"),
    ) {
        Ok(version) => version,
        Err(e) => {
            eprintln!("  Update failed: {}", e);
            return;
        }
    };
    println!("  Config now at version {}", new_version);
    println!(
        "  Identity {} stale: {}",
        &identity.id[..8],
        registry.is_stale(&identity.id).unwrap_or(false)
    );

    println!("\nStep 7: Retiring the stale identity...");
    println!("{}", "-".repeat(60));

    match registry.retire(&identity.id) {
        Ok(()) => println!("  Identity {} retired", &identity.id[..8]),
        Err(e) => eprintln!("  Retire failed: {}", e),
    }
    println!("  {}", registry.summary());
    println!();
}
