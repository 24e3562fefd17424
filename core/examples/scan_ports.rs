//! Example: Scan and display all listening ports.

use portify_core::{well_known_service, PortEnumerator};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("Scanning ports...\n");

    let enumerator = PortEnumerator::system();

    match enumerator.scan(false).await {
        Ok(snapshot) => {
            let listening = snapshot.listening();
            if listening.is_empty() {
                println!("No listening ports found.");
                return;
            }

            println!(
                "{:<6} {:<8} {:<20} {:<6} {:<24} {}",
                "PORT", "PID", "PROCESS", "PROTO", "ADDRESS", "SERVICE"
            );
            println!("{}", "-".repeat(80));

            for record in &listening {
                let name: String = record.process_name.chars().take(20).collect();
                println!(
                    "{:<6} {:<8} {:<20} {:<6} {:<24} {}",
                    record.port,
                    record.pid,
                    name,
                    record.protocol.as_str(),
                    record.local_address,
                    well_known_service(record.port).unwrap_or("-")
                );
            }

            println!(
                "\nTotal: {} listening of {} sockets",
                listening.len(),
                snapshot.len()
            );
        }
        Err(e) => {
            eprintln!("Error scanning ports: {}", e);
        }
    }
}
