//! Home LAN Example
//!
//! Runs the default home network headless for one simulated minute and
//! prints what a renderer would see: packets in flight on each link and the
//! per-device inspection snapshots.
//!
//! The simulation:
//! - Builds a router with six hosts, some wired and some wireless
//! - Drives DNS lookups, web bursts, video streaming and appliance telemetry
//! - Lets the router buffer requests and answers them after a fixed delay
//!
//! Pass a number as the first argument to change the random seed.

use rand::rngs::StdRng;
use rand::SeedableRng;

use lansim::network::Network;
use lansim::time::{Duration, Time};
use lansim::topology::{HomeTopology, TopologyConfig};
use lansim::traffic::{TrafficConfig, TrafficDriver};
use lansim::{Error, Simulation};

/// Roughly 60 frames per second
const FRAME: Duration = Duration::from_micros(16_667);

fn main() -> Result<(), Error> {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);

    let mut network = Network::default();
    let home = HomeTopology::build(&mut network, &TopologyConfig::default())?;

    let config = TrafficConfig::default();
    let mut driver = TrafficDriver::new(home, config.clone(), StdRng::seed_from_u64(seed));
    let mut sim = Simulation::new(network);

    println!("=== Home LAN simulation (seed {seed}) ===\n");

    let mut next_report = Time::from_seconds(5);
    let mut totals = (0, 0);

    while sim.now() < Time::from_seconds(60) {
        sim.step(config.clamp_step(FRAME));

        let now = sim.now();
        let report = driver.drive(sim.network_mut(), now)?;
        totals.0 += report.injected;
        totals.1 += report.responses_sent;

        if now >= next_report {
            print_frame(sim.network(), now);
            next_report = now + Duration::from_seconds(5);
        }
    }

    println!("\n=== Results after {} ===", sim.now());
    println!("{} requests injected, {} responses sent", totals.0, totals.1);

    for device in sim.network().devices() {
        let info = device.describe();
        println!(
            "  {:<20} {:<15} {:>5} packets {:>9} bytes",
            info.name,
            info.address.to_string(),
            info.packets_received,
            info.bytes_received
        );
    }

    Ok(())
}

fn print_frame(network: &Network, now: Time) {
    println!("[{now}] {} packets in flight", network.in_flight_count());

    for link in network.links().iter().filter(|link| link.is_active()) {
        let (a, b) = link.get_nodes();
        let progress: Vec<String> = network
            .in_flight()
            .iter()
            .filter(|entry| entry.link() == link.id())
            .map(|entry| format!("{}->{} {:.0}%", entry.from(), entry.to(), entry.progress() * 100.0))
            .collect();

        println!("    {} ({a} <-> {b}): {}", link.id(), progress.join(", "));
    }
}
