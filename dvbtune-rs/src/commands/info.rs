use std::error::Error;

use colored::Colorize;
use dvbtune::protocol::caps;
use dvbtune::tuner::{Device, DeviceConfig};

const CAPABILITY_NAMES: [(u32, &str); 11] = [
    (caps::FE_CAN_INVERSION_AUTO, "INVERSION_AUTO"),
    (caps::FE_CAN_FEC_AUTO, "FEC_AUTO"),
    (caps::FE_CAN_QAM_AUTO, "QAM_AUTO"),
    (caps::FE_CAN_TRANSMISSION_MODE_AUTO, "TRANSMISSION_MODE_AUTO"),
    (caps::FE_CAN_BANDWIDTH_AUTO, "BANDWIDTH_AUTO"),
    (caps::FE_CAN_GUARD_INTERVAL_AUTO, "GUARD_INTERVAL_AUTO"),
    (caps::FE_CAN_HIERARCHY_AUTO, "HIERARCHY_AUTO"),
    (caps::FE_CAN_8VSB, "8VSB"),
    (caps::FE_CAN_16VSB, "16VSB"),
    (caps::FE_CAN_MULTISTREAM, "MULTISTREAM"),
    (caps::FE_CAN_2G_MODULATION, "2G_MODULATION"),
];

fn capability_names(mask: u32) -> Vec<&'static str> {
    CAPABILITY_NAMES
        .iter()
        .filter(|(cap, _)| mask & cap == *cap)
        .map(|(_, name)| *name)
        .collect()
}

pub(crate) fn info(config: &DeviceConfig) -> Result<(), Box<dyn Error>> {
    let device = Device::open(config, true)?;
    let Some(info) = device.info() else {
        return Err("frontend information is not available".into());
    };

    println!(
        "{} adapter {} frontend {}",
        info.name.bold(),
        device.adapter(),
        device.device()
    );
    println!("  Type:          {}", info.frontend_type);
    match device.guess_delivery_system() {
        Some(system) if info.supports_2g_modulation() => {
            println!("  Delivery:      {} (second generation capable)", system)
        }
        Some(system) => println!("  Delivery:      {}", system),
        None => println!("  Delivery:      {}", "unknown".yellow()),
    }
    println!(
        "  Frequency:     {} - {} (step {}, tolerance {})",
        info.frequency_min, info.frequency_max, info.frequency_stepsize, info.frequency_tolerance
    );
    println!(
        "  Symbol rate:   {} - {} (tolerance {})",
        info.symbol_rate_min, info.symbol_rate_max, info.symbol_rate_tolerance
    );
    println!(
        "  Capabilities:  0x{:08X} {}",
        info.caps,
        capability_names(info.caps).join(" ")
    );
    println!(
        "  CA module:     {}",
        if device.has_ca() { "present" } else { "absent" }
    );

    device.close();
    Ok(())
}
