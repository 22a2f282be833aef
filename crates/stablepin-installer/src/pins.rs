use anyhow::{Context, Result};
use stablepin_core::PinEntry;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;

use crate::PrefixLayout;

/// Pins in file order. Blank lines and `#` comments are skipped.
pub fn read_pins(layout: &PrefixLayout) -> Result<Vec<PinEntry>> {
    let path = layout.pins_path();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read pins: {}", path.display()))?;
    let mut pins = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((name, repository)) = line.split_once('=') else {
            anyhow::bail!(
                "malformed pin on line {} of {}: expected name=repository",
                index + 1,
                path.display()
            );
        };
        pins.push(PinEntry::new(name.trim(), repository.trim()));
    }
    Ok(pins)
}

/// Appends `pins` to the pin file, skipping pairs already recorded.
/// Existing lines are never rewritten. Returns the number of lines added.
pub fn append_pins(layout: &PrefixLayout, pins: &[PinEntry]) -> Result<usize> {
    let mut seen: HashSet<PinEntry> = read_pins(layout)?.into_iter().collect();
    let fresh = pins
        .iter()
        .filter(|pin| seen.insert((*pin).clone()))
        .collect::<Vec<_>>();
    if fresh.is_empty() {
        return Ok(0);
    }

    let path = layout.pins_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create pin dir: {}", parent.display()))?;
    }

    let mut payload = String::new();
    for pin in &fresh {
        payload.push_str(&format!("{}={}\n", pin.package_name, pin.repository_name));
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open pins: {}", path.display()))?;
    file.write_all(payload.as_bytes())
        .with_context(|| format!("failed to append pins: {}", path.display()))?;
    Ok(fresh.len())
}
