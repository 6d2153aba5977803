//! Units command - list unit identifiers for path conversions

use anyhow::Result;
use clap::Args;
use datapost_units::Measure;
use serde_json::{Value, json};

#[derive(Args, Debug)]
pub struct UnitsArgs {
    /// Only list units of this measure (speed, temperature, pressure, ...)
    #[arg(short, long)]
    pub measure: Option<Measure>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the units command
pub fn run(args: UnitsArgs) -> Result<()> {
    let measures: Vec<Measure> = match args.measure {
        Some(measure) => vec![measure],
        None => datapost_units::measures().to_vec(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&listing(&measures))?);
        return Ok(());
    }

    for measure in measures {
        println!("{measure} (base: {})", measure.base_unit());
        for id in datapost_units::possibilities(Some(measure)) {
            if let Some(unit) = datapost_units::find(id) {
                println!("  {:<10} {}", id, unit.plural);
            }
        }
        println!();
    }

    Ok(())
}

fn listing(measures: &[Measure]) -> Value {
    let units: Vec<Value> = measures
        .iter()
        .flat_map(|&measure| datapost_units::possibilities(Some(measure)))
        .filter_map(datapost_units::find)
        .map(|unit| {
            json!({
                "id": unit.id,
                "measure": unit.measure,
                "singular": unit.singular,
                "plural": unit.plural,
            })
        })
        .collect();
    Value::Array(units)
}
