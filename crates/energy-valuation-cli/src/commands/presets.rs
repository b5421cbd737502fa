use serde_json::Value;

use energy_valuation_core::presets::preset_catalog;

pub fn run_presets() -> Result<Value, Box<dyn std::error::Error>> {
    let rows: Vec<Value> = preset_catalog()
        .into_iter()
        .map(|p| {
            serde_json::json!({
                "kind": p.kind,
                "name": p.kind.display_name(),
                "investment": p.investment,
                "base_production": p.base_production,
                "base_price": p.base_price,
            })
        })
        .collect();
    Ok(Value::Array(rows))
}
