use serde::{Deserialize, Serialize};

use crate::types::{Money, ParameterSet, Rate};

/// Default assumptions shared by every preset, matching the values a fresh
/// scenario starts from before any adjustment.
pub const DEFAULT_HORIZON_YEARS: u32 = 10;
pub const DEFAULT_DISCOUNT_RATE: Rate = 0.10;
pub const DEFAULT_GROWTH_RATE: Rate = 0.05;
pub const DEFAULT_PRICE_VOLATILITY: Rate = 0.10;

/// Catalogued project types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    Solar,
    Wind,
    Geothermal,
    Refinery,
}

impl ProjectKind {
    pub const ALL: [ProjectKind; 4] = [
        ProjectKind::Solar,
        ProjectKind::Wind,
        ProjectKind::Geothermal,
        ProjectKind::Refinery,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ProjectKind::Solar => "Solar Project",
            ProjectKind::Wind => "Wind Project",
            ProjectKind::Geothermal => "Geothermal Project",
            ProjectKind::Refinery => "Refinery Project",
        }
    }

    /// Catalogue defaults for this project type.
    pub fn preset(self) -> ProjectPreset {
        let (investment, base_production, base_price) = match self {
            ProjectKind::Solar => (80.0, 12.0, 45.0),
            ProjectKind::Wind => (100.0, 10.0, 50.0),
            ProjectKind::Geothermal => (120.0, 9.0, 60.0),
            ProjectKind::Refinery => (160.0, 14.0, 55.0),
        };
        ProjectPreset {
            kind: self,
            investment,
            base_production,
            base_price,
        }
    }
}

/// Starting economics for one catalogued project type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectPreset {
    pub kind: ProjectKind,
    /// Initial investment ($ millions)
    pub investment: Money,
    /// Year-1 production (millions of m³)
    pub base_production: f64,
    /// Year-1 unit price ($/m³)
    pub base_price: Money,
}

impl ProjectPreset {
    /// Expand the preset into a full parameter set using the shared
    /// default horizon, discount rate, growth and volatility.
    pub fn parameters(&self) -> ParameterSet {
        ParameterSet {
            investment: self.investment,
            horizon_years: DEFAULT_HORIZON_YEARS,
            discount_rate: DEFAULT_DISCOUNT_RATE,
            base_production: self.base_production,
            base_price: self.base_price,
            growth_rate: DEFAULT_GROWTH_RATE,
            price_volatility: DEFAULT_PRICE_VOLATILITY,
        }
    }
}

/// The full preset catalog, in display order.
pub fn preset_catalog() -> Vec<ProjectPreset> {
    ProjectKind::ALL.iter().map(|k| k.preset()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{simulate_cash_flows, SimulationInput};

    #[test]
    fn test_catalog_covers_every_kind() {
        let catalog = preset_catalog();
        assert_eq!(catalog.len(), 4);
        for kind in ProjectKind::ALL {
            assert!(catalog.iter().any(|p| p.kind == kind));
        }
    }

    #[test]
    fn test_solar_preset_values() {
        let p = ProjectKind::Solar.preset();
        assert_eq!(p.investment, 80.0);
        assert_eq!(p.base_production, 12.0);
        assert_eq!(p.base_price, 45.0);
    }

    #[test]
    fn test_refinery_is_the_largest_project() {
        let refinery = ProjectKind::Refinery.preset();
        for p in preset_catalog() {
            assert!(p.investment <= refinery.investment);
        }
    }

    #[test]
    fn test_preset_parameters_carry_shared_defaults() {
        let params = ProjectKind::Wind.preset().parameters();
        assert_eq!(params.horizon_years, DEFAULT_HORIZON_YEARS);
        assert_eq!(params.discount_rate, DEFAULT_DISCOUNT_RATE);
        assert_eq!(params.growth_rate, DEFAULT_GROWTH_RATE);
        assert_eq!(params.price_volatility, DEFAULT_PRICE_VOLATILITY);
        assert_eq!(params.investment, 100.0);
    }

    #[test]
    fn test_every_preset_simulates_cleanly() {
        for preset in preset_catalog() {
            let input = SimulationInput {
                parameters: preset.parameters(),
                seed: Some(7),
            };
            let result = simulate_cash_flows(&input).unwrap();
            assert_eq!(
                result.result.records.len(),
                DEFAULT_HORIZON_YEARS as usize
            );
        }
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let v = serde_json::to_value(ProjectKind::Geothermal).unwrap();
        assert_eq!(v, "geothermal");
        let back: ProjectKind = serde_json::from_value(v).unwrap();
        assert_eq!(back, ProjectKind::Geothermal);
    }
}
