/// Reference charts shipped with the crate, used when no chart file is configured.
pub const BUILTIN_CHART_CSV: &str = include_str!("../../../data/size_charts.csv");

#[cfg(test)]
mod tests {
    use super::super::{ChartCatalog, SizeChartRepository};
    use crate::sizing::domain::{ChartKey, Gender, ProductType, SportId};

    #[test]
    fn builtin_catalog_loads_and_validates() {
        let catalog = ChartCatalog::builtin().expect("builtin charts are valid");
        assert!(catalog.len() >= 6);

        let jersey = catalog
            .lookup(&ChartKey::new(
                SportId::new("soccer"),
                Gender::Boys,
                ProductType::new("jersey"),
            ))
            .expect("soccer jersey chart present");
        assert!(jersey.has_garment_measurements());
        assert_eq!(jersey.height_floor(), 110.0);
        assert_eq!(jersey.height_ceiling(), 194.0);
    }

    #[test]
    fn shorts_charts_carry_no_garment_measurements() {
        let catalog = ChartCatalog::builtin().expect("builtin charts are valid");
        let shorts = catalog
            .lookup(&ChartKey::new(
                SportId::new("soccer"),
                Gender::Girls,
                ProductType::new("shorts"),
            ))
            .expect("soccer shorts chart present");
        assert!(!shorts.has_garment_measurements());
    }
}
