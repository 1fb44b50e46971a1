use std::collections::BTreeMap;
use std::io::Read;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use super::{ChartLoadError, SizeChart};
use crate::sizing::domain::{
    BmiAdjustment, ChartKey, GarmentMeasurements, Gender, ProductType, SizeChartEntry, SizeLabel,
    SportId,
};

/// Parse chart rows, group them by key, and validate each chart.
pub(crate) fn parse_charts<R: Read>(reader: R) -> Result<Vec<SizeChart>, ChartLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut grouped: BTreeMap<ChartKey, Vec<SizeChartEntry>> = BTreeMap::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let row: ChartRow =
            record
                .deserialize(Some(&headers))
                .map_err(|err| ChartLoadError::InvalidRow {
                    line,
                    reason: err.to_string(),
                })?;
        let (key, entry) = row
            .into_entry()
            .map_err(|reason| ChartLoadError::InvalidRow { line, reason })?;
        grouped.entry(key).or_default().push(entry);
    }

    grouped
        .into_iter()
        .map(|(key, entries)| SizeChart::new(key, entries))
        .collect()
}

#[derive(Debug, Deserialize)]
struct ChartRow {
    sport: String,
    gender: String,
    product_type: String,
    size: String,
    height_min_cm: f64,
    height_max_cm: f64,
    #[serde(default, deserialize_with = "blank_as_none")]
    underweight_shift: Option<i8>,
    #[serde(default, deserialize_with = "blank_as_none")]
    overweight_shift: Option<i8>,
    #[serde(default, deserialize_with = "blank_as_none")]
    obese_shift: Option<i8>,
    #[serde(default, deserialize_with = "blank_as_none")]
    length_cm: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    width_cm: Option<f64>,
}

impl ChartRow {
    fn into_entry(self) -> Result<(ChartKey, SizeChartEntry), String> {
        let sport = SportId::new(&self.sport);
        if sport.as_str().is_empty() {
            return Err("sport must not be blank".to_string());
        }
        let product_type = ProductType::new(&self.product_type);
        if product_type.as_str().is_empty() {
            return Err("product_type must not be blank".to_string());
        }
        let gender = Gender::parse(&self.gender)
            .ok_or_else(|| format!("unknown gender '{}'", self.gender))?;
        if self.size.is_empty() {
            return Err("size must not be blank".to_string());
        }

        let bmi_adjustment = BmiAdjustment {
            underweight: shift("underweight_shift", self.underweight_shift)?,
            overweight: shift("overweight_shift", self.overweight_shift)?,
            obese: shift("obese_shift", self.obese_shift)?,
        };

        let garment = match (self.length_cm, self.width_cm) {
            (Some(length_cm), Some(width_cm)) if length_cm > 0.0 && width_cm > 0.0 => {
                Some(GarmentMeasurements {
                    length_cm,
                    width_cm,
                })
            }
            (None, None) => None,
            _ => {
                return Err(format!(
                    "size {} needs both positive length_cm and width_cm or neither",
                    self.size
                ))
            }
        };

        Ok((
            ChartKey::new(sport, gender, product_type),
            SizeChartEntry {
                size: SizeLabel(self.size),
                height_min_cm: self.height_min_cm,
                height_max_cm: self.height_max_cm,
                bmi_adjustment,
                garment,
            },
        ))
    }
}

fn shift(column: &str, value: Option<i8>) -> Result<i8, String> {
    let value = value.unwrap_or(0);
    if (-1..=1).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{column} must be -1, 0 or 1 (found {value})"))
    }
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| value.trim().parse::<T>().map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "sport,gender,product_type,size,height_min_cm,height_max_cm,underweight_shift,overweight_shift,obese_shift,length_cm,width_cm\n";

    #[test]
    fn groups_rows_into_sorted_charts() {
        let csv = format!(
            "{HEADER}\
Soccer,Boys,Jersey,YM,134,146,-1,1,1,58,44\n\
soccer,boys,jersey,YS,122,134,,1,1,54,41\n\
soccer,girls,jersey,YS,120,132,0,1,1,,\n"
        );

        let charts = parse_charts(csv.as_bytes()).expect("charts parse");
        assert_eq!(charts.len(), 2);

        let boys = &charts[0];
        assert_eq!(boys.key().to_string(), "soccer/boys/jersey");
        assert_eq!(boys.label(0).as_str(), "YS");
        assert_eq!(boys.entry(0).bmi_adjustment.underweight, 0);
        assert_eq!(boys.entry(1).bmi_adjustment.underweight, -1);
        assert!(boys.has_garment_measurements());

        let girls = &charts[1];
        assert!(!girls.has_garment_measurements());
    }

    #[test]
    fn rejects_out_of_range_shift_with_line_number() {
        let csv = format!("{HEADER}soccer,boys,jersey,YS,122,134,0,2,1,54,41\n");
        match parse_charts(csv.as_bytes()) {
            Err(ChartLoadError::InvalidRow { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("overweight_shift"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_gender_and_half_measurements() {
        let gender = format!("{HEADER}soccer,kids,jersey,YS,122,134,0,1,1,54,41\n");
        assert!(matches!(
            parse_charts(gender.as_bytes()),
            Err(ChartLoadError::InvalidRow { reason, .. }) if reason.contains("gender")
        ));

        let half = format!("{HEADER}soccer,boys,jersey,YS,122,134,0,1,1,54,\n");
        assert!(matches!(
            parse_charts(half.as_bytes()),
            Err(ChartLoadError::InvalidRow { reason, .. }) if reason.contains("width_cm")
        ));
    }

    #[test]
    fn surfaces_chart_level_validation() {
        let csv = format!(
            "{HEADER}\
soccer,boys,jersey,YS,122,134,0,1,1,54,41\n\
soccer,boys,jersey,YM,136,146,0,1,1,58,44\n"
        );
        assert!(matches!(
            parse_charts(csv.as_bytes()),
            Err(ChartLoadError::InvalidChart { reason, .. }) if reason.contains("gap")
        ));
    }
}
