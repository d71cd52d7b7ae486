//! Fixed feature schema and the assembler that turns a request into an ordered record.
//!
//! Column names and order are the ones the classifier was trained on. They are
//! configuration shared with the training process, never inferred from a request.

use std::marker::PhantomData;

use crate::error::{PipelineError, PipelineResult};
use crate::types::TrafficInput;

/// Classifier input order.
pub const FEATURE_COLUMNS: [&str; 16] = [
    "Start_Lat",
    "Start_Lng",
    "Distance(mi)",
    "City",
    "State",
    "Temperature(F)",
    "Humidity(%)",
    "Pressure(in)",
    "Visibility(mi)",
    "Wind_Speed(mph)",
    "Weather_Condition",
    "Sunrise_Sunset",
    "Traffic_Signal",
    "Hour",
    "Month",
    "Year",
];

pub const CATEGORICAL_COLUMNS: [&str; 4] = ["City", "State", "Weather_Condition", "Sunrise_Sunset"];

/// Order the scaler was fit in. Parameters are positional against this list.
pub const NUMERIC_COLUMNS: [&str; 11] = [
    "Start_Lat",
    "Start_Lng",
    "Distance(mi)",
    "Temperature(F)",
    "Humidity(%)",
    "Pressure(in)",
    "Visibility(mi)",
    "Wind_Speed(mph)",
    "Hour",
    "Month",
    "Year",
];

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

/// Stage markers for `Record`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assembled;
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Encoded;
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalized;

/// Values keyed by column, in classifier order. `S` names the last stage applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<V, S> {
    pub(crate) columns: Vec<&'static str>,
    pub(crate) values: Vec<V>,
    stage: PhantomData<S>,
}

/// Request values renamed and ordered. Nothing is transformed yet.
pub type FeatureRecord = Record<FeatureValue, Assembled>;
/// All categoricals replaced by integer codes.
pub type EncodedRecord = Record<f64, Encoded>;
/// Numeric columns scaled; ready for the classifier.
pub type NormalizedRecord = Record<f64, Normalized>;

impl<V, S> Record<V, S> {
    pub(crate) fn new(columns: Vec<&'static str>, values: Vec<V>) -> Self {
        Self {
            columns,
            values,
            stage: PhantomData,
        }
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<&V> {
        self.columns
            .iter()
            .position(|c| *c == column)
            .map(|i| &self.values[i])
    }
}

fn source(input: &TrafficInput, column: &str) -> Option<FeatureValue> {
    use FeatureValue::{Category, Number};

    let v = match column {
        "Start_Lat" => Number(input.start_lat),
        "Start_Lng" => Number(input.start_lng),
        "Distance(mi)" => Number(input.distance_mi),
        "City" => Category(input.city.clone()),
        "State" => Category(input.state.clone()),
        "Temperature(F)" => Number(input.temperature_f),
        "Humidity(%)" => Number(input.humidity),
        "Pressure(in)" => Number(input.pressure),
        "Visibility(mi)" => Number(input.visibility),
        "Wind_Speed(mph)" => Number(input.wind_speed),
        "Weather_Condition" => Category(input.weather_condition.clone()),
        "Sunrise_Sunset" => Category(input.sunrise_sunset.clone()),
        "Traffic_Signal" => Number(input.traffic_signal as f64),
        "Hour" => Number(input.hour as f64),
        "Month" => Number(input.month as f64),
        "Year" => Number(input.year as f64),
        _ => return None,
    };
    Some(v)
}

#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    columns: Vec<&'static str>,
}

impl Default for FeatureAssembler {
    fn default() -> Self {
        Self::new(&FEATURE_COLUMNS)
    }
}

impl FeatureAssembler {
    pub fn new(columns: &[&'static str]) -> Self {
        Self {
            columns: columns.to_vec(),
        }
    }

    pub fn assemble(&self, input: &TrafficInput) -> PipelineResult<FeatureRecord> {
        let mut values = Vec::with_capacity(self.columns.len());
        for col in &self.columns {
            let v = source(input, col).ok_or_else(|| {
                PipelineError::SchemaMismatch(format!("required feature `{col}` is not present in the request"))
            })?;
            values.push(v);
        }
        Ok(Record::new(self.columns.clone(), values))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_input() -> TrafficInput {
        TrafficInput {
            start_lat: 34.05,
            start_lng: -118.25,
            distance_mi: 0.5,
            city: "Los Angeles".into(),
            state: "CA".into(),
            temperature_f: 70.0,
            humidity: 40.0,
            pressure: 29.9,
            visibility: 10.0,
            wind_speed: 5.0,
            weather_condition: "Clear".into(),
            sunrise_sunset: "Day".into(),
            traffic_signal: 1,
            hour: 8,
            month: 6,
            year: 2023,
        }
    }

    #[test]
    fn assembles_in_training_order() {
        let rec = FeatureAssembler::default().assemble(&sample_input()).unwrap();
        assert_eq!(rec.columns(), &FEATURE_COLUMNS[..]);
        assert_eq!(rec.values()[2], FeatureValue::Number(0.5));
        assert_eq!(rec.values()[3], FeatureValue::Category("Los Angeles".into()));
        assert_eq!(rec.get("Traffic_Signal"), Some(&FeatureValue::Number(1.0)));
        assert_eq!(rec.get("Year"), Some(&FeatureValue::Number(2023.0)));
    }

    #[test]
    fn lookup_by_column_works_at_every_stage() {
        let assembled = FeatureAssembler::default().assemble(&sample_input()).unwrap();
        assert_eq!(assembled.get("State"), Some(&FeatureValue::Category("CA".into())));
        assert_eq!(assembled.get("Lane_Count"), None);

        let normalized: NormalizedRecord = Record::new(vec!["Hour", "City"], vec![0.25, -1.0]);
        assert_eq!(normalized.get("City"), Some(&-1.0));
        assert_eq!(normalized.values(), &[0.25, -1.0]);
        assert_eq!(normalized.columns(), &["Hour", "City"]);
    }

    #[test]
    fn unknown_column_is_schema_mismatch() {
        let asm = FeatureAssembler::new(&["Start_Lat", "Road_Type"]);
        let err = asm.assemble(&sample_input()).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch(ref m) if m.contains("Road_Type")));
    }

    #[test]
    fn schema_lists_are_consistent() {
        for col in CATEGORICAL_COLUMNS.iter().chain(NUMERIC_COLUMNS.iter()) {
            assert!(FEATURE_COLUMNS.contains(col), "{col} missing from feature columns");
        }
        assert_eq!(CATEGORICAL_COLUMNS.len() + NUMERIC_COLUMNS.len() + 1, FEATURE_COLUMNS.len());
    }
}
