use serde::{Deserialize, Serialize};

/// One road/weather snapshot as posted to `/predict`. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficInput {
    #[serde(rename = "Start_Lat")]
    pub start_lat: f64,
    #[serde(rename = "Start_Lng")]
    pub start_lng: f64,
    #[serde(rename = "Distance_mi")]
    pub distance_mi: f64,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Temperature_F")]
    pub temperature_f: f64,
    #[serde(rename = "Humidity")]
    pub humidity: f64,
    #[serde(rename = "Pressure")]
    pub pressure: f64,
    #[serde(rename = "Visibility")]
    pub visibility: f64,
    #[serde(rename = "Wind_Speed")]
    pub wind_speed: f64,
    #[serde(rename = "Weather_Condition")]
    pub weather_condition: String,
    #[serde(rename = "Sunrise_Sunset")]
    pub sunrise_sunset: String,
    #[serde(rename = "Traffic_Signal")]
    pub traffic_signal: i64,
    #[serde(rename = "Hour")]
    pub hour: i64,
    #[serde(rename = "Month")]
    pub month: i64,
    #[serde(rename = "Year")]
    pub year: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
}

/// Body of every `/predict` answer; failures travel in-band with `status: "failed"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Success {
        prediction_code: i64,
        category: String,
        status: Status,
    },
    Failed {
        error: String,
        status: Status,
    },
}

impl PredictResponse {
    pub fn success(prediction_code: i64, category: impl Into<String>) -> Self {
        Self::Success {
            prediction_code,
            category: category.into(),
            status: Status::Success,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
            status: Status::Failed,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Success { status, .. } | Self::Failed { status, .. } => *status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Welcome {
    pub message: &'static str,
    pub usage: &'static str,
}
