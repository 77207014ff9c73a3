use super::*;

fn at(date: &str) -> NaiveDateTime {
    parse_date(date).unwrap()
}

#[test]
fn test_parse_date_accepts_date_only() {
    let dt = at("2024-05-01");
    assert_eq!(dt.to_string(), "2024-05-01 00:00:00");
}

#[test]
fn test_parse_date_accepts_datetime() {
    assert_eq!(at("2024-05-01T06:30:00").to_string(), "2024-05-01 06:30:00");
    assert_eq!(at("2024-05-01 06:30:00.5").to_string(), "2024-05-01 06:30:00.500");
}

#[test]
fn test_parse_date_accepts_minutes_only() {
    assert_eq!(at("2024-04-01 06:30").to_string(), "2024-04-01 06:30:00");
    assert_eq!(at("2024-04-01T06:30").to_string(), "2024-04-01 06:30:00");
}

#[test]
fn test_parse_date_converts_offsets_to_utc() {
    assert_eq!(at("2024-04-01T06:30:00Z").to_string(), "2024-04-01 06:30:00");
    assert_eq!(at("2024-04-01T06:30:00+02:00").to_string(), "2024-04-01 04:30:00");
    assert_eq!(at("2024-04-01T23:30:00-01:00").to_string(), "2024-04-02 00:30:00");
}

#[test]
fn test_observation_with_utc_timestamp() {
    let json = r#"{"parcel_id": "P001", "date": "2024-04-01T00:00:00Z", "ndvi": 0.4}"#;
    let obs: Observation = serde_json::from_str(json).unwrap();
    assert_eq!(obs.date, Some(at("2024-04-01")));
}

#[test]
fn test_parse_date_rejects_garbage() {
    assert!(parse_date("01/05/2024").is_err());
    assert!(parse_date("").is_err());
}

#[test]
fn test_indicator_from_str() {
    assert_eq!("ndvi".parse::<Indicator>().unwrap(), Indicator::Ndvi);
    assert_eq!("LAI".parse::<Indicator>().unwrap(), Indicator::Lai);
    assert_eq!(
        "stress_hydrique".parse::<Indicator>().unwrap(),
        Indicator::WaterStress
    );
    assert_eq!(
        "biomasse_estimee".parse::<Indicator>().unwrap(),
        Indicator::Biomass
    );
    assert_eq!(
        "evi".parse::<Indicator>(),
        Err(ParseIndicatorError("evi".to_string()))
    );
}

#[test]
fn test_indicator_name_round_trips() {
    for indicator in Indicator::ALL {
        assert_eq!(indicator.name().parse::<Indicator>().unwrap(), indicator);
    }
}

#[test]
fn test_observation_value_and_builder() {
    let obs = Observation::new("P001", at("2024-05-01"))
        .with(Indicator::Ndvi, 0.62)
        .with(Indicator::WaterStress, f64::NAN);

    assert_eq!(obs.value(Indicator::Ndvi), Some(0.62));
    assert_eq!(obs.value(Indicator::Lai), None);
    // NaN は欠損扱い
    assert_eq!(obs.value(Indicator::WaterStress), None);
}

#[test]
fn test_observation_deserialize_with_source_column_names() {
    let json = r#"{
        "parcelle_id": "P001",
        "date": "2024-05-01",
        "ndvi": 0.7,
        "stress_hydrique": 0.2
    }"#;
    let obs: Observation = serde_json::from_str(json).unwrap();
    assert_eq!(obs.parcel_id, ParcelId::from("P001"));
    assert_eq!(obs.date, Some(at("2024-05-01")));
    assert_eq!(obs.value(Indicator::Ndvi), Some(0.7));
    assert_eq!(obs.value(Indicator::WaterStress), Some(0.2));
    assert_eq!(obs.value(Indicator::Biomass), None);
}

#[test]
fn test_observation_without_date() {
    let obs: Observation = serde_json::from_str(r#"{"parcel_id": "P002", "ndvi": 0.5}"#).unwrap();
    assert_eq!(obs.date, None);
}

#[test]
fn test_observation_invalid_date_is_error() {
    let result: Result<Observation, _> =
        serde_json::from_str(r#"{"parcel_id": "P002", "date": "yesterday"}"#);
    let err = result.unwrap_err().to_string();
    assert!(err.contains("invalid date 'yesterday'"), "{err}");
}

#[test]
fn test_yield_record_aliases() {
    let json = r#"{"parcelle_id": "P001", "annee": 2023, "rendement_estime": 7.5, "rendement_final": 7.1}"#;
    let record: YieldRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.year, Some(2023));
    assert_eq!(record.predicted, Some(7.5));
    assert_eq!(record.actual, Some(7.1));
}

#[test]
fn test_yield_record_missing_actual() {
    let record: YieldRecord =
        serde_json::from_str(r#"{"parcel_id": "P001", "predicted": 7.5, "actual": null}"#).unwrap();
    assert_eq!(record.actual, None);
}

#[test]
fn test_weather_record_serialize_round_trip() {
    let record = WeatherRecord::new(at("2024-07-14"), 31.5, 88.0);
    let json = serde_json::to_string(&record).unwrap();
    assert_eq!(
        json,
        r#"{"date":"2024-07-14T00:00:00","temperature":31.5,"humidity":88.0}"#
    );
    let back: WeatherRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}

#[test]
fn test_weather_record_humidite_alias() {
    let record: WeatherRecord =
        serde_json::from_str(r#"{"date": "2024-07-14", "temperature": 20, "humidite": 65}"#)
            .unwrap();
    assert_eq!(record.humidity, Some(65.0));
}
