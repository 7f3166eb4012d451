//! Celestial body data fetched from the solar system REST API.

use serde::Deserialize;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::orbit::OrbitalElements;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<JsValue> for ProviderError {
    fn from(value: JsValue) -> Self {
        ProviderError::Network(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct MoonRef {
    pub moon: String,
}

/// One body as the API describes it. Fields the scene does not read are
/// skipped during decoding.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyRecord {
    pub name: String,
    pub english_name: String,
    pub moons: Option<Vec<MoonRef>>,
    pub semimajor_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub mean_radius: f64,
    /// Sidereal period (days)
    pub sideral_orbit: f64,
    /// Mean anomaly at epoch (degrees)
    pub main_anomaly: f64,
    pub arg_periapsis: f64,
    pub long_asc_node: f64,
}

impl BodyRecord {
    /// Orbital elements, or `None` when the record has no usable orbit.
    pub fn elements(&self) -> Option<OrbitalElements> {
        if self.semimajor_axis <= 0.0 {
            return None;
        }
        let mut elements = OrbitalElements::new(
            self.semimajor_axis,
            self.eccentricity,
            self.inclination,
            self.long_asc_node,
            self.arg_periapsis,
        )
        .with_mean_anomaly_at_epoch(self.main_anomaly);
        if self.sideral_orbit > 0.0 {
            elements = elements.with_period(self.sideral_orbit);
        }
        Some(elements)
    }

    pub fn moon_count(&self) -> usize {
        self.moons.as_ref().map_or(0, Vec::len)
    }

    pub fn display_name(&self) -> &str {
        if self.english_name.is_empty() {
            &self.name
        } else {
            &self.english_name
        }
    }
}

#[derive(Deserialize)]
struct PlanetsResponse {
    planets: Vec<BodyRecord>,
}

#[derive(Deserialize)]
struct SunResponse {
    sun: BodyRecord,
}

#[derive(Deserialize)]
struct BodyResponse {
    body: BodyRecord,
}

/// Everything the scene is built from. Empty when the API is unreachable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    pub planets: Vec<BodyRecord>,
    pub sun: Option<BodyRecord>,
    pub pluto: Option<BodyRecord>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.planets.is_empty() && self.sun.is_none() && self.pluto.is_none()
    }
}

pub fn parse_planets(json: &str) -> Result<Vec<BodyRecord>, ProviderError> {
    Ok(serde_json::from_str::<PlanetsResponse>(json)?.planets)
}

pub fn parse_sun(json: &str) -> Result<BodyRecord, ProviderError> {
    Ok(serde_json::from_str::<SunResponse>(json)?.sun)
}

pub fn parse_body(json: &str) -> Result<BodyRecord, ProviderError> {
    Ok(serde_json::from_str::<BodyResponse>(json)?.body)
}

async fn fetch_text(url: &str) -> Result<String, ProviderError> {
    let window = web_sys::window().ok_or_else(|| ProviderError::Network("No window".to_string()))?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(url, &opts)?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let resp: Response = resp_value.dyn_into()?;
    if !resp.ok() {
        return Err(ProviderError::Status(resp.status()));
    }

    let text = JsFuture::from(resp.text()?).await?;
    text.as_string()
        .ok_or_else(|| ProviderError::Network(format!("{} returned a non-text body", url)))
}

async fn try_fetch_catalog(api_url: &str) -> Result<Catalog, ProviderError> {
    log::info!("Fetching planets...");
    let planets = parse_planets(&fetch_text(&format!("{}/planets", api_url)).await?)?;

    log::info!("Fetching Sun...");
    let sun = parse_sun(&fetch_text(&format!("{}/sun", api_url)).await?)?;

    log::info!("Fetching Pluto...");
    let pluto = parse_body(&fetch_text(&format!("{}/body/Pluto", api_url)).await?)?;

    log::debug!("Fetched {} planets, sun and pluto", planets.len());
    Ok(Catalog {
        planets,
        sun: Some(sun),
        pluto: Some(pluto),
    })
}

/// Fetch the catalog. Any failure is logged and yields an empty catalog so
/// the render loop can still start.
pub async fn fetch_catalog(api_url: &str) -> Catalog {
    match try_fetch_catalog(api_url).await {
        Ok(catalog) => catalog,
        Err(e) => {
            log::error!("Error fetching celestial bodies data: {}", e);
            Catalog::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLANETS_JSON: &str = r#"{
        "planets": [
            {
                "id": "terre", "name": "La Terre", "englishName": "Earth",
                "moons": [{ "moon": "La Lune", "rel": "https://api/bodies/lune" }],
                "semimajorAxis": 149598023, "eccentricity": 0.0167, "inclination": 0,
                "meanRadius": 6371.0084, "sideralOrbit": 365.256, "mainAnomaly": 358.617,
                "argPeriapsis": 114.20783, "longAscNode": -11.26064, "bodyType": "Planet",
                "mass": { "massValue": 5.97237, "massExponent": 24 }
            },
            {
                "id": "mercure", "name": "Mercure", "englishName": "Mercury", "moons": null,
                "semimajorAxis": 57909227, "eccentricity": 0.2056, "inclination": 7.0,
                "meanRadius": 2439.4, "sideralOrbit": 87.969, "argPeriapsis": 29.022,
                "longAscNode": 48.378
            }
        ]
    }"#;

    #[test]
    fn test_parse_planets() {
        let planets = parse_planets(PLANETS_JSON).unwrap();
        assert_eq!(planets.len(), 2);

        let earth = &planets[0];
        assert_eq!(earth.english_name, "Earth");
        assert_eq!(earth.moon_count(), 1);
        assert_eq!(earth.moons.as_ref().unwrap()[0].moon, "La Lune");

        let elements = earth.elements().unwrap();
        assert_eq!(elements.semimajor_axis, 149598023.0);
        assert_eq!(elements.longitude_of_ascending_node, -11.26064);
        assert_eq!(elements.orbital_period, Some(365.256));
        assert_eq!(elements.mean_anomaly_at_epoch, 358.617);

        let mercury = &planets[1];
        assert_eq!(mercury.moon_count(), 0);
        assert_eq!(mercury.main_anomaly, 0.0);
    }

    #[test]
    fn test_parse_sun_without_orbit() {
        let sun = parse_sun(r#"{ "sun": { "id": "soleil", "englishName": "Sun", "meanRadius": 695508 } }"#).unwrap();
        assert_eq!(sun.mean_radius, 695508.0);
        assert!(sun.elements().is_none());
    }

    #[test]
    fn test_parse_body() {
        let pluto = parse_body(
            r#"{ "body": { "englishName": "Pluto", "semimajorAxis": 5906440628, "eccentricity": 0.2488,
                "inclination": 17.16, "sideralOrbit": 90560 } }"#,
        )
        .unwrap();
        assert_eq!(pluto.display_name(), "Pluto");
        assert!(pluto.elements().unwrap().validate().is_ok());
    }

    #[test]
    fn test_malformed_payload() {
        assert!(matches!(parse_planets(r#"{ "bodies": [] }"#), Err(ProviderError::Decode(_))));
        assert!(parse_sun("not json").is_err());
    }

    #[test]
    fn test_missing_period_leaves_elements_untimed() {
        let record = BodyRecord {
            semimajor_axis: 10.0,
            ..Default::default()
        };
        assert_eq!(record.elements().unwrap().orbital_period, None);
    }

    #[test]
    fn test_unused_api_fields_are_ignored() {
        let sun = parse_sun(
            r#"{ "sun": { "id": "soleil", "englishName": "Sun", "gravity": 274, "discoveredBy": "",
                "bodyType": "Star", "aroundPlanet": null, "meanRadius": 695508 } }"#,
        )
        .unwrap();
        assert_eq!(sun.display_name(), "Sun");
    }

    #[test]
    fn test_catalog_is_empty() {
        assert!(Catalog::default().is_empty());
        let catalog = Catalog {
            pluto: Some(BodyRecord::default()),
            ..Default::default()
        };
        assert!(!catalog.is_empty());
    }
}
