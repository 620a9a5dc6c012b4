//! Wire shape and field validation of imported flat records.

use crate::ingest::error::ImportError;
use crate::models::View;
use serde::Deserialize;

/// One element of the uploaded JSON array, as sent by clients (camelCase
/// keys). All fields are optional at the decoding stage; required-ness is a
/// validation concern so that a missing field produces a constraint message
/// rather than an opaque decode error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatUpload {
    pub name: Option<String>,
    pub coordinates: Option<CoordinatesUpload>,
    /// Accepted for compatibility with exported files; the server assigns
    /// creation time itself.
    #[serde(default, rename = "creationDate")]
    pub creation_date: Option<String>,
    pub area: Option<f32>,
    pub price: Option<f32>,
    pub balcony: Option<bool>,
    pub time_to_metro_on_foot: Option<i32>,
    pub number_of_rooms: Option<i32>,
    pub number_of_bathrooms: Option<i32>,
    pub time_to_metro_by_transport: Option<f64>,
    pub view: Option<View>,
    pub house_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatesUpload {
    pub x: Option<i64>,
    pub y: Option<i64>,
}

/// A fully decoded and field-validated record, ready for the writer.
/// Construction through [`FlatUpload::validate`] is the only path here, so a
/// record that reaches the writer has passed every declared constraint.
#[derive(Debug, Clone)]
pub struct FlatRecord {
    pub name: String,
    pub coord_x: i64,
    pub coord_y: i64,
    pub area: f32,
    pub price: f32,
    pub balcony: Option<bool>,
    pub time_to_metro_on_foot: Option<i32>,
    pub number_of_rooms: Option<i32>,
    pub number_of_bathrooms: Option<i32>,
    pub time_to_metro_by_transport: Option<f64>,
    pub view: View,
    pub house_id: i64,
}

impl FlatUpload {
    /// Check every declared field constraint, collecting violations in the
    /// order encountered. The combined message becomes the VALIDATION
    /// classification text.
    pub fn validate(self) -> Result<FlatRecord, ImportError> {
        let mut violations: Vec<&'static str> = Vec::new();

        if self.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            violations.push("name must not be empty");
        }

        let coords = match self.coordinates {
            Some(CoordinatesUpload {
                x: Some(x),
                y: Some(y),
            }) => Some((x, y)),
            _ => {
                violations.push("coordinates x and y must not be empty");
                None
            },
        };

        if self.area.map_or(true, |a| a <= 0.0) {
            violations.push("area must be greater than 0");
        }

        if self.price.map_or(true, |p| p <= 0.0) {
            violations.push("price must be greater than 0");
        }

        // Minimal price rule: a flat may not be listed below sqrt(area) * 10.
        if let (Some(area), Some(price)) = (self.area, self.price) {
            if area > 0.0 && price > 0.0 && price < area.sqrt() * 10.0 {
                violations.push("price must be at least sqrt(area) * 10");
            }
        }

        if let Some(t) = self.time_to_metro_on_foot {
            if t <= 0 {
                violations.push("timeToMetroOnFoot must be greater than 0");
            }
        }

        if let Some(rooms) = self.number_of_rooms {
            if rooms <= 0 {
                violations.push("numberOfRooms must be greater than 0");
            } else if rooms > 7 {
                violations.push("numberOfRooms must not exceed 7");
            }
        }

        if let Some(b) = self.number_of_bathrooms {
            if b <= 0 {
                violations.push("numberOfBathrooms must be greater than 0");
            }
        }

        if let Some(t) = self.time_to_metro_by_transport {
            if t <= 0.0 {
                violations.push("timeToMetroByTransport must be greater than 0");
            }
        }

        if self.view.is_none() {
            violations.push("view must not be empty");
        }

        if self.house_id.is_none() {
            violations.push("houseId must not be empty");
        }

        if !violations.is_empty() {
            return Err(ImportError::Validation(violations.join(", ")));
        }

        // An empty violation list implies every required field is present.
        match (self.name, coords, self.area, self.price, self.view, self.house_id) {
            (Some(name), Some((coord_x, coord_y)), Some(area), Some(price), Some(view), Some(house_id)) => {
                Ok(FlatRecord {
                    name,
                    coord_x,
                    coord_y,
                    area,
                    price,
                    balcony: self.balcony,
                    time_to_metro_on_foot: self.time_to_metro_on_foot,
                    number_of_rooms: self.number_of_rooms,
                    number_of_bathrooms: self.number_of_bathrooms,
                    time_to_metro_by_transport: self.time_to_metro_by_transport,
                    view,
                    house_id,
                })
            },
            _ => Err(ImportError::Validation(
                "record is missing required fields".into(),
            )),
        }
    }
}

/// Houses import through the same pipeline with a smaller constraint set.
const MAX_HOUSE_YEAR: i64 = 552;

/// One element of an uploaded house JSON array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseUpload {
    pub name: Option<String>,
    pub year: Option<i64>,
    pub number_of_flats_on_floor: Option<i64>,
}

/// A field-validated house record, ready for the writer.
#[derive(Debug, Clone)]
pub struct HouseRecord {
    pub name: String,
    pub year: i64,
    pub number_of_flats_on_floor: i64,
}

impl HouseUpload {
    pub fn validate(self) -> Result<HouseRecord, ImportError> {
        let mut violations: Vec<&'static str> = Vec::new();

        if self.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            violations.push("name must not be empty");
        }

        match self.year {
            None => violations.push("year must not be empty"),
            Some(y) if y <= 0 => violations.push("year must be greater than 0"),
            Some(y) if y > MAX_HOUSE_YEAR => violations.push("year must not exceed 552"),
            _ => {},
        }

        match self.number_of_flats_on_floor {
            None => violations.push("numberOfFlatsOnFloor must not be empty"),
            Some(n) if n <= 0 => violations.push("numberOfFlatsOnFloor must be greater than 0"),
            _ => {},
        }

        if !violations.is_empty() {
            return Err(ImportError::Validation(violations.join(", ")));
        }

        match (self.name, self.year, self.number_of_flats_on_floor) {
            (Some(name), Some(year), Some(number_of_flats_on_floor)) => Ok(HouseRecord {
                name,
                year,
                number_of_flats_on_floor,
            }),
            _ => Err(ImportError::Validation(
                "record is missing required fields".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::error::ImportErrorKind;

    fn valid_upload() -> FlatUpload {
        serde_json::from_str(
            r#"{
                "name": "Cosy two-roomer",
                "coordinates": {"x": 10, "y": -3},
                "area": 42.5,
                "price": 10500.0,
                "balcony": true,
                "timeToMetroOnFoot": 12,
                "numberOfRooms": 2,
                "numberOfBathrooms": 1,
                "timeToMetroByTransport": 4.5,
                "view": "NORMAL",
                "houseId": 1
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_record_passes() {
        let record = valid_upload().validate().unwrap();
        assert_eq!(record.name, "Cosy two-roomer");
        assert_eq!(record.coord_x, 10);
        assert_eq!(record.coord_y, -3);
        assert_eq!(record.view, View::Normal);
        assert_eq!(record.house_id, 1);
    }

    #[test]
    fn test_negative_rooms_rejected() {
        let mut upload = valid_upload();
        upload.number_of_rooms = Some(-1);
        let err = upload.validate().unwrap_err();
        assert_eq!(err.kind(), ImportErrorKind::Validation);
        assert!(err.to_string().contains("numberOfRooms must be greater than 0"));
    }

    #[test]
    fn test_too_many_rooms_rejected() {
        let mut upload = valid_upload();
        upload.number_of_rooms = Some(8);
        let err = upload.validate().unwrap_err();
        assert!(err.to_string().contains("numberOfRooms must not exceed 7"));
    }

    #[test]
    fn test_violations_concatenated_in_order() {
        let mut upload = valid_upload();
        upload.name = None;
        upload.area = Some(-1.0);
        upload.house_id = None;
        let err = upload.validate().unwrap_err();
        let msg = err.to_string();
        let name_pos = msg.find("name must not be empty").unwrap();
        let area_pos = msg.find("area must be greater than 0").unwrap();
        let house_pos = msg.find("houseId must not be empty").unwrap();
        assert!(name_pos < area_pos && area_pos < house_pos);
    }

    #[test]
    fn test_missing_coordinates_rejected() {
        let mut upload = valid_upload();
        upload.coordinates = None;
        let err = upload.validate().unwrap_err();
        assert!(err.to_string().contains("coordinates x and y must not be empty"));
    }

    #[test]
    fn test_partial_coordinates_rejected() {
        let upload: FlatUpload = serde_json::from_str(
            r#"{"name": "x", "coordinates": {"x": 1}, "area": 1, "price": 1, "view": "BAD", "houseId": 1}"#,
        )
        .unwrap();
        assert!(upload.validate().is_err());
    }

    #[test]
    fn test_underpriced_flat_rejected() {
        let mut upload = valid_upload();
        upload.area = Some(100.0);
        upload.price = Some(50.0);
        let err = upload.validate().unwrap_err();
        assert_eq!(err.kind(), ImportErrorKind::Validation);
        assert!(err.to_string().contains("price must be at least sqrt(area) * 10"));
    }

    #[test]
    fn test_price_at_minimal_boundary_accepted() {
        let mut upload = valid_upload();
        upload.area = Some(100.0);
        upload.price = Some(100.0);
        assert!(upload.validate().is_ok());
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let upload: FlatUpload = serde_json::from_str(
            r#"{"name": "x", "coordinates": {"x": 1, "y": 2}, "area": 1, "price": 100, "view": "BAD", "houseId": 1}"#,
        )
        .unwrap();
        let record = upload.validate().unwrap();
        assert!(record.balcony.is_none());
        assert!(record.number_of_rooms.is_none());
    }

    #[test]
    fn test_client_creation_date_is_ignored() {
        let upload: FlatUpload = serde_json::from_str(
            r#"{"name": "x", "coordinates": {"x": 1, "y": 2}, "creationDate": "2020-01-01T00:00:00Z", "area": 1, "price": 100, "view": "BAD", "houseId": 1}"#,
        )
        .unwrap();
        assert!(upload.validate().is_ok());
    }

    #[test]
    fn test_valid_house_passes() {
        let upload: HouseUpload = serde_json::from_str(
            r#"{"name": "Riverside Tower", "year": 12, "numberOfFlatsOnFloor": 4}"#,
        )
        .unwrap();
        let record = upload.validate().unwrap();
        assert_eq!(record.name, "Riverside Tower");
        assert_eq!(record.year, 12);
        assert_eq!(record.number_of_flats_on_floor, 4);
    }

    #[test]
    fn test_house_year_bounds() {
        let too_old: HouseUpload =
            serde_json::from_str(r#"{"name": "x", "year": 553, "numberOfFlatsOnFloor": 4}"#)
                .unwrap();
        let err = too_old.validate().unwrap_err();
        assert_eq!(err.kind(), ImportErrorKind::Validation);
        assert!(err.to_string().contains("year must not exceed 552"));

        let negative: HouseUpload =
            serde_json::from_str(r#"{"name": "x", "year": -1, "numberOfFlatsOnFloor": 4}"#)
                .unwrap();
        assert!(negative
            .validate()
            .unwrap_err()
            .to_string()
            .contains("year must be greater than 0"));
    }

    #[test]
    fn test_house_missing_fields_collected() {
        let upload: HouseUpload = serde_json::from_str(r#"{"name": "  "}"#).unwrap();
        let err = upload.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("name must not be empty"));
        assert!(msg.contains("year must not be empty"));
        assert!(msg.contains("numberOfFlatsOnFloor must not be empty"));
    }
}
