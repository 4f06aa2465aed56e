//! Location updates and community lookup.
//!
//! The map service is only ever seen through [`LocationUpdate`] and
//! [`PoiResult`]; its raw response shapes stay inside [`amap`].

pub mod amap;

pub use amap::AmapClient;

use crate::models::Assessment;
use serde::{Deserialize, Serialize};

/// Name fragments that mark a residential compound.
const RESIDENTIAL_NAME_HINTS: &[&str] = &["小区", "花园", "苑", "家园", "新村", "公馆"];

/// POI type fragment for residential areas.
const RESIDENTIAL_TYPE_HINT: &str = "住宅";

/// A picked point with its address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub lng: f64,
    pub lat: f64,
    pub address: String,
}

/// A community found by place search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoiResult {
    pub id: String,
    pub name: String,
    /// Province, city, district and street address concatenated.
    pub address: String,
    /// `[lng, lat]`
    pub location: [f64; 2],
}

impl PoiResult {
    pub fn to_location_update(&self) -> LocationUpdate {
        LocationUpdate {
            lng: self.location[0],
            lat: self.location[1],
            address: format!("{} - {}", self.name, self.address),
        }
    }
}

/// Copy of `assessment` with address and coordinates replaced.
///
/// Coordinates are taken as given; no range check is applied.
pub fn apply_location(assessment: &Assessment, update: &LocationUpdate) -> Assessment {
    let mut updated = assessment.clone();
    updated.location.address = Some(update.address.clone());
    updated.location.coordinates = Some([update.lng, update.lat]);
    updated
}

/// Whether a POI looks like a residential community.
pub fn is_residential(name: &str, poi_type: &str) -> bool {
    RESIDENTIAL_NAME_HINTS.iter().any(|hint| name.contains(hint))
        || poi_type.contains(RESIDENTIAL_TYPE_HINT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::new_draft;
    use crate::models::Location;

    #[test]
    fn test_apply_location() {
        let draft = new_draft("Test", Location::default(), "2024-06-01");
        let update = LocationUpdate {
            lng: 120.15,
            lat: 30.28,
            address: "杭州市西湖区文三路".to_string(),
        };

        let located = apply_location(&draft, &update);

        assert_eq!(located.location.coordinates, Some([120.15, 30.28]));
        assert_eq!(located.location.address.as_deref(), Some("杭州市西湖区文三路"));
        assert_eq!(draft.location.coordinates, None);
        assert_eq!(located.categories, draft.categories);
    }

    #[test]
    fn test_apply_location_without_range_check() {
        let draft = new_draft("Test", Location::default(), "2024-06-01");
        let update = LocationUpdate {
            lng: 500.0,
            lat: -91.0,
            address: String::new(),
        };

        assert_eq!(
            apply_location(&draft, &update).location.coordinates,
            Some([500.0, -91.0])
        );
    }

    #[test]
    fn test_residential_heuristic() {
        assert!(is_residential("翠苑一区", "地名地址信息"));
        assert!(is_residential("阳光花园", ""));
        assert!(is_residential("西湖公馆", ""));
        assert!(is_residential("文一大楼", "商务住宅;住宅区;住宅小区"));
        assert!(!is_residential("西湖银泰", "购物服务;商场"));
    }

    #[test]
    fn test_poi_to_location_update() {
        let poi = PoiResult {
            id: "B0FFF".to_string(),
            name: "阳光花园".to_string(),
            address: "浙江省杭州市西湖区文三路1号".to_string(),
            location: [120.1, 30.2],
        };

        let update = poi.to_location_update();
        assert_eq!(update.lng, 120.1);
        assert_eq!(update.lat, 30.2);
        assert_eq!(update.address, "阳光花园 - 浙江省杭州市西湖区文三路1号");
    }
}
