use geo::{GeodesicDistance, Point};
use crate::models::{GroupRecord, RankedGroup};

/// Calculate the geodesic distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers on the WGS84 ellipsoid
#[inline]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let from = Point::new(lon1, lat1);
    let to = Point::new(lon2, lat2);

    from.geodesic_distance(&to) / 1000.0
}

/// Attach the distance from `origin` to each group and sort ascending
///
/// The sort is stable, so equally distant groups keep their roster order.
/// Groups without coordinates are placed last.
pub fn rank_by_distance(origin: (f64, f64), groups: Vec<GroupRecord>) -> Vec<RankedGroup> {
    let (lat, lon) = origin;

    let mut ranked: Vec<RankedGroup> = groups
        .into_iter()
        .map(|group| {
            let distance_km = match group.coordinates() {
                Some((g_lat, g_lon)) => distance_km(lat, lon, g_lat, g_lon),
                None => f64::INFINITY,
            };
            RankedGroup { group, distance_km }
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_at(name: &str, coords: Option<(f64, f64)>) -> GroupRecord {
        GroupRecord {
            row: 0,
            name: name.to_string(),
            address: None,
            neighborhood: "Centro".to_string(),
            category: "Jovens".to_string(),
            day: "Quarta".to_string(),
            mode: "Presencial".to_string(),
            start_time: "20:00".to_string(),
            leader_name: "Leader".to_string(),
            leader_contact: None,
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
        }
    }

    #[test]
    fn test_distance_sao_paulo_to_campinas() {
        // Praça da Sé to Campinas centre is roughly 84 km
        let distance = distance_km(-23.5505, -46.6333, -22.9056, -47.0608);
        assert!((distance - 84.0).abs() < 5.0, "Distance should be ~84km, got {}", distance);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        assert!(distance_km(-23.5505, -46.6333, -23.5505, -46.6333).abs() < 1e-9);
    }

    #[test]
    fn test_rank_sorted_ascending() {
        let groups = vec![
            group_at("far", Some((-23.70, -46.70))),
            group_at("near", Some((-23.551, -46.634))),
            group_at("mid", Some((-23.60, -46.65))),
        ];

        let ranked = rank_by_distance((-23.5505, -46.6333), groups);

        let names: Vec<&str> = ranked.iter().map(|r| r.group.name.as_str()).collect();
        assert_eq!(names, vec!["near", "mid", "far"]);
        for pair in ranked.windows(2) {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }
    }

    #[test]
    fn test_rank_ties_keep_roster_order() {
        let groups = vec![
            group_at("first", Some((-23.56, -46.64))),
            group_at("second", Some((-23.56, -46.64))),
        ];

        let ranked = rank_by_distance((-23.5505, -46.6333), groups);
        assert_eq!(ranked[0].group.name, "first");
        assert_eq!(ranked[1].group.name, "second");
    }

    #[test]
    fn test_rank_unresolved_last() {
        let groups = vec![
            group_at("unknown", None),
            group_at("known", Some((-23.56, -46.64))),
        ];

        let ranked = rank_by_distance((-23.5505, -46.6333), groups);
        assert_eq!(ranked[0].group.name, "known");
        assert!(ranked[1].distance_km.is_infinite());
    }
}
