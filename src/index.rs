use crate::types::County;
use geo::algorithm::contains::Contains;
use geo::bounding_rect::BoundingRect;
use geo::Point;
use rstar::{RTree, RTreeObject, AABB};

// Wrapper for RTree indexing
struct CountyEnvelope {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for CountyEnvelope {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

/// Bounding-box index over county shapes for point lookups.
#[derive(Default)]
pub struct CountyIndex {
    tree: RTree<CountyEnvelope>,
}

impl CountyIndex {
    pub fn build(counties: &[County]) -> Self {
        let items: Vec<CountyEnvelope> = counties.iter().enumerate()
            .filter_map(|(index, county)| {
                let rect = county.geometry.bounding_rect()?;
                Some(CountyEnvelope {
                    index,
                    aabb: AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
                })
            })
            .collect();
        Self { tree: RTree::bulk_load(items) }
    }

    /// Position in `counties` of the county containing (lon, lat).
    pub fn locate(&self, counties: &[County], lon: f64, lat: f64) -> Option<usize> {
        let point = Point::new(lon, lat);
        let envelope = AABB::from_point([lon, lat]);

        self.tree.locate_in_envelope_intersecting(&envelope)
            .map(|candidate| candidate.index)
            .find(|&index| {
                counties.get(index).is_some_and(|county| county.geometry.contains(&point))
            })
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(name: &str, x: f64, y: f64) -> County {
        County {
            name: name.to_string(),
            geometry: MultiPolygon::new(vec![polygon![
                (x: x, y: y), (x: x + 1.0, y: y), (x: x + 1.0, y: y + 1.0), (x: x, y: y + 1.0), (x: x, y: y),
            ]]),
        }
    }

    #[test]
    fn finds_containing_county() {
        let counties = vec![square("Galway", -9.0, 53.0), square("Dublin", -7.0, 53.0)];
        let index = CountyIndex::build(&counties);

        assert_eq!(index.len(), 2);
        assert_eq!(index.locate(&counties, -6.5, 53.5), Some(1));
        assert_eq!(index.locate(&counties, -8.5, 53.5), Some(0));
    }

    #[test]
    fn sea_is_not_a_county() {
        let counties = vec![square("Galway", -9.0, 53.0)];
        let index = CountyIndex::build(&counties);

        assert_eq!(index.locate(&counties, -12.0, 53.5), None);
        assert_eq!(CountyIndex::default().locate(&counties, -8.5, 53.5), None);
    }
}
