use geo::{LineString, MultiPolygon};

/// Reverses every ring of every polygon in place.
///
/// The boundary file lists rings in the opposite winding to the one the fill
/// convention expects (clockwise exteriors), so without this the interiors and
/// holes of a county fill incorrectly.
pub fn reverse_winding(shape: &mut MultiPolygon<f64>) {
    for polygon in shape.0.iter_mut() {
        polygon.exterior_mut(reverse_ring);
        polygon.interiors_mut(|rings| rings.iter_mut().for_each(reverse_ring));
    }
}

fn reverse_ring(ring: &mut LineString<f64>) {
    ring.0.reverse();
}
