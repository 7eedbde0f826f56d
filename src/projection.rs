use crate::config::{ProjectionConfig, RenderConfig};
use anyhow::{bail, Result};
use geo::Coord;
use std::f64::consts::PI;

/// Albers conic equal-area projection from lon/lat degrees to canvas pixels.
///
/// Matches the usual web-mapping pipeline: rotate longitude, project onto the
/// cone, then scale and translate so `center` lands at the middle of the
/// canvas plus `offset`. Canvas y grows downwards.
#[derive(Debug, Clone)]
pub struct Albers {
    n: f64,
    c: f64,
    r0: f64,
    rotate: f64,
    k: f64,
    dx: f64,
    dy: f64,
}

impl Albers {
    pub fn new(config: &ProjectionConfig, width: f64, height: f64) -> Result<Self> {
        let phi0 = config.parallels[0].to_radians();
        let phi1 = config.parallels[1].to_radians();
        let sin0 = phi0.sin();
        let n = (sin0 + phi1.sin()) / 2.0;
        if n.abs() < 1e-6 {
            bail!("Standard parallels {:?} are symmetric about the equator", config.parallels);
        }
        let c = 1.0 + sin0 * (2.0 * n - sin0);
        let r0 = c.sqrt() / n;

        let mut projection = Self {
            n,
            c,
            r0,
            rotate: config.rotate.to_radians(),
            k: config.scale,
            dx: 0.0,
            dy: 0.0,
        };

        let (cx, cy) = projection.raw(config.center[0].to_radians(), config.center[1].to_radians());
        let tx = width / 2.0 + config.offset[0];
        let ty = height / 2.0 + config.offset[1];
        projection.dx = tx - projection.k * cx;
        projection.dy = ty + projection.k * cy;

        Ok(projection)
    }

    pub fn from_render(render: &RenderConfig) -> Result<Self> {
        Self::new(&render.projection, render.width, render.height)
    }

    fn raw(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let r = (self.c - 2.0 * self.n * phi.sin()).max(0.0).sqrt() / self.n;
        let theta = lambda * self.n;
        (r * theta.sin(), self.r0 - r * theta.cos())
    }

    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = self.raw(wrap_longitude(lon.to_radians() + self.rotate), lat.to_radians());
        (self.dx + self.k * x, self.dy - self.k * y)
    }

    pub fn project_coord(&self, coord: &Coord<f64>) -> (f64, f64) {
        self.project(coord.x, coord.y)
    }
}

fn wrap_longitude(lambda: f64) -> f64 {
    if lambda > PI {
        lambda - 2.0 * PI
    } else if lambda < -PI {
        lambda + 2.0 * PI
    } else {
        lambda
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ireland() -> Albers {
        Albers::new(&ProjectionConfig::default(), 960.0, 1000.0).unwrap()
    }

    #[test]
    fn rotated_center_lands_on_translate() {
        let (x, y) = ireland().project(-4.4, 55.4);
        assert!((x - 480.0).abs() < 1e-6, "x = {x}");
        assert!((y - 250.0).abs() < 1e-6, "y = {y}");
    }

    #[test]
    fn east_is_right_and_north_is_up() {
        let projection = ireland();
        let galway = projection.project(-9.05, 53.27);
        let dublin = projection.project(-6.26, 53.35);
        let malin_head = projection.project(-7.37, 55.38);
        let mizen_head = projection.project(-9.82, 51.45);

        assert!(dublin.0 > galway.0);
        assert!(malin_head.1 < mizen_head.1);
    }

    #[test]
    fn country_fits_the_canvas() {
        let projection = ireland();
        for (lon, lat) in [(-10.5, 51.4), (-5.4, 55.4), (-6.0, 52.0), (-10.2, 54.3)] {
            let (x, y) = projection.project(lon, lat);
            assert!((0.0..=960.0).contains(&x), "x = {x} for ({lon}, {lat})");
            assert!((0.0..=1000.0).contains(&y), "y = {y} for ({lon}, {lat})");
        }
    }

    #[test]
    fn symmetric_parallels_are_rejected() {
        let config = ProjectionConfig { parallels: [-30.0, 30.0], ..ProjectionConfig::default() };
        assert!(Albers::new(&config, 960.0, 1000.0).is_err());
    }
}
