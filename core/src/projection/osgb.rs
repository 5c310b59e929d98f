//! WGS84 latitude/longitude to Ordnance Survey British National Grid.
//!
//! Datum shift by a seven-parameter Helmert transform (accurate to a few
//! meters across Great Britain), then Transverse Mercator on the Airy 1830
//! ellipsoid using the Ordnance Survey series expansions.

use nalgebra as na;

use super::{CoordinateProjector, GeoPoint};

type Vector3 = na::Vector3<f64>;
type Matrix3 = na::Matrix3<f64>;

const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// Northing convergence threshold for the inverse projection, in meters.
const ARC_CONVERGENCE: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis, meters.
    pub a: f64,
    /// Semi-minor axis, meters.
    pub b: f64,
}

impl Ellipsoid {
    pub const AIRY_1830: Ellipsoid = Ellipsoid { a: 6_377_563.396, b: 6_356_256.909 };
    pub const WGS84: Ellipsoid = Ellipsoid { a: 6_378_137.0, b: 6_356_752.314_245 };

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        1.0 - (self.b * self.b) / (self.a * self.a)
    }

    /// Geodetic (radians, meters) to earth-centred cartesian.
    pub fn to_cartesian(&self, lat: f64, lon: f64, height: f64) -> Vector3 {
        let e2 = self.e2();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let nu = self.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();

        Vector3::new(
            (nu + height) * cos_lat * lon.cos(),
            (nu + height) * cos_lat * lon.sin(),
            ((1.0 - e2) * nu + height) * sin_lat,
        )
    }

    /// Earth-centred cartesian to geodetic latitude/longitude (radians).
    /// Height is discarded.
    pub fn from_cartesian(&self, v: &Vector3) -> (f64, f64) {
        let e2 = self.e2();
        let lon = v.y.atan2(v.x);
        let p = (v.x * v.x + v.y * v.y).sqrt();

        let mut lat = v.z.atan2(p * (1.0 - e2));
        for _ in 0..16 {
            let sin_lat = lat.sin();
            let nu = self.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
            let next = (v.z + e2 * nu * sin_lat).atan2(p);
            let done = (next - lat).abs() < 1e-13;
            lat = next;
            if done {
                break;
            }
        }

        (lat, lon)
    }
}

/// Seven-parameter similarity transform between cartesian datums.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Helmert {
    pub translation: Vector3,
    pub scale_ppm: f64,
    /// Rotations about x, y, z in arc-seconds.
    pub rotation_arcsec: [f64; 3],
}

impl Helmert {
    /// Ordnance Survey published parameters, WGS84 to OSGB36.
    pub fn wgs84_to_osgb36() -> Self {
        Self {
            translation: Vector3::new(-446.448, 125.157, -542.060),
            scale_ppm: 20.4894,
            rotation_arcsec: [-0.1502, -0.2470, -0.8421],
        }
    }

    /// Approximate inverse by negating every parameter. The error is second
    /// order in the (tiny) rotation and scale terms, a few millimeters.
    pub fn inverse(&self) -> Self {
        Self {
            translation: -self.translation,
            scale_ppm: -self.scale_ppm,
            rotation_arcsec: self.rotation_arcsec.map(|r| -r),
        }
    }

    pub fn apply(&self, v: &Vector3) -> Vector3 {
        let s = 1.0 + self.scale_ppm * 1e-6;
        let [rx, ry, rz] = self.rotation_arcsec.map(|r| r * ARCSEC_TO_RAD);
        let rotation = Matrix3::new(
            1.0, -rz, ry,
            rz, 1.0, -rx,
            -ry, rx, 1.0,
        );
        self.translation + rotation * v * s
    }
}

/// Fixed projector pair for Great Britain: WGS84 degrees in, British National
/// Grid `[easting, northing]` meters out, and back.
#[derive(Debug, Clone, PartialEq)]
pub struct BritishNationalGrid {
    ellipsoid: Ellipsoid,
    scale_factor: f64,
    true_origin: (f64, f64),
    false_origin: (f64, f64),
    to_local: Helmert,
    to_wgs84: Helmert,
}

impl Default for BritishNationalGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl BritishNationalGrid {
    pub fn new() -> Self {
        let to_local = Helmert::wgs84_to_osgb36();
        Self {
            ellipsoid: Ellipsoid::AIRY_1830,
            scale_factor: 0.999_601_271_7,
            // 49°N, 2°W
            true_origin: (49.0_f64.to_radians(), (-2.0_f64).to_radians()),
            // (E0, N0)
            false_origin: (400_000.0, -100_000.0),
            to_wgs84: to_local.inverse(),
            to_local,
        }
    }

    fn meridional_arc(&self, lat: f64) -> f64 {
        let Ellipsoid { a, b } = self.ellipsoid;
        let n = (a - b) / (a + b);
        let (n2, n3) = (n * n, n * n * n);
        let lat0 = self.true_origin.0;
        let dl = lat - lat0;
        let sl = lat + lat0;

        b * self.scale_factor
            * ((1.0 + n + 1.25 * n2 + 1.25 * n3) * dl
                - (3.0 * n + 3.0 * n2 + 21.0 / 8.0 * n3) * dl.sin() * sl.cos()
                + (15.0 / 8.0 * n2 + 15.0 / 8.0 * n3) * (2.0 * dl).sin() * (2.0 * sl).cos()
                - 35.0 / 24.0 * n3 * (3.0 * dl).sin() * (3.0 * sl).cos())
    }

    /// Radii of curvature (nu, rho) and eta² at a latitude.
    fn curvature(&self, lat: f64) -> (f64, f64, f64) {
        let a = self.ellipsoid.a;
        let e2 = self.ellipsoid.e2();
        let sin2 = lat.sin().powi(2);
        let nu = a * self.scale_factor / (1.0 - e2 * sin2).sqrt();
        let rho = a * self.scale_factor * (1.0 - e2) / (1.0 - e2 * sin2).powf(1.5);
        (nu, rho, nu / rho - 1.0)
    }

    /// Airy 1830 latitude/longitude (radians) to easting/northing.
    pub fn project(&self, lat: f64, lon: f64) -> [f64; 2] {
        let (e0, n0) = self.false_origin;
        let (nu, rho, eta2) = self.curvature(lat);
        let (sin_lat, cos_lat) = lat.sin_cos();
        let tan2 = lat.tan().powi(2);
        let tan4 = tan2 * tan2;
        let cos3 = cos_lat.powi(3);
        let cos5 = cos_lat.powi(5);

        let i = self.meridional_arc(lat) + n0;
        let ii = nu / 2.0 * sin_lat * cos_lat;
        let iii = nu / 24.0 * sin_lat * cos3 * (5.0 - tan2 + 9.0 * eta2);
        let iiia = nu / 720.0 * sin_lat * cos5 * (61.0 - 58.0 * tan2 + tan4);
        let iv = nu * cos_lat;
        let v = nu / 6.0 * cos3 * (nu / rho - tan2);
        let vi = nu / 120.0 * cos5 * (5.0 - 18.0 * tan2 + tan4 + 14.0 * eta2 - 58.0 * tan2 * eta2);

        let dl = lon - self.true_origin.1;
        let northing = i + ii * dl.powi(2) + iii * dl.powi(4) + iiia * dl.powi(6);
        let easting = e0 + iv * dl + v * dl.powi(3) + vi * dl.powi(5);

        [easting, northing]
    }

    /// Easting/northing to Airy 1830 latitude/longitude (radians).
    pub fn unproject(&self, easting: f64, northing: f64) -> (f64, f64) {
        let (e0, n0) = self.false_origin;
        let af0 = self.ellipsoid.a * self.scale_factor;

        let mut lat = (northing - n0) / af0 + self.true_origin.0;
        let mut arc = self.meridional_arc(lat);
        for _ in 0..32 {
            let residual = northing - n0 - arc;
            if residual.abs() < ARC_CONVERGENCE {
                break;
            }
            lat += residual / af0;
            arc = self.meridional_arc(lat);
        }

        let (nu, rho, eta2) = self.curvature(lat);
        let tan = lat.tan();
        let (tan2, tan4, tan6) = (tan.powi(2), tan.powi(4), tan.powi(6));
        let sec = 1.0 / lat.cos();

        let vii = tan / (2.0 * rho * nu);
        let viii = tan / (24.0 * rho * nu.powi(3)) * (5.0 + 3.0 * tan2 + eta2 - 9.0 * tan2 * eta2);
        let ix = tan / (720.0 * rho * nu.powi(5)) * (61.0 + 90.0 * tan2 + 45.0 * tan4);
        let x = sec / nu;
        let xi = sec / (6.0 * nu.powi(3)) * (nu / rho + 2.0 * tan2);
        let xii = sec / (120.0 * nu.powi(5)) * (5.0 + 28.0 * tan2 + 24.0 * tan4);
        let xiia = sec / (5040.0 * nu.powi(7)) * (61.0 + 662.0 * tan2 + 1320.0 * tan4 + 720.0 * tan6);

        let de = easting - e0;
        let lat = lat - vii * de.powi(2) + viii * de.powi(4) - ix * de.powi(6);
        let lon = self.true_origin.1 + x * de - xi * de.powi(3) + xii * de.powi(5) - xiia * de.powi(7);

        (lat, lon)
    }
}

impl CoordinateProjector for BritishNationalGrid {
    fn to_planar(&self, lat: f64, lon: f64) -> [f64; 2] {
        let wgs = Ellipsoid::WGS84.to_cartesian(lat.to_radians(), lon.to_radians(), 0.0);
        let local = self.to_local.apply(&wgs);
        let (lat, lon) = self.ellipsoid.from_cartesian(&local);
        self.project(lat, lon)
    }

    fn to_geographic(&self, x: f64, y: f64) -> GeoPoint {
        let (lat, lon) = self.unproject(x, y);
        let local = self.ellipsoid.to_cartesian(lat, lon, 0.0);
        let wgs = self.to_wgs84.apply(&local);
        let (lat, lon) = Ellipsoid::WGS84.from_cartesian(&wgs);
        GeoPoint::new(lat.to_degrees(), lon.to_degrees())
    }

    /// Rough extent of the national grid, including offshore islands.
    fn in_domain(&self, lat: f64, lon: f64) -> bool {
        (49.0..=61.5).contains(&lat) && (-9.5..=3.0).contains(&lon)
    }
}
