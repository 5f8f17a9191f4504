use crate::client::GeoPoint;

/// Scale factor on the central meridian.
const K0: f64 = 0.9996;
/// WGS84 semi-major axis in metres.
const SEMI_MAJOR: f64 = 6_378_137.0;
/// WGS84 first eccentricity.
const ECCENTRICITY: f64 = 0.081819191;
/// WGS84 second eccentricity squared.
const E1SQ: f64 = 0.006739497;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// A UTM zone: number (1..=60) and hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    pub number: u8,
    pub northern: bool,
}

impl UtmZone {
    pub fn new(number: u8, northern: bool) -> Self {
        Self { number, northern }
    }

    pub fn north(number: u8) -> Self {
        Self::new(number, true)
    }

    pub fn south(number: u8) -> Self {
        Self::new(number, false)
    }

    /// Longitude of the zone's central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        (f64::from(self.number) - 1.0) * 6.0 - 180.0 + 3.0
    }
}

impl Default for UtmZone {
    /// Zone 28N, which covers Senegal, Mauritania and the eastern Canaries.
    fn default() -> Self {
        Self::north(28)
    }
}

/// Converts a UTM `(easting, northing)` pair to WGS84 degrees.
///
/// Uses the closed-form inverse series: footpoint latitude from the
/// meridional arc, then the second to sixth order corrections in the
/// offset from the central meridian. Agreement with an exact inverse is
/// around 1e-5 degrees at the zone edges and far better near the centre.
///
/// Non-finite input produces non-finite output rather than an error; the
/// caller is expected to validate the result.
///
/// # Example
///
/// ```
/// use lampadaire_import::{UtmZone, utm_to_wgs84};
///
/// let p = utm_to_wgs84(500_000.0, 0.0, UtmZone::default());
/// assert!(p.lat.abs() < 1e-9);
/// assert!((p.lon - -15.0).abs() < 1e-9);
/// ```
pub fn utm_to_wgs84(easting: f64, northing: f64, zone: UtmZone) -> GeoPoint {
    let e2 = ECCENTRICITY * ECCENTRICITY;

    let northing = if zone.northern {
        northing
    } else {
        northing - FALSE_NORTHING_SOUTH
    };

    // Meridional arc and rectifying latitude
    let arc = northing / K0;
    let mu = arc
        / (SEMI_MAJOR * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0));

    let root = (1.0 - e2).sqrt();
    let ei = (1.0 - root) / (1.0 + root);

    let ca = 3.0 * ei / 2.0 - 27.0 * ei.powi(3) / 32.0;
    let cb = 21.0 * ei.powi(2) / 16.0 - 55.0 * ei.powi(4) / 32.0;
    let cc = 151.0 * ei.powi(3) / 96.0;
    let cd = 1097.0 * ei.powi(4) / 512.0;

    // Footpoint latitude
    let phi1 = mu
        + ca * (2.0 * mu).sin()
        + cb * (4.0 * mu).sin()
        + cc * (6.0 * mu).sin()
        + cd * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();
    let w = 1.0 - e2 * sin_phi1 * sin_phi1;

    // Radii of curvature in the prime vertical and the meridian
    let n0 = SEMI_MAJOR / w.sqrt();
    let r0 = SEMI_MAJOR * (1.0 - e2) / w.powf(1.5);
    let fact1 = n0 * tan_phi1 / r0;

    let a1 = FALSE_EASTING - easting;
    let dd0 = a1 / (n0 * K0);
    let t0 = tan_phi1 * tan_phi1;
    let q0 = E1SQ * cos_phi1 * cos_phi1;

    let fact2 = dd0 * dd0 / 2.0;
    let fact3 = (5.0 + 3.0 * t0 + 10.0 * q0 - 4.0 * q0 * q0 - 9.0 * E1SQ) * dd0.powi(4) / 24.0;
    let fact4 = (61.0 + 90.0 * t0 + 298.0 * q0 + 45.0 * t0 * t0 - 252.0 * E1SQ - 3.0 * q0 * q0)
        * dd0.powi(6)
        / 720.0;

    let lof1 = a1 / (n0 * K0);
    let lof2 = (1.0 + 2.0 * t0 + q0) * dd0.powi(3) / 6.0;
    let lof3 = (5.0 - 2.0 * q0 + 28.0 * t0 - 3.0 * q0 * q0 + 8.0 * E1SQ + 24.0 * t0 * t0)
        * dd0.powi(5)
        / 120.0;
    let delta_lon = ((lof1 - lof2 + lof3) / cos_phi1).to_degrees();

    let lat = (phi1 - fact1 * (fact2 + fact3 + fact4)).to_degrees();
    let lon = zone.central_meridian() - delta_lon;

    GeoPoint { lon, lat }
}
