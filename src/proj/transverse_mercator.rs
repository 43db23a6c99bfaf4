//! Transverse Mercator projection, Krüger n-series to 6th order.
//!
//! Implements the Karney (2011) formulation with 6th-order α/β series
//! coefficients, accurate well beyond a UTM zone. `+approx` selects the
//! classic series in [`fast_transverse_mercator`](super::fast_transverse_mercator)
//! instead.

use crate::constants::R2D;
use crate::error::ProjError;
use crate::params::ResolvedParams;
use crate::proj::common::adjust_lon;
use crate::proj::ellipsoid::Ellipsoid;
use crate::proj::fast_transverse_mercator::FastTransverseMercator;
use crate::proj::{Projection, ProjectionDef};

pub const NAMES: &[&str] = &[
    "Extended_Transverse_Mercator",
    "Extended Transverse Mercator",
    "etmerc",
    "Transverse_Mercator",
    "Transverse Mercator",
    "Gauss Kruger",
    "Gauss_Kruger",
    "tmerc",
];

pub const DEF: ProjectionDef = ProjectionDef { names: NAMES, init };

/// Largest |η| (normalised easting) the series is evaluated for, about 150°
/// from the central meridian.
const ETA_LIMIT: f64 = 2.623_395_162_778;

pub struct TransverseMercator {
    ellipsoid: Ellipsoid,
    lon0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
    // Precomputed constants
    a_hat: f64,      // A = a/(1+n) * (1 + n²/4 + n⁴/64)
    alpha: [f64; 6], // Forward series coefficients
    beta: [f64; 6],  // Inverse series coefficients
    xi0: f64,        // ξ at the latitude of origin
}

impl TransverseMercator {
    pub fn new(
        ellipsoid: Ellipsoid,
        lon0: f64,
        lat0: f64,
        k0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let n = ellipsoid.n();
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let a_hat = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0);

        let mut tm = Self {
            ellipsoid,
            lon0,
            k0,
            false_easting,
            false_northing,
            a_hat,
            alpha: Self::alpha_coefficients(n, n2, n3, n4, n5, n6),
            beta: Self::beta_coefficients(n, n2, n3, n4, n5, n6),
            xi0: 0.0,
        };
        tm.xi0 = tm.xi_eta(lat0, 0.0).0;
        tm
    }

    /// Forward series coefficients α₁..α₆ (Krüger, 6th order).
    fn alpha_coefficients(n: f64, n2: f64, n3: f64, n4: f64, n5: f64, n6: f64) -> [f64; 6] {
        [
            // α₁
            n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4 - 127.0 / 288.0 * n5
                + 7891.0 / 37800.0 * n6,
            // α₂
            13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4 + 281.0 / 630.0 * n5
                - 1983433.0 / 1935360.0 * n6,
            // α₃
            61.0 / 240.0 * n3 - 103.0 / 140.0 * n4
                + 15061.0 / 26880.0 * n5
                + 167603.0 / 181440.0 * n6,
            // α₄
            49561.0 / 161280.0 * n4 - 179.0 / 168.0 * n5 + 6601661.0 / 7257600.0 * n6,
            // α₅
            34729.0 / 80640.0 * n5 - 3418889.0 / 1995840.0 * n6,
            // α₆
            212378941.0 / 319334400.0 * n6,
        ]
    }

    /// Inverse series coefficients β₁..β₆ (Krüger, 6th order).
    fn beta_coefficients(n: f64, n2: f64, n3: f64, n4: f64, n5: f64, n6: f64) -> [f64; 6] {
        [
            // β₁
            n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - 1.0 / 360.0 * n4 - 81.0 / 512.0 * n5
                + 96199.0 / 604800.0 * n6,
            // β₂
            1.0 / 48.0 * n2 + 1.0 / 15.0 * n3 - 437.0 / 1440.0 * n4 + 46.0 / 105.0 * n5
                - 1118711.0 / 3870720.0 * n6,
            // β₃
            17.0 / 480.0 * n3 - 37.0 / 840.0 * n4 - 209.0 / 4480.0 * n5 + 5569.0 / 90720.0 * n6,
            // β₄
            4397.0 / 161280.0 * n4 - 11.0 / 504.0 * n5 - 830251.0 / 7257600.0 * n6,
            // β₅
            4583.0 / 161280.0 * n5 - 108847.0 / 3991680.0 * n6,
            // β₆
            20648693.0 / 638668800.0 * n6,
        ]
    }

    /// Normalised (ξ, η) of a point `dlam` from the central meridian.
    fn xi_eta(&self, lat: f64, dlam: f64) -> (f64, f64) {
        // Convert geodetic tangent to conformal tangent
        let tau_prime = self.tau_to_tau_prime(lat.tan());
        let (sin_dlam, cos_dlam) = dlam.sin_cos();

        // ξ' = atan2(τ', cos(Δλ)), η' = asinh(sin(Δλ) / hypot(τ', cos(Δλ)))
        let xi_prime = tau_prime.atan2(cos_dlam);
        let eta_prime = (sin_dlam / tau_prime.hypot(cos_dlam)).asinh();

        let mut xi = xi_prime;
        let mut eta = eta_prime;
        for (j, &a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += a * (k * xi_prime).sin() * (k * eta_prime).cosh();
            eta += a * (k * xi_prime).cos() * (k * eta_prime).sinh();
        }
        (xi, eta)
    }

    /// Convert geodetic tangent τ to conformal tangent τ'.
    fn tau_to_tau_prime(&self, tau: f64) -> f64 {
        let e = self.ellipsoid.e;
        let tau1 = tau.hypot(1.0); // sec(φ)
        let sigma = (e * (e * tau / tau1).atanh()).sinh();
        tau * sigma.hypot(1.0) - sigma * tau1
    }

    /// Convert conformal tangent τ' back to geodetic tangent τ via Newton iteration.
    fn tau_prime_to_tau(&self, tau_prime: f64) -> f64 {
        let e = self.ellipsoid.e;
        let es = self.ellipsoid.es;
        let mut tau = tau_prime; // initial guess

        for _ in 0..15 {
            let tau1 = tau.hypot(1.0);
            let sigma = (e * (e * tau / tau1).atanh()).sinh();
            let tau_prime_est = tau * sigma.hypot(1.0) - sigma * tau1;
            let dtau = (tau_prime - tau_prime_est) * (1.0 + (1.0 - es) * tau * tau)
                / ((1.0 - es) * tau1 * tau_prime_est.hypot(1.0));
            tau += dtau;
            if dtau.abs() < 1e-12 * (1.0 + tau.abs()) {
                break;
            }
        }
        tau
    }
}

pub fn init(p: &ResolvedParams) -> Result<Box<dyn Projection>, ProjError> {
    // The Krüger series degenerates on a sphere, where the closed form is exact.
    if p.approx || p.ellipsoid.es <= 0.0 || p.ellipsoid.es.is_nan() {
        return Ok(Box::new(FastTransverseMercator::from_params(p)?));
    }
    Ok(Box::new(TransverseMercator::new(
        p.ellipsoid,
        p.long0,
        p.lat0,
        p.k0,
        p.x0,
        p.y0,
    )))
}

impl Projection for TransverseMercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        let dlam = adjust_lon(lon - self.lon0);
        let (xi, eta) = self.xi_eta(lat, dlam);
        if eta.abs() > ETA_LIMIT {
            return Err(ProjError::Projection(format!(
                "point {} {} is too far from the central meridian",
                lon * R2D,
                lat * R2D
            )));
        }

        let x = self.k0 * self.a_hat * eta + self.false_easting;
        let y = self.k0 * self.a_hat * (xi - self.xi0) + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let eta = (x - self.false_easting) / (self.k0 * self.a_hat);
        let xi = (y - self.false_northing) / (self.k0 * self.a_hat) + self.xi0;
        if eta.abs() > ETA_LIMIT {
            return Err(ProjError::Projection(format!(
                "easting {x} is outside the transverse mercator domain"
            )));
        }

        // Apply β series (inverse)
        let mut xi_prime = xi;
        let mut eta_prime = eta;
        for (j, &b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_prime -= b * (k * xi).sin() * (k * eta).cosh();
            eta_prime -= b * (k * xi).cos() * (k * eta).sinh();
        }

        // τ' = sin(ξ') / hypot(sinh(η'), cos(ξ'))
        let sinh_eta = eta_prime.sinh();
        let (sin_xi, cos_xi) = xi_prime.sin_cos();
        let tau_prime = sin_xi / sinh_eta.hypot(cos_xi);

        // Recover geodetic tangent τ from conformal tangent τ'
        let tau = self.tau_prime_to_tau(tau_prime);

        let lat = tau.atan();
        let lon = adjust_lon(self.lon0 + sinh_eta.atan2(cos_xi));
        Ok((lon, lat))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::proj_string;
    use crate::proj::ellipsoid::{grs80, wgs84};
    use approx::assert_relative_eq;

    fn from_def(def: &str) -> Box<dyn Projection> {
        init(&ResolvedParams::build(proj_string::parse(def).unwrap()).unwrap()).unwrap()
    }

    #[test]
    fn test_grs80_reference() {
        let tm = from_def("+proj=tmerc +ellps=GRS80");
        let (x, y) = tm.forward(2f64.to_radians(), 1f64.to_radians()).unwrap();
        assert_relative_eq!(x, 222_650.796_795_778_47, epsilon = 1e-3);
        assert_relative_eq!(y, 110_642.229_411_927_1, epsilon = 1e-3);
    }

    #[test]
    fn test_offset_origin_reference() {
        let tm = from_def("+proj=etmerc +k=0.998 +lon_0=-20 +datum=WGS84 +x_0=10000 +y_0=20000");
        let (x, y) = tm.forward(2f64.to_radians(), 1f64.to_radians()).unwrap();
        assert_relative_eq!(x, 2_516_532.477_709_202, epsilon = 1e-3);
        assert_relative_eq!(y, 139_083.357_933_712_77, epsilon = 1e-3);
        let (lon, lat) = tm.inverse(x, y).unwrap();
        assert_relative_eq!(lon, 2f64.to_radians(), epsilon = 1e-11);
        assert_relative_eq!(lat, 1f64.to_radians(), epsilon = 1e-11);
    }

    #[test]
    fn test_latitude_of_origin() {
        let lat0 = 49f64.to_radians();
        let tm = TransverseMercator::new(grs80(), -2f64.to_radians(), lat0, 0.9996, 400_000.0, -100_000.0);
        let (x, y) = tm.forward(-2f64.to_radians(), lat0).unwrap();
        assert_relative_eq!(x, 400_000.0, epsilon = 1e-6);
        assert_relative_eq!(y, -100_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_roundtrip() {
        let tm = TransverseMercator::new(wgs84(), 15f64.to_radians(), 0.0, 0.9996, 500_000.0, 0.0);
        let cases: &[(f64, f64)] = &[
            (15.0, 52.0), // central meridian
            (12.0, 50.0), // near zone boundary
            (18.0, 50.0), // near other boundary
            (15.0, 0.0),  // equator
            (15.0, 80.0), // high latitude
            (13.5, 52.5), // off-center
            (45.0, 10.0), // far outside the zone
            (15.0, -60.0),
        ];
        for &(lon_deg, lat_deg) in cases {
            let lon = lon_deg.to_radians();
            let lat = lat_deg.to_radians();
            let (x, y) = tm.forward(lon, lat).unwrap();
            let (lon2, lat2) = tm.inverse(x, y).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-9);
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_central_meridian_easting() {
        let tm = TransverseMercator::new(wgs84(), 15f64.to_radians(), 0.0, 0.9996, 500_000.0, 0.0);
        let (e, n) = tm.forward(15f64.to_radians(), 52f64.to_radians()).unwrap();
        assert_relative_eq!(e, 500_000.0, epsilon = 0.01);
        assert!(n > 5_760_000.0 && n < 5_762_000.0, "northing = {n}");
    }

    #[test]
    fn test_sphere_uses_closed_form() {
        let params = ResolvedParams::build(proj_string::parse("+proj=tmerc +a=6400000").unwrap()).unwrap();
        let tm = init(&params).unwrap();
        let (x, y) = tm.forward(0.0, 0.0).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
        let (lon, lat) = tm.inverse(100_000.0, 200_000.0).unwrap();
        let (x2, y2) = tm.forward(lon, lat).unwrap();
        assert_relative_eq!(x2, 100_000.0, epsilon = 1e-4);
        assert_relative_eq!(y2, 200_000.0, epsilon = 1e-4);
    }

    #[test]
    fn test_approx_selects_fast_series() {
        let tm = from_def("+proj=tmerc +approx +a=6400000");
        let (x, y) = tm.forward(2f64.to_radians(), 1f64.to_radians()).unwrap();
        assert_relative_eq!(x, 223_413.466_406_322_32, epsilon = 1e-6);
        assert_relative_eq!(y, 111_769.145_040_596_85, epsilon = 1e-6);
    }
}
