/// Resolved ellipsoid numerics shared by every projection of a CRS.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (metres)
    pub a: f64,
    /// Semi-minor axis (metres)
    pub b: f64,
    /// Inverse flattening, 0 for a sphere given by axes only
    pub rf: f64,
    /// First eccentricity squared: (a² - b²) / a²
    pub es: f64,
    /// First eccentricity
    pub e: f64,
    /// Second eccentricity squared: (a² - b²) / b²
    pub ep2: f64,
    pub sphere: bool,
}

impl Ellipsoid {
    /// Build from the two semi-axes, without any authalic substitution.
    pub fn from_axes(a: f64, b: f64) -> Self {
        let a2 = a * a;
        let b2 = b * b;
        let es = (a2 - b2) / a2;
        let rf = if a == b { 0.0 } else { a / (a - b) };
        Self {
            a,
            b,
            rf,
            es,
            e: es.sqrt(),
            ep2: (a2 - b2) / b2,
            sphere: a == b,
        }
    }

    /// Flattening.
    pub fn f(&self) -> f64 {
        (self.a - self.b) / self.a
    }

    /// Third flattening: (a - b) / (a + b)
    pub fn n(&self) -> f64 {
        (self.a - self.b) / (self.a + self.b)
    }
}

pub fn wgs84() -> Ellipsoid {
    Ellipsoid::from_axes(6_378_137.0, 6_378_137.0 * (1.0 - 1.0 / 298.257_223_563))
}

pub fn grs80() -> Ellipsoid {
    Ellipsoid::from_axes(6_378_137.0, 6_378_137.0 * (1.0 - 1.0 / 298.257_222_101))
}

/// A sphere of radius `r`.
pub fn sphere(r: f64) -> Ellipsoid {
    Ellipsoid::from_axes(r, r)
}
