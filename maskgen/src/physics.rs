//! Quarter-wave CPW resonator design equations.
//!
//! The effective permittivity uses the conformal-mapping result for a
//! coplanar waveguide on a substrate of finite height.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use config::{ConfigError, FlatConfig};

/// Speed of light in vacuum, in m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.;

/// Substrate materials with known relative permittivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Material {
    /// High-resistivity silicon.
    #[default]
    Silicon,
    /// C-plane sapphire.
    Sapphire,
}

impl Material {
    /// Relative permittivity of the substrate.
    pub fn eps_r(&self) -> f64 {
        match self {
            Material::Silicon => 11.9,
            Material::Sapphire => 9.4,
        }
    }

    /// Reads `Resonator_material`, defaulting to silicon when absent.
    pub fn from_config(config: &FlatConfig) -> crate::Result<Self> {
        const KEY: &str = "Resonator_material";
        match config.get_opt(KEY) {
            None => Ok(Self::default()),
            Some(_) => config.get_str(KEY)?.parse().map_err(|_| {
                ConfigError::Type {
                    key: KEY.to_string(),
                    expected: "`silicon` or `sapphire`",
                }
                .into()
            }),
        }
    }
}

/// An unrecognized material name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown substrate material `{0}`")]
pub struct UnknownMaterial(pub String);

impl FromStr for Material {
    type Err = UnknownMaterial;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "silicon" => Ok(Material::Silicon),
            "sapphire" => Ok(Material::Sapphire),
            _ => Err(UnknownMaterial(s.to_string())),
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Material::Silicon => write!(f, "silicon"),
            Material::Sapphire => write!(f, "sapphire"),
        }
    }
}

/// CPW cross-section dimensions, in um.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpwGeometry {
    /// Center conductor width.
    pub core_width: f64,
    /// Gap between the conductor and the ground plane.
    pub gap_width: f64,
    /// Substrate height.
    pub height: f64,
}

impl Default for CpwGeometry {
    fn default() -> Self {
        Self {
            core_width: 10.,
            gap_width: 6.,
            height: 525.,
        }
    }
}

/// The complete elliptic integral of the first kind, `K(m)` with parameter
/// `m = k^2`, computed with the arithmetic-geometric mean.
///
/// ```
/// # use maskgen::physics::elliptic_k;
/// assert!((elliptic_k(0.) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// assert!((elliptic_k(0.5) - 1.854_074_677_301_372).abs() < 1e-12);
/// ```
pub fn elliptic_k(m: f64) -> f64 {
    if m >= 1. {
        return f64::INFINITY;
    }
    let (mut a, mut b) = (1f64, (1. - m).sqrt());
    while (a - b).abs() > 1e-15 * a {
        (a, b) = (0.5 * (a + b), (a * b).sqrt());
    }
    PI / (2. * a)
}

/// The effective relative permittivity of a CPW on a finite-height substrate.
pub fn effective_permittivity(cpw: &CpwGeometry, material: Material) -> f64 {
    let (w, s, h) = (cpw.core_width, cpw.gap_width, cpw.height);
    let k0 = w / (w + 2. * s);
    let k3 = (PI * w / (4. * h)).tanh() / (PI * (w + 2. * s) / (4. * h)).tanh();
    let k0p2 = 1. - k0 * k0;
    let k3p2 = 1. - k3 * k3;
    let k_tilde = (elliptic_k(k0p2) / elliptic_k(k0 * k0)) * (elliptic_k(k3 * k3) / elliptic_k(k3p2));
    (1. + material.eps_r() * k_tilde) / (1. + k_tilde)
}

/// The fundamental frequency, in Hz, of a quarter-wave resonator of the given
/// length in um.
pub fn resonator_frequency(length_um: f64, cpw: &CpwGeometry, material: Material) -> f64 {
    let c_eff = SPEED_OF_LIGHT / effective_permittivity(cpw, material).sqrt();
    c_eff / (4. * length_um * 1e-6)
}

/// The length, in um, of a quarter-wave resonator with the given fundamental
/// frequency in Hz.
pub fn resonator_length(frequency_hz: f64, cpw: &CpwGeometry, material: Material) -> f64 {
    let c_eff = SPEED_OF_LIGHT / effective_permittivity(cpw, material).sqrt();
    c_eff / (4. * frequency_hz) * 1e6
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use config::parse_config;

    use super::*;
    use crate::Error;

    #[test]
    fn permittivity_lies_between_vacuum_and_substrate() {
        let cpw = CpwGeometry::default();
        for material in [Material::Silicon, Material::Sapphire] {
            let eps = effective_permittivity(&cpw, material);
            assert!(eps > 1. && eps < material.eps_r());
            // A thick substrate approaches the average of air and substrate.
            assert_relative_eq!(eps, 0.5 * (1. + material.eps_r()), max_relative = 0.02);
        }
    }

    #[test]
    fn length_and_frequency_are_inverse() {
        let cpw = CpwGeometry::default();
        let len = resonator_length(8e9, &cpw, Material::Silicon);
        assert!(len > 3000. && len < 4000.);
        assert_relative_eq!(
            resonator_frequency(len, &cpw, Material::Silicon),
            8e9,
            max_relative = 1e-12
        );
    }

    #[test]
    fn unknown_material_is_a_config_error() {
        assert_eq!("Sapphire".parse::<Material>(), Ok(Material::Sapphire));
        let config = parse_config("Resonator:\n  material: diamond\n").unwrap();
        assert!(matches!(
            Material::from_config(&config),
            Err(Error::Config(ConfigError::Type { .. }))
        ));
        let empty = parse_config("{}").unwrap();
        assert_eq!(Material::from_config(&empty).unwrap(), Material::Silicon);
    }
}
