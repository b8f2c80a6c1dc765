//! Fluid blends (pure species or weighted mixtures).

use crate::error::{FluidError, FluidResult};
use crate::species::Species;
use vf_core::numeric::{Tolerances, nearly_equal};

/// Tolerance on the mole-fraction sum for a valid blend.
const WEIGHT_SUM_TOL: f64 = 1e-6;

/// A fluid blend defined by mole fractions.
///
/// Unlike free-form mixture strings, a `Blend` is validated on construction:
/// all fractions must be finite and non-negative, and they must sum to 1
/// within tolerance. A malformed blend is a configuration error, never
/// silently repaired.
#[derive(Debug, Clone, PartialEq)]
pub struct Blend {
    /// Species and their mole fractions (sum = 1 within tolerance).
    items: Vec<(Species, f64)>,
}

impl Blend {
    /// Create a pure-species blend.
    pub fn pure(species: Species) -> Self {
        Self {
            items: vec![(species, 1.0)],
        }
    }

    /// Create a blend from mole fractions.
    ///
    /// Fails with `FluidError::Configuration` when any fraction is
    /// non-finite or negative, or when the fractions do not sum to 1
    /// within 1e-6.
    pub fn new(fractions: Vec<(Species, f64)>) -> FluidResult<Self> {
        if fractions.is_empty() {
            return Err(FluidError::Configuration {
                what: "empty blend",
            });
        }

        let mut sum = 0.0;
        for (_, frac) in &fractions {
            if !frac.is_finite() {
                return Err(FluidError::Configuration {
                    what: "non-finite mole fraction",
                });
            }
            if *frac < 0.0 {
                return Err(FluidError::Configuration {
                    what: "negative mole fraction",
                });
            }
            sum += frac;
        }

        if (sum - 1.0).abs() > WEIGHT_SUM_TOL {
            return Err(FluidError::Configuration {
                what: "mole fractions must sum to 1",
            });
        }

        // Drop negligible components, renormalizing the residual rounding
        let items: Vec<(Species, f64)> = fractions
            .into_iter()
            .map(|(sp, f)| (sp, f / sum))
            .filter(|(_, f)| *f > 1e-15)
            .collect();

        if items.is_empty() {
            return Err(FluidError::Configuration {
                what: "all mole fractions negligible",
            });
        }

        Ok(Self { items })
    }

    /// Get mole fraction of a species (0.0 if not present).
    pub fn mole_fraction(&self, species: Species) -> f64 {
        self.items
            .iter()
            .find(|(s, _)| *s == species)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    /// Check if this is a pure-species blend.
    ///
    /// Returns `Some(species)` if exactly one species has fraction ≈1.0.
    pub fn is_pure(&self) -> Option<Species> {
        if self.items.len() == 1 {
            let (species, frac) = self.items[0];
            let tol = Tolerances {
                abs: 1e-10,
                rel: 1e-10,
            };
            if nearly_equal(frac, 1.0, tol) {
                return Some(species);
            }
        }
        None
    }

    /// Iterate over all species with non-zero mole fractions.
    pub fn iter(&self) -> impl Iterator<Item = (Species, f64)> + '_ {
        self.items.iter().copied()
    }

    /// Compute blend molar mass [kg/kmol] from species mole fractions.
    pub fn molar_mass(&self) -> f64 {
        self.items
            .iter()
            .map(|(species, mole_frac)| species.molar_mass() * mole_frac)
            .sum()
    }

    /// Canonical string key for this blend, e.g. `"H2"` or `"CH4:0.960,C2H6:0.040"`.
    pub fn key(&self) -> String {
        if let Some(species) = self.is_pure() {
            return species.key().to_string();
        }
        self.items
            .iter()
            .map(|(sp, f)| format!("{}:{:.3}", sp.key(), f))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_blend() {
        let blend = Blend::pure(Species::H2);
        assert_eq!(blend.is_pure(), Some(Species::H2));
        assert_eq!(blend.mole_fraction(Species::H2), 1.0);
        assert_eq!(blend.mole_fraction(Species::N2), 0.0);
        assert_eq!(blend.key(), "H2");
    }

    #[test]
    fn valid_mixture() {
        let blend = Blend::new(vec![(Species::CH4, 0.96), (Species::Ethane, 0.04)]).unwrap();
        assert_eq!(blend.is_pure(), None);
        let tol = Tolerances::default();
        assert!(nearly_equal(blend.mole_fraction(Species::CH4), 0.96, tol));
        assert!(nearly_equal(blend.molar_mass(), 0.96 * 16.043 + 0.04 * 30.070, tol));
    }

    #[test]
    fn reject_bad_sum() {
        let result = Blend::new(vec![(Species::CH4, 0.5), (Species::Ethane, 0.4)]);
        assert!(matches!(
            result,
            Err(FluidError::Configuration { .. })
        ));
    }

    #[test]
    fn reject_negative_fraction() {
        let result = Blend::new(vec![(Species::O2, -0.5), (Species::N2, 1.5)]);
        assert!(result.is_err());
    }

    #[test]
    fn reject_non_finite() {
        let result = Blend::new(vec![(Species::O2, f64::NAN)]);
        assert!(result.is_err());
    }

    #[test]
    fn reject_empty() {
        assert!(Blend::new(vec![]).is_err());
    }

    #[test]
    fn sum_within_tolerance_accepted() {
        let blend = Blend::new(vec![(Species::O2, 0.21), (Species::N2, 0.79 + 5e-7)]).unwrap();
        let sum: f64 = blend.iter().map(|(_, f)| f).sum();
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-12,
        };
        assert!(nearly_equal(sum, 1.0, tol));
    }
}
