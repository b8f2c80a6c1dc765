//! Chemical species definitions.

/// Chemical species relevant for pressurized-gas release scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Hydrogen (H₂)
    H2,
    /// Methane (CH₄)
    CH4,
    /// Propane (C₃H₈)
    Propane,
    /// Ethane
    Ethane,
    /// Nitrogen (N₂)
    N2,
    /// Oxygen (O₂)
    O2,
    /// Helium (He)
    He,
    /// Air (pseudo-pure backend fluid)
    Air,
    /// Carbon dioxide (CO₂)
    CO2,
    /// Carbon monoxide (CO)
    CO,
    /// Water (H₂O)
    H2O,
    /// Ammonia (NH₃)
    Ammonia,
}

impl Species {
    pub const ALL: [Species; 12] = [
        Species::H2,
        Species::CH4,
        Species::Propane,
        Species::Ethane,
        Species::N2,
        Species::O2,
        Species::He,
        Species::Air,
        Species::CO2,
        Species::CO,
        Species::H2O,
        Species::Ammonia,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Species::H2 => "H2",
            Species::CH4 => "CH4",
            Species::Propane => "Propane",
            Species::Ethane => "Ethane",
            Species::N2 => "N2",
            Species::O2 => "O2",
            Species::He => "He",
            Species::Air => "Air",
            Species::CO2 => "CO2",
            Species::CO => "CO",
            Species::H2O => "H2O",
            Species::Ammonia => "NH3",
        }
    }

    /// Get human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Species::H2 => "Hydrogen",
            Species::CH4 => "Methane",
            Species::Propane => "Propane",
            Species::Ethane => "Ethane",
            Species::N2 => "Nitrogen",
            Species::O2 => "Oxygen",
            Species::He => "Helium",
            Species::Air => "Air",
            Species::CO2 => "Carbon Dioxide",
            Species::CO => "Carbon Monoxide",
            Species::H2O => "Water",
            Species::Ammonia => "Ammonia",
        }
    }

    /// Get CoolProp fluid name for this species.
    pub fn coolprop_name(&self) -> &'static str {
        match self {
            Species::H2 => "Hydrogen",
            Species::CH4 => "Methane",
            Species::Propane => "n-Propane",
            Species::Ethane => "Ethane",
            Species::N2 => "Nitrogen",
            Species::O2 => "Oxygen",
            Species::He => "Helium",
            Species::Air => "Air",
            Species::CO2 => "CarbonDioxide",
            Species::CO => "CarbonMonoxide",
            Species::H2O => "Water",
            Species::Ammonia => "Ammonia",
        }
    }

    /// Map to rfluids Pure enum (internal use for CoolProp backend).
    pub(crate) fn rfluids_pure(&self) -> rfluids::substance::Pure {
        use rfluids::substance::Pure;
        match self {
            Species::H2 => Pure::Hydrogen,
            Species::CH4 => Pure::Methane,
            Species::Propane => Pure::nPropane,
            Species::Ethane => Pure::Ethane,
            Species::N2 => Pure::Nitrogen,
            Species::O2 => Pure::Oxygen,
            Species::He => Pure::Helium,
            Species::Air => Pure::Air,
            Species::CO2 => Pure::CarbonDioxide,
            Species::CO => Pure::CarbonMonoxide,
            Species::H2O => Pure::Water,
            Species::Ammonia => Pure::Ammonia,
        }
    }

    /// Get molar mass [kg/kmol] for this species.
    ///
    /// Values sourced from standard reference data (e.g., NIST).
    pub fn molar_mass(&self) -> f64 {
        match self {
            Species::H2 => 2.016,
            Species::CH4 => 16.043,
            Species::Propane => 44.097,
            Species::Ethane => 30.070,
            Species::N2 => 28.014,
            Species::O2 => 31.999,
            Species::He => 4.003,
            Species::Air => 28.965,
            Species::CO2 => 44.010,
            Species::CO => 28.010,
            Species::H2O => 18.015,
            Species::Ammonia => 17.031,
        }
    }

    /// Heat capacity ratio γ = cp/cv near ambient temperature.
    ///
    /// Used by the calorically-perfect ideal-gas backend; real-gas backends
    /// derive γ from the equation of state instead.
    pub fn gamma_ideal(&self) -> f64 {
        match self {
            Species::H2 => 1.405,
            Species::CH4 => 1.32,
            Species::Propane => 1.13,
            Species::Ethane => 1.19,
            Species::N2 => 1.40,
            Species::O2 => 1.40,
            Species::He => 1.667,
            Species::Air => 1.40,
            Species::CO2 => 1.29,
            Species::CO => 1.40,
            Species::H2O => 1.33,
            Species::Ammonia => 1.31,
        }
    }
}

impl std::str::FromStr for Species {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "H2" | "HYDROGEN" => Ok(Species::H2),
            "CH4" | "METHANE" => Ok(Species::CH4),
            "PROPANE" | "C3H8" => Ok(Species::Propane),
            "ETHANE" | "C2H6" => Ok(Species::Ethane),
            "N2" | "NITROGEN" => Ok(Species::N2),
            "O2" | "OXYGEN" => Ok(Species::O2),
            "HE" | "HELIUM" => Ok(Species::He),
            "AIR" => Ok(Species::Air),
            "CO2" | "CARBONDIOXIDE" | "CARBON DIOXIDE" => Ok(Species::CO2),
            "CO" | "CARBONMONOXIDE" | "CARBON MONOXIDE" => Ok(Species::CO),
            "H2O" | "WATER" => Ok(Species::H2O),
            "NH3" | "AMMONIA" => Ok(Species::Ammonia),
            _ => Err("unknown species"),
        }
    }
}
