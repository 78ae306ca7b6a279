//! Mode registry: physical quantities keyed by image mode code
//!
//! SW4 writes an integer mode code into every image header. What that code
//! means depends on whether the source time function produced a displacement
//! or a velocity solution, so each [`QuantityKind`] carries its own fixed
//! table. Lookups never fall back to a default entry.

use crate::error::{FormatError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Colour-map family a quantity is conventionally drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColormapFamily {
    Divergent,
    DivergentReversed,
    Sequential,
    SequentialReversed,
}

impl ColormapFamily {
    /// Divergent quantities are centered on zero
    pub fn is_divergent(&self) -> bool {
        matches!(
            self,
            ColormapFamily::Divergent | ColormapFamily::DivergentReversed
        )
    }
}

/// Metadata for one image mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quantity {
    pub name: &'static str,
    pub symbol: &'static str,
    pub unit: &'static str,
    pub cmap: ColormapFamily,
}

impl Quantity {
    const fn new(
        name: &'static str,
        symbol: &'static str,
        unit: &'static str,
        cmap: ColormapFamily,
    ) -> Self {
        Self {
            name,
            symbol,
            unit,
            cmap,
        }
    }

    pub fn is_divergent(&self) -> bool {
        self.cmap.is_divergent()
    }

    /// Colour-bar label, e.g. `"X velocity [m/s]"`
    pub fn label(&self) -> String {
        if self.unit.is_empty() {
            self.name.to_string()
        } else {
            format!("{} [{}]", self.name, self.unit)
        }
    }
}

use ColormapFamily::{Divergent, DivergentReversed, Sequential, SequentialReversed};

const DISPLACEMENT_MODES: &[(i32, Quantity)] = &[
    (1, Quantity::new("X displacement", "ux", "m", Divergent)),
    (2, Quantity::new("Y displacement", "uy", "m", Divergent)),
    (3, Quantity::new("Z displacement", "uz", "m", Divergent)),
    (4, Quantity::new("Density", "rho", "kg/m^3", Sequential)),
    (5, Quantity::new("Lambda", "lambda", "Pa", Sequential)),
    (6, Quantity::new("Mu", "mu", "Pa", Sequential)),
    (7, Quantity::new("P-wave velocity", "vp", "m/s", SequentialReversed)),
    (8, Quantity::new("S-wave velocity", "vs", "m/s", SequentialReversed)),
    (9, Quantity::new("X displacement (exact)", "ux", "m", Divergent)),
    (10, Quantity::new("Y displacement (exact)", "uy", "m", Divergent)),
    (11, Quantity::new("Z displacement (exact)", "uz", "m", Divergent)),
    (12, Quantity::new("Divergence of displacement", "div(u)", "", Divergent)),
    (13, Quantity::new("Curl magnitude of displacement", "|curl(u)|", "", Sequential)),
    (14, Quantity::new("Divergence of velocity", "div(du/dt)", "1/s", Divergent)),
    (15, Quantity::new("Curl magnitude of velocity", "|curl(du/dt)|", "1/s", Sequential)),
    (16, Quantity::new("Latitude", "lat", "deg", Sequential)),
    (17, Quantity::new("Longitude", "lon", "deg", Sequential)),
    (18, Quantity::new("Topography", "topo", "m", DivergentReversed)),
    (19, Quantity::new("X grid coordinate", "x", "m", Sequential)),
    (20, Quantity::new("Y grid coordinate", "y", "m", Sequential)),
    (21, Quantity::new("Z grid coordinate", "z", "m", SequentialReversed)),
    (22, Quantity::new("X displacement error", "ux_err", "m", Divergent)),
    (23, Quantity::new("Y displacement error", "uy_err", "m", Divergent)),
    (24, Quantity::new("Z displacement error", "uz_err", "m", Divergent)),
    (25, Quantity::new("Velocity magnitude", "|du/dt|", "m/s", Sequential)),
    (26, Quantity::new("Horizontal velocity magnitude", "|du/dt|_h", "m/s", Sequential)),
    (27, Quantity::new("Peak horizontal velocity", "max|du/dt|_h", "m/s", Sequential)),
    (28, Quantity::new("Peak vertical velocity", "max|dw/dt|", "m/s", Sequential)),
    (29, Quantity::new("Displacement magnitude", "|u|", "m", Sequential)),
    (30, Quantity::new("Horizontal displacement magnitude", "|u|_h", "m", Sequential)),
    (31, Quantity::new("Peak horizontal displacement", "max|u|_h", "m", Sequential)),
    (32, Quantity::new("Peak vertical displacement", "max|w|", "m", Sequential)),
    (33, Quantity::new("Density gradient", "grad(rho)", "", Divergent)),
    (34, Quantity::new("Mu gradient", "grad(mu)", "", Divergent)),
    (35, Quantity::new("Lambda gradient", "grad(lambda)", "", Divergent)),
    (36, Quantity::new("P-wave velocity gradient", "grad(vp)", "", Divergent)),
    (37, Quantity::new("S-wave velocity gradient", "grad(vs)", "", Divergent)),
    (38, Quantity::new("P-wave quality factor", "Qp", "", Sequential)),
    (39, Quantity::new("S-wave quality factor", "Qs", "", Sequential)),
];

// Time-derivative quantities are one order higher for velocity sources.
const VELOCITY_MODES: &[(i32, Quantity)] = &[
    (1, Quantity::new("X velocity", "vx", "m/s", Divergent)),
    (2, Quantity::new("Y velocity", "vy", "m/s", Divergent)),
    (3, Quantity::new("Z velocity", "vz", "m/s", Divergent)),
    (4, Quantity::new("Density", "rho", "kg/m^3", Sequential)),
    (5, Quantity::new("Lambda", "lambda", "Pa", Sequential)),
    (6, Quantity::new("Mu", "mu", "Pa", Sequential)),
    (7, Quantity::new("P-wave velocity", "vp", "m/s", SequentialReversed)),
    (8, Quantity::new("S-wave velocity", "vs", "m/s", SequentialReversed)),
    (9, Quantity::new("X velocity (exact)", "vx", "m/s", Divergent)),
    (10, Quantity::new("Y velocity (exact)", "vy", "m/s", Divergent)),
    (11, Quantity::new("Z velocity (exact)", "vz", "m/s", Divergent)),
    (12, Quantity::new("Divergence of velocity", "div(v)", "1/s", Divergent)),
    (13, Quantity::new("Curl magnitude of velocity", "|curl(v)|", "1/s", Sequential)),
    (14, Quantity::new("Divergence of acceleration", "div(dv/dt)", "1/s^2", Divergent)),
    (15, Quantity::new("Curl magnitude of acceleration", "|curl(dv/dt)|", "1/s^2", Sequential)),
    (16, Quantity::new("Latitude", "lat", "deg", Sequential)),
    (17, Quantity::new("Longitude", "lon", "deg", Sequential)),
    (18, Quantity::new("Topography", "topo", "m", DivergentReversed)),
    (19, Quantity::new("X grid coordinate", "x", "m", Sequential)),
    (20, Quantity::new("Y grid coordinate", "y", "m", Sequential)),
    (21, Quantity::new("Z grid coordinate", "z", "m", SequentialReversed)),
    (22, Quantity::new("X velocity error", "vx_err", "m/s", Divergent)),
    (23, Quantity::new("Y velocity error", "vy_err", "m/s", Divergent)),
    (24, Quantity::new("Z velocity error", "vz_err", "m/s", Divergent)),
    (25, Quantity::new("Acceleration magnitude", "|dv/dt|", "m/s^2", Sequential)),
    (26, Quantity::new("Horizontal acceleration magnitude", "|dv/dt|_h", "m/s^2", Sequential)),
    (27, Quantity::new("Peak horizontal acceleration", "max|dv/dt|_h", "m/s^2", Sequential)),
    (28, Quantity::new("Peak vertical acceleration", "max|dw/dt|", "m/s^2", Sequential)),
    (29, Quantity::new("Velocity magnitude", "|v|", "m/s", Sequential)),
    (30, Quantity::new("Horizontal velocity magnitude", "|v|_h", "m/s", Sequential)),
    (31, Quantity::new("Peak horizontal velocity", "max|v|_h", "m/s", Sequential)),
    (32, Quantity::new("Peak vertical velocity", "max|w|", "m/s", Sequential)),
    (33, Quantity::new("Density gradient", "grad(rho)", "", Divergent)),
    (34, Quantity::new("Mu gradient", "grad(mu)", "", Divergent)),
    (35, Quantity::new("Lambda gradient", "grad(lambda)", "", Divergent)),
    (36, Quantity::new("P-wave velocity gradient", "grad(vp)", "", Divergent)),
    (37, Quantity::new("S-wave velocity gradient", "grad(vs)", "", Divergent)),
    (38, Quantity::new("P-wave quality factor", "Qp", "", Sequential)),
    (39, Quantity::new("S-wave quality factor", "Qs", "", Sequential)),
];

/// Whether the simulation tracked displacement or velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityKind {
    Displacement,
    Velocity,
}

impl QuantityKind {
    /// Mode table for this kind
    pub fn table(&self) -> &'static [(i32, Quantity)] {
        match self {
            QuantityKind::Displacement => DISPLACEMENT_MODES,
            QuantityKind::Velocity => VELOCITY_MODES,
        }
    }

    /// Look up the quantity for a mode code
    pub fn quantity(&self, mode: i32) -> Result<&'static Quantity> {
        self.table()
            .iter()
            .find(|(code, _)| *code == mode)
            .map(|(_, quantity)| quantity)
            .ok_or_else(|| FormatError::UnknownMode {
                code: mode,
                kind: self.to_string(),
            })
    }

    /// All mode codes known for this kind, ascending
    pub fn mode_codes(&self) -> impl Iterator<Item = i32> {
        self.table().iter().map(|(code, _)| *code)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuantityKind::Displacement => "displacement",
            QuantityKind::Velocity => "velocity",
        }
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuantityKind {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "displacement" => Ok(QuantityKind::Displacement),
            "velocity" => Ok(QuantityKind::Velocity),
            other => Err(FormatError::UnknownQuantityKind(other.to_string())),
        }
    }
}
