//! Configuration types for solving and rendering.

use std::fmt;
use std::str::FromStr;

/// Default tolerance for float comparisons, relative to the project duration
/// once that exceeds one time unit.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Configuration for the CPM solver.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Tolerance used to classify zero float and compare times.
    pub tolerance: f64,
    /// Verbosity level: 0=silent, 1=summary, 2=passes, 3=debug.
    pub verbosity: u8,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            verbosity: 0,
        }
    }
}

impl SolverConfig {
    /// Default configuration with a caller-supplied tolerance.
    ///
    /// The tolerance must be finite and non-negative.
    pub fn with_tolerance(tolerance: f64) -> Result<Self, String> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(format!(
                "tolerance must be a finite non-negative number, got {tolerance}"
            ));
        }
        Ok(Self {
            tolerance,
            ..Self::default()
        })
    }
}

/// Graph layout direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RankDir {
    /// Left to right.
    #[default]
    LeftRight,
    /// Top to bottom.
    TopBottom,
}

impl RankDir {
    pub fn as_dot(&self) -> &'static str {
        match self {
            RankDir::LeftRight => "LR",
            RankDir::TopBottom => "TB",
        }
    }
}

impl fmt::Display for RankDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_dot())
    }
}

impl FromStr for RankDir {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LR" => Ok(RankDir::LeftRight),
            "TB" => Ok(RankDir::TopBottom),
            other => Err(format!("Unknown rank direction: {other} (expected LR or TB)")),
        }
    }
}

/// Configuration for the network diagram.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub rankdir: RankDir,
    /// Color zero-float nodes and edges red.
    pub highlight_critical: bool,
    /// Font for node labels.
    pub fontname: String,
    /// Node margin as "width,height" in inches.
    pub node_margin: String,
    /// Graphviz executable used for raster and vector output.
    pub dot_program: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            rankdir: RankDir::LeftRight,
            highlight_critical: true,
            fontname: "Helvetica".to_string(),
            node_margin: "0.06,0.06".to_string(),
            dot_program: "dot".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_tolerance_rejects_invalid_values() {
        assert_eq!(SolverConfig::with_tolerance(1e-6).unwrap().tolerance, 1e-6);
        assert_eq!(SolverConfig::with_tolerance(0.0).unwrap().tolerance, 0.0);
        assert!(SolverConfig::with_tolerance(-1e-9).is_err());
        assert!(SolverConfig::with_tolerance(f64::NAN).is_err());
        assert!(SolverConfig::with_tolerance(f64::INFINITY).is_err());
    }

    #[test]
    fn test_config_defaults() {
        let solver = SolverConfig::default();
        assert!((solver.tolerance - 1e-9).abs() < f64::EPSILON);
        assert_eq!(solver.verbosity, 0);

        let render = RenderConfig::default();
        assert_eq!(render.rankdir, RankDir::LeftRight);
        assert!(render.highlight_critical);
        assert_eq!(render.fontname, "Helvetica");
        assert_eq!(render.node_margin, "0.06,0.06");
    }

    #[test]
    fn test_rankdir_parse() {
        assert_eq!("lr".parse::<RankDir>(), Ok(RankDir::LeftRight));
        assert_eq!(" TB ".parse::<RankDir>(), Ok(RankDir::TopBottom));
        assert!("RL".parse::<RankDir>().is_err());
        assert_eq!(RankDir::TopBottom.to_string(), "TB");
    }
}
