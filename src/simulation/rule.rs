//! Life-like automaton rules and grid edge handling
//!
//! A rule is stored as two 9-bit masks indexed by live-neighbor count, the
//! same shape the transition kernel receives in its uniform buffer.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Birth/survival rule over the 8-connected Moore neighborhood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Bit `n` set: a dead cell with `n` live neighbors becomes live
    pub birth: u16,
    /// Bit `n` set: a live cell with `n` live neighbors stays live
    pub survive: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleParseError {
    #[error("rule must look like B3/S23, got {0:?}")]
    Malformed(String),
    #[error("neighbor count {0} is out of range 0..=8")]
    CountOutOfRange(char),
}

impl Rule {
    const MASK: u16 = 0x1ff;

    /// Conway's Game of Life, B3/S23
    pub const fn conway() -> Self {
        Self {
            birth: 1 << 3,
            survive: (1 << 2) | (1 << 3),
        }
    }

    /// HighLife, B36/S23
    pub const fn highlife() -> Self {
        Self {
            birth: (1 << 3) | (1 << 6),
            survive: (1 << 2) | (1 << 3),
        }
    }

    pub fn from_counts(birth: &[u8], survive: &[u8]) -> Self {
        let mask = |counts: &[u8]| {
            counts
                .iter()
                .filter(|&&n| n <= 8)
                .fold(0u16, |acc, &n| acc | (1 << n))
        };
        Self {
            birth: mask(birth),
            survive: mask(survive),
        }
    }

    /// State of a cell in the next generation.
    ///
    /// This is the truth table the kernel evaluates per cell; it is exposed
    /// so the rule can be checked without a device.
    pub fn next_state(&self, alive: bool, live_neighbors: u32) -> bool {
        if live_neighbors > 8 {
            return false;
        }
        let bit = 1u16 << live_neighbors;
        if alive {
            self.survive & bit != 0
        } else {
            self.birth & bit != 0
        }
    }

    fn counts(mask: u16) -> impl Iterator<Item = u32> {
        (0..=8).filter(move |n| mask & (1 << n) != 0)
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self::conway()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B")?;
        for n in Self::counts(self.birth) {
            write!(f, "{n}")?;
        }
        write!(f, "/S")?;
        for n in Self::counts(self.survive) {
            write!(f, "{n}")?;
        }
        Ok(())
    }
}

impl FromStr for Rule {
    type Err = RuleParseError;

    /// Parses `B<digits>/S<digits>`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || RuleParseError::Malformed(s.to_string());
        let upper = s.trim().to_ascii_uppercase();
        let (birth, survive) = upper.split_once('/').ok_or_else(malformed)?;
        let birth = birth.strip_prefix('B').ok_or_else(malformed)?;
        let survive = survive.strip_prefix('S').ok_or_else(malformed)?;

        let parse_mask = |digits: &str| -> Result<u16, RuleParseError> {
            digits.chars().try_fold(0u16, |acc, c| match c.to_digit(10) {
                Some(n) if n <= 8 => Ok(acc | (1 << n)),
                Some(_) => Err(RuleParseError::CountOutOfRange(c)),
                None => Err(malformed()),
            })
        };

        Ok(Self {
            birth: parse_mask(birth)? & Self::MASK,
            survive: parse_mask(survive)? & Self::MASK,
        })
    }
}

/// How the kernel treats neighbors that fall outside the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgePolicy {
    /// Toroidal: the left edge neighbors the right edge, top neighbors bottom
    #[default]
    Wrap,
    /// Out-of-range neighbors always count as dead
    Dead,
}

impl EdgePolicy {
    /// Value substituted for the `EDGE_WRAP` constant in kernel source
    pub fn wgsl_literal(self) -> &'static str {
        match self {
            EdgePolicy::Wrap => "true",
            EdgePolicy::Dead => "false",
        }
    }
}

impl FromStr for EdgePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wrap" | "torus" => Ok(EdgePolicy::Wrap),
            "dead" | "bounded" => Ok(EdgePolicy::Dead),
            other => Err(format!("unknown edge policy {other:?}, expected wrap or dead")),
        }
    }
}

/// Uniform block consumed by the transition kernel
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RuleUniform {
    pub birth: u32,
    pub survive: u32,
    pub _padding: [u32; 2],
}

impl From<Rule> for RuleUniform {
    fn from(rule: Rule) -> Self {
        Self {
            birth: rule.birth as u32,
            survive: rule.survive as u32,
            _padding: [0; 2],
        }
    }
}
