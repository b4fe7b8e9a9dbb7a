//! Derivation Paths
//!
//! Textual form: optional `m/` prefix, then `/`-separated indices, each
//! optionally marked hardened with `'`, `h` or `H` (`m/44'/0'/0'/0/1`).

use crate::error::{EngineError, EngineResult};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Hardened offset for BIP-32 derivation
pub const HARDENED: u32 = 0x8000_0000;

/// Single derivation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivationAxis {
    index: u32,
    hardened: bool,
}

impl DerivationAxis {
    pub fn new(index: u32, hardened: bool) -> EngineResult<Self> {
        if index >= HARDENED {
            return Err(EngineError::InvalidPath(format!(
                "index {} exceeds maximum value {}",
                index,
                HARDENED - 1
            )));
        }
        Ok(Self { index, hardened })
    }

    pub fn normal(index: u32) -> EngineResult<Self> {
        Self::new(index, false)
    }

    pub fn hardened(index: u32) -> EngineResult<Self> {
        Self::new(index, true)
    }

    /// Axis from a raw BIP32 child number (hardened bit included)
    pub fn from_child_number(raw: u32) -> Self {
        Self {
            index: raw & !HARDENED,
            hardened: raw & HARDENED != 0,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// Index including the hardened bit
    pub fn child_number(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED
        } else {
            self.index
        }
    }
}

impl fmt::Display for DerivationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

impl FromStr for DerivationAxis {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidPath("empty path component".to_string()));
        }

        let (digits, hardened) = match trimmed.strip_suffix(&['\'', 'h', 'H'][..]) {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EngineError::InvalidPath(format!("invalid path component '{}'", s)));
        }
        let index: u32 = digits
            .parse()
            .map_err(|e| EngineError::InvalidPath(format!("invalid path component '{}': {}", s, e)))?;

        Self::new(index, hardened)
    }
}

/// Immutable sequence of derivation axes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DerivationPath {
    axes: Vec<DerivationAxis>,
}

impl DerivationPath {
    pub fn master() -> Self {
        Self::default()
    }

    pub fn from_axes(axes: Vec<DerivationAxis>) -> Self {
        Self { axes }
    }

    /// New path with `axis` appended
    pub fn child(&self, axis: DerivationAxis) -> Self {
        let mut axes = self.axes.clone();
        axes.push(axis);
        Self { axes }
    }

    pub fn axes(&self) -> &[DerivationAxis] {
        &self.axes
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for axis in &self.axes {
            write!(f, "/{}", axis)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = EngineError;

    fn from_str(path: &str) -> EngineResult<Self> {
        let trimmed = path.trim();
        let body = match trimmed {
            "m" | "M" | "" => return Ok(Self::master()),
            _ => trimmed
                .strip_prefix("m/")
                .or_else(|| trimmed.strip_prefix("M/"))
                .unwrap_or(trimmed),
        };

        let axes = body
            .split('/')
            .map(DerivationAxis::from_str)
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(Self { axes })
    }
}

impl Serialize for DerivationPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
