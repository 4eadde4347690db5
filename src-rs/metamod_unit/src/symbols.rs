//! Resolution of unit symbols to dimensions and scale factors.
//!
//! A symbol resolves either as a known base/derived unit, or as an SI
//! prefix followed by one. Whole-symbol resolution wins, so `mol` is the
//! mole rather than a milli-`ol`, and `m` is the metre rather than a bare
//! milli prefix.

use crate::dimension::Dimension;

const LENGTH: Dimension = Dimension {
    length: 1,
    ..Dimension::NONE
};
const MASS: Dimension = Dimension {
    mass: 1,
    ..Dimension::NONE
};
const TIME: Dimension = Dimension {
    time: 1,
    ..Dimension::NONE
};
const CURRENT: Dimension = Dimension {
    current: 1,
    ..Dimension::NONE
};
const TEMPERATURE: Dimension = Dimension {
    temperature: 1,
    ..Dimension::NONE
};
const AMOUNT: Dimension = Dimension {
    amount: 1,
    ..Dimension::NONE
};
const LUMINOSITY: Dimension = Dimension {
    luminosity: 1,
    ..Dimension::NONE
};

/// Resolves a bare unit symbol (no prefix) to its dimension and its scale
/// relative to the coherent SI unit of that dimension.
fn base_unit(symbol: &str) -> Option<(Dimension, f64)> {
    let resolved = match symbol {
        "m" => (LENGTH, 1.0),
        // the SI base unit of mass is the kilogram, so the gram is 1e-3
        "g" => (MASS, 1e-3),
        "s" => (TIME, 1.0),
        "A" => (CURRENT, 1.0),
        "K" => (TEMPERATURE, 1.0),
        "mol" => (AMOUNT, 1.0),
        "cd" => (LUMINOSITY, 1.0),
        "Hz" => (TIME.pow(-1), 1.0),
        "N" => (MASS * LENGTH / TIME.pow(2), 1.0),
        "Pa" => (MASS / (LENGTH * TIME.pow(2)), 1.0),
        "J" => (MASS * LENGTH.pow(2) / TIME.pow(2), 1.0),
        "W" => (MASS * LENGTH.pow(2) / TIME.pow(3), 1.0),
        "C" => (CURRENT * TIME, 1.0),
        "V" => (MASS * LENGTH.pow(2) / (TIME.pow(3) * CURRENT), 1.0),
        "F" => (TIME.pow(4) * CURRENT.pow(2) / (MASS * LENGTH.pow(2)), 1.0),
        "S" => (TIME.pow(3) * CURRENT.pow(2) / (MASS * LENGTH.pow(2)), 1.0),
        "ohm" => (MASS * LENGTH.pow(2) / (TIME.pow(3) * CURRENT.pow(2)), 1.0),
        "L" => (LENGTH.pow(3), 1e-3),
        // molar concentration, mol/L
        "M" => (AMOUNT / LENGTH.pow(3), 1e3),
        _ => return None,
    };

    Some(resolved)
}

/// Returns the scale factor of an SI prefix.
fn prefix(symbol: &str) -> Option<f64> {
    let factor = match symbol {
        "Y" => 1e24,
        "Z" => 1e21,
        "E" => 1e18,
        "P" => 1e15,
        "T" => 1e12,
        "G" => 1e9,
        "M" => 1e6,
        "k" => 1e3,
        "h" => 1e2,
        "da" => 1e1,
        "d" => 1e-1,
        "c" => 1e-2,
        "m" => 1e-3,
        "u" | "µ" => 1e-6,
        "n" => 1e-9,
        "p" => 1e-12,
        "f" => 1e-15,
        "a" => 1e-18,
        "z" => 1e-21,
        "y" => 1e-24,
        _ => return None,
    };

    Some(factor)
}

/// Resolves a unit symbol, trying the whole symbol first and then a prefix
/// split.
pub(crate) fn resolve(symbol: &str) -> Option<(Dimension, f64)> {
    if let Some(resolved) = base_unit(symbol) {
        return Some(resolved);
    }

    // two-character prefix first ("da"), then single-character
    if let Some(rest) = symbol.strip_prefix("da") {
        if let (Some(factor), Some((dimension, scale))) = (prefix("da"), base_unit(rest)) {
            return Some((dimension, factor * scale));
        }
    }

    let mut chars = symbol.chars();
    let first = chars.next()?;
    let rest = chars.as_str();

    let factor = prefix(first.to_string().as_str())?;
    let (dimension, scale) = base_unit(rest)?;

    Some((dimension, factor * scale))
}
