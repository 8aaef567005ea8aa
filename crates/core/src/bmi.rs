//! Derived attribute calculator.
//!
//! Pure functions computing body-mass index and its categorical verdict from
//! already-validated height and weight. These are recomputed on every record
//! construction (create and update-merge alike); derived values are never
//! cached independently of their source fields.

use serde::{Deserialize, Serialize};

/// Categorical verdict derived from BMI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl Verdict {
    /// The verdict as its wire/display string.
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Underweight => "Underweight",
            Verdict::Normal => "Normal",
            Verdict::Overweight => "Overweight",
            Verdict::Obese => "Obese",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Computes BMI (kg/m²) rounded to two decimal places.
///
/// Rounding is half away from zero. Callers guarantee `height_m` and
/// `weight_kg` are strictly positive, so the result is always finite.
pub fn bmi(weight_kg: f64, height_m: f64) -> f64 {
    round2(weight_kg / (height_m * height_m))
}

/// Maps a BMI value onto its verdict.
///
/// Boundary values belong to the upper category: 18.5 is `Normal`,
/// 25.0 is `Overweight`, 30.0 is `Obese`.
pub fn verdict(bmi: f64) -> Verdict {
    if bmi < 18.5 {
        Verdict::Underweight
    } else if bmi < 25.0 {
        Verdict::Normal
    } else if bmi < 30.0 {
        Verdict::Overweight
    } else {
        Verdict::Obese
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_rounds_to_two_decimals() {
        // 70 / 1.75² = 22.857…
        assert_eq!(bmi(70.0, 1.75), 22.86);
        // 100 / 1.75² = 32.653…
        assert_eq!(bmi(100.0, 1.75), 32.65);
        // 67.2 / 1.72² = 22.714…
        assert_eq!(bmi(67.2, 1.72), 22.71);
    }

    #[test]
    fn verdict_boundaries_belong_to_upper_category() {
        assert_eq!(verdict(18.49), Verdict::Underweight);
        assert_eq!(verdict(18.5), Verdict::Normal);
        assert_eq!(verdict(24.99), Verdict::Normal);
        assert_eq!(verdict(25.0), Verdict::Overweight);
        assert_eq!(verdict(29.99), Verdict::Overweight);
        assert_eq!(verdict(30.0), Verdict::Obese);
    }

    #[test]
    fn verdict_serialises_as_capitalised_string() {
        let json = serde_json::to_string(&Verdict::Overweight).expect("serialise");
        assert_eq!(json, "\"Overweight\"");
    }
}
