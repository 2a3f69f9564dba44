//! Target quantity: how many cylinders one transaction must carry.

use core::num::NonZeroU32;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// User-declared required count of cylinders for one transaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetQuantity(NonZeroU32);

impl TargetQuantity {
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(ValidationError::QuantityRequired)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }

    pub fn as_usize(&self) -> usize {
        self.0.get() as usize
    }

    /// Target taken from the size of a selection; an empty selection has none.
    pub fn of_selection(len: usize) -> Result<Self, ValidationError> {
        u32::try_from(len)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(ValidationError::EmptySelection)
    }

    /// Check a selection size against the target.
    pub fn ensure_exact(&self, actual: usize) -> Result<(), ValidationError> {
        if actual == self.as_usize() {
            Ok(())
        } else {
            Err(ValidationError::CountMismatch {
                expected: self.get(),
                actual,
            })
        }
    }
}

impl FromStr for TargetQuantity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::QuantityRequired);
        }
        let value: u32 = trimmed
            .parse()
            .map_err(|_| ValidationError::InvalidQuantity(trimmed.to_string()))?;
        Self::new(value)
    }
}

impl core::fmt::Display for TargetQuantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_is_quantity_required() {
        assert_eq!(TargetQuantity::new(0), Err(ValidationError::QuantityRequired));
        assert_eq!("".parse::<TargetQuantity>(), Err(ValidationError::QuantityRequired));
        assert_eq!("0".parse::<TargetQuantity>(), Err(ValidationError::QuantityRequired));
    }

    #[test]
    fn garbage_is_invalid_quantity() {
        assert_eq!(
            "three".parse::<TargetQuantity>(),
            Err(ValidationError::InvalidQuantity("three".to_string()))
        );
    }

    #[test]
    fn count_mismatch_names_both_counts() {
        let q = TargetQuantity::new(2).unwrap();
        let err = q.ensure_exact(1).unwrap_err();
        assert_eq!(err, ValidationError::CountMismatch { expected: 2, actual: 1 });
        assert_eq!(err.to_string(), "please select exactly 2 cylinders (selected 1)");
    }

    #[test]
    fn selection_size_is_the_target() {
        assert_eq!(TargetQuantity::of_selection(3).map(|q| q.get()), Ok(3));
        assert_eq!(TargetQuantity::of_selection(0), Err(ValidationError::EmptySelection));
    }

    proptest! {
        #[test]
        fn ensure_exact_only_accepts_the_target(target in 1u32..500, actual in 0usize..600) {
            let q = TargetQuantity::new(target).unwrap();
            prop_assert_eq!(q.ensure_exact(actual).is_ok(), actual == target as usize);
        }
    }
}
