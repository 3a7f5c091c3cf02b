//! Overflow-safe arithmetic used everywhere reserves, fills and fees are
//! computed. Checked operations return errors instead of wrapping; an
//! overflow is always a failed call, never a clamped value.

use anchor_lang::prelude::*;

use crate::error::ErrorCode;

pub trait SafeMath<T> {
    fn safe_add(self, v: T) -> Result<T>;
    fn safe_sub(self, v: T) -> Result<T>;
    fn safe_mul(self, v: T) -> Result<T>;
    fn safe_div(self, v: T) -> Result<T>;
}

macro_rules! impl_safe_math {
    ($type:ty) => {
        impl SafeMath<$type> for $type {
            fn safe_add(self, v: $type) -> Result<$type> {
                self.checked_add(v).ok_or_else(|| ErrorCode::MathOverflow.into())
            }

            fn safe_sub(self, v: $type) -> Result<$type> {
                self.checked_sub(v).ok_or_else(|| ErrorCode::MathUnderflow.into())
            }

            fn safe_mul(self, v: $type) -> Result<$type> {
                self.checked_mul(v).ok_or_else(|| ErrorCode::MathOverflow.into())
            }

            fn safe_div(self, v: $type) -> Result<$type> {
                if v == 0 {
                    return Err(ErrorCode::DivisionByZero.into());
                }
                self.checked_div(v).ok_or_else(|| ErrorCode::MathOverflow.into())
            }
        }
    };
}

impl_safe_math!(u16);
impl_safe_math!(u64);
impl_safe_math!(u128);
impl_safe_math!(i64);

/// Narrow a u128 to u64, failing instead of truncating.
pub fn to_u64(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| ErrorCode::NumericNarrowing.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_overflow_errors() {
        assert!(u64::MAX.safe_add(1).is_err());
        assert_eq!(1u64.safe_add(2).unwrap(), 3);
    }

    #[test]
    fn sub_underflow_errors() {
        assert!(0u64.safe_sub(1).is_err());
        assert_eq!(5u128.safe_sub(3).unwrap(), 2);
    }

    #[test]
    fn div_by_zero_errors() {
        assert!(100u64.safe_div(0).is_err());
        assert_eq!(100u64.safe_div(3).unwrap(), 33);
    }

    #[test]
    fn narrowing_errors_above_u64() {
        assert!(to_u64(u128::from(u64::MAX) + 1).is_err());
        assert_eq!(to_u64(42).unwrap(), 42);
    }
}
