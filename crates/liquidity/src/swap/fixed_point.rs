//! Fixed point numbers with exactly 18 decimals, emulating the `FixedPoint`
//! library of the Balancer V2 contracts including its rounding directions:
//! https://github.com/balancer-labs/balancer-v2-monorepo/blob/6c9e24e22d0c46cca6dd15861d3d33da61a60b98/pkg/solidity-utils/contracts/math/FixedPoint.sol
//!
//! Values are backed by an arbitrary precision integer. The overflow guards
//! of the contract are still evaluated, they just never trip for results that
//! would fit the host type. Converting back into a 256-bit word is where
//! out of range results surface.

use {
    super::error::Error,
    alloy::primitives::U256,
    num::{BigUint, ToPrimitive, Zero},
    number::conversions::{big_uint_to_u256, u256_to_big_uint},
    rust_decimal::{Decimal, MathematicalOps},
    std::{
        fmt::{self, Debug, Display, Formatter},
        sync::LazyLock,
    },
};

static ONE_18: LazyLock<BigUint> = LazyLock::new(|| BigUint::from(10u8).pow(18));

/// Decimal places of the fixed point representation.
const DECIMALS: u32 = 18;

#[derive(Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Bfp(BigUint);

impl Bfp {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn one() -> Self {
        Self(ONE_18.clone())
    }

    /// Fixed point representation of `10^exp`.
    pub fn exp10(exp: u32) -> Self {
        Self(&*ONE_18 * BigUint::from(10u8).pow(exp))
    }

    /// Interprets a raw 256-bit word as a fixed point value.
    pub fn from_wei(num: U256) -> Self {
        Self(u256_to_big_uint(&num))
    }

    pub fn from_raw(num: BigUint) -> Self {
        Self(num)
    }

    /// The raw 256-bit word of this value. Fails for values that would not
    /// fit an on-chain word.
    pub fn as_uint256(&self) -> Result<U256, Error> {
        big_uint_to_u256(&self.0).map_err(|_| Error::AddOverflow)
    }

    pub fn as_big_uint(&self) -> &BigUint {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn add(&self, other: &Self) -> Result<Self, Error> {
        Ok(Self(&self.0 + &other.0))
    }

    pub fn sub(&self, other: &Self) -> Result<Self, Error> {
        if other.0 > self.0 {
            return Err(Error::SubOverflow);
        }
        Ok(Self(&self.0 - &other.0))
    }

    fn checked_product(&self, other: &Self) -> Result<BigUint, Error> {
        let product = &self.0 * &other.0;
        if !self.0.is_zero() && &product / &self.0 != other.0 {
            return Err(Error::MulOverflow);
        }
        Ok(product)
    }

    pub fn mul_down(&self, other: &Self) -> Result<Self, Error> {
        let product = self.checked_product(other)?;
        Ok(Self(product / &*ONE_18))
    }

    pub fn mul_up(&self, other: &Self) -> Result<Self, Error> {
        let product = self.checked_product(other)?;
        if product.is_zero() {
            return Ok(Self::zero());
        }
        Ok(Self((product - 1u8) / &*ONE_18 + 1u8))
    }

    fn checked_inflated(&self, other: &Self) -> Result<Option<BigUint>, Error> {
        if other.is_zero() {
            return Err(Error::ZeroDivision);
        }
        if self.is_zero() {
            return Ok(None);
        }
        let inflated = &self.0 * &*ONE_18;
        if &inflated / &self.0 != *ONE_18 {
            return Err(Error::DivInternal);
        }
        Ok(Some(inflated))
    }

    pub fn div_down(&self, other: &Self) -> Result<Self, Error> {
        Ok(match self.checked_inflated(other)? {
            Some(inflated) => Self(inflated / &other.0),
            None => Self::zero(),
        })
    }

    pub fn div_up(&self, other: &Self) -> Result<Self, Error> {
        Ok(match self.checked_inflated(other)? {
            Some(inflated) => Self((inflated - 1u8) / &other.0 + 1u8),
            None => Self::zero(),
        })
    }

    /// `ONE - self`, clamped at zero.
    pub fn complement(&self) -> Self {
        if self.0 < *ONE_18 {
            Self(&*ONE_18 - &self.0)
        } else {
            Self::zero()
        }
    }

    /// `self ^ exp` rounded down, evaluated as `exp(exp * ln(self))` in
    /// decimal space.
    pub fn pow_down(&self, exp: &Self) -> Result<Self, Error> {
        if exp.is_zero() {
            return Ok(Self::one());
        }
        if self.is_zero() {
            return Ok(Self::zero());
        }

        let base = self.to_decimal().ok_or(Error::XOutOfBounds)?;
        let exp = exp.to_decimal().ok_or(Error::YOutOfBounds)?;
        let result = base
            .checked_ln()
            .and_then(|ln| ln.checked_mul(exp))
            .and_then(|product| product.checked_exp())
            .ok_or(Error::ProductOutOfBounds)?;

        let raw = result
            .checked_mul(Decimal::from(10u64.pow(DECIMALS)))
            .ok_or(Error::ProductOutOfBounds)?
            .floor()
            .to_u128()
            .ok_or(Error::ProductOutOfBounds)?;
        Ok(Self(BigUint::from(raw)))
    }

    fn to_decimal(&self) -> Option<Decimal> {
        let raw = self.0.to_i128()?;
        Decimal::try_from_i128_with_scale(raw, DECIMALS).ok()
    }
}

impl From<u64> for Bfp {
    /// Fixed point representation of an integer, i.e. `num * ONE`.
    fn from(num: u64) -> Self {
        Self(&*ONE_18 * BigUint::from(num))
    }
}

impl Display for Bfp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let integer = &self.0 / &*ONE_18;
        let fraction = &self.0 % &*ONE_18;
        write!(f, "{integer}.{fraction:0>18}")
    }
}

impl Debug for Bfp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, proptest::prelude::*};

    fn bfp(raw: u128) -> Bfp {
        Bfp::from_raw(BigUint::from(raw))
    }

    #[test]
    fn one_and_exp10() {
        assert_eq!(Bfp::one().as_uint256().unwrap(), U256::from(10u64.pow(18)));
        assert_eq!(Bfp::exp10(0), Bfp::one());
        assert_eq!(Bfp::exp10(12), Bfp::from(1_000_000_000_000));
        assert_eq!(Bfp::from(3).to_string(), "3.000000000000000000");
        assert_eq!(bfp(5).to_string(), "0.000000000000000005");
    }

    #[test]
    fn add_sub() {
        assert_eq!(bfp(1).add(&bfp(2)).unwrap(), bfp(3));
        assert_eq!(bfp(3).sub(&bfp(3)).unwrap(), Bfp::zero());
        assert_eq!(
            bfp(1).sub(&bfp(2)).unwrap_err().to_string(),
            "BAL#001: SubOverflow"
        );
    }

    #[test]
    fn mul_rounding() {
        let one = Bfp::one();
        assert_eq!(Bfp::zero().mul_down(&one).unwrap(), Bfp::zero());
        assert_eq!(one.mul_down(&one).unwrap(), one);
        assert_eq!(bfp(1).mul_down(&bfp(1)).unwrap(), Bfp::zero());
        assert_eq!(bfp(1).mul_up(&bfp(1)).unwrap(), bfp(1));
        assert_eq!(bfp(0).mul_up(&bfp(7)).unwrap(), Bfp::zero());
        assert_eq!(
            Bfp::from(2).mul_up(&bfp(500_000_000_000_000_000)).unwrap(),
            one
        );
    }

    #[test]
    fn div_rounding() {
        let one = Bfp::one();
        assert_eq!(Bfp::zero().div_down(&bfp(5)).unwrap(), Bfp::zero());
        assert_eq!(Bfp::zero().div_up(&bfp(5)).unwrap(), Bfp::zero());
        assert_eq!(
            bfp(5).div_down(&Bfp::zero()).unwrap_err(),
            Error::ZeroDivision
        );
        assert_eq!(bfp(5).div_up(&Bfp::zero()).unwrap_err(), Error::ZeroDivision);
        assert_eq!(one.div_down(&Bfp::from(3)).unwrap(), bfp(333_333_333_333_333_333));
        assert_eq!(one.div_up(&Bfp::from(3)).unwrap(), bfp(333_333_333_333_333_334));
        assert_eq!(Bfp::from(4).div_down(&Bfp::from(2)).unwrap(), Bfp::from(2));
    }

    #[test]
    fn complement() {
        assert_eq!(bfp(250_000_000_000_000_000).complement(), bfp(750_000_000_000_000_000));
        assert_eq!(Bfp::from(2).complement(), Bfp::zero());
    }

    #[test]
    fn pow_down() {
        assert_eq!(Bfp::from(7).pow_down(&Bfp::zero()).unwrap(), Bfp::one());
        assert_eq!(Bfp::zero().pow_down(&Bfp::one()).unwrap(), Bfp::zero());

        let root = Bfp::from(4).pow_down(&bfp(500_000_000_000_000_000)).unwrap();
        let two = Bfp::from(2);
        let tolerance = bfp(1_000_000_000);
        assert!(root <= two.add(&tolerance).unwrap());
        assert!(root >= two.sub(&tolerance).unwrap());

        assert_eq!(
            Bfp::from_wei(U256::MAX)
                .pow_down(&Bfp::one())
                .unwrap_err(),
            Error::XOutOfBounds
        );
    }

    #[test]
    fn wide_results_do_not_fit_a_word() {
        let max = Bfp::from_wei(U256::MAX);
        let product = max.mul_down(&Bfp::from(2)).unwrap();
        assert_eq!(product.as_uint256().unwrap_err(), Error::AddOverflow);
    }

    proptest! {
        #[test]
        fn mul_down_never_exceeds_mul_up(a in any::<u128>(), b in any::<u128>()) {
            let (a, b) = (bfp(a), bfp(b));
            let down = a.mul_down(&b).unwrap();
            let up = a.mul_up(&b).unwrap();
            let exact = (a.as_big_uint() * b.as_big_uint() % &*ONE_18).is_zero();
            prop_assert!(down <= up);
            prop_assert_eq!(down == up, exact);
        }

        #[test]
        fn div_down_never_exceeds_div_up(a in any::<u128>(), b in 1..u128::MAX) {
            let (a, b) = (bfp(a), bfp(b));
            let down = a.div_down(&b).unwrap();
            let up = a.div_up(&b).unwrap();
            let exact = (a.as_big_uint() * &*ONE_18 % b.as_big_uint()).is_zero();
            prop_assert!(down <= up);
            prop_assert_eq!(down == up, exact);
        }
    }
}
