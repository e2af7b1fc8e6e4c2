use {
    alloy::primitives::U256,
    anyhow::{Result, ensure},
    num::BigUint,
};

pub fn u256_to_big_uint(input: &U256) -> BigUint {
    BigUint::from_bytes_be(&input.to_be_bytes::<32>())
}

pub fn big_uint_to_u256(input: &BigUint) -> Result<U256> {
    let bytes = input.to_bytes_be();
    ensure!(bytes.len() <= 32, "too large");
    U256::try_from_be_slice(&bytes).ok_or_else(|| anyhow::anyhow!("too large"))
}
