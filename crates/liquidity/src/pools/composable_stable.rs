//! Composable stable pools register their own BPT as one of the vault tokens.
//! The math only ever sees the member tokens, so every array going to or
//! coming from the vault passes through [`insert_bpt_index`] and
//! [`drop_bpt_index`].

use {
    super::Pool,
    crate::{
        error::Result,
        pool_state::PoolContext,
        scaling::ScalingFactors,
        swap::fixed_point::Bfp,
    },
};

/// Inserts `filler` at the BPT `index`. An index past the end appends.
///
/// For any `values` with an entry at `index`,
/// `insert_bpt_index(drop_bpt_index(values, index), index, values[index])`
/// returns `values` unchanged.
pub fn insert_bpt_index<T>(mut values: Vec<T>, index: usize, filler: T) -> Vec<T> {
    let index = index.min(values.len());
    values.insert(index, filler);
    values
}

/// Removes the entry at the BPT `index`, if there is one.
pub fn drop_bpt_index<T>(values: Vec<T>, index: usize) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| (i != index).then_some(value))
        .collect()
}

/// The pool's own scaling factors, which already include token rates, for
/// the member tokens. The BPT scales with `ONE` and is dropped.
pub async fn scaling_factors(pool: &Pool, context: &PoolContext<'_>) -> Result<ScalingFactors> {
    let mut factors = context.scaling_factors().await?.to_vec();
    if let Some(factor) = pool
        .config()
        .bpt_index
        .and_then(|index| factors.get_mut(index))
    {
        *factor = Bfp::one();
    }
    Ok(ScalingFactors::new(pool.drop_bpt(factors)))
}
