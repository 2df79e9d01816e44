//! Query-key selection shaping the traffic aimed at the search endpoint.
//!
//! Two mixes are supported: an explicit weight table, and a hot/tail split
//! where a handful of hot keys receive a configured share of the traffic
//! while generated `tail_<i>` keys share the remainder.
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::error::ValidationError;

/// One entry of an explicit query weight table.
#[derive(Debug, Clone)]
pub struct WeightedQuery {
    pub key: String,
    pub weight: u64,
}

/// A weighted set of query keys plus a page range.
#[derive(Debug)]
pub struct QueryMix {
    keys: Vec<String>,
    index: WeightedIndex<f64>,
    pages: u64,
}

/// A single selected query.
#[derive(Debug, Clone, Copy)]
pub struct QueryPick<'mix> {
    pub key: &'mix str,
    pub page: u64,
}

impl QueryMix {
    /// Build a mix from an explicit weight table.
    ///
    /// # Errors
    ///
    /// Returns an error when the table is empty or no entry carries a
    /// positive weight.
    pub fn from_weighted(entries: &[WeightedQuery], pages: u64) -> Result<Self, ValidationError> {
        if entries.is_empty() {
            return Err(ValidationError::QueryWeightsEmpty);
        }
        let keys = entries.iter().map(|entry| entry.key.clone()).collect();
        let weights: Vec<f64> = entries.iter().map(|entry| entry.weight as f64).collect();
        Self::build(keys, &weights, pages)
    }

    /// Build a hot/tail mix: `hot_keys` split `hot_ratio` of the traffic
    /// uniformly, generated `tail_<i>` keys split the rest.
    ///
    /// # Errors
    ///
    /// Returns an error when no hot key is given, the ratio is outside
    /// `[0, 1]`, or residual traffic exists with no tail keys to absorb it.
    pub fn hot_tail(
        hot_keys: &[String],
        hot_ratio: f64,
        tail_size: usize,
        pages: u64,
    ) -> Result<Self, ValidationError> {
        if hot_keys.is_empty() {
            return Err(ValidationError::HotKeysEmpty);
        }
        if !(0.0..=1.0).contains(&hot_ratio) {
            return Err(ValidationError::RatioOutOfRange {
                value: hot_ratio.to_string(),
            });
        }

        let mut keys: Vec<String> = Vec::with_capacity(hot_keys.len().saturating_add(tail_size));
        let mut weights: Vec<f64> = Vec::with_capacity(keys.capacity());
        let hot_share = hot_ratio / hot_keys.len() as f64;
        for key in hot_keys {
            keys.push(key.clone());
            weights.push(hot_share);
        }

        let tail_ratio = 1.0 - hot_ratio;
        if tail_ratio > 0.0 {
            if tail_size == 0 {
                return Err(ValidationError::TailRequired);
            }
            let tail_share = tail_ratio / tail_size as f64;
            for tail in 0..tail_size {
                keys.push(format!("tail_{}", tail));
                weights.push(tail_share);
            }
        }

        Self::build(keys, &weights, pages)
    }

    fn build(keys: Vec<String>, weights: &[f64], pages: u64) -> Result<Self, ValidationError> {
        let index = WeightedIndex::new(weights.iter().copied())
            .map_err(|_err| ValidationError::QueryWeightsInvalid)?;
        Ok(Self {
            keys,
            index,
            pages: pages.max(1),
        })
    }

    /// Draw one query: a weighted key and a uniform page in `1..=pages`.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> QueryPick<'_> {
        let slot = self.index.sample(rng);
        let key = self.keys.get(slot).map_or("", String::as_str);
        let page = rng.gen_range(1..=self.pages);
        QueryPick { key, page }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::{QueryMix, WeightedQuery};
    use crate::error::ValidationError;

    fn weighted_entries() -> Vec<WeightedQuery> {
        vec![
            WeightedQuery {
                key: "springboot".to_owned(),
                weight: 40,
            },
            WeightedQuery {
                key: "java".to_owned(),
                weight: 30,
            },
            WeightedQuery {
                key: "python".to_owned(),
                weight: 10,
            },
        ]
    }

    #[test]
    fn weighted_mix_selects_only_listed_keys() -> Result<(), String> {
        let mix = QueryMix::from_weighted(&weighted_entries(), 4)
            .map_err(|err| format!("mix build failed: {}", err))?;
        let mut rng = StdRng::seed_from_u64(7);
        for _round in 0..200_usize {
            let pick = mix.pick(&mut rng);
            if !matches!(pick.key, "springboot" | "java" | "python") {
                return Err(format!("Unexpected key: {}", pick.key));
            }
            if !(1..=4).contains(&pick.page) {
                return Err(format!("Page out of range: {}", pick.page));
            }
        }
        Ok(())
    }

    #[test]
    fn hot_ratio_one_never_selects_tail_keys() -> Result<(), String> {
        let hot = vec!["springboot".to_owned()];
        let mix =
            QueryMix::hot_tail(&hot, 1.0, 10, 1).map_err(|err| format!("mix build failed: {}", err))?;
        let mut rng = StdRng::seed_from_u64(11);
        for _round in 0..200_usize {
            let pick = mix.pick(&mut rng);
            if pick.key != "springboot" {
                return Err(format!("Unexpected key: {}", pick.key));
            }
        }
        Ok(())
    }

    #[test]
    fn hot_ratio_zero_never_selects_hot_keys() -> Result<(), String> {
        let hot = vec!["springboot".to_owned()];
        let mix =
            QueryMix::hot_tail(&hot, 0.0, 5, 1).map_err(|err| format!("mix build failed: {}", err))?;
        let mut rng = StdRng::seed_from_u64(13);
        for _round in 0..200_usize {
            let pick = mix.pick(&mut rng);
            if !pick.key.starts_with("tail_") {
                return Err(format!("Unexpected key: {}", pick.key));
            }
        }
        Ok(())
    }

    #[test]
    fn empty_weight_table_is_rejected() -> Result<(), String> {
        match QueryMix::from_weighted(&[], 1) {
            Err(ValidationError::QueryWeightsEmpty) => Ok(()),
            Err(err) => Err(format!("Unexpected error: {}", err)),
            Ok(_mix) => Err("Expected an empty-table error.".to_owned()),
        }
    }

    #[test]
    fn all_zero_weights_are_rejected() -> Result<(), String> {
        let entries = vec![WeightedQuery {
            key: "springboot".to_owned(),
            weight: 0,
        }];
        match QueryMix::from_weighted(&entries, 1) {
            Err(ValidationError::QueryWeightsInvalid) => Ok(()),
            Err(err) => Err(format!("Unexpected error: {}", err)),
            Ok(_mix) => Err("Expected a zero-weight error.".to_owned()),
        }
    }

    #[test]
    fn residual_traffic_requires_tail_keys() -> Result<(), String> {
        let hot = vec!["springboot".to_owned()];
        match QueryMix::hot_tail(&hot, 0.95, 0, 1) {
            Err(ValidationError::TailRequired) => Ok(()),
            Err(err) => Err(format!("Unexpected error: {}", err)),
            Ok(_mix) => Err("Expected a tail-size error.".to_owned()),
        }
    }

    #[test]
    fn out_of_range_ratio_is_rejected() -> Result<(), String> {
        let hot = vec!["springboot".to_owned()];
        match QueryMix::hot_tail(&hot, 1.5, 10, 1) {
            Err(ValidationError::RatioOutOfRange { .. }) => Ok(()),
            Err(err) => Err(format!("Unexpected error: {}", err)),
            Ok(_mix) => Err("Expected a ratio error.".to_owned()),
        }
    }
}
