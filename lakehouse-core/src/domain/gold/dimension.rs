// lakehouse-core/src/domain/gold/dimension.rs

use std::collections::HashMap;

/// Dimension rows plus the natural-key -> surrogate-key index used by the fact build.
#[derive(Debug, Clone)]
pub struct Dimension<D> {
    rows: Vec<D>,
    index: HashMap<String, i64>,
}

impl<D> Default for Dimension<D> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<D> Dimension<D> {
    /// Assigns keys 1..=n to distinct natural keys in first-occurrence order.
    ///
    /// `make` is called once per distinct key with the first record carrying it.
    pub fn build<S>(
        source: &[S],
        natural_key: impl Fn(&S) -> Option<&str>,
        make: impl Fn(i64, &S) -> D,
    ) -> Self {
        let mut dim = Self::default();
        for record in source {
            let Some(key) = natural_key(record) else {
                continue;
            };
            if dim.index.contains_key(key) {
                continue;
            }
            let sk = dim.rows.len() as i64 + 1;
            dim.index.insert(key.to_string(), sk);
            dim.rows.push(make(sk, record));
        }
        dim
    }

    /// Rebuilds the index of rows read back from the Gold zone.
    pub fn from_rows(
        rows: Vec<D>,
        natural_key: impl Fn(&D) -> &str,
        surrogate_key: impl Fn(&D) -> i64,
    ) -> Self {
        let index = rows
            .iter()
            .map(|row| (natural_key(row).to_string(), surrogate_key(row)))
            .collect();
        Self { rows, index }
    }

    pub fn key_of(&self, natural_key: &str) -> Option<i64> {
        self.index.get(natural_key).copied()
    }

    pub fn rows(&self) -> &[D] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_first_occurrence_wins_lowest_key() {
        let source = ["B", "A", "B", "C", "A"];

        let dim = Dimension::build(&source, |s| Some(*s), |sk, s| (sk, s.to_string()));

        assert_eq!(dim.len(), 3);
        assert_eq!(dim.key_of("B"), Some(1));
        assert_eq!(dim.key_of("A"), Some(2));
        assert_eq!(dim.key_of("C"), Some(3));
        assert_eq!(dim.key_of("D"), None);
    }

    #[test]
    fn test_keys_unique_and_count_matches_distinct_naturals() {
        let source: Vec<String> = (0..50).map(|i| format!("N{}", i % 17)).collect();

        let dim = Dimension::build(&source, |s| Some(s.as_str()), |sk, _| sk);

        let distinct: HashSet<&String> = source.iter().collect();
        let keys: HashSet<i64> = dim.rows().iter().copied().collect();
        assert_eq!(dim.len(), distinct.len());
        assert_eq!(keys.len(), dim.len());
    }

    #[test]
    fn test_records_without_natural_key_are_ignored() {
        let source = [Some("X"), None, Some("Y")];

        let dim = Dimension::build(&source, |s| *s, |sk, _| sk);

        assert_eq!(dim.rows(), &[1, 2]);
    }
}
