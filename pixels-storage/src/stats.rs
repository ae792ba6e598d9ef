//! Statistics recorders of pixels and column chunks.
//!
//! A column writer owns two recorders of the same family: the pixel
//! recorder collects values of the current pixel and is merged into
//! the chunk recorder at every pixel boundary.
use crate::proto::{
    BinaryStatistic, BooleanStatistic, ColumnStatistic, DoubleStatistic, IntegerStatistic,
};
use crate::serde::ByteString;
use pixels_datatype::{TypeDescription, TypeKind};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntegerStats {
    min: Option<i64>,
    max: Option<i64>,
    // wide sum keeps merge associative.
    sum: i128,
}

impl IntegerStats {
    #[inline]
    fn update(&mut self, value: i64) {
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.sum += value as i128;
    }

    #[inline]
    fn merge(&mut self, other: &IntegerStats) {
        self.min = merge_opt(self.min, other.min, i64::min);
        self.max = merge_opt(self.max, other.max, i64::max);
        self.sum += other.sum;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DoubleStats {
    min: Option<f64>,
    max: Option<f64>,
    sum: f64,
}

impl DoubleStats {
    #[inline]
    fn update(&mut self, value: f64) {
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.sum += value;
    }

    #[inline]
    fn merge(&mut self, other: &DoubleStats) {
        self.min = merge_opt(self.min, other.min, f64::min);
        self.max = merge_opt(self.max, other.max, f64::max);
        self.sum += other.sum;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BooleanStats {
    true_count: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BinaryStats {
    min: Option<Vec<u8>>,
    max: Option<Vec<u8>>,
    total_length: u64,
}

impl BinaryStats {
    #[inline]
    fn update(&mut self, value: &[u8]) {
        if self.min.as_deref().is_none_or(|m| value < m) {
            self.min = Some(value.to_vec());
        }
        if self.max.as_deref().is_none_or(|m| value > m) {
            self.max = Some(value.to_vec());
        }
        self.total_length += value.len() as u64;
    }

    #[inline]
    fn merge(&mut self, other: &BinaryStats) {
        if let Some(v) = &other.min {
            if self.min.as_ref().is_none_or(|m| v < m) {
                self.min = Some(v.clone());
            }
        }
        if let Some(v) = &other.max {
            if self.max.as_ref().is_none_or(|m| v > m) {
                self.max = Some(v.clone());
            }
        }
        self.total_length += other.total_length;
    }
}

/// Statistics specific to value family.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsKind {
    General,
    Integer(IntegerStats),
    Double(DoubleStats),
    Boolean(BooleanStats),
    Binary(BinaryStats),
}

impl StatsKind {
    #[inline]
    fn empty_like(&self) -> Self {
        match self {
            StatsKind::General => StatsKind::General,
            StatsKind::Integer(_) => StatsKind::Integer(IntegerStats::default()),
            StatsKind::Double(_) => StatsKind::Double(DoubleStats::default()),
            StatsKind::Boolean(_) => StatsKind::Boolean(BooleanStats::default()),
            StatsKind::Binary(_) => StatsKind::Binary(BinaryStats::default()),
        }
    }
}

/// StatsRecorder accumulates statistics of column values.
///
/// Merge is associative and commutative for all families,
/// except the floating sum which is subject to rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsRecorder {
    number_of_values: u64,
    has_null: bool,
    kind: StatsKind,
}

impl StatsRecorder {
    #[inline]
    pub fn new(kind: StatsKind) -> Self {
        StatsRecorder {
            number_of_values: 0,
            has_null: false,
            kind,
        }
    }

    /// Create an empty recorder for given column type.
    #[inline]
    pub fn for_type(ty: &TypeDescription) -> Self {
        let kind = match ty.kind {
            TypeKind::Boolean => StatsKind::Boolean(BooleanStats::default()),
            k if k.is_integer() => StatsKind::Integer(IntegerStats::default()),
            k if k.is_floating() => StatsKind::Double(DoubleStats::default()),
            k if k.is_binary() => StatsKind::Binary(BinaryStats::default()),
            _ => StatsKind::General,
        };
        Self::new(kind)
    }

    #[inline]
    pub fn kind(&self) -> &StatsKind {
        &self.kind
    }

    /// Number of non-null values.
    #[inline]
    pub fn number_of_values(&self) -> u64 {
        self.number_of_values
    }

    #[inline]
    pub fn has_null(&self) -> bool {
        self.has_null
    }

    #[inline]
    pub fn set_has_null(&mut self) {
        self.has_null = true;
    }

    /// Returns true if nothing is recorded since creation or last reset.
    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == StatsRecorder::new(self.kind.empty_like())
    }

    /// Count one non-null value without family-specific statistics.
    #[inline]
    pub fn increment(&mut self) {
        self.number_of_values += 1;
    }

    #[inline]
    pub fn update_integer(&mut self, value: i64) {
        self.number_of_values += 1;
        match &mut self.kind {
            StatsKind::Integer(s) => s.update(value),
            other => debug_assert!(false, "integer value recorded by {:?}", other),
        }
    }

    #[inline]
    pub fn update_double(&mut self, value: f64) {
        self.number_of_values += 1;
        match &mut self.kind {
            StatsKind::Double(s) => s.update(value),
            other => debug_assert!(false, "double value recorded by {:?}", other),
        }
    }

    #[inline]
    pub fn update_boolean(&mut self, value: bool) {
        self.number_of_values += 1;
        match &mut self.kind {
            StatsKind::Boolean(s) => {
                if value {
                    s.true_count += 1;
                }
            }
            other => debug_assert!(false, "boolean value recorded by {:?}", other),
        }
    }

    #[inline]
    pub fn update_binary(&mut self, value: &[u8]) {
        self.number_of_values += 1;
        match &mut self.kind {
            StatsKind::Binary(s) => s.update(value),
            other => debug_assert!(false, "binary value recorded by {:?}", other),
        }
    }

    /// Merge statistics of other recorder into this one.
    /// Both recorders must be of the same family.
    pub fn merge(&mut self, other: &StatsRecorder) {
        self.number_of_values += other.number_of_values;
        self.has_null |= other.has_null;
        match (&mut self.kind, &other.kind) {
            (StatsKind::General, StatsKind::General) => (),
            (StatsKind::Integer(a), StatsKind::Integer(b)) => a.merge(b),
            (StatsKind::Double(a), StatsKind::Double(b)) => a.merge(b),
            (StatsKind::Boolean(a), StatsKind::Boolean(b)) => a.true_count += b.true_count,
            (StatsKind::Binary(a), StatsKind::Binary(b)) => a.merge(b),
            (a, b) => debug_assert!(false, "merge {:?} into {:?}", b, a),
        }
    }

    /// Reset to empty state, keeping the family.
    #[inline]
    pub fn reset(&mut self) {
        self.number_of_values = 0;
        self.has_null = false;
        self.kind = self.kind.empty_like();
    }

    /// Returns a snapshot of the recorded statistics.
    pub fn serialize(&self) -> ColumnStatistic {
        let mut stat = ColumnStatistic {
            number_of_values: self.number_of_values,
            has_null: self.has_null,
            ..Default::default()
        };
        match &self.kind {
            StatsKind::General => (),
            StatsKind::Integer(s) => {
                stat.int_statistics = Some(IntegerStatistic {
                    minimum: s.min,
                    maximum: s.max,
                    sum: i64::try_from(s.sum).ok(),
                })
            }
            StatsKind::Double(s) => {
                stat.double_statistics = Some(DoubleStatistic {
                    minimum: s.min,
                    maximum: s.max,
                    sum: s.sum,
                })
            }
            StatsKind::Boolean(s) => {
                stat.boolean_statistics = Some(BooleanStatistic {
                    true_count: s.true_count,
                })
            }
            StatsKind::Binary(s) => {
                stat.binary_statistics = Some(BinaryStatistic {
                    minimum: s.min.clone().map(ByteString),
                    maximum: s.max.clone().map(ByteString),
                    sum: s.total_length,
                })
            }
        }
        stat
    }
}

#[inline]
fn merge_opt<T: Copy>(a: Option<T>, b: Option<T>, f: fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn integer_recorder(values: &[i64]) -> StatsRecorder {
        let mut rec = StatsRecorder::for_type(&TypeDescription::long());
        for v in values {
            rec.update_integer(*v);
        }
        rec
    }

    #[test]
    fn test_integer_stats() {
        let rec = integer_recorder(&[3, -2, 10]);
        let stat = rec.serialize();
        assert_eq!(stat.number_of_values, 3);
        assert!(!stat.has_null);
        let int_stat = stat.int_statistics.unwrap();
        assert_eq!(int_stat.minimum, Some(-2));
        assert_eq!(int_stat.maximum, Some(10));
        assert_eq!(int_stat.sum, Some(11));
    }

    #[test]
    fn test_integer_sum_overflow() {
        let rec = integer_recorder(&[i64::MAX, 1]);
        let int_stat = rec.serialize().int_statistics.unwrap();
        assert_eq!(int_stat.sum, None);
        assert_eq!(int_stat.maximum, Some(i64::MAX));
    }

    #[test]
    fn test_merge_associativity() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let pixels: Vec<StatsRecorder> = (0..3)
            .map(|i| {
                let values: Vec<i64> = (0..rng.random_range(0..20))
                    .map(|_| rng.random_range(-1000..1000))
                    .collect();
                let mut rec = integer_recorder(&values);
                if i == 1 {
                    rec.set_has_null();
                }
                rec
            })
            .collect();

        // ((P1 + P2) + P3) in chunk order
        let mut chunk = StatsRecorder::for_type(&TypeDescription::long());
        for p in &pixels {
            chunk.merge(p);
        }

        // (P1 merged with P2) then P3
        let mut grouped = pixels[0].clone();
        grouped.merge(&pixels[1]);
        let mut chunk2 = StatsRecorder::for_type(&TypeDescription::long());
        chunk2.merge(&grouped);
        chunk2.merge(&pixels[2]);

        // P1 then (P2 merged with P3)
        let mut tail = pixels[1].clone();
        tail.merge(&pixels[2]);
        let mut chunk3 = pixels[0].clone();
        chunk3.merge(&tail);

        assert_eq!(chunk.serialize(), chunk2.serialize());
        assert_eq!(chunk.serialize(), chunk3.serialize());
        assert!(chunk.has_null());
    }

    #[test]
    fn test_reset() {
        let mut rec = integer_recorder(&[1, 2]);
        rec.set_has_null();
        assert!(!rec.is_empty());
        rec.reset();
        assert!(rec.is_empty());
        assert_eq!(rec, StatsRecorder::for_type(&TypeDescription::long()));
        rec.reset();
        assert!(rec.is_empty());
    }

    #[test]
    fn test_binary_stats() {
        let mut rec = StatsRecorder::for_type(&TypeDescription::string());
        for v in [&b"pear"[..], b"apple", b"zoo"] {
            rec.update_binary(v);
        }
        let mut other = StatsRecorder::for_type(&TypeDescription::string());
        other.update_binary(b"aardvark");
        rec.merge(&other);
        let stat = rec.serialize().binary_statistics.unwrap();
        assert_eq!(stat.minimum, Some(ByteString(b"aardvark".to_vec())));
        assert_eq!(stat.maximum, Some(ByteString(b"zoo".to_vec())));
        assert_eq!(stat.sum, 4 + 5 + 3 + 8);
    }

    #[test]
    fn test_boolean_and_double_stats() {
        let mut rec = StatsRecorder::for_type(&TypeDescription::boolean());
        rec.update_boolean(true);
        rec.update_boolean(false);
        rec.update_boolean(true);
        assert_eq!(rec.serialize().boolean_statistics.unwrap().true_count, 2);

        let mut rec = StatsRecorder::for_type(&TypeDescription::double());
        rec.update_double(1.5);
        rec.update_double(-0.5);
        let stat = rec.serialize().double_statistics.unwrap();
        assert_eq!(stat.minimum, Some(-0.5));
        assert_eq!(stat.maximum, Some(1.5));
        assert_eq!(stat.sum, 1.0);
    }

    #[test]
    fn test_general_stats() {
        let ty = TypeDescription::decimal(10, 2).unwrap();
        let mut rec = StatsRecorder::for_type(&ty);
        assert_eq!(rec.kind(), &StatsKind::General);
        rec.increment();
        rec.set_has_null();
        let stat = rec.serialize();
        assert_eq!(stat.number_of_values, 1);
        assert!(stat.has_null);
        assert!(stat.int_statistics.is_none());
    }
}
