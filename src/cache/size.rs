//! Size Estimation Module
//!
//! Byte-size approximations used for memory-based eviction. Primitives cost a
//! small constant, strings and byte buffers cost their length, and arbitrary
//! structures cost the length of their JSON serialization.

use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

/// Cost charged for a primitive value.
pub const PRIMITIVE_SIZE: usize = 8;

/// Computes the accounted size of one stored key/value pair.
///
/// Any closure works, including one that captures state.
pub type Weigher<K, V> = Box<dyn Fn(&K, &V) -> usize>;

// == Estimate Size Trait ==
/// Approximate number of bytes a value occupies.
pub trait EstimateSize {
    fn estimated_size(&self) -> usize;
}

/// Default weigher: key estimate plus value estimate.
pub fn estimate_charge<K: EstimateSize, V: EstimateSize>(key: &K, value: &V) -> usize {
    key.estimated_size() + value.estimated_size()
}

// == Serialized Size ==
/// Length of the JSON encoding of `value`.
///
/// Falls back to [`PRIMITIVE_SIZE`] if the value cannot be serialized.
pub fn serialized_size<T: Serialize + ?Sized>(value: &T) -> usize {
    match serde_json::to_vec(value) {
        Ok(bytes) => bytes.len(),
        Err(err) => {
            warn!(error = %err, "size estimation failed, charging primitive size");
            PRIMITIVE_SIZE
        }
    }
}

// == Serialized Wrapper ==
/// Wraps any serializable value so it is sized by its serialized length.
///
/// # Example
/// ```
/// use ttl_lru_cache::{EstimateSize, Serialized};
///
/// let point = Serialized(vec![1, 2, 3]);
/// assert_eq!(point.estimated_size(), "[1,2,3]".len());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Serialized<T>(pub T);

impl<T: Serialize> EstimateSize for Serialized<T> {
    fn estimated_size(&self) -> usize {
        serialized_size(&self.0)
    }
}

macro_rules! primitive_size {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EstimateSize for $ty {
                fn estimated_size(&self) -> usize {
                    PRIMITIVE_SIZE
                }
            }
        )*
    };
}

primitive_size!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
);

impl EstimateSize for () {
    fn estimated_size(&self) -> usize {
        0
    }
}

impl EstimateSize for str {
    fn estimated_size(&self) -> usize {
        self.len()
    }
}

impl EstimateSize for String {
    fn estimated_size(&self) -> usize {
        self.len()
    }
}

impl EstimateSize for &str {
    fn estimated_size(&self) -> usize {
        self.len()
    }
}

impl EstimateSize for [u8] {
    fn estimated_size(&self) -> usize {
        self.len()
    }
}

impl EstimateSize for Vec<u8> {
    fn estimated_size(&self) -> usize {
        self.len()
    }
}

impl EstimateSize for serde_json::Value {
    fn estimated_size(&self) -> usize {
        serialized_size(self)
    }
}

impl<T: EstimateSize> EstimateSize for Option<T> {
    fn estimated_size(&self) -> usize {
        self.as_ref()
            .map_or(PRIMITIVE_SIZE, EstimateSize::estimated_size)
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Box<T> {
    fn estimated_size(&self) -> usize {
        (**self).estimated_size()
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Rc<T> {
    fn estimated_size(&self) -> usize {
        (**self).estimated_size()
    }
}

impl<T: EstimateSize + ?Sized> EstimateSize for Arc<T> {
    fn estimated_size(&self) -> usize {
        (**self).estimated_size()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_primitives_cost_constant() {
        assert_eq!(1u8.estimated_size(), PRIMITIVE_SIZE);
        assert_eq!(u64::MAX.estimated_size(), PRIMITIVE_SIZE);
        assert_eq!(3.5f64.estimated_size(), PRIMITIVE_SIZE);
        assert_eq!(true.estimated_size(), PRIMITIVE_SIZE);
        assert_eq!(().estimated_size(), 0);
    }

    #[test]
    fn test_strings_cost_byte_length() {
        assert_eq!("abc".estimated_size(), 3);
        assert_eq!(String::from("héllo").estimated_size(), 6);
        assert_eq!(Box::<str>::from("four").estimated_size(), 4);
        assert_eq!(vec![0u8; 10].estimated_size(), 10);
    }

    #[test]
    fn test_wrappers_delegate() {
        assert_eq!(Some(String::from("abcd")).estimated_size(), 4);
        assert_eq!(None::<String>.estimated_size(), PRIMITIVE_SIZE);
        assert_eq!(Arc::new(String::from("ab")).estimated_size(), 2);
        assert_eq!(Rc::new(1u32).estimated_size(), PRIMITIVE_SIZE);
    }

    #[test]
    fn test_structures_cost_serialized_length() {
        let value = json!({"a": [1, 2], "b": "x"});
        assert_eq!(value.estimated_size(), r#"{"a":[1,2],"b":"x"}"#.len());

        let mut map = BTreeMap::new();
        map.insert("k", 1);
        assert_eq!(Serialized(map).estimated_size(), r#"{"k":1}"#.len());
    }

    #[test]
    fn test_unserializable_falls_back() {
        // JSON object keys must be strings
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], 1);
        assert_eq!(serialized_size(&map), PRIMITIVE_SIZE);
    }

    #[test]
    fn test_estimate_charge_adds_key_and_value() {
        let key = String::from("key");
        let value = String::from("value");
        assert_eq!(estimate_charge(&key, &value), 8);
    }
}
