use std::collections::{BTreeMap, HashMap};

use crate::{MetricResult, MetricsError};

/// Conversion of a caller-supplied metric value into its wire form.
///
/// StatsD values are integral. Integers of every width are accepted and
/// `None`/`()` mean "no value". Floats, booleans, text and collections are
/// rejected with [`MetricsError::InvalidArgument`].
pub trait IntoStatValue {
    /// Validates `self` and returns the integer to put on the wire, if any.
    ///
    /// # Errors
    /// Returns [`MetricsError::InvalidArgument`] when the value is not an
    /// integer and not absent.
    fn into_stat_value(self) -> MetricResult<Option<i128>>;
}

macro_rules! accept_integers {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoStatValue for $ty {
                fn into_stat_value(self) -> MetricResult<Option<i128>> {
                    i128::try_from(self).map(Some).map_err(|_| {
                        MetricsError::InvalidArgument(format!("{self} does not fit a stat value"))
                    })
                }
            }
        )*
    };
}

accept_integers!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! reject {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoStatValue for $ty {
                fn into_stat_value(self) -> MetricResult<Option<i128>> {
                    Err(MetricsError::invalid_value(std::any::type_name::<Self>()))
                }
            }
        )*
    };
}

reject!(f32, f64, bool, char, &str, String);

impl<T> IntoStatValue for Vec<T> {
    fn into_stat_value(self) -> MetricResult<Option<i128>> {
        Err(MetricsError::invalid_value(std::any::type_name::<Self>()))
    }
}

impl<T> IntoStatValue for &[T] {
    fn into_stat_value(self) -> MetricResult<Option<i128>> {
        Err(MetricsError::invalid_value(std::any::type_name::<Self>()))
    }
}

impl<T, const N: usize> IntoStatValue for [T; N] {
    fn into_stat_value(self) -> MetricResult<Option<i128>> {
        Err(MetricsError::invalid_value(std::any::type_name::<Self>()))
    }
}

impl<K, V, S> IntoStatValue for HashMap<K, V, S> {
    fn into_stat_value(self) -> MetricResult<Option<i128>> {
        Err(MetricsError::invalid_value(std::any::type_name::<Self>()))
    }
}

impl<K, V> IntoStatValue for BTreeMap<K, V> {
    fn into_stat_value(self) -> MetricResult<Option<i128>> {
        Err(MetricsError::invalid_value(std::any::type_name::<Self>()))
    }
}

impl<T: IntoStatValue> IntoStatValue for Option<T> {
    fn into_stat_value(self) -> MetricResult<Option<i128>> {
        self.map_or(Ok(None), IntoStatValue::into_stat_value)
    }
}

impl IntoStatValue for () {
    fn into_stat_value(self) -> MetricResult<Option<i128>> {
        Ok(None)
    }
}
