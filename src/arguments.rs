use std::{collections::BTreeMap, sync::Arc};

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Named arguments passed from `publish` to every handler of a topic.
///
/// The map is shared behind an `Arc`: a publish call clones it once per
/// scheduled handler without copying the values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    inner: Arc<BTreeMap<String, Value>>,
}

/// Builds [`Arguments`] from `name => value` pairs.
///
/// ```
/// use eventdispatch::arguments;
///
/// let args = arguments! { "value" => "foo", "attempt" => 3 };
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! arguments {
    () => {
        $crate::Arguments::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::Arguments::new()$(.with($name, $value))+
    };
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an argument.
    pub fn with(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Arc::make_mut(&mut self.inner).insert(name.into(), value.into());
        self
    }

    /// Adds an argument from any serializable value.
    pub fn try_with<V: Serialize>(
        self,
        name: impl Into<String>,
        value: &V,
    ) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(value)?;
        Ok(self.with(name, value))
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Value> {
        self.inner.get(name)
    }

    /// Typed lookup. `Ok(None)` when the argument is absent, `Err` when it is
    /// present but does not deserialize into `T`.
    pub fn get_as<T: DeserializeOwned>(
        &self,
        name: &str,
    ) -> anyhow::Result<Option<T>> {
        match self.inner.get(name) {
            None => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .with_context(|| format!("argument '{name}' has an unexpected type")),
        }
    }

    /// Typed lookup of an argument the caller cannot do without.
    pub fn require<T: DeserializeOwned>(
        &self,
        name: &str,
    ) -> anyhow::Result<T> {
        self.get_as(name)?
            .with_context(|| format!("argument '{name}' is missing"))
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.inner.contains_key(name)
    }

    /// Argument names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Arguments
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<BTreeMap<_, _>>();
        Self {
            inner: Arc::new(map),
        }
    }
}
