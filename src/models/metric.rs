/// A raw fact that may not have been obtainable.
///
/// Lookups against the store or the market-data API never fail loudly; they
/// yield `Unavailable` instead, which callers collapse to a zero default with
/// [`Metric::unwrap_or_default`] when a plain number is needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric<T> {
    Value(T),
    Unavailable,
}

impl<T> Metric<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Metric::Value(_))
    }

    pub fn value(self) -> Option<T> {
        match self {
            Metric::Value(v) => Some(v),
            Metric::Unavailable => None,
        }
    }
}

impl<T: Default> Metric<T> {
    pub fn unwrap_or_default(self) -> T {
        self.value().unwrap_or_default()
    }
}

impl<T> From<Option<T>> for Metric<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Metric::Value(v),
            None => Metric::Unavailable,
        }
    }
}
