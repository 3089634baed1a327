//! # Type-Erased Values
//!
//! Neither host framework shares a type system with the other, so handlers,
//! controllers, UI components and model entries cross the seam as [`Value`]s.
//!
//! # Performance
//!
//! - **Clone**: O(1) - only increments the atomic reference count
//! - **Downcast**: O(1) - a `TypeId` comparison

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A shared, type-erased value.
///
/// The concrete type name is captured at construction so that model keys can
/// be synthesized from it and diagnostics can say what they found.
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl Value {
    /// Wrap a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an already shared value without re-allocating.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The fully qualified name of the wrapped type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The `TypeId` of the wrapped type.
    pub fn value_type_id(&self) -> TypeId {
        self.type_id
    }

    /// Whether the wrapped value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Borrow the wrapped value as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Share the wrapped value as an `Arc<T>`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    /// The wrapped value as a string slice, if it is a `String` or `&'static str`.
    pub fn as_str(&self) -> Option<&str> {
        self.downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| self.downcast_ref::<&'static str>().copied())
    }

    /// Render simple scalar values (strings, numbers, booleans, chars) as text.
    ///
    /// Returns `None` for anything else; such values never end up in URLs.
    pub fn to_display_string(&self) -> Option<String> {
        macro_rules! scalar {
            ($($ty:ty),+) => {
                $(
                    if let Some(v) = self.downcast_ref::<$ty>() {
                        return Some(v.to_string());
                    }
                )+
            };
        }

        if let Some(s) = self.as_str() {
            return Some(s.to_owned());
        }
        scalar!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char);
        None
    }

    /// Whether both values share the same allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_display_string() {
            Some(text) => write!(f, "Value({}: {:?})", self.type_name, text),
            None => write!(f, "Value({})", self.type_name),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::new(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::new(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Hotel {
        id: u32,
    }

    #[test]
    fn test_downcast_shares_allocation() {
        let value = Value::new(Hotel { id: 7 });
        let a = value.downcast::<Hotel>().unwrap();
        let b = value.clone().downcast::<Hotel>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.id, 7);
        assert!(value.downcast::<String>().is_none());
    }

    #[test]
    fn test_type_identity() {
        let value = Value::new(Hotel { id: 1 });
        assert!(value.is::<Hotel>());
        assert!(!value.is::<u32>());
        assert_eq!(value.value_type_id(), TypeId::of::<Hotel>());
        assert!(value.type_name().ends_with("Hotel"));
    }

    #[test]
    fn test_string_views() {
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::new("static").as_str(), Some("static"));
        assert_eq!(Value::new(42_u64).to_display_string().as_deref(), Some("42"));
        assert_eq!(Value::new(true).to_display_string().as_deref(), Some("true"));
        assert_eq!(Value::new(Hotel { id: 1 }).to_display_string(), None);
    }
}
