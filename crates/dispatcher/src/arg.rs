//! Dynamically typed emission arguments

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// One positional argument of an emission.
///
/// The value is stored behind an `Arc` so that a single argument list can
/// be handed to every matching listener without copying the payload.
/// Listeners that declare a concrete parameter type receive a clone of
/// the value; listeners that declare an `Arg` parameter receive the
/// argument itself and accept any type.
///
/// `Arg` intentionally does not implement `Clone`: every `Clone` type is
/// already an exact listener parameter, and `Arg` is the wildcard.
pub struct Arg {
    value: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl Arg {
    /// Wrap a value as an emission argument
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// `TypeId` of the wrapped value
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the wrapped value's type (diagnostics only)
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the wrapped value is a `T`
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrow the wrapped value as a `T`
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Another handle to the same value
    pub(crate) fn share(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            type_id: self.type_id,
            type_name: self.type_name,
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arg")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Conversion of a caller's argument list into emission arguments.
///
/// Implemented for `()`, tuples of up to eight values, and `Vec<Arg>`.
pub trait IntoArgs {
    fn into_args(self) -> Vec<Arg>;
}

impl IntoArgs for Vec<Arg> {
    fn into_args(self) -> Vec<Arg> {
        self
    }
}

impl IntoArgs for () {
    fn into_args(self) -> Vec<Arg> {
        Vec::new()
    }
}

macro_rules! impl_into_args {
    ($($ty:ident),+) => {
        impl<$($ty: Any + Send + Sync),+> IntoArgs for ($($ty,)+) {
            #[allow(non_snake_case)]
            fn into_args(self) -> Vec<Arg> {
                let ($($ty,)+) = self;
                vec![$(Arg::new($ty)),+]
            }
        }
    };
}

impl_into_args!(A1);
impl_into_args!(A1, A2);
impl_into_args!(A1, A2, A3);
impl_into_args!(A1, A2, A3, A4);
impl_into_args!(A1, A2, A3, A4, A5);
impl_into_args!(A1, A2, A3, A4, A5, A6);
impl_into_args!(A1, A2, A3, A4, A5, A6, A7);
impl_into_args!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Build a `Vec<Arg>` from a list of values.
///
/// ```
/// use dispatcher::args;
///
/// let args = args!["car".to_string(), 4.5f32];
/// assert_eq!(args.len(), 2);
/// assert!(args[1].is::<f32>());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::new($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_type_info() {
        let arg = Arg::new(String::from("hello"));
        assert!(arg.is::<String>());
        assert!(!arg.is::<&str>());
        assert_eq!(arg.type_id(), TypeId::of::<String>());
        assert_eq!(arg.downcast_ref::<String>().map(String::as_str), Some("hello"));
        assert!(arg.type_name().ends_with("String"));
    }

    #[test]
    fn test_share_points_at_same_value() {
        let arg = Arg::new(vec![1u8, 2, 3]);
        let shared = arg.share();
        let a = arg.downcast_ref::<Vec<u8>>().unwrap();
        let b = shared.downcast_ref::<Vec<u8>>().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_tuple_into_args() {
        let args = ("a", 1i64, 2.5f64).into_args();
        assert_eq!(args.len(), 3);
        assert!(args[0].is::<&'static str>());
        assert!(args[1].is::<i64>());
        assert!(args[2].is::<f64>());
        assert!(().into_args().is_empty());
    }

    #[test]
    fn test_args_macro() {
        let empty = args![];
        assert!(empty.is_empty());

        let args = args![1u32, "x",];
        assert_eq!(args.len(), 2);
        assert!(args[0].is::<u32>());
    }
}
