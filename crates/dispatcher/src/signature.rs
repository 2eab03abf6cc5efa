//! Declared parameter signatures and the emission matching rule

use std::any::TypeId;
use std::fmt;

use crate::arg::Arg;

/// Type accepted at one parameter position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Only values of exactly this concrete type
    Exact { id: TypeId, name: &'static str },
    /// Any value (the listener takes an [`Arg`])
    Any,
}

impl ParamType {
    /// Exact parameter type for `T`
    pub fn of<T: 'static>() -> Self {
        Self::Exact {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Whether `arg` may be passed at a position declared with this type
    #[inline]
    pub fn accepts(&self, arg: &Arg) -> bool {
        match self {
            Self::Exact { id, .. } => *id == arg.type_id(),
            Self::Any => true,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact { name, .. } => f.write_str(name),
            Self::Any => f.write_str("_"),
        }
    }
}

/// Ordered parameter types of a listener, captured at registration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<ParamType>,
}

impl Signature {
    pub fn new(params: Vec<ParamType>) -> Self {
        Self { params }
    }

    /// Number of declared parameters
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Matching rule for an emission: the argument count must equal the
    /// arity, and every argument must be accepted at its position.
    pub fn accepts(&self, args: &[Arg]) -> bool {
        args.len() == self.params.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(param, arg)| param.accepts(arg))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[derive(Debug, Clone, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[test]
    fn test_exact_arity_required() {
        let sig = Signature::new(vec![ParamType::of::<String>()]);
        assert!(sig.accepts(&args!["car".to_string()]));
        assert!(!sig.accepts(&args![]));
        assert!(!sig.accepts(&args!["car".to_string(), "bus".to_string()]));
    }

    #[test]
    fn test_positional_types() {
        let sig = Signature::new(vec![ParamType::of::<String>(), ParamType::of::<Position>()]);
        let pos = Position { x: 4.5, y: 5.6 };

        assert!(sig.accepts(&args!["car".to_string(), pos.clone()]));
        assert!(!sig.accepts(&args![pos, "car".to_string()]));
    }

    #[test]
    fn test_no_implicit_conversions() {
        let sig = Signature::new(vec![ParamType::of::<i64>()]);
        assert!(!sig.accepts(&args![1i32]));
        assert!(!sig.accepts(&args![1u64]));
        assert!(sig.accepts(&args![1i64]));

        // &str and String are distinct types
        let sig = Signature::new(vec![ParamType::of::<String>()]);
        assert!(!sig.accepts(&args!["borrowed"]));
    }

    #[test]
    fn test_any_accepts_everything() {
        let sig = Signature::new(vec![ParamType::of::<String>(), ParamType::Any]);
        assert!(sig.accepts(&args!["a".to_string(), 1u8]));
        assert!(sig.accepts(&args!["a".to_string(), Position { x: 0.0, y: 0.0 }]));
        assert!(!sig.accepts(&args![1u8, 1u8]));
    }

    #[test]
    fn test_empty_signature() {
        let sig = Signature::default();
        assert_eq!(sig.arity(), 0);
        assert!(sig.accepts(&args![]));
        assert!(!sig.accepts(&args![()]));
    }

    #[test]
    fn test_display() {
        let sig = Signature::new(vec![ParamType::of::<u32>(), ParamType::Any]);
        assert_eq!(sig.to_string(), "(u32, _)");
        assert_eq!(Signature::default().to_string(), "()");
    }
}
