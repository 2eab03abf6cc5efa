//! Listener - a registered callback tagged with its parameter signature
//!
//! The parameter list of a callback is read from its `Fn` bound when it is
//! turned into a [`Listener`], so a value that is not callable never gets
//! this far: the type checker rejects it at the registration call site.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::arg::Arg;
use crate::signature::{ParamType, Signature};

/// Opaque token identifying one registration.
///
/// Returned by every registration call and used for removal. Two
/// registrations of the same closure get different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A type usable as a listener parameter.
///
/// Every `Clone + Send + Sync + 'static` type is an exact parameter: the
/// listener receives a clone of the emitted value. [`Arg`] is the wildcard
/// parameter and accepts a value of any type.
pub trait Param: Sized + Send + 'static {
    fn param_type() -> ParamType;

    fn from_arg(arg: &Arg) -> Option<Self>;
}

impl<T: Clone + Send + Sync + 'static> Param for T {
    fn param_type() -> ParamType {
        ParamType::of::<T>()
    }

    fn from_arg(arg: &Arg) -> Option<Self> {
        arg.downcast_ref::<T>().cloned()
    }
}

impl Param for Arg {
    fn param_type() -> ParamType {
        ParamType::Any
    }

    fn from_arg(arg: &Arg) -> Option<Self> {
        Some(arg.share())
    }
}

/// Type-erased callable. Returns `false` when the arguments could not be
/// converted to the declared parameters.
#[doc(hidden)]
pub type Callable = dyn Fn(&[Arg]) -> bool + Send + Sync;

/// Conversion of a closure or function into a listener.
///
/// Implemented for every `Fn(P1, ..., Pn) -> R` with up to eight
/// [`Param`] parameters. Return values are discarded.
pub trait IntoListener<Params>: Send + Sync + 'static {
    /// Declared parameter types, in order
    fn signature() -> Signature;

    #[doc(hidden)]
    fn into_callable(self) -> Box<Callable>;
}

macro_rules! impl_into_listener {
    ($($param:ident),*) => {
        impl<F, R, $($param,)*> IntoListener<($($param,)*)> for F
        where
            F: Fn($($param),*) -> R + Send + Sync + 'static,
            R: 'static,
            $($param: Param,)*
        {
            fn signature() -> Signature {
                Signature::new(vec![$(<$param as Param>::param_type()),*])
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_callable(self) -> Box<Callable> {
                Box::new(move |args: &[Arg]| {
                    let mut args = args.iter();
                    $(
                        let Some($param) = args.next().and_then(<$param as Param>::from_arg) else {
                            return false;
                        };
                    )*
                    let _ = (self)($($param),*);
                    true
                })
            }
        }
    };
}

impl_into_listener!();
impl_into_listener!(P1);
impl_into_listener!(P1, P2);
impl_into_listener!(P1, P2, P3);
impl_into_listener!(P1, P2, P3, P4);
impl_into_listener!(P1, P2, P3, P4, P5);
impl_into_listener!(P1, P2, P3, P4, P5, P6);
impl_into_listener!(P1, P2, P3, P4, P5, P6, P7);
impl_into_listener!(P1, P2, P3, P4, P5, P6, P7, P8);

/// One registered callback
pub struct Listener {
    id: ListenerId,
    signature: Signature,
    once: bool,
    callable: Box<Callable>,
}

impl Listener {
    /// Wrap `f`, capturing its parameter signature
    pub fn new<P, F: IntoListener<P>>(f: F, once: bool) -> Self {
        Self {
            id: ListenerId::next(),
            signature: F::signature(),
            once,
            callable: f.into_callable(),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Whether the listener is removed by the first emission it matches
    pub fn is_once(&self) -> bool {
        self.once
    }

    /// Whether an emission with `args` would be delivered to this listener
    #[inline]
    pub fn accepts(&self, args: &[Arg]) -> bool {
        self.signature.accepts(args)
    }

    /// Call the listener. Returns `false` without calling it when `args`
    /// do not fit the signature.
    pub fn call(&self, args: &[Arg]) -> bool {
        self.accepts(args) && (self.callable)(args)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("signature", &self.signature)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}
