//! Destinations that receive decoded rows.
//!
//! The shape of a destination is fixed by the types the caller chooses:
//! a scalar destination is any [`Destination`] of a single value, while a
//! sequence destination is a [`Destination`] of a [`SequenceDestination`]
//! container. Whether elements are stored by value or behind an
//! [`Indirection`] is selected by an [`ElementMode`].

use rowscan_core::error::Error;
use smallvec::{Array, SmallVec};
use std::{
    any,
    cell::{RefCell, RefMut},
    collections::VecDeque,
    ops::{Deref, DerefMut},
    rc::Rc,
    sync::Arc,
};

/// A handle to caller memory that will receive decoded data.
pub trait Destination<'a, T: ?Sized> {
    /// A guard granting mutable access to the destination.
    type Guard: DerefMut<Target = T> + 'a;

    /// Acquires mutable access to the destination, returning an error
    /// if it is absent or not mutably accessible.
    fn acquire(self) -> Result<Self::Guard, Error>;
}

impl<'a, T: ?Sized> Destination<'a, T> for &'a mut T {
    type Guard = &'a mut T;

    #[inline]
    fn acquire(self) -> Result<Self::Guard, Error> {
        Ok(self)
    }
}

impl<'a, T: ?Sized> Destination<'a, T> for Option<&'a mut T> {
    type Guard = &'a mut T;

    #[inline]
    fn acquire(self) -> Result<Self::Guard, Error> {
        self.ok_or_else(|| Error::invalid_destination("destination must be a non-null reference"))
    }
}

impl<'a, T: ?Sized> Destination<'a, T> for &'a RefCell<T> {
    type Guard = RefMut<'a, T>;

    #[inline]
    fn acquire(self) -> Result<Self::Guard, Error> {
        self.try_borrow_mut().map_err(|err| {
            Error::invalid_destination(format!("destination is not mutably accessible: {err}"))
        })
    }
}

/// An ordered, appendable and resizable container of decoded elements.
pub trait SequenceDestination {
    /// Element type.
    type Element;

    /// Removes all elements.
    fn reset(&mut self);

    /// Appends an element to the back.
    fn push_element(&mut self, element: Self::Element);

    /// Returns the number of elements.
    fn len(&self) -> usize;

    /// Returns `true` if the container has no elements.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> SequenceDestination for Vec<T> {
    type Element = T;

    #[inline]
    fn reset(&mut self) {
        self.clear();
    }

    #[inline]
    fn push_element(&mut self, element: T) {
        self.push(element);
    }

    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl<T> SequenceDestination for VecDeque<T> {
    type Element = T;

    #[inline]
    fn reset(&mut self) {
        self.clear();
    }

    #[inline]
    fn push_element(&mut self, element: T) {
        self.push_back(element);
    }

    #[inline]
    fn len(&self) -> usize {
        VecDeque::len(self)
    }
}

impl<A: Array> SequenceDestination for SmallVec<A> {
    type Element = A::Item;

    #[inline]
    fn reset(&mut self) {
        self.clear();
    }

    #[inline]
    fn push_element(&mut self, element: A::Item) {
        self.push(element);
    }

    #[inline]
    fn len(&self) -> usize {
        SmallVec::len(self)
    }
}

/// An owning pointer to a decoded value.
pub trait Indirection: Deref<Target: Sized> {
    /// Moves the target behind a new pointer.
    fn from_target(target: Self::Target) -> Self;
}

impl<T> Indirection for Box<T> {
    #[inline]
    fn from_target(target: T) -> Self {
        Box::new(target)
    }
}

impl<T> Indirection for Rc<T> {
    #[inline]
    fn from_target(target: T) -> Self {
        Rc::new(target)
    }
}

impl<T> Indirection for Arc<T> {
    #[inline]
    fn from_target(target: T) -> Self {
        Arc::new(target)
    }
}

/// How a decoded base value is placed into a sequence element `E`.
pub trait ElementMode<E> {
    /// The shape each row is decoded into.
    type Base;

    /// Whether elements hold the base value behind an indirection.
    const BY_REFERENCE: bool;

    /// Converts a decoded base value into an element.
    fn place(base: Self::Base) -> E;
}

/// Elements are the decoded values themselves.
///
/// Primitives and pointers to primitives take this path unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByValue;

impl<E> ElementMode<E> for ByValue {
    type Base = E;

    const BY_REFERENCE: bool = false;

    #[inline]
    fn place(base: E) -> E {
        base
    }
}

/// Elements are indirections to the decoded values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByReference;

impl<E: Indirection> ElementMode<E> for ByReference {
    type Base = E::Target;

    const BY_REFERENCE: bool = true;

    #[inline]
    fn place(base: E::Target) -> E {
        E::from_target(base)
    }
}

/// Kinds of destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationKind {
    /// A single value.
    Scalar,
    /// A container of values.
    Sequence,
}

/// The shape of a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationMeta {
    /// Destination kind.
    kind: DestinationKind,
    /// Type name of the value decoded from each row.
    element_type: &'static str,
    /// Whether elements are stored behind an indirection.
    by_reference: bool,
}

impl DestinationMeta {
    /// Inspects a scalar destination of `T`.
    #[inline]
    pub fn scalar<T: ?Sized>() -> Self {
        Self {
            kind: DestinationKind::Scalar,
            element_type: any::type_name::<T>(),
            by_reference: false,
        }
    }

    /// Inspects a sequence destination `C` whose elements are placed by `M`.
    #[inline]
    pub fn sequence<C, M>() -> Self
    where
        C: SequenceDestination + ?Sized,
        M: ElementMode<C::Element>,
    {
        Self {
            kind: DestinationKind::Sequence,
            element_type: any::type_name::<M::Base>(),
            by_reference: M::BY_REFERENCE,
        }
    }

    /// Returns the destination kind.
    #[inline]
    pub fn kind(&self) -> DestinationKind {
        self.kind
    }

    /// Returns the type name of the value decoded from each row.
    #[inline]
    pub fn element_type(&self) -> &'static str {
        self.element_type
    }

    /// Returns `true` if elements are stored behind an indirection.
    #[inline]
    pub fn is_by_reference(&self) -> bool {
        self.by_reference
    }
}
