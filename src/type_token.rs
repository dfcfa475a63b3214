//! Type tags and type-erased element helpers.
//!
//! Stages are stored as type-erased descriptors so a single [`Stage`](crate::node::Stage)
//! enum can describe `map` calls that change the element type. Elements travel
//! between cursors as [`Item`]s and are downcast back to their concrete type by
//! the typed closures that [`Pipeline`](crate::Pipeline) installs.
//!
//! - [`TypeTag`]: runtime type identifier attached to sources for diagnostics.
//! - [`VecOps`]: type-erased view over a source `Vec<T>` (length and element
//!   access), produced by [`vec_ops_for`].

use crate::error::{Result, StreamError};
use std::any::{Any, TypeId, type_name};
use std::marker::PhantomData;
use std::sync::Arc;

/// A single element carried between cursors at runtime.
pub type Item = Box<dyn Any + Send>;

/// A lightweight runtime type tag for debugging and assertions.
///
/// ```
/// use ironstream::type_token::TypeTag;
/// let tag = TypeTag::of::<u32>();
/// assert_eq!(tag.name, "u32");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeTag {
    /// Stable Rust type identifier.
    pub id: TypeId,
    /// Human-readable type name (best-effort).
    pub name: &'static str,
}

impl TypeTag {
    /// Construct a tag for `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }
}

/// Type-erased helpers for a source `Vec<T>`.
///
/// Implementations return `None` when `data` is not the `Vec<T>` they expect.
pub trait VecOps: Send + Sync {
    /// Number of elements if `data` is a `Vec<T>`.
    fn len(&self, data: &dyn Any) -> Option<usize>;

    /// Clone the element at `idx` into an [`Item`]; `None` past the end.
    fn item_at(&self, data: &dyn Any, idx: usize) -> Option<Item>;
}

/// Concrete `VecOps` for a specific `T`.
pub struct VecOpsImpl<T: Clone + Send + Sync + 'static>(PhantomData<T>);

impl<T: Clone + Send + Sync + 'static> VecOps for VecOpsImpl<T> {
    fn len(&self, data: &dyn Any) -> Option<usize> {
        data.downcast_ref::<Vec<T>>().map(Vec::len)
    }

    fn item_at(&self, data: &dyn Any, idx: usize) -> Option<Item> {
        data.downcast_ref::<Vec<T>>()?
            .get(idx)
            .map(|t| Box::new(t.clone()) as Item)
    }
}

/// Create a type-erased `VecOps` for `Vec<T>`.
///
/// ```
/// use ironstream::type_token::{vec_ops_for, VecOps};
///
/// let ops = vec_ops_for::<i64>();
/// let data = vec![1i64, 2, 3];
/// assert_eq!(ops.len(&data), Some(3));
/// assert!(ops.item_at(&data, 3).is_none());
/// ```
pub fn vec_ops_for<T: Clone + Send + Sync + 'static>() -> Arc<dyn VecOps> {
    Arc::new(VecOpsImpl::<T>(PhantomData))
}

/// Borrow the concrete value behind an [`Item`].
pub(crate) fn downcast_ref<T: 'static>(item: &Item) -> Result<&T> {
    item.downcast_ref::<T>().ok_or(StreamError::TypeMismatch {
        expected: type_name::<T>(),
    })
}

/// Take ownership of the concrete value behind an [`Item`].
pub(crate) fn downcast<T: 'static>(item: Item) -> Result<T> {
    item.downcast::<T>()
        .map(|b| *b)
        .map_err(|_| StreamError::TypeMismatch {
            expected: type_name::<T>(),
        })
}
