// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Cell types for single-threaded peripheral driver state.

use core::cell::Cell;

/// A shared reference to a mutable reference.
///
/// A `TakeCell` wraps potential reference to mutable memory that may be
/// available at a given point. Rather than obtaining a reference to the value,
/// the holder may `take` it for themselves, returning a `None` to the cell.
/// Holders seldom do this directly though; instead they use `map`, which
/// temporarily takes the value, operates on it, and replaces it.
pub struct TakeCell<'a, T: 'a + ?Sized> {
    val: Cell<Option<&'a mut T>>,
}

impl<'a, T: ?Sized> TakeCell<'a, T> {
    pub const fn empty() -> TakeCell<'a, T> {
        TakeCell {
            val: Cell::new(None),
        }
    }

    /// Creates a new `TakeCell` containing `value`
    pub fn new(value: &'a mut T) -> TakeCell<'a, T> {
        TakeCell {
            val: Cell::new(Some(value)),
        }
    }

    pub fn is_none(&self) -> bool {
        !self.is_some()
    }

    pub fn is_some(&self) -> bool {
        let took = self.val.take();
        let ret = took.is_some();
        self.val.set(took);
        ret
    }

    /// Takes the potential reference out of the `TakeCell` leaving a `None` in
    /// its place.
    pub fn take(&self) -> Option<&'a mut T> {
        self.val.take()
    }

    /// Stores `val` in the `TakeCell`.
    pub fn put(&self, val: Option<&'a mut T>) {
        self.val.set(val);
    }

    /// Replaces the contents of the `TakeCell` with `val`.
    pub fn replace(&self, val: &'a mut T) -> Option<&'a mut T> {
        self.val.replace(Some(val))
    }

    /// Allows `closure` to borrow the contents of the `TakeCell` if-and-only-if
    /// it is not `take`n already.
    pub fn map<F, R>(&self, closure: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let maybe_val = self.take();
        maybe_val.map(|val| {
            let res = closure(val);
            self.put(Some(val));
            res
        })
    }

    /// Performs a `map` or returns a default value if the `TakeCell` is empty.
    pub fn map_or<F, R>(&self, default: R, closure: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        self.map(closure).unwrap_or(default)
    }
}

/// A shared reference to an optional value.
///
/// `OptionalCell` is a `Cell<Option<T>>` with convenience functions that make
/// it more readable at the call site. Drivers use it for client references and
/// small pieces of pending-operation state.
pub struct OptionalCell<T> {
    value: Cell<Option<T>>,
}

impl<T> OptionalCell<T> {
    /// Create a new OptionalCell.
    pub const fn new(val: T) -> OptionalCell<T> {
        OptionalCell {
            value: Cell::new(Some(val)),
        }
    }

    /// Create an empty `OptionalCell` (contains just `None`).
    pub const fn empty() -> OptionalCell<T> {
        OptionalCell {
            value: Cell::new(None),
        }
    }

    /// Check if the cell contains something.
    pub fn is_some(&self) -> bool {
        let set = self.value.take();
        let ret = set.is_some();
        self.value.set(set);
        ret
    }

    /// Check if the cell is None.
    pub fn is_none(&self) -> bool {
        !self.is_some()
    }

    /// Update the stored value.
    pub fn set(&self, val: T) {
        self.value.set(Some(val));
    }

    /// Reset the stored value to `None`.
    pub fn clear(&self) {
        self.value.set(None);
    }

    /// Returns the contained value and replaces it with None.
    pub fn take(&self) -> Option<T> {
        self.value.take()
    }

    /// Replaces the contained value with `val`, returning the old value.
    pub fn replace(&self, val: T) -> Option<T> {
        self.value.replace(Some(val))
    }

    /// Call a closure on the value if the value exists.
    pub fn map<F, R>(&self, closure: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        let maybe_val = self.value.take();
        maybe_val.map(|val| {
            let res = closure(&val);
            self.value.set(Some(val));
            res
        })
    }

    /// Call a closure on the value if the value exists, or return the default
    /// if it does not.
    pub fn map_or<F, R>(&self, default: R, closure: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.map(closure).unwrap_or(default)
    }
}

impl<T: Copy> OptionalCell<T> {
    /// Returns a copy of the contained option.
    pub fn get(&self) -> Option<T> {
        self.value.get()
    }

    /// Returns the contained value or a default.
    pub fn unwrap_or(&self, default: T) -> T {
        self.value.get().unwrap_or(default)
    }
}
