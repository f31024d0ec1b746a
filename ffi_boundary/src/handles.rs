//! Handle tables. Anything Rust allocates on behalf of the host lives
//! in one of these tables and is reached through an `i64` handle, the
//! same way connection and table handles are passed around elsewhere.
//!
//! A handle packs a [`HandleKind`] tag into its top byte and a
//! per-kind serial into the remaining 56 bits. Serials start at 1 and
//! are never reused, so a table can tell apart a handle that was never
//! issued, one that belongs to another table, and one that has already
//! been released, without remembering every released handle.

use crate::errors::{BoundaryError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use strum::FromRepr;

const SERIAL_BITS: u32 = 56;
const SERIAL_MASK: i64 = (1 << SERIAL_BITS) - 1;

/// What a handle points at. Stored in the top byte of the handle.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, FromRepr, strum::Display)]
#[repr(u8)]
pub enum HandleKind {
    /// A string handed to the host by a string-returning call.
    RustString = 1,
    /// A `TestStruct` aggregate.
    TestStruct = 2,
    /// A `TestStruct2` aggregate.
    TestStruct2 = 3,
}

/// Strong type to wrap an i64 as a handle.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct RawHandle(pub i64);

impl RawHandle {
    fn compose(kind: HandleKind, serial: i64) -> Self {
        Self(((kind as i64) << SERIAL_BITS) | (serial & SERIAL_MASK))
    }

    /// The kind tag, if it is one we know about.
    pub fn kind(self) -> Option<HandleKind> {
        if self.0 <= 0 {
            return None;
        }
        HandleKind::from_repr((self.0 >> SERIAL_BITS) as u8)
    }

    /// The per-kind serial number.
    pub fn serial(self) -> i64 {
        self.0 & SERIAL_MASK
    }
}

struct Slot<T> {
    value: T,
    created_at: DateTime<Utc>,
}

/// A live handle found while building a leak report.
#[derive(Debug, Clone)]
pub struct LiveHandle {
    /// The handle itself.
    pub handle: RawHandle,
    /// What it points at.
    pub kind: HandleKind,
    /// When it was issued.
    pub created_at: DateTime<Utc>,
}

/// Maps handles of a single [`HandleKind`] to the values they own.
pub struct HandleTable<T> {
    kind: HandleKind,
    limit: usize,
    next_serial: AtomicI64,
    slots: Mutex<HashMap<i64, Slot<T>>>,
}

impl<T> HandleTable<T> {
    /// Create an empty table that will hold at most `limit` live values.
    pub fn new(kind: HandleKind, limit: usize) -> Self {
        Self {
            kind,
            limit,
            next_serial: AtomicI64::new(1),
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, Slot<T>>> {
        // Nothing runs under the lock that can leave a slot half-written.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take ownership of `value` and issue a new handle for it.
    pub fn insert(&self, value: T, call: &'static str) -> Result<RawHandle> {
        let mut slots = self.lock();
        if slots.len() >= self.limit {
            return Err(BoundaryError::HandleLimit {
                call,
                kind: self.kind,
                limit: self.limit,
            });
        }
        let serial = self.next_serial.fetch_add(1, Ordering::SeqCst);
        slots.insert(
            serial,
            Slot {
                value,
                created_at: Utc::now(),
            },
        );
        let handle = RawHandle::compose(self.kind, serial);
        tracing::trace!(call, kind = %self.kind, handle = handle.0, "handle issued");
        Ok(handle)
    }

    /// Check the tag, returning the serial to look up.
    fn serial_of(&self, handle: RawHandle, call: &'static str) -> Result<i64> {
        match handle.kind() {
            Some(kind) if kind == self.kind => {}
            Some(found) => {
                return Err(BoundaryError::WrongKind {
                    call,
                    handle: handle.0,
                    expected: self.kind,
                    found,
                })
            }
            None => {
                return Err(BoundaryError::UnknownHandle {
                    call,
                    handle: handle.0,
                })
            }
        }
        let serial = handle.serial();
        if serial == 0 || serial >= self.next_serial.load(Ordering::SeqCst) {
            return Err(BoundaryError::UnknownHandle {
                call,
                handle: handle.0,
            });
        }
        Ok(serial)
    }

    fn missing(&self, handle: RawHandle, call: &'static str) -> BoundaryError {
        // The serial was issued (checked in serial_of), so absence means released.
        BoundaryError::Released {
            call,
            kind: self.kind,
            handle: handle.0,
        }
    }

    /// Borrow the value behind `handle`.
    pub fn with<R>(
        &self,
        handle: RawHandle,
        call: &'static str,
        f: impl FnOnce(&T) -> R,
    ) -> Result<R> {
        let serial = self.serial_of(handle, call)?;
        let slots = self.lock();
        match slots.get(&serial) {
            Some(slot) => Ok(f(&slot.value)),
            None => Err(self.missing(handle, call)),
        }
    }

    /// Mutably borrow the value behind `handle`.
    pub fn with_mut<R>(
        &self,
        handle: RawHandle,
        call: &'static str,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R> {
        let serial = self.serial_of(handle, call)?;
        let mut slots = self.lock();
        match slots.get_mut(&serial) {
            Some(slot) => Ok(f(&mut slot.value)),
            None => Err(self.missing(handle, call)),
        }
    }

    /// Release `handle`, handing back the value it owned.
    pub fn release(&self, handle: RawHandle, call: &'static str) -> Result<T> {
        let serial = self.serial_of(handle, call)?;
        let removed = self.lock().remove(&serial);
        match removed {
            Some(slot) => {
                tracing::trace!(call, kind = %self.kind, handle = handle.0, "handle released");
                Ok(slot.value)
            }
            None => Err(self.missing(handle, call)),
        }
    }

    /// Number of handles issued and not yet released.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    /// Every live handle, oldest first.
    pub fn live_handles(&self) -> Vec<LiveHandle> {
        let mut live: Vec<LiveHandle> = self
            .lock()
            .iter()
            .map(|(serial, slot)| LiveHandle {
                handle: RawHandle::compose(self.kind, *serial),
                kind: self.kind,
                created_at: slot.created_at,
            })
            .collect();
        live.sort_by_key(|h| h.handle.serial());
        live
    }
}

impl<T: Clone> HandleTable<T> {
    /// Clone the value behind `handle` out of the table.
    pub fn get_cloned(&self, handle: RawHandle, call: &'static str) -> Result<T> {
        self.with(handle, call, T::clone)
    }
}
