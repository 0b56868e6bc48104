// SPDX-License-Identifier: Apache-2.0 OR MIT
// The in-flight log record: a fixed 128-byte, move-only payload
//
// Layout (repr(C), alignment 16):
// - bytes 0-39:  level, submitting thread id, template pointer, vtable
// - bytes 48-127: inline argument storage (ARG_CAP = 80, alignment 16)
//
// Formatting intent is captured at the call site without allocating: the
// argument tuple is stored bit-for-bit in the record and a pair of function
// pointers monomorphized for the tuple's exact type renders and destroys it
// on the consumer side. Records with no captured arguments carry no vtable.

use crate::format::{self, Arguments};
use crate::level::Level;
use std::cell::Cell;
use std::marker::PhantomData;
use std::mem::{align_of, size_of, MaybeUninit};
use std::ptr;

/// Inline argument capacity in bytes.
///
/// Chosen so that metadata plus storage is exactly 128 bytes. Tuples larger
/// than this fail the build at the capture site.
pub const ARG_CAP: usize = 80;

/// Strictest alignment the inline storage supports
const ARG_ALIGN: usize = 16;

#[repr(C, align(16))]
struct ArgStorage {
    bytes: [MaybeUninit<u8>; ARG_CAP],
}

impl ArgStorage {
    const fn uninit() -> Self {
        ArgStorage {
            bytes: [MaybeUninit::uninit(); ARG_CAP],
        }
    }
}

/// Trampolines monomorphized for one captured tuple type
pub(crate) struct ArgVTable {
    /// Renders the stored tuple through a template
    format: unsafe fn(*const u8, &'static str, &mut String),
    /// Runs the stored tuple's destructors in place
    drop_in_place: unsafe fn(*mut u8),
}

unsafe fn format_raw<A: Arguments>(storage: *const u8, template: &'static str, out: &mut String) {
    // SAFETY: the caller guarantees `storage` holds a live `A`, written by
    // the `Record::new` instantiation that installed this trampoline
    let args = &*storage.cast::<A>();
    format::render(out, template, args);
}

unsafe fn drop_raw<A>(storage: *mut u8) {
    // SAFETY: as for `format_raw`; called at most once per stored value
    ptr::drop_in_place(storage.cast::<A>());
}

struct VTableFor<A>(PhantomData<A>);

impl<A: Arguments + Send + 'static> VTableFor<A> {
    const VTABLE: ArgVTable = ArgVTable {
        format: format_raw::<A>,
        drop_in_place: drop_raw::<A>,
    };
}

struct FitsInline<A>(PhantomData<A>);

impl<A> FitsInline<A> {
    // Evaluated at monomorphization: an oversized or over-aligned tuple is
    // a build failure at the capture site, never a runtime condition
    const CHECK: () = assert!(
        size_of::<A>() <= ARG_CAP && align_of::<A>() <= ARG_ALIGN,
        "captured log arguments exceed the record's inline capacity",
    );
}

/// One log event on its way from a producer to the consumer.
///
/// Move-only and `Send`; producers build it on their stack and the ring
/// relocates it bitwise. Dropping a record runs the destructors of any
/// captured arguments exactly once.
#[repr(C)]
pub struct Record {
    level: Level,
    thread_id: u64,
    template: &'static str,
    vtable: Option<&'static ArgVTable>,
    storage: ArgStorage,
    // Arguments are only required to be Send, so shared references to a
    // record must not cross threads
    _not_sync: PhantomData<Cell<()>>,
}

impl Record {
    /// Captures a record on the caller's stack.
    ///
    /// Stores `args` bit-for-bit in the inline buffer and installs the
    /// trampolines for its concrete type. Infallible at runtime; the only
    /// failure mode is the compile-time capacity check.
    #[inline]
    pub fn new<A>(level: Level, template: &'static str, args: A) -> Self
    where
        A: Arguments + Send + 'static,
    {
        let () = FitsInline::<A>::CHECK;

        let mut record = Record {
            level,
            thread_id: current_thread_id(),
            template,
            vtable: None,
            storage: ArgStorage::uninit(),
            _not_sync: PhantomData,
        };

        if args.count() > 0 {
            // SAFETY: the capacity check above guarantees `A` fits the
            // storage's size and alignment
            unsafe {
                ptr::write(record.storage.bytes.as_mut_ptr().cast::<A>(), args);
            }
            record.vtable = Some(&VTableFor::<A>::VTABLE);
        }

        record
    }

    /// Severity of this record
    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Identifier of the submitting thread, stable for that thread's lifetime
    #[inline]
    pub fn thread_id(&self) -> u64 {
        self.thread_id
    }

    /// The borrowed format template
    #[inline]
    pub fn template(&self) -> &'static str {
        self.template
    }

    /// Appends the rendered message (template plus captured arguments) to `out`
    pub fn render_into(&self, out: &mut String) {
        match self.vtable {
            // SAFETY: the storage holds the live tuple this trampoline was
            // monomorphized for
            Some(vtable) => unsafe {
                (vtable.format)(self.storage.bytes.as_ptr().cast(), self.template, out)
            },
            // No captured arguments: same renderer, empty argument list, so
            // brace escapes behave identically
            None => format::render(out, self.template, &()),
        }
    }
}

impl Drop for Record {
    fn drop(&mut self) {
        if let Some(vtable) = self.vtable.take() {
            // SAFETY: `take` clears the vtable, so the stored tuple is
            // destroyed at most once
            unsafe { (vtable.drop_in_place)(self.storage.bytes.as_mut_ptr().cast()) }
        }
    }
}

/// Get current thread ID, stable and rendering as a decimal u64
fn current_thread_id() -> u64 {
    #[cfg(target_os = "linux")]
    {
        unsafe { libc::gettid() as u64 }
    }
    #[cfg(not(target_os = "linux"))]
    {
        use std::sync::atomic::{AtomicU64, Ordering};
        static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);
        thread_local! {
            static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
        }
        THREAD_ID.with(|id| *id)
    }
}
