//! Printing a message nobody uses must not allocate.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use flog_core::output::MemorySink;
use flog_core::{flog_printf, FlogConfig, LogTree, MsgId, MsgType};

struct Counting;

thread_local! {
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let _ = ALLOCATIONS.try_with(|count| count.set(count.get() + 1));
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

fn allocations() -> usize {
    ALLOCATIONS.with(Cell::get)
}

#[test]
fn unused_print_does_not_allocate() {
    let mut tree = LogTree::new(FlogConfig::default());
    let main = tree.create("main", MsgType::ACCEPT_ALL);
    let errors = tree.create("errors", MsgType::ACCEPT_ERROR_AND_WARNING);
    let sink = MemorySink::new();
    tree.set_sink(errors, sink.clone()).unwrap();
    tree.append_child(main, errors).unwrap();
    tree.append_child(errors, main).unwrap();

    let before = allocations();
    for _ in 0..10 {
        tree.print(main, Some("loop"), MsgType::DEBUG, MsgId::NONE, Some("not wanted")).unwrap();
        flog_printf!(tree, main, MsgType::VERBOSE, "loop", "{} {}", "still", "not wanted").unwrap();
    }
    assert_eq!(allocations(), before);

    tree.print(main, Some("loop"), MsgType::ERROR, MsgId::NONE, Some("wanted")).unwrap_err();
    assert!(allocations() > before);
    assert_eq!(sink.len(), 1);
}
