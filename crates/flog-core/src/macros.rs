//! Print macros capturing the caller's source location.

/// Name of the enclosing function.
#[doc(hidden)]
#[macro_export]
macro_rules! __flog_function {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = name.strip_suffix("::f").unwrap_or(name);
        let name = name.trim_end_matches("::{{closure}}");
        match name.rfind("::") {
            Some(pos) => &name[pos + 2..],
            None => name,
        }
    }};
}

/// Source location of the macro call site, enclosing function included.
#[macro_export]
macro_rules! flog_source {
    () => {
        $crate::SourceInfo::new(file!(), line!(), $crate::__flog_function!())
    };
}

/// Print a message with source location.
///
/// ```
/// use flog_core::{flog_print, LogTree, MsgId, MsgType};
///
/// let mut tree = LogTree::default();
/// let log = tree.create_stdout("app", MsgType::ACCEPT_INFO);
/// flog_print!(tree, log, MsgType::INFO, "init", "starting").unwrap();
/// flog_print!(tree, log, MsgType::NOTE, "init", id = MsgId::MARK, "ready").unwrap();
/// ```
#[macro_export]
macro_rules! flog_print {
    ($tree:expr, $node:expr, $ty:expr, $subsystem:expr, id = $id:expr, $text:expr $(,)?) => {
        $tree.print_with_source(
            $node,
            Some($subsystem),
            $ty,
            $id,
            Some($text),
            Some($crate::flog_source!()),
        )
    };
    ($tree:expr, $node:expr, $ty:expr, $subsystem:expr, $text:expr $(,)?) => {
        $crate::flog_print!($tree, $node, $ty, $subsystem, id = $crate::MsgId::NONE, $text)
    };
}

/// Print a formatted message with source location.
///
/// The arguments are only formatted when some node would use the message.
#[macro_export]
macro_rules! flog_printf {
    ($tree:expr, $node:expr, $ty:expr, $subsystem:expr, id = $id:expr, $($arg:tt)+) => {
        $tree.print_fmt_with_source(
            $node,
            Some($subsystem),
            $ty,
            $id,
            format_args!($($arg)+),
            Some($crate::flog_source!()),
        )
    };
    ($tree:expr, $node:expr, $ty:expr, $subsystem:expr, $($arg:tt)+) => {
        $crate::flog_printf!($tree, $node, $ty, $subsystem, id = $crate::MsgId::NONE, $($arg)+)
    };
}

/// [`flog_print!`] in debug builds, `Ok(())` otherwise.
#[macro_export]
macro_rules! flog_dprint {
    ($($arg:tt)+) => {
        if cfg!(debug_assertions) {
            $crate::flog_print!($($arg)+)
        } else {
            ::std::result::Result::<(), $crate::FlogError>::Ok(())
        }
    };
}

/// [`flog_printf!`] in debug builds, `Ok(())` otherwise.
#[macro_export]
macro_rules! flog_dprintf {
    ($($arg:tt)+) => {
        if cfg!(debug_assertions) {
            $crate::flog_printf!($($arg)+)
        } else {
            ::std::result::Result::<(), $crate::FlogError>::Ok(())
        }
    };
}

/// Print an error carrying the expression text when `$cond` is false.
///
/// Never panics; the result of the print is returned.
#[macro_export]
macro_rules! flog_assert {
    ($tree:expr, $node:expr, $cond:expr $(,)?) => {
        if $cond {
            ::std::result::Result::<(), $crate::FlogError>::Ok(())
        } else {
            $tree.print_with_source(
                $node,
                None,
                $crate::MsgType::ERROR,
                $crate::MsgId::ASSERTION_FAILED,
                Some(stringify!($cond)),
                Some($crate::flog_source!()),
            )
        }
    };
}
