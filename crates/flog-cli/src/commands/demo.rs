//! Build the demo tree and print through it.
//!
//! `subfunc` forwards to `main`, which fans out to stdout (errors only),
//! stderr (everything) and a file log that has no file. The first message
//! makes the file log fail; the failure is reported through `main` and the
//! file log stays quiet afterwards.

use anyhow::Result;
use colored::Colorize;
use flog_core::config::TreeConfig;
use flog_core::{flog_assert, flog_print, flog_printf};
use flog_types::MsgType;

pub fn execute(config: &TreeConfig, self_test: bool) -> Result<()> {
    let mut demo = TreeConfig::demo();
    demo.settings = config.settings.clone();

    let mut built = demo.build()?;
    let main = built.node("main")?;
    let subfunc = built.node("subfunc")?;
    let tree = &mut built.tree;

    println!("{}", "-[flog demo start]-".cyan().bold());

    super::warn_on_output(flog_print!(tree, subfunc, MsgType::ERROR, "print_test", "testing..."))?;
    super::warn_on_output(flog_printf!(
        tree,
        subfunc,
        MsgType::INFO,
        "printf_test",
        "testing... {} {} {}",
        1,
        2,
        3
    ))?;

    let sum = 1 + 1;
    let difference = 1 - 1;
    super::warn_on_output(flog_assert!(tree, subfunc, sum != 0))?;
    super::warn_on_output(flog_assert!(tree, subfunc, difference != 0))?;

    if self_test {
        println!("{}", "-[flog self test]-".cyan().bold());
        super::warn_on_output(tree.self_test(main))?;
    }

    for name in ["subfunc", "main", "stdout", "stderr", "file"] {
        tree.destroy(built.nodes[name]);
    }
    Ok(())
}
