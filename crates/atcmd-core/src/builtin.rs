//! Built-in commands registered by every engine unless disabled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::command::{CommandDescriptor, CommandParams, CommandType};
use crate::framer::RespFlags;

pub const LISTCMDS: &str = "LISTCMDS";
pub const DEBUG: &str = "DEBUG";

/// `LISTCMDS` and `DEBUG`. `debug` is the flag `AT+DEBUG=<0|1>` writes.
pub fn builtin_commands(debug: Arc<AtomicBool>) -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new(LISTCMDS, "", 0, "<List all AT commands>", list_commands),
        CommandDescriptor::new(DEBUG, "B(0~1)", 1, "<1 or 0>", move |params| {
            set_debug(params, &debug)
        }),
    ]
}

fn list_commands(params: &mut CommandParams<'_>) {
    if params.kind != CommandType::Query || !params.is_ok() {
        return;
    }

    let registry = params.registry();
    log::debug!("{} AT commands available", registry.len());
    for cmd in registry.iter() {
        params.respond(
            RespFlags::PREFIX | RespFlags::PAYLOAD,
            format_args!("+{}:{}", cmd.name(), cmd.test_response()),
        );
    }
}

fn set_debug(params: &mut CommandParams<'_>, debug: &AtomicBool) {
    if params.kind != CommandType::Exec || !params.is_ok() {
        return;
    }

    // An empty argument turns the dump off.
    let on = params.arg(0).and_then(|arg| arg.as_u8()).unwrap_or(0) != 0;
    debug.store(on, Ordering::Relaxed);
    log::info!("argument dump {}", if on { "enabled" } else { "disabled" });
}
