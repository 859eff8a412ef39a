//! Demo commands served by the `atcmd` binary.

use atcmd_core::{CmdError, CommandDescriptor, CommandParams, CommandType, RespFlags};

/// `ECHO`, `SUM`, `HEXDUMP` and `ERRTEST`.
pub fn demo_commands() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new("ECHO", "S(0~255)", 1, "<text>", echo),
        CommandDescriptor::new("SUM", "d,d", 2, "<a>,<b>", sum),
        CommandDescriptor::new("HEXDUMP", "A(1~64)", 1, "<hex bytes>", hexdump),
        CommandDescriptor::new("ERRTEST", "W", 1, "<error code>", errtest),
    ]
}

/// Reject everything but a validated exec.
fn exec_only(params: &CommandParams<'_>) -> bool {
    params.kind == CommandType::Exec && params.is_ok()
}

fn echo(params: &mut CommandParams<'_>) {
    if !exec_only(params) {
        return;
    }
    let text = params
        .arg(0)
        .and_then(|a| a.as_bytes())
        .map(String::from_utf8_lossy)
        .unwrap_or_default();
    params.respond(RespFlags::ALL, format_args!("+ECHO:{}", text));
}

fn sum(params: &mut CommandParams<'_>) {
    if !exec_only(params) {
        return;
    }
    match (
        params.arg(0).and_then(|a| a.as_i32()),
        params.arg(1).and_then(|a| a.as_i32()),
    ) {
        (Some(a), Some(b)) => {
            let total = a as i64 + b as i64;
            params.respond(RespFlags::ALL, format_args!("+SUM:{}", total));
        }
        // Empty fields decode without a value.
        _ => params.err = CmdError::WrongArgumentContent,
    }
}

fn hexdump(params: &mut CommandParams<'_>) {
    if !exec_only(params) {
        return;
    }
    match params.arg(0).and_then(|a| a.as_bytes()) {
        Some(bytes) if !bytes.is_empty() => {
            params.respond(RespFlags::PREFIX | RespFlags::PAYLOAD, format_args!("+HEXDUMP:"));
            params.respond_array(RespFlags::PAYLOAD | RespFlags::POSTFIX, bytes);
        }
        _ => params.err = CmdError::WrongArgumentContent,
    }
}

fn errtest(params: &mut CommandParams<'_>) {
    if !exec_only(params) {
        return;
    }
    match params.arg(0).and_then(|a| a.as_u16()) {
        Some(code) => params.fail(code),
        None => params.err = CmdError::WrongArgumentContent,
    }
}
