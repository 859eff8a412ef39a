//! End-to-end dispatch tests.
//!
//! These drive the public engine API with a capturing emitter and check the
//! exact bytes each command produces on its channel.

use std::sync::{Arc, Mutex};

use atcmd_core::parser::{Kind, TlvStatus};
use atcmd_core::{
    ChannelId, CmdError, CommandDescriptor, CommandType, Engine, EngineConfig, EngineError,
    RespFlags, Transport,
};

type Frames = Arc<Mutex<Vec<Vec<u8>>>>;

/// What the last handler invocation saw.
#[derive(Debug, Default, Clone)]
struct Seen {
    kind: Option<CommandType>,
    err: Option<CmdError>,
    argc: u16,
    residue: bool,
    values: Vec<(Kind, TlvStatus, Option<i64>)>,
}

fn recording(
    name: &str,
    format: &str,
    arity: u16,
    seen: Arc<Mutex<Seen>>,
) -> CommandDescriptor {
    CommandDescriptor::new(name, format, arity, "<recording>", move |p| {
        let mut s = seen.lock().unwrap();
        s.kind = Some(p.kind);
        s.err = Some(p.err);
        s.argc = p.argc;
        s.residue = p.data_residue;
        s.values = p
            .args
            .iter()
            .map(|a| (a.kind(), a.status(), a.as_i64()))
            .collect();
    })
}

fn engine(config: EngineConfig, commands: Vec<CommandDescriptor>, transport: Transport) -> (Engine, ChannelId, Frames) {
    let mut engine = Engine::new(config, commands).unwrap();
    let frames: Frames = Arc::default();
    let sink = frames.clone();
    let ch = engine
        .alloc_channel(transport, move |_, data| sink.lock().unwrap().push(data.to_vec()))
        .unwrap();
    (engine, ch, frames)
}

fn drain(frames: &Frames) -> Vec<String> {
    frames
        .lock()
        .unwrap()
        .drain(..)
        .map(|f| String::from_utf8(f).unwrap())
        .collect()
}

// ============================================================================
// DEBUG built-in
// ============================================================================

#[test]
fn test_debug_exec_ok() {
    let (mut engine, ch, frames) = engine(EngineConfig::default(), Vec::new(), Transport::Raw);

    engine.process(ch, b"DEBUG=1").unwrap();

    assert!(engine.debug_enabled());
    assert_eq!(drain(&frames), ["\r\nOK\r\n"]);
}

#[test]
fn test_debug_out_of_range() {
    let (mut engine, ch, frames) = engine(EngineConfig::default(), Vec::new(), Transport::Raw);

    engine.process(ch, b"DEBUG=2").unwrap();

    assert!(!engine.debug_enabled());
    assert_eq!(drain(&frames), ["\r\nERR:4\r\n"]);
}

#[test]
fn test_debug_empty_argument_disables() {
    let (mut engine, ch, frames) = engine(EngineConfig::default(), Vec::new(), Transport::Raw);

    engine.process(ch, b"DEBUG=1").unwrap();
    assert!(engine.debug_enabled());
    drain(&frames);

    engine.process(ch, b"DEBUG=").unwrap();

    assert!(!engine.debug_enabled());
    assert_eq!(drain(&frames), ["\r\nOK\r\n"]);
}

#[test]
fn test_debug_test_string() {
    let (mut engine, ch, frames) = engine(EngineConfig::default(), Vec::new(), Transport::Raw);

    engine.process(ch, b"DEBUG=?").unwrap();

    assert_eq!(drain(&frames), ["\r\n+DEBUG:<1 or 0>\r\n", "\r\nOK\r\n"]);
}

#[test]
fn test_unknown_command() {
    let (mut engine, ch, frames) = engine(EngineConfig::default(), Vec::new(), Transport::Raw);

    assert!(matches!(engine.process(ch, b"BOGUS?"), Err(EngineError::NotSupported)));
    assert_eq!(drain(&frames), ["\r\nERR:1\r\n"]);
}

// ============================================================================
// Argument validation
// ============================================================================

#[test]
fn test_handler_sees_decoded_value() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let cmd = recording("SET", "B(0~1)", 1, seen.clone());
    let (mut engine, ch, frames) = engine(EngineConfig::default(), vec![cmd], Transport::Raw);

    engine.process(ch, b"SET=1").unwrap();

    let s = seen.lock().unwrap();
    assert_eq!(s.kind, Some(CommandType::Exec));
    assert_eq!(s.err, Some(CmdError::NoError));
    assert_eq!(s.values, [(Kind::U8, TlvStatus::Ok, Some(1))]);
    assert_eq!(drain(&frames), ["\r\nOK\r\n"]);
}

#[test]
fn test_arity_mismatch_corrects_count() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let cmd = recording("PAIR", "B,B", 2, seen.clone());
    let (mut engine, ch, frames) = engine(EngineConfig::default(), vec![cmd], Transport::Raw);

    engine.process(ch, b"PAIR=5").unwrap();

    let s = seen.lock().unwrap();
    assert_eq!(s.err, Some(CmdError::WrongArgumentCount));
    assert_eq!(s.argc, 1);
    assert_eq!(drain(&frames), ["\r\nERR:2\r\n"]);
}

#[test]
fn test_residue_forces_wrong_count() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let cmd = recording("ONE", "B", 1, seen.clone());
    let (mut engine, ch, frames) = engine(EngineConfig::default(), vec![cmd], Transport::Raw);

    engine.process(ch, b"ONE=1,2").unwrap();

    let s = seen.lock().unwrap();
    assert!(s.residue);
    assert_eq!(s.err, Some(CmdError::WrongArgumentCount));
    assert_eq!(drain(&frames), ["\r\nERR:2\r\n"]);
}

#[test]
fn test_first_bad_field_fails_command() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let cmd = recording("MIX", "S,D(~1000),A(2~5)", 3, seen.clone());
    let (mut engine, ch, frames) = engine(EngineConfig::default(), vec![cmd], Transport::Raw);

    engine.process(ch, b"MIX=abc,1001,0A0B").unwrap();

    let s = seen.lock().unwrap();
    assert_eq!(s.err, Some(CmdError::WrongArgumentTypeOrRange));
    assert_eq!(s.values[1].1, TlvStatus::RangeExceeded);
    assert_eq!(drain(&frames), ["\r\nERR:4\r\n"]);
}

#[test]
fn test_empty_field_is_accepted() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let cmd = recording("OPT", "B,W", 2, seen.clone());
    let (mut engine, ch, frames) = engine(EngineConfig::default(), vec![cmd], Transport::Raw);

    engine.process(ch, b"OPT=,7").unwrap();

    let s = seen.lock().unwrap();
    assert_eq!(s.err, Some(CmdError::NoError));
    assert_eq!(s.values[0].1, TlvStatus::Empty);
    assert_eq!(drain(&frames), ["\r\nOK\r\n"]);
}

#[test]
fn test_store_clear_between_calls() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let cmd = recording("ONE", "B", 1, seen);
    let (mut engine, ch, _frames) = engine(EngineConfig::default(), vec![cmd], Transport::Raw);

    for _ in 0..3 {
        engine.process(ch, b"ONE=1").unwrap();
        assert!(engine.store().is_clear());
        assert_eq!(engine.store().len(), 0);
    }
}

// ============================================================================
// Handler-reported errors
// ============================================================================

#[test]
fn test_specific_error() {
    let cmd = CommandDescriptor::new("FAIL", "W", 1, "<code>", |p| {
        if let Some(code) = p.arg(0).and_then(|a| a.as_u16()) {
            p.fail(code);
        }
    });
    let (mut engine, ch, frames) = engine(EngineConfig::default(), vec![cmd], Transport::Raw);

    engine.process(ch, b"FAIL=42").unwrap();

    assert_eq!(drain(&frames), ["\r\n+FAIL:2A\r\n", "\r\nERR\r\n"]);
}

#[test]
fn test_query_runs_handler_without_args() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let cmd = recording("STATE", "B", 1, seen.clone());
    let (mut engine, ch, frames) = engine(EngineConfig::default(), vec![cmd], Transport::Raw);

    engine.process(ch, b"STATE?").unwrap();

    let s = seen.lock().unwrap();
    assert_eq!(s.kind, Some(CommandType::Query));
    assert!(s.values.is_empty());
    assert_eq!(drain(&frames), ["\r\nOK\r\n"]);
}

#[test]
fn test_query_ignores_handler_status() {
    let cmd = CommandDescriptor::new("LOCKED", "B", 1, "<0|1>", |p| {
        if p.kind == CommandType::Query {
            p.respond(RespFlags::ALL, format_args!("+LOCKED:1"));
            p.fail(3);
        }
    });
    let (mut engine, ch, frames) = engine(EngineConfig::default(), vec![cmd], Transport::Raw);

    engine.process(ch, b"LOCKED?").unwrap();

    assert_eq!(drain(&frames), ["\r\n+LOCKED:1\r\n", "\r\nOK\r\n"]);
}

// ============================================================================
// LISTCMDS built-in
// ============================================================================

#[test]
fn test_list_commands() {
    let cmd = CommandDescriptor::new("ECHO", "S", 1, "<text>", |_| {});
    let (mut engine, ch, frames) = engine(EngineConfig::default(), vec![cmd], Transport::Raw);

    engine.process(ch, b"LISTCMDS?").unwrap();

    assert_eq!(
        drain(&frames),
        [
            "\r\n+DEBUG:<1 or 0>",
            "\r\n+ECHO:<text>",
            "\r\n+LISTCMDS:<List all AT commands>",
            "\r\nOK\r\n",
        ]
    );
}

// ============================================================================
// Transports and channels
// ============================================================================

#[test]
fn test_uart_transport() {
    let (mut engine, ch, frames) = engine(EngineConfig::default(), Vec::new(), Transport::Uart);

    engine.process(ch, b"AT").unwrap();
    engine.process(ch, b"AT+DEBUG=?").unwrap();
    assert!(engine.process(ch, b"DEBUG=?").is_err());

    assert_eq!(
        drain(&frames),
        ["\r\nOK\r\n", "\r\n+DEBUG:<1 or 0>\r\n", "\r\nOK\r\n", "\r\nERR:1\r\n"]
    );
}

fn strip_hash(_: ChannelId, data: &[u8]) -> Option<&[u8]> {
    data.strip_prefix(b"#")
}

#[test]
fn test_custom_transport() {
    let (mut engine, ch, frames) =
        engine(EngineConfig::default(), Vec::new(), Transport::Custom(Box::new(strip_hash)));

    engine.process(ch, b"#DEBUG=1").unwrap();

    assert_eq!(drain(&frames), ["\r\nOK\r\n"]);
}

#[test]
fn test_channels_are_independent() {
    let mut engine = Engine::new(EngineConfig::default(), Vec::new()).unwrap();
    let a: Frames = Arc::default();
    let b: Frames = Arc::default();
    let (sa, sb) = (a.clone(), b.clone());
    let ca = engine
        .alloc_channel(Transport::Raw, move |_, d| sa.lock().unwrap().push(d.to_vec()))
        .unwrap();
    let cb = engine
        .alloc_channel(Transport::Uart, move |_, d| sb.lock().unwrap().push(d.to_vec()))
        .unwrap();

    engine.process(cb, b"AT+BOGUS=1").ok();
    engine.process(ca, b"DEBUG=0").unwrap();

    assert_eq!(drain(&a), ["\r\nOK\r\n"]);
    assert_eq!(drain(&b), ["\r\nERR:1\r\n"]);
}

#[test]
fn test_channel_pool_exhaustion() {
    let config = EngineConfig {
        max_channels: 2,
        ..Default::default()
    };
    let mut engine = Engine::new(config, Vec::new()).unwrap();

    assert!(engine.alloc_channel(Transport::Raw, |_, _| {}).is_ok());
    assert!(engine.alloc_channel(Transport::Raw, |_, _| {}).is_ok());
    assert!(matches!(
        engine.alloc_channel(Transport::Raw, |_, _| {}),
        Err(EngineError::NoChannelAvailable { max: 2 })
    ));
}

// ============================================================================
// Framing
// ============================================================================

#[test]
fn test_long_response_truncated() {
    let cmd = CommandDescriptor::new("LONG", "", 0, "", |p| {
        p.respond(RespFlags::ALL, format_args!("{}", "X".repeat(100)));
    });
    let config = EngineConfig {
        max_response_len: 32,
        ..Default::default()
    };
    let (mut engine, ch, frames) = engine(config, vec![cmd], Transport::Raw);

    engine.process(ch, b"LONG?").unwrap();

    let out = drain(&frames);
    assert_eq!(out[0].len(), 32);
    assert!(out[0].starts_with("\r\nXXX"));
    assert_eq!(out[1], "\r\nOK\r\n");
}

#[test]
fn test_engine_side_responses() {
    let (engine, ch, frames) = engine(EngineConfig::default(), Vec::new(), Transport::Raw);

    engine.respond(ch, RespFlags::ALL, format_args!("+EVT:{}", 3)).unwrap();
    engine.respond_array(ch, RespFlags::PAYLOAD, &[0xDE, 0xAD]).unwrap();
    engine.respond_raw(ch, b"raw").unwrap();
    assert!(engine.respond_raw(ChannelId::new(1), b"raw").is_err());

    assert_eq!(drain(&frames), ["\r\n+EVT:3\r\n", "DEAD", "raw"]);
}
