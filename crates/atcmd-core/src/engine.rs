//! The dispatcher.
//!
//! One [`Engine::process`] call runs a command to completion: extract the
//! command from the transport bytes, resolve it in the registry, classify the
//! suffix, decode the arguments, call the handler and emit the status line.
//! The engine owns the parameter store, so `&mut self` gives the single-flight
//! discipline; hosts with several threads share it behind a mutex.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use atcmd_parser::{ParamStore, ParserError, Tlv};

use crate::builtin::builtin_commands;
use crate::channel::{ChannelId, ChannelTable, Transport};
use crate::command::{CommandDescriptor, CommandParams, CommandType, Responder};
use crate::config::EngineConfig;
use crate::error::{CmdError, EngineError, EngineResult};
use crate::framer::{RespFlags, ResponseFramer};
use crate::registry::Registry;

/// AT command engine.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    registry: Registry,
    channels: ChannelTable,
    framer: ResponseFramer,
    store: ParamStore,
    debug: Arc<AtomicBool>,
}

impl Engine {
    /// Build an engine serving `commands` (plus the built-ins, if enabled).
    pub fn new(config: EngineConfig, mut commands: Vec<CommandDescriptor>) -> EngineResult<Self> {
        config.validate()?;

        let debug = Arc::new(AtomicBool::new(false));
        if config.builtins {
            commands.extend(builtin_commands(debug.clone()));
        }
        let registry = Registry::new(commands)?;
        log::debug!("registered {} AT commands", registry.len());

        Ok(Engine {
            channels: ChannelTable::new(config.max_channels),
            framer: ResponseFramer::new(&config),
            store: ParamStore::new(config.max_params),
            registry,
            config,
            debug,
        })
    }

    /// Allocate a channel. `emitter` receives every frame sent to it.
    pub fn alloc_channel<F>(&mut self, transport: Transport, emitter: F) -> EngineResult<ChannelId>
    where
        F: Fn(ChannelId, &[u8]) + Send + Sync + 'static,
    {
        self.channels.alloc(transport, Box::new(emitter))
    }

    /// Process one command received on `ch`.
    ///
    /// Protocol-level failures (unknown command, bad arguments) are answered
    /// with a status line on the channel. Calls that cannot be answered at all
    /// return an error without emitting anything. Unknown commands and
    /// missing verbs do both.
    pub fn process(&mut self, ch: ChannelId, data: &[u8]) -> EngineResult<()> {
        if data.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let Engine {
            config,
            registry,
            channels,
            framer,
            store,
            debug,
        } = self;

        let channel = channels.get(ch).ok_or(EngineError::InvalidChannel(ch))?;
        let responder = Responder::new(ch, channel, framer);

        let Some(input) = channel.transport().extract(ch, data, &config.header) else {
            log::debug!("ch {}: no command header in {:?}", ch, String::from_utf8_lossy(data));
            responder.status(CmdError::NotSupported, "", 0);
            return Err(EngineError::NotSupported);
        };
        if input.is_empty() {
            responder.status(CmdError::NoError, "", 0);
            return Ok(());
        }

        log::debug!("ch {}: CMD ({})", ch, String::from_utf8_lossy(input));
        let Some(cmd) = registry.lookup(input) else {
            atcmd_metrics::record_unknown_command();
            responder.status(CmdError::NotSupported, "", 0);
            return Err(EngineError::NotSupported);
        };

        let kind = match &input[cmd.name().len()..] {
            b"" => {
                responder.status(CmdError::NotSupported, cmd.name(), 0);
                return Err(EngineError::MissingVerb(cmd.name().to_string()));
            }
            b"?" => CommandType::Query,
            b"=?" => CommandType::Test,
            [b'=', ..] => CommandType::Exec,
            _ => {
                responder.status(CmdError::NotSupported, cmd.name(), 0);
                return Err(EngineError::NotSupported);
            }
        };

        let outcome = match kind {
            CommandType::Test => {
                responder.concat(
                    RespFlags::ALL,
                    format_args!("+{}:{}", cmd.name(), cmd.test_response()),
                );
                (CmdError::NoError, 0)
            }
            CommandType::Query => {
                // Queries always report OK; the handler's status is not used.
                let mut params = CommandParams::new(kind, cmd, &[], responder, registry);
                cmd.invoke(&mut params);
                (CmdError::NoError, 0)
            }
            CommandType::Exec => {
                let args = &input[cmd.name().len() + 1..];
                let residue = match store.validate(args, cmd.specs()) {
                    Ok(()) => false,
                    Err(ParserError::MoreData) => true,
                    Err(ParserError::Busy) => {
                        log::error!("ch {}: {} aborted: parameter store busy", ch, cmd.name());
                        return Err(ParserError::Busy.into());
                    }
                    Err(e) => {
                        log::error!("ch {}: {} aborted: {}", ch, cmd.name(), e);
                        store.clear();
                        return Err(e.into());
                    }
                };

                let mut params = CommandParams::new(kind, cmd, store.params(), responder, registry);
                check_args(&mut params);
                if debug.load(Ordering::Relaxed) {
                    dump_args(cmd.name(), &params.args[..params.argc as usize]);
                }
                if residue {
                    params.data_residue = true;
                    params.err = CmdError::WrongArgumentCount;
                }

                cmd.invoke(&mut params);
                let outcome = (params.err, params.app_err);
                store.clear();
                outcome
            }
        };

        let (err, app_err) = outcome;
        record_dispatch(cmd.name(), kind, err);
        responder.status(err, cmd.name(), app_err);
        Ok(())
    }

    /// Emit formatted text on `ch`.
    pub fn respond(&self, ch: ChannelId, flags: RespFlags, args: fmt::Arguments<'_>) -> EngineResult<()> {
        self.responder(ch)?.concat(flags, args);
        Ok(())
    }

    /// Emit `data` as upper-case hex on `ch`.
    pub fn respond_array(&self, ch: ChannelId, flags: RespFlags, data: &[u8]) -> EngineResult<()> {
        self.responder(ch)?.array(flags, data);
        Ok(())
    }

    /// Emit `data` on `ch` without framing.
    pub fn respond_raw(&self, ch: ChannelId, data: &[u8]) -> EngineResult<()> {
        self.responder(ch)?.raw(data);
        Ok(())
    }

    fn responder(&self, ch: ChannelId) -> EngineResult<Responder<'_>> {
        let channel = self.channels.get(ch).ok_or(EngineError::InvalidChannel(ch))?;
        Ok(Responder::new(ch, channel, &self.framer))
    }

    /// Number of registered commands, built-ins included.
    pub fn command_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether decoded arguments are dumped on every exec.
    pub fn debug_enabled(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub fn set_debug(&self, on: bool) {
        self.debug.store(on, Ordering::Relaxed);
    }

    /// The parameter store; empty between calls.
    pub fn store(&self) -> &ParamStore {
        &self.store
    }
}

/// Arity check, then first-failure scan of the decoded values.
fn check_args(params: &mut CommandParams<'_>) {
    let num = params.args.len() as u16;
    if num != params.argc {
        log::debug!("{}: expected {} arguments, got {}", params.name(), params.argc, num);
        params.argc = num;
        params.err = CmdError::WrongArgumentCount;
        return;
    }

    if let Some((idx, arg)) = params
        .args
        .iter()
        .enumerate()
        .find(|(_, arg)| !arg.status().is_acceptable())
    {
        log::debug!("{}: argument {} rejected ({})", params.name(), idx, arg.status());
        params.err = CmdError::WrongArgumentTypeOrRange;
    }
}

fn dump_args(name: &str, args: &[Tlv]) {
    for (idx, arg) in args.iter().enumerate() {
        log::info!("{}[{}] {}", name, idx, arg);
    }
}

fn record_dispatch(name: &str, kind: CommandType, err: CmdError) {
    let failed = (!err.is_ok()).then_some(err.code());
    atcmd_metrics::record_dispatch(name, kind.as_str(), failed);
}
