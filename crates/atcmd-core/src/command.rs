//! Command descriptors and the handler interface.

use std::fmt;
use std::sync::Arc;

use atcmd_parser::{compile, ParamSpec, Tlv};

use crate::channel::{Channel, ChannelId};
use crate::error::CmdError;
use crate::framer::{Frame, RespFlags, ResponseFramer};
use crate::registry::Registry;

/// Command type, selected by the suffix after the command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    /// `AT+<NAME>=?`
    Test,
    /// `AT+<NAME>?`
    Query,
    /// `AT+<NAME>=<args>`
    Exec,
}

impl CommandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Test => "test",
            CommandType::Query => "query",
            CommandType::Exec => "exec",
        }
    }
}

/// Command handler.
///
/// Handlers are invoked even when argument validation failed; they must
/// check [`CommandParams::err`] before using the arguments.
pub type CommandHandler = Arc<dyn Fn(&mut CommandParams<'_>) + Send + Sync>;

/// A registered command.
#[derive(Clone)]
pub struct CommandDescriptor {
    name: String,
    format: String,
    arity: u16,
    handler: CommandHandler,
    test_response: String,
    specs: Vec<ParamSpec>,
}

impl CommandDescriptor {
    /// Describe a command.
    ///
    /// `format` is compiled here once; see [`atcmd_parser`] for the syntax.
    pub fn new<F>(
        name: impl Into<String>,
        format: impl Into<String>,
        arity: u16,
        test_response: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(&mut CommandParams<'_>) + Send + Sync + 'static,
    {
        let format = format.into();
        let specs = compile(&format);
        CommandDescriptor {
            name: name.into(),
            format,
            arity,
            handler: Arc::new(handler),
            test_response: test_response.into(),
            specs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Declared number of parameters.
    pub fn arity(&self) -> u16 {
        self.arity
    }

    /// Text reported for `AT+<NAME>=?`.
    pub fn test_response(&self) -> &str {
        &self.test_response
    }

    /// Compiled parameter descriptors.
    pub fn specs(&self) -> &[ParamSpec] {
        &self.specs
    }

    pub(crate) fn invoke(&self, params: &mut CommandParams<'_>) {
        (self.handler)(params)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("arity", &self.arity)
            .field("test_response", &self.test_response)
            .finish_non_exhaustive()
    }
}

/// Sends frames to one channel.
#[derive(Clone, Copy)]
pub struct Responder<'a> {
    ch: ChannelId,
    channel: &'a Channel,
    framer: &'a ResponseFramer,
}

impl<'a> Responder<'a> {
    pub(crate) fn new(ch: ChannelId, channel: &'a Channel, framer: &'a ResponseFramer) -> Self {
        Responder { ch, channel, framer }
    }

    pub fn channel(&self) -> ChannelId {
        self.ch
    }

    /// Emit formatted text.
    pub fn concat(&self, flags: RespFlags, args: fmt::Arguments<'_>) {
        self.emit(self.framer.frame_fmt(flags, args));
    }

    /// Emit a byte array as upper-case hex.
    pub fn array(&self, flags: RespFlags, data: &[u8]) {
        self.emit(self.framer.frame_array(flags, data));
    }

    /// Emit bytes without framing.
    pub fn raw(&self, data: &[u8]) {
        self.channel.emit(self.ch, data);
    }

    /// Emit the status line for a completed command.
    pub fn status(&self, err: CmdError, name: &str, app_err: u16) {
        for frame in self.framer.status(err, name, app_err) {
            self.emit(frame);
        }
    }

    fn emit(&self, frame: Frame) {
        atcmd_metrics::record_frame(self.ch.id(), frame.len(), frame.is_truncated());
        self.channel.emit(self.ch, frame.as_bytes());
    }
}

/// Everything a handler gets for one invocation.
pub struct CommandParams<'a> {
    /// Command type of this invocation.
    pub kind: CommandType,
    /// Status so far. On exec the handler may replace it; queries always
    /// report `OK`.
    pub err: CmdError,
    /// Number of decoded arguments. Corrected to the actual count when it
    /// does not match the declared arity.
    pub argc: u16,
    /// Decoded arguments (empty for query and test).
    pub args: &'a [Tlv],
    /// Input remained after the last argument.
    pub data_residue: bool,
    /// Application error code reported with [`CmdError::SpecificError`].
    pub app_err: u16,
    name: &'a str,
    responder: Responder<'a>,
    registry: &'a Registry,
}

impl<'a> CommandParams<'a> {
    pub(crate) fn new(
        kind: CommandType,
        cmd: &'a CommandDescriptor,
        args: &'a [Tlv],
        responder: Responder<'a>,
        registry: &'a Registry,
    ) -> Self {
        CommandParams {
            kind,
            err: CmdError::NoError,
            argc: cmd.arity(),
            args,
            data_residue: false,
            app_err: 0,
            name: cmd.name(),
            responder,
            registry,
        }
    }

    /// Name of the command being handled.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Channel the command arrived on.
    pub fn channel(&self) -> ChannelId {
        self.responder.channel()
    }

    /// Whether validation (and the handler so far) succeeded.
    pub fn is_ok(&self) -> bool {
        self.err.is_ok()
    }

    /// Argument at `idx`.
    pub fn arg(&self, idx: usize) -> Option<&'a Tlv> {
        self.args.get(idx)
    }

    /// Fail the command with an application-defined code, reported as
    /// `+<NAME>:<hex code>` followed by `ERR`.
    pub fn fail(&mut self, app_err: u16) {
        self.err = CmdError::SpecificError;
        self.app_err = app_err;
    }

    /// Emit formatted text on the command's channel.
    pub fn respond(&self, flags: RespFlags, args: fmt::Arguments<'_>) {
        self.responder.concat(flags, args);
    }

    /// Emit a byte array as upper-case hex on the command's channel.
    pub fn respond_array(&self, flags: RespFlags, data: &[u8]) {
        self.responder.array(flags, data);
    }

    /// Emit unframed bytes on the command's channel.
    pub fn respond_raw(&self, data: &[u8]) {
        self.responder.raw(data);
    }

    /// The registry the command was resolved from.
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }
}
