//! Line-oriented console: one command per input line.

use std::io::{self, BufRead, Write};

use atcmd_core::{ChannelId, Engine};

/// Feed every line of `input` to the engine on `ch`.
///
/// Trailing `\r` is stripped and blank lines are skipped. Returns the number
/// of lines dispatched.
pub fn run_lines<R: BufRead>(engine: &mut Engine, ch: ChannelId, input: R) -> io::Result<usize> {
    let mut dispatched = 0;
    for line in input.split(b'\n') {
        let mut line = line?;
        while line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.is_empty() {
            continue;
        }

        if let Err(e) = engine.process(ch, &line) {
            log::debug!("ch {}: {}", ch, e);
        }
        dispatched += 1;
    }
    Ok(dispatched)
}

/// Emitter writing frames to stdout.
pub fn stdout_emitter(_: ChannelId, data: &[u8]) {
    let mut out = io::stdout().lock();
    if let Err(e) = out.write_all(data).and_then(|_| out.flush()) {
        log::warn!("failed to write response: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atcmd_core::{EngineConfig, Transport};
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_run_lines() {
        let mut engine = Engine::new(EngineConfig::default(), Vec::new()).unwrap();
        let out = Arc::new(Mutex::new(Vec::new()));
        let sink = out.clone();
        let ch = engine
            .alloc_channel(Transport::Uart, move |_, d| sink.lock().unwrap().extend_from_slice(d))
            .unwrap();

        let input = Cursor::new(b"AT\r\n\r\nAT+DEBUG=1\r\nAT+NOPE?\n".to_vec());
        let count = run_lines(&mut engine, ch, input).unwrap();

        assert_eq!(count, 3);
        assert!(engine.debug_enabled());
        assert_eq!(
            out.lock().unwrap().as_slice(),
            b"\r\nOK\r\n\r\nOK\r\n\r\nERR:1\r\n"
        );
    }
}
