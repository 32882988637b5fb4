// FrrLab: Automated Addressing and Routing Configuration for GNS3 Labs
// Copyright (C) 2024  FrrLab Contributors
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Command delivery
//!
//! A [`CommandSession`] drives one device console over telnet: it first forces
//! the console into a known state (interrupt whatever is running, then unwind
//! nested configuration shells), and then delivers commands one at a time,
//! waiting for the shell prompt to come back after each one.
//!
//! Every read is bounded: a device that stops answering raises
//! [`Error::DeliveryTimeout`] and the remaining commands of the batch are
//! abandoned. The session closes the console when dropped.

use crate::{Error, Result};

use log::trace;
use telnet::{Telnet, TelnetEvent};

use std::io;
use std::thread::sleep;
use std::time::{Duration, SystemTime};

/// The byte sequence that marks an idle shell
pub const PROMPT: &[u8] = b"# ";

/// ASCII ETX, what ctrl-c sends
const INTERRUPT: u8 = 0x03;

/// Upper bound on waiting for the prompt after any single write
const READ_TIMEOUT_S: u64 = 5;

/// Pause after each delivered command, letting slow consoles drain
const SETTLE_MS: u64 = 100;

/// A raw byte console. The seam between the session logic and the transport.
pub trait Console {
    /// All bytes the device has produced since the last read; empty if none
    fn read_available(&mut self) -> io::Result<Vec<u8>>;
    /// Send bytes to the device
    fn send(&mut self, data: &[u8]) -> io::Result<()>;
}

/// A [`Console`] over a telnet connection
pub struct TelnetConsole {
    c: Telnet,
}

impl TelnetConsole {
    /// Open a telnet connection to the console at `host:port`
    pub fn connect(host: &str, port: u16) -> io::Result<Self> {
        Ok(Self { c: Telnet::connect((host, port), 2048)? })
    }
}

impl Console for TelnetConsole {
    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        match self.c.read_nonblocking()? {
            TelnetEvent::Data(d) => Ok(d.to_vec()),
            _ => Ok(Vec::new()),
        }
    }

    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.c.write(data)?;
        Ok(())
    }
}

/// A synchronized command-delivery session over some console
pub struct CommandSession<C> {
    console: C,
    timeout: Duration,
}

impl CommandSession<TelnetConsole> {
    /// Connect to the console at `host:port` and synchronize it
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        Self::over(TelnetConsole::connect(host, port)?)
    }
}

impl<C: Console> CommandSession<C> {
    /// Take over an open console and synchronize it
    pub fn over(console: C) -> Result<Self> {
        let mut session = Self { console, timeout: Duration::from_secs(READ_TIMEOUT_S) };
        session.synchronize()?;
        Ok(session)
    }

    /// Force the console into an idle root shell: interrupt whatever runs, then
    /// unwind a possibly nested configuration shell. Each `end`/`exit` either
    /// leaves a shell level or is a harmless no-op at the root.
    fn synchronize(&mut self) -> Result<()> {
        self.console.send(&[INTERRUPT, b'\n'])?;
        self.expect_prompt()?;
        self.console.send(b"end\n")?;
        self.expect_prompt()?;
        self.console.send(b"exit\n")?;
        self.expect_prompt()?;
        Ok(())
    }

    /// Deliver the commands in order, one at a time. Before each command the
    /// device is interrupted again, so a previous command left mid-output cannot
    /// swallow the next one.
    pub fn run_commands<S: AsRef<str>>(&mut self, commands: &[S]) -> Result<()> {
        for command in commands {
            let command = command.as_ref().trim();
            trace!("deliver: {}", command);
            self.console.send(&[INTERRUPT])?;
            self.expect_prompt()?;
            self.console.send(format!("{}\n", command).as_bytes())?;
            self.expect_prompt()?;
            sleep(Duration::from_millis(SETTLE_MS));
        }
        Ok(())
    }

    /// Accumulate console output until the prompt appears, within the timeout.
    /// The bound holds whether the device stays silent or keeps producing output
    /// that never contains the prompt.
    fn expect_prompt(&mut self) -> Result<()> {
        let started = SystemTime::now();
        let mut seen: Vec<u8> = Vec::new();
        loop {
            if started.elapsed().unwrap_or_default() > self.timeout {
                return Err(Error::DeliveryTimeout { seconds: self.timeout.as_secs() });
            }
            let chunk = self.console.read_available()?;
            if chunk.is_empty() {
                sleep(Duration::from_millis(10));
                continue;
            }
            seen.extend_from_slice(&chunk);
            if seen.windows(PROMPT.len()).any(|w| w == PROMPT) {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// A console backed by a script: answers every write with a prompt (or with
    /// silence once the script runs dry) and records the full transcript.
    struct MockConsole {
        transcript: Arc<Mutex<Vec<Vec<u8>>>>,
        answers: usize,
        pending: Vec<u8>,
        closed: Arc<AtomicBool>,
    }

    impl MockConsole {
        fn scripted(answers: usize) -> (Self, Arc<Mutex<Vec<Vec<u8>>>>, Arc<AtomicBool>) {
            let transcript = Arc::new(Mutex::new(Vec::new()));
            let closed = Arc::new(AtomicBool::new(false));
            let console = Self {
                transcript: transcript.clone(),
                answers,
                pending: Vec::new(),
                closed: closed.clone(),
            };
            (console, transcript, closed)
        }
    }

    impl Console for MockConsole {
        fn read_available(&mut self) -> io::Result<Vec<u8>> {
            Ok(std::mem::take(&mut self.pending))
        }

        fn send(&mut self, data: &[u8]) -> io::Result<()> {
            self.transcript.lock().unwrap().push(data.to_vec());
            if self.answers > 0 {
                self.answers -= 1;
                self.pending = b"frr# ".to_vec();
            }
            Ok(())
        }
    }

    impl Drop for MockConsole {
        fn drop(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn short_timeout<C: Console>(session: &mut CommandSession<C>) {
        session.timeout = Duration::from_millis(50);
    }

    #[test]
    fn synchronization_transcript() {
        let (console, transcript, _) = MockConsole::scripted(usize::MAX);
        CommandSession::over(console).unwrap();
        let transcript = transcript.lock().unwrap();
        assert_eq!(transcript[0], vec![INTERRUPT, b'\n']);
        assert_eq!(transcript[1], b"end\n".to_vec());
        assert_eq!(transcript[2], b"exit\n".to_vec());
    }

    #[test]
    fn commands_are_interrupt_prefixed_and_ordered() {
        let (console, transcript, _) = MockConsole::scripted(usize::MAX);
        let mut session = CommandSession::over(console).unwrap();
        session.run_commands(&["vtysh", "conf t", "end"]).unwrap();
        let transcript = transcript.lock().unwrap();
        // 3 synchronization writes, then (interrupt, command) pairs
        assert_eq!(transcript.len(), 9);
        assert_eq!(transcript[3], vec![INTERRUPT]);
        assert_eq!(transcript[4], b"vtysh\n".to_vec());
        assert_eq!(transcript[5], vec![INTERRUPT]);
        assert_eq!(transcript[6], b"conf t\n".to_vec());
        assert_eq!(transcript[8], b"end\n".to_vec());
    }

    #[test]
    fn commands_are_trimmed() {
        let (console, transcript, _) = MockConsole::scripted(usize::MAX);
        let mut session = CommandSession::over(console).unwrap();
        session.run_commands(&["  ip address 10.0.0.1/30  \n"]).unwrap();
        let transcript = transcript.lock().unwrap();
        assert_eq!(transcript[4], b"ip address 10.0.0.1/30\n".to_vec());
    }

    /// A console that always has output pending, none of it the prompt
    struct BabblingConsole;

    impl Console for BabblingConsole {
        fn read_available(&mut self) -> io::Result<Vec<u8>> {
            Ok(b"daemons booting, please stand by\n".to_vec())
        }

        fn send(&mut self, _data: &[u8]) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn babble_without_a_prompt_still_times_out() {
        let mut session =
            CommandSession { console: BabblingConsole, timeout: Duration::from_millis(50) };
        let started = SystemTime::now();
        let result = session.run_commands(&["vtysh"]);
        assert!(matches!(result, Err(Error::DeliveryTimeout { .. })));
        // bounded by the configured timeout, not by how long the device talks
        assert!(started.elapsed().unwrap() < Duration::from_secs(2));
    }

    #[test]
    fn silence_raises_a_timeout_and_closes_the_console() {
        // enough answers to synchronize, then the device goes silent
        let (console, _, closed) = MockConsole::scripted(3);
        let mut session = CommandSession::over(console).unwrap();
        short_timeout(&mut session);
        let result = session.run_commands(&["vtysh"]);
        assert!(matches!(result, Err(Error::DeliveryTimeout { .. })));
        drop(session);
        assert!(closed.load(Ordering::SeqCst));
    }
}
