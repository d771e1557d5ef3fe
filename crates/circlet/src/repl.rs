//! Interactive numbered-menu session over a shared ring.
//!
//! Reads one line per prompt from any [`BufRead`] and writes to any
//! [`Write`], so sessions can be scripted in tests. Ring errors are printed
//! and the session continues; end of input ends the session like option 8.
//!
//! Option 4 removes by value, which only reaches the record stored at the
//! value's own hash. Copies placed at probed fingerprints stay behind; the
//! session lists them after a removal, but removing them by fingerprint is
//! only possible through [`SharedRing::remove_fingerprint`].

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use circlet_ring::{SharedRing, TokenHasher};
use tracing::{debug, info};

use crate::render;

const MENU: &str = "1. Add Server\n\
                    2. Remove Server\n\
                    3. Add Data\n\
                    4. Remove Data\n\
                    5. Show Ring\n\
                    6. Show Data\n\
                    7. Show Servers\n\
                    8. Exit\n\
                    Choose an option: ";

/// A menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    AddServer,
    RemoveServer,
    AddData,
    RemoveData,
    ShowRing,
    ShowData,
    ShowServers,
    Exit,
}

impl Choice {
    fn parse(input: &str) -> Option<Self> {
        Some(match input {
            "1" => Choice::AddServer,
            "2" => Choice::RemoveServer,
            "3" => Choice::AddData,
            "4" => Choice::RemoveData,
            "5" => Choice::ShowRing,
            "6" => Choice::ShowData,
            "7" => Choice::ShowServers,
            "8" => Choice::Exit,
            _ => return None,
        })
    }
}

/// An interactive session bound to one ring, one input and one output.
pub struct Repl<H, R, W> {
    ring: Arc<SharedRing<H>>,
    input: R,
    output: W,
}

impl<H: TokenHasher, R: BufRead, W: Write> Repl<H, R, W> {
    /// Create a session over `ring`.
    pub fn new(ring: Arc<SharedRing<H>>, input: R, output: W) -> Self {
        Self {
            ring,
            input,
            output,
        }
    }

    /// Run the menu loop until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        info!("interactive session started");
        loop {
            let Some(line) = self.prompt(MENU)? else {
                break;
            };
            match Choice::parse(&line) {
                Some(Choice::Exit) => break,
                Some(choice) => {
                    if !self.dispatch(choice)? {
                        break;
                    }
                }
                None => writeln!(self.output, "Invalid option!")?,
            }
        }
        info!("interactive session ended");
        Ok(())
    }

    /// Execute one menu entry. Returns `false` if input ended mid-prompt.
    fn dispatch(&mut self, choice: Choice) -> io::Result<bool> {
        debug!(?choice, "menu selection");
        match choice {
            Choice::AddServer => {
                let Some(name) = self.prompt("Enter server name: ")? else {
                    return Ok(false);
                };
                match self.ring.add_server(&name) {
                    Ok(migrations) => {
                        if let Some(server) = self.ring.read(|r| r.server(&name).cloned()) {
                            writeln!(
                                self.output,
                                "Server {} added, Hash: {}",
                                server.name, server.token
                            )?;
                        }
                        render::migrations(&mut self.output, &migrations)?;
                    }
                    Err(e) => writeln!(self.output, "Error: {e}")?,
                }
            }
            Choice::RemoveServer => {
                let Some(name) = self.prompt("Enter server name to remove: ")? else {
                    return Ok(false);
                };
                match self.ring.remove_server(&name) {
                    Ok(migrations) => {
                        writeln!(self.output, "Server {name} removed")?;
                        render::migrations(&mut self.output, &migrations)?;
                    }
                    Err(e) => writeln!(self.output, "Error: {e}")?,
                }
            }
            Choice::AddData => {
                let Some(value) = self.prompt("Enter data value: ")? else {
                    return Ok(false);
                };
                match self.ring.add_data(&value) {
                    Ok(placement) => match placement.server {
                        Some(server) => {
                            writeln!(self.output, "Data assigned to server: {}", server.name)?
                        }
                        None => writeln!(
                            self.output,
                            "Data stored unassigned: no servers on the ring"
                        )?,
                    },
                    Err(e) => writeln!(self.output, "Error: {e}")?,
                }
            }
            Choice::RemoveData => {
                let Some(value) = self.prompt("Enter data value to remove: ")? else {
                    return Ok(false);
                };
                match self.ring.remove_data(&value) {
                    Ok(Some(record)) => writeln!(self.output, "Data {} removed", record.value)?,
                    Ok(None) => writeln!(self.output, "No data stored under {value}")?,
                    Err(e) => {
                        writeln!(self.output, "Error: {e}")?;
                        return Ok(true);
                    }
                }
                let left = self.ring.read(|r| r.fingerprints_of(&value));
                if !left.is_empty() {
                    let hashes: Vec<String> = left.iter().map(|fp| fp.to_hex()).collect();
                    writeln!(
                        self.output,
                        "Copies of {value} remain at Data Hash: {}",
                        hashes.join(", ")
                    )?;
                }
            }
            Choice::ShowRing => {
                writeln!(self.output, "Server Ring:")?;
                render::servers(&mut self.output, &self.ring.servers())?;
            }
            Choice::ShowData => {
                writeln!(self.output, "Data in Ring:")?;
                render::data(&mut self.output, &self.ring.data())?;
            }
            Choice::ShowServers => {
                writeln!(self.output, "Servers:")?;
                render::assignments(&mut self.output, &self.ring.assignments())?;
            }
            Choice::Exit => {}
        }
        Ok(true)
    }

    /// Print `text`, then read one trimmed line. `None` on end of input.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
