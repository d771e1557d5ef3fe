//! Plain-text rendering of ring state for the terminal.

use std::io::{self, Write};

use circlet_types::{DataRecord, Migration, Server, ServerAssignments};

/// One line per server, ascending by token.
pub fn servers(out: &mut impl Write, servers: &[Server]) -> io::Result<()> {
    for server in servers {
        writeln!(out, "Server: {}, Hash: {}", server.name, server.token)?;
    }
    Ok(())
}

/// One line per record, in insertion order.
pub fn data(out: &mut impl Write, records: &[DataRecord]) -> io::Result<()> {
    for record in records {
        writeln!(
            out,
            "Data Hash: {}, Value: {}, Assigned to Server: {}",
            record.fingerprint,
            record.value,
            record.assigned.as_deref().unwrap_or("<none>")
        )?;
    }
    Ok(())
}

/// Each server followed by the records it owns.
pub fn assignments(out: &mut impl Write, assignments: &[ServerAssignments]) -> io::Result<()> {
    for entry in assignments {
        writeln!(
            out,
            "Server: {}, Hash: {}",
            entry.server.name, entry.server.token
        )?;
        if entry.data.is_empty() {
            writeln!(out, "  No data assigned to this server.")?;
            continue;
        }
        writeln!(out, "  Assigned Data:")?;
        for record in &entry.data {
            writeln!(
                out,
                "    Data Hash: {}, Value: {}",
                record.fingerprint, record.value
            )?;
        }
    }
    Ok(())
}

/// One line per ownership change.
pub fn migrations(out: &mut impl Write, migrations: &[Migration]) -> io::Result<()> {
    for m in migrations {
        match (m.from.as_deref(), m.to.as_deref()) {
            (Some(from), Some(to)) => {
                writeln!(out, "Data {} moved from server {from} to server {to}", m.value)?
            }
            (None, Some(to)) => writeln!(out, "Data {} assigned to server {to}", m.value)?,
            (Some(from), None) => writeln!(
                out,
                "Data {} left unassigned: server {from} was the last one",
                m.value
            )?,
            (None, None) => {}
        }
    }
    Ok(())
}
