use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// Transport a [`Session`](crate::session::Session) runs over.
///
/// The client needs two handles onto the same connection: the session owns a
/// buffered reader plus a writer, and the idle loop keeps a spare writer so a
/// command can interrupt a blocked `idle` read from another thread. `try_clone`
/// provides those handles, `set_read_timeout` arms the command watchdog, and
/// `shutdown` force-unblocks any thread still parked in a read.
pub trait Wire: Read + Write + Send + Sized + 'static {
    fn try_clone(&self) -> io::Result<Self>;

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    fn shutdown(&self) -> io::Result<()>;
}

impl Wire for TcpStream {
    fn try_clone(&self) -> io::Result<Self> {
        TcpStream::try_clone(self)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn shutdown(&self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}
