//! Interrupt delivery to a supervised child.

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

/// Send SIGINT to `pid`.
pub(crate) fn send_interrupt(pid: u32) -> std::result::Result<(), Errno> {
    let nix_pid = Pid::from_raw(pid as i32);
    log::debug!("Sending SIGINT to child {}", pid);
    kill(nix_pid, Signal::SIGINT)
}
