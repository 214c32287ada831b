//! Hides typed input while the password line is read.

use std::io;

/// Turns terminal echo off until dropped. Does nothing when the descriptor is
/// not a terminal (piped input, tests).
#[derive(Debug)]
pub struct EchoGuard {
    #[cfg(unix)]
    restore: Option<(libc::c_int, libc::termios)>,
}

impl EchoGuard {
    pub fn stdin() -> io::Result<Self> {
        #[cfg(unix)]
        {
            Self::for_fd(libc::STDIN_FILENO)
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// The newline that ends the line is still echoed (`ECHONL`), so the next
    /// output starts on a fresh line.
    #[cfg(unix)]
    pub fn for_fd(fd: libc::c_int) -> io::Result<Self> {
        if unsafe { libc::isatty(fd) } == 0 {
            return Ok(Self { restore: None });
        }

        let original = get_termios(fd)?;
        let mut hidden = original;
        hidden.c_lflag &= !libc::ECHO;
        hidden.c_lflag |= libc::ECHONL;
        set_termios(fd, &hidden)?;
        Ok(Self {
            restore: Some((fd, original)),
        })
    }

    pub fn is_active(&self) -> bool {
        #[cfg(unix)]
        {
            self.restore.is_some()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }
}

#[cfg(unix)]
impl Drop for EchoGuard {
    fn drop(&mut self) {
        if let Some((fd, original)) = self.restore.take() {
            if let Err(error) = set_termios(fd, &original) {
                tracing::warn!(%error, "failed to restore terminal echo");
            }
        }
    }
}

#[cfg(unix)]
fn get_termios(fd: libc::c_int) -> io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

#[cfg(unix)]
fn set_termios(fd: libc::c_int, termios: &libc::termios) -> io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use libc::c_int;

    struct Pty {
        master: c_int,
        slave: c_int,
    }

    impl Drop for Pty {
        fn drop(&mut self) {
            unsafe {
                libc::close(self.master);
                libc::close(self.slave);
            }
        }
    }

    fn open_pty() -> Pty {
        let mut master: c_int = 0;
        let mut slave: c_int = 0;
        let result = unsafe {
            libc::openpty(
                &mut master,
                &mut slave,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        assert_eq!(result, 0, "openpty failed");
        Pty { master, slave }
    }

    #[test]
    fn echo_is_hidden_while_guard_lives_and_restored_after() {
        let pty = open_pty();
        let original = get_termios(pty.slave).expect("get termios");

        let guard = EchoGuard::for_fd(pty.slave).expect("echo guard");
        assert!(guard.is_active());
        let hidden = get_termios(pty.slave).expect("get termios");
        assert_eq!(hidden.c_lflag & libc::ECHO, 0);
        assert_ne!(hidden.c_lflag & libc::ECHONL, 0);

        drop(guard);
        let restored = get_termios(pty.slave).expect("get termios");
        assert_eq!(restored.c_lflag, original.c_lflag);
    }

    #[test]
    fn piped_input_leaves_guard_inactive() {
        let mut fds = [0 as c_int; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0, "pipe failed");

        let guard = EchoGuard::for_fd(fds[0]).expect("echo guard");
        assert!(!guard.is_active());
        drop(guard);

        unsafe {
            libc::close(fds[0]);
            libc::close(fds[1]);
        }
    }
}
