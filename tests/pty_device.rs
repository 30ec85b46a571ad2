//! Device tests against a real pseudo-terminal.
//!
//! Run with `cargo test --features pty-tests`.

#![cfg(all(unix, feature = "pty-tests"))]
#![allow(unsafe_code)]

use std::ffi::CStr;
use std::fs::File;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, FromRawFd};
use std::path::PathBuf;
use std::time::Duration;
use vtcanvas::{ByteSource, Device, EventReader, KeyCode, ReaderOptions, is_tty};

/// Open a pty pair, returning the master and the path of the slave.
fn open_pty() -> (File, PathBuf) {
    // SAFETY: plain libc calls; every return value is checked.
    unsafe {
        let master = libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY);
        assert!(master >= 0, "posix_openpt failed");
        assert_eq!(libc::grantpt(master), 0);
        assert_eq!(libc::unlockpt(master), 0);
        let name = libc::ptsname(master);
        assert!(!name.is_null());
        let path = PathBuf::from(CStr::from_ptr(name).to_string_lossy().into_owned());
        (File::from_raw_fd(master), path)
    }
}

/// A second handle on the slave, for inspecting its mode independently.
fn open_slave(path: &PathBuf) -> File {
    File::options()
        .read(true)
        .write(true)
        .custom_flags(libc::O_NOCTTY)
        .open(path)
        .unwrap()
}

fn lflag(fd: i32) -> libc::tcflag_t {
    // SAFETY: termios is plain data and fd is a valid terminal.
    unsafe {
        let mut t: libc::termios = std::mem::zeroed();
        assert_eq!(libc::tcgetattr(fd, &raw mut t), 0);
        t.c_lflag
    }
}

#[test]
fn device_enters_and_leaves_raw_mode() {
    let (_master, slave) = open_pty();
    let mut device = Device::open_path(&slave).unwrap();
    assert!(is_tty(&device));
    assert!(device.is_raw());
    let fd = device.as_raw_fd();
    assert_eq!(lflag(fd) & (libc::ICANON | libc::ECHO | libc::ISIG), 0);

    device.restore().unwrap();
    assert!(!device.is_raw());
    assert_ne!(lflag(fd) & libc::ICANON, 0);

    device.raw_mode(true).unwrap();
    assert!(device.is_raw());
    device.close().unwrap();
}

#[test]
fn device_times_out_then_reads_keys() {
    let (mut master, slave) = open_pty();
    let device = Device::open_path(&slave).unwrap();
    let mut reader = EventReader::new(device, ReaderOptions::default());

    assert!(reader.read_event(Duration::from_millis(20)).unwrap().is_none());

    master.write_all(b"\x1b[A").unwrap();
    let event = reader.read_event(Duration::from_secs(5)).unwrap().unwrap();
    assert_eq!(event.key().unwrap().code, KeyCode::Up);

    // A lone escape resolves after the grace window.
    master.write_all(b"\x1b").unwrap();
    let event = reader.read_event(Duration::from_secs(5)).unwrap().unwrap();
    assert!(event.key().unwrap().is_esc());

    let mut device = reader.into_source();
    let mut buf = [0u8; 8];
    assert_eq!(device.read_timeout(&mut buf, Duration::from_millis(10)).unwrap(), 0);
}

#[test]
fn device_write_reaches_master() {
    let (mut master, slave) = open_pty();
    let mut device = Device::open_path(&slave).unwrap();
    device.write_all(b"ok").unwrap();
    device.flush().unwrap();

    let mut buf = [0u8; 2];
    std::io::Read::read_exact(&mut master, &mut buf).unwrap();
    assert_eq!(&buf, b"ok");
}

#[test]
fn dropping_device_restores_mode() {
    let (_master, slave) = open_pty();
    let observer = open_slave(&slave);
    assert_ne!(lflag(observer.as_raw_fd()) & libc::ICANON, 0);

    let device = Device::open_path(&slave).unwrap();
    assert!(device.is_raw());
    assert_eq!(lflag(observer.as_raw_fd()) & libc::ICANON, 0);

    drop(device);
    assert_ne!(lflag(observer.as_raw_fd()) & libc::ICANON, 0);
    assert_ne!(lflag(observer.as_raw_fd()) & libc::ECHO, 0);
}

#[test]
fn discard_input_drops_unread_bytes() {
    let (mut master, slave) = open_pty();
    let mut device = Device::open_path(&slave).unwrap();
    master.write_all(b"stale").unwrap();
    std::thread::sleep(Duration::from_millis(50));

    device.discard_input().unwrap();
    let mut buf = [0u8; 8];
    assert_eq!(device.read_timeout(&mut buf, Duration::from_millis(20)).unwrap(), 0);

    master.write_all(b"k").unwrap();
    let n = device.read_timeout(&mut buf, Duration::from_secs(5)).unwrap();
    assert_eq!(&buf[..n], b"k");
}
