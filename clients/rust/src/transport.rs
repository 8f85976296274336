//! Maps low-level `reqwest` failures onto the domain [`Error`] variants.
//! Every send/receive failure in the client goes through [`classify`].

use std::error::Error as StdError;
use std::io;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Offline,
    TimedOut,
    Unreachable,
}

fn classify_io_kind(kind: io::ErrorKind) -> Option<Failure> {
    match kind {
        io::ErrorKind::NetworkDown | io::ErrorKind::NetworkUnreachable => Some(Failure::Offline),
        io::ErrorKind::TimedOut => Some(Failure::TimedOut),
        io::ErrorKind::HostUnreachable
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::AddrNotAvailable => Some(Failure::Unreachable),
        _ => None,
    }
}

/// First recognised I/O condition in the source chain.
fn io_failure(err: &(dyn StdError + 'static)) -> Option<Failure> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(failure) = e
            .downcast_ref::<io::Error>()
            .and_then(|io_err| classify_io_kind(io_err.kind()))
        {
            return Some(failure);
        }
        current = e.source();
    }
    None
}

fn failure_of(err: &reqwest::Error) -> Option<Failure> {
    if err.is_timeout() {
        return Some(Failure::TimedOut);
    }
    match io_failure(err) {
        Some(found) => Some(found),
        // DNS resolution failures surface as connect errors without a
        // distinctive io kind.
        None if err.is_connect() => Some(Failure::Unreachable),
        None => None,
    }
}

pub(crate) fn classify(err: reqwest::Error) -> Error {
    match failure_of(&err) {
        Some(Failure::Offline) => Error::NoInternetConnection,
        Some(Failure::TimedOut) => Error::RequestTimedOut,
        Some(Failure::Unreachable) => Error::ServerUnavailable,
        None => Error::unexpected(err),
    }
}
