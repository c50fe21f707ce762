mod io;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use self::io::{get_stream_pair, StreamReader, StreamWriter};

/// Locks a mutex, recovering the guard if a callback panicked while holding it
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
