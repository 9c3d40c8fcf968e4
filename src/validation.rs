// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Pre-dispatch checks and post-dispatch message forwarding.
//!
//! Frontend operations state their valid-usage rules with [require], in the order they
//! should be reported; the first failing rule wins.

use crate::Error;
use crate::callback::{self, MessageSeverity, MessageSource, Messenger};

/// Path of the enclosing function, e.g. `llri::queue::Queue::submit`.
macro_rules! function_name {
    () => {{
        fn f() {}
        let name = ::std::any::type_name_of_val(&f);
        let name = name.strip_suffix("::f").unwrap_or(name);
        name.trim_end_matches("::{{closure}}")
    }};
}

/// Returns `Err($err)` from the enclosing function, after reporting through the user
/// callback, unless `$cond` holds.
///
/// Compiled out by the `disable_validation` feature.
macro_rules! require {
    ($cond:expr, $err:expr $(,)?) => {
        if cfg!(not(feature = "disable_validation")) && !($cond) {
            return Err($crate::validation::violation(
                function_name!(),
                $err,
                &format!("the condition {} was false", stringify!($cond)),
            ));
        }
    };
    ($cond:expr, $err:expr, $($reason:tt)+) => {
        if cfg!(not(feature = "disable_validation")) && !($cond) {
            return Err($crate::validation::violation(
                function_name!(),
                $err,
                &format!($($reason)+),
            ));
        }
    };
}

/// Reports a failed rule and hands back the code to return.
#[cold]
pub(crate) fn violation(function: &str, error: Error, reason: &str) -> Error {
    let message = format!("{function} returned {} because {reason}.", error.name());
    callback::emit(MessageSeverity::Error, MessageSource::Api, &message);
    error
}

/// Reports questionable but legal usage.
pub(crate) fn warning(function: &str, reason: &str) {
    let message = format!("{function}: {reason}.");
    callback::emit(MessageSeverity::Warning, MessageSource::Api, &message);
}

/// Runs a backend call, then forwards whatever the backend reported meanwhile.
pub(crate) fn dispatch<R>(messenger: &Messenger, call: impl FnOnce() -> R) -> R {
    let r = call();
    pump(messenger);
    r
}

#[cfg(not(feature = "disable_implementation_message_polling"))]
pub(crate) fn pump(messenger: &Messenger) {
    messenger.poll();
}

#[cfg(feature = "disable_implementation_message_polling")]
pub(crate) fn pump(_messenger: &Messenger) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::tests::CALLBACK_LOCK;
    use std::sync::{Arc, Mutex};

    fn odd(value: u32) -> crate::Result<u32> {
        require!(value % 2 == 1, Error::InvalidUsage);
        Ok(value)
    }

    fn small(value: u32) -> crate::Result<u32> {
        require!(value < 10, Error::ExceededLimit, "value {value} is not below 10");
        Ok(value)
    }

    #[test]
    fn function_name_is_qualified() {
        assert!(function_name!().ends_with("validation::tests::function_name_is_qualified"));
    }

    #[cfg(not(feature = "disable_validation"))]
    #[test]
    fn failing_rule_reports_and_returns() {
        let _g = CALLBACK_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = seen.clone();
        crate::set_user_callback(move |severity, source, message| {
            if message.contains("validation::tests::") {
                seen_cb
                    .lock()
                    .unwrap()
                    .push((severity, source, message.to_string()));
            }
        });
        assert_eq!(odd(3), Ok(3));
        assert_eq!(odd(4), Err(Error::InvalidUsage));
        assert_eq!(small(12), Err(Error::ExceededLimit));
        crate::clear_user_callback();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, MessageSeverity::Error);
        assert_eq!(seen[0].1, MessageSource::Api);
        assert!(seen[0].2.ends_with(
            "validation::tests::odd returned ErrorInvalidUsage because the condition value % 2 == 1 was false."
        ));
        assert!(
            seen[1]
                .2
                .ends_with("small returned ErrorExceededLimit because value 12 is not below 10.")
        );
    }

    #[cfg(feature = "disable_validation")]
    #[test]
    fn disabled_rules_pass_silently() {
        let _g = CALLBACK_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let seen = Arc::new(Mutex::new(0));
        let seen_cb = seen.clone();
        crate::set_user_callback(move |_, _, message| {
            if message.contains("validation::tests::") {
                *seen_cb.lock().unwrap() += 1;
            }
        });
        assert_eq!(odd(4), Ok(4));
        assert_eq!(small(12), Ok(12));
        crate::clear_user_callback();
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[cfg(feature = "disable_implementation_message_polling")]
    #[test]
    fn dispatch_leaves_backend_messages_pending() {
        let messenger = Messenger::new();
        let r = dispatch(&messenger, || {
            messenger.push(MessageSeverity::Error, "driver complaint");
            7
        });
        assert_eq!(r, 7);
        assert_eq!(messenger.pending(), 1);
    }
}
