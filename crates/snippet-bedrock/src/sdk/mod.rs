//! API trait implementations for the AWS SDK clients.

mod agent;
mod control;
mod runtime;

use aws_smithy_types::DateTime;

/// Read an SDK string getter that is `&str` for required members and
/// `Option<&str>` for optional ones.
fn required<'a>(value: impl Into<Option<&'a str>>) -> String {
    value.into().unwrap_or_default().to_string()
}

fn timestamp(value: Option<&DateTime>) -> Option<jiff::Timestamp> {
    let value = value?;
    jiff::Timestamp::new(value.secs(), value.subsec_nanos() as i32).ok()
}
