//! Validity windows shared by attestations and cheques.

use crate::types::*;
use chrono::{DateTime, TimeZone, Timelike, Utc};
use der::{asn1::GeneralizedTime, Sequence};
use std::time::Duration;

/// `SEQUENCE { notBefore GeneralizedTime, notAfter GeneralizedTime }`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Sequence)]
pub(crate) struct Validity {
    not_before: GeneralizedTime,
    not_after: GeneralizedTime,
}

impl Validity {
    pub(crate) fn new(not_before: &DateTime<Utc>, not_after: &DateTime<Utc>) -> Result<Self, Error> {
        Ok(Self {
            not_before: to_generalized_time(not_before)?,
            not_after: to_generalized_time(not_after)?,
        })
    }

    pub(crate) fn not_before(&self) -> Result<DateTime<Utc>, Error> {
        from_generalized_time(&self.not_before)
    }

    pub(crate) fn not_after(&self) -> Result<DateTime<Utc>, Error> {
        from_generalized_time(&self.not_after)
    }
}

/// Drop sub-second precision, which the wire encoding cannot carry.
pub(crate) fn truncate(time: DateTime<Utc>) -> DateTime<Utc> {
    time.with_nanosecond(0).unwrap_or(time)
}

/// Whether the current time lies in `[not_before, not_after)`.
pub(crate) fn is_current(not_before: &DateTime<Utc>, not_after: &DateTime<Utc>) -> bool {
    let now = Utc::now();
    *not_before <= now && now < *not_after
}

fn to_generalized_time(time: &DateTime<Utc>) -> Result<GeneralizedTime, Error> {
    let seconds = u64::try_from(time.timestamp()).map_err(|_| Error::MalformedEncoding)?;
    Ok(GeneralizedTime::from_unix_duration(Duration::from_secs(seconds))?)
}

fn from_generalized_time(time: &GeneralizedTime) -> Result<DateTime<Utc>, Error> {
    let seconds =
        i64::try_from(time.to_unix_duration().as_secs()).map_err(|_| Error::MalformedEncoding)?;
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or(Error::MalformedEncoding)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration as TimeDelta;

    #[test]
    fn windows_survive_encoding() {
        let not_before = truncate(Utc::now());
        let not_after = not_before + TimeDelta::hours(1);
        let validity = Validity::new(&not_before, &not_after).unwrap();
        assert_eq!(validity.not_before().unwrap(), not_before);
        assert_eq!(validity.not_after().unwrap(), not_after);
    }

    #[test]
    fn current_window_is_half_open() {
        let now = Utc::now();
        assert!(is_current(
            &(now - TimeDelta::minutes(1)),
            &(now + TimeDelta::minutes(1))
        ));
        assert!(!is_current(
            &(now - TimeDelta::hours(2)),
            &(now - TimeDelta::hours(1))
        ));
        assert!(!is_current(
            &(now + TimeDelta::hours(1)),
            &(now + TimeDelta::hours(2))
        ));
    }

    #[test]
    fn times_before_the_epoch_are_rejected() {
        let before_epoch = Utc.timestamp_opt(-1, 0).unwrap();
        assert!(Validity::new(&before_epoch, &Utc::now()).is_err());
    }
}
