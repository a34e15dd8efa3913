// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! Convenience helpers for date, time, and duration slot values.
//!
//! The platform delivers `AMAZON.DATE` slots as `2018-12-31`, `AMAZON.TIME`
//! slots as `13:45`, and `AMAZON.DURATION` slots as ISO-8601 durations such
//! as `PT10M` or `P2DT3H`. These helpers decode those strings into chrono
//! values and compose them the way a skill usually needs: a date and a time
//! overlaid on some base moment, offset by a duration.

use std::collections::HashMap;

use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};
use nom::{
    character::complete::{char, digit1},
    combinator::{map_res, opt},
    sequence::{preceded, terminated, tuple},
    IResult,
};

use crate::{
    request::{Intent, Slot},
    Error, Result,
};

/// A calendar-aware duration decoded from an `AMAZON.DURATION` slot.
///
/// Years and months do not have a fixed length in seconds, so they are kept
/// apart from the fixed-length components and applied with calendar
/// arithmetic.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IsoDuration {
    /// Number of years.
    pub years: u32,

    /// Number of months.
    pub months: u32,

    /// Number of weeks.
    pub weeks: u32,

    /// Number of days.
    pub days: u32,

    /// Number of hours.
    pub hours: u32,

    /// Number of minutes.
    pub minutes: u32,

    /// Number of seconds.
    pub seconds: u32,
}

impl IsoDuration {
    /// Parse an ISO-8601 duration such as `PT10M`, `P3D`, or `P1Y2M3DT4H`.
    ///
    /// Returns `None` for anything that is not a complete duration with at
    /// least one component.
    pub fn parse(input: &str) -> Option<Self> {
        match iso_duration(input) {
            Ok(("", duration)) if duration != Self::default() => Some(duration),
            _ => None,
        }
    }

    /// Apply this duration to `base`: backwards when `before` is `true`,
    /// forwards otherwise.
    ///
    /// Months and years use calendar arithmetic (adding one month to
    /// January 31 clamps to the end of February); the remaining components
    /// are a fixed offset. Returns `None` if the result falls outside the
    /// representable range.
    pub fn offset(&self, base: NaiveDateTime, before: bool) -> Option<NaiveDateTime> {
        let months = Months::new(self.years.checked_mul(12)?.checked_add(self.months)?);

        let fixed = chrono::Duration::weeks(i64::from(self.weeks))
            + chrono::Duration::days(i64::from(self.days))
            + chrono::Duration::hours(i64::from(self.hours))
            + chrono::Duration::minutes(i64::from(self.minutes))
            + chrono::Duration::seconds(i64::from(self.seconds));

        if before {
            base.checked_sub_months(months)?.checked_sub_signed(fixed)
        } else {
            base.checked_add_months(months)?.checked_add_signed(fixed)
        }
    }
}

fn unit(symbol: char) -> impl FnMut(&str) -> IResult<&str, u32> {
    move |input| terminated(map_res(digit1, str::parse::<u32>), char(symbol))(input)
}

fn iso_duration(input: &str) -> IResult<&str, IsoDuration> {
    let (input, _) = char('P')(input)?;

    let (input, years) = opt(unit('Y'))(input)?;
    let (input, months) = opt(unit('M'))(input)?;
    let (input, weeks) = opt(unit('W'))(input)?;
    let (input, days) = opt(unit('D'))(input)?;

    let (input, time) = opt(preceded(
        char('T'),
        tuple((opt(unit('H')), opt(unit('M')), opt(unit('S')))),
    ))(input)?;

    let (hours, minutes, seconds) = time.unwrap_or((None, None, None));

    Ok((
        input,
        IsoDuration {
            years: years.unwrap_or(0),
            months: months.unwrap_or(0),
            weeks: weeks.unwrap_or(0),
            days: days.unwrap_or(0),
            hours: hours.unwrap_or(0),
            minutes: minutes.unwrap_or(0),
            seconds: seconds.unwrap_or(0),
        },
    ))
}

/// Read-only view over an intent's slot values.
pub struct SlotValues<'a> {
    slots: &'a HashMap<String, Slot>,
}

impl<'a> SlotValues<'a> {
    /// View the slots of `intent`.
    pub fn new(intent: &'a Intent) -> Self {
        Self {
            slots: &intent.slots,
        }
    }

    /// Raw string value of the named slot, if the user supplied one.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.slots.get(name)?.value.as_deref()
    }

    /// Decode an `AMAZON.DATE` slot.
    ///
    /// An absent or empty slot is `Ok(None)`; a present but malformed value
    /// is an error.
    pub fn date(&self, name: &str) -> Result<Option<NaiveDate>> {
        self.value(name)
            .map(|value| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .map_err(|_err| unexpected(name, value))
            })
            .transpose()
    }

    /// Decode an `AMAZON.TIME` slot (`13:45`, with or without seconds).
    pub fn time(&self, name: &str) -> Result<Option<NaiveTime>> {
        self.value(name)
            .map(|value| {
                NaiveTime::parse_from_str(value, "%H:%M:%S")
                    .or_else(|_err| NaiveTime::parse_from_str(value, "%H:%M"))
                    .map_err(|_err| unexpected(name, value))
            })
            .transpose()
    }

    /// Decode an `AMAZON.DURATION` slot.
    pub fn duration(&self, name: &str) -> Result<Option<IsoDuration>> {
        self.value(name)
            .map(|value| IsoDuration::parse(value).ok_or_else(|| unexpected(name, value)))
            .transpose()
    }

    /// Resolve a moment in time from up to three slots.
    ///
    /// Starting from `base`, the date slot (when present) replaces the
    /// calendar date, the time slot replaces the time of day, and the
    /// duration slot then shifts the result backwards (`before` is `true`)
    /// or forwards. Slots that are absent leave their part of `base`
    /// untouched.
    pub fn resolve_date_time(
        &self,
        date_slot: &str,
        time_slot: &str,
        duration_slot: &str,
        before: bool,
        base: NaiveDateTime,
    ) -> Result<NaiveDateTime> {
        let mut resolved = base;

        if let Some(date) = self.date(date_slot)? {
            resolved = NaiveDateTime::new(date, resolved.time());
        }

        if let Some(time) = self.time(time_slot)? {
            resolved = NaiveDateTime::new(resolved.date(), time);
        }

        if let Some(duration) = self.duration(duration_slot)? {
            resolved = duration
                .offset(resolved, before)
                .ok_or_else(|| unexpected(duration_slot, "out of range"))?;
        }

        Ok(resolved)
    }
}

fn unexpected(name: &str, value: &str) -> Error {
    Error::UnexpectedSlotValue {
        name: name.to_owned(),
        value: value.to_owned(),
    }
}
