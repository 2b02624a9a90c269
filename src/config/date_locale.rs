use crate::error::{
    BadDateTimeFormatterSnafu, InvalidLocaleSnafu, InvalidTimezoneSnafu, TweedError, TweedResult,
};
use icu::{
    calendar::preferences::CalendarAlgorithm,
    datetime::{
        DateTimeFormatter, DateTimeFormatterPreferences,
        fieldsets::{YMD, YMDET},
        options::{Alignment, TimePrecision},
        preferences::HourCycle,
    },
    locale::Locale,
    calendar::Iso,
    time::{TimeZoneInfo, ZonedDateTime, zone::models::AtTime},
};
use jiff::{Timestamp, Zoned, tz::TimeZone};
use jiff_icu::ConvertFrom;
use snafu::ResultExt;

/// How timestamps from the student service get shown to people.
#[derive(Debug, Clone)]
pub struct DateLocaleConfig {
    pub timezone: TimeZone,
    pub locale: Locale,
    dtf_prefs: DateTimeFormatterPreferences,
}

#[derive(Copy, Clone, Debug)]
pub enum DateFormat {
    ShortYMDET,
    LongYMDET,
    LongYMD,
}

impl DateLocaleConfig {
    fn dtf_prefs_and_locale_from_strings(
        locale: String,
        hour_cycle: &str,
        calendar_algorithm: &str,
    ) -> TweedResult<(Locale, DateTimeFormatterPreferences)> {
        let locale =
            Locale::try_from_str(&locale).context(InvalidLocaleSnafu { provided: locale })?;
        let hour_cycle = match hour_cycle {
            "h23" => HourCycle::H23,
            "h11" => HourCycle::H11,
            "h12" => HourCycle::H12,
            _ => {
                return Err(TweedError::InvalidHourCycle {
                    provided: hour_cycle.to_string(),
                });
            }
        };
        let calendar_algorithm = match calendar_algorithm {
            "gregorian" => CalendarAlgorithm::Iso8601,
            "buddhist" => CalendarAlgorithm::Buddhist,
            "japanese" => CalendarAlgorithm::Japanese,
            "hebrew" => CalendarAlgorithm::Hebrew,
            _ => {
                return Err(TweedError::InvalidCalendarAlgorithm {
                    provided: calendar_algorithm.to_string(),
                });
            }
        };

        let mut prefs = DateTimeFormatterPreferences::default();
        prefs.locale_preferences = (&locale).into();
        prefs.hour_cycle = Some(hour_cycle);
        prefs.calendar_algorithm = Some(calendar_algorithm);
        Ok((locale, prefs))
    }

    pub fn new(
        timezone: String,
        locale: String,
        hour_cycle: String,
        calendar_algorithm: String,
    ) -> TweedResult<Self> {
        let timezone = TimeZone::get(&timezone).context(InvalidTimezoneSnafu { tz: timezone })?;

        let (locale, dtf_prefs) =
            Self::dtf_prefs_and_locale_from_strings(locale, &hour_cycle, &calendar_algorithm)?;

        Ok(Self {
            timezone,
            locale,
            dtf_prefs,
        })
    }

    //TODO: cache the three formatters instead of building one per call
    pub fn format(&self, zoned: &Zoned, date_format: DateFormat) -> TweedResult<String> {
        let zdt: ZonedDateTime<Iso, TimeZoneInfo<AtTime>> = ZonedDateTime::convert_from(zoned);

        Ok(match date_format {
            DateFormat::ShortYMDET => DateTimeFormatter::try_new(self.dtf_prefs, {
                let mut fieldset = YMDET::short();
                fieldset.alignment = Some(Alignment::Column);
                fieldset.time_precision = Some(TimePrecision::Minute);
                fieldset
            })
            .context(BadDateTimeFormatterSnafu)?
            .format(&zdt)
            .to_string(),
            DateFormat::LongYMDET => DateTimeFormatter::try_new(self.dtf_prefs, {
                let mut fieldset = YMDET::long();
                fieldset.time_precision = Some(TimePrecision::Minute);
                fieldset
            })
            .context(BadDateTimeFormatterSnafu)?
            .format(&zdt)
            .to_string(),
            DateFormat::LongYMD => DateTimeFormatter::try_new(self.dtf_prefs, YMD::long())
                .context(BadDateTimeFormatterSnafu)?
                .format(&zdt)
                .to_string(),
        })
    }

    fn in_local_zone(&self, timestamp: Timestamp) -> Zoned {
        timestamp.to_zoned(self.timezone.clone())
    }

    pub fn short_ymdet(&self, timestamp: Timestamp) -> TweedResult<String> {
        self.format(&self.in_local_zone(timestamp), DateFormat::ShortYMDET)
    }
    pub fn long_ymdet(&self, timestamp: Timestamp) -> TweedResult<String> {
        self.format(&self.in_local_zone(timestamp), DateFormat::LongYMDET)
    }

    pub fn long_ymd(&self, timestamp: Timestamp) -> TweedResult<String> {
        self.format(&self.in_local_zone(timestamp), DateFormat::LongYMD)
    }
}
