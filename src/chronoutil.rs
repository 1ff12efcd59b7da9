use {
    crate::constants::RFC1123Z_FORMAT,
    chrono::{
        format::{DelayedFormat, StrftimeItems},
        DateTime, FixedOffset, ParseResult, TimeZone,
    },
    std::fmt::Display,
};

/// Formatting of timestamps in the RFC 1123 form used by the `x-amz-date` header, with a numeric
/// time zone (`Mon, 02 Jan 2006 15:04:05 -0700`).
pub trait FormatRfc1123Z {
    /// Format this timestamp as `%a, %d %b %Y %H:%M:%S %z`.
    fn format_rfc1123z(&self) -> DelayedFormat<StrftimeItems<'static>>;
}

impl<Tz> FormatRfc1123Z for DateTime<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    fn format_rfc1123z(&self) -> DelayedFormat<StrftimeItems<'static>> {
        self.format(RFC1123Z_FORMAT)
    }
}

/// Parse a timestamp in the RFC 1123 numeric time zone form.
pub trait ParseRfc1123Z<T> {
    /// Parse `s`, which must be in `%a, %d %b %Y %H:%M:%S %z` form.
    fn parse_from_rfc1123z(s: &str) -> ParseResult<T>;
}

impl ParseRfc1123Z<DateTime<FixedOffset>> for DateTime<FixedOffset> {
    fn parse_from_rfc1123z(s: &str) -> ParseResult<DateTime<FixedOffset>> {
        DateTime::parse_from_str(s, RFC1123Z_FORMAT)
    }
}
