//! Weather records and the refresh deadline policy.
//!
//! A [`WeatherRecord`] is the unit of cached state: one row per city, always
//! carrying the deadline after which it must be re-fetched before it can be
//! served as authoritative. Records are never deleted; they are replaced in
//! place on every refresh, whether the provider answered or not.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use thiserror::Error;

/// Condition text persisted when the provider could not be consulted.
pub const UNKNOWN_CONDITION: &str = "Unknown";

/// City name used as the lookup key.
///
/// Names are case-sensitive and compared verbatim, so `"London"` and
/// `"london"` address different records.
///
/// # Examples
/// ```
/// use backend::domain::CityName;
///
/// let city = CityName::new("London").expect("valid city");
/// assert_eq!(city.as_str(), "London");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CityName(String);

impl CityName {
    /// Validate and wrap a city name.
    pub fn new(value: impl Into<String>) -> Result<Self, CityNameValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CityNameValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(CityNameValidationError::SurroundingWhitespace);
        }
        Ok(Self(raw))
    }

    /// Borrow the name as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CityName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`CityName`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CityNameValidationError {
    /// Name is empty after trimming whitespace.
    #[error("city must not be empty")]
    Empty,
    /// Name carries leading or trailing whitespace.
    #[error("city must not contain surrounding whitespace")]
    SurroundingWhitespace,
}

/// Short textual weather description such as `"Rain"` or `"Clouds"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherCondition(String);

impl WeatherCondition {
    /// Wrap provider condition text.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Sentinel meaning "never successfully resolved".
    pub fn unknown() -> Self {
        Self(UNKNOWN_CONDITION.to_owned())
    }

    /// Whether this is the placeholder sentinel.
    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_CONDITION
    }

    /// Borrow the condition text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values returned by a weather provider for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    /// Headline condition.
    pub condition: WeatherCondition,
    /// Temperature in the provider's native unit.
    pub temperature: f64,
}

/// Cached weather for one city.
///
/// ## Invariants
/// - `next_refresh_at` is always populated; a record is never persisted
///   without a deadline.
/// - A placeholder (`condition == "Unknown"`) carries a zero temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    city: CityName,
    condition: WeatherCondition,
    temperature: f64,
    next_refresh_at: DateTime<Utc>,
}

impl WeatherRecord {
    /// Build a record from a successful provider observation.
    pub fn observed(
        city: CityName,
        observation: WeatherObservation,
        next_refresh_at: DateTime<Utc>,
    ) -> Self {
        Self {
            city,
            condition: observation.condition,
            temperature: observation.temperature,
            next_refresh_at,
        }
    }

    /// Build the placeholder written when the provider call failed.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{CityName, WeatherRecord};
    /// use chrono::Utc;
    ///
    /// let city = CityName::new("Nowhereville").expect("valid city");
    /// let record = WeatherRecord::placeholder(city, Utc::now());
    /// assert!(record.condition().is_unknown());
    /// assert_eq!(record.temperature(), 0.0);
    /// ```
    pub fn placeholder(city: CityName, next_refresh_at: DateTime<Utc>) -> Self {
        Self {
            city,
            condition: WeatherCondition::unknown(),
            temperature: 0.0,
            next_refresh_at,
        }
    }

    /// Rehydrate a record from storage without reinterpreting its fields.
    pub fn from_parts(
        city: CityName,
        condition: WeatherCondition,
        temperature: f64,
        next_refresh_at: DateTime<Utc>,
    ) -> Self {
        Self {
            city,
            condition,
            temperature,
            next_refresh_at,
        }
    }

    /// City key.
    pub fn city(&self) -> &CityName {
        &self.city
    }

    /// Headline condition.
    pub fn condition(&self) -> &WeatherCondition {
        &self.condition
    }

    /// Temperature in the provider's native unit.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Deadline after which the record must be re-fetched.
    pub fn next_refresh_at(&self) -> DateTime<Utc> {
        self.next_refresh_at
    }

    /// Whether the record is a failed-fetch placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.condition.is_unknown()
    }

    /// Whether the record must be refreshed at `now`.
    ///
    /// The deadline is inclusive: a record is stale the instant it is reached.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_refresh_at
    }
}

/// Fixed refresh interval applied to every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    interval: TimeDelta,
}

/// Errors raised when constructing a [`RefreshPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshPolicyError {
    /// A zero interval would make every record immediately stale.
    #[error("refresh interval must be greater than zero")]
    ZeroInterval,
    /// Interval does not fit chrono's representable range.
    #[error("refresh interval is out of range: {seconds}s")]
    OutOfRange { seconds: u64 },
}

impl RefreshPolicy {
    /// Interval used when no configuration overrides it.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

    /// Build a policy from a std duration.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use backend::domain::RefreshPolicy;
    ///
    /// let policy = RefreshPolicy::new(Duration::from_secs(86_400)).expect("valid interval");
    /// assert_eq!(policy.interval(), Duration::from_secs(86_400));
    /// ```
    pub fn new(interval: Duration) -> Result<Self, RefreshPolicyError> {
        if interval.is_zero() {
            return Err(RefreshPolicyError::ZeroInterval);
        }
        let delta = TimeDelta::from_std(interval).map_err(|_| RefreshPolicyError::OutOfRange {
            seconds: interval.as_secs(),
        })?;
        Ok(Self { interval: delta })
    }

    /// Configured interval.
    pub fn interval(&self) -> Duration {
        self.interval.to_std().unwrap_or(Self::DEFAULT_INTERVAL)
    }

    /// Deadline for a record written at `now`.
    ///
    /// Deadlines are truncated to whole microseconds, the resolution of a
    /// PostgreSQL `timestamptz`, so a stored record reads back unchanged.
    pub fn next_refresh_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let deadline = now
            .checked_add_signed(self.interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        deadline
            .duration_trunc(TimeDelta::microseconds(1))
            .unwrap_or(deadline)
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            interval: TimeDelta::hours(1),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for weather value types.
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn deadline() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    #[fixture]
    fn london() -> CityName {
        CityName::new("London").expect("valid city")
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn city_rejects_blank(#[case] value: &str) {
        let err = CityName::new(value).expect_err("blank city rejected");
        assert_eq!(err, CityNameValidationError::Empty);
    }

    #[rstest]
    #[case(" London")]
    #[case("London\t")]
    fn city_rejects_padding(#[case] value: &str) {
        let err = CityName::new(value).expect_err("padded city rejected");
        assert_eq!(err, CityNameValidationError::SurroundingWhitespace);
    }

    #[rstest]
    fn city_accepts_long_names() {
        let name = "Llanfairpwllgwyngyll".repeat(20);
        let city = CityName::new(name.clone()).expect("length is not limited");
        assert_eq!(city.as_str(), name);
    }

    #[rstest]
    fn city_is_case_sensitive() {
        let upper = CityName::new("London").expect("valid city");
        let lower = CityName::new("london").expect("valid city");
        assert_ne!(upper, lower);
    }

    #[rstest]
    fn staleness_is_inclusive_of_the_deadline(london: CityName, deadline: DateTime<Utc>) {
        let record = WeatherRecord::placeholder(london, deadline);

        assert!(!record.is_stale_at(deadline - TimeDelta::seconds(1)));
        assert!(record.is_stale_at(deadline));
        assert!(record.is_stale_at(deadline + TimeDelta::seconds(1)));
    }

    #[rstest]
    fn placeholder_uses_sentinel_and_zero_temperature(london: CityName, deadline: DateTime<Utc>) {
        let record = WeatherRecord::placeholder(london, deadline);

        assert!(record.is_placeholder());
        assert_eq!(record.condition().as_str(), UNKNOWN_CONDITION);
        assert_eq!(record.temperature(), 0.0);
    }

    #[rstest]
    fn observed_record_carries_provider_values(london: CityName, deadline: DateTime<Utc>) {
        let observation = WeatherObservation {
            condition: WeatherCondition::new("Rain"),
            temperature: 12.5,
        };
        let record = WeatherRecord::observed(london.clone(), observation, deadline);

        assert_eq!(record.city(), &london);
        assert_eq!(record.condition().as_str(), "Rain");
        assert_eq!(record.temperature(), 12.5);
        assert!(!record.is_placeholder());
    }

    #[rstest]
    fn policy_rejects_zero_interval() {
        let err = RefreshPolicy::new(Duration::ZERO).expect_err("zero interval rejected");
        assert_eq!(err, RefreshPolicyError::ZeroInterval);
    }

    #[rstest]
    #[case(Duration::from_secs(3_600))]
    #[case(Duration::from_secs(86_400))]
    fn policy_adds_interval_to_now(#[case] interval: Duration, deadline: DateTime<Utc>) {
        let policy = RefreshPolicy::new(interval).expect("valid interval");
        let expected = deadline + TimeDelta::from_std(interval).expect("in range");

        assert_eq!(policy.next_refresh_at(deadline), expected);
    }

    #[rstest]
    fn policy_deadlines_drop_sub_microsecond_precision(deadline: DateTime<Utc>) {
        let now = deadline + TimeDelta::nanoseconds(276_467_657);
        let policy = RefreshPolicy::new(Duration::from_secs(3_600)).expect("valid interval");

        let next = policy.next_refresh_at(now);

        assert_eq!(
            next,
            deadline + TimeDelta::hours(1) + TimeDelta::microseconds(276_467)
        );
        assert_eq!(next.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[rstest]
    fn default_policy_is_one_hour() {
        assert_eq!(RefreshPolicy::default().interval(), RefreshPolicy::DEFAULT_INTERVAL);
    }
}
