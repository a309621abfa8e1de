//! Shared test doubles for the weather refresh path.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    WeatherRepository, WeatherRepositoryError, WeatherSource, WeatherSourceError,
};
use crate::domain::{CityName, WeatherCondition, WeatherObservation, WeatherRecord};
use crate::outbound::memory::InMemoryWeatherRepository;

/// Fixed instant used as "now" across suites.
pub fn fixture_now() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single() {
        Some(now) => now,
        None => panic!("fixture timestamp must be valid"),
    }
}

/// Build a city name, panicking on invalid fixtures.
pub fn city(name: &str) -> CityName {
    match CityName::new(name) {
        Ok(city) => city,
        Err(error) => panic!("fixture city {name:?} must be valid: {error}"),
    }
}

/// Provider observation with the given condition and temperature.
pub fn observation(condition: &str, temperature: f64) -> WeatherObservation {
    WeatherObservation {
        condition: WeatherCondition::new(condition),
        temperature,
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{what} mutex poisoned"),
    }
}

/// Clock whose current instant only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
            }
        };
        *lock(&self.0, "clock") += delta;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *lock(&self.0, "clock") += TimeDelta::seconds(seconds);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *lock(&self.0, "clock") = now;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0, "clock")
    }
}

/// Provider double replaying scripted outcomes in order.
///
/// Once the script runs out every call answers with the fallback observation
/// or, when none is set, fails with a transport error.
#[derive(Default)]
pub struct ScriptedWeatherSource {
    script: Mutex<VecDeque<Result<WeatherObservation, WeatherSourceError>>>,
    fallback: Option<WeatherObservation>,
    calls: Mutex<Vec<CityName>>,
    delay: Option<Duration>,
}

impl ScriptedWeatherSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source answering every unscripted call with `observation`.
    pub fn always(observation: WeatherObservation) -> Self {
        Self {
            fallback: Some(observation),
            ..Self::default()
        }
    }

    /// Hold each call for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push(&self, outcome: Result<WeatherObservation, WeatherSourceError>) {
        lock(&self.script, "script").push_back(outcome);
    }

    pub fn calls(&self) -> Vec<CityName> {
        lock(&self.calls, "calls").clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls, "calls").len()
    }
}

#[async_trait]
impl WeatherSource for ScriptedWeatherSource {
    async fn fetch_current(
        &self,
        city: &CityName,
    ) -> Result<WeatherObservation, WeatherSourceError> {
        lock(&self.calls, "calls").push(city.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = lock(&self.script, "script").pop_front();
        match (scripted, &self.fallback) {
            (Some(outcome), _) => outcome,
            (None, Some(observation)) => Ok(observation.clone()),
            (None, None) => Err(WeatherSourceError::transport("no scripted response")),
        }
    }
}

/// In-memory store whose reads and writes can be made to fail on demand.
#[derive(Default)]
pub struct FlakyWeatherRepository {
    inner: InMemoryWeatherRepository,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyWeatherRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Direct access to the backing store, bypassing failure injection.
    pub fn inner(&self) -> &InMemoryWeatherRepository {
        &self.inner
    }
}

#[async_trait]
impl WeatherRepository for FlakyWeatherRepository {
    async fn find_by_city(
        &self,
        city: &CityName,
    ) -> Result<Option<WeatherRecord>, WeatherRepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(WeatherRepositoryError::connection("injected read failure"));
        }
        self.inner.find_by_city(city).await
    }

    async fn upsert(&self, record: &WeatherRecord) -> Result<(), WeatherRepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(WeatherRepositoryError::query("injected write failure"));
        }
        self.inner.upsert(record).await
    }
}
