//! Integration tests for `DieselWeatherRepository` against embedded PostgreSQL.
//!
//! Each test boots its own cluster through `pg-embed-setup-unpriv`, applies
//! the embedded migrations with the same runner the binary uses, and talks to
//! the store through a real `DbPool`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

use backend::domain::ports::{LookupOrigin, WeatherRepository};
use backend::domain::{
    RefreshPolicy, WeatherCondition, WeatherRecord, WeatherRefreshPorts, WeatherRefreshService,
};
use backend::outbound::persistence::{
    DbPool, DieselWeatherRepository, PoolConfig, run_pending_migrations,
};
use backend::test_support::weather::{ScriptedWeatherSource, city, fixture_now, observation};

mod support;

use support::handle_cluster_setup_failure;
use support::pg_embed::test_cluster;

const TEST_DB: &str = "postgres";

struct TestContext {
    runtime: Runtime,
    repository: Arc<DieselWeatherRepository>,
    _cluster: TestCluster,
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let database_url = cluster.connection().database_url(TEST_DB);

    let pool = runtime.block_on(async {
        run_pending_migrations(&database_url)
            .await
            .map_err(|err| err.to_string())?;
        let config = PoolConfig::new(database_url.as_str())
            .with_max_size(2)
            .with_min_idle(Some(1));
        DbPool::new(config).await.map_err(|err| err.to_string())
    })?;

    Ok(TestContext {
        runtime,
        repository: Arc::new(DieselWeatherRepository::new(pool)),
        _cluster: cluster,
    })
}

#[fixture]
fn store() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn record(name: &str, condition: &str, temperature: f64, deadline: DateTime<Utc>) -> WeatherRecord {
    WeatherRecord::from_parts(
        city(name),
        WeatherCondition::new(condition),
        temperature,
        deadline,
    )
}

#[rstest]
fn missing_city_reads_as_none(store: Option<TestContext>) {
    let Some(ctx) = store else {
        eprintln!("SKIP-TEST-CLUSTER: missing_city_reads_as_none skipped");
        return;
    };

    let found = ctx
        .runtime
        .block_on(ctx.repository.find_by_city(&city("Atlantis")))
        .expect("query succeeds");
    assert!(found.is_none());
}

#[rstest]
fn upsert_inserts_then_replaces_every_column(store: Option<TestContext>) {
    let Some(ctx) = store else {
        eprintln!("SKIP-TEST-CLUSTER: upsert_inserts_then_replaces_every_column skipped");
        return;
    };
    let repo = &ctx.repository;
    let second_deadline = fixture_now() + TimeDelta::hours(1);

    ctx.runtime.block_on(async {
        repo.upsert(&record("London", "Rain", 284.15, fixture_now()))
            .await
            .expect("insert succeeds");
        repo.upsert(&record("London", "Clear", 290.0, second_deadline))
            .await
            .expect("update succeeds");
    });

    let stored = ctx
        .runtime
        .block_on(repo.find_by_city(&city("London")))
        .expect("query succeeds")
        .expect("row present");
    assert_eq!(stored, record("London", "Clear", 290.0, second_deadline));
}

#[rstest]
fn lookups_are_case_sensitive(store: Option<TestContext>) {
    let Some(ctx) = store else {
        eprintln!("SKIP-TEST-CLUSTER: lookups_are_case_sensitive skipped");
        return;
    };
    let repo = &ctx.repository;

    ctx.runtime
        .block_on(repo.upsert(&record("Paris", "Clouds", 288.0, fixture_now())))
        .expect("insert succeeds");

    let other_case = ctx
        .runtime
        .block_on(repo.find_by_city(&city("PARIS")))
        .expect("query succeeds");
    assert!(other_case.is_none());
}

#[rstest]
fn policy_deadlines_survive_the_round_trip(store: Option<TestContext>) {
    let Some(ctx) = store else {
        eprintln!("SKIP-TEST-CLUSTER: policy_deadlines_survive_the_round_trip skipped");
        return;
    };
    let policy = RefreshPolicy::new(Duration::from_secs(3_600)).expect("valid interval");
    let now = fixture_now() + TimeDelta::nanoseconds(276_467_657);
    let written = record("Reykjavik", "Snow", 270.4, policy.next_refresh_at(now));

    ctx.runtime
        .block_on(ctx.repository.upsert(&written))
        .expect("insert succeeds");
    let stored = ctx
        .runtime
        .block_on(ctx.repository.find_by_city(&city("Reykjavik")))
        .expect("query succeeds")
        .expect("row present");

    assert_eq!(stored, written);
}

#[rstest]
fn wall_clock_lookups_serve_the_stored_record(store: Option<TestContext>) {
    let Some(ctx) = store else {
        eprintln!("SKIP-TEST-CLUSTER: wall_clock_lookups_serve_the_stored_record skipped");
        return;
    };
    let source = Arc::new(ScriptedWeatherSource::always(observation("Rain", 284.15)));
    let service = WeatherRefreshService::new(
        WeatherRefreshPorts::new(ctx.repository.clone(), source.clone()),
        Arc::new(DefaultClock),
        RefreshPolicy::new(Duration::from_secs(3_600)).expect("valid interval"),
    );
    let london = city("London");

    let (first, second, stored) = ctx.runtime.block_on(async {
        let first = service.get_or_retrieve(&london).await;
        let second = service.get_or_retrieve(&london).await;
        let stored = ctx
            .repository
            .find_by_city(&london)
            .await
            .expect("query succeeds")
            .expect("row present");
        (first, second, stored)
    });

    assert_eq!(first.origin, LookupOrigin::Refreshed);
    assert!(first.store_failure.is_none());
    assert_eq!(second.origin, LookupOrigin::Cached);
    assert_eq!(second.record, first.record);
    assert_eq!(stored, first.record);
    assert_eq!(source.call_count(), 1);
}
