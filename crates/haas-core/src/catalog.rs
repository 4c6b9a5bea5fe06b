// ── Built-in Home Assistant catalog ──
//
// The default Specification Set shipped with the add-on: datasets over the
// Home Assistant recorder schema (SQLite flavour), the charts drawn from
// them, and four dashboards.

use serde_json::json;

use crate::error::SpecError;
use crate::model::spec::DEFAULT_DATABASE;
use crate::model::{ChartSpec, DashboardSpec, DatasetSpec};
use crate::spec_set::{SpecSet, SpecSetBuilder};

const TEMPERATURE_HISTORY: &str = "\
SELECT
    sm.statistic_id as entity_id,
    sm.name as sensor_name,
    datetime(s.start_ts, 'unixepoch', 'localtime') as time,
    s.mean as temperature,
    sm.unit_of_measurement as unit
FROM statistics s
JOIN statistics_meta sm ON s.metadata_id = sm.id
WHERE sm.unit_of_measurement IN ('°C', '°F')
ORDER BY s.start_ts DESC
";

const HUMIDITY_HISTORY: &str = "\
SELECT
    sm.statistic_id as entity_id,
    sm.name as sensor_name,
    datetime(s.start_ts, 'unixepoch', 'localtime') as time,
    s.mean as humidity,
    sm.unit_of_measurement as unit
FROM statistics s
JOIN statistics_meta sm ON s.metadata_id = sm.id
WHERE sm.unit_of_measurement = '%'
  AND sm.statistic_id LIKE '%humidity%'
ORDER BY s.start_ts DESC
";

const ENERGY_CONSUMPTION: &str = "\
SELECT
    sm.statistic_id as entity_id,
    sm.name as sensor_name,
    datetime(s.start_ts, 'unixepoch', 'localtime') as time,
    s.sum as total_kwh,
    s.state as hourly_kwh
FROM statistics s
JOIN statistics_meta sm ON s.metadata_id = sm.id
WHERE sm.unit_of_measurement IN ('kWh', 'Wh')
ORDER BY s.start_ts DESC
";

const BINARY_SENSOR_EVENTS: &str = "\
SELECT
    sm.entity_id,
    s.state,
    datetime(s.last_changed_ts, 'unixepoch', 'localtime') as changed_at,
    CASE
        WHEN sm.entity_id LIKE '%motion%' THEN 'Motion'
        WHEN sm.entity_id LIKE '%door%' THEN 'Door'
        WHEN sm.entity_id LIKE '%window%' THEN 'Window'
        ELSE 'Other'
    END as sensor_type
FROM states s
JOIN states_meta sm ON s.metadata_id = sm.metadata_id
WHERE sm.entity_id LIKE 'binary_sensor.%'
ORDER BY s.last_changed_ts DESC
LIMIT 10000
";

const SYSTEM_METRICS: &str = "\
SELECT
    sm.statistic_id as entity_id,
    sm.name as metric_name,
    datetime(s.start_ts, 'unixepoch', 'localtime') as time,
    s.mean as value,
    sm.unit_of_measurement as unit
FROM statistics s
JOIN statistics_meta sm ON s.metadata_id = sm.id
WHERE sm.statistic_id LIKE 'sensor.processor%'
   OR sm.statistic_id LIKE 'sensor.memory%'
   OR sm.statistic_id LIKE 'sensor.disk%'
ORDER BY s.start_ts DESC
";

const AUTOMATION_EVENTS: &str = "\
SELECT
    json_extract(ed.shared_data, '$.entity_id') as automation_id,
    json_extract(ed.shared_data, '$.name') as automation_name,
    datetime(e.time_fired_ts, 'unixepoch', 'localtime') as triggered_at
FROM events e
JOIN event_types et ON e.event_type_id = et.event_type_id
JOIN event_data ed ON e.data_id = ed.data_id
WHERE et.event_type = 'automation_triggered'
ORDER BY e.time_fired_ts DESC
LIMIT 1000
";

const CLIMATE_STATES: &str = "\
SELECT
    sm.entity_id,
    s.state as mode,
    datetime(s.last_changed_ts, 'unixepoch', 'localtime') as changed_at
FROM states s
JOIN states_meta sm ON s.metadata_id = sm.metadata_id
WHERE sm.entity_id LIKE 'climate.%'
ORDER BY s.last_changed_ts DESC
LIMIT 5000
";

const ENTITY_DOMAINS: &str = "\
SELECT
    SUBSTR(entity_id, 1, INSTR(entity_id, '.') - 1) as domain,
    COUNT(*) as entity_count
FROM states_meta
GROUP BY domain
ORDER BY entity_count DESC
";

const TIMESERIES_LINE: &str = "echarts_timeseries_line";
const TIMESERIES_BAR: &str = "echarts_timeseries_bar";

/// The default catalog against the `Home Assistant` connection.
pub fn home_assistant() -> Result<SpecSet, SpecError> {
    home_assistant_on(DEFAULT_DATABASE)
}

/// The default catalog with every dataset backed by `database`.
pub fn home_assistant_on(database: &str) -> Result<SpecSet, SpecError> {
    let datasets = [
        ("Temperature History", TEMPERATURE_HISTORY),
        ("Humidity History", HUMIDITY_HISTORY),
        ("Energy Consumption", ENERGY_CONSUMPTION),
        ("Binary Sensor Events", BINARY_SENSOR_EVENTS),
        ("System Metrics", SYSTEM_METRICS),
        ("Automation Events", AUTOMATION_EVENTS),
        ("Climate States", CLIMATE_STATES),
        ("Entity Domains", ENTITY_DOMAINS),
    ];

    let charts = [
        ChartSpec::new(
            "Temperature Timeline",
            "Temperature History",
            TIMESERIES_LINE,
            line_params("temperature"),
        ),
        ChartSpec::new(
            "Humidity Timeline",
            "Humidity History",
            TIMESERIES_LINE,
            line_params("humidity"),
        ),
        ChartSpec::new(
            "Energy Consumption",
            "Energy Consumption",
            TIMESERIES_LINE,
            line_params("total_kwh"),
        ),
        ChartSpec::new(
            "Binary Sensor Activity",
            "Binary Sensor Events",
            TIMESERIES_BAR,
            count_bar_params("state", "sensor_type", "P1D"),
        ),
        ChartSpec::new(
            "Entities by Domain",
            "Entity Domains",
            "pie",
            json!({ "groupby": ["domain"], "metrics": ["entity_count"] }),
        ),
        ChartSpec::new(
            "System Metrics",
            "System Metrics",
            TIMESERIES_LINE,
            line_params("value"),
        ),
        ChartSpec::new(
            "Automation Events",
            "Automation Events",
            "table",
            json!({ "all_columns": ["automation_name", "triggered_at"], "row_limit": 100 }),
        ),
        ChartSpec::new(
            "Climate Activity",
            "Climate States",
            TIMESERIES_BAR,
            count_bar_params("mode", "mode", "PT1H"),
        ),
    ];

    let dashboards = [
        DashboardSpec::new(
            "Home Overview",
            "home-overview",
            [
                "Temperature Timeline",
                "Humidity Timeline",
                "Binary Sensor Activity",
                "Entities by Domain",
            ],
        ),
        DashboardSpec::new("Energy & Utilities", "energy", ["Energy Consumption"]),
        DashboardSpec::new(
            "Climate & Environment",
            "climate",
            ["Temperature Timeline", "Humidity Timeline", "Climate Activity"],
        ),
        DashboardSpec::new(
            "System & Performance",
            "system",
            ["System Metrics", "Automation Events"],
        ),
    ];

    let builder = datasets.into_iter().fold(SpecSet::builder(), |b, (name, sql)| {
        b.dataset(DatasetSpec::new(name, sql).database(database))
    });
    let builder = charts.into_iter().fold(builder, SpecSetBuilder::chart);
    dashboards
        .into_iter()
        .fold(builder, SpecSetBuilder::dashboard)
        .build()
}

fn line_params(metric: &str) -> serde_json::Value {
    json!({
        "x_axis": "time",
        "metrics": [metric],
        "groupby": ["entity_id"],
        "row_limit": 10000,
    })
}

fn count_bar_params(column: &str, groupby: &str, time_grain: &str) -> serde_json::Value {
    json!({
        "x_axis": "changed_at",
        "metrics": [{
            "expressionType": "SIMPLE",
            "aggregate": "COUNT",
            "column": { "column_name": column },
        }],
        "groupby": [groupby],
        "time_grain_sqla": time_grain,
    })
}
