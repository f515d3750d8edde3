//! Step definitions for status aggregation behavioural tests.

use cucumber::{given, then, when};
use vividus_status::{Status, StatusPriority};

use crate::world::AggregationWorld;

#[given("a status aggregator wired to the event bus")]
fn wired(world: &mut AggregationWorld) { world.wire(); }

#[given("a scenario is running")]
fn scenario_running(world: &mut AggregationWorld) { world.start_scenario(); }

fn record(world: &mut AggregationWorld, status: &str) {
    let status = status.parse::<Status>().expect("valid status name");
    world.record(status);
}

#[given(expr = "the scenario has observed {word}")]
fn observed(world: &mut AggregationWorld, status: String) { record(world, &status); }

#[when(expr = "a step finishes as {word}")]
fn step_finished(world: &mut AggregationWorld, status: String) { record(world, &status); }

#[when(expr = "a soft assertion fails with known issue {word} and fixed {word}")]
fn failure_event(world: &mut AggregationWorld, known: String, fixed: String) {
    let known = known.parse().expect("known flag is a boolean");
    let fixed = fixed.parse().expect("fixed flag is a boolean");
    world.deliver_failure(known, fixed);
}

#[when(expr = "the soft assertion {string} fails")]
fn soft_failure(world: &mut AggregationWorld, description: String) { world.soft_fail(&description); }

#[when("the scenario finishes")]
fn finish(world: &mut AggregationWorld) { world.finish(); }

#[then(expr = "the scenario status is {word}")]
fn status_is(world: &mut AggregationWorld, expected: String) {
    let expected = expected.parse::<Status>().expect("valid status name");
    assert_eq!(world.finished(), Some(expected));
}

#[then(expr = "the lowest status priority is {word}")]
fn lowest_priority(_world: &mut AggregationWorld, expected: String) {
    assert_eq!(format!("{:?}", StatusPriority::lowest()), expected);
    assert_eq!(Status::from(StatusPriority::lowest()), Status::lowest());
}

#[then(expr = "{word} is reported as {word}")]
fn reported_as(_world: &mut AggregationWorld, status: String, report: String) {
    let status = status.parse::<Status>().expect("valid status name");
    assert_eq!(StatusPriority::from(status).report_status().to_string(), report);
}
