//! ContentQuo streams

use super::definition::StreamDefinition;
use crate::schema::{JsonSchema, SchemaProperty};

/// All streams, parents before their children
pub(super) fn streams() -> Vec<StreamDefinition> {
    vec![
        evaluations(),
        evaluation_details(),
        evaluation_issues(),
        evaluation_metadata(),
        evaluation_metrics(),
        users(),
        user_details(),
    ]
}

fn quality_result() -> SchemaProperty {
    SchemaProperty::object([
        (
            "analytical",
            SchemaProperty::object([
                ("gradeIndex", SchemaProperty::integer()),
                ("gradeName", SchemaProperty::string()),
                ("score", SchemaProperty::number()),
            ]),
        ),
        (
            "auto",
            SchemaProperty::object([
                ("characTer", SchemaProperty::string()),
                ("tausEditDensity", SchemaProperty::string()),
            ]),
        ),
        ("holistic", SchemaProperty::string()),
    ])
}

fn scope() -> SchemaProperty {
    SchemaProperty::object([
        ("fileCount", SchemaProperty::integer()),
        ("volume", SchemaProperty::integer()),
    ])
}

/// Properties shared by the evaluation list and detail payloads
fn evaluation_properties() -> Vec<(&'static str, SchemaProperty)> {
    vec![
        ("analyticalIssueCount", SchemaProperty::integer()),
        ("name", SchemaProperty::string()),
        ("created", SchemaProperty::string()),
        ("currentStep", SchemaProperty::string()),
        ("editCount", SchemaProperty::integer()),
        ("groupID", SchemaProperty::integer()),
        ("groupName", SchemaProperty::string()),
        ("profileID", SchemaProperty::string()),
        ("projectID", SchemaProperty::integer()),
        ("qualityResult", quality_result()),
        ("scope", scope()),
        ("scoredAnalyticalIssueCount", SchemaProperty::integer()),
        ("srcLocale", SchemaProperty::string()),
        ("started", SchemaProperty::string()),
        ("tgtLocale", SchemaProperty::string()),
        ("translatorID", SchemaProperty::integer()),
        ("workflowID", SchemaProperty::integer()),
        ("workflowName", SchemaProperty::string()),
    ]
}

fn evaluations() -> StreamDefinition {
    let schema = JsonSchema::properties(evaluation_properties())
        .with_property("eid", SchemaProperty::string())
        .closed();

    StreamDefinition::new("evaluations", "/evaluations", schema)
        .with_primary_keys(&["eid"])
        .with_records_path("$.evaluations[*]")
        .with_child_context(&["eid"])
}

fn evaluation_details() -> StreamDefinition {
    let assignees = SchemaProperty::array(SchemaProperty::object([
        (
            "assignments",
            SchemaProperty::array(SchemaProperty::object([(
                "role",
                SchemaProperty::string(),
            )])),
        ),
        ("fullname", SchemaProperty::string()),
        ("userId", SchemaProperty::integer()),
    ]));

    // eid comes from the parent context
    let schema = JsonSchema::properties(evaluation_properties())
        .with_property("id", SchemaProperty::string())
        .with_property("eid", SchemaProperty::string())
        .with_property("assignees", assignees)
        .with_property("comments", SchemaProperty::string())
        .closed();

    StreamDefinition::new("evaluation_details", "/evaluations/{eid}", schema)
        .with_parent("evaluations")
        .with_primary_keys(&["id"])
        .skip_not_found()
}

fn evaluation_issues() -> StreamDefinition {
    let schema = JsonSchema::properties([
        ("id", SchemaProperty::string()),
        ("eid", SchemaProperty::string()),
        ("category", SchemaProperty::string()),
        ("severity", SchemaProperty::string()),
        ("comment", SchemaProperty::string()),
        ("segmentId", SchemaProperty::string()),
        ("source", SchemaProperty::string()),
        ("target", SchemaProperty::string()),
        ("created", SchemaProperty::string()),
    ]);

    StreamDefinition::new("evaluation_issues", "/evaluations/{eid}/issues", schema)
        .with_parent("evaluations")
        .with_primary_keys(&["id"])
        .with_records_path("$.issues[*]")
        .skip_not_found()
}

fn evaluation_metadata() -> StreamDefinition {
    let schema = JsonSchema::properties([
        ("eid", SchemaProperty::string()),
        ("name", SchemaProperty::string()),
        ("projectID", SchemaProperty::integer()),
        ("srcLocale", SchemaProperty::string()),
        ("tgtLocale", SchemaProperty::string()),
        ("attributes", SchemaProperty::object(Vec::<(&str, SchemaProperty)>::new())),
    ]);

    StreamDefinition::new("evaluation_metadata", "/evaluations/{eid}/metadata", schema)
        .with_parent("evaluations")
        .with_primary_keys(&["eid"])
        .skip_not_found()
}

fn evaluation_metrics() -> StreamDefinition {
    let schema = JsonSchema::properties([
        ("eid", SchemaProperty::string()),
        ("editCount", SchemaProperty::integer()),
        ("wordCount", SchemaProperty::integer()),
        ("segmentCount", SchemaProperty::integer()),
        ("qualityResult", quality_result()),
    ]);

    StreamDefinition::new("evaluation_metrics", "/evaluations/{eid}/metrics", schema)
        .with_parent("evaluations")
        .with_primary_keys(&["eid"])
        .skip_not_found()
}

fn user_properties() -> Vec<(&'static str, SchemaProperty)> {
    vec![
        ("userId", SchemaProperty::integer()),
        ("fullname", SchemaProperty::string()),
        ("email", SchemaProperty::string()),
        ("active", SchemaProperty::boolean()),
        ("roles", SchemaProperty::array(SchemaProperty::string())),
    ]
}

fn users() -> StreamDefinition {
    StreamDefinition::new("users", "/users", JsonSchema::properties(user_properties()))
        .with_primary_keys(&["userId"])
        .with_records_path("$.users[*]")
        .with_child_context(&["userId"])
}

fn user_details() -> StreamDefinition {
    let schema = JsonSchema::properties(user_properties())
        .with_property("created", SchemaProperty::string())
        .with_property("lastLogin", SchemaProperty::string());

    StreamDefinition::new("user_details", "/users/{userId}", schema)
        .with_parent("users")
        .with_primary_keys(&["userId"])
        .skip_not_found()
}
