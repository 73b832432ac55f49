//! SHACL validator port
//!
//! SHACL provides what N3 inference cannot: closed-world checks. A
//! `[min 1, max 1]` cardinality fails when a targeted focus node has zero
//! values, which no monotonic rule can ever detect. Shapes guard transitions;
//! they never participate in inference.

use crate::error::EngineResult;
use serde::{Deserialize, Serialize};

/// SHACL result severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationSeverity {
    Info,
    Warning,
    /// Fatal for the surrounding transaction
    Violation,
}

/// A single constraint violation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    /// The node that failed validation
    pub focus_node: String,
    /// The constraint component that failed (e.g. `sh:maxCount`)
    pub constraint: String,
    /// Human-readable message
    pub message: String,
    pub severity: ValidationSeverity,
    /// Property path that was violated, when applicable
    pub path: Option<String>,
    /// The shape that produced the violation
    pub shape: Option<String>,
    /// The offending value, when one exists
    pub value: Option<String>,
}

/// Result of validating a data graph against a shape set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff no violations at `Violation` severity were found
    pub conforms: bool,
    pub violations: Vec<ValidationViolation>,
    pub shapes_evaluated: usize,
    pub focus_nodes_validated: usize,
}

impl ValidationResult {
    /// Count of results at `Violation` severity
    pub fn violation_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == ValidationSeverity::Violation)
            .count()
    }

    /// Count of results at `Warning` severity
    pub fn warning_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == ValidationSeverity::Warning)
            .count()
    }

    /// All violations reported for one focus node
    pub fn violations_for_node(&self, focus_node: &str) -> Vec<&ValidationViolation> {
        self.violations
            .iter()
            .filter(|v| v.focus_node == focus_node)
            .collect()
    }
}

/// Default workflow shape set
///
/// Enumerates the closed-world constraints the rule set relies on:
/// exactly-one status per task, at-most-one counter value, at-most-one
/// active XOR branch, exactly-one next element per flow.
///
/// `sh:select` texts carry their own PREFIX declarations; `sh:prefixes` is
/// not interpreted.
pub const WORKFLOW_SHAPES: &str = r#"
@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix kgc: <https://kgc.org/ns/> .
@prefix yawl: <http://www.yawlfoundation.org/yawlschema#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

# Task status is a functional property.
kgc:TaskStatusShape a sh:NodeShape ;
    sh:targetClass yawl:Task ;
    sh:property [
        sh:path kgc:status ;
        sh:minCount 1 ;
        sh:maxCount 1 ;
        sh:in ( "Pending" "Active" "Completed" "Archived" "Cancelled" ) ;
        sh:message "Task must have exactly one valid status" ;
    ] .

# Counters carry at most one integer value.
kgc:CounterShape a sh:NodeShape ;
    sh:targetSubjectsOf kgc:instanceCount ;
    sh:property [
        sh:path kgc:instanceCount ;
        sh:maxCount 1 ;
        sh:datatype xsd:integer ;
        sh:message "Counter must have at most one integer value" ;
    ] .

# An XOR split may activate at most one outgoing branch.
kgc:XorSplitShape a sh:NodeShape ;
    sh:targetSubjectsOf yawl:flowsInto ;
    sh:sparql [
        sh:message "XOR split must have at most one active branch" ;
        sh:select """
            PREFIX kgc: <https://kgc.org/ns/>
            PREFIX yawl: <http://www.yawlfoundation.org/yawlschema#>
            SELECT ?branch1 ?branch2 WHERE {
                $this yawl:split yawl:ControlTypeXor .
                $this yawl:flowsInto ?flow1 .
                ?flow1 yawl:nextElementRef ?branch1 .
                ?branch1 kgc:status "Active" .
                $this yawl:flowsInto ?flow2 .
                ?flow2 yawl:nextElementRef ?branch2 .
                ?branch2 kgc:status "Active" .
                FILTER (?branch1 != ?branch2)
            }
        """ ;
    ] .

# Flows reference exactly one downstream element.
kgc:FlowShape a sh:NodeShape ;
    sh:targetClass yawl:Flow ;
    sh:property [
        sh:path yawl:nextElementRef ;
        sh:minCount 1 ;
        sh:maxCount 1 ;
        sh:message "Flow must reference exactly one next element" ;
    ] .
"#;

/// Port over the closed-world validator
pub trait WorkflowValidator: Send + Sync {
    /// Validate a data-graph serialization against a shape set; `None` uses
    /// the default workflow shapes
    fn validate(&self, data_graph: &str, shapes_graph: Option<&str>)
        -> EngineResult<ValidationResult>;

    /// Pre-transition variant; contract-equal to `validate`
    fn validate_preconditions(&self, data_graph: &str) -> EngineResult<ValidationResult> {
        self.validate(data_graph, None)
    }

    /// Post-transition variant; a `Violation` here rolls the transaction back
    fn validate_postconditions(&self, data_graph: &str) -> EngineResult<ValidationResult> {
        self.validate(data_graph, None)
    }

    /// The shape set in use, as Turtle
    fn shapes(&self) -> &str;
}
