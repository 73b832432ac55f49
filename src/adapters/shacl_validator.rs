//! SPARQL-evaluated SHACL subset validator
//!
//! Interprets the constraint components the workflow shapes rely on:
//! `sh:minCount`, `sh:maxCount`, `sh:in`, `sh:datatype`, and SPARQL-based
//! constraints (`sh:sparql`/`sh:select`, rows are violations, `$this` is the
//! focus node). Targets come from `sh:targetClass` and
//! `sh:targetSubjectsOf`. `sh:prefixes` is not interpreted: `sh:select`
//! texts must carry their own PREFIX declarations.

use crate::adapters::oxigraph_store::term_text;
use crate::error::{EngineError, EngineResult};
use crate::ports::validator::{
    ValidationResult, ValidationSeverity, ValidationViolation, WorkflowValidator, WORKFLOW_SHAPES,
};
use oxigraph::io::RdfFormat;
use oxigraph::model::Term;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use std::collections::{BTreeMap, BTreeSet};

const SHAPE_PREFIXES: &str = "\
PREFIX sh: <http://www.w3.org/ns/shacl#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
";

#[derive(Debug)]
struct PropertyConstraint {
    path: String,
    min_count: Option<u64>,
    max_count: Option<u64>,
    datatype: Option<String>,
    message: Option<String>,
    severity: ValidationSeverity,
    /// `sh:in` enumeration; empty means unconstrained
    allowed: Vec<Term>,
}

#[derive(Debug)]
struct SparqlConstraint {
    select: String,
    message: Option<String>,
    severity: ValidationSeverity,
}

#[derive(Debug)]
struct NodeShape {
    iri: String,
    target_class: Option<String>,
    target_subjects_of: Option<String>,
    properties: Vec<PropertyConstraint>,
    sparql: Vec<SparqlConstraint>,
}

/// Closed-world validator over a SHACL shape set
pub struct ShaclValidator {
    shapes: String,
}

impl Default for ShaclValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaclValidator {
    /// Validator with the default workflow shape set
    pub fn new() -> Self {
        Self {
            shapes: WORKFLOW_SHAPES.to_string(),
        }
    }

    /// Validator with a caller-supplied shape set (Turtle)
    pub fn with_shapes(shapes: impl Into<String>) -> Self {
        Self {
            shapes: shapes.into(),
        }
    }

    /// Parse a graph serialization into a scratch store (Turtle, then TriG)
    fn load_scratch(data: &str) -> EngineResult<Store> {
        let store = Store::new()
            .map_err(|e| EngineError::Unavailable(format!("Failed to create store: {}", e)))?;
        if store
            .load_from_reader(RdfFormat::Turtle, data.as_bytes())
            .is_ok()
        {
            return Ok(store);
        }
        let store = Store::new()
            .map_err(|e| EngineError::Unavailable(format!("Failed to create store: {}", e)))?;
        store
            .load_from_reader(RdfFormat::TriG, data.as_bytes())
            .map_err(|e| EngineError::Parse(format!("{}", e)))?;
        Ok(store)
    }

    fn select(store: &Store, sparql: &str) -> EngineResult<Vec<BTreeMap<String, Term>>> {
        let results = store
            .query(sparql)
            .map_err(|e| EngineError::Parse(format!("SPARQL query failed: {}", e)))?;
        let QueryResults::Solutions(solutions) = results else {
            return Err(EngineError::Parse("Expected SELECT results".to_string()));
        };
        let mut rows = Vec::new();
        for solution in solutions {
            let solution =
                solution.map_err(|e| EngineError::Parse(format!("SPARQL solution error: {}", e)))?;
            let mut row = BTreeMap::new();
            for (variable, term) in solution.iter() {
                row.insert(variable.as_str().to_string(), term.clone());
            }
            rows.push(row);
        }
        Ok(rows)
    }

    fn severity_from(term: Option<&Term>) -> ValidationSeverity {
        match term {
            Some(Term::NamedNode(n)) if n.as_str().ends_with("#Info") => ValidationSeverity::Info,
            Some(Term::NamedNode(n)) if n.as_str().ends_with("#Warning") => {
                ValidationSeverity::Warning
            }
            _ => ValidationSeverity::Violation,
        }
    }

    fn literal_u64(term: Option<&Term>) -> Option<u64> {
        match term {
            Some(Term::Literal(lit)) => lit.value().parse().ok(),
            _ => None,
        }
    }

    fn literal_string(term: Option<&Term>) -> Option<String> {
        match term {
            Some(Term::Literal(lit)) => Some(lit.value().to_string()),
            _ => None,
        }
    }

    fn iri(term: Option<&Term>) -> Option<String> {
        match term {
            Some(Term::NamedNode(n)) => Some(n.as_str().to_string()),
            _ => None,
        }
    }

    fn extract_shapes(&self, shapes_text: &str) -> EngineResult<Vec<NodeShape>> {
        let store = Self::load_scratch(shapes_text)?;

        let shape_rows = Self::select(
            &store,
            &format!(
                "{SHAPE_PREFIXES}\
                 SELECT ?shape ?targetClass ?targetSubjectsOf WHERE {{\n\
                     ?shape a sh:NodeShape .\n\
                     OPTIONAL {{ ?shape sh:targetClass ?targetClass }}\n\
                     OPTIONAL {{ ?shape sh:targetSubjectsOf ?targetSubjectsOf }}\n\
                 }}"
            ),
        )?;

        let property_rows = Self::select(
            &store,
            &format!(
                "{SHAPE_PREFIXES}\
                 SELECT ?shape ?path ?minCount ?maxCount ?datatype ?message ?severity WHERE {{\n\
                     ?shape a sh:NodeShape ; sh:property ?prop .\n\
                     ?prop sh:path ?path .\n\
                     OPTIONAL {{ ?prop sh:minCount ?minCount }}\n\
                     OPTIONAL {{ ?prop sh:maxCount ?maxCount }}\n\
                     OPTIONAL {{ ?prop sh:datatype ?datatype }}\n\
                     OPTIONAL {{ ?prop sh:message ?message }}\n\
                     OPTIONAL {{ ?prop sh:severity ?severity }}\n\
                 }}"
            ),
        )?;

        let in_rows = Self::select(
            &store,
            &format!(
                "{SHAPE_PREFIXES}\
                 SELECT ?shape ?path ?value WHERE {{\n\
                     ?shape a sh:NodeShape ; sh:property ?prop .\n\
                     ?prop sh:path ?path ; sh:in/rdf:rest*/rdf:first ?value .\n\
                 }}"
            ),
        )?;

        let sparql_rows = Self::select(
            &store,
            &format!(
                "{SHAPE_PREFIXES}\
                 SELECT ?shape ?select ?message ?severity WHERE {{\n\
                     ?shape a sh:NodeShape ; sh:sparql ?constraint .\n\
                     ?constraint sh:select ?select .\n\
                     OPTIONAL {{ ?constraint sh:message ?message }}\n\
                     OPTIONAL {{ ?constraint sh:severity ?severity }}\n\
                 }}"
            ),
        )?;

        let mut shapes: Vec<NodeShape> = Vec::new();
        for row in &shape_rows {
            let Some(iri) = Self::iri(row.get("shape")) else {
                continue; // anonymous shapes are not addressable here
            };
            shapes.push(NodeShape {
                iri,
                target_class: Self::iri(row.get("targetClass")),
                target_subjects_of: Self::iri(row.get("targetSubjectsOf")),
                properties: Vec::new(),
                sparql: Vec::new(),
            });
        }

        for row in &property_rows {
            let Some(shape_iri) = Self::iri(row.get("shape")) else {
                continue;
            };
            let Some(path) = Self::iri(row.get("path")) else {
                continue;
            };
            let allowed = in_rows
                .iter()
                .filter(|r| {
                    Self::iri(r.get("shape")).as_deref() == Some(shape_iri.as_str())
                        && Self::iri(r.get("path")).as_deref() == Some(path.as_str())
                })
                .filter_map(|r| r.get("value").cloned())
                .collect();
            if let Some(shape) = shapes.iter_mut().find(|s| s.iri == shape_iri) {
                shape.properties.push(PropertyConstraint {
                    path,
                    min_count: Self::literal_u64(row.get("minCount")),
                    max_count: Self::literal_u64(row.get("maxCount")),
                    datatype: Self::iri(row.get("datatype")),
                    message: Self::literal_string(row.get("message")),
                    severity: Self::severity_from(row.get("severity")),
                    allowed,
                });
            }
        }

        for row in &sparql_rows {
            let Some(shape_iri) = Self::iri(row.get("shape")) else {
                continue;
            };
            let Some(select) = Self::literal_string(row.get("select")) else {
                continue;
            };
            if let Some(shape) = shapes.iter_mut().find(|s| s.iri == shape_iri) {
                shape.sparql.push(SparqlConstraint {
                    select,
                    message: Self::literal_string(row.get("message")),
                    severity: Self::severity_from(row.get("severity")),
                });
            }
        }

        Ok(shapes)
    }

    /// Focus nodes for a shape; blank nodes are skipped (not addressable in
    /// follow-up queries)
    fn focus_nodes(data: &Store, shape: &NodeShape) -> EngineResult<Vec<String>> {
        let mut nodes = BTreeSet::new();
        if let Some(class) = &shape.target_class {
            for row in Self::select(
                data,
                &format!("SELECT DISTINCT ?focus WHERE {{ ?focus a <{}> }}", class),
            )? {
                if let Some(iri) = Self::iri(row.get("focus")) {
                    nodes.insert(iri);
                }
            }
        }
        if let Some(predicate) = &shape.target_subjects_of {
            for row in Self::select(
                data,
                &format!(
                    "SELECT DISTINCT ?focus WHERE {{ ?focus <{}> ?value }}",
                    predicate
                ),
            )? {
                if let Some(iri) = Self::iri(row.get("focus")) {
                    nodes.insert(iri);
                }
            }
        }
        Ok(nodes.into_iter().collect())
    }

    fn check_property(
        data: &Store,
        shape: &NodeShape,
        constraint: &PropertyConstraint,
        focus: &str,
        violations: &mut Vec<ValidationViolation>,
    ) -> EngineResult<()> {
        let values: Vec<Term> = Self::select(
            data,
            &format!(
                "SELECT ?value WHERE {{ <{}> <{}> ?value }}",
                focus, constraint.path
            ),
        )?
        .into_iter()
        .filter_map(|mut row| row.remove("value"))
        .collect();

        let count = values.len() as u64;
        let base = |component: &str, value: Option<String>| ValidationViolation {
            focus_node: focus.to_string(),
            constraint: component.to_string(),
            message: constraint
                .message
                .clone()
                .unwrap_or_else(|| format!("{} constraint violated", component)),
            severity: constraint.severity,
            path: Some(constraint.path.clone()),
            shape: Some(shape.iri.clone()),
            value,
        };

        if let Some(min) = constraint.min_count {
            if count < min {
                violations.push(base("sh:minCount", None));
            }
        }
        if let Some(max) = constraint.max_count {
            if count > max {
                violations.push(base("sh:maxCount", None));
            }
        }
        if !constraint.allowed.is_empty() {
            for value in &values {
                if !constraint.allowed.contains(value) {
                    violations.push(base("sh:in", Some(term_text(value))));
                }
            }
        }
        if let Some(datatype) = &constraint.datatype {
            for value in &values {
                let ok = matches!(value, Term::Literal(lit) if lit.datatype().as_str() == datatype);
                if !ok {
                    violations.push(base("sh:datatype", Some(term_text(value))));
                }
            }
        }
        Ok(())
    }

    fn check_sparql(
        data: &Store,
        shape: &NodeShape,
        constraint: &SparqlConstraint,
        focus: &str,
        violations: &mut Vec<ValidationViolation>,
    ) -> EngineResult<()> {
        let query = constraint.select.replace("$this", &format!("<{}>", focus));
        let rows = Self::select(data, &query)?;
        for _row in &rows {
            violations.push(ValidationViolation {
                focus_node: focus.to_string(),
                constraint: "sh:sparql".to_string(),
                message: constraint
                    .message
                    .clone()
                    .unwrap_or_else(|| "SPARQL constraint violated".to_string()),
                severity: constraint.severity,
                path: None,
                shape: Some(shape.iri.clone()),
                value: None,
            });
        }
        Ok(())
    }
}

impl WorkflowValidator for ShaclValidator {
    fn validate(
        &self,
        data_graph: &str,
        shapes_graph: Option<&str>,
    ) -> EngineResult<ValidationResult> {
        let shapes_text = shapes_graph.unwrap_or(&self.shapes);
        let shapes = self.extract_shapes(shapes_text)?;
        let data = Self::load_scratch(data_graph)?;

        let mut violations = Vec::new();
        let mut validated: BTreeSet<String> = BTreeSet::new();

        for shape in &shapes {
            let focus_nodes = Self::focus_nodes(&data, shape)?;
            for focus in &focus_nodes {
                validated.insert(focus.clone());
                for constraint in &shape.properties {
                    Self::check_property(&data, shape, constraint, focus, &mut violations)?;
                }
                for constraint in &shape.sparql {
                    Self::check_sparql(&data, shape, constraint, focus, &mut violations)?;
                }
            }
        }

        let result = ValidationResult {
            conforms: violations
                .iter()
                .all(|v| v.severity != ValidationSeverity::Violation),
            violations,
            shapes_evaluated: shapes.len(),
            focus_nodes_validated: validated.len(),
        };
        if !result.conforms {
            tracing::debug!(
                "Validation found {} violations across {} focus nodes",
                result.violation_count(),
                result.focus_nodes_validated
            );
        }
        Ok(result)
    }

    fn shapes(&self) -> &str {
        &self.shapes
    }
}
