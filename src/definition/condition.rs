//! Feedback rule conditions
//!
//! Conditions are written as short expressions in exercise files, e.g.
//! `angle > 160`, `angle < 60 and state == "DOWN"` or `state == 'UP'`.
//! They are parsed once at load time and evaluated as data per frame.

use crate::error::EngineError;
use crate::types::Phase;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Comparison operator between the joint angle and a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Greater => ">",
            ComparisonOp::Less => "<",
            ComparisonOp::GreaterOrEqual => ">=",
            ComparisonOp::LessOrEqual => "<=",
        }
    }

    fn apply(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            ComparisonOp::Greater => lhs > rhs,
            ComparisonOp::Less => lhs < rhs,
            ComparisonOp::GreaterOrEqual => lhs >= rhs,
            ComparisonOp::LessOrEqual => lhs <= rhs,
        }
    }
}

/// `angle OP threshold`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleComparison {
    pub op: ComparisonOp,
    pub threshold: f64,
}

/// Parsed feedback condition. Every present clause must hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub angle: Option<AngleComparison>,
    pub phase: Option<Phase>,
    source: String,
}

impl Condition {
    /// Parse a condition expression
    pub fn parse(text: &str) -> Result<Self, EngineError> {
        let source = text.trim();
        if source.is_empty() {
            return Err(invalid(text, "condition is empty"));
        }

        let mut angle = None;
        let mut phase = None;

        for clause in source.split(" and ").map(str::trim) {
            if let Some(rest) = clause.strip_prefix("angle") {
                if angle.is_some() {
                    return Err(invalid(text, "more than one angle comparison"));
                }
                angle = Some(parse_angle_clause(text, rest)?);
            } else if let Some(rest) = clause.strip_prefix("state") {
                if phase.is_some() {
                    return Err(invalid(text, "more than one state comparison"));
                }
                phase = Some(parse_state_clause(text, rest)?);
            } else {
                return Err(invalid(
                    text,
                    &format!("expected 'angle' or 'state' clause, found '{clause}'"),
                ));
            }
        }

        Ok(Self {
            angle,
            phase,
            source: source.to_string(),
        })
    }

    /// Whether the condition holds for this angle and phase
    pub fn matches(&self, angle: f64, phase: Phase) -> bool {
        let angle_ok = self
            .angle
            .map_or(true, |cmp| cmp.op.apply(angle, cmp.threshold));
        let phase_ok = self.phase.map_or(true, |required| required == phase);
        angle_ok && phase_ok
    }

    /// The expression as written in the exercise file
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl FromStr for Condition {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::parse(s)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

fn parse_angle_clause(condition: &str, rest: &str) -> Result<AngleComparison, EngineError> {
    let rest = rest.trim_start();

    // Two-character operators must be tried first
    let op = [
        ComparisonOp::GreaterOrEqual,
        ComparisonOp::LessOrEqual,
        ComparisonOp::Greater,
        ComparisonOp::Less,
    ]
    .into_iter()
    .find(|op| rest.starts_with(op.as_str()))
    .ok_or_else(|| invalid(condition, "angle must be followed by >, <, >= or <="))?;

    let number = rest[op.as_str().len()..].trim();
    let threshold: f64 = number
        .parse()
        .map_err(|_| invalid(condition, &format!("'{number}' is not a number")))?;

    if !threshold.is_finite() {
        return Err(invalid(condition, "threshold must be finite"));
    }

    Ok(AngleComparison { op, threshold })
}

fn parse_state_clause(condition: &str, rest: &str) -> Result<Phase, EngineError> {
    let value = rest
        .trim_start()
        .strip_prefix("==")
        .ok_or_else(|| invalid(condition, "state must be compared with =="))?;

    let name = value.trim().trim_matches(|c| c == '"' || c == '\'');
    Phase::parse(name).ok_or_else(|| {
        invalid(
            condition,
            &format!("unknown state '{name}', expected START, DOWN or UP"),
        )
    })
}

fn invalid(condition: &str, reason: &str) -> EngineError {
    EngineError::InvalidCondition {
        condition: condition.to_string(),
        reason: reason.to_string(),
    }
}
