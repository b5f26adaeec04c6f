use std::fmt;

use serde::{Deserialize, Serialize};

use super::expr::{Condition, Directness};
use crate::geometry::Edge;
use crate::model::InstanceRef;

/// Shorten a rendered fragment longer than 35 characters to its first 25 and
/// last 7 characters.
#[must_use]
pub fn shorten(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 35 {
        return text.to_owned();
    }
    let head: String = chars[..25].iter().collect();
    let tail: String = chars[chars.len() - 7..].iter().collect();
    format!("{head}...{tail}")
}

fn shortened<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| shorten(&i.to_string()))
        .collect::<Vec<_>>()
        .join(";")
}

/// The other side of a structural relation named in an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", content = "value", rename_all = "snake_case")]
pub enum Target {
    Instance(InstanceRef),
    Type(String),
    AnyOf(Vec<String>),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Instance(inst) => write!(f, "{inst}"),
            Target::Type(name) => write!(f, "{name}"),
            Target::AnyOf(names) => write!(f, "{}", names.join(" or ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeUseError {
    pub inst: InstanceRef,
    pub edge: Edge,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceCountError {
    pub insts: Vec<InstanceRef>,
    pub type_name: String,
}

/// A relation that is present when it must not be, or absent when it must.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceStructureError {
    pub related: InstanceRef,
    pub relating: Vec<Target>,
    pub relationship: String,
    pub condition: Option<Condition>,
    pub directness: Option<Directness>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSuccess {
    pub inst: InstanceRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeTypeError {
    pub inst: InstanceRef,
    pub attribute: String,
    pub expected: String,
    pub observed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValueError {
    pub inst: Option<InstanceRef>,
    /// Rendered stacked path, instance first.
    pub path: String,
    pub value: String,
    pub constraint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValueCountError {
    pub paths: Vec<String>,
    pub constraint: String,
    pub required: usize,
    pub observed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingRelationshipError {
    pub inst: InstanceRef,
    pub relationship: String,
    pub other_entity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentationShapeError {
    pub inst: InstanceRef,
    pub identifier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentationTypeError {
    pub inst: InstanceRef,
    pub identifier: String,
    pub expected: String,
    pub observed: String,
}

/// One record produced by a Then step: a violation, or a confirmation when
/// passed rules are reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    EdgeUse(EdgeUseError),
    InstanceCount(InstanceCountError),
    InstanceStructure(InstanceStructureError),
    RuleSuccess(RuleSuccess),
    AttributeType(AttributeTypeError),
    AttributeValue(AttributeValueError),
    AttributeValueCount(AttributeValueCountError),
    MissingRelationship(MissingRelationshipError),
    RepresentationShape(RepresentationShapeError),
    RepresentationType(RepresentationTypeError),
}

impl Outcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::RuleSuccess(_))
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::EdgeUse(_) => "edge_use",
            Outcome::InstanceCount(_) => "instance_count",
            Outcome::InstanceStructure(_) => "instance_structure",
            Outcome::RuleSuccess(_) => "rule_success",
            Outcome::AttributeType(_) => "attribute_type",
            Outcome::AttributeValue(_) => "attribute_value",
            Outcome::AttributeValueCount(_) => "attribute_value_count",
            Outcome::MissingRelationship(_) => "missing_relationship",
            Outcome::RepresentationShape(_) => "representation_shape",
            Outcome::RepresentationType(_) => "representation_type",
        }
    }

    /// The single instance the record is about, if there is one.
    #[must_use]
    pub fn instance(&self) -> Option<&InstanceRef> {
        match self {
            Outcome::EdgeUse(e) => Some(&e.inst),
            Outcome::InstanceCount(_) | Outcome::AttributeValueCount(_) => None,
            Outcome::InstanceStructure(e) => Some(&e.related),
            Outcome::RuleSuccess(e) => Some(&e.inst),
            Outcome::AttributeType(e) => Some(&e.inst),
            Outcome::AttributeValue(e) => e.inst.as_ref(),
            Outcome::MissingRelationship(e) => Some(&e.inst),
            Outcome::RepresentationShape(e) => Some(&e.inst),
            Outcome::RepresentationType(e) => Some(&e.inst),
        }
    }

    /// Machine-readable form of this record.
    pub fn to_structured(&self) -> StructuredRecord {
        let inst = self.instance();
        StructuredRecord {
            inst_id: inst.map(|i| i.id.0),
            inst_guid: inst.and_then(|i| i.global_id.clone()),
            inst_type: inst.map(|i| i.type_name.clone()),
            message: self.to_string(),
            outcome: self.clone(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::EdgeUse(e) => write!(
                f,
                "On instance {} the edge {} was referenced {} times",
                shorten(&e.inst.to_string()),
                shorten(&e.edge.to_string()),
                e.count
            ),
            Outcome::InstanceCount(e) => {
                if e.insts.is_empty() {
                    write!(f, "No instances of type {} were encountered", e.type_name)
                } else {
                    write!(
                        f,
                        "The following {} instances of type {} were encountered: {}",
                        e.insts.len(),
                        e.type_name,
                        shortened(&e.insts)
                    )
                }
            }
            Outcome::InstanceStructure(e) => fmt_structure(e, f),
            Outcome::RuleSuccess(e) => write!(
                f,
                "The rule passed for instance {}",
                shorten(&e.inst.to_string())
            ),
            Outcome::AttributeType(e) => write!(
                f,
                "The attribute {} of instance {} is of type {}, expected {}",
                e.attribute,
                shorten(&e.inst.to_string()),
                e.observed,
                e.expected
            ),
            Outcome::AttributeValue(e) => {
                write!(f, "The value {} ", shorten(&e.value))?;
                if let Some(inst) = &e.inst {
                    write!(f, "on instance {} ", shorten(&inst.to_string()))?;
                }
                write!(f, "must {}", e.constraint)?;
                if !e.path.is_empty() {
                    write!(f, " (path: {})", e.path)?;
                }
                Ok(())
            }
            Outcome::AttributeValueCount(e) => write!(
                f,
                "Expected at least {} values to {}, found {}: {}",
                e.required,
                e.constraint,
                e.observed,
                shortened(&e.paths)
            ),
            Outcome::MissingRelationship(e) => write!(
                f,
                "The instance {} is not related to any {} through {}",
                shorten(&e.inst.to_string()),
                e.other_entity,
                e.relationship
            ),
            Outcome::RepresentationShape(e) => write!(
                f,
                "The instance {} does not have a {} shape representation",
                shorten(&e.inst.to_string()),
                e.identifier
            ),
            Outcome::RepresentationType(e) => write!(
                f,
                "The {} shape representation of instance {} is of type {}, expected {}",
                e.identifier,
                shorten(&e.inst.to_string()),
                e.observed,
                e.expected
            ),
        }
    }
}

fn fmt_structure(e: &InstanceStructureError, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let inst = shorten(&e.related.to_string());
    match e.relating.as_slice() {
        [] => write!(f, "This instance {inst} is not {} anything", e.relationship),
        [single] => {
            let negation = if e.condition == Some(Condition::Must) {
                "is not"
            } else {
                "is"
            };
            let directness = e.directness.map(|d| d.to_string()).unwrap_or_default();
            // "contained in X" but "related to X", "nested by X", "nesting X"
            let preposition = if e.relationship.ends_with("ed") { "in" } else { "" };
            let words: Vec<&str> = [negation, &directness, &e.relationship, preposition]
                .into_iter()
                .filter(|w| !w.is_empty())
                .collect();
            write!(
                f,
                "The instance {inst} {} {}",
                words.join(" "),
                shorten(&single.to_string())
            )
        }
        many => write!(
            f,
            "The instance {inst} is {} the following {} instances: {}",
            e.relationship,
            many.len(),
            shortened(many)
        ),
    }
}

/// Flat, serializable rendering of an [`Outcome`].
///
/// Carries the instance identity and message next to the variant fields so
/// consumers need not understand every record kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRecord {
    pub inst_id: Option<u64>,
    pub inst_guid: Option<String>,
    pub inst_type: Option<String>,
    pub message: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl StructuredRecord {
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// # Errors
    ///
    /// Returns an error if `json` is not a structured record.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::types::EntityId;

    fn inst(id: u64, ty: &str) -> InstanceRef {
        InstanceRef {
            id: EntityId(id),
            type_name: ty.into(),
            global_id: None,
        }
    }

    #[test]
    fn shorten_long_fragments() {
        assert_eq!(shorten("short"), "short");
        let exact = "a".repeat(35);
        assert_eq!(shorten(&exact), exact);
        let long: String = ('a'..='z').chain('A'..='Z').collect();
        assert_eq!(shorten(&long), "abcdefghijklmnopqrstuvwxy...TUVWXYZ");
    }

    #[test]
    fn instance_count_messages() {
        let none = Outcome::InstanceCount(InstanceCountError {
            insts: vec![],
            type_name: "IfcWall".into(),
        });
        assert_eq!(none.to_string(), "No instances of type IfcWall were encountered");

        let some = Outcome::InstanceCount(InstanceCountError {
            insts: vec![inst(1, "IfcSite"), inst(2, "IfcSite")],
            type_name: "IfcSite".into(),
        });
        assert_eq!(
            some.to_string(),
            "The following 2 instances of type IfcSite were encountered: #1=IfcSite;#2=IfcSite"
        );
    }

    #[test]
    fn structure_with_single_relating() {
        let e = Outcome::InstanceStructure(InstanceStructureError {
            related: inst(4, "IfcWall"),
            relating: vec![Target::Type("IfcBuildingStorey".into())],
            relationship: "contained".into(),
            condition: Some(Condition::Must),
            directness: Some(Directness::Directly),
        });
        assert_eq!(
            e.to_string(),
            "The instance #4=IfcWall is not directly contained in IfcBuildingStorey"
        );

        let forbidden = Outcome::InstanceStructure(InstanceStructureError {
            condition: Some(Condition::MustNot),
            directness: Some(Directness::Indirectly),
            ..match e {
                Outcome::InstanceStructure(inner) => inner,
                _ => unreachable!(),
            }
        });
        assert_eq!(
            forbidden.to_string(),
            "The instance #4=IfcWall is indirectly contained in IfcBuildingStorey"
        );
    }

    #[test]
    fn structure_related_to_skips_preposition() {
        let e = Outcome::InstanceStructure(InstanceStructureError {
            related: inst(3, "IfcBuilding"),
            relating: vec![Target::AnyOf(vec!["IfcSite".into(), "IfcBuilding".into()])],
            relationship: "related to".into(),
            condition: Some(Condition::Must),
            directness: None,
        });
        assert_eq!(
            e.to_string(),
            "The instance #3=IfcBuilding is not related to IfcSite or IfcBuilding"
        );
    }

    #[test]
    fn structure_with_many_and_none() {
        let many = Outcome::InstanceStructure(InstanceStructureError {
            related: inst(1, "IfcAlignment"),
            relating: vec![
                Target::Instance(inst(2, "IfcAlignmentHorizontal")),
                Target::Instance(inst(3, "IfcAlignmentHorizontal")),
            ],
            relationship: "nesting".into(),
            condition: Some(Condition::Must),
            directness: None,
        });
        assert_eq!(
            many.to_string(),
            "The instance #1=IfcAlignment is nesting the following 2 instances: \
             #2=IfcAlignmentHorizontal;#3=IfcAlignmentHorizontal"
        );

        let none = Outcome::InstanceStructure(InstanceStructureError {
            related: inst(1, "IfcAlignment"),
            relating: vec![],
            relationship: "nesting".into(),
            condition: Some(Condition::Must),
            directness: None,
        });
        assert_eq!(none.to_string(), "This instance #1=IfcAlignment is not nesting anything");
    }

    #[test]
    fn edge_use_message() {
        let e = Outcome::EdgeUse(EdgeUseError {
            inst: inst(9, "IfcClosedShell"),
            edge: Edge::new(Point(vec![0.0, 0.0]), Point(vec![1.0, 0.0]), true),
            count: 1,
        });
        assert_eq!(
            e.to_string(),
            "On instance #9=IfcClosedShell the edge (0.0, 0.0) -> (1.0, 0.0) was referenced 1 times"
        );
    }

    #[test]
    fn success_and_missing_relationship() {
        let ok = Outcome::RuleSuccess(RuleSuccess { inst: inst(1, "IfcWall") });
        assert!(ok.is_success());
        assert_eq!(ok.to_string(), "The rule passed for instance #1=IfcWall");

        let missing = Outcome::MissingRelationship(MissingRelationshipError {
            inst: inst(2, "IfcDoor"),
            relationship: "IfcRelFillsElement".into(),
            other_entity: "IfcOpeningElement".into(),
        });
        assert!(!missing.is_success());
        assert_eq!(
            missing.to_string(),
            "The instance #2=IfcDoor is not related to any IfcOpeningElement through IfcRelFillsElement"
        );
    }

    #[test]
    fn attribute_value_message_with_path() {
        let e = Outcome::AttributeValue(AttributeValueError {
            inst: Some(inst(7, "IfcWall")),
            path: "#7 -> 'X'".into(),
            value: "'X'".into(),
            constraint: "be 'A' or 'B'".into(),
        });
        assert_eq!(
            e.to_string(),
            "The value 'X' on instance #7=IfcWall must be 'A' or 'B' (path: #7 -> 'X')"
        );
    }

    #[test]
    fn structured_round_trip_preserves_identity() {
        let record = Outcome::AttributeType(AttributeTypeError {
            inst: InstanceRef {
                id: EntityId(12),
                type_name: "IfcSlab".into(),
                global_id: Some("3vB2YO$MX4xv5uCqZZG05x".into()),
            },
            attribute: "ObjectPlacement".into(),
            expected: "IfcLocalPlacement".into(),
            observed: "IfcGridPlacement".into(),
        });
        let json = record.to_structured().to_json().unwrap();
        let back = StructuredRecord::from_json(&json).unwrap();
        assert_eq!(back.inst_id, Some(12));
        assert_eq!(back.inst_type.as_deref(), Some("IfcSlab"));
        assert_eq!(back.inst_guid.as_deref(), Some("3vB2YO$MX4xv5uCqZZG05x"));
        assert_eq!(back.message, record.to_string());
        assert_eq!(back.outcome, record);
    }

    #[test]
    fn structured_kind_tag() {
        let record = Outcome::RuleSuccess(RuleSuccess { inst: inst(1, "IfcWall") });
        let value: serde_json::Value =
            serde_json::from_str(&record.to_structured().to_json().unwrap()).unwrap();
        assert_eq!(value["kind"], "rule_success");
        assert_eq!(value["inst_id"], 1);
    }
}
