use crate::{EntityDef, FieldDescriptor, MappingError, ShapeFingerprint, TypeDef};
use std::fmt::{self, Display};

/// How a row to object routine produces its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// Constructor arguments, remaining fields assigned to members.
    ConstructorArgs,
    /// No-argument constructor followed by member assignments.
    MemberInit,
    /// The single field is the result.
    Scalar,
}

impl Display for BindingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BindingMode::ConstructorArgs => "constructor arguments",
            BindingMode::MemberInit => "member initialization",
            BindingMode::Scalar => "scalar",
        })
    }
}

/// A field feeding a constructor parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentBinding {
    pub field: usize,
    pub param: usize,
    /// Member sharing the parameter name, its rules apply to the argument.
    pub member: Option<usize>,
}

/// A field assigned to a writable member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberBinding {
    pub field: usize,
    pub member: usize,
}

/// Bindings of a row shape to a target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeAnalysis {
    pub mode: BindingMode,
    /// Index of the selected constructor, `None` for scalars.
    pub constructor: Option<usize>,
    /// In parameter order.
    pub arguments: Vec<ArgumentBinding>,
    /// In field order.
    pub assignments: Vec<MemberBinding>,
}

/// A member of the parameter type read into one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterBinding {
    /// Member of the parameter type.
    pub member: usize,
    /// Member of the entity type with the same name, when the entity is not
    /// the parameter type itself.
    pub source_member: Option<usize>,
    /// Store field the parameter targets.
    pub field: Option<usize>,
}

fn shape_mismatch(fingerprint: &ShapeFingerprint, reason: impl Into<String>) -> MappingError {
    MappingError::ShapeMismatch {
        target: fingerprint.target_name,
        shape: fingerprint.shape(),
        reason: reason.into(),
    }
}

fn binding_error(fingerprint: &ShapeFingerprint, reason: impl Into<String>) -> MappingError {
    MappingError::BindingError {
        target: fingerprint.target_name,
        shape: fingerprint.shape(),
        reason: reason.into(),
    }
}

fn check_unique(fingerprint: &ShapeFingerprint) -> Result<(), MappingError> {
    let fields = &fingerprint.fields;
    for (i, field) in fields.iter().enumerate() {
        if fields[..i].iter().any(|f| f.matches(field.label())) {
            return Err(shape_mismatch(
                fingerprint,
                format!("field `{}` appears more than once", field.label()),
            ));
        }
    }
    Ok(())
}

/// Field matching a member: exact mapped name first, then the raw member name.
fn field_for_member<T>(
    fields: &[FieldDescriptor],
    entity: &EntityDef<T>,
    member: usize,
) -> Option<usize> {
    let member = &entity.members[member];
    member
        .mapped_name
        .and_then(|name| fields.iter().position(|f| f.matches(name)))
        .or_else(|| fields.iter().position(|f| f.matches(member.name)))
}

/// Member matching a field: exact mapped name first, then the raw member name.
fn member_for_field<T>(entity: &EntityDef<T>, field: &FieldDescriptor) -> Option<usize> {
    entity
        .members
        .iter()
        .position(|m| m.mapped_name.is_some_and(|n| field.matches(n)))
        .or_else(|| entity.members.iter().position(|m| field.matches(m.name)))
}

/// Field feeding a constructor parameter, through the member of the same name when present.
fn field_for_param<T>(
    fields: &[FieldDescriptor],
    entity: &EntityDef<T>,
    name: &str,
) -> (Option<usize>, Option<usize>) {
    let member = entity.member_named(name).map(|(i, _)| i);
    let field = member
        .and_then(|m| field_for_member(fields, entity, m))
        .or_else(|| fields.iter().position(|f| f.matches(name)));
    (field, member)
}

/// Decides how the fields of a row shape feed `T`.
///
/// The constructor with the most parameters that are all present in the shape
/// wins, ties go to the one declared first. Fields left over are assigned to
/// the writable members they match, unmatched fields are ignored.
pub fn analyze_row<T>(
    def: &TypeDef<T>,
    fingerprint: &ShapeFingerprint,
) -> Result<ShapeAnalysis, MappingError> {
    check_unique(fingerprint)?;
    let fields = &fingerprint.fields;
    let entity = match def {
        TypeDef::Scalar(..) => {
            if fields.len() != 1 {
                return Err(shape_mismatch(
                    fingerprint,
                    format!(
                        "a scalar target needs exactly one field, the shape has {}",
                        fields.len()
                    ),
                ));
            }
            return Ok(ShapeAnalysis {
                mode: BindingMode::Scalar,
                constructor: None,
                arguments: Vec::new(),
                assignments: Vec::new(),
            });
        }
        TypeDef::Entity(entity) => entity,
    };

    let mut selected: Option<(usize, Vec<ArgumentBinding>)> = None;
    for (index, constructor) in entity.constructors.iter().enumerate() {
        let arguments = constructor
            .params
            .iter()
            .enumerate()
            .map(|(param, p)| match field_for_param(fields, entity, p.name) {
                (Some(field), member) => Some(ArgumentBinding {
                    field,
                    param,
                    member,
                }),
                (None, ..) => None,
            })
            .collect::<Option<Vec<_>>>();
        let Some(arguments) = arguments else {
            continue;
        };
        if selected
            .as_ref()
            .is_none_or(|(_, current)| arguments.len() > current.len())
        {
            selected = Some((index, arguments));
        }
    }
    let Some((constructor, arguments)) = selected else {
        return Err(binding_error(
            fingerprint,
            format!(
                "no bindings found, none of the {} constructors of `{}` has all its parameters \
                in the shape, declare a constructor without parameters or select the missing fields",
                entity.constructors.len(),
                entity.name,
            ),
        ));
    };

    let mut assignments = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        if arguments.iter().any(|a| a.field == i) {
            continue;
        }
        let Some(member) = member_for_field(entity, field) else {
            continue;
        };
        let writable = entity.members[member].is_writable();
        let bound = arguments.iter().any(|a| a.member == Some(member))
            || assignments.iter().any(|a: &MemberBinding| a.member == member);
        if writable && !bound {
            assignments.push(MemberBinding { field: i, member });
        }
    }

    if arguments.is_empty() && assignments.is_empty() {
        return Err(binding_error(
            fingerprint,
            format!(
                "no bindings found, no field matches a writable member of `{}`",
                entity.name
            ),
        ));
    }
    Ok(ShapeAnalysis {
        mode: if arguments.is_empty() {
            BindingMode::MemberInit
        } else {
            BindingMode::ConstructorArgs
        },
        constructor: Some(constructor),
        arguments,
        assignments,
    })
}

/// Selects the members of `P` read into parameters, and the store fields they target.
///
/// With store fields the parameters follow the store order, members matching
/// no store field come last in declaration order.
pub fn analyze_parameters<P, E>(
    def: &TypeDef<P>,
    source: &TypeDef<E>,
    fingerprint: &ShapeFingerprint,
) -> Result<Vec<ParameterBinding>, MappingError> {
    check_unique(fingerprint)?;
    let TypeDef::Entity(entity) = def else {
        return Err(shape_mismatch(
            fingerprint,
            "a scalar has no members to read parameters from",
        ));
    };
    let source = match source {
        TypeDef::Entity(source) if fingerprint.source != Some(fingerprint.target) => Some(source),
        _ => None,
    };
    let fields = &fingerprint.fields;
    let mut bindings = entity
        .members
        .iter()
        .enumerate()
        .map(|(i, member)| ParameterBinding {
            member: i,
            source_member: source.and_then(|s| {
                s.members
                    .iter()
                    .position(|m| m.field_name().eq_ignore_ascii_case(member.field_name()))
                    .or_else(|| s.member_named(member.name).map(|(i, _)| i))
            }),
            field: fields.iter().position(|f| f.matches(member.field_name())),
        })
        .collect::<Vec<_>>();
    if bindings.is_empty() {
        return Err(binding_error(
            fingerprint,
            format!("`{}` has no members", entity.name),
        ));
    }
    if !fields.is_empty() {
        bindings.sort_by_key(|b| b.field.unwrap_or(usize::MAX));
    }
    Ok(bindings)
}
