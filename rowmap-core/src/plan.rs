use crate::{
    BindingMode, EnumDef, OutboundMember, Result, Rules, ShapeFingerprint, StorageType, TypeDef,
    Value, ValueHandler, ValueType, analyze_parameters, analyze_row, resolve_inbound,
    resolve_outbound,
};
use std::{
    any::TypeId,
    fmt::{self, Debug, Display},
    sync::Arc,
};

/// Adaptation of a value to the type expected by the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Identity,
    /// [`Value::cast`], numeric narrowing wraps.
    Cast(ValueType),
    /// [`Value::convert`], range checked.
    Convert(ValueType),
    /// Name or discriminant into the enumeration, undefined values fail.
    ParseEnum(&'static EnumDef),
}

impl Coercion {
    pub fn apply(&self, value: Value) -> Result<Value> {
        match *self {
            Coercion::Identity => Ok(value),
            Coercion::Cast(target) => value.cast(target),
            Coercion::Convert(target) => value.convert(target),
            Coercion::ParseEnum(def) => value.convert(ValueType::Enum(def)),
        }
    }
}

impl Display for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coercion::Identity => f.write_str("identity"),
            Coercion::Cast(target) => write!(f, "cast to {target}"),
            Coercion::Convert(target) => write!(f, "convert to {target}"),
            Coercion::ParseEnum(def) => write!(f, "parse {}", def.name),
        }
    }
}

/// Where the value of an operation ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Constructor argument at this parameter position.
    Argument(usize),
    /// Member at this index of the entity definition.
    Member(usize),
    /// The value is the result, scalar targets.
    Result,
    /// A command parameter.
    Parameter(Option<StorageType>),
}

/// One step of a compiled routine.
#[derive(Clone)]
pub struct Operation {
    /// Row ordinal inbound, member index of the parameter type outbound.
    pub source: usize,
    /// Field name inbound, parameter name outbound.
    pub name: String,
    /// Type of the value after `coercion`.
    pub value_type: ValueType,
    pub coercion: Coercion,
    pub handler: Option<Arc<dyn ValueHandler>>,
    /// Replaces a NULL before any other step.
    pub on_null: Option<Value>,
    pub destination: Slot,
}

impl Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("source", &self.source)
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("coercion", &self.coercion)
            .field("handler", &self.handler.is_some())
            .field("on_null", &self.on_null)
            .field("destination", &self.destination)
            .finish()
    }
}

/// Ordered operations turning one shape into one target, interpreted by the
/// compiled routines.
#[derive(Debug, Clone)]
pub struct ConversionPlan {
    pub fingerprint: ShapeFingerprint,
    pub mode: BindingMode,
    pub constructor: Option<usize>,
    /// Arguments in parameter order, then member assignments.
    pub operations: Vec<Operation>,
}

impl ConversionPlan {
    pub fn arguments(&self) -> impl Iterator<Item = &Operation> {
        self.operations
            .iter()
            .filter(|op| matches!(op.destination, Slot::Argument(..)))
    }
    pub fn assignments(&self) -> impl Iterator<Item = &Operation> {
        self.operations
            .iter()
            .filter(|op| matches!(op.destination, Slot::Member(..)))
    }
    pub fn arity(&self) -> usize {
        self.arguments().count()
    }
}

/// NULL replacement for a destination: nothing when a handler sees the value
/// or NULL is legal, the zero value of the type otherwise.
fn null_replacement(nullable: bool, handler: bool, value_type: ValueType) -> Option<Value> {
    match (nullable, handler) {
        (_, true) => None,
        (true, false) => Some(value_type.empty()),
        (false, false) => Some(value_type.zero()),
    }
}

/// Plans the routine reading rows of `fingerprint` into `T`.
pub fn plan_row_to_object<T: 'static>(
    def: &TypeDef<T>,
    fingerprint: &ShapeFingerprint,
    rules: &Rules,
) -> Result<ConversionPlan> {
    let analysis = analyze_row(def, fingerprint)?;
    let fields = &fingerprint.fields;
    let target = TypeId::of::<T>();
    let mut operations = Vec::with_capacity(analysis.arguments.len() + analysis.assignments.len());
    match def {
        TypeDef::Scalar(scalar) => {
            let field = &fields[0];
            let rule = resolve_inbound(rules, target, "", scalar.value_type, field.value_type);
            operations.push(Operation {
                source: 0,
                name: field.label().to_owned(),
                value_type: rule.value_type,
                on_null: null_replacement(scalar.nullable, rule.handler.is_some(), scalar.value_type),
                coercion: rule.coercion,
                handler: rule.handler,
                destination: Slot::Result,
            });
        }
        TypeDef::Entity(entity) => {
            let constructor = analysis
                .constructor
                .and_then(|c| entity.constructors.get(c));
            for argument in &analysis.arguments {
                let field = &fields[argument.field];
                let Some(param) = constructor.and_then(|c| c.params.get(argument.param)) else {
                    continue;
                };
                let member = argument
                    .member
                    .map(|m| entity.members[m].name)
                    .unwrap_or(param.name);
                let rule = resolve_inbound(rules, target, member, param.value_type, field.value_type);
                operations.push(Operation {
                    source: argument.field,
                    name: field.label().to_owned(),
                    value_type: rule.value_type,
                    on_null: null_replacement(param.nullable, rule.handler.is_some(), param.value_type),
                    coercion: rule.coercion,
                    handler: rule.handler,
                    destination: Slot::Argument(argument.param),
                });
            }
            for assignment in &analysis.assignments {
                let field = &fields[assignment.field];
                let member = &entity.members[assignment.member];
                let rule =
                    resolve_inbound(rules, target, member.name, member.value_type, field.value_type);
                operations.push(Operation {
                    source: assignment.field,
                    name: field.label().to_owned(),
                    value_type: rule.value_type,
                    on_null: null_replacement(member.nullable, rule.handler.is_some(), member.value_type),
                    coercion: rule.coercion,
                    handler: rule.handler,
                    destination: Slot::Member(assignment.member),
                });
            }
        }
    }
    Ok(ConversionPlan {
        fingerprint: fingerprint.clone(),
        mode: analysis.mode,
        constructor: analysis.constructor,
        operations,
    })
}

/// Plans the routine reading the members of `P` into parameters, `E` is the
/// entity type whose rules also apply.
pub fn plan_object_to_parameters<P: 'static, E: 'static>(
    def: &TypeDef<P>,
    source: &TypeDef<E>,
    fingerprint: &ShapeFingerprint,
    rules: &Rules,
) -> Result<ConversionPlan> {
    let bindings = analyze_parameters(def, source, fingerprint)?;
    let (TypeDef::Entity(entity), source) = (def, source) else {
        // A scalar target fails the analysis
        return Ok(ConversionPlan {
            fingerprint: fingerprint.clone(),
            mode: BindingMode::Scalar,
            constructor: None,
            operations: Vec::new(),
        });
    };
    let operations = bindings
        .iter()
        .map(|binding| {
            let member = &entity.members[binding.member];
            let mut members = vec![OutboundMember {
                owner: TypeId::of::<P>(),
                name: member.name,
            }];
            if let (TypeDef::Entity(source), Some(index)) = (source, binding.source_member) {
                members.push(OutboundMember {
                    owner: TypeId::of::<E>(),
                    name: source.members[index].name,
                });
            }
            let field = binding.field.map(|f| &fingerprint.fields[f]);
            let rule = resolve_outbound(
                rules,
                &members,
                member.value_type,
                field.map(|f| f.value_type),
            );
            Operation {
                source: binding.member,
                name: member.field_name().to_owned(),
                value_type: rule.value_type,
                coercion: rule.coercion,
                handler: rule.handler,
                on_null: None,
                destination: Slot::Parameter(rule.storage_type),
            }
        })
        .collect();
    Ok(ConversionPlan {
        fingerprint: fingerprint.clone(),
        mode: BindingMode::MemberInit,
        constructor: None,
        operations,
    })
}
