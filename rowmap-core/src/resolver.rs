use crate::{ConversionMode, Rules, StorageType, ValueHandler, ValueType};
use crate::plan::Coercion;
use std::{any::TypeId, fmt, sync::Arc};

/// Conversion rules a single inbound field or outbound member resolved to.
#[derive(Clone)]
pub struct FieldRule {
    /// Type the value has after `coercion`.
    pub value_type: ValueType,
    pub coercion: Coercion,
    pub handler: Option<Arc<dyn ValueHandler>>,
    /// Outbound only.
    pub storage_type: Option<StorageType>,
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("value_type", &self.value_type)
            .field("coercion", &self.coercion)
            .field("handler", &self.handler.is_some())
            .field("storage_type", &self.storage_type)
            .finish()
    }
}

fn coercion(mode: ConversionMode, from: ValueType, to: ValueType) -> Coercion {
    if from == to {
        Coercion::Identity
    } else if let ValueType::Enum(def) = to {
        Coercion::ParseEnum(def)
    } else if mode == ConversionMode::Automatic {
        Coercion::Convert(to)
    } else {
        Coercion::Cast(to)
    }
}

/// Rules for a field read into `member` of `target`.
///
/// A value handler registered on the member replaces the member type with its
/// storage type: the field value is coerced to it and then given to the handler.
pub fn resolve_inbound(
    rules: &Rules,
    target: TypeId,
    member: &str,
    member_type: ValueType,
    field_type: ValueType,
) -> FieldRule {
    let handler = rules.value_handler(target, member);
    let value_type = handler
        .as_ref()
        .map(|h| h.storage_value_type())
        .unwrap_or(member_type);
    FieldRule {
        value_type,
        coercion: coercion(rules.settings.conversion_mode, field_type, value_type),
        handler,
        storage_type: None,
    }
}

/// Member an outbound parameter is resolved for.
#[derive(Debug, Clone, Copy)]
pub struct OutboundMember<'a> {
    /// Type declaring the member.
    pub owner: TypeId,
    pub name: &'a str,
}

/// Rules for a member of the parameter type read into a parameter.
///
/// `members` lists the parameter type member first, then the entity member
/// it is read through, rules are looked up in that order. `field_type` is the
/// declared type of the targeted store field.
pub fn resolve_outbound(
    rules: &Rules,
    members: &[OutboundMember<'_>],
    member_type: ValueType,
    field_type: Option<ValueType>,
) -> FieldRule {
    let handler = members
        .iter()
        .find_map(|m| rules.value_handler(m.owner, m.name));
    let mut value_type = handler
        .as_ref()
        .map(|h| h.storage_value_type())
        .unwrap_or(member_type);
    let mut coerce = Coercion::Identity;
    if rules.settings.conversion_mode == ConversionMode::Automatic
        && let Some(field_type) = field_type
        && field_type != value_type
    {
        coerce = Coercion::Convert(field_type);
        value_type = field_type;
    }
    let storage_type = members
        .iter()
        .find_map(|m| rules.member_storage_type(m.owner, m.name))
        .or_else(|| rules.type_storage_type(value_type))
        .or_else(|| StorageType::for_value_type(value_type))
        .or_else(|| {
            value_type
                .is_enum()
                .then_some(rules.settings.enum_default_storage_type)
        });
    // Enumerations are rendered in the representation of their storage type.
    if value_type.is_enum()
        && let Some(storage_value_type) = storage_type.and_then(|s| s.value_type())
        && !storage_value_type.is_enum()
    {
        coerce = Coercion::Convert(storage_value_type);
        value_type = storage_value_type;
    }
    FieldRule {
        value_type,
        coercion: coerce,
        handler,
        storage_type,
    }
}
